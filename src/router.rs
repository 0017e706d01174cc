//! Ordered route table.
//!
//! Routes are tried in registration order and the first one whose method and
//! pattern match wins, so register specific routes before broad ones. The
//! winner's filters then decide whether its callback runs. A request the
//! filters turn away does not fall through to later routes.
//!
//! Patterns are matched against the path alone; the query string and headers
//! reach filters through the [`MatchedRoute`].

use std::collections::HashMap;
use std::sync::Arc;

use http::StatusCode;
use tracing::debug;

use crate::chain::FilterOutcome;
use crate::error::Error;
use crate::filter::{FilterCallback, FilterRegistry};
use crate::handler::{BoxedHandler, Callback, Handler, Target};
use crate::method::Methods;
use crate::pattern::Optionals;
use crate::request::Request;
use crate::response::Response;
use crate::route::{MatchedRoute, Route, RouteOptions};

/// What the route table decided for one request.
#[derive(Debug)]
pub enum Resolution<'r> {
    /// A route matched and its filters passed.
    Dispatch(MatchedRoute<'r>),
    /// A route matched but a filter stopped the request.
    Filtered { matched: MatchedRoute<'r>, outcome: FilterOutcome },
    /// No route accepts this method and URI.
    NotFound,
}

/// The application router.
///
/// Build it once at startup and pass it to [`Server::serve`](crate::Server::serve).
/// Register named handlers and filters before the routes that use them.
///
/// ```rust
/// use pathgate::{Method, MatchedRoute, Request, Response, Router};
///
/// async fn show(req: Request) -> Response {
///     Response::text(format!("user {}", req.param(0).unwrap_or("?")))
/// }
///
/// let app = Router::new()
///     .filter_fn("signed-in", |route: &MatchedRoute<'_>| route.uri().contains("token="))
///     .on(Method::Get, "/users/:num", show)
///     .handler("Users@index", show)
///     .route_with(["GET", "HEAD"], "/users", "Users@index", "signed-in")?;
/// # Ok::<(), pathgate::Error>(())
/// ```
pub struct Router {
    routes: Vec<Route>,
    // Resolved callback of `routes[i]`.
    dispatch: Vec<BoxedHandler>,
    filters: FilterRegistry,
    handlers: HashMap<Target, BoxedHandler>,
    optionals: Optionals,
}

impl Router {
    pub fn new() -> Self {
        Self {
            routes: Vec::new(),
            dispatch: Vec::new(),
            filters: FilterRegistry::new(),
            handlers: HashMap::new(),
            optionals: Optionals::default(),
        }
    }

    /// Replaces the filter registry.
    pub fn with_filters(mut self, filters: FilterRegistry) -> Self {
        self.filters = filters;
        self
    }

    /// Optional-segment syntax for routes registered after this call.
    pub fn optionals(mut self, optionals: Optionals) -> Self {
        self.optionals = optionals;
        self
    }

    /// Register a handler for a method + pattern pair. Returns `self` for chaining.
    ///
    /// # Panics
    ///
    /// Panics if `pattern` does not compile. Use [`route`](Self::route) to
    /// handle the error instead.
    pub fn on(self, methods: impl Into<Methods>, pattern: &str, handler: impl Handler) -> Self {
        let handler = handler.into_boxed_handler();
        let options = RouteOptions::uses(Callback::Handler(Arc::clone(&handler)));
        match Route::with_optionals(methods, pattern, options, &self.optionals) {
            Ok(route) => self.push(route, handler),
            Err(e) => panic!("invalid route `{pattern}`: {e}"),
        }
    }

    /// Registers a handler under `"Name@method"` for routes that refer to it
    /// by name.
    ///
    /// # Panics
    ///
    /// Panics if `name` is not of the `Name@method` form.
    pub fn handler(mut self, name: &str, handler: impl Handler) -> Self {
        match Target::parse(name) {
            Ok(target) => {
                self.handlers.insert(target, handler.into_boxed_handler());
                self
            }
            Err(e) => panic!("{e}"),
        }
    }

    /// Registers a route whose callback is a named handler and whose filters
    /// are given as a `|`-separated list.
    pub fn route_with(
        self,
        methods: impl Into<Methods>,
        pattern: &str,
        uses: &str,
        before: &str,
    ) -> Result<Self, Error> {
        let options = RouteOptions::uses(Callback::named(uses)?).before(before);
        let route = Route::with_optionals(methods, pattern, options, &self.optionals)?;
        self.route(route)
    }

    /// Appends a fully built route.
    ///
    /// # Errors
    ///
    /// [`Error::MissingCallback`] when the route has no callback;
    /// [`Error::UnknownHandler`] when it names a handler this router does not
    /// have.
    pub fn route(self, route: Route) -> Result<Self, Error> {
        let handler = match route.callback() {
            None => return Err(Error::MissingCallback(route.pattern().to_owned())),
            Some(Callback::Handler(handler)) => Arc::clone(handler),
            Some(Callback::Named(target)) => match self.handlers.get(target) {
                Some(handler) => Arc::clone(handler),
                None => {
                    return Err(Error::UnknownHandler {
                        pattern: route.pattern().to_owned(),
                        handler: target.to_string(),
                    });
                }
            },
        };
        Ok(self.push(route, handler))
    }

    /// Registers a filter, replacing any earlier one with the same name.
    pub fn filter(mut self, name: &str, callback: FilterCallback) -> Self {
        self.filters.register(name, callback);
        self
    }

    pub fn filter_fn<F>(mut self, name: &str, f: F) -> Self
    where
        F: Fn(&MatchedRoute<'_>) -> bool + Send + Sync + 'static,
    {
        self.filters.register_fn(name, f);
        self
    }

    pub fn filters(&self) -> &FilterRegistry { &self.filters }
    pub fn filters_mut(&mut self) -> &mut FilterRegistry { &mut self.filters }
    pub fn routes(&self) -> &[Route] { &self.routes }

    fn push(mut self, route: Route, handler: BoxedHandler) -> Self {
        debug!(methods = ?route.methods(), pattern = route.pattern(), "route registered");
        self.routes.push(route);
        self.dispatch.push(handler);
        self
    }

    /// Finds the route for `method` and `uri` and runs its filters.
    ///
    /// Only the path takes part in matching; a query string never ends up in
    /// the parameters.
    pub fn resolve(&self, method: &str, uri: &str) -> Resolution<'_> {
        self.select(method, uri, &[]).map_or(Resolution::NotFound, |(_, resolution)| resolution)
    }

    /// [`resolve`](Self::resolve) for a full request, so filters can read
    /// its headers.
    pub fn resolve_request(&self, req: &Request) -> Resolution<'_> {
        self.select(&req.method, &req.uri, &req.headers)
            .map_or(Resolution::NotFound, |(_, resolution)| resolution)
    }

    /// The index of the matching route with the filtered result; `None` when
    /// no route matches.
    fn select(
        &self,
        method: &str,
        uri: &str,
        headers: &[(String, String)],
    ) -> Option<(usize, Resolution<'_>)> {
        let path = uri.split_once('?').map_or(uri, |(path, _)| path);
        let Some((index, matched)) = self.routes.iter().enumerate().find_map(|(index, route)| {
            route.matches(path, method).map(|matched| (index, matched.with_request(uri, headers)))
        }) else {
            debug!(method, uri, "no route matched");
            return None;
        };

        debug!(method, uri, pattern = matched.pattern(), params = ?matched.params(), "route matched");

        let resolution = match matched.apply_filters(&self.filters) {
            FilterOutcome::Passed => Resolution::Dispatch(matched),
            outcome => Resolution::Filtered { matched, outcome },
        };
        Some((index, resolution))
    }

    /// Routes one request and produces one response.
    ///
    /// `404 Not Found` when nothing matches, `403 Forbidden` when a filter
    /// turns the request away.
    pub async fn handle(&self, mut req: Request) -> Response {
        let (index, params) = match self.select(&req.method, &req.uri, &req.headers) {
            None | Some((_, Resolution::NotFound)) => {
                return Response::status(StatusCode::NOT_FOUND);
            }
            Some((_, Resolution::Filtered { .. })) => {
                return Response::status(StatusCode::FORBIDDEN);
            }
            Some((index, Resolution::Dispatch(matched))) => (index, matched.into_params()),
        };

        req.params = params;
        self.dispatch[index].call(req).await
    }
}

impl Default for Router {
    fn default() -> Self { Self::new() }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::method::Method;

    async fn ok(_req: Request) -> Response {
        Response::text("ok")
    }

    fn pattern_of<'r>(resolution: &Resolution<'r>) -> Option<&'r str> {
        match resolution {
            Resolution::Dispatch(matched) => Some(matched.pattern()),
            _ => None,
        }
    }

    #[test]
    fn first_registered_route_wins() {
        let router = Router::new()
            .on(Method::Get, "/users/:num", ok)
            .on(Method::Get, "/users/:any", ok);

        assert_eq!(pattern_of(&router.resolve("GET", "/users/7")), Some("/users/:num"));
        assert_eq!(pattern_of(&router.resolve("GET", "/users/me")), Some("/users/:any"));
    }

    #[test]
    fn later_overlapping_route_is_never_consulted() {
        let second = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&second);
        let router = Router::new()
            .filter_fn("count", move |_: &MatchedRoute<'_>| {
                seen.fetch_add(1, Ordering::SeqCst);
                true
            })
            .on("ANY", "/:all", ok)
            .handler("Fallback@show", ok)
            .route_with("GET", "/users/:num", "Fallback@show", "count")
            .unwrap();

        assert_eq!(pattern_of(&router.resolve("GET", "/users/1")), Some("/:all"));
        assert_eq!(second.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn method_mismatch_falls_through_to_later_routes() {
        let router = Router::new()
            .on(Method::Post, "/items", ok)
            .on(Method::Get, "/items", ok);

        let Resolution::Dispatch(matched) = router.resolve("GET", "/items") else {
            panic!("expected a dispatch");
        };
        assert_eq!(matched.route().methods(), ["GET"]);
    }

    #[test]
    fn filtered_is_not_not_found() {
        let router = Router::new()
            .filter_fn("deny", |_: &MatchedRoute<'_>| false)
            .handler("Admin@index", ok)
            .route_with("GET", "/admin", "Admin@index", "deny")
            .unwrap()
            .on(Method::Get, "/:all", ok);

        match router.resolve("GET", "/admin") {
            Resolution::Filtered { outcome, matched } => {
                assert_eq!(outcome, FilterOutcome::Rejected { filter: "deny".into() });
                assert_eq!(matched.pattern(), "/admin");
            }
            other => panic!("expected Filtered, got {other:?}"),
        }
        assert!(matches!(router.resolve("DELETE", "/admin"), Resolution::NotFound));
    }

    #[test]
    fn route_without_callback_is_rejected() {
        let route = Route::new("GET", "/x", RouteOptions::default()).unwrap();
        assert!(matches!(Router::new().route(route), Err(Error::MissingCallback(p)) if p == "/x"));
    }

    #[test]
    fn unknown_named_handler_is_rejected() {
        let err = Router::new().route_with("GET", "/x", "Nope@show", "").err().unwrap();
        assert!(matches!(
            err,
            Error::UnknownHandler { ref pattern, ref handler } if pattern == "/x" && handler == "Nope@show"
        ));
    }

    #[test]
    fn router_optionals_apply_to_new_routes() {
        let router = Router::new()
            .optionals(Optionals::with_syntax([("[", "(?:"), ("]", ")?")]))
            .on(Method::Get, "/feed[/:any]", ok);

        assert!(matches!(router.resolve("GET", "/feed"), Resolution::Dispatch(_)));
        assert!(matches!(router.resolve("GET", "/feed/atom"), Resolution::Dispatch(_)));
    }

    #[test]
    fn disabled_optionals_keep_parentheses_as_groups() {
        let router = Router::new()
            .optionals(Optionals::Disabled)
            .on(Method::Get, "/posts(/:num)", ok);

        assert!(matches!(router.resolve("GET", "/posts"), Resolution::NotFound));
        let Resolution::Dispatch(matched) = router.resolve("GET", "/posts/5") else {
            panic!("expected a dispatch");
        };
        assert_eq!(matched.params(), ["/5", "5"]);
    }

    #[test]
    fn query_string_is_not_matched_but_reaches_filters() {
        let router = Router::new()
            .filter_fn("signed", |route: &MatchedRoute<'_>| route.query() == Some("sig=1"))
            .handler("Blog@show", ok)
            .route_with("GET", "/blog/:any", "Blog@show", "signed")
            .unwrap()
            .on(Method::Get, "/about", ok);

        let Resolution::Dispatch(matched) = router.resolve("GET", "/blog/hello?sig=1") else {
            panic!("expected a dispatch");
        };
        assert_eq!(matched.params(), ["hello"]);
        assert_eq!(matched.uri(), "/blog/hello?sig=1");

        assert!(matches!(router.resolve("GET", "/blog/hello"), Resolution::Filtered { .. }));
        assert!(matches!(router.resolve("GET", "/about?ref=home"), Resolution::Dispatch(_)));
        assert!(matches!(router.resolve("GET", "/ABOUT"), Resolution::NotFound));
    }

    #[test]
    fn filters_can_read_request_headers() {
        let router = Router::new()
            .filter_fn("admin", |route: &MatchedRoute<'_>| route.header("x-role") == Some("admin"))
            .handler("Admin@index", ok)
            .route_with("GET", "/admin", "Admin@index", "admin")
            .unwrap();

        let allowed = Request::new("GET", "/admin").with_header("X-Role", "admin");
        assert!(matches!(router.resolve_request(&allowed), Resolution::Dispatch(_)));

        let denied = Request::new("GET", "/admin").with_header("X-Role", "guest");
        assert!(matches!(router.resolve_request(&denied), Resolution::Filtered { .. }));
        assert!(matches!(router.resolve("GET", "/admin"), Resolution::Filtered { .. }));
    }

    #[test]
    fn every_route_has_a_resolved_handler() {
        let router = Router::new()
            .on(Method::Get, "/a", ok)
            .handler("B@show", ok)
            .route_with("GET", "/b", "B@show", "")
            .unwrap()
            .route(Route::new("GET", "/c", Callback::handler(ok)).unwrap())
            .unwrap();

        assert_eq!(router.routes().len(), 3);
        assert_eq!(router.dispatch.len(), router.routes().len());
    }

    #[test]
    #[should_panic(expected = "invalid route `/bad(`")]
    fn on_panics_on_invalid_pattern() {
        let _ = Router::new().on(Method::Get, "/bad(", ok);
    }
}
