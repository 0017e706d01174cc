//! Route tables loaded from TOML.
//!
//! Handlers and filter classes are code, so they are registered on the
//! [`Router`] first; the file then declares the listen address, the optional
//! segment syntax, the named filters and the routes that refer to them.
//!
//! ```toml
//! [server]
//! addr = "0.0.0.0:3000"
//!
//! [routing]
//! optionals = true
//! optional_syntax = [{ search = "[", replace = "(?:" }, { search = "]", replace = ")?" }]
//!
//! [[filter]]
//! name = "auth"
//! uses = "Session@check"
//!
//! [[filter]]
//! name = "csrf"            # no `uses`: declared, always passes
//!
//! [[route]]
//! methods = ["GET", "HEAD"]
//! pattern = "/users/:num"
//! uses = "Users@show"
//! before = "auth|csrf"
//! ```

use std::net::SocketAddr;
use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;
use tracing::info;

use crate::error::Error;
use crate::method::Methods;
use crate::pattern::Optionals;
use crate::router::Router;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub routing: RoutingConfig,

    #[serde(default, rename = "filter")]
    pub filters: Vec<FilterConfig>,

    #[serde(default, rename = "route")]
    pub routes: Vec<RouteConfig>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    #[serde(default = "default_addr")]
    pub addr: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { addr: default_addr() }
    }
}

fn default_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 3000))
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RoutingConfig {
    #[serde(default = "default_true")]
    pub optionals: bool,

    #[serde(default)]
    pub optional_syntax: Vec<OptionalPair>,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self { optionals: true, optional_syntax: Vec::new() }
    }
}

fn default_true() -> bool {
    true
}

impl RoutingConfig {
    pub fn optionals(&self) -> Optionals {
        if !self.optionals {
            return Optionals::Disabled;
        }
        Optionals::with_syntax(
            self.optional_syntax.iter().map(|p| (p.search.clone(), p.replace.clone())),
        )
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OptionalPair {
    pub search: String,
    pub replace: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FilterConfig {
    pub name: String,
    /// `Class@method`; absent for a filter that always passes.
    #[serde(default)]
    pub uses: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RouteConfig {
    pub methods: MethodList,

    #[serde(default)]
    pub pattern: String,

    pub uses: String,

    #[serde(default)]
    pub before: String,
}

/// `methods = "GET"` or `methods = ["GET", "POST"]`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum MethodList {
    One(String),
    Many(Vec<String>),
}

impl From<MethodList> for Methods {
    fn from(list: MethodList) -> Self {
        match list {
            MethodList::One(name) => name.into(),
            MethodList::Many(names) => names.into(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let contents = std::fs::read_to_string(path)?;
        contents.parse()
    }

    /// Adds this file's routing options, filters and routes to `router`.
    ///
    /// # Errors
    ///
    /// The first defect found: a malformed `Class@method`, a pattern that
    /// does not compile, or a route naming a handler `router` lacks.
    pub fn apply(&self, router: Router) -> Result<Router, Error> {
        let mut router = router.optionals(self.routing.optionals());

        for filter in &self.filters {
            let registry = router.filters_mut();
            match &filter.uses {
                Some(target) => {
                    registry.register_named(filter.name.as_str(), target)?;
                }
                None => {
                    registry.declare(filter.name.as_str());
                }
            }
        }

        for route in &self.routes {
            router = router.route_with(route.methods.clone(), &route.pattern, &route.uses, &route.before)?;
        }

        info!(routes = self.routes.len(), filters = self.filters.len(), "route table loaded");
        Ok(router)
    }
}

impl FromStr for Config {
    type Err = Error;

    fn from_str(contents: &str) -> Result<Self, Self::Err> {
        Ok(toml::from_str(contents)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::FilterOutcome;
    use crate::filter::{FilterCallback, FilterInstance};
    use crate::request::Request;
    use crate::response::Response;
    use crate::route::MatchedRoute;
    use crate::router::Resolution;

    const TABLE: &str = r#"
        [server]
        addr = "127.0.0.1:8080"

        [[filter]]
        name = "auth"
        uses = "Session@check"

        [[filter]]
        name = "csrf"

        [[route]]
        methods = "get"
        pattern = "/users/:num"
        uses = "Users@show"
        before = "auth|csrf"

        [[route]]
        methods = ["GET", "POST"]
        pattern = "/posts(/:num)"
        uses = "Posts@index"
    "#;

    async fn ok(_req: Request) -> Response {
        Response::text("ok")
    }

    struct Session {
        user: Option<String>,
    }

    impl FilterInstance for Session {
        fn call(&self, method: &str) -> Option<bool> {
            (method == "check").then(|| self.user.as_deref() == Some("1"))
        }
    }

    fn app() -> Router {
        let mut router = Router::new().handler("Users@show", ok).handler("Posts@index", ok);
        router.filters_mut().register_class("Session", |route: &MatchedRoute<'_>| -> Box<dyn FilterInstance> {
            Box::new(Session { user: route.param(0).map(str::to_owned) })
        });
        router
    }

    #[test]
    fn parses_a_full_table() {
        let config: Config = TABLE.parse().unwrap();
        assert_eq!(config.server.addr, "127.0.0.1:8080".parse::<SocketAddr>().unwrap());
        assert!(config.routing.optionals);
        assert_eq!(config.filters.len(), 2);
        assert_eq!(config.filters[1].uses, None);
        assert_eq!(config.routes.len(), 2);
        assert_eq!(config.routes[1].before, "");
    }

    #[test]
    fn empty_file_uses_defaults() {
        let config: Config = "".parse().unwrap();
        assert_eq!(config.server.addr, default_addr());
        assert_eq!(config.routing.optionals(), Optionals::default());
        assert!(config.routes.is_empty());
    }

    #[test]
    fn applied_table_routes_and_filters() {
        let router = TABLE.parse::<Config>().unwrap().apply(app()).unwrap();

        assert_eq!(router.routes()[0].methods(), ["GET"]);
        assert!(matches!(router.filters().get("auth"), Some(Some(FilterCallback::Named(_)))));
        assert!(matches!(router.resolve("GET", "/users/1"), Resolution::Dispatch(_)));
        assert!(matches!(
            router.resolve("GET", "/users/2"),
            Resolution::Filtered { outcome: FilterOutcome::Rejected { .. }, .. }
        ));
        assert!(matches!(router.resolve("POST", "/posts"), Resolution::Dispatch(_)));
    }

    #[test]
    fn custom_optional_syntax() {
        let config: Config = r#"
            [routing]
            optional_syntax = [{ search = "[", replace = "(?:" }, { search = "]", replace = ")?" }]

            [[route]]
            methods = "GET"
            pattern = "/feed[/:any]"
            uses = "Posts@index"
        "#
        .parse()
        .unwrap();

        let router = config.apply(app()).unwrap();
        assert!(matches!(router.resolve("GET", "/feed"), Resolution::Dispatch(_)));
        assert!(matches!(router.resolve("GET", "/feed/rss"), Resolution::Dispatch(_)));
    }

    #[test]
    fn unknown_handler_fails_the_build() {
        let config: Config = r#"
            [[route]]
            methods = "GET"
            pattern = "/x"
            uses = "Missing@show"
        "#
        .parse()
        .unwrap();

        assert!(matches!(config.apply(app()), Err(Error::UnknownHandler { .. })));
    }

    #[test]
    fn bad_pattern_fails_the_build() {
        let config: Config = r#"
            [[route]]
            methods = "GET"
            pattern = "/users/["
            uses = "Users@show"
        "#
        .parse()
        .unwrap();

        assert!(matches!(
            config.apply(app()),
            Err(Error::Pattern { ref pattern, .. }) if pattern == "/users/["
        ));
    }

    #[test]
    fn disabled_optionals_from_the_table() {
        let config: Config = r#"
            [routing]
            optionals = false

            [[route]]
            methods = "GET"
            pattern = "/posts(/:num)"
            uses = "Posts@index"
        "#
        .parse()
        .unwrap();

        let router = config.apply(app()).unwrap();
        assert!(matches!(router.resolve("GET", "/posts"), Resolution::NotFound));
        assert!(matches!(router.resolve("GET", "/posts/5"), Resolution::Dispatch(_)));
    }

    #[test]
    fn malformed_filter_target_fails_the_build() {
        let config: Config = "[[filter]]\nname = \"auth\"\nuses = \"Session\"\n".parse().unwrap();
        assert!(matches!(config.apply(app()), Err(Error::InvalidCallback(_))));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(matches!("[server]\nport = 1\n".parse::<Config>(), Err(Error::Config(_))));
    }
}
