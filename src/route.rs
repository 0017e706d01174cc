//! A single route: methods, pattern, callback and `before` filters.
//!
//! Routes are immutable once built. Matching never mutates the route: every
//! successful match returns a fresh [`MatchedRoute`] carrying the matched
//! URI, method and parameters, so one route table serves any number of
//! concurrent requests.

use regex::{Captures, Regex};

use crate::chain::{self, FilterOutcome};
use crate::error::Error;
use crate::filter::FilterRegistry;
use crate::handler::Callback;
use crate::method::Methods;
use crate::pattern::{self, Optionals};

// ── RouteOptions ──────────────────────────────────────────────────────────────

/// Callback and filter list for a route. A bare [`Callback`] converts into
/// options with no filters.
///
/// ```rust
/// use pathgate::{Callback, RouteOptions};
///
/// let options = RouteOptions::uses(Callback::named("Admin@dashboard")?)
///     .before("auth|admin");
/// # Ok::<(), pathgate::Error>(())
/// ```
#[derive(Clone, Debug, Default)]
pub struct RouteOptions {
    pub uses: Option<Callback>,
    pub before: String,
}

impl RouteOptions {
    pub fn uses(callback: Callback) -> Self {
        Self { uses: Some(callback), before: String::new() }
    }

    /// Filters to run before dispatch, `|`-separated.
    pub fn before(mut self, filters: impl Into<String>) -> Self {
        self.before = filters.into();
        self
    }
}

impl From<Callback> for RouteOptions {
    fn from(callback: Callback) -> Self {
        Self::uses(callback)
    }
}

// ── Route ─────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct Route {
    methods: Methods,
    pattern: String,
    filters: Vec<String>,
    callback: Option<Callback>,
    optionals: Optionals,
    literal: bool,
    regex: Regex,
}

impl Route {
    /// Builds a route with the default optional-segment syntax.
    ///
    /// An empty `pattern` means `/`.
    ///
    /// # Errors
    ///
    /// [`Error::Pattern`] when the pattern does not compile.
    pub fn new(
        methods: impl Into<Methods>,
        pattern: &str,
        options: impl Into<RouteOptions>,
    ) -> Result<Self, Error> {
        Self::with_optionals(methods, pattern, options, &Optionals::default())
    }

    pub fn with_optionals(
        methods: impl Into<Methods>,
        pattern: &str,
        options: impl Into<RouteOptions>,
        optionals: &Optionals,
    ) -> Result<Self, Error> {
        let options = options.into();
        let pattern = if pattern.is_empty() { "/" } else { pattern };
        let regex = pattern::compile(pattern, optionals)?;

        Ok(Self {
            methods: methods.into(),
            pattern: pattern.to_owned(),
            filters: parse_filters(&options.before),
            callback: options.uses,
            optionals: optionals.clone(),
            literal: pattern::is_literal(pattern, optionals),
            regex,
        })
    }

    /// Matches `uri` and `method` against this route.
    ///
    /// The method check comes first. A URI equal to the raw pattern matches
    /// without touching the regex and yields no parameters. A pattern with no
    /// placeholder and no optional group matches nothing else.
    pub fn matches(&self, uri: &str, method: &str) -> Option<MatchedRoute<'_>> {
        self.match_regex(uri, method, &self.regex, self.literal)
    }

    /// Like [`matches`](Self::matches) with a different optional-segment
    /// setting. The route's own regex is reused when `optionals` is the one
    /// it was built with; otherwise the pattern is compiled for this call.
    pub fn match_with(
        &self,
        uri: &str,
        method: &str,
        optionals: &Optionals,
    ) -> Result<Option<MatchedRoute<'_>>, Error> {
        if *optionals == self.optionals {
            return Ok(self.matches(uri, method));
        }
        let regex = pattern::compile(&self.pattern, optionals)?;
        let literal = pattern::is_literal(&self.pattern, optionals);
        Ok(self.match_regex(uri, method, &regex, literal))
    }

    fn match_regex(
        &self,
        uri: &str,
        method: &str,
        regex: &Regex,
        literal: bool,
    ) -> Option<MatchedRoute<'_>> {
        if !self.methods.accepts(method) {
            return None;
        }

        if self.pattern == uri {
            return Some(MatchedRoute {
                route: self,
                uri: uri.to_owned(),
                method: method.to_owned(),
                params: Vec::new(),
                regex: None,
                headers: Vec::new(),
            });
        }
        if literal {
            return None;
        }

        let captures = regex.captures(uri)?;
        Some(MatchedRoute {
            route: self,
            uri: uri.to_owned(),
            method: method.to_owned(),
            params: positional_params(&captures),
            regex: Some(regex.as_str().to_owned()),
            headers: Vec::new(),
        })
    }

    pub fn methods(&self) -> &[String] { self.methods.as_slice() }
    pub fn pattern(&self) -> &str { &self.pattern }
    pub fn filters(&self) -> &[String] { &self.filters }
    pub fn callback(&self) -> Option<&Callback> { self.callback.as_ref() }

    /// The regex compiled for this route at construction.
    pub fn regex(&self) -> &Regex { &self.regex }
}

/// Splits a `before` list on `|`, dropping empty names and repeats. The first
/// occurrence of a name fixes its position.
fn parse_filters(before: &str) -> Vec<String> {
    let mut filters: Vec<String> = Vec::new();
    for name in before.split('|').filter(|name| !name.is_empty()) {
        if !filters.iter().any(|f| f == name) {
            filters.push(name.to_owned());
        }
    }
    filters
}

/// Capture groups 1..n as strings. A group that did not participate is `""`
/// unless no later group participated either, in which case it is dropped.
fn positional_params(captures: &Captures<'_>) -> Vec<String> {
    let groups: Vec<_> = captures.iter().skip(1).collect();
    let used = groups.iter().rposition(Option::is_some).map_or(0, |last| last + 1);
    groups[..used]
        .iter()
        .map(|group| group.map_or_else(String::new, |m| m.as_str().to_owned()))
        .collect()
}

// ── MatchedRoute ──────────────────────────────────────────────────────────────

/// The outcome of a successful [`Route::matches`].
///
/// This is what filters receive: the route itself plus everything learned
/// from the request that matched it. Matches made by the
/// [`Router`](crate::Router) also carry the request's query string and
/// headers.
#[derive(Clone, Debug)]
pub struct MatchedRoute<'r> {
    route: &'r Route,
    uri: String,
    method: String,
    params: Vec<String>,
    regex: Option<String>,
    headers: Vec<(String, String)>,
}

impl<'r> MatchedRoute<'r> {
    pub fn route(&self) -> &'r Route { self.route }
    pub fn pattern(&self) -> &'r str { self.route.pattern() }
    pub fn filters(&self) -> &'r [String] { self.route.filters() }
    pub fn uri(&self) -> &str { &self.uri }
    pub fn method(&self) -> &str { &self.method }
    pub fn params(&self) -> &[String] { &self.params }

    pub fn param(&self, index: usize) -> Option<&str> {
        self.params.get(index).map(String::as_str)
    }

    /// The query string, without the `?`.
    pub fn query(&self) -> Option<&str> {
        self.uri.split_once('?').map(|(_, query)| query)
    }

    pub fn headers(&self) -> &[(String, String)] { &self.headers }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Source of the regex that matched; `None` for an exact-string match.
    pub fn regex(&self) -> Option<&str> {
        self.regex.as_deref()
    }

    /// Runs the route's filters in order against this match.
    pub fn apply_filters(&self, registry: &FilterRegistry) -> FilterOutcome {
        chain::run(self, registry)
    }

    pub fn into_params(self) -> Vec<String> {
        self.params
    }

    /// Attaches what the router knows about the request beyond the path the
    /// route was matched on.
    pub(crate) fn with_request(mut self, uri: &str, headers: &[(String, String)]) -> Self {
        self.uri = uri.to_owned();
        self.headers = headers.to_vec();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn route(methods: impl Into<Methods>, pattern: &str) -> Route {
        Route::new(methods, pattern, RouteOptions::default()).unwrap()
    }

    #[test]
    fn literal_pattern_matches_only_itself() {
        let about = route("GET", "/about");

        let m = about.matches("/about", "GET").unwrap();
        assert!(m.params().is_empty());
        assert_eq!(m.regex(), None);

        assert!(about.matches("/about/team", "GET").is_none());
        assert!(about.matches("/abou", "GET").is_none());
        assert!(about.matches("/about", "POST").is_none());
    }

    #[test]
    fn literal_pattern_is_matched_exactly() {
        let about = route("GET", "/about");
        assert!(about.matches("/ABOUT", "GET").is_none());
        assert!(about.matches("/about?x", "GET").is_none());

        let file = route("GET", "/file.txt");
        assert!(file.matches("/file.txt", "GET").is_some());
        assert!(file.matches("/fileXtxt", "GET").is_none());
        assert!(file.matches("/FILE.TXT", "GET").is_none());
    }

    #[test]
    fn literal_check_follows_the_optionals_in_use() {
        let about = route("GET", "/about");
        assert!(about.match_with("/ABOUT", "GET", &Optionals::Disabled).unwrap().is_none());

        // Not literal with optionals on, literal once they are off.
        let grouped = route("GET", "/a(/b)");
        assert!(grouped.matches("/a", "GET").is_some());
        assert!(grouped.match_with("/a/b", "GET", &Optionals::Disabled).unwrap().is_none());
        assert!(grouped.match_with("/a(/b)", "GET", &Optionals::Disabled).unwrap().is_some());
    }

    #[test]
    fn num_placeholder_extracts_integers() {
        let users = route("GET", "/users/:num");

        let m = users.matches("/users/42", "GET").unwrap();
        assert_eq!(m.params(), ["42"]);
        assert_eq!(m.param(0), Some("42"));
        assert_eq!(m.uri(), "/users/42");
        assert_eq!(m.method(), "GET");

        assert_eq!(users.matches("/users/-3", "GET").unwrap().params(), ["-3"]);
        assert!(users.matches("/users/abc", "GET").is_none());
    }

    #[test]
    fn any_and_all_placeholders() {
        let files = route("GET", "/files/:any/:all");
        let m = files.matches("/files/docs/2024/report.pdf", "GET").unwrap();
        assert_eq!(m.params(), ["docs", "2024/report.pdf"]);
        assert!(files.matches("/files/", "GET").is_none());
    }

    #[test]
    fn optional_segment_may_be_absent() {
        let posts = route("GET", "/posts(/:num)");

        assert!(posts.matches("/posts", "GET").unwrap().params().is_empty());
        assert_eq!(posts.matches("/posts/5", "GET").unwrap().params(), ["5"]);
        assert!(posts.matches("/posts/x", "GET").is_none());
    }

    #[test]
    fn skipped_middle_group_becomes_empty_string() {
        let archive = route("GET", "/archive(/:num)/:any");
        let m = archive.matches("/archive/news", "GET").unwrap();
        assert_eq!(m.params(), ["", "news"]);
    }

    #[test]
    fn match_with_disabled_optionals() {
        let posts = route("GET", "/posts(/:num)");
        let plain = posts.match_with("/posts", "GET", &Optionals::Disabled).unwrap();
        assert!(plain.is_none());

        let m = posts.match_with("/posts/5", "GET", &Optionals::Disabled).unwrap().unwrap();
        assert_eq!(m.params(), ["/5", "5"]);
    }

    #[test]
    fn method_gating() {
        let create = route(["post"], "/users");
        assert!(create.matches("/users", "GET").is_none());
        assert!(create.matches("/users", "POST").is_some());

        let anything = route("ANY", "/ping");
        for method in ["GET", "POST", "DELETE", "PURGE"] {
            assert!(anything.matches("/ping", method).is_some(), "{method}");
        }
    }

    #[test]
    fn methods_are_upper_cased_and_pattern_defaults_to_root() {
        let root = route(["get", "head"], "");
        assert_eq!(root.methods(), ["GET", "HEAD"]);
        assert_eq!(root.pattern(), "/");
        assert!(root.matches("/", "HEAD").is_some());
    }

    #[test]
    fn before_list_is_split_and_deduplicated() {
        let options = RouteOptions::default().before("auth||auth|admin|");
        let admin = Route::new("GET", "/admin", options).unwrap();
        assert_eq!(admin.filters(), ["auth", "admin"]);
    }

    #[test]
    fn callback_is_exposed() {
        let options = RouteOptions::uses(Callback::named("Pages@show").unwrap());
        let page = Route::new("GET", "/page/:any", options).unwrap();
        assert!(matches!(page.callback(), Some(Callback::Named(t)) if t.to_string() == "Pages@show"));
        assert!(route("GET", "/").callback().is_none());
    }

    #[test]
    fn a_bare_callback_is_enough_options() {
        let page = Route::new("GET", "/page/:any", Callback::named("Pages@show").unwrap()).unwrap();
        assert!(matches!(page.callback(), Some(Callback::Named(_))));
        assert!(page.filters().is_empty());
    }

    #[test]
    fn query_and_headers_come_from_the_request() {
        let search = route("GET", "/search");
        let m = search.matches("/search", "GET").unwrap();
        assert_eq!(m.query(), None);
        assert!(m.headers().is_empty());

        let headers = [("X-Role".to_owned(), "admin".to_owned())];
        let m = m.with_request("/search?q=rust", &headers);
        assert_eq!(m.uri(), "/search?q=rust");
        assert_eq!(m.query(), Some("q=rust"));
        assert_eq!(m.header("x-role"), Some("admin"));
        assert_eq!(m.header("accept"), None);
    }

    #[test]
    fn invalid_pattern_fails_at_construction() {
        let err = Route::new("GET", "/users/[", RouteOptions::default()).unwrap_err();
        assert!(matches!(err, Error::Pattern { .. }));
    }
}
