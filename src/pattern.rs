//! Route pattern compiler.
//!
//! Patterns are plain paths with three typed placeholders and an optional
//! segment convention:
//!
//! | Token | Matches | Fragment |
//! |---|---|---|
//! | `:any` | one path segment | `([^/]+)` |
//! | `:num` | an integer, sign allowed | `(-?[0-9]+)` |
//! | `:all` | everything, slashes included | `(.*)` |
//! | `(/ … )` | an optional tail | `(?:/ … )?` |
//!
//! ```text
//! /posts(/:num)  →  ^/posts(?:/(-?[0-9]+))?(?:\?.*)?$   (case-insensitive)
//! ```
//!
//! Everything else in a pattern is passed to the regex engine untouched.
//! Compilation is pure: the same pattern and [`Optionals`] always produce the
//! same regex.

use regex::{Regex, RegexBuilder};

use crate::error::Error;

const PLACEHOLDERS: [(&str, &str); 3] = [
    (":any", "([^/]+)"),
    (":num", "(-?[0-9]+)"),
    (":all", "(.*)"),
];

const OPTIONAL_GROUP: [(&str, &str); 2] = [("(/", "(?:/"), (")", ")?")];

/// Trailing query strings are accepted but never captured.
const QUERY_TAIL: &str = r"(?:\?.*)?";

/// Optional-segment handling.
///
/// Enabled by default. `extra` holds literal search/replace pairs for a
/// custom optional syntax; they run before the built-in `(/` and `)` pairs.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Optionals {
    Disabled,
    Enabled { extra: Vec<(String, String)> },
}

impl Optionals {
    /// Optional segments with additional syntax, e.g. `[` / `]`:
    ///
    /// ```rust
    /// use pathgate::{pattern, Optionals};
    ///
    /// let optionals = Optionals::with_syntax([("[", "(?:"), ("]", ")?")]);
    /// let regex = pattern::compile("/feed[/:any]", &optionals).unwrap();
    /// assert!(regex.is_match("/feed"));
    /// assert!(regex.is_match("/feed/rss"));
    /// ```
    pub fn with_syntax<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, S)>,
        S: Into<String>,
    {
        Self::Enabled {
            extra: pairs.into_iter().map(|(s, r)| (s.into(), r.into())).collect(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self, Self::Enabled { .. })
    }
}

impl Default for Optionals {
    fn default() -> Self {
        Self::Enabled { extra: Vec::new() }
    }
}

impl From<bool> for Optionals {
    fn from(enabled: bool) -> Self {
        if enabled { Self::default() } else { Self::Disabled }
    }
}

/// Rewrites `pattern` into an unanchored regex body.
///
/// Optional groups are rewritten on the raw pattern first, so the capture
/// groups introduced for placeholders are never turned optional by the `)`
/// rule.
pub fn expand(pattern: &str, optionals: &Optionals) -> String {
    let mut body = pattern.to_owned();

    if let Optionals::Enabled { extra } = optionals {
        let extra = extra.iter().map(|(s, r)| (s.as_str(), r.as_str()));
        for (search, replace) in extra.chain(OPTIONAL_GROUP) {
            body = body.replace(search, replace);
        }
    }

    if pattern.contains(':') {
        for (token, fragment) in PLACEHOLDERS {
            body = body.replace(token, fragment);
        }
    }

    body
}

/// `true` when `pattern` has no placeholder and none of the active
/// optional-segment markers, so it can only ever match itself.
pub fn is_literal(pattern: &str, optionals: &Optionals) -> bool {
    if pattern.contains(':') {
        return false;
    }
    match optionals {
        Optionals::Disabled => true,
        Optionals::Enabled { extra } => !extra
            .iter()
            .map(|(search, _)| search.as_str())
            .chain(OPTIONAL_GROUP.map(|(search, _)| search))
            .any(|search| pattern.contains(search)),
    }
}

/// Compiles `pattern` into an anchored, case-insensitive [`Regex`].
///
/// # Errors
///
/// [`Error::Pattern`] when the expanded pattern is not a valid regex. Routes
/// compile at construction, so this surfaces while the route table is built.
pub fn compile(pattern: &str, optionals: &Optionals) -> Result<Regex, Error> {
    let source = format!("^{}{QUERY_TAIL}$", expand(pattern, optionals));
    RegexBuilder::new(&source)
        .case_insensitive(true)
        .build()
        .map_err(|source| Error::Pattern { pattern: pattern.to_owned(), source })
}
