//! HTTP methods and the method set a route accepts.
//!
//! Routes compare methods as upper-case strings so that extension methods
//! (`PURGE`, WebDAV verbs, anything a proxy forwards) need no special casing.
//! [`Method`] is a typed shorthand for the RFC 9110 set.

use std::fmt;
use std::str::FromStr;

/// Wildcard accepted in place of a method name: the route takes every method.
pub const ANY: &str = "ANY";

/// A standard HTTP method.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Method {
    Connect,
    Delete,
    Get,
    Head,
    Options,
    Patch,
    Post,
    Put,
    Trace,
}

impl Method {
    /// Returns the uppercase wire representation (e.g. `"GET"`).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Connect => "CONNECT",
            Self::Delete  => "DELETE",
            Self::Get     => "GET",
            Self::Head    => "HEAD",
            Self::Options => "OPTIONS",
            Self::Patch   => "PATCH",
            Self::Post    => "POST",
            Self::Put     => "PUT",
            Self::Trace   => "TRACE",
        }
    }
}

/// Parses an uppercase method string (e.g. `"GET"`). Case-sensitive per RFC 9110 §9.1.
impl FromStr for Method {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CONNECT" => Ok(Self::Connect),
            "DELETE"  => Ok(Self::Delete),
            "GET"     => Ok(Self::Get),
            "HEAD"    => Ok(Self::Head),
            "OPTIONS" => Ok(Self::Options),
            "PATCH"   => Ok(Self::Patch),
            "POST"    => Ok(Self::Post),
            "PUT"     => Ok(Self::Put),
            "TRACE"   => Ok(Self::Trace),
            _         => Err(()),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Methods ──────────────────────────────────────────────────────────────────

/// The methods a route accepts, normalized to upper case.
///
/// Built from a single name, a [`Method`], or a list of either:
///
/// ```rust
/// use pathgate::{Method, Methods};
///
/// let get: Methods = Method::Get.into();
/// let rw: Methods = ["get", "post"].into();
/// assert_eq!(rw.as_slice(), ["GET", "POST"]);
/// assert!(Methods::from("any").accepts("DELETE"));
/// # let _ = get;
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Methods(Vec<String>);

impl Methods {
    /// Accepts every method.
    pub fn any() -> Self {
        Self(vec![ANY.to_owned()])
    }

    /// `true` when `ANY` is present or `method` is listed verbatim.
    ///
    /// `method` is not normalized: request lines carry upper-case methods,
    /// and a lower-case one is a different (extension) method.
    pub fn accepts(&self, method: &str) -> bool {
        self.0.iter().any(|m| m == ANY || m == method)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    fn normalized<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(names.into_iter().map(|m| m.as_ref().to_uppercase()).collect())
    }
}

impl From<&str> for Methods {
    fn from(name: &str) -> Self {
        Self::normalized([name])
    }
}

impl From<String> for Methods {
    fn from(name: String) -> Self {
        Self::normalized([name])
    }
}

impl From<Method> for Methods {
    fn from(method: Method) -> Self {
        Self(vec![method.as_str().to_owned()])
    }
}

impl From<Vec<String>> for Methods {
    fn from(names: Vec<String>) -> Self {
        Self::normalized(names)
    }
}

impl From<&[&str]> for Methods {
    fn from(names: &[&str]) -> Self {
        Self::normalized(names)
    }
}

impl<const N: usize> From<[&str; N]> for Methods {
    fn from(names: [&str; N]) -> Self {
        Self::normalized(names)
    }
}

impl<const N: usize> From<[Method; N]> for Methods {
    fn from(methods: [Method; N]) -> Self {
        Self::normalized(methods.iter().map(|m| m.as_str()))
    }
}
