//! Handler trait, type erasure, and the callback shapes a route accepts.
//!
//! # How async handlers are stored
//!
//! A route table holds handlers of *different* types in one `Vec<Route>`,
//! so each handler is hidden behind a trait object (`dyn ErasedHandler`):
//!
//! ```text
//! async fn show(req: Request) -> Response { … }    ← user writes this
//!        ↓ Callback::handler(show)
//! show.into_boxed_handler()                       ← Handler blanket impl
//!        ↓
//! Arc::new(FnHandler(show))                       ← stored as BoxedHandler
//!        ↓
//! handler.call(req) at request time               ← one vtable dispatch
//! ```
//!
//! # Named callbacks
//!
//! A route table written as data cannot hold a function value, so a callback
//! may also be a `"Name@method"` [`Target`]. The router resolves it against
//! handlers registered under that name before it accepts the route.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::error::Error;
use crate::request::Request;
use crate::response::{IntoResponse, Response};

/// A heap-allocated, type-erased future that resolves to a [`Response`].
pub(crate) type BoxFuture = Pin<Box<dyn Future<Output = Response> + Send + 'static>>;

/// Internal dispatch interface.
///
/// `#[doc(hidden)] pub` because it appears in the return type of
/// [`Handler::into_boxed_handler`].
#[doc(hidden)]
pub trait ErasedHandler {
    fn call(&self, req: Request) -> BoxFuture;
}

/// A type-erased handler shared across concurrent requests.
#[doc(hidden)]
pub type BoxedHandler = Arc<dyn ErasedHandler + Send + Sync + 'static>;

/// Implemented for every valid route handler:
///
/// ```text
/// async fn name(req: Request) -> impl IntoResponse
/// ```
///
/// Sealed: only the blanket impl below satisfies it.
pub trait Handler: private::Sealed + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_boxed_handler(self) -> BoxedHandler;
}

mod private {
    pub trait Sealed {}
}

impl<F, Fut, R> private::Sealed for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
}

impl<F, Fut, R> Handler for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn into_boxed_handler(self) -> BoxedHandler {
        Arc::new(FnHandler(self))
    }
}

struct FnHandler<F>(F);

impl<F, Fut, R> ErasedHandler for FnHandler<F>
where
    F: Fn(Request) -> Fut + Send + Sync,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn call(&self, req: Request) -> BoxFuture {
        let fut = (self.0)(req);
        Box::pin(async move { fut.await.into_response() })
    }
}

// ── Target ────────────────────────────────────────────────────────────────────

/// A `"Name@method"` reference, split once when the route table is built.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Target {
    name: String,
    method: String,
}

impl Target {
    /// Splits `"Name@method"`. Both halves must be non-empty and the string
    /// must contain exactly one `@`.
    pub fn parse(s: &str) -> Result<Self, Error> {
        match s.split_once('@') {
            Some((name, method))
                if !name.is_empty() && !method.is_empty() && !method.contains('@') =>
            {
                Ok(Self { name: name.to_owned(), method: method.to_owned() })
            }
            _ => Err(Error::InvalidCallback(s.to_owned())),
        }
    }

    pub fn name(&self) -> &str { &self.name }
    pub fn method(&self) -> &str { &self.method }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.method)
    }
}

// ── Callback ──────────────────────────────────────────────────────────────────

/// What a route dispatches to once it has matched and its filters passed.
#[derive(Clone)]
pub enum Callback {
    /// A handler value.
    Handler(BoxedHandler),
    /// A handler registered on the router under `Name@method`.
    Named(Target),
}

impl Callback {
    pub fn handler(handler: impl Handler) -> Self {
        Self::Handler(handler.into_boxed_handler())
    }

    /// # Errors
    ///
    /// [`Error::InvalidCallback`] unless `target` has the `Name@method` shape.
    pub fn named(target: &str) -> Result<Self, Error> {
        Target::parse(target).map(Self::Named)
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Handler(_) => f.write_str("Handler(..)"),
            Self::Named(target) => write!(f, "Named({target})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_splits_on_the_at_sign() {
        let target = Target::parse("Users@show").unwrap();
        assert_eq!(target.name(), "Users");
        assert_eq!(target.method(), "show");
        assert_eq!(target.to_string(), "Users@show");
    }

    #[test]
    fn malformed_targets_are_rejected() {
        for bad in ["Users", "@show", "Users@", "A@b@c", ""] {
            assert!(
                matches!(Target::parse(bad), Err(Error::InvalidCallback(ref s)) if s == bad),
                "{bad:?} should be rejected"
            );
        }
    }
}
