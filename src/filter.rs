//! Named pre-dispatch filters.
//!
//! A [`FilterRegistry`] is built once while the application starts and then
//! handed to the [`Router`](crate::Router); nothing about it is global. It
//! maps a filter name to what should run when a route lists that name in its
//! `before` list:
//!
//! - a closure that receives the [`MatchedRoute`] and returns `true` to let
//!   the request through;
//! - a `"Class@method"` target: the registered class factory builds a
//!   [`FilterInstance`] from the matched route, and `method` is called on it;
//! - nothing at all: the name is declared, and the filter always passes.
//!
//! ```rust
//! use pathgate::{FilterInstance, FilterRegistry, MatchedRoute};
//!
//! struct Owner { user_id: Option<String> }
//!
//! impl FilterInstance for Owner {
//!     fn call(&self, method: &str) -> Option<bool> {
//!         match method {
//!             "check" => Some(self.user_id.as_deref() == Some("1")),
//!             _ => None,
//!         }
//!     }
//! }
//!
//! let mut filters = FilterRegistry::new();
//! filters.register_fn("json", |route: &MatchedRoute<'_>| !route.uri().ends_with(".xml"));
//! filters.register_class("Owner", |route: &MatchedRoute<'_>| -> Box<dyn FilterInstance> {
//!     Box::new(Owner { user_id: route.param(0).map(str::to_owned) })
//! });
//! filters.register_named("owner", "Owner@check")?;
//! filters.declare("csrf");
//! # Ok::<(), pathgate::Error>(())
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::Error;
use crate::handler::Target;
use crate::route::MatchedRoute;

/// A filter closure. Returns `false` to turn the request away.
pub type FilterFn = Arc<dyn Fn(&MatchedRoute<'_>) -> bool + Send + Sync + 'static>;

/// Builds a [`FilterInstance`] for one matched request.
pub type FilterFactory =
    Arc<dyn Fn(&MatchedRoute<'_>) -> Box<dyn FilterInstance> + Send + Sync + 'static>;

/// An object built per request for `"Class@method"` filters.
pub trait FilterInstance {
    /// Runs `method`. `None` means this class has no such method.
    fn call(&self, method: &str) -> Option<bool>;
}

/// What a registered filter name resolves to.
#[derive(Clone)]
pub enum FilterCallback {
    Func(FilterFn),
    Named(Target),
}

impl FilterCallback {
    pub fn func<F>(f: F) -> Self
    where
        F: Fn(&MatchedRoute<'_>) -> bool + Send + Sync + 'static,
    {
        Self::Func(Arc::new(f))
    }

    /// # Errors
    ///
    /// [`Error::InvalidCallback`] unless `target` has the `Class@method` shape.
    pub fn named(target: &str) -> Result<Self, Error> {
        Target::parse(target).map(Self::Named)
    }
}

impl fmt::Debug for FilterCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Func(_) => f.write_str("Func(..)"),
            Self::Named(target) => write!(f, "Named({target})"),
        }
    }
}

/// Filter name → callback, plus the class factories `Class@method`
/// callbacks resolve through.
#[derive(Clone, Default)]
pub struct FilterRegistry {
    filters: HashMap<String, Option<FilterCallback>>,
    classes: HashMap<String, FilterFactory>,
}

impl FilterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `name`, replacing any earlier registration.
    pub fn register(&mut self, name: impl Into<String>, callback: FilterCallback) -> &mut Self {
        self.filters.insert(name.into(), Some(callback));
        self
    }

    pub fn register_fn<F>(&mut self, name: impl Into<String>, f: F) -> &mut Self
    where
        F: Fn(&MatchedRoute<'_>) -> bool + Send + Sync + 'static,
    {
        self.register(name, FilterCallback::func(f))
    }

    /// # Errors
    ///
    /// [`Error::InvalidCallback`] unless `target` has the `Class@method` shape.
    pub fn register_named(
        &mut self,
        name: impl Into<String>,
        target: &str,
    ) -> Result<&mut Self, Error> {
        let callback = FilterCallback::named(target)?;
        Ok(self.register(name, callback))
    }

    /// Registers `name` without a callback. Routes may list it; it always passes.
    pub fn declare(&mut self, name: impl Into<String>) -> &mut Self {
        self.filters.insert(name.into(), None);
        self
    }

    /// Registers the factory `Class@method` filters with this class name use.
    pub fn register_class<F>(&mut self, class: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn(&MatchedRoute<'_>) -> Box<dyn FilterInstance> + Send + Sync + 'static,
    {
        self.classes.insert(class.into(), Arc::new(factory));
        self
    }

    /// `None` when the name is unregistered; `Some(None)` when it is declared
    /// without a callback.
    pub fn get(&self, name: &str) -> Option<Option<&FilterCallback>> {
        self.filters.get(name).map(Option::as_ref)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.filters.contains_key(name)
    }

    /// Every registered filter.
    pub fn available(&self) -> &HashMap<String, Option<FilterCallback>> {
        &self.filters
    }

    pub(crate) fn class(&self, name: &str) -> Option<&FilterFactory> {
        self.classes.get(name)
    }
}

impl fmt::Debug for FilterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut classes: Vec<_> = self.classes.keys().collect();
        classes.sort();
        f.debug_struct("FilterRegistry")
            .field("filters", &self.filters)
            .field("classes", &classes)
            .finish()
    }
}
