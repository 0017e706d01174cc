//! Filter chain execution.
//!
//! A matched route's filters run in the order the route's `before` list names them.
//! The first filter that does not pass ends the chain; the filters after it
//! never run.

use tracing::{debug, warn};

use crate::filter::{FilterCallback, FilterRegistry};
use crate::handler::Target;
use crate::route::MatchedRoute;

/// Why a filter chain let a request through or turned it away.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum FilterOutcome {
    /// Every filter passed, or the route has none.
    Passed,
    /// The filter ran and returned `false`.
    Rejected { filter: String },
    /// The route lists a filter name the registry does not know.
    Unregistered { filter: String },
    /// A `Class@method` filter whose class or method is not registered.
    Unresolved { filter: String, target: String },
}

impl FilterOutcome {
    pub fn is_passed(&self) -> bool {
        matches!(self, Self::Passed)
    }

    /// The filter that stopped the chain.
    pub fn filter(&self) -> Option<&str> {
        match self {
            Self::Passed => None,
            Self::Rejected { filter }
            | Self::Unregistered { filter }
            | Self::Unresolved { filter, .. } => Some(filter),
        }
    }
}

/// Runs `matched`'s filters against `registry`.
pub fn run(matched: &MatchedRoute<'_>, registry: &FilterRegistry) -> FilterOutcome {
    for name in matched.filters() {
        let callback = match registry.get(name) {
            None => {
                debug!(filter = %name, pattern = matched.pattern(), "unregistered filter");
                return FilterOutcome::Unregistered { filter: name.clone() };
            }
            Some(None) => continue,
            Some(Some(callback)) => callback,
        };

        let passed = match callback {
            FilterCallback::Func(f) => f(matched),
            FilterCallback::Named(target) => match invoke_class(target, matched, registry) {
                Some(passed) => passed,
                None => {
                    warn!(filter = %name, %target, "filter target could not be resolved");
                    return FilterOutcome::Unresolved {
                        filter: name.clone(),
                        target: target.to_string(),
                    };
                }
            },
        };

        if !passed {
            debug!(filter = %name, uri = matched.uri(), "filter rejected request");
            return FilterOutcome::Rejected { filter: name.clone() };
        }
    }

    FilterOutcome::Passed
}

/// Builds the target's class for this request and calls the method on it.
/// `None` when the class or the method does not exist.
fn invoke_class(target: &Target, matched: &MatchedRoute<'_>, registry: &FilterRegistry) -> Option<bool> {
    let factory = registry.class(target.name())?;
    factory(matched).call(target.method())
}
