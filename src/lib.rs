//! # pathgate
//!
//! Pattern routing with ordered pre-dispatch filters, served over hyper.
//!
//! A route is a set of methods, a pattern, a callback and a list of named
//! filters. Requests are matched against routes in registration order; the
//! first match runs its filters, and only when every filter passes does the
//! callback run.
//!
//! ## Patterns
//!
//! | Pattern | Matches | Parameters |
//! |---|---|---|
//! | `/about` | `/about` | none |
//! | `/users/:num` | `/users/42`, `/users/-1` | `["42"]` |
//! | `/blog/:any` | `/blog/hello-world` | `["hello-world"]` |
//! | `/files/:all` | `/files/a/b.txt` | `["a/b.txt"]` |
//! | `/posts(/:num)` | `/posts`, `/posts/5` | `[]`, `["5"]` |
//!
//! The router matches the path only; the query string is left to filters.
//! Placeholder patterns match case-insensitively, literal ones exactly.
//! Parameters are positional and reach handlers as [`Request::param`].
//!
//! ## Filters
//!
//! Filters are registered by name on a [`FilterRegistry`] and listed on a
//! route as `"auth|admin"`. They run in that order; the first one that says
//! no ends the request with `403 Forbidden`. A request no route matches gets
//! `404 Not Found`.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use pathgate::{MatchedRoute, Method, Request, Response, Router, Server, StatusCode};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), pathgate::Error> {
//!     let app = Router::new()
//!         .filter_fn("auth", |route: &MatchedRoute<'_>| route.header("authorization").is_some())
//!         .on(Method::Get, "/users/:num", get_user)
//!         .handler("Users@create", create_user)
//!         .route_with(Method::Post, "/users", "Users@create", "auth")?;
//!
//!     Server::bind("0.0.0.0:3000").serve(app).await
//! }
//!
//! async fn get_user(req: Request) -> Response {
//!     let id = req.param(0).unwrap_or("unknown");
//!     Response::json(format!(r#"{{"id":"{id}"}}"#).into_bytes())
//! }
//!
//! async fn create_user(req: Request) -> Response {
//!     if req.body().is_empty() {
//!         return Response::status(StatusCode::BAD_REQUEST);
//!     }
//!     Response::builder()
//!         .status(StatusCode::CREATED)
//!         .header("location", "/users/99")
//!         .json(br#"{"id":"99"}"#.to_vec())
//! }
//! ```

mod chain;
mod config;
mod error;
mod filter;
mod handler;
mod method;
mod request;
mod response;
mod route;
mod router;
mod server;

pub mod pattern;

pub use chain::FilterOutcome;
pub use config::{Config, FilterConfig, MethodList, OptionalPair, RouteConfig, RoutingConfig, ServerConfig};
pub use error::Error;
pub use filter::{FilterCallback, FilterFactory, FilterFn, FilterInstance, FilterRegistry};
pub use handler::{Callback, Handler, Target};
pub use http::StatusCode;
pub use method::{ANY, Method, Methods};
pub use pattern::Optionals;
pub use request::Request;
pub use response::{ContentType, IntoResponse, Response, ResponseBuilder};
pub use route::{MatchedRoute, Route, RouteOptions};
pub use router::{Resolution, Router};
pub use server::Server;
