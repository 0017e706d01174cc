//! Minimal pathgate example — a route table with filters, part code, part TOML.
//!
//! Run with:
//!   RUST_LOG=pathgate=debug cargo run --example basic
//!
//! Try:
//!   curl -i http://localhost:3000/users/42
//!   curl -i http://localhost:3000/posts
//!   curl -i http://localhost:3000/posts/7
//!   curl -i http://localhost:3000/admin/users                # 403, filtered
//!   curl -i -H 'x-role: admin' http://localhost:3000/admin/users
//!   curl -i -H 'x-role: staff' http://localhost:3000/admin/reports  # 403
//!   curl -i -X POST http://localhost:3000/users -d '{"name":"alice"}'

use pathgate::{
    Config, FilterInstance, MatchedRoute, Method, Request, Response, Router, Server, StatusCode,
};
use tracing_subscriber::EnvFilter;

const ROUTES: &str = include_str!("routes.toml");

#[tokio::main]
async fn main() -> Result<(), pathgate::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config: Config = ROUTES.parse()?;

    let mut app = Router::new()
        .on(Method::Get, "/users/:num", get_user)
        .handler("Posts@index", list_posts)
        .handler("Admin@section", admin_section)
        .handler("Users@create", create_user);

    app.filters_mut()
        .register_fn("json", |route: &MatchedRoute<'_>| route.method() != "POST" || !route.uri().contains('?'))
        .register_class("Role", |route: &MatchedRoute<'_>| -> Box<dyn FilterInstance> {
            Box::new(Role {
                role: route.header("x-role").unwrap_or_default().to_owned(),
                section: route.param(0).unwrap_or_default().to_owned(),
            })
        });

    let app = config.apply(app)?;

    Server::from_config(&config.server).serve(app).await
}

// Staff may read any admin section except reports; admins may read all.
struct Role {
    role: String,
    section: String,
}

impl FilterInstance for Role {
    fn call(&self, method: &str) -> Option<bool> {
        match method {
            "staff" => Some(match self.role.as_str() {
                "admin" => true,
                "staff" => self.section != "reports",
                _ => false,
            }),
            _ => None,
        }
    }
}

// GET /users/:num
async fn get_user(req: Request) -> Response {
    let id = req.param(0).unwrap_or("unknown");
    Response::json(format!(r#"{{"id":"{id}","name":"alice"}}"#).into_bytes())
}

// GET /posts(/:num)
async fn list_posts(req: Request) -> Response {
    match req.param(0) {
        Some(page) => Response::text(format!("posts, page {page}")),
        None => Response::text("posts, first page"),
    }
}

// GET /admin/:any
async fn admin_section(req: Request) -> Response {
    Response::text(format!("admin section {}", req.param(0).unwrap_or("?")))
}

// POST /users
async fn create_user(req: Request) -> Response {
    if req.body().is_empty() {
        return Response::status(StatusCode::BAD_REQUEST);
    }

    Response::builder()
        .status(StatusCode::CREATED)
        .header("location", "/users/99")
        .json(br#"{"id":"99","name":"new_user"}"#.to_vec())
}
