//! Cardápio Router module
//!
//! This module provides the routing and HTTP infrastructure for the service.
//! It allows for:
//!
//! - Method, path and parameter-based routing of HTTP endpoints
//! - Global middleware (pre and post)
//! - Serving the route table through an axum server on a tokio listener
//!
//! The route table can also be driven directly through [`Router::dispatch`],
//! without opening a socket.
use crate::orm::Db;
use crate::settings::Settings;
pub use axum::body::Bytes;
use axum::http::{HeaderName, HeaderValue, StatusCode, Uri};
pub use axum::http::Method;
use axum::response::IntoResponse;
use futures::FutureExt;
use futures::future::BoxFuture;
use serde::Serialize;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Db>,
    pub settings: Settings,
}

/// Represents the outcome of an HTTP handler.
/// Supports plain text, JSON, and custom status/headers.
#[derive(Debug)]
pub struct Response {
    pub status_code: u16,
    pub body: String,
    pub headers: HashMap<String, String>,
}

impl Response {
    /// Construct a new HTTP 200 response with a text body.
    pub fn ok(body: impl Into<String>) -> Self {
        Response {
            status_code: 200,
            body: body.into(),
            headers: HashMap::new(),
        }
    }

    /// Construct a new HTTP 404 "not found" response.
    pub fn not_found() -> Self {
        Self::detail("Not Found", 404)
    }

    /// The path exists but not for this method.
    pub fn method_not_allowed() -> Self {
        Self::detail("Method Not Allowed", 405)
    }

    pub fn internal_error() -> Self {
        Self::detail("Internal Server Error", 500)
    }

    fn detail(detail: &str, status_code: u16) -> Self {
        Self::json(
            serde_json::json!({ "detail": detail }),
            status_code,
            HashMap::new(),
        )
    }

    /// Construct a new HTTP JSON response.
    /// Accepts any serde-serializable payload, status, and custom headers.
    pub fn json<T: Serialize>(
        data: T,
        status_code: u16,
        mut headers: HashMap<String, String>,
    ) -> Self {
        headers.insert(
            "Content-Type".to_string(),
            "application/json; charset=utf-8".to_string(),
        );
        match serde_json::to_string(&data) {
            Ok(body) => Response {
                status_code,
                body,
                headers,
            },
            Err(e) => {
                log::error!("Response serialization failed: {}", e);
                Response {
                    status_code: 500,
                    body: "{\"detail\": \"Serialization failed\"}".to_string(),
                    headers,
                }
            }
        }
    }
}

impl IntoResponse for Response {
    fn into_response(self) -> axum::response::Response {
        let status =
            StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let mut response = (status, self.body).into_response();
        for (key, value) in self.headers {
            match (
                HeaderName::try_from(key.as_str()),
                HeaderValue::try_from(value.as_str()),
            ) {
                (Ok(name), Ok(value)) => {
                    response.headers_mut().insert(name, value);
                }
                _ => log::warn!("Dropping invalid response header `{}`", key),
            }
        }
        response
    }
}

/// What a handler gets to see of the incoming request.
pub struct Request {
    pub params: HashMap<String, String>,
    pub body: Bytes,
}

/// Holds metadata about the current HTTP request and its extracted path parameters.
/// Middleware can modify/read this context.
pub struct RequestContext {
    pub method: Method,
    pub path: String,
    pub params: HashMap<String, String>,
    pub start_time: Option<Instant>,
}

/// Type alias for async handler functions for HTTP routes.
pub type Handler = Arc<dyn Fn(Request, AppState) -> BoxFuture<'static, Response> + Send + Sync>;

/// Type alias for synchronous, pre-processing middleware executed before the handler.
/// If a middleware returns Some(Response), request handling stops and this response is sent.
pub type Middleware = Arc<dyn Fn(&mut RequestContext) -> Option<Response> + Send + Sync>;

/// Type alias for post-processing middleware executed after the handler.
/// Post-middleware can inspect/modify the response before it is sent.
pub type PostMiddleware = Arc<dyn Fn(&RequestContext, Response) -> Response + Send + Sync>;

/// Wrap an async fn (or closure) into a [`Handler`].
pub fn handler<F, Fut>(f: F) -> Handler
where
    F: Fn(Request, AppState) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
    Arc::new(move |request: Request, state: AppState| f(request, state).boxed())
}

/// Represents a registered HTTP route and its associated handler.
#[derive(Clone)]
pub struct Route {
    pub method: Method,
    pub path_pattern: String,
    pub handler: Handler,
}

/// The main application router.
/// Manages all HTTP routes and global middleware.
#[derive(Clone, Default)]
pub struct Router {
    pub routes: Vec<Route>,
    pub middlewares: Vec<Middleware>,
    pub post_middlewares: Vec<PostMiddleware>,
    pub app_state: Option<AppState>,
}

impl Router {
    /// Create a new, empty application router.
    pub fn new() -> Self {
        Router::default()
    }

    /// Register an HTTP route for `method` and a path pattern such as `/pratos/:id`.
    pub fn add_route(&mut self, method: Method, path_pattern: &str, handler: Handler) {
        self.routes.push(Route {
            method,
            path_pattern: path_pattern.to_string(),
            handler,
        });
    }

    /// Add a global pre-middleware to be run before all HTTP handlers.
    pub fn add_middleware<F>(&mut self, middleware: F)
    where
        F: Fn(&mut RequestContext) -> Option<Response> + Send + Sync + 'static,
    {
        self.middlewares.push(Arc::new(middleware));
    }

    /// Add a post-middleware to be run after each request, including short-circuited ones.
    pub fn add_post_middleware<F>(&mut self, middleware: F)
    where
        F: Fn(&RequestContext, Response) -> Response + Send + Sync + 'static,
    {
        self.post_middlewares.push(Arc::new(middleware));
    }

    pub fn set_app_state(&mut self, state: AppState) {
        self.app_state = Some(state);
    }

    /// Run one request through middleware, routing and the matched handler.
    pub async fn dispatch(&self, method: Method, path: &str, body: Bytes) -> Response {
        let mut ctx = RequestContext {
            method,
            path: path.to_string(),
            params: HashMap::new(),
            start_time: None,
        };

        let mut response = self.handle(&mut ctx, body).await;
        for post_middleware in &self.post_middlewares {
            response = (post_middleware)(&ctx, response);
        }
        response
    }

    async fn handle(&self, ctx: &mut RequestContext, body: Bytes) -> Response {
        for middleware in &self.middlewares {
            if let Some(response) = (middleware)(ctx) {
                return response;
            }
        }

        let mut path_matched = false;
        for route in &self.routes {
            let Some(params) = match_path(&route.path_pattern, &ctx.path) else {
                continue;
            };
            if route.method != ctx.method {
                path_matched = true;
                continue;
            }
            let Some(state) = self.app_state.clone() else {
                log::error!("App state not set in Router");
                return Response::internal_error();
            };
            ctx.params = params;
            let request = Request {
                params: ctx.params.clone(),
                body,
            };
            return (route.handler)(request, state).await;
        }

        if path_matched {
            Response::method_not_allowed()
        } else {
            Response::not_found()
        }
    }

    /// Mount the route table as the fallback service of an axum router.
    pub fn into_axum(self) -> axum::Router {
        let router = Arc::new(self);
        axum::Router::new().fallback(move |method: Method, uri: Uri, body: Bytes| {
            let router = router.clone();
            async move { router.dispatch(method, uri.path(), body).await }
        })
    }

    /// Serve on `settings.host:settings.port` until Ctrl+C or SIGTERM.
    pub async fn run(
        self,
        settings: &Settings,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let addr = format!("{}:{}", settings.host, settings.port);
        let listener = TcpListener::bind(&addr).await?;
        log::info!("HTTP Server running on http://{}", addr);

        axum::serve(listener, self.into_axum())
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        log::info!("HTTP Server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            log::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                log::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => log::info!("Received Ctrl+C, shutting down"),
        _ = terminate => log::info!("Received SIGTERM, shutting down"),
    }
}

/// Register handlers on a router: `route!(router, GET "/pratos" => list_dishes)`.
#[macro_export]
macro_rules! route {
    ($router:expr, $( $method:ident $path:expr => $handler:expr ),* $(,)?) => {
        $(
            $router.add_route(
                $crate::router::Method::$method,
                $path,
                $crate::router::handler($handler),
            );
        )*
    };
}

/// Matches a path pattern (e.g. `/foo/:id`) against a real path,
/// extracting parameters into a HashMap if matched, or None if not.
pub fn match_path(pattern: &str, path: &str) -> Option<HashMap<String, String>> {
    let pattern_parts: Vec<&str> = pattern.trim_matches('/').split('/').collect();
    let path_parts: Vec<&str> = path.trim_matches('/').split('/').collect();

    if pattern_parts.len() != path_parts.len() {
        return None;
    }

    let mut params = HashMap::new();

    for (p, a) in pattern_parts.iter().zip(path_parts.iter()) {
        if let Some(name) = p.strip_prefix(':') {
            params.insert(name.to_string(), a.to_string());
        } else if p != a {
            return None;
        }
    }

    Some(params)
}
