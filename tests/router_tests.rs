use axum::response::IntoResponse;
use cardapio::router::*;
use serde_json::{Value, json};
use std::collections::HashMap;

fn dummy_router() -> Router {
    let mut router = Router::new();
    router.add_route(
        Method::GET,
        "/hello",
        handler(|_req, _state| async { Response::ok("hello") }),
    );
    router
}

// ========== Response struct (JSON, text) ==========

#[test]
fn test_response_ok() {
    let resp = Response::ok("hello world");
    assert_eq!(resp.status_code, 200);
    assert_eq!(resp.body, "hello world");
    assert!(resp.headers.is_empty());
}

#[test]
fn test_response_not_found_is_json_detail() {
    let resp = Response::not_found();
    assert_eq!(resp.status_code, 404);
    let body: Value = serde_json::from_str(&resp.body).unwrap();
    assert_eq!(body, json!({"detail": "Not Found"}));
}

#[test]
fn test_response_method_not_allowed() {
    let resp = Response::method_not_allowed();
    assert_eq!(resp.status_code, 405);
    assert!(resp.body.contains("Method Not Allowed"));
}

#[test]
fn test_response_json_success() {
    let mut headers = HashMap::new();
    headers.insert("X-Test".into(), "yes".into());
    let resp = Response::json(json!({"foo": "bar"}), 201, headers);
    assert_eq!(resp.status_code, 201);
    assert_eq!(
        resp.headers.get("Content-Type").unwrap(),
        "application/json; charset=utf-8"
    );
    assert_eq!(resp.headers.get("X-Test").unwrap(), "yes");
    assert!(resp.body.contains("\"foo\":\"bar\""));
}

use serde::{Serialize, Serializer};

struct AlwaysFailsSerialize;

impl Serialize for AlwaysFailsSerialize {
    fn serialize<S>(&self, _serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        Err(serde::ser::Error::custom("Forced failure"))
    }
}

#[test]
fn test_response_json_error_branch_always_fails() {
    let mut headers = HashMap::new();
    headers.insert("Test-Head".to_string(), "Y".to_string());
    let resp = Response::json(AlwaysFailsSerialize, 200, headers);
    assert_eq!(resp.status_code, 500);
    assert!(resp.body.contains("Serialization failed"));
    assert_eq!(
        resp.headers.get("Content-Type").unwrap(),
        "application/json; charset=utf-8"
    );
    assert_eq!(resp.headers.get("Test-Head").unwrap(), "Y");
}

#[test]
fn test_into_axum_response_keeps_status_and_headers() {
    let mut headers = HashMap::new();
    headers.insert("X-Test".into(), "yes".into());
    headers.insert("bad header".into(), "ignored".into());
    let resp = Response::json(json!({"a": 1}), 404, headers).into_response();
    assert_eq!(resp.status().as_u16(), 404);
    assert_eq!(resp.headers()["x-test"], "yes");
    assert_eq!(
        resp.headers()["content-type"],
        "application/json; charset=utf-8"
    );
    assert!(!resp.headers().contains_key("bad header"));
}

// ========== Path matching ==========

#[test]
fn test_match_path_static() {
    assert!(match_path("/foo", "/foo").is_some());
    let params = match_path("/pratos/:id", "/pratos/99").unwrap();
    assert_eq!(params.get("id").unwrap(), "99");
    assert!(match_path("/a/b", "/a").is_none());
    assert!(match_path("/foo/bar", "/foo/qux").is_none());
}

#[test]
fn test_match_path_ignores_surrounding_slashes() {
    assert!(match_path("/pratos", "/pratos/").is_some());
    assert!(match_path("/pratos/:id", "pratos/7").is_some());
}

#[test]
fn test_match_path_non_matching() {
    assert!(match_path("/x/:id", "/y/42").is_none());
    assert!(match_path("/items/:type/:id", "/items/book").is_none());
    assert!(match_path("/only", "/only/extra").is_none());
}

// ========== Dispatch ==========

#[tokio::test]
async fn test_dispatch_unknown_path_is_404() {
    let router = dummy_router();
    let resp = router.dispatch(Method::GET, "/nope", Bytes::new()).await;
    assert_eq!(resp.status_code, 404);
}

#[tokio::test]
async fn test_dispatch_wrong_method_is_405() {
    let router = dummy_router();
    let resp = router.dispatch(Method::POST, "/hello", Bytes::new()).await;
    assert_eq!(resp.status_code, 405);
}

#[tokio::test]
async fn test_dispatch_without_app_state_is_500() {
    let router = dummy_router();
    let resp = router.dispatch(Method::GET, "/hello", Bytes::new()).await;
    assert_eq!(resp.status_code, 500);
    assert!(resp.body.contains("Internal Server Error"));
}

#[tokio::test]
async fn test_pre_middleware_short_circuits_and_post_middleware_still_runs() {
    let mut router = dummy_router();
    router.add_middleware(|ctx| {
        if ctx.path == "/hello" {
            Some(Response::ok("blocked"))
        } else {
            None
        }
    });
    router.add_post_middleware(|ctx, mut resp| {
        resp.body = format!("{}+{}", resp.body, ctx.method);
        resp
    });

    let resp = router.dispatch(Method::GET, "/hello", Bytes::new()).await;
    assert_eq!(resp.status_code, 200);
    assert_eq!(resp.body, "blocked+GET");
}

#[tokio::test]
async fn test_post_middleware_chain_order() {
    let mut router = Router::new();
    router.add_middleware(|_ctx| Some(Response::ok("abc")));
    router.add_post_middleware(|_ctx, mut r| {
        r.body.push('1');
        r
    });
    router.add_post_middleware(|_ctx, mut r| {
        r.body.push('2');
        r
    });

    let resp = router.dispatch(Method::GET, "/a", Bytes::new()).await;
    assert_eq!(resp.body, "abc12");
}

#[tokio::test]
async fn test_pre_middleware_sees_request_context() {
    let mut router = Router::new();
    router.add_middleware(|ctx| {
        ctx.start_time = Some(std::time::Instant::now());
        None
    });
    router.add_post_middleware(|ctx, mut r| {
        r.body = format!("{} {} {}", ctx.method, ctx.path, ctx.start_time.is_some());
        r
    });

    let resp = router.dispatch(Method::DELETE, "/x/1", Bytes::new()).await;
    assert_eq!(resp.status_code, 404);
    assert_eq!(resp.body, "DELETE /x/1 true");
}

#[test]
fn test_route_macro_registers_methods_and_paths() {
    async fn noop(_req: Request, _state: AppState) -> Response {
        Response::ok("")
    }

    let mut router = Router::new();
    cardapio::route!(router,
        GET "/a" => noop,
        DELETE "/a/:id" => noop,
    );
    assert_eq!(router.routes.len(), 2);
    assert_eq!(router.routes[0].method, Method::GET);
    assert_eq!(router.routes[0].path_pattern, "/a");
    assert_eq!(router.routes[1].method, Method::DELETE);
    assert_eq!(router.routes[1].path_pattern, "/a/:id");
}
