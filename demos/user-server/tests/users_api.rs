use nestrs::axum::Router;
use nestrs::axum::body::{Body, to_bytes};
use nestrs::axum::http::{HeaderMap, Method, Request, StatusCode};
use nestrs::prelude::*;
use serde_json::{Value, json};
use tower::ServiceExt;
use user_server::{FakeDatabase, UserModule};

fn app() -> Application {
    let registry = Arc::new(ModuleRegistry::new());
    assert!(UserModule::register(&registry));
    Application::new(registry)
}

async fn send(
    router: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, HeaderMap, Value) {
    let body = body.map(|value| Body::from(value.to_string())).unwrap_or_else(Body::empty);
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(body)
        .unwrap();

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, headers, value)
}

fn ids(body: &Value) -> Vec<u64> {
    body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|user| user["id"].as_u64().unwrap())
        .collect()
}

#[tokio::test]
async fn test_list_then_delete_then_list() {
    let router = app().bootstrap().unwrap().router;

    let (status, _, body) = send(&router, Method::GET, "/users", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 3);
    assert_eq!(ids(&body), vec![1, 2, 3]);

    let (status, _, body) = send(&router, Method::DELETE, "/users/2", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "message": "User deleted successfully", "status": "success" })
    );

    let (_, _, body) = send(&router, Method::GET, "/users", None).await;
    assert_eq!(body["count"], 2);
    assert_eq!(ids(&body), vec![1, 3]);

    let (status, _, body) = send(&router, Method::DELETE, "/users/2", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "User not found or delete failed" }));
}

#[tokio::test]
async fn test_get_user_by_path_parameter() {
    let router = app().bootstrap().unwrap().router;

    let (status, _, body) = send(&router, Method::GET, "/users/2", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Maria Santos");

    let (status, _, body) = send(&router, Method::GET, "/users/42", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "User not found" }));

    let (status, _, body) = send(&router, Method::GET, "/users/abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Invalid user ID" }));
}

#[tokio::test]
async fn test_create_and_patch_user() {
    let router = app().bootstrap().unwrap().router;

    let (status, _, body) = send(
        &router,
        Method::POST,
        "/users",
        Some(json!({ "name": "Ana Lima", "email": "ana@example.com", "age": 28 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "success");
    assert_eq!(body["data"]["id"], 4);

    let patch = Some(json!({ "age": 29 }));
    let (status, _, body) = send(&router, Method::PATCH, "/users/4", patch).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["age"], 29);
    assert_eq!(body["data"]["name"], "Ana Lima");

    let (status, _, body) = send(&router, Method::POST, "/users", Some(json!({ "name": 1 }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Invalid request body" }));
}

#[tokio::test]
async fn test_head_and_options() {
    let router = app().bootstrap().unwrap().router;

    let (status, headers, _) = send(&router, Method::HEAD, "/users", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers["x-total-count"], "3");

    let (status, headers, _) = send(&router, Method::OPTIONS, "/users", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers["allow"], "GET, POST, PUT, PATCH, DELETE, HEAD, OPTIONS");
}

#[tokio::test]
async fn test_service_shares_the_registered_database() {
    let app = app();
    let router = app.bootstrap().unwrap().router;

    let database = app
        .container()
        .resolve::<FakeDatabase>("FakeDatabase")
        .unwrap();
    database.create_user("Direct Insert", "direct@example.com", 0);

    let (_, _, body) = send(&router, Method::GET, "/users", None).await;
    assert_eq!(body["count"], 4);
}

#[test]
fn test_dependency_tree_lists_every_route() {
    let tree = app().dependency_tree();

    assert_eq!(tree.route_count(), 8);
    assert_eq!(tree.module_dependencies("UserModule"), vec!["UserController"]);

    let route = tree
        .find_route("UserModule", "UserController", "get_user")
        .unwrap();
    assert_eq!(route.data["httpMethod"], "GET");
    assert_eq!(route.data["path"], "/users/:id");
    assert_eq!(route.data["status"], "registered");

    let service = tree.find_service("UserModule", "UserService").unwrap();
    assert_eq!(service.data["description"], "UserService manages user operations");
    assert!(tree.find_service("UserModule", "FakeDatabase").is_some());
}
