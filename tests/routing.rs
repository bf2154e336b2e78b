use nestrs::axum::body::{Body, to_bytes};
use nestrs::axum::http::{Method, Request};
use nestrs::prelude::*;
use nestrs::routing::{Dispatcher, RecordingTransport};
use nestrs::HttpMethod;
use serde_json::{Value, json};
use tower::ServiceExt;

#[derive(Controller)]
#[controller(base_url = "/users")]
struct UserController {
    #[route("GET /")]
    list: Handler<UserController>,
    #[route("POST /")]
    create: Handler<UserController>,
    #[route("GET /:id")]
    show: Handler<UserController>,
    #[route("DELETE /:id")]
    remove: Handler<UserController>,
    #[route("GET /:id/posts/:post_id")]
    post: Handler<UserController>,
    #[route("GET /export")]
    export: Handler<UserController>,
    #[http("PUT")]
    replace_all: Handler<UserController>,
}

impl UserController {
    fn new() -> Self {
        Self {
            list: |_, _| Reply::list(&["ana", "bia"]),
            create: |_, ctx| {
                ctx.json_with_status(StatusCode::CREATED, &json!({ "created": true }));
                Reply::message("never written")
            },
            show: |_, ctx| Reply::data(&json!({ "id": ctx.param("id") })),
            remove: |_, _| Reply::None,
            post: |_, ctx| {
                Reply::Json(json!({
                    "user": ctx.param("id"),
                    "post": ctx.param("post_id"),
                }))
            },
            export: |_, _| "exported".into(),
            replace_all: |_, _| Reply::message("replaced"),
        }
    }
}

#[derive(Controller)]
struct Unrouted {
    #[route("GET /")]
    list: Handler<Unrouted>,
}

#[derive(Controller)]
#[controller(base_url = "/orders")]
struct OrderController {
    #[route("GET /:order_id")]
    show: Handler<OrderController>,
    #[route("GET /:id/items")]
    items: Handler<OrderController>,
}

#[derive(Controller)]
#[controller(base_url = "/files")]
struct FileController {
    #[route("GET /:id")]
    show: Handler<FileController>,
    #[route("GET /*path")]
    browse: Handler<FileController>,
    #[route("GET /*rest/more")]
    nested: Handler<FileController>,
    #[route("GET /:")]
    unnamed: Handler<FileController>,
    #[route("GET /a{b")]
    braced: Handler<FileController>,
}

impl FileController {
    fn new() -> Self {
        Self {
            show: |_, ctx| Reply::data(&json!({ "id": ctx.param("id") })),
            browse: |_, _| Reply::None,
            nested: |_, _| Reply::None,
            unnamed: |_, _| Reply::None,
            braced: |_, _| Reply::None,
        }
    }
}

#[derive(Controller)]
#[controller(base_url = "/a{b")]
struct BracedBaseController {
    #[route("GET /")]
    list: Handler<BracedBaseController>,
}

fn body(response: &nestrs::ResponseSink) -> Value {
    serde_json::from_slice(response.body()).unwrap()
}

#[test]
fn test_parameterized_routes_register_first() {
    let mut dispatcher = Dispatcher::new(RecordingTransport::new());
    let bound = dispatcher.bind_controller(Arc::new(UserController::new()));

    assert_eq!(bound, 7);
    assert_eq!(
        dispatcher.transport().registrations(),
        vec![
            "GET /users/{id}",
            "DELETE /users/{id}",
            "GET /users/{id}/posts/{post_id}",
            "GET /users",
            "POST /users",
            "GET /users/export",
            "PUT /users",
        ]
    );
}

#[test]
fn test_controller_without_base_url_is_skipped() {
    let mut dispatcher = Dispatcher::new(RecordingTransport::new());
    let unrouted = Unrouted {
        list: |_, _| Reply::None,
    };
    assert_eq!(dispatcher.bind_controller(Arc::new(unrouted)), 0);
    assert_eq!(dispatcher.route_count(), 0);
}

#[test]
fn test_conflicting_parameter_names_are_skipped() {
    let mut dispatcher = Dispatcher::new(RecordingTransport::new());
    let orders = OrderController {
        show: |_, ctx| Reply::message(ctx.param("order_id").unwrap_or_default()),
        items: |_, _| Reply::None,
    };

    assert_eq!(dispatcher.bind_controller(Arc::new(orders)), 1);
    assert_eq!(dispatcher.transport().registrations(), vec!["GET /orders/{order_id}"]);
}

#[test]
fn test_duplicate_routes_across_controllers_bind_once() {
    let mut dispatcher = Dispatcher::new(RecordingTransport::new());
    dispatcher.bind_controller(Arc::new(UserController::new()));

    assert_eq!(dispatcher.bind_controller(Arc::new(UserController::new())), 0);
    assert_eq!(dispatcher.route_count(), 7);
}

#[test]
fn test_handler_observes_path_parameter() {
    let mut dispatcher = Dispatcher::new(RecordingTransport::new());
    dispatcher.bind_controller(Arc::new(UserController::new()));
    let transport = dispatcher.into_transport();

    let response = transport.call(HttpMethod::Get, "/users/7").unwrap();
    assert_eq!(body(&response), json!({ "data": { "id": "7" } }));

    let response = transport.call(HttpMethod::Get, "/users/3/posts/9").unwrap();
    assert_eq!(body(&response), json!({ "user": "3", "post": "9" }));
}

#[test]
fn test_self_written_response_suppresses_reply() {
    let mut dispatcher = Dispatcher::new(RecordingTransport::new());
    dispatcher.bind_controller(Arc::new(UserController::new()));
    let transport = dispatcher.into_transport();

    let created = transport.call(HttpMethod::Post, "/users").unwrap();
    assert_eq!(created.status(), StatusCode::CREATED);
    assert_eq!(body(&created), json!({ "created": true }));

    let listed = transport.call(HttpMethod::Get, "/users").unwrap();
    assert_eq!(body(&listed), json!({ "data": ["ana", "bia"], "count": 2 }));

    let removed = transport.call(HttpMethod::Delete, "/users/1").unwrap();
    assert_eq!(body(&removed), json!({ "message": "No data returned" }));

    let exported = transport.call(HttpMethod::Get, "/users/export").unwrap();
    assert_eq!(body(&exported), json!({ "message": "exported" }));
}

#[test]
fn test_handler_lookup_by_field() {
    let controller = Arc::new(UserController::new());
    assert!(controller.clone().handler("list").is_some());
    assert!(controller.handler("missing").is_none());
}

#[tokio::test]
async fn test_axum_router_dispatches_path_parameters() {
    let mut dispatcher = Dispatcher::axum();
    dispatcher.bind_controller(Arc::new(UserController::new()));
    let router = dispatcher.into_transport().into_router();

    let request = Request::builder()
        .method(Method::GET)
        .uri("/users/42")
        .body(Body::empty())
        .unwrap();
    let response = router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-type"], "application/json");

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(value, json!({ "data": { "id": "42" } }));

    let request = Request::builder()
        .method(Method::PUT)
        .uri("/users")
        .body(Body::empty())
        .unwrap();
    let response = router.oneshot(request).await.unwrap();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(value, json!({ "message": "replaced" }));
}

#[tokio::test]
async fn test_unroutable_templates_are_skipped_by_axum_dispatcher() {
    let mut dispatcher = Dispatcher::axum();

    assert_eq!(dispatcher.bind_controller(Arc::new(FileController::new())), 1);
    let braced = BracedBaseController {
        list: |_, _| Reply::None,
    };
    assert_eq!(dispatcher.bind_controller(Arc::new(braced)), 0);

    let handlers: Vec<&str> = dispatcher.routes().iter().map(|route| route.handler).collect();
    assert_eq!(handlers, vec!["show"]);

    let router = dispatcher.into_transport().into_router();
    let request = Request::builder().uri("/files/7").body(Body::empty()).unwrap();
    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(value, json!({ "data": { "id": "7" } }));
}

#[test]
fn test_dependency_tree_marks_skipped_routes() {
    let registry = Arc::new(ModuleRegistry::new());
    registry.register_module(
        ModuleDescriptor::builder("OrderModule")
            .controller(OrderController {
                show: |_, _| Reply::None,
                items: |_, _| Reply::None,
            })
            .build(),
    );
    let tree = Application::new(registry).dependency_tree();

    let show = tree.find_route("OrderModule", "OrderController", "show").unwrap();
    assert_eq!(show.data["status"], "registered");
    let items = tree.find_route("OrderModule", "OrderController", "items").unwrap();
    assert_eq!(items.data["status"], "skipped");
    assert_eq!(tree.route_count(), 2);
}

#[tokio::test]
async fn test_server_starts_and_shuts_down() {
    let registry = Arc::new(ModuleRegistry::new());
    registry.register_module(
        ModuleDescriptor::builder("UserModule")
            .controller(UserController::new())
            .build(),
    );

    let server = Application::new(registry).start("127.0.0.1:0").await.unwrap();
    assert_ne!(server.local_addr().port(), 0);
    server.shutdown().await.unwrap();
}
