//! RemoteStateClient against an in-process HTTP stub

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use floor_client::{
    ClientConfig, ErrorKind, FloorBackend, Notice, Notifier, RemoteStateClient, TableSynchronizer,
};
use parking_lot::Mutex;
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;

async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn client(base_url: &str) -> RemoteStateClient {
    RemoteStateClient::new(&ClientConfig::new(base_url)).unwrap()
}

type Bodies = Arc<Mutex<Vec<Value>>>;

async fn record(State(bodies): State<Bodies>, Json(body): Json<Value>) -> impl IntoResponse {
    bodies.lock().push(body.clone());
    Json(body)
}

#[derive(Default)]
struct Notices(Mutex<Vec<Notice>>);

impl Notifier for Notices {
    fn notify(&self, notice: Notice) {
        self.0.lock().push(notice);
    }
}

#[tokio::test]
async fn test_vacate_surfaces_backend_detail() {
    let app = Router::new().route(
        "/tables/{id}/leave",
        put(|Path(_id): Path<String>| async {
            (
                StatusCode::BAD_REQUEST,
                Json(json!({ "detail": "Table not occupied" })),
            )
        }),
    );
    let base = serve(app).await;

    let err = client(&base).vacate("4").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Network);
    assert_eq!(err.status(), Some(400));
    assert_eq!(err.user_message(), "Table not occupied");
}

#[tokio::test]
async fn test_occupy_sends_table_id_once() {
    let bodies = Bodies::default();
    let app = Router::new()
        .route(
            "/tables/occupy",
            post(
                |State(bodies): State<Bodies>, Json(body): Json<Value>| async move {
                    bodies.lock().push(body);
                    Json(json!({
                        "table_id": "3",
                        "occupied_time": "2025-03-01T18:04:11",
                        "departure_time": null
                    }))
                },
            ),
        )
        .with_state(bodies.clone());
    let base = serve(app).await;

    client(&base).occupy("3").await.unwrap();

    assert_eq!(*bodies.lock(), vec![json!({ "table_id": "3" })]);
}

#[tokio::test]
async fn test_empty_order_never_reaches_backend() {
    let bodies = Bodies::default();
    let app = Router::new()
        .route("/orders", post(record))
        .with_state(bodies.clone());
    let base = serve(app).await;

    let err = client(&base).create_order("3", &[]).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(bodies.lock().is_empty());
}

#[tokio::test]
async fn test_create_order_sends_numeric_table_id() {
    let bodies = Bodies::default();
    let app = Router::new()
        .route(
            "/orders",
            post(
                |State(bodies): State<Bodies>, Json(body): Json<Value>| async move {
                    bodies.lock().push(body);
                    Json(json!({
                        "order_id": "0b6f6a4e",
                        "table_id": 3,
                        "items": [9, 12],
                        "order_time": "2025-03-01T18:10:00",
                        "ready_time": null
                    }))
                },
            ),
        )
        .with_state(bodies.clone());
    let base = serve(app).await;

    let order = client(&base)
        .create_order("3", &["9".to_string(), "12".to_string()])
        .await
        .unwrap();

    assert_eq!(order.id, "0b6f6a4e");
    assert_eq!(order.table_id, "3");
    assert_eq!(order.item_ids, vec!["9", "12"]);
    assert_eq!(
        *bodies.lock(),
        vec![json!({ "table_id": 3, "items": ["9", "12"] })]
    );
}

#[tokio::test]
async fn test_missing_orders_is_empty_list() {
    let app = Router::new().route(
        "/orders",
        get(|| async {
            (
                StatusCode::NOT_FOUND,
                Json(json!({ "detail": "No orders found" })),
            )
        }),
    );
    let base = serve(app).await;

    assert!(client(&base).list_orders().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_unrelated_not_found_on_orders_is_error() {
    let app = Router::new().route(
        "/orders",
        get(|| async {
            (
                StatusCode::NOT_FOUND,
                Json(json!({ "detail": "Not Found" })),
            )
        }),
    );
    let base = serve(app).await;

    let err = client(&base).list_orders().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Network);
    assert_eq!(err.status(), Some(404));
    assert_eq!(err.user_message(), "Not Found");
}

#[tokio::test]
async fn test_bare_not_found_on_orders_is_error() {
    let app = Router::new().route("/orders", get(|| async { StatusCode::NOT_FOUND }));
    let base = serve(app).await;

    let err = client(&base).list_orders().await.unwrap_err();
    assert_eq!(err.status(), Some(404));
}

#[tokio::test]
async fn test_server_error_without_detail_uses_generic_message() {
    let app = Router::new().route(
        "/tables",
        get(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
    );
    let base = serve(app).await;

    let err = client(&base).list_tables().await.unwrap_err();
    assert_eq!(err.status(), Some(500));
    assert_eq!(err.user_message(), "Failed to fetch tables");
}

#[tokio::test]
async fn test_validation_detail_list_is_joined() {
    let app = Router::new().route(
        "/orders/{id}/ready",
        put(|| async {
            (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({
                    "detail": [
                        { "loc": ["path", "order_id"], "msg": "field required" },
                        { "loc": ["body"], "msg": "invalid body" }
                    ]
                })),
            )
        }),
    );
    let base = serve(app).await;

    let err = client(&base).mark_order_ready("x").await.unwrap_err();
    assert_eq!(err.user_message(), "field required; invalid body");
}

#[tokio::test]
async fn test_unreachable_backend_is_network_failure() {
    // bind then drop to get a port nothing listens on
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = client(&format!("http://{addr}")).list_menu().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Network);
    assert_eq!(err.status(), None);
    assert_eq!(err.user_message(), "Failed to fetch menu items");
}

#[tokio::test]
async fn test_request_timeout() {
    let app = Router::new().route(
        "/free-tables",
        get(|| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Json(json!([]))
        }),
    );
    let base = serve(app).await;
    let config = ClientConfig::new(base).with_request_timeout(Some(Duration::from_millis(100)));

    let err = RemoteStateClient::new(&config)
        .unwrap()
        .list_free_tables()
        .await
        .unwrap_err();
    assert_eq!(
        err.user_message(),
        "Failed to fetch free tables (request timed out)"
    );
}

#[tokio::test]
async fn test_reconcile_over_http_resolves_item_names() {
    let app = Router::new()
        .route(
            "/menu",
            get(|| async {
                Json(json!([
                    { "item_id": 9, "name": "Soup", "description": null, "price": 4.5 }
                ]))
            }),
        )
        .route(
            "/tables",
            get(|| async {
                Json(json!([
                    { "table_id": 1, "occupied_time": null, "departure_time": null },
                    { "table_id": 2, "occupied_time": "2025-03-01T18:04:11", "departure_time": null }
                ]))
            }),
        )
        .route(
            "/orders",
            get(|| async {
                Json(json!([
                    { "order_id": 5, "table_id": 2, "items": [9], "order_time": "2025-03-01T18:10:00" },
                    { "order_id": 6, "table_id": 1, "items": [9], "order_time": "2025-03-01T17:00:00" }
                ]))
            }),
        );
    let base = serve(app).await;

    let notices = Arc::new(Notices::default());
    let sync = TableSynchronizer::new(Arc::new(client(&base)), notices.clone());
    let snapshot = sync.bootstrap().await.unwrap();

    let free = snapshot.table("1").unwrap();
    assert!(!free.occupied);
    assert!(free.orders.is_empty());

    let busy = snapshot.table("2").unwrap();
    assert!(busy.occupied);
    assert_eq!(busy.orders.len(), 1);
    assert_eq!(busy.orders[0].order.id, "5");
    assert_eq!(busy.orders[0].item_names, vec!["Soup"]);

    assert!(notices.0.lock().is_empty());
}
