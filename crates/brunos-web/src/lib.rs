//! Bruno's Web Server
//!
//! Axum-based server for the order API, the menu image and the display
//! WebSocket.

pub mod routes;
pub mod state;
pub mod websocket;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};
use brunos_core::{Config, OrderStore};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use state::AppState;

/// Largest accepted menu image.
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        // Orders
        .route(
            "/order",
            get(routes::orders::list_orders)
                .post(routes::orders::save_order)
                .delete(routes::orders::delete_order),
        )
        .route("/order/report", get(routes::orders::get_report))
        .route("/order/all", delete(routes::orders::clear_orders))
        // Menu
        .route("/menu/image", get(routes::menu::get_image))
        .route(
            "/menu/upload",
            post(routes::menu::upload_image).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .with_state(state.clone());

    Router::new()
        .nest("/api", api_routes)
        .route("/ws", get(websocket::ws_handler))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Run the web server until Ctrl+C.
pub async fn run_server(store: Arc<dyn OrderStore>, config: Config) -> anyhow::Result<()> {
    let state = AppState::new(store, &config);
    let app = create_router(state);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Web server listening on http://{}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Web server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown requested");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::websocket::{client_identity, Outbound, WsSession};
    use axum::{
        body::{to_bytes, Body},
        http::{header, HeaderMap, Request, StatusCode},
    };
    use brunos_core::MemoryOrderStore;
    use brunos_hub::{ConnectOutcome, DeviceIdentity};
    use tokio::sync::mpsc;
    use tower::ServiceExt;

    fn test_state() -> AppState {
        let mut config = Config::default();
        config.server.upload_dir = std::env::temp_dir()
            .join(format!("brunos-test-{}", uuid::Uuid::new_v4()))
            .to_string_lossy()
            .into_owned();
        AppState::new(Arc::new(MemoryOrderStore::new()), &config)
    }

    fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_string(response: axum::response::Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    /// Attach an in-process display and wait for its initial sync.
    async fn attach_display(state: &AppState) -> mpsc::Receiver<Outbound> {
        let (tx, rx) = mpsc::channel(16);
        let identity = DeviceIdentity::new([10, 0, 0, 5].into());
        match state
            .hub
            .lifecycle()
            .on_session_opened(identity, Arc::new(WsSession::new(tx)))
            .await
        {
            ConnectOutcome::NewDevice { sync } => sync.await.unwrap(),
            other => panic!("unexpected outcome {:?}", other),
        }
        rx
    }

    fn next_event(rx: &mut mpsc::Receiver<Outbound>) -> serde_json::Value {
        match rx.try_recv() {
            Ok(Outbound::Text(text)) => serde_json::from_str(&text).unwrap(),
            other => panic!("expected a frame, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_create_and_list_orders() {
        let state = test_state();
        let app = create_router(state.clone());

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/order",
                serde_json::json!({ "article": "Pizza", "name": "Mario" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(Request::builder().uri("/api/order").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let orders: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(
            orders,
            serde_json::json!([{ "id": 1, "article": "Pizza", "name": "Mario" }])
        );
    }

    #[tokio::test]
    async fn test_blank_article_is_bad_request() {
        let app = create_router(test_state());
        let response = app
            .oneshot(json_request(
                "POST",
                "/api/order",
                serde_json::json!({ "article": " ", "name": "Mario" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_order_lifecycle_reaches_display() {
        let state = test_state();
        let mut display = attach_display(&state).await;
        assert_eq!(next_event(&mut display)["event"], "init");

        let app = create_router(state);
        let order = serde_json::json!({ "article": "Pizza", "name": "Mario" });
        app.clone()
            .oneshot(json_request("POST", "/api/order", order.clone()))
            .await
            .unwrap();
        app.clone()
            .oneshot(json_request("DELETE", "/api/order", order))
            .await
            .unwrap();
        let response = app
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri("/api/order/all")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let created = next_event(&mut display);
        assert_eq!(created["event"], "order");
        assert_eq!(created["data"]["article"], "Pizza");
        assert_eq!(next_event(&mut display)["event"], "delete");
        assert_eq!(next_event(&mut display)["event"], "reset");
    }

    #[tokio::test]
    async fn test_spoofed_forwarded_for_gets_own_resync() {
        let state = test_state();
        let _first = attach_display(&state).await;

        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", "10.0.0.5".parse().unwrap());
        let identity = client_identity(
            "10.0.0.9:40000".parse().unwrap(),
            &headers,
            state.trust_forwarded_for,
        );

        let (tx, mut rx) = mpsc::channel(16);
        match state
            .hub
            .lifecycle()
            .on_session_opened(identity, Arc::new(WsSession::new(tx)))
            .await
        {
            ConnectOutcome::NewDevice { sync } => sync.await.unwrap(),
            other => panic!("unexpected outcome {:?}", other),
        }
        assert_eq!(next_event(&mut rx)["event"], "init");
        assert_eq!(state.hub.registry().device_count().await, 2);
    }

    #[tokio::test]
    async fn test_report_is_plain_text() {
        let state = test_state();
        let app = create_router(state);
        app.clone()
            .oneshot(json_request(
                "POST",
                "/api/order",
                serde_json::json!({ "article": "Pizza", "name": "Mario" }),
            ))
            .await
            .unwrap();

        let response = app
            .oneshot(Request::builder().uri("/api/order/report").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers()[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/plain"));
        assert_eq!(
            body_string(response).await,
            "Ciao Bruno, oggi ci sono solo io:\n1 x Pizza\n"
        );
    }

    #[tokio::test]
    async fn test_menu_image_missing() {
        let app = create_router(test_state());
        let response = app
            .oneshot(Request::builder().uri("/api/menu/image").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_menu_upload_stores_image_and_notifies() {
        let state = test_state();
        let mut display = attach_display(&state).await;
        next_event(&mut display);
        let app = create_router(state.clone());

        let boundary = "brunosboundary";
        let body = format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"menu.jpg\"\r\n\
             Content-Type: image/jpeg\r\n\r\nJPEGDATA\r\n--{b}--\r\n",
            b = boundary
        );
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/menu/upload")
                    .header(
                        header::CONTENT_TYPE,
                        format!("multipart/form-data; boundary={}", boundary),
                    )
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(next_event(&mut display)["event"], "menu-updated");

        let response = app
            .oneshot(Request::builder().uri("/api/menu/image").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "image/jpeg");
        assert_eq!(body_string(response).await, "JPEGDATA");

        let _ = std::fs::remove_dir_all(&state.upload_dir);
    }
}
