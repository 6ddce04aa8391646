//! HTTP handlers for the dashboard page and panel control

use axum::{
    body::Bytes,
    extract::State,
    http::{header, StatusCode},
    response::{Html, IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use ratewatch_core::panel::SurfaceMessage;

use super::host::PanelHost;

/// Helper to create JSON error responses
fn json_error(status: StatusCode, message: &str) -> (StatusCode, Json<serde_json::Value>) {
    (status, Json(serde_json::json!({"error": message})))
}

/// Panel state for API response
#[derive(Debug, Serialize)]
pub struct PanelStatus {
    pub live: bool,
}

/// Close response
#[derive(Debug, Serialize)]
pub struct CloseResponse {
    pub closed: bool,
}

/// Visibility change request body
#[derive(Debug, Deserialize)]
pub struct VisibilityRequest {
    pub visible: bool,
}

/// Open (or re-focus) the panel and serve its current document
pub async fn index(State(host): State<Arc<PanelHost>>) -> Response {
    host.open().await;
    match host.document() {
        Some(html) => ([(header::CACHE_CONTROL, "no-store")], Html(html)).into_response(),
        None => json_error(StatusCode::SERVICE_UNAVAILABLE, "Panel has no document").into_response(),
    }
}

/// Inbound page message, e.g. `{"command":"refresh"}`
pub async fn post_message(State(host): State<Arc<PanelHost>>, body: Bytes) -> Response {
    match SurfaceMessage::from_json(&body) {
        Some(message) => {
            host.message(message).await;
            StatusCode::NO_CONTENT.into_response()
        }
        None => json_error(StatusCode::BAD_REQUEST, "Malformed message").into_response(),
    }
}

/// Host close
pub async fn close_panel(State(host): State<Arc<PanelHost>>) -> Json<CloseResponse> {
    Json(CloseResponse {
        closed: host.close().await,
    })
}

/// Whether a panel is live
pub async fn panel_status(State(host): State<Arc<PanelHost>>) -> Json<PanelStatus> {
    Json(PanelStatus {
        live: host.is_live().await,
    })
}

/// Host visibility change
pub async fn visibility(
    State(host): State<Arc<PanelHost>>,
    Json(req): Json<VisibilityRequest>,
) -> StatusCode {
    host.visibility_changed(req.visible).await;
    StatusCode::NO_CONTENT
}

#[cfg(test)]
mod tests {
    use super::super::host::tests::{test_host, FixedSource};
    use super::super::server::router;
    use super::*;
    use axum::body::Body;
    use http::Request;
    use http_body_util::BodyExt;
    use std::sync::atomic::Ordering;
    use tower::ServiceExt;

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post(uri: &str, body: &'static str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    async fn body_string(response: Response) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_index_opens_panel() {
        let host = Arc::new(test_host(Arc::new(FixedSource::default()), 0, None));
        let app = router(host.clone());

        let response = app.oneshot(get("/")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CACHE_CONTROL).unwrap(),
            "no-store"
        );
        assert_eq!(
            response
                .headers()
                .get(header::X_CONTENT_TYPE_OPTIONS)
                .unwrap(),
            "nosniff"
        );
        let html = body_string(response).await;
        assert!(html.contains("Content-Security-Policy"));
        assert!(html.contains("connect-src 'self'"));
        assert!(host.is_live().await);
    }

    #[tokio::test]
    async fn test_refresh_message() {
        let source = Arc::new(FixedSource::default());
        let host = Arc::new(test_host(source.clone(), 0, None));
        host.open().await;

        let response = router(host)
            .oneshot(post("/api/message", r#"{"command":"refresh"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_eq!(source.fetches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_unknown_and_malformed_messages() {
        let source = Arc::new(FixedSource::default());
        let host = Arc::new(test_host(source.clone(), 0, None));
        host.open().await;
        let app = router(host);

        let response = app
            .clone()
            .oneshot(post("/api/message", r#"{"command":"format-disk"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = app
            .oneshot(post("/api/message", "not json"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(source.fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_close_and_status() {
        let host = Arc::new(test_host(Arc::new(FixedSource::default()), 0, None));
        host.open().await;
        let app = router(host);

        let response = app.clone().oneshot(get("/api/panel")).await.unwrap();
        let status: serde_json::Value =
            serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(status["live"], true);

        let response = app
            .clone()
            .oneshot(post("/api/panel/close", ""))
            .await
            .unwrap();
        let closed: serde_json::Value =
            serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(closed["closed"], true);

        let response = app.oneshot(get("/api/panel")).await.unwrap();
        let status: serde_json::Value =
            serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(status["live"], false);
    }

    #[tokio::test]
    async fn test_visibility_endpoint() {
        let source = Arc::new(FixedSource::default());
        let host = Arc::new(test_host(source.clone(), 0, None));
        host.open().await;

        let response = router(host)
            .oneshot(post("/api/panel/visibility", r#"{"visible":true}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_eq!(source.fetches.load(Ordering::SeqCst), 2);
    }
}
