//! HTTP route definitions

use crate::{AppState, gate, handlers, middleware};
use axum::{Router, middleware as axum_middleware, routing::get};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Create the main router.
///
/// Layers run outermost first: trace, request id, logging, access gate,
/// error reporting. The gate wraps the fallback too, so unknown paths
/// without a valid secret also get 403.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/welcome", get(handlers::welcome))
        .route("/file", get(handlers::get_file))
        .route("/{version}/file", get(handlers::get_versioned_file))
        .fallback(handlers::not_found)
        .layer(axum_middleware::from_fn_with_state(
            Arc::clone(&state),
            middleware::report_errors,
        ))
        .layer(axum_middleware::from_fn_with_state(
            Arc::clone(&state),
            gate::access_gate,
        ))
        .layer(axum_middleware::from_fn(middleware::logging_middleware))
        .layer(axum_middleware::from_fn(middleware::request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GatewayConfig;
    use crate::monitor::{ErrorMonitor, MonitorEvent};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use filegate_storage::ProviderRegistry;
    use std::sync::Mutex;
    use tower::ServiceExt;

    #[derive(Default)]
    struct RecordingMonitor {
        events: Mutex<Vec<MonitorEvent>>,
    }

    impl ErrorMonitor for RecordingMonitor {
        fn capture(&self, event: MonitorEvent) {
            self.events.lock().unwrap().push(event);
        }
    }

    async fn router(dir: &std::path::Path) -> (Router, Arc<RecordingMonitor>) {
        let config = GatewayConfig {
            access_key: Some("1234567".to_string()),
            temp_dir: dir.to_path_buf(),
            ..Default::default()
        };
        let monitor = Arc::new(RecordingMonitor::default());
        let state = AppState::with_registry(config, ProviderRegistry::new())
            .await
            .unwrap()
            .with_monitor(monitor.clone());
        (create_router(Arc::new(state)), monitor)
    }

    fn get(uri: &str, secret: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(secret) = secret {
            builder = builder.header("ACCESS_KEY", secret);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_errors_are_reported() {
        let dir = tempfile::tempdir().unwrap();
        let (app, monitor) = router(dir.path()).await;

        let response = app
            .oneshot(get("/file?name=foo.png", Some("1234567")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(response.headers().contains_key("x-request-id"));

        let events = monitor.events.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, "ProviderResolutionFailed");
        assert_eq!(events[0].path, "/file");
        assert!(events[0].request_id.is_some());
    }

    #[tokio::test]
    async fn test_gate_rejections_are_not_reported() {
        let dir = tempfile::tempdir().unwrap();
        let (app, monitor) = router(dir.path()).await;

        let response = app.oneshot(get("/welcome", Some("wrong"))).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert!(monitor.events.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_success_is_not_reported() {
        let dir = tempfile::tempdir().unwrap();
        let (app, monitor) = router(dir.path()).await;

        let response = app.oneshot(get("/welcome", Some("1234567"))).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(monitor.events.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_fallback_is_reported_as_warning() {
        let dir = tempfile::tempdir().unwrap();
        let (app, monitor) = router(dir.path()).await;

        let response = app.oneshot(get("/nope", Some("1234567"))).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let events = monitor.events.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].level, "warning");
        assert_eq!(events[0].kind, "RouteNotFound");
    }
}
