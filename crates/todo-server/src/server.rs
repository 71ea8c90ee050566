//! `TodoServer`: router construction and listener startup.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use axum::extract::State;
use axum::response::Json;
use axum::routing::{get, post};
use todo_service::TaskService;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::config::ServerConfig;
use crate::handlers;
use crate::health::{self, HealthResponse};
use crate::shutdown::ShutdownCoordinator;

/// Shared state accessible from Axum handlers.
#[derive(Clone)]
pub struct AppState {
    /// Task service (shares the connection pool).
    pub service: TaskService,
    /// When the server started.
    pub start_time: Instant,
}

/// The HTTP server.
pub struct TodoServer {
    config: ServerConfig,
    service: TaskService,
    shutdown: Arc<ShutdownCoordinator>,
    start_time: Instant,
}

impl TodoServer {
    /// Create a new server.
    pub fn new(config: ServerConfig, service: TaskService) -> Self {
        Self {
            config,
            service,
            shutdown: Arc::new(ShutdownCoordinator::new()),
            start_time: Instant::now(),
        }
    }

    /// Build the Axum router with all routes.
    pub fn router(&self) -> Router {
        let state = AppState {
            service: self.service.clone(),
            start_time: self.start_time,
        };

        let cors = if self.config.cors_permissive {
            CorsLayer::permissive()
        } else {
            CorsLayer::new()
        };

        Router::new()
            .route("/health", get(health_handler))
            .route(
                "/api/tasks",
                post(handlers::create_task).get(handlers::list_tasks),
            )
            .route(
                "/api/tasks/{id}",
                get(handlers::get_task)
                    .put(handlers::update_task)
                    .patch(handlers::toggle_completion)
                    .delete(handlers::delete_task),
            )
            .route("/api/tasks/{id}/comments", post(handlers::add_comment))
            .with_state(state)
            .layer(TraceLayer::new_for_http())
            .layer(cors)
    }

    /// Bind the listener and serve until the shutdown token fires.
    ///
    /// Returns the bound address (useful with port 0) and the serve task.
    pub async fn listen(&self) -> std::io::Result<(SocketAddr, JoinHandle<()>)> {
        let listener = TcpListener::bind(self.config.bind_addr()).await?;
        let addr = listener.local_addr()?;
        let router = self.router();
        let token = self.shutdown.token();

        info!(%addr, "todo server listening");

        let handle = tokio::spawn(async move {
            let served = axum::serve(listener, router)
                .with_graceful_shutdown(async move { token.cancelled().await })
                .await;
            if let Err(e) = served {
                error!(error = %e, "server terminated with error");
            }
            info!("todo server stopped");
        });

        Ok((addr, handle))
    }

    /// Get the shutdown coordinator.
    pub fn shutdown(&self) -> &Arc<ShutdownCoordinator> {
        &self.shutdown
    }

    /// Get the server configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}

/// GET /health
async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(health::health_check(state.start_time))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use todo_store::{ConnectionConfig, new_in_memory, run_migrations};
    use tower::ServiceExt;

    fn make_server(config: ServerConfig) -> TodoServer {
        let pool = new_in_memory(&ConnectionConfig::default()).unwrap();
        let _ = run_migrations(&pool.get().unwrap()).unwrap();
        TodoServer::new(config, TaskService::new(pool))
    }

    async fn body_json(resp: axum::response::Response) -> serde_json::Value {
        let body = axum::body::to_bytes(resp.into_body(), 1_000_000)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[test]
    fn shutdown_coordinator_accessible() {
        let server = make_server(ServerConfig::default());
        assert!(!server.shutdown().is_shutting_down());
        assert_eq!(server.config().port, 0);
    }

    #[tokio::test]
    async fn health_endpoint_returns_ok() {
        let app = make_server(ServerConfig::default()).router();
        let req = Request::builder().uri("/health").body(Body::empty()).unwrap();

        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let parsed = body_json(resp).await;
        assert_eq!(parsed["status"], "ok");
        assert!(parsed["uptimeSecs"].is_number());
    }

    #[tokio::test]
    async fn unknown_route_returns_404() {
        let app = make_server(ServerConfig::default()).router();
        let req = Request::builder()
            .uri("/nonexistent")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn create_then_list() {
        let app = make_server(ServerConfig::default()).router();

        let req = Request::builder()
            .method("POST")
            .uri("/api/tasks")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"title": "Buy milk", "priority": "high"}"#))
            .unwrap();
        let resp = app.clone().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let created = body_json(resp).await;
        assert_eq!(created["title"], "Buy milk");
        assert_eq!(created["completed"], false);

        let req = Request::builder()
            .uri("/api/tasks?filterType=all&completed=true")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let listed = body_json(resp).await;
        assert_eq!(listed.as_array().unwrap().len(), 1);
        assert_eq!(listed[0]["id"], created["id"]);
    }

    #[tokio::test]
    async fn null_body_is_400() {
        let app = make_server(ServerConfig::default()).router();
        let req = Request::builder()
            .method("POST")
            .uri("/api/tasks")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("null"))
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let parsed = body_json(resp).await;
        assert_eq!(parsed["code"], "INVALID_ARGUMENT");
        assert_eq!(parsed["message"], "Task must not be null");
    }

    #[tokio::test]
    async fn missing_content_type_is_400() {
        let app = make_server(ServerConfig::default()).router();
        let req = Request::builder()
            .method("POST")
            .uri("/api/tasks")
            .body(Body::from(r#"{"title": "x"}"#))
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(resp).await["code"], "INVALID_ARGUMENT");
    }

    #[tokio::test]
    async fn blank_and_spelled_filters_still_list() {
        let app = make_server(ServerConfig::default()).router();
        let req = Request::builder()
            .method("POST")
            .uri("/api/tasks")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"title": "only"}"#))
            .unwrap();
        let created = body_json(app.clone().oneshot(req).await.unwrap()).await;

        for query in [
            "search=&completed=&dueDate=&filterType=",
            "completed=yes",
            "completed=0&dueDate=2026-10-20",
        ] {
            let req = Request::builder()
                .uri(format!("/api/tasks?{query}"))
                .body(Body::empty())
                .unwrap();
            let resp = app.clone().oneshot(req).await.unwrap();
            assert_eq!(resp.status(), StatusCode::OK, "query {query}");
            let listed = body_json(resp).await;
            assert_eq!(listed.as_array().unwrap().len(), 1);
            assert_eq!(listed[0]["id"], created["id"]);
        }
    }

    #[tokio::test]
    async fn bad_due_date_query_is_400() {
        let app = make_server(ServerConfig::default()).router();
        let req = Request::builder()
            .uri("/api/tasks?dueDate=tomorrow")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn permissive_cors_answers_preflight() {
        let app = make_server(ServerConfig::default()).router();
        let req = Request::builder()
            .method("OPTIONS")
            .uri("/api/tasks")
            .header(header::ORIGIN, "http://localhost:3000")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert!(
            resp.headers()
                .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        );
    }

    #[tokio::test]
    async fn cors_can_be_disabled() {
        let config = ServerConfig {
            cors_permissive: false,
            ..ServerConfig::default()
        };
        let app = make_server(config).router();
        let req = Request::builder()
            .uri("/health")
            .header(header::ORIGIN, "http://localhost:3000")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert!(
            !resp
                .headers()
                .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        );
    }

    #[tokio::test]
    async fn listen_stops_on_shutdown() {
        let server = make_server(ServerConfig::default());
        let (addr, handle) = server.listen().await.unwrap();
        assert_ne!(addr.port(), 0);

        server.shutdown().shutdown();
        tokio::time::timeout(std::time::Duration::from_secs(5), handle)
            .await
            .unwrap()
            .unwrap();
    }
}
