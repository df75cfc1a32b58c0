//! JSON API server.
//!
//! Exposes the case library, the knowledge graph reads and report drafting
//! over HTTP. Graph endpoints answer with the tagged
//! `{"status": ..., "data": ...}` shape so clients can tell "nothing found"
//! from "graph down".
//!
//! # Module Structure
//!
//! - `handlers` - HTTP route handlers
//! - `models` - API request/response types

mod handlers;
mod models;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

use casewise_core::graph::GraphReader;
use casewise_core::llm::LLM;
use casewise_core::{CaseStore, Config, ReportDrafter};

use crate::app::App;

// =============================================================================
// Application State
// =============================================================================

/// Shared, read-only state for all handlers.
pub struct AppState {
    pub cases: CaseStore,
    pub graph: GraphReader,
    pub drafter: ReportDrafter<Box<dyn LLM>>,
}

impl From<App> for AppState {
    fn from(app: App) -> Self {
        Self {
            cases: app.cases,
            graph: app.graph,
            drafter: app.drafter,
        }
    }
}

// =============================================================================
// Server Configuration
// =============================================================================

/// Where the server listens.
pub struct ServeConfig {
    pub host: String,
    pub port: u16,
}

impl ServeConfig {
    /// Settings from the config file, with command-line overrides.
    pub fn from_config(config: &Config, host: Option<String>, port: Option<u16>) -> Self {
        Self {
            host: host.unwrap_or_else(|| config.server.host.clone()),
            port: port.unwrap_or(config.server.port),
        }
    }
}

// =============================================================================
// Server Entry Point
// =============================================================================

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(handlers::health))
        // Static case library
        .route("/api/cases", get(handlers::list_cases))
        .route("/api/cases/{id}", get(handlers::get_case))
        .route("/api/categories", get(handlers::categories))
        // Knowledge graph
        .route("/api/graph/cases", get(handlers::graph_cases))
        .route("/api/graph/cases/{id}", get(handlers::graph_case))
        .route("/api/graph/knowledge", get(handlers::knowledge_graph))
        .route("/api/graph/modules", get(handlers::knowledge_modules))
        .route("/api/graph/search", get(handlers::search))
        .route("/api/students", get(handlers::students))
        .route("/api/learning-modules", get(handlers::learning_modules))
        // Reports
        .route("/api/reports/personal/{id}", post(handlers::personal_report))
        .route("/api/reports/module/{id}", post(handlers::module_report))
        .route("/api/reports/overall", post(handlers::overall_report))
        .layer(CorsLayer::new().allow_origin(Any))
        .with_state(state)
}

/// Start the API server.
pub async fn start_server(app: App, config: ServeConfig) -> Result<(), Box<dyn std::error::Error>> {
    let state = Arc::new(AppState::from(app));
    let app = router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    println!("Starting Casewise API server...");
    println!("Listening on http://{}", addr);
    println!("Press Ctrl+C to stop\n");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use casewise_core::llm::Provider;
    use casewise_core::report::ReportSettings;
    use serde_json::Value;
    use tower::ServiceExt;

    fn app_router() -> Router {
        let cases = CaseStore::from_json_str(
            r#"[
                {"id": "C1", "title": "Market entry", "category": "Strategy", "difficulty": "high"},
                {"id": "C2", "title": "Team rollout", "category": "HR", "difficulty": "low"}
            ]"#,
        );
        let drafter = ReportDrafter::new(Provider::default().build(), ReportSettings::default());
        router(Arc::new(AppState {
            cases,
            graph: GraphReader::offline(),
            drafter,
        }))
    }

    async fn send(method: &str, uri: &str) -> (StatusCode, Value) {
        let req = Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        let res = app_router().oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_list_cases_filters_by_difficulty() {
        let (status, body) = send("GET", "/api/cases?difficulty=hard").await;
        assert_eq!(status, StatusCode::OK);
        let ids: Vec<&str> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["id"].as_str().unwrap())
            .collect();
        assert_eq!(ids, vec!["C1"]);
    }

    #[tokio::test]
    async fn test_bad_difficulty_is_bad_request() {
        let (status, body) = send("GET", "/api/cases?difficulty=extreme").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_case_detail_and_unknown_case() {
        let (status, body) = send("GET", "/api/cases/C2").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["case"]["title"], "Team rollout");

        let (status, body) = send("GET", "/api/cases/C404").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].as_str().unwrap().contains("C404"));
    }

    #[tokio::test]
    async fn test_categories() {
        let (status, body) = send("GET", "/api/categories").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::json!(["HR", "Strategy"]));
    }

    #[tokio::test]
    async fn test_graph_routes_report_unavailable() {
        for uri in [
            "/api/graph/cases",
            "/api/graph/cases/C1",
            "/api/graph/knowledge",
            "/api/graph/modules",
            "/api/graph/search?q=swot",
            "/api/students",
            "/api/learning-modules",
        ] {
            let (status, body) = send("GET", uri).await;
            assert_eq!(status, StatusCode::OK, "{uri}");
            assert_eq!(body["status"], "unavailable", "{uri}");
        }
    }

    #[tokio::test]
    async fn test_report_without_graph_is_unavailable() {
        let (status, body) = send("POST", "/api/reports/personal/S001").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "unavailable");
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = send("GET", "/api/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["cases"], 2);
        assert_eq!(body["graph_available"], false);
    }
}
