use axum::{extract::Extension, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use helpdesk::AI;
use serde::Serialize;
use serde_json::{json, Value};

use crate::server::app::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
    timestamp: DateTime<Utc>,
    started_at: DateTime<Utc>,
    knowledge_base: KnowledgeBaseHealth,
}

#[derive(Serialize)]
pub struct KnowledgeBaseHealth {
    status: String,
    categories: usize,
    chunks: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Service description
pub async fn root_handler() -> Json<Value> {
    Json(json!({
        "message": "Intelligent Help Desk System",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "operational",
        "endpoints": {
            "health": "/health",
            "submit_request": "/request",
            "categories": "/categories",
            "stats": "/stats",
        }
    }))
}

/// Health check endpoint
///
/// Returns 200 OK when the knowledge index holds chunks and categories are
/// loaded, 503 Service Unavailable otherwise.
pub async fn health_handler<A: AI + 'static>(
    Extension(state): Extension<AppState<A>>,
) -> (StatusCode, Json<HealthResponse>) {
    let stats = state.desk.stats();

    let knowledge_base = if stats.chunks > 0 && stats.categories > 0 {
        KnowledgeBaseHealth {
            status: "ok".to_string(),
            categories: stats.categories,
            chunks: stats.chunks,
            error: None,
        }
    } else {
        KnowledgeBaseHealth {
            status: "error".to_string(),
            categories: stats.categories,
            chunks: stats.chunks,
            error: Some("Knowledge base is empty".to_string()),
        }
    };

    let is_healthy = knowledge_base.status == "ok";
    let (status_code, overall_status) = if is_healthy {
        (StatusCode::OK, "healthy")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "unhealthy")
    };

    (
        status_code,
        Json(HealthResponse {
            status: overall_status.to_string(),
            timestamp: Utc::now(),
            started_at: state.started_at,
            knowledge_base,
        }),
    )
}
