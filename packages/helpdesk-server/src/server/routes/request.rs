use axum::{extract::Extension, http::StatusCode, Json};
use helpdesk::{PipelineResult, Priority, SupportRequest, AI};
use serde::{Deserialize, Serialize};

use crate::server::app::AppState;

/// Longest message accepted, in characters
pub const MAX_MESSAGE_CHARS: usize = 4000;

#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    pub message: String,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub priority: Priority,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    error: String,
}

fn bad_request(error: impl Into<String>) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: error.into(),
        }),
    )
}

/// Process a help desk request
///
/// The pipeline itself never fails; degraded stages are tagged in the
/// returned result. Only malformed submissions are rejected.
pub async fn request_handler<A: AI + 'static>(
    Extension(state): Extension<AppState<A>>,
    Json(body): Json<SubmitRequest>,
) -> Result<Json<PipelineResult>, (StatusCode, Json<ErrorResponse>)> {
    let message = body.message.trim();
    if message.is_empty() {
        return Err(bad_request("message must not be empty"));
    }
    if message.chars().count() > MAX_MESSAGE_CHARS {
        return Err(bad_request(format!(
            "message exceeds {MAX_MESSAGE_CHARS} characters"
        )));
    }

    let mut request = SupportRequest::new(message).with_priority(body.priority);
    if let Some(user_id) = body.user_id.filter(|u| !u.trim().is_empty()) {
        request = request.with_user(user_id);
    }

    tracing::info!(request_id = %request.id, priority = ?request.priority, "Request received");

    let result = state.desk.process(request).await;

    tracing::info!(
        request_id = %result.request_id,
        category = %result.classification.category,
        escalated = result.escalation.required,
        processing_time_ms = result.processing_time_ms,
        "Request processed"
    );

    Ok(Json(result))
}
