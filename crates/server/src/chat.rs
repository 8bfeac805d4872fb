//! Concierge chat endpoints. The caller owns the session transcript: every
//! request carries the prior turns, every response returns one reply.

use axum::{extract::State, http::StatusCode, response::Json, routing::post, Router};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use papyra_agent::conversation::ConversationLog;
use papyra_core::domain::chat::Message;
use papyra_notify::handover::HandoverPayload;

use crate::bootstrap::AppState;
use crate::catalog::ApiError;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/chat", post(chat_turn))
        .route("/api/v1/chat/handover", post(chat_handover))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct ChatRequest {
    #[serde(default)]
    session_id: Option<String>,
    #[serde(default)]
    history: Vec<Message>,
    message: String,
}

#[derive(Debug, Serialize)]
struct ChatResponse {
    session_id: String,
    reply: String,
}

async fn chat_turn(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Json<ChatResponse> {
    let session_id =
        request.session_id.unwrap_or_else(|| Uuid::new_v4().to_string());
    let log = ConversationLog::from_messages(request.history);

    // Turns are processed strictly in submission order; the tool call inside
    // a turn is awaited before the reply is composed.
    let reply = state.concierge.handle_turn(&log, &request.message).await;

    Json(ChatResponse { session_id, reply })
}

#[derive(Debug, Deserialize)]
struct HandoverRequest {
    #[serde(default)]
    session_id: Option<String>,
    department: String,
    #[serde(default)]
    history: Vec<Message>,
}

#[derive(Debug, Serialize)]
struct HandoverResponse {
    transferred: bool,
    notice: String,
}

async fn chat_handover(
    State(state): State<AppState>,
    Json(request): Json<HandoverRequest>,
) -> Result<Json<HandoverResponse>, (StatusCode, Json<ApiError>)> {
    let session_id =
        request.session_id.unwrap_or_else(|| Uuid::new_v4().to_string());
    let payload = HandoverPayload::new(request.department.clone(), session_id, request.history);

    if state.handover.dispatch(&payload).await {
        Ok(Json(HandoverResponse {
            transferred: true,
            notice: format!(
                "Your conversation was transferred to {}. A human colleague will reply \
                 shortly through your registered WhatsApp/email.",
                request.department
            ),
        }))
    } else {
        Err((
            StatusCode::BAD_GATEWAY,
            Json(ApiError {
                error: "Could not reach a human attendant. Please try again.".to_string(),
            }),
        ))
    }
}
