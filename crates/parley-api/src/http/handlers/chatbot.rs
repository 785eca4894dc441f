//! Conversational chatbot endpoint.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::http::error::AppError;
use crate::http::extractors::payload::Payload;
use crate::state::AppState;

/// Request body. Unknown fields are ignored.
#[derive(Debug, Deserialize)]
pub struct ChatbotRequest {
    pub sentence: String,
}

#[derive(Debug, Serialize)]
pub struct ChatbotResponse {
    pub message: &'static str,
    pub chat_response: String,
}

/// POST /chatbot/conversational - Reply to one user sentence.
pub async fn conversational(
    State(state): State<AppState>,
    Payload(request): Payload<ChatbotRequest>,
) -> Result<Json<ChatbotResponse>, AppError> {
    let reply = state
        .chat_service
        .reply(&request.sentence)
        .await
        .map_err(|e| AppError::internal(e, state.config.debug))?;

    Ok(Json(ChatbotResponse {
        message: "Success",
        chat_response: format!("Bot: {reply}"),
    }))
}
