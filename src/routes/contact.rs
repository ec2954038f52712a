use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::Serialize;

use crate::db::models::{ContactMessage, Record};
use crate::error::AppResult;
use crate::extractors::ValidatedJson;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ContactResponse {
    pub ok: bool,
    pub message_id: String,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/api/contact", post(submit))
}

/// POST /api/contact
pub async fn submit(
    State(state): State<AppState>,
    ValidatedJson(message): ValidatedJson<ContactMessage>,
) -> AppResult<Json<ContactResponse>> {
    let message_id = state
        .gateway
        .create_document(ContactMessage::COLLECTION, &*message)
        .await?;
    tracing::info!("Contact message stored: {}", message_id);

    Ok(Json(ContactResponse {
        ok: true,
        message_id,
    }))
}
