//! Axum route handler for the spelling API.

use axum::{extract::State, Json};
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::spelling::correct_text;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct SpellingRequest {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct SpellingResponse {
    pub before: String,
    pub after: String,
}

/// GET|POST /spelling/correct-spelling
///
/// Returns the submitted text alongside its corrected form. A missing body
/// or missing `text` is treated as empty text.
pub async fn handle_correct_spelling(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<SpellingResponse>, AppError> {
    let request: SpellingRequest = if body.is_empty() {
        SpellingRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| AppError::Validation(format!("Invalid JSON body: {e}")))?
    };

    let after = correct_text(state.speller.as_ref(), &request.text);
    Ok(Json(SpellingResponse {
        before: request.text,
        after,
    }))
}
