//! Gated submission handler
//!
//! Handles POST /post: the form is accepted only after the verification
//! registry has cleared it. The gate runs first, so an empty form on a
//! guarded server is reported as missing evidence.

use std::collections::HashMap;

use axum::{extract::State, http::StatusCode, Form, Json};
use serde::Serialize;
use tracing::{info, instrument};
use verigate_core::FormRequest;

use super::AppState;
use crate::error::ApiError;

/// Response for an accepted submission
#[derive(Debug, Serialize)]
pub struct PostResponse {
    /// Always true; rejected submissions return an error body instead
    pub accepted: bool,
    /// Number of form fields received, verification evidence included
    pub fields: usize,
}

/// Accept a form submission once it passes human verification
///
/// Accepts `application/x-www-form-urlencoded` with arbitrary content fields
/// plus whatever evidence fields the active methods expect
/// (e.g. `g-recaptcha-response`).
#[instrument(level = "debug", skip_all)]
pub async fn post_handler(
    State(state): State<AppState>,
    Form(fields): Form<HashMap<String, String>>,
) -> Result<(StatusCode, Json<PostResponse>), ApiError> {
    let field_count = fields.len();
    let request = FormRequest::from_fields(fields);
    state.registry.verify_request(&request).await?;

    if field_count == 0 {
        return Err(ApiError::bad_request("Empty submission"));
    }

    info!(fields = field_count, "Submission accepted");
    Ok((
        StatusCode::CREATED,
        Json(PostResponse {
            accepted: true,
            fields: field_count,
        }),
    ))
}
