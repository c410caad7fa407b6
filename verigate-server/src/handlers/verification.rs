//! Verification widget handler

use axum::{extract::State, response::Html};

use super::AppState;

/// GET /verification - Presentation payload of every active method
///
/// Hosts embed this markup in the form that is later posted to `/post`.
pub async fn verification_widget(State(state): State<AppState>) -> Html<String> {
    Html(state.registry.presentation())
}
