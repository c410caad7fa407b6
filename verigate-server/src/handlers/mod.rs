//! HTTP request handlers
//!
//! This module contains all the request handlers for the API endpoints.

pub mod health;
pub mod post;
pub mod verification;

pub use crate::state::AppState;
pub use health::{health, HealthResponse};
pub use post::{post_handler, PostResponse};
pub use verification::verification_widget;
