//! Application state module
//!
//! Defines shared state accessible across all request handlers.

use std::sync::Arc;

use verigate_core::VerificationRegistry;

/// Application state containing shared resources.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Verification methods enabled at startup; read-only from here on
    pub registry: Arc<VerificationRegistry>,
}

impl AppState {
    /// Freeze a fully populated registry into shared state.
    pub fn new(registry: VerificationRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }
}
