//! Registry of active verification methods.
//!
//! The registry is populated during startup while the host still owns it
//! mutably, then shared read-only (typically behind an `Arc` in application
//! state). `add_method` takes `&mut self`, so registering after traffic has
//! started is impossible without rebuilding and swapping the whole registry.

use std::sync::Arc;

use tracing::{debug, info};

use crate::error::VerificationError;
use crate::method::VerificationMethod;
use crate::request::FormRequest;

/// Ordered set of active verification methods.
#[derive(Default, Clone)]
pub struct VerificationRegistry {
    methods: Vec<Arc<dyn VerificationMethod>>,
}

impl VerificationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a method. Startup-only; duplicates are not rejected.
    pub fn add_method(&mut self, method: Arc<dyn VerificationMethod>) {
        info!(
            method = method.name(),
            position = self.methods.len(),
            "Registered verification method"
        );
        self.methods.push(method);
    }

    /// Active methods in registration order.
    pub fn methods(&self) -> &[Arc<dyn VerificationMethod>] {
        &self.methods
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn VerificationMethod>> {
        self.methods.iter()
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }

    /// Concatenated presentation payloads, in registration order.
    pub fn presentation(&self) -> String {
        self.methods.iter().map(|m| m.get_html()).collect()
    }

    /// Gate a request against every active method.
    ///
    /// Each method whose evidence is present must pass. When no method finds
    /// its evidence, the first registered method reports the missing
    /// evidence. An empty registry lets every request through.
    pub async fn verify_request(&self, request: &FormRequest) -> Result<(), VerificationError> {
        let Some(first) = self.methods.first() else {
            debug!("No verification methods registered, skipping gate");
            return Ok(());
        };

        let mut checked = 0usize;
        for method in self.methods.iter() {
            if method.verification_in_request(request) {
                debug!(method = method.name(), "Verification evidence present");
                method.verify_request(request).await?;
                checked += 1;
            }
        }

        if checked == 0 {
            debug!(method = first.name(), "No verification evidence in request");
            return first.verify_request(request).await;
        }

        Ok(())
    }
}

impl std::fmt::Debug for VerificationRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VerificationRegistry")
            .field(
                "methods",
                &self.methods.iter().map(|m| m.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}
