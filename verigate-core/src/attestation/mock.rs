//! Mock attestation client for testing.

use std::sync::Mutex;

use async_trait::async_trait;

use super::{AttestationClient, SiteVerifyResponse};
use crate::error::{Result, VerigateError};

/// Returns a fixed outcome for every call and records the submitted tokens.
/// WARNING: accepts whatever it is told to; never use in production.
pub struct MockAttestationClient {
    outcome: std::result::Result<SiteVerifyResponse, String>,
    submissions: Mutex<Vec<(String, String)>>,
}

impl MockAttestationClient {
    /// Always answer with `response`.
    pub fn responding(response: SiteVerifyResponse) -> Self {
        Self {
            outcome: Ok(response),
            submissions: Mutex::new(Vec::new()),
        }
    }

    /// Always answer with the given raw JSON body.
    ///
    /// The body is interpreted exactly as the HTTP client would.
    pub fn responding_json(body: serde_json::Value) -> Result<Self> {
        Ok(Self::responding(SiteVerifyResponse::from_json(body)?))
    }

    /// Always fail as if the transport broke.
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            outcome: Err(reason.into()),
            submissions: Mutex::new(Vec::new()),
        }
    }

    /// `(secret, response)` pairs received so far.
    pub fn submissions(&self) -> Vec<(String, String)> {
        self.submissions
            .lock()
            .map(|s| s.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl AttestationClient for MockAttestationClient {
    async fn site_verify(&self, secret: &str, response: &str) -> Result<SiteVerifyResponse> {
        if let Ok(mut submissions) = self.submissions.lock() {
            submissions.push((secret.to_string(), response.to_string()));
        }

        match &self.outcome {
            Ok(parsed) => Ok(parsed.clone()),
            Err(reason) => Err(VerigateError::Attestation(reason.clone())),
        }
    }
}
