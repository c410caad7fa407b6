//! reCAPTCHA `siteverify` client over HTTPS.
//!
//! One POST per verification, bounded by an explicit timeout. There is no
//! retry: a failed call is reported straight back to the verification method.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info, instrument, warn};

use super::{AttestationClient, SiteVerifyResponse, SITEVERIFY_URL};
use crate::error::{Result, VerigateError};

/// Default timeout for the outbound verification call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration for the HTTP attestation client.
#[derive(Debug, Clone)]
pub struct AttestationHttpConfig {
    /// Verification endpoint URL.
    pub verify_url: String,
    /// Request timeout.
    pub timeout: Duration,
}

impl Default for AttestationHttpConfig {
    fn default() -> Self {
        Self {
            verify_url: SITEVERIFY_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// HTTP client for a reCAPTCHA-compatible `siteverify` endpoint.
pub struct HttpAttestationClient {
    client: Client,
    config: AttestationHttpConfig,
}

impl HttpAttestationClient {
    /// Create a client for the public reCAPTCHA endpoint.
    pub fn new() -> Result<Self> {
        Self::with_config(AttestationHttpConfig::default())
    }

    /// Create a client with custom configuration.
    #[instrument(level = "debug", skip_all, fields(
        verify_url = %config.verify_url,
        timeout_ms = config.timeout.as_millis() as u64
    ))]
    pub fn with_config(config: AttestationHttpConfig) -> Result<Self> {
        debug!("Creating attestation HTTP client");

        let client = Client::builder()
            .timeout(config.timeout)
            .https_only(true)
            .build()
            .map_err(|e| {
                warn!(error = %e, "Failed to create HTTP client");
                VerigateError::Attestation(format!("Failed to create HTTP client: {e}"))
            })?;

        info!("Attestation HTTP client created");
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &AttestationHttpConfig {
        &self.config
    }
}

#[async_trait]
impl AttestationClient for HttpAttestationClient {
    #[instrument(level = "debug", skip_all, fields(verify_url = %self.config.verify_url))]
    async fn site_verify(&self, secret: &str, response: &str) -> Result<SiteVerifyResponse> {
        let start = Instant::now();

        let http_response = self
            .client
            .post(&self.config.verify_url)
            .form(&[("secret", secret), ("response", response)])
            .send()
            .await
            .map_err(|e| {
                warn!(
                    error = %e,
                    latency_ms = start.elapsed().as_millis() as u64,
                    "Attestation request failed"
                );
                VerigateError::HttpError(e)
            })?;

        let status = http_response.status();
        debug!(status = %status, "Received HTTP response");

        if !status.is_success() {
            warn!(
                status = %status,
                latency_ms = start.elapsed().as_millis() as u64,
                "Attestation service returned error status"
            );
            return Err(VerigateError::Attestation(format!(
                "Attestation service returned status: {status}"
            )));
        }

        let body: serde_json::Value = http_response.json().await.map_err(|e| {
            warn!(error = %e, "Failed to parse attestation response");
            VerigateError::Attestation(format!("Failed to parse attestation response: {e}"))
        })?;
        let parsed = SiteVerifyResponse::from_json(body)?;

        debug!(
            latency_ms = start.elapsed().as_millis() as u64,
            success = ?parsed.success,
            hostname = ?parsed.hostname,
            error_codes = ?parsed.error_codes,
            "Attestation completed"
        );

        Ok(parsed)
    }
}
