//! Verigate Core - pluggable human verification for request pipelines
//!
//! A host application enables one or more verification plugins at startup,
//! which register [`VerificationMethod`]s in a [`VerificationRegistry`]. Every
//! inbound form submission that needs a human check is then passed through
//! the registry before the host accepts it.
//!
//! # Features
//!
//! - Async [`VerificationMethod`] trait for new strategies
//! - Google reCAPTCHA v2 method with a 30-minute challenge window
//! - Typed user-facing errors; infrastructure details only go to logs
//! - Fatal startup errors for incomplete plugin configuration
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use verigate_core::attestation::{MockAttestationClient, SiteVerifyResponse};
//! use verigate_core::{FormRequest, Recaptcha2Method, VerificationRegistry};
//!
//! # async fn example() -> Result<(), verigate_core::VerificationError> {
//! // Use a mock attestation client (in production, use HttpAttestationClient)
//! let client = MockAttestationClient::responding(SiteVerifyResponse {
//!     success: Some(true),
//!     challenge_ts: Some(chrono::Utc::now().to_rfc3339()),
//!     ..Default::default()
//! });
//!
//! let mut registry = VerificationRegistry::new();
//! registry.add_method(Arc::new(Recaptcha2Method::new("site-key", "secret", Arc::new(client))));
//!
//! let request = FormRequest::new().with_field("g-recaptcha-response", "token");
//! registry.verify_request(&request).await?;
//! # Ok(())
//! # }
//! ```

pub mod attestation;
pub mod error;
pub mod method;
pub mod plugin;
pub mod recaptcha;
pub mod registry;
pub mod request;

// Re-export main types for convenience
pub use attestation::{AttestationClient, HttpAttestationClient, MockAttestationClient};
pub use error::{ConfigError, Result, VerificationError, VerigateError};
pub use method::VerificationMethod;
pub use plugin::{enable_plugins, Plugin, PluginConfig, PluginDescription};
pub use recaptcha::{Captcha2Plugin, Recaptcha2Method, CHALLENGE_MAX_AGE_MS, RESPONSE_FIELD};
pub use registry::VerificationRegistry;
pub use request::FormRequest;
