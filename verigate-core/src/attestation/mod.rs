//! Third-party attestation services.
//!
//! A verification method hands the user's evidence token and its shared
//! secret to an [`AttestationClient`] and gets back the service's verdict.
//!
//! - [`HttpAttestationClient`] - reCAPTCHA `siteverify` over HTTPS
//! - [`MockAttestationClient`] - canned responses for testing

mod http_client;
mod mock;

pub use http_client::{AttestationHttpConfig, HttpAttestationClient};
pub use mock::MockAttestationClient;

use async_trait::async_trait;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::{Result, VerigateError};

/// Default reCAPTCHA verification endpoint.
pub const SITEVERIFY_URL: &str = "https://www.google.com/recaptcha/api/siteverify";

/// Trait for attestation backends.
///
/// Implementations submit the evidence once; they do not retry.
#[async_trait]
pub trait AttestationClient: Send + Sync {
    /// Submit `response` (the user's evidence token) with `secret`.
    async fn site_verify(&self, secret: &str, response: &str) -> Result<SiteVerifyResponse>;
}

/// Parsed `siteverify` response.
///
/// Every field is optional and parsed leniently: a value of the wrong JSON
/// type reads as absent, so a missing or malformed `success` or
/// `challenge_ts` is a failed attestation, not a parse error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SiteVerifyResponse {
    /// `Some(true)` only for a JSON `true`.
    #[serde(default, deserialize_with = "lenient_bool")]
    pub success: Option<bool>,
    /// ISO-8601 timestamp of the challenge load.
    #[serde(default, deserialize_with = "lenient_string")]
    pub challenge_ts: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub hostname: Option<String>,
    #[serde(default, rename = "error-codes", deserialize_with = "lenient_strings")]
    pub error_codes: Vec<String>,
}

impl SiteVerifyResponse {
    /// Interpret a decoded JSON body. Anything but an object carries no
    /// attestation fields at all.
    pub fn from_json(body: Value) -> Result<Self> {
        if !body.is_object() {
            return Ok(Self::default());
        }
        serde_json::from_value(body).map_err(|e| {
            VerigateError::Attestation(format!("Failed to parse attestation response: {e}"))
        })
    }
}

fn lenient_bool<'de, D>(deserializer: D) -> std::result::Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Bool(b) => Some(b),
        _ => None,
    })
}

fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        _ => None,
    })
}

fn lenient_strings<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|v| match v {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    })
}
