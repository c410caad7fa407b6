//! Google reCAPTCHA v2 verification method and its `captcha2` plugin.
//!
//! The browser widget posts a `g-recaptcha-response` token with the form.
//! The token is checked server-side against the `siteverify` endpoint, and the
//! challenge must have been solved within the last 30 minutes even when the
//! service reports success.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{debug, error, instrument, warn};

use crate::attestation::{
    AttestationClient, AttestationHttpConfig, HttpAttestationClient, SiteVerifyResponse,
};
use crate::error::{ConfigError, Result, VerificationError, VerigateError};
use crate::method::VerificationMethod;
use crate::plugin::{Plugin, PluginConfig, PluginDescription};
use crate::registry::VerificationRegistry;
use crate::request::FormRequest;

/// Form field carrying the widget's evidence token.
pub const RESPONSE_FIELD: &str = "g-recaptcha-response";

/// Oldest accepted challenge, in milliseconds (30 minutes).
pub const CHALLENGE_MAX_AGE_MS: i64 = 30 * 60 * 1000;

const SITEKEY_PLACEHOLDER: &str = "__sitekey__";

const WIDGET_TEMPLATE: &str = r#"
<script src="https://www.google.com/recaptcha/api.js" async defer></script>
<div class="g-recaptcha" data-sitekey="__sitekey__"></div>
<noscript>
  <div>
    <div style="width: 302px; height: 422px; position: relative;">
      <div style="width: 302px; height: 422px; position: absolute;">
        <iframe src="https://www.google.com/recaptcha/api/fallback?k=__sitekey__"
                frameborder="0" scrolling="no"
                style="width: 302px; height:422px; border-style: none;">
        </iframe>
      </div>
    </div>
    <div style="width: 300px; height: 60px; border-style: none;
                bottom: 12px; left: 25px; margin: 0px; padding: 0px; right: 25px;
                background: #f9f9f9; border: 1px solid #c1c1c1; border-radius: 3px;">
      <textarea id="g-recaptcha-response" name="g-recaptcha-response"
                class="g-recaptcha-response"
                style="width: 250px; height: 40px; border: 1px solid #c1c1c1;
                       margin: 10px 25px; padding: 0px; resize: none;" >
      </textarea>
    </div>
  </div>
</noscript>
"#;

/// reCAPTCHA v2 checkbox verification.
pub struct Recaptcha2Method {
    sitekey: String,
    secret: String,
    html: String,
    client: Arc<dyn AttestationClient>,
}

impl Recaptcha2Method {
    /// Create a method verifying against `client`.
    pub fn new(
        sitekey: impl Into<String>,
        secret: impl Into<String>,
        client: Arc<dyn AttestationClient>,
    ) -> Self {
        let sitekey = sitekey.into();
        let html = WIDGET_TEMPLATE.replace(SITEKEY_PLACEHOLDER, &sitekey);

        Self {
            sitekey,
            secret: secret.into(),
            html,
            client,
        }
    }

    pub fn sitekey(&self) -> &str {
        &self.sitekey
    }

    /// Ask the attestation service about `response` and decide.
    #[instrument(level = "debug", skip_all, fields(method = "captcha2"))]
    pub async fn verify(&self, response: &str) -> Result<bool> {
        let attestation = self.client.site_verify(&self.secret, response).await?;
        evaluate(&attestation, Utc::now())
    }
}

/// Decide whether an attestation is acceptable at `now`.
///
/// Order matters: a missing timestamp or an expired challenge rejects the
/// attestation before `success` is even looked at.
pub fn evaluate(attestation: &SiteVerifyResponse, now: DateTime<Utc>) -> Result<bool> {
    let Some(timestamp) = attestation
        .challenge_ts
        .as_deref()
        .filter(|ts| !ts.is_empty())
    else {
        debug!("Attestation has no challenge timestamp");
        return Ok(false);
    };

    let challenge = DateTime::parse_from_rfc3339(timestamp)
        .map_err(|e| VerigateError::InvalidTimestamp {
            value: timestamp.to_string(),
            reason: e.to_string(),
        })?
        .with_timezone(&Utc);

    let elapsed_ms = now.signed_duration_since(challenge).num_milliseconds();
    if elapsed_ms > CHALLENGE_MAX_AGE_MS {
        debug!(elapsed_ms, "Challenge expired");
        return Ok(false);
    }

    Ok(attestation.success == Some(true))
}

#[async_trait]
impl VerificationMethod for Recaptcha2Method {
    fn name(&self) -> &str {
        Captcha2Plugin::NAME
    }

    fn get_html(&self) -> &str {
        &self.html
    }

    fn verification_in_request(&self, request: &FormRequest) -> bool {
        request.contains(RESPONSE_FIELD)
    }

    async fn verify_request(
        &self,
        request: &FormRequest,
    ) -> std::result::Result<(), VerificationError> {
        let response = match request.field(RESPONSE_FIELD) {
            Some(value) if !value.is_empty() => value,
            _ => return Err(VerificationError::MissingEvidence),
        };

        let valid = self.verify(response).await.map_err(|e| {
            error!(method = self.name(), error = %e, "Verify exception");
            VerificationError::ServiceUnavailable
        })?;

        if !valid {
            warn!(method = self.name(), "Captcha rejected");
            return Err(VerificationError::InvalidEvidence);
        }

        Ok(())
    }
}

impl std::fmt::Debug for Recaptcha2Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Recaptcha2Method")
            .field("sitekey", &self.sitekey)
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

/// Plugin that enables [`Recaptcha2Method`] from its `[captcha2]` section.
///
/// Required keys: `sitekey`, `secret`.
/// Optional keys: `verify_url`, `timeout_secs`.
#[derive(Debug, Default, Clone, Copy)]
pub struct Captcha2Plugin;

impl Captcha2Plugin {
    pub const NAME: &'static str = "captcha2";
}

impl Plugin for Captcha2Plugin {
    fn describe(&self) -> PluginDescription {
        PluginDescription {
            name: Self::NAME,
            description: "This plugin adds google reCaptcha v2 as a verification method.",
            version: "unstable",
        }
    }

    fn on_enable(
        &self,
        config: Option<&PluginConfig>,
        registry: &mut VerificationRegistry,
    ) -> std::result::Result<(), ConfigError> {
        let config = match config {
            Some(config) if !config.is_empty() => config,
            _ => {
                return Err(ConfigError::MissingSection {
                    plugin: Self::NAME.to_string(),
                })
            }
        };

        let (Some(sitekey), Some(secret)) =
            (config.non_empty("sitekey"), config.non_empty("secret"))
        else {
            return Err(ConfigError::EmptyCredentials {
                plugin: Self::NAME.to_string(),
            });
        };

        let mut http_config = AttestationHttpConfig::default();
        if let Some(url) = config.non_empty("verify_url") {
            http_config.verify_url = url.to_string();
        }
        if let Some(raw) = config.non_empty("timeout_secs") {
            let invalid = |reason: String| ConfigError::InvalidValue {
                plugin: Self::NAME.to_string(),
                key: "timeout_secs".to_string(),
                reason,
            };
            let secs: u64 = raw
                .parse()
                .map_err(|e: std::num::ParseIntError| invalid(e.to_string()))?;
            if secs == 0 {
                return Err(invalid("must be at least 1 second".to_string()));
            }
            http_config.timeout = Duration::from_secs(secs);
        }

        let client = HttpAttestationClient::with_config(http_config).map_err(|source| {
            ConfigError::Init {
                plugin: Self::NAME.to_string(),
                source,
            }
        })?;

        let method = Recaptcha2Method::new(sitekey, secret, Arc::new(client));
        registry.add_method(Arc::new(method));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration as ChronoDuration;

    use super::*;
    use crate::attestation::MockAttestationClient;

    fn attestation(
        success: Option<bool>,
        challenge_ts: Option<DateTime<Utc>>,
    ) -> SiteVerifyResponse {
        SiteVerifyResponse {
            success,
            challenge_ts: challenge_ts.map(|ts| ts.to_rfc3339()),
            ..Default::default()
        }
    }

    fn method_with(
        client: MockAttestationClient,
    ) -> (Recaptcha2Method, Arc<MockAttestationClient>) {
        let client = Arc::new(client);
        let method = Recaptcha2Method::new("abc123", "top-secret-value", client.clone());
        (method, client)
    }

    fn minutes_ago(minutes: i64) -> DateTime<Utc> {
        Utc::now() - ChronoDuration::minutes(minutes)
    }

    #[test]
    fn test_html_contains_sitekey_not_secret() {
        let (method, _) = method_with(MockAttestationClient::responding(Default::default()));
        let html = method.get_html();

        assert!(html.contains(r#"data-sitekey="abc123""#));
        assert!(html.contains("api/fallback?k=abc123"));
        assert!(!html.contains(SITEKEY_PLACEHOLDER));
        assert!(!html.contains("top-secret-value"));
    }

    #[test]
    fn test_debug_redacts_secret() {
        let (method, _) = method_with(MockAttestationClient::responding(Default::default()));
        let debug = format!("{method:?}");
        assert!(debug.contains("abc123"));
        assert!(!debug.contains("top-secret-value"));
    }

    #[test]
    fn test_verification_in_request() {
        let (method, _) = method_with(MockAttestationClient::responding(Default::default()));
        assert!(!method.verification_in_request(&FormRequest::new()));
        assert!(method.verification_in_request(&FormRequest::new().with_field(RESPONSE_FIELD, "")));
    }

    #[test]
    fn test_evaluate_within_window() {
        let now = Utc::now();
        let recent = Some(now - ChronoDuration::minutes(10));
        assert!(evaluate(&attestation(Some(true), recent), now).unwrap());
    }

    #[test]
    fn test_evaluate_expiry_dominates_success() {
        let now = Utc::now();
        let expired = Some(now - ChronoDuration::minutes(31));
        assert!(!evaluate(&attestation(Some(true), expired), now).unwrap());
    }

    #[test]
    fn test_evaluate_boundary() {
        let now = Utc::now();
        let at_limit = now - ChronoDuration::milliseconds(CHALLENGE_MAX_AGE_MS);
        assert!(evaluate(&attestation(Some(true), Some(at_limit)), now).unwrap());

        let past_limit = now - ChronoDuration::milliseconds(CHALLENGE_MAX_AGE_MS + 1);
        assert!(!evaluate(&attestation(Some(true), Some(past_limit)), now).unwrap());
    }

    #[test]
    fn test_evaluate_missing_timestamp() {
        let now = Utc::now();
        assert!(!evaluate(&attestation(Some(true), None), now).unwrap());
        assert!(!evaluate(&attestation(Some(false), None), now).unwrap());
        assert!(!evaluate(&attestation(None, None), now).unwrap());

        let empty = SiteVerifyResponse {
            success: Some(true),
            challenge_ts: Some(String::new()),
            ..Default::default()
        };
        assert!(!evaluate(&empty, now).unwrap());
    }

    #[test]
    fn test_evaluate_requires_explicit_success() {
        let now = Utc::now();
        let recent = Some(now - ChronoDuration::minutes(1));
        assert!(!evaluate(&attestation(Some(false), recent), now).unwrap());
        assert!(!evaluate(&attestation(None, recent), now).unwrap());
    }

    #[test]
    fn test_evaluate_offset_timestamp() {
        let now = DateTime::parse_from_rfc3339("2024-05-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let response = SiteVerifyResponse {
            success: Some(true),
            challenge_ts: Some("2024-05-01T13:50:00+02:00".into()),
            ..Default::default()
        };
        assert!(evaluate(&response, now).unwrap());
    }

    #[test]
    fn test_evaluate_garbage_timestamp_is_error() {
        let response = SiteVerifyResponse {
            success: Some(true),
            challenge_ts: Some("yesterday".into()),
            ..Default::default()
        };
        assert!(matches!(
            evaluate(&response, Utc::now()),
            Err(VerigateError::InvalidTimestamp { .. })
        ));
    }

    #[tokio::test]
    async fn test_verify_request_missing_evidence() {
        let (method, client) = method_with(MockAttestationClient::responding(Default::default()));

        let err = method.verify_request(&FormRequest::new()).await.unwrap_err();
        assert_eq!(err.to_string(), "Please fill in the captcha");

        let empty = FormRequest::new().with_field(RESPONSE_FIELD, "");
        let err = method.verify_request(&empty).await.unwrap_err();
        assert_eq!(err, VerificationError::MissingEvidence);

        assert!(client.submissions().is_empty());
    }

    #[tokio::test]
    async fn test_verify_request_success() {
        let (method, client) = method_with(MockAttestationClient::responding(attestation(
            Some(true),
            Some(minutes_ago(10)),
        )));
        let request = FormRequest::new().with_field(RESPONSE_FIELD, "token-xyz");

        method.verify_request(&request).await.unwrap();
        assert_eq!(
            client.submissions(),
            vec![("top-secret-value".to_string(), "token-xyz".to_string())]
        );
    }

    #[tokio::test]
    async fn test_verify_request_expired() {
        let (method, _) = method_with(MockAttestationClient::responding(attestation(
            Some(true),
            Some(minutes_ago(31)),
        )));
        let request = FormRequest::new().with_field(RESPONSE_FIELD, "token-xyz");

        let err = method.verify_request(&request).await.unwrap_err();
        assert_eq!(err.to_string(), "Captcha invalid");
    }

    #[tokio::test]
    async fn test_verify_request_non_string_timestamp_is_invalid() {
        let (method, _) = method_with(
            MockAttestationClient::responding_json(serde_json::json!({
                "success": true,
                "challenge_ts": false
            }))
            .unwrap(),
        );
        let request = FormRequest::new().with_field(RESPONSE_FIELD, "token-xyz");

        let err = method.verify_request(&request).await.unwrap_err();
        assert_eq!(err, VerificationError::InvalidEvidence);
    }

    #[tokio::test]
    async fn test_verify_request_non_boolean_success_is_invalid() {
        let (method, _) = method_with(
            MockAttestationClient::responding_json(serde_json::json!({
                "success": "true",
                "challenge_ts": minutes_ago(1).to_rfc3339()
            }))
            .unwrap(),
        );
        let request = FormRequest::new().with_field(RESPONSE_FIELD, "token-xyz");

        let err = method.verify_request(&request).await.unwrap_err();
        assert_eq!(err, VerificationError::InvalidEvidence);
    }

    #[tokio::test]
    async fn test_verify_request_non_object_body_is_invalid() {
        let (method, _) =
            method_with(MockAttestationClient::responding_json(serde_json::json!([])).unwrap());
        let request = FormRequest::new().with_field(RESPONSE_FIELD, "token-xyz");

        let err = method.verify_request(&request).await.unwrap_err();
        assert_eq!(err, VerificationError::InvalidEvidence);
    }

    #[tokio::test]
    async fn test_verify_request_transport_failure() {
        let (method, _) = method_with(MockAttestationClient::failing("dns lookup failed"));
        let request = FormRequest::new().with_field(RESPONSE_FIELD, "token-xyz");

        let err = method.verify_request(&request).await.unwrap_err();
        assert_eq!(err, VerificationError::ServiceUnavailable);
        assert_eq!(err.to_string(), "Error contacting recaptcha service");
        assert!(!err.to_string().contains("dns"));
    }

    #[test]
    fn test_describe() {
        let description = Captcha2Plugin.describe();
        assert_eq!(description.name, "captcha2");
        assert_eq!(description.version, "unstable");
    }

    #[test]
    fn test_enable_without_section() {
        let mut registry = VerificationRegistry::new();

        let err = Captcha2Plugin.on_enable(None, &mut registry).unwrap_err();
        assert!(matches!(err, ConfigError::MissingSection { .. }));

        let empty = PluginConfig::default();
        let err = Captcha2Plugin.on_enable(Some(&empty), &mut registry).unwrap_err();
        assert!(matches!(err, ConfigError::MissingSection { .. }));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_enable_with_sitekey_only() {
        let mut registry = VerificationRegistry::new();
        let config = PluginConfig::default().with("sitekey", "abc123");

        let err = Captcha2Plugin.on_enable(Some(&config), &mut registry).unwrap_err();
        assert!(matches!(err, ConfigError::EmptyCredentials { .. }));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_enable_with_empty_secret() {
        let mut registry = VerificationRegistry::new();
        let config = PluginConfig::default()
            .with("sitekey", "abc123")
            .with("secret", "");

        let err = Captcha2Plugin.on_enable(Some(&config), &mut registry).unwrap_err();
        assert!(matches!(err, ConfigError::EmptyCredentials { .. }));
    }

    #[test]
    fn test_enable_invalid_timeout() {
        let mut registry = VerificationRegistry::new();
        let config = PluginConfig::default()
            .with("sitekey", "abc123")
            .with("secret", "s")
            .with("timeout_secs", "soon");

        let err = Captcha2Plugin.on_enable(Some(&config), &mut registry).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn test_enable_zero_timeout() {
        let mut registry = VerificationRegistry::new();
        let config = PluginConfig::default()
            .with("sitekey", "abc123")
            .with("secret", "s")
            .with("timeout_secs", "0");

        let err = Captcha2Plugin.on_enable(Some(&config), &mut registry).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "timeout_secs"));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_enable_registers_method() {
        let mut registry = VerificationRegistry::new();
        let config = PluginConfig::default()
            .with("sitekey", "abc123")
            .with("secret", "top-secret-value")
            .with("timeout_secs", "5");

        Captcha2Plugin.on_enable(Some(&config), &mut registry).unwrap();
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.methods()[0].name(), "captcha2");
        assert!(registry.presentation().contains("abc123"));
        assert!(!registry.presentation().contains("top-secret-value"));
    }
}
