//! Verification method capability.

use async_trait::async_trait;

use crate::error::VerificationError;
use crate::request::FormRequest;

/// A pluggable human-verification strategy.
///
/// Implementations must be thread-safe (`Send + Sync`): one instance is shared
/// by every request handler once the registry is frozen. Per-request state is
/// never stored on the method.
///
/// ## Example
///
/// ```
/// use async_trait::async_trait;
/// use verigate_core::{FormRequest, VerificationError, VerificationMethod};
///
/// struct Honeypot;
///
/// #[async_trait]
/// impl VerificationMethod for Honeypot {
///     fn name(&self) -> &str {
///         "honeypot"
///     }
///
///     fn get_html(&self) -> &str {
///         r#"<input type="text" name="website" style="display:none">"#
///     }
///
///     fn verification_in_request(&self, request: &FormRequest) -> bool {
///         request.contains("website")
///     }
///
///     async fn verify_request(&self, request: &FormRequest) -> Result<(), VerificationError> {
///         match request.field("website") {
///             Some("") => Ok(()),
///             Some(_) => Err(VerificationError::InvalidEvidence),
///             None => Err(VerificationError::MissingEvidence),
///         }
///     }
/// }
/// ```
#[async_trait]
pub trait VerificationMethod: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &str;

    /// Presentation payload to embed in a response.
    ///
    /// Must never contain server-side secrets.
    fn get_html(&self) -> &str;

    /// Whether the request carries this method's evidence field at all.
    fn verification_in_request(&self, request: &FormRequest) -> bool;

    /// Validate the evidence carried by the request.
    ///
    /// Infrastructure failures are logged by the implementation and surfaced
    /// as [`VerificationError::ServiceUnavailable`]; their details never
    /// appear in the returned error.
    async fn verify_request(&self, request: &FormRequest) -> Result<(), VerificationError>;
}
