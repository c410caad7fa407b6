use thiserror::Error;

/// Infrastructure failures raised while talking to an attestation service.
///
/// These never reach the end user. `VerificationMethod::verify_request`
/// logs them and downgrades them to [`VerificationError::ServiceUnavailable`].
#[derive(Error, Debug)]
pub enum VerigateError {
    #[error("Attestation error: {0}")]
    Attestation(String),

    #[error("Invalid challenge timestamp {value:?}: {reason}")]
    InvalidTimestamp { value: String, reason: String },

    #[error("HTTP request error: {0}")]
    HttpError(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, VerigateError>;

/// User-facing verification failure.
///
/// The `Display` output is the message shown to the requester; callers that
/// only need a single "verification failed" channel can use `to_string()`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VerificationError {
    #[error("Please fill in the captcha")]
    MissingEvidence,

    #[error("Captcha invalid")]
    InvalidEvidence,

    #[error("Error contacting recaptcha service")]
    ServiceUnavailable,
}

/// Fatal startup errors raised while enabling verification plugins.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("sitekey and secret must be set in the [{plugin}] section of config.ini")]
    MissingSection { plugin: String },

    #[error("\"sitekey\" or \"secret\" empty in the [{plugin}] section of config.ini")]
    EmptyCredentials { plugin: String },

    #[error("Invalid value for \"{key}\" in the [{plugin}] section of config.ini: {reason}")]
    InvalidValue {
        plugin: String,
        key: String,
        reason: String,
    },

    #[error("Unknown plugin: {0}")]
    UnknownPlugin(String),

    #[error("Failed to initialise plugin {plugin}: {source}")]
    Init {
        plugin: String,
        #[source]
        source: VerigateError,
    },
}
