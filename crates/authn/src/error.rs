//! Authentication error types.
//!
//! A signature that simply does not match is not an error: verification
//! reports it as `false` and the gate turns it into a denied verdict. The
//! variants here are the failures that must reach the caller, usually as a
//! server error.

use keyward_storage::StorageError;
use thiserror::Error;

/// Authentication and authorization errors.
///
/// # Non-exhaustive
///
/// New variants may be added in future minor releases. Downstream match
/// expressions must include a wildcard arm (`_ =>`).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AuthError {
    /// Key material is missing, unreadable, encrypted, or in the wrong format.
    #[error("Key load error: {message}")]
    KeyLoad {
        /// Description of the failure.
        message: String,
    },

    /// The signature is not valid base64.
    #[error("Signature decode error: {message}")]
    Decode {
        /// Description of the failure.
        message: String,
    },

    /// The RSA primitive failed for a reason other than a signature mismatch.
    #[error("Cryptographic failure: {message}")]
    Crypto {
        /// Description of the failure.
        message: String,
    },

    /// The outer request envelope is malformed.
    #[error("Invalid envelope: {message}")]
    InvalidEnvelope {
        /// Description of the violation.
        message: String,
    },

    /// The signed message does not decode into the expected payload.
    #[error("Invalid payload: {message}")]
    InvalidPayload {
        /// Description of the violation.
        message: String,
    },

    /// The authenticated user may not act on the target identity.
    #[error("User '{actor}' may not act on behalf of '{target}'")]
    Forbidden {
        /// The authenticated user.
        actor: String,
        /// The identity the request tried to act on.
        target: String,
    },

    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    Config {
        /// Description of the problem.
        message: String,
    },

    /// Registry lookup failed.
    ///
    /// Wraps the original [`StorageError`] to preserve the source chain.
    #[error("Key storage error: {0}")]
    KeyStorage(#[source] StorageError),
}

impl AuthError {
    /// Creates a new `KeyLoad` error.
    #[must_use]
    pub fn key_load(message: impl Into<String>) -> Self {
        Self::KeyLoad { message: message.into() }
    }

    /// Creates a new `Decode` error.
    #[must_use]
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode { message: message.into() }
    }

    /// Creates a new `Crypto` error.
    #[must_use]
    pub fn crypto(message: impl Into<String>) -> Self {
        Self::Crypto { message: message.into() }
    }

    /// Creates a new `InvalidEnvelope` error.
    #[must_use]
    pub fn invalid_envelope(message: impl Into<String>) -> Self {
        Self::InvalidEnvelope { message: message.into() }
    }

    /// Creates a new `InvalidPayload` error.
    #[must_use]
    pub fn invalid_payload(message: impl Into<String>) -> Self {
        Self::InvalidPayload { message: message.into() }
    }

    /// Creates a new `Forbidden` error.
    #[must_use]
    pub fn forbidden(actor: impl Into<String>, target: impl Into<String>) -> Self {
        Self::Forbidden { actor: actor.into(), target: target.into() }
    }

    /// Creates a new `Config` error.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config { message: message.into() }
    }
}

impl From<StorageError> for AuthError {
    fn from(err: StorageError) -> Self {
        AuthError::KeyStorage(err)
    }
}

impl From<base64::DecodeError> for AuthError {
    fn from(err: base64::DecodeError) -> Self {
        AuthError::decode(err.to_string())
    }
}

/// Result type alias for authentication operations.
pub type Result<T> = std::result::Result<T, AuthError>;
