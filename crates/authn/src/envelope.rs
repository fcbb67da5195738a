//! Signed request envelope.
//!
//! Every protected request arrives as a JSON object with exactly three string
//! fields:
//!
//! ```json
//! {"username": "alice", "message": "{\"host\":\"db-01\"}", "signature": "kX3...=="}
//! ```
//!
//! `message` is itself JSON text. The signature covers its exact bytes, so it
//! is kept as a string until the gate has verified it and only then decoded a
//! second time into the operation's typed payload with
//! [`SignedRequest::payload`].

use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::{
    error::{AuthError, Result},
    signature::PrivateKey,
};

/// The outer structure of a signed request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SignedRequest {
    /// The identity the sender claims.
    pub username: String,
    /// JSON-encoded payload; the signed bytes.
    pub message: String,
    /// Base64 RSA-PSS signature over `message`.
    pub signature: String,
}

impl SignedRequest {
    /// Parses and validates an envelope from its JSON wire form.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidEnvelope`] if the body is not a JSON
    /// object with exactly the three string fields, or if `username` or
    /// `signature` is empty.
    pub fn from_json(body: &[u8]) -> Result<Self> {
        let envelope: Self = serde_json::from_slice(body)
            .map_err(|e| AuthError::invalid_envelope(e.to_string()))?;
        envelope.validate()?;
        Ok(envelope)
    }

    /// Checks the field-level constraints serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidEnvelope`] if `username` or `signature`
    /// is empty.
    pub fn validate(&self) -> Result<()> {
        if self.username.is_empty() {
            return Err(AuthError::invalid_envelope("username must not be empty"));
        }
        if self.signature.trim().is_empty() {
            return Err(AuthError::invalid_envelope("signature must not be empty"));
        }
        Ok(())
    }

    /// Builds a signed envelope for `payload` on behalf of `username`.
    ///
    /// The payload is serialized once and the signature covers exactly those
    /// bytes.
    ///
    /// # Errors
    ///
    /// - [`AuthError::InvalidPayload`] if `payload` cannot be serialized
    /// - [`AuthError::Crypto`] if signing fails
    pub fn sign<T: Serialize + ?Sized>(
        username: impl Into<String>,
        payload: &T,
        private_key: &PrivateKey,
    ) -> Result<Self> {
        let message = serde_json::to_string(payload)
            .map_err(|e| AuthError::invalid_payload(e.to_string()))?;
        let signature = private_key.sign(message.as_bytes())?;
        Ok(Self { username: username.into(), message, signature })
    }

    /// Serializes the envelope to its JSON wire form.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidEnvelope`] if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| AuthError::invalid_envelope(e.to_string()))
    }

    /// Decodes the signed message into the operation-specific payload type.
    ///
    /// Call this only after the envelope has been authorized.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidPayload`] if `message` is not JSON or does
    /// not match `T`.
    pub fn payload<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_str(&self.message).map_err(|e| AuthError::invalid_payload(e.to_string()))
    }
}
