//! The per-request authentication gate.
//!
//! [`AuthGate::authorize`] turns a [`SignedRequest`] into a [`Verdict`]:
//!
//! ```text
//! envelope → decode signature (malformed → Decode error)
//!          → find_user            (unknown → Denied)
//!          → find_keys_for_user   (none    → Denied)
//!          → strategy.verify      (no key matches → Denied)
//!          → Granted(user)
//! ```
//!
//! Every denial looks the same to the caller. The reason is recorded only in
//! the `reason` field of the structured log event.
//!
//! The gate holds no per-request state and caches nothing: a key removed
//! from the registry stops authorizing on the very next call.

use std::{fmt, sync::Arc};

use fail::fail_point;
use keyward_storage::auth::{KeyRegistry, UserRecord};

use crate::{
    config::AuthConfig,
    envelope::SignedRequest,
    error::Result,
    signature::decode_signature,
    strategy::{VerificationStrategy, strategy_from_config},
};

/// Outcome of authorizing a request.
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    /// The signature verified against one of the user's keys.
    Granted(UserRecord),
    /// The request is not authorized.
    Denied,
}

impl Verdict {
    /// Returns `true` for [`Verdict::Granted`].
    #[must_use]
    pub fn is_granted(&self) -> bool {
        matches!(self, Self::Granted(_))
    }

    /// Returns the authorized user, if any.
    #[must_use]
    pub fn user(&self) -> Option<&UserRecord> {
        match self {
            Self::Granted(user) => Some(user),
            Self::Denied => None,
        }
    }

    /// Consumes the verdict and returns the authorized user, if any.
    #[must_use]
    pub fn into_user(self) -> Option<UserRecord> {
        match self {
            Self::Granted(user) => Some(user),
            Self::Denied => None,
        }
    }
}

/// Authenticates signed requests against a [`KeyRegistry`].
///
/// Cheap to clone; clones share the registry and strategy.
#[derive(Clone)]
pub struct AuthGate {
    registry: Arc<dyn KeyRegistry>,
    strategy: Arc<dyn VerificationStrategy>,
}

impl AuthGate {
    /// Creates a gate with an explicit verification strategy.
    pub fn new(registry: Arc<dyn KeyRegistry>, strategy: Arc<dyn VerificationStrategy>) -> Self {
        Self { registry, strategy }
    }

    /// Creates a gate with the strategy selected by `config`.
    pub fn from_config(registry: Arc<dyn KeyRegistry>, config: &AuthConfig) -> Self {
        Self::new(registry, strategy_from_config(config))
    }

    /// Returns the name of the active verification strategy.
    #[must_use]
    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }

    /// Decides whether `envelope` is authorized.
    ///
    /// # Errors
    ///
    /// - [`AuthError::InvalidEnvelope`](crate::AuthError::InvalidEnvelope) if `username` or `signature` is empty
    /// - [`AuthError::Decode`](crate::AuthError::Decode) if the signature is not valid base64, checked before any lookup
    /// - [`AuthError::KeyStorage`](crate::AuthError::KeyStorage) if the registry lookup fails
    /// - [`AuthError::Crypto`](crate::AuthError::Crypto) if the RSA primitive fails for a reason other than a mismatch
    ///
    /// Unknown users, users without keys, and wrong signatures are not
    /// errors; they all yield [`Verdict::Denied`].
    #[tracing::instrument(
        skip(self, envelope),
        fields(username = %envelope.username, strategy = self.strategy.name())
    )]
    pub async fn authorize(&self, envelope: &SignedRequest) -> Result<Verdict> {
        envelope.validate()?;
        let signature = decode_signature(&envelope.signature)?;

        fail_point!("gate-before-key-lookup", |_| {
            Err(crate::error::AuthError::KeyStorage(keyward_storage::StorageError::internal(
                "injected failure before key lookup",
            )))
        });

        let Some(user) = self.registry.find_user(&envelope.username).await? else {
            tracing::info!(reason = "unknown_user", "request denied");
            return Ok(Verdict::Denied);
        };

        let keys = self.registry.find_keys_for_user(&envelope.username).await?;
        if keys.is_empty() {
            tracing::info!(reason = "no_registered_keys", "request denied");
            return Ok(Verdict::Denied);
        }

        match self.strategy.verify(&signature, envelope.message.as_bytes(), &keys)? {
            Some(key_id) => {
                tracing::debug!(key_id = %key_id, "request granted");
                Ok(Verdict::Granted(user))
            },
            None => {
                tracing::info!(
                    reason = "no_matching_key",
                    keys_tried = keys.len(),
                    "request denied"
                );
                Ok(Verdict::Denied)
            },
        }
    }
}

impl fmt::Debug for AuthGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthGate").field("strategy", &self.strategy).finish_non_exhaustive()
    }
}
