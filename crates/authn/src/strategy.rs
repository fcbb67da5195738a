//! Verification strategies.
//!
//! The gate delegates the "does this signature match one of these keys"
//! decision to a [`VerificationStrategy`] chosen once at startup. Production
//! uses [`SignatureStrategy`]; [`AcceptAllStrategy`] exists for local
//! development and must be opted into explicitly through
//! [`AuthConfig`](crate::config::AuthConfig).

use std::{fmt, sync::Arc};

use keyward_storage::{KeyId, auth::RegisteredKey};

use crate::{
    config::{AuthConfig, StrategyKind},
    error::Result,
    signature::PublicKey,
};

/// Decides whether a decoded signature matches any of a user's keys.
pub trait VerificationStrategy: Send + Sync + fmt::Debug {
    /// Returns the id of the first key that accepts `signature` over
    /// `message`, or `None` if no key does.
    ///
    /// `keys` is never empty; the gate denies users without keys before
    /// consulting the strategy.
    ///
    /// # Errors
    ///
    /// Returns an error only for failures that are not a mismatch, such as
    /// an RSA primitive failure.
    fn verify(
        &self,
        signature: &[u8],
        message: &[u8],
        keys: &[RegisteredKey],
    ) -> Result<Option<KeyId>>;

    /// Short name used in log fields.
    fn name(&self) -> &'static str;
}

/// RSA-PSS verification against each registered key in turn.
///
/// Stops at the first key that verifies. Keys whose stored material cannot
/// be parsed are logged and skipped so that one corrupt enrollment does not
/// lock the user out of their other keys.
#[derive(Debug, Clone, Copy, Default)]
pub struct SignatureStrategy;

impl VerificationStrategy for SignatureStrategy {
    fn verify(
        &self,
        signature: &[u8],
        message: &[u8],
        keys: &[RegisteredKey],
    ) -> Result<Option<KeyId>> {
        for key in keys {
            let public_key = match PublicKey::from_openssh(&key.public_key) {
                Ok(public_key) => public_key,
                Err(e) => {
                    tracing::warn!(
                        key = %key.resource(),
                        error = %e,
                        "skipping registered key with unparseable material"
                    );
                    continue;
                },
            };

            if public_key.verify_raw(signature, message)? {
                return Ok(Some(key.key_id.clone()));
            }
        }

        Ok(None)
    }

    fn name(&self) -> &'static str {
        "signature"
    }
}

/// Accepts every request from a user that has at least one registered key,
/// without checking the signature.
///
/// Never use outside local development.
#[derive(Debug)]
pub struct AcceptAllStrategy {
    _private: (),
}

impl AcceptAllStrategy {
    /// Creates the strategy, logging a warning that signatures are not
    /// checked.
    #[must_use]
    pub fn new() -> Self {
        tracing::warn!("accept-all verification strategy enabled: signatures are NOT checked");
        Self { _private: () }
    }
}

impl Default for AcceptAllStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl VerificationStrategy for AcceptAllStrategy {
    fn verify(
        &self,
        _signature: &[u8],
        _message: &[u8],
        keys: &[RegisteredKey],
    ) -> Result<Option<KeyId>> {
        Ok(keys.first().map(|key| key.key_id.clone()))
    }

    fn name(&self) -> &'static str {
        "accept_all"
    }
}

/// Builds the strategy selected by `config`.
#[must_use]
pub fn strategy_from_config(config: &AuthConfig) -> Arc<dyn VerificationStrategy> {
    match config.strategy() {
        StrategyKind::Signature => Arc::new(SignatureStrategy),
        StrategyKind::AcceptAll => Arc::new(AcceptAllStrategy::new()),
    }
}
