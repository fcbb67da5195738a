//! Authentication configuration.
//!
//! The configuration is read once at startup. It selects the verification
//! strategy the gate uses for its whole lifetime and, for signing clients,
//! where the private key lives.
//!
//! # Examples
//!
//! ```
//! use keyward_authn::config::{AuthConfig, StrategyKind};
//!
//! let config: AuthConfig = serde_json::from_str(r#"{"strategy": "signature"}"#).unwrap();
//! assert_eq!(config.strategy(), StrategyKind::Signature);
//!
//! let config = AuthConfig::builder().private_key_path("/etc/keyward/client.pem").build().unwrap();
//! assert!(config.private_key_path().is_some());
//! ```

use std::{
    fmt,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::{
    error::{AuthError, Result},
    signature::PrivateKey,
};

/// Which verification strategy the gate uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// RSA-PSS signature verification against registered keys.
    #[default]
    Signature,
    /// Accepts any request from an existing user. Development only.
    AcceptAll,
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Signature => write!(f, "signature"),
            Self::AcceptAll => write!(f, "accept_all"),
        }
    }
}

/// Validated authentication configuration.
///
/// # Validation
///
/// - `strategy = accept_all` requires `allow_insecure_strategy = true`
/// - `private_key_path`, when set, must not be empty
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawAuthConfig")]
pub struct AuthConfig {
    strategy: StrategyKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    private_key_path: Option<PathBuf>,
    allow_insecure_strategy: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            strategy: StrategyKind::Signature,
            private_key_path: None,
            allow_insecure_strategy: false,
        }
    }
}

#[bon::bon]
impl AuthConfig {
    /// Creates a new authentication configuration.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Config`] if the accept-all strategy is selected
    /// without `allow_insecure_strategy`, or if `private_key_path` is empty.
    #[builder]
    pub fn new(
        #[builder(default)] strategy: StrategyKind,
        #[builder(into)] private_key_path: Option<PathBuf>,
        #[builder(default)] allow_insecure_strategy: bool,
    ) -> Result<Self> {
        if strategy == StrategyKind::AcceptAll && !allow_insecure_strategy {
            return Err(AuthError::config(
                "strategy 'accept_all' requires allow_insecure_strategy = true",
            ));
        }
        if private_key_path.as_deref().is_some_and(|p| p.as_os_str().is_empty()) {
            return Err(AuthError::config("private_key_path must not be empty"));
        }
        Ok(Self { strategy, private_key_path, allow_insecure_strategy })
    }

    /// Returns the configured verification strategy.
    #[must_use]
    pub fn strategy(&self) -> StrategyKind {
        self.strategy
    }

    /// Returns the signing key path, if configured.
    #[must_use]
    pub fn private_key_path(&self) -> Option<&Path> {
        self.private_key_path.as_deref()
    }

    /// Loads the signing key from `private_key_path`.
    ///
    /// The file is read on every call.
    ///
    /// # Errors
    ///
    /// - [`AuthError::Config`] if no `private_key_path` is configured
    /// - [`AuthError::KeyLoad`] if the file is missing, encrypted, or not an RSA private key
    #[tracing::instrument(skip(self))]
    pub fn load_private_key(&self) -> Result<PrivateKey> {
        let path = self
            .private_key_path
            .as_deref()
            .ok_or_else(|| AuthError::config("private_key_path is not configured"))?;
        PrivateKey::from_pem_file(path)
    }

    /// Returns whether insecure strategies were explicitly allowed.
    #[must_use]
    pub fn allow_insecure_strategy(&self) -> bool {
        self.allow_insecure_strategy
    }
}

/// On-disk shape; converted through the validating builder.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawAuthConfig {
    #[serde(default)]
    strategy: StrategyKind,
    #[serde(default)]
    private_key_path: Option<PathBuf>,
    #[serde(default)]
    allow_insecure_strategy: bool,
}

impl TryFrom<RawAuthConfig> for AuthConfig {
    type Error = AuthError;

    fn try_from(raw: RawAuthConfig) -> Result<Self> {
        AuthConfig::builder()
            .strategy(raw.strategy)
            .maybe_private_key_path(raw.private_key_path)
            .allow_insecure_strategy(raw.allow_insecure_strategy)
            .build()
    }
}
