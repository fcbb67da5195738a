//! # keyward authentication
//!
//! Signature-based request authentication for keyward.
//!
//! A client signs each request message with its RSA private key. The server
//! looks up the public keys registered to the claimed user and accepts the
//! request if any one of them verifies the signature.
//!
//! This crate provides:
//! - **Signature engine** ([`signature`]): RSA-PSS/SHA-256 signing and verification with OpenSSH
//!   public keys and PEM private keys
//! - **Envelope** ([`envelope`]): the `{username, message, signature}` wire format
//! - **Gate** ([`gate`]): the per-request trust decision over a
//!   [`KeyRegistry`](keyward_storage::auth::KeyRegistry)
//! - **Guard** ([`guard`]): runs the gate in front of protected operations
//! - **Strategy** and **config** ([`strategy`], [`config`]): verification strategy selection
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use keyward_authn::{AuthConfig, AuthGate, SignedRequest, Verdict};
//! use keyward_storage::auth::MemoryKeyRegistry;
//!
//! # async fn example(body: &[u8]) -> Result<(), Box<dyn std::error::Error>> {
//! let registry = Arc::new(MemoryKeyRegistry::new());
//! let gate = AuthGate::from_config(registry, &AuthConfig::default());
//!
//! let envelope = SignedRequest::from_json(body)?;
//! match gate.authorize(&envelope).await? {
//!     Verdict::Granted(user) => println!("authenticated {}", user.username),
//!     Verdict::Denied => println!("access denied"),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Features
//!
//! - **`testutil`**: Enables the `testutil` module with cached test key pairs and the
//!   `assert_auth_error!` macro.
//! - **`failpoints`**: Enables fail-point injection in the gate for fault testing.

#![deny(unsafe_code)]
#![warn(missing_docs)]

/// Authentication configuration.
pub mod config;
/// Signed request envelope.
pub mod envelope;
/// Authentication error types.
pub mod error;
/// Per-request authentication gate.
pub mod gate;
/// Guard stage for protected operations.
pub mod guard;
/// RSA-PSS signing and verification.
pub mod signature;
/// Verification strategies.
pub mod strategy;
/// Shared test utilities.
#[cfg(any(test, feature = "testutil"))]
#[allow(clippy::expect_used, clippy::panic)]
pub mod testutil;

// Re-export key types for convenience
pub use config::{AuthConfig, StrategyKind};
pub use envelope::SignedRequest;
pub use error::{AuthError, Result};
pub use gate::{AuthGate, Verdict};
pub use signature::{PrivateKey, PublicKey, sign, sign_with_key_file, verify};
pub use strategy::{AcceptAllStrategy, SignatureStrategy, VerificationStrategy};

/// Result alias for authentication operations.
pub type AuthResult<T> = Result<T>;
