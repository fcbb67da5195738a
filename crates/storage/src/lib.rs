//! User and public key storage for keyward.
//!
//! This crate provides the [`KeyRegistry`](auth::KeyRegistry) trait the
//! authentication gate resolves registered keys through, together with the
//! record types it stores and an in-memory implementation.
//!
//! # Quick Start
//!
//! ```
//! use keyward_storage::auth::{KeyRegistry, MemoryKeyRegistry, RegisteredKey, UserRecord};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let registry = MemoryKeyRegistry::new();
//!
//!     registry.create_user(&UserRecord::builder().username("alice").build()).await?;
//!     registry
//!         .add_key(
//!             &RegisteredKey::builder()
//!                 .owner("alice")
//!                 .key_id("laptop")
//!                 .public_key("ssh-rsa AAAAB3NzaC1yc2E... alice@laptop")
//!                 .build(),
//!         )
//!         .await?;
//!
//!     assert!(registry.find_user("alice").await?.is_some());
//!     assert_eq!(registry.find_keys_for_user("alice").await?.len(), 1);
//!     Ok(())
//! }
//! ```
//!
//! # Feature Flags
//!
//! - **`testutil`**: Enables the `testutil` module with record factories and the
//!   `assert_storage_error!` macro.

#![deny(unsafe_code)]

pub mod auth;
pub mod error;
#[cfg(any(test, feature = "testutil"))]
#[allow(clippy::expect_used)]
pub mod testutil;
pub mod types;

pub use error::{BoxError, StorageError, StorageResult};
pub use types::{KeyId, Username};
