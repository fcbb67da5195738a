//! Users and registered public keys.
//!
//! This module contains the record types and the [`KeyRegistry`] trait that
//! the authentication gate reads on every request. Enrollment tooling writes
//! through the same trait.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐       ┌─────────────┐       ┌─────────────┐
//! │ Enrollment  │       │  Registry   │       │    Gate     │
//! │   (CRUD)    │──────►│  (source    │◄──────│             │
//! │ writes keys │       │   of truth) │       │ reads keys  │
//! └─────────────┘       └─────────────┘       └─────────────┘
//! ```
//!
//! # Ownership
//!
//! A [`RegisteredKey`] stores its owner's [`Username`](crate::Username).
//! A user may own zero, one, or many keys.
//!
//! # Examples
//!
//! ```no_run
//! use keyward_storage::auth::{KeyRegistry, MemoryKeyRegistry, RegisteredKey, UserRecord};
//!
//! # tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(async {
//! let registry = MemoryKeyRegistry::new();
//!
//! registry.create_user(&UserRecord::builder().username("alice").build()).await.unwrap();
//!
//! let key = RegisteredKey::builder()
//!     .owner("alice")
//!     .key_id("laptop")
//!     .public_key("ssh-rsa AAAAB3NzaC1yc2E... alice@laptop")
//!     .build();
//! registry.add_key(&key).await.unwrap();
//!
//! let keys = registry.find_keys_for_user("alice").await.unwrap();
//! assert_eq!(keys.len(), 1);
//! # });
//! ```

pub mod audit;
pub mod audited_store;
mod registered_key;
mod store;
mod user;

pub use registered_key::{RegisteredKey, key_resource};
pub use store::{KeyRegistry, MemoryKeyRegistry};
pub use user::UserRecord;
