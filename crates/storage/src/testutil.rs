//! Shared test utilities for registry testing.
//!
//! Feature-gated behind `testutil` to prevent leaking into production
//! builds. Enable it in `[dev-dependencies]`:
//!
//! ```toml
//! [dev-dependencies]
//! keyward-storage = { path = "../storage", features = ["testutil"] }
//! ```

use crate::auth::{KeyRegistry, MemoryKeyRegistry, RegisteredKey, UserRecord};

/// Creates a user record with no profile attributes.
#[must_use]
pub fn make_user(username: &str) -> UserRecord {
    UserRecord::builder().username(username).build()
}

/// Creates a registered key record for `owner` with the given key material.
#[must_use]
pub fn make_key(owner: &str, key_id: &str, public_key: &str) -> RegisteredKey {
    RegisteredKey::builder().owner(owner).key_id(key_id).public_key(public_key).build()
}

/// Creates a [`MemoryKeyRegistry`] containing the given users and no keys.
///
/// # Panics
///
/// Panics if a username appears twice.
pub async fn registry_with_users(usernames: &[&str]) -> MemoryKeyRegistry {
    let registry = MemoryKeyRegistry::new();
    for username in usernames {
        registry.create_user(&make_user(username)).await.expect("create_user failed");
    }
    registry
}

/// Asserts that a [`StorageResult`](crate::StorageResult) is an `Err`
/// matching the given [`StorageError`](crate::StorageError) variant.
///
/// # Examples
///
/// ```no_run
/// // Requires the `testutil` feature to be enabled.
/// use keyward_storage::assert_storage_error;
/// use keyward_storage::{StorageError, StorageResult};
///
/// let result: StorageResult<()> = Err(StorageError::not_found("user:ghost"));
/// assert_storage_error!(result, NotFound);
/// ```
#[macro_export]
macro_rules! assert_storage_error {
    ($result:expr, $variant:ident) => {
        assert!(
            matches!($result, Err($crate::error::StorageError::$variant { .. })),
            "expected StorageError::{}, got: {:?}",
            stringify!($variant),
            $result,
        );
    };
    ($result:expr, $variant:ident, $msg:expr) => {
        assert!(
            matches!($result, Err($crate::error::StorageError::$variant { .. })),
            "{}: expected StorageError::{}, got: {:?}",
            $msg,
            stringify!($variant),
            $result,
        );
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{StorageError, StorageResult};

    #[tokio::test]
    async fn test_registry_with_users() {
        let registry = registry_with_users(&["alice", "bob"]).await;

        assert!(registry.find_user("alice").await.expect("lookup").is_some());
        assert!(registry.find_user("bob").await.expect("lookup").is_some());
        assert!(registry.find_user("carol").await.expect("lookup").is_none());
    }

    #[test]
    fn test_make_key() {
        let key = make_key("alice", "laptop", "ssh-rsa AAAA");
        assert_eq!(key.resource(), "user:alice/key:laptop");
        assert_eq!(key.public_key, "ssh-rsa AAAA");
    }

    #[test]
    fn test_assert_storage_error_unit_variant() {
        let result: StorageResult<()> = Err(StorageError::timeout());
        assert_storage_error!(result, Timeout);
    }

    #[test]
    fn test_assert_storage_error_with_message() {
        let result: StorageResult<()> = Err(StorageError::conflict("user:alice"));
        assert_storage_error!(result, Conflict, "duplicate user");
    }
}
