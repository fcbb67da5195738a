//! Registry trait for users and their registered public keys.
//!
//! The [`KeyRegistry`] trait is the only storage capability the
//! authentication gate depends on. Production deployments back it with a
//! document store; [`MemoryKeyRegistry`] serves tests and development.
//!
//! # Key Lifecycle
//!
//! ```text
//! ┌─────────────┐   add_key    ┌─────────────┐  remove_key   ┌─────────────┐
//! │ (no record) │─────────────►│  Registered │──────────────►│   Removed   │
//! │             │              │ (authorizes │               │ (no longer  │
//! │             │              │  requests)  │               │  authorizes)│
//! └─────────────┘              └─────────────┘               └─────────────┘
//! ```
//!
//! Deleting a user removes every key it owns.
//!
//! # Usage
//!
//! ```no_run
//! use keyward_storage::auth::{KeyRegistry, RegisteredKey};
//! use keyward_storage::StorageError;
//!
//! async fn enroll<R: KeyRegistry>(registry: &R, key: &RegisteredKey) -> Result<(), StorageError> {
//!     registry.add_key(key).await
//! }
//! ```

use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::{
    auth::{RegisteredKey, UserRecord, registered_key::key_resource},
    error::{StorageError, StorageResult},
    types::{KeyId, Username},
};

/// Persistence layer for users and their registered keys.
///
/// # Consistency
///
/// Implementations must provide read-after-write consistency for key
/// registration: once [`add_key`](Self::add_key) or
/// [`remove_key`](Self::remove_key) returns, subsequent calls to
/// [`find_keys_for_user`](Self::find_keys_for_user) observe the change.
///
/// # Error Handling
///
/// Lookups report absence with `Ok(None)` / an empty vector. Errors are
/// reserved for mutations on missing or duplicate records and for backend
/// failures.
#[async_trait]
pub trait KeyRegistry: Send + Sync {
    /// Looks up a user by username.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(user))` if the user exists
    /// - `Ok(None)` if it doesn't
    /// - `Err(...)` on storage errors
    async fn find_user(&self, username: &str) -> StorageResult<Option<UserRecord>>;

    /// Lists every key owned by `username`, in no particular order.
    ///
    /// Returns an empty vector for users without keys and for unknown
    /// users alike.
    async fn find_keys_for_user(&self, username: &str) -> StorageResult<Vec<RegisteredKey>>;

    /// Stores a new user.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Conflict`] if the username is taken.
    async fn create_user(&self, user: &UserRecord) -> StorageResult<()>;

    /// Deletes a user together with every key it owns.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NotFound`] if the user doesn't exist.
    async fn delete_user(&self, username: &str) -> StorageResult<()>;

    /// Enrolls a public key for its owner.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The owner doesn't exist ([`StorageError::NotFound`])
    /// - The owner already has a key with the same id ([`StorageError::Conflict`])
    async fn add_key(&self, key: &RegisteredKey) -> StorageResult<()>;

    /// Removes one of a user's keys.
    ///
    /// Once this returns, the key no longer authorizes requests.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NotFound`] if the key doesn't exist.
    async fn remove_key(&self, username: &str, key_id: &str) -> StorageResult<()>;
}

#[async_trait]
impl<R: KeyRegistry + ?Sized> KeyRegistry for Arc<R> {
    async fn find_user(&self, username: &str) -> StorageResult<Option<UserRecord>> {
        (**self).find_user(username).await
    }

    async fn find_keys_for_user(&self, username: &str) -> StorageResult<Vec<RegisteredKey>> {
        (**self).find_keys_for_user(username).await
    }

    async fn create_user(&self, user: &UserRecord) -> StorageResult<()> {
        (**self).create_user(user).await
    }

    async fn delete_user(&self, username: &str) -> StorageResult<()> {
        (**self).delete_user(username).await
    }

    async fn add_key(&self, key: &RegisteredKey) -> StorageResult<()> {
        (**self).add_key(key).await
    }

    async fn remove_key(&self, username: &str, key_id: &str) -> StorageResult<()> {
        (**self).remove_key(username, key_id).await
    }
}

#[derive(Debug, Default)]
struct RegistryState {
    users: HashMap<Username, UserRecord>,
    keys: HashMap<Username, BTreeMap<KeyId, RegisteredKey>>,
}

/// In-memory implementation of [`KeyRegistry`].
///
/// Users and keys live behind a single [`parking_lot::RwLock`], so every
/// mutation is atomic with respect to lookups. Cloning the registry yields
/// another handle to the same data.
///
/// # Examples
///
/// ```
/// use keyward_storage::auth::{KeyRegistry, MemoryKeyRegistry, RegisteredKey, UserRecord};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let registry = MemoryKeyRegistry::new();
///
///     registry.create_user(&UserRecord::builder().username("alice").build()).await?;
///     registry
///         .add_key(
///             &RegisteredKey::builder()
///                 .owner("alice")
///                 .key_id("laptop")
///                 .public_key("ssh-rsa AAAA... alice@laptop")
///                 .build(),
///         )
///         .await?;
///
///     let keys = registry.find_keys_for_user("alice").await?;
///     assert_eq!(keys.len(), 1);
///
///     Ok(())
/// }
/// ```
#[derive(Debug, Default, Clone)]
pub struct MemoryKeyRegistry {
    state: Arc<RwLock<RegistryState>>,
}

impl MemoryKeyRegistry {
    /// Creates a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyRegistry for MemoryKeyRegistry {
    #[tracing::instrument(skip(self))]
    async fn find_user(&self, username: &str) -> StorageResult<Option<UserRecord>> {
        Ok(self.state.read().users.get(username).cloned())
    }

    #[tracing::instrument(skip(self))]
    async fn find_keys_for_user(&self, username: &str) -> StorageResult<Vec<RegisteredKey>> {
        let state = self.state.read();
        Ok(state.keys.get(username).map(|keys| keys.values().cloned().collect()).unwrap_or_default())
    }

    #[tracing::instrument(skip(self, user), fields(username = %user.username))]
    async fn create_user(&self, user: &UserRecord) -> StorageResult<()> {
        let mut state = self.state.write();

        if state.users.contains_key(&user.username) {
            return Err(StorageError::conflict(format!("user:{}", user.username)));
        }

        state.users.insert(user.username.clone(), user.clone());
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn delete_user(&self, username: &str) -> StorageResult<()> {
        let mut state = self.state.write();

        if state.users.remove(username).is_none() {
            return Err(StorageError::not_found(format!("user:{username}")));
        }

        state.keys.remove(username);
        Ok(())
    }

    #[tracing::instrument(skip(self, key), fields(resource = %key.resource()))]
    async fn add_key(&self, key: &RegisteredKey) -> StorageResult<()> {
        let mut state = self.state.write();

        if !state.users.contains_key(&key.owner) {
            return Err(StorageError::not_found(format!("user:{}", key.owner)));
        }

        let owned = state.keys.entry(key.owner.clone()).or_default();
        if owned.contains_key(&key.key_id) {
            return Err(StorageError::conflict(key.resource()));
        }

        owned.insert(key.key_id.clone(), key.clone());
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn remove_key(&self, username: &str, key_id: &str) -> StorageResult<()> {
        let mut state = self.state.write();

        let removed = state.keys.get_mut(username).and_then(|owned| owned.remove(key_id));
        match removed {
            Some(_) => Ok(()),
            None => Err(StorageError::not_found(key_resource(
                &Username::from(username),
                &KeyId::from(key_id),
            ))),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::assert_storage_error;

    fn make_user(username: &str) -> UserRecord {
        UserRecord::builder().username(username).build()
    }

    fn make_key(owner: &str, key_id: &str) -> RegisteredKey {
        RegisteredKey::builder()
            .owner(owner)
            .key_id(key_id)
            .public_key(format!("ssh-rsa AAAAB3NzaC1yc2E {owner}@{key_id}"))
            .build()
    }

    async fn registry_with_user(username: &str) -> MemoryKeyRegistry {
        let registry = MemoryKeyRegistry::new();
        registry.create_user(&make_user(username)).await.expect("create_user should succeed");
        registry
    }

    #[tokio::test]
    async fn test_create_and_find_user() {
        let registry = registry_with_user("alice").await;

        let found = registry.find_user("alice").await.expect("find_user should succeed");
        assert_eq!(found.expect("user should exist").username.as_str(), "alice");
    }

    #[tokio::test]
    async fn test_find_unknown_user() {
        let registry = MemoryKeyRegistry::new();

        let found = registry.find_user("ghost").await.expect("lookup must not error");
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_create_duplicate_user_fails() {
        let registry = registry_with_user("alice").await;

        let result = registry.create_user(&make_user("alice")).await;
        assert_storage_error!(result, Conflict);
    }

    #[tokio::test]
    async fn test_add_key_for_unknown_owner_fails() {
        let registry = MemoryKeyRegistry::new();

        let result = registry.add_key(&make_key("ghost", "laptop")).await;
        assert_storage_error!(result, NotFound);
    }

    #[tokio::test]
    async fn test_add_duplicate_key_id_fails() {
        let registry = registry_with_user("alice").await;
        registry.add_key(&make_key("alice", "laptop")).await.expect("first add");

        let result = registry.add_key(&make_key("alice", "laptop")).await;
        assert_storage_error!(result, Conflict);
    }

    #[tokio::test]
    async fn test_same_key_id_different_owners() {
        let registry = registry_with_user("alice").await;
        registry.create_user(&make_user("bob")).await.expect("create bob");

        registry.add_key(&make_key("alice", "laptop")).await.expect("alice laptop");
        registry.add_key(&make_key("bob", "laptop")).await.expect("bob laptop");

        assert_eq!(registry.find_keys_for_user("alice").await.unwrap().len(), 1);
        assert_eq!(registry.find_keys_for_user("bob").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_find_keys_only_returns_owned_keys() {
        let registry = registry_with_user("alice").await;
        registry.create_user(&make_user("bob")).await.expect("create bob");

        registry.add_key(&make_key("alice", "laptop")).await.unwrap();
        registry.add_key(&make_key("alice", "phone")).await.unwrap();
        registry.add_key(&make_key("bob", "desktop")).await.unwrap();

        let keys = registry.find_keys_for_user("alice").await.unwrap();
        assert_eq!(keys.len(), 2);
        assert!(keys.iter().all(|k| k.owner.as_str() == "alice"));
    }

    #[tokio::test]
    async fn test_find_keys_for_user_without_keys_is_empty() {
        let registry = registry_with_user("alice").await;

        assert!(registry.find_keys_for_user("alice").await.unwrap().is_empty());
        assert!(registry.find_keys_for_user("ghost").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_remove_key_is_visible_immediately() {
        let registry = registry_with_user("alice").await;
        registry.add_key(&make_key("alice", "laptop")).await.unwrap();
        registry.add_key(&make_key("alice", "phone")).await.unwrap();

        registry.remove_key("alice", "laptop").await.expect("remove_key should succeed");

        let keys = registry.find_keys_for_user("alice").await.unwrap();
        assert_eq!(keys.len(), 1);
        assert_eq!(keys[0].key_id.as_str(), "phone");
    }

    #[tokio::test]
    async fn test_remove_missing_key_fails() {
        let registry = registry_with_user("alice").await;

        let result = registry.remove_key("alice", "laptop").await;
        assert_storage_error!(result, NotFound);

        let result = registry.remove_key("ghost", "laptop").await;
        assert_storage_error!(result, NotFound);
    }

    #[tokio::test]
    async fn test_delete_user_removes_owned_keys() {
        let registry = registry_with_user("alice").await;
        registry.add_key(&make_key("alice", "laptop")).await.unwrap();

        registry.delete_user("alice").await.expect("delete_user should succeed");

        assert!(registry.find_user("alice").await.unwrap().is_none());
        assert!(registry.find_keys_for_user("alice").await.unwrap().is_empty());

        // Re-creating the user must not resurrect old keys
        registry.create_user(&make_user("alice")).await.unwrap();
        assert!(registry.find_keys_for_user("alice").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_unknown_user_fails() {
        let registry = MemoryKeyRegistry::new();

        let result = registry.delete_user("ghost").await;
        assert_storage_error!(result, NotFound);
    }

    #[tokio::test]
    async fn test_clone_shares_state() {
        let registry = registry_with_user("alice").await;
        let handle = registry.clone();

        handle.add_key(&make_key("alice", "laptop")).await.unwrap();

        assert_eq!(registry.find_keys_for_user("alice").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_arc_dyn_registry() {
        let registry: Arc<dyn KeyRegistry> = Arc::new(MemoryKeyRegistry::new());
        registry.create_user(&make_user("alice")).await.unwrap();

        assert!(registry.find_user("alice").await.unwrap().is_some());
    }

    mod proptests {
        use std::collections::BTreeSet;

        use proptest::prelude::*;

        use super::*;

        #[derive(Debug, Clone)]
        enum Op {
            Add(u8),
            Remove(u8),
        }

        fn arb_ops() -> impl Strategy<Value = Vec<Op>> {
            proptest::collection::vec(
                prop_oneof![(0u8..8).prop_map(Op::Add), (0u8..8).prop_map(Op::Remove)],
                0..40,
            )
        }

        proptest! {
            /// After any sequence of enrollments and removals, the registry
            /// lists exactly the keys a set model says are present, and each
            /// mutation fails exactly when the model says it should.
            #[test]
            fn registry_matches_set_model(ops in arb_ops()) {
                let rt = tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
                    .expect("runtime");

                rt.block_on(async {
                    let registry = registry_with_user("alice").await;
                    let mut model = BTreeSet::new();

                    for op in &ops {
                        match *op {
                            Op::Add(n) => {
                                let res = registry.add_key(&make_key("alice", &format!("k{n}"))).await;
                                prop_assert_eq!(res.is_ok(), model.insert(n));
                            },
                            Op::Remove(n) => {
                                let res = registry.remove_key("alice", &format!("k{n}")).await;
                                prop_assert_eq!(res.is_ok(), model.remove(&n));
                            },
                        }
                    }

                    let listed: BTreeSet<String> = registry
                        .find_keys_for_user("alice")
                        .await
                        .unwrap()
                        .into_iter()
                        .map(|k| k.key_id.to_string())
                        .collect();
                    let expected: BTreeSet<String> = model.iter().map(|n| format!("k{n}")).collect();
                    prop_assert_eq!(listed, expected);
                    Ok(())
                })?;
            }
        }
    }
}
