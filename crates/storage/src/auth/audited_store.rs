//! Audit-logging decorator for [`KeyRegistry`] implementations.
//!
//! Wraps any registry to emit an [`AuditEvent`] for every mutation, without
//! modifying the underlying store. Lookups pass through unaudited: they sit
//! on the per-request verification path.

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;

use super::{
    audit::{AuditAction, AuditEvent, AuditLogger, AuditResult},
    registered_key::{RegisteredKey, key_resource},
    store::KeyRegistry,
    user::UserRecord,
};
use crate::{
    error::StorageResult,
    types::{KeyId, Username},
};

/// Decorator that adds audit logging to any [`KeyRegistry`].
///
/// # Usage
///
/// ```no_run
/// use keyward_storage::auth::audited_store::AuditedKeyRegistry;
/// use keyward_storage::auth::audit::TracingAuditLogger;
/// use keyward_storage::auth::MemoryKeyRegistry;
///
/// let registry = MemoryKeyRegistry::new();
/// let audited = AuditedKeyRegistry::new(registry, TracingAuditLogger, "admin");
/// ```
pub struct AuditedKeyRegistry<R, L> {
    inner: R,
    logger: L,
    actor: Arc<str>,
}

impl<R, L> AuditedKeyRegistry<R, L>
where
    R: KeyRegistry,
    L: AuditLogger,
{
    /// Creates a new audited registry wrapping the given registry and logger.
    pub fn new(inner: R, logger: L, actor: impl Into<Arc<str>>) -> Self {
        Self { inner, logger, actor: actor.into() }
    }

    /// Returns a reference to the inner registry.
    pub fn inner(&self) -> &R {
        &self.inner
    }

    async fn emit(
        &self,
        action: AuditAction,
        resource: String,
        result: AuditResult,
        metadata: HashMap<String, String>,
    ) {
        let event = AuditEvent::builder()
            .actor(self.actor.to_string())
            .action(action)
            .resource(resource)
            .result(result)
            .metadata(metadata)
            .build();
        self.logger.log(&event).await;
    }

    fn result_from<T>(res: &StorageResult<T>) -> AuditResult {
        match res {
            Ok(_) => AuditResult::Success,
            Err(e) => AuditResult::Failure(e.to_string()),
        }
    }
}

#[async_trait]
impl<R, L> KeyRegistry for AuditedKeyRegistry<R, L>
where
    R: KeyRegistry,
    L: AuditLogger,
{
    async fn find_user(&self, username: &str) -> StorageResult<Option<UserRecord>> {
        self.inner.find_user(username).await
    }

    async fn find_keys_for_user(&self, username: &str) -> StorageResult<Vec<RegisteredKey>> {
        self.inner.find_keys_for_user(username).await
    }

    async fn create_user(&self, user: &UserRecord) -> StorageResult<()> {
        let res = self.inner.create_user(user).await;
        self.emit(
            AuditAction::CreateUser,
            format!("user:{}", user.username),
            Self::result_from(&res),
            HashMap::new(),
        )
        .await;
        res
    }

    async fn delete_user(&self, username: &str) -> StorageResult<()> {
        let res = self.inner.delete_user(username).await;
        self.emit(
            AuditAction::DeleteUser,
            format!("user:{username}"),
            Self::result_from(&res),
            HashMap::new(),
        )
        .await;
        res
    }

    async fn add_key(&self, key: &RegisteredKey) -> StorageResult<()> {
        let res = self.inner.add_key(key).await;
        self.emit(AuditAction::AddKey, key.resource(), Self::result_from(&res), HashMap::new())
            .await;
        res
    }

    async fn remove_key(&self, username: &str, key_id: &str) -> StorageResult<()> {
        let res = self.inner.remove_key(username, key_id).await;
        self.emit(
            AuditAction::RemoveKey,
            key_resource(&Username::from(username), &KeyId::from(key_id)),
            Self::result_from(&res),
            HashMap::new(),
        )
        .await;
        res
    }
}
