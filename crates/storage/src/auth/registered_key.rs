//! Registered public key records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{KeyId, Username};

/// A public key enrolled by a user.
///
/// The record stores the owning user's name rather than the user storing a
/// list of keys. Records are created on enrollment and deleted on
/// revocation; they are never modified in place.
///
/// # Key material
///
/// `public_key` holds the OpenSSH public key line exactly as enrolled
/// (`ssh-rsa AAAAB3NzaC1yc2E... comment`). The registry treats it as an
/// opaque string; parsing happens on the verification path.
///
/// # Example
///
/// ```
/// use keyward_storage::auth::RegisteredKey;
///
/// let key = RegisteredKey::builder()
///     .owner("alice")
///     .key_id("laptop")
///     .public_key("ssh-rsa AAAAB3NzaC1yc2EAAAADAQABAAABAQ... alice@laptop")
///     .build();
///
/// assert_eq!(key.owner.as_str(), "alice");
/// assert_eq!(key.key_id.as_str(), "laptop");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, bon::Builder)]
#[serde(deny_unknown_fields)]
pub struct RegisteredKey {
    /// Username of the owning user.
    #[builder(into)]
    pub owner: Username,

    /// Identifier of this key, unique among the owner's keys.
    #[builder(into)]
    pub key_id: KeyId,

    /// OpenSSH-encoded public key.
    #[builder(into)]
    pub public_key: String,

    /// When the key was enrolled.
    #[builder(default = Utc::now())]
    pub created_at: DateTime<Utc>,
}

impl RegisteredKey {
    /// Returns a resource identifier of the form `user:{owner}/key:{key_id}`.
    ///
    /// Used in log fields and audit events.
    #[must_use]
    pub fn resource(&self) -> String {
        key_resource(&self.owner, &self.key_id)
    }
}

/// Constructs a resource identifier string from an owner and key id.
pub fn key_resource(owner: &Username, key_id: &KeyId) -> String {
    format!("user:{owner}/key:{key_id}")
}
