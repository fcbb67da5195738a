//! User records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::types::Username;

/// A user known to the registry.
///
/// The record holds only the identity and free-form profile attributes.
/// Public keys reference their owner by username; the user record never
/// lists its keys.
///
/// # Example
///
/// ```
/// use keyward_storage::auth::UserRecord;
/// use serde_json::json;
///
/// let user = UserRecord::builder()
///     .username("alice")
///     .attributes(json!({"email": "alice@example.com"}).as_object().cloned().unwrap_or_default())
///     .build();
///
/// assert_eq!(user.username.as_str(), "alice");
/// assert_eq!(user.attributes["email"], "alice@example.com");
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, bon::Builder)]
#[serde(deny_unknown_fields)]
pub struct UserRecord {
    /// Unique username.
    #[builder(into)]
    pub username: Username,

    /// Arbitrary profile attributes (display name, email, ...).
    #[serde(default)]
    #[builder(default)]
    pub attributes: Map<String, Value>,

    /// When the user was created.
    #[builder(default = Utc::now())]
    pub created_at: DateTime<Utc>,
}

impl UserRecord {
    /// Returns a profile attribute by name.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }
}
