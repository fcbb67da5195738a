//! Identifier types shared by the registry and its consumers.

/// Macro to define a newtype wrapper around `String` with standard trait
/// implementations.
///
/// Each generated type:
/// - Is a transparent wrapper around `String`
/// - Derives `Clone`, `Debug`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - Derives `Serialize` and `Deserialize` (transparent)
/// - Implements `From<&str>`, `From<String>`, `AsRef<str>` and `Borrow<str>`
/// - Implements `Display` that outputs the inner value
macro_rules! define_name {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord,
            serde::Serialize, serde::Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            /// Returns the identifier as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl std::borrow::Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

define_name!(
    /// Username identifying a user record.
    ///
    /// Usernames are the identity a client claims in a signed request and
    /// the owner reference stored on every registered key.
    ///
    /// # Examples
    ///
    /// ```
    /// use keyward_storage::Username;
    ///
    /// let user = Username::from("alice");
    /// assert_eq!(user.as_str(), "alice");
    /// assert_eq!(user.to_string(), "alice");
    /// ```
    Username
);

define_name!(
    /// Identifier of a registered key, unique per owning user.
    ///
    /// Typically names the enrolled device (for example `"laptop"`).
    ///
    /// # Examples
    ///
    /// ```
    /// use keyward_storage::KeyId;
    ///
    /// let kid = KeyId::from("laptop");
    /// assert_eq!(kid.as_ref(), "laptop");
    /// ```
    KeyId
);
