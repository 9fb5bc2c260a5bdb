//! Newtype IDs for type-safe document references.
//!
//! Firestore document IDs are opaque strings (auto-generated 20-character
//! keys, or caller-chosen keys such as a user ID for cart documents). The
//! `define_doc_id!` macro creates string-backed wrappers so IDs from
//! different collections cannot be mixed up.

/// Macro to define a type-safe document ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`
/// - Conversion methods: `new()`, `as_str()`, `into_inner()`
/// - `From<String>`, `From<&str>`, and `Display` implementations
///
/// # Example
///
/// ```rust
/// # use zinoshop_core::define_doc_id;
/// define_doc_id!(UserId);
/// define_doc_id!(OrderId);
///
/// let user_id = UserId::new("k2J9vR3mXq81LwPdN0Ya");
/// let order_id = OrderId::new("t7Hb2cQf44ZsEmKxA9Wu");
///
/// // These are different types, so this won't compile:
/// // let _: UserId = order_id;
/// ```
#[macro_export]
macro_rules! define_doc_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from a string value.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the ID as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the ID and return its inner string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

// Define standard entity IDs
define_doc_id!(UserId);
define_doc_id!(ProductId);
define_doc_id!(OrderId);
define_doc_id!(OrderItemId);
define_doc_id!(CartItemId);
define_doc_id!(WishlistItemId);
define_doc_id!(BlogPostId);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_doc_id_roundtrip() {
        let id = ProductId::new("k2J9vR3mXq81LwPdN0Ya");
        assert_eq!(id.as_str(), "k2J9vR3mXq81LwPdN0Ya");
        assert_eq!(id.to_string(), "k2J9vR3mXq81LwPdN0Ya");
        assert_eq!(String::from(id), "k2J9vR3mXq81LwPdN0Ya");
    }

    #[test]
    fn test_doc_id_serde_transparent() {
        let id = UserId::new("abc123");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"abc123\"");

        let parsed: UserId = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_doc_id_equality() {
        assert_eq!(OrderId::new("x"), OrderId::from("x"));
        assert_ne!(OrderId::new("x"), OrderId::new("y"));
    }
}
