use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wraps an existing identifier string.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Returns true if the identifier is empty or only whitespace.
            pub fn is_blank(&self) -> bool {
                self.0.trim().is_empty()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

string_id!(
    /// Unique identifier for an order.
    ///
    /// Freshly generated ids are UUID v4 strings, but any opaque string the
    /// store already holds (e.g. `"ord123"`) is a valid id for lookups.
    OrderId
);

string_id!(
    /// Subject of the authenticated caller, as supplied by the gateway.
    UserId
);

string_id!(
    /// Identifier of the restaurant an order is placed with.
    RestaurantId
);

string_id!(
    /// Identifier of a menu item.
    ItemId
);

impl OrderId {
    /// Generates a new random order ID.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}
