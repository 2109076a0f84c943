//! Typed identifiers
//!
//! Board, column, card and message ids are ULIDs minted by the server.
//! User ids come from the enrolment collaborator and are free-form.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wrap an existing id string
            pub fn from_string(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// The id as a string slice
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }
    };
}

macro_rules! ulid_id {
    ($name:ident) => {
        impl $name {
            /// Mint a fresh id
            pub fn new() -> Self {
                Self(ulid::Ulid::new().to_string())
            }
        }
    };
}

define_id!(
    /// Board identifier
    BoardId
);
define_id!(
    /// Column identifier
    ColumnId
);
define_id!(
    /// Card identifier
    CardId
);
define_id!(
    /// Discussion message identifier
    MessageId
);
define_id!(
    /// User identifier, as supplied by enrolment
    UserId
);

ulid_id!(BoardId);
ulid_id!(ColumnId);
ulid_id!(CardId);
ulid_id!(MessageId);
