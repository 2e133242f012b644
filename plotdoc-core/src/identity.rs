//! Identity types for properties, units, documents and categories.
//!
//! Every identity in this system is a database-assigned integer. Each gets
//! its own newtype so a `UnitId` can never be passed where a `PropertyId` is
//! expected.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Timestamp type using UTC timezone.
pub type Timestamp = DateTime<Utc>;

macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            pub const fn new(value: i64) -> Self {
                Self(value)
            }

            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

numeric_id!(
    /// Identity of a listed property.
    PropertyId
);
numeric_id!(
    /// Database id of a plot, land plot or block. Only unique within one kind.
    UnitId
);
numeric_id!(
    /// Identity of a stored document.
    DocumentId
);
numeric_id!(
    /// Identity of a document category.
    CategoryId
);
