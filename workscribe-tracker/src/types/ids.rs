//! Newtype identifiers
//!
//! Generated ids are ULIDs so they sort by creation time. Identifiers that come
//! from outside the tracker (orgs, actors) are opaque strings.

use rusqlite::types::{FromSql, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Generate a fresh ULID-based id
            pub fn new() -> Self {
                Self(ulid::Ulid::new().to_string())
            }

            /// Wrap an existing id
            pub fn from_string(s: impl Into<String>) -> Self {
                Self(s.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl ToSql for $name {
            fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                Ok(ToSqlOutput::from(self.0.as_str()))
            }
        }

        impl FromSql for $name {
            fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                value.as_str().map(Self::from_string)
            }
        }
    };
}

define_id!(
    /// Tenant identifier
    OrgId
);
define_id!(
    /// A user acting on the tracker or receiving notifications
    ActorId
);
define_id!(ProjectId);
define_id!(
    /// A status column of a project board
    StatusId
);
define_id!(TaskId);
define_id!(SprintId);
define_id!(CommentId);
define_id!(
    /// A wiki space grouping page trees
    SpaceId
);
define_id!(PageId);
define_id!(ActivityId);
define_id!(NotificationId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_are_unique() {
        let a = TaskId::new();
        let b = TaskId::new();
        assert_ne!(a, b);
        assert_eq!(a.as_str().len(), 26);
    }

    #[test]
    fn test_id_serializes_transparently() {
        let id = SprintId::from_string("01HZX");
        assert_eq!(serde_json::to_value(&id).unwrap(), serde_json::json!("01HZX"));
        let back: SprintId = serde_json::from_str("\"01HZX\"").unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_id_sql_roundtrip() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        let id = ActorId::from("alice");
        let loaded: ActorId = conn
            .query_row("SELECT ?1", [&id], |row| row.get(0))
            .unwrap();
        assert_eq!(loaded, id);
    }
}
