pub mod catalog;
pub mod delegate;
pub mod router;

pub use catalog::{
    EVENTS, JOURNALS, LOGINS, NULLABLE_REFERENCES, PARTNERS, RESOURCES, SURVEYS, USERS,
};
pub use delegate::{Delegation, ParentScope, ScopedRequest};
pub use router::ResourceRouter;

/// Column set by the write path when a record is inserted
pub const CREATED_AT: &str = "createdAt";

/// Column refreshed by the write path on every insert and update
pub const UPDATED_AT: &str = "updatedAt";

/// Declarative description of one resource: where it is mounted, which
/// table backs it, and which fields callers may write.
#[derive(Debug, PartialEq, Eq)]
pub struct ResourceSpec {
    /// Singular display name used in messages ("User")
    pub name: &'static str,
    /// Plural display name used in list messages ("Users")
    pub plural: &'static str,
    /// Path segment the router is mounted under ("users")
    pub path: &'static str,
    pub table: &'static str,
    /// Store-assigned identifier column, also the name of the `:id` path parameter
    pub primary_key: &'static str,
    /// Allow-list of columns accepted from request bodies
    pub writable: &'static [&'static str],
    /// Parent identifier column for resources nested under another resource
    pub parent: Option<&'static str>,
}

impl ResourceSpec {
    pub fn is_writable(&self, field: &str) -> bool {
        self.writable.contains(&field)
    }

    /// Fields that only ever come from the URL path, never from a body
    pub fn path_fields(&self) -> Vec<&'static str> {
        let mut fields = vec![self.primary_key];
        if let Some(parent) = self.parent {
            fields.push(parent);
        }
        fields
    }

    /// Path pattern for the record-level routes, e.g. "/:userId"
    pub fn item_path(&self) -> String {
        format!("/:{}", self.primary_key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_fields_include_parent() {
        assert_eq!(USERS.path_fields(), vec!["userId"]);
        assert_eq!(PARTNERS.path_fields(), vec!["partnerId", "userId"]);
    }

    #[test]
    fn item_path_uses_primary_key() {
        assert_eq!(USERS.item_path(), "/:userId");
        assert_eq!(JOURNALS.item_path(), "/:journalId");
    }
}
