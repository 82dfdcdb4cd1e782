/// Shared types used across the codebase

use serde::{Deserialize, Serialize};

/// Operations a resource router can perform
/// Used by payload validation and by request logging
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operation {
    List,
    Get,
    Create,
    Update,
    Delete,
}

impl Operation {
    /// Whether the operation writes a request body into the store
    pub fn writes(&self) -> bool {
        matches!(self, Operation::Create | Operation::Update)
    }

    /// Whether the request body is checked for path-only fields
    pub fn checks_body(&self) -> bool {
        matches!(self, Operation::Get | Operation::Create | Operation::Update)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::List => "list",
            Operation::Get => "get",
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Delete => "delete",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_create_and_update_write() {
        assert!(Operation::Create.writes());
        assert!(Operation::Update.writes());
        assert!(!Operation::Get.writes());
        assert!(!Operation::Delete.writes());
    }

    #[test]
    fn list_and_delete_ignore_body() {
        assert!(!Operation::List.checks_body());
        assert!(!Operation::Delete.checks_body());
        assert!(Operation::Get.checks_body());
    }
}
