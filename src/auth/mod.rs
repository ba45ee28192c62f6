use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::store::StoreError;

/// User role attached to a session. Unknown role strings from the user
/// store degrade to `Member`, which can read but not mutate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Editor,
    Member,
}

impl Role {
    pub fn from_db(value: &str) -> Role {
        match value {
            "admin" => Role::Admin,
            "editor" => Role::Editor,
            _ => Role::Member,
        }
    }
}

/// Authenticated user context resolved from the session cookie.
#[derive(Debug, Clone)]
pub struct Principal {
    pub username: String,
    pub role: Role,
}

impl Principal {
    pub fn can_edit(&self) -> bool {
        matches!(self.role, Role::Admin | Role::Editor)
    }

    /// Gate for all mutating routes. Insufficient role is an explicit 403,
    /// not a generic failure.
    pub fn require_editor(&self) -> Result<(), ApiError> {
        if self.can_edit() {
            Ok(())
        } else {
            Err(ApiError::forbidden(
                "Only Admins and Editors can perform this action",
            ))
        }
    }
}

/// Session lookup seam. The session and user stores themselves are external
/// collaborators; this API only needs token -> principal resolution.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Resolve a session token to its principal, or `None` when the token
    /// is unknown or expired.
    async fn principal_for(&self, token: &str) -> Result<Option<Principal>, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_role_degrades_to_member() {
        assert_eq!(Role::from_db("admin"), Role::Admin);
        assert_eq!(Role::from_db("editor"), Role::Editor);
        assert_eq!(Role::from_db("superuser"), Role::Member);
    }

    #[test]
    fn member_cannot_edit() {
        let member = Principal {
            username: "viewer".to_string(),
            role: Role::Member,
        };
        assert!(member.require_editor().is_err());

        let editor = Principal {
            username: "ops".to_string(),
            role: Role::Editor,
        };
        assert!(editor.require_editor().is_ok());
    }
}
