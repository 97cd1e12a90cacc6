//! Account roles and the per-request caller identity.
//!
//! Every access decision matches exhaustively on [`Role`], so adding a role
//! forces each decision point to be revisited.

use crate::{EngineError, ResultEngine};

/// Closed set of account roles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Role {
    NormalUser,
    StoreOwner,
    Administrator,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::NormalUser, Role::StoreOwner, Role::Administrator];

    /// Label stored in the `users.role` column.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NormalUser => "Normal User",
            Self::StoreOwner => "Store Owner",
            Self::Administrator => "System Administrator",
        }
    }
}

impl TryFrom<&str> for Role {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "Normal User" => Ok(Self::NormalUser),
            "Store Owner" => Ok(Self::StoreOwner),
            "System Administrator" => Ok(Self::Administrator),
            other => Err(EngineError::InvalidRole(other.to_string())),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The authenticated caller of a request.
///
/// Built by the server from a verified bearer token and passed explicitly to
/// every engine operation that depends on identity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Session {
    pub user_id: i32,
    pub role: Role,
}

impl Session {
    pub fn new(user_id: i32, role: Role) -> Self {
        Self { user_id, role }
    }

    /// Endpoint gate: fails unless the caller has one of `allowed`.
    pub fn require_any(&self, allowed: &[Role]) -> ResultEngine<()> {
        if allowed.contains(&self.role) {
            Ok(())
        } else {
            Err(EngineError::access_denied())
        }
    }

    /// Shoppers rate stores; administrators do not.
    pub fn can_rate(&self) -> bool {
        match self.role {
            Role::NormalUser | Role::StoreOwner => true,
            Role::Administrator => false,
        }
    }

    /// Create, edit and delete users and stores.
    pub fn can_manage(&self) -> bool {
        match self.role {
            Role::Administrator => true,
            Role::NormalUser | Role::StoreOwner => false,
        }
    }

    pub fn can_edit_profile(&self, user_id: i32) -> bool {
        match self.role {
            Role::Administrator => true,
            Role::NormalUser | Role::StoreOwner => self.user_id == user_id,
        }
    }

    /// Individual ratings of a store are visible to its owner and to
    /// administrators.
    pub fn can_view_store_feedback(&self, owner_id: Option<i32>) -> bool {
        match self.role {
            Role::Administrator => true,
            Role::StoreOwner => owner_id == Some(self.user_id),
            Role::NormalUser => false,
        }
    }

    pub(crate) fn ensure(&self, allowed: bool) -> ResultEngine<()> {
        if allowed {
            Ok(())
        } else {
            Err(EngineError::access_denied())
        }
    }
}
