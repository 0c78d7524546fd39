//! Roles, actions, and the role/action table.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Tenant-wide role of a principal.
///
/// Roles form a total order from least to most privileged. The numeric
/// levels are the wire form used by `user_group` fields and the client
/// configuration export; they are never compared in authorization decisions,
/// which go through [`permits`] instead.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Read access to public records.
    Viewer,
    /// Viewer rights plus per-record rights via ownership relations.
    Owner,
    /// May create and modify records.
    Editor,
    /// May delete records and run bulk imports.
    Manager,
    /// Full control of the tenant.
    Admin,
}

/// An operation a principal may attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// Read a single record.
    View,
    /// Create a new record.
    Add,
    /// Modify an existing record.
    Edit,
    /// Remove a record.
    Delete,
    /// Bulk upsert of many records.
    Import,
    /// List and filter records.
    Search,
}

impl Role {
    /// All roles, least privileged first.
    pub const ALL: [Role; 5] = [
        Role::Viewer,
        Role::Owner,
        Role::Editor,
        Role::Manager,
        Role::Admin,
    ];

    /// Returns the numeric level used on the wire.
    pub fn level(self) -> u8 {
        match self {
            Role::Viewer => 10,
            Role::Owner => 40,
            Role::Editor => 60,
            Role::Manager => 80,
            Role::Admin => 100,
        }
    }

    /// Resolves a wire level back to a role.
    pub fn from_level(level: u8) -> Option<Role> {
        Role::ALL.into_iter().find(|r| r.level() == level)
    }

    /// Returns the lowercase name of the role.
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Viewer => "viewer",
            Role::Owner => "owner",
            Role::Editor => "editor",
            Role::Manager => "manager",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or(())
    }
}

impl Action {
    /// Returns the lowercase name of the action.
    pub fn as_str(self) -> &'static str {
        match self {
            Action::View => "view",
            Action::Add => "add",
            Action::Edit => "edit",
            Action::Delete => "delete",
            Action::Import => "import",
            Action::Search => "search",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The role/action table.
///
/// This is the single source of truth for role-based rights. Every arm is
/// spelled out so that adding a role or an action forces a decision here.
pub fn permits(role: Role, action: Action) -> bool {
    match action {
        Action::View | Action::Search => match role {
            Role::Viewer | Role::Owner | Role::Editor | Role::Manager | Role::Admin => true,
        },
        Action::Add | Action::Edit => match role {
            Role::Viewer | Role::Owner => false,
            Role::Editor | Role::Manager | Role::Admin => true,
        },
        Action::Delete | Action::Import => match role {
            Role::Viewer | Role::Owner | Role::Editor => false,
            Role::Manager | Role::Admin => true,
        },
    }
}
