//! Principals and their tokens.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::role::Role;

/// One token held by a principal.
///
/// Tokens are the unit of authorization input. They are computed once at
/// login (applying membership validity at that moment) and carried in the
/// session token, so the decision engine never goes back to storage.
///
/// Wire forms: `role:editor`, `user:jdoe`, `group:12:owner`,
/// `group:12:member`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum PrincipalToken {
    /// Tenant-wide role.
    Role(Role),
    /// The authenticated user itself.
    User(String),
    /// Ownership relation to a group record: grants view and edit on it.
    GroupOwner(i64),
    /// Membership relation to a group record: grants view on it.
    GroupMember(i64),
}

impl fmt::Display for PrincipalToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrincipalToken::Role(role) => write!(f, "role:{role}"),
            PrincipalToken::User(id) => write!(f, "user:{id}"),
            PrincipalToken::GroupOwner(id) => write!(f, "group:{id}:owner"),
            PrincipalToken::GroupMember(id) => write!(f, "group:{id}:member"),
        }
    }
}

impl FromStr for PrincipalToken {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.splitn(3, ':');
        match (parts.next(), parts.next(), parts.next()) {
            (Some("role"), Some(name), None) => name
                .parse::<Role>()
                .map(PrincipalToken::Role)
                .map_err(|_| format!("unknown role in token: {s}")),
            (Some("user"), Some(id), None) if !id.is_empty() => {
                Ok(PrincipalToken::User(id.to_string()))
            }
            (Some("group"), Some(id), Some(relation)) => {
                let id: i64 = id
                    .parse()
                    .map_err(|_| format!("non-numeric group id in token: {s}"))?;
                match relation {
                    "owner" => Ok(PrincipalToken::GroupOwner(id)),
                    "member" => Ok(PrincipalToken::GroupMember(id)),
                    _ => Err(format!("unknown relation in token: {s}")),
                }
            }
            _ => Err(format!("malformed principal token: {s}")),
        }
    }
}

impl TryFrom<String> for PrincipalToken {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PrincipalToken> for String {
    fn from(token: PrincipalToken) -> Self {
        token.to_string()
    }
}

/// An authenticated principal: a user id plus its tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// The login name of the user.
    pub userid: String,
    /// Tokens granted at login.
    pub tokens: Vec<PrincipalToken>,
}

impl Principal {
    /// Creates a principal from a user id and its tokens.
    pub fn new(userid: impl Into<String>, tokens: Vec<PrincipalToken>) -> Self {
        Self {
            userid: userid.into(),
            tokens,
        }
    }

    /// Creates a principal holding a single role token.
    pub fn with_role(userid: impl Into<String>, role: Role) -> Self {
        Self::new(userid, vec![PrincipalToken::Role(role)])
    }

    /// Returns the most privileged role among the principal's tokens.
    ///
    /// A principal without any role token acts as a viewer.
    pub fn role(&self) -> Role {
        self.tokens
            .iter()
            .filter_map(|t| match t {
                PrincipalToken::Role(role) => Some(*role),
                _ => None,
            })
            .max()
            .unwrap_or(Role::Viewer)
    }

    /// Returns true when the principal owns the given group record.
    pub fn owns_group(&self, id: i64) -> bool {
        self.tokens.contains(&PrincipalToken::GroupOwner(id))
    }

    /// Returns true when the principal is related to the given group record,
    /// as owner or as member.
    pub fn related_to_group(&self, id: i64) -> bool {
        self.owns_group(id) || self.tokens.contains(&PrincipalToken::GroupMember(id))
    }

    /// Group ids reachable through any relation token, for search filters.
    pub fn related_group_ids(&self) -> Vec<i64> {
        let mut ids: Vec<i64> = self
            .tokens
            .iter()
            .filter_map(|t| match t {
                PrincipalToken::GroupOwner(id) | PrincipalToken::GroupMember(id) => Some(*id),
                _ => None,
            })
            .collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }
}
