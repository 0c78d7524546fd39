//! The authorization decision procedure.

use crate::error::AccessError;
use crate::types::{RecordKind, Scope, StoredRecord};

use super::principal::Principal;
use super::role::{permits, Action, Role};

/// What a principal may see when listing records of a kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Visibility {
    /// Every record of the tenant.
    All,
    /// Public records, plus the named group records reachable through a
    /// relation token.
    Restricted {
        /// Group ids granted by relation tokens.
        group_ids: Vec<i64>,
    },
}

/// Decides whether `principal` may perform `action`.
///
/// For collection-level actions (create, search, bulk import) pass `None` as
/// the record; for record-level actions pass the stored record so relation
/// grants and record scope can be applied. Denials carry the action and kind
/// for the error message, never the reason a grant was absent.
pub fn authorize(
    principal: &Principal,
    action: Action,
    kind: RecordKind,
    record: Option<&StoredRecord>,
) -> Result<(), AccessError> {
    let role = principal.role();
    let role_grant = permits(role, action);

    let allowed = match record {
        None => role_grant,
        Some(record) => match action {
            Action::View | Action::Search => {
                role_grant && visible(principal, role, kind, record)
            }
            Action::Edit => {
                role_grant || (kind == RecordKind::Group && principal.owns_group(record.id))
            }
            // Never grantable through a relation.
            Action::Delete | Action::Import => role_grant,
            Action::Add => role_grant,
        },
    };

    if allowed {
        Ok(())
    } else {
        Err(AccessError::Forbidden {
            action: action.to_string(),
            kind: kind.to_string(),
        })
    }
}

/// Record-scope visibility: editors and above see everything, everyone else
/// sees public records and group records they hold a relation to.
fn visible(principal: &Principal, role: Role, kind: RecordKind, record: &StoredRecord) -> bool {
    if sees_all(role) || record.scope() == Scope::Public {
        return true;
    }
    kind == RecordKind::Group && principal.related_to_group(record.id)
}

/// Derives the listing filter for a principal.
pub fn visibility(principal: &Principal) -> Visibility {
    if sees_all(principal.role()) {
        Visibility::All
    } else {
        Visibility::Restricted {
            group_ids: principal.related_group_ids(),
        }
    }
}

fn sees_all(role: Role) -> bool {
    match role {
        Role::Viewer | Role::Owner => false,
        Role::Editor | Role::Manager | Role::Admin => true,
    }
}
