//! Authorization model: roles, principals, and the decision engine.
//!
//! Authorization combines two inputs. A principal's *role* grants tenant-wide
//! rights according to a fixed role/action table, and its *relation tokens*
//! grant extra rights on individual records (a group owner may edit that
//! group without holding the editor role). Delete and bulk import are role
//! gated only and can never be reached through a relation.

mod engine;
mod principal;
mod role;

pub use engine::{authorize, visibility, Visibility};
pub use principal::{Principal, PrincipalToken};
pub use role::{permits, Action, Role};
