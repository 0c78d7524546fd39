//! Record validation and normalization.
//!
//! Validation is a pure function of the record body and the tenant settings:
//! callers pass both explicitly, so the same rules run identically for
//! single-record writes and bulk imports. Normalization fills defaults and
//! recomputes the derived sort name before the record is persisted.

use chrono::NaiveDate;
use serde_json::{Map, Value};

use crate::auth::Role;
use crate::error::{StorageError, ValidationDetail, ValidationError};
use crate::tenant::TenantSettings;
use crate::types::{RecordKind, Scope};

/// Fields that must be present and non-empty for each kind.
fn required_fields(kind: RecordKind) -> &'static [&'static str] {
    match kind {
        RecordKind::Group => &["international_name", "type"],
        RecordKind::Person => &["family_name"],
        RecordKind::Work => &["title", "type"],
        RecordKind::Membership => &["person_id", "group_id"],
        RecordKind::User => &["userid", "credentials", "user_group"],
    }
}

/// Normalizes a record body before persisting.
///
/// Ensures the body is an object, defaults the scope to public, and
/// recomputes the derived `name` so it always reflects the current content.
pub fn normalize(kind: RecordKind, value: Value) -> Result<Value, ValidationError> {
    let Value::Object(mut body) = value else {
        return Err(ValidationError::NotAnObject);
    };

    if !body.contains_key("scope") {
        body.insert("scope".to_string(), Value::String("public".to_string()));
    }

    let name = derived_name(kind, &body);
    if !name.is_empty() {
        body.insert("name".to_string(), Value::String(name));
    }

    Ok(Value::Object(body))
}

/// Computes the sort name for a record body.
fn derived_name(kind: RecordKind, body: &Map<String, Value>) -> String {
    let text = |field: &str| body.get(field).and_then(Value::as_str).unwrap_or("");
    match kind {
        RecordKind::Group => text("international_name").to_string(),
        RecordKind::Person => {
            let family = text("family_name");
            let given = text("given_name");
            if given.is_empty() {
                family.to_string()
            } else {
                format!("{family}, {given}")
            }
        }
        RecordKind::Work => text("title").to_string(),
        RecordKind::Membership => {
            match (
                body.get("person_id").and_then(Value::as_i64),
                body.get("group_id").and_then(Value::as_i64),
            ) {
                (Some(person), Some(group)) => format!("{person}:{group}"),
                _ => String::new(),
            }
        }
        RecordKind::User => text("userid").to_string(),
    }
}

/// Validates a normalized record body against the tenant's vocabularies.
///
/// Collects every field error before failing, so clients see the full list
/// in one round trip.
pub fn validate(
    kind: RecordKind,
    value: &Value,
    settings: &TenantSettings,
) -> Result<(), StorageError> {
    let Some(body) = value.as_object() else {
        return Err(ValidationError::NotAnObject.into());
    };

    let mut details = Vec::new();

    for field in required_fields(kind) {
        let missing = match body.get(*field) {
            None | Some(Value::Null) => true,
            Some(Value::String(s)) => s.is_empty(),
            Some(_) => false,
        };
        if missing {
            details.push(ValidationDetail::body(*field, format!("{field} is required")));
        }
    }

    if let Some(scope) = body.get("scope").and_then(Value::as_str)
        && Scope::parse(scope).is_none()
    {
        details.push(ValidationDetail::body(
            "scope",
            format!("\"{scope}\" is not one of public, private"),
        ));
    }

    match kind {
        RecordKind::Group => {
            check_vocabulary(settings, body, "type", "group_type", &mut details)?;
            check_accounts(settings, body, "group_account_type", &mut details)?;
        }
        RecordKind::Person => {
            check_accounts(settings, body, "person_account_type", &mut details)?;
        }
        RecordKind::Work => {
            check_vocabulary(settings, body, "type", "work_type", &mut details)?;
            check_contributors(settings, body, &mut details)?;
        }
        RecordKind::Membership => {
            for field in ["person_id", "group_id"] {
                if let Some(value) = body.get(field)
                    && !value.is_null()
                    && value.as_i64().is_none()
                {
                    details.push(ValidationDetail::body(
                        field,
                        format!("{field} must be an integer id"),
                    ));
                }
            }
            for field in ["start_date", "end_date"] {
                if let Some(raw) = body.get(field).and_then(Value::as_str)
                    && NaiveDate::parse_from_str(raw, "%Y-%m-%d").is_err()
                {
                    details.push(ValidationDetail::body(
                        field,
                        format!("\"{raw}\" is not an ISO date"),
                    ));
                }
            }
            check_vocabulary(settings, body, "position", "position_type", &mut details)?;
        }
        RecordKind::User => {
            if let Some(level) = body.get("user_group").and_then(Value::as_u64)
                && Role::from_level(level.min(u8::MAX as u64) as u8).is_none()
            {
                details.push(ValidationDetail::body(
                    "user_group",
                    format!("{level} is not a known role level"),
                ));
            }
        }
    }

    if details.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::InvalidRecord { details }.into())
    }
}

/// Checks an optional field against a vocabulary category.
fn check_vocabulary(
    settings: &TenantSettings,
    body: &Map<String, Value>,
    field: &str,
    category: &str,
    details: &mut Vec<ValidationDetail>,
) -> Result<(), StorageError> {
    if let Some(value) = body.get(field).and_then(Value::as_str)
        && !value.is_empty()
        && !settings.contains(category, value)?
    {
        details.push(ValidationDetail::body(
            field,
            format!(
                "\"{value}\" is not one of {}",
                settings.allowed_values(category)?
            ),
        ));
    }
    Ok(())
}

/// Checks the `accounts` list: each entry needs a known type and a value.
fn check_accounts(
    settings: &TenantSettings,
    body: &Map<String, Value>,
    category: &str,
    details: &mut Vec<ValidationDetail>,
) -> Result<(), StorageError> {
    let Some(accounts) = body.get("accounts").and_then(Value::as_array) else {
        return Ok(());
    };
    for (index, account) in accounts.iter().enumerate() {
        let account_type = account.get("type").and_then(Value::as_str).unwrap_or("");
        if account_type.is_empty() {
            details.push(ValidationDetail::body(
                format!("accounts.{index}.type"),
                "type is required".to_string(),
            ));
        } else if !settings.contains(category, account_type)? {
            details.push(ValidationDetail::body(
                format!("accounts.{index}.type"),
                format!(
                    "\"{account_type}\" is not one of {}",
                    settings.allowed_values(category)?
                ),
            ));
        }
        if account
            .get("value")
            .and_then(Value::as_str)
            .is_none_or(str::is_empty)
        {
            details.push(ValidationDetail::body(
                format!("accounts.{index}.value"),
                "value is required".to_string(),
            ));
        }
    }
    Ok(())
}

/// Checks contributor roles on a work.
fn check_contributors(
    settings: &TenantSettings,
    body: &Map<String, Value>,
    details: &mut Vec<ValidationDetail>,
) -> Result<(), StorageError> {
    let Some(contributors) = body.get("contributors").and_then(Value::as_array) else {
        return Ok(());
    };
    for (index, contributor) in contributors.iter().enumerate() {
        if let Some(role) = contributor.get("role").and_then(Value::as_str)
            && !settings.contains("contributor_role", role)?
        {
            details.push(ValidationDetail::body(
                format!("contributors.{index}.role"),
                format!(
                    "\"{role}\" is not one of {}",
                    settings.allowed_values("contributor_role")?
                ),
            ));
        }
    }
    Ok(())
}
