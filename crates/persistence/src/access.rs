//! The record access layer.
//!
//! [`RecordService`] is the single entry point for everything the HTTP
//! surface does with records. Every operation runs the same pipeline:
//! authorize, validate, normalize, persist, audit. Handlers never talk to
//! the storage traits directly.

use std::sync::Arc;

use chrono::Utc;
use serde_json::{Value, json};

use crate::auth::{Action, Principal, PrincipalToken, Role};
use crate::core::{RelationSide, Store};
use crate::error::{ResourceError, StorageResult, ValidationError};
use crate::sequence::IdSequence;
use crate::services::AuditLog;
use crate::tenant::{TenantContext, TenantId};
use crate::types::{
    BulkCursor, BulkPage, Listing, RecordKind, SearchQuery, StoredRecord, merge_content,
};
use crate::validate;

/// Result of a bulk import, as reported to the client.
pub use crate::core::BulkOutcome;

/// Orchestrates record operations over a storage backend.
pub struct RecordService<S> {
    storage: Arc<S>,
    audit: Arc<dyn AuditLog>,
}

impl<S: Store> RecordService<S> {
    /// Creates a service over the given backend and audit sink.
    pub fn new(storage: Arc<S>, audit: Arc<dyn AuditLog>) -> Self {
        Self { storage, audit }
    }

    /// Returns the underlying storage backend.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Creates a record, minting an id when the body carries none.
    pub async fn create(
        &self,
        ctx: &TenantContext,
        kind: RecordKind,
        body: Value,
    ) -> StorageResult<StoredRecord> {
        ctx.authorize(Action::Add, kind)?;
        let body = validate::normalize(kind, body)?;
        validate::validate(kind, &body, ctx.settings())?;

        let record = self.storage.create(ctx.tenant_id(), kind, body).await?;
        self.audit(ctx, Action::Add, kind, record.id);
        Ok(record)
    }

    /// Reads a record, applying record-level visibility.
    pub async fn read(
        &self,
        ctx: &TenantContext,
        kind: RecordKind,
        id: i64,
    ) -> StorageResult<StoredRecord> {
        let record = self
            .storage
            .read(ctx.tenant_id(), kind, id)
            .await?
            .ok_or_else(|| ResourceError::NotFound {
                kind: kind.to_string(),
                id,
            })?;
        ctx.authorize_record(Action::View, &record)?;
        Ok(record)
    }

    /// Applies a partial update: omitted keys keep their stored value.
    pub async fn update(
        &self,
        ctx: &TenantContext,
        kind: RecordKind,
        id: i64,
        patch: Value,
    ) -> StorageResult<StoredRecord> {
        // Merging a non-object patch would be a silent no-op.
        if !patch.is_object() {
            return Err(ValidationError::NotAnObject.into());
        }
        let current = self
            .storage
            .read(ctx.tenant_id(), kind, id)
            .await?
            .ok_or_else(|| ResourceError::NotFound {
                kind: kind.to_string(),
                id,
            })?;
        ctx.authorize_record(Action::Edit, &current)?;

        let merged = merge_content(&current.content, patch);
        let merged = validate::normalize(kind, merged)?;
        validate::validate(kind, &merged, ctx.settings())?;

        let record = self.storage.replace(ctx.tenant_id(), kind, id, merged).await?;
        self.audit(ctx, Action::Edit, kind, id);
        Ok(record)
    }

    /// Deletes a record. Role gated; relations never grant this.
    pub async fn delete(
        &self,
        ctx: &TenantContext,
        kind: RecordKind,
        id: i64,
    ) -> StorageResult<()> {
        let current = self
            .storage
            .read(ctx.tenant_id(), kind, id)
            .await?
            .ok_or_else(|| ResourceError::NotFound {
                kind: kind.to_string(),
                id,
            })?;
        ctx.authorize_record(Action::Delete, &current)?;

        self.storage.delete(ctx.tenant_id(), kind, id).await?;
        self.audit(ctx, Action::Delete, kind, id);
        Ok(())
    }

    /// Lists records with the caller's visibility applied.
    pub async fn search(
        &self,
        ctx: &TenantContext,
        kind: RecordKind,
        query: &SearchQuery,
    ) -> StorageResult<Listing> {
        ctx.authorize(Action::Search, kind)?;
        self.storage
            .search(ctx.tenant_id(), kind, query, &ctx.visibility())
            .await
    }

    /// Projects a listing into snippets, attaching relation counts.
    pub async fn snippets(
        &self,
        ctx: &TenantContext,
        kind: RecordKind,
        records: &[StoredRecord],
    ) -> StorageResult<Vec<Value>> {
        let ids: Vec<i64> = records.iter().map(|r| r.id).collect();
        let counts = match kind {
            RecordKind::Group => Some(
                self.storage
                    .membership_counts(ctx.tenant_id(), RelationSide::Group, &ids)
                    .await?,
            ),
            RecordKind::Person => Some(
                self.storage
                    .membership_counts(ctx.tenant_id(), RelationSide::Person, &ids)
                    .await?,
            ),
            _ => None,
        };

        let snippets = records
            .iter()
            .map(|record| {
                let mut snippet = json!({
                    "id": record.id,
                    "name": record.name(),
                    "scope": record.scope().as_str(),
                });
                let count = counts
                    .as_ref()
                    .map(|c| c.get(&record.id).copied().unwrap_or(0));
                match kind {
                    RecordKind::Group => {
                        snippet["type"] = record.field("type").into();
                        snippet["members"] = count.into();
                    }
                    RecordKind::Person => {
                        snippet["memberships"] = count.into();
                    }
                    RecordKind::Work => {
                        snippet["type"] = record.field("type").into();
                    }
                    RecordKind::Membership => {
                        snippet["person_id"] = record.int_field("person_id").into();
                        snippet["group_id"] = record.int_field("group_id").into();
                    }
                    RecordKind::User => {
                        snippet["userid"] = record.field("userid").into();
                    }
                }
                snippet
            })
            .collect();
        Ok(snippets)
    }

    /// Imports a batch atomically. Validation of any record aborts the lot.
    pub async fn bulk_import(
        &self,
        ctx: &TenantContext,
        kind: RecordKind,
        records: Vec<Value>,
    ) -> StorageResult<BulkOutcome> {
        ctx.authorize(Action::Import, kind)?;

        let mut normalized = Vec::with_capacity(records.len());
        for body in records {
            let body = validate::normalize(kind, body)?;
            validate::validate(kind, &body, ctx.settings())?;
            normalized.push(body);
        }

        let outcome = self
            .storage
            .bulk_upsert(ctx.tenant_id(), kind, normalized)
            .await?;
        self.audit(ctx, Action::Import, kind, 0);
        Ok(outcome)
    }

    /// Returns one page of the cursor-ordered export.
    pub async fn bulk_export(
        &self,
        ctx: &TenantContext,
        kind: RecordKind,
        cursor: Option<&str>,
        limit: usize,
    ) -> StorageResult<BulkPage> {
        ctx.authorize(Action::Import, kind)?;
        let cursor = cursor.map(BulkCursor::decode).transpose()?;
        self.storage
            .bulk_page(ctx.tenant_id(), kind, cursor, limit)
            .await
    }

    /// Reads the identifier sequence state.
    pub async fn sequence(
        &self,
        ctx: &TenantContext,
        kind: RecordKind,
    ) -> StorageResult<IdSequence> {
        ctx.authorize(Action::View, kind)?;
        self.storage.peek_sequence(ctx.tenant_id(), kind).await
    }

    /// Mints one id and returns the state after minting.
    pub async fn mint_id(
        &self,
        ctx: &TenantContext,
        kind: RecordKind,
    ) -> StorageResult<IdSequence> {
        ctx.authorize(Action::Add, kind)?;
        self.storage.mint_id(ctx.tenant_id(), kind).await
    }

    /// Administratively moves the sequence forward.
    pub async fn set_next_id(
        &self,
        ctx: &TenantContext,
        kind: RecordKind,
        next_id: i64,
    ) -> StorageResult<IdSequence> {
        ctx.authorize(Action::Import, kind)?;
        self.storage
            .set_next_id(ctx.tenant_id(), kind, next_id)
            .await
    }

    /// Looks up a user record by login name. Used by the login flow, which
    /// has no principal yet.
    pub async fn find_user(
        &self,
        tenant: &TenantId,
        userid: &str,
    ) -> StorageResult<Option<StoredRecord>> {
        self.storage.find_user(tenant, userid).await
    }

    /// Builds the principal for a verified user record.
    ///
    /// Tokens are a point-in-time snapshot: membership validity is evaluated
    /// against today, so an expired membership yields no member token.
    pub async fn assemble_principal(
        &self,
        tenant: &TenantId,
        user: &StoredRecord,
    ) -> StorageResult<Principal> {
        let userid = user.field("userid").unwrap_or_default().to_string();
        let mut tokens = vec![PrincipalToken::User(userid.clone())];

        let level = user
            .int_field("user_group")
            .and_then(|l| u8::try_from(l).ok())
            .unwrap_or(0);
        tokens.push(PrincipalToken::Role(
            Role::from_level(level).unwrap_or(Role::Viewer),
        ));

        if let Some(owns) = user.content.get("owns").and_then(Value::as_array) {
            for entry in owns {
                if let Some(group_id) = entry.get("group_id").and_then(Value::as_i64) {
                    tokens.push(PrincipalToken::GroupOwner(group_id));
                }
            }
        }

        if let Some(person_id) = user.int_field("person_id") {
            let today = Utc::now().date_naive();
            for group_id in self
                .storage
                .active_membership_groups(tenant, person_id, today)
                .await?
            {
                if !tokens.contains(&PrincipalToken::GroupOwner(group_id)) {
                    tokens.push(PrincipalToken::GroupMember(group_id));
                }
            }
        }

        Ok(Principal::new(userid, tokens))
    }

    fn audit(&self, ctx: &TenantContext, action: Action, kind: RecordKind, id: i64) {
        self.audit.append(
            ctx.tenant_id(),
            &ctx.principal().userid,
            action.as_str(),
            kind,
            id,
        );
    }
}
