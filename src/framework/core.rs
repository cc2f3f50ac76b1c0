//! # Collaborator Contracts
//!
//! The engine never talks to a network, a screen or a message strip directly. Everything
//! outside the transaction logic is reached through the traits in this module:
//!
//! - [`DataModel`]: the remote data-access layer and its metadata.
//! - [`BusyLocker`]: the busy indicator.
//! - [`MessageHandler`]: message popovers, dialogs and toasts.
//! - [`SideEffectsService`]: metadata-driven side effects.
//! - [`DialogService`]: every modal question the engine asks the user.
//! - [`DeletionPolicy`]: the component that actually deletes confirmed rows.
//! - [`TriggerControl`]: the button that started an operation.
//!
//! Implementations are injected as `Arc<dyn Trait>` through [`TransactionServices`], so
//! tests swap them for the doubles in [`mock`](super::mock).

use crate::error::ModelError;
use crate::model::{
    ActionMetadata, ChangeSet, DocumentContext, DraftAdministrativeData, EntityData,
    EntitySetMetadata, ListBinding, OperationCall, OperationResult, ShowMessagesOptions,
    SideEffectDescriptor,
};
use async_trait::async_trait;
use std::sync::Arc;

// =============================================================================
// 1. THE BACKEND MODEL
// =============================================================================

/// Options for [`DataModel::create`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateOptions {
    /// Append the row instead of inserting it at the top.
    pub at_end: bool,
    /// Create an inactive row that is only POSTed once the user edits it.
    pub inactive: bool,
    /// Extra properties requested with the POST response.
    pub select: Option<String>,
}

/// The remote data-access layer.
#[async_trait]
pub trait DataModel: Send + Sync {
    /// Metadata of the entity set addressed by a metadata path (`/Orders`, `/Orders/_Items`).
    fn entity_set_metadata(&self, meta_path: &str) -> Result<EntitySetMetadata, ModelError>;

    /// Signature of an operation, optionally qualified by its binding entity type.
    fn action_metadata(
        &self,
        action_name: &str,
        bound_entity_type: Option<&str>,
    ) -> Result<ActionMetadata, ModelError>;

    /// Adds a transient row to `binding` and queues its POST.
    async fn create(
        &self,
        binding: &ListBinding,
        data: EntityData,
        options: CreateOptions,
    ) -> Result<DocumentContext, ModelError>;

    /// Resolves once the POST of a transient row has been confirmed by the backend.
    async fn created(&self, context: &DocumentContext) -> Result<DocumentContext, ModelError>;

    fn has_pending_changes(&self, binding_path: &str) -> bool;

    /// The binding still holds rows whose creation is not confirmed.
    fn has_transient_contexts(&self, binding_path: &str) -> bool;

    /// Drops pending changes of a binding, cancelling queued POSTs of transient rows.
    async fn reset_changes(&self, binding_path: &str) -> Result<(), ModelError>;

    async fn request_canonical_path(&self, path: &str) -> Result<String, ModelError>;

    async fn request_draft_administrative_data(
        &self,
        context: &DocumentContext,
    ) -> Result<Option<DraftAdministrativeData>, ModelError>;

    async fn delete(&self, context: &DocumentContext) -> Result<(), ModelError>;

    async fn refresh(&self, context: &DocumentContext) -> Result<(), ModelError>;

    /// Submits one changeset. Results are in call order.
    async fn submit_changeset(&self, changeset: ChangeSet)
        -> Result<Vec<OperationResult>, ModelError>;

    /// Executes a single operation in its own changeset.
    async fn execute_operation(&self, call: OperationCall) -> Result<OperationResult, ModelError> {
        let name = call.name.clone();
        self.submit_changeset(ChangeSet::single(call))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| ModelError::Metadata(format!("{name} returned no response")))
    }
}

// =============================================================================
// 2. UI AFFORDANCES
// =============================================================================

/// Named busy scope: `/busy`, or `/busyLocal/{id}` for a single control.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BusyScope {
    pub model_scope_id: String,
    pub local_path: Option<String>,
}

impl BusyScope {
    pub fn global(model_scope_id: impl Into<String>) -> Self {
        Self {
            model_scope_id: model_scope_id.into(),
            local_path: None,
        }
    }

    pub fn local(model_scope_id: impl Into<String>, id: &str) -> Self {
        Self {
            model_scope_id: model_scope_id.into(),
            local_path: Some(format!("/busyLocal/{id}")),
        }
    }

    pub fn path(&self) -> &str {
        self.local_path.as_deref().unwrap_or("/busy")
    }
}

/// The busy indicator. Lock and unlock must be called symmetrically.
pub trait BusyLocker: Send + Sync {
    fn lock(&self, scope: &BusyScope);
    fn unlock(&self, scope: &BusyScope);
    fn is_locked(&self, scope: &BusyScope) -> bool;
}

/// Message presentation.
#[async_trait]
pub trait MessageHandler: Send + Sync {
    /// Drops bound transition messages of the previous request.
    fn remove_transition_messages(&self);

    /// Drops stale client-side validation messages.
    fn clear_validation_messages(&self);

    async fn show_messages(&self, options: ShowMessagesOptions);

    async fn show_message_dialog(&self, options: ShowMessagesOptions);

    fn show_toast(&self, text: &str);
}

#[async_trait]
pub trait SideEffectsService: Send + Sync {
    fn get_action_side_effects(
        &self,
        action_name: &str,
        context: Option<&DocumentContext>,
    ) -> Option<SideEffectDescriptor>;

    async fn request_side_effects_for_navigation_property(
        &self,
        navigation_path: &str,
        context: &DocumentContext,
    ) -> Result<(), ModelError>;
}

/// The control that triggered an operation (e.g. the Cancel button).
pub trait TriggerControl: Send + Sync {
    fn id(&self) -> &str;
    fn set_enabled(&self, enabled: bool);
}

// =============================================================================
// 3. DIALOGS
// =============================================================================

/// Answer of a dialog that returns data.
#[derive(Debug, Clone, PartialEq)]
pub enum DialogOutcome<T> {
    Confirmed(T),
    Cancelled,
}

/// One input field of a value dialog.
#[derive(Debug, Clone, PartialEq)]
pub struct DialogField {
    pub name: String,
    pub label: String,
    pub required: bool,
}

/// A dialog collecting values (action parameters, key fields of a new object).
#[derive(Debug, Clone, PartialEq)]
pub struct ValueDialog {
    pub title: String,
    pub fields: Vec<DialogField>,
    /// Prefilled values.
    pub values: EntityData,
    /// Required fields left empty on the previous attempt.
    pub missing: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DiscardPrompt {
    pub text: String,
    pub control: Option<String>,
}

/// Targets an action cannot be applied to.
#[derive(Debug, Clone, PartialEq)]
pub struct NotApplicablePrompt {
    pub action_name: String,
    pub not_applicable: Vec<DocumentContext>,
    pub applicable_count: usize,
}

/// Delete confirmation with the partition of the selection.
#[derive(Debug, Clone, PartialEq)]
pub struct DeletePrompt {
    pub title: String,
    pub text: String,
    pub deletable: usize,
    pub non_deletable: usize,
    pub locked: usize,
    pub unsaved_changes: usize,
    /// Offer "also delete objects with unsaved changes of other users".
    pub offer_unsaved_changes_option: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteChoice {
    Confirmed { include_unsaved_changes: bool },
    Cancelled,
}

/// Every modal question the engine asks.
#[async_trait]
pub trait DialogService: Send + Sync {
    /// `true` when the user confirms discarding changes.
    async fn confirm_discard(&self, prompt: DiscardPrompt) -> bool;

    async fn collect_values(&self, dialog: ValueDialog) -> DialogOutcome<EntityData>;

    /// `true` when the user continues with the applicable targets. With no applicable
    /// target the dialog is informational and its answer ignored.
    async fn confirm_not_applicable(&self, prompt: NotApplicablePrompt) -> bool;

    async fn confirm_delete(&self, prompt: DeletePrompt) -> DeleteChoice;

    /// `true` when the user takes over a draft with another user's unsaved changes.
    async fn confirm_take_over(&self, text: String) -> bool;

    async fn show_error(&self, text: String);
}

// =============================================================================
// 4. DELETION
// =============================================================================

/// Rows confirmed for deletion.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeletionPlan {
    pub contexts: Vec<DocumentContext>,
    /// Binding the rows belong to; `None` for an object page deletion.
    pub binding: Option<ListBinding>,
    /// Rows carrying another user's unsaved draft changes are included.
    pub include_unsaved_changes: bool,
}

#[async_trait]
pub trait DeletionPolicy: Send + Sync {
    async fn delete_confirmed(&self, plan: DeletionPlan) -> Result<(), ModelError>;
}

// =============================================================================
// 5. WIRING
// =============================================================================

/// All collaborators, injected once into the engine.
#[derive(Clone)]
pub struct TransactionServices {
    pub model: Arc<dyn DataModel>,
    pub busy_locker: Arc<dyn BusyLocker>,
    pub messages: Arc<dyn MessageHandler>,
    pub side_effects: Arc<dyn SideEffectsService>,
    pub dialogs: Arc<dyn DialogService>,
    pub deletion: Arc<dyn DeletionPolicy>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn busy_scope_paths() {
        assert_eq!(BusyScope::global("ui").path(), "/busy");
        assert_eq!(BusyScope::local("ui", "table1").path(), "/busyLocal/table1");
    }
}
