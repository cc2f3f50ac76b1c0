//! Programming-model specific editing.
//!
//! The controller owns ordering, busy indication and message relay. What edit, save
//! and cancel mean on the backend differs per [`ProgrammingModel`] and lives here.

use crate::busy::BusyGuard;
use crate::config::TransactionTexts;
use crate::error::{ModelError, Result};
use crate::framework::{DataModel, DialogService};
use crate::model::{
    root_entity_set, DocumentContext, DraftAnnotations, Message, OperationCall, OperationResult,
    OperationTarget, ProgrammingModel, StickySessionAnnotations,
};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// A saved document and the messages the backend sent with it.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Activation {
    pub context: DocumentContext,
    pub messages: Vec<Message>,
}

#[async_trait]
pub(crate) trait EditingStrategy: Send + Sync {
    /// Switches an active document into edit mode. `None` when the user backed out.
    ///
    /// `busy` is held by the caller; it is suspended while the user is asked anything.
    async fn edit(
        &self,
        context: &DocumentContext,
        busy: &mut BusyGuard,
    ) -> Result<Option<DocumentContext>>;

    async fn save(&self, context: &DocumentContext) -> Result<Activation>;

    /// Throws the edit state away. Returns the context to show afterwards, if any.
    async fn cancel(
        &self,
        context: &DocumentContext,
        is_new_object: bool,
    ) -> Result<Option<DocumentContext>>;

    async fn validate(&self, _context: &DocumentContext) -> Result<Vec<Message>> {
        Ok(Vec::new())
    }
}

fn returned_context(action: &str, result: OperationResult) -> Result<DocumentContext, ModelError> {
    result
        .context
        .ok_or_else(|| ModelError::Metadata(format!("{action} returned no context")))
}

// =============================================================================
// DRAFT
// =============================================================================

pub(crate) struct DraftStrategy {
    model: Arc<dyn DataModel>,
    dialogs: Arc<dyn DialogService>,
    texts: TransactionTexts,
}

impl DraftStrategy {
    pub(crate) fn new(
        model: Arc<dyn DataModel>,
        dialogs: Arc<dyn DialogService>,
        texts: TransactionTexts,
    ) -> Self {
        Self {
            model,
            dialogs,
            texts,
        }
    }

    fn annotations(&self, context: &DocumentContext) -> Result<DraftAnnotations, ModelError> {
        let root = root_entity_set(&context.path);
        self.model
            .entity_set_metadata(&root)?
            .draft
            .ok_or_else(|| ModelError::Metadata(format!("{root} is not draft enabled")))
    }

    fn action<'a>(name: &'a Option<String>, kind: &str) -> Result<&'a str, ModelError> {
        name.as_deref()
            .ok_or_else(|| ModelError::Metadata(format!("No draft {kind} action annotated")))
    }

    async fn execute_edit(
        &self,
        action: &str,
        context: &DocumentContext,
        preserve_changes: bool,
    ) -> Result<OperationResult, ModelError> {
        self.model
            .execute_operation(
                OperationCall::new(action, OperationTarget::Instance(context.clone()))
                    .with_parameter("PreserveChanges", preserve_changes),
            )
            .await
    }

    /// Text of the take-over question, naming the user who left the changes.
    async fn take_over_text(&self, context: &DocumentContext) -> String {
        let user = match self.model.request_draft_administrative_data(context).await {
            Ok(Some(admin)) => admin.last_changed_by_user.filter(|u| !u.is_empty()),
            Ok(None) => None,
            Err(e) => {
                warn!(path = %context.path, error = %e, "Draft administrative data unavailable");
                None
            }
        };
        TransactionTexts::format(
            &self.texts.unsaved_changes,
            user.as_deref().unwrap_or("another user"),
        )
    }

    /// Active sibling of a draft. Pending changes are reset once the path is known.
    async fn resolve_active_sibling(&self, draft: &DocumentContext) -> Result<DocumentContext> {
        let canonical = self
            .model
            .request_canonical_path(&format!("{}/SiblingEntity", draft.path))
            .await?;
        let binding_path = draft.binding_path();
        if self.model.has_pending_changes(binding_path) {
            self.model.reset_changes(binding_path).await?;
        }
        Ok(DocumentContext::active(canonical, ProgrammingModel::Draft))
    }
}

#[async_trait]
impl EditingStrategy for DraftStrategy {
    async fn edit(
        &self,
        context: &DocumentContext,
        busy: &mut BusyGuard,
    ) -> Result<Option<DocumentContext>> {
        let annotations = self.annotations(context)?;
        let action = Self::action(&annotations.edit_action, "edit")?;

        let result = match self.execute_edit(action, context, true).await {
            Ok(result) => result,
            Err(e) if e.is_conflict() => {
                info!(path = %context.path, "Draft with unsaved changes of another user");
                let text = self.take_over_text(context).await;
                if !busy.suspend(self.dialogs.confirm_take_over(text)).await {
                    return Ok(None);
                }
                self.execute_edit(action, context, false).await?
            }
            Err(e) => return Err(e.into()),
        };
        Ok(Some(returned_context(action, result)?))
    }

    async fn save(&self, context: &DocumentContext) -> Result<Activation> {
        let annotations = self.annotations(context)?;
        if let Some(preparation) = &annotations.preparation_action {
            debug!(action = %preparation, "Preparing draft");
            self.model
                .execute_operation(OperationCall::new(
                    preparation,
                    OperationTarget::Instance(context.clone()),
                ))
                .await?;
        }

        let action = Self::action(&annotations.activation_action, "activation")?;
        let result = self
            .model
            .execute_operation(OperationCall::new(
                action,
                OperationTarget::Instance(context.clone()),
            ))
            .await?;
        let messages = result.messages.clone();
        Ok(Activation {
            context: returned_context(action, result)?,
            messages,
        })
    }

    async fn cancel(
        &self,
        context: &DocumentContext,
        is_new_object: bool,
    ) -> Result<Option<DocumentContext>> {
        if is_new_object {
            let binding_path = context.binding_path();
            if self.model.has_pending_changes(binding_path) {
                self.model.reset_changes(binding_path).await?;
            }
            self.model.delete(context).await?;
            return Ok(None);
        }

        let active = self.resolve_active_sibling(context).await;
        let deleted = self.model.delete(context).await;
        let active = active?;
        deleted?;
        Ok(Some(active))
    }

    async fn validate(&self, context: &DocumentContext) -> Result<Vec<Message>> {
        let annotations = self.annotations(context)?;
        let Some(preparation) = &annotations.preparation_action else {
            return Ok(Vec::new());
        };
        let result = self
            .model
            .execute_operation(OperationCall::new(
                preparation,
                OperationTarget::Instance(context.clone()),
            ))
            .await?;
        Ok(result.messages)
    }
}

// =============================================================================
// STICKY SESSION
// =============================================================================

pub(crate) struct StickyStrategy {
    model: Arc<dyn DataModel>,
}

impl StickyStrategy {
    pub(crate) fn new(model: Arc<dyn DataModel>) -> Self {
        Self { model }
    }

    fn annotations(
        &self,
        context: &DocumentContext,
    ) -> Result<StickySessionAnnotations, ModelError> {
        let root = root_entity_set(&context.path);
        self.model
            .entity_set_metadata(&root)?
            .sticky
            .ok_or_else(|| ModelError::Metadata(format!("{root} is not sticky session enabled")))
    }

    async fn execute(
        &self,
        action: &str,
        context: &DocumentContext,
    ) -> Result<OperationResult, ModelError> {
        self.model
            .execute_operation(OperationCall::new(
                action,
                OperationTarget::Instance(context.clone()),
            ))
            .await
    }
}

#[async_trait]
impl EditingStrategy for StickyStrategy {
    async fn edit(
        &self,
        context: &DocumentContext,
        _busy: &mut BusyGuard,
    ) -> Result<Option<DocumentContext>> {
        let action = self.annotations(context)?.edit_action;
        let result = self.execute(&action, context).await?;
        Ok(Some(returned_context(&action, result)?))
    }

    async fn save(&self, context: &DocumentContext) -> Result<Activation> {
        let action = self.annotations(context)?.save_action;
        let result = self.execute(&action, context).await?;
        let messages = result.messages.clone();
        Ok(Activation {
            context: returned_context(&action, result)?,
            messages,
        })
    }

    async fn cancel(
        &self,
        context: &DocumentContext,
        is_new_object: bool,
    ) -> Result<Option<DocumentContext>> {
        let action = self.annotations(context)?.discard_action;
        let Some(discarded) = self.execute(&action, context).await?.context else {
            return Ok(None);
        };

        self.model.reset_changes(context.binding_path()).await?;
        if is_new_object {
            return Ok(None);
        }
        self.model.refresh(&discarded).await?;
        Ok(Some(discarded))
    }
}
