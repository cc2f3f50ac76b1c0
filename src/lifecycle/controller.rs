use super::discard::DiscardGate;
use super::in_flight::InFlightRegistry;
use super::request::{CancelDocumentRequest, SaveDocumentRequest};
use super::strategy::{DraftStrategy, EditingStrategy, StickyStrategy};
use crate::actions::ActionInvoker;
use crate::busy::BusyLockCoordinator;
use crate::config::TransactionConfig;
use crate::error::{Result, TransactionError};
use crate::framework::TransactionServices;
use crate::model::{is_single_success, DocumentContext, ProgrammingModel, ShowMessagesOptions};
use crate::programming_model::ProgrammingModelResolver;
use crate::side_effects::SideEffectCoordinator;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Runs the create/edit/save/cancel/delete transitions of a document.
///
/// One controller serves one application; it is cheap to share behind an `Arc`.
pub struct DocumentLifecycleController {
    pub(super) services: TransactionServices,
    pub(super) config: TransactionConfig,
    pub(super) resolver: ProgrammingModelResolver,
    pub(super) busy: Arc<BusyLockCoordinator>,
    pub(super) side_effects: Arc<SideEffectCoordinator>,
    pub(super) actions: ActionInvoker,
    pub(super) in_flight: InFlightRegistry,
    discard: DiscardGate,
    draft: DraftStrategy,
    sticky: StickyStrategy,
}

impl DocumentLifecycleController {
    pub fn new(services: TransactionServices, config: TransactionConfig) -> Self {
        let busy = Arc::new(BusyLockCoordinator::new(
            services.busy_locker.clone(),
            &config,
        ));
        let side_effects = Arc::new(SideEffectCoordinator::new(
            services.side_effects.clone(),
            services.model.clone(),
        ));
        let actions = ActionInvoker::new(
            services.model.clone(),
            side_effects.clone(),
            busy.clone(),
            services.messages.clone(),
            services.dialogs.clone(),
        );
        let discard = DiscardGate::new(
            services.dialogs.clone(),
            services.messages.clone(),
            config.texts.discard_changes.clone(),
        );
        let draft = DraftStrategy::new(
            services.model.clone(),
            services.dialogs.clone(),
            config.texts.clone(),
        );
        let sticky = StickyStrategy::new(services.model.clone());

        Self {
            resolver: ProgrammingModelResolver::new(services.model.clone()),
            services,
            config,
            busy,
            side_effects,
            actions,
            in_flight: InFlightRegistry::default(),
            discard,
            draft,
            sticky,
        }
    }

    /// The invoker used for actions started from this controller's pages.
    pub fn actions(&self) -> &ActionInvoker {
        &self.actions
    }

    pub fn programming_model(&self) -> &ProgrammingModelResolver {
        &self.resolver
    }

    pub fn config(&self) -> &TransactionConfig {
        &self.config
    }

    /// Strategy for a path, rejecting resources without transactional editing.
    pub(super) fn strategy(
        &self,
        operation: &'static str,
        path: &str,
    ) -> Result<(ProgrammingModel, &dyn EditingStrategy)> {
        if path.trim_matches('/').is_empty() {
            return Err(TransactionError::MissingContext { operation });
        }
        let model = self.resolver.resolve(path)?;
        match model {
            ProgrammingModel::Draft => Ok((model, &self.draft)),
            ProgrammingModel::Sticky => Ok((model, &self.sticky)),
            ProgrammingModel::NonDraft => {
                Err(TransactionError::UnsupportedProgrammingModel { operation, model })
            }
        }
    }

    // =========================================================================
    // EDIT / SAVE / CANCEL
    // =========================================================================

    /// Switches an active document into edit mode.
    ///
    /// Returns the context being edited (the draft, or the sticky session copy), or
    /// `None` when the user declined to take over another user's draft.
    #[instrument(skip(self, context), fields(path = %context.path))]
    pub async fn edit_document(
        &self,
        context: &DocumentContext,
    ) -> Result<Option<DocumentContext>> {
        let (_, strategy) = self.strategy("editDocument", &context.path)?;
        let _in_flight = self.in_flight.enter(&context.path)?;

        self.services.messages.remove_transition_messages();
        let mut busy = self.busy.lock_default();
        let result = strategy.edit(context, &mut busy).await;
        busy.release();

        match &result {
            Ok(Some(edited)) => info!(edited = %edited.path, "Document in edit mode"),
            Ok(None) => info!("Edit not started"),
            Err(e) => {
                warn!(error = %e, "Edit failed");
                self.services
                    .messages
                    .show_messages(ShowMessagesOptions::concurrent_edit())
                    .await;
            }
        }
        result
    }

    /// Activates a draft, or saves a sticky session.
    #[instrument(skip(self, request), fields(path = %request.context.path))]
    pub async fn save_document(&self, request: SaveDocumentRequest) -> Result<DocumentContext> {
        let (_, strategy) = self.strategy("saveDocument", &request.context.path)?;
        let _in_flight = self.in_flight.enter(&request.context.path)?;

        self.services.messages.remove_transition_messages();
        let busy = self.busy.lock_default();
        match strategy.save(&request.context).await {
            Ok(activation) => {
                busy.release();
                if !is_single_success(&activation.messages) {
                    let texts = &self.config.texts;
                    self.services.messages.show_toast(if request.is_new_object {
                        &texts.object_created
                    } else {
                        &texts.object_saved
                    });
                }
                info!(saved = %activation.context.path, "Document saved");
                Ok(activation.context)
            }
            Err(e) => {
                warn!(error = %e, "Save failed");
                if request.execute_side_effects_on_error {
                    self.side_effects
                        .refresh_transient_rows(&request.bindings, &request.context)
                        .await;
                }
                busy.release();
                self.services
                    .messages
                    .show_messages(ShowMessagesOptions::default())
                    .await;
                Err(e)
            }
        }
    }

    /// Discards the edit state of a document.
    ///
    /// Returns the document to show afterwards: the active sibling of a draft, the
    /// refreshed sticky document, or `None` for a discarded new object.
    #[instrument(skip(self, request), fields(path = %request.context.path, new = request.is_new_object))]
    pub async fn cancel_document(
        &self,
        request: CancelDocumentRequest,
    ) -> Result<Option<DocumentContext>> {
        let (model, strategy) = self.strategy("cancelDocument", &request.context.path)?;
        let _in_flight = self.in_flight.enter(&request.context.path)?;

        self.services.messages.remove_transition_messages();
        let result = self.discard_edit_state(&request, model, strategy).await;
        if let Err(e) = &result {
            if e.is_cancellation() {
                info!("Cancel aborted by user");
            } else {
                warn!(error = %e, "Cancel failed");
            }
        }
        self.services
            .messages
            .show_messages(ShowMessagesOptions::default())
            .await;
        result
    }

    async fn discard_edit_state(
        &self,
        request: &CancelDocumentRequest,
        model: ProgrammingModel,
        strategy: &dyn EditingStrategy,
    ) -> Result<Option<DocumentContext>> {
        let context = &request.context;
        let mut modified = request.is_object_modified;
        if model == ProgrammingModel::Draft && !modified {
            // A draft opened and left untouched still counts as unchanged.
            if let Some(admin) = self
                .services
                .model
                .request_draft_administrative_data(context)
                .await?
            {
                modified = admin.has_changes();
            }
        }

        if !request.skip_discard_popover {
            self.discard
                .confirm(request.cancel_button.as_deref(), modified)
                .await?;
        }

        let _busy = self.busy.lock_default();
        strategy.cancel(context, request.is_new_object).await
    }

    /// Runs the draft preparation action so the backend reports validation messages.
    ///
    /// Sticky documents are validated on save only; this is a no-op for them.
    #[instrument(skip(self, context), fields(path = %context.path))]
    pub async fn validate_document(&self, context: &DocumentContext) -> Result<()> {
        let (_, strategy) = self.strategy("validateDocument", &context.path)?;
        self.services.messages.remove_transition_messages();
        let result = strategy.validate(context).await;
        self.services
            .messages
            .show_messages(ShowMessagesOptions::default())
            .await;
        let messages = result?;
        info!(messages = messages.len(), "Document validated");
        Ok(())
    }
}
