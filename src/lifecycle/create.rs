use super::controller::DocumentLifecycleController;
use super::request::{CreateDocumentRequest, CreationMode};
use crate::actions::{collect_values, ActionInvocationRequest};
use crate::config::BusyMode;
use crate::error::{CancellationReason, ModelError, Result, TransactionError};
use crate::framework::{CreateOptions, DialogField};
use crate::model::{
    meta_path, DocumentContext, EntityData, EntitySetMetadata, ListBinding, OperationCall,
    OperationTarget, ProgrammingModel, ShowMessagesOptions,
};
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

impl DocumentLifecycleController {
    /// Creates a new document in a list binding.
    ///
    /// Precondition violations (no binding, a resource without draft or sticky support)
    /// are returned as they are. User cancellations surface as
    /// [`TransactionError::Cancelled`]; every other failure as
    /// [`TransactionError::CreationFailed`].
    #[instrument(
        skip(self, request),
        fields(binding = %request.list_binding.absolute_path(), mode = ?request.creation_mode)
    )]
    pub async fn create_document(&self, request: CreateDocumentRequest) -> Result<DocumentContext> {
        if request.list_binding.path.trim().is_empty() {
            return Err(TransactionError::InvalidRequest(
                "createDocument requires a list binding".into(),
            ));
        }
        let model = self.resolver.resolve_binding(&request.list_binding)?;
        if !model.supports_editing() {
            return Err(TransactionError::UnsupportedProgrammingModel {
                operation: "createDocument",
                model,
            });
        }

        let scope = match request.busy_mode {
            Some(mode) => self.busy.scope(mode, request.busy_id.as_deref()),
            None => self.busy.default_scope(),
        };
        let busy = self.busy.lock(scope);
        let result = self.create_in(&request, model).await;
        busy.release();

        self.services
            .messages
            .show_message_dialog(ShowMessagesOptions::default())
            .await;
        match result {
            Ok(context) => {
                info!(path = %context.path, "Document created");
                Ok(context)
            }
            Err(e) if e.is_cancellation() => {
                info!(reason = ?e.cancellation_reason(), "Creation cancelled");
                Err(e)
            }
            Err(e) => {
                warn!(error = %e, "Creation failed");
                Err(TransactionError::creation_failed(e))
            }
        }
    }

    async fn create_in(
        &self,
        request: &CreateDocumentRequest,
        model: ProgrammingModel,
    ) -> Result<DocumentContext> {
        let binding = &request.list_binding;
        let metadata = self
            .services
            .model
            .entity_set_metadata(&meta_path(&binding.absolute_path()))?;

        if !binding.is_relative() {
            let new_action = self
                .config
                .startup
                .deep_link_new_action()
                .or_else(|| metadata.new_action().map(str::to_string));
            if let Some(action) = new_action {
                return self.create_with_new_action(&action, request, model).await;
            }
        }

        let mut data = self.default_values(&metadata, binding, model).await;
        data.extend(request.data.clone());

        // A creation row collects its keys in the row itself.
        if request.creation_mode != CreationMode::CreationRow {
            let fields: Vec<DialogField> = metadata
                .creation_fields()
                .into_iter()
                .map(|p| DialogField {
                    name: p.name.clone(),
                    label: p.label.clone().unwrap_or_else(|| p.name.clone()),
                    required: true,
                })
                .collect();
            if !fields.is_empty() {
                data = collect_values(
                    self.services.dialogs.as_ref(),
                    &self.config.texts.create_dialog_title,
                    fields,
                    data,
                )
                .await
                .ok_or(TransactionError::Cancelled(
                    CancellationReason::CreateDialogCancelled,
                ))?;
            }
        }

        self.create_row(request, data, &metadata).await
    }

    /// Creates through the entity set's new action instead of a plain POST.
    async fn create_with_new_action(
        &self,
        action: &str,
        request: &CreateDocumentRequest,
        model: ProgrammingModel,
    ) -> Result<DocumentContext> {
        debug!(action, "Creating with new action");
        let collection = DocumentContext::active(request.list_binding.path.clone(), model);
        let mut invocation = ActionInvocationRequest::bound(action, vec![collection])
            // The create flow already holds the busy scope.
            .with_busy_mode(BusyMode::None);
        invocation.parameter_values = request.data.clone();

        self.actions
            .call_action(invocation)
            .await?
            .and_then(|response| response.first_context().cloned())
            .ok_or_else(|| ModelError::Metadata(format!("{action} returned no context")).into())
    }

    /// Values of the default-values function; empty when there is none or it failed.
    async fn default_values(
        &self,
        metadata: &EntitySetMetadata,
        binding: &ListBinding,
        model: ProgrammingModel,
    ) -> EntityData {
        let Some(function) = &metadata.default_values_function else {
            return EntityData::new();
        };
        let target = match &binding.parent {
            Some(parent) => OperationTarget::Instance(DocumentContext::active(parent.clone(), model)),
            None => OperationTarget::Collection(binding.path.clone()),
        };

        match self
            .services
            .model
            .execute_operation(OperationCall::new(function, target))
            .await
        {
            Ok(result) => match result.value {
                Some(Value::Object(values)) => values,
                _ => EntityData::new(),
            },
            Err(e) => {
                warn!(function = %function, error = %e, "Default values not available");
                EntityData::new()
            }
        }
    }

    /// POSTs the row and waits for the backend to confirm it.
    async fn create_row(
        &self,
        request: &CreateDocumentRequest,
        data: EntityData,
        metadata: &EntitySetMetadata,
    ) -> Result<DocumentContext> {
        let model = &self.services.model;
        let options = CreateOptions {
            at_end: request.create_at_end,
            inactive: request.inactive,
            select: metadata.messages_path.clone(),
        };
        let transient = model.create(&request.list_binding, data, options).await?;
        debug!(path = %transient.path, "Transient row created");
        if request.inactive {
            return Ok(transient);
        }

        match model.created(&transient).await {
            Ok(confirmed) => Ok(confirmed),
            Err(e) => {
                warn!(path = %transient.path, error = %e, "Backend rejected new row");
                if !request.keep_transient_context_on_failed {
                    self.roll_back(&request.list_binding, &transient).await;
                }
                Err(e.into())
            }
        }
    }

    /// Cancels the pending POST and removes the row from the binding.
    async fn roll_back(&self, binding: &ListBinding, transient: &DocumentContext) {
        let model = &self.services.model;
        let binding_path = binding.absolute_path();
        if let Err(e) = model.reset_changes(&binding_path).await {
            warn!(binding = %binding_path, error = %e, "Reset after failed creation failed");
        }
        if model.has_transient_contexts(&binding_path) {
            if let Err(e) = model.delete(transient).await {
                warn!(path = %transient.path, error = %e, "Transient row not removed");
            }
        }
    }
}
