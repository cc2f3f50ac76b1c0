use super::parameters::collect_values;
use super::request::{ActionInvocationRequest, ActionResponse, ActionTarget, InvocationOutcome};
use crate::busy::BusyLockCoordinator;
use crate::error::{CancellationReason, ModelError, Result, TransactionError};
use crate::framework::{DataModel, DialogField, DialogService, MessageHandler, NotApplicablePrompt};
use crate::model::{
    ChangeSet, DocumentContext, EntityData, InvocationGrouping, OperationCall, OperationTarget,
    QueryAugmentation, ShowMessagesOptions,
};
use crate::side_effects::SideEffectCoordinator;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Dispatches bound and unbound backend operations.
pub struct ActionInvoker {
    model: Arc<dyn DataModel>,
    side_effects: Arc<SideEffectCoordinator>,
    busy: Arc<BusyLockCoordinator>,
    messages: Arc<dyn MessageHandler>,
    dialogs: Arc<dyn DialogService>,
}

/// Everything resolved before the request is sent.
struct PreparedInvocation {
    action_name: String,
    model: Arc<dyn DataModel>,
    /// `None` for unbound actions.
    targets: Option<Vec<DocumentContext>>,
    parameters: EntityData,
    augmentation: QueryAugmentation,
}

impl ActionInvoker {
    pub fn new(
        model: Arc<dyn DataModel>,
        side_effects: Arc<SideEffectCoordinator>,
        busy: Arc<BusyLockCoordinator>,
        messages: Arc<dyn MessageHandler>,
        dialogs: Arc<dyn DialogService>,
    ) -> Self {
        Self {
            model,
            side_effects,
            busy,
            messages,
            dialogs,
        }
    }

    /// Executes an action.
    ///
    /// Returns `Ok(None)` when nothing was sent because the user did not continue with the
    /// applicable targets, or because none were left.
    #[instrument(skip(self, request), fields(action = %request.action_name))]
    pub async fn call_action(
        &self,
        request: ActionInvocationRequest,
    ) -> Result<Option<ActionResponse>> {
        let action_name = strip_container(&request.action_name)?.to_string();
        let relay_name = request.label.clone().unwrap_or_else(|| action_name.clone());
        let control = request.control.clone();

        let result = match self.prepare(action_name, &request).await {
            Ok(Some(prepared)) => self
                .execute(prepared, &request)
                .await
                .map(Some),
            Ok(None) => return Ok(None),
            Err(e) => Err(e),
        };

        self.messages
            .show_messages(ShowMessagesOptions::for_action(relay_name, control))
            .await;
        result
    }

    async fn prepare(
        &self,
        action_name: String,
        request: &ActionInvocationRequest,
    ) -> Result<Option<PreparedInvocation>> {
        let (model, targets) = match &request.target {
            ActionTarget::Bound(contexts) if contexts.is_empty() => {
                return Err(TransactionError::InvalidRequest(format!(
                    "Bound action {action_name} needs at least one context"
                )));
            }
            ActionTarget::Bound(contexts) => (self.model.clone(), Some(contexts.clone())),
            ActionTarget::Unbound(model) => (model.clone(), None),
        };

        let augmentation = self.side_effects.action_augmentation(
            &action_name,
            targets.as_ref().and_then(|t| t.first()),
        );

        let targets = match targets {
            Some(contexts) => match self.applicable_targets(&action_name, contexts, request).await {
                Some(applicable) => Some(applicable),
                None => return Ok(None),
            },
            None => None,
        };

        let parameters = self
            .parameters(&action_name, &model, targets.as_deref(), request)
            .await?;

        Ok(Some(PreparedInvocation {
            action_name,
            model,
            targets,
            parameters,
            augmentation,
        }))
    }

    /// Removes not-applicable contexts, asking the user whether to go on without them.
    async fn applicable_targets(
        &self,
        action_name: &str,
        contexts: Vec<DocumentContext>,
        request: &ActionInvocationRequest,
    ) -> Option<Vec<DocumentContext>> {
        if request.not_applicable_contexts.is_empty() {
            return Some(contexts);
        }

        let excluded: HashSet<&str> = request
            .not_applicable_contexts
            .iter()
            .map(|c| c.path.as_str())
            .collect();
        let applicable: Vec<DocumentContext> = contexts
            .into_iter()
            .filter(|c| !excluded.contains(c.path.as_str()))
            .collect();

        let proceed = self
            .dialogs
            .confirm_not_applicable(NotApplicablePrompt {
                action_name: request.label.clone().unwrap_or_else(|| action_name.to_string()),
                not_applicable: request.not_applicable_contexts.clone(),
                applicable_count: applicable.len(),
            })
            .await;

        if applicable.is_empty() || !proceed {
            info!(
                applicable = applicable.len(),
                proceed, "Action not executed for not applicable targets"
            );
            return None;
        }
        Some(applicable)
    }

    async fn parameters(
        &self,
        action_name: &str,
        model: &Arc<dyn DataModel>,
        targets: Option<&[DocumentContext]>,
        request: &ActionInvocationRequest,
    ) -> Result<EntityData> {
        // The binding type disambiguates overloads; without it the first overload is used.
        let bound_type = targets
            .and_then(|t| t.first())
            .and_then(|ctx| model.entity_set_metadata(&ctx.meta_path()).ok())
            .map(|meta| meta.entity_type);
        let metadata = model.action_metadata(action_name, bound_type.as_deref())?;

        let mut values = EntityData::new();
        for parameter in metadata.dialog_parameters() {
            if let Some(default) = &parameter.default_value {
                values.insert(parameter.name.clone(), default.clone());
            }
        }
        values.extend(request.parameter_values.clone());

        let fields: Vec<DialogField> = metadata
            .dialog_parameters()
            .into_iter()
            .map(|p| DialogField {
                name: p.name.clone(),
                label: p.label.clone().unwrap_or_else(|| p.name.clone()),
                required: p.required,
            })
            .collect();
        if request.skip_parameter_dialog || fields.is_empty() {
            return Ok(values);
        }

        let title = request
            .label
            .clone()
            .or(metadata.label)
            .unwrap_or_else(|| action_name.to_string());
        collect_values(self.dialogs.as_ref(), &title, fields, values)
            .await
            .ok_or(TransactionError::Cancelled(
                CancellationReason::ParameterDialogCancelled,
            ))
    }

    async fn execute(
        &self,
        prepared: PreparedInvocation,
        request: &ActionInvocationRequest,
    ) -> Result<ActionResponse> {
        let PreparedInvocation {
            action_name,
            model,
            targets,
            parameters,
            augmentation,
        } = prepared;

        let call = |target: OperationTarget| {
            OperationCall::new(&action_name, target)
                .with_parameters(parameters.clone())
                .with_augmentation(augmentation.clone())
        };
        let changesets: Vec<ChangeSet> = match (&targets, request.invocation_grouping) {
            (None, _) => vec![ChangeSet::single(call(OperationTarget::Unbound))],
            (Some(contexts), InvocationGrouping::ChangeSet) => vec![ChangeSet {
                id: action_name.clone(),
                calls: contexts
                    .iter()
                    .map(|ctx| call(OperationTarget::Instance(ctx.clone())))
                    .collect(),
            }],
            (Some(contexts), InvocationGrouping::Isolated) => contexts
                .iter()
                .enumerate()
                .map(|(i, ctx)| ChangeSet {
                    id: format!("{action_name}:{i}"),
                    calls: vec![call(OperationTarget::Instance(ctx.clone()))],
                })
                .collect(),
        };
        info!(
            targets = targets.as_ref().map_or(0, Vec::len),
            changesets = changesets.len(),
            grouping = ?request.invocation_grouping,
            "Invoking action"
        );

        // Submission: stale transition messages go first, then the busy indicator.
        self.messages.remove_transition_messages();
        let busy = self.busy.lock(match request.busy_mode {
            Some(mode) => self.busy.scope(mode, None),
            None => self.busy.default_scope(),
        });

        let mut outcomes = Vec::new();
        let mut first_error = None;
        for changeset in changesets {
            let paths: Vec<Option<String>> = changeset
                .calls
                .iter()
                .map(|c| c.target.path().map(str::to_string))
                .collect();
            match model.submit_changeset(changeset).await {
                Ok(results) => {
                    let mut results = results.into_iter();
                    for target in paths {
                        let result = results.next().ok_or_else(|| ModelError::Request {
                            status: None,
                            message: format!(
                                "No response for {}",
                                target.as_deref().unwrap_or(&action_name)
                            ),
                        });
                        if let Err(e) = &result {
                            warn!(error = %e, "Response missing");
                            first_error.get_or_insert_with(|| e.clone());
                        }
                        outcomes.push(InvocationOutcome { target, result });
                    }
                }
                Err(e) => {
                    warn!(error = %e, "Changeset failed");
                    first_error.get_or_insert_with(|| e.clone());
                    outcomes.extend(paths.into_iter().map(|target| InvocationOutcome {
                        target,
                        result: Err(e.clone()),
                    }));
                }
            }
        }
        busy.release();

        let response = ActionResponse { outcomes };
        match first_error {
            Some(source) if response.succeeded().next().is_none() => {
                Err(TransactionError::ActionFailed {
                    action: action_name,
                    source,
                })
            }
            _ => {
                debug!(failed = response.failed_count(), "Action executed");
                Ok(response)
            }
        }
    }
}

/// `Container/Action` names an operation import; the action itself is `Action`.
fn strip_container(action_name: &str) -> Result<&str> {
    let name = match action_name.split_once('/') {
        Some((_, action)) => action,
        None => action_name,
    };
    if name.trim().is_empty() {
        return Err(TransactionError::InvalidRequest(
            "Provide name of action to be executed".into(),
        ));
    }
    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn container_prefix_is_stripped() {
        assert_eq!(strip_container("Container/Sales.Approve").unwrap(), "Sales.Approve");
        assert_eq!(strip_container("Sales.Approve").unwrap(), "Sales.Approve");
        assert!(strip_container("").is_err());
        assert!(strip_container("Container/").is_err());
    }
}
