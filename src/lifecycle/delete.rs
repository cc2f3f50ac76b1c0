use super::controller::DocumentLifecycleController;
use super::request::{DeleteDocumentRequest, DeleteOutcome, DeletionCandidate, DeletionTarget};
use crate::config::TransactionTexts;
use crate::error::{CancellationReason, Result, TransactionError};
use crate::framework::{DeleteChoice, DeletePrompt, DeletionPlan};
use crate::model::{DocumentContext, ListBinding, ProgrammingModel, ShowMessagesOptions};
use tracing::{info, instrument, warn};

/// Selection split by what may happen to each row.
#[derive(Debug, Default)]
struct Partition {
    deletable: Vec<DocumentContext>,
    non_deletable: Vec<DocumentContext>,
    /// Rows with a draft held by another user, with that user's name.
    locked: Vec<(DocumentContext, String)>,
    /// Rows with unsaved draft changes another user left behind.
    unsaved: Vec<DocumentContext>,
}

impl DocumentLifecycleController {
    /// Asks for confirmation and hands the confirmed rows to the deletion policy.
    #[instrument(skip(self, request))]
    pub async fn delete_document(&self, request: DeleteDocumentRequest) -> Result<DeleteOutcome> {
        let (key, candidates, binding, single) = match request.target {
            DeletionTarget::Object(context) => (
                context.path.clone(),
                vec![DeletionCandidate::deletable(context)],
                None,
                true,
            ),
            DeletionTarget::Rows {
                binding,
                candidates,
            } => {
                let single = candidates.len() == 1;
                (binding.absolute_path(), candidates, Some(binding), single)
            }
        };
        let (model, _) = self.strategy("deleteDocument", &key)?;
        let _in_flight = self.in_flight.enter(&key)?;

        let partition = match self.partition(candidates, model).await {
            Ok(partition) => partition,
            Err(e) => {
                warn!(error = %e, "Deletion candidates not classified");
                self.services
                    .messages
                    .show_messages(ShowMessagesOptions::default())
                    .await;
                return Err(e);
            }
        };
        let texts = &self.config.texts;
        let dialogs = &self.services.dialogs;

        if single {
            if let Some((_, user)) = partition.locked.first() {
                info!(user = %user, "Object locked by another user");
                dialogs
                    .show_error(TransactionTexts::format(&texts.object_locked, user))
                    .await;
                return Err(TransactionError::Locked { user: user.clone() });
            }
        }
        if partition.deletable.is_empty() && partition.unsaved.is_empty() {
            dialogs.show_error(texts.nothing_deletable.clone()).await;
            return Err(TransactionError::NothingDeletable);
        }

        let text = match (&binding, request.title.as_deref()) {
            (None, Some(title)) => TransactionTexts::format(&texts.delete_object, title),
            _ if single => texts.delete_object_untitled.clone(),
            _ => TransactionTexts::format(
                &texts.delete_selected,
                partition.deletable.len() + partition.unsaved.len(),
            ),
        };
        let choice = dialogs
            .confirm_delete(DeletePrompt {
                title: texts.delete_title.clone(),
                text,
                deletable: partition.deletable.len(),
                non_deletable: partition.non_deletable.len(),
                locked: partition.locked.len(),
                unsaved_changes: partition.unsaved.len(),
                offer_unsaved_changes_option: !partition.unsaved.is_empty(),
            })
            .await;
        let DeleteChoice::Confirmed {
            include_unsaved_changes,
        } = choice
        else {
            info!("Deletion declined");
            return Err(CancellationReason::DeleteDeclined.into());
        };

        self.delete_confirmed(partition, binding, include_unsaved_changes)
            .await
    }

    /// Classifies the selection. Active draft documents are checked for other users' drafts.
    async fn partition(
        &self,
        candidates: Vec<DeletionCandidate>,
        model: ProgrammingModel,
    ) -> Result<Partition> {
        let mut partition = Partition::default();
        for DeletionCandidate { context, deletable } in candidates {
            if !deletable {
                partition.non_deletable.push(context);
                continue;
            }
            if model == ProgrammingModel::Draft && context.is_active_entity && !context.is_transient {
                let admin = self
                    .services
                    .model
                    .request_draft_administrative_data(&context)
                    .await?;
                if let Some(admin) = admin {
                    if let Some(user) = admin.locked_by_other() {
                        partition.locked.push((context, user));
                        continue;
                    }
                    if admin.unsaved_changes_of_other().is_some() {
                        partition.unsaved.push(context);
                        continue;
                    }
                }
            }
            partition.deletable.push(context);
        }
        Ok(partition)
    }

    async fn delete_confirmed(
        &self,
        partition: Partition,
        binding: Option<ListBinding>,
        include_unsaved_changes: bool,
    ) -> Result<DeleteOutcome> {
        let Partition {
            mut deletable,
            non_deletable,
            locked,
            unsaved,
        } = partition;
        let mut skipped = non_deletable;
        skipped.extend(locked.into_iter().map(|(context, _)| context));
        if include_unsaved_changes {
            deletable.extend(unsaved);
        } else {
            skipped.extend(unsaved);
        }

        if deletable.is_empty() {
            info!(skipped = skipped.len(), "Nothing left to delete");
            return Ok(DeleteOutcome {
                deleted: Vec::new(),
                skipped,
            });
        }

        let plan = DeletionPlan {
            contexts: deletable.clone(),
            binding,
            include_unsaved_changes,
        };
        let busy = self.busy.lock_default();
        let result = self.services.deletion.delete_confirmed(plan).await;
        busy.release();

        match result {
            Ok(()) => {
                info!(deleted = deletable.len(), skipped = skipped.len(), "Documents deleted");
                Ok(DeleteOutcome {
                    deleted: deletable,
                    skipped,
                })
            }
            Err(e) => {
                warn!(error = %e, "Deletion failed");
                self.services
                    .messages
                    .show_messages(ShowMessagesOptions::default())
                    .await;
                Err(e.into())
            }
        }
    }
}
