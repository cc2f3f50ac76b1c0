//! Confirmation before unsaved changes are thrown away.

use crate::error::{CancellationReason, Result};
use crate::framework::{DialogService, DiscardPrompt, MessageHandler, TriggerControl};
use std::sync::Arc;
use tracing::debug;

pub struct DiscardGate {
    dialogs: Arc<dyn DialogService>,
    messages: Arc<dyn MessageHandler>,
    text: String,
}

impl DiscardGate {
    pub fn new(
        dialogs: Arc<dyn DialogService>,
        messages: Arc<dyn MessageHandler>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            dialogs,
            messages,
            text: text.into(),
        }
    }

    /// Resolves when discarding may go ahead.
    ///
    /// Unmodified documents pass without a prompt. Otherwise the triggering control is
    /// disabled while the user decides and enabled again whatever the answer.
    pub async fn confirm(&self, control: Option<&dyn TriggerControl>, is_modified: bool) -> Result<()> {
        if !is_modified {
            self.messages.clear_validation_messages();
            return Ok(());
        }

        let _disabled = control.map(DisabledControl::new);
        let confirmed = self
            .dialogs
            .confirm_discard(DiscardPrompt {
                text: self.text.clone(),
                control: control.map(|c| c.id().to_string()),
            })
            .await;
        debug!(confirmed, "Discard confirmation closed");

        if confirmed {
            Ok(())
        } else {
            Err(CancellationReason::DiscardDeclined.into())
        }
    }
}

/// Keeps a control disabled until dropped.
struct DisabledControl<'a>(&'a dyn TriggerControl);

impl<'a> DisabledControl<'a> {
    fn new(control: &'a dyn TriggerControl) -> Self {
        control.set_enabled(false);
        Self(control)
    }
}

impl Drop for DisabledControl<'_> {
    fn drop(&mut self) {
        self.0.set_enabled(true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransactionError;
    use crate::framework::mock::{MessageCall, RecordingControl, RecordingMessageHandler, ScriptedDialogs};

    fn gate(dialogs: Arc<ScriptedDialogs>, messages: Arc<RecordingMessageHandler>) -> DiscardGate {
        DiscardGate::new(dialogs, messages, "Discard all changes?")
    }

    #[tokio::test]
    async fn unmodified_passes_without_prompt() {
        let dialogs = Arc::new(ScriptedDialogs::new());
        let messages = Arc::new(RecordingMessageHandler::new());
        gate(dialogs.clone(), messages.clone())
            .confirm(None, false)
            .await
            .unwrap();

        assert!(dialogs.discard_prompts().is_empty());
        assert_eq!(messages.calls(), [MessageCall::ClearValidationMessages]);
    }

    #[tokio::test]
    async fn control_is_reenabled_after_decline() {
        let dialogs = Arc::new(ScriptedDialogs::new());
        dialogs.expect_discard(false);
        let button = RecordingControl::new("cancelButton");

        let result = gate(dialogs.clone(), Arc::new(RecordingMessageHandler::new()))
            .confirm(Some(&button), true)
            .await;

        assert_eq!(
            result,
            Err(TransactionError::Cancelled(CancellationReason::DiscardDeclined))
        );
        assert_eq!(button.history(), [false, true]);
        assert_eq!(
            dialogs.discard_prompts()[0].control.as_deref(),
            Some("cancelButton")
        );
    }

    #[tokio::test]
    async fn confirmed_discard() {
        let dialogs = Arc::new(ScriptedDialogs::new());
        dialogs.expect_discard(true);
        let button = RecordingControl::new("cancelButton");

        gate(dialogs, Arc::new(RecordingMessageHandler::new()))
            .confirm(Some(&button), true)
            .await
            .unwrap();
        assert!(button.is_enabled());
    }
}
