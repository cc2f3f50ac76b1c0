use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageKind {
    Success,
    Information,
    Warning,
    Error,
}

/// A message returned by the backend alongside an operation result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub kind: MessageKind,
    pub text: String,
    /// Binding target; `None` for unbound messages.
    pub target: Option<String>,
}

impl Message {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            kind: MessageKind::Success,
            text: text.into(),
            target: None,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: MessageKind::Error,
            text: text.into(),
            target: None,
        }
    }
}

/// `true` when the backend answered with exactly one success message, which the message
/// handler presents itself; a generic toast would duplicate it.
pub fn is_single_success(messages: &[Message]) -> bool {
    matches!(messages, [only] if only.kind == MessageKind::Success)
}

/// Options for [`MessageHandler::show_messages`](crate::framework::MessageHandler::show_messages).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShowMessagesOptions {
    /// Render the "object was changed by somebody else" variant.
    pub concurrent_edit_flag: bool,
    /// Label (or raw name) of the action the messages belong to.
    pub action_name: Option<String>,
    /// Id of the control that triggered the operation.
    pub control: Option<String>,
}

impl ShowMessagesOptions {
    pub fn concurrent_edit() -> Self {
        Self {
            concurrent_edit_flag: true,
            ..Self::default()
        }
    }

    pub fn for_action(action_name: impl Into<String>, control: Option<String>) -> Self {
        Self {
            action_name: Some(action_name.into()),
            control,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_success_marker() {
        assert!(is_single_success(&[Message::success("Saved")]));
        assert!(!is_single_success(&[]));
        assert!(!is_single_success(&[Message::error("No")]));
        assert!(!is_single_success(&[
            Message::success("Saved"),
            Message::success("Also saved")
        ]));
    }
}
