//! Engine configuration.
//!
//! Everything here has a default, so `TransactionConfig::default()` is a working setup.
//! Applications usually deserialize it from their manifest:
//!
//! ```
//! use document_transaction::config::{BusyMode, TransactionConfig};
//!
//! let config = TransactionConfig::from_json(r#"{ "busy_mode": "Local", "local_busy_id": "table" }"#).unwrap();
//! assert_eq!(config.busy_mode, BusyMode::Local);
//! ```

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

/// Which busy scope an operation locks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BusyMode {
    /// `/busy`: the whole app.
    #[default]
    Global,
    /// `/busyLocal/{id}`: a single control.
    Local,
    /// No busy indication.
    None,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StartupParameters {
    /// `preferredMode` startup parameter, e.g. `["createWith:CreateFromTemplate"]`.
    pub preferred_mode: Vec<String>,
    /// Hash the app was started with.
    pub hash: String,
}

impl StartupParameters {
    /// New action requested by a `createWith` / `autoCreateWith` deep link.
    pub fn deep_link_new_action(&self) -> Option<String> {
        let hash = self.hash.to_uppercase();
        if !hash.contains("I-ACTION=CREATEWITH") && !hash.contains("I-ACTION=AUTOCREATEWITH") {
            return None;
        }
        let mode = self.preferred_mode.first()?;
        if !mode.to_uppercase().contains("CREATEWITH:") {
            return None;
        }
        mode.rsplit(':')
            .next()
            .filter(|action| !action.is_empty())
            .map(str::to_string)
    }
}

/// User-visible texts. `{0}` is replaced with the argument of the text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransactionTexts {
    pub object_created: String,
    pub object_saved: String,
    pub discard_changes: String,
    pub delete_title: String,
    pub delete_object: String,
    /// Single-object delete text when the object has no title.
    pub delete_object_untitled: String,
    pub delete_selected: String,
    pub object_locked: String,
    pub nothing_deletable: String,
    pub unsaved_changes: String,
    pub create_dialog_title: String,
}

impl Default for TransactionTexts {
    fn default() -> Self {
        Self {
            object_created: "Object created".into(),
            object_saved: "Your changes have been saved.".into(),
            discard_changes: "Discard all changes?".into(),
            delete_title: "Delete".into(),
            delete_object: "Delete object {0}?".into(),
            delete_object_untitled: "Delete this object?".into(),
            delete_selected: "Delete the {0} selected objects?".into(),
            object_locked: "This object is currently locked by {0}.".into(),
            nothing_deletable: "None of the selected objects can be deleted.".into(),
            unsaved_changes: "Another user edited this object without saving the changes ({0}). Take over and discard them?".into(),
            create_dialog_title: "Create".into(),
        }
    }
}

impl TransactionTexts {
    pub fn format(template: &str, arg: impl std::fmt::Display) -> String {
        template.replace("{0}", &arg.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransactionConfig {
    /// Name of the UI model holding the busy flags.
    pub busy_model_scope: String,
    pub busy_mode: BusyMode,
    /// Control id used for [`BusyMode::Local`].
    pub local_busy_id: Option<String>,
    pub startup: StartupParameters,
    pub texts: TransactionTexts,
}

impl Default for TransactionConfig {
    fn default() -> Self {
        Self {
            busy_model_scope: "ui".into(),
            busy_mode: BusyMode::Global,
            local_busy_id: None,
            startup: StartupParameters::default(),
            texts: TransactionTexts::default(),
        }
    }
}

impl TransactionConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.busy_model_scope.is_empty() {
            return Err(ConfigError::Invalid {
                field: "busy_model_scope",
                reason: "must not be empty".into(),
            });
        }
        if self.busy_mode == BusyMode::Local && self.local_busy_id.is_none() {
            return Err(ConfigError::Invalid {
                field: "local_busy_id",
                reason: "required for the Local busy mode".into(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_from_empty_document() {
        let config = TransactionConfig::from_json("{}").unwrap();
        assert_eq!(config, TransactionConfig::default());
        assert_eq!(config.busy_model_scope, "ui");
    }

    #[test]
    fn local_mode_needs_an_id() {
        let err = TransactionConfig::from_json(r#"{ "busy_mode": "Local" }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "local_busy_id", .. }));
    }

    #[test]
    fn deep_link_new_action() {
        let startup = StartupParameters {
            preferred_mode: vec!["createWith:CreateFromTemplate".into()],
            hash: "#Order-manage?i-action=createWith".into(),
        };
        assert_eq!(
            startup.deep_link_new_action().as_deref(),
            Some("CreateFromTemplate")
        );

        let plain = StartupParameters {
            preferred_mode: vec!["create".into()],
            hash: "#Order-manage?i-action=create".into(),
        };
        assert_eq!(plain.deep_link_new_action(), None);
    }

    #[test]
    fn text_placeholder() {
        assert_eq!(
            TransactionTexts::format("Locked by {0}.", "John"),
            "Locked by John."
        );
    }
}
