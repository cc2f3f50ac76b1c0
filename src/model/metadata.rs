//! Annotation metadata consumed by the engine.
//!
//! Resolving these from a service document is the model's job; the engine only reads them.

use serde::{Deserialize, Serialize};

/// Metadata of one entity set (or navigation target).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntitySetMetadata {
    /// Metadata path, e.g. `/Orders`.
    pub entity_set: String,
    /// Qualified entity type name, e.g. `Sales.Order`.
    pub entity_type: String,
    pub draft: Option<DraftAnnotations>,
    pub sticky: Option<StickySessionAnnotations>,
    pub properties: Vec<PropertyMetadata>,
    /// Function returning default values for new instances.
    pub default_values_function: Option<String>,
    /// Property carrying state messages; added to `$select` on create.
    pub messages_path: Option<String>,
}

impl EntitySetMetadata {
    /// Fields the user must fill before a new instance can be created on its own page.
    ///
    /// These are the key fields the backend does not compute and that are not hidden,
    /// followed by non-computed, visible immutable fields.
    pub fn creation_fields(&self) -> Vec<&PropertyMetadata> {
        let keys = self
            .properties
            .iter()
            .filter(|p| p.is_key && !p.computed && !p.hidden);
        let immutable = self
            .properties
            .iter()
            .filter(|p| !p.is_key && p.immutable && !p.computed && !p.hidden);
        keys.chain(immutable).collect()
    }

    /// Action that creates new instances instead of a plain POST.
    pub fn new_action(&self) -> Option<&str> {
        self.sticky
            .as_ref()
            .and_then(|s| s.new_action.as_deref())
            .or_else(|| self.draft.as_ref().and_then(|d| d.new_action.as_deref()))
    }
}

/// Draft root / draft node annotations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DraftAnnotations {
    /// `true` for a draft root, `false` for a draft node below one.
    pub is_root: bool,
    pub activation_action: Option<String>,
    pub edit_action: Option<String>,
    pub preparation_action: Option<String>,
    pub new_action: Option<String>,
}

/// Sticky session annotations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StickySessionAnnotations {
    pub edit_action: String,
    pub save_action: String,
    pub discard_action: String,
    pub new_action: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertyMetadata {
    pub name: String,
    pub label: Option<String>,
    pub is_key: bool,
    pub computed: bool,
    pub hidden: bool,
    pub immutable: bool,
}

impl PropertyMetadata {
    pub fn key(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_key: true,
            ..Self::default()
        }
    }

    pub fn computed_key(name: impl Into<String>) -> Self {
        Self {
            computed: true,
            ..Self::key(name)
        }
    }
}

/// Signature of a bound or unbound operation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionMetadata {
    pub name: String,
    pub is_bound: bool,
    /// Name of the binding parameter (`_it` by convention); never shown in a dialog.
    pub binding_parameter: Option<String>,
    pub parameters: Vec<ActionParameter>,
    pub label: Option<String>,
}

impl ActionMetadata {
    /// Parameters the user may be asked for.
    pub fn dialog_parameters(&self) -> Vec<&ActionParameter> {
        self.parameters
            .iter()
            .filter(|p| Some(&p.name) != self.binding_parameter.as_ref())
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionParameter {
    pub name: String,
    pub label: Option<String>,
    pub required: bool,
    pub default_value: Option<serde_json::Value>,
}

/// Administrative data of a draft (`DraftAdministrativeData` navigation).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DraftAdministrativeData {
    pub creation_date_time: Option<String>,
    pub last_change_date_time: Option<String>,
    /// User currently holding the edit lock, if any.
    pub in_process_by_user: Option<String>,
    pub in_process_by_user_description: Option<String>,
    pub last_changed_by_user: Option<String>,
    /// The draft belongs to the current user.
    pub processed_by_me: bool,
}

impl DraftAdministrativeData {
    /// The draft was changed after it had been created.
    pub fn has_changes(&self) -> bool {
        self.creation_date_time != self.last_change_date_time
    }

    /// Display name of the user holding the lock, when that is somebody else.
    pub fn locked_by_other(&self) -> Option<String> {
        if self.processed_by_me {
            return None;
        }
        let user = self.in_process_by_user.as_ref().filter(|u| !u.is_empty())?;
        Some(
            self.in_process_by_user_description
                .clone()
                .unwrap_or_else(|| user.clone()),
        )
    }

    /// Another user left changes behind without holding the lock anymore.
    pub fn unsaved_changes_of_other(&self) -> Option<String> {
        if self.processed_by_me || self.locked_by_other().is_some() {
            return None;
        }
        self.last_changed_by_user.clone().filter(|u| !u.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creation_fields_skip_computed_and_hidden() {
        let meta = EntitySetMetadata {
            properties: vec![
                PropertyMetadata::key("OrderID"),
                PropertyMetadata::computed_key("UUID"),
                PropertyMetadata {
                    hidden: true,
                    ..PropertyMetadata::key("Client")
                },
                PropertyMetadata {
                    name: "Currency".into(),
                    immutable: true,
                    ..Default::default()
                },
                PropertyMetadata {
                    name: "Note".into(),
                    ..Default::default()
                },
            ],
            ..Default::default()
        };
        let names: Vec<_> = meta.creation_fields().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["OrderID", "Currency"]);
    }

    #[test]
    fn sticky_new_action_wins() {
        let meta = EntitySetMetadata {
            draft: Some(DraftAnnotations {
                new_action: Some("DraftNew".into()),
                ..Default::default()
            }),
            sticky: Some(StickySessionAnnotations {
                new_action: Some("StickyNew".into()),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert_eq!(meta.new_action(), Some("StickyNew"));
    }

    #[test]
    fn lock_classification() {
        let locked = DraftAdministrativeData {
            in_process_by_user: Some("JDOE".into()),
            in_process_by_user_description: Some("John Doe".into()),
            ..Default::default()
        };
        assert_eq!(locked.locked_by_other().as_deref(), Some("John Doe"));
        assert_eq!(locked.unsaved_changes_of_other(), None);

        let expired = DraftAdministrativeData {
            last_changed_by_user: Some("JDOE".into()),
            ..Default::default()
        };
        assert_eq!(expired.locked_by_other(), None);
        assert_eq!(expired.unsaved_changes_of_other().as_deref(), Some("JDOE"));

        let mine = DraftAdministrativeData {
            in_process_by_user: Some("ME".into()),
            processed_by_me: true,
            ..Default::default()
        };
        assert_eq!(mine.locked_by_other(), None);
        assert_eq!(mine.unsaved_changes_of_other(), None);
    }
}
