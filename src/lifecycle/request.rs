//! Typed requests for the lifecycle operations.

use crate::config::BusyMode;
use crate::framework::TriggerControl;
use crate::model::{DocumentContext, EntityData, ListBinding};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Where a new document is edited after creation.
///
/// Every mode but [`CreationRow`](Self::CreationRow) asks for missing key fields up front.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CreationMode {
    /// On its own object page.
    #[default]
    NewPage,
    /// As a new row inside a table.
    Inline,
    /// In the creation row below a table. Key fields are typed into the row, not a dialog.
    CreationRow,
}

#[derive(Debug, Clone)]
pub struct CreateDocumentRequest {
    pub list_binding: ListBinding,
    /// Initial values; override the backend's default values.
    pub data: EntityData,
    pub creation_mode: CreationMode,
    pub create_at_end: bool,
    pub inactive: bool,
    /// Leave the transient row in place when the backend rejects it.
    pub keep_transient_context_on_failed: bool,
    /// Busy mode; the configured default when `None`.
    pub busy_mode: Option<BusyMode>,
    /// Control id for [`BusyMode::Local`].
    pub busy_id: Option<String>,
}

impl CreateDocumentRequest {
    pub fn new(list_binding: ListBinding) -> Self {
        Self {
            list_binding,
            data: EntityData::new(),
            creation_mode: CreationMode::default(),
            create_at_end: false,
            inactive: false,
            keep_transient_context_on_failed: false,
            busy_mode: None,
            busy_id: None,
        }
    }

    pub fn with_value(mut self, name: &str, value: impl Into<serde_json::Value>) -> Self {
        self.data.insert(name.to_string(), value.into());
        self
    }

    pub fn with_creation_mode(mut self, creation_mode: CreationMode) -> Self {
        self.creation_mode = creation_mode;
        self
    }

    pub fn at_end(mut self) -> Self {
        self.create_at_end = true;
        self
    }

    pub fn inactive(mut self) -> Self {
        self.inactive = true;
        self
    }

    pub fn keep_transient_context_on_failed(mut self) -> Self {
        self.keep_transient_context_on_failed = true;
        self
    }

    pub fn with_busy(mut self, busy_mode: BusyMode, busy_id: Option<&str>) -> Self {
        self.busy_mode = Some(busy_mode);
        self.busy_id = busy_id.map(str::to_string);
        self
    }
}

#[derive(Debug, Clone)]
pub struct SaveDocumentRequest {
    pub context: DocumentContext,
    pub is_new_object: bool,
    /// Re-request side effects of `bindings` when the save fails.
    pub execute_side_effects_on_error: bool,
    pub bindings: Vec<ListBinding>,
}

impl SaveDocumentRequest {
    pub fn new(context: DocumentContext) -> Self {
        Self {
            context,
            is_new_object: false,
            execute_side_effects_on_error: false,
            bindings: Vec::new(),
        }
    }

    pub fn new_object(mut self) -> Self {
        self.is_new_object = true;
        self
    }

    pub fn with_side_effects_on_error(mut self, bindings: Vec<ListBinding>) -> Self {
        self.execute_side_effects_on_error = true;
        self.bindings = bindings;
        self
    }
}

#[derive(Clone)]
pub struct CancelDocumentRequest {
    pub context: DocumentContext,
    pub is_new_object: bool,
    pub is_object_modified: bool,
    pub skip_discard_popover: bool,
    /// Control that is disabled while the discard confirmation is open.
    pub cancel_button: Option<Arc<dyn TriggerControl>>,
}

impl CancelDocumentRequest {
    pub fn new(context: DocumentContext) -> Self {
        Self {
            context,
            is_new_object: false,
            is_object_modified: false,
            skip_discard_popover: false,
            cancel_button: None,
        }
    }

    pub fn new_object(mut self) -> Self {
        self.is_new_object = true;
        self
    }

    pub fn modified(mut self) -> Self {
        self.is_object_modified = true;
        self
    }

    pub fn skip_discard_popover(mut self) -> Self {
        self.skip_discard_popover = true;
        self
    }

    pub fn with_cancel_button(mut self, button: Arc<dyn TriggerControl>) -> Self {
        self.cancel_button = Some(button);
        self
    }
}

/// A row selected for deletion.
#[derive(Debug, Clone, PartialEq)]
pub struct DeletionCandidate {
    pub context: DocumentContext,
    /// Result of the entity set's delete restriction for this row.
    pub deletable: bool,
}

impl DeletionCandidate {
    pub fn deletable(context: DocumentContext) -> Self {
        Self {
            context,
            deletable: true,
        }
    }

    pub fn restricted(context: DocumentContext) -> Self {
        Self {
            context,
            deletable: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DeletionTarget {
    /// The object shown on an object page.
    Object(DocumentContext),
    /// Rows selected in a table.
    Rows {
        binding: ListBinding,
        candidates: Vec<DeletionCandidate>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeleteDocumentRequest {
    pub target: DeletionTarget,
    /// Title of the object, used in the confirmation text.
    pub title: Option<String>,
    pub description: Option<String>,
}

impl DeleteDocumentRequest {
    pub fn object(context: DocumentContext) -> Self {
        Self {
            target: DeletionTarget::Object(context),
            title: None,
            description: None,
        }
    }

    pub fn rows(binding: ListBinding, candidates: Vec<DeletionCandidate>) -> Self {
        Self {
            target: DeletionTarget::Rows {
                binding,
                candidates,
            },
            title: None,
            description: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>, description: Option<&str>) -> Self {
        self.title = Some(title.into());
        self.description = description.map(str::to_string);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeleteOutcome {
    /// Contexts handed to the deletion policy.
    pub deleted: Vec<DocumentContext>,
    /// Selected contexts left alone (restricted, locked, or unsaved changes not included).
    pub skipped: Vec<DocumentContext>,
}
