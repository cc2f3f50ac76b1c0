use crate::config::BusyMode;
use crate::error::ModelError;
use crate::framework::DataModel;
use crate::model::{DocumentContext, EntityData, InvocationGrouping, OperationResult};
use std::fmt;
use std::sync::Arc;

/// Who an action is executed on, decided once at the call boundary.
#[derive(Clone)]
pub enum ActionTarget {
    /// Bound action; the contexts supply the model.
    Bound(Vec<DocumentContext>),
    /// Operation import on an explicitly supplied model.
    Unbound(Arc<dyn DataModel>),
}

impl fmt::Debug for ActionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionTarget::Bound(contexts) => f.debug_tuple("Bound").field(contexts).finish(),
            ActionTarget::Unbound(_) => f.write_str("Unbound"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ActionInvocationRequest {
    pub action_name: String,
    pub target: ActionTarget,
    /// Targets pre-classified as not applicable; never sent to the backend.
    pub not_applicable_contexts: Vec<DocumentContext>,
    pub parameter_values: EntityData,
    pub invocation_grouping: InvocationGrouping,
    pub skip_parameter_dialog: bool,
    /// Label used when relaying messages; defaults to the action name.
    pub label: Option<String>,
    /// Id of the control that triggered the action.
    pub control: Option<String>,
    /// Busy mode; the configured default when `None`.
    pub busy_mode: Option<BusyMode>,
}

impl ActionInvocationRequest {
    pub fn bound(action_name: impl Into<String>, contexts: Vec<DocumentContext>) -> Self {
        Self::new(action_name, ActionTarget::Bound(contexts))
    }

    pub fn unbound(action_name: impl Into<String>, model: Arc<dyn DataModel>) -> Self {
        Self::new(action_name, ActionTarget::Unbound(model))
    }

    fn new(action_name: impl Into<String>, target: ActionTarget) -> Self {
        Self {
            action_name: action_name.into(),
            target,
            not_applicable_contexts: Vec::new(),
            parameter_values: EntityData::new(),
            invocation_grouping: InvocationGrouping::default(),
            skip_parameter_dialog: false,
            label: None,
            control: None,
            busy_mode: None,
        }
    }

    pub fn with_not_applicable(mut self, contexts: Vec<DocumentContext>) -> Self {
        self.not_applicable_contexts = contexts;
        self
    }

    pub fn with_parameter(mut self, name: &str, value: impl Into<serde_json::Value>) -> Self {
        self.parameter_values.insert(name.to_string(), value.into());
        self
    }

    pub fn with_grouping(mut self, grouping: InvocationGrouping) -> Self {
        self.invocation_grouping = grouping;
        self
    }

    pub fn skip_parameter_dialog(mut self) -> Self {
        self.skip_parameter_dialog = true;
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_control(mut self, control: impl Into<String>) -> Self {
        self.control = Some(control.into());
        self
    }

    pub fn with_busy_mode(mut self, busy_mode: BusyMode) -> Self {
        self.busy_mode = Some(busy_mode);
        self
    }
}

/// Result of the action on one target (or of the unbound invocation).
#[derive(Debug, Clone, PartialEq)]
pub struct InvocationOutcome {
    pub target: Option<String>,
    pub result: Result<OperationResult, ModelError>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActionResponse {
    pub outcomes: Vec<InvocationOutcome>,
}

impl ActionResponse {
    pub fn succeeded(&self) -> impl Iterator<Item = &OperationResult> {
        self.outcomes.iter().filter_map(|o| o.result.as_ref().ok())
    }

    pub fn failed_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_err()).count()
    }

    /// Context returned by the first successful invocation.
    pub fn first_context(&self) -> Option<&DocumentContext> {
        self.succeeded().find_map(|r| r.context.as_ref())
    }
}
