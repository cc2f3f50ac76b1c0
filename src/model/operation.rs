use super::{DocumentContext, EntityData, Message};
use serde::{Deserialize, Serialize};

/// What an operation is executed on.
#[derive(Debug, Clone, PartialEq)]
pub enum OperationTarget {
    /// Bound to one instance.
    Instance(DocumentContext),
    /// Bound to a collection (e.g. a new action on `/Orders`).
    Collection(String),
    /// Operation import.
    Unbound,
}

impl OperationTarget {
    pub fn path(&self) -> Option<&str> {
        match self {
            OperationTarget::Instance(ctx) => Some(&ctx.path),
            OperationTarget::Collection(path) => Some(path),
            OperationTarget::Unbound => None,
        }
    }
}

/// Additional properties and navigations requested with an operation's response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryAugmentation {
    pub select: Option<String>,
    pub expand: Option<String>,
}

impl QueryAugmentation {
    pub fn is_empty(&self) -> bool {
        self.select.is_none() && self.expand.is_none()
    }
}

/// One operation invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationCall {
    pub name: String,
    pub target: OperationTarget,
    pub parameters: EntityData,
    pub augmentation: QueryAugmentation,
}

impl OperationCall {
    pub fn new(name: impl Into<String>, target: OperationTarget) -> Self {
        Self {
            name: name.into(),
            target,
            parameters: EntityData::new(),
            augmentation: QueryAugmentation::default(),
        }
    }

    pub fn with_parameter(mut self, name: &str, value: impl Into<serde_json::Value>) -> Self {
        self.parameters.insert(name.to_string(), value.into());
        self
    }

    pub fn with_parameters(mut self, parameters: EntityData) -> Self {
        self.parameters.extend(parameters);
        self
    }

    pub fn with_augmentation(mut self, augmentation: QueryAugmentation) -> Self {
        self.augmentation = augmentation;
        self
    }
}

/// Calls committed atomically: all succeed or the whole changeset fails.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeSet {
    pub id: String,
    pub calls: Vec<OperationCall>,
}

impl ChangeSet {
    pub fn single(call: OperationCall) -> Self {
        Self {
            id: call.name.clone(),
            calls: vec![call],
        }
    }
}

/// Response of one operation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OperationResult {
    /// Context of the returned entity, if the operation returns one.
    pub context: Option<DocumentContext>,
    pub value: Option<serde_json::Value>,
    pub messages: Vec<Message>,
}

impl OperationResult {
    pub fn with_context(context: DocumentContext) -> Self {
        Self {
            context: Some(context),
            ..Self::default()
        }
    }

    pub fn with_value(value: serde_json::Value) -> Self {
        Self {
            value: Some(value),
            ..Self::default()
        }
    }

    pub fn with_messages(mut self, messages: Vec<Message>) -> Self {
        self.messages = messages;
        self
    }
}

/// How several targets of one action are grouped into changesets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvocationGrouping {
    /// All targets in one changeset.
    #[default]
    ChangeSet,
    /// One changeset per target.
    Isolated,
}

/// Additional paths to re-read after an action, keyed by (entity type, action).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SideEffectDescriptor {
    pub target_properties: Vec<String>,
    /// Navigation properties whose targets are re-read entirely.
    pub target_entities: Vec<String>,
}

impl SideEffectDescriptor {
    pub fn is_empty(&self) -> bool {
        self.target_properties.is_empty() && self.target_entities.is_empty()
    }
}
