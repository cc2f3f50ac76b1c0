use serde::{Deserialize, Serialize};

/// Property values of an entity or of an operation's parameters.
pub type EntityData = serde_json::Map<String, serde_json::Value>;

/// How the backend lets a resource be edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProgrammingModel {
    /// A draft entity shadows the active one and is activated on save.
    Draft,
    /// The backend pins an editable copy in a server-side session.
    Sticky,
    /// Plain CRUD service without transactional editing.
    NonDraft,
}

impl ProgrammingModel {
    pub fn supports_editing(self) -> bool {
        matches!(self, ProgrammingModel::Draft | ProgrammingModel::Sticky)
    }
}

/// Handle to one remote entity instance.
///
/// Contexts are values: the [`DataModel`](crate::framework::DataModel) addresses the
/// instance by `path`, and operations that change the instance hand back a new context.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentContext {
    pub path: String,
    pub is_transient: bool,
    pub is_active_entity: bool,
    pub has_pending_changes: bool,
    pub programming_model: ProgrammingModel,
}

impl DocumentContext {
    /// An active, persisted instance.
    pub fn active(path: impl Into<String>, programming_model: ProgrammingModel) -> Self {
        Self {
            path: path.into(),
            is_transient: false,
            is_active_entity: true,
            has_pending_changes: false,
            programming_model,
        }
    }

    /// A persisted draft instance.
    pub fn draft(path: impl Into<String>) -> Self {
        Self {
            is_active_entity: false,
            ..Self::active(path, ProgrammingModel::Draft)
        }
    }

    /// A client-side row whose POST has not been confirmed yet.
    pub fn transient(path: impl Into<String>, programming_model: ProgrammingModel) -> Self {
        Self {
            path: path.into(),
            is_transient: true,
            is_active_entity: programming_model != ProgrammingModel::Draft,
            has_pending_changes: true,
            programming_model,
        }
    }

    pub fn with_programming_model(mut self, programming_model: ProgrammingModel) -> Self {
        self.programming_model = programming_model;
        self
    }

    /// Path of the collection this instance belongs to (`/Orders(1)/_Items(2)` → `/Orders(1)/_Items`).
    pub fn binding_path(&self) -> &str {
        strip_key_predicate(&self.path)
    }

    pub fn meta_path(&self) -> String {
        meta_path(&self.path)
    }
}

/// A collection binding rows are created in and deleted from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ListBinding {
    pub path: String,
    /// Path of the parent context for relative (navigation property) bindings.
    pub parent: Option<String>,
}

impl ListBinding {
    pub fn absolute(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            parent: None,
        }
    }

    pub fn relative(parent: impl Into<String>, navigation_property: impl Into<String>) -> Self {
        Self {
            path: navigation_property.into(),
            parent: Some(parent.into()),
        }
    }

    pub fn is_relative(&self) -> bool {
        self.parent.is_some()
    }

    pub fn absolute_path(&self) -> String {
        match &self.parent {
            Some(parent) => format!(
                "{}/{}",
                parent.trim_end_matches('/'),
                self.path.trim_start_matches('/')
            ),
            None => self.path.clone(),
        }
    }
}

/// Metadata path of a data path: key predicates removed (`/Orders(1)/_Items` → `/Orders/_Items`).
pub fn meta_path(path: &str) -> String {
    let segments: Vec<&str> = path
        .split('/')
        .filter(|segment| !segment.is_empty())
        .map(strip_key_predicate)
        .collect();
    format!("/{}", segments.join("/"))
}

/// Metadata path of the root entity set of a data path.
pub fn root_entity_set(path: &str) -> String {
    let root = path
        .split('/')
        .find(|segment| !segment.is_empty())
        .map(strip_key_predicate)
        .unwrap_or_default();
    format!("/{root}")
}

fn strip_key_predicate(segment: &str) -> &str {
    match segment.rfind('(') {
        Some(idx) if segment.ends_with(')') => &segment[..idx],
        _ => segment,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn meta_path_strips_keys() {
        assert_eq!(
            meta_path("/Orders(ID=1,IsActiveEntity=true)/_Items(2)"),
            "/Orders/_Items"
        );
        assert_eq!(meta_path("/Orders"), "/Orders");
        assert_eq!(root_entity_set("/Orders(1)/_Items"), "/Orders");
    }

    #[test]
    fn binding_path_of_nested_instance() {
        let ctx = DocumentContext::active("/Orders(1)/_Items(2)", ProgrammingModel::Sticky);
        assert_eq!(ctx.binding_path(), "/Orders(1)/_Items");
    }

    #[test]
    fn relative_binding_is_made_absolute() {
        let binding = ListBinding::relative("/Orders(1)", "_Items");
        assert!(binding.is_relative());
        assert_eq!(binding.absolute_path(), "/Orders(1)/_Items");
        assert_eq!(ListBinding::absolute("/Orders").absolute_path(), "/Orders");
    }

    #[test]
    fn transient_draft_rows_are_not_active() {
        let ctx = DocumentContext::transient("/Orders(9)", ProgrammingModel::Draft);
        assert!(ctx.is_transient);
        assert!(!ctx.is_active_entity);
    }
}
