//! Classification of resources into [`ProgrammingModel`]s.

use crate::error::ModelError;
use crate::framework::DataModel;
use crate::model::{root_entity_set, ListBinding, ProgrammingModel};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Reads draft and sticky-session annotations of a resource's root entity set.
///
/// The answer for a root entity set never changes during a session, so it is computed
/// once and cached.
pub struct ProgrammingModelResolver {
    model: Arc<dyn DataModel>,
    cache: Mutex<HashMap<String, ProgrammingModel>>,
}

impl ProgrammingModelResolver {
    pub fn new(model: Arc<dyn DataModel>) -> Self {
        Self {
            model,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Programming model of the resource a data or metadata path belongs to.
    pub fn resolve(&self, path: &str) -> Result<ProgrammingModel, ModelError> {
        let root = root_entity_set(path);
        if let Some(known) = self.cached(&root) {
            return Ok(known);
        }

        let metadata = self.model.entity_set_metadata(&root)?;
        let programming_model = if metadata.draft.is_some() {
            ProgrammingModel::Draft
        } else if metadata.sticky.is_some() {
            ProgrammingModel::Sticky
        } else {
            ProgrammingModel::NonDraft
        };
        debug!(entity_set = %root, ?programming_model, "Resolved programming model");

        if let Ok(mut cache) = self.cache.lock() {
            cache.insert(root, programming_model);
        }
        Ok(programming_model)
    }

    /// Relative bindings are resolved against their parent first.
    pub fn resolve_binding(&self, binding: &ListBinding) -> Result<ProgrammingModel, ModelError> {
        self.resolve(&binding.absolute_path())
    }

    fn cached(&self, root: &str) -> Option<ProgrammingModel> {
        self.cache.lock().ok()?.get(root).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::mock::MockDataModel;
    use crate::model::{DraftAnnotations, EntitySetMetadata, StickySessionAnnotations};

    fn model() -> Arc<MockDataModel> {
        let model = MockDataModel::new();
        model.add_entity_set(EntitySetMetadata {
            entity_set: "/Orders".into(),
            draft: Some(DraftAnnotations {
                is_root: true,
                ..Default::default()
            }),
            ..Default::default()
        });
        model.add_entity_set(EntitySetMetadata {
            entity_set: "/Carts".into(),
            sticky: Some(StickySessionAnnotations::default()),
            ..Default::default()
        });
        model.add_entity_set(EntitySetMetadata {
            entity_set: "/Currencies".into(),
            ..Default::default()
        });
        Arc::new(model)
    }

    #[test]
    fn classifies_by_annotations() {
        let resolver = ProgrammingModelResolver::new(model());
        assert_eq!(
            resolver.resolve("/Orders(ID=1,IsActiveEntity=true)").unwrap(),
            ProgrammingModel::Draft
        );
        assert_eq!(resolver.resolve("/Carts(7)").unwrap(), ProgrammingModel::Sticky);
        assert_eq!(
            resolver.resolve("/Currencies").unwrap(),
            ProgrammingModel::NonDraft
        );
    }

    #[test]
    fn relative_binding_uses_root_of_parent() {
        let resolver = ProgrammingModelResolver::new(model());
        let binding = ListBinding::relative("/Orders(ID=1,IsActiveEntity=false)", "_Items");
        assert_eq!(
            resolver.resolve_binding(&binding).unwrap(),
            ProgrammingModel::Draft
        );
    }

    #[test]
    fn metadata_errors_propagate_and_results_are_cached() {
        let model = model();
        let resolver = ProgrammingModelResolver::new(model.clone());
        assert!(matches!(
            resolver.resolve("/Unknown"),
            Err(ModelError::Metadata(_))
        ));

        resolver.resolve("/Orders(1)").unwrap();
        resolver.resolve("/Orders(2)").unwrap();
        assert_eq!(model.metadata_lookups("/Orders"), 1);
    }
}
