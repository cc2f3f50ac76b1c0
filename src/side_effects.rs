//! Glue between the engine and the [`SideEffectsService`].

use crate::framework::{DataModel, SideEffectsService};
use crate::model::{DocumentContext, ListBinding, QueryAugmentation};
use std::sync::Arc;
use tracing::{debug, warn};

pub struct SideEffectCoordinator {
    service: Arc<dyn SideEffectsService>,
    model: Arc<dyn DataModel>,
}

impl SideEffectCoordinator {
    pub fn new(service: Arc<dyn SideEffectsService>, model: Arc<dyn DataModel>) -> Self {
        Self { service, model }
    }

    /// `$select` / `$expand` additions for an action's response.
    pub fn action_augmentation(
        &self,
        action_name: &str,
        context: Option<&DocumentContext>,
    ) -> QueryAugmentation {
        let Some(descriptor) = self
            .service
            .get_action_side_effects(action_name, context)
            .filter(|d| !d.is_empty())
        else {
            return QueryAugmentation::default();
        };
        debug!(action = action_name, ?descriptor, "Action side effects");

        let join = |paths: &[String]| (!paths.is_empty()).then(|| paths.join(","));
        QueryAugmentation {
            select: join(&descriptor.target_properties),
            expand: join(&descriptor.target_entities),
        }
    }

    /// Re-requests side effects for each binding that still holds transient rows.
    ///
    /// Used after a failed save so rows the user created but the backend did not accept
    /// show their server-side state again. Failures are logged; the caller is already
    /// reporting the save error. Returns the number of bindings refreshed.
    pub async fn refresh_transient_rows(
        &self,
        bindings: &[ListBinding],
        context: &DocumentContext,
    ) -> usize {
        let mut requested = 0;
        for binding in bindings {
            let path = binding.absolute_path();
            if !self.model.has_transient_contexts(&path) {
                continue;
            }
            requested += 1;
            if let Err(e) = self
                .service
                .request_side_effects_for_navigation_property(&binding.path, context)
                .await
            {
                warn!(binding = %path, error = %e, "Side effects request failed");
            }
        }
        requested
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::mock::{MockDataModel, RecordingSideEffects};
    use crate::model::{ProgrammingModel, SideEffectDescriptor};

    #[test]
    fn augmentation_joins_paths() {
        let service = Arc::new(RecordingSideEffects::new());
        service.set_action_side_effects(
            "Approve",
            SideEffectDescriptor {
                target_properties: vec!["Status".into(), "ApprovedBy".into()],
                target_entities: vec!["_Items".into()],
            },
        );
        let coordinator = SideEffectCoordinator::new(service, Arc::new(MockDataModel::new()));

        let augmentation = coordinator.action_augmentation("Approve", None);
        assert_eq!(augmentation.select.as_deref(), Some("Status,ApprovedBy"));
        assert_eq!(augmentation.expand.as_deref(), Some("_Items"));
        assert!(coordinator.action_augmentation("Reject", None).is_empty());
    }

    #[tokio::test]
    async fn refresh_only_bindings_with_transient_rows() {
        let service = Arc::new(RecordingSideEffects::new());
        let model = Arc::new(MockDataModel::new());
        model.add_transient_row("/Carts(1)/_Items", "/Carts(1)/_Items(5)");

        let coordinator = SideEffectCoordinator::new(service.clone(), model);
        let context = DocumentContext::active("/Carts(1)", ProgrammingModel::Sticky);
        let bindings = [
            ListBinding::relative("/Carts(1)", "_Items"),
            ListBinding::relative("/Carts(1)", "_Notes"),
        ];

        assert_eq!(coordinator.refresh_transient_rows(&bindings, &context).await, 1);
        assert_eq!(service.requested_navigation_properties(), ["_Items"]);
    }
}
