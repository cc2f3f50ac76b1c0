use document_transaction::actions::ActionInvocationRequest;
use document_transaction::config::TransactionConfig;
use document_transaction::error::{CancellationReason, ModelError, TransactionError};
use document_transaction::framework::mock::MockServices;
use document_transaction::framework::DialogOutcome;
use document_transaction::lifecycle::DocumentLifecycleController;
use document_transaction::model::{
    ActionMetadata, ActionParameter, DocumentContext, DraftAnnotations, EntitySetMetadata,
    InvocationGrouping, OperationTarget, ProgrammingModel, ShowMessagesOptions,
    SideEffectDescriptor,
};
use serde_json::json;

fn setup() -> (MockServices, DocumentLifecycleController) {
    let mocks = MockServices::new();
    mocks.model.add_entity_set(EntitySetMetadata {
        entity_set: "/Orders".into(),
        entity_type: "Sales.Order".into(),
        draft: Some(DraftAnnotations::default()),
        ..EntitySetMetadata::default()
    });
    let controller = DocumentLifecycleController::new(mocks.services(), TransactionConfig::default());
    (mocks, controller)
}

fn order(id: u32) -> DocumentContext {
    DocumentContext::active(format!("/Orders({id})"), ProgrammingModel::Draft)
}

fn target_paths(mocks: &MockServices) -> Vec<String> {
    mocks
        .model
        .changesets()
        .iter()
        .flat_map(|cs| cs.calls.iter())
        .filter_map(|call| call.target.path().map(str::to_string))
        .collect()
}

#[tokio::test]
async fn test_change_set_grouping_sends_one_changeset() {
    let (mocks, controller) = setup();

    let response = controller
        .actions()
        .call_action(ActionInvocationRequest::bound(
            "Sales.approve",
            vec![order(1), order(2)],
        ))
        .await
        .unwrap()
        .expect("Action was not executed");

    let changesets = mocks.model.changesets();
    assert_eq!(changesets.len(), 1);
    assert_eq!(changesets[0].calls.len(), 2);
    assert_eq!(response.succeeded().count(), 2);
    assert_eq!(
        mocks.messages.shown(),
        [ShowMessagesOptions::for_action("Sales.approve", None)]
    );
}

#[tokio::test]
async fn test_isolated_grouping_sends_one_changeset_per_context() {
    let (mocks, controller) = setup();
    mocks
        .model
        .expect_operation("Sales.approve")
        .return_err(ModelError::request(400, "Order 1 is blocked"));

    let response = controller
        .actions()
        .call_action(
            ActionInvocationRequest::bound("Sales.approve", vec![order(1), order(2)])
                .with_grouping(InvocationGrouping::Isolated),
        )
        .await
        .unwrap()
        .expect("Action was not executed");

    let ids: Vec<String> = mocks.model.changesets().into_iter().map(|cs| cs.id).collect();
    assert_eq!(ids, ["Sales.approve:0", "Sales.approve:1"]);
    assert_eq!(response.failed_count(), 1);
    assert_eq!(response.outcomes[1].target.as_deref(), Some("/Orders(2)"));
    assert!(mocks.busy.is_balanced());
    mocks.verify();
}

#[tokio::test]
async fn test_isolated_grouping_fails_when_every_target_fails() {
    let (mocks, controller) = setup();
    for _ in 0..2 {
        mocks
            .model
            .expect_operation("Sales.approve")
            .return_err(ModelError::request(400, "blocked"));
    }

    let result = controller
        .actions()
        .call_action(
            ActionInvocationRequest::bound("Sales.approve", vec![order(1), order(2)])
                .with_grouping(InvocationGrouping::Isolated),
        )
        .await;

    assert_eq!(
        result,
        Err(TransactionError::ActionFailed {
            action: "Sales.approve".into(),
            source: ModelError::request(400, "blocked"),
        })
    );
    assert_eq!(mocks.messages.shown().len(), 1);
    assert!(mocks.busy.is_balanced());
}

#[tokio::test]
async fn test_missing_response_is_recorded_as_failure() {
    let (mocks, controller) = setup();
    mocks.model.drop_next_responses(1);

    let response = controller
        .actions()
        .call_action(ActionInvocationRequest::bound(
            "Sales.approve",
            vec![order(1), order(2)],
        ))
        .await
        .unwrap()
        .expect("Action was not executed");

    assert_eq!(response.outcomes.len(), 2);
    assert!(response.outcomes[0].result.is_ok());
    assert_eq!(response.outcomes[1].target.as_deref(), Some("/Orders(2)"));
    assert!(matches!(
        &response.outcomes[1].result,
        Err(ModelError::Request { status: None, message }) if message.contains("/Orders(2)")
    ));
    assert_eq!(response.failed_count(), 1);
    assert!(mocks.busy.is_balanced());
}

#[tokio::test]
async fn test_not_applicable_contexts_are_dropped() {
    let (mocks, controller) = setup();
    mocks.dialogs.expect_not_applicable(true);

    controller
        .actions()
        .call_action(
            ActionInvocationRequest::bound("Sales.approve", vec![order(1), order(2), order(3)])
                .with_not_applicable(vec![order(2)]),
        )
        .await
        .unwrap()
        .expect("Action was not executed");

    assert_eq!(target_paths(&mocks), ["/Orders(1)", "/Orders(3)"]);
    let prompt = &mocks.dialogs.not_applicable_prompts()[0];
    assert_eq!(prompt.applicable_count, 2);
    assert_eq!(prompt.not_applicable, [order(2)]);
}

#[tokio::test]
async fn test_nothing_applicable_sends_nothing() {
    let (mocks, controller) = setup();
    mocks.dialogs.expect_not_applicable(true);

    let response = controller
        .actions()
        .call_action(
            ActionInvocationRequest::bound("Sales.approve", vec![order(1)])
                .with_not_applicable(vec![order(1)]),
        )
        .await
        .unwrap();

    assert!(response.is_none());
    assert!(mocks.model.changesets().is_empty());
    assert_eq!(mocks.busy.lock_count(), 0);
}

#[tokio::test]
async fn test_declining_not_applicable_dialog_sends_nothing() {
    let (mocks, controller) = setup();
    mocks.dialogs.expect_not_applicable(false);

    let response = controller
        .actions()
        .call_action(
            ActionInvocationRequest::bound("Sales.approve", vec![order(1), order(2)])
                .with_not_applicable(vec![order(2)]),
        )
        .await
        .unwrap();

    assert!(response.is_none());
    assert!(mocks.model.changesets().is_empty());
}

fn reject_action() -> ActionMetadata {
    ActionMetadata {
        name: "Sales.reject".into(),
        is_bound: true,
        binding_parameter: Some("_it".into()),
        parameters: vec![
            ActionParameter {
                name: "_it".into(),
                ..ActionParameter::default()
            },
            ActionParameter {
                name: "Reason".into(),
                label: Some("Rejection Reason".into()),
                required: true,
                default_value: None,
            },
        ],
        label: Some("Reject".into()),
    }
}

#[tokio::test]
async fn test_cancelled_parameter_dialog() {
    let (mocks, controller) = setup();
    mocks.model.add_action(reject_action());
    mocks.dialogs.expect_values(DialogOutcome::Cancelled);

    let result = controller
        .actions()
        .call_action(ActionInvocationRequest::bound("Sales.reject", vec![order(1)]))
        .await;

    assert_eq!(
        result,
        Err(TransactionError::Cancelled(
            CancellationReason::ParameterDialogCancelled
        ))
    );
    let dialog = &mocks.dialogs.value_dialogs()[0];
    assert_eq!(dialog.title, "Reject");
    assert_eq!(dialog.fields.len(), 1);
    assert_eq!(dialog.fields[0].label, "Rejection Reason");
    assert!(mocks.model.changesets().is_empty());
    assert_eq!(mocks.messages.shown().len(), 1);
}

#[tokio::test]
async fn test_given_parameters_skip_the_dialog() {
    let (mocks, controller) = setup();
    mocks.model.add_action(reject_action());

    controller
        .actions()
        .call_action(
            ActionInvocationRequest::bound("Sales.reject", vec![order(1)])
                .with_parameter("Reason", "Duplicate")
                .skip_parameter_dialog(),
        )
        .await
        .unwrap();

    let call = &mocks.model.changesets()[0].calls[0];
    assert_eq!(call.parameters["Reason"], json!("Duplicate"));
    assert!(mocks.dialogs.value_dialogs().is_empty());
}

#[tokio::test]
async fn test_side_effects_augment_the_request() {
    let (mocks, controller) = setup();
    mocks.side_effects.set_action_side_effects(
        "Sales.approve",
        SideEffectDescriptor {
            target_properties: vec!["Status".into(), "Total".into()],
            target_entities: vec!["_Items".into()],
        },
    );

    controller
        .actions()
        .call_action(ActionInvocationRequest::bound("Sales.approve", vec![order(1)]))
        .await
        .unwrap();

    let augmentation = &mocks.model.changesets()[0].calls[0].augmentation;
    assert_eq!(augmentation.select.as_deref(), Some("Status,Total"));
    assert_eq!(augmentation.expand.as_deref(), Some("_Items"));
}

#[tokio::test]
async fn test_unbound_action_strips_container() {
    let (mocks, controller) = setup();

    controller
        .actions()
        .call_action(
            ActionInvocationRequest::unbound("Container/Sales.recalculate", mocks.model.clone())
                .with_label("Recalculate"),
        )
        .await
        .unwrap();

    let call = &mocks.model.changesets()[0].calls[0];
    assert_eq!(call.name, "Sales.recalculate");
    assert_eq!(call.target, OperationTarget::Unbound);
    assert_eq!(
        mocks.messages.shown()[0].action_name.as_deref(),
        Some("Recalculate")
    );

    let journal = &mocks.journal;
    assert!(journal.position("remove_transition_messages") < journal.position("lock /busy"));
    assert!(journal.position("lock /busy") < journal.position("submit"));
    assert!(journal.position("submit") < journal.position("unlock /busy"));
}

#[tokio::test]
async fn test_bound_action_without_contexts_is_rejected() {
    let (mocks, controller) = setup();

    let result = controller
        .actions()
        .call_action(ActionInvocationRequest::bound("Sales.approve", Vec::new()))
        .await;

    assert!(matches!(result, Err(TransactionError::InvalidRequest(_))));
    assert!(mocks.model.changesets().is_empty());
}
