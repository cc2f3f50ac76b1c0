//! # Mock Collaborators
//!
//! In-memory implementations of every collaborator trait, for testing the engine without
//! a backend or a UI.
//!
//! All doubles write to a shared [`Journal`], so tests can assert *ordering* across
//! collaborators (e.g. "transition messages were removed before the changeset was
//! submitted"). [`MockServices`] wires a full set around one journal.
//!
//! # Example
//! ```ignore
//! let mocks = MockServices::new();
//! mocks.model.expect_operation("Sales.Approve").return_ok(OperationResult::default());
//! mocks.dialogs.expect_discard(true);
//!
//! let controller = DocumentLifecycleController::new(mocks.services(), TransactionConfig::default());
//! // Drive the controller...
//! mocks.verify(); // Ensures all scripted answers were consumed
//! ```

use crate::error::ModelError;
use crate::framework::{
    BusyLocker, BusyScope, CreateOptions, DataModel, DeleteChoice, DeletePrompt, DeletionPlan,
    DeletionPolicy, DialogOutcome, DialogService, DiscardPrompt, MessageHandler,
    NotApplicablePrompt, SideEffectsService, TransactionServices, TriggerControl, ValueDialog,
};
use crate::model::{
    root_entity_set, ActionMetadata, ChangeSet, DocumentContext, DraftAdministrativeData,
    EntityData, EntitySetMetadata, ListBinding, OperationResult, ProgrammingModel,
    ShowMessagesOptions, SideEffectDescriptor,
};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

// =============================================================================
// JOURNAL
// =============================================================================

/// Ordered record of collaborator calls, shared between doubles.
#[derive(Clone, Default)]
pub struct Journal(Arc<Mutex<Vec<String>>>);

impl Journal {
    pub fn record(&self, entry: impl Into<String>) {
        self.0.lock().unwrap().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    /// Index of the first entry starting with `prefix`.
    pub fn position(&self, prefix: &str) -> Option<usize> {
        self.entries().iter().position(|e| e.starts_with(prefix))
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.entries().iter().filter(|e| e.starts_with(prefix)).count()
    }
}

// =============================================================================
// DATA MODEL
// =============================================================================

/// Model calls that can be scripted to fail with [`MockDataModel::fail_next`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MockCall {
    Create,
    Created,
    ResetChanges,
    CanonicalPath,
    DraftAdministrativeData,
    Delete,
    Refresh,
}

#[derive(Default)]
struct MockState {
    entity_sets: HashMap<String, EntitySetMetadata>,
    actions: HashMap<String, ActionMetadata>,
    /// Rows per absolute binding path.
    rows: HashMap<String, Vec<DocumentContext>>,
    canonical_paths: HashMap<String, String>,
    admin_data: HashMap<String, DraftAdministrativeData>,
    failures: HashMap<MockCall, VecDeque<ModelError>>,
    changesets: Vec<ChangeSet>,
    metadata_lookups: HashMap<String, usize>,
    created_data: Vec<EntityData>,
    deleted: Vec<String>,
    refreshed: Vec<String>,
    /// Responses left out of the next successful changeset.
    dropped_responses: usize,
    next_id: u64,
}

type OperationQueue = Arc<Mutex<HashMap<String, VecDeque<Result<OperationResult, ModelError>>>>>;

/// In-memory backend.
///
/// Rows live per binding path. Operations answer with scripted results registered via
/// [`expect_operation`](Self::expect_operation), or an empty [`OperationResult`] when
/// nothing was scripted.
pub struct MockDataModel {
    state: Mutex<MockState>,
    operations: OperationQueue,
    journal: Journal,
}

impl Default for MockDataModel {
    fn default() -> Self {
        Self::new()
    }
}

impl MockDataModel {
    pub fn new() -> Self {
        Self::with_journal(Journal::default())
    }

    pub fn with_journal(journal: Journal) -> Self {
        Self {
            state: Mutex::new(MockState {
                next_id: 1,
                ..MockState::default()
            }),
            operations: Arc::new(Mutex::new(HashMap::new())),
            journal,
        }
    }

    pub fn add_entity_set(&self, metadata: EntitySetMetadata) {
        let mut state = self.state.lock().unwrap();
        state.entity_sets.insert(metadata.entity_set.clone(), metadata);
    }

    pub fn add_action(&self, metadata: ActionMetadata) {
        let mut state = self.state.lock().unwrap();
        state.actions.insert(metadata.name.clone(), metadata);
    }

    pub fn add_row(&self, binding_path: &str, context: DocumentContext) {
        let mut state = self.state.lock().unwrap();
        state
            .rows
            .entry(binding_path.to_string())
            .or_default()
            .push(context);
    }

    pub fn add_transient_row(&self, binding_path: &str, path: &str) {
        let programming_model = self.programming_model_of(path);
        self.add_row(binding_path, DocumentContext::transient(path, programming_model));
    }

    pub fn set_canonical_path(&self, path: &str, canonical: &str) {
        let mut state = self.state.lock().unwrap();
        state
            .canonical_paths
            .insert(path.to_string(), canonical.to_string());
    }

    pub fn set_draft_administrative_data(&self, path: &str, data: DraftAdministrativeData) {
        let mut state = self.state.lock().unwrap();
        state.admin_data.insert(path.to_string(), data);
    }

    /// The next call of `call` fails with `error`.
    pub fn fail_next(&self, call: MockCall, error: ModelError) {
        let mut state = self.state.lock().unwrap();
        state.failures.entry(call).or_default().push_back(error);
    }

    /// The next successful changeset answers with `count` fewer results than calls.
    pub fn drop_next_responses(&self, count: usize) {
        self.state.lock().unwrap().dropped_responses = count;
    }

    /// Scripts the response of the next invocation of operation `name`.
    pub fn expect_operation(&self, name: &str) -> OperationExpectationBuilder {
        OperationExpectationBuilder {
            name: name.to_string(),
            operations: self.operations.clone(),
        }
    }

    pub fn rows(&self, binding_path: &str) -> Vec<DocumentContext> {
        let state = self.state.lock().unwrap();
        state.rows.get(binding_path).cloned().unwrap_or_default()
    }

    pub fn changesets(&self) -> Vec<ChangeSet> {
        self.state.lock().unwrap().changesets.clone()
    }

    /// Names of all submitted operations, in order.
    pub fn invoked_operations(&self) -> Vec<String> {
        self.changesets()
            .iter()
            .flat_map(|cs| cs.calls.iter().map(|c| c.name.clone()))
            .collect()
    }

    pub fn created_data(&self) -> Vec<EntityData> {
        self.state.lock().unwrap().created_data.clone()
    }

    pub fn deleted(&self) -> Vec<String> {
        self.state.lock().unwrap().deleted.clone()
    }

    pub fn refreshed(&self) -> Vec<String> {
        self.state.lock().unwrap().refreshed.clone()
    }

    pub fn metadata_lookups(&self, meta_path: &str) -> usize {
        let state = self.state.lock().unwrap();
        state.metadata_lookups.get(meta_path).copied().unwrap_or(0)
    }

    /// Panics if scripted operation responses were not consumed.
    pub fn verify(&self) {
        let operations = self.operations.lock().unwrap();
        let remaining: usize = operations.values().map(VecDeque::len).sum();
        if remaining > 0 {
            panic!("Not all operation expectations were met. {} remaining", remaining);
        }
    }

    fn take_failure(&self, call: MockCall) -> Result<(), ModelError> {
        let mut state = self.state.lock().unwrap();
        match state.failures.get_mut(&call).and_then(VecDeque::pop_front) {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn programming_model_of(&self, path: &str) -> ProgrammingModel {
        let state = self.state.lock().unwrap();
        match state.entity_sets.get(&root_entity_set(path)) {
            Some(meta) if meta.draft.is_some() => ProgrammingModel::Draft,
            Some(meta) if meta.sticky.is_some() => ProgrammingModel::Sticky,
            _ => ProgrammingModel::NonDraft,
        }
    }

    fn find_row_mut<'a>(
        state: &'a mut MockState,
        path: &str,
    ) -> Option<&'a mut DocumentContext> {
        state
            .rows
            .values_mut()
            .flat_map(|rows| rows.iter_mut())
            .find(|row| row.path == path)
    }
}

#[async_trait]
impl DataModel for MockDataModel {
    fn entity_set_metadata(&self, meta_path: &str) -> Result<EntitySetMetadata, ModelError> {
        let mut state = self.state.lock().unwrap();
        *state
            .metadata_lookups
            .entry(meta_path.to_string())
            .or_default() += 1;
        state
            .entity_sets
            .get(meta_path)
            .cloned()
            .ok_or_else(|| ModelError::Metadata(format!("No entity set {meta_path}")))
    }

    fn action_metadata(
        &self,
        action_name: &str,
        _bound_entity_type: Option<&str>,
    ) -> Result<ActionMetadata, ModelError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .actions
            .get(action_name)
            .cloned()
            .unwrap_or_else(|| ActionMetadata {
                name: action_name.to_string(),
                ..ActionMetadata::default()
            }))
    }

    async fn create(
        &self,
        binding: &ListBinding,
        data: EntityData,
        options: CreateOptions,
    ) -> Result<DocumentContext, ModelError> {
        self.take_failure(MockCall::Create)?;
        let binding_path = binding.absolute_path();
        let programming_model = self.programming_model_of(&binding_path);

        let mut state = self.state.lock().unwrap();
        let id = state.next_id;
        state.next_id += 1;
        let context = DocumentContext::transient(format!("{binding_path}({id})"), programming_model);
        state.created_data.push(data);
        let rows = state.rows.entry(binding_path).or_default();
        if options.at_end {
            rows.push(context.clone());
        } else {
            rows.insert(0, context.clone());
        }
        self.journal.record(format!("create {}", context.path));
        Ok(context)
    }

    async fn created(&self, context: &DocumentContext) -> Result<DocumentContext, ModelError> {
        self.take_failure(MockCall::Created)?;
        let mut state = self.state.lock().unwrap();
        let row = Self::find_row_mut(&mut state, &context.path)
            .ok_or_else(|| ModelError::NotFound(context.path.clone()))?;
        row.is_transient = false;
        row.has_pending_changes = false;
        self.journal.record(format!("created {}", context.path));
        Ok(row.clone())
    }

    fn has_pending_changes(&self, binding_path: &str) -> bool {
        self.rows(binding_path)
            .iter()
            .any(|row| row.is_transient || row.has_pending_changes)
    }

    fn has_transient_contexts(&self, binding_path: &str) -> bool {
        self.rows(binding_path).iter().any(|row| row.is_transient)
    }

    async fn reset_changes(&self, binding_path: &str) -> Result<(), ModelError> {
        self.take_failure(MockCall::ResetChanges)?;
        let mut state = self.state.lock().unwrap();
        if let Some(rows) = state.rows.get_mut(binding_path) {
            rows.retain(|row| !row.is_transient);
            for row in rows.iter_mut() {
                row.has_pending_changes = false;
            }
        }
        self.journal.record(format!("reset_changes {binding_path}"));
        Ok(())
    }

    async fn request_canonical_path(&self, path: &str) -> Result<String, ModelError> {
        self.take_failure(MockCall::CanonicalPath)?;
        self.journal.record(format!("canonical_path {path}"));
        let state = self.state.lock().unwrap();
        state
            .canonical_paths
            .get(path)
            .cloned()
            .ok_or_else(|| ModelError::NotFound(path.to_string()))
    }

    async fn request_draft_administrative_data(
        &self,
        context: &DocumentContext,
    ) -> Result<Option<DraftAdministrativeData>, ModelError> {
        self.take_failure(MockCall::DraftAdministrativeData)?;
        self.journal
            .record(format!("draft_administrative_data {}", context.path));
        let state = self.state.lock().unwrap();
        Ok(state.admin_data.get(&context.path).cloned())
    }

    async fn delete(&self, context: &DocumentContext) -> Result<(), ModelError> {
        self.take_failure(MockCall::Delete)?;
        let mut state = self.state.lock().unwrap();
        for rows in state.rows.values_mut() {
            rows.retain(|row| row.path != context.path);
        }
        state.deleted.push(context.path.clone());
        self.journal.record(format!("delete {}", context.path));
        Ok(())
    }

    async fn refresh(&self, context: &DocumentContext) -> Result<(), ModelError> {
        self.take_failure(MockCall::Refresh)?;
        let mut state = self.state.lock().unwrap();
        state.refreshed.push(context.path.clone());
        self.journal.record(format!("refresh {}", context.path));
        Ok(())
    }

    async fn submit_changeset(
        &self,
        changeset: ChangeSet,
    ) -> Result<Vec<OperationResult>, ModelError> {
        self.journal.record(format!("submit {}", changeset.id));
        self.state
            .lock()
            .unwrap()
            .changesets
            .push(changeset.clone());

        let mut operations = self.operations.lock().unwrap();
        let mut results = Vec::with_capacity(changeset.calls.len());
        let mut failure = None;
        for call in &changeset.calls {
            let scripted = operations
                .get_mut(&call.name)
                .and_then(VecDeque::pop_front)
                .unwrap_or_else(|| Ok(OperationResult::default()));
            match scripted {
                Ok(result) => results.push(result),
                Err(e) => {
                    failure.get_or_insert(e);
                }
            }
        }
        match failure {
            Some(e) => Err(e),
            None => {
                let dropped = std::mem::take(&mut self.state.lock().unwrap().dropped_responses);
                results.truncate(results.len().saturating_sub(dropped));
                Ok(results)
            }
        }
    }
}

/// Builder for operation expectations.
pub struct OperationExpectationBuilder {
    name: String,
    operations: OperationQueue,
}

impl OperationExpectationBuilder {
    /// Sets the expectation to return a successful result.
    pub fn return_ok(self, result: OperationResult) {
        self.push(Ok(result));
    }

    /// Sets the expectation to return an error.
    pub fn return_err(self, error: ModelError) {
        self.push(Err(error));
    }

    fn push(self, response: Result<OperationResult, ModelError>) {
        let mut operations = self.operations.lock().unwrap();
        operations.entry(self.name).or_default().push_back(response);
    }
}

// =============================================================================
// BUSY LOCKER
// =============================================================================

/// Counts lock and unlock calls per scope.
#[derive(Default)]
pub struct RecordingBusyLocker {
    calls: Mutex<Vec<(bool, String)>>,
    journal: Journal,
}

impl RecordingBusyLocker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_journal(journal: Journal) -> Self {
        Self {
            calls: Mutex::default(),
            journal,
        }
    }

    pub fn lock_count(&self) -> usize {
        self.calls.lock().unwrap().iter().filter(|(l, _)| *l).count()
    }

    pub fn unlock_count(&self) -> usize {
        self.calls.lock().unwrap().iter().filter(|(l, _)| !*l).count()
    }

    pub fn is_balanced(&self) -> bool {
        self.lock_count() == self.unlock_count()
    }

    /// Paths of locked scopes, in order.
    pub fn scopes(&self) -> Vec<String> {
        let calls = self.calls.lock().unwrap();
        calls
            .iter()
            .filter(|(l, _)| *l)
            .map(|(_, p)| p.clone())
            .collect()
    }
}

impl BusyLocker for RecordingBusyLocker {
    fn lock(&self, scope: &BusyScope) {
        self.calls
            .lock()
            .unwrap()
            .push((true, scope.path().to_string()));
        self.journal.record(format!("lock {}", scope.path()));
    }

    fn unlock(&self, scope: &BusyScope) {
        self.calls
            .lock()
            .unwrap()
            .push((false, scope.path().to_string()));
        self.journal.record(format!("unlock {}", scope.path()));
    }

    fn is_locked(&self, scope: &BusyScope) -> bool {
        let calls = self.calls.lock().unwrap();
        let balance: i64 = calls
            .iter()
            .filter(|(_, p)| p == scope.path())
            .map(|(l, _)| if *l { 1 } else { -1 })
            .sum();
        balance > 0
    }
}

// =============================================================================
// MESSAGE HANDLER
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum MessageCall {
    RemoveTransitionMessages,
    ClearValidationMessages,
    ShowMessages(ShowMessagesOptions),
    ShowMessageDialog(ShowMessagesOptions),
    Toast(String),
}

#[derive(Default)]
pub struct RecordingMessageHandler {
    calls: Mutex<Vec<MessageCall>>,
    journal: Journal,
}

impl RecordingMessageHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_journal(journal: Journal) -> Self {
        Self {
            calls: Mutex::default(),
            journal,
        }
    }

    pub fn calls(&self) -> Vec<MessageCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn toasts(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                MessageCall::Toast(text) => Some(text),
                _ => None,
            })
            .collect()
    }

    /// Options of every `show_messages` call.
    pub fn shown(&self) -> Vec<ShowMessagesOptions> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                MessageCall::ShowMessages(options) => Some(options),
                _ => None,
            })
            .collect()
    }

    pub fn message_dialogs(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, MessageCall::ShowMessageDialog(_)))
            .count()
    }

    fn push(&self, call: MessageCall, entry: &str) {
        self.calls.lock().unwrap().push(call);
        self.journal.record(entry);
    }
}

#[async_trait]
impl MessageHandler for RecordingMessageHandler {
    fn remove_transition_messages(&self) {
        self.push(
            MessageCall::RemoveTransitionMessages,
            "remove_transition_messages",
        );
    }

    fn clear_validation_messages(&self) {
        self.push(
            MessageCall::ClearValidationMessages,
            "clear_validation_messages",
        );
    }

    async fn show_messages(&self, options: ShowMessagesOptions) {
        self.push(MessageCall::ShowMessages(options), "show_messages");
    }

    async fn show_message_dialog(&self, options: ShowMessagesOptions) {
        self.push(MessageCall::ShowMessageDialog(options), "show_message_dialog");
    }

    fn show_toast(&self, text: &str) {
        self.push(MessageCall::Toast(text.to_string()), "toast");
    }
}

// =============================================================================
// SIDE EFFECTS
// =============================================================================

#[derive(Default)]
pub struct RecordingSideEffects {
    descriptors: Mutex<HashMap<String, SideEffectDescriptor>>,
    requested: Mutex<Vec<String>>,
    journal: Journal,
}

impl RecordingSideEffects {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_journal(journal: Journal) -> Self {
        Self {
            journal,
            ..Self::default()
        }
    }

    pub fn set_action_side_effects(&self, action_name: &str, descriptor: SideEffectDescriptor) {
        self.descriptors
            .lock()
            .unwrap()
            .insert(action_name.to_string(), descriptor);
    }

    pub fn requested_navigation_properties(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl SideEffectsService for RecordingSideEffects {
    fn get_action_side_effects(
        &self,
        action_name: &str,
        _context: Option<&DocumentContext>,
    ) -> Option<SideEffectDescriptor> {
        self.descriptors.lock().unwrap().get(action_name).cloned()
    }

    async fn request_side_effects_for_navigation_property(
        &self,
        navigation_path: &str,
        _context: &DocumentContext,
    ) -> Result<(), ModelError> {
        self.requested
            .lock()
            .unwrap()
            .push(navigation_path.to_string());
        self.journal.record(format!("side_effects {navigation_path}"));
        Ok(())
    }
}

// =============================================================================
// DIALOGS
// =============================================================================

#[derive(Default)]
struct DialogScript {
    discard: VecDeque<bool>,
    values: VecDeque<DialogOutcome<EntityData>>,
    not_applicable: VecDeque<bool>,
    delete: VecDeque<DeleteChoice>,
    take_over: VecDeque<bool>,
}

#[derive(Default)]
struct DialogLog {
    discard: Vec<DiscardPrompt>,
    values: Vec<ValueDialog>,
    not_applicable: Vec<NotApplicablePrompt>,
    delete: Vec<DeletePrompt>,
    take_over: Vec<String>,
    errors: Vec<String>,
}

/// Dialogs answering from a script. An unscripted question panics.
#[derive(Default)]
pub struct ScriptedDialogs {
    script: Mutex<DialogScript>,
    log: Mutex<DialogLog>,
    journal: Journal,
}

impl ScriptedDialogs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_journal(journal: Journal) -> Self {
        Self {
            journal,
            ..Self::default()
        }
    }

    pub fn expect_discard(&self, confirm: bool) {
        self.script.lock().unwrap().discard.push_back(confirm);
    }

    pub fn expect_values(&self, outcome: DialogOutcome<EntityData>) {
        self.script.lock().unwrap().values.push_back(outcome);
    }

    pub fn expect_not_applicable(&self, proceed: bool) {
        self.script.lock().unwrap().not_applicable.push_back(proceed);
    }

    pub fn expect_delete(&self, choice: DeleteChoice) {
        self.script.lock().unwrap().delete.push_back(choice);
    }

    pub fn expect_take_over(&self, confirm: bool) {
        self.script.lock().unwrap().take_over.push_back(confirm);
    }

    pub fn discard_prompts(&self) -> Vec<DiscardPrompt> {
        self.log.lock().unwrap().discard.clone()
    }

    pub fn value_dialogs(&self) -> Vec<ValueDialog> {
        self.log.lock().unwrap().values.clone()
    }

    pub fn not_applicable_prompts(&self) -> Vec<NotApplicablePrompt> {
        self.log.lock().unwrap().not_applicable.clone()
    }

    pub fn delete_prompts(&self) -> Vec<DeletePrompt> {
        self.log.lock().unwrap().delete.clone()
    }

    pub fn take_over_prompts(&self) -> Vec<String> {
        self.log.lock().unwrap().take_over.clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.log.lock().unwrap().errors.clone()
    }

    /// Panics if scripted answers were not consumed.
    pub fn verify(&self) {
        let script = self.script.lock().unwrap();
        let remaining = script.discard.len()
            + script.values.len()
            + script.not_applicable.len()
            + script.delete.len()
            + script.take_over.len();
        if remaining > 0 {
            panic!("Not all dialog expectations were met. {} remaining", remaining);
        }
    }
}

#[async_trait]
impl DialogService for ScriptedDialogs {
    async fn confirm_discard(&self, prompt: DiscardPrompt) -> bool {
        self.journal.record("dialog discard");
        self.log.lock().unwrap().discard.push(prompt);
        let answer = self.script.lock().unwrap().discard.pop_front();
        answer.expect("Unexpected discard confirmation")
    }

    async fn collect_values(&self, dialog: ValueDialog) -> DialogOutcome<EntityData> {
        self.journal.record("dialog values");
        self.log.lock().unwrap().values.push(dialog);
        let answer = self.script.lock().unwrap().values.pop_front();
        answer.expect("Unexpected value dialog")
    }

    async fn confirm_not_applicable(&self, prompt: NotApplicablePrompt) -> bool {
        self.journal.record("dialog not_applicable");
        self.log.lock().unwrap().not_applicable.push(prompt);
        let answer = self.script.lock().unwrap().not_applicable.pop_front();
        answer.expect("Unexpected not-applicable dialog")
    }

    async fn confirm_delete(&self, prompt: DeletePrompt) -> DeleteChoice {
        self.journal.record("dialog delete");
        self.log.lock().unwrap().delete.push(prompt);
        let answer = self.script.lock().unwrap().delete.pop_front();
        answer.expect("Unexpected delete confirmation")
    }

    async fn confirm_take_over(&self, text: String) -> bool {
        self.journal.record("dialog take_over");
        self.log.lock().unwrap().take_over.push(text);
        let answer = self.script.lock().unwrap().take_over.pop_front();
        answer.expect("Unexpected take-over confirmation")
    }

    async fn show_error(&self, text: String) {
        self.journal.record("dialog error");
        self.log.lock().unwrap().errors.push(text);
    }
}

// =============================================================================
// DELETION POLICY
// =============================================================================

#[derive(Default)]
pub struct RecordingDeletionPolicy {
    plans: Mutex<Vec<DeletionPlan>>,
    failure: Mutex<Option<ModelError>>,
    journal: Journal,
}

impl RecordingDeletionPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_journal(journal: Journal) -> Self {
        Self {
            journal,
            ..Self::default()
        }
    }

    pub fn fail_next(&self, error: ModelError) {
        *self.failure.lock().unwrap() = Some(error);
    }

    pub fn plans(&self) -> Vec<DeletionPlan> {
        self.plans.lock().unwrap().clone()
    }
}

#[async_trait]
impl DeletionPolicy for RecordingDeletionPolicy {
    async fn delete_confirmed(&self, plan: DeletionPlan) -> Result<(), ModelError> {
        self.journal.record("delete_confirmed");
        self.plans.lock().unwrap().push(plan);
        match self.failure.lock().unwrap().take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

// =============================================================================
// CONTROLS
// =============================================================================

/// A button remembering every enabled-state change.
pub struct RecordingControl {
    id: String,
    history: Mutex<Vec<bool>>,
}

impl RecordingControl {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            history: Mutex::new(Vec::new()),
        }
    }

    pub fn history(&self) -> Vec<bool> {
        self.history.lock().unwrap().clone()
    }

    /// Enabled unless the last change disabled it.
    pub fn is_enabled(&self) -> bool {
        self.history().last().copied().unwrap_or(true)
    }
}

impl TriggerControl for RecordingControl {
    fn id(&self) -> &str {
        &self.id
    }

    fn set_enabled(&self, enabled: bool) {
        self.history.lock().unwrap().push(enabled);
    }
}

// =============================================================================
// WIRING
// =============================================================================

/// A full set of doubles sharing one journal.
pub struct MockServices {
    pub journal: Journal,
    pub model: Arc<MockDataModel>,
    pub busy: Arc<RecordingBusyLocker>,
    pub messages: Arc<RecordingMessageHandler>,
    pub side_effects: Arc<RecordingSideEffects>,
    pub dialogs: Arc<ScriptedDialogs>,
    pub deletion: Arc<RecordingDeletionPolicy>,
}

impl Default for MockServices {
    fn default() -> Self {
        Self::new()
    }
}

impl MockServices {
    pub fn new() -> Self {
        let journal = Journal::default();
        Self {
            model: Arc::new(MockDataModel::with_journal(journal.clone())),
            busy: Arc::new(RecordingBusyLocker::with_journal(journal.clone())),
            messages: Arc::new(RecordingMessageHandler::with_journal(journal.clone())),
            side_effects: Arc::new(RecordingSideEffects::with_journal(journal.clone())),
            dialogs: Arc::new(ScriptedDialogs::with_journal(journal.clone())),
            deletion: Arc::new(RecordingDeletionPolicy::with_journal(journal.clone())),
            journal,
        }
    }

    pub fn services(&self) -> TransactionServices {
        TransactionServices {
            model: self.model.clone(),
            busy_locker: self.busy.clone(),
            messages: self.messages.clone(),
            side_effects: self.side_effects.clone(),
            dialogs: self.dialogs.clone(),
            deletion: self.deletion.clone(),
        }
    }

    /// Panics if scripted answers were left unused.
    pub fn verify(&self) {
        self.model.verify();
        self.dialogs.verify();
    }
}
