//! App-facing workflow service.

use std::sync::Arc;

use crate::definition::{Action, WorkflowDefinition};
use crate::engine::InstanceEngine;
use crate::error::Result;
use crate::instance::WorkflowInstance;
use crate::store::DefinitionStore;

/// Single entrypoint bundling the definition store and the instance engine.
///
/// Cheap to clone (two `Arc`s); transports hold one per process and call it
/// from concurrently handled requests.
///
/// # Example
///
/// ```
/// use stateflow::{Action, State, WorkflowDefinition, WorkflowService};
///
/// let service = WorkflowService::new();
/// service
///     .submit_definition(
///         WorkflowDefinition::new("review", "Review")
///             .with_state(State::new("start", "Start").initial())
///             .with_state(State::new("done", "Done").terminal())
///             .with_action(Action::new("finish", "Finish", ["start"], "done")),
///     )
///     .unwrap();
///
/// let instance = service.start_instance("review").unwrap();
/// let instance = service.execute_action(instance.id.as_str(), "finish").unwrap();
/// assert_eq!(instance.current_state, "done");
/// ```
#[derive(Clone)]
pub struct WorkflowService {
    store: Arc<DefinitionStore>,
    engine: Arc<InstanceEngine>,
}

impl WorkflowService {
    /// Create a service with fresh, empty stores.
    pub fn new() -> Self {
        let store = Arc::new(DefinitionStore::new());
        let engine = Arc::new(InstanceEngine::new(Arc::clone(&store)));
        Self { store, engine }
    }

    /// Validate and store a workflow definition. See
    /// [`DefinitionStore::submit`].
    pub fn submit_definition(&self, definition: WorkflowDefinition) -> Result<WorkflowDefinition> {
        self.store.submit(definition)
    }

    /// Look up a definition by id.
    pub fn definition(&self, id: &str) -> Option<WorkflowDefinition> {
        self.store.get(id)
    }

    /// Snapshot of all stored definitions.
    pub fn definitions(&self) -> Vec<WorkflowDefinition> {
        self.store.list()
    }

    /// Start a new instance of the identified definition. See
    /// [`InstanceEngine::start`].
    pub fn start_instance(&self, definition_id: &str) -> Result<WorkflowInstance> {
        self.engine.start(definition_id)
    }

    /// Execute an action against an instance, returning the updated instance.
    /// See [`InstanceEngine::execute`].
    pub fn execute_action(&self, instance_id: &str, action_id: &str) -> Result<WorkflowInstance> {
        self.engine.execute(instance_id, action_id)
    }

    /// Look up an instance by id.
    pub fn instance(&self, instance_id: &str) -> Option<WorkflowInstance> {
        self.engine.get(instance_id)
    }

    /// Snapshot of all registered instances.
    pub fn instances(&self) -> Vec<WorkflowInstance> {
        self.engine.list()
    }

    /// The enabled actions executable from an instance's current state.
    pub fn available_actions(&self, instance_id: &str) -> Result<Vec<Action>> {
        self.engine.available_actions(instance_id)
    }
}

impl Default for WorkflowService {
    fn default() -> Self {
        Self::new()
    }
}
