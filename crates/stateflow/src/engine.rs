//! Instance engine: instance creation and action-driven state transition.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use time::OffsetDateTime;
use tracing::info;

use crate::definition::Action;
use crate::error::{Error, Result, TransitionError};
use crate::instance::{InstanceId, WorkflowInstance};
use crate::store::DefinitionStore;

/// Creates and advances workflow instances against stored definitions.
///
/// The engine owns the instance registry and holds the [`DefinitionStore`]
/// behind an `Arc` for lookup by id — instances carry a weak reference to
/// their definition, never an owning pointer.
///
/// # Concurrency
///
/// Every check-then-mutate sequence ([`start`](Self::start),
/// [`execute`](Self::execute)) runs under the registry lock, so two
/// concurrent `execute` calls on one instance serialize: the second observes
/// the state left behind by the first, never a stale snapshot.
pub struct InstanceEngine {
    store: Arc<DefinitionStore>,
    instances: Mutex<BTreeMap<InstanceId, WorkflowInstance>>,
}

impl InstanceEngine {
    /// Create an engine backed by the given definition store.
    pub fn new(store: Arc<DefinitionStore>) -> Self {
        Self {
            store,
            instances: Mutex::new(BTreeMap::new()),
        }
    }

    /// Start a new instance of the identified definition.
    ///
    /// The instance is seeded at the definition's initial state with a single
    /// synthetic `INITIAL` history entry, registered, and returned. Unknown
    /// (or blank) definition ids fail with [`Error::DefinitionNotFound`].
    pub fn start(&self, definition_id: &str) -> Result<WorkflowInstance> {
        let definition = self
            .store
            .get(definition_id)
            .ok_or_else(|| Error::DefinitionNotFound(definition_id.to_owned()))?;

        // Store-side validation guarantees an initial state; re-check against
        // the live definition rather than assume.
        let initial = definition
            .initial_state()
            .ok_or_else(|| Error::NoInitialState(definition.id.clone()))?;

        let instance = WorkflowInstance::seeded(
            InstanceId::generate(),
            &definition.id,
            &initial.id,
            OffsetDateTime::now_utc(),
        );

        let mut instances = self.lock();
        instances.insert(instance.id.clone(), instance.clone());

        info!(
            instance_id = %instance.id,
            definition_id = %instance.definition_id,
            initial_state = %instance.current_state,
            "workflow instance started"
        );
        Ok(instance)
    }

    /// Execute an action against an instance.
    ///
    /// Preconditions are checked in order, first failure returned: non-empty
    /// ids, instance registered, definition still resolvable, action declared,
    /// action enabled, current state in the action's `from_states`, and
    /// current state not final. On success the current state advances to the
    /// action's `to_state` and one history entry is appended — together, under
    /// the registry lock, so the mutation is all-or-nothing and immediately
    /// visible to subsequent reads.
    ///
    /// Returns the updated instance.
    pub fn execute(&self, instance_id: &str, action_id: &str) -> Result<WorkflowInstance> {
        if instance_id.trim().is_empty() {
            return Err(Error::EmptyInstanceId);
        }
        if action_id.trim().is_empty() {
            return Err(Error::EmptyActionId);
        }

        let mut instances = self.lock();
        let instance = instances
            .get_mut(instance_id)
            .ok_or_else(|| Error::InstanceNotFound(instance_id.to_owned()))?;

        let definition = self
            .store
            .get(&instance.definition_id)
            .ok_or_else(|| Error::DefinitionNotFound(instance.definition_id.clone()))?;

        let action = definition
            .action(action_id)
            .ok_or_else(|| Error::ActionNotFound {
                definition_id: definition.id.clone(),
                action_id: action_id.to_owned(),
            })?;

        if !action.enabled {
            return Err(TransitionError::ActionDisabled(action_id.to_owned()).into());
        }
        if !action.from_states.iter().any(|s| s == &instance.current_state) {
            return Err(TransitionError::WrongState {
                action_id: action_id.to_owned(),
                current_state: instance.current_state.clone(),
            }
            .into());
        }
        // Validation never admits a final state into from_states, so this is
        // unreachable through the check above; enforce it against the live
        // instance state anyway.
        if definition
            .state(&instance.current_state)
            .is_some_and(|s| s.is_final)
        {
            return Err(TransitionError::FinalState(instance.current_state.clone()).into());
        }

        let from_state = instance.current_state.clone();
        instance.advance(action_id, &action.to_state, OffsetDateTime::now_utc());

        info!(
            instance_id = %instance.id,
            action_id,
            from_state = %from_state,
            to_state = %instance.current_state,
            "action executed"
        );
        Ok(instance.clone())
    }

    /// Look up an instance by id. Blank identifiers resolve to `None`.
    pub fn get(&self, instance_id: &str) -> Option<WorkflowInstance> {
        if instance_id.trim().is_empty() {
            return None;
        }
        self.lock().get(instance_id).cloned()
    }

    /// Snapshot of all registered instances.
    pub fn list(&self) -> Vec<WorkflowInstance> {
        self.lock().values().cloned().collect()
    }

    /// The enabled actions that may fire from the instance's current state.
    ///
    /// Empty when the current state is final. This is the state-machine view
    /// of an instance: its transitions are exactly the enabled actions whose
    /// `from_states` contain the current state.
    pub fn available_actions(&self, instance_id: &str) -> Result<Vec<Action>> {
        let (definition_id, current_state) = {
            let instances = self.lock();
            let instance = instances
                .get(instance_id)
                .ok_or_else(|| Error::InstanceNotFound(instance_id.to_owned()))?;
            (instance.definition_id.clone(), instance.current_state.clone())
        };

        let definition = self
            .store
            .get(&definition_id)
            .ok_or_else(|| Error::DefinitionNotFound(definition_id))?;

        if definition
            .state(&current_state)
            .is_some_and(|s| s.is_final)
        {
            return Ok(Vec::new());
        }

        Ok(definition
            .actions
            .values()
            .filter(|action| {
                action.enabled && action.from_states.iter().any(|s| s == &current_state)
            })
            .cloned()
            .collect())
    }

    // Same poisoning stance as the definition store: a panic elsewhere never
    // leaves a half-applied transition, so the map is taken as-is.
    fn lock(&self) -> MutexGuard<'_, BTreeMap<InstanceId, WorkflowInstance>> {
        self.instances
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::{Action, State, WorkflowDefinition};
    use crate::instance::INITIAL_ACTION;

    fn engine_with(definitions: Vec<WorkflowDefinition>) -> InstanceEngine {
        let store = Arc::new(DefinitionStore::new());
        for definition in definitions {
            store.submit(definition).unwrap();
        }
        InstanceEngine::new(store)
    }

    fn review() -> WorkflowDefinition {
        WorkflowDefinition::new("review", "Review")
            .with_state(State::new("start", "Start").initial())
            .with_state(State::new("review", "In review"))
            .with_state(State::new("done", "Done").terminal())
            .with_action(Action::new("submit", "Submit", ["start"], "review"))
            .with_action(Action::new("approve", "Approve", ["review"], "done"))
            .with_action(Action::new("reject", "Reject", ["review"], "start"))
    }

    // =========================================================================
    // start
    // =========================================================================

    #[test]
    fn start_seeds_at_initial_state() {
        let engine = engine_with(vec![review()]);
        let instance = engine.start("review").unwrap();

        assert_eq!(instance.current_state, "start");
        assert_eq!(instance.history.len(), 1);
        assert_eq!(instance.history[0].action_id, INITIAL_ACTION);
        assert_eq!(engine.get(instance.id.as_str()), Some(instance));
    }

    #[test]
    fn start_unknown_definition_fails() {
        let engine = engine_with(vec![]);
        assert_eq!(
            engine.start("nope"),
            Err(Error::DefinitionNotFound("nope".into()))
        );
    }

    #[test]
    fn start_blank_definition_id_fails() {
        let engine = engine_with(vec![review()]);
        assert_eq!(engine.start(""), Err(Error::DefinitionNotFound("".into())));
    }

    #[test]
    fn started_instances_get_distinct_ids() {
        let engine = engine_with(vec![review()]);
        let a = engine.start("review").unwrap();
        let b = engine.start("review").unwrap();

        assert_ne!(a.id, b.id);
        assert_eq!(engine.list().len(), 2);
    }

    // =========================================================================
    // execute
    // =========================================================================

    #[test]
    fn execute_advances_state_and_appends_history() {
        let engine = engine_with(vec![review()]);
        let instance = engine.start("review").unwrap();

        let after = engine.execute(instance.id.as_str(), "submit").unwrap();
        assert_eq!(after.current_state, "review");
        assert_eq!(after.history.len(), 2);
        assert_eq!(after.history[1].from_state, "start");
        assert_eq!(after.history[1].to_state, "review");

        // The mutation is visible to subsequent reads.
        assert_eq!(engine.get(instance.id.as_str()), Some(after));
    }

    #[test]
    fn execute_checks_ids_first() {
        let engine = engine_with(vec![review()]);
        assert_eq!(engine.execute("", "submit"), Err(Error::EmptyInstanceId));
        assert_eq!(engine.execute("inst-x", " "), Err(Error::EmptyActionId));
    }

    #[test]
    fn execute_unknown_instance_fails() {
        let engine = engine_with(vec![review()]);
        assert_eq!(
            engine.execute("inst-missing", "submit"),
            Err(Error::InstanceNotFound("inst-missing".into()))
        );
    }

    #[test]
    fn execute_unknown_action_fails() {
        let engine = engine_with(vec![review()]);
        let instance = engine.start("review").unwrap();

        assert_eq!(
            engine.execute(instance.id.as_str(), "teleport"),
            Err(Error::ActionNotFound {
                definition_id: "review".into(),
                action_id: "teleport".into()
            })
        );
    }

    #[test]
    fn execute_disabled_action_fails() {
        let definition = WorkflowDefinition::new("wf", "Wf")
            .with_state(State::new("a", "A").initial())
            .with_state(State::new("b", "B"))
            .with_action(Action::new("go", "Go", ["a"], "b").disabled());
        let engine = engine_with(vec![definition]);
        let instance = engine.start("wf").unwrap();

        assert_eq!(
            engine.execute(instance.id.as_str(), "go"),
            Err(Error::IllegalTransition(TransitionError::ActionDisabled(
                "go".into()
            )))
        );
        // No observable change.
        let unchanged = engine.get(instance.id.as_str()).unwrap();
        assert_eq!(unchanged.current_state, "a");
        assert_eq!(unchanged.history.len(), 1);
    }

    #[test]
    fn execute_from_wrong_state_fails() {
        let engine = engine_with(vec![review()]);
        let instance = engine.start("review").unwrap();

        // "approve" fires from "review", not from the initial "start".
        assert_eq!(
            engine.execute(instance.id.as_str(), "approve"),
            Err(Error::IllegalTransition(TransitionError::WrongState {
                action_id: "approve".into(),
                current_state: "start".into()
            }))
        );
    }

    #[test]
    fn final_state_blocks_every_action() {
        let engine = engine_with(vec![review()]);
        let instance = engine.start("review").unwrap();
        engine.execute(instance.id.as_str(), "submit").unwrap();
        engine.execute(instance.id.as_str(), "approve").unwrap();

        for action in ["submit", "approve", "reject"] {
            let err = engine.execute(instance.id.as_str(), action).unwrap_err();
            assert!(
                matches!(err, Error::IllegalTransition(_)),
                "expected illegal transition for {action}, got {err:?}"
            );
        }

        // The instance survives in its final state.
        let done = engine.get(instance.id.as_str()).unwrap();
        assert_eq!(done.current_state, "done");
        assert_eq!(done.history.len(), 3);
    }

    #[test]
    fn cyclic_transitions_keep_appending_history() {
        let engine = engine_with(vec![review()]);
        let instance = engine.start("review").unwrap();

        engine.execute(instance.id.as_str(), "submit").unwrap();
        engine.execute(instance.id.as_str(), "reject").unwrap();
        let after = engine.execute(instance.id.as_str(), "submit").unwrap();

        assert_eq!(after.current_state, "review");
        let transitions: Vec<_> = after
            .history
            .iter()
            .map(|h| h.action_id.as_str())
            .collect();
        assert_eq!(transitions, vec![INITIAL_ACTION, "submit", "reject", "submit"]);
    }

    // =========================================================================
    // lookup / view
    // =========================================================================

    #[test]
    fn get_blank_or_unknown_is_none() {
        let engine = engine_with(vec![review()]);
        assert_eq!(engine.get(""), None);
        assert_eq!(engine.get("inst-ghost"), None);
    }

    #[test]
    fn available_actions_follow_current_state() {
        let engine = engine_with(vec![review()]);
        let instance = engine.start("review").unwrap();

        let from_start: Vec<_> = engine
            .available_actions(instance.id.as_str())
            .unwrap()
            .into_iter()
            .map(|a| a.id)
            .collect();
        assert_eq!(from_start, vec!["submit"]);

        engine.execute(instance.id.as_str(), "submit").unwrap();
        let from_review: Vec<_> = engine
            .available_actions(instance.id.as_str())
            .unwrap()
            .into_iter()
            .map(|a| a.id)
            .collect();
        assert_eq!(from_review, vec!["approve", "reject"]);

        engine.execute(instance.id.as_str(), "approve").unwrap();
        assert!(engine
            .available_actions(instance.id.as_str())
            .unwrap()
            .is_empty());
    }

    #[test]
    fn available_actions_skip_disabled() {
        let definition = WorkflowDefinition::new("wf", "Wf")
            .with_state(State::new("a", "A").initial())
            .with_state(State::new("b", "B"))
            .with_action(Action::new("go", "Go", ["a"], "b").disabled());
        let engine = engine_with(vec![definition]);
        let instance = engine.start("wf").unwrap();

        assert!(engine
            .available_actions(instance.id.as_str())
            .unwrap()
            .is_empty());
    }

    #[test]
    fn available_actions_unknown_instance_fails() {
        let engine = engine_with(vec![review()]);
        assert_eq!(
            engine.available_actions("inst-ghost"),
            Err(Error::InstanceNotFound("inst-ghost".into()))
        );
    }

    // =========================================================================
    // concurrency
    // =========================================================================

    #[test]
    fn concurrent_executes_serialize_on_one_instance() {
        let engine = Arc::new(engine_with(vec![review()]));
        let instance = engine.start("review").unwrap();
        let instance_id = instance.id.clone();

        // Both threads race to fire "submit" from "start". Exactly one may
        // win; the loser must observe the post-transition state, not a stale
        // snapshot.
        let handles: Vec<_> = (0..2)
            .map(|_| {
                let engine = Arc::clone(&engine);
                let instance_id = instance_id.clone();
                std::thread::spawn(move || engine.execute(instance_id.as_str(), "submit"))
            })
            .collect();

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let successes = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(successes, 1);

        let after = engine.get(instance_id.as_str()).unwrap();
        assert_eq!(after.current_state, "review");
        assert_eq!(after.history.len(), 2);
        assert_eq!(after.history[1].from_state, "start");
    }
}
