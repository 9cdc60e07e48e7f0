//! Shared workflow fixtures for stateflow tests.
//!
//! All builders return definitions with the given id so tests can register
//! several variants side by side without colliding.

use stateflow::{Action, State, WorkflowDefinition};

/// The canonical three-state review workflow:
/// `Start(initial) --Submit--> Review --Approve--> Done(final)`,
/// plus `Reject: Review -> Start` for cycle coverage.
pub fn review_definition(id: &str) -> WorkflowDefinition {
    WorkflowDefinition::new(id, "Document review")
        .with_state(State::new("Start", "Start").initial())
        .with_state(State::new("Review", "Under review"))
        .with_state(State::new("Done", "Done").terminal())
        .with_action(Action::new("Submit", "Submit for review", ["Start"], "Review"))
        .with_action(Action::new("Approve", "Approve", ["Review"], "Done"))
        .with_action(Action::new("Reject", "Send back", ["Review"], "Start"))
}

/// Invalid: two states both flagged initial.
pub fn two_initial_definition(id: &str) -> WorkflowDefinition {
    WorkflowDefinition::new(id, "Two initial states")
        .with_state(State::new("A", "A").initial())
        .with_state(State::new("B", "B").initial())
}

/// Invalid: an action originating from a final state.
pub fn from_final_definition(id: &str) -> WorkflowDefinition {
    WorkflowDefinition::new(id, "Escape from final")
        .with_state(State::new("Start", "Start").initial())
        .with_state(State::new("End", "End").terminal())
        .with_action(Action::new("Finish", "Finish", ["Start"], "End"))
        .with_action(Action::new("Reopen", "Reopen", ["End"], "Start"))
}

/// A single-action workflow where the only action is disabled.
pub fn disabled_action_definition(id: &str) -> WorkflowDefinition {
    WorkflowDefinition::new(id, "Disabled action")
        .with_state(State::new("Start", "Start").initial())
        .with_state(State::new("End", "End"))
        .with_action(Action::new("Go", "Go", ["Start"], "End").disabled())
}
