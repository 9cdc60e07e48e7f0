//! Workflow definition data model and structural validation.
//!
//! A [`WorkflowDefinition`] is the static declaration of a workflow: a set of
//! named [`State`]s (exactly one initial, zero or more final) and a set of
//! named [`Action`]s that move instances between those states. Definitions
//! are plain serde data so clients can submit them as JSON; field names
//! follow the wire contract (`camelCase`, maps keyed by identifier).
//!
//! Validation is split in two: the structural rules that only involve the
//! definition itself live here in [`WorkflowDefinition::validate`]; the rules
//! that involve the store (non-empty id, no duplicate registration) are
//! enforced by [`DefinitionStore::submit`](crate::DefinitionStore::submit).

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

fn enabled_default() -> bool {
    true
}

/// A named state within a workflow definition.
///
/// State identifiers are unique within one definition and are the values an
/// instance's `current_state` ranges over.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct State {
    /// Identifier, unique within the definition.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Whether instances are seeded into this state at creation.
    #[serde(default)]
    pub is_initial: bool,
    /// Whether this state blocks all further actions.
    #[serde(default)]
    pub is_final: bool,
    /// Whether the state is enabled. Defaults to `true`.
    #[serde(default = "enabled_default")]
    pub enabled: bool,
    /// Optional free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl State {
    /// Create an enabled, non-initial, non-final state.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            is_initial: false,
            is_final: false,
            enabled: true,
            description: None,
        }
    }

    /// Mark this state as the initial state.
    pub fn initial(mut self) -> Self {
        self.is_initial = true;
        self
    }

    /// Mark this state as final.
    pub fn terminal(mut self) -> Self {
        self.is_final = true;
        self
    }

    /// Disable this state.
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Attach a description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// A named transition rule: a set of legal origin states and one destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Action {
    /// Identifier, unique within the definition.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Whether the action may execute. Defaults to `true`.
    #[serde(default = "enabled_default")]
    pub enabled: bool,
    /// State identifiers the action may fire from. Must be non-empty and may
    /// never include a final state.
    #[serde(default)]
    pub from_states: Vec<String>,
    /// State identifier the action moves the instance into.
    pub to_state: String,
    /// Optional free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Action {
    /// Create an enabled action.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        from_states: impl IntoIterator<Item = impl Into<String>>,
        to_state: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            enabled: true,
            from_states: from_states.into_iter().map(Into::into).collect(),
            to_state: to_state.into(),
            description: None,
        }
    }

    /// Disable this action.
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Attach a description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// The static declaration of a workflow's states and legal actions.
///
/// Once accepted by the store a definition is immutable for the process
/// lifetime; instances reference it by id only.
///
/// # Example
///
/// ```
/// use stateflow::{Action, State, WorkflowDefinition};
///
/// let definition = WorkflowDefinition::new("review", "Document review")
///     .with_state(State::new("draft", "Draft").initial())
///     .with_state(State::new("published", "Published").terminal())
///     .with_action(Action::new("publish", "Publish", ["draft"], "published"));
///
/// assert!(definition.validate().is_ok());
/// assert_eq!(definition.initial_state().unwrap().id, "draft");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowDefinition {
    /// Globally unique identifier, immutable once stored.
    pub id: String,
    /// Display name.
    pub name: String,
    /// States keyed by state identifier.
    ///
    /// Ordered map so validation failures and listings are deterministic;
    /// the contract puts no meaning on ordering.
    #[serde(default)]
    pub states: BTreeMap<String, State>,
    /// Actions keyed by action identifier. May be empty.
    #[serde(default)]
    pub actions: BTreeMap<String, Action>,
    /// Optional free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl WorkflowDefinition {
    /// Create an empty definition.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            states: BTreeMap::new(),
            actions: BTreeMap::new(),
            description: None,
        }
    }

    /// Add a state, keyed by its identifier.
    pub fn with_state(mut self, state: State) -> Self {
        self.states.insert(state.id.clone(), state);
        self
    }

    /// Add an action, keyed by its identifier.
    pub fn with_action(mut self, action: Action) -> Self {
        self.actions.insert(action.id.clone(), action);
        self
    }

    /// The state flagged `is_initial`, if any.
    pub fn initial_state(&self) -> Option<&State> {
        self.states.values().find(|state| state.is_initial)
    }

    /// Look up a state by identifier.
    pub fn state(&self, id: &str) -> Option<&State> {
        self.states.get(id)
    }

    /// Look up an action by identifier.
    pub fn action(&self, id: &str) -> Option<&Action> {
        self.actions.get(id)
    }

    /// Check the definition-local structural rules, first violation wins.
    ///
    /// In order: at least one state, exactly one initial state, no duplicate
    /// state ids, no duplicate action ids, then per action: `to_state`
    /// non-empty and resolvable, `from_states` non-empty, every entry
    /// resolvable, and no entry naming a final state.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.states.is_empty() {
            return Err(ValidationError::NoStates);
        }

        let initial_count = self.states.values().filter(|s| s.is_initial).count();
        if initial_count != 1 {
            return Err(ValidationError::InitialStateCount(initial_count));
        }

        // Map keys are unique by construction, but an entry whose value id
        // disagrees with its key can still smuggle in a duplicate identifier.
        let mut state_ids = BTreeSet::new();
        for state in self.states.values() {
            if !state_ids.insert(state.id.as_str()) {
                return Err(ValidationError::DuplicateStateId(state.id.clone()));
            }
        }

        let mut action_ids = BTreeSet::new();
        for action in self.actions.values() {
            if !action_ids.insert(action.id.as_str()) {
                return Err(ValidationError::DuplicateActionId(action.id.clone()));
            }
        }

        for action in self.actions.values() {
            if action.to_state.trim().is_empty() {
                return Err(ValidationError::MissingToState {
                    action_id: action.id.clone(),
                });
            }
            if !self.states.contains_key(&action.to_state) {
                return Err(ValidationError::UnknownToState {
                    action_id: action.id.clone(),
                    state_id: action.to_state.clone(),
                });
            }
            if action.from_states.is_empty() {
                return Err(ValidationError::NoFromStates {
                    action_id: action.id.clone(),
                });
            }
            for from in &action.from_states {
                if !self.states.contains_key(from) {
                    return Err(ValidationError::UnknownFromState {
                        action_id: action.id.clone(),
                        state_id: from.clone(),
                    });
                }
            }
            for from in &action.from_states {
                if self.states[from].is_final {
                    return Err(ValidationError::FromFinalState {
                        action_id: action.id.clone(),
                        state_id: from.clone(),
                    });
                }
            }
        }

        Ok(())
    }
}
