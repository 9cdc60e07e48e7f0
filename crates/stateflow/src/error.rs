//! Error types for stateflow.

use thiserror::Error;

/// A `Result` alias with [`enum@Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in stateflow operations.
///
/// Every error is a caller-correctable, synchronous outcome. No operation
/// leaves a definition or instance partially mutated: a failed call has no
/// observable effect on the stores.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// Definition failed structural validation and was not stored.
    #[error("invalid workflow definition: {0}")]
    Validation(#[from] ValidationError),

    /// No definition is stored under the given identifier.
    #[error("workflow definition '{0}' not found")]
    DefinitionNotFound(String),

    /// No instance is registered under the given identifier.
    #[error("workflow instance '{0}' not found")]
    InstanceNotFound(String),

    /// The definition exists but declares no action with the given identifier.
    #[error("action '{action_id}' not found in definition '{definition_id}'")]
    ActionNotFound {
        /// The definition that was searched.
        definition_id: String,
        /// The requested action identifier.
        action_id: String,
    },

    /// The action exists but cannot fire from the instance's current state.
    #[error("illegal transition: {0}")]
    IllegalTransition(#[from] TransitionError),

    /// A stored definition has no initial state.
    ///
    /// Store-side validation makes this unreachable; the engine still checks
    /// against the live definition instead of trusting submit-time validation.
    #[error("definition '{0}' has no initial state")]
    NoInitialState(String),

    /// An empty instance identifier was passed to `execute`.
    #[error("instance id must not be empty")]
    EmptyInstanceId,

    /// An empty action identifier was passed to `execute`.
    #[error("action id must not be empty")]
    EmptyActionId,
}

/// A structural rule violated by a submitted workflow definition.
///
/// Validation stops at the first violation; the variants below are listed in
/// the order the rules are checked.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// The definition identifier is empty or whitespace.
    #[error("definition id must not be empty")]
    EmptyDefinitionId,

    /// A definition with this identifier is already stored.
    ///
    /// Definitions are submit-once: there are no update or overwrite semantics.
    #[error("definition '{0}' already exists")]
    DuplicateDefinition(String),

    /// The definition declares no states.
    #[error("definition must contain at least one state")]
    NoStates,

    /// The definition does not have exactly one initial state.
    #[error("definition must have exactly one initial state, found {0}")]
    InitialStateCount(usize),

    /// Two state entries carry the same state identifier.
    #[error("duplicate state id '{0}'")]
    DuplicateStateId(String),

    /// Two action entries carry the same action identifier.
    #[error("duplicate action id '{0}'")]
    DuplicateActionId(String),

    /// An action's `to_state` is empty.
    #[error("action '{action_id}' must declare a to_state")]
    MissingToState {
        /// The offending action.
        action_id: String,
    },

    /// An action's `to_state` names a state the definition does not declare.
    #[error("action '{action_id}' references unknown state '{state_id}'")]
    UnknownToState {
        /// The offending action.
        action_id: String,
        /// The unresolved state identifier.
        state_id: String,
    },

    /// An action declares no origin states.
    #[error("action '{action_id}' must have at least one from_state")]
    NoFromStates {
        /// The offending action.
        action_id: String,
    },

    /// An action's `from_states` names a state the definition does not declare.
    #[error("action '{action_id}' references unknown from_state '{state_id}'")]
    UnknownFromState {
        /// The offending action.
        action_id: String,
        /// The unresolved state identifier.
        state_id: String,
    },

    /// An action's `from_states` names a final state.
    #[error("action '{action_id}' cannot originate from final state '{state_id}'")]
    FromFinalState {
        /// The offending action.
        action_id: String,
        /// The final state named in `from_states`.
        state_id: String,
    },
}

/// Why an action that exists in the definition could not be executed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    /// The action's `enabled` flag is false.
    #[error("action '{0}' is disabled")]
    ActionDisabled(String),

    /// The instance's current state is not in the action's `from_states`.
    #[error("action '{action_id}' cannot fire from state '{current_state}'")]
    WrongState {
        /// The requested action.
        action_id: String,
        /// The instance's current state.
        current_state: String,
    },

    /// The instance's current state is final; nothing may fire from it.
    #[error("state '{0}' is final; no further actions may execute")]
    FinalState(String),
}
