//! Workflow instance and transition history types.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// Sentinel action id recorded in the synthetic seed history entry.
pub const INITIAL_ACTION: &str = "INITIAL";

/// A workflow instance identifier.
///
/// Generated by the engine at [`start`](crate::InstanceEngine::start) time;
/// clients never choose instance ids.
///
/// # Example
///
/// ```
/// use stateflow::InstanceId;
///
/// let id = InstanceId::new("inst-42");
/// assert_eq!(id.as_str(), "inst-42");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstanceId(String);

impl InstanceId {
    /// Wrap an existing identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh, collision-resistant identifier.
    pub(crate) fn generate() -> Self {
        Self(format!("inst-{}", Uuid::new_v4().simple()))
    }

    /// Borrow the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the wrapper and return the inner string.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl std::fmt::Display for InstanceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.0, f)
    }
}

impl std::borrow::Borrow<str> for InstanceId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<String> for InstanceId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for InstanceId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// One transition in an instance's history.
///
/// Entries are append-only and never mutated after creation. The first entry
/// of every instance is the synthetic [`INITIAL_ACTION`] record with an empty
/// `from_state`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    /// The executed action, or [`INITIAL_ACTION`] for the seed entry.
    pub action_id: String,
    /// State before the transition; empty for the seed entry.
    pub from_state: String,
    /// State after the transition.
    pub to_state: String,
    /// UTC instant of the transition.
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

/// A single running execution of a workflow definition.
///
/// Holds a weak reference to its definition (`definition_id`, resolved by
/// lookup, never an owning pointer), the current state, and the time-ordered
/// transition history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowInstance {
    /// Engine-generated identifier.
    pub id: InstanceId,
    /// Identifier of the owning definition.
    pub definition_id: String,
    /// Identifier of the state the instance is currently in. Always names a
    /// state that exists in the owning definition.
    pub current_state: String,
    /// Append-only transition record, oldest first.
    pub history: Vec<HistoryEntry>,
}

impl WorkflowInstance {
    /// Construct an instance seeded at the definition's initial state, with
    /// the synthetic `INITIAL` history entry.
    pub(crate) fn seeded(
        id: InstanceId,
        definition_id: impl Into<String>,
        initial_state: impl Into<String>,
        now: OffsetDateTime,
    ) -> Self {
        let initial_state = initial_state.into();
        Self {
            id,
            definition_id: definition_id.into(),
            current_state: initial_state.clone(),
            history: vec![HistoryEntry {
                action_id: INITIAL_ACTION.to_owned(),
                from_state: String::new(),
                to_state: initial_state,
                timestamp: now,
            }],
        }
    }

    /// Advance to `to_state`, recording the state held immediately before
    /// this call as the history entry's origin.
    pub(crate) fn advance(&mut self, action_id: &str, to_state: &str, now: OffsetDateTime) {
        let from_state = std::mem::replace(&mut self.current_state, to_state.to_owned());
        self.history.push(HistoryEntry {
            action_id: action_id.to_owned(),
            from_state,
            to_state: to_state.to_owned(),
            timestamp: now,
        });
    }
}
