//! Definition store: accepts, validates, and retains workflow definitions.

use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::info;

use crate::definition::WorkflowDefinition;
use crate::error::{Result, ValidationError};

/// In-memory registry of validated workflow definitions.
///
/// One store serves the whole process. Definitions are submit-once: a stored
/// definition is immutable and retrievable for the process lifetime — there
/// are no update or delete operations.
///
/// All methods take `&self`; the map is guarded by an internal lock so the
/// store can be shared across concurrently handled requests.
#[derive(Debug, Default)]
pub struct DefinitionStore {
    definitions: RwLock<BTreeMap<String, WorkflowDefinition>>,
}

impl DefinitionStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate a definition and insert it, first violation wins.
    ///
    /// The write lock is held across the whole check-and-insert, so a
    /// concurrent submit with the same id cannot slip between the duplicate
    /// check and the insert. On failure nothing is stored.
    ///
    /// Returns the stored definition on success.
    pub fn submit(&self, definition: WorkflowDefinition) -> Result<WorkflowDefinition> {
        if definition.id.trim().is_empty() {
            return Err(ValidationError::EmptyDefinitionId.into());
        }

        let mut definitions = self.write();
        if definitions.contains_key(&definition.id) {
            return Err(ValidationError::DuplicateDefinition(definition.id).into());
        }
        definition.validate()?;

        info!(
            definition_id = %definition.id,
            states = definition.states.len(),
            actions = definition.actions.len(),
            "workflow definition stored"
        );
        definitions.insert(definition.id.clone(), definition.clone());
        Ok(definition)
    }

    /// Look up a definition by id.
    ///
    /// Empty or whitespace identifiers resolve to `None` without error; no
    /// partial matching.
    pub fn get(&self, id: &str) -> Option<WorkflowDefinition> {
        if id.trim().is_empty() {
            return None;
        }
        self.read().get(id).cloned()
    }

    /// Snapshot of all stored definitions.
    pub fn list(&self) -> Vec<WorkflowDefinition> {
        self.read().values().cloned().collect()
    }

    // A poisoned lock only means another thread panicked mid-operation;
    // submit never leaves the map half-written, so the data is still usable.
    fn read(&self) -> RwLockReadGuard<'_, BTreeMap<String, WorkflowDefinition>> {
        self.definitions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, BTreeMap<String, WorkflowDefinition>> {
        self.definitions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::{Action, State};
    use crate::error::Error;

    fn review(id: &str) -> WorkflowDefinition {
        WorkflowDefinition::new(id, "Review")
            .with_state(State::new("start", "Start").initial())
            .with_state(State::new("done", "Done").terminal())
            .with_action(Action::new("finish", "Finish", ["start"], "done"))
    }

    #[test]
    fn submit_then_get_returns_definition_unchanged() {
        let store = DefinitionStore::new();
        let stored = store.submit(review("review")).unwrap();

        assert_eq!(store.get("review"), Some(stored));
    }

    #[test]
    fn empty_id_rejected() {
        let store = DefinitionStore::new();
        let err = store.submit(review("   ")).unwrap_err();

        assert_eq!(
            err,
            Error::Validation(ValidationError::EmptyDefinitionId)
        );
        assert!(store.list().is_empty());
    }

    #[test]
    fn submit_is_not_idempotent() {
        let store = DefinitionStore::new();
        let first = store.submit(review("review")).unwrap();

        let second = WorkflowDefinition::new("review", "Different name")
            .with_state(State::new("only", "Only").initial());
        let err = store.submit(second).unwrap_err();

        assert_eq!(
            err,
            Error::Validation(ValidationError::DuplicateDefinition("review".into()))
        );
        // The first submission is retained untouched.
        assert_eq!(store.get("review"), Some(first));
        assert_eq!(store.list().len(), 1);
    }

    #[test]
    fn invalid_definition_is_not_stored() {
        let store = DefinitionStore::new();
        let invalid = WorkflowDefinition::new("bad", "Bad")
            .with_state(State::new("a", "A").initial())
            .with_state(State::new("b", "B").initial());

        let err = store.submit(invalid).unwrap_err();
        assert_eq!(
            err,
            Error::Validation(ValidationError::InitialStateCount(2))
        );
        assert!(store.list().is_empty());
    }

    #[test]
    fn lookup_with_blank_id_is_none() {
        let store = DefinitionStore::new();
        store.submit(review("review")).unwrap();

        assert_eq!(store.get(""), None);
        assert_eq!(store.get("  "), None);
        assert_eq!(store.get("rev"), None); // no partial matching
    }

    #[test]
    fn list_snapshots_current_contents() {
        let store = DefinitionStore::new();
        assert!(store.list().is_empty());

        store.submit(review("a")).unwrap();
        store.submit(review("b")).unwrap();

        let ids: Vec<_> = store.list().into_iter().map(|d| d.id).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }
}
