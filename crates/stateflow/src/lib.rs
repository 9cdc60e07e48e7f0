//! In-memory finite-state workflow engine.
//!
//! Stateflow defines and executes finite-state workflows. A
//! [`WorkflowDefinition`] declares named states (exactly one initial, zero or
//! more final) and named actions that move instances between states. Clients
//! register definitions, spawn [`WorkflowInstance`]s bound to a definition,
//! and drive them forward by executing actions; the engine enforces that
//! every transition is legal per the definition and records an auditable
//! history.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                      WorkflowService                         │
//! │                                                              │
//! │   DefinitionStore            InstanceEngine                  │
//! │   submit / get / list   ◄──  start / execute / get / list    │
//! │   (validated, immutable)     (per-instance state + history)  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! All state lives in memory for the process lifetime. Mutating operations
//! run their whole check-then-mutate body under an internal lock, so the
//! service can be shared across concurrently handled requests without lost
//! updates; every error is a typed, synchronous [`Error`] outcome.
//!
//! # Example
//!
//! ```
//! use stateflow::{Action, State, WorkflowDefinition, WorkflowService};
//!
//! let service = WorkflowService::new();
//!
//! service.submit_definition(
//!     WorkflowDefinition::new("review", "Document review")
//!         .with_state(State::new("start", "Start").initial())
//!         .with_state(State::new("review", "In review"))
//!         .with_state(State::new("done", "Done").terminal())
//!         .with_action(Action::new("submit", "Submit", ["start"], "review"))
//!         .with_action(Action::new("approve", "Approve", ["review"], "done")),
//! )?;
//!
//! let instance = service.start_instance("review")?;
//! assert_eq!(instance.current_state, "start");
//!
//! let instance = service.execute_action(instance.id.as_str(), "submit")?;
//! let instance = service.execute_action(instance.id.as_str(), "approve")?;
//! assert_eq!(instance.current_state, "done");
//! assert_eq!(instance.history.len(), 3);
//! # Ok::<(), stateflow::Error>(())
//! ```

mod definition;
mod engine;
mod error;
mod instance;
mod service;
mod store;

pub use definition::{Action, State, WorkflowDefinition};
pub use engine::InstanceEngine;
pub use error::{Error, Result, TransitionError, ValidationError};
pub use instance::{HistoryEntry, InstanceId, WorkflowInstance, INITIAL_ACTION};
pub use service::WorkflowService;
pub use store::DefinitionStore;
