//! HTTP transport for the stateflow workflow engine.
//!
//! Maps the core's operations onto a small JSON-over-HTTP API:
//!
//! ```text
//! GET  /                                   health
//! POST /definitions                        submit a definition
//! GET  /definitions                        list definitions
//! GET  /definitions/:id                    fetch one definition
//! POST /instances/:id                      start an instance of definition :id
//! GET  /instances                          list instances
//! GET  /instances/:id                      fetch one instance
//! GET  /instances/:id/actions              actions executable right now
//! POST /instances/:id/actions/:action_id   execute an action
//! ```
//!
//! Validation failures map to 400 (409 for duplicate ids), missing resources
//! to 404, and illegal transitions to 409; error bodies carry a JSON
//! `{ "error": ..., "code": ... }` envelope.

mod config;
mod error;
mod routes;

pub use config::ServerConfig;
pub use error::{ApiError, ApiResult};
pub use routes::router;
