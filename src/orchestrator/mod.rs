//! Orchestrator Module
//!
//! Turns a query into at most a handful of tool dispatches and assembles the
//! response envelope.

pub mod router;
pub mod supervisor;

pub use router::{suggest_next_action, CALENDAR_TASK, EMAIL_TASK};
pub use supervisor::{Supervisor, DECISION_TASK};
