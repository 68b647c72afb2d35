//! Runtime module - the message-passing orchestration core
//!
//! Messages flow from a driver or an acting role through the [`Bus`] into
//! subscribing roles' inboxes; each [`Role`] consumes one, selects an
//! [`Action`] by table lookup, runs it against its own provider, and
//! publishes the result. The [`Scheduler`] repeats turns until quiescence.

pub mod action;
pub mod bus;
pub mod message;
pub mod role;
pub mod scheduler;

pub use action::{Action, PromptAction};
pub use bus::Bus;
pub use message::{Message, MessageId, MessageKind, USER_INPUT_KIND};
pub use role::{FailurePolicy, Role, RoleBuilder, RoleState, TurnOutcome};
pub use scheduler::Scheduler;
