//! Bound and unbound action invocation.
//!
//! [`ActionInvoker::call_action`] runs the whole flow for one request:
//!
//! 1. Resolve the action name and its target ([`ActionTarget`]).
//! 2. Ask the side-effects service which paths to re-read with the response.
//! 3. Drop not-applicable targets (with the user's consent).
//! 4. Collect missing parameters in a dialog.
//! 5. Submit one changeset, or one per target for [`InvocationGrouping::Isolated`](crate::model::InvocationGrouping::Isolated).
//! 6. Relay the resulting messages.

mod invoker;
mod parameters;
pub mod request;

pub use invoker::ActionInvoker;
pub(crate) use parameters::collect_values;
pub use request::*;
