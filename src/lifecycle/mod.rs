//! # Document Lifecycle
//!
//! [`DocumentLifecycleController`] moves a document through its states:
//!
//! ```text
//!            create_document            save_document
//!   (none) ─────────────────► Creating ───────────────┐
//!                                │ cancel             ▼
//!                                └──────► Cancelled   Active ◄──┐
//!                                                     │ edit    │ save / cancel
//!                                                     ▼         │
//!                                        Editing(Draft|Sticky) ─┘
//!
//!   Active ── delete_document ──► Deleted
//! ```
//!
//! What a transition means on the backend depends on the resource's
//! [`ProgrammingModel`](crate::model::ProgrammingModel): Draft documents are edited in a
//! draft copy that is activated on save, Sticky documents in a server-side session.
//! `NonDraft` resources reject every transition.
//!
//! Every operation:
//! - removes the previous request's transition messages before talking to the backend,
//! - holds the busy scope while the backend works and releases it on every exit path,
//! - relays the backend's messages afterwards, on success and on failure.
//!
//! Edit, save, cancel and delete on a path that already has one of them running fail with
//! [`TransactionError::OperationInProgress`](crate::error::TransactionError::OperationInProgress).

mod controller;
mod create;
mod delete;
mod discard;
mod in_flight;
pub mod request;
mod strategy;
pub mod tracing;

pub use controller::DocumentLifecycleController;
pub use discard::DiscardGate;
pub use request::*;
