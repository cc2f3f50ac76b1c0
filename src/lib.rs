//! # Document Transaction
//!
//! > **The create/edit/save/cancel/delete cycle of remote business documents.**
//!
//! This crate drives the transactional lifecycle of an entity instance that lives in a
//! remote service and is edited under one of two backend concurrency models:
//!
//! - **Draft**: a separate draft entity shadows the active one and is activated on save.
//! - **Sticky session**: the backend pins an editable copy in a server-side session.
//!
//! It also invokes bound and unbound backend actions: it drops targets an action does
//! not apply to, asks for missing parameters and relays the backend's messages.
//!
//! ## Core Concepts
//!
//! ### Collaborators, not I/O
//! The engine does no networking and draws no UI. The backend model, the busy indicator,
//! message presentation, dialogs and the deletion policy are traits in [`framework`],
//! injected once as [`TransactionServices`](framework::TransactionServices). Tests use the
//! in-memory doubles in [`framework::mock`].
//!
//! ### Errors
//! Every operation returns [`TransactionError`](error::TransactionError). A user backing
//! out of a dialog is [`TransactionError::Cancelled`](error::TransactionError::Cancelled),
//! which callers tell apart from real failures with
//! [`is_cancellation`](error::TransactionError::is_cancellation).
//!
//! ### Busy indication
//! Busy scopes are held by an RAII [`BusyGuard`](busy::BusyGuard), so an early return or
//! a dropped future cannot leave the application locked.
//!
//! ### Observability
//! `tracing` spans around every public operation. See [`lifecycle::tracing`].
//!
//! ## Module Tour
//!
//! ### 1. Contracts ([`framework`], [`model`])
//! - **Role**: Collaborator traits and the values passed through them.
//! - **Key items**: [`DataModel`](framework::DataModel),
//!   [`DocumentContext`](model::DocumentContext), [`ListBinding`](model::ListBinding).
//!
//! ### 2. Services ([`programming_model`], [`busy`], [`side_effects`])
//! - **Role**: Classify resources, scope the busy indicator, augment action requests.
//! - **Key items**: [`ProgrammingModelResolver`](programming_model::ProgrammingModelResolver),
//!   [`BusyLockCoordinator`](busy::BusyLockCoordinator),
//!   [`SideEffectCoordinator`](side_effects::SideEffectCoordinator).
//!
//! ### 3. Actions ([`actions`])
//! - **Role**: Applicability, parameter dialogs, changeset grouping.
//! - **Key items**: [`ActionInvoker`](actions::ActionInvoker),
//!   [`ActionInvocationRequest`](actions::ActionInvocationRequest).
//!
//! ### 4. Lifecycle ([`lifecycle`])
//! - **Role**: The document state machine.
//! - **Key items**: [`DocumentLifecycleController`](lifecycle::DocumentLifecycleController).
//!
//! ### 5. Configuration ([`config`])
//! - **Role**: Busy defaults, deep-link startup parameters, user-visible texts.
//!
//! ## Quick Start
//!
//! ```
//! use document_transaction::config::TransactionConfig;
//! use document_transaction::framework::mock::MockServices;
//! use document_transaction::lifecycle::DocumentLifecycleController;
//!
//! let mocks = MockServices::new();
//! let controller = DocumentLifecycleController::new(mocks.services(), TransactionConfig::default());
//! assert_eq!(controller.config().busy_model_scope, "ui");
//! ```
//!
//! ### Running Tests
//!
//! ```bash
//! cargo test
//! ```

pub mod actions;
pub mod busy;
pub mod config;
pub mod error;
pub mod framework;
pub mod lifecycle;
pub mod model;
pub mod programming_model;
pub mod side_effects;
