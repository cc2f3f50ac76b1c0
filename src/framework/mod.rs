//! Collaborator contracts and their test doubles.
//!
//! # Main Components
//!
//! - [`DataModel`] - The remote data-access layer
//! - [`BusyLocker`], [`MessageHandler`], [`DialogService`] - UI affordances
//! - [`SideEffectsService`], [`DeletionPolicy`] - Metadata-driven helpers
//! - [`TransactionServices`] - The bundle injected into the engine
//!
//! # Testing
//!
//! See [`mock`] module for in-memory collaborators.

pub mod core;
pub mod mock;

// Re-export core types for convenience
pub use core::*;
