//! Data structures exchanged between the engine and its collaborators.

pub mod context;
pub mod message;
pub mod metadata;
pub mod operation;

pub use context::*;
pub use message::*;
pub use metadata::*;
pub use operation::*;
