//! # Observability & Tracing
//!
//! Every public operation of the engine runs inside a `tracing` span named after it
//! (`create_document`, `call_action`, ...) carrying the document path or action name.
//! Events inside the span use structured fields instead of formatted strings.
//!
//! [`setup_tracing`] installs a compact subscriber filtered by `RUST_LOG`:
//!
//! ```bash
//! # Outcomes only
//! RUST_LOG=info cargo test
//!
//! # Dialog answers, resolved programming models, side-effect augmentation
//! RUST_LOG=debug cargo test
//!
//! # Busy lock and unlock of every scope
//! RUST_LOG=document_transaction::busy=trace cargo test
//! ```
//!
//! A failed save with `RUST_LOG=info`:
//!
//! ```text
//! WARN save_document{path=/Orders(ID=1,IsActiveEntity=false)}: Save failed error=Backend request failed (status Some(400)): Mandatory field missing
//! ```
//!
//! Applications that already install a subscriber skip [`setup_tracing`]; the engine only
//! emits events.

/// Installs the global compact subscriber. Panics if one is already installed.
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false) // span names already say which operation logged
        .compact()
        .init();
}

/// Like [`setup_tracing`], but keeps an existing subscriber. For tests.
pub fn try_setup_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .with_test_writer()
        .try_init();
}
