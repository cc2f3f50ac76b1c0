//! Rejects overlapping lifecycle operations on one context.
//!
//! The busy lock only blocks the UI; it does not stop a second call from racing the
//! first. Each edit/save/cancel/delete registers the context path for its duration and
//! a concurrent call on the same path fails with
//! [`TransactionError::OperationInProgress`].

use crate::error::{Result, TransactionError};
use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::warn;

#[derive(Default)]
pub(crate) struct InFlightRegistry {
    paths: Arc<Mutex<HashSet<String>>>,
}

impl InFlightRegistry {
    pub(crate) fn enter(&self, path: &str) -> Result<InFlightGuard> {
        let mut paths = self.paths.lock().unwrap_or_else(PoisonError::into_inner);
        if !paths.insert(path.to_string()) {
            warn!(path, "Operation already in progress");
            return Err(TransactionError::OperationInProgress {
                path: path.to_string(),
            });
        }
        Ok(InFlightGuard {
            paths: self.paths.clone(),
            path: path.to_string(),
        })
    }
}

pub(crate) struct InFlightGuard {
    paths: Arc<Mutex<HashSet<String>>>,
    path: String,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.paths
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_entry_is_rejected_until_released() {
        let registry = InFlightRegistry::default();
        let guard = registry.enter("/Orders(1)").unwrap();
        assert!(matches!(
            registry.enter("/Orders(1)"),
            Err(TransactionError::OperationInProgress { .. })
        ));
        assert!(registry.enter("/Orders(2)").is_ok());

        drop(guard);
        assert!(registry.enter("/Orders(1)").is_ok());
    }
}
