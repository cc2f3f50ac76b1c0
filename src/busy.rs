//! Scoped busy indication.
//!
//! [`BusyLockCoordinator::lock`] returns a [`BusyGuard`]; dropping the guard unlocks.
//! The scope is therefore released on success, on `?` early returns and when the
//! operation's future is dropped mid-flight.
//!
//! Re-entrant locking is not counted here. Nested operations must acquire and release
//! symmetrically, which the guard does as long as guards are not leaked.

use crate::config::{BusyMode, TransactionConfig};
use crate::framework::{BusyLocker, BusyScope};
use std::future::Future;
use std::sync::Arc;
use tracing::trace;

pub struct BusyLockCoordinator {
    locker: Arc<dyn BusyLocker>,
    model_scope_id: String,
    default_mode: BusyMode,
    default_local_id: Option<String>,
}

impl BusyLockCoordinator {
    pub fn new(locker: Arc<dyn BusyLocker>, config: &TransactionConfig) -> Self {
        Self {
            locker,
            model_scope_id: config.busy_model_scope.clone(),
            default_mode: config.busy_mode,
            default_local_id: config.local_busy_id.clone(),
        }
    }

    /// Scope for a busy mode; `None` when the mode asks for no indication.
    ///
    /// A local mode without an id falls back to the global scope.
    pub fn scope(&self, mode: BusyMode, local_id: Option<&str>) -> Option<BusyScope> {
        match mode {
            BusyMode::None => None,
            BusyMode::Global => Some(BusyScope::global(&self.model_scope_id)),
            BusyMode::Local => match local_id.or(self.default_local_id.as_deref()) {
                Some(id) => Some(BusyScope::local(&self.model_scope_id, id)),
                None => Some(BusyScope::global(&self.model_scope_id)),
            },
        }
    }

    /// Scope of the configured default busy mode.
    pub fn default_scope(&self) -> Option<BusyScope> {
        self.scope(self.default_mode, None)
    }

    pub fn lock(&self, scope: Option<BusyScope>) -> BusyGuard {
        if let Some(scope) = &scope {
            trace!(scope = scope.path(), "Busy lock");
            self.locker.lock(scope);
        }
        BusyGuard {
            locker: self.locker.clone(),
            scope,
        }
    }

    pub fn lock_default(&self) -> BusyGuard {
        self.lock(self.default_scope())
    }
}

/// Holds a busy scope until dropped.
#[must_use = "the busy scope is released when the guard is dropped"]
pub struct BusyGuard {
    locker: Arc<dyn BusyLocker>,
    scope: Option<BusyScope>,
}

impl BusyGuard {
    /// Releases the scope now instead of at the end of the enclosing block.
    pub fn release(mut self) {
        self.unlock();
    }

    /// Unlocks while `pending` runs, typically a dialog, and locks the same scope again.
    ///
    /// Dropped mid-wait, the guard stays unlocked.
    pub async fn suspend<F: Future>(&mut self, pending: F) -> F::Output {
        let scope = self.scope.clone();
        self.unlock();
        let output = pending.await;
        if let Some(scope) = scope {
            trace!(scope = scope.path(), "Busy lock resumed");
            self.locker.lock(&scope);
            self.scope = Some(scope);
        }
        output
    }

    fn unlock(&mut self) {
        if let Some(scope) = self.scope.take() {
            trace!(scope = scope.path(), "Busy unlock");
            self.locker.unlock(&scope);
        }
    }
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.unlock();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::mock::RecordingBusyLocker;

    fn coordinator(locker: Arc<RecordingBusyLocker>) -> BusyLockCoordinator {
        BusyLockCoordinator::new(locker, &TransactionConfig::default())
    }

    #[test]
    fn guard_unlocks_once() {
        let locker = Arc::new(RecordingBusyLocker::new());
        let busy = coordinator(locker.clone());

        let guard = busy.lock_default();
        assert!(locker.is_locked(&BusyScope::global("ui")));
        guard.release();

        assert_eq!(locker.lock_count(), 1);
        assert_eq!(locker.unlock_count(), 1);
        assert!(locker.is_balanced());
    }

    #[test]
    fn early_return_releases() {
        fn failing(busy: &BusyLockCoordinator) -> Result<(), &'static str> {
            let _busy = busy.lock(busy.scope(BusyMode::Local, Some("table")));
            let backend: Result<(), &'static str> = Err("boom");
            backend?;
            Ok(())
        }

        let locker = Arc::new(RecordingBusyLocker::new());
        let busy = coordinator(locker.clone());
        assert!(failing(&busy).is_err());
        assert!(locker.is_balanced());
        assert_eq!(locker.scopes(), ["/busyLocal/table"]);
    }

    #[tokio::test]
    async fn dropped_future_releases() {
        let locker = Arc::new(RecordingBusyLocker::new());
        let busy = Arc::new(coordinator(locker.clone()));

        let task = {
            let busy = busy.clone();
            tokio::spawn(async move {
                let _busy = busy.lock_default();
                std::future::pending::<()>().await;
            })
        };
        tokio::task::yield_now().await;
        task.abort();
        let _ = task.await;

        assert!(locker.is_balanced());
    }

    #[tokio::test]
    async fn suspend_unlocks_while_waiting() {
        let locker = Arc::new(RecordingBusyLocker::new());
        let busy = coordinator(locker.clone());
        let scope = BusyScope::global("ui");

        let mut guard = busy.lock_default();
        let locked_inside = guard.suspend(async { locker.is_locked(&scope) }).await;
        assert!(!locked_inside);
        assert!(locker.is_locked(&scope));

        guard.release();
        assert_eq!(locker.lock_count(), 2);
        assert!(locker.is_balanced());
    }

    #[test]
    fn none_mode_takes_no_lock() {
        let locker = Arc::new(RecordingBusyLocker::new());
        let busy = coordinator(locker.clone());
        drop(busy.lock(busy.scope(BusyMode::None, None)));
        assert_eq!(locker.lock_count(), 0);
        assert_eq!(locker.unlock_count(), 0);
    }
}
