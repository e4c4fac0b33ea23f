//! Busy indicator shown while network operations are in flight.

use std::sync::Arc;

use tokio::sync::watch;

/// Reference counted busy indicator.
///
/// Visible while at least one [`BusyGuard`] is alive, so overlapping
/// operations never hide each other's indicator.
#[derive(Clone)]
pub struct BusyIndicator {
    depth: Arc<watch::Sender<usize>>,
}

impl Default for BusyIndicator {
    fn default() -> Self {
        Self::new()
    }
}

impl BusyIndicator {
    pub fn new() -> Self {
        let (depth, _) = watch::channel(0);
        Self {
            depth: Arc::new(depth),
        }
    }

    pub fn enter(&self) -> BusyGuard {
        self.depth.send_modify(|depth| *depth += 1);
        BusyGuard {
            depth: Arc::clone(&self.depth),
        }
    }

    pub fn is_visible(&self) -> bool {
        self.depth() > 0
    }

    pub fn depth(&self) -> usize {
        *self.depth.borrow()
    }

    /// Receives the number of in-flight operations on every change.
    pub fn subscribe(&self) -> watch::Receiver<usize> {
        self.depth.subscribe()
    }
}

/// Hides the indicator on drop unless another guard is still alive.
#[must_use = "the indicator is released as soon as the guard is dropped"]
pub struct BusyGuard {
    depth: Arc<watch::Sender<usize>>,
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.depth
            .send_modify(|depth| *depth = depth.saturating_sub(1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_drop_hides_indicator() {
        let busy = BusyIndicator::new();
        assert!(!busy.is_visible());
        {
            let _guard = busy.enter();
            assert!(busy.is_visible());
        }
        assert!(!busy.is_visible());
    }

    #[test]
    fn overlapping_guards_keep_indicator_visible() {
        let busy = BusyIndicator::new();
        let first = busy.enter();
        let second = busy.enter();
        drop(first);
        assert!(busy.is_visible());
        assert_eq!(busy.depth(), 1);
        drop(second);
        assert!(!busy.is_visible());
    }

    #[test]
    fn subscribers_observe_depth_changes() {
        let busy = BusyIndicator::new();
        let mut rx = busy.subscribe();
        let guard = busy.enter();
        assert!(rx.has_changed().expect("sender alive"));
        assert_eq!(*rx.borrow_and_update(), 1);
        drop(guard);
        assert_eq!(*rx.borrow_and_update(), 0);
    }
}
