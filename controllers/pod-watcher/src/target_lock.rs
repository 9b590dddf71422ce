//! Target lock for `--stop-on-delete`.
//!
//! The first pod that matches the marker becomes the target; from then on
//! changes to any other pod are suppressed, and the target's deletion ends
//! the watch. The lock never releases, not even across watch restarts.

use pod_client::{ChangeKind, PodKey};
use tracing::info;

/// What to do with a matching change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Write the document
    Emit,
    /// Write the document, then stop watching
    EmitThenTerminate,
    /// Drop the change
    Suppress,
}

/// Lock state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LockState {
    #[default]
    Unlocked,
    Locked(PodKey),
}

/// Pins the first matching pod.
#[derive(Debug, Default)]
pub struct TargetLock {
    state: LockState,
}

impl TargetLock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &LockState {
        &self.state
    }

    /// Decides on a change that already matched the marker.
    ///
    /// A pod locked by this very call is then judged like any change to the
    /// target, so a deletion that is the first match ends the watch at once.
    pub fn consider(&mut self, key: &PodKey, kind: ChangeKind) -> Decision {
        if self.state == LockState::Unlocked {
            info!("Target pod found: {} (monitoring exclusively)", key);
            self.state = LockState::Locked(key.clone());
        }

        match &self.state {
            LockState::Locked(target) if target == key => {
                if kind == ChangeKind::Deleted {
                    Decision::EmitThenTerminate
                } else {
                    Decision::Emit
                }
            }
            _ => Decision::Suppress,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(name: &str) -> PodKey {
        PodKey {
            namespace: "default".to_string(),
            name: name.to_string(),
        }
    }

    #[test]
    fn test_first_match_locks_and_emits() {
        let mut lock = TargetLock::new();
        assert_eq!(lock.consider(&key("a"), ChangeKind::Added), Decision::Emit);
        assert_eq!(lock.state(), &LockState::Locked(key("a")));
    }

    #[test]
    fn test_other_pods_suppressed_once_locked() {
        let mut lock = TargetLock::new();
        lock.consider(&key("a"), ChangeKind::Added);

        assert_eq!(lock.consider(&key("b"), ChangeKind::Added), Decision::Suppress);
        assert_eq!(lock.consider(&key("b"), ChangeKind::Deleted), Decision::Suppress);
        assert_eq!(lock.consider(&key("a"), ChangeKind::Modified), Decision::Emit);
        assert_eq!(lock.state(), &LockState::Locked(key("a")));
    }

    #[test]
    fn test_same_name_other_namespace_is_another_pod() {
        let mut lock = TargetLock::new();
        lock.consider(&key("a"), ChangeKind::Added);

        let other = PodKey {
            namespace: "kube-system".to_string(),
            name: "a".to_string(),
        };
        assert_eq!(lock.consider(&other, ChangeKind::Modified), Decision::Suppress);
    }

    #[test]
    fn test_target_deletion_terminates() {
        let mut lock = TargetLock::new();
        lock.consider(&key("a"), ChangeKind::Added);
        assert_eq!(lock.consider(&key("a"), ChangeKind::Deleted), Decision::EmitThenTerminate);
    }

    #[test]
    fn test_deletion_as_first_match_locks_and_terminates() {
        let mut lock = TargetLock::new();
        assert_eq!(lock.consider(&key("a"), ChangeKind::Deleted), Decision::EmitThenTerminate);
        assert_eq!(lock.state(), &LockState::Locked(key("a")));
    }
}
