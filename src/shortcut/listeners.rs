use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// Kinds of global key listener the modal installs while open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerKind {
    /// Alt+Shift shortcut chords
    Shortcuts,
    /// Escape closes the modal
    Escape,
}

#[derive(Debug, Default)]
struct Registry {
    next_id: u64,
    active: Vec<(u64, ListenerKind)>,
}

/// Registry of global key listeners.
///
/// Registration hands back a [`ListenerGuard`]; the listener stays
/// installed until that guard is dropped. Clones share the same registry.
#[derive(Debug, Clone, Default)]
pub struct KeyListeners {
    inner: Rc<RefCell<Registry>>,
}

impl KeyListeners {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, kind: ListenerKind) -> ListenerGuard {
        let mut registry = self.inner.borrow_mut();
        let id = registry.next_id;
        registry.next_id += 1;
        registry.active.push((id, kind));
        tracing::debug!(id, ?kind, "key listener registered");
        ListenerGuard {
            id,
            kind,
            registry: Rc::downgrade(&self.inner),
        }
    }

    pub fn is_active(&self, kind: ListenerKind) -> bool {
        self.inner
            .borrow()
            .active
            .iter()
            .any(|&(_, active)| active == kind)
    }

    /// Number of installed listeners.
    pub fn count(&self) -> usize {
        self.inner.borrow().active.len()
    }
}

/// Keeps one listener installed; dropping it deregisters the listener.
#[derive(Debug)]
#[must_use = "the listener is removed as soon as the guard is dropped"]
pub struct ListenerGuard {
    id: u64,
    kind: ListenerKind,
    registry: Weak<RefCell<Registry>>,
}

impl ListenerGuard {
    pub const fn kind(&self) -> ListenerKind {
        self.kind
    }
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        let Some(registry) = self.registry.upgrade() else {
            return;
        };
        registry.borrow_mut().active.retain(|&(id, _)| id != self.id);
        tracing::debug!(id = self.id, kind = ?self.kind, "key listener removed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_drop_deregisters() {
        let listeners = KeyListeners::new();
        let guard = listeners.register(ListenerKind::Shortcuts);
        assert!(listeners.is_active(ListenerKind::Shortcuts));
        assert!(!listeners.is_active(ListenerKind::Escape));
        assert_eq!(guard.kind(), ListenerKind::Shortcuts);
        drop(guard);
        assert!(!listeners.is_active(ListenerKind::Shortcuts));
        assert_eq!(listeners.count(), 0);
    }

    #[test]
    fn test_repeated_registration_does_not_leak() {
        let listeners = KeyListeners::new();
        for _ in 0..10 {
            let _a = listeners.register(ListenerKind::Shortcuts);
            let _b = listeners.register(ListenerKind::Escape);
            assert_eq!(listeners.count(), 2);
        }
        assert_eq!(listeners.count(), 0);
    }

    #[test]
    fn test_guard_outliving_registry_is_harmless() {
        let listeners = KeyListeners::new();
        let guard = listeners.register(ListenerKind::Escape);
        drop(listeners);
        drop(guard);
    }
}
