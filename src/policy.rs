//! Drag override capability and the non-owning handle records hold to it.

use std::fmt;
use std::sync::{Arc, Weak};

/// What a coefficient record needs to know about the component it describes.
///
/// Implementations are queried every time an override-aware accessor runs,
/// never cached, so override changes made after a record was populated are
/// reflected on the next read.
pub trait DragOverride: Send + Sync {
    /// The component itself carries an explicit drag coefficient override.
    fn is_cd_overridden(&self) -> bool;

    /// Some ancestor overrides drag for its whole subtree, including this component.
    fn is_cd_overridden_by_ancestor(&self) -> bool;

    /// Override value; only meaningful while `is_cd_overridden` holds.
    fn override_cd(&self) -> f64;

    /// Whether this is the whole-rocket sentinel rather than a single part.
    fn is_rocket(&self) -> bool {
        false
    }

    fn name(&self) -> String;
}

/// Non-owning handle from a record to its component.
///
/// Cloning copies the handle, not the component. If the component has been
/// dropped the handle resolves to nothing and records fall back to their raw
/// stored values.
#[derive(Clone)]
pub struct ComponentRef {
    inner: Weak<dyn DragOverride>,
}

impl ComponentRef {
    pub fn new<T: DragOverride + 'static>(component: &Arc<T>) -> Self {
        let component: Arc<dyn DragOverride> = component.clone();
        Self {
            inner: Arc::downgrade(&component),
        }
    }

    pub fn from_dyn(component: &Arc<dyn DragOverride>) -> Self {
        Self {
            inner: Arc::downgrade(component),
        }
    }

    /// Resolve the handle for a single query.
    pub fn upgrade(&self) -> Option<Arc<dyn DragOverride>> {
        self.inner.upgrade()
    }

    /// Both handles point at the same component.
    pub fn ptr_eq(&self, other: &ComponentRef) -> bool {
        Weak::ptr_eq(&self.inner, &other.inner)
    }

    /// Same component as the given `Arc`.
    pub fn refers_to<T: DragOverride + 'static>(&self, component: &Arc<T>) -> bool {
        std::ptr::eq(
            self.inner.as_ptr() as *const (),
            Arc::as_ptr(component) as *const (),
        )
    }
}

impl fmt::Debug for ComponentRef {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.upgrade() {
            Some(c) => write!(f, "ComponentRef({})", c.name()),
            None => write!(f, "ComponentRef(<dropped>)"),
        }
    }
}

impl fmt::Display for ComponentRef {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.upgrade() {
            Some(c) => write!(f, "{}", c.name()),
            None => write!(f, "<dropped>"),
        }
    }
}
