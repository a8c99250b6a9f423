//! Rocket component tree carrying drag override settings.
//!
//! Components live in `Arc`s; parents own their children and children keep a
//! weak link back up. Override settings sit behind a lock so they can change
//! while records bound to the component are still in use.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak};

use uuid::Uuid;

use crate::error::AeroError;
use crate::policy::{ComponentRef, DragOverride};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentKind {
    /// Whole-rocket sentinel; records bound to it hold totals.
    Rocket,
    Stage,
    BodyComponent,
    FinSet,
    Other,
}

#[derive(Debug, Clone, Copy, Default)]
struct OverrideSettings {
    cd_overridden: bool,
    override_cd: f64,
    override_subcomponents: bool,
}

pub struct RocketComponent {
    id: Uuid,
    name: String,
    kind: ComponentKind,
    parent: RwLock<Weak<RocketComponent>>,
    children: RwLock<Vec<Arc<RocketComponent>>>,
    overrides: RwLock<OverrideSettings>,
}

// A poisoned lock only means another thread panicked mid-update of plain
// data; the settings are still readable.
fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

impl RocketComponent {
    pub fn new(name: impl Into<String>, kind: ComponentKind) -> Arc<Self> {
        Arc::new(Self {
            id: Uuid::new_v4(),
            name: name.into(),
            kind,
            parent: RwLock::new(Weak::new()),
            children: RwLock::new(Vec::new()),
            overrides: RwLock::new(OverrideSettings::default()),
        })
    }

    pub fn rocket(name: impl Into<String>) -> Arc<Self> {
        Self::new(name, ComponentKind::Rocket)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn kind(&self) -> ComponentKind {
        self.kind
    }

    pub fn component_name(&self) -> &str {
        &self.name
    }

    /// Attach `child` as the last child of `parent`.
    pub fn add_child(parent: &Arc<Self>, child: Arc<Self>) -> Result<(), AeroError> {
        if child.kind == ComponentKind::Rocket {
            return Err(AeroError::RocketAsChild {
                name: child.name.clone(),
            });
        }
        if child.parent().is_some() {
            return Err(AeroError::AlreadyAttached {
                child: child.name.clone(),
            });
        }
        let creates_cycle = Arc::ptr_eq(parent, &child)
            || parent.ancestors().iter().any(|a| Arc::ptr_eq(a, &child));
        if creates_cycle {
            return Err(AeroError::Cycle {
                parent: parent.name.clone(),
                child: child.name.clone(),
            });
        }

        *write(&child.parent) = Arc::downgrade(parent);
        tracing::trace!(parent = %parent.name, child = %child.name, "component attached");
        write(&parent.children).push(child);
        Ok(())
    }

    pub fn parent(&self) -> Option<Arc<Self>> {
        read(&self.parent).upgrade()
    }

    pub fn children(&self) -> Vec<Arc<Self>> {
        read(&self.children).clone()
    }

    /// Proper ancestors, nearest first.
    pub fn ancestors(&self) -> Vec<Arc<Self>> {
        let mut out = Vec::new();
        let mut current = self.parent();
        while let Some(node) = current {
            current = node.parent();
            out.push(node);
        }
        out
    }

    /// This component and all its descendants in pre-order.
    pub fn iter_subtree(self: &Arc<Self>) -> Vec<Arc<Self>> {
        let mut out = Vec::new();
        let mut stack = vec![self.clone()];
        while let Some(node) = stack.pop() {
            let children = node.children();
            stack.extend(children.into_iter().rev());
            out.push(node);
        }
        out
    }

    pub fn handle(self: &Arc<Self>) -> ComponentRef {
        ComponentRef::new(self)
    }

    /// Set or clear the drag override. Clearing keeps the last value around
    /// so re-enabling restores it, matching how the assembly dialog behaves.
    pub fn set_cd_override(&self, value: Option<f64>) {
        let mut settings = write(&self.overrides);
        match value {
            Some(cd) => {
                settings.cd_overridden = true;
                settings.override_cd = cd;
            }
            None => settings.cd_overridden = false,
        }
    }

    /// Whether an active override on this component also covers its subtree.
    pub fn set_override_subcomponents(&self, enabled: bool) {
        write(&self.overrides).override_subcomponents = enabled;
    }

    pub fn overrides_subcomponents(&self) -> bool {
        read(&self.overrides).override_subcomponents
    }
}

impl DragOverride for RocketComponent {
    fn is_cd_overridden(&self) -> bool {
        read(&self.overrides).cd_overridden
    }

    fn is_cd_overridden_by_ancestor(&self) -> bool {
        self.ancestors().iter().any(|a| {
            let s = read(&a.overrides);
            s.cd_overridden && s.override_subcomponents
        })
    }

    fn override_cd(&self) -> f64 {
        read(&self.overrides).override_cd
    }

    fn is_rocket(&self) -> bool {
        self.kind == ComponentKind::Rocket
    }

    fn name(&self) -> String {
        self.name.clone()
    }
}

impl fmt::Debug for RocketComponent {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("RocketComponent")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("overrides", &*read(&self.overrides))
            .finish()
    }
}

impl fmt::Display for RocketComponent {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
