//! Bottom-up combination of per-component records into assembly totals.
//!
//! Normal force, moments and CP are merged subtree by subtree. Drag and
//! damping moments are summed in a separate pass over the override-aware
//! accessors, since overrides decide which components contribute at all.

use std::collections::HashMap;
use std::sync::Arc;

use rayon::prelude::*;
use uuid::Uuid;

use crate::component::RocketComponent;
use crate::config::AggregationConfig;
use crate::error::AeroError;
use crate::forces::AerodynamicForces;
use crate::policy::ComponentRef;

/// Raw per-component records produced by the analysis pass, keyed by component id.
pub type ForceMap = HashMap<Uuid, AerodynamicForces>;

/// Fold `child` into the accumulator `parent`. See [`AerodynamicForces::merge`].
pub fn merge(parent: &mut AerodynamicForces, child: &AerodynamicForces) {
    parent.merge(child);
}

/// Override-resolved drag and damping summed over every analysed component.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragTotals {
    pub cd: Option<f64>,
    pub pressure_cd: Option<f64>,
    pub base_cd: Option<f64>,
    pub friction_cd: Option<f64>,
    pub override_cd: Option<f64>,
    pub pitch_damping_moment: Option<f64>,
    pub yaw_damping_moment: Option<f64>,
}

fn sum(acc: Option<f64>, v: Option<f64>) -> Option<f64> {
    Some(acc? + v?)
}

impl DragTotals {
    fn zero() -> Self {
        Self {
            cd: Some(0.0),
            pressure_cd: Some(0.0),
            base_cd: Some(0.0),
            friction_cd: Some(0.0),
            override_cd: Some(0.0),
            pitch_damping_moment: Some(0.0),
            yaw_damping_moment: Some(0.0),
        }
    }

    fn add(&mut self, forces: &AerodynamicForces) {
        self.pressure_cd = sum(self.pressure_cd, forces.pressure_cd());
        self.base_cd = sum(self.base_cd, forces.base_cd());
        self.friction_cd = sum(self.friction_cd, forces.friction_cd());
        // An active override counts with the component's current value even
        // if the record was populated before the override was set.
        let override_cd = forces.active_override().or_else(|| forces.override_cd());
        self.override_cd = sum(self.override_cd, override_cd);
        self.pitch_damping_moment = sum(self.pitch_damping_moment, forces.pitch_damping_moment());
        self.yaw_damping_moment = sum(self.yaw_damping_moment, forces.yaw_damping_moment());
        self.cd = self.breakdown_cd();
    }

    /// pressure + base + friction + override.
    fn breakdown_cd(&self) -> Option<f64> {
        Some(self.pressure_cd? + self.base_cd? + self.friction_cd? + self.override_cd?)
    }

    fn apply_to(&self, total: &mut AerodynamicForces) {
        total.set_cd(self.cd);
        total.set_cd_axial(self.cd);
        total.set_pressure_cd(self.pressure_cd);
        total.set_base_cd(self.base_cd);
        total.set_friction_cd(self.friction_cd);
        total.set_override_cd(self.override_cd);
        total.set_pitch_damping_moment(self.pitch_damping_moment);
        total.set_yaw_damping_moment(self.yaw_damping_moment);
    }
}

/// Sum the override-resolved drag of every component under `root` that has a record.
///
/// A component shadowed by an ancestor override contributes zero, an
/// overriding component contributes its override, everything else its
/// computed pressure, base and friction drag. Total CD is always the sum of
/// those four parts. A record missing one of the values makes that total missing.
pub fn drag_totals(root: &Arc<RocketComponent>, records: &ForceMap) -> DragTotals {
    let mut totals = DragTotals::zero();
    for node in root.iter_subtree() {
        if let Some(forces) = records.get(&node.id()) {
            totals.add(forces);
        }
    }
    totals
}

/// Result of aggregating a component tree
#[derive(Debug, Clone)]
pub struct AssemblyForces {
    /// Whole-assembly record, drag included.
    ///
    /// Left unbound so its drag getters report the sums in `drag` as stored
    /// instead of re-applying the root's own override settings.
    pub total: AerodynamicForces,
    pub drag: DragTotals,
    root: ComponentRef,
    subtrees: HashMap<Uuid, AerodynamicForces>,
}

impl AssemblyForces {
    /// Component the totals were aggregated from.
    pub fn root(&self) -> &ComponentRef {
        &self.root
    }

    /// Merged record of the subtree rooted at `id`.
    ///
    /// Subtree records carry CP, normal force and moments only; their stored
    /// drag is left not computed, so their drag getters report the node's
    /// override policy and nothing else.
    pub fn subtree(&self, id: Uuid) -> Option<&AerodynamicForces> {
        self.subtrees.get(&id)
    }

    pub fn subtree_count(&self) -> usize {
        self.subtrees.len()
    }
}

struct Subtree {
    forces: AerodynamicForces,
    entries: Vec<(Uuid, AerodynamicForces)>,
}

fn walk(
    node: &Arc<RocketComponent>,
    records: &ForceMap,
    config: &AggregationConfig,
) -> Result<Subtree, AeroError> {
    let children = node.children();
    let merged_children: Vec<Subtree> =
        if config.parallel && children.len() >= config.parallel_min_children.max(2) {
            children
                .par_iter()
                .map(|child| walk(child, records, config))
                .collect::<Result<_, _>>()?
        } else {
            children
                .iter()
                .map(|child| walk(child, records, config))
                .collect::<Result<_, _>>()?
        };

    let mut acc = AerodynamicForces::for_component(node.handle());
    acc.zero();
    acc.set_cd(None);
    acc.set_cd_axial(None);
    acc.set_pressure_cd(None);
    acc.set_base_cd(None);
    acc.set_friction_cd(None);
    acc.set_override_cd(None);
    acc.set_pitch_damping_moment(None);
    acc.set_yaw_damping_moment(None);

    if let Some(own) = records.get(&node.id()) {
        if let Some(bound) = own.component() {
            if !bound.refers_to(node) {
                return Err(AeroError::RecordMismatch {
                    id: node.id(),
                    component: node.component_name().to_string(),
                });
            }
        }
        acc.set_axisymmetric(own.is_axisymmetric());
        acc.merge(own);
    }

    let mut entries = Vec::new();
    for child in merged_children {
        if !child.forces.is_axisymmetric() {
            acc.set_axisymmetric(false);
        }
        acc.merge(&child.forces);
        entries.extend(child.entries);
    }

    tracing::trace!(component = %node, cna = ?acc.cna(), "subtree merged");
    entries.push((node.id(), acc.clone()));
    Ok(Subtree {
        forces: acc,
        entries,
    })
}

/// Merge every record under `root` bottom-up into a single assembly total.
///
/// Each component's accumulator starts zeroed and bound to the component; its
/// own record is merged first, then each child's finished subtree. Children
/// are only merged once their own subtree is complete, so every component is
/// visited exactly once. Components without a record contribute nothing.
pub fn aggregate(
    root: &Arc<RocketComponent>,
    records: &ForceMap,
    config: &AggregationConfig,
) -> Result<AssemblyForces, AeroError> {
    config.validate()?;
    let span = tracing::debug_span!("aggregate", root = %root, records = records.len());
    let _enter = span.enter();

    let Subtree { forces, entries } = walk(root, records, config)?;
    let subtrees: HashMap<Uuid, AerodynamicForces> = entries.into_iter().collect();
    let unused = records.keys().filter(|id| !subtrees.contains_key(id)).count();
    if unused > 0 {
        tracing::debug!(unused, "some records do not belong to this tree");
    }

    let drag = drag_totals(root, records);
    let mut total = forces;
    total.set_component(None);
    drag.apply_to(&mut total);

    tracing::debug!(cd = ?total.cd(), cna = ?total.cna(), "aggregation complete");
    Ok(AssemblyForces {
        total,
        drag,
        root: root.handle(),
        subtrees,
    })
}
