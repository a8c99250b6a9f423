use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use approx::assert_abs_diff_eq;
use rocket_aero::{
    aggregate, AerodynamicForces, AggregationConfig, ComponentKind, ComponentRef, Coordinate,
    DragOverride, ForceMap, Monitorable, RocketComponent,
};

/// Component whose override flags are set by hand, independent of any tree.
struct Flags {
    name: &'static str,
    overridden: AtomicBool,
    by_ancestor: AtomicBool,
    value: f64,
}

impl Flags {
    fn new(name: &'static str, overridden: bool, by_ancestor: bool, value: f64) -> Arc<Self> {
        Arc::new(Self {
            name,
            overridden: AtomicBool::new(overridden),
            by_ancestor: AtomicBool::new(by_ancestor),
            value,
        })
    }
}

impl DragOverride for Flags {
    fn is_cd_overridden(&self) -> bool {
        self.overridden.load(Ordering::SeqCst)
    }
    fn is_cd_overridden_by_ancestor(&self) -> bool {
        self.by_ancestor.load(Ordering::SeqCst)
    }
    fn override_cd(&self) -> f64 {
        self.value
    }
    fn name(&self) -> String {
        self.name.to_string()
    }
}

fn drag_record(component: ComponentRef, cd: f64, pressure: f64, base: f64, friction: f64) -> AerodynamicForces {
    let mut f = AerodynamicForces::for_component(component);
    f.zero();
    f.set_cd(cd);
    f.set_pressure_cd(pressure);
    f.set_base_cd(base);
    f.set_friction_cd(friction);
    f
}

#[test]
fn test_ancestor_overridden_child_contributes_no_drag() {
    let a = Flags::new("A", false, false, 0.0);
    let b = Flags::new("B", false, true, 0.0);

    let a_forces = drag_record(ComponentRef::new(&a), 0.30, 0.20, 0.05, 0.05);
    let mut b_forces = drag_record(ComponentRef::new(&b), 0.10, 0.06, 0.02, 0.02);
    b_forces.set_cn(0.0);

    assert_eq!(b_forces.cd(), Some(0.0));
    assert_eq!(b_forces.pressure_cd(), Some(0.0));
    assert_eq!(b_forces.base_cd(), Some(0.0));
    assert_eq!(b_forces.friction_cd(), Some(0.0));
    assert_eq!(b_forces.raw_cd(), Some(0.10));

    let mut acc = AerodynamicForces::new();
    acc.zero();
    acc.merge(&b_forces);
    assert_eq!(acc.cn(), Some(0.0));
    assert_eq!(acc.raw_cd(), Some(0.0));

    assert_eq!(a_forces.cd(), Some(0.30));
    assert_eq!(a_forces.pressure_cd(), Some(0.20));
}

#[test]
fn test_subcomponent_override_in_live_tree() {
    let rocket = RocketComponent::rocket("Rocket");
    let a = RocketComponent::new("Body A", ComponentKind::BodyComponent);
    let b = RocketComponent::new("Fins B", ComponentKind::FinSet);
    RocketComponent::add_child(&rocket, a.clone()).unwrap();
    RocketComponent::add_child(&a, b.clone()).unwrap();

    let mut records = ForceMap::new();
    records.insert(a.id(), drag_record(a.handle(), 0.30, 0.20, 0.05, 0.05));
    records.insert(b.id(), drag_record(b.handle(), 0.10, 0.06, 0.02, 0.02));

    let config = AggregationConfig::sequential();
    let before = aggregate(&rocket, &records, &config).unwrap();
    assert_abs_diff_eq!(before.total.cd().unwrap(), 0.40, epsilon = 1e-12);

    // Override A for its whole subtree after the records were populated.
    a.set_cd_override(Some(0.30));
    a.set_override_subcomponents(true);

    let a_forces = &records[&a.id()];
    let b_forces = &records[&b.id()];
    assert_eq!(a_forces.cd(), Some(0.30));
    assert_eq!(a_forces.pressure_cd(), Some(0.0));
    assert_eq!(b_forces.cd(), Some(0.0));
    assert_eq!(b_forces.pressure_cd(), Some(0.0));

    let after = aggregate(&rocket, &records, &config).unwrap();
    assert_abs_diff_eq!(after.total.cd().unwrap(), 0.30, epsilon = 1e-12);
    assert_abs_diff_eq!(after.total.friction_cd().unwrap(), 0.0, epsilon = 1e-12);
}

#[test]
fn test_merge_order_does_not_change_sums() {
    let children: Vec<AerodynamicForces> = (0..5)
        .map(|i| {
            let mut f = AerodynamicForces::new();
            f.zero();
            let w = 1.0 + i as f64;
            f.set_cp(Some(Coordinate::new(0.2 * i as f64, 0.0, 0.0, w)));
            f.set_cna(w);
            f.set_cn(0.1 * w);
            f.set_cm(-0.05 * w);
            f.set_croll(0.001 * i as f64);
            f
        })
        .collect();

    let mut forward = AerodynamicForces::new();
    forward.zero();
    for c in &children {
        forward.merge(c);
    }

    let mut backward = AerodynamicForces::new();
    backward.zero();
    for c in children.iter().rev() {
        backward.merge(c);
    }

    assert_eq!(forward, backward);
    assert_abs_diff_eq!(forward.cna().unwrap(), 15.0, epsilon = 1e-12);
    let expected_x = (0..5).map(|i| 0.2 * i as f64 * (1.0 + i as f64)).sum::<f64>() / 15.0;
    assert_abs_diff_eq!(forward.cp().unwrap().x(), expected_x, epsilon = 1e-12);
}

#[test]
fn test_snapshot_handed_to_another_thread() {
    let part = Flags::new("Part", false, false, 0.0);
    let mut live = drag_record(ComponentRef::new(&part), 0.3, 0.2, 0.05, 0.05);
    live.set_cna(2.0);

    let snapshot = live.clone();
    let id = snapshot.modification_id();
    let reader = thread::spawn(move || (snapshot.cna(), snapshot.cd(), snapshot.modification_id()));

    live.set_cna(9.0);
    live.reset();

    let (cna, cd, seen_id) = reader.join().unwrap();
    assert_eq!(cna, Some(2.0));
    assert_eq!(cd, Some(0.3));
    assert_eq!(seen_id, id);
}

#[test]
fn test_identical_inputs_compare_equal() {
    let part = Flags::new("Part", true, false, 0.6);
    let build = || {
        let mut f = drag_record(ComponentRef::new(&part), 0.3, 0.2, 0.05, 0.05);
        f.set_cp(Some(Coordinate::new(0.4, 0.0, 0.0, 2.0)));
        f.set_cna(2.0);
        f
    };

    let a = build();
    let b = build();
    assert_eq!(a, b);

    let mut c = build();
    c.set_cna(2.1);
    assert_ne!(a, c);
}
