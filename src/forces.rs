//! Aerodynamic coefficient record for one component, or for the whole rocket.
//!
//! Every coefficient is optional: `None` means "not computed yet", which is
//! different from a computed zero. Drag getters resolve the bound component's
//! override settings at read time; everything else is returned as stored.

use std::fmt;
use std::hash::{Hash, Hasher};

use crate::constants::{COEFFICIENT_HASH_SCALE, EQUALITY_TOLERANCE};
use crate::coordinate::Coordinate;
use crate::policy::ComponentRef;

/// Objects exposing a modification counter for cheap staleness checks.
pub trait Monitorable {
    /// Strictly increases on every mutation; only comparable to earlier
    /// values from the same instance.
    fn modification_id(&self) -> u64;
}

#[derive(Debug, Clone, Copy)]
enum DragPolicy {
    /// No component bound, or the component is gone.
    Raw,
    /// An ancestor override covers this component.
    ShadowedByAncestor,
    /// The component overrides its own drag.
    Overridden(f64),
    Computed,
}

fn normalize(value: impl Into<Option<f64>>) -> Option<f64> {
    value.into().filter(|v| !v.is_nan())
}

fn add(acc: Option<f64>, other: Option<f64>) -> Option<f64> {
    Some(acc? + other?)
}

fn approx_eq(a: Option<f64>, b: Option<f64>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => a == b || (a - b).abs() < EQUALITY_TOLERANCE,
        _ => false,
    }
}

/// Aerodynamic coefficients of one component at one flight condition.
#[derive(Debug, Clone)]
pub struct AerodynamicForces {
    component: Option<ComponentRef>,

    /// CP weighted by CNa.
    cp: Option<Coordinate>,

    /// Normal force coefficient derivative. Near zero angle of attack this can
    /// be poorly defined if the calculation method does not produce it directly.
    cna: Option<f64>,
    cn: Option<f64>,
    /// Pitching moment coefficient about the coordinate origin.
    cm: Option<f64>,
    cside: Option<f64>,
    /// Yaw moment coefficient about the coordinate origin.
    cyaw: Option<f64>,
    /// Roll moment coefficient about the coordinate origin.
    croll: Option<f64>,
    croll_damp: Option<f64>,
    croll_force: Option<f64>,

    cd_axial: Option<f64>,
    /// Total drag, parallel to the airflow.
    cd: Option<f64>,
    pressure_cd: Option<f64>,
    base_cd: Option<f64>,
    friction_cd: Option<f64>,
    override_cd: Option<f64>,

    pitch_damping_moment: Option<f64>,
    yaw_damping_moment: Option<f64>,

    axisymmetric: bool,
    mod_id: u64,
}

macro_rules! coefficient_accessors {
    ($($(#[$doc:meta])* $field:ident, $setter:ident;)*) => {
        $(
            $(#[$doc])*
            pub fn $field(&self) -> Option<f64> {
                self.$field
            }

            pub fn $setter(&mut self, value: impl Into<Option<f64>>) {
                self.$field = normalize(value);
                self.mod_id += 1;
            }
        )*
    };
}

macro_rules! raw_drag_accessors {
    ($($getter:ident => $field:ident, $setter:ident;)*) => {
        $(
            /// Stored value, without applying override settings.
            pub fn $getter(&self) -> Option<f64> {
                self.$field
            }

            pub fn $setter(&mut self, value: impl Into<Option<f64>>) {
                self.$field = normalize(value);
                self.mod_id += 1;
            }
        )*
    };
}

impl AerodynamicForces {
    /// Unbound record with nothing computed.
    pub fn new() -> Self {
        Self {
            component: None,
            cp: None,
            cna: None,
            cn: None,
            cm: None,
            cside: None,
            cyaw: None,
            croll: None,
            croll_damp: None,
            croll_force: None,
            cd_axial: None,
            cd: None,
            pressure_cd: None,
            base_cd: None,
            friction_cd: None,
            override_cd: None,
            pitch_damping_moment: None,
            yaw_damping_moment: None,
            axisymmetric: true,
            mod_id: 0,
        }
    }

    pub fn for_component(component: ComponentRef) -> Self {
        let mut forces = Self::new();
        forces.set_component(Some(component));
        forces
    }

    pub fn set_component(&mut self, component: Option<ComponentRef>) {
        self.component = component;
        self.mod_id += 1;
    }

    pub fn component(&self) -> Option<&ComponentRef> {
        self.component.as_ref()
    }

    pub fn is_axisymmetric(&self) -> bool {
        self.axisymmetric
    }

    pub fn set_axisymmetric(&mut self, axisymmetric: bool) {
        self.axisymmetric = axisymmetric;
        self.mod_id += 1;
    }

    pub fn cp(&self) -> Option<Coordinate> {
        self.cp
    }

    pub fn set_cp(&mut self, cp: Option<Coordinate>) {
        self.cp = cp;
        self.mod_id += 1;
    }

    coefficient_accessors! {
        cna, set_cna;
        cn, set_cn;
        cm, set_cm;
        /// Side force coefficient, Cy.
        cside, set_cside;
        cyaw, set_cyaw;
        croll, set_croll;
        /// Roll damping coefficient.
        croll_damp, set_croll_damp;
        /// Roll forcing coefficient.
        croll_force, set_croll_force;
        /// Axial drag coefficient, CA.
        cd_axial, set_cd_axial;
        pitch_damping_moment, set_pitch_damping_moment;
        yaw_damping_moment, set_yaw_damping_moment;
    }

    raw_drag_accessors! {
        raw_cd => cd, set_cd;
        raw_pressure_cd => pressure_cd, set_pressure_cd;
        raw_base_cd => base_cd, set_base_cd;
        raw_friction_cd => friction_cd, set_friction_cd;
        raw_override_cd => override_cd, set_override_cd;
    }

    fn drag_policy(&self) -> DragPolicy {
        let Some(component) = self.component.as_ref().and_then(ComponentRef::upgrade) else {
            return DragPolicy::Raw;
        };
        if component.is_cd_overridden_by_ancestor() {
            DragPolicy::ShadowedByAncestor
        } else if component.is_cd_overridden() {
            DragPolicy::Overridden(component.override_cd())
        } else {
            DragPolicy::Computed
        }
    }

    /// Total drag coefficient after override resolution.
    ///
    /// Zero when an ancestor's override covers this component, the override
    /// value when the component overrides itself, the stored value otherwise.
    pub fn cd(&self) -> Option<f64> {
        match self.drag_policy() {
            DragPolicy::ShadowedByAncestor => Some(0.0),
            DragPolicy::Overridden(cd) => Some(cd),
            DragPolicy::Raw | DragPolicy::Computed => self.cd,
        }
    }

    /// Override value when the component overrides itself and no ancestor
    /// override covers it. Read from the component, not from the record.
    pub fn active_override(&self) -> Option<f64> {
        match self.drag_policy() {
            DragPolicy::Overridden(cd) => Some(cd),
            _ => None,
        }
    }

    fn resolved_component_drag(&self, raw: Option<f64>) -> Option<f64> {
        match self.drag_policy() {
            DragPolicy::ShadowedByAncestor | DragPolicy::Overridden(_) => Some(0.0),
            DragPolicy::Raw | DragPolicy::Computed => raw,
        }
    }

    /// Fore pressure drag; zero under any override.
    pub fn pressure_cd(&self) -> Option<f64> {
        self.resolved_component_drag(self.pressure_cd)
    }

    /// Base drag; zero under any override.
    pub fn base_cd(&self) -> Option<f64> {
        self.resolved_component_drag(self.base_cd)
    }

    /// Skin friction drag; zero under any override.
    pub fn friction_cd(&self) -> Option<f64> {
        self.resolved_component_drag(self.friction_cd)
    }

    /// Drag contributed by overrides.
    ///
    /// Totals bound to the rocket always report the stored sum. Any other
    /// component reports zero unless its own override is active and not
    /// shadowed by an ancestor.
    pub fn override_cd(&self) -> Option<f64> {
        let Some(component) = self.component.as_ref().and_then(ComponentRef::upgrade) else {
            return self.override_cd;
        };
        if !component.is_rocket()
            && (!component.is_cd_overridden() || component.is_cd_overridden_by_ancestor())
        {
            return Some(0.0);
        }
        self.override_cd
    }

    /// Forget the component and every computed value.
    pub fn reset(&mut self) {
        self.component = None;
        self.cp = None;
        self.cna = None;
        self.cn = None;
        self.cm = None;
        self.cside = None;
        self.cyaw = None;
        self.croll = None;
        self.croll_damp = None;
        self.croll_force = None;
        self.cd_axial = None;
        self.cd = None;
        self.pressure_cd = None;
        self.base_cd = None;
        self.friction_cd = None;
        self.override_cd = None;
        self.pitch_damping_moment = None;
        self.yaw_damping_moment = None;
        self.mod_id += 1;
    }

    /// Set every value to a computed zero, keeping the component binding.
    pub fn zero(&mut self) -> &mut Self {
        self.axisymmetric = true;
        self.cp = Some(Coordinate::NUL);
        self.cna = Some(0.0);
        self.cn = Some(0.0);
        self.cm = Some(0.0);
        self.cside = Some(0.0);
        self.cyaw = Some(0.0);
        self.croll = Some(0.0);
        self.croll_damp = Some(0.0);
        self.croll_force = Some(0.0);
        self.cd_axial = Some(0.0);
        self.cd = Some(0.0);
        self.pressure_cd = Some(0.0);
        self.base_cd = Some(0.0);
        self.friction_cd = Some(0.0);
        self.override_cd = Some(0.0);
        self.pitch_damping_moment = Some(0.0);
        self.yaw_damping_moment = Some(0.0);
        self.mod_id += 1;
        self
    }

    /// Fold a child's contribution into this accumulator.
    ///
    /// The CP becomes the weighted average of both CPs and the normal, side,
    /// pitch, yaw and roll terms are summed. Drag and damping moments are left
    /// alone; they depend on override settings and are totalled separately.
    /// A term missing on either side stays missing in the result.
    pub fn merge(&mut self, other: &AerodynamicForces) -> &mut Self {
        self.cp = match self.cp {
            Some(cp) => Some(cp.average(other.cp.as_ref())),
            None => {
                tracing::warn!(
                    component = ?self.component,
                    "merging into a record without a CP; zero the accumulator first"
                );
                other.cp
            }
        };
        self.cna = add(self.cna, other.cna);
        self.cn = add(self.cn, other.cn);
        self.cm = add(self.cm, other.cm);
        self.cside = add(self.cside, other.cside);
        self.cyaw = add(self.cyaw, other.cyaw);
        self.croll = add(self.croll, other.croll);
        self.croll_damp = add(self.croll_damp, other.croll_damp);
        self.croll_force = add(self.croll_force, other.croll_force);
        self.mod_id += 1;
        self
    }

    /// Coarse hash bucket consistent with `==` for values away from bucket edges.
    pub fn hash_bucket(&self) -> i64 {
        let sum = self.cd().unwrap_or(0.0) + self.cd_axial.unwrap_or(0.0) + self.cna.unwrap_or(0.0);
        let cp = self.cp.map_or(0, |cp| cp.hash_bucket());
        ((COEFFICIENT_HASH_SCALE * sum) as i64).wrapping_add(cp)
    }
}

impl Default for AerodynamicForces {
    fn default() -> Self {
        Self::new()
    }
}

impl Monitorable for AerodynamicForces {
    fn modification_id(&self) -> u64 {
        self.mod_id
    }
}

impl PartialEq for AerodynamicForces {
    /// Compares override-resolved values within [`EQUALITY_TOLERANCE`]; the
    /// component binding and the modification counter do not participate.
    fn eq(&self, other: &Self) -> bool {
        let cp_eq = match (&self.cp, &other.cp) {
            (None, None) => true,
            (Some(a), Some(b)) => a.approx_eq(b),
            _ => false,
        };

        cp_eq
            && approx_eq(self.cna, other.cna)
            && approx_eq(self.cn, other.cn)
            && approx_eq(self.cm, other.cm)
            && approx_eq(self.cside, other.cside)
            && approx_eq(self.cyaw, other.cyaw)
            && approx_eq(self.croll, other.croll)
            && approx_eq(self.croll_damp, other.croll_damp)
            && approx_eq(self.croll_force, other.croll_force)
            && approx_eq(self.cd_axial, other.cd_axial)
            && approx_eq(self.cd(), other.cd())
            && approx_eq(self.pressure_cd(), other.pressure_cd())
            && approx_eq(self.base_cd(), other.base_cd())
            && approx_eq(self.friction_cd(), other.friction_cd())
            && approx_eq(self.pitch_damping_moment, other.pitch_damping_moment)
            && approx_eq(self.yaw_damping_moment, other.yaw_damping_moment)
    }
}

impl Hash for AerodynamicForces {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.hash_bucket().hash(state);
    }
}

impl fmt::Display for AerodynamicForces {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut parts: Vec<String> = Vec::new();
        if let Some(component) = &self.component {
            parts.push(format!("component:{component}"));
        }
        if let Some(cp) = &self.cp {
            parts.push(format!("cp:{cp}"));
        }

        let values = [
            ("CNa", self.cna),
            ("CN", self.cn),
            ("Cm", self.cm),
            ("Cside", self.cside),
            ("Cyaw", self.cyaw),
            ("Croll", self.croll),
            ("CrollDamp", self.croll_damp),
            ("CrollForce", self.croll_force),
            ("CDaxial", self.cd_axial),
            ("CD", self.cd()),
            ("pressureCD", self.pressure_cd()),
            ("baseCD", self.base_cd()),
            ("frictionCD", self.friction_cd()),
            ("overrideCD", self.override_cd()),
            ("pitchDamping", self.pitch_damping_moment),
            ("yawDamping", self.yaw_damping_moment),
        ];
        parts.extend(
            values
                .iter()
                .filter_map(|(label, v)| v.map(|v| format!("{label}:{v}"))),
        );

        write!(f, "AerodynamicForces[{}]", parts.join(","))
    }
}
