use crate::coordinate::Coordinate;
use crate::forces::{AerodynamicForces, Monitorable};

/// Static stability margin in calibers.
///
/// Positive when the CP lies aft of the CG along the rocket axis. Returns
/// `None` for a zero or negative reference length.
///
/// # Arguments
/// * `cp` - Center of pressure of the whole rocket
/// * `cg_x` - Axial position of the center of gravity (m)
/// * `reference_length` - Reference diameter (m)
pub fn static_margin(cp: &Coordinate, cg_x: f64, reference_length: f64) -> Option<f64> {
    if reference_length <= 0.0 {
        return None;
    }
    Some((cp.x() - cg_x) / reference_length)
}

/// Recomputes the stability margin only when the record or the inputs changed.
///
/// The record's modification id is the dirty flag, so a cache must only ever
/// be fed one record instance; ids of different records are unrelated.
#[derive(Debug, Clone, Default)]
pub struct StabilityCache {
    key: Option<(u64, u64, u64)>,
    margin: Option<f64>,
    computations: usize,
}

impl StabilityCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Margin for `forces`, reusing the previous result when nothing changed.
    pub fn margin(
        &mut self,
        forces: &AerodynamicForces,
        cg_x: f64,
        reference_length: f64,
    ) -> Option<f64> {
        let key = (
            forces.modification_id(),
            cg_x.to_bits(),
            reference_length.to_bits(),
        );
        if self.key == Some(key) {
            return self.margin;
        }

        self.margin = forces
            .cp()
            .and_then(|cp| static_margin(&cp, cg_x, reference_length));
        self.key = Some(key);
        self.computations += 1;
        self.margin
    }

    /// How many times the margin was actually recomputed.
    pub fn computations(&self) -> usize {
        self.computations
    }

    pub fn invalidate(&mut self) {
        self.key = None;
    }
}
