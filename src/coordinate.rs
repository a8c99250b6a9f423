//! Weighted positions used for centers of pressure.
//!
//! A CP is carried together with the weight it should exert when averaged with
//! other CPs (for aerodynamics, the component's CNa). Merging two components
//! therefore needs no side channel for the weight: it travels with the point.

use std::fmt;

use nalgebra::Vector3;

use crate::constants::{CP_HASH_SCALE, EQUALITY_TOLERANCE, ZERO_WEIGHT_TOLERANCE};

/// A 3D position with an attached scalar weight
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    pub position: Vector3<f64>,
    pub weight: f64,
}

impl Coordinate {
    /// Origin with zero weight.
    pub const NUL: Coordinate = Coordinate {
        position: Vector3::new(0.0, 0.0, 0.0),
        weight: 0.0,
    };

    pub fn new(x: f64, y: f64, z: f64, weight: f64) -> Self {
        Self {
            position: Vector3::new(x, y, z),
            weight,
        }
    }

    pub fn x(&self) -> f64 {
        self.position.x
    }

    pub fn y(&self) -> f64 {
        self.position.y
    }

    pub fn z(&self) -> f64 {
        self.position.z
    }

    /// Weighted average of two coordinates.
    ///
    /// The result carries the summed weight, so repeated averaging into an
    /// accumulator gives the same point as one average over all inputs. When
    /// both weights cancel out the positions are averaged plainly and the
    /// result has zero weight. An absent `other` leaves `self` unchanged.
    pub fn average(&self, other: Option<&Coordinate>) -> Coordinate {
        let Some(other) = other else {
            return *self;
        };

        let weight = self.weight + other.weight;
        if weight.abs() < ZERO_WEIGHT_TOLERANCE {
            return Coordinate {
                position: (self.position + other.position) / 2.0,
                weight: 0.0,
            };
        }

        Coordinate {
            position: (self.position * self.weight + other.position * other.weight) / weight,
            weight,
        }
    }

    /// Component-wise comparison within [`EQUALITY_TOLERANCE`].
    pub fn approx_eq(&self, other: &Coordinate) -> bool {
        (self.position - other.position)
            .iter()
            .all(|d| d.abs() < EQUALITY_TOLERANCE)
            && (self.weight - other.weight).abs() < EQUALITY_TOLERANCE
    }

    /// Coarse hash bucket of the position; weight does not participate.
    pub fn hash_bucket(&self) -> i64 {
        ((self.x() + self.y() + self.z()) * CP_HASH_SCALE) as i64
    }
}

impl Default for Coordinate {
    fn default() -> Self {
        Self::NUL
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "({},{},{},w={})",
            self.x(),
            self.y(),
            self.z(),
            self.weight
        )
    }
}
