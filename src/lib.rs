//! # Rocket Aero
//!
//! Per-component aerodynamic coefficient records and the override-aware
//! aggregation that turns them into whole-rocket totals for a flight integrator.

// Re-export the main types and functions
pub use aggregation::{aggregate, drag_totals, merge, AssemblyForces, DragTotals, ForceMap};
pub use component::{ComponentKind, RocketComponent};
pub use config::{configure_thread_pool, AggregationConfig};
pub use coordinate::Coordinate;
pub use error::AeroError;
pub use forces::{AerodynamicForces, Monitorable};
pub use policy::{ComponentRef, DragOverride};
pub use stability::{static_margin, StabilityCache};

// Module declarations
pub mod aggregation;
pub mod component;
pub mod config;
pub mod constants;
mod coordinate;
mod error;
mod forces;
mod policy;
pub mod stability;
