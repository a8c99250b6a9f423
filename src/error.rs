use thiserror::Error;
use uuid::Uuid;

/// Errors raised while building a component tree, loading configuration, or
/// running the aggregation pass.
///
/// Operations on a single [`AerodynamicForces`](crate::AerodynamicForces)
/// record never fail; these cover the surrounding plumbing only.
#[derive(Debug, Error)]
pub enum AeroError {
    /// The child is already attached somewhere else in a tree.
    #[error("component '{child}' already has a parent")]
    AlreadyAttached { child: String },

    /// The rocket sentinel can only ever be a root.
    #[error("rocket '{name}' cannot be attached as a child")]
    RocketAsChild { name: String },

    /// Attaching would make a component its own ancestor.
    #[error("attaching '{child}' under '{parent}' would create a cycle")]
    Cycle { parent: String, child: String },

    /// A record keyed by one component is bound to a different one.
    #[error("record for component '{component}' ({id}) is bound to another component")]
    RecordMismatch { id: Uuid, component: String },

    /// A thread count of zero was requested.
    #[error("thread count must be greater than 0")]
    InvalidThreadCount,

    /// Configuration JSON could not be parsed.
    #[error("invalid aggregation config: {0}")]
    Config(#[from] serde_json::Error),
}
