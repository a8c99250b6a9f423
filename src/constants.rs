/// Numeric constants shared by the coefficient record and its consumers

/// Absolute tolerance used when comparing coefficients and CP positions.
///
/// Coefficients recomputed from the same geometry can differ in the last few
/// bits depending on evaluation order; anything closer than this is the same
/// value for caching and equality purposes.
pub const EQUALITY_TOLERANCE: f64 = 1e-8;

/// Weights whose sum falls below this are treated as zero when averaging CPs.
pub const ZERO_WEIGHT_TOLERANCE: f64 = EQUALITY_TOLERANCE * EQUALITY_TOLERANCE;

/// Scale applied to `CD + CDaxial + CNa` before truncating into a hash bucket.
pub const COEFFICIENT_HASH_SCALE: f64 = 1000.0;

/// Scale applied to `x + y + z` of a CP before truncating into a hash bucket.
pub const CP_HASH_SCALE: f64 = 100_000.0;

/// Default minimum number of child subtrees before aggregation fans out to rayon.
pub const DEFAULT_PARALLEL_MIN_CHILDREN: usize = 4;
