//! Centralized constants for evolution parameters.
//!
//! All configurable defaults are defined here with the `EVOAI_` prefix. The same names are read
//! from the environment by [crate::config::Config::from_env].

// ============================================================================
// Numeric Thresholds
// ============================================================================

/// Magnitude above which a value counts as active, and below which an edge counts as dead
pub const EVOAI_EPSILON: f64 = f64::MIN_POSITIVE;

// ============================================================================
// Evolution Parameters
// ============================================================================

/// Number of specimens alive in every generation
pub const EVOAI_POPULATION: usize = 100;

/// Number of Score -> Fitness -> Select -> Mutate cycles
pub const EVOAI_GENERATIONS: usize = 1000;

/// Seed of the default random source
pub const EVOAI_SEED: u64 = 1234;

// ============================================================================
// Tingri Mutation Parameters
// ============================================================================

/// Deviation of the random walk on a specimen's mutancy
pub const EVOAI_MUTANCY_CHANGE_DEVIATION: f64 = 0.01;

/// Deviation of the random walk on a specimen's revive prior
pub const EVOAI_REVIVE_CHANGE_DEVIATION: f64 = 0.01;

/// Deviation of the random walk on a specimen's kill prior
pub const EVOAI_KILL_CHANGE_DEVIATION: f64 = 0.01;

/// Mean of a fresh specimen's mutancy
pub const EVOAI_MUTANCY_INITIAL_MEAN: f64 = 0.0;

/// Mean of a fresh specimen's revive prior
pub const EVOAI_REVIVE_INITIAL_MEAN: f64 = 0.0;

/// Mean of a fresh specimen's kill prior
pub const EVOAI_KILL_INITIAL_MEAN: f64 = 0.0;

/// Mean of every weight in a fresh adjacency matrix
pub const EVOAI_WEIGHT_INITIAL_MEAN: f64 = 0.0;

/// Deviation of every weight in a fresh adjacency matrix
pub const EVOAI_WEIGHT_INITIAL_DEVIATION: f64 = 1.0;

/// Deviation of a weight drawn when a dead edge is revived (centered on 0)
pub const EVOAI_REVIVE_WEIGHT_DEVIATION: f64 = 0.5;
