// Physical constants (code units)
// - Distance: 1 unit = 1 AU
// - Mass: 1 unit = 1 solar mass
// - Time: 1 unit = 1 year / 2π (so G = 1 for a solar-mass star)

/// Conversion factor between temperature (K) and specific internal energy
/// in code units. Kept as a literal so output matches existing snapshots.
pub const T_FAC: f64 = 5.001243690791637e-10;

/// Temperature gradient exponent, T ∝ r^Q
pub const TEMPERATURE_EXPONENT: f64 = -1.0;

/// Lower integration bound as a fraction of the inner radius
pub const INNER_BOUND_FACTOR: f64 = 0.75;

/// Upper integration bound (and rejection candidate range) as a multiple of the outer radius
pub const OUTER_BOUND_FACTOR: f64 = 1.25;

/// Relative tolerance for the disk mass integral
pub const INTEGRATION_REL_TOL: f64 = 1e-8;

/// Absolute tolerance floor for the disk mass integral
pub const INTEGRATION_ABS_TOL: f64 = 1e-14;

/// Maximum bisection depth for adaptive quadrature
pub const INTEGRATION_MAX_DEPTH: u32 = 50;

/// Candidate draws allowed per particle before rejection sampling gives up
pub const MAX_REJECTION_ATTEMPTS: u64 = 1_000_000;

/// Grid cells lighter than this are dropped
pub const GRID_MASS_FLOOR: f64 = 1e-12;

/// Half-height of the grid lattice in units of h * r_out
pub const GRID_HEIGHT_SCALE_HEIGHTS: f64 = 4.0;

/// Number of particle species slots in the snapshot header
pub const NUM_SPECIES: usize = 6;

/// Species index used for gas particles
pub const GAS_SPECIES: usize = 0;

/// Snapshot file suffix (without the dot)
pub const SNAPSHOT_EXTENSION: &str = "hdf5";
