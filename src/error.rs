use core::fmt;

/// Rejected map configuration. Returned by the fallible constructors;
/// the map never exists in a half-initialized state.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MapConfigError {
    /// `initial_capacity` was zero.
    ZeroCapacity,
    /// `initial_capacity` was not a power of two; bucket addressing is
    /// `hash & (capacity - 1)` and requires one.
    CapacityNotPowerOfTwo(usize),
    /// `growth_factor` was not a power of two >= 2. Capacities must stay
    /// powers of two across resizes.
    BadGrowthFactor(usize),
    /// `work_budget` was zero, which would stall migration forever.
    ZeroWorkBudget,
}

impl fmt::Display for MapConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapConfigError::ZeroCapacity => write!(f, "initial capacity must be non-zero"),
            MapConfigError::CapacityNotPowerOfTwo(n) => {
                write!(f, "initial capacity must be a power of two, got {}", n)
            }
            MapConfigError::BadGrowthFactor(g) => {
                write!(f, "growth factor must be a power of two >= 2, got {}", g)
            }
            MapConfigError::ZeroWorkBudget => write!(f, "migration work budget must be non-zero"),
        }
    }
}

impl std::error::Error for MapConfigError {}
