use crate::error::MapConfigError;

/// Tuning knobs for the incremental map. The defaults follow the usual
/// amortized-rehash rules of thumb: grow at load factor 1.0 (average chain
/// length one), quadruple the capacity, and move at most 128 entries per
/// operation while a resize is draining.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct MapConfig {
    /// Bucket count of the first table. Power of two, non-zero.
    pub initial_capacity: usize,
    /// Capacity multiplier on resize. Power of two, at least 2.
    pub growth_factor: usize,
    /// Maximum entries migrated from the old generation per operation.
    /// This bound is the sole throttle on worst-case added latency.
    pub work_budget: usize,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            initial_capacity: 4,
            growth_factor: 4,
            work_budget: 128,
        }
    }
}

impl MapConfig {
    pub(crate) fn validate(&self) -> Result<(), MapConfigError> {
        if self.initial_capacity == 0 {
            return Err(MapConfigError::ZeroCapacity);
        }
        if !self.initial_capacity.is_power_of_two() {
            return Err(MapConfigError::CapacityNotPowerOfTwo(self.initial_capacity));
        }
        if self.growth_factor < 2 || !self.growth_factor.is_power_of_two() {
            return Err(MapConfigError::BadGrowthFactor(self.growth_factor));
        }
        if self.work_budget == 0 {
            return Err(MapConfigError::ZeroWorkBudget);
        }
        Ok(())
    }
}
