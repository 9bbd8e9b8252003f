//! Store configuration parameters.

use rupture_core::Real;

use crate::error::StoreError;

/// Configuration for a [`LayeredStore`](crate::LayeredStore).
///
/// Controls the padded per-point stride, the memory budget, and the
/// segment pool used by `Pooled` fields. Validated at allocation; all
/// values are immutable afterwards.
#[derive(Clone, Debug)]
pub struct StoreConfig {
    /// Number of fault quadrature points per face.
    pub quadrature_points: usize,

    /// Vector register width in bytes. Per-point rows are padded to a
    /// multiple of `vector_bytes / size_of::<Real>()` elements.
    ///
    /// Default: 64 (one AVX-512 register). Must be a power of two.
    pub vector_bytes: usize,

    /// Upper bound on total field storage in bytes. Allocation fails
    /// with [`StoreError::BudgetExceeded`] when the schema needs more.
    ///
    /// Default: 1 GiB.
    pub memory_budget_bytes: usize,

    /// Size of each pool segment in `Real` elements.
    pub segment_size: u32,

    /// Maximum number of pool segments.
    pub max_segments: u16,
}

impl StoreConfig {
    /// Default vector width in bytes.
    pub const DEFAULT_VECTOR_BYTES: usize = 64;

    /// Default memory budget: 1 GiB.
    pub const DEFAULT_MEMORY_BUDGET: usize = 1 << 30;

    /// Default pool segment size: 1M elements.
    pub const DEFAULT_SEGMENT_SIZE: u32 = 1 << 20;

    /// Default maximum pool segment count.
    pub const DEFAULT_MAX_SEGMENTS: u16 = 64;

    /// Create a config for the given number of quadrature points.
    pub fn new(quadrature_points: usize) -> Self {
        Self {
            quadrature_points,
            vector_bytes: Self::DEFAULT_VECTOR_BYTES,
            memory_budget_bytes: Self::DEFAULT_MEMORY_BUDGET,
            segment_size: Self::DEFAULT_SEGMENT_SIZE,
            max_segments: Self::DEFAULT_MAX_SEGMENTS,
        }
    }

    /// Set the memory budget.
    pub fn with_budget(mut self, bytes: usize) -> Self {
        self.memory_budget_bytes = bytes;
        self
    }

    /// Number of `Real` elements per vector register.
    pub fn vector_width(&self) -> usize {
        (self.vector_bytes / std::mem::size_of::<Real>()).max(1)
    }

    /// Quadrature point count rounded up to the vector width.
    pub fn padded_points(&self) -> usize {
        self.quadrature_points.div_ceil(self.vector_width()) * self.vector_width()
    }

    /// Check structural invariants.
    pub fn validate(&self) -> Result<(), StoreError> {
        if self.quadrature_points == 0 {
            return Err(StoreError::InvalidConfig {
                reason: "quadrature_points must be at least 1".into(),
            });
        }
        if !self.vector_bytes.is_power_of_two()
            || self.vector_bytes < std::mem::size_of::<Real>()
        {
            return Err(StoreError::InvalidConfig {
                reason: format!(
                    "vector_bytes must be a power of two >= {}, got {}",
                    std::mem::size_of::<Real>(),
                    self.vector_bytes
                ),
            });
        }
        if self.segment_size == 0 || self.max_segments == 0 {
            return Err(StoreError::InvalidConfig {
                reason: "segment pool must have non-zero size".into(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn padded_points_rounds_up_to_vector_width() {
        let config = StoreConfig::new(9);
        let width = config.vector_width();
        assert_eq!(config.padded_points() % width, 0);
        assert!(config.padded_points() >= 9);
        assert!(config.padded_points() < 9 + width);
    }

    #[test]
    fn exact_multiple_is_not_padded() {
        let mut config = StoreConfig::new(16);
        config.vector_bytes = 16 * std::mem::size_of::<Real>();
        assert_eq!(config.padded_points(), 16);
    }

    #[test]
    fn zero_points_rejected() {
        let config = StoreConfig::new(0);
        assert!(matches!(
            config.validate(),
            Err(StoreError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn non_power_of_two_vector_rejected() {
        let mut config = StoreConfig::new(4);
        config.vector_bytes = 48;
        assert!(config.validate().is_err());
    }
}
