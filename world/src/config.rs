//! Validated construction parameters for a world.

use snake_autopilot_core::GridSize;
use thiserror::Error;

use crate::calibration::CalibrationMode;

/// Largest accepted width or height.
pub const MAX_DIMENSION: u32 = 1024;

/// Reasons a game configuration is rejected.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// One of the dimensions was zero.
    #[error("grid dimensions must be positive (received {width}x{height})")]
    EmptyGrid {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
    },
    /// The grid cannot hold a snake and a piece of food.
    #[error("grid must contain at least two cells (received {width}x{height})")]
    TooSmall {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
    },
    /// One of the dimensions exceeded [`MAX_DIMENSION`].
    #[error("grid dimensions must not exceed 1024 (received {width}x{height})")]
    TooLarge {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
    },
}

/// Parameters used when building a [`World`](crate::World).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GameConfig {
    grid: GridSize,
    seed: u64,
    calibration: CalibrationMode,
}

impl GameConfig {
    /// Validates the grid dimensions and picks a random food seed.
    pub fn new(width: u32, height: u32) -> Result<Self, ConfigError> {
        if width == 0 || height == 0 {
            return Err(ConfigError::EmptyGrid { width, height });
        }
        if width > MAX_DIMENSION || height > MAX_DIMENSION {
            return Err(ConfigError::TooLarge { width, height });
        }
        if u64::from(width) * u64::from(height) < 2 {
            return Err(ConfigError::TooSmall { width, height });
        }

        Ok(Self {
            grid: GridSize::new(width, height),
            seed: rand::random(),
            calibration: CalibrationMode::default(),
        })
    }

    /// Fixes the seed used for food placement.
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Selects how calibration contributions are treated.
    #[must_use]
    pub const fn with_calibration(mut self, calibration: CalibrationMode) -> Self {
        self.calibration = calibration;
        self
    }

    /// Dimensions of the playing field.
    #[must_use]
    pub const fn grid(&self) -> GridSize {
        self.grid
    }

    /// Seed used for food placement.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Calibration mode of worlds built from this configuration.
    #[must_use]
    pub const fn calibration(&self) -> CalibrationMode {
        self.calibration
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_degenerate_grids() {
        assert_eq!(
            GameConfig::new(0, 5),
            Err(ConfigError::EmptyGrid { width: 0, height: 5 })
        );
        assert_eq!(
            GameConfig::new(1, 1),
            Err(ConfigError::TooSmall { width: 1, height: 1 })
        );
        assert_eq!(
            GameConfig::new(MAX_DIMENSION + 1, 4),
            Err(ConfigError::TooLarge {
                width: MAX_DIMENSION + 1,
                height: 4
            })
        );
    }

    #[test]
    fn builder_overrides_seed_and_calibration() {
        let config = GameConfig::new(2, 1)
            .expect("two cells are enough")
            .with_seed(7)
            .with_calibration(CalibrationMode::Faithful);

        assert_eq!(config.grid(), GridSize::new(2, 1));
        assert_eq!(config.seed(), 7);
        assert_eq!(config.calibration(), CalibrationMode::Faithful);
    }
}
