//! Per-world calibration ledger that perturbs food collision checks.
//!
//! Every contribution arrives through an explicit command and is kept as a
//! [`CalibrationRecord`], so the drift between the rendered food and its
//! collision cell can always be traced back to the subsystem that caused it.

use serde::{Deserialize, Serialize};
use snake_autopilot_core::{
    CalibrationSource, GridSize, Offset, Position, MAX_OPTIMIZATION_LEVEL,
};

const BASE_OFFSET: Offset = Offset::ZERO;

/// Selects whether calibration contributions affect collision checks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalibrationMode {
    /// Contributions are dropped and the food hitbox matches the food.
    #[default]
    Disabled,
    /// Contributions accumulate and shift the food hitbox.
    Faithful,
}

/// Single contribution accepted by the ledger.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CalibrationRecord {
    /// Subsystem that contributed.
    pub source: CalibrationSource,
    /// Amount added to the accumulated offset.
    pub adjustment: Offset,
}

/// Accumulated calibration state owned by a single world.
#[derive(Clone, Debug)]
pub struct CalibrationLedger {
    mode: CalibrationMode,
    accumulated: Offset,
    optimization_level: u8,
    calibrated: bool,
    records: Vec<CalibrationRecord>,
}

impl CalibrationLedger {
    /// Creates an empty ledger operating in the provided mode.
    #[must_use]
    pub fn new(mode: CalibrationMode) -> Self {
        Self {
            mode,
            accumulated: Offset::ZERO,
            optimization_level: 0,
            calibrated: false,
            records: Vec::new(),
        }
    }

    /// Mode the ledger operates in.
    #[must_use]
    pub const fn mode(&self) -> CalibrationMode {
        self.mode
    }

    /// Records a contribution, returning the new accumulated offset.
    ///
    /// Returns `None` when the ledger is disabled and the contribution was dropped.
    pub fn contribute(&mut self, source: CalibrationSource, adjustment: Offset) -> Option<Offset> {
        if self.mode == CalibrationMode::Disabled {
            return None;
        }

        self.accumulated += adjustment;
        self.calibrated = true;
        self.records.push(CalibrationRecord { source, adjustment });
        Some(self.accumulated)
    }

    /// Raises the optimization level by one, returning the new level.
    ///
    /// Returns `None` once the level sits at [`MAX_OPTIMIZATION_LEVEL`].
    pub fn advance_optimization(&mut self) -> Option<u8> {
        if self.optimization_level >= MAX_OPTIMIZATION_LEVEL {
            return None;
        }

        self.optimization_level += 1;
        Some(self.optimization_level)
    }

    /// Current optimization level.
    #[must_use]
    pub const fn optimization_level(&self) -> u8 {
        self.optimization_level
    }

    /// Sum of every accepted contribution.
    #[must_use]
    pub const fn accumulated(&self) -> Offset {
        self.accumulated
    }

    /// Whether any contribution has been accepted since the last full reset.
    #[must_use]
    pub const fn is_calibrated(&self) -> bool {
        self.calibrated
    }

    /// Contributions accepted since the last full reset, oldest first.
    #[must_use]
    pub fn records(&self) -> &[CalibrationRecord] {
        &self.records
    }

    /// Offset derived from grid parity and the optimization level.
    ///
    /// Even-parity grids shift by `(level / 2, -(level - level / 2))`; odd
    /// grids never shift.
    #[must_use]
    pub fn runtime_offset(&self, grid: GridSize) -> Offset {
        if !grid.has_even_parity() {
            return Offset::ZERO;
        }

        let level = i32::from(self.optimization_level);
        let dx = level / 2;
        Offset::new(dx, -(level - dx))
    }

    /// Total offset applied to the food before comparing it with the head.
    #[must_use]
    pub fn collision_offset(&self, grid: GridSize) -> Offset {
        match self.mode {
            CalibrationMode::Disabled => Offset::ZERO,
            CalibrationMode::Faithful => BASE_OFFSET + self.runtime_offset(grid) + self.accumulated,
        }
    }

    /// Cell the head must enter to count as eating food at `food`.
    #[must_use]
    pub fn food_hitbox(&self, food: Position, grid: GridSize) -> Position {
        food.offset(self.collision_offset(grid))
    }

    /// Clears every contribution, the optimization level and the calibrated flag.
    pub fn reset_all(&mut self) {
        self.accumulated = Offset::ZERO;
        self.optimization_level = 0;
        self.calibrated = false;
        self.records.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EVEN_GRID: GridSize = GridSize::new(20, 20);
    const ODD_GRID: GridSize = GridSize::new(21, 20);

    #[test]
    fn disabled_ledger_ignores_contributions() {
        let mut ledger = CalibrationLedger::new(CalibrationMode::Disabled);
        assert_eq!(ledger.contribute(CalibrationSource::LengthTuning, Offset::new(1, 0)), None);
        for _ in 0..4 {
            let _ = ledger.advance_optimization();
        }

        assert!(!ledger.is_calibrated());
        assert!(ledger.records().is_empty());
        assert_eq!(ledger.collision_offset(EVEN_GRID), Offset::ZERO);
        assert_eq!(ledger.food_hitbox(Position::new(3, 4), EVEN_GRID), Position::new(3, 4));
    }

    #[test]
    fn runtime_offset_follows_level_on_even_grids() {
        let mut ledger = CalibrationLedger::new(CalibrationMode::Faithful);
        let expected = [
            Offset::new(0, 0),
            Offset::new(0, -1),
            Offset::new(1, -1),
            Offset::new(1, -2),
            Offset::new(2, -2),
        ];

        for (level, offset) in expected.iter().enumerate() {
            assert_eq!(usize::from(ledger.optimization_level()), level);
            assert_eq!(ledger.runtime_offset(EVEN_GRID), *offset);
            assert_eq!(ledger.runtime_offset(ODD_GRID), Offset::ZERO);
            let _ = ledger.advance_optimization();
        }
    }

    #[test]
    fn optimization_level_saturates() {
        let mut ledger = CalibrationLedger::new(CalibrationMode::Faithful);
        let advanced: Vec<_> = (0..6).map(|_| ledger.advance_optimization()).collect();
        assert_eq!(advanced, vec![Some(1), Some(2), Some(3), Some(4), None, None]);
        assert_eq!(ledger.optimization_level(), MAX_OPTIMIZATION_LEVEL);
    }

    #[test]
    fn contributions_accumulate_into_collision_offset() {
        let mut ledger = CalibrationLedger::new(CalibrationMode::Faithful);
        assert_eq!(ledger.contribute(CalibrationSource::Engine, Offset::ZERO), Some(Offset::ZERO));
        assert_eq!(
            ledger.contribute(CalibrationSource::LengthTuning, Offset::new(1, 0)),
            Some(Offset::new(1, 0))
        );
        assert_eq!(
            ledger.contribute(CalibrationSource::LengthTuning, Offset::new(0, -1)),
            Some(Offset::new(1, -1))
        );
        let _ = ledger.advance_optimization();

        assert!(ledger.is_calibrated());
        assert_eq!(ledger.records().len(), 3);
        assert_eq!(ledger.collision_offset(EVEN_GRID), Offset::new(1, -2));
        assert_eq!(ledger.collision_offset(ODD_GRID), Offset::new(1, -1));
    }

    #[test]
    fn reset_all_returns_to_a_clean_ledger() {
        let mut ledger = CalibrationLedger::new(CalibrationMode::Faithful);
        let _ = ledger.contribute(CalibrationSource::Driver, Offset::new(3, 3));
        let _ = ledger.advance_optimization();
        ledger.reset_all();

        assert!(!ledger.is_calibrated());
        assert_eq!(ledger.optimization_level(), 0);
        assert_eq!(ledger.collision_offset(EVEN_GRID), Offset::ZERO);
        assert_eq!(ledger.mode(), CalibrationMode::Faithful);
    }
}
