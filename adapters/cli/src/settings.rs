//! Session settings layered from defaults, a TOML file, a replay token and flags.

use std::{fs, path::Path};

use anyhow::{bail, Context, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use snake_autopilot_core::Direction;
use snake_autopilot_world::CalibrationMode;

const DEFAULT_GRID: u32 = 20;
const DEFAULT_MAX_TICKS: u64 = 2_000;

/// Who steers the snake.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum SessionMode {
    /// The breadth-first autopilot decides every tick.
    #[default]
    Auto,
    /// Directions come from the `--moves` script.
    Manual,
}

/// Command-line spelling of [`CalibrationMode`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum CalibrationChoice {
    /// Food collisions use the drawn food cell.
    Disabled,
    /// Food collisions drift with calibration contributions.
    Faithful,
}

impl From<CalibrationChoice> for CalibrationMode {
    fn from(choice: CalibrationChoice) -> Self {
        match choice {
            CalibrationChoice::Disabled => CalibrationMode::Disabled,
            CalibrationChoice::Faithful => CalibrationMode::Faithful,
        }
    }
}

/// Partial settings; unset fields fall through to the layer below.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct SettingsLayer {
    pub(crate) width: Option<u32>,
    pub(crate) height: Option<u32>,
    pub(crate) seed: Option<u64>,
    pub(crate) max_ticks: Option<u64>,
    pub(crate) mode: Option<SessionMode>,
    pub(crate) calibration: Option<CalibrationMode>,
    pub(crate) moves: Option<String>,
    pub(crate) render: Option<bool>,
    pub(crate) json: Option<bool>,
}

impl SettingsLayer {
    /// Reads a layer from a TOML session file.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read session file {}", path.display()))?;
        toml::from_str(&text)
            .with_context(|| format!("failed to parse session file {}", path.display()))
    }
}

/// Fully resolved settings for one driver run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct SessionSettings {
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) seed: Option<u64>,
    pub(crate) max_ticks: u64,
    pub(crate) mode: SessionMode,
    pub(crate) calibration: CalibrationMode,
    pub(crate) script: Vec<Direction>,
    pub(crate) render: bool,
    pub(crate) json: bool,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            width: DEFAULT_GRID,
            height: DEFAULT_GRID,
            seed: None,
            max_ticks: DEFAULT_MAX_TICKS,
            mode: SessionMode::Auto,
            calibration: CalibrationMode::Disabled,
            script: Vec::new(),
            render: false,
            json: false,
        }
    }
}

impl SessionSettings {
    /// Overrides every field the layer sets. A move script without an
    /// explicit mode switches the session to manual steering.
    pub(crate) fn apply(mut self, layer: SettingsLayer) -> Result<Self> {
        if let Some(width) = layer.width {
            self.width = width;
        }
        if let Some(height) = layer.height {
            self.height = height;
        }
        if let Some(seed) = layer.seed {
            self.seed = Some(seed);
        }
        if let Some(max_ticks) = layer.max_ticks {
            self.max_ticks = max_ticks;
        }
        if let Some(calibration) = layer.calibration {
            self.calibration = calibration;
        }
        if let Some(moves) = layer.moves.as_deref() {
            self.script = parse_script(moves)?;
            if layer.mode.is_none() {
                self.mode = SessionMode::Manual;
            }
        }
        if let Some(mode) = layer.mode {
            self.mode = mode;
        }
        if let Some(render) = layer.render {
            self.render = render;
        }
        if let Some(json) = layer.json {
            self.json = json;
        }
        Ok(self)
    }
}

/// Parses a move script such as `RRDDL.U`.
///
/// `U`, `D`, `L` and `R` (any case) queue a direction for the matching tick;
/// `.` leaves the active direction alone. Whitespace is ignored.
pub(crate) fn parse_script(script: &str) -> Result<Vec<Direction>> {
    script
        .chars()
        .filter(|symbol| !symbol.is_whitespace())
        .map(|symbol| match symbol.to_ascii_uppercase() {
            'U' => Ok(Direction::Up),
            'D' => Ok(Direction::Down),
            'L' => Ok(Direction::Left),
            'R' => Ok(Direction::Right),
            '.' => Ok(Direction::None),
            other => bail!("unknown move '{other}' (expected U, D, L, R or .)"),
        })
        .collect()
}

/// Inverse of [`parse_script`].
pub(crate) fn format_script(script: &[Direction]) -> String {
    script
        .iter()
        .map(|direction| match direction {
            Direction::Up => 'U',
            Direction::Down => 'D',
            Direction::Left => 'L',
            Direction::Right => 'R',
            Direction::None => '.',
        })
        .collect()
}
