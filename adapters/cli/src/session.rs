//! Driver loop that couples the world, the autopilot and the output sinks.

use std::{fmt, io::Write};

use anyhow::{Context, Result};
use snake_autopilot_core::{
    CalibrationSource, Command, Direction, Event, GameStatus, Offset,
};
use snake_autopilot_rendering::{RenderingBackend, Scene, TextFrame, CELL_SIZE};
use snake_autopilot_system_autopilot::{Autopilot, AutopilotConfig};
use snake_autopilot_world::{self as world, query, CalibrationMode, GameConfig, World};
use tracing::{info, trace};

use crate::{
    session_token::SessionToken,
    settings::{SessionMode, SessionSettings},
    wire::WireSnapshot,
};

/// Direction queued before the first autopilot decision.
const OPENING_DIRECTION: Direction = Direction::Right;

/// Writes plain-text frames to any byte sink.
#[derive(Debug)]
pub(crate) struct TerminalBackend<W> {
    out: W,
}

impl<W: Write> TerminalBackend<W> {
    pub(crate) fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> RenderingBackend for TerminalBackend<W> {
    fn present(&mut self, scene: &Scene) -> Result<()> {
        writeln!(self.out, "{}", TextFrame::render(scene))?;
        writeln!(self.out)?;
        Ok(())
    }
}

/// Outcome of a driver run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct SessionSummary {
    pub(crate) score: u32,
    pub(crate) length: usize,
    pub(crate) moves: u64,
    pub(crate) ticks: u64,
    pub(crate) status: GameStatus,
    pub(crate) decisions: u64,
    pub(crate) collision_offset: Offset,
    pub(crate) replay: String,
}

impl fmt::Display for SessionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Score: {}", self.score)?;
        writeln!(f, "Length: {}", self.length)?;
        writeln!(f, "Moves: {}", self.moves)?;
        writeln!(f, "Ticks: {}", self.ticks)?;
        writeln!(f, "Status: {:?}", self.status)?;
        writeln!(f, "Decisions: {}", self.decisions)?;
        writeln!(
            f,
            "Collision offset: ({}, {})",
            self.collision_offset.dx, self.collision_offset.dy
        )?;
        write!(f, "Replay: {}", self.replay)
    }
}

/// Plays one game to completion or until the tick budget runs out.
///
/// Auto sessions tick until the game ends or `max_ticks` is reached. Manual
/// sessions additionally stop once the move script is exhausted.
pub(crate) fn run<W: Write>(settings: &SessionSettings, out: &mut W) -> Result<SessionSummary> {
    play(settings, out).map(|(summary, _)| summary)
}

/// Runs a session and hands back the finished world alongside its summary.
fn play<W: Write>(settings: &SessionSettings, out: &mut W) -> Result<(SessionSummary, World)> {
    let seed = settings.seed.unwrap_or_else(rand::random);
    let config = GameConfig::new(settings.width, settings.height)
        .context("invalid grid")?
        .with_seed(seed)
        .with_calibration(settings.calibration);
    let replay = SessionToken::capture(settings, seed)
        .encode()
        .context("failed to encode replay token")?;

    let mut world = World::new(config);
    let mut events = Vec::new();
    if !query::is_calibrated(&world) {
        world::apply(
            &mut world,
            Command::Calibrate {
                source: CalibrationSource::Driver,
                adjustment: Offset::ZERO,
            },
            &mut events,
        );
    }

    let mut autopilot = match settings.mode {
        SessionMode::Auto => {
            world::apply(
                &mut world,
                Command::SetDirection {
                    direction: OPENING_DIRECTION,
                },
                &mut events,
            );
            Some(Autopilot::new(AutopilotConfig::new().with_length_tuning(
                settings.calibration == CalibrationMode::Faithful,
            )))
        }
        SessionMode::Manual => None,
    };
    trace_events(&events);

    let tick_budget = match settings.mode {
        SessionMode::Auto => settings.max_ticks,
        SessionMode::Manual => settings
            .max_ticks
            .min(u64::try_from(settings.script.len()).unwrap_or(u64::MAX)),
    };
    info!(
        width = settings.width,
        height = settings.height,
        seed,
        mode = ?settings.mode,
        tick_budget,
        "session started"
    );

    let mut commands = Vec::new();
    let mut ticks = 0_u64;
    while ticks < tick_budget && query::status(&world) == GameStatus::Running {
        match autopilot.as_mut() {
            Some(autopilot) => autopilot.handle(&query::snapshot(&world), &mut commands),
            None => {
                let scripted = usize::try_from(ticks)
                    .ok()
                    .and_then(|index| settings.script.get(index).copied())
                    .unwrap_or_default();
                if scripted != Direction::None {
                    commands.push(Command::SetDirection {
                        direction: scripted,
                    });
                }
            }
        }
        commands.push(Command::Tick);

        events.clear();
        for command in commands.drain(..) {
            world::apply(&mut world, command, &mut events);
        }
        ticks += 1;
        trace_events(&events);

        let snapshot = query::snapshot(&world);
        if settings.json {
            serde_json::to_writer(&mut *out, &WireSnapshot::from(&snapshot))?;
            writeln!(out)?;
        }
        if settings.render {
            let scene = Scene::from_snapshot(&snapshot, CELL_SIZE)?;
            TerminalBackend::new(&mut *out).present(&scene)?;
        }
    }

    let snapshot = query::snapshot(&world);
    let summary = SessionSummary {
        score: snapshot.score,
        length: snapshot.length(),
        moves: snapshot.moves,
        ticks,
        status: snapshot.status,
        decisions: autopilot.map_or(0, |autopilot| autopilot.stats().decisions),
        collision_offset: query::collision_offset(&world),
        replay,
    };
    info!(
        score = summary.score,
        length = summary.length,
        ticks,
        status = ?summary.status,
        "session finished"
    );
    Ok((summary, world))
}

fn trace_events(events: &[Event]) {
    for event in events {
        trace!(?event, "world event");
    }
}
