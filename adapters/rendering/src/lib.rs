#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for snake autopilot adapters.

use anyhow::Result as AnyResult;
use glam::Vec2;
use snake_autopilot_core::{GameSnapshot, GameStatus, Position};
use thiserror::Error;

/// Default edge length of a single grid cell, in pixels.
pub const CELL_SIZE: f32 = 20.0;

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }
}

/// Colors used for each kind of cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Palette {
    /// Leading snake segment.
    pub head: Color,
    /// Remaining snake segments.
    pub body: Color,
    /// Food cell.
    pub food: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            head: Color::from_rgb_u8(0, 150, 0),
            body: Color::from_rgb_u8(0, 200, 0),
            food: Color::from_rgb_u8(255, 50, 50),
        }
    }
}

/// What occupies a presented cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CellKind {
    /// Leading snake segment.
    Head,
    /// Any other snake segment.
    Body,
    /// Food.
    Food,
}

/// Filled square drawn for a single occupied cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellPresentation {
    /// Grid cell the square covers.
    pub cell: Position,
    /// Top-left corner in pixels.
    pub origin: Vec2,
    /// Edge length in pixels.
    pub size: f32,
    /// Occupant of the cell.
    pub kind: CellKind,
    /// Fill color.
    pub color: Color,
}

/// Backend-neutral description of a single frame.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Edge length of a cell in pixels.
    pub cell_size: f32,
    /// Width and height of the playing field in pixels.
    pub extent: Vec2,
    /// Colors the scene was built with.
    pub palette: Palette,
    /// Occupied cells in drawing order: food, body from tail to neck, head.
    pub cells: Vec<CellPresentation>,
    /// Heads-up display lines.
    pub hud: Vec<String>,
}

impl Scene {
    /// Builds a scene from a snapshot using the default palette.
    pub fn from_snapshot(snapshot: &GameSnapshot, cell_size: f32) -> Result<Self, RenderingError> {
        Self::with_palette(snapshot, cell_size, Palette::default())
    }

    /// Builds a scene from a snapshot using the provided palette.
    pub fn with_palette(
        snapshot: &GameSnapshot,
        cell_size: f32,
        palette: Palette,
    ) -> Result<Self, RenderingError> {
        if !cell_size.is_finite() || cell_size <= 0.0 {
            return Err(RenderingError::InvalidCellSize { cell_size });
        }

        let present = |cell: Position, kind: CellKind, color: Color| CellPresentation {
            cell,
            origin: Vec2::new(cell.column() as f32, cell.row() as f32) * cell_size,
            size: cell_size,
            kind,
            color,
        };

        let mut cells = Vec::with_capacity(snapshot.length() + 1);
        cells.push(present(snapshot.food, CellKind::Food, palette.food));
        for segment in snapshot.body.iter().skip(1).rev() {
            cells.push(present(*segment, CellKind::Body, palette.body));
        }
        if let Some(head) = snapshot.head() {
            cells.push(present(head, CellKind::Head, palette.head));
        }

        Ok(Self {
            cell_size,
            extent: Vec2::new(
                snapshot.grid.width() as f32,
                snapshot.grid.height() as f32,
            ) * cell_size,
            palette,
            cells,
            hud: hud_lines(snapshot),
        })
    }
}

fn hud_lines(snapshot: &GameSnapshot) -> Vec<String> {
    vec![
        format!("Score: {}", snapshot.score),
        format!("Length: {}", snapshot.length()),
        format!("Moves: {}", snapshot.moves),
        format!("Status: {}", status_label(snapshot.status)),
    ]
}

fn status_label(status: GameStatus) -> &'static str {
    match status {
        GameStatus::Running => "running",
        GameStatus::Paused => "paused",
        GameStatus::GameOver => "game over",
    }
}

/// Plain-text rendering of a scene, one character per cell.
#[derive(Clone, Copy, Debug, Default)]
pub struct TextFrame;

impl TextFrame {
    /// Character drawn for the head.
    pub const HEAD: char = '@';
    /// Character drawn for the remaining segments.
    pub const BODY: char = 'o';
    /// Character drawn for the food.
    pub const FOOD: char = '*';
    /// Character drawn for empty cells.
    pub const EMPTY: char = '.';

    /// Renders the grid row by row followed by a single HUD line.
    ///
    /// Each cell lands in the slot given by its origin divided by the scene's
    /// cell size. Cells are drawn in scene order and anything outside the
    /// extent is skipped.
    #[must_use]
    pub fn render(scene: &Scene) -> String {
        let slots = (scene.extent / scene.cell_size).round();
        let columns = slots.x.max(0.0) as usize;
        let rows = slots.y.max(0.0) as usize;

        let mut glyphs = vec![Self::EMPTY; columns * rows];
        for cell in &scene.cells {
            let slot = (cell.origin / scene.cell_size).round();
            if slot.x < 0.0 || slot.y < 0.0 {
                continue;
            }
            let (column, row) = (slot.x as usize, slot.y as usize);
            if column < columns && row < rows {
                glyphs[row * columns + column] = Self::glyph(cell.kind);
            }
        }

        let mut frame = String::with_capacity(glyphs.len() + rows + 64);
        for row in glyphs.chunks(columns.max(1)) {
            frame.extend(row.iter());
            frame.push('\n');
        }
        frame.push_str(&scene.hud.join(" | "));
        frame
    }

    const fn glyph(kind: CellKind) -> char {
        match kind {
            CellKind::Head => Self::HEAD,
            CellKind::Body => Self::BODY,
            CellKind::Food => Self::FOOD,
        }
    }
}

/// Rendering backend capable of presenting snake scenes.
pub trait RenderingBackend {
    /// Presents a single frame.
    fn present(&mut self, scene: &Scene) -> AnyResult<()>;
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Debug, Error, PartialEq)]
pub enum RenderingError {
    /// Cell size must be positive and finite.
    #[error("cell size must be positive and finite (received {cell_size})")]
    InvalidCellSize {
        /// Provided cell size that failed validation.
        cell_size: f32,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use snake_autopilot_core::{Direction, GridSize};

    fn snapshot() -> GameSnapshot {
        GameSnapshot {
            body: vec![Position::new(2, 1), Position::new(1, 1), Position::new(0, 1)],
            food: Position::new(3, 0),
            direction: Direction::Right,
            pending_direction: Direction::Right,
            grid: GridSize::new(4, 3),
            score: 2,
            moves: 9,
            status: GameStatus::Running,
        }
    }

    #[test]
    fn scene_scales_cells_by_cell_size() {
        let scene = Scene::from_snapshot(&snapshot(), CELL_SIZE).expect("valid cell size");

        assert_eq!(scene.extent, Vec2::new(80.0, 60.0));
        assert_eq!(scene.cells.len(), 4);
        assert_eq!(scene.cells[0].kind, CellKind::Food);
        assert_eq!(scene.cells[0].origin, Vec2::new(60.0, 0.0));
        assert!(scene.cells[1..3].iter().all(|cell| cell.kind == CellKind::Body));
        assert_eq!(scene.cells[1].origin, Vec2::new(0.0, 20.0));
        assert_eq!(scene.cells[3].kind, CellKind::Head);
        assert_eq!(scene.cells[3].origin, Vec2::new(40.0, 20.0));
        assert_eq!(scene.hud[0], "Score: 2");
    }

    #[test]
    fn scene_rejects_invalid_cell_sizes_without_panicking() {
        for cell_size in [0.0, -4.0, f32::NAN, f32::INFINITY] {
            let error = Scene::from_snapshot(&snapshot(), cell_size)
                .expect_err("invalid cell size must be rejected");
            assert!(matches!(error, RenderingError::InvalidCellSize { .. }));
        }
    }

    #[test]
    fn head_and_body_colors_differ() {
        let scene = Scene::from_snapshot(&snapshot(), 8.0).expect("valid cell size");
        assert_ne!(scene.cells[3].color, scene.cells[2].color);
        assert_ne!(scene.cells[0].color, scene.cells[3].color);
    }

    #[test]
    fn text_frame_marks_each_occupant() {
        let scene = Scene::from_snapshot(&snapshot(), CELL_SIZE).expect("valid cell size");
        let frame = TextFrame::render(&scene);
        let lines: Vec<&str> = frame.lines().collect();

        assert_eq!(lines[0], "...*");
        assert_eq!(lines[1], "oo@.");
        assert_eq!(lines[2], "....");
        assert_eq!(lines[3], "Score: 2 | Length: 3 | Moves: 9 | Status: running");
    }

    #[test]
    fn text_frame_skips_offscreen_food() {
        let mut view = snapshot();
        view.food = Position::new(7, -2);
        let scene = Scene::from_snapshot(&view, CELL_SIZE).expect("valid cell size");
        let frame = TextFrame::render(&scene);
        assert!(!frame.contains(TextFrame::FOOD));
    }

    #[test]
    fn text_frame_places_glyphs_by_scaled_origin() {
        let coarse = Scene::from_snapshot(&snapshot(), CELL_SIZE).expect("valid cell size");
        let fine = Scene::from_snapshot(&snapshot(), 3.5).expect("valid cell size");
        assert_eq!(TextFrame::render(&coarse), TextFrame::render(&fine));

        let mut moved = coarse;
        moved.cells[0].origin = Vec2::new(0.0, 2.0) * CELL_SIZE;
        moved.hud = vec![String::from("Score: 9")];
        let lines: Vec<String> = TextFrame::render(&moved).lines().map(String::from).collect();

        assert_eq!(lines, vec!["....", "oo@.", "*...", "Score: 9"]);
    }
}
