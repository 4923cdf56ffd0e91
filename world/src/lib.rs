#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Palefiz.

mod board;
mod traversal;

pub use board::Board;
pub use traversal::{ShortestPaths, TraversalGraph};

use palefiz_core::{CellCoord, Command, Event, PlayMode, Rejection, WELCOME_BANNER};
use tracing::{debug, info, warn};

/// Represents the authoritative Palefiz world state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    board: Board,
    play_mode: PlayMode,
}

impl World {
    /// Creates a new world holding an empty default-sized board in setup mode.
    #[must_use]
    pub fn new() -> Self {
        Self {
            banner: WELCOME_BANNER,
            board: Board::default(),
            play_mode: PlayMode::Setup,
        }
    }

    fn require_mode(&self, mode: PlayMode) -> Result<(), Rejection> {
        if self.play_mode == mode {
            Ok(())
        } else {
            Err(Rejection::InvalidMode {
                mode: self.play_mode,
            })
        }
    }

    fn execute(&mut self, command: Command, out_events: &mut Vec<Event>) -> Result<(), Rejection> {
        match command {
            Command::ConfigureGrid { size, max_figures } => {
                self.require_mode(PlayMode::Setup)?;
                self.board = Board::new(size, max_figures)?;
                out_events.push(Event::GridConfigured { size });
            }
            Command::SetBlocked { cell, blocked } => {
                self.require_mode(PlayMode::Setup)?;
                let before = self.board.state_at(cell)?;
                self.board.set_blocked(cell, blocked)?;
                if before.is_blocked() != blocked {
                    out_events.push(blocked_event(cell, blocked));
                }
            }
            Command::ToggleBlocked { cell } => {
                self.require_mode(PlayMode::Setup)?;
                let blocked = self.board.toggle_blocked(cell)?;
                out_events.push(blocked_event(cell, blocked));
            }
            Command::PlaceFigure { cell } => {
                self.require_mode(PlayMode::Setup)?;
                let figure = self.board.place_figure(cell)?;
                out_events.push(Event::FigurePlaced { figure, cell });
            }
            Command::RelocateFigure { figure, to } => {
                self.require_mode(PlayMode::Setup)?;
                let from = self.board.figure_cell(figure)?;
                self.board.move_figure(figure, from, to)?;
                if from != to {
                    out_events.push(Event::FigureMoved { figure, from, to });
                }
            }
            Command::SetTarget { cell } => {
                self.require_mode(PlayMode::Setup)?;
                self.board.set_target(cell)?;
                out_events.push(Event::TargetSet { cell });
            }
            Command::SetPlayMode { mode } => {
                if mode == self.play_mode {
                    return Ok(());
                }
                self.require_mode(PlayMode::Setup)?;
                self.play_mode = mode;
                info!(?mode, "play mode changed");
                out_events.push(Event::PlayModeChanged { mode });
            }
            Command::MoveFigure { figure, from, to } => {
                self.require_mode(PlayMode::Simulation)?;
                self.board.move_figure(figure, from, to)?;
                if from != to {
                    out_events.push(Event::FigureMoved { figure, from, to });
                }
            }
        }

        Ok(())
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// Rejected commands leave the world unchanged and are reported through
/// [`Event::CommandRejected`].
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    debug!(?command, "applying command");
    if let Err(reason) = world.execute(command, out_events) {
        warn!(%reason, "command rejected");
        out_events.push(Event::CommandRejected { reason });
    }
}

fn blocked_event(cell: CellCoord, blocked: bool) -> Event {
    if blocked {
        Event::CellBlocked { cell }
    } else {
        Event::CellCleared { cell }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use palefiz_core::{CellCoord, CellState, FigureSnapshot, FigureView, GridError, PlayMode};

    use super::{Board, World};

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Provides read-only access to the board.
    #[must_use]
    pub fn board(world: &World) -> &Board {
        &world.board
    }

    /// Reports the active play mode.
    #[must_use]
    pub fn play_mode(world: &World) -> PlayMode {
        world.play_mode
    }

    /// Cell designated as the target, if any.
    #[must_use]
    pub fn target(world: &World) -> Option<CellCoord> {
        world.board.target()
    }

    /// State of the provided cell.
    pub fn state_at(world: &World, cell: CellCoord) -> Result<CellState, GridError> {
        world.board.state_at(cell)
    }

    /// Captures a read-only view of the figures in rotation order.
    #[must_use]
    pub fn figure_view(world: &World) -> FigureView {
        FigureView::from_snapshots(world.board.figures())
    }

    /// Snapshot of the figure standing on the provided cell, if any.
    #[must_use]
    pub fn figure_at(world: &World, cell: CellCoord) -> Option<FigureSnapshot> {
        let occupant = world.board.state_at(cell).ok()?.occupant()?;
        world
            .board
            .figures()
            .into_iter()
            .find(|figure| figure.id == occupant)
    }
}
