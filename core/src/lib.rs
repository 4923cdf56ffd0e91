#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Palefiz board game.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams, query immutable
//! snapshots, and respond exclusively with new command batches.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Canonical banner emitted when the game boots.
pub const WELCOME_BANNER: &str = "Welcome to Palefiz.";

/// Edge length of the square board used when no configuration is supplied.
pub const DEFAULT_GRID_SIZE: u32 = 10;

/// Largest edge length a board may be configured with.
pub const MAX_GRID_SIZE: u32 = 256;

/// Maximum number of figures that may be placed during setup.
pub const MAX_FIGURES: usize = 4;

/// Lives granted to every freshly placed figure.
pub const START_LIVES: Lives = Lives::new(10);

/// Describes the active phase of the game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayMode {
    /// Board editing phase: figures, blocked cells and the target are placed.
    Setup,
    /// Movement simulation phase: figures advance toward the target one turn at a time.
    Simulation,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Replaces the board with an empty square grid.
    ConfigureGrid {
        /// Number of cells along each edge of the board.
        size: u32,
        /// Upper bound on the number of figures that may be placed.
        max_figures: usize,
    },
    /// Forces a cell into the blocked or empty state.
    SetBlocked {
        /// Cell being edited.
        cell: CellCoord,
        /// Whether the cell should become impassable.
        blocked: bool,
    },
    /// Flips a cell between the empty and blocked states.
    ToggleBlocked {
        /// Cell being edited.
        cell: CellCoord,
    },
    /// Places a new figure onto an empty cell.
    PlaceFigure {
        /// Cell that receives the figure.
        cell: CellCoord,
    },
    /// Moves an already placed figure to another cell during setup.
    RelocateFigure {
        /// Figure being carried to a new cell.
        figure: FigureId,
        /// Cell the figure is dropped onto.
        to: CellCoord,
    },
    /// Designates the single target cell of the board.
    SetTarget {
        /// Cell that becomes the target.
        cell: CellCoord,
    },
    /// Requests that the world transition to the provided play mode.
    SetPlayMode {
        /// Mode the world should activate.
        mode: PlayMode,
    },
    /// Repositions a figure as the result of a simulation turn.
    MoveFigure {
        /// Figure taking its turn.
        figure: FigureId,
        /// Cell the figure occupies before the move.
        from: CellCoord,
        /// Cell the figure lands on.
        to: CellCoord,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Confirms that the board was replaced with an empty grid.
    GridConfigured {
        /// Number of cells along each edge of the new board.
        size: u32,
    },
    /// Confirms that a cell became impassable.
    CellBlocked {
        /// Cell that is now blocked.
        cell: CellCoord,
    },
    /// Confirms that a blocked cell became empty again.
    CellCleared {
        /// Cell that is now empty.
        cell: CellCoord,
    },
    /// Confirms that a new figure was placed onto the board.
    FigurePlaced {
        /// Identifier assigned to the figure.
        figure: FigureId,
        /// Cell the figure occupies.
        cell: CellCoord,
    },
    /// Confirms that a figure moved between two cells.
    FigureMoved {
        /// Identifier of the figure that moved.
        figure: FigureId,
        /// Cell the figure occupied before moving.
        from: CellCoord,
        /// Cell the figure occupies after moving.
        to: CellCoord,
    },
    /// Confirms that the target cell was designated.
    TargetSet {
        /// Cell that became the target.
        cell: CellCoord,
    },
    /// Announces that the world entered a new play mode.
    PlayModeChanged {
        /// Mode that became active after processing commands.
        mode: PlayMode,
    },
    /// Reports that a command was rejected and left the world unchanged.
    CommandRejected {
        /// Specific reason the command failed.
        reason: Rejection,
    },
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.column().abs_diff(other.column()) + self.row().abs_diff(other.row())
    }

    /// Reports whether the two cells share an edge.
    #[must_use]
    pub fn is_adjacent(self, other: CellCoord) -> bool {
        self.manhattan_distance(other) == 1
    }
}

impl fmt::Display for CellCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.column, self.row)
    }
}

/// Unique identifier assigned to a figure, starting at one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FigureId(u32);

impl FigureId {
    /// Creates a new figure identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for FigureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Remaining lives of a figure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Lives(u32);

impl Lives {
    /// Creates a new lives counter.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the number of remaining lives.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// State held by a single board cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellState {
    /// Free cell that figures may enter.
    Empty,
    /// Impassable cell excluded from the traversal graph.
    Blocked,
    /// Destination every figure travels toward.
    Target,
    /// Cell currently holding the identified figure.
    Occupied(FigureId),
}

impl CellState {
    /// Reports whether the cell is impassable.
    #[must_use]
    pub const fn is_blocked(&self) -> bool {
        matches!(self, Self::Blocked)
    }

    /// Returns the figure standing on the cell, if any.
    #[must_use]
    pub const fn occupant(&self) -> Option<FigureId> {
        match self {
            Self::Occupied(figure) => Some(*figure),
            _ => None,
        }
    }

    /// Reports whether a figure may step onto the cell.
    #[must_use]
    pub const fn is_enterable(&self) -> bool {
        matches!(self, Self::Empty | Self::Target)
    }
}

impl fmt::Display for CellState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "empty"),
            Self::Blocked => write!(f, "blocked"),
            Self::Target => write!(f, "target"),
            Self::Occupied(figure) => write!(f, "occupied by figure {figure}"),
        }
    }
}

/// Outcome of a single die roll, always within `1..=DieRoll::FACES`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DieRoll(u8);

impl DieRoll {
    /// Number of faces on the die.
    pub const FACES: u8 = 6;

    /// Highest roll the die can produce.
    pub const HIGHEST: Self = Self(Self::FACES);

    /// Creates a roll, rejecting values outside `1..=FACES`.
    #[must_use]
    pub const fn new(value: u8) -> Option<Self> {
        if value >= 1 && value <= Self::FACES {
            Some(Self(value))
        } else {
            None
        }
    }

    /// Number of pips shown by the roll.
    #[must_use]
    pub const fn get(&self) -> u8 {
        self.0
    }

    /// Index reached along a path of `path_len` cells starting at index zero.
    ///
    /// Rolls that exceed the remaining distance are clamped so the figure lands
    /// exactly on the last cell instead of overshooting it.
    #[must_use]
    pub fn path_index(self, path_len: usize) -> usize {
        path_len.saturating_sub(1).min(usize::from(self.0))
    }
}

impl fmt::Display for DieRoll {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Immutable representation of a single figure's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FigureSnapshot {
    /// Unique identifier assigned to the figure.
    pub id: FigureId,
    /// Remaining lives of the figure.
    pub lives: Lives,
    /// Grid cell currently occupied by the figure.
    pub cell: CellCoord,
}

impl fmt::Display for FigureSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} lives: {} position: {}",
            self.id,
            self.lives.get(),
            self.cell
        )
    }
}

/// Read-only snapshot describing all figures on the board.
#[derive(Clone, Debug, Default)]
pub struct FigureView {
    snapshots: Vec<FigureSnapshot>,
}

impl FigureView {
    /// Creates a new figure view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<FigureSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured figure snapshots in id order.
    pub fn iter(&self) -> impl Iterator<Item = &FigureSnapshot> {
        self.snapshots.iter()
    }

    /// Number of figures captured by the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view contains no figures.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Figure at the provided rotation index, if any.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&FigureSnapshot> {
        self.snapshots.get(index)
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<FigureSnapshot> {
        self.snapshots
    }
}

/// Edit attempted on a cell, reported when the transition is invalid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellAction {
    /// Marking the cell as impassable.
    Block,
    /// Clearing a blocked cell.
    Unblock,
    /// Placing a new figure.
    Place,
    /// Lifting a figure off the cell.
    Leave,
    /// Moving a figure onto the cell.
    Enter,
    /// Designating the cell as target.
    Designate,
}

impl fmt::Display for CellAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Block => "block",
            Self::Unblock => "unblock",
            Self::Place => "place a figure on",
            Self::Leave => "leave",
            Self::Enter => "enter",
            Self::Designate => "designate as target",
        };
        f.write_str(label)
    }
}

/// Reasons a board edit may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
pub enum GridError {
    /// The coordinates lie outside the board.
    #[error("cell {cell} lies outside the {size}x{size} board")]
    OutOfBounds {
        /// Offending coordinates.
        cell: CellCoord,
        /// Edge length of the board.
        size: u32,
    },
    /// The requested board size is zero or exceeds the supported maximum.
    #[error("board size {size} must be between 1 and {max}")]
    InvalidSize {
        /// Requested edge length.
        size: u32,
        /// Largest supported edge length.
        max: u32,
    },
    /// The requested edit violates the cell-state invariants.
    #[error("cannot {action} cell {cell}: it is {state}")]
    InvalidTransition {
        /// Cell targeted by the edit.
        cell: CellCoord,
        /// State the cell held when the edit was attempted.
        state: CellState,
        /// Edit that was attempted.
        action: CellAction,
    },
    /// The board already holds the maximum number of figures.
    #[error("no more than {limit} figures may be placed")]
    FigureLimitReached {
        /// Configured figure limit.
        limit: usize,
    },
    /// A target was already designated and cannot be moved.
    #[error("target already set at {existing}")]
    TargetAlreadySet {
        /// Cell holding the existing target.
        existing: CellCoord,
    },
    /// No figure with the provided identifier exists.
    #[error("figure {figure} does not exist")]
    UnknownFigure {
        /// Identifier that could not be resolved.
        figure: FigureId,
    },
}

/// Reasons the world rejected a command.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
pub enum Rejection {
    /// The board refused the edit.
    #[error(transparent)]
    Grid(#[from] GridError),
    /// The command is not permitted in the active play mode.
    #[error("command not permitted in {mode:?} mode")]
    InvalidMode {
        /// Mode that was active when the command arrived.
        mode: PlayMode,
    },
}

/// Preconditions that prevent the simulation from starting.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
pub enum StartError {
    /// The simulation is already running.
    #[error("simulation already running")]
    AlreadyActive,
    /// No target cell was designated.
    #[error("a target must be set before the simulation can start")]
    MissingTarget,
    /// No figure was placed.
    #[error("at least one figure must be placed before the simulation can start")]
    NoFigures,
}

/// Reasons a simulation turn could not be taken.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
pub enum StepError {
    /// The simulation has not been started.
    #[error("simulation has not been started")]
    Inactive,
    /// The world refused the move chosen for the turn.
    #[error("move rejected: {reason}")]
    MoveRejected {
        /// Reason reported by the world.
        reason: Rejection,
    },
}
