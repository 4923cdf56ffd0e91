#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure setup-phase system translating board clicks into edit commands.

use std::fmt;

use palefiz_core::{CellCoord, CellState, Command, Event, FigureId, PlayMode};

/// Effect a click has on the board while the game is in setup.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum EditMode {
    /// Clicks place new figures or pick up and drop existing ones.
    #[default]
    Place,
    /// Clicks flip cells between empty and blocked.
    Block,
}

impl EditMode {
    /// Mode reached by toggling away from the current one.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Place => Self::Block,
            Self::Block => Self::Place,
        }
    }
}

impl fmt::Display for EditMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Place => f.write_str("placement"),
            Self::Block => f.write_str("blocking"),
        }
    }
}

/// Input snapshot distilled from a single adapter signal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct BuilderInput {
    /// Cell the player clicked, if any.
    pub click: Option<CellCoord>,
    /// Indicates whether the player switched between placing and blocking.
    pub toggle_block_mode: bool,
    /// Cell the player designated as target, if any.
    pub designate_target: Option<CellCoord>,
}

impl BuilderInput {
    /// Creates a new input descriptor with explicit field values.
    #[must_use]
    pub const fn new(
        click: Option<CellCoord>,
        toggle_block_mode: bool,
        designate_target: Option<CellCoord>,
    ) -> Self {
        Self {
            click,
            toggle_block_mode,
            designate_target,
        }
    }

    /// Input describing a single click on `cell`.
    #[must_use]
    pub const fn click(cell: CellCoord) -> Self {
        Self::new(Some(cell), false, None)
    }
}

/// Setup-phase system that turns clicks into board edit commands.
///
/// A click on a figure while placing picks it up; the next click drops it on
/// another free cell. The figure stays on its original cell until dropped.
#[derive(Clone, Debug)]
pub struct Builder {
    play_mode: PlayMode,
    edit_mode: EditMode,
    carried: Option<FigureId>,
}

impl Default for Builder {
    fn default() -> Self {
        Self::new()
    }
}

impl Builder {
    /// Creates a new builder system instance in placement mode.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            play_mode: PlayMode::Setup,
            edit_mode: EditMode::Place,
            carried: None,
        }
    }

    /// Active edit mode.
    #[must_use]
    pub const fn edit_mode(&self) -> EditMode {
        self.edit_mode
    }

    /// Figure picked up and awaiting a drop cell, if any.
    #[must_use]
    pub const fn carried(&self) -> Option<FigureId> {
        self.carried
    }

    /// Consumes world events and adapter-derived input to emit edit commands.
    ///
    /// The `state_at` closure should mirror the semantics of the world's
    /// `query::state_at` helper, returning `None` for cells off the board.
    pub fn handle<F>(
        &mut self,
        events: &[Event],
        input: BuilderInput,
        mut state_at: F,
        out: &mut Vec<Command>,
    ) where
        F: FnMut(CellCoord) -> Option<CellState>,
    {
        for event in events {
            match event {
                Event::PlayModeChanged { mode } => {
                    self.play_mode = *mode;
                    if *mode == PlayMode::Simulation {
                        self.carried = None;
                    }
                }
                Event::GridConfigured { .. } => self.carried = None,
                _ => {}
            }
        }

        if self.play_mode != PlayMode::Setup {
            return;
        }

        if input.toggle_block_mode {
            self.edit_mode = self.edit_mode.toggled();
        }

        if let Some(cell) = input.designate_target {
            out.push(Command::SetTarget { cell });
        }

        let Some(cell) = input.click else {
            return;
        };
        let Some(state) = state_at(cell) else {
            return;
        };

        match self.edit_mode {
            EditMode::Block => {
                if matches!(state, CellState::Empty | CellState::Blocked) {
                    out.push(Command::ToggleBlocked { cell });
                }
            }
            EditMode::Place => self.handle_place_click(cell, state, out),
        }
    }

    fn handle_place_click(&mut self, cell: CellCoord, state: CellState, out: &mut Vec<Command>) {
        match (self.carried, state) {
            (Some(figure), CellState::Occupied(occupant)) if occupant == figure => {
                self.carried = None;
            }
            (Some(figure), state) if state.is_enterable() => {
                self.carried = None;
                out.push(Command::RelocateFigure { figure, to: cell });
            }
            (Some(_), _) => {}
            (None, CellState::Occupied(figure)) => self.carried = Some(figure),
            (None, CellState::Empty) => out.push(Command::PlaceFigure { cell }),
            (None, _) => {}
        }
    }
}
