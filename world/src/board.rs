//! Authoritative cell-state matrix and figure registry.

use palefiz_core::{
    CellAction, CellCoord, CellState, FigureId, FigureSnapshot, GridError, Lives,
    DEFAULT_GRID_SIZE, MAX_FIGURES, MAX_GRID_SIZE, START_LIVES,
};

/// Square grid of cells together with the figures standing on it.
///
/// Every failed edit leaves the board untouched, so callers can surface the
/// error without having to roll anything back.
#[derive(Clone, Debug)]
pub struct Board {
    size: u32,
    cells: Vec<CellState>,
    target: Option<CellCoord>,
    figures: Vec<Figure>,
    max_figures: usize,
}

#[derive(Clone, Copy, Debug)]
struct Figure {
    id: FigureId,
    lives: Lives,
    cell: CellCoord,
}

impl Default for Board {
    fn default() -> Self {
        Self {
            size: DEFAULT_GRID_SIZE,
            cells: (0..DEFAULT_GRID_SIZE * DEFAULT_GRID_SIZE)
                .map(|_| CellState::Empty)
                .collect(),
            target: None,
            figures: Vec::new(),
            max_figures: MAX_FIGURES,
        }
    }
}

impl Board {
    /// Creates an empty `size` x `size` board accepting up to `max_figures` figures.
    ///
    /// Sizes outside `1..=MAX_GRID_SIZE` are rejected before any cell is allocated.
    pub fn new(size: u32, max_figures: usize) -> Result<Self, GridError> {
        let invalid = GridError::InvalidSize {
            size,
            max: MAX_GRID_SIZE,
        };
        if size == 0 || size > MAX_GRID_SIZE {
            return Err(invalid);
        }

        let width = usize::try_from(size).map_err(|_| invalid)?;
        let capacity = width.checked_mul(width).ok_or(invalid)?;
        Ok(Self {
            size,
            cells: vec![CellState::Empty; capacity],
            target: None,
            figures: Vec::new(),
            max_figures,
        })
    }

    /// Edge length of the board.
    #[must_use]
    pub const fn size(&self) -> u32 {
        self.size
    }

    /// Maximum number of figures the board accepts.
    #[must_use]
    pub const fn max_figures(&self) -> usize {
        self.max_figures
    }

    /// State of the provided cell.
    pub fn state_at(&self, cell: CellCoord) -> Result<CellState, GridError> {
        let index = self.index(cell)?;
        Ok(self.cells[index])
    }

    /// Reports whether the cell lies on the board.
    #[must_use]
    pub fn contains(&self, cell: CellCoord) -> bool {
        cell.column() < self.size && cell.row() < self.size
    }

    /// Cell designated as the target, if any.
    #[must_use]
    pub const fn target(&self) -> Option<CellCoord> {
        self.target
    }

    /// Forces the cell into the blocked or empty state.
    ///
    /// Requesting the state the cell already holds succeeds without changes.
    pub fn set_blocked(&mut self, cell: CellCoord, blocked: bool) -> Result<(), GridError> {
        let index = self.index(cell)?;
        let state = self.cells[index];
        match (state, blocked) {
            (CellState::Empty, true) => self.cells[index] = CellState::Blocked,
            (CellState::Blocked, false) => self.cells[index] = CellState::Empty,
            (CellState::Empty, false) | (CellState::Blocked, true) => {}
            (state, blocked) => {
                return Err(GridError::InvalidTransition {
                    cell,
                    state,
                    action: if blocked {
                        CellAction::Block
                    } else {
                        CellAction::Unblock
                    },
                });
            }
        }
        Ok(())
    }

    /// Flips the cell between empty and blocked, returning whether it is now blocked.
    pub fn toggle_blocked(&mut self, cell: CellCoord) -> Result<bool, GridError> {
        let blocked = !self.state_at(cell)?.is_blocked();
        self.set_blocked(cell, blocked)?;
        Ok(blocked)
    }

    /// Places a new figure onto an empty cell and returns its identifier.
    pub fn place_figure(&mut self, cell: CellCoord) -> Result<FigureId, GridError> {
        let index = self.index(cell)?;
        let state = self.cells[index];
        if state != CellState::Empty {
            return Err(GridError::InvalidTransition {
                cell,
                state,
                action: CellAction::Place,
            });
        }

        if self.figures.len() >= self.max_figures {
            return Err(GridError::FigureLimitReached {
                limit: self.max_figures,
            });
        }

        let next = u32::try_from(self.figures.len() + 1).map_err(|_| {
            GridError::FigureLimitReached {
                limit: self.max_figures,
            }
        })?;
        let id = FigureId::new(next);
        self.figures.push(Figure {
            id,
            lives: START_LIVES,
            cell,
        });
        self.cells[index] = CellState::Occupied(id);
        Ok(id)
    }

    /// Moves `figure` from `from` onto `to`.
    ///
    /// The destination must be empty or the target. Leaving the target cell
    /// restores its target marking.
    pub fn move_figure(
        &mut self,
        figure: FigureId,
        from: CellCoord,
        to: CellCoord,
    ) -> Result<(), GridError> {
        let from_index = self.index(from)?;
        let to_index = self.index(to)?;
        let slot = self.figure_slot(figure)?;

        let from_state = self.cells[from_index];
        if from_state != CellState::Occupied(figure) {
            return Err(GridError::InvalidTransition {
                cell: from,
                state: from_state,
                action: CellAction::Leave,
            });
        }

        if from == to {
            return Ok(());
        }

        let to_state = self.cells[to_index];
        if !to_state.is_enterable() {
            return Err(GridError::InvalidTransition {
                cell: to,
                state: to_state,
                action: CellAction::Enter,
            });
        }

        self.cells[from_index] = if self.target == Some(from) {
            CellState::Target
        } else {
            CellState::Empty
        };
        self.cells[to_index] = CellState::Occupied(figure);
        self.figures[slot].cell = to;
        Ok(())
    }

    /// Designates the target cell. The target can only be set once.
    pub fn set_target(&mut self, cell: CellCoord) -> Result<(), GridError> {
        let index = self.index(cell)?;
        if let Some(existing) = self.target {
            return Err(GridError::TargetAlreadySet { existing });
        }

        let state = self.cells[index];
        if state != CellState::Empty {
            return Err(GridError::InvalidTransition {
                cell,
                state,
                action: CellAction::Designate,
            });
        }

        self.cells[index] = CellState::Target;
        self.target = Some(cell);
        Ok(())
    }

    /// Cell currently occupied by the figure.
    pub fn figure_cell(&self, figure: FigureId) -> Result<CellCoord, GridError> {
        let slot = self.figure_slot(figure)?;
        Ok(self.figures[slot].cell)
    }

    /// Number of figures placed so far.
    #[must_use]
    pub fn figure_count(&self) -> usize {
        self.figures.len()
    }

    /// Snapshots of every figure in creation order.
    #[must_use]
    pub fn figures(&self) -> Vec<FigureSnapshot> {
        self.figures
            .iter()
            .map(|figure| FigureSnapshot {
                id: figure.id,
                lives: figure.lives,
                cell: figure.cell,
            })
            .collect()
    }

    /// Iterator over every cell and its state in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (CellCoord, CellState)> + '_ {
        let size = self.size;
        (0..size)
            .flat_map(move |row| (0..size).map(move |column| CellCoord::new(column, row)))
            .zip(self.cells.iter().copied())
    }

    fn figure_slot(&self, figure: FigureId) -> Result<usize, GridError> {
        self.figures
            .iter()
            .position(|candidate| candidate.id == figure)
            .ok_or(GridError::UnknownFigure { figure })
    }

    fn index(&self, cell: CellCoord) -> Result<usize, GridError> {
        let out_of_bounds = GridError::OutOfBounds {
            cell,
            size: self.size,
        };
        if !self.contains(cell) {
            return Err(out_of_bounds);
        }

        let row = usize::try_from(cell.row()).map_err(|_| out_of_bounds)?;
        let column = usize::try_from(cell.column()).map_err(|_| out_of_bounds)?;
        let width = usize::try_from(self.size).map_err(|_| out_of_bounds)?;
        Ok(row * width + column)
    }
}
