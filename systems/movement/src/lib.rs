#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Turn-based movement system that walks figures toward the target.
//!
//! The simulator never mutates the world directly. Each turn it inspects
//! immutable world views, asks the frozen [`TraversalGraph`] for shortest
//! paths, rolls the injected die and answers with at most one
//! [`Command::MoveFigure`].

use palefiz_core::{CellCoord, CellState, Command, DieRoll, FigureId, StartError, StepError};
use palefiz_world::{query, TraversalGraph, World};
use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

/// Source of die rolls consumed by the simulator.
pub trait Die {
    /// Produces the next roll.
    fn roll(&mut self) -> DieRoll;
}

/// Fair six-sided die backed by a random number generator.
#[derive(Clone, Debug)]
pub struct RngDie<R> {
    rng: R,
}

impl<R: RngCore> RngDie<R> {
    /// Wraps the provided generator.
    #[must_use]
    pub const fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RngDie<ChaCha8Rng> {
    /// Creates a reproducible die seeded with `seed`.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self::new(ChaCha8Rng::seed_from_u64(seed))
    }
}

impl<R: RngCore> Die for RngDie<R> {
    fn roll(&mut self) -> DieRoll {
        let pips = self.rng.gen_range(1..=DieRoll::FACES);
        DieRoll::new(pips).unwrap_or(DieRoll::HIGHEST)
    }
}

/// Die replaying a fixed sequence of rolls, cycling once exhausted.
#[derive(Clone, Debug)]
pub struct ScriptedDie {
    rolls: Vec<DieRoll>,
    cursor: usize,
}

impl ScriptedDie {
    /// Creates a die that replays `rolls` in order.
    ///
    /// An empty script always rolls the highest face.
    #[must_use]
    pub fn new(rolls: Vec<DieRoll>) -> Self {
        Self { rolls, cursor: 0 }
    }
}

impl Die for ScriptedDie {
    fn roll(&mut self) -> DieRoll {
        let Some(roll) = self.rolls.get(self.cursor % self.rolls.len().max(1)).copied() else {
            return DieRoll::HIGHEST;
        };
        self.cursor = self.cursor.wrapping_add(1);
        roll
    }
}

/// Externally visible simulation status.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct SimulationState {
    active: bool,
    target: Option<CellCoord>,
    current_figure_index: usize,
}

impl SimulationState {
    /// Reports whether the simulation has started.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Target cell captured when the simulation started.
    #[must_use]
    pub const fn target(&self) -> Option<CellCoord> {
        self.target
    }

    /// Rotation index of the figure whose turn comes next.
    #[must_use]
    pub const fn current_figure_index(&self) -> usize {
        self.current_figure_index
    }
}

/// Result of a single figure's turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TurnOutcome {
    /// The figure advanced along its shortest path.
    Moved {
        /// Figure that moved.
        figure: FigureId,
        /// Cell the figure left.
        from: CellCoord,
        /// Cell the figure landed on.
        to: CellCoord,
        /// Roll that decided the distance travelled.
        roll: DieRoll,
    },
    /// The figure already stands on the target and stays put.
    AtTarget {
        /// Figure whose turn was skipped.
        figure: FigureId,
    },
    /// No path connects the figure with the target.
    Unreachable {
        /// Figure that could not move.
        figure: FigureId,
    },
    /// The landing cell is held by another figure, so the figure stays put.
    Obstructed {
        /// Figure that could not move.
        figure: FigureId,
        /// Cell the roll would have landed on.
        cell: CellCoord,
        /// Figure standing on that cell.
        occupant: FigureId,
        /// Roll that selected the landing cell.
        roll: DieRoll,
    },
}

impl TurnOutcome {
    /// Figure whose turn produced the outcome.
    #[must_use]
    pub const fn figure(&self) -> FigureId {
        match self {
            Self::Moved { figure, .. }
            | Self::AtTarget { figure }
            | Self::Unreachable { figure }
            | Self::Obstructed { figure, .. } => *figure,
        }
    }

    /// Reports whether the turn repositioned the figure.
    #[must_use]
    pub const fn moved(&self) -> bool {
        matches!(self, Self::Moved { .. })
    }
}

/// Round-robin movement simulator.
#[derive(Debug)]
pub struct MovementSimulator<D = RngDie<ChaCha8Rng>> {
    state: SimulationState,
    graph: Option<TraversalGraph>,
    die: D,
}

impl MovementSimulator<RngDie<ChaCha8Rng>> {
    /// Creates a simulator rolling a ChaCha-backed die seeded with `seed`.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self::new(RngDie::seeded(seed))
    }
}

impl<D: Die> MovementSimulator<D> {
    /// Creates an inactive simulator using the provided die.
    #[must_use]
    pub fn new(die: D) -> Self {
        Self {
            state: SimulationState::default(),
            graph: None,
            die,
        }
    }

    /// Current simulation status.
    #[must_use]
    pub const fn state(&self) -> &SimulationState {
        &self.state
    }

    /// Reports whether the simulation has started.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.state.active
    }

    /// Traversal graph frozen when the simulation started.
    #[must_use]
    pub const fn graph(&self) -> Option<&TraversalGraph> {
        self.graph.as_ref()
    }

    /// Validates the start preconditions and freezes the traversal graph.
    ///
    /// The caller is responsible for switching the world into simulation mode
    /// once this succeeds.
    pub fn start(&mut self, world: &World) -> Result<(), StartError> {
        if self.state.active {
            return Err(StartError::AlreadyActive);
        }

        let target = query::target(world).ok_or(StartError::MissingTarget)?;
        let figures = query::figure_view(world);
        if figures.is_empty() {
            return Err(StartError::NoFigures);
        }

        let graph = TraversalGraph::build(query::board(world));
        info!(
            %target,
            figures = figures.len(),
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "simulation started"
        );

        self.graph = Some(graph);
        self.state = SimulationState {
            active: true,
            target: Some(target),
            current_figure_index: 0,
        };
        Ok(())
    }

    /// Takes the turn of the current figure and advances the rotation.
    ///
    /// A successful move is emitted as a [`Command::MoveFigure`] into `out`.
    /// Every other outcome leaves `out` untouched.
    pub fn step(&mut self, world: &World, out: &mut Vec<Command>) -> Result<TurnOutcome, StepError> {
        let (Some(target), Some(graph)) = (self.state.target, self.graph.as_ref()) else {
            return Err(StepError::Inactive);
        };

        let figures = query::figure_view(world);
        let figure_count = figures.len();
        let index = self.state.current_figure_index % figure_count.max(1);
        let Some(figure) = figures.get(index).copied() else {
            return Err(StepError::Inactive);
        };
        self.state.current_figure_index = (index + 1) % figure_count;

        if figure.cell == target {
            debug!(figure = %figure.id, "figure already on target");
            return Ok(TurnOutcome::AtTarget { figure: figure.id });
        }

        let Some(path) = graph.shortest_paths(figure.cell, target).next() else {
            debug!(figure = %figure.id, cell = %figure.cell, "target unreachable");
            return Ok(TurnOutcome::Unreachable { figure: figure.id });
        };

        let roll = self.die.roll();
        let to = path[roll.path_index(path.len())];
        debug!(
            figure = %figure.id,
            %roll,
            path_len = path.len(),
            from = %figure.cell,
            %to,
            "rolled"
        );

        if let Ok(CellState::Occupied(occupant)) = query::state_at(world, to) {
            if occupant != figure.id {
                return Ok(TurnOutcome::Obstructed {
                    figure: figure.id,
                    cell: to,
                    occupant,
                    roll,
                });
            }
        }

        out.push(Command::MoveFigure {
            figure: figure.id,
            from: figure.cell,
            to,
        });
        Ok(TurnOutcome::Moved {
            figure: figure.id,
            from: figure.cell,
            to,
            roll,
        })
    }
}
