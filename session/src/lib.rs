#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Game session orchestrating the world, the builder and the movement simulator.
//!
//! The session owns the authoritative [`World`] and pumps commands produced by
//! the systems into it. Adapters only ever talk to [`GameSession`]: clicks and
//! target designations during setup, and a single `advance` signal that first
//! starts the simulation and then runs one figure's turn per call.

mod config;

pub use config::{ConfigError, SessionConfig, DEFAULT_RNG_SEED};

use palefiz_core::{
    CellCoord, Command, Event, FigureId, FigureSnapshot, PlayMode, StartError, StepError,
};
use palefiz_system_builder::{Builder, BuilderInput, EditMode};
use palefiz_system_movement::{Die, MovementSimulator, RngDie, SimulationState, TurnOutcome};
use palefiz_world::{self as world, query, World};
use rand_chacha::ChaCha8Rng;
use thiserror::Error;
use tracing::{debug, info};

/// Reasons an `advance` signal could not make progress.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum SessionError {
    /// The simulation could not start.
    #[error(transparent)]
    Start(#[from] StartError),
    /// The simulation could not take a turn.
    #[error(transparent)]
    Step(#[from] StepError),
}

/// Result of a single `advance` signal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionReport {
    /// The simulation started and the board is now frozen.
    Started {
        /// Number of figures taking part in the rotation.
        figures: usize,
    },
    /// A figure took its turn.
    Turn(TurnOutcome),
    /// The signal was refused and the session is unchanged.
    Rejected(SessionError),
}

/// Interactive game session driven by discrete adapter signals.
#[derive(Debug)]
pub struct GameSession<D = RngDie<ChaCha8Rng>> {
    config: SessionConfig,
    world: World,
    builder: Builder,
    simulator: MovementSimulator<D>,
    last_turn: Option<FigureId>,
}

impl GameSession<RngDie<ChaCha8Rng>> {
    /// Opens a session rolling a die seeded from the configuration.
    pub fn new(config: SessionConfig) -> Result<Self, ConfigError> {
        Self::with_die(config, RngDie::seeded(config.rng_seed))
    }
}

impl<D: Die> GameSession<D> {
    /// Opens a session rolling the provided die.
    pub fn with_die(config: SessionConfig, die: D) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut session = Self {
            config,
            world: World::new(),
            builder: Builder::new(),
            simulator: MovementSimulator::new(die),
            last_turn: None,
        };
        let _ = session.apply_all(vec![Command::ConfigureGrid {
            size: config.grid_size,
            max_figures: config.max_figures,
        }]);
        info!(
            size = config.grid_size,
            max_figures = config.max_figures,
            "session opened"
        );
        Ok(session)
    }

    /// Configuration the session was opened with.
    #[must_use]
    pub const fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Read-only access to the authoritative world.
    #[must_use]
    pub const fn world(&self) -> &World {
        &self.world
    }

    /// Edit mode applied to setup clicks.
    #[must_use]
    pub const fn edit_mode(&self) -> EditMode {
        self.builder.edit_mode()
    }

    /// Figure picked up during setup and awaiting a drop cell, if any.
    #[must_use]
    pub const fn carried_figure(&self) -> Option<FigureId> {
        self.builder.carried()
    }

    /// Status of the movement simulation.
    #[must_use]
    pub const fn simulation(&self) -> &SimulationState {
        self.simulator.state()
    }

    /// Reports whether the simulation has started.
    #[must_use]
    pub const fn is_simulating(&self) -> bool {
        self.simulator.is_active()
    }

    /// Switches setup clicks between placing figures and blocking cells.
    pub fn toggle_block_mode(&mut self) -> Vec<Event> {
        self.edit(BuilderInput::new(None, true, None))
    }

    /// Handles a click on `cell` according to the active edit mode.
    ///
    /// Clicks are ignored once the simulation has started.
    pub fn click(&mut self, cell: CellCoord) -> Vec<Event> {
        self.edit(BuilderInput::click(cell))
    }

    /// Designates `cell` as the target.
    pub fn set_target(&mut self, cell: CellCoord) -> Vec<Event> {
        self.edit(BuilderInput::new(None, false, Some(cell)))
    }

    /// Freezes the board and starts the movement simulation.
    pub fn start(&mut self) -> Result<Vec<Event>, StartError> {
        self.simulator.start(&self.world)?;
        Ok(self.apply_all(vec![Command::SetPlayMode {
            mode: PlayMode::Simulation,
        }]))
    }

    /// Runs the turn of the next figure in the rotation.
    ///
    /// The turn only reports a move once the world has applied it; a refused
    /// move surfaces as [`StepError::MoveRejected`] and the figure stays put.
    pub fn step(&mut self) -> Result<TurnOutcome, StepError> {
        let mut commands = Vec::new();
        let outcome = self.simulator.step(&self.world, &mut commands)?;
        self.last_turn = Some(outcome.figure());
        let events = self.apply_all(commands);
        debug!(?outcome, events = events.len(), "turn finished");
        confirm_turn(outcome, &events)
    }

    /// Starts the simulation on the first call and runs one turn on every
    /// later call.
    pub fn advance(&mut self) -> SessionReport {
        if !self.simulator.is_active() {
            return match self.start() {
                Ok(_) => SessionReport::Started {
                    figures: query::figure_view(&self.world).len(),
                },
                Err(error) => {
                    info!(%error, "simulation not started");
                    SessionReport::Rejected(error.into())
                }
            };
        }

        match self.step() {
            Ok(outcome) => SessionReport::Turn(outcome),
            Err(error) => SessionReport::Rejected(error.into()),
        }
    }

    /// Snapshot of the figure that took the most recent turn.
    #[must_use]
    pub fn current_figure(&self) -> Option<FigureSnapshot> {
        let figure = self.last_turn?;
        query::figure_view(&self.world)
            .iter()
            .find(|snapshot| snapshot.id == figure)
            .copied()
    }

    /// One-line description of the session suitable for a status bar.
    #[must_use]
    pub fn status_line(&self) -> String {
        if !self.simulator.is_active() {
            let mut line = format!("Setup mode ({}).", self.builder.edit_mode());
            if let Some(figure) = self.builder.carried() {
                line.push_str(&format!(" Carrying figure {figure}."));
            }
            return line;
        }

        match self.current_figure() {
            Some(figure) => format!("Simulation mode. Current figure: {figure}"),
            None => "Simulation mode.".to_owned(),
        }
    }

    fn edit(&mut self, input: BuilderInput) -> Vec<Event> {
        let mut commands = Vec::new();
        let world = &self.world;
        self.builder.handle(
            &[],
            input,
            |cell| query::state_at(world, cell).ok(),
            &mut commands,
        );
        self.apply_all(commands)
    }

    fn apply_all(&mut self, commands: Vec<Command>) -> Vec<Event> {
        let mut events = Vec::new();
        for command in commands {
            world::apply(&mut self.world, command, &mut events);
        }

        // Without input the builder only tracks play mode changes.
        let mut ignored = Vec::new();
        let world = &self.world;
        self.builder.handle(
            &events,
            BuilderInput::default(),
            |cell| query::state_at(world, cell).ok(),
            &mut ignored,
        );
        events
    }
}

fn confirm_turn(outcome: TurnOutcome, events: &[Event]) -> Result<TurnOutcome, StepError> {
    let rejection = events.iter().find_map(|event| match event {
        Event::CommandRejected { reason } => Some(*reason),
        _ => None,
    });
    match rejection {
        Some(reason) => Err(StepError::MoveRejected { reason }),
        None => Ok(outcome),
    }
}
