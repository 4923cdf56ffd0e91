use palefiz_core::{CellState, Event};
use palefiz_session::SessionReport;
use palefiz_system_movement::TurnOutcome;
use palefiz_world::Board;

const EMPTY_GLYPH: char = '.';
const BLOCKED_GLYPH: char = '#';
const TARGET_GLYPH: char = 'X';
const CROWDED_GLYPH: char = '@';

/// Renders the board as text, one line per row from top to bottom.
pub(crate) fn board(board: &Board) -> String {
    let width = usize::try_from(board.size()).unwrap_or_default();
    let mut text = String::with_capacity((width * 2 + 1) * width);
    let mut column = 0;

    for (_, state) in board.cells() {
        if column > 0 {
            text.push(' ');
        }
        text.push(glyph(state));
        column += 1;
        if column == width {
            text.push('\n');
            column = 0;
        }
    }

    text
}

fn glyph(state: CellState) -> char {
    match state {
        CellState::Empty => EMPTY_GLYPH,
        CellState::Blocked => BLOCKED_GLYPH,
        CellState::Target => TARGET_GLYPH,
        CellState::Occupied(figure) => char::from_digit(figure.get(), 10).unwrap_or(CROWDED_GLYPH),
    }
}

/// Describes a world event for the player.
pub(crate) fn event(event: &Event) -> String {
    match event {
        Event::GridConfigured { size } => format!("board is {size}x{size}"),
        Event::CellBlocked { cell } => format!("blocked {cell}"),
        Event::CellCleared { cell } => format!("cleared {cell}"),
        Event::FigurePlaced { figure, cell } => format!("placed figure {figure} at {cell}"),
        Event::FigureMoved { figure, from, to } => {
            format!("figure {figure} moved from {from} to {to}")
        }
        Event::TargetSet { cell } => format!("target set at {cell}"),
        Event::PlayModeChanged { mode } => format!("entered {mode:?} mode"),
        Event::CommandRejected { reason } => format!("rejected: {reason}"),
    }
}

/// Describes the outcome of a simulation turn.
pub(crate) fn turn(outcome: &TurnOutcome) -> String {
    match outcome {
        TurnOutcome::Moved {
            figure,
            from,
            to,
            roll,
        } => format!("figure {figure} rolled {roll} and moved from {from} to {to}"),
        TurnOutcome::AtTarget { figure } => format!("figure {figure} is already on the target"),
        TurnOutcome::Unreachable { figure } => format!("figure {figure} cannot reach the target"),
        TurnOutcome::Obstructed {
            figure,
            cell,
            occupant,
            roll,
        } => format!("figure {figure} rolled {roll} but {cell} is held by figure {occupant}"),
    }
}

/// Describes the result of an advance signal.
pub(crate) fn report(report: &SessionReport) -> String {
    match report {
        SessionReport::Started { figures } => {
            format!("simulation started with {figures} figure(s)")
        }
        SessionReport::Turn(outcome) => turn(outcome),
        SessionReport::Rejected(error) => format!("cannot advance: {error}"),
    }
}
