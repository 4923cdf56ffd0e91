use palefiz_core::CellCoord;
use thiserror::Error;

/// Prefix marking a comment line in scripts.
const COMMENT_PREFIX: char = '#';

/// Single instruction read from the player or a script file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Instruction {
    /// Switches clicks between placing figures and blocking cells.
    Block,
    /// Clicks the provided cell.
    Click(CellCoord),
    /// Designates the provided cell as the target.
    Target(CellCoord),
    /// Starts the simulation or runs the next turn.
    Advance,
    /// Starts the simulation.
    Start,
    /// Runs the next turn.
    Step,
    /// Prints the board and the status line.
    Show,
    /// Ends the session.
    Quit,
}

/// Errors raised while parsing an instruction line.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub(crate) enum ScriptError {
    /// The first word is not a known instruction.
    #[error("unknown instruction '{0}'")]
    UnknownInstruction(String),
    /// The instruction requires a column and a row.
    #[error("'{0}' expects a column and a row")]
    MissingCoordinate(&'static str),
    /// A coordinate could not be parsed as a non-negative integer.
    #[error("could not parse coordinate '{0}'")]
    InvalidCoordinate(String),
    /// The line carries more words than the instruction accepts.
    #[error("unexpected argument '{0}'")]
    UnexpectedArgument(String),
}

/// Parses a single line, returning `None` for blank lines and comments.
pub(crate) fn parse_line(line: &str) -> Result<Option<Instruction>, ScriptError> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with(COMMENT_PREFIX) {
        return Ok(None);
    }

    let mut words = trimmed.split_whitespace();
    let Some(keyword) = words.next() else {
        return Ok(None);
    };

    let instruction = match keyword.to_ascii_lowercase().as_str() {
        "block" => Instruction::Block,
        "click" => Instruction::Click(parse_cell("click", &mut words)?),
        "target" => Instruction::Target(parse_cell("target", &mut words)?),
        "advance" => Instruction::Advance,
        "start" => Instruction::Start,
        "step" => Instruction::Step,
        "show" => Instruction::Show,
        "quit" | "exit" => Instruction::Quit,
        _ => return Err(ScriptError::UnknownInstruction(keyword.to_owned())),
    };

    if let Some(extra) = words.next() {
        return Err(ScriptError::UnexpectedArgument(extra.to_owned()));
    }

    Ok(Some(instruction))
}

fn parse_cell<'a, I>(instruction: &'static str, words: &mut I) -> Result<CellCoord, ScriptError>
where
    I: Iterator<Item = &'a str>,
{
    let column = words
        .next()
        .ok_or(ScriptError::MissingCoordinate(instruction))?;
    let row = words
        .next()
        .ok_or(ScriptError::MissingCoordinate(instruction))?;

    Ok(CellCoord::new(parse_index(column)?, parse_index(row)?))
}

fn parse_index(word: &str) -> Result<u32, ScriptError> {
    word.parse::<u32>()
        .map_err(|_| ScriptError::InvalidCoordinate(word.to_owned()))
}
