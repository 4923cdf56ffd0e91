#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays Palefiz from typed or scripted instructions.

mod render;
mod script;

use std::{
    fs::{self, File},
    io::{self, BufRead, BufReader, Write},
    path::PathBuf,
};

use anyhow::{Context, Result};
use clap::Parser;
use palefiz_core::Event;
use palefiz_session::{GameSession, SessionConfig};
use palefiz_world::query;
use script::Instruction;
use tracing::warn;
use tracing_subscriber::EnvFilter;

/// Turn-based board game in which figures race toward a target cell.
#[derive(Debug, Parser)]
#[command(name = "palefiz", version, about)]
struct Args {
    /// Number of cells along each edge of the board.
    #[arg(long)]
    size: Option<u32>,
    /// Seed of the die rolled during the simulation.
    #[arg(long)]
    seed: Option<u64>,
    /// TOML file providing session settings; flags take precedence.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// File of instructions to run instead of reading standard input.
    #[arg(long, value_name = "FILE")]
    script: Option<PathBuf>,
}

/// Entry point for the Palefiz command-line interface.
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let config = load_config(&args)?;
    let mut session = GameSession::new(config).context("invalid session configuration")?;

    let input: Box<dyn BufRead> = match &args.script {
        Some(path) => Box::new(BufReader::new(File::open(path).with_context(|| {
            format!("failed to open script {}", path.display())
        })?)),
        None => Box::new(io::stdin().lock()),
    };
    let stdout = io::stdout();
    let mut out = stdout.lock();

    writeln!(out, "{}", query::welcome_banner(session.world()))?;
    writeln!(out, "{}", session.status_line())?;

    for (index, line) in input.lines().enumerate() {
        let line = line.context("failed to read instruction")?;
        match script::parse_line(&line) {
            Ok(None) => {}
            Ok(Some(Instruction::Quit)) => break,
            Ok(Some(instruction)) => execute(&mut session, instruction, &mut out)?,
            Err(error) => {
                warn!(line = index + 1, %error, "ignoring instruction");
                writeln!(out, "line {}: {error}", index + 1)?;
            }
        }
    }

    Ok(())
}

fn load_config(args: &Args) -> Result<SessionConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read config {}", path.display()))?;
            toml::from_str(&text)
                .with_context(|| format!("failed to parse config {}", path.display()))?
        }
        None => SessionConfig::default(),
    };

    if let Some(size) = args.size {
        config.grid_size = size;
    }
    if let Some(seed) = args.seed {
        config.rng_seed = seed;
    }

    Ok(config)
}

fn execute(session: &mut GameSession, instruction: Instruction, out: &mut impl Write) -> Result<()> {
    match instruction {
        Instruction::Block => {
            let events = session.toggle_block_mode();
            write_events(&events, out)?;
            writeln!(out, "{}", session.status_line())?;
        }
        Instruction::Click(cell) => {
            let events = session.click(cell);
            write_events(&events, out)?;
        }
        Instruction::Target(cell) => {
            let events = session.set_target(cell);
            write_events(&events, out)?;
        }
        Instruction::Advance => {
            let report = session.advance();
            writeln!(out, "{}", render::report(&report))?;
        }
        Instruction::Start => match session.start() {
            Ok(events) => write_events(&events, out)?,
            Err(error) => writeln!(out, "cannot start: {error}")?,
        },
        Instruction::Step => match session.step() {
            Ok(outcome) => writeln!(out, "{}", render::turn(&outcome))?,
            Err(error) => writeln!(out, "cannot step: {error}")?,
        },
        Instruction::Show => {
            write!(out, "{}", render::board(query::board(session.world())))?;
            writeln!(out, "{}", session.status_line())?;
        }
        Instruction::Quit => {}
    }

    out.flush().context("failed to flush output")
}

fn write_events(events: &[Event], out: &mut impl Write) -> Result<()> {
    for event in events {
        writeln!(out, "{}", render::event(event))?;
    }
    Ok(())
}
