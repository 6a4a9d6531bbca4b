use std::{
    fs,
    io::{self, Write},
    path::PathBuf,
};

use anyhow::Context as _;
use blockfall_engine::{Command, Engine, MoveOutcome, Snapshot};
use clap::ValueEnum;
use serde::Serialize;

use crate::command::GameArg;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct SimulateArg {
    #[clap(flatten)]
    game: GameArg,
    /// Commands to apply: L (left), R (right), D (soft drop), U (rotate), H (hard drop)
    #[clap(long, conflicts_with = "script", required_unless_present = "script")]
    commands: Option<String>,
    /// Read the commands from this file
    #[clap(long)]
    script: Option<PathBuf>,
    /// How to print the result
    #[clap(long, value_enum, default_value_t)]
    format: OutputFormat,
}

impl SimulateArg {
    pub(crate) fn game(&self) -> &GameArg {
        &self.game
    }
}

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    /// Counters followed by the board, one line per row
    #[default]
    Text,
    /// Pretty-printed JSON report
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("unknown command {ch:?} at position {position}")]
pub(crate) struct ParseScriptError {
    position: usize,
    ch: char,
}

/// Result of a scripted run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct SimulationReport {
    commands_applied: usize,
    commands_rejected: usize,
    pieces_locked: usize,
    lines_cleared: usize,
    snapshot: Snapshot,
}

pub(crate) fn run(arg: &SimulateArg) -> anyhow::Result<()> {
    let SimulateArg {
        commands,
        script,
        format,
        ..
    } = arg;

    let source = match (commands, script) {
        (Some(commands), _) => commands.clone(),
        (None, Some(path)) => fs::read_to_string(path)
            .with_context(|| format!("failed to read script {}", path.display()))?,
        (None, None) => anyhow::bail!("either --commands or --script is required"),
    };
    let commands = parse_script(&source)?;

    let mut engine = Engine::with_generator(arg.game().generator());
    log::info!(
        "simulating {} commands with seed {}",
        commands.len(),
        engine.generator().seed()
    );
    let report = simulate(&mut engine, &commands);

    let mut stdout = io::stdout().lock();
    write_report(&mut stdout, &report, *format)?;
    stdout.flush()?;
    Ok(())
}

/// Parses a command script, ignoring whitespace.
///
/// `position` in the error counts characters from zero, whitespace included.
pub(crate) fn parse_script(source: &str) -> Result<Vec<Command>, ParseScriptError> {
    source
        .chars()
        .enumerate()
        .filter(|(_, ch)| !ch.is_whitespace())
        .map(|(position, ch)| Command::from_char(ch).ok_or(ParseScriptError { position, ch }))
        .collect()
}

/// Applies `commands` in order and stops early once the game is over.
pub(crate) fn simulate(engine: &mut Engine, commands: &[Command]) -> SimulationReport {
    let mut commands_applied = 0;
    let mut commands_rejected = 0;
    let mut pieces_locked = 0;
    let mut lines_cleared = 0;

    for command in commands {
        if engine.state().is_game_over() {
            break;
        }
        commands_applied += 1;
        match command.apply(engine) {
            Ok(MoveOutcome::Moved) => {}
            Ok(
                MoveOutcome::Locked { cleared_lines } | MoveOutcome::ToppedOut { cleared_lines },
            ) => {
                pieces_locked += 1;
                lines_cleared += cleared_lines;
            }
            Err(e) => {
                log::debug!("{command:?} rejected: {e}");
                commands_rejected += 1;
            }
        }
    }

    SimulationReport {
        commands_applied,
        commands_rejected,
        pieces_locked,
        lines_cleared,
        snapshot: engine.snapshot(),
    }
}

fn write_report<W>(
    writer: &mut W,
    report: &SimulationReport,
    format: OutputFormat,
) -> anyhow::Result<()>
where
    W: Write,
{
    match format {
        OutputFormat::Text => {
            let SimulationReport {
                commands_applied,
                commands_rejected,
                pieces_locked,
                lines_cleared,
                snapshot,
            } = report;
            writeln!(writer, "seed: {}", snapshot.seed)?;
            writeln!(writer, "state: {:?}", snapshot.state)?;
            writeln!(
                writer,
                "commands: {commands_applied} ({commands_rejected} rejected)"
            )?;
            writeln!(writer, "pieces locked: {pieces_locked}")?;
            writeln!(writer, "lines cleared: {lines_cleared}")?;
            writeln!(writer, "{}", snapshot.board)?;
        }
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *writer, report)?;
            writeln!(writer)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use blockfall_engine::{
        BOARD_HEIGHT, Board, Catalog, Cell, EngineState, PieceGenerator, PieceSeed, ShapeKind,
    };

    use super::*;

    fn line_engine() -> Engine {
        let catalog = Catalog::from_kinds([ShapeKind::I]).unwrap();
        Engine::with_generator(PieceGenerator::with_catalog(
            PieceSeed::from_u128(3),
            catalog,
        ))
    }

    #[test]
    fn test_parse_script() {
        let commands = parse_script("LR D\nU\tH").unwrap();
        assert_eq!(
            commands,
            [
                Command::MoveLeft,
                Command::MoveRight,
                Command::SoftDrop,
                Command::Rotate,
                Command::HardDrop,
            ]
        );
        assert!(parse_script("  \n").unwrap().is_empty());
    }

    #[test]
    fn test_parse_script_unknown_char() {
        let err = parse_script("LL Rx").unwrap_err();
        assert_eq!(err, ParseScriptError { position: 4, ch: 'x' });
        assert_eq!(err.to_string(), "unknown command 'x' at position 4");
        // Lowercase letters are not commands
        assert!(parse_script("l").is_err());
    }

    #[test]
    fn test_simulate_counts() {
        let mut engine = line_engine();
        // Three moves past the left wall: the fourth is rejected
        let commands = parse_script("LLLLLL H").unwrap();
        let report = simulate(&mut engine, &commands);
        assert_eq!(report.commands_applied, 7);
        assert!(report.commands_rejected >= 1);
        assert_eq!(report.pieces_locked, 1);
        assert_eq!(report.lines_cleared, 0);
        assert_eq!(report.snapshot.board.count(Cell::Locked), 4);
        assert_eq!(report.snapshot.state, EngineState::Playing);
    }

    #[test]
    fn test_simulate_clears_lines() {
        let mut engine = line_engine();
        // Vertical bars stacked four high tile columns 0..=9
        let mut script = String::new();
        for x in 0..10 {
            script.push('U');
            script.push_str(&"L".repeat(10));
            script.push_str(&"R".repeat(x));
            script.push('H');
        }
        let report = simulate(&mut engine, &parse_script(&script).unwrap());
        assert_eq!(report.pieces_locked, 10);
        assert_eq!(report.lines_cleared, 4);
        assert_eq!(report.snapshot.board.count(Cell::Locked), 0);
    }

    #[test]
    fn test_simulate_stops_at_game_over() {
        let mut engine = line_engine();
        let commands = vec![Command::HardDrop; BOARD_HEIGHT * 4];
        let report = simulate(&mut engine, &commands);
        assert_eq!(report.snapshot.state, EngineState::GameOver);
        assert!(report.commands_applied < commands.len());
        assert_eq!(report.commands_rejected, 0);
        assert_eq!(report.pieces_locked, report.commands_applied);
    }

    #[test]
    fn test_write_text_report() {
        let mut engine = line_engine();
        let report = simulate(&mut engine, &parse_script("H").unwrap());
        let mut out = vec![];
        write_report(&mut out, &report, OutputFormat::Text).unwrap();
        let out = String::from_utf8(out).unwrap();

        assert!(out.starts_with(&format!("seed: {}\n", PieceSeed::from_u128(3))));
        assert!(out.contains("state: Playing\n"));
        assert!(out.contains("pieces locked: 1\n"));
        let board_text = out.lines().skip(5).collect::<Vec<_>>().join("\n");
        let board = board_text.parse::<Board>().unwrap();
        assert_eq!(board, report.snapshot.board);
    }

    #[test]
    fn test_write_json_report() {
        let mut engine = line_engine();
        let report = simulate(&mut engine, &parse_script("DDH").unwrap());
        let mut out = vec![];
        write_report(&mut out, &report, OutputFormat::Json).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["commands_applied"], 3);
        assert_eq!(value["pieces_locked"], 1);
        assert_eq!(value["snapshot"]["state"], "Playing");
        assert_eq!(
            value["snapshot"]["seed"],
            PieceSeed::from_u128(3).to_string()
        );
        let rows = value["snapshot"]["board"].as_array().unwrap();
        assert_eq!(rows.len(), BOARD_HEIGHT);
        assert_eq!(rows[BOARD_HEIGHT - 1], ".....####.");
    }
}
