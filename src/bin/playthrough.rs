use std::io;
use std::path::{Path, PathBuf};

use clap::Parser;
use env_logger::Env;
use serde::Serialize;
use serde_json::{json, Value};
use tactic_playbook_server::constants::DEFAULT_ANIMATION_SPEED_MS;
use tactic_playbook_server::engine::{now_ms, PlaybackEngine};
use tactic_playbook_server::library::TacticLibrary;
use tactic_playbook_server::model::DanglingReference;
use tactic_playbook_server::tactic_file::{load_tactic_file, save_tactic_file};
use tactic_playbook_server::types::{Coordinate, Tactic};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Tactic document to load (legacy formats are accepted).
    #[arg(long, conflicts_with = "tactic")]
    file: Option<PathBuf>,
    /// Id of a built-in tactic.
    #[arg(long)]
    tactic: Option<String>,
    /// Court coordinate to tap, as `x,y`. Repeatable; applied in order.
    #[arg(long = "tap")]
    taps: Vec<String>,
    #[arg(long, default_value_t = 32)]
    max_steps: usize,
    #[arg(long, default_value_t = DEFAULT_ANIMATION_SPEED_MS)]
    speed_ms: u64,
    #[arg(long)]
    normalized_out: Option<PathBuf>,
    #[arg(long)]
    summary_out: Option<PathBuf>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TransitionLine {
    clock_ms: u64,
    cause: &'static str,
    step_id: String,
    step_index: Option<usize>,
    history_depth: usize,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PlaythroughSummary {
    tactic_id: String,
    tactic_name: String,
    step_count: usize,
    visited_step_ids: Vec<String>,
    valid_taps: usize,
    missed_taps: usize,
    final_step_id: String,
    history_depth: usize,
    elapsed_virtual_ms: u64,
    unreachable_step_ids: Vec<String>,
    dangling_references: Vec<DanglingReference>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StructuredLogLine {
    timestamp_ms: u64,
    level: String,
    event: String,
    details: Value,
}

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let tactic = match load_tactic(&cli) {
        Ok(tactic) => tactic,
        Err(message) => {
            emit_log("error", "invalid_input", json!({ "error": message }));
            std::process::exit(1);
        }
    };
    let taps = match cli
        .taps
        .iter()
        .map(|raw| parse_tap(raw))
        .collect::<Result<Vec<_>, _>>()
    {
        Ok(taps) => taps,
        Err(message) => {
            emit_log("error", "invalid_input", json!({ "error": message }));
            std::process::exit(1);
        }
    };

    emit_log(
        "info",
        "tactic_loaded",
        json!({
            "tacticId": tactic.id,
            "name": tactic.name,
            "players": tactic.players.len(),
            "steps": tactic.steps.len(),
        }),
    );

    if let Some(path) = cli.normalized_out.as_ref() {
        if let Err(error) = save_tactic_file(path, &tactic) {
            emit_log(
                "error",
                "normalized_write_failed",
                json!({ "path": path.to_string_lossy(), "error": error.to_string() }),
            );
            std::process::exit(2);
        }
    }

    let summary = run_playthrough(tactic, &taps, cli.max_steps, cli.speed_ms, print_transition);

    if let Some(path) = cli.summary_out.as_ref() {
        if let Err(error) = write_summary(path, &summary) {
            emit_log(
                "error",
                "summary_write_failed",
                json!({ "path": path.to_string_lossy(), "error": error.to_string() }),
            );
            std::process::exit(2);
        }
    }

    emit_log(
        "info",
        "playthrough_finished",
        serde_json::to_value(&summary).unwrap_or(Value::Null),
    );
}

fn load_tactic(cli: &Cli) -> Result<Tactic, String> {
    if let Some(path) = cli.file.as_ref() {
        return load_tactic_file(path).map_err(|error| error.to_string());
    }
    let tactic_id = cli.tactic.as_deref().unwrap_or("sideout-1");
    TacticLibrary::builtin()
        .find(tactic_id)
        .cloned()
        .ok_or_else(|| format!("unknown tactic {tactic_id}"))
}

fn parse_tap(raw: &str) -> Result<Coordinate, String> {
    let (x, y) = raw
        .split_once(',')
        .ok_or_else(|| format!("tap \"{raw}\" is not in x,y form"))?;
    let parse = |value: &str| {
        value
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|number| number.is_finite())
            .ok_or_else(|| format!("tap \"{raw}\" has a non-numeric coordinate"))
    };
    Ok(Coordinate::new(parse(x)?, parse(y)?))
}

/// Replays taps, then autoplays from wherever they landed. The clock is
/// virtual: it jumps straight to the engine's next deadline.
fn run_playthrough(
    tactic: Tactic,
    taps: &[Coordinate],
    max_steps: usize,
    speed_ms: u64,
    mut on_transition: impl FnMut(&TransitionLine),
) -> PlaythroughSummary {
    let reachable = tactic.reachable_step_ids();
    let unreachable_step_ids = tactic
        .steps
        .iter()
        .filter(|step| !reachable.contains(&step.id))
        .map(|step| step.id.clone())
        .collect();
    let dangling_references = tactic.dangling_references();

    let mut clock = 0u64;
    let mut engine = PlaybackEngine::new(tactic, speed_ms, clock);
    let mut visited_step_ids = vec![engine.state().step_id.clone()];
    let mut valid_taps = 0;
    let mut missed_taps = 0;

    let mut record = |engine: &PlaybackEngine, clock: u64, cause: &'static str| {
        let line = TransitionLine {
            clock_ms: clock,
            cause,
            step_id: engine.state().step_id.clone(),
            step_index: engine.tactic().step_index(&engine.state().step_id),
            history_depth: engine.state().history.len(),
        };
        on_transition(&line);
        line.step_id
    };

    for tap in taps {
        if engine.interact(*tap, clock).is_valid {
            valid_taps += 1;
            visited_step_ids.push(record(&engine, clock, "tap"));
        } else {
            missed_taps += 1;
            while let Some(deadline) = engine.next_deadline() {
                clock = deadline;
                engine.tick(clock);
            }
        }
    }

    if engine.next_step().is_some() {
        engine.toggle_play(clock);
        while visited_step_ids.len() <= max_steps {
            let Some(deadline) = engine.next_deadline() else {
                break;
            };
            clock = deadline;
            let before = engine.state().history.len();
            engine.tick(clock);
            if engine.state().history.len() != before {
                visited_step_ids.push(record(&engine, clock, "autoplay"));
            }
        }
        engine.shutdown();
    }

    PlaythroughSummary {
        tactic_id: engine.tactic().id.clone(),
        tactic_name: engine.tactic().name.clone(),
        step_count: engine.tactic().steps.len(),
        final_step_id: engine.state().step_id.clone(),
        history_depth: engine.state().history.len(),
        visited_step_ids,
        valid_taps,
        missed_taps,
        elapsed_virtual_ms: clock,
        unreachable_step_ids,
        dangling_references,
    }
}

fn print_transition(line: &TransitionLine) {
    if let Ok(text) = serde_json::to_string(line) {
        println!("{text}");
    }
}

fn emit_log(level: &str, event: &str, details: Value) {
    let log_line = StructuredLogLine {
        timestamp_ms: now_ms(),
        level: level.to_string(),
        event: event.to_string(),
        details,
    };
    if let Ok(text) = serde_json::to_string(&log_line) {
        eprintln!("{text}");
    }
}

fn write_summary(path: &Path, summary: &PlaythroughSummary) -> io::Result<()> {
    let summary_text = serde_json::to_string_pretty(summary).map_err(io::Error::other)?;
    std::fs::write(path, summary_text)
}
