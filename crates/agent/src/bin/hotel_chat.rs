//! Interactive console for the hotel planner
//!
//! Usage: `hotel-chat [settings.yaml]`
//!
//! Commands: `/state` prints the filled slots, `/reset` starts over, `/quit` exits.
//! Logs go to stderr; set `RUST_LOG=hotel_planner_agent=debug` to trace
//! extraction and policy decisions, `LOG_FORMAT=json` for JSON lines.

use anyhow::{Context, Result};
use hotel_planner_agent::{ConversationController, DialogueStateTracker, TurnOutcome};
use hotel_planner_config::Settings;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<()> {
    let json_logs = std::env::var("LOG_FORMAT").map(|v| v == "json").unwrap_or(false);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn,hotel_planner_agent=info".into()),
        )
        .with(json_logs.then(|| tracing_subscriber::fmt::layer().json().with_writer(io::stderr)))
        .with((!json_logs).then(|| {
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_line_number(true)
                .with_writer(io::stderr)
        }))
        .init();

    let settings_path = std::env::args().nth(1).map(PathBuf::from);
    let settings = Settings::load(settings_path.as_deref()).context("failed to load settings")?;
    let controller =
        ConversationController::from_settings(&settings).context("failed to build controller")?;

    let mut tracker = DialogueStateTracker::new();
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    writeln!(stdout, "hotel-chat ready. /state, /reset, /quit")?;
    write!(stdout, "> ")?;
    stdout.flush()?;

    for line in stdin.lock().lines() {
        let line = line?;
        let message = line.trim();
        match message {
            "" => {}
            "/quit" | "/exit" => break,
            "/reset" => {
                tracker.reset();
                writeln!(stdout, "(conversation reset)")?;
            }
            "/state" => {
                let snapshot = tracker.state().snapshot();
                writeln!(stdout, "{}", serde_json::to_string_pretty(&snapshot)?)?;
            }
            _ => match controller.handle_turn(&mut tracker, message) {
                TurnOutcome::Ask { text, .. } => writeln!(stdout, "{}", text)?,
                TurnOutcome::Ready(request) => {
                    if let Some(notice) = &request.notice {
                        writeln!(stdout, "{}", notice)?;
                    }
                    writeln!(stdout, "[ready] {}", request.summary)?;
                    writeln!(stdout, "{}", serde_json::to_string_pretty(&request)?)?;
                }
            },
        }
        write!(stdout, "> ")?;
        stdout.flush()?;
    }

    Ok(())
}
