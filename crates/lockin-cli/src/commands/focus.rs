use std::time::Duration;

use clap::Subcommand;
use lockin_core::focus::{
    format_clock, AppState, FocusController, LifecycleHub, Phase, DURATION_OPTIONS,
};
use lockin_core::Config;
use serde_json::json;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

use super::print_json;

#[derive(Subcommand)]
pub enum FocusAction {
    /// Run a focus session in the foreground.
    ///
    /// Events are printed as JSON lines. Host signals are read from stdin,
    /// one per line: active, background, inactive, blur, focus, give-up,
    /// quit. Ctrl-C counts as sending the app to the background.
    Run {
        /// Session length in minutes (defaults to focus.default_minutes)
        #[arg(long)]
        minutes: Option<u32>,
        /// Milliseconds per countdown second (defaults to focus.tick_interval_ms)
        #[arg(long)]
        tick_ms: Option<u64>,
        /// Also print a snapshot on every tick
        #[arg(long)]
        progress: bool,
    },
    /// List the selectable durations
    Options,
}

enum Input {
    Continue,
    Quit,
}

pub async fn run(action: FocusAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        FocusAction::Run {
            minutes,
            tick_ms,
            progress,
        } => run_session(minutes, tick_ms, progress).await,
        FocusAction::Options => {
            let options: Vec<_> = DURATION_OPTIONS
                .iter()
                .map(|opt| {
                    json!({
                        "label": opt.label,
                        "minutes": opt.minutes,
                        "clock": format_clock(opt.seconds()),
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&options)?);
            Ok(())
        }
    }
}

async fn run_session(
    minutes: Option<u32>,
    tick_ms: Option<u64>,
    progress: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let mut settings = config.focus.settings();
    if let Some(ms) = tick_ms {
        settings.tick_interval = Duration::from_millis(ms.max(1));
    }

    let controller = FocusController::new(settings);
    let hub = LifecycleHub::new();
    let _lifecycle = controller.attach_lifecycle(&hub);

    if let Some(minutes) = minutes {
        match controller.select_duration(minutes) {
            Some(event) => print_json(&event)?,
            None => warn!(minutes, "duration not accepted, keeping default"),
        }
    }

    let mut phases = controller.subscribe();
    let mut snapshots = controller.watch();
    controller.start();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    let mut ctrl_c_armed = true;

    loop {
        tokio::select! {
            change = phases.recv() => match change {
                Ok(change) => {
                    print_json(&change.event)?;
                    if change.to != Phase::Running {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "phase events dropped"),
                Err(RecvError::Closed) => break,
            },
            changed = snapshots.changed(), if progress => {
                if changed.is_err() {
                    break;
                }
                let snapshot = *snapshots.borrow_and_update();
                if snapshot.phase == Phase::Running {
                    print_json(&controller.snapshot_event())?;
                }
            },
            line = lines.next_line(), if stdin_open => match line? {
                Some(line) => {
                    if let Input::Quit = handle_input(&controller, &hub, line.trim()) {
                        break;
                    }
                }
                None => stdin_open = false,
            },
            signal = tokio::signal::ctrl_c(), if ctrl_c_armed => {
                ctrl_c_armed = handle_ctrl_c(&hub, signal);
            }
        }
    }

    print_json(&controller.snapshot_event())?;
    Ok(())
}

/// Ctrl-C leaves the session like backgrounding the app. Returns whether
/// the handler should stay armed.
fn handle_ctrl_c(hub: &LifecycleHub, signal: std::io::Result<()>) -> bool {
    match signal {
        Ok(()) => {
            info!("interrupted, treating as background");
            hub.emit(AppState::Background);
            true
        }
        Err(e) => {
            warn!(error = %e, "cannot listen for Ctrl-C");
            false
        }
    }
}

fn handle_input(controller: &FocusController, hub: &LifecycleHub, line: &str) -> Input {
    match line {
        "" => {}
        "quit" => return Input::Quit,
        "give-up" => {
            controller.give_up();
        }
        "blur" => {
            controller.on_screen_focus_change(false);
        }
        "focus" => {
            controller.on_screen_focus_change(true);
        }
        other => match other.parse::<AppState>() {
            Ok(state) => hub.emit(state),
            Err(_) => warn!(input = other, "unknown signal"),
        },
    }
    Input::Continue
}
