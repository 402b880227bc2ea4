use anyhow::Result;
use clap::Parser;
use crossterm::event::{self, Event};
use log::{error, info, warn, LevelFilter};
use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

mod ui;
mod utils;

use crate::ui::{ChatUI, UserIntent};
use mockchat::config::load_config;
use mockchat::sim::Millis;
use mockchat::Messenger;

/// Command line arguments for mockchat
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "mockchat: an offline terminal chat mockup with simulated delivery receipts and replies."
)]
struct Args {
    /// JSON config file with timing overrides
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Where to write the log (defaults to the config value, then mockchat.log)
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// error, warn, info, debug or trace
    #[arg(long, value_name = "LEVEL", default_value = "info")]
    log_level: LevelFilter,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = load_config(args.config.as_deref())?;

    let log_file_path = args
        .log_file
        .clone()
        .or_else(|| config.log_file.clone())
        .unwrap_or_else(|| PathBuf::from("mockchat.log"));
    utils::setup_logging(&log_file_path, args.log_level)?;

    info!("mockchat starting up");
    info!("System information: {} {}", std::env::consts::OS, std::env::consts::ARCH);
    info!("Logging to file: {}", log_file_path.display());
    info!("Timings: {:?}", config.timings);

    let mut messenger = Messenger::from_config(&config);
    let mut chat_ui = ChatUI::new();
    chat_ui.chat_selected(&messenger);

    let mut terminal = ui::setup_terminal()?;
    let result = run_main_loop(
        &mut chat_ui,
        &mut terminal,
        &mut messenger,
        Duration::from_millis(config.tick_rate_ms.max(10)),
    )
    .await;

    ui::restore_terminal(terminal)?;
    if let Err(e) = &result {
        error!("Main loop failed: {}", e);
    }
    result?;

    println!("Chat session ended.");
    Ok(())
}

/// Reads terminal events on a plain thread so a blocked read never holds up
/// runtime shutdown.
fn spawn_input_reader() -> mpsc::Receiver<Event> {
    let (event_tx, event_rx) = mpsc::channel(100);
    std::thread::spawn(move || loop {
        match event::read() {
            Ok(event) => {
                if event_tx.blocking_send(event).is_err() {
                    break;
                }
            }
            Err(e) => {
                error!("Failed to read terminal event: {}", e);
                break;
            }
        }
    });
    event_rx
}

/// Run the main event loop
async fn run_main_loop(
    chat_ui: &mut ChatUI,
    terminal: &mut ui::Terminal<ui::CrosstermBackend<io::Stdout>>,
    messenger: &mut Messenger,
    tick_rate: Duration,
) -> Result<()> {
    let started = Instant::now();
    let elapsed = || started.elapsed().as_millis() as Millis;

    let mut event_rx = spawn_input_reader();
    let mut ticker = tokio::time::interval(tick_rate);

    loop {
        terminal.draw(|f| chat_ui.draw(f, messenger))?;

        tokio::select! {
            _ = ticker.tick() => {
                messenger.advance_to(elapsed());
            }
            maybe_event = event_rx.recv() => {
                let event = match maybe_event {
                    Some(event) => event,
                    None => {
                        warn!("Terminal input closed");
                        break;
                    }
                };

                // Intents act at the current clock, after everything already due
                messenger.advance_to(elapsed());
                match chat_ui.handle_event(&event, messenger) {
                    Some(UserIntent::Quit) => break,
                    Some(intent) => apply_intent(chat_ui, messenger, intent),
                    None => {}
                }
            }
        }
    }

    info!("Leaving main loop at t={}ms", messenger.now());
    Ok(())
}

fn apply_intent(chat_ui: &mut ChatUI, messenger: &mut Messenger, intent: UserIntent) {
    match intent {
        UserIntent::SendText(text) => {
            messenger.send_text(&text);
        }
        UserIntent::SelectChat(chat_id) => match messenger.select_chat(chat_id) {
            Ok(()) => chat_ui.chat_selected(messenger),
            Err(e) => warn!("{}", e),
        },
        UserIntent::ToggleRecording => {
            if messenger.is_recording() {
                messenger.stop_recording();
            } else {
                messenger.start_recording();
            }
        }
        UserIntent::SendFile => {
            messenger.send_file();
        }
        UserIntent::Delete(id) => {
            messenger.delete_message(id);
            chat_ui.clear_selection();
        }
        UserIntent::Forward(id) => {
            messenger.forward_message(id);
            chat_ui.clear_selection();
        }
        UserIntent::Quit => {}
    }
}
