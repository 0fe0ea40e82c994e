//! Trainer companion TUI application.
//!
//! A vim-style terminal interface for tracking a trainer, their creature
//! team, inventory and pokedollars. State is saved to a JSON store after
//! every change and restored on the next launch.
//!
//! # Headless Mode
//!
//! Run with `--headless` for a line-oriented interface suitable for scripting:
//!
//! ```bash
//! echo "trainer Red" | cargo run -p trainer -- --headless
//! ```

mod app;
mod commands;
mod events;
mod headless;
mod ui;

use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, stdout};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use trainer_core::{FileStore, SavedState, Session, SessionConfig};

use app::App;
use events::{handle_event, EventResult};
use ui::render::render;
use ui::widgets::log::LogKind;

const DEFAULT_DATA_DIR: &str = "./trainer-data";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args: Vec<String> = std::env::args().collect();

    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_help();
        return Ok(());
    }

    let headless = args.iter().any(|a| a == "--headless");
    let data_dir = data_dir_from_args(&args);

    init_logging(&data_dir, headless);

    let store = FileStore::open(&data_dir)?;
    let session = Session::restore(SessionConfig::new(), store)?;

    if headless {
        return headless::run_headless(session).await.map_err(|e| e.into());
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, App::new(session)).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;

    if let Err(e) = result {
        eprintln!("Error: {e}");
    }

    Ok(())
}

/// `--data-dir <path>`, then `TRAINER_DATA_DIR`, then the default.
fn data_dir_from_args(args: &[String]) -> PathBuf {
    args.iter()
        .position(|a| a == "--data-dir")
        .and_then(|i| args.get(i + 1))
        .map(PathBuf::from)
        .or_else(|| std::env::var("TRAINER_DATA_DIR").ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR))
}

/// Log to `<data_dir>/trainer.log` under the TUI, stderr when headless.
fn init_logging(data_dir: &Path, headless: bool) {
    let filter = EnvFilter::builder()
        .with_default_directive(tracing::Level::INFO.into())
        .from_env_lossy();

    if !headless {
        let file = std::fs::create_dir_all(data_dir).and_then(|()| {
            std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(data_dir.join("trainer.log"))
        });
        // The terminal is owned by the TUI, so logs go nowhere if the file can't be opened
        match file {
            Ok(file) => tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(true)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init(),
            Err(_) => tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(io::sink)
                .init(),
        }
        return;
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(io::stderr)
        .init();
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    mut app: App,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| render(f, &app))?;

        // Process any pending export
        if let Some(path) = app.pending_export.take() {
            let saved = SavedState::new(app.state().clone());
            match saved.save_json(&path).await {
                Ok(()) => {
                    app.set_status(format!("Exported to {}", path.display()));
                    app.add_log(
                        format!("Snapshot written to {}.", path.display()),
                        LogKind::System,
                    );
                }
                Err(e) => {
                    tracing::warn!(error = %e, path = %path.display(), "Export failed");
                    app.set_status(format!("Export failed: {e}"));
                }
            }
        }

        // Process any pending import
        if let Some(path) = app.pending_import.take() {
            match SavedState::load_json(&path).await {
                Ok(saved) => {
                    app.replace_state(saved.state);
                    app.add_log(
                        format!("Snapshot loaded from {}.", path.display()),
                        LogKind::System,
                    );
                    app.set_status(format!("Imported from {}", path.display()));
                }
                Err(e) => {
                    tracing::warn!(error = %e, path = %path.display(), "Import failed");
                    app.set_status(format!("Import failed: {e}"));
                }
            }
        }

        if event::poll(Duration::from_millis(100))? {
            let ev = event::read()?;
            match handle_event(&mut app, ev) {
                EventResult::Quit => return Ok(()),
                EventResult::NeedsRedraw | EventResult::Continue => {}
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn print_help() {
    println!("Trainer Companion - track a trainer and their creature team");
    println!();
    println!("USAGE:");
    println!("  trainer [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("  -h, --help           Show this help message");
    println!("  --headless           Run in headless mode (text-only, no TUI)");
    println!("  --data-dir <PATH>    Where state and logs are kept (default: {DEFAULT_DATA_DIR})");
    println!();
    println!("ENVIRONMENT:");
    println!("  TRAINER_DATA_DIR     Same as --data-dir");
    println!("  RUST_LOG             Log filter (default: info)");
    println!();
    println!("COMMANDS (prefix with : in the TUI):");
    for (usage, description) in commands::HELP {
        println!("  {usage:<56} {description}");
    }
    println!();
    println!("EXAMPLES:");
    println!("  trainer                                # Interactive TUI mode");
    println!("  trainer --headless < script.txt        # Run a command script");
}
