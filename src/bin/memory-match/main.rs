//! Two-player memory matching in the terminal.
//!
//! ```bash
//! memory-match                       # interactive board
//! memory-match --seed 7 --pairs 6    # reproducible smaller game
//! memory-match --headless            # line protocol on stdin, JSON snapshots on stdout
//! ```
//!
//! The TUI owns the terminal, so logs only go somewhere when `--log-file` is
//! given. In headless mode they go to stderr.

mod app;
mod events;
mod headless;
mod render;

use std::fs::File;
use std::io::{self, stdout, Write};
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event,
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use memory_match::{runtime, Card, ConfigError, FlipCue, SessionConfig, SessionController, SessionHandle};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing_subscriber::EnvFilter;

use app::App;
use events::{handle_event, EventResult};
use render::render;

#[derive(Parser, Debug)]
#[command(name = "memory-match", about = "Two-player memory matching game")]
#[command(version)]
struct Cli {
    /// TOML file with session settings
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Seed for a reproducible deal
    #[arg(long)]
    seed: Option<u64>,

    /// Number of pairs on the board
    #[arg(long)]
    pairs: Option<u8>,

    /// Seconds per turn
    #[arg(long)]
    turn_seconds: Option<u32>,

    /// Deal this exact deck every game, e.g. 1,2,1,2
    #[arg(long, value_delimiter = ',')]
    deck: Option<Vec<u8>>,

    /// Read commands from stdin and print snapshots instead of drawing a board
    #[arg(long)]
    headless: bool,

    /// Write logs to this file
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    /// Config file (or defaults) with command-line overrides applied.
    fn session_config(&self) -> Result<SessionConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => SessionConfig::load(path)?,
            None => SessionConfig::default(),
        };
        if let Some(seed) = self.seed {
            config = config.with_seed(seed);
        }
        if let Some(pairs) = self.pairs {
            config = config.with_pairs(pairs);
        }
        if let Some(seconds) = self.turn_seconds {
            config = config.with_turn_seconds(seconds);
        }
        if let Some(deck) = &self.deck {
            config = config.with_fixed_deck(deck.clone());
        }
        Ok(config)
    }
}

/// Rings the terminal bell on every flip.
struct TerminalBell;

impl FlipCue for TerminalBell {
    fn flip(&self, _card: Card) {
        let mut out = stdout();
        // Best effort; a missing bell never affects the game.
        let _ = out.write_all(b"\x07").and_then(|()| out.flush());
    }
}

fn init_logging(cli: &Cli) -> Result<()> {
    let default = if cli.verbose { "memory_match=debug" } else { "memory_match=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    if let Some(path) = &cli.log_file {
        let file = File::create(path)
            .with_context(|| format!("failed to create log file {}", path.display()))?;
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .init();
    } else if cli.headless {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .init();
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli)?;

    let config = cli.session_config().context("invalid configuration")?;
    let controller = SessionController::new(config).context("invalid configuration")?;

    if cli.headless {
        return headless::run(controller).await;
    }

    let handle = runtime::spawn(controller.with_cue(TerminalBell));

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &handle).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    handle.shutdown().await?;
    result
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    handle: &SessionHandle,
) -> Result<()> {
    let mut snapshots = handle.snapshots();
    let mut app = App::new(snapshots.borrow_and_update().clone());

    loop {
        terminal.draw(|f| render(f, &app))?;

        // Short poll so timer ticks show up promptly
        if event::poll(Duration::from_millis(50))? {
            match handle_event(&mut app, event::read()?) {
                EventResult::Quit => return Ok(()),
                EventResult::Send(command) => handle.send(command).await?,
                EventResult::Continue => {}
            }
        }

        if snapshots.has_changed()? {
            app.update(snapshots.borrow_and_update().clone());
        }
    }
}
