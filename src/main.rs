use std::io::{self, stdout, Stdout};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use clap::{Parser, Subcommand};
use crossbeam_channel::{Receiver, TryRecvError};
use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::{backend::CrosstermBackend, Terminal};

use syntaxlab::app::LogicThread;
use syntaxlab::config::Config;
use syntaxlab::identity::{FileIdentityStore, IdentityStore};
use syntaxlab::render::{RenderState, FRAME_DURATION};
use syntaxlab::report::{self, EventLog};
use syntaxlab::task::{sequence_for, Group, TaskCatalog, EXAMPLE_TASKS};
use syntaxlab::{sxlog, ui, Result};

/// Syntaxlab - controlled experiment runner for table selection syntax
#[derive(Parser, Debug)]
#[command(name = "syntaxlab")]
#[command(version, about, long_about = None)]
#[command(
    after_help = "ENVIRONMENT:\n    SYNTAXLAB_DEBUG=1     Enable debug logging (alternative to --debug)"
)]
pub struct Cli {
    /// Enable debug logging (writes to ~/.syntaxlab/syntaxlab.log)
    #[arg(short = 'd', long)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Summarize recorded events per participant and task
    Report {
        /// Event log to read (defaults to the configured events path)
        #[arg(long)]
        events: Option<PathBuf>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show the language order for a group
    Sequence {
        /// AB or BA
        group: String,
    },

    /// Forget the stored participant so the next run starts fresh
    Reset,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on debug flag
    syntaxlab::log::init_with_debug(cli.debug);

    // Reset needs neither the config file nor the tables.
    if cli.command == Some(Command::Reset) {
        return run_reset(&Config::identity_path()?);
    }

    let config = Config::load()?;
    let catalog = Arc::new(load_catalog(&config)?);

    match cli.command {
        Some(Command::Report { events, json }) => {
            return run_report(&config, &catalog, events, json);
        }
        Some(Command::Sequence { group }) => {
            return run_sequence(&catalog, &group);
        }
        Some(Command::Reset) | None => {
            // No subcommand: run the experiment
        }
    }

    if cli.debug {
        sxlog!("Syntaxlab starting (debug mode enabled)");
    } else {
        sxlog!("Syntaxlab starting");
    }

    config.ensure_dirs()?;
    for group in Group::ALL {
        catalog.check_sequence(&sequence_for(group))?;
    }

    let shutdown = Arc::new(AtomicBool::new(false));
    let (state_tx, state_rx) = crossbeam_channel::bounded::<RenderState>(1);

    let mut terminal = setup_terminal()?;

    let shutdown_clone = shutdown.clone();
    let logic_handle =
        thread::spawn(move || LogicThread::run(config, catalog, state_tx, shutdown_clone));

    let result = render_loop(&mut terminal, state_rx, &shutdown);

    shutdown.store(true, Ordering::SeqCst);
    let logic_result = logic_handle.join();
    restore_terminal(&mut terminal)?;
    if let Ok(Err(e)) = logic_result {
        return Err(e);
    }
    result
}

/// Bundled tables, or the ones in the configured data directory.
fn load_catalog(config: &Config) -> Result<TaskCatalog> {
    match config.data_dir() {
        Some(dir) => TaskCatalog::from_dir(&dir),
        None => TaskCatalog::builtin(),
    }
}

fn run_report(config: &Config, catalog: &TaskCatalog, events: Option<PathBuf>, json: bool) -> Result<()> {
    let path = match events {
        Some(path) => path,
        None => config.events_path()?,
    };
    sxlog!("Report command: events={}", path.display());

    let log = EventLog::load(&path)?;
    if log.skipped() > 0 {
        eprintln!("Skipped {} unreadable lines in {}", log.skipped(), path.display());
    }

    let summaries = report::summarize(&log, catalog);
    if json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
    } else {
        print!("{}", report::render(&summaries));
    }
    Ok(())
}

fn run_sequence(catalog: &TaskCatalog, group: &str) -> Result<()> {
    let group: Group = group.parse()?;
    let sequence = sequence_for(group);
    catalog.check_sequence(&sequence)?;

    println!("Group {}", group);
    for (index, (language, config)) in sequence.as_slice().iter().zip(catalog.configs()).enumerate() {
        let pinned = if EXAMPLE_TASKS.contains(&index) { "  (example)" } else { "" };
        println!(
            "  {:>2}  {:<6}  {}{}",
            index,
            language.display_name(),
            config.kind().as_str(),
            pinned
        );
    }
    Ok(())
}

fn run_reset(path: &Path) -> Result<()> {
    sxlog!("Reset command: identity={}", path.display());
    FileIdentityStore::new(path).clear()?;
    println!("Stored participant cleared ({})", path.display());
    Ok(())
}

fn render_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    state_rx: Receiver<RenderState>,
    shutdown: &AtomicBool,
) -> Result<()> {
    let mut state = RenderState::default();
    let mut last_version: u64 = 0;
    let mut last_frame = Instant::now();
    let mut dirty = true;

    loop {
        if shutdown.load(Ordering::Relaxed) {
            break;
        }

        match state_rx.try_recv() {
            Ok(s) => {
                dirty = dirty || s.version != last_version;
                state = s;
            }
            Err(TryRecvError::Empty) => {}
            Err(TryRecvError::Disconnected) => break,
        }

        if last_frame.elapsed() < FRAME_DURATION {
            thread::sleep(Duration::from_micros(500));
            continue;
        }
        last_frame = Instant::now();

        if dirty {
            terminal.draw(|f| ui::draw(f, &state))?;
            last_version = state.version;
            dirty = false;
        }
    }
    Ok(())
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    execute!(io::stdout(), EnterAlternateScreen, EnableMouseCapture)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
    terminal.hide_cursor()?;
    terminal.clear()?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    terminal.show_cursor()?;
    execute!(io::stdout(), DisableMouseCapture, LeaveAlternateScreen)?;
    Ok(disable_raw_mode()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_no_command_returns_none() {
        let cli = Cli::try_parse_from(["syntaxlab"]).unwrap();
        assert!(cli.command.is_none());
        assert!(!cli.debug);
    }

    #[test]
    fn test_debug_flag_works() {
        let cli = Cli::try_parse_from(["syntaxlab", "--debug"]).unwrap();
        assert!(cli.debug);
        let cli = Cli::try_parse_from(["syntaxlab", "-d"]).unwrap();
        assert!(cli.debug);
    }

    #[test]
    fn test_report_command_defaults() {
        let cli = Cli::try_parse_from(["syntaxlab", "report"]).unwrap();
        assert_eq!(
            cli.command,
            Some(Command::Report {
                events: None,
                json: false
            })
        );
    }

    #[test]
    fn test_report_command_with_options() {
        let cli =
            Cli::try_parse_from(["syntaxlab", "report", "--events", "/tmp/e.jsonl", "--json"])
                .unwrap();
        match cli.command {
            Some(Command::Report { events, json }) => {
                assert_eq!(events, Some(PathBuf::from("/tmp/e.jsonl")));
                assert!(json);
            }
            _ => panic!("Expected Report command"),
        }
    }

    #[test]
    fn test_sequence_requires_group() {
        assert!(Cli::try_parse_from(["syntaxlab", "sequence"]).is_err());
        let cli = Cli::try_parse_from(["syntaxlab", "sequence", "BA"]).unwrap();
        assert_eq!(
            cli.command,
            Some(Command::Sequence {
                group: "BA".to_string()
            })
        );
    }

    #[test]
    fn test_reset_command() {
        let cli = Cli::try_parse_from(["syntaxlab", "reset"]).unwrap();
        assert_eq!(cli.command, Some(Command::Reset));
    }

    #[test]
    fn test_run_sequence_rejects_unknown_group() {
        let catalog = TaskCatalog::builtin().unwrap();
        assert!(run_sequence(&catalog, "CD").is_err());
        assert!(run_sequence(&catalog, "AB").is_ok());
    }

    #[test]
    fn test_run_reset_clears_stored_participant() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("identity.json");
        let mut store = FileIdentityStore::new(&path);
        store.set(syntaxlab::identity::KEY_GROUP, "BA").unwrap();

        run_reset(&path).unwrap();
        assert_eq!(FileIdentityStore::new(&path).get(syntaxlab::identity::KEY_GROUP), None);
        // Nothing stored is fine too.
        run_reset(&temp.path().join("missing.json")).unwrap();
    }

    #[test]
    fn test_unknown_subcommand_fails() {
        assert!(Cli::try_parse_from(["syntaxlab", "run"]).is_err());
    }
}
