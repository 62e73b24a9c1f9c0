//! critique: terminal client for an AI code-review backend.
//!
//! Startup order matters:
//!
//! 1. Parse arguments, start file logging, load config. Nothing here touches the
//!    terminal, so errors still print normally.
//! 2. Read the preloaded file and build the HTTP client; failures abort before
//!    raw mode is entered.
//! 3. Open the preference store. Failure only disables persistence.
//! 4. `install_panic_hook()`, `register_sigterm()`, then `init_tui()`.
//! 5. Spawn the input task, start the session, run the event loop.
//!
//! `restore_tui()` runs after the loop on every non-panic exit path; the panic
//! hook covers the rest.

mod app;
mod config;
mod editor;
mod event;
mod session;
mod theme;
mod tui;
mod ui;

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::atomic::Ordering;
use std::sync::Mutex;
use std::time::Duration;

use clap::Parser;
use critique_core::{PreferenceStore, ReviewClient, SourceLanguage};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::Config;
use crate::editor::CodeEditor;

#[derive(Parser, Debug)]
#[command(name = "critique", version, about = "Submit code for AI review from the terminal")]
struct Args {
    /// File to load into the editor
    file: Option<PathBuf>,

    /// Source language (python, javascript, java, cpp). Defaults to the file
    /// extension, then python.
    #[arg(short, long, value_parser = parse_language)]
    language: Option<SourceLanguage>,

    /// Backend base URL, overriding `server_url` from the config file
    #[arg(short, long)]
    server: Option<String>,

    /// Config file to read instead of the default location
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn parse_language(s: &str) -> Result<SourceLanguage, String> {
    SourceLanguage::parse(s)
        .ok_or_else(|| format!("unsupported language '{s}' (expected python, javascript, java or cpp)"))
}

fn language_from_path(path: &Path) -> Option<SourceLanguage> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .and_then(SourceLanguage::parse)
}

/// Logs go to a file; writing to stdout or stderr would corrupt the TUI.
fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let path = config::log_path();
    let file = path
        .parent()
        .map_or(Ok(()), fs::create_dir_all)
        .and_then(|()| OpenOptions::new().create(true).append(true).open(&path));

    match file {
        Ok(file) => {
            tracing_subscriber::registry()
                .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
                .with(env_filter)
                .init();
            tracing::info!(path = %path.display(), "logging initialized");
        }
        Err(_) => tracing_subscriber::registry().with(env_filter).init(),
    }
}

fn to_io_error(e: impl std::error::Error + Send + Sync + 'static) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::Other, e)
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let args = Args::parse();
    init_tracing();

    let config_file = args.config.clone().unwrap_or_else(config::config_path);
    let mut config = Config::load(&config_file);
    if let Some(server) = args.server {
        config.server_url = server;
    }
    let theme = theme::Theme::from_name(&config.theme);

    let preload = match &args.file {
        Some(path) => Some(fs::read_to_string(path)?),
        None => None,
    };
    let language = args
        .language
        .or_else(|| args.file.as_deref().and_then(language_from_path))
        .unwrap_or_default();

    let client = ReviewClient::new(&config.client_options()).map_err(to_io_error)?;
    tracing::info!(
        server = %client.base_url(),
        flavor = ?client.flavor(),
        preflight = config.preflight_ping(),
        "starting"
    );

    let store_path = config::store_path();
    let prefs = match PreferenceStore::open(&store_path).await {
        Ok(store) => Some(store),
        Err(e) => {
            tracing::warn!(path = %store_path.display(), %e, "preference store unavailable");
            None
        }
    };

    tui::install_panic_hook();
    let term_flag = tui::register_sigterm();
    let mut terminal = tui::init_tui()?;

    let handler = event::EventHandler::new();
    event::spawn_event_task(handler.tx.clone());
    let mut rx = handler.rx;

    let mut state = app::AppState::new(language, config.response_languages.clone());
    if let Some(code) = &preload {
        state.editor.set_text(code);
    }
    let mut session =
        session::Session::new(state, client, prefs, handler.tx.clone(), config.preflight_ping());
    session.start();

    // Exits only via `break` so `restore_tui()` below is always reached. Draw
    // errors are held until after the terminal is restored.
    let mut outcome = Ok(());
    'event_loop: loop {
        tokio::select! {
            // Heartbeat so SIGTERM is noticed even when no events arrive.
            _ = tokio::time::sleep(Duration::from_millis(50)) => {
                if term_flag.load(Ordering::Relaxed) {
                    break 'event_loop;
                }
            }
            maybe_event = rx.recv() => {
                match maybe_event {
                    Some(event::AppEvent::Render) => {
                        if let Err(e) = terminal.draw(|frame| ui::render(frame, &mut session.state, &theme)) {
                            outcome = Err(e);
                            break 'event_loop;
                        }
                    }
                    Some(event) => {
                        if !session.handle_event(event) {
                            break 'event_loop;
                        }
                    }
                    None => break 'event_loop,
                }
                if term_flag.load(Ordering::Relaxed) {
                    break 'event_loop;
                }
            }
        }
    }

    tui::restore_tui()?;
    tracing::info!("exiting");
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn language_flag_accepts_names_and_extensions() {
        let args = Args::try_parse_from(["critique", "--language", "cpp", "main.py"]).unwrap();
        assert_eq!(args.language, Some(SourceLanguage::Cpp));
        assert_eq!(args.file, Some(PathBuf::from("main.py")));
        assert!(Args::try_parse_from(["critique", "-l", "cobol"]).is_err());
    }

    #[test]
    fn language_is_inferred_from_extension() {
        assert_eq!(language_from_path(Path::new("a/b.js")), Some(SourceLanguage::Javascript));
        assert_eq!(language_from_path(Path::new("Main.java")), Some(SourceLanguage::Java));
        assert_eq!(language_from_path(Path::new("README")), None);
    }
}
