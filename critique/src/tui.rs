//! Terminal lifecycle: raw mode, alternate screen, bracketed paste, and the
//! panic/SIGTERM plumbing that guarantees the terminal is restored.
//!
//! Bracketed paste is enabled so pasting a snippet into the editor arrives as a
//! single [`crossterm::event::Event::Paste`] instead of thousands of key events.
//! Mouse capture stays off so the terminal's own text selection keeps working
//! for copying review output.

use crossterm::event::{DisableBracketedPaste, EnableBracketedPaste};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use signal_hook::consts::SIGTERM;
use signal_hook::flag::register;
use std::io::{stdout, BufWriter, Stdout};
use std::panic;
use std::sync::{atomic::AtomicBool, Arc};

/// Buffered so each frame's escape sequences go out in few write(2) calls.
pub type Tui = Terminal<CrosstermBackend<BufWriter<Stdout>>>;

/// Enters raw mode and the alternate screen. Pair with [`restore_tui`] on every
/// exit path.
///
/// # Errors
///
/// Returns `Err` if raw mode, the screen switch, or `Terminal::new` fails. Raw
/// mode is undone before returning an error from a later step.
pub fn init_tui() -> std::io::Result<Tui> {
    let mut out = BufWriter::new(stdout());
    enable_raw_mode()?;
    if let Err(e) = execute!(out, EnterAlternateScreen, EnableBracketedPaste) {
        let _ = disable_raw_mode();
        return Err(e);
    }
    Terminal::new(CrosstermBackend::new(out)).inspect_err(|_| {
        let _ = restore_tui();
    })
}

/// Leaves the alternate screen and raw mode. Idempotent; ratatui does not do this
/// on `Drop`.
///
/// # Errors
///
/// Returns `Err` if `disable_raw_mode` or `execute!` fails.
pub fn restore_tui() -> std::io::Result<()> {
    disable_raw_mode()?;
    execute!(stdout(), DisableBracketedPaste, LeaveAlternateScreen)?;
    Ok(())
}

/// Restores the terminal before the panic message prints. Call before
/// [`init_tui`]; chains onto the existing hook.
pub fn install_panic_hook() {
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = restore_tui();
        original_hook(panic_info);
    }));
}

/// Returns a flag that flips to `true` on SIGTERM; the event loop polls it.
///
/// # Panics
///
/// Panics if the OS refuses to register the handler.
pub fn register_sigterm() -> Arc<AtomicBool> {
    let term = Arc::new(AtomicBool::new(false));
    register(SIGTERM, Arc::clone(&term)).expect("Failed to register SIGTERM handler");
    term
}
