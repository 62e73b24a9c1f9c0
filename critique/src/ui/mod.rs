//! UI rendering for critique. [`render`] is the single entry point, called from
//! the event loop's `terminal.draw()` closure.

pub mod editor_view;
pub mod help;
pub mod keybindings;
mod layout;
pub mod markdown;
pub mod result_view;

use ratatui::Frame;

use crate::app::{AppState, Mode};
use crate::theme::Theme;
use layout::{compute_layout, inner_rect, render_banner, render_status_bar};

/// Draws one frame: banner, editor, result, status bar, then any overlay.
///
/// Viewport heights are cached into `state` first so the next key press can
/// size half-page scrolls.
pub fn render(frame: &mut Frame, state: &mut AppState, theme: &Theme) {
    let layout = compute_layout(frame.area(), state);

    state.editor_viewport_height = inner_rect(layout.editor).height;
    state.result_viewport_height = inner_rect(layout.result).height;

    render_banner(frame, layout.banner, state, theme);
    editor_view::render_editor(frame, layout.editor, state, theme);
    result_view::render_result(frame, layout.result, state, theme);
    render_status_bar(frame, layout.status_bar, state, theme);

    match state.mode {
        Mode::HelpOverlay => help::render_help_overlay(frame, theme, state.help_scroll),
        Mode::Alert => {
            if let Some(message) = &state.alert {
                help::render_alert(frame, theme, message);
            }
        }
        Mode::Normal | Mode::Insert => {}
    }
}
