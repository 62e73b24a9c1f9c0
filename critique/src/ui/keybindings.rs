//! Keybinding dispatcher for critique.
//!
//! Translates crossterm `KeyEvent`s into `AppState` mutations. Keys whose effect
//! reaches beyond UI state (submitting a review, persisting a preference,
//! switching the editor's syntax mode, writing a file) are returned as a
//! [`KeyAction`] for the session controller to carry out.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::{AppState, Mode, PanelFocus};

/// What the event loop should do after a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    /// Handled here; just redraw.
    Continue,
    Quit,
    /// Submit the editor contents for review.
    Analyze,
    /// Switch to the next source language.
    CycleLanguage,
    /// Switch to the next response language and persist it.
    CycleResponseLanguage,
    /// Write the current result to an HTML file.
    ExportHtml,
}

/// Dispatches a key event to the handler for the current mode.
pub fn handle_key(key: KeyEvent, state: &mut AppState) -> KeyAction {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    if ctrl && key.code == KeyCode::Char('c') {
        return KeyAction::Quit;
    }
    match state.mode {
        Mode::Alert => {
            state.dismiss_alert();
            KeyAction::Continue
        }
        Mode::HelpOverlay => handle_help(key, state),
        Mode::Normal => handle_normal(key, state),
        Mode::Insert => handle_insert(key, state),
    }
}

// ---------------------------------------------------------------------------
// Normal mode
// ---------------------------------------------------------------------------

fn handle_normal(key: KeyEvent, state: &mut AppState) -> KeyAction {
    if let Some(action) = handle_scroll_key(key, state) {
        return action;
    }
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    match key.code {
        KeyCode::Char('r') if ctrl => KeyAction::Analyze,
        KeyCode::Enter => KeyAction::Analyze,

        KeyCode::Char('i') | KeyCode::Char('a') => {
            state.focus = PanelFocus::Editor;
            state.mode = Mode::Insert;
            KeyAction::Continue
        }

        // Panel focus
        KeyCode::Tab | KeyCode::Char('H') | KeyCode::Char('L') => {
            state.focus = state.focus.toggle();
            KeyAction::Continue
        }

        // Selectors
        KeyCode::Char('l') => KeyAction::CycleLanguage,
        KeyCode::Char('m') => {
            state.models.select_next();
            KeyAction::Continue
        }
        KeyCode::Char('M') => {
            state.models.select_prev();
            KeyAction::Continue
        }
        KeyCode::Char('r') => KeyAction::CycleResponseLanguage,

        KeyCode::Char('e') => KeyAction::ExportHtml,

        KeyCode::Char('?') => {
            state.help_scroll = 0;
            state.mode = Mode::HelpOverlay;
            KeyAction::Continue
        }

        KeyCode::Char('q') | KeyCode::Esc => KeyAction::Quit,

        _ => KeyAction::Continue,
    }
}

/// j / k / g / G and Ctrl-d / Ctrl-u on the focused panel. `None` when the key is
/// not a scroll key.
fn handle_scroll_key(key: KeyEvent, state: &mut AppState) -> Option<KeyAction> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    match key.code {
        KeyCode::Char('j') | KeyCode::Down => state.scroll_down(1),
        KeyCode::Char('k') | KeyCode::Up => state.scroll_up(1),
        KeyCode::Char('g') => state.scroll_top(),
        KeyCode::Char('G') => state.scroll_bottom(),
        KeyCode::Char('d') if ctrl => state.half_page_down(),
        KeyCode::Char('u') if ctrl => state.half_page_up(),
        KeyCode::PageDown => state.half_page_down(),
        KeyCode::PageUp => state.half_page_up(),
        _ => return None,
    }
    Some(KeyAction::Continue)
}

// ---------------------------------------------------------------------------
// HelpOverlay mode
// ---------------------------------------------------------------------------

fn handle_help(key: KeyEvent, state: &mut AppState) -> KeyAction {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => {
            state.help_scroll = state.help_scroll.saturating_add(1);
        }
        KeyCode::Char('k') | KeyCode::Up => {
            state.help_scroll = state.help_scroll.saturating_sub(1);
        }
        KeyCode::Char('g') => state.help_scroll = 0,
        KeyCode::Char('?') | KeyCode::Esc | KeyCode::Char('q') => state.mode = Mode::Normal,
        _ => {}
    }
    KeyAction::Continue
}

// ---------------------------------------------------------------------------
// Insert mode
// ---------------------------------------------------------------------------

/// Editing keys go to the editor; Esc returns to Normal mode.
fn handle_insert(key: KeyEvent, state: &mut AppState) -> KeyAction {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let editor = &mut state.editor;

    match key.code {
        KeyCode::Esc => state.mode = Mode::Normal,
        KeyCode::Char('r') if ctrl => return KeyAction::Analyze,
        KeyCode::Char(_) if ctrl => {}
        KeyCode::Char(c) => editor.insert_char(c),
        KeyCode::Enter => editor.insert_newline(),
        KeyCode::Tab => editor.insert_tab(),
        KeyCode::Backspace => editor.backspace(),
        KeyCode::Delete => editor.delete(),
        KeyCode::Left => editor.move_left(),
        KeyCode::Right => editor.move_right(),
        KeyCode::Up => editor.move_up(1),
        KeyCode::Down => editor.move_down(1),
        KeyCode::Home => editor.move_home(),
        KeyCode::End => editor.move_end(),
        KeyCode::PageUp => editor.move_up((state.editor_viewport_height / 2).max(1) as usize),
        KeyCode::PageDown => {
            editor.move_down((state.editor_viewport_height / 2).max(1) as usize)
        }
        _ => {}
    }
    KeyAction::Continue
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::CodeEditor;
    use critique_core::SourceLanguage;

    fn state() -> AppState {
        AppState::new(SourceLanguage::Python, vec!["en".into(), "de".into()])
    }

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    #[test]
    fn insert_mode_types_into_editor() {
        let mut s = state();
        assert_eq!(handle_key(press(KeyCode::Char('i')), &mut s), KeyAction::Continue);
        assert_eq!(s.mode, Mode::Insert);
        for c in "print(1)".chars() {
            handle_key(press(KeyCode::Char(c)), &mut s);
        }
        handle_key(press(KeyCode::Enter), &mut s);
        handle_key(press(KeyCode::Tab), &mut s);
        handle_key(press(KeyCode::Char('x')), &mut s);
        assert_eq!(s.editor.text(), "print(1)\n    x");
        handle_key(press(KeyCode::Esc), &mut s);
        assert_eq!(s.mode, Mode::Normal);
    }

    #[test]
    fn q_in_insert_mode_is_text_not_quit() {
        let mut s = state();
        s.mode = Mode::Insert;
        assert_eq!(handle_key(press(KeyCode::Char('q')), &mut s), KeyAction::Continue);
        assert_eq!(s.editor.text(), "q");
    }

    #[test]
    fn normal_mode_actions() {
        let mut s = state();
        assert_eq!(handle_key(press(KeyCode::Enter), &mut s), KeyAction::Analyze);
        assert_eq!(handle_key(ctrl('r'), &mut s), KeyAction::Analyze);
        assert_eq!(handle_key(press(KeyCode::Char('l')), &mut s), KeyAction::CycleLanguage);
        assert_eq!(
            handle_key(press(KeyCode::Char('r')), &mut s),
            KeyAction::CycleResponseLanguage
        );
        assert_eq!(handle_key(press(KeyCode::Char('e')), &mut s), KeyAction::ExportHtml);
        assert_eq!(handle_key(press(KeyCode::Char('q')), &mut s), KeyAction::Quit);
        assert_eq!(handle_key(press(KeyCode::Esc), &mut s), KeyAction::Quit);
    }

    #[test]
    fn ctrl_c_quits_from_any_mode() {
        let mut s = state();
        s.mode = Mode::Insert;
        assert_eq!(handle_key(ctrl('c'), &mut s), KeyAction::Quit);
    }

    #[test]
    fn ctrl_r_analyzes_from_insert_mode() {
        let mut s = state();
        s.mode = Mode::Insert;
        assert_eq!(handle_key(ctrl('r'), &mut s), KeyAction::Analyze);
        assert_eq!(s.editor.text(), "");
    }

    #[test]
    fn any_key_dismisses_alert() {
        let mut s = state();
        s.show_alert("unreachable");
        assert_eq!(handle_key(press(KeyCode::Char('q')), &mut s), KeyAction::Continue);
        assert_eq!(s.mode, Mode::Normal);
        assert!(s.alert.is_none());
    }

    #[test]
    fn help_overlay_opens_and_closes() {
        let mut s = state();
        handle_key(press(KeyCode::Char('?')), &mut s);
        assert_eq!(s.mode, Mode::HelpOverlay);
        handle_key(press(KeyCode::Char('j')), &mut s);
        assert_eq!(s.help_scroll, 1);
        assert_eq!(handle_key(press(KeyCode::Char('q')), &mut s), KeyAction::Continue);
        assert_eq!(s.mode, Mode::Normal);
    }

    #[test]
    fn focus_toggles_and_scroll_follows_focus() {
        let mut s = state();
        handle_key(press(KeyCode::Tab), &mut s);
        assert_eq!(s.focus, PanelFocus::Result);
        handle_key(press(KeyCode::Char('j')), &mut s);
        assert_eq!(s.result_scroll, 1);
        handle_key(press(KeyCode::Char('L')), &mut s);
        assert_eq!(s.focus, PanelFocus::Editor);
    }

    #[test]
    fn placeholder_model_selection_does_not_move() {
        let mut s = state();
        handle_key(press(KeyCode::Char('m')), &mut s);
        assert_eq!(s.models.selected_index(), 0);
        assert!(s.models.is_placeholder());
    }
}
