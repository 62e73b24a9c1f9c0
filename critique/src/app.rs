//! Central UI state for critique.
//!
//! Pure state: no rendering and no I/O. The renderer reads it; the keybinding
//! dispatcher and the session controller mutate it.

use critique_core::{ModelSelector, RenderedResult, SourceLanguage};
use uuid::Uuid;

use crate::editor::{CodeEditor, TextEditor};

/// Which keybinding set is active.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Normal,
    /// Keys are typed into the editor.
    Insert,
    HelpOverlay,
    /// A blocking alert is shown; any key dismisses it.
    Alert,
}

/// Which panel receives scroll keys.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum PanelFocus {
    #[default]
    Editor,
    Result,
}

impl PanelFocus {
    pub fn toggle(self) -> Self {
        match self {
            PanelFocus::Editor => PanelFocus::Result,
            PanelFocus::Result => PanelFocus::Editor,
        }
    }
}

/// What the result panel shows. Result and error are mutually exclusive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ResultView {
    #[default]
    Hidden,
    Rendered(RenderedResult),
    /// Always shown as plain text.
    Error(String),
}

pub struct AppState {
    pub mode: Mode,
    pub focus: PanelFocus,

    pub editor: TextEditor,
    pub models: ModelSelector,
    /// Tags offered by the response-language selector.
    pub response_languages: Vec<String>,
    /// Current response language; may be a stored tag not in `response_languages`.
    pub response_language: String,
    /// Set once the user picks a response language; a stored value loaded later
    /// must not replace it.
    pub response_language_chosen: bool,

    /// Loading indicator. Set by the controller before a review is sent and
    /// cleared exactly once when it resolves.
    pub loading: bool,
    /// Token of the review currently in flight.
    pub in_flight: Option<Uuid>,
    pub view: ResultView,

    pub result_scroll: u16,
    pub result_viewport_height: u16,
    pub editor_viewport_height: u16,
    pub help_scroll: u16,

    /// Text of the blocking alert shown in `Mode::Alert`.
    pub alert: Option<String>,
    /// Persistent banner shown while the backend is believed unreachable.
    pub backend_warning: Option<String>,
    /// One-line notice in the status bar (export path, rejected actions).
    pub notice: Option<String>,
    pub spinner_frame: usize,
}

impl AppState {
    pub fn new(language: SourceLanguage, response_languages: Vec<String>) -> Self {
        let response_language = response_languages
            .first()
            .cloned()
            .unwrap_or_else(|| "en".to_owned());
        Self {
            mode: Mode::default(),
            focus: PanelFocus::default(),
            editor: TextEditor::new(language),
            models: ModelSelector::default(),
            response_languages,
            response_language,
            response_language_chosen: false,
            loading: false,
            in_flight: None,
            view: ResultView::default(),
            result_scroll: 0,
            result_viewport_height: 0,
            editor_viewport_height: 0,
            help_scroll: 0,
            alert: None,
            backend_warning: None,
            notice: None,
            spinner_frame: 0,
        }
    }

    pub fn language(&self) -> SourceLanguage {
        self.editor.syntax_mode()
    }

    /// Advances to the next source language. Returns the new language.
    pub fn cycle_language(&mut self) -> SourceLanguage {
        let next = self.language().next();
        self.editor.set_syntax_mode(next);
        next
    }

    /// Advances to the next offered response language. A stored tag that is not
    /// on the list cycles to the first entry.
    pub fn cycle_response_language(&mut self) -> &str {
        if !self.response_languages.is_empty() {
            let next = self
                .response_languages
                .iter()
                .position(|l| *l == self.response_language)
                .map(|i| (i + 1) % self.response_languages.len())
                .unwrap_or(0);
            self.response_language = self.response_languages[next].clone();
        }
        self.response_language_chosen = true;
        &self.response_language
    }

    /// Shows a blocking alert.
    pub fn show_alert(&mut self, message: impl Into<String>) {
        self.alert = Some(message.into());
        self.mode = Mode::Alert;
    }

    pub fn dismiss_alert(&mut self) {
        self.alert = None;
        self.mode = Mode::Normal;
    }

    pub fn scroll_down(&mut self, lines: u16) {
        match self.focus {
            PanelFocus::Editor => self.editor.move_down(lines as usize),
            PanelFocus::Result => self.result_scroll = self.result_scroll.saturating_add(lines),
        }
    }

    pub fn scroll_up(&mut self, lines: u16) {
        match self.focus {
            PanelFocus::Editor => self.editor.move_up(lines as usize),
            PanelFocus::Result => self.result_scroll = self.result_scroll.saturating_sub(lines),
        }
    }

    pub fn scroll_top(&mut self) {
        match self.focus {
            PanelFocus::Editor => self.editor.move_top(),
            PanelFocus::Result => self.result_scroll = 0,
        }
    }

    /// For the result panel the renderer clamps `u16::MAX` to the last page.
    pub fn scroll_bottom(&mut self) {
        match self.focus {
            PanelFocus::Editor => self.editor.move_bottom(),
            PanelFocus::Result => self.result_scroll = u16::MAX,
        }
    }

    fn viewport_height(&self) -> u16 {
        match self.focus {
            PanelFocus::Editor => self.editor_viewport_height,
            PanelFocus::Result => self.result_viewport_height,
        }
    }

    /// Half the cached viewport height, at least one row.
    pub fn half_page_down(&mut self) {
        self.scroll_down((self.viewport_height() / 2).max(1));
    }

    pub fn half_page_up(&mut self) {
        self.scroll_up((self.viewport_height() / 2).max(1));
    }

    pub fn tick(&mut self) {
        if self.loading {
            self.spinner_frame = self.spinner_frame.wrapping_add(1);
        }
    }
}
