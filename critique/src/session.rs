//! Session controller: binds the UI to the review client, the renderer, and the
//! preference store.
//!
//! All network and storage work runs in spawned tasks that report back through
//! the event channel. Every state change happens in [`Session::handle_event`] on
//! the event-loop task.

use std::path::PathBuf;
use std::sync::Arc;

use critique_core::{
    ApiError, PreferenceStore, ResultRenderer, ReviewClient, ReviewPayload, ReviewRequest,
};
use tokio::sync::mpsc::UnboundedSender;
use uuid::Uuid;

use crate::app::{AppState, Mode, PanelFocus, ResultView};
use crate::editor::CodeEditor;
use crate::event::AppEvent;
use crate::ui::keybindings::{handle_key, KeyAction};

/// Shown instead of submitting when the editor is blank.
pub const EMPTY_CODE: &str = "Please enter some code to analyze.";
/// File written by the export action, relative to the working directory.
pub const EXPORT_FILE: &str = "critique-review.html";

pub struct Session {
    pub state: AppState,
    client: Arc<ReviewClient>,
    prefs: Option<PreferenceStore>,
    renderer: ResultRenderer,
    tx: UnboundedSender<AppEvent>,
    preflight_ping: bool,
    /// Request held while its preflight ping is outstanding.
    pending: Option<ReviewRequest>,
    export_path: PathBuf,
}

impl Session {
    pub fn new(
        state: AppState,
        client: ReviewClient,
        prefs: Option<PreferenceStore>,
        tx: UnboundedSender<AppEvent>,
        preflight_ping: bool,
    ) -> Self {
        Self {
            state,
            client: Arc::new(client),
            prefs,
            renderer: ResultRenderer::default(),
            tx,
            preflight_ping,
            pending: None,
            export_path: PathBuf::from(EXPORT_FILE),
        }
    }

    /// Kicks off the model load, the preference load and, when enabled, the
    /// startup connectivity check. Returns immediately.
    pub fn start(&self) {
        let client = Arc::clone(&self.client);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let models = client.load_models().await;
            let _ = tx.send(AppEvent::ModelsLoaded(models));
        });

        if let Some(store) = self.prefs.clone() {
            let tx = self.tx.clone();
            tokio::spawn(async move {
                let value = match store.load_response_language().await {
                    Ok(value) => value,
                    Err(e) => {
                        tracing::warn!(%e, "failed to read response-language preference");
                        None
                    }
                };
                let _ = tx.send(AppEvent::PreferenceLoaded(value));
            });
        }

        if self.preflight_ping {
            let client = Arc::clone(&self.client);
            let tx = self.tx.clone();
            tokio::spawn(async move {
                let reachable = client.ping().await;
                let _ = tx.send(AppEvent::StartupPing(reachable));
            });
        }
    }

    /// Applies one event. Returns `false` when the session should end.
    ///
    /// `Render` and `Resize` are the event loop's business and are ignored here.
    pub fn handle_event(&mut self, event: AppEvent) -> bool {
        match event {
            AppEvent::Key(key) => return self.on_key(key),
            AppEvent::Paste(text) => {
                if self.state.mode == Mode::Insert || self.state.focus == PanelFocus::Editor {
                    self.state.editor.insert_text(&text);
                }
            }
            AppEvent::Tick => self.state.tick(),
            AppEvent::ModelsLoaded(models) => {
                tracing::info!(
                    count = models.options().len(),
                    placeholder = models.is_placeholder(),
                    "model directory loaded"
                );
                self.state.models = models;
            }
            AppEvent::PreferenceLoaded(Some(value)) if !self.state.response_language_chosen => {
                self.state.response_language = value;
            }
            AppEvent::PreferenceLoaded(_) => {}
            AppEvent::StartupPing(reachable) => self.on_startup_ping(reachable),
            AppEvent::PreflightPing { token, reachable } => self.on_preflight(token, reachable),
            AppEvent::ReviewFinished { token, outcome } => self.on_review_finished(token, *outcome),
            AppEvent::Quit => return false,
            AppEvent::Render | AppEvent::Resize(_, _) => {}
        }
        true
    }

    fn on_key(&mut self, key: crossterm::event::KeyEvent) -> bool {
        match handle_key(key, &mut self.state) {
            KeyAction::Quit => return false,
            KeyAction::Continue => {}
            KeyAction::Analyze => self.analyze(),
            KeyAction::CycleLanguage => self.change_language(),
            KeyAction::CycleResponseLanguage => self.change_response_language(),
            KeyAction::ExportHtml => self.export_html(),
        }
        true
    }

    /// Switches the source language and the editor's syntax mode with it.
    pub fn change_language(&mut self) {
        let language = self.state.cycle_language();
        tracing::debug!(language = language.as_str(), "source language changed");
    }

    /// Moves to the next response language and persists it in the background.
    pub fn change_response_language(&mut self) {
        let value = self.state.cycle_response_language().to_owned();
        let Some(store) = self.prefs.clone() else {
            return;
        };
        tokio::spawn(async move {
            if let Err(e) = store.save_response_language(&value).await {
                tracing::warn!(%e, "failed to save response-language preference");
            }
        });
    }

    /// Submits the editor contents with the current selector values.
    ///
    /// Rejected while another review is in flight, and when the editor is blank.
    pub fn analyze(&mut self) {
        if self.state.in_flight.is_some() {
            self.state.notice = Some("A review is already running".to_owned());
            return;
        }
        if self.state.editor.is_blank() {
            self.display_error(EMPTY_CODE.to_owned());
            return;
        }

        let request = ReviewRequest {
            code: self.state.editor.text(),
            language: self.state.language(),
            model: self.state.models.selected_model().unwrap_or_default().to_owned(),
            response_language: self.state.response_language.clone(),
        };
        let token = Uuid::new_v4();
        self.begin_loading(token);
        tracing::info!(
            %token,
            language = request.language.as_str(),
            model = %request.model,
            response_language = %request.response_language,
            "submitting review"
        );

        if self.preflight_ping {
            self.pending = Some(request);
            let client = Arc::clone(&self.client);
            let tx = self.tx.clone();
            tokio::spawn(async move {
                let reachable = client.ping().await;
                let _ = tx.send(AppEvent::PreflightPing { token, reachable });
            });
        } else {
            self.spawn_review(token, request);
        }
    }

    fn spawn_review(&self, token: Uuid, request: ReviewRequest) {
        let client = Arc::clone(&self.client);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let outcome = client.review(&request).await;
            let _ = tx.send(AppEvent::ReviewFinished { token, outcome: Box::new(outcome) });
        });
    }

    /// Shows the loading indicator and clears the previous result and error.
    fn begin_loading(&mut self, token: Uuid) {
        self.state.loading = true;
        self.state.in_flight = Some(token);
        self.state.spinner_frame = 0;
        self.state.view = ResultView::Hidden;
        self.state.notice = None;
    }

    /// Clears the loading indicator. Only reachable for the token in flight, so
    /// it runs once per review.
    fn finish_loading(&mut self) {
        self.state.loading = false;
        self.state.in_flight = None;
        self.pending = None;
    }

    fn is_current(&self, token: Uuid) -> bool {
        if self.state.in_flight == Some(token) {
            return true;
        }
        tracing::debug!(%token, "ignoring completion of a stale request");
        false
    }

    fn on_startup_ping(&mut self, reachable: bool) {
        if reachable {
            self.state.backend_warning = None;
        } else {
            tracing::warn!(url = %self.client.base_url(), "backend unreachable at startup");
            self.state.backend_warning = Some(unreachable_message(&self.client));
        }
    }

    fn on_preflight(&mut self, token: Uuid, reachable: bool) {
        if !self.is_current(token) {
            return;
        }
        if reachable {
            self.state.backend_warning = None;
            match self.pending.take() {
                Some(request) => self.spawn_review(token, request),
                None => self.finish_loading(),
            }
        } else {
            self.finish_loading();
            let message = unreachable_message(&self.client);
            tracing::warn!(url = %self.client.base_url(), "backend unreachable, review not sent");
            self.state.backend_warning = Some(message.clone());
            self.state.show_alert(message);
        }
    }

    fn on_review_finished(&mut self, token: Uuid, outcome: Result<ReviewPayload, ApiError>) {
        if !self.is_current(token) {
            return;
        }
        self.finish_loading();
        match outcome {
            Ok(payload) => self.display_result(&payload),
            Err(e) => {
                tracing::warn!(%e, status = ?e.status(), "review failed");
                self.display_error(e.to_string());
            }
        }
    }

    /// Renders a payload into the result panel, focused and scrolled to the top.
    pub fn display_result(&mut self, payload: &ReviewPayload) {
        self.state.view = ResultView::Rendered(self.renderer.render(payload));
        self.reveal_result();
    }

    /// Shows `message` as plain text in the result panel.
    pub fn display_error(&mut self, message: String) {
        self.state.view = ResultView::Error(message);
        self.reveal_result();
    }

    fn reveal_result(&mut self) {
        self.state.result_scroll = 0;
        self.state.focus = PanelFocus::Result;
    }

    /// Writes the current result as a standalone HTML page.
    pub fn export_html(&mut self) {
        let ResultView::Rendered(result) = &self.state.view else {
            self.state.notice = Some("Nothing to export".to_owned());
            return;
        };
        let document = result.to_document("critique review");
        self.state.notice = Some(match std::fs::write(&self.export_path, document) {
            Ok(()) => {
                tracing::info!(path = %self.export_path.display(), "review exported");
                format!("Exported to {}", self.export_path.display())
            }
            Err(e) => {
                tracing::warn!(path = %self.export_path.display(), %e, "export failed");
                format!("Export failed: {e}")
            }
        });
    }
}

fn unreachable_message(client: &ReviewClient) -> String {
    format!("Backend unreachable at {}. Is the server running?", client.base_url())
}
