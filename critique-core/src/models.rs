//! Model directory validation and the selector state built from it.

use serde_json::Value;

use crate::error::ApiError;
use crate::types::{ModelDescriptor, ModelDirectory};

/// Placeholder label when the payload is unusable and the server said nothing.
pub const MODELS_UNAVAILABLE: &str = "Models unavailable";
/// Placeholder label when the directory could not be fetched at all.
pub const MODELS_LOAD_FAILED: &str = "Failed to load models";

/// A single entry of the model selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelOption {
    /// Model id sent with review requests. Empty for the placeholder.
    pub value: String,
    pub label: String,
    /// `false` only for the placeholder, which cannot be submitted.
    pub enabled: bool,
}

/// The model selector: its options and the selected index.
///
/// Always holds at least one option; a failed load leaves exactly one disabled
/// placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSelector {
    options: Vec<ModelOption>,
    selected: usize,
}

impl Default for ModelSelector {
    /// The state before the directory has arrived.
    fn default() -> Self {
        Self::placeholder("Loading models...")
    }
}

impl ModelSelector {
    /// A selector holding a single disabled option labelled `label`.
    pub fn placeholder(label: impl Into<String>) -> Self {
        let label = label.into();
        let label = if label.trim().is_empty() { MODELS_UNAVAILABLE.to_owned() } else { label };
        Self {
            options: vec![ModelOption { value: String::new(), label, enabled: false }],
            selected: 0,
        }
    }

    /// One option per model, in directory order.
    ///
    /// Selection prefers the first model flagged `is_default`, then the model
    /// whose id equals `default_model`, then the first entry.
    pub fn from_directory(directory: &ModelDirectory) -> Self {
        if directory.models.is_empty() {
            return Self::placeholder(MODELS_UNAVAILABLE);
        }
        let options = directory
            .models
            .iter()
            .map(|m| ModelOption { value: m.id.clone(), label: m.name.clone(), enabled: true })
            .collect();
        let selected = directory
            .models
            .iter()
            .position(|m| m.is_default)
            .or_else(|| {
                let default_id = directory.default_model.as_deref()?;
                directory.models.iter().position(|m| m.id == default_id)
            })
            .unwrap_or(0);
        Self { options, selected }
    }

    /// Builds the selector from the outcome of a directory fetch. Never fails.
    pub fn from_response(response: Result<Value, ApiError>) -> Self {
        match response {
            Ok(raw) => match parse_directory(&raw) {
                Ok(directory) => Self::from_directory(&directory),
                Err(label) => {
                    tracing::warn!(%label, "model directory unusable");
                    Self::placeholder(label)
                }
            },
            Err(e) => {
                tracing::warn!(%e, "model directory request failed");
                Self::placeholder(MODELS_LOAD_FAILED)
            }
        }
    }

    pub fn options(&self) -> &[ModelOption] {
        &self.options
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn selected(&self) -> &ModelOption {
        &self.options[self.selected]
    }

    /// Model id to submit, or `None` while only the placeholder is present.
    pub fn selected_model(&self) -> Option<&str> {
        let option = self.selected();
        option.enabled.then_some(option.value.as_str())
    }

    /// `true` when the selector holds only the disabled placeholder.
    pub fn is_placeholder(&self) -> bool {
        self.options.iter().all(|o| !o.enabled)
    }

    /// Moves the selection to the next enabled option (wraps around).
    pub fn select_next(&mut self) {
        self.step(1);
    }

    /// Moves the selection to the previous enabled option (wraps around).
    pub fn select_prev(&mut self) {
        self.step(self.options.len() - 1);
    }

    fn step(&mut self, by: usize) {
        let len = self.options.len();
        let mut idx = self.selected;
        for _ in 0..len {
            idx = (idx + by) % len;
            if self.options[idx].enabled {
                self.selected = idx;
                return;
            }
        }
    }
}

/// Validates a raw `GET /api/models` payload.
///
/// Returns the placeholder label on failure: the server's `error` text if it sent
/// one, else [`MODELS_UNAVAILABLE`]. Individual entries that lack `id` or `name`
/// are skipped.
pub fn parse_directory(raw: &Value) -> Result<ModelDirectory, String> {
    let server_error = || {
        raw.get("error")
            .and_then(Value::as_str)
            .filter(|e| !e.is_empty())
            .unwrap_or(MODELS_UNAVAILABLE)
            .to_owned()
    };

    if raw.get("success").and_then(Value::as_bool) != Some(true) {
        return Err(server_error());
    }
    let Some(entries) = raw.get("models").and_then(Value::as_array) else {
        return Err(server_error());
    };

    let models = entries
        .iter()
        .filter_map(|entry| match serde_json::from_value::<ModelDescriptor>(entry.clone()) {
            Ok(m) => Some(m),
            Err(e) => {
                tracing::debug!(%e, "skipping malformed model entry");
                None
            }
        })
        .collect();
    let default_model = raw.get("default_model").and_then(Value::as_str).map(str::to_owned);

    Ok(ModelDirectory { models, default_model })
}
