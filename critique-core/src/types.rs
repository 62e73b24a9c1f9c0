//! Wire and domain types shared by the review client, renderer, and TUI.
//!
//! Request types serialize to exactly the JSON bodies the backend expects. Response
//! types are deliberately lenient (`#[serde(default)]`) because the backend omits
//! fields freely; shape validation happens in [`crate::api`] and [`crate::models`].

use serde::{Deserialize, Serialize};

/// Source languages the backend accepts for review.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceLanguage {
    #[default]
    Python,
    Javascript,
    Java,
    Cpp,
}

impl SourceLanguage {
    /// Every supported language, in selector order.
    pub const ALL: [SourceLanguage; 4] = [
        SourceLanguage::Python,
        SourceLanguage::Javascript,
        SourceLanguage::Java,
        SourceLanguage::Cpp,
    ];

    /// The identifier sent on the wire (`"python"`, `"cpp"`, ...).
    pub fn as_str(self) -> &'static str {
        match self {
            SourceLanguage::Python => "python",
            SourceLanguage::Javascript => "javascript",
            SourceLanguage::Java => "java",
            SourceLanguage::Cpp => "cpp",
        }
    }

    /// Human-readable label for the status bar.
    pub fn label(self) -> &'static str {
        match self {
            SourceLanguage::Python => "Python",
            SourceLanguage::Javascript => "JavaScript",
            SourceLanguage::Java => "Java",
            SourceLanguage::Cpp => "C++",
        }
    }

    /// Parses a wire identifier or a common file extension.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "python" | "py" => Some(SourceLanguage::Python),
            "javascript" | "js" | "mjs" => Some(SourceLanguage::Javascript),
            "java" => Some(SourceLanguage::Java),
            "cpp" | "c++" | "cc" | "cxx" | "hpp" | "h" => Some(SourceLanguage::Cpp),
            _ => None,
        }
    }

    /// Next language in selector order (wraps around).
    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|l| *l == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }
}

/// Body of `POST /api/review`.
///
/// The controller guarantees `code` is non-empty before building one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewRequest {
    pub code: String,
    pub language: SourceLanguage,
    pub model: String,
    pub response_language: String,
}

/// Body of the legacy `POST /api/review`, which only knows code and language.
#[derive(Debug, Clone, Serialize)]
pub struct LegacyReviewRequest<'a> {
    pub code: &'a str,
    pub language: SourceLanguage,
}

impl<'a> From<&'a ReviewRequest> for LegacyReviewRequest<'a> {
    fn from(req: &'a ReviewRequest) -> Self {
        Self { code: &req.code, language: req.language }
    }
}

/// Response envelope of `POST /api/review`.
///
/// `result` is `None` only when the key is absent; an explicit `null` is kept
/// as `Some(Value::Null)`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReviewEnvelope {
    #[serde(default)]
    pub success: bool,
    #[serde(default, deserialize_with = "present_value")]
    pub result: Option<serde_json::Value>,
    #[serde(default)]
    pub error: Option<serde_json::Value>,
}

impl ReviewEnvelope {
    /// The server's `error` as text. Non-string values are stringified as JSON;
    /// `null` and `""` count as no message.
    pub fn error_message(&self) -> Option<String> {
        match self.error.as_ref()? {
            serde_json::Value::String(s) if s.is_empty() => None,
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Null => None,
            other => Some(other.to_string()),
        }
    }
}

fn present_value<'de, D>(deserializer: D) -> Result<Option<serde_json::Value>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    serde_json::Value::deserialize(deserializer).map(Some)
}

/// Response of the legacy `POST /api/review`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LegacyReviewResponse {
    #[serde(default)]
    pub ml_suggestions: Option<String>,
    #[serde(default)]
    pub static_analysis: Option<Vec<ToolOutput>>,
}

/// One static-analysis tool's output. `output` may or may not be JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolOutput {
    pub tool: String,
    #[serde(default)]
    pub output: String,
}

/// A successful review result, before rendering.
#[derive(Debug, Clone, PartialEq)]
pub enum ReviewPayload {
    /// Free text, treated as Markdown.
    Text(String),
    /// Any non-string JSON value; pretty-printed before rendering.
    Structured(serde_json::Value),
    /// Legacy backend output: optional ML suggestions plus per-tool entries.
    StaticAnalysis {
        suggestions: Option<String>,
        entries: Vec<ToolOutput>,
    },
}

impl From<serde_json::Value> for ReviewPayload {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::String(s) => ReviewPayload::Text(s),
            other => ReviewPayload::Structured(other),
        }
    }
}

impl From<LegacyReviewResponse> for ReviewPayload {
    fn from(resp: LegacyReviewResponse) -> Self {
        ReviewPayload::StaticAnalysis {
            suggestions: resp.ml_suggestions,
            entries: resp.static_analysis.unwrap_or_default(),
        }
    }
}

/// One entry of the model directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelDescriptor {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub is_default: bool,
}

/// A well-formed `GET /api/models` response.
///
/// Only constructed after the raw payload passed shape validation; see
/// [`crate::models::parse_directory`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelDirectory {
    pub models: Vec<ModelDescriptor>,
    pub default_model: Option<String>,
}
