//! Turns review payloads into displayable documents.
//!
//! Every payload becomes a [`RenderedResult`]: an ordered list of [`Block`]s, each
//! carrying both its source text (for the terminal) and safe HTML (for export).
//! Anything that did not go through the Markdown transform is HTML-escaped before
//! it reaches markup.

use pulldown_cmark::{html, Event, Options, Parser};
use serde_json::Value;
use thiserror::Error;

use crate::types::{ReviewPayload, ToolOutput};

/// Text shown when a legacy response carried neither suggestions nor tool output.
pub const EMPTY_ANALYSIS: &str = "No analysis results.";

#[derive(Debug, Error)]
#[error("markdown rendering failed: {0}")]
pub struct RenderError(pub String);

/// Markdown-to-HTML transform used by [`ResultRenderer`].
///
/// Implementations may fail; the renderer then falls back to plain text.
pub trait MarkdownRenderer: Send + Sync {
    fn to_html(&self, markdown: &str) -> Result<String, RenderError>;
}

/// CommonMark with the GitHub extensions backends typically emit.
///
/// Raw HTML embedded in the Markdown is escaped, never passed through.
#[derive(Debug, Clone)]
pub struct CommonMark {
    options: Options,
}

impl Default for CommonMark {
    fn default() -> Self {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TASKLISTS);
        Self { options }
    }
}

impl MarkdownRenderer for CommonMark {
    fn to_html(&self, markdown: &str) -> Result<String, RenderError> {
        let parser = Parser::new_ext(markdown, self.options).map(|event| match event {
            Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
            other => other,
        });
        let mut out = String::with_capacity(markdown.len() * 3 / 2);
        html::push_html(&mut out, parser);
        Ok(out)
    }
}

/// One displayable unit of a rendered result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    /// Text that went through the Markdown transform.
    Markdown { source: String, html: String },
    /// Text shown verbatim, never interpreted.
    PlainText(String),
    /// A static-analysis tool section; `json` is true when `body` is pretty-printed JSON.
    Tool { tool: String, body: String, json: bool },
}

impl Block {
    /// Safe HTML for this block.
    pub fn to_html(&self) -> String {
        match self {
            Block::Markdown { html, .. } => html.clone(),
            Block::PlainText(text) => format!("<pre class=\"plain\">{}</pre>\n", escape_html(text)),
            Block::Tool { tool, body, json } => {
                let class = if *json { " class=\"language-json\"" } else { "" };
                format!(
                    "<h3>{}</h3>\n<pre><code{class}>{}</code></pre>\n",
                    escape_html(tool),
                    escape_html(body)
                )
            }
        }
    }
}

/// A fully rendered review result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedResult {
    pub blocks: Vec<Block>,
}

impl RenderedResult {
    /// Concatenated HTML of all blocks.
    pub fn to_html(&self) -> String {
        self.blocks.iter().map(Block::to_html).collect()
    }

    /// A standalone HTML page wrapping [`Self::to_html`].
    pub fn to_document(&self, title: &str) -> String {
        format!(
            "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n\
             <style>body{{font-family:sans-serif;max-width:60rem;margin:2rem auto}}\
             pre{{background:#f5f5f5;padding:1rem;overflow:auto}}</style>\n</head>\n<body>\n{}</body>\n</html>\n",
            escape_html(title),
            self.to_html()
        )
    }
}

/// Converts review payloads into [`RenderedResult`]s.
pub struct ResultRenderer {
    markdown: Box<dyn MarkdownRenderer>,
}

impl Default for ResultRenderer {
    fn default() -> Self {
        Self::new(Box::new(CommonMark::default()))
    }
}

impl ResultRenderer {
    pub fn new(markdown: Box<dyn MarkdownRenderer>) -> Self {
        Self { markdown }
    }

    /// Renders a successful review payload. Never fails: serialization and
    /// Markdown errors degrade to plain-text blocks.
    pub fn render(&self, payload: &ReviewPayload) -> RenderedResult {
        let blocks = match payload {
            ReviewPayload::Text(text) => vec![self.render_text(text)],
            ReviewPayload::Structured(value) => vec![self.render_text(&pretty_json(value))],
            ReviewPayload::StaticAnalysis { suggestions, entries } => {
                let mut blocks: Vec<Block> = suggestions
                    .iter()
                    .filter(|s| !s.trim().is_empty())
                    .map(|s| self.render_text(s))
                    .collect();
                blocks.extend(entries.iter().map(render_tool));
                if blocks.is_empty() {
                    blocks.push(Block::PlainText(EMPTY_ANALYSIS.to_owned()));
                }
                blocks
            }
        };
        RenderedResult { blocks }
    }

    fn render_text(&self, text: &str) -> Block {
        match self.markdown.to_html(text) {
            Ok(html) => Block::Markdown { source: text.to_owned(), html },
            Err(e) => {
                tracing::warn!(%e, "markdown rendering failed, showing plain text");
                Block::PlainText(text.to_owned())
            }
        }
    }
}

/// Serializes `value` as 2-space indented JSON. On failure the error text is
/// returned in its place.
pub fn pretty_json(value: &Value) -> String {
    serde_json::to_string_pretty(value)
        .unwrap_or_else(|e| format!("Failed to convert result to text: {e}"))
}

fn render_tool(entry: &ToolOutput) -> Block {
    match serde_json::from_str::<Value>(&entry.output) {
        Ok(parsed) => Block::Tool {
            tool: entry.tool.clone(),
            body: pretty_json(&parsed),
            json: true,
        },
        Err(_) => Block::Tool {
            tool: entry.tool.clone(),
            body: entry.output.clone(),
            json: false,
        },
    }
}

/// Escapes `& < > " '` so `text` can be embedded in HTML as inert text.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
    out
}
