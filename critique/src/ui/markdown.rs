//! Markdown to ratatui lines for the result panel.
//!
//! Raw HTML in the source is shown as literal text, the same way the HTML export
//! escapes it.

use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};

use crate::theme::Theme;

pub fn render_markdown(content: &str, theme: &Theme) -> Vec<Line<'static>> {
    let options = Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS;
    let mut renderer = MarkdownLines::new(theme);
    for event in Parser::new_ext(content, options) {
        renderer.handle_event(event);
    }
    renderer.finish()
}

struct MarkdownLines<'t> {
    theme: &'t Theme,
    lines: Vec<Line<'static>>,
    current_spans: Vec<Span<'static>>,

    // Counters, so `# Heading with **bold**` stays bold after the inner end tag.
    bold_count: usize,
    italic_count: usize,
    strike_count: usize,
    heading: Option<HeadingLevel>,
    quote_depth: usize,

    in_code_block: bool,
    code_block: String,

    in_table: bool,
    current_row: Vec<String>,
    current_cell: String,

    list_stack: Vec<Option<u64>>,
}

impl<'t> MarkdownLines<'t> {
    fn new(theme: &'t Theme) -> Self {
        Self {
            theme,
            lines: Vec::new(),
            current_spans: Vec::new(),
            bold_count: 0,
            italic_count: 0,
            strike_count: 0,
            heading: None,
            quote_depth: 0,
            in_code_block: false,
            code_block: String::new(),
            in_table: false,
            current_row: Vec::new(),
            current_cell: String::new(),
            list_stack: Vec::new(),
        }
    }

    fn finish(mut self) -> Vec<Line<'static>> {
        self.flush_line();
        while self.lines.last().is_some_and(|l| l.spans.is_empty()) {
            self.lines.pop();
        }
        self.lines
    }

    fn handle_event(&mut self, event: Event) {
        match event {
            Event::Start(tag) => self.start_tag(tag),
            Event::End(tag) => self.end_tag(tag),
            Event::Text(text) => self.handle_text(&text),
            Event::Code(code) => self.handle_inline_code(&code),
            Event::Html(html) | Event::InlineHtml(html) => self.handle_text(&html),
            Event::SoftBreak => self.handle_text(" "),
            Event::HardBreak => self.flush_line(),
            Event::Rule => {
                self.flush_line();
                self.lines.push(Line::styled("─".repeat(40), Style::default().fg(self.theme.muted)));
            }
            Event::TaskListMarker(done) => {
                self.handle_text(if done { "[x] " } else { "[ ] " });
            }
            _ => {}
        }
    }

    fn start_tag(&mut self, tag: Tag) {
        match tag {
            Tag::Heading { level, .. } => {
                self.flush_line();
                self.blank_line();
                self.heading = Some(level);
                self.bold_count += 1;
            }
            Tag::Strong => self.bold_count += 1,
            Tag::Emphasis => self.italic_count += 1,
            Tag::Strikethrough => self.strike_count += 1,
            Tag::Paragraph => {
                if self.list_stack.is_empty() {
                    self.flush_line();
                    self.blank_line();
                }
            }
            Tag::CodeBlock(_) => {
                self.flush_line();
                self.blank_line();
                self.in_code_block = true;
                self.code_block.clear();
            }
            Tag::List(start) => {
                self.flush_line();
                self.list_stack.push(start);
            }
            Tag::Item => {
                self.flush_line();
                let indent = "  ".repeat(self.list_stack.len().saturating_sub(1));
                let marker = match self.list_stack.last_mut() {
                    Some(Some(idx)) => {
                        let m = format!("{indent}{idx}. ");
                        *idx += 1;
                        m
                    }
                    _ => format!("{indent}• "),
                };
                self.current_spans
                    .push(Span::styled(marker, Style::default().fg(self.theme.accent)));
            }
            Tag::BlockQuote(_) => {
                self.flush_line();
                self.quote_depth += 1;
            }
            Tag::Table(_) => {
                self.flush_line();
                self.blank_line();
                self.in_table = true;
            }
            Tag::TableHead | Tag::TableRow => self.current_row.clear(),
            Tag::TableCell => self.current_cell.clear(),
            _ => {}
        }
    }

    fn end_tag(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Heading(_) => {
                self.flush_line();
                self.heading = None;
                self.bold_count = self.bold_count.saturating_sub(1);
            }
            TagEnd::Strong => self.bold_count = self.bold_count.saturating_sub(1),
            TagEnd::Emphasis => self.italic_count = self.italic_count.saturating_sub(1),
            TagEnd::Strikethrough => self.strike_count = self.strike_count.saturating_sub(1),
            TagEnd::Paragraph | TagEnd::Item => self.flush_line(),
            TagEnd::CodeBlock => {
                self.in_code_block = false;
                let style = Style::default().fg(self.theme.code);
                let code = std::mem::take(&mut self.code_block);
                for line in code.trim_end_matches('\n').split('\n') {
                    self.lines.push(Line::styled(format!("  {line}"), style));
                }
            }
            TagEnd::List(_) => {
                self.flush_line();
                self.list_stack.pop();
            }
            TagEnd::BlockQuote(_) => {
                self.flush_line();
                self.quote_depth = self.quote_depth.saturating_sub(1);
            }
            TagEnd::TableCell => {
                let cell = std::mem::take(&mut self.current_cell);
                self.current_row.push(cell.trim().to_owned());
            }
            TagEnd::TableHead | TagEnd::TableRow => {
                let row = std::mem::take(&mut self.current_row);
                let style = if tag == TagEnd::TableHead {
                    Style::default().add_modifier(Modifier::BOLD)
                } else {
                    Style::default()
                };
                self.lines.push(Line::styled(row.join(" │ "), style));
            }
            TagEnd::Table => self.in_table = false,
            _ => {}
        }
    }

    fn handle_text(&mut self, text: &str) {
        if self.in_code_block {
            self.code_block.push_str(text);
        } else if self.in_table {
            self.current_cell.push_str(text);
        } else {
            let style = self.inline_style();
            self.current_spans.push(Span::styled(text.to_owned(), style));
        }
    }

    fn handle_inline_code(&mut self, code: &str) {
        if self.in_table {
            self.current_cell.push_str(code);
            return;
        }
        let style = self.inline_style().fg(self.theme.code);
        self.current_spans.push(Span::styled(code.to_owned(), style));
    }

    fn inline_style(&self) -> Style {
        let mut style = Style::default();
        if self.heading.is_some() {
            style = style.fg(self.theme.heading);
        }
        if self.heading == Some(HeadingLevel::H1) {
            style = style.add_modifier(Modifier::UNDERLINED);
        }
        if self.bold_count > 0 {
            style = style.add_modifier(Modifier::BOLD);
        }
        if self.italic_count > 0 {
            style = style.add_modifier(Modifier::ITALIC);
        }
        if self.strike_count > 0 {
            style = style.add_modifier(Modifier::CROSSED_OUT);
        }
        style
    }

    fn flush_line(&mut self) {
        if self.current_spans.is_empty() {
            return;
        }
        let mut spans = Vec::with_capacity(self.current_spans.len() + 1);
        if self.quote_depth > 0 {
            spans.push(Span::styled(
                "│ ".repeat(self.quote_depth),
                Style::default().fg(self.theme.accent),
            ));
        }
        spans.append(&mut self.current_spans);
        self.lines.push(Line::from(spans));
    }

    /// Pushes an empty separator line unless the output is empty or already ends in one.
    fn blank_line(&mut self) {
        if self.lines.last().is_some_and(|l| !l.spans.is_empty()) {
            self.lines.push(Line::default());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_of(lines: &[Line]) -> Vec<String> {
        lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    #[test]
    fn heading_is_bold_and_colored() {
        let theme = Theme::dark();
        let lines = render_markdown("# OK\n", &theme);
        assert_eq!(text_of(&lines), vec!["OK"]);
        let style = lines[0].spans[0].style;
        assert_eq!(style.fg, Some(theme.heading));
        assert!(style.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn lists_get_markers() {
        let lines = render_markdown("- one\n- two\n\n1. first\n2. second\n", &Theme::dark());
        let text = text_of(&lines);
        assert!(text.contains(&"• one".to_owned()), "{text:?}");
        assert!(text.contains(&"2. second".to_owned()), "{text:?}");
    }

    #[test]
    fn code_block_lines_are_indented() {
        let lines = render_markdown("```python\nx = 1\ny = 2\n```\n", &Theme::dark());
        assert_eq!(text_of(&lines), vec!["  x = 1", "  y = 2"]);
    }

    #[test]
    fn raw_html_is_kept_as_text() {
        let lines = render_markdown("use <b>bold</b> here", &Theme::dark());
        assert_eq!(text_of(&lines), vec!["use <b>bold</b> here"]);
    }

    #[test]
    fn paragraphs_are_separated_by_one_blank_line() {
        let lines = render_markdown("first\n\nsecond\n", &Theme::dark());
        assert_eq!(text_of(&lines), vec!["first", "", "second"]);
    }
}
