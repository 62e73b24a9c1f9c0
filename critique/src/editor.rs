//! The code editor widget state.
//!
//! [`CodeEditor`] is the narrow interface the session controller needs: read and
//! replace the text, read and switch the syntax mode. [`TextEditor`] implements it
//! with a line buffer, a cursor, and cached syntect highlighting.

use std::sync::LazyLock;

use critique_core::SourceLanguage;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use syntect::easy::HighlightLines;
use syntect::highlighting::ThemeSet;
use syntect::parsing::SyntaxSet;

static PS: LazyLock<SyntaxSet> = LazyLock::new(SyntaxSet::load_defaults_newlines);
static TS: LazyLock<ThemeSet> = LazyLock::new(ThemeSet::load_defaults);

/// Spaces inserted for a Tab key press, and the width a stored tab is drawn at.
pub const INDENT: &str = "    ";

pub trait CodeEditor {
    fn text(&self) -> String;
    fn set_text(&mut self, text: &str);
    fn syntax_mode(&self) -> SourceLanguage;
    fn set_syntax_mode(&mut self, language: SourceLanguage);
}

/// Line-buffer editor. `col` counts chars, not bytes.
#[derive(Debug, Clone)]
pub struct TextEditor {
    lines: Vec<String>,
    row: usize,
    col: usize,
    /// First visible line, kept so the cursor stays on screen.
    pub scroll: usize,
    mode: SourceLanguage,
    highlighted: Option<Vec<Line<'static>>>,
}

impl Default for TextEditor {
    fn default() -> Self {
        Self::new(SourceLanguage::default())
    }
}

impl CodeEditor for TextEditor {
    fn text(&self) -> String {
        self.lines.join("\n")
    }

    /// Stores `text` unchanged; `text()` returns the same bytes. Tabs and carriage
    /// returns are only cleaned up for display.
    fn set_text(&mut self, text: &str) {
        self.lines = text.split('\n').map(str::to_owned).collect();
        self.row = 0;
        self.col = 0;
        self.scroll = 0;
        self.highlighted = None;
    }

    fn syntax_mode(&self) -> SourceLanguage {
        self.mode
    }

    fn set_syntax_mode(&mut self, language: SourceLanguage) {
        if self.mode != language {
            self.mode = language;
            self.highlighted = None;
        }
    }
}

impl TextEditor {
    pub fn new(mode: SourceLanguage) -> Self {
        Self {
            lines: vec![String::new()],
            row: 0,
            col: 0,
            scroll: 0,
            mode,
            highlighted: None,
        }
    }

    /// `(row, col)` of the cursor; `col` in chars.
    pub fn cursor(&self) -> (usize, usize) {
        (self.row, self.col)
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// `true` when the buffer holds only whitespace.
    pub fn is_blank(&self) -> bool {
        self.lines.iter().all(|l| l.trim().is_empty())
    }

    pub fn insert_char(&mut self, c: char) {
        let idx = self.byte_col();
        self.lines[self.row].insert(idx, c);
        self.col += 1;
        self.touch();
    }

    /// Inserts `text` at the cursor exactly as given, for pastes. `\r\n` and a lone
    /// `\r` become line breaks; no indentation is carried over.
    pub fn insert_text(&mut self, text: &str) {
        let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
        let mut segments = normalized.split('\n');
        let first = segments.next().unwrap_or_default();

        let idx = self.byte_col();
        let tail = self.lines[self.row].split_off(idx);
        self.lines[self.row].push_str(first);
        self.col += first.chars().count();
        for segment in segments {
            self.row += 1;
            self.lines.insert(self.row, segment.to_owned());
            self.col = segment.chars().count();
        }
        self.lines[self.row].push_str(&tail);
        self.touch();
    }

    /// Splits the line at the cursor, carrying the current indentation over.
    pub fn insert_newline(&mut self) {
        let idx = self.byte_col();
        let rest = self.lines[self.row].split_off(idx);
        let indent: String = self.lines[self.row]
            .chars()
            .take_while(|c| *c == ' ')
            .collect();
        self.col = indent.chars().count();
        self.row += 1;
        self.lines.insert(self.row, indent + &rest);
        self.touch();
    }

    pub fn insert_tab(&mut self) {
        self.insert_text(INDENT);
    }

    /// Deletes the char before the cursor, joining lines at column 0.
    pub fn backspace(&mut self) {
        if self.col > 0 {
            self.col -= 1;
            let idx = self.byte_col();
            self.lines[self.row].remove(idx);
        } else if self.row > 0 {
            let line = self.lines.remove(self.row);
            self.row -= 1;
            self.col = self.lines[self.row].chars().count();
            self.lines[self.row].push_str(&line);
        } else {
            return;
        }
        self.touch();
    }

    /// Deletes the char under the cursor, joining the next line at end of line.
    pub fn delete(&mut self) {
        let len = self.lines[self.row].chars().count();
        if self.col < len {
            let idx = self.byte_col();
            self.lines[self.row].remove(idx);
        } else if self.row + 1 < self.lines.len() {
            let next = self.lines.remove(self.row + 1);
            self.lines[self.row].push_str(&next);
        } else {
            return;
        }
        self.touch();
    }

    pub fn move_left(&mut self) {
        if self.col > 0 {
            self.col -= 1;
        } else if self.row > 0 {
            self.row -= 1;
            self.col = self.line_len(self.row);
        }
    }

    pub fn move_right(&mut self) {
        if self.col < self.line_len(self.row) {
            self.col += 1;
        } else if self.row + 1 < self.lines.len() {
            self.row += 1;
            self.col = 0;
        }
    }

    pub fn move_up(&mut self, n: usize) {
        self.row = self.row.saturating_sub(n);
        self.col = self.col.min(self.line_len(self.row));
    }

    pub fn move_down(&mut self, n: usize) {
        self.row = (self.row + n).min(self.lines.len() - 1);
        self.col = self.col.min(self.line_len(self.row));
    }

    pub fn move_home(&mut self) {
        self.col = 0;
    }

    pub fn move_end(&mut self) {
        self.col = self.line_len(self.row);
    }

    pub fn move_top(&mut self) {
        self.row = 0;
        self.col = 0;
    }

    pub fn move_bottom(&mut self) {
        self.row = self.lines.len() - 1;
        self.col = self.line_len(self.row);
    }

    /// Screen column of the cursor within its line: a tab is drawn as [`INDENT`]
    /// and a carriage return takes no space.
    pub fn display_col(&self) -> usize {
        self.lines[self.row]
            .chars()
            .take(self.col)
            .map(|c| match c {
                '\t' => INDENT.len(),
                '\r' => 0,
                _ => 1,
            })
            .sum()
    }

    /// Adjusts `scroll` so the cursor row is inside a viewport of `height` rows.
    pub fn scroll_to_cursor(&mut self, height: usize) {
        if height == 0 {
            return;
        }
        if self.row < self.scroll {
            self.scroll = self.row;
        } else if self.row >= self.scroll + height {
            self.scroll = self.row + 1 - height;
        }
    }

    /// Highlighted lines for the whole buffer, recomputed only after an edit or a
    /// syntax-mode change.
    pub fn highlighted_lines(&mut self, syntax_theme: &str) -> &[Line<'static>] {
        let mode = self.mode;
        let lines = &self.lines;
        self.highlighted
            .get_or_insert_with(|| highlight(lines, mode, syntax_theme))
    }

    fn line_len(&self, row: usize) -> usize {
        self.lines[row].chars().count()
    }

    fn byte_col(&self) -> usize {
        let line = &self.lines[self.row];
        line.char_indices()
            .nth(self.col)
            .map(|(i, _)| i)
            .unwrap_or(line.len())
    }

    fn touch(&mut self) {
        self.highlighted = None;
    }
}

/// syntect syntax name for each source language.
fn syntax_name(language: SourceLanguage) -> &'static str {
    match language {
        SourceLanguage::Python => "Python",
        SourceLanguage::Javascript => "JavaScript",
        SourceLanguage::Java => "Java",
        SourceLanguage::Cpp => "C++",
    }
}

fn highlight(lines: &[String], mode: SourceLanguage, syntax_theme: &str) -> Vec<Line<'static>> {
    let syntax = PS
        .find_syntax_by_name(syntax_name(mode))
        .unwrap_or_else(|| PS.find_syntax_plain_text());
    let Some(theme) = TS.themes.get(syntax_theme).or_else(|| TS.themes.values().next()) else {
        return lines.iter().map(|l| Line::raw(l.clone())).collect();
    };

    let mut h = HighlightLines::new(syntax, theme);
    lines
        .iter()
        .map(|line| {
            // The newline-aware syntax set expects each line to end in '\n'.
            let with_nl = format!("{line}\n");
            match h.highlight_line(&with_nl, &PS) {
                Ok(ranges) => Line::from(
                    ranges
                        .into_iter()
                        .map(|(style, text)| syntect_to_span(style, text.trim_end_matches('\n')))
                        .filter(|span| !span.content.is_empty())
                        .collect::<Vec<_>>(),
                ),
                Err(_) => Line::raw(line.clone()),
            }
        })
        .collect()
}

/// Converts a syntect style run into an owned ratatui span. Backgrounds are dropped
/// so the terminal theme shows through.
fn syntect_to_span(style: syntect::highlighting::Style, content: &str) -> Span<'static> {
    use syntect::highlighting::FontStyle;

    let fg = style.foreground;
    let mut out = Style::default();
    if fg.a > 0 {
        out = out.fg(Color::Rgb(fg.r, fg.g, fg.b));
    }
    if style.font_style.contains(FontStyle::BOLD) {
        out = out.add_modifier(Modifier::BOLD);
    }
    if style.font_style.contains(FontStyle::ITALIC) {
        out = out.add_modifier(Modifier::ITALIC);
    }
    if style.font_style.contains(FontStyle::UNDERLINE) {
        out = out.add_modifier(Modifier::UNDERLINED);
    }
    Span::styled(content.to_owned(), out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn editor(text: &str) -> TextEditor {
        let mut e = TextEditor::default();
        e.set_text(text);
        e
    }

    #[test]
    fn set_text_round_trips_byte_exact() {
        for input in ["x = '\t'\n", "a\r\nb\r\n", "def f():\n\treturn 1", "", "\n\n"] {
            assert_eq!(editor(input).text(), input);
        }
        assert_eq!(editor("a\n").line_count(), 2);
    }

    #[test]
    fn pasted_indented_code_is_inserted_verbatim() {
        let code = "def f():\n    if x:\n        y\nz";
        let mut e = TextEditor::default();
        e.insert_text(code);
        assert_eq!(e.text(), code);
        assert_eq!(e.cursor(), (3, 1));
    }

    #[test]
    fn carriage_returns_in_paste_are_line_breaks() {
        let mut e = TextEditor::default();
        e.insert_text("a = 1\rb = 2\r\nc = 3");
        assert_eq!(e.line_count(), 3);
        assert_eq!(e.text(), "a = 1\nb = 2\nc = 3");
    }

    #[test]
    fn paste_mid_line_keeps_the_rest_of_the_line() {
        let mut e = editor("ab");
        e.move_right();
        e.insert_text("1\n2");
        assert_eq!(e.text(), "a1\n2b");
        assert_eq!(e.cursor(), (1, 1));
    }

    #[test]
    fn display_col_expands_tabs() {
        let mut e = editor("\tx");
        e.move_end();
        assert_eq!(e.display_col(), INDENT.len() + 1);
    }

    #[test]
    fn typing_and_newline_keep_indent() {
        let mut e = editor("    x = 1");
        e.move_end();
        e.insert_newline();
        e.insert_text("y");
        assert_eq!(e.text(), "    x = 1\n    y");
        assert_eq!(e.cursor(), (1, 5));
    }

    #[test]
    fn backspace_joins_lines_at_column_zero() {
        let mut e = editor("ab\ncd");
        e.move_down(1);
        e.backspace();
        assert_eq!(e.text(), "abcd");
        assert_eq!(e.cursor(), (0, 2));
    }

    #[test]
    fn delete_at_end_joins_next_line() {
        let mut e = editor("ab\ncd");
        e.move_end();
        e.delete();
        assert_eq!(e.text(), "abcd");
    }

    #[test]
    fn multibyte_chars_are_edited_by_char() {
        let mut e = editor("héllo");
        e.move_right();
        e.move_right();
        e.backspace();
        assert_eq!(e.text(), "hllo");
    }

    #[test]
    fn blank_detection() {
        assert!(editor("  \n\n   ").is_blank());
        assert!(!editor("\nprint(1)").is_blank());
    }

    #[test]
    fn syntax_mode_change_invalidates_highlighting() {
        let mut e = editor("int main() { return 0; }");
        let plain_count = e.highlighted_lines("base16-ocean.dark").len();
        assert_eq!(plain_count, 1);
        e.set_syntax_mode(SourceLanguage::Cpp);
        assert!(e.highlighted.is_none());
        assert_eq!(e.syntax_mode(), SourceLanguage::Cpp);
        let line = &e.highlighted_lines("base16-ocean.dark")[0];
        let text: String = line.spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(text, "int main() { return 0; }");
    }

    #[test]
    fn scroll_follows_cursor() {
        let mut e = editor(&"x\n".repeat(50));
        e.move_down(30);
        e.scroll_to_cursor(10);
        assert_eq!(e.scroll, 21);
        e.move_top();
        e.scroll_to_cursor(10);
        assert_eq!(e.scroll, 0);
    }
}
