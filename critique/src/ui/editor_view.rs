//! Code editor panel: gutter with line numbers, highlighted source, and the
//! terminal cursor while in Insert mode.

use ratatui::{
    layout::{Position, Rect},
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::app::{AppState, Mode, PanelFocus};
use crate::editor::INDENT;
use crate::theme::Theme;
use crate::ui::layout::{inner_rect, panel_block};

pub fn render_editor(frame: &mut Frame, area: Rect, state: &mut AppState, theme: &Theme) {
    let is_focused = state.focus == PanelFocus::Editor;
    let title = format!(" Code · {} ", state.language().label());
    frame.render_widget(panel_block(title, is_focused, theme), area);

    let inner = inner_rect(area);
    if inner.height == 0 || inner.width == 0 {
        return;
    }

    let height = inner.height as usize;
    let editor = &mut state.editor;
    editor.scroll_to_cursor(height);
    let scroll = editor.scroll;
    let (cursor_row, _) = editor.cursor();
    let cursor_col = editor.display_col();
    let gutter_width = editor.line_count().to_string().len().max(3);
    let show_placeholder = editor.is_blank() && state.mode != Mode::Insert;

    let number_style = Style::default().fg(theme.line_number);
    let lines: Vec<Line> = editor
        .highlighted_lines(theme.syntax_theme)
        .iter()
        .enumerate()
        .skip(scroll)
        .take(height)
        .map(|(i, line)| {
            let mut spans = vec![Span::styled(format!("{:>gutter_width$} ", i + 1), number_style)];
            spans.extend(line.spans.iter().map(display_span));
            Line::from(spans)
        })
        .collect();

    if show_placeholder {
        let hint = Line::from(vec![
            Span::styled(format!("{:>gutter_width$} ", 1), number_style),
            Span::styled("Press i to start typing, or pass a file path", Style::default().fg(theme.muted)),
        ]);
        frame.render_widget(Paragraph::new(hint), inner);
    } else {
        frame.render_widget(Paragraph::new(lines), inner);
    }

    if state.mode == Mode::Insert {
        let x = inner.x as usize + gutter_width + 1 + cursor_col;
        let y = inner.y as usize + cursor_row.saturating_sub(scroll);
        let max_x = (inner.x + inner.width).saturating_sub(1) as usize;
        frame.set_cursor_position(Position {
            x: x.min(max_x) as u16,
            y: y as u16,
        });
    }
}

/// Tabs are drawn as [`INDENT`]; carriage returns are not drawn.
fn display_span(span: &Span<'static>) -> Span<'static> {
    if !span.content.contains(|c| c == '\t' || c == '\r') {
        return span.clone();
    }
    let content = span.content.replace('\r', "").replace('\t', INDENT);
    Span::styled(content, span.style)
}
