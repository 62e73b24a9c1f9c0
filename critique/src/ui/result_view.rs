//! Result panel: rendered review blocks, or an error in plain text.

use critique_core::Block;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Text},
    widgets::{Paragraph, Wrap},
    Frame,
};

use crate::app::{AppState, PanelFocus, ResultView};
use crate::theme::Theme;
use crate::ui::layout::{inner_rect, panel_block};
use crate::ui::markdown::render_markdown;

pub fn render_result(frame: &mut Frame, area: Rect, state: &mut AppState, theme: &Theme) {
    let is_focused = state.focus == PanelFocus::Result;
    let title = match &state.view {
        ResultView::Error(_) => " Error ",
        _ => " Review ",
    };
    frame.render_widget(panel_block(title, is_focused, theme), area);

    let inner = inner_rect(area);
    let text = match &state.view {
        ResultView::Hidden if state.loading => {
            Text::styled("Analyzing...", Style::default().fg(theme.spinner))
        }
        ResultView::Hidden => Text::styled(
            "Press Enter to analyze the code. ? shows all keys.",
            Style::default().fg(theme.muted),
        ),
        ResultView::Rendered(result) => Text::from(blocks_to_lines(&result.blocks, theme)),
        // Never interpreted as Markdown.
        ResultView::Error(message) => Text::styled(message.clone(), Style::default().fg(theme.error)),
    };

    // Logical lines; wrapped rows can exceed this, so the clamp is conservative.
    let max_scroll = text.lines.len().saturating_sub(inner.height as usize);
    state.result_scroll = state.result_scroll.min(u16::try_from(max_scroll).unwrap_or(u16::MAX));

    frame.render_widget(
        Paragraph::new(text)
            .wrap(Wrap { trim: false })
            .scroll((state.result_scroll, 0)),
        inner,
    );
}

/// Terminal lines for a rendered result, one blank line between blocks.
pub fn blocks_to_lines(blocks: &[Block], theme: &Theme) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for block in blocks {
        if !lines.is_empty() {
            lines.push(Line::default());
        }
        match block {
            Block::Markdown { source, .. } => lines.extend(render_markdown(source, theme)),
            Block::PlainText(text) => lines.extend(text.lines().map(|l| Line::raw(l.to_owned()))),
            Block::Tool { tool, body, .. } => {
                lines.push(Line::styled(
                    tool.clone(),
                    Style::default().fg(theme.heading).add_modifier(Modifier::BOLD),
                ));
                let style = Style::default().fg(theme.code);
                lines.extend(body.lines().map(|l| Line::styled(format!("  {l}"), style)));
            }
        }
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tool_blocks_show_name_then_indented_body() {
        let blocks = vec![
            Block::PlainText("intro".into()),
            Block::Tool { tool: "pylint".into(), body: "{\n  \"a\": 1\n}".into(), json: true },
        ];
        let lines = blocks_to_lines(&blocks, &Theme::dark());
        let text: Vec<String> = lines.iter().map(|l| l.to_string()).collect();
        assert_eq!(text, vec!["intro", "", "pylint", "  {", "    \"a\": 1", "  }"]);
    }
}
