//! Modal overlays: the keybinding help and the blocking alert.
//!
//! Both erase their area with `Clear` and draw inside the same `terminal.draw()`
//! call as the panels.

use ratatui::{
    layout::Constraint,
    style::{Modifier, Style},
    text::{Line, Text},
    widgets::{Block, Clear, Paragraph, Wrap},
    Frame,
};

use crate::theme::Theme;

pub fn render_help_overlay(frame: &mut Frame, theme: &Theme, help_scroll: u16) {
    // A zero-height Rect would panic inside the bordered paragraph.
    if frame.area().width < 40 || frame.area().height < 8 {
        return;
    }

    let overlay_area = frame
        .area()
        .centered(Constraint::Percentage(70), Constraint::Percentage(80));
    frame.render_widget(Clear, overlay_area);

    let block = Block::bordered()
        .title(" Help · j/k scroll, ? or Esc to close ")
        .border_style(Style::default().fg(theme.border_active));

    frame.render_widget(
        Paragraph::new(build_help_text(theme))
            .block(block)
            .wrap(Wrap { trim: false })
            .scroll((help_scroll, 0)),
        overlay_area,
    );
}

fn build_help_text(theme: &Theme) -> Text<'static> {
    let section = |title: &'static str| {
        Line::styled(title, Style::default().fg(theme.heading).add_modifier(Modifier::BOLD))
    };
    Text::from(vec![
        section("Review"),
        Line::from("  Enter / Ctrl-r  Analyze the code"),
        Line::from("  l               Next source language"),
        Line::from("  m / M           Next / previous model"),
        Line::from("  r               Next response language (remembered)"),
        Line::from("  e               Export the result to critique-review.html"),
        Line::from(""),
        section("Editing"),
        Line::from("  i / a           Start editing (Insert mode)"),
        Line::from("  Esc             Back to Normal mode"),
        Line::from("  Tab             Indent four spaces"),
        Line::from("  Arrows          Move the cursor"),
        Line::from(""),
        section("Navigation"),
        Line::from("  Tab / H / L     Switch panel focus"),
        Line::from("  j / k           Scroll down / up one line"),
        Line::from("  g / G           Jump to top / bottom"),
        Line::from("  Ctrl-d / u      Scroll half a page down / up"),
        Line::from(""),
        section("General"),
        Line::from("  ?               Open / close this help"),
        Line::from("  q / Esc         Quit"),
        Line::from("  Ctrl-c          Quit from any mode"),
    ])
}

/// Centered alert box; any key dismisses it.
pub fn render_alert(frame: &mut Frame, theme: &Theme, message: &str) {
    if frame.area().width < 20 || frame.area().height < 5 {
        return;
    }
    let area = frame
        .area()
        .centered(Constraint::Percentage(60), Constraint::Length(7));
    frame.render_widget(Clear, area);

    let block = Block::bordered()
        .title(" Alert ")
        .border_style(Style::default().fg(theme.error));
    let text = Text::from(vec![
        Line::from(message.to_owned()),
        Line::from(""),
        Line::styled("Press any key to continue", Style::default().fg(theme.muted)),
    ]);
    frame.render_widget(
        Paragraph::new(text).block(block).wrap(Wrap { trim: true }),
        area,
    );
}
