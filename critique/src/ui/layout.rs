//! Two-panel layout and the status bar.
//!
//! Pure layout arithmetic plus the status bar widget. At 100 columns and wider the
//! editor and the result sit side by side; narrower terminals stack them. A
//! one-row banner is reserved above the panels only while a connectivity warning
//! is active.

use ratatui::{
    layout::{Constraint, Layout, Margin, Rect, Spacing},
    style::{Modifier, Style},
    symbols::merge::MergeStrategy,
    text::{Line, Span},
    widgets::{Block, BorderType, Paragraph},
    Frame,
};

use crate::app::{AppState, Mode};
use crate::theme::Theme;

const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Rects for one frame. `banner` has zero height when there is no warning.
pub struct FrameLayout {
    pub banner: Rect,
    pub editor: Rect,
    pub result: Rect,
    pub status_bar: Rect,
}

pub fn compute_layout(area: Rect, state: &AppState) -> FrameLayout {
    let banner_height = u16::from(state.backend_warning.is_some());
    let [banner, main_area, status_bar] = area.layout(&Layout::vertical([
        Constraint::Length(banner_height),
        Constraint::Fill(1),
        Constraint::Length(1),
    ]));

    let split = if area.width >= 100 {
        Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)])
    } else {
        Layout::vertical([Constraint::Percentage(50), Constraint::Percentage(50)])
    };
    let [editor, result] = main_area.layout(&split.spacing(Spacing::Overlap(1)));

    FrameLayout { banner, editor, result, status_bar }
}

/// The panel area inside its 1-cell border.
pub fn inner_rect(area: Rect) -> Rect {
    area.inner(Margin { vertical: 1, horizontal: 1 })
}

/// Bordered panel block; thick border when focused. `Fuzzy` merging keeps the
/// shared edge clean when thick and plain borders meet.
pub fn panel_block<'a>(title: impl Into<Line<'a>>, is_focused: bool, theme: &Theme) -> Block<'a> {
    let color = if is_focused { theme.border_active } else { theme.border_inactive };
    let border_type = if is_focused { BorderType::Thick } else { BorderType::Plain };

    Block::bordered()
        .title(title)
        .border_type(border_type)
        .border_style(Style::default().fg(color))
        .merge_borders(MergeStrategy::Fuzzy)
}

pub fn render_banner(frame: &mut Frame, area: Rect, state: &AppState, theme: &Theme) {
    let Some(warning) = &state.backend_warning else {
        return;
    };
    frame.render_widget(
        Paragraph::new(format!(" ⚠ {warning}"))
            .style(Style::default().bg(theme.warning_bg).fg(theme.warning_fg)),
        area,
    );
}

/// Mode, selectors, loading spinner, and the latest notice.
pub fn render_status_bar(frame: &mut Frame, area: Rect, state: &AppState, theme: &Theme) {
    let (mode_text, mode_fg) = match state.mode {
        Mode::Insert => (" INSERT ", theme.status_mode_insert),
        Mode::Normal | Mode::HelpOverlay | Mode::Alert => (" NORMAL ", theme.status_mode_normal),
    };
    let bold = Style::default().add_modifier(Modifier::BOLD);

    let model = state.models.selected();
    let model_style = if model.enabled { bold } else { bold.fg(theme.muted) };

    let mut spans = vec![
        Span::styled(mode_text, bold.fg(mode_fg)),
        Span::raw(" lang "),
        Span::styled(state.language().label(), bold),
        Span::raw("  model "),
        Span::styled(model.label.clone(), model_style),
        Span::raw("  reply "),
        Span::styled(state.response_language.clone(), bold),
    ];

    if state.loading {
        let frame_glyph = SPINNER[state.spinner_frame % SPINNER.len()];
        spans.push(Span::styled(
            format!("  {frame_glyph} Analyzing..."),
            Style::default().fg(theme.spinner),
        ));
    }
    if let Some(notice) = &state.notice {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(notice.clone(), Style::default().add_modifier(Modifier::ITALIC)));
    }

    frame.render_widget(
        Paragraph::new(Line::from(spans))
            .style(Style::default().bg(theme.status_bar_bg).fg(theme.status_bar_fg)),
        area,
    );
}
