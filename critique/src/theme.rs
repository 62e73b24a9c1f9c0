//! Color themes for critique.
//!
//! Two built-ins: `dark` (ANSI 16 colors, safe on any terminal) and
//! `catppuccin-mocha` (RGB, needs truecolor).

use ratatui::style::Color;

/// Named colors for every surface critique draws.
#[derive(Debug, Clone)]
pub struct Theme {
    // Panel borders
    pub border_active: Color,
    pub border_inactive: Color,

    // Rendered review
    /// Markdown headings and tool-section titles.
    pub heading: Color,
    /// Inline code and fenced code blocks.
    pub code: Color,
    /// Links, list bullets, and block-quote bars.
    pub accent: Color,
    /// Secondary text: placeholders, hints, plain-text fallbacks.
    pub muted: Color,
    pub error: Color,
    /// Connectivity warning banner background.
    pub warning_bg: Color,
    pub warning_fg: Color,

    // Status bar
    pub status_bar_bg: Color,
    pub status_bar_fg: Color,
    pub status_mode_normal: Color,
    pub status_mode_insert: Color,
    pub spinner: Color,

    // Editor
    pub line_number: Color,
    /// syntect theme name used for editor highlighting.
    pub syntax_theme: &'static str,
}

impl Theme {
    /// ANSI 16-color theme. Default when the configured name is unknown.
    pub fn dark() -> Self {
        Self {
            border_active: Color::Cyan,
            border_inactive: Color::DarkGray,

            heading: Color::Cyan,
            code: Color::Yellow,
            accent: Color::Blue,
            muted: Color::DarkGray,
            error: Color::Red,
            warning_bg: Color::Yellow,
            warning_fg: Color::Black,

            status_bar_bg: Color::DarkGray,
            status_bar_fg: Color::White,
            status_mode_normal: Color::Cyan,
            status_mode_insert: Color::Green,
            spinner: Color::Magenta,

            line_number: Color::DarkGray,
            syntax_theme: "base16-ocean.dark",
        }
    }

    /// Catppuccin Mocha palette. Requires a truecolor terminal.
    ///
    /// Palette source: <https://github.com/catppuccin/catppuccin> Mocha variant.
    pub fn catppuccin_mocha() -> Self {
        let green = Color::Rgb(166, 227, 161); // #a6e3a1
        let red = Color::Rgb(243, 139, 168); // #f38ba8
        let yellow = Color::Rgb(249, 226, 175); // #f9e2af
        let blue = Color::Rgb(137, 180, 250); // #89b4fa
        let mauve = Color::Rgb(203, 166, 247); // #cba6f7
        let lavender = Color::Rgb(180, 190, 254); // #b4befe
        let overlay1 = Color::Rgb(127, 132, 156); // #7f849c
        let surface1 = Color::Rgb(69, 71, 90); // #45475a
        let crust = Color::Rgb(17, 17, 27); // #11111b
        let text = Color::Rgb(205, 214, 244); // #cdd6f4
        let peach = Color::Rgb(250, 179, 135); // #fab387

        Self {
            border_active: lavender,
            border_inactive: overlay1,

            heading: mauve,
            code: peach,
            accent: blue,
            muted: overlay1,
            error: red,
            warning_bg: yellow,
            warning_fg: crust,

            status_bar_bg: surface1,
            status_bar_fg: text,
            status_mode_normal: lavender,
            status_mode_insert: green,
            spinner: peach,

            line_number: overlay1,
            syntax_theme: "base16-mocha.dark",
        }
    }

    /// Resolves a configured theme name; unknown names fall back to `dark()`.
    pub fn from_name(name: &str) -> Self {
        match name {
            "catppuccin-mocha" | "catppuccin_mocha" => Self::catppuccin_mocha(),
            "dark" => Self::dark(),
            other => {
                tracing::warn!(theme = other, "unknown theme, falling back to 'dark'");
                Self::dark()
            }
        }
    }
}
