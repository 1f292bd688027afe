//! Color theme and glyphs for the ADSPA TUI.
//!
//! Slate backgrounds with an indigo/purple/pink accent per pipeline stage,
//! plus an optional high-contrast override.

use ratatui::style::{Color, Modifier, Style};

use adspa_types::UiOptions;

mod colors {
    use super::Color;

    // === Backgrounds (slate) ===
    pub const BG_DARK: Color = Color::Rgb(2, 6, 23); // slate-950
    pub const BG_PANEL: Color = Color::Rgb(15, 23, 42); // slate-900
    pub const BG_BORDER: Color = Color::Rgb(30, 41, 59); // slate-800

    // === Foregrounds ===
    pub const TEXT_PRIMARY: Color = Color::Rgb(226, 232, 240); // slate-200
    pub const TEXT_SECONDARY: Color = Color::Rgb(148, 163, 184); // slate-400
    pub const TEXT_MUTED: Color = Color::Rgb(100, 116, 139); // slate-500

    // === Stage accents ===
    pub const INDIGO: Color = Color::Rgb(99, 102, 241);
    pub const PURPLE: Color = Color::Rgb(168, 85, 247);
    pub const PINK: Color = Color::Rgb(236, 72, 153);

    pub const GREEN: Color = Color::Rgb(74, 222, 128);
    pub const YELLOW: Color = Color::Rgb(250, 204, 21);
    pub const RED: Color = Color::Rgb(248, 113, 113);
}

/// Resolved theme palette used by the UI.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub bg_dark: Color,
    pub bg_panel: Color,
    pub bg_border: Color,
    pub text_primary: Color,
    pub text_secondary: Color,
    pub text_muted: Color,
    pub primary: Color,
    pub spatial: Color,
    pub occlusion: Color,
    pub diffusion: Color,
    pub terminal: Color,
    pub success: Color,
    pub warning: Color,
    pub error: Color,
}

impl Palette {
    #[must_use]
    pub fn standard() -> Self {
        Self {
            bg_dark: colors::BG_DARK,
            bg_panel: colors::BG_PANEL,
            bg_border: colors::BG_BORDER,
            text_primary: colors::TEXT_PRIMARY,
            text_secondary: colors::TEXT_SECONDARY,
            text_muted: colors::TEXT_MUTED,
            primary: colors::INDIGO,
            spatial: colors::INDIGO,
            occlusion: colors::PURPLE,
            diffusion: colors::PINK,
            terminal: colors::GREEN,
            success: colors::GREEN,
            warning: colors::YELLOW,
            error: colors::RED,
        }
    }

    #[must_use]
    pub fn high_contrast() -> Self {
        Self {
            bg_dark: Color::Black,
            bg_panel: Color::Black,
            bg_border: Color::Gray,
            text_primary: Color::White,
            text_secondary: Color::Gray,
            text_muted: Color::DarkGray,
            primary: Color::White,
            spatial: Color::Cyan,
            occlusion: Color::Magenta,
            diffusion: Color::Yellow,
            terminal: Color::Green,
            success: Color::Green,
            warning: Color::Yellow,
            error: Color::Red,
        }
    }

    /// Accent color for a pipeline stage.
    #[must_use]
    pub fn stage(&self, phase_index: usize) -> Color {
        match phase_index {
            0 => self.spatial,
            1 => self.occlusion,
            2 => self.diffusion,
            _ => self.primary,
        }
    }
}

#[must_use]
pub fn palette(options: UiOptions) -> Palette {
    if options.high_contrast {
        Palette::high_contrast()
    } else {
        Palette::standard()
    }
}

/// ASCII/Unicode glyphs for icons, bars, and spinners.
#[derive(Debug, Clone, Copy)]
pub struct Glyphs {
    pub step_done: &'static str,
    pub step_active: &'static str,
    pub step_pending: &'static str,
    pub bar_filled: &'static str,
    pub bar_empty: &'static str,
    pub scan_line: &'static str,
    pub connector: &'static str,
    pub prompt: &'static str,
    pub bullet: &'static str,
    pub selected: &'static str,
    pub missing: &'static str,
    pub spinner_frames: &'static [&'static str],
}

const SPINNER_FRAMES: &[&str] = &["◐", "◓", "◑", "◒"];
const SPINNER_FRAMES_ASCII: &[&str] = &["|", "/", "-", "\\"];

#[must_use]
pub fn glyphs(options: UiOptions) -> Glyphs {
    if options.ascii_only {
        Glyphs {
            step_done: "[x]",
            step_active: "[>]",
            step_pending: "[ ]",
            bar_filled: "#",
            bar_empty: "-",
            scan_line: "|",
            connector: "--",
            prompt: ">",
            bullet: "*",
            selected: "+",
            missing: "o",
            spinner_frames: SPINNER_FRAMES_ASCII,
        }
    } else {
        Glyphs {
            step_done: "✔",
            step_active: "◉",
            step_pending: "○",
            bar_filled: "█",
            bar_empty: "░",
            scan_line: "┃",
            connector: "──",
            prompt: "❯",
            bullet: "•",
            selected: "●",
            missing: "○",
            spinner_frames: SPINNER_FRAMES,
        }
    }
}

/// When `reduced_motion` is enabled, returns a static glyph instead of cycling.
#[must_use]
pub fn spinner_frame(tick: usize, options: UiOptions) -> &'static str {
    let frames = glyphs(options).spinner_frames;
    if options.reduced_motion {
        frames[0]
    } else {
        frames[tick % frames.len()]
    }
}

pub mod styles {
    use super::{Modifier, Palette, Style};

    #[must_use]
    pub fn title(palette: &Palette) -> Style {
        Style::default()
            .fg(palette.text_primary)
            .add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn engine_badge(palette: &Palette) -> Style {
        Style::default()
            .fg(palette.primary)
            .add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn key_hint(palette: &Palette) -> Style {
        Style::default().fg(palette.text_muted)
    }

    #[must_use]
    pub fn key_highlight(palette: &Palette) -> Style {
        Style::default()
            .fg(palette.primary)
            .add_modifier(Modifier::BOLD)
    }
}
