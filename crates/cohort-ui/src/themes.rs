use ratatui::style::{Color, Modifier, Style};

/// Terminal background type detection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BackgroundType {
    Dark,
    Light,
}

/// Detect terminal background type from the `COLORFGBG` environment variable.
///
/// The variable has the format `"foreground;background"`. Background values
/// 0–6 are dark; 7–15 are light. Absent or unparseable → dark.
pub fn detect_background() -> BackgroundType {
    std::env::var("COLORFGBG")
        .ok()
        .and_then(|val| val.split(';').next_back()?.parse::<u8>().ok())
        .map_or(BackgroundType::Dark, |bg| {
            if bg <= 6 {
                BackgroundType::Dark
            } else {
                BackgroundType::Light
            }
        })
}

/// All styles used by the cohort views.
#[derive(Debug, Clone)]
pub struct Theme {
    pub title: Style,
    pub text: Style,
    pub dim: Style,
    pub label: Style,
    pub warning: Style,
    pub error: Style,

    // ── Table ────────────────────────────────────────────────────────────────
    pub table_header: Style,
    pub table_row: Style,
    pub table_row_alt: Style,

    // ── Heatmap ──────────────────────────────────────────────────────────────
    /// Background shades from lowest to highest retention.
    pub heat_scale: [Color; 5],
    /// Foreground on the two lightest shades.
    pub heat_text_light_bg: Color,
    /// Foreground on the darker shades.
    pub heat_text_dark_bg: Color,
    /// Cells with no observation.
    pub heat_empty: Style,
}

impl Theme {
    /// Dark-background terminal theme (default).
    pub fn dark() -> Self {
        Self {
            title: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            text: Style::default().fg(Color::White),
            dim: Style::default().fg(Color::DarkGray),
            label: Style::default().fg(Color::Gray),
            warning: Style::default().fg(Color::Yellow),
            error: Style::default()
                .fg(Color::Red)
                .add_modifier(Modifier::BOLD),
            table_header: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            table_row: Style::default().fg(Color::White),
            table_row_alt: Style::default().fg(Color::Gray),
            heat_scale: [
                Color::Rgb(222, 235, 247),
                Color::Rgb(158, 202, 225),
                Color::Rgb(66, 146, 198),
                Color::Rgb(33, 113, 181),
                Color::Rgb(8, 48, 107),
            ],
            heat_text_light_bg: Color::Black,
            heat_text_dark_bg: Color::White,
            heat_empty: Style::default().fg(Color::DarkGray),
        }
    }

    /// Light-background terminal theme.
    pub fn light() -> Self {
        Self {
            title: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            text: Style::default().fg(Color::Black),
            dim: Style::default().fg(Color::Gray),
            label: Style::default().fg(Color::DarkGray),
            warning: Style::default().fg(Color::Rgb(180, 100, 0)),
            error: Style::default()
                .fg(Color::Red)
                .add_modifier(Modifier::BOLD),
            table_header: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            table_row: Style::default().fg(Color::Black),
            table_row_alt: Style::default().fg(Color::DarkGray),
            heat_scale: [
                Color::Rgb(239, 243, 255),
                Color::Rgb(189, 215, 231),
                Color::Rgb(107, 174, 214),
                Color::Rgb(49, 130, 189),
                Color::Rgb(8, 81, 156),
            ],
            heat_text_light_bg: Color::Black,
            heat_text_dark_bg: Color::White,
            heat_empty: Style::default().fg(Color::Gray),
        }
    }

    /// Pick light or dark based on the terminal background.
    pub fn auto_detect() -> Self {
        match detect_background() {
            BackgroundType::Light => Self::light(),
            BackgroundType::Dark => Self::dark(),
        }
    }

    /// Resolve a theme name; unknown names fall back to auto-detection.
    pub fn from_name(name: &str) -> Self {
        match name {
            "light" => Self::light(),
            "dark" => Self::dark(),
            _ => Self::auto_detect(),
        }
    }

    // ── Style helpers ────────────────────────────────────────────────────────

    /// Cell style for a retention rate, shaded against `scale_max`.
    ///
    /// Values at or above `scale_max` take the darkest shade. A non-positive
    /// `scale_max` puts everything in the darkest shade.
    pub fn heat_style(&self, value: f64, scale_max: f64) -> Style {
        let last = self.heat_scale.len() - 1;
        let bucket = if scale_max <= 0.0 {
            last
        } else {
            let fraction = (value / scale_max).clamp(0.0, 1.0);
            ((fraction * last as f64).round() as usize).min(last)
        };
        let fg = if bucket < 2 {
            self.heat_text_light_bg
        } else {
            self.heat_text_dark_bg
        };
        Style::default().bg(self.heat_scale[bucket]).fg(fg)
    }
}
