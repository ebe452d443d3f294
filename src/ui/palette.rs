use std::str::FromStr;

use ratatui::style::{Color, Modifier, Style};

use crate::theme::ThemeSettings;

/// Terminal colors derived from the saved theme.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Palette {
    pub(crate) accent: Color,
    pub(crate) text: Color,
    pub(crate) bg: Color,
    pub(crate) dark: Color,
    pub(crate) light: Color,
}

impl Palette {
    /// Convert the theme's values; anything unparsable keeps the scheme's
    /// fallback color for that slot.
    pub(crate) fn from_theme(theme: &ThemeSettings) -> Self {
        let fallback = if theme.is_light() {
            Self::light()
        } else {
            Self::dark()
        };
        Self {
            accent: parse_color(&theme.color_accent).unwrap_or(fallback.accent),
            text: parse_color(&theme.color_text).unwrap_or(fallback.text),
            bg: parse_color(&theme.color_bg).unwrap_or(fallback.bg),
            dark: parse_color(&theme.color_dark).unwrap_or(fallback.dark),
            light: parse_color(&theme.color_light).unwrap_or(fallback.light),
        }
    }

    fn dark() -> Self {
        Self {
            accent: Color::Cyan,
            text: Color::White,
            bg: Color::Reset,
            dark: Color::DarkGray,
            light: Color::Gray,
        }
    }

    fn light() -> Self {
        Self {
            accent: Color::Blue,
            text: Color::Black,
            bg: Color::White,
            dark: Color::Gray,
            light: Color::DarkGray,
        }
    }

    pub(crate) fn base(&self) -> Style {
        Style::default().fg(self.text).bg(self.bg)
    }

    pub(crate) fn border(&self) -> Style {
        Style::default().fg(self.dark)
    }

    pub(crate) fn heading(&self) -> Style {
        Style::default()
            .fg(self.accent)
            .add_modifier(Modifier::BOLD)
    }

    pub(crate) fn hint(&self) -> Style {
        Style::default().fg(self.light)
    }

    pub(crate) fn selected(&self) -> Style {
        Style::default()
            .fg(self.bg)
            .bg(self.accent)
            .add_modifier(Modifier::BOLD)
    }
}

fn parse_color(raw: &str) -> Option<Color> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    Color::from_str(trimmed).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_and_named_colors_are_used() {
        let mut theme = ThemeSettings::default();
        theme.color_accent = "#ff8800".to_string();
        theme.color_text = "yellow".to_string();

        let palette = Palette::from_theme(&theme);
        assert_eq!(palette.accent, Color::Rgb(0xff, 0x88, 0x00));
        assert_eq!(palette.text, Color::Yellow);
    }

    #[test]
    fn garbage_falls_back_per_scheme() {
        let mut theme = ThemeSettings::default();
        theme.color_accent = "not-a-color".to_string();
        assert_eq!(Palette::from_theme(&theme).accent, Color::Cyan);

        theme.color_scheme = "light".to_string();
        assert_eq!(Palette::from_theme(&theme).accent, Color::Blue);
    }
}
