use ratatui::style::Color;

/// Colours for the booking screens. Availability colours follow the
/// day summary: all open, some open, none open.
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub name: &'static str,
    pub accent: Color,
    pub text: Color,
    pub muted: Color,
    pub cursor_bg: Color,
    pub cursor_fg: Color,
    pub selected: Color,
    pub today: Color,
    pub open: Color,
    pub partial: Color,
    pub booked: Color,
    pub outside_hours: Color,
    pub error: Color,
    pub info: Color,
}

impl Theme {
    pub fn playroom() -> Self {
        Self {
            name: "playroom",
            accent: Color::Magenta,
            text: Color::White,
            muted: Color::DarkGray,
            cursor_bg: Color::Blue,
            cursor_fg: Color::White,
            selected: Color::LightMagenta,
            today: Color::Cyan,
            open: Color::Green,
            partial: Color::Yellow,
            booked: Color::Red,
            outside_hours: Color::LightRed,
            error: Color::Red,
            info: Color::Green,
        }
    }

    pub fn nord() -> Self {
        Self {
            name: "nord",
            accent: Color::Rgb(136, 192, 208),
            text: Color::Rgb(216, 222, 233),
            muted: Color::Rgb(76, 86, 106),
            cursor_bg: Color::Rgb(59, 66, 82),
            cursor_fg: Color::Rgb(236, 239, 244),
            selected: Color::Rgb(180, 142, 173),
            today: Color::Rgb(129, 161, 193),
            open: Color::Rgb(163, 190, 140),
            partial: Color::Rgb(235, 203, 139),
            booked: Color::Rgb(191, 97, 106),
            outside_hours: Color::Rgb(208, 135, 112),
            error: Color::Rgb(191, 97, 106),
            info: Color::Rgb(163, 190, 140),
        }
    }

    /// Black and white with bold cues only; for terminals without colour.
    pub fn plain() -> Self {
        Self {
            name: "plain",
            accent: Color::White,
            text: Color::White,
            muted: Color::Gray,
            cursor_bg: Color::White,
            cursor_fg: Color::Black,
            selected: Color::White,
            today: Color::White,
            open: Color::White,
            partial: Color::Gray,
            booked: Color::DarkGray,
            outside_hours: Color::Gray,
            error: Color::White,
            info: Color::White,
        }
    }

    pub fn by_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "playroom" | "default" => Some(Self::playroom()),
            "nord" => Some(Self::nord()),
            "plain" | "mono" => Some(Self::plain()),
            _ => None,
        }
    }

    pub fn names() -> [&'static str; 3] {
        ["playroom", "nord", "plain"]
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::playroom()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_listed_name_resolves() {
        for name in Theme::names() {
            assert_eq!(Theme::by_name(name).map(|t| t.name), Some(name));
        }
    }

    #[test]
    fn unknown_theme_is_rejected() {
        assert!(Theme::by_name("solarized").is_none());
    }

    #[test]
    fn lookup_ignores_case_and_padding() {
        assert_eq!(Theme::by_name(" NORD ").map(|t| t.name), Some("nord"));
    }
}
