use catppuccin::PALETTE;
use ratatui::style::Color;
use ratatui::widgets::BorderType;

/// Convert a catppuccin color to a ratatui color.
const fn catppuccin_to_color(c: &catppuccin::Color) -> Color {
    Color::Rgb(c.rgb.r, c.rgb.g, c.rgb.b)
}

/// Application theme.
///
/// Holds all color values directly so components never reach for a global
/// palette. Built once at startup and passed by reference into every render.
#[derive(Debug, Clone, Copy)]
pub struct Theme {
    pub base: Color,
    pub surface0: Color,
    pub surface1: Color,

    pub overlay0: Color,

    pub text: Color,
    pub subtext0: Color,
    pub subtext1: Color,

    pub mauve: Color,
    pub red: Color,
    pub peach: Color,
    pub green: Color,
    pub blue: Color,
    pub lavender: Color,

    pub border_type: BorderType,
}

impl Theme {
    /// Create a theme from a Catppuccin flavor.
    const fn from_catppuccin(flavor: &catppuccin::Flavor) -> Self {
        let c = &flavor.colors;
        Self {
            base: catppuccin_to_color(&c.base),
            surface0: catppuccin_to_color(&c.surface0),
            surface1: catppuccin_to_color(&c.surface1),
            overlay0: catppuccin_to_color(&c.overlay0),
            text: catppuccin_to_color(&c.text),
            subtext0: catppuccin_to_color(&c.subtext0),
            subtext1: catppuccin_to_color(&c.subtext1),
            mauve: catppuccin_to_color(&c.mauve),
            red: catppuccin_to_color(&c.red),
            peach: catppuccin_to_color(&c.peach),
            green: catppuccin_to_color(&c.green),
            blue: catppuccin_to_color(&c.blue),
            lavender: catppuccin_to_color(&c.lavender),
            border_type: BorderType::Rounded,
        }
    }

    pub const fn mocha() -> Self {
        Self::from_catppuccin(&PALETTE.mocha)
    }

    pub const fn macchiato() -> Self {
        Self::from_catppuccin(&PALETTE.macchiato)
    }

    pub const fn frappe() -> Self {
        Self::from_catppuccin(&PALETTE.frappe)
    }

    pub const fn latte() -> Self {
        Self::from_catppuccin(&PALETTE.latte)
    }
}

/// Look up a theme by its configured name. Unknown names fall back to Mocha.
pub fn theme_from_name(name: &str) -> Theme {
    match name.to_lowercase().as_str() {
        "latte" => Theme::latte(),
        "frappe" | "frappé" => Theme::frappe(),
        "macchiato" => Theme::macchiato(),
        _ => Theme::mocha(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_theme_name_falls_back_to_mocha() {
        let theme = theme_from_name("does-not-exist");
        assert_eq!(theme.base, Theme::mocha().base);
    }

    #[test]
    fn theme_names_are_case_insensitive() {
        assert_eq!(theme_from_name("Latte").base, Theme::latte().base);
        assert_eq!(theme_from_name("MACCHIATO").base, Theme::macchiato().base);
    }
}
