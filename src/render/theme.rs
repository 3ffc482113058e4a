// Injected styling for the ladder widgets.

use ratatui::style::{Color, Modifier, Style};

use crate::market_data::types::Side;

/// Maps a side's base color to the color used for its row highlight.
pub type InterpolateColor = fn(Color) -> Color;

pub fn identity_color(color: Color) -> Color {
    color
}

#[derive(Debug, Clone)]
pub struct Theme {
    pub title: String,
    pub background: Color,
    pub text: Style,
    pub header: Style,
    pub price: Style,
    pub border: Style,
    pub bid_color: Color,
    pub ask_color: Color,
    // Row bar backgrounds; dim so the size text on top stays readable
    pub bid_bar: Color,
    pub ask_bar: Color,
    pub error: Style,
    pub interpolate_color: InterpolateColor,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            title: " Order Book ".to_string(),
            background: Color::Rgb(0x15, 0x18, 0x25),
            text: Style::default().fg(Color::Gray),
            header: Style::default().add_modifier(Modifier::BOLD),
            price: Style::default().fg(Color::Rgb(0xb7, 0xbd, 0xc1)),
            border: Style::default().fg(Color::DarkGray),
            bid_color: Color::Green,
            ask_color: Color::Red,
            bid_bar: Color::Rgb(0x14, 0x33, 0x22),
            ask_bar: Color::Rgb(0x3a, 0x18, 0x1c),
            error: Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            interpolate_color: identity_color,
        }
    }
}

impl Theme {
    pub fn side_color(&self, side: Side) -> Color {
        match side {
            Side::Bid => self.bid_color,
            Side::Ask => self.ask_color,
        }
    }

    pub fn bar_color(&self, side: Side) -> Color {
        match side {
            Side::Bid => self.bid_bar,
            Side::Ask => self.ask_bar,
        }
    }

    // Background only, so the row's foreground colors survive the patch
    pub fn row_highlight(&self, side: Side) -> Style {
        Style::default().bg((self.interpolate_color)(self.bar_color(side)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_uses_noop_interpolation() {
        let theme = Theme::default();
        assert_eq!(theme.row_highlight(Side::Bid).bg, Some(theme.bid_bar));
        assert_eq!(theme.row_highlight(Side::Ask).bg, Some(theme.ask_bar));
        assert_eq!(theme.row_highlight(Side::Ask).fg, None);
    }

    #[test]
    fn test_bar_differs_from_side_text_color() {
        let theme = Theme::default();
        for side in [Side::Bid, Side::Ask] {
            assert_ne!(theme.row_highlight(side).bg, Some(theme.side_color(side)));
        }
    }

    #[test]
    fn test_custom_interpolation_is_applied() {
        let theme = Theme { interpolate_color: |_| Color::Blue, ..Theme::default() };
        assert_eq!(theme.row_highlight(Side::Ask).bg, Some(Color::Blue));
    }
}
