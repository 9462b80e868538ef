use crossterm::style::{Attribute, Color, ContentStyle, Stylize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub accent: Color,
    pub neutral: Color,
    pub muted: Color,
    pub error: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            accent: Color::AnsiValue(50),
            neutral: Color::AnsiValue(255),
            muted: Color::AnsiValue(240),
            error: Color::AnsiValue(203),
        }
    }
}

impl Palette {
    #[must_use]
    pub fn border_color(&self, selected: bool) -> Color {
        if selected {
            self.accent
        } else {
            self.neutral
        }
    }

    #[must_use]
    pub fn border_style(&self, selected: bool) -> ContentStyle {
        ContentStyle::new().with(self.border_color(selected))
    }

    #[must_use]
    pub fn label_style(&self, selected: bool) -> ContentStyle {
        let style = self.border_style(selected);
        if selected {
            style.attribute(Attribute::Bold)
        } else {
            style
        }
    }

    #[must_use]
    pub fn highlight_style(&self) -> ContentStyle {
        ContentStyle::new().with(self.accent).attribute(Attribute::Bold)
    }

    #[must_use]
    pub fn muted_style(&self) -> ContentStyle {
        ContentStyle::new().with(self.muted)
    }

    #[must_use]
    pub fn header_style(&self) -> ContentStyle {
        ContentStyle::new().attribute(Attribute::Bold)
    }

    #[must_use]
    pub fn cursor_style(&self) -> ContentStyle {
        ContentStyle::new().attribute(Attribute::Reverse)
    }

    #[must_use]
    pub fn error_style(&self) -> ContentStyle {
        ContentStyle::new().with(self.error)
    }
}

#[must_use]
pub fn paint(style: ContentStyle, text: impl AsRef<str>) -> String {
    style.apply(text.as_ref()).to_string()
}
