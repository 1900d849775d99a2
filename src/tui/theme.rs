use ratatui::style::{Color, Modifier, Style};

#[derive(Clone, Debug)]
pub struct Theme {
    pub name: &'static str,
    pub bg: Color,
    pub fg: Color,
    pub accent: Color,
    pub success: Color,
    pub warning: Color,
    pub error: Color,
    pub border: Color,
    pub highlight: Color,
    pub secondary: Color,
}

impl Theme {
    pub fn dark() -> Self {
        Self {
            name: "dark",
            bg: Color::Rgb(40, 44, 52),
            fg: Color::Rgb(171, 178, 191),
            accent: Color::Rgb(97, 175, 239),
            success: Color::Rgb(152, 195, 121),
            warning: Color::Rgb(229, 192, 123),
            error: Color::Rgb(224, 108, 117),
            border: Color::Rgb(92, 99, 112),
            highlight: Color::Rgb(86, 182, 194),
            secondary: Color::Rgb(130, 137, 151),
        }
    }

    pub fn light() -> Self {
        Self {
            name: "light",
            bg: Color::Rgb(250, 250, 250),
            fg: Color::Rgb(60, 60, 60),
            accent: Color::Rgb(0, 122, 255),
            success: Color::Rgb(40, 167, 69),
            warning: Color::Rgb(255, 193, 7),
            error: Color::Rgb(220, 53, 69),
            border: Color::Rgb(200, 200, 200),
            highlight: Color::Rgb(23, 162, 184),
            secondary: Color::Rgb(108, 117, 125),
        }
    }

    pub fn by_name(name: &str) -> Self {
        match name {
            "light" => Self::light(),
            _ => Self::dark(),
        }
    }

    /// Terminal color for a specialist's `bg-medical-*` tag.
    pub fn specialist_color(&self, tag: &str) -> Color {
        match tag.trim_start_matches("bg-medical-") {
            "blue" => Color::Rgb(59, 130, 246),
            "red" => Color::Rgb(239, 68, 68),
            "green" => Color::Rgb(34, 197, 94),
            "teal" => Color::Rgb(20, 184, 166),
            "amber" => Color::Rgb(245, 158, 11),
            _ => self.highlight,
        }
    }

    // Style helpers
    pub fn normal(&self) -> Style {
        Style::default().fg(self.fg).bg(self.bg)
    }

    pub fn accent(&self) -> Style {
        Style::default().fg(self.accent)
    }

    pub fn success(&self) -> Style {
        Style::default().fg(self.success)
    }

    pub fn warning(&self) -> Style {
        Style::default().fg(self.warning)
    }

    pub fn error(&self) -> Style {
        Style::default().fg(self.error)
    }

    pub fn highlight(&self) -> Style {
        Style::default().fg(self.highlight).add_modifier(Modifier::BOLD)
    }

    pub fn secondary(&self) -> Style {
        Style::default().fg(self.secondary)
    }

    pub fn border(&self) -> Style {
        Style::default().fg(self.border)
    }

    pub fn selected(&self) -> Style {
        Style::default().fg(self.bg).bg(self.accent)
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}
