use ratatui::style::{Color, Modifier, Style};

use crate::wizard::MessageLevel;

#[derive(Debug, Clone)]
pub struct Theme {
    pub primary: Color,
    pub secondary: Color,
    pub background: Color,
    pub foreground: Color,
    pub error: Color,
    pub warning: Color,
    pub success: Color,
    pub border: Color,
    pub muted: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            primary: Color::LightGreen,
            secondary: Color::Cyan,
            background: Color::Reset,
            foreground: Color::White,
            error: Color::Red,
            warning: Color::Yellow,
            success: Color::Green,
            border: Color::DarkGray,
            muted: Color::DarkGray,
        }
    }
}

impl Theme {
    pub fn style(&self) -> Style {
        Style::default().fg(self.foreground).bg(self.background)
    }

    pub fn primary_style(&self) -> Style {
        Style::default().fg(self.primary)
    }

    pub fn secondary_style(&self) -> Style {
        Style::default().fg(self.secondary)
    }

    pub fn error_style(&self) -> Style {
        Style::default().fg(self.error)
    }

    pub fn warning_style(&self) -> Style {
        Style::default().fg(self.warning)
    }

    pub fn success_style(&self) -> Style {
        Style::default().fg(self.success)
    }

    pub fn border_style(&self) -> Style {
        Style::default().fg(self.border)
    }

    pub fn muted_style(&self) -> Style {
        Style::default().fg(self.muted)
    }

    /// Panel title, border style and text style for a message level
    pub fn message_styles(&self, level: MessageLevel) -> (&'static str, Style, Style) {
        match level {
            MessageLevel::Error => (" Error ", self.error_style(), self.error_style()),
            MessageLevel::Warning => (" Warning ", self.warning_style(), self.warning_style()),
            MessageLevel::Info => (" Info ", self.secondary_style(), self.style()),
        }
    }

    pub fn mode_style(&self, mode: &str) -> Style {
        let color = match mode {
            "NORMAL" => self.secondary,
            "INSERT" => self.success,
            "COMMAND" => self.primary,
            _ => self.foreground,
        };
        Style::default().fg(color).add_modifier(Modifier::BOLD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warning_is_distinct_from_error() {
        let theme = Theme::default();
        assert_ne!(theme.warning_style(), theme.error_style());
        let (title, border, _) = theme.message_styles(MessageLevel::Warning);
        assert_eq!(title, " Warning ");
        assert_eq!(border, theme.warning_style());
        assert_eq!(theme.mode_style("INSERT").fg, Some(theme.success));
    }
}
