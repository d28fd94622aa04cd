use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use crate::ui::Theme;
use crate::wizard::{Message, MessageLevel};

/// Bordered one-message panel; `busy` is shown while no message is set.
pub fn draw_message_panel(
    frame: &mut Frame,
    area: Rect,
    message: Option<&Message>,
    busy: Option<&str>,
    theme: &Theme,
) {
    let (text, level) = match (message, busy) {
        (Some(m), _) => (m.text.as_str(), m.level),
        (None, Some(busy)) => (busy, MessageLevel::Info),
        (None, None) => return,
    };

    let (title, border_style, text_style) = theme.message_styles(level);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(title)
        .title_style(border_style.add_modifier(Modifier::BOLD));

    let mut spans = vec![Span::styled(text, text_style)];
    if message.is_some() {
        spans.push(Span::styled(" (press any key to dismiss)", theme.muted_style()));
    }

    let paragraph = Paragraph::new(Line::from(spans))
        .block(block)
        .wrap(Wrap { trim: true });

    frame.render_widget(paragraph, area);
}
