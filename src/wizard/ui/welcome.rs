use ratatui::{prelude::*, widgets::{Block, Borders, Clear, Paragraph}};

use super::super::WizardApp;
use crate::ui::Layout;

pub fn draw_welcome_content(frame: &mut Frame, area: Rect, app: &WizardApp) {
    let centered = Layout::centered_box(area, 64, 16);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(app.theme.border_style())
        .title(format!(" {} ", app.config.general.title));

    let inner = block.inner(centered);
    frame.render_widget(Clear, centered);
    frame.render_widget(block, centered);

    if inner.height < 4 {
        return;
    }

    let mut lines = vec![
        String::new(),
        app.config.general.subtitle.clone(),
        String::new(),
        "  1. Personal information and identity documents".to_string(),
        "  2. Diploma, program and exam centers".to_string(),
        "  3. Family and emergency contact".to_string(),
        "  4. Review and submit".to_string(),
        String::new(),
    ];
    if app.is_dryrun() {
        lines.push("  Demo mode: nothing is sent to the server".to_string());
    }

    let mut y = inner.y;
    for line in &lines {
        if y >= inner.y + inner.height.saturating_sub(2) {
            break;
        }
        frame.render_widget(
            Paragraph::new(line.as_str()).style(app.theme.style()),
            Rect::new(inner.x + 1, y, inner.width.saturating_sub(2), 1),
        );
        y += 1;
    }

    let button_y = inner.y + inner.height - 2;
    let button_text = "[ Start Enrollment ]";
    let button_width = button_text.len() as u16;
    let button_x = inner.x + (inner.width.saturating_sub(button_width)) / 2;

    frame.render_widget(
        Paragraph::new(button_text)
            .style(app.theme.primary_style().add_modifier(Modifier::BOLD | Modifier::REVERSED)),
        Rect::new(button_x, button_y, button_width.min(inner.width), 1),
    );

    let hint = "Press Enter to begin";
    let hint_x = inner.x + (inner.width.saturating_sub(hint.len() as u16)) / 2;
    frame.render_widget(
        Paragraph::new(hint).style(app.theme.muted_style()),
        Rect::new(hint_x, button_y + 1, (hint.len() as u16).min(inner.width), 1),
    );
}
