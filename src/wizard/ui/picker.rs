use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState},
};

use super::super::WizardApp;
use super::{caret_line, scroll_offset};
use crate::ui::Layout;

/// Option list overlay for the choice field being edited
pub fn draw_picker(frame: &mut Frame, area: Rect, app: &WizardApp) {
    let Some(picker) = &app.picker else {
        return;
    };

    let width = 50.min(area.width.saturating_sub(4));
    let height = 16.min(area.height.saturating_sub(2));
    let boxed = Layout::centered_box(area, width, height);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(app.theme.primary_style())
        .title(format!(" Select {} ", picker.field.label()));

    let inner = block.inner(boxed);
    frame.render_widget(Clear, boxed);
    frame.render_widget(block, boxed);

    if inner.height < 4 || inner.width < 10 {
        return;
    }

    let mut y = inner.y;

    // Filter input
    let filter_label = "Filter: ";
    frame.render_widget(
        Paragraph::new(filter_label).style(app.theme.style()),
        Rect::new(inner.x + 1, y, filter_label.len() as u16, 1),
    );
    let (before, after) = picker.filter.split_at_cursor();
    frame.render_widget(
        Paragraph::new(caret_line(before, after, app)),
        Rect::new(
            inner.x + 1 + filter_label.len() as u16,
            y,
            inner.width.saturating_sub(filter_label.len() as u16 + 2),
            1,
        ),
    );
    y += 2;

    let items = app.picker_items();
    let list_height = (inner.y + inner.height).saturating_sub(y) as usize;

    if items.is_empty() {
        frame.render_widget(
            Paragraph::new("  No match").style(app.theme.muted_style()),
            Rect::new(inner.x + 1, y, inner.width.saturating_sub(2), 1),
        );
        return;
    }

    let offset = scroll_offset(picker.selected, list_height);
    let current = app.state.choice(picker.field);

    for (i, item) in items.iter().skip(offset).take(list_height).enumerate() {
        let is_selected = i + offset == picker.selected;
        let prefix = if is_selected { ">" } else { " " };
        let marker = if current == Some(item.id) { " (current)" } else { "" };
        let line = match &item.code {
            Some(code) => format!("{prefix} {} [{code}]{marker}", item.label),
            None => format!("{prefix} {}{marker}", item.label),
        };

        let style = if is_selected {
            app.theme.primary_style().add_modifier(Modifier::BOLD)
        } else {
            app.theme.style()
        };

        frame.render_widget(
            Paragraph::new(line).style(style),
            Rect::new(inner.x + 1, y + i as u16, inner.width.saturating_sub(3), 1),
        );
    }

    if items.len() > list_height {
        let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
            .begin_symbol(Some("^"))
            .end_symbol(Some("v"));
        let mut scrollbar_state = ScrollbarState::new(items.len()).position(picker.selected);

        frame.render_stateful_widget(
            scrollbar,
            Rect::new(inner.x + inner.width - 1, y, 1, list_height as u16),
            &mut scrollbar_state,
        );
    }
}
