use ratatui::{prelude::*, widgets::Paragraph};

use super::super::{FieldKind, PanelFocus, StepResult, WizardApp};
use super::{caret_line, scroll_offset};
use crate::vim::VimMode;

const LABEL_WIDTH: u16 = 20;

pub fn draw_step_form(frame: &mut Frame, area: Rect, app: &WizardApp) {
    if area.height < 6 || area.width < 30 {
        return;
    }

    let step = app.current_step();
    let is_content_focused = app.panel_focus == PanelFocus::Content;
    let show_missing = app.step_results[step.index()] == StepResult::Failed;
    let mut y = area.y + 1;

    frame.render_widget(
        Paragraph::new(format!("Step {}/4: {}", step.number(), step.title()))
            .style(app.theme.primary_style().add_modifier(Modifier::BOLD)),
        Rect::new(area.x + 2, y, area.width - 4, 1),
    );
    y += 2;

    let fields = step.fields();
    let list_height = (area.y + area.height).saturating_sub(y + 1) as usize;
    let offset = scroll_offset(app.field_cursor, list_height);

    for (i, field) in fields.iter().skip(offset).take(list_height).enumerate() {
        let row = y + i as u16;
        let is_field_focused = is_content_focused && i + offset == app.field_cursor;
        let is_insert = is_field_focused && app.vim_mode == VimMode::Insert && app.picker.is_none();
        let is_missing = field.is_required() && !app.state.is_present(*field);

        let label = if field.is_required() {
            format!("{} *", field.label())
        } else {
            field.label().to_string()
        };
        let label_style = if is_field_focused {
            app.theme.primary_style().add_modifier(Modifier::BOLD)
        } else if show_missing && is_missing {
            app.theme.error_style()
        } else {
            app.theme.style()
        };
        frame.render_widget(
            Paragraph::new(label).style(label_style),
            Rect::new(area.x + 2, row, LABEL_WIDTH, 1),
        );

        let value_x = area.x + 2 + LABEL_WIDTH;
        let value_area = Rect::new(value_x, row, area.width.saturating_sub(LABEL_WIDTH + 4), 1);

        if is_insert {
            let (before, after) = app.edit_buffer.split_at_cursor();
            frame.render_widget(Paragraph::new(caret_line(before, after, app)), value_area);
            continue;
        }

        let value = app.field_display(*field);
        let (text, style) = if value.is_empty() {
            let placeholder = match field.kind() {
                FieldKind::Choice(kind) if app.catalog.list(kind).is_empty() => "(not loaded)",
                FieldKind::Choice(_) => "(choose)",
                FieldKind::File(_) => "(path to file)",
                FieldKind::Text => "(empty)",
            };
            (placeholder.to_string(), app.theme.muted_style())
        } else if is_field_focused {
            (value, app.theme.style().add_modifier(Modifier::REVERSED))
        } else {
            (value, app.theme.secondary_style())
        };

        frame.render_widget(Paragraph::new(text).style(style), value_area);
    }
}
