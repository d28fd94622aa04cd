use ratatui::{prelude::*, widgets::Paragraph};

use super::super::{PanelFocus, Step, TaskState, WizardApp};

/// Review of everything entered, or the task list once submission started
pub fn draw_summary(frame: &mut Frame, area: Rect, app: &WizardApp) {
    if area.height < 8 || area.width < 40 {
        return;
    }

    let mut y = area.y + 1;
    frame.render_widget(
        Paragraph::new(Step::Summary.title())
            .style(app.theme.primary_style().add_modifier(Modifier::BOLD)),
        Rect::new(area.x + 2, y, area.width - 4, 1),
    );
    y += 2;

    let bottom = area.y + area.height - 3;

    if app.tasks.is_empty() {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(Rect::new(area.x + 2, y, area.width - 4, bottom.saturating_sub(y)));

        let mut left = section_lines(app, Step::Personal);
        let mut right = section_lines(app, Step::Academic);
        right.push(Line::raw(""));
        right.extend(section_lines(app, Step::Family));

        if let Some(warning) = app.national_id_warning() {
            left.push(Line::raw(""));
            left.push(Line::styled(warning, app.theme.warning_style()));
        }

        frame.render_widget(Paragraph::new(left), columns[0]);
        frame.render_widget(Paragraph::new(right), columns[1]);
    } else {
        draw_tasks(frame, Rect::new(area.x + 2, y, area.width - 4, bottom.saturating_sub(y)), app);
    }

    if !app.is_executing {
        let button_text = " [Enter] Submit enrollment ";
        let button_style = if app.panel_focus == PanelFocus::Content {
            app.theme.primary_style().add_modifier(Modifier::BOLD | Modifier::REVERSED)
        } else {
            app.theme.muted_style().add_modifier(Modifier::REVERSED)
        };
        frame.render_widget(
            Paragraph::new(button_text).style(button_style),
            Rect::new(area.x + 2, bottom + 1, button_text.len() as u16, 1),
        );
    }
}

/// Step header, then every filled field and every missing required one
fn section_lines<'a>(app: &'a WizardApp, step: Step) -> Vec<Line<'a>> {
    let mut lines = vec![Line::styled(
        format!("{}. {}", step.number(), step.short_name()),
        app.theme.style().add_modifier(Modifier::BOLD),
    )];

    for field in step.fields() {
        let value = app.field_display(*field);
        if value.is_empty() {
            if field.is_required() {
                lines.push(Line::styled(
                    format!("  {}: (missing)", field.label()),
                    app.theme.error_style(),
                ));
            }
            continue;
        }
        lines.push(Line::from(vec![
            Span::styled(format!("  {}: ", field.label()), app.theme.muted_style()),
            Span::styled(value, app.theme.secondary_style()),
        ]));
    }
    lines
}

fn draw_tasks(frame: &mut Frame, area: Rect, app: &WizardApp) {
    frame.render_widget(
        Paragraph::new("Submitting:").style(app.theme.style()),
        Rect::new(area.x, area.y, area.width, 1),
    );

    for (i, task) in app.tasks.iter().enumerate() {
        let row = area.y + 1 + i as u16;
        if row >= area.y + area.height {
            break;
        }

        let (status_char, style) = match task.status {
            TaskState::Pending => (' ', app.theme.muted_style()),
            TaskState::Running => (app.spinner_char(), app.theme.primary_style()),
            TaskState::Success => ('x', app.theme.secondary_style()),
            TaskState::Failed => ('!', app.theme.error_style()),
        };

        let line = match &task.output {
            Some(output) => format!("  [{status_char}] {} ({output})", task.name),
            None => format!("  [{status_char}] {}", task.name),
        };
        frame.render_widget(
            Paragraph::new(line).style(style),
            Rect::new(area.x, row, area.width, 1),
        );
    }
}
