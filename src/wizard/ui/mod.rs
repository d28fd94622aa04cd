mod form;
mod picker;
mod receipt;
mod summary;
mod welcome;

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, Paragraph},
};

use super::{ConfirmAction, PanelFocus, Step, StepResult, WizardApp};
use crate::ui::widgets::draw_message_panel;
use crate::ui::Layout;
use crate::vim::VimMode;

/// Main draw function for the enrollment wizard
pub fn draw(frame: &mut Frame, app: &WizardApp) {
    let area = frame.area();
    frame.render_widget(Clear, area);

    let layout = Layout::new(area);
    draw_header(frame, layout.header, app);

    match app.panel_focus {
        PanelFocus::Welcome => welcome::draw_welcome_content(frame, layout.content, app),
        PanelFocus::Done => receipt::draw_receipt(frame, layout.content, app),
        PanelFocus::Sidebar | PanelFocus::Content => {
            let (sidebar, main) = Layout::split_sidebar(layout.content);
            draw_sidebar(frame, sidebar, app);
            draw_main_content(frame, main, app);
        }
    }

    let busy = app.is_executing.then_some("Submitting your enrollment, please wait...");
    draw_message_panel(frame, layout.message, app.message.as_ref(), busy, &app.theme);
    draw_status_bar(frame, layout.status, app);

    // Overlays
    if let Some(action) = app.confirm_action {
        draw_confirm_dialog(frame, action, app);
    }

    if app.show_help {
        draw_help(frame, app);
    }
}

/// Draw header bar (1 line, no borders)
fn draw_header(frame: &mut Frame, area: Rect, app: &WizardApp) {
    frame.render_widget(Clear, area);

    let title = format!(" {} (v{}) ", app.config.general.title, env!("CARGO_PKG_VERSION"));
    frame.render_widget(
        Paragraph::new(title).style(app.theme.primary_style().add_modifier(Modifier::BOLD)),
        area,
    );

    let (backend, style) = if app.is_dryrun() {
        ("[Demo data] ".to_string(), app.theme.warning_style())
    } else {
        (format!("[{}] ", app.config.api.base_url), app.theme.muted_style())
    };
    frame.render_widget(
        Paragraph::new(backend).style(style).alignment(Alignment::Right),
        area,
    );
}

fn draw_sidebar(frame: &mut Frame, area: Rect, app: &WizardApp) {
    let is_focused = app.panel_focus == PanelFocus::Sidebar;

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(if is_focused {
            app.theme.primary_style()
        } else {
            app.theme.border_style()
        })
        .title(" Steps ");

    let inner = block.inner(area);
    frame.render_widget(Clear, area);
    frame.render_widget(block, area);

    if inner.height < 3 {
        return;
    }

    for (idx, step) in Step::ALL.iter().enumerate() {
        if idx as u16 >= inner.height {
            break;
        }

        let is_current = *step == app.current_step();
        let is_selected = if is_focused {
            idx == app.sidebar_cursor
        } else {
            is_current
        };
        let result = app.step_results[idx];

        let status = match result {
            StepResult::Completed => "[x]",
            StepResult::Failed => "[!]",
            StepResult::Pending => "[ ]",
        };
        let required = if step.required_fields().is_empty() { "" } else { " *" };
        let line_text = format!(" {status} {} {}{required}", step.number(), step.short_name());

        let style = if is_selected && is_focused {
            app.theme.primary_style().add_modifier(Modifier::BOLD | Modifier::REVERSED)
        } else if is_selected {
            app.theme.secondary_style().add_modifier(Modifier::REVERSED)
        } else if result == StepResult::Completed {
            app.theme.secondary_style()
        } else if result == StepResult::Failed {
            app.theme.error_style()
        } else {
            app.theme.style()
        };

        let line_area = Rect::new(inner.x, inner.y + idx as u16, inner.width, 1);
        if is_selected {
            frame.render_widget(Clear, line_area);
        }
        frame.render_widget(Paragraph::new(line_text).style(style), line_area);
    }

    if is_focused && inner.height > Step::ALL.len() as u16 + 2 {
        let hint = "j/k:nav l/Enter:open";
        frame.render_widget(
            Paragraph::new(hint).style(app.theme.muted_style()),
            Rect::new(inner.x, inner.y + inner.height - 1, inner.width, 1),
        );
    }
}

fn draw_main_content(frame: &mut Frame, area: Rect, app: &WizardApp) {
    let is_focused = app.panel_focus == PanelFocus::Content;

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(if is_focused {
            app.theme.primary_style()
        } else {
            app.theme.border_style()
        });

    let inner = block.inner(area);
    frame.render_widget(Clear, area);
    frame.render_widget(block, area);

    match app.current_step() {
        Step::Summary => summary::draw_summary(frame, inner, app),
        _ => form::draw_step_form(frame, inner, app),
    }

    if app.picker.is_some() {
        picker::draw_picker(frame, inner, app);
    }
}

fn draw_status_bar(frame: &mut Frame, area: Rect, app: &WizardApp) {
    frame.render_widget(Clear, area);

    let mode_name = app.vim_mode.display_name();
    let mode_span = Span::styled(format!(" {mode_name} "), app.theme.mode_style(mode_name));

    let after_mode = if app.vim_mode == VimMode::Command {
        Span::styled(format!(":{}", app.command_buffer.content()), app.theme.style())
    } else if app.is_executing {
        Span::styled(
            format!("{} {}", app.spinner_char(), app.status_bar.left_hint),
            app.theme.primary_style(),
        )
    } else {
        Span::styled(app.status_bar.left_hint.clone(), app.theme.muted_style())
    };

    frame.render_widget(
        Paragraph::new(Line::from(vec![mode_span, Span::raw(" "), after_mode])),
        Rect::new(area.x, area.y, area.width * 2 / 3, 1),
    );

    let completed = app
        .step_results
        .iter()
        .filter(|r| **r == StepResult::Completed)
        .count();
    let total = Step::ALL.len();

    let right_text = if app.status_bar.right_hint.is_empty() {
        format!("{completed}/{total}")
    } else {
        format!("{completed}/{total}  {}", app.status_bar.right_hint)
    };

    frame.render_widget(
        Paragraph::new(right_text)
            .style(app.theme.muted_style())
            .alignment(Alignment::Right),
        Rect::new(area.x + area.width / 3, area.y, area.width * 2 / 3, 1),
    );
}

fn draw_confirm_dialog(frame: &mut Frame, action: ConfirmAction, app: &WizardApp) {
    let (title, message) = match action {
        ConfirmAction::Submit => ("Submit", "Submit your enrollment now?"),
        ConfirmAction::Quit => ("Quit", "Quit without submitting?"),
    };

    let area = Layout::centered_box(frame.area(), 44, 7);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(app.theme.primary_style())
        .title(format!(" {title} "));

    let inner = block.inner(area);
    frame.render_widget(Clear, area);
    frame.render_widget(block, area);

    if inner.height < 4 {
        return;
    }

    frame.render_widget(
        Paragraph::new(message)
            .style(app.theme.style().add_modifier(Modifier::BOLD))
            .alignment(Alignment::Center),
        Rect::new(inner.x, inner.y + 1, inner.width, 1),
    );

    let hints = Line::from(vec![
        Span::styled("[", app.theme.style()),
        Span::styled("Y", app.theme.primary_style().add_modifier(Modifier::BOLD)),
        Span::styled("]es / [", app.theme.style()),
        Span::styled("N", app.theme.primary_style().add_modifier(Modifier::BOLD)),
        Span::styled("]o", app.theme.style()),
    ]);

    frame.render_widget(
        Paragraph::new(hints).alignment(Alignment::Center),
        Rect::new(inner.x, inner.y + 3, inner.width, 1),
    );
}

fn draw_help(frame: &mut Frame, app: &WizardApp) {
    let area = Layout::centered_box(frame.area(), 60, 24);

    let help_text = [
        "",
        "Navigation:",
        "",
        "  Ctrl+h / Ctrl+l  Focus steps / form",
        "  j/k              Move between fields",
        "  Enter            Edit field / open list",
        "  x                Clear field",
        "  > / <            Next / previous step",
        "  1-4              Go to step",
        "",
        "Editing:",
        "",
        "  i                Edit text field",
        "  Esc / Enter      Keep the edit",
        "  Tab              Keep and edit next field",
        "",
        "Commands:",
        "",
        "  :next :back :goto N :submit",
        "  :retry (reload lists) :help :q",
        "",
        "Press q or Esc to close",
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(app.theme.border_style())
        .title(" Help ");

    let inner = block.inner(area);
    frame.render_widget(Clear, area);
    frame.render_widget(block, area);

    for (i, line) in help_text.iter().enumerate() {
        if i as u16 >= inner.height {
            break;
        }
        frame.render_widget(
            Paragraph::new(*line).style(app.theme.style()),
            Rect::new(inner.x, inner.y + i as u16, inner.width, 1),
        );
    }
}

/// Text before the caret, the caret, then the rest
pub(super) fn caret_line<'a>(before: &'a str, after: &'a str, app: &WizardApp) -> Line<'a> {
    Line::from(vec![
        Span::styled(before, app.theme.style()),
        Span::styled("|", app.theme.primary_style().add_modifier(Modifier::BOLD)),
        Span::styled(after, app.theme.style()),
    ])
}

/// First row to show so that `selected` stays visible in `height` rows
pub(super) fn scroll_offset(selected: usize, height: usize) -> usize {
    if height > 0 && selected >= height {
        selected - height + 1
    } else {
        0
    }
}
