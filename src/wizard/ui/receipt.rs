use ratatui::{prelude::*, widgets::{Block, Borders, Clear, Paragraph, Wrap}};

use super::super::WizardApp;
use crate::api::types::PENDING_STATUS;
use crate::ui::Layout;

pub fn draw_receipt(frame: &mut Frame, area: Rect, app: &WizardApp) {
    let Some(receipt) = &app.receipt else {
        return;
    };

    let centered = Layout::centered_box(area, 64, 14);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(app.theme.success_style())
        .title(" Enrollment submitted ");

    let inner = block.inner(centered);
    frame.render_widget(Clear, centered);
    frame.render_widget(block, centered);

    let mut lines = vec![
        Line::raw(""),
        Line::from(vec![
            Span::styled("  Enrollment: ", app.theme.muted_style()),
            Span::styled(
                format!("#{}", receipt.enrollment_id),
                app.theme.primary_style().add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(vec![
            Span::styled("  Student:    ", app.theme.muted_style()),
            Span::styled(format!("#{}", receipt.student_id), app.theme.style()),
        ]),
        Line::from(vec![
            Span::styled("  Status:     ", app.theme.muted_style()),
            Span::styled(PENDING_STATUS, app.theme.secondary_style()),
        ]),
        Line::raw(""),
    ];

    for kind in &receipt.uploaded {
        lines.push(Line::styled(
            format!("  [x] {} uploaded", kind.display_name()),
            app.theme.success_style(),
        ));
    }
    for warning in &receipt.warnings {
        lines.push(Line::styled(format!("  [!] {warning}"), app.theme.warning_style()));
    }
    lines.push(Line::raw(""));
    lines.push(Line::styled("  Press q to quit", app.theme.muted_style()));

    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
}
