use ratatui::layout::{Constraint, Direction, Layout as RatatuiLayout, Rect};

/// Screen regions shared by every wizard screen
pub struct Layout {
    pub full: Rect,
    pub header: Rect,
    pub content: Rect,
    pub message: Rect,
    pub status: Rect,
}

impl Layout {
    pub fn new(area: Rect) -> Self {
        // Message panel space is always reserved so the form never jumps
        let chunks = RatatuiLayout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),  // Header
                Constraint::Min(10),    // Content
                Constraint::Length(3),  // Message panel
                Constraint::Length(1),  // Status bar
            ])
            .split(area);

        Self {
            full: area,
            header: chunks[0],
            content: chunks[1],
            message: chunks[2],
            status: chunks[3],
        }
    }

    /// Sidebar (25%) and main panel (75%) of the content area
    pub fn split_sidebar(content: Rect) -> (Rect, Rect) {
        let chunks = RatatuiLayout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(25), Constraint::Percentage(75)])
            .split(content);
        (chunks[0], chunks[1])
    }

    /// Box of at most `width` x `height`, centered in `area`
    pub fn centered_box(area: Rect, width: u16, height: u16) -> Rect {
        let horizontal = RatatuiLayout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Fill(1),
                Constraint::Length(width.min(area.width)),
                Constraint::Fill(1),
            ])
            .split(area);

        let vertical = RatatuiLayout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Fill(1),
                Constraint::Length(height.min(area.height)),
                Constraint::Fill(1),
            ])
            .split(horizontal[1]);

        vertical[1]
    }
}
