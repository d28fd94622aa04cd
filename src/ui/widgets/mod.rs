mod message_panel;

pub use message_panel::draw_message_panel;
