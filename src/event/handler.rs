use crossterm::event::{self, KeyEvent, KeyEventKind};
use std::time::Duration;
use tokio::sync::mpsc;

use crate::wizard::WizardMessage;

#[derive(Debug)]
pub enum Event {
    Key(KeyEvent),
    Resize,
    Tick,
    /// Result of a background fetch or submission
    Wizard(WizardMessage),
}

/// Merges terminal input, ticks and wizard task results into one stream
pub struct EventHandler {
    rx: mpsc::UnboundedReceiver<Event>,
    wizard_rx: mpsc::UnboundedReceiver<WizardMessage>,
    wizard_tx: mpsc::UnboundedSender<WizardMessage>,
}

impl EventHandler {
    pub fn new(tick_rate: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let (wizard_tx, wizard_rx) = mpsc::unbounded_channel();

        std::thread::spawn(move || {
            loop {
                let event = if event::poll(tick_rate).unwrap_or(false) {
                    match event::read() {
                        // Windows terminals also report releases
                        Ok(event::Event::Key(key)) if key.kind == KeyEventKind::Press => {
                            Event::Key(key)
                        }
                        Ok(event::Event::Resize(_, _)) => Event::Resize,
                        _ => continue,
                    }
                } else {
                    Event::Tick
                };

                if tx.send(event).is_err() {
                    break;
                }
            }
        });

        Self {
            rx,
            wizard_rx,
            wizard_tx,
        }
    }

    /// Sender handed to the wizard for its background tasks
    pub fn wizard_sender(&self) -> mpsc::UnboundedSender<WizardMessage> {
        self.wizard_tx.clone()
    }

    pub async fn next(&mut self) -> Option<Event> {
        tokio::select! {
            Some(msg) = self.wizard_rx.recv() => Some(Event::Wizard(msg)),
            event = self.rx.recv() => event,
        }
    }
}
