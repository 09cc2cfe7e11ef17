//! Terminal input events
//!
//! Polls crossterm on a dedicated thread and turns its events into a stream
//! the UI loop can select on next to the dispatch channel.

use std::time::Duration;

use crossterm::event::{self, Event as CrosstermEvent, KeyEvent, KeyEventKind, MouseEvent};
use tokio::sync::mpsc;

/// Events produced by the terminal
#[derive(Debug)]
pub enum AppEvent {
    /// Terminal input event
    Input(InputEvent),
    /// Terminal resize
    Resize { cols: u16, rows: u16 },
    /// Poll timeout with no input
    Tick,
}

/// Input events from terminal
#[derive(Debug, Clone)]
pub enum InputEvent {
    Key(KeyEvent),
    Mouse(MouseEvent),
}

/// Merges terminal input into a single async stream
pub struct EventHandler {
    tx: mpsc::UnboundedSender<AppEvent>,
    rx: mpsc::UnboundedReceiver<AppEvent>,
    tick_rate: Duration,
}

impl EventHandler {
    pub fn new(tick_rate: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self { tx, rx, tick_rate }
    }

    /// Get a sender clone for injecting events
    #[cfg(test)]
    pub fn sender(&self) -> mpsc::UnboundedSender<AppEvent> {
        self.tx.clone()
    }

    /// Start polling for terminal events on a background thread
    ///
    /// The thread exits once the handler is dropped.
    pub fn start_input_polling(&self) {
        let tx = self.tx.clone();
        let tick_rate = self.tick_rate;

        std::thread::spawn(move || loop {
            let event = if event::poll(tick_rate).unwrap_or(false) {
                match event::read() {
                    Ok(CrosstermEvent::Key(key)) if key.kind != KeyEventKind::Release => {
                        AppEvent::Input(InputEvent::Key(key))
                    }
                    Ok(CrosstermEvent::Mouse(mouse)) => AppEvent::Input(InputEvent::Mouse(mouse)),
                    Ok(CrosstermEvent::Resize(cols, rows)) => AppEvent::Resize { cols, rows },
                    Ok(_) => continue,
                    Err(e) => {
                        tracing::error!("Error reading terminal event: {}", e);
                        break;
                    }
                }
            } else {
                AppEvent::Tick
            };

            if tx.send(event).is_err() {
                break;
            }
        });
    }

    /// Receive next event
    pub async fn next(&mut self) -> Option<AppEvent> {
        self.rx.recv().await
    }

    /// Try to receive without blocking
    #[cfg(test)]
    pub fn try_next(&mut self) -> Option<AppEvent> {
        self.rx.try_recv().ok()
    }
}
