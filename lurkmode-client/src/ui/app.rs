//! Main application struct and state management
//!
//! The App owns the consumer side of the dispatch channel and the chat
//! history. It stops once the channel reports end of stream, which happens
//! only after the ingest session has returned.

use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, BorderType, Padding, Paragraph, Wrap};
use ratatui::Frame;
use tokio::task::JoinHandle;

use lurkmode_protocol::DomainMessage;
use lurkmode_utils::{LurkError, Result};

use crate::config::ClientConfig;
use crate::connection::{disconnect_with_retry, SessionControl, SessionState};
use crate::dispatch::DispatchReceiver;
use crate::history::HistoryBuffer;

use super::event::{AppEvent, EventHandler, InputEvent};
use super::render::{render_message, TWITCH_PURPLE};
use super::terminal::Terminal;

const FOOTER_HELP: &str = "↑/↓: Navigate • t: Toggle timestamp • q: Quit";
const EMPTY_CHAT: &str = "*Crickets*";
const SHUTTING_DOWN: &str = "Shutting down...";
const CONNECTING: &str = " (connecting)";

/// Queued messages folded into one redraw
const MAX_BURST: usize = 256;
const MOUSE_SCROLL_LINES: usize = 3;

/// Application state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    /// Showing chat
    Running,
    /// Disconnect accepted, waiting for the stream to end
    Closing,
    /// Disconnect rejected, retrying in the background
    ShuttingDown,
    /// Message stream ended
    Finished,
}

/// Vertical scroll position, kept relative to the bottom of the chat
#[derive(Debug, Default)]
struct ScrollState {
    from_bottom: usize,
    max: usize,
    page: usize,
}

impl ScrollState {
    /// Record the content size and return the top row to show
    fn update(&mut self, total: usize, height: usize) -> u16 {
        self.max = total.saturating_sub(height);
        self.page = height.max(1);
        self.from_bottom = self.from_bottom.min(self.max);
        u16::try_from(self.max - self.from_bottom).unwrap_or(u16::MAX)
    }

    fn up(&mut self, lines: usize) {
        self.from_bottom = self.from_bottom.saturating_add(lines).min(self.max);
    }

    fn down(&mut self, lines: usize) {
        self.from_bottom = self.from_bottom.saturating_sub(lines);
    }

    fn top(&mut self) {
        self.from_bottom = self.max;
    }

    fn bottom(&mut self) {
        self.from_bottom = 0;
    }
}

/// Main application
pub struct App {
    state: AppState,
    /// Channel name as given on the command line
    channel: String,
    events: EventHandler,
    dispatch: DispatchReceiver,
    session: Arc<dyn SessionControl>,
    history: HistoryBuffer<DomainMessage>,
    /// Rendered history, rebuilt when messages arrive or timestamps toggle
    lines: Vec<Line<'static>>,
    render_time: bool,
    scroll: ScrollState,
    disconnect_backoff: Duration,
    shutdown_task: Option<JoinHandle<u32>>,
}

impl App {
    pub fn new(
        channel: impl Into<String>,
        config: &ClientConfig,
        dispatch: DispatchReceiver,
        session: Arc<dyn SessionControl>,
    ) -> Self {
        Self {
            state: AppState::Running,
            channel: channel.into(),
            events: EventHandler::new(Duration::from_millis(100)),
            dispatch,
            session,
            history: HistoryBuffer::new(config.history_size),
            lines: Vec::new(),
            render_time: config.show_timestamps,
            scroll: ScrollState::default(),
            disconnect_backoff: config.disconnect_backoff(),
            shutdown_task: None,
        }
    }

    pub fn state(&self) -> AppState {
        self.state
    }

    pub fn should_quit(&self) -> bool {
        self.state == AppState::Finished
    }

    /// Run the main application loop until the message stream ends
    pub async fn run(&mut self) -> Result<()> {
        let mut terminal = Terminal::new()?;
        self.events.start_input_polling();

        let result = self.event_loop(&mut terminal).await;

        if let Some(task) = self.shutdown_task.take() {
            task.abort();
        }
        result
    }

    async fn event_loop(&mut self, terminal: &mut Terminal) -> Result<()> {
        while !self.should_quit() {
            self.draw(terminal)?;

            tokio::select! {
                event = self.events.next() => match event {
                    Some(event) => self.handle_event(event),
                    None => return Err(LurkError::internal("Terminal event stream closed")),
                },
                message = self.dispatch.receive_next() => self.handle_dispatch(message),
            }
        }
        Ok(())
    }

    fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Input(InputEvent::Key(key)) => self.handle_key(key),
            AppEvent::Input(InputEvent::Mouse(mouse)) => self.handle_mouse(mouse),
            AppEvent::Resize { cols, rows } => {
                tracing::trace!(cols, rows, "Terminal resized");
            }
            AppEvent::Tick => {}
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if self.state != AppState::Running {
            return;
        }

        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.begin_shutdown()
            }
            KeyCode::Char('q') => self.begin_shutdown(),
            KeyCode::Char('t') => {
                self.render_time = !self.render_time;
                self.refresh_lines();
            }
            KeyCode::Up | KeyCode::Char('k') => self.scroll.up(1),
            KeyCode::Down | KeyCode::Char('j') => self.scroll.down(1),
            KeyCode::PageUp => self.scroll.up(self.scroll.page),
            KeyCode::PageDown => self.scroll.down(self.scroll.page),
            KeyCode::Home | KeyCode::Char('g') => self.scroll.top(),
            KeyCode::End | KeyCode::Char('G') => self.scroll.bottom(),
            _ => {}
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        match mouse.kind {
            MouseEventKind::ScrollUp => self.scroll.up(MOUSE_SCROLL_LINES),
            MouseEventKind::ScrollDown => self.scroll.down(MOUSE_SCROLL_LINES),
            _ => {}
        }
    }

    /// Ask ingest to stop; retry in the background if it is not ready yet
    fn begin_shutdown(&mut self) {
        match self.session.disconnect() {
            Ok(()) => {
                tracing::info!("Disconnect requested");
                self.state = AppState::Closing;
            }
            Err(e) => {
                tracing::info!(state = ?self.session.state(), "Disconnect not accepted yet: {}", e);
                self.state = AppState::ShuttingDown;
                let session = Arc::clone(&self.session);
                let backoff = self.disconnect_backoff;
                self.shutdown_task = Some(tokio::spawn(async move {
                    disconnect_with_retry(session.as_ref(), backoff).await
                }));
            }
        }
    }

    fn handle_dispatch(&mut self, message: Option<DomainMessage>) {
        let Some(message) = message else {
            tracing::info!(channel = %self.channel, "Message stream ended");
            self.state = AppState::Finished;
            return;
        };

        self.history.add(message);
        for _ in 0..MAX_BURST {
            match self.dispatch.try_receive() {
                Some(message) => self.history.add(message),
                None => break,
            }
        }

        tracing::trace!(
            retained = self.history.len(),
            capacity = self.history.capacity(),
            "History updated"
        );
        self.refresh_lines();
        self.scroll.bottom();
    }

    fn refresh_lines(&mut self) {
        let render_time = self.render_time;
        self.lines = self
            .history
            .get()
            .iter()
            .flat_map(|msg| render_message(msg, render_time))
            .collect();
    }

    fn draw(&mut self, terminal: &mut Terminal) -> Result<()> {
        terminal.terminal_mut().draw(|frame| self.render(frame))?;
        Ok(())
    }

    fn render(&mut self, frame: &mut Frame) {
        let area = frame.area();

        if self.state == AppState::ShuttingDown {
            frame.render_widget(Paragraph::new(SHUTTING_DOWN), area);
            return;
        }

        let [header, body, footer] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .areas(area);

        self.render_header(frame, header);
        self.render_chat(frame, body);
        self.render_footer(frame, footer);
    }

    fn render_header(&self, frame: &mut Frame, area: Rect) {
        let mut title = format!("LurkMode - #{}", self.channel);
        if self.session.state() == SessionState::Connecting {
            title.push_str(CONNECTING);
        }
        let title = Paragraph::new(title)
            .alignment(Alignment::Center)
            .style(
                Style::default()
                    .fg(Color::White)
                    .bg(TWITCH_PURPLE)
                    .add_modifier(Modifier::BOLD),
            );
        frame.render_widget(title, area);
    }

    fn render_chat(&mut self, frame: &mut Frame, area: Rect) {
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(TWITCH_PURPLE))
            .padding(Padding::horizontal(1));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        if self.history.is_empty() {
            self.scroll.update(0, inner.height as usize);
            let empty = Paragraph::new(EMPTY_CHAT).style(Style::default().fg(Color::DarkGray));
            frame.render_widget(empty, inner);
            return;
        }

        let chat = Paragraph::new(self.lines.clone()).wrap(Wrap { trim: false });
        let total = chat.line_count(inner.width);
        let top = self.scroll.update(total, inner.height as usize);
        frame.render_widget(chat.scroll((top, 0)), inner);
    }

    fn render_footer(&self, frame: &mut Frame, area: Rect) {
        let help = Paragraph::new(FOOTER_HELP)
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(help, area);
    }
}
