//! Anonymous read-only session against the Twitch IRC server

use std::time::Duration;

use futures::{SinkExt, StreamExt};
use parking_lot::Mutex;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_util::codec::Framed;
use tokio_util::sync::CancellationToken;

use lurkmode_protocol::{IrcCodec, IrcMessage, RawEvent};
use lurkmode_utils::{LurkError, Result};

use super::handler::EventHandler;
use super::session::{ChatSession, SessionState};

/// Plain-text Twitch chat endpoint
pub const DEFAULT_SERVER: &str = "irc.chat.twitch.tv:6667";

/// Default limit for establishing the TCP connection
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Twitch accepts any `justinfan` nick with any password for read-only use
const ANONYMOUS_NICK: &str = "justinfan123123";
const ANONYMOUS_PASS: &str = "oauth:59301";

const CAPABILITIES: &str = "twitch.tv/tags twitch.tv/commands";

type IrcFramed = Framed<TcpStream, IrcCodec>;

/// Normalize a channel name: no leading `#`, lowercase
pub fn normalize_channel(name: &str) -> String {
    name.trim().trim_start_matches('#').to_lowercase()
}

/// Single-use IRC session
///
/// Channels joined before [`connect`](ChatSession::connect) are queued and
/// sent right after registration.
pub struct IrcSession {
    addr: String,
    connect_timeout: Duration,
    state: Mutex<SessionState>,
    channels: Mutex<Vec<String>>,
    outgoing_tx: mpsc::UnboundedSender<IrcMessage>,
    outgoing_rx: Mutex<Option<mpsc::UnboundedReceiver<IrcMessage>>>,
    shutdown: CancellationToken,
}

impl IrcSession {
    pub fn new(addr: impl Into<String>) -> Self {
        let (outgoing_tx, outgoing_rx) = mpsc::unbounded_channel();
        Self {
            addr: addr.into(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            state: Mutex::new(SessionState::Disconnected),
            channels: Mutex::new(Vec::new()),
            outgoing_tx,
            outgoing_rx: Mutex::new(Some(outgoing_rx)),
            shutdown: CancellationToken::new(),
        }
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Channels joined so far, normalized
    #[cfg(test)]
    pub fn channels(&self) -> Vec<String> {
        self.channels.lock().clone()
    }

    fn set_state(&self, state: SessionState) {
        let mut current = self.state.lock();
        if *current != state {
            tracing::debug!(from = ?*current, to = ?state, "Session state change");
            *current = state;
        }
    }

    async fn open(&self) -> Result<IrcFramed> {
        let stream = match tokio::time::timeout(self.connect_timeout, TcpStream::connect(&self.addr)).await {
            Ok(Ok(stream)) => stream,
            Ok(Err(e)) => {
                return Err(LurkError::connection(format!(
                    "Failed to connect to {}: {}",
                    self.addr, e
                )))
            }
            Err(_) => {
                return Err(LurkError::ConnectionTimeout {
                    millis: self.connect_timeout.as_millis() as u64,
                })
            }
        };

        let mut framed = Framed::new(stream, IrcCodec::new());
        for msg in registration() {
            framed.send(msg).await.map_err(|e| LurkError::protocol(e.to_string()))?;
        }
        Ok(framed)
    }

    async fn run<H: EventHandler>(
        &self,
        handler: &mut H,
        outgoing: &mut mpsc::UnboundedReceiver<IrcMessage>,
    ) -> Result<()> {
        let mut framed = self.open().await?;
        tracing::info!(addr = %self.addr, "Connected to chat server");
        self.set_state(SessionState::Connected);
        handler.on_connected();

        let result = loop {
            tokio::select! {
                biased;

                _ = self.shutdown.cancelled() => {
                    if let Err(e) = framed.send(IrcMessage::new("QUIT", Vec::new())).await {
                        tracing::debug!("Failed to send QUIT: {}", e);
                    }
                    break Ok(());
                }

                Some(msg) = outgoing.recv() => {
                    tracing::debug!(command = %msg.command, "Sending to chat server");
                    if let Err(e) = framed.send(msg).await {
                        break Err(LurkError::protocol(e.to_string()));
                    }
                }

                frame = framed.next() => {
                    match frame {
                        Some(Ok(msg)) => {
                            if let Err(e) = handle_message(&mut framed, handler, msg).await {
                                break Err(e);
                            }
                        }
                        Some(Err(e)) => break Err(LurkError::protocol(e.to_string())),
                        None => break Err(LurkError::ConnectionClosed),
                    }
                }
            }
        };

        handler.on_disconnected();
        result
    }
}

impl ChatSession for IrcSession {
    async fn connect<H: EventHandler>(&self, handler: &mut H) -> Result<()> {
        let taken = self.outgoing_rx.lock().take();
        let Some(mut outgoing) = taken else {
            return Err(LurkError::AlreadyConnected);
        };

        self.set_state(SessionState::Connecting);
        let result = self.run(handler, &mut outgoing).await;
        self.set_state(SessionState::Disconnected);

        if let Err(e) = &result {
            tracing::warn!(addr = %self.addr, "Chat session ended with error: {}", e);
        }
        result
    }

    fn disconnect(&self) -> Result<()> {
        if *self.state.lock() != SessionState::Connected {
            return Err(LurkError::NotConnected);
        }
        self.shutdown.cancel();
        Ok(())
    }

    fn join(&self, channel: &str) {
        let channel = normalize_channel(channel);
        if channel.is_empty() {
            tracing::warn!("Ignoring empty channel name");
            return;
        }

        {
            let mut channels = self.channels.lock();
            if channels.contains(&channel) {
                return;
            }
            channels.push(channel.clone());
        }

        let join = IrcMessage::new("JOIN", vec![format!("#{}", channel)]);
        if self.outgoing_tx.send(join).is_err() {
            tracing::warn!(channel = %channel, "Session already finished, not joining");
        }
    }

    fn state(&self) -> SessionState {
        *self.state.lock()
    }
}

fn registration() -> [IrcMessage; 3] {
    [
        IrcMessage::new("CAP", vec!["REQ".into(), CAPABILITIES.into()]),
        IrcMessage::new("PASS", vec![ANONYMOUS_PASS.into()]),
        IrcMessage::new("NICK", vec![ANONYMOUS_NICK.into()]),
    ]
}

async fn handle_message<H: EventHandler>(
    framed: &mut IrcFramed,
    handler: &mut H,
    msg: IrcMessage,
) -> Result<()> {
    match msg.command.as_str() {
        "PING" => {
            let pong = IrcMessage::new("PONG", msg.params);
            framed.send(pong).await.map_err(|e| LurkError::protocol(e.to_string()))
        }
        "RECONNECT" => Err(LurkError::connection("Server requested a reconnect")),
        "NOTICE" => {
            let text = msg.param(1).unwrap_or_default();
            if text.contains("authentication failed") || text.contains("Improperly formatted auth") {
                return Err(LurkError::connection(format!("Login rejected: {}", text)));
            }
            tracing::info!(notice = %text, "Server notice");
            Ok(())
        }
        _ => match RawEvent::from_irc(&msg) {
            Some(event) => handler.handle(event).await,
            None => {
                tracing::trace!(command = %msg.command, "Ignoring message");
                Ok(())
            }
        },
    }
}
