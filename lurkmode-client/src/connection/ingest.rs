//! Ingest connection: session plus dispatch channel
//!
//! Owns the producer side of the dispatch channel. The channel is closed when
//! [`IngestConnection::connect`] returns, on every path, which is what lets
//! the UI loop know that no more messages will arrive.

use parking_lot::Mutex;

use lurkmode_utils::{LurkError, Result};

use super::handler::ClassifyingHandler;
use super::session::{ChatSession, SessionState};
use crate::dispatch::DispatchSender;

/// Control surface the UI needs while ingest runs on its own task
pub trait SessionControl: Send + Sync {
    /// Request a clean stop; may fail while the session is not yet connected
    fn disconnect(&self) -> Result<()>;

    fn add_channel(&self, channel: &str);

    fn state(&self) -> SessionState;
}

/// Feeds classified chat messages from a session into the dispatch channel
pub struct IngestConnection<S> {
    session: S,
    dispatch: Mutex<Option<DispatchSender>>,
}

impl<S: ChatSession> IngestConnection<S> {
    pub fn new(session: S, dispatch: DispatchSender) -> Self {
        Self {
            session,
            dispatch: Mutex::new(Some(dispatch)),
        }
    }

    /// Run the session until it ends
    ///
    /// Returns `Ok(())` after a requested disconnect and the session error
    /// otherwise. Can only be called once; later calls fail with
    /// `AlreadyConnected`.
    pub async fn connect(&self) -> Result<()> {
        let taken = self.dispatch.lock().take();
        let Some(dispatch) = taken else {
            return Err(LurkError::AlreadyConnected);
        };

        let mut handler = ClassifyingHandler::new(dispatch);
        let result = self.session.connect(&mut handler).await;
        let (forwarded, ignored) = (handler.forwarded(), handler.ignored());
        handler.into_dispatch().close();

        match &result {
            Ok(()) => tracing::info!(forwarded, ignored, "Ingest stopped after disconnect request"),
            Err(e) => tracing::error!(forwarded, ignored, "Ingest stopped: {}", e),
        }
        result
    }

    pub fn disconnect(&self) -> Result<()> {
        self.session.disconnect()
    }

    /// Subscribe to another channel
    pub fn add_channel(&self, channel: &str) {
        tracing::debug!(channel, "Adding channel");
        self.session.join(channel);
    }

    pub fn state(&self) -> SessionState {
        self.session.state()
    }
}

impl<S: ChatSession> SessionControl for IngestConnection<S> {
    fn disconnect(&self) -> Result<()> {
        IngestConnection::disconnect(self)
    }

    fn add_channel(&self, channel: &str) {
        IngestConnection::add_channel(self, channel)
    }

    fn state(&self) -> SessionState {
        IngestConnection::state(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::handler::EventHandler;
    use crate::connection::shutdown::disconnect_with_retry;
    use crate::dispatch::dispatch_channel;
    use crate::history::HistoryBuffer;
    use lurkmode_protocol::{DomainMessage, IrcMessage, RawEvent};
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio_util::sync::CancellationToken;

    /// Replays canned events, then waits for a disconnect request
    #[derive(Default)]
    struct ScriptedSession {
        events: Mutex<Vec<RawEvent>>,
        channels: Mutex<Vec<String>>,
        failing_disconnects: AtomicU32,
        fail_after_events: bool,
        state: Mutex<SessionState>,
        stop: CancellationToken,
    }

    impl ScriptedSession {
        fn with_chat(lines: &[&str]) -> Self {
            let events = lines
                .iter()
                .map(|line| RawEvent::from_irc(&IrcMessage::parse(line).unwrap()).unwrap())
                .collect();
            Self {
                events: Mutex::new(events),
                ..Self::default()
            }
        }
    }

    impl ChatSession for ScriptedSession {
        async fn connect<H: EventHandler>(&self, handler: &mut H) -> Result<()> {
            *self.state.lock() = SessionState::Connected;
            handler.on_connected();

            let events = std::mem::take(&mut *self.events.lock());
            for event in events {
                handler.handle(event).await?;
            }

            if self.fail_after_events {
                *self.state.lock() = SessionState::Disconnected;
                return Err(LurkError::ConnectionClosed);
            }

            self.stop.cancelled().await;
            *self.state.lock() = SessionState::Disconnected;
            handler.on_disconnected();
            Ok(())
        }

        fn disconnect(&self) -> Result<()> {
            let remaining = self.failing_disconnects.load(Ordering::SeqCst);
            if remaining > 0 {
                self.failing_disconnects.store(remaining - 1, Ordering::SeqCst);
                return Err(LurkError::NotConnected);
            }
            self.stop.cancel();
            Ok(())
        }

        fn join(&self, channel: &str) {
            self.channels.lock().push(channel.to_string());
        }

        fn state(&self) -> SessionState {
            *self.state.lock()
        }
    }

    fn chat_line(name: &str) -> String {
        format!(":{name}!{name}@{name}.tmi.twitch.tv PRIVMSG #lurk :hi from {name}")
    }

    #[tokio::test]
    async fn test_messages_flow_into_bounded_history() {
        let lines: Vec<String> = ["alice", "bob", "carol"].iter().map(|n| chat_line(n)).collect();
        let refs: Vec<&str> = lines.iter().map(String::as_str).collect();

        let (tx, mut rx) = dispatch_channel(100);
        let ingest = Arc::new(IngestConnection::new(ScriptedSession::with_chat(&refs), tx));
        ingest.add_channel("lurk");

        let task = {
            let ingest = Arc::clone(&ingest);
            tokio::spawn(async move { ingest.connect().await })
        };

        let history: HistoryBuffer<DomainMessage> = HistoryBuffer::new(2);
        let mut received = 0;
        while let Some(msg) = rx.receive_next().await {
            history.add(msg);
            received += 1;
            if received == 3 {
                disconnect_with_retry(ingest.as_ref(), Duration::from_millis(10)).await;
            }
        }

        task.await.unwrap().unwrap();
        let names: Vec<String> = history
            .get()
            .iter()
            .map(|m| m.author().login.clone())
            .collect();
        assert_eq!(names, vec!["bob", "carol"]);
        assert_eq!(ingest.session.channels.lock().clone(), vec!["lurk"]);
    }

    #[tokio::test]
    async fn test_disconnect_retries_until_accepted() {
        let session = ScriptedSession {
            failing_disconnects: AtomicU32::new(2),
            ..ScriptedSession::default()
        };
        let (tx, mut rx) = dispatch_channel(4);
        let ingest = Arc::new(IngestConnection::new(session, tx));

        let task = {
            let ingest = Arc::clone(&ingest);
            tokio::spawn(async move { ingest.connect().await })
        };

        let attempts = tokio::time::timeout(
            Duration::from_secs(2),
            disconnect_with_retry(ingest.as_ref(), Duration::from_millis(10)),
        )
        .await
        .unwrap();
        assert_eq!(attempts, 3);

        let end = tokio::time::timeout(Duration::from_secs(2), rx.receive_next())
            .await
            .unwrap();
        assert!(end.is_none());
        task.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_session_error_closes_channel_and_is_returned() {
        let line = chat_line("alice");
        let session = ScriptedSession {
            fail_after_events: true,
            ..ScriptedSession::with_chat(&[line.as_str()])
        };
        let (tx, mut rx) = dispatch_channel(4);
        let ingest = IngestConnection::new(session, tx);

        let result = ingest.connect().await;
        assert!(matches!(result, Err(LurkError::ConnectionClosed)));

        assert_eq!(rx.receive_next().await.unwrap().author().login, "alice");
        assert!(rx.receive_next().await.is_none());
        assert!(rx.receive_next().await.is_none());
    }

    #[tokio::test]
    async fn test_second_connect_is_rejected() {
        let session = ScriptedSession {
            fail_after_events: true,
            ..ScriptedSession::default()
        };
        let (tx, _rx) = dispatch_channel(4);
        let ingest = IngestConnection::new(session, tx);

        assert!(ingest.connect().await.is_err());
        assert!(matches!(
            ingest.connect().await,
            Err(LurkError::AlreadyConnected)
        ));
    }

    #[test]
    fn test_control_through_trait_object() {
        let (tx, _rx) = dispatch_channel(4);
        let ingest: Arc<dyn SessionControl> =
            Arc::new(IngestConnection::new(ScriptedSession::default(), tx));

        ingest.add_channel("lurk");
        assert_eq!(ingest.state(), SessionState::Disconnected);
        assert!(ingest.disconnect().is_ok());
    }
}
