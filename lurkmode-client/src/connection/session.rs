//! Chat session abstraction

use std::future::Future;

use lurkmode_utils::Result;

use super::handler::EventHandler;

/// Session state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

/// A connection to a chat server that feeds raw events to a handler
pub trait ChatSession: Send + Sync {
    /// Run the session until it ends
    ///
    /// Returns `Ok(())` only when the session stopped because
    /// [`disconnect`](ChatSession::disconnect) was requested.
    fn connect<H: EventHandler>(&self, handler: &mut H) -> impl Future<Output = Result<()>> + Send;

    /// Ask a running session to stop
    ///
    /// Fails with `NotConnected` unless the session is fully connected.
    fn disconnect(&self) -> Result<()>;

    /// Subscribe to a channel, now or once connected
    fn join(&self, channel: &str);

    fn state(&self) -> SessionState;
}
