//! Raw event handler trait and the classifying implementation

use std::future::Future;

use lurkmode_protocol::{classify, RawEvent};
use lurkmode_utils::Result;

use crate::dispatch::DispatchSender;

/// Trait for handling raw events read off a chat session
pub trait EventHandler: Send {
    /// Handle one raw event; an error ends the session
    fn handle(&mut self, event: RawEvent) -> impl Future<Output = Result<()>> + Send;

    /// Called when the session has registered with the server
    fn on_connected(&mut self) {}

    /// Called when the session loop exits, for any reason
    fn on_disconnected(&mut self) {}
}

/// Classifies raw events and forwards the result to the dispatch channel
#[derive(Debug)]
pub struct ClassifyingHandler {
    dispatch: DispatchSender,
    forwarded: u64,
    ignored: u64,
}

impl ClassifyingHandler {
    pub fn new(dispatch: DispatchSender) -> Self {
        Self {
            dispatch,
            forwarded: 0,
            ignored: 0,
        }
    }

    pub fn forwarded(&self) -> u64 {
        self.forwarded
    }

    pub fn ignored(&self) -> u64 {
        self.ignored
    }

    /// Give up the sender so the caller can close the channel
    pub fn into_dispatch(self) -> DispatchSender {
        self.dispatch
    }
}

impl EventHandler for ClassifyingHandler {
    async fn handle(&mut self, event: RawEvent) -> Result<()> {
        let channel = event.channel().to_string();
        let Some(message) = classify(event) else {
            self.ignored += 1;
            return Ok(());
        };

        tracing::trace!(channel = %channel, author = %message.author().login, "Dispatching message");
        self.dispatch.dispatch(message).await?;
        self.forwarded += 1;
        Ok(())
    }

    fn on_connected(&mut self) {
        tracing::info!("Chat session connected");
    }

    fn on_disconnected(&mut self) {
        tracing::info!("Chat session ended");
    }
}
