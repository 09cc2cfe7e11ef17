//! Bounded message channel between the ingest task and the UI loop
//!
//! One producer, one consumer. The sender is not `Clone`; dropping it (or
//! calling [`DispatchSender::close`]) closes the channel exactly once, and the
//! receiver then reports end of stream with `None` on every call.

use std::time::Duration;

use tokio::sync::mpsc;

use lurkmode_protocol::DomainMessage;
use lurkmode_utils::{LurkError, Result};

/// Default number of messages buffered between ingest and UI
pub const DEFAULT_DISPATCH_CAPACITY: usize = 100;

/// Default time an enqueue may wait on a full channel
pub const DEFAULT_ENQUEUE_TIMEOUT: Duration = Duration::from_secs(10);

/// What to do when the channel stays full for the whole enqueue timeout
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StallPolicy {
    /// Treat the stalled UI as unrecoverable and abort the process
    #[default]
    Abort,
    /// Log and drop the message that could not be queued
    Drop,
}

/// Create a dispatch channel; a capacity of zero is raised to one
pub fn dispatch_channel(capacity: usize) -> (DispatchSender, DispatchReceiver) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (
        DispatchSender {
            tx,
            timeout: DEFAULT_ENQUEUE_TIMEOUT,
            policy: StallPolicy::default(),
        },
        DispatchReceiver { rx },
    )
}

/// Producer half, owned by the ingest session
#[derive(Debug)]
pub struct DispatchSender {
    tx: mpsc::Sender<DomainMessage>,
    timeout: Duration,
    policy: StallPolicy,
}

impl DispatchSender {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_policy(mut self, policy: StallPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn policy(&self) -> StallPolicy {
        self.policy
    }

    /// Enqueue a message, waiting at most the configured timeout for space
    pub async fn send(&self, msg: DomainMessage) -> Result<()> {
        match tokio::time::timeout(self.timeout, self.tx.send(msg)).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(_)) => Err(LurkError::DispatchClosed),
            Err(_) => Err(LurkError::DispatchStalled {
                millis: self.timeout.as_millis() as u64,
            }),
        }
    }

    /// Enqueue a message and apply the stall policy on timeout
    ///
    /// Under [`StallPolicy::Abort`] a stall never returns.
    pub async fn dispatch(&self, msg: DomainMessage) -> Result<()> {
        match self.send(msg).await {
            Err(err @ LurkError::DispatchStalled { .. }) => match self.policy {
                StallPolicy::Abort => {
                    tracing::error!(error = %err, "UI stopped consuming messages, aborting");
                    // Drop impls never run on abort
                    crate::ui::restore_terminal();
                    eprintln!("Error: {}", err);
                    std::process::abort();
                }
                StallPolicy::Drop => {
                    tracing::warn!(error = %err, "Dropping chat message");
                    Ok(())
                }
            },
            other => other,
        }
    }

    /// Close the channel; the receiver sees `None` once drained
    pub fn close(self) {
        tracing::debug!("Closing dispatch channel");
    }
}

/// Consumer half, owned by the UI loop
#[derive(Debug)]
pub struct DispatchReceiver {
    rx: mpsc::Receiver<DomainMessage>,
}

impl DispatchReceiver {
    /// Wait for the next message
    ///
    /// Returns `None` once the sender is gone and the queue is drained, and
    /// keeps returning `None` on every later call.
    pub async fn receive_next(&mut self) -> Option<DomainMessage> {
        self.rx.recv().await
    }

    /// Take an already queued message without waiting
    pub fn try_receive(&mut self) -> Option<DomainMessage> {
        self.rx.try_recv().ok()
    }
}
