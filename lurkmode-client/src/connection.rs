//! Chat connection management
//!
//! An [`IrcSession`] talks to the Twitch chat server and hands raw events to
//! an [`EventHandler`]. [`IngestConnection`] wires a session to the dispatch
//! channel the UI reads from.

mod handler;
mod ingest;
mod irc;
mod session;
mod shutdown;

pub use ingest::{IngestConnection, SessionControl};
pub use irc::{IrcSession, DEFAULT_CONNECT_TIMEOUT, DEFAULT_SERVER};
pub use session::SessionState;
pub use shutdown::{disconnect_with_retry, DEFAULT_DISCONNECT_BACKOFF};

// These are part of the public API for custom sessions
#[allow(unused_imports)]
pub use handler::{ClassifyingHandler, EventHandler};
#[allow(unused_imports)]
pub use irc::normalize_channel;
#[allow(unused_imports)]
pub use session::ChatSession;
