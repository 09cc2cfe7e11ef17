//! lurkmode-protocol: Twitch chat wire format and message types
//!
//! This crate defines the IRC line format spoken by the Twitch chat server,
//! the raw events extracted from it, and the typed chat messages the client
//! keeps in its history.

pub mod classify;
pub mod codec;
pub mod irc;
pub mod message;
pub mod raw;

// Re-export main types at crate root
pub use classify::{classify, classify_private_message, classify_user_notice};
pub use codec::{CodecError, IrcCodec};
pub use irc::{IrcMessage, ParseError};
pub use message::{
    Author, Badges, DomainMessage, MessageHeader, MessageKind, Recipient, SubPlan,
};
pub use raw::{PrivateMessage, RawEvent, User, UserNoticeMessage};
