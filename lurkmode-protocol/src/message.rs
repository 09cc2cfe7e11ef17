//! Typed chat messages kept in the client history

use chrono::{DateTime, Utc};

/// Subscription plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubPlan {
    Prime,
    Tier1,
    Tier2,
    Tier3,
}

impl SubPlan {
    /// Parse the `msg-param-sub-plan` value; unknown values default to Tier 1
    pub fn parse(plan: &str) -> Self {
        match plan {
            "Prime" => Self::Prime,
            "1000" => Self::Tier1,
            "2000" => Self::Tier2,
            "3000" => Self::Tier3,
            _ => Self::Tier1,
        }
    }

    /// Tier number as shown to users (Prime is 0)
    pub fn tier(self) -> u8 {
        match self {
            Self::Prime => 0,
            Self::Tier1 => 1,
            Self::Tier2 => 2,
            Self::Tier3 => 3,
        }
    }
}

/// Role badges shown in front of a name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Badges {
    pub broadcaster: bool,
    pub moderator: bool,
    pub vip: bool,
    /// Subscriber badge version (tier prefix plus months), if subscribed
    pub subscriber: Option<u32>,
}

/// Author of a message
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Author {
    pub id: String,
    pub login: String,
    pub display_name: String,
    pub color: Option<String>,
    pub badges: Badges,
}

/// Receiver of a gifted subscription
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Recipient {
    pub id: String,
    pub login: String,
    pub display_name: String,
}

/// Fields common to every message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageHeader {
    pub author: Author,
    pub timestamp: DateTime<Utc>,
    pub channel: String,
}

/// Message body
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageKind {
    /// Plain chat line
    Chat { text: String },
    Subscription {
        plan: SubPlan,
        text: Option<String>,
    },
    Resubscription {
        plan: SubPlan,
        cumulative_months: u32,
        current_streak: u32,
        text: Option<String>,
    },
    GiftSubscription {
        recipient: Recipient,
        plan: SubPlan,
    },
    MassGiftSubscription {
        gift_count: u32,
        total_gift_count: u32,
        plan: SubPlan,
    },
    Raid { viewer_count: u32 },
}

impl MessageKind {
    /// Everything except plain chat is a channel notice
    pub fn is_notice(&self) -> bool {
        !matches!(self, Self::Chat { .. })
    }

    /// Text typed by the user, if the event carries any
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Chat { text } => Some(text),
            Self::Subscription { text, .. } | Self::Resubscription { text, .. } => {
                text.as_deref()
            }
            _ => None,
        }
    }
}

/// One entry in the chat history
///
/// Immutable once built; fields are only reachable through accessors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainMessage {
    header: MessageHeader,
    kind: MessageKind,
}

impl DomainMessage {
    pub fn new(header: MessageHeader, kind: MessageKind) -> Self {
        Self { header, kind }
    }

    pub fn header(&self) -> &MessageHeader {
        &self.header
    }

    pub fn kind(&self) -> &MessageKind {
        &self.kind
    }

    pub fn author(&self) -> &Author {
        &self.header.author
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.header.timestamp
    }

    pub fn channel(&self) -> &str {
        &self.header.channel
    }

    pub fn is_notice(&self) -> bool {
        self.kind.is_notice()
    }
}
