//! Raw Twitch chat events extracted from IRC messages
//!
//! Only the two event categories that can become chat history are modeled:
//! `PRIVMSG` (plain chat) and `USERNOTICE` (subs, gifts, raids, ...).

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, TimeZone, Utc};

use crate::irc::IrcMessage;

/// Chat user as described by the message tags
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct User {
    pub id: String,
    pub login: String,
    pub display_name: String,
    /// Hex color such as `#1E90FF`, absent when the user never picked one
    pub color: Option<String>,
    /// Badge name to badge version, e.g. `subscriber -> 3012`
    pub badges: BTreeMap<String, u32>,
    pub is_broadcaster: bool,
    pub is_mod: bool,
    pub is_vip: bool,
}

impl User {
    fn from_irc(msg: &IrcMessage, login: Option<&str>) -> Self {
        let login = login.unwrap_or_default().to_string();
        let badges = parse_badges(msg.tag("badges").unwrap_or_default());
        let display_name = msg
            .tag("display-name")
            .map(str::to_string)
            .unwrap_or_else(|| login.clone());

        Self {
            id: msg.tag("user-id").unwrap_or_default().to_string(),
            display_name,
            color: msg.tag("color").map(str::to_string),
            is_broadcaster: badges.contains_key("broadcaster"),
            is_mod: msg.tag("mod") == Some("1") || badges.contains_key("moderator"),
            is_vip: msg.tags.contains_key("vip") || badges.contains_key("vip"),
            badges,
            login,
        }
    }
}

/// A `PRIVMSG` sent to a channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrivateMessage {
    pub id: String,
    pub user: User,
    pub channel: String,
    pub text: String,
    pub time: DateTime<Utc>,
}

/// A `USERNOTICE` event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserNoticeMessage {
    pub id: String,
    pub user: User,
    pub channel: String,
    /// Text the user attached to the event, empty if none
    pub text: String,
    /// The `msg-id` tag, e.g. `resub`
    pub msg_id: String,
    /// All `msg-param-*` tags keyed by their full name
    pub params: HashMap<String, String>,
    pub system_msg: String,
    pub time: DateTime<Utc>,
}

impl UserNoticeMessage {
    /// Look up a `msg-param-*` value by its full tag name
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }
}

/// An inbound event that may turn into a chat history entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawEvent {
    PrivateMessage(PrivateMessage),
    UserNotice(UserNoticeMessage),
}

impl RawEvent {
    /// Extract a raw event from an IRC message
    ///
    /// Returns `None` for every command other than `PRIVMSG` and `USERNOTICE`.
    pub fn from_irc(msg: &IrcMessage) -> Option<Self> {
        match msg.command.as_str() {
            "PRIVMSG" => Some(Self::PrivateMessage(PrivateMessage {
                id: msg.tag("id").unwrap_or_default().to_string(),
                user: User::from_irc(msg, msg.nick()),
                channel: channel_name(msg),
                text: strip_action(msg.param(1).unwrap_or_default()),
                time: sent_time(msg),
            })),
            "USERNOTICE" => Some(Self::UserNotice(UserNoticeMessage {
                id: msg.tag("id").unwrap_or_default().to_string(),
                user: User::from_irc(msg, msg.tag("login")),
                channel: channel_name(msg),
                text: msg.param(1).unwrap_or_default().to_string(),
                msg_id: msg.tag("msg-id").unwrap_or_default().to_string(),
                params: msg
                    .tags
                    .iter()
                    .filter(|(key, _)| key.starts_with("msg-param-"))
                    .map(|(key, value)| (key.clone(), value.clone()))
                    .collect(),
                system_msg: msg.tag("system-msg").unwrap_or_default().to_string(),
                time: sent_time(msg),
            })),
            _ => None,
        }
    }

    /// Channel the event was sent to, without the leading `#`
    pub fn channel(&self) -> &str {
        match self {
            Self::PrivateMessage(m) => &m.channel,
            Self::UserNotice(m) => &m.channel,
        }
    }
}

fn channel_name(msg: &IrcMessage) -> String {
    msg.param(0)
        .unwrap_or_default()
        .trim_start_matches('#')
        .to_string()
}

fn sent_time(msg: &IrcMessage) -> DateTime<Utc> {
    msg.tag("tmi-sent-ts")
        .and_then(|ts| ts.parse::<i64>().ok())
        .and_then(|millis| Utc.timestamp_millis_opt(millis).single())
        .unwrap_or_else(Utc::now)
}

/// `/me` messages arrive wrapped in a CTCP ACTION envelope
fn strip_action(text: &str) -> String {
    text.strip_prefix("\u{1}ACTION ")
        .and_then(|inner| inner.strip_suffix('\u{1}'))
        .unwrap_or(text)
        .to_string()
}

fn parse_badges(raw: &str) -> BTreeMap<String, u32> {
    raw.split(',')
        .filter_map(|badge| badge.split_once('/'))
        .map(|(name, version)| (name.to_string(), version.parse().unwrap_or(0)))
        .collect()
}
