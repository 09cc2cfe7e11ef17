//! Turns raw chat events into [`DomainMessage`]s
//!
//! Plain chat always classifies. User notices classify by their `msg-id` tag;
//! unknown kinds (announcements, bits badges, ...) are dropped.

use crate::message::{
    Author, Badges, DomainMessage, MessageHeader, MessageKind, Recipient, SubPlan,
};
use crate::raw::{PrivateMessage, RawEvent, User, UserNoticeMessage};

/// Classify any raw event
pub fn classify(event: RawEvent) -> Option<DomainMessage> {
    match event {
        RawEvent::PrivateMessage(msg) => Some(classify_private_message(msg)),
        RawEvent::UserNotice(msg) => classify_user_notice(msg),
    }
}

/// Classify a `PRIVMSG`
pub fn classify_private_message(msg: PrivateMessage) -> DomainMessage {
    let header = MessageHeader {
        author: author_from(&msg.user),
        timestamp: msg.time,
        channel: msg.channel,
    };
    DomainMessage::new(header, MessageKind::Chat { text: msg.text })
}

/// Classify a `USERNOTICE`, or `None` when its kind is not shown in chat
pub fn classify_user_notice(msg: UserNoticeMessage) -> Option<DomainMessage> {
    let kind = match msg.msg_id.as_str() {
        "sub" => MessageKind::Subscription {
            plan: sub_plan(&msg),
            text: attached_text(&msg),
        },
        "resub" => MessageKind::Resubscription {
            plan: sub_plan(&msg),
            cumulative_months: param_u32(&msg, "msg-param-cumulative-months", 1),
            current_streak: param_u32(&msg, "msg-param-streak-months", 0),
            text: attached_text(&msg),
        },
        "subgift" => MessageKind::GiftSubscription {
            recipient: Recipient {
                id: param_string(&msg, "msg-param-recipient-id"),
                login: param_string(&msg, "msg-param-recipient-user-name"),
                display_name: param_string(&msg, "msg-param-recipient-display-name"),
            },
            plan: sub_plan(&msg),
        },
        "submysterygift" => MessageKind::MassGiftSubscription {
            gift_count: param_u32(&msg, "msg-param-mass-gift-count", 1),
            total_gift_count: param_u32(&msg, "msg-param-sender-count", 0),
            plan: sub_plan(&msg),
        },
        "raid" => MessageKind::Raid {
            viewer_count: param_u32(&msg, "msg-param-viewerCount", 1),
        },
        other => {
            tracing::debug!(
                msg_id = other,
                channel = %msg.channel,
                system_msg = %msg.system_msg,
                "Unknown user notice type, dropping"
            );
            return None;
        }
    };

    let header = MessageHeader {
        author: author_from(&msg.user),
        timestamp: msg.time,
        channel: msg.channel,
    };
    Some(DomainMessage::new(header, kind))
}

fn author_from(user: &User) -> Author {
    Author {
        id: user.id.clone(),
        login: user.login.clone(),
        display_name: user.display_name.clone(),
        color: user.color.clone(),
        badges: Badges {
            broadcaster: user.is_broadcaster,
            moderator: user.is_mod,
            vip: user.is_vip,
            subscriber: user.badges.get("subscriber").copied(),
        },
    }
}

fn sub_plan(msg: &UserNoticeMessage) -> SubPlan {
    SubPlan::parse(msg.param("msg-param-sub-plan").unwrap_or_default())
}

fn attached_text(msg: &UserNoticeMessage) -> Option<String> {
    (!msg.text.is_empty()).then(|| msg.text.clone())
}

fn param_u32(msg: &UserNoticeMessage, key: &str, default: u32) -> u32 {
    msg.param(key)
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}

fn param_string(msg: &UserNoticeMessage, key: &str) -> String {
    msg.param(key).unwrap_or_default().to_string()
}
