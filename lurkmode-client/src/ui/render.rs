//! Styled text for chat messages

use chrono::{DateTime, Local, TimeZone};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use lurkmode_protocol::{Author, DomainMessage, MessageKind, SubPlan};

pub const TWITCH_PURPLE: Color = Color::Rgb(0x64, 0x41, 0xa5);
const NOTICE_BACKGROUND: Color = Color::Rgb(0x1f, 0x1f, 0x23);
const TIMESTAMP_COLOR: Color = Color::Indexed(247);
const BROADCASTER_COLOR: Color = Color::Rgb(0xe8, 0x18, 0x15);
const VIP_COLOR: Color = Color::Rgb(0xe0, 0x05, 0xb9);
const MODERATOR_COLOR: Color = Color::Rgb(0x00, 0xad, 0x03);

/// Render one history entry into one or more lines
///
/// Subscription events with attached text get a second line rendered like a
/// chat message from the same author.
pub fn render_message(msg: &DomainMessage, render_time: bool) -> Vec<Line<'static>> {
    let base = if msg.is_notice() {
        Style::default().bg(NOTICE_BACKGROUND)
    } else {
        Style::default()
    };

    let mut spans = prefix(msg, render_time);
    let mut attached = None;

    match msg.kind() {
        MessageKind::Chat { text } => {
            spans.push(Span::raw(format!(": {}", text)));
        }
        MessageKind::Subscription { plan, text } => {
            spans.push(Span::raw(format!(" subscribed{}", plan_suffix(*plan, ""))));
            attached = text.as_deref();
        }
        MessageKind::Resubscription {
            plan,
            cumulative_months,
            current_streak,
            text,
        } => {
            let mut body = format!(
                " resubscribed{} They have been subscribed for {} months!",
                plan_suffix(*plan, "!"),
                cumulative_months
            );
            if *current_streak > 0 {
                body.push_str(&format!(" Their current streak is {} months!", current_streak));
            }
            spans.push(Span::raw(body));
            attached = text.as_deref();
        }
        MessageKind::GiftSubscription { recipient, plan } => {
            spans.push(Span::raw(format!(
                " gifted a Tier {} subscription to {}!",
                plan.tier(),
                recipient.display_name
            )));
        }
        MessageKind::MassGiftSubscription {
            gift_count,
            total_gift_count,
            plan,
        } => {
            let mut body = format!(" gifted {} Tier {} subscriptions!", gift_count, plan.tier());
            if *total_gift_count > 0 {
                body.push_str(&format!(" Total gifted subscriptions: {}", total_gift_count));
            }
            spans.push(Span::raw(body));
        }
        MessageKind::Raid { viewer_count } => {
            spans.push(Span::raw(format!(" raided with {} viewers!", viewer_count)));
        }
    }

    let mut lines = vec![Line::from(spans).style(base)];
    if let Some(text) = attached {
        let mut spans = prefix(msg, render_time);
        spans.push(Span::raw(format!(": {}", text)));
        lines.push(Line::from(spans).style(base));
    }
    lines
}

/// `[3:04PM] ` in the given time zone
pub fn format_time<Tz>(time: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    format!("[{}] ", time.format("%-I:%M%p"))
}

fn plan_suffix(plan: SubPlan, end: &str) -> String {
    match plan {
        SubPlan::Prime => format!(" with Prime{}", end),
        other => format!(" at Tier {}{}", other.tier(), end),
    }
}

/// Optional timestamp, badges and the colored display name
fn prefix(msg: &DomainMessage, render_time: bool) -> Vec<Span<'static>> {
    let mut spans = Vec::new();

    if render_time {
        let local = msg.timestamp().with_timezone(&Local);
        spans.push(Span::styled(
            format_time(&local),
            Style::default().fg(TIMESTAMP_COLOR),
        ));
    }

    let author = msg.author();
    spans.extend(badges(author));
    spans.push(Span::styled(
        author.display_name.clone(),
        name_style(author),
    ));
    spans
}

fn badges(author: &Author) -> Vec<Span<'static>> {
    let mut spans = Vec::new();
    let mut badge = |icon: &'static str, color: Color| {
        spans.push(Span::styled(icon, Style::default().fg(color)));
        spans.push(Span::raw(" "));
    };

    if author.badges.broadcaster {
        badge("[👑]", BROADCASTER_COLOR);
    }
    if author.badges.vip {
        badge("[💎]", VIP_COLOR);
    }
    if author.badges.moderator {
        badge("[⚔️]", MODERATOR_COLOR);
    }
    if let Some(version) = author.badges.subscriber {
        badge(subscriber_badge(version), TWITCH_PURPLE);
    }
    spans
}

/// Tier 3 badges are numbered from 3000, tier 2 from 2000
fn subscriber_badge(version: u32) -> &'static str {
    if version > 3000 {
        "[🥇]"
    } else if version > 2000 {
        "[🥈]"
    } else {
        "[🥉]"
    }
}

fn name_style(author: &Author) -> Style {
    match author.color.as_deref().and_then(|c| c.parse::<Color>().ok()) {
        Some(color) => Style::default().fg(color),
        None => Style::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use lurkmode_protocol::{Badges, MessageHeader, Recipient};

    fn message(kind: MessageKind) -> DomainMessage {
        message_from(Author::default(), kind)
    }

    fn message_from(mut author: Author, kind: MessageKind) -> DomainMessage {
        author.login = "viewer".into();
        author.display_name = "Viewer".into();
        DomainMessage::new(
            MessageHeader {
                author,
                timestamp: Utc::now(),
                channel: "lurk".into(),
            },
            kind,
        )
    }

    fn plain(lines: &[Line<'_>]) -> Vec<String> {
        lines
            .iter()
            .map(|line| line.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    #[test]
    fn test_chat_line() {
        let lines = render_message(&message(MessageKind::Chat { text: "hello".into() }), false);
        assert_eq!(plain(&lines), vec!["Viewer: hello"]);
        assert_eq!(lines[0].style.bg, None);
    }

    #[test]
    fn test_notice_background() {
        let lines = render_message(&message(MessageKind::Raid { viewer_count: 42 }), false);
        assert_eq!(plain(&lines), vec!["Viewer raided with 42 viewers!"]);
        assert_eq!(lines[0].style.bg, Some(NOTICE_BACKGROUND));
    }

    #[test]
    fn test_sub_texts() {
        let prime = render_message(
            &message(MessageKind::Subscription {
                plan: SubPlan::Prime,
                text: None,
            }),
            false,
        );
        assert_eq!(plain(&prime), vec!["Viewer subscribed with Prime"]);

        let tier = render_message(
            &message(MessageKind::Subscription {
                plan: SubPlan::Tier2,
                text: Some("hype".into()),
            }),
            false,
        );
        assert_eq!(
            plain(&tier),
            vec!["Viewer subscribed at Tier 2", "Viewer: hype"]
        );
        assert_eq!(tier[1].style.bg, Some(NOTICE_BACKGROUND));
    }

    #[test]
    fn test_resub_texts() {
        let with_streak = render_message(
            &message(MessageKind::Resubscription {
                plan: SubPlan::Tier1,
                cumulative_months: 14,
                current_streak: 3,
                text: None,
            }),
            false,
        );
        assert_eq!(
            plain(&with_streak),
            vec![
                "Viewer resubscribed at Tier 1! They have been subscribed for 14 months! \
                 Their current streak is 3 months!"
            ]
        );

        let prime = render_message(
            &message(MessageKind::Resubscription {
                plan: SubPlan::Prime,
                cumulative_months: 2,
                current_streak: 0,
                text: Some("still here".into()),
            }),
            false,
        );
        assert_eq!(
            plain(&prime),
            vec![
                "Viewer resubscribed with Prime! They have been subscribed for 2 months!",
                "Viewer: still here",
            ]
        );
    }

    #[test]
    fn test_gift_texts() {
        let single = render_message(
            &message(MessageKind::GiftSubscription {
                recipient: Recipient {
                    display_name: "Lucky".into(),
                    ..Recipient::default()
                },
                plan: SubPlan::Tier3,
            }),
            false,
        );
        assert_eq!(
            plain(&single),
            vec!["Viewer gifted a Tier 3 subscription to Lucky!"]
        );

        let mass = render_message(
            &message(MessageKind::MassGiftSubscription {
                gift_count: 5,
                total_gift_count: 50,
                plan: SubPlan::Tier1,
            }),
            false,
        );
        assert_eq!(
            plain(&mass),
            vec!["Viewer gifted 5 Tier 1 subscriptions! Total gifted subscriptions: 50"]
        );

        let first_time = render_message(
            &message(MessageKind::MassGiftSubscription {
                gift_count: 1,
                total_gift_count: 0,
                plan: SubPlan::Tier1,
            }),
            false,
        );
        assert_eq!(plain(&first_time), vec!["Viewer gifted 1 Tier 1 subscriptions!"]);
    }

    #[test]
    fn test_badges_in_order() {
        let author = Author {
            color: Some("#FF0000".into()),
            badges: Badges {
                broadcaster: true,
                moderator: true,
                vip: true,
                subscriber: Some(3012),
            },
            ..Author::default()
        };
        let lines = render_message(
            &message_from(author, MessageKind::Chat { text: "hi".into() }),
            false,
        );
        assert_eq!(plain(&lines), vec!["[👑] [💎] [⚔️] [🥇] Viewer: hi"]);

        let name = lines[0]
            .spans
            .iter()
            .find(|s| s.content == "Viewer")
            .unwrap();
        assert_eq!(name.style.fg, Some(Color::Rgb(0xff, 0x00, 0x00)));
    }

    #[test]
    fn test_subscriber_badge_tiers() {
        assert_eq!(subscriber_badge(3006), "[🥇]");
        assert_eq!(subscriber_badge(3000), "[🥈]");
        assert_eq!(subscriber_badge(2012), "[🥈]");
        assert_eq!(subscriber_badge(2000), "[🥉]");
        assert_eq!(subscriber_badge(12), "[🥉]");
    }

    #[test]
    fn test_invalid_color_ignored() {
        let author = Author {
            color: Some("not-a-color".into()),
            ..Author::default()
        };
        assert_eq!(name_style(&author).fg, None);
    }

    #[test]
    fn test_name_only_takes_user_color() {
        let author = Author {
            color: Some("#FF4500".into()),
            ..Author::default()
        };
        assert_eq!(name_style(&author), Style::default().fg(Color::Rgb(0xFF, 0x45, 0x00)));
    }

    #[test]
    fn test_format_time() {
        let time = Utc.with_ymd_and_hms(2024, 5, 1, 15, 4, 0).unwrap();
        assert_eq!(format_time(&time), "[3:04PM] ");
        let morning = Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap();
        assert_eq!(format_time(&morning), "[9:30AM] ");
    }

    #[test]
    fn test_timestamp_prefix() {
        let lines = render_message(&message(MessageKind::Chat { text: "x".into() }), true);
        let first = &lines[0].spans[0];
        assert!(first.content.starts_with('['));
        assert!(first.content.ends_with("M] "));
        assert_eq!(first.style.fg, Some(TIMESTAMP_COLOR));
    }
}
