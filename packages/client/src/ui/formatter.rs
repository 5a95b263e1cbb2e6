//! Message formatting utilities for client display.

use crate::{
    channel::ChannelEvent,
    domain::{ChatMessage, Frame, Inbound, Presence, TypingNotice},
};

/// Message formatter for client display
pub struct MessageFormatter;

impl MessageFormatter {
    /// Format a channel event for display.
    ///
    /// # Arguments
    ///
    /// * `event` - The event published by the channel
    /// * `self_id` - The local participant (to mark as "me" in presence lists)
    pub fn format_event(event: &ChannelEvent, self_id: &str) -> String {
        match event {
            ChannelEvent::Opened { self_id: me } => format!("\n* connected as '{}'\n", me),
            ChannelEvent::Received(Inbound::Frame(Frame::Chat(message))) => {
                Self::format_chat_message(message)
            }
            ChannelEvent::Received(Inbound::Frame(Frame::Typing(notice))) => {
                Self::format_typing(notice)
            }
            ChannelEvent::Received(Inbound::Frame(Frame::Handshake { from })) => {
                format!("\n+ {} is here\n", from)
            }
            ChannelEvent::Received(Inbound::Presence(list)) => {
                Self::format_presence(list, self_id)
            }
            ChannelEvent::MalformedFrame { raw, .. } => Self::format_raw_message(raw),
            ChannelEvent::DeliveryFailed(frame) => Self::format_delivery_failed(frame),
            ChannelEvent::ConnectFailed { reason } => {
                format!("\n! connection failed: {}\n", reason)
            }
            ChannelEvent::Reconnecting { attempt } => {
                format!("\n* reconnecting (attempt {})\n", attempt)
            }
            ChannelEvent::Closed => "\n* disconnected\n".to_string(),
        }
    }

    /// Format an inbound chat message
    pub fn format_chat_message(message: &ChatMessage) -> String {
        let sent_at = if message.timestamp.is_empty() {
            String::new()
        } else {
            format!("\nsent at {}", message.timestamp)
        };
        format!(
            "\n\n------------------------------------------------------------\n\
             @{}: {}{}\n\
             ------------------------------------------------------------\n",
            message.from, message.content, sent_at
        )
    }

    /// Format a typing indicator
    pub fn format_typing(notice: &TypingNotice) -> String {
        if notice.is_typing {
            format!("\n… {} is typing\n", notice.from)
        } else {
            format!("\n… {} stopped typing\n", notice.from)
        }
    }

    /// Format the presence list, marking the local participant
    pub fn format_presence(list: &[Presence], self_id: &str) -> String {
        let mut output = String::new();
        output.push_str("\n\n============================================================\n");
        output.push_str("Contacts:\n");

        if list.is_empty() {
            output.push_str("(No contacts)\n");
        } else {
            for presence in list {
                let me_suffix = if presence.id.as_str() == self_id {
                    " (me)"
                } else {
                    ""
                };
                let name = if presence.display_name.is_empty() {
                    String::new()
                } else {
                    format!(" ({})", presence.display_name)
                };
                let status = if presence.online { "online" } else { "offline" };
                output.push_str(&format!(
                    "{}{}{} - {}\n",
                    presence.id, name, me_suffix, status
                ));
            }
        }

        output.push_str("============================================================\n");
        output
    }

    /// Format a confirmation after handing a message to the channel
    pub fn format_sent_confirmation(queued: bool) -> String {
        if queued {
            "queued until connected\n".to_string()
        } else {
            "sent\n".to_string()
        }
    }

    /// Format a frame that will not be delivered
    pub fn format_delivery_failed(frame: &Frame) -> String {
        match frame {
            Frame::Chat(message) => format!(
                "\n! not delivered to {}: {}\n",
                message.to, message.content
            ),
            other => format!("\n! not delivered: {:?}\n", other),
        }
    }

    /// Format a raw text message (when parsing fails)
    pub fn format_raw_message(text: &str) -> String {
        format!("\n← Received: {}\n", text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ParticipantId;

    fn id(value: &str) -> ParticipantId {
        ParticipantId::new(value).unwrap()
    }

    #[test]
    fn test_format_chat_message() {
        // テスト項目: チャットメッセージが正しくフォーマットされる
        // given (前提条件):
        let message = ChatMessage::new(id("alice"), id("bob"), "Hello, world!")
            .with_timestamp("Jan 1, 2023, 3:04 PM");

        // when (操作):
        let result = MessageFormatter::format_chat_message(&message);

        // then (期待する結果):
        assert!(result.contains("@alice: Hello, world!"));
        assert!(result.contains("sent at Jan 1, 2023, 3:04 PM"));
        assert!(result.contains("------------------------------------------------------------"));
    }

    #[test]
    fn test_format_chat_message_without_timestamp() {
        // テスト項目: タイムスタンプが無い場合は送信時刻の行を出さない
        // given (前提条件):
        let message = ChatMessage::new(id("alice"), id("bob"), "hi");

        // when (操作):
        let result = MessageFormatter::format_chat_message(&message);

        // then (期待する結果):
        assert!(!result.contains("sent at"));
    }

    #[test]
    fn test_format_presence_marks_me() {
        // テスト項目: プレゼンス一覧で自分に (me) が付き、状態が表示される
        // given (前提条件):
        let list = vec![
            Presence {
                id: id("alice"),
                display_name: "Alice Smith".to_string(),
                online: true,
            },
            Presence {
                id: id("bob"),
                display_name: String::new(),
                online: false,
            },
        ];

        // when (操作):
        let result = MessageFormatter::format_presence(&list, "alice");

        // then (期待する結果):
        assert!(result.contains("alice (Alice Smith) (me) - online"));
        assert!(result.contains("bob - offline"));
    }

    #[test]
    fn test_format_presence_empty() {
        // テスト項目: プレゼンス一覧が空の場合、適切なメッセージが表示される
        // given (前提条件):
        let list: Vec<Presence> = vec![];

        // when (操作):
        let result = MessageFormatter::format_presence(&list, "alice");

        // then (期待する結果):
        assert!(result.contains("(No contacts)"));
    }

    #[test]
    fn test_format_typing() {
        // テスト項目: タイピング通知が開始・終了で異なる表示になる
        // given (前提条件):
        let mut notice = TypingNotice {
            from: id("bob"),
            to: id("alice"),
            is_typing: true,
        };

        // when (操作):
        let typing = MessageFormatter::format_typing(&notice);
        notice.is_typing = false;
        let stopped = MessageFormatter::format_typing(&notice);

        // then (期待する結果):
        assert!(typing.contains("bob is typing"));
        assert!(stopped.contains("bob stopped typing"));
    }

    #[test]
    fn test_format_event_delivery_failed() {
        // テスト項目: 配送失敗イベントに宛先と本文が表示される
        // given (前提条件):
        let event = ChannelEvent::DeliveryFailed(Frame::Chat(ChatMessage::new(
            id("alice"),
            id("bob"),
            "lost",
        )));

        // when (操作):
        let result = MessageFormatter::format_event(&event, "alice");

        // then (期待する結果):
        assert!(result.contains("not delivered to bob: lost"));
    }

    #[test]
    fn test_format_raw_message() {
        // テスト項目: 生メッセージが正しくフォーマットされる
        // given (前提条件):
        let text = "unknown message format";

        // when (操作):
        let result = MessageFormatter::format_raw_message(text);

        // then (期待する結果):
        assert!(result.contains("unknown message format"));
        assert!(result.contains("Received:"));
    }
}
