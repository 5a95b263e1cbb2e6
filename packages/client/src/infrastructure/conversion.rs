//! Conversion logic between wire DTOs and domain frames.

use murmur_shared::wire::{
    self, Envelope, FrameKind, MessageFrame, PresenceStatus, UserStatus, WireError, WireInbound,
};

use crate::domain::{ChatMessage, Frame, Inbound, ParticipantId, Presence, TypingNotice};

// ========================================
// Domain → DTO
// ========================================

impl From<&Frame> for MessageFrame {
    fn from(frame: &Frame) -> Self {
        let (kind, from, to, content, timestamp, is_typing) = match frame {
            Frame::Handshake { from } => (
                FrameKind::Handshake,
                from,
                String::new(),
                String::new(),
                String::new(),
                false,
            ),
            Frame::Chat(message) => (
                FrameKind::Chat,
                &message.from,
                message.to.as_str().to_string(),
                message.content.clone(),
                message.timestamp.clone(),
                false,
            ),
            Frame::Typing(notice) => (
                FrameKind::Typing,
                &notice.from,
                notice.to.as_str().to_string(),
                String::new(),
                String::new(),
                notice.is_typing,
            ),
        };

        Self {
            kind: Some(kind),
            from: from.as_str().to_string(),
            to,
            content,
            timestamp,
            legacy_type: None,
            is_typing,
        }
    }
}

// ========================================
// DTO → Domain
// ========================================

impl TryFrom<MessageFrame> for Frame {
    type Error = WireError;

    fn try_from(dto: MessageFrame) -> Result<Self, Self::Error> {
        let kind = dto.resolved_kind();
        let from = participant(dto.from, "from")?;

        match kind {
            FrameKind::Handshake => Ok(Frame::Handshake { from }),
            FrameKind::Chat => Ok(Frame::Chat(ChatMessage {
                from,
                to: participant(dto.to, "to")?,
                content: dto.content,
                timestamp: dto.timestamp,
            })),
            FrameKind::Typing => Ok(Frame::Typing(TypingNotice {
                from,
                to: participant(dto.to, "to")?,
                is_typing: dto.is_typing,
            })),
        }
    }
}

impl TryFrom<UserStatus> for Presence {
    type Error = WireError;

    fn try_from(dto: UserStatus) -> Result<Self, Self::Error> {
        let display_name = format!("{} {}", dto.firstname, dto.lastname)
            .trim()
            .to_string();
        Ok(Self {
            id: participant(dto.id, "id")?,
            display_name,
            online: dto.status == PresenceStatus::Online,
        })
    }
}

fn participant(value: String, field: &str) -> Result<ParticipantId, WireError> {
    ParticipantId::new(value)
        .map_err(|_| WireError::Malformed(format!("field '{}' must not be empty", field)))
}

/// Encode a domain frame as JSON text.
pub fn encode(frame: &Frame) -> Result<String, WireError> {
    wire::encode_frame(&MessageFrame::from(frame))
}

/// Decode JSON text into a domain inbound payload.
pub fn decode(text: &str) -> Result<Inbound, WireError> {
    match wire::decode_inbound(text)? {
        WireInbound::Message(dto) => Frame::try_from(dto).map(Inbound::Frame),
        WireInbound::Envelope(Envelope::Userlist(users)) => users
            .into_iter()
            .map(Presence::try_from)
            .collect::<Result<Vec<_>, _>>()
            .map(Inbound::Presence),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(value: &str) -> ParticipantId {
        ParticipantId::new(value).unwrap()
    }

    #[test]
    fn test_handshake_to_dto() {
        // テスト項目: ハンドシェイクが空の to と content を持つ DTO に変換される
        // given (前提条件):
        let frame = Frame::Handshake { from: id("u1") };

        // when (操作):
        let dto = MessageFrame::from(&frame);

        // then (期待する結果):
        assert_eq!(dto.kind, Some(FrameKind::Handshake));
        assert_eq!(dto.from, "u1");
        assert_eq!(dto.to, "");
        assert_eq!(dto.content, "");
    }

    #[test]
    fn test_chat_to_dto() {
        // テスト項目: チャットメッセージが DTO に変換される
        // given (前提条件):
        let frame = Frame::Chat(
            ChatMessage::new(id("u1"), id("u2"), "hi").with_timestamp("Jan 1, 2023, 3:04 PM"),
        );

        // when (操作):
        let dto = MessageFrame::from(&frame);

        // then (期待する結果):
        assert_eq!(dto.kind, Some(FrameKind::Chat));
        assert_eq!(dto.to, "u2");
        assert_eq!(dto.content, "hi");
        assert_eq!(dto.timestamp, "Jan 1, 2023, 3:04 PM");
        assert!(!dto.is_typing);
    }

    #[test]
    fn test_decode_legacy_chat() {
        // テスト項目: 従来形式のフレームがドメインのチャットメッセージに変換される
        // given (前提条件):
        let text = r#"{"from":"u2","to":"u1","content":"yo"}"#;

        // when (操作):
        let inbound = decode(text).unwrap();

        // then (期待する結果):
        assert_eq!(
            inbound,
            Inbound::Frame(Frame::Chat(ChatMessage::new(id("u2"), id("u1"), "yo")))
        );
    }

    #[test]
    fn test_decode_chat_without_recipient_is_malformed() {
        // テスト項目: kind が chat で to が空のフレームは不正として扱われる
        // given (前提条件):
        let text = r#"{"kind":"chat","from":"u2","to":"","content":"yo"}"#;

        // when (操作):
        let result = decode(text);

        // then (期待する結果):
        assert!(matches!(result, Err(WireError::Malformed(_))));
    }

    #[test]
    fn test_decode_typing() {
        // テスト項目: タイピング通知がドメインに変換される
        // given (前提条件):
        let text = r#"{"kind":"typing","from":"u2","to":"u1","isTyping":true}"#;

        // when (操作):
        let inbound = decode(text).unwrap();

        // then (期待する結果):
        assert_eq!(
            inbound,
            Inbound::Frame(Frame::Typing(TypingNotice {
                from: id("u2"),
                to: id("u1"),
                is_typing: true,
            }))
        );
    }

    #[test]
    fn test_decode_presence_list() {
        // テスト項目: userlist エンベロープがプレゼンス一覧に変換される
        // given (前提条件):
        let text = r#"{"type":"userlist","data":[{"id":"u2","firstname":"Bo","lastname":"Li","status":"online"},{"id":"u3","status":"offline"}]}"#;

        // when (操作):
        let inbound = decode(text).unwrap();

        // then (期待する結果):
        let Inbound::Presence(list) = inbound else {
            panic!("expected a presence list");
        };
        assert_eq!(list[0].display_name, "Bo Li");
        assert!(list[0].online);
        assert_eq!(list[1].display_name, "");
        assert!(!list[1].online);
    }

    #[test]
    fn test_decode_presence_list_with_null_data() {
        // テスト項目: data が null の userlist は空のプレゼンス一覧として扱われる
        // given (前提条件):
        let text = r#"{"type":"userlist","data":null}"#;

        // when (操作):
        let inbound = decode(text).unwrap();

        // then (期待する結果):
        assert_eq!(inbound, Inbound::Presence(Vec::new()));
    }

    #[test]
    fn test_encode_then_decode_typing_keeps_flag() {
        // テスト項目: タイピング通知のフラグがエンコード後も保持される
        // given (前提条件):
        let frame = Frame::Typing(TypingNotice {
            from: id("u1"),
            to: id("u2"),
            is_typing: true,
        });

        // when (操作):
        let text = encode(&frame).unwrap();

        // then (期待する結果):
        assert_eq!(decode(&text).unwrap(), Inbound::Frame(frame));
    }
}
