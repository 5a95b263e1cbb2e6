//! Wire-level DTOs exchanged over the realtime socket.
//!
//! Every frame is a JSON object `{kind, from, to, content, timestamp}`.
//! Peers that predate the `kind` tag send the same object without it, so
//! decoding infers the kind from the legacy fields when it is missing.
//! Presence updates arrive as a separate `{"type":"userlist","data":[...]}`
//! envelope.

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Wire codec errors
#[derive(Debug, Error)]
pub enum WireError {
    /// The payload is not a frame or envelope this codec understands
    #[error("Malformed frame: {0}")]
    Malformed(String),

    /// Serialization failed
    #[error("Failed to encode frame: {0}")]
    Encode(String),
}

/// Frame discriminator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrameKind {
    /// Presence announcement sent first on every new connection
    Handshake,
    /// Direct chat message
    Chat,
    /// Typing indicator
    Typing,
}

/// Message frame as it appears on the wire
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageFrame {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<FrameKind>,
    pub from: String,
    #[serde(default)]
    pub to: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub timestamp: String,
    /// Legacy `type` field ("message" or "typing")
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub legacy_type: Option<String>,
    #[serde(default, rename = "isTyping", skip_serializing_if = "is_false")]
    pub is_typing: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl MessageFrame {
    /// Resolve the frame kind, falling back to the legacy conventions.
    pub fn resolved_kind(&self) -> FrameKind {
        if let Some(kind) = self.kind {
            return kind;
        }
        if self.legacy_type.as_deref() == Some("typing") {
            return FrameKind::Typing;
        }
        if self.to.is_empty() && self.content.is_empty() {
            return FrameKind::Handshake;
        }
        FrameKind::Chat
    }
}

/// Online status of a participant in a presence list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PresenceStatus {
    Online,
    Offline,
}

/// One entry of a presence list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserStatus {
    pub id: String,
    #[serde(default)]
    pub firstname: String,
    #[serde(default)]
    pub lastname: String,
    pub status: PresenceStatus,
}

/// Typed envelope for server-pushed updates
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum Envelope {
    /// Servers with nobody to list send `"data": null`
    #[serde(deserialize_with = "null_as_empty")]
    Userlist(Vec<UserStatus>),
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<UserStatus>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<UserStatus>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Anything that can arrive on the socket
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WireInbound {
    Message(MessageFrame),
    Envelope(Envelope),
}

/// Serialize a message frame to JSON text.
pub fn encode_frame(frame: &MessageFrame) -> Result<String, WireError> {
    serde_json::to_string(frame).map_err(|e| WireError::Encode(e.to_string()))
}

/// Serialize a server envelope to JSON text.
pub fn encode_envelope(envelope: &Envelope) -> Result<String, WireError> {
    serde_json::to_string(envelope).map_err(|e| WireError::Encode(e.to_string()))
}

/// Decode an inbound text payload.
///
/// Envelopes are tried first since a `userlist` envelope never carries `from`.
pub fn decode_inbound(text: &str) -> Result<WireInbound, WireError> {
    if let Ok(envelope) = serde_json::from_str::<Envelope>(text) {
        return Ok(WireInbound::Envelope(envelope));
    }

    serde_json::from_str::<MessageFrame>(text)
        .map(WireInbound::Message)
        .map_err(|e| WireError::Malformed(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_legacy_chat_frame() {
        // テスト項目: kind を持たない従来形式のチャットフレームがデコードされる
        // given (前提条件):
        let text = r#"{"from":"u2","to":"u1","content":"yo"}"#;

        // when (操作):
        let result = decode_inbound(text).unwrap();

        // then (期待する結果):
        let WireInbound::Message(frame) = result else {
            panic!("expected a message frame");
        };
        assert_eq!(frame.resolved_kind(), FrameKind::Chat);
        assert_eq!(frame.from, "u2");
        assert_eq!(frame.to, "u1");
        assert_eq!(frame.content, "yo");
        assert_eq!(frame.timestamp, "");
    }

    #[test]
    fn test_decode_legacy_handshake_frame() {
        // テスト項目: to と content が空の従来形式フレームはハンドシェイクと判定される
        // given (前提条件):
        let text = r#"{"from":"u1"}"#;

        // when (操作):
        let result = decode_inbound(text).unwrap();

        // then (期待する結果):
        let WireInbound::Message(frame) = result else {
            panic!("expected a message frame");
        };
        assert_eq!(frame.resolved_kind(), FrameKind::Handshake);
    }

    #[test]
    fn test_decode_legacy_typing_frame() {
        // テスト項目: type が typing の従来形式フレームはタイピング通知と判定される
        // given (前提条件):
        let text = r#"{"type":"typing","from":"u2","to":"u1","isTyping":true}"#;

        // when (操作):
        let result = decode_inbound(text).unwrap();

        // then (期待する結果):
        let WireInbound::Message(frame) = result else {
            panic!("expected a message frame");
        };
        assert_eq!(frame.resolved_kind(), FrameKind::Typing);
        assert!(frame.is_typing);
    }

    #[test]
    fn test_explicit_kind_wins_over_sentinels() {
        // テスト項目: kind が明示されていれば空文字の番兵より優先される
        // given (前提条件):
        let text = r#"{"kind":"chat","from":"u1","to":"u2","content":""}"#;

        // when (操作):
        let result = decode_inbound(text).unwrap();

        // then (期待する結果):
        let WireInbound::Message(frame) = result else {
            panic!("expected a message frame");
        };
        assert_eq!(frame.resolved_kind(), FrameKind::Chat);
    }

    #[test]
    fn test_decode_userlist_envelope() {
        // テスト項目: userlist エンベロープがプレゼンス一覧としてデコードされる
        // given (前提条件):
        let text = r#"{"type":"userlist","data":[{"id":"u2","firstname":"Bo","lastname":"Li","status":"online"},{"id":"u3","status":"offline"}]}"#;

        // when (操作):
        let result = decode_inbound(text).unwrap();

        // then (期待する結果):
        let WireInbound::Envelope(Envelope::Userlist(users)) = result else {
            panic!("expected a userlist envelope");
        };
        assert_eq!(users.len(), 2);
        assert_eq!(users[0].firstname, "Bo");
        assert_eq!(users[0].status, PresenceStatus::Online);
        assert_eq!(users[1].firstname, "");
        assert_eq!(users[1].status, PresenceStatus::Offline);
    }

    #[test]
    fn test_decode_userlist_with_null_data() {
        // テスト項目: data が null の userlist エンベロープは空のプレゼンス一覧になる
        // given (前提条件):
        let text = r#"{"type":"userlist","data":null}"#;

        // when (操作):
        let result = decode_inbound(text).unwrap();

        // then (期待する結果):
        assert_eq!(result, WireInbound::Envelope(Envelope::Userlist(Vec::new())));
    }

    #[test]
    fn test_decode_malformed_json() {
        // テスト項目: 不正な JSON はエラーとして返され、パニックしない
        // given (前提条件):
        let text = "{not json";

        // when (操作):
        let result = decode_inbound(text);

        // then (期待する結果):
        assert!(matches!(result, Err(WireError::Malformed(_))));
    }

    #[test]
    fn test_decode_object_without_sender() {
        // テスト項目: from を持たないオブジェクトは不正なフレームとして扱われる
        // given (前提条件):
        let text = r#"{"to":"u1","content":"who am i"}"#;

        // when (操作):
        let result = decode_inbound(text);

        // then (期待する結果):
        assert!(matches!(result, Err(WireError::Malformed(_))));
    }

    #[test]
    fn test_encode_handshake_keeps_legacy_sentinels() {
        // テスト項目: ハンドシェイクのエンコード結果に空の to と content が含まれる
        // given (前提条件):
        let frame = MessageFrame {
            kind: Some(FrameKind::Handshake),
            from: "u1".to_string(),
            to: String::new(),
            content: String::new(),
            timestamp: String::new(),
            legacy_type: None,
            is_typing: false,
        };

        // when (操作):
        let json = encode_frame(&frame).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        // then (期待する結果):
        assert_eq!(value["kind"], "handshake");
        assert_eq!(value["from"], "u1");
        assert_eq!(value["to"], "");
        assert_eq!(value["content"], "");
        assert!(value.get("isTyping").is_none());
        assert!(value.get("type").is_none());
    }
}
