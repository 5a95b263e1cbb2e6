//! 接続中の参加者の管理
//!
//! ## 責務
//!
//! - 参加者 ID と送信用 `UnboundedSender` の対応を管理
//! - 宛先を指定したメッセージの送信 (push_to)
//! - プレゼンス一覧 (userlist) の配信
//!
//! ## 設計ノート
//!
//! 同じ参加者 ID で新しい接続が来た場合は新しい接続で置き換える。
//! 古い接続の切断処理が新しい接続を消さないよう、登録ごとにセッション ID を
//! 発行し、登録解除はセッション ID が一致する場合のみ行う。

use std::collections::HashMap;

use murmur_shared::wire::{Envelope, PresenceStatus, UserStatus, encode_envelope};
use tokio::sync::{Mutex, mpsc};
use uuid::Uuid;

/// Outbound queue of one connection
pub type PusherChannel = mpsc::UnboundedSender<String>;

struct Session {
    id: Uuid,
    sender: PusherChannel,
}

/// Registry of connected participants
#[derive(Default)]
pub struct Registry {
    sessions: Mutex<HashMap<String, Session>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `participant`, superseding any existing session.
    ///
    /// Returns the ID of the new session.
    pub async fn register(&self, participant: &str, sender: PusherChannel) -> Uuid {
        let id = Uuid::new_v4();
        let mut sessions = self.sessions.lock().await;
        if sessions
            .insert(participant.to_string(), Session { id, sender })
            .is_some()
        {
            tracing::info!("Participant '{}' reconnected, replacing old session", participant);
        }
        tracing::debug!("Participant '{}' registered (session {})", participant, id);
        id
    }

    /// Remove `participant` if `session` is still the registered one.
    pub async fn unregister(&self, participant: &str, session: Uuid) -> bool {
        let mut sessions = self.sessions.lock().await;
        match sessions.get(participant) {
            Some(current) if current.id == session => {
                sessions.remove(participant);
                tracing::debug!("Participant '{}' unregistered", participant);
                true
            }
            _ => false,
        }
    }

    /// Push `content` to `participant`. Returns `false` if they are offline.
    pub async fn push_to(&self, participant: &str, content: &str) -> bool {
        let sessions = self.sessions.lock().await;
        match sessions.get(participant) {
            Some(session) => session.sender.send(content.to_string()).is_ok(),
            None => false,
        }
    }

    /// Sorted IDs of connected participants.
    pub async fn online(&self) -> Vec<String> {
        let sessions = self.sessions.lock().await;
        let mut ids: Vec<String> = sessions.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Send each connected participant the list of the others who are online.
    pub async fn broadcast_presence(&self) {
        let sessions = self.sessions.lock().await;
        let mut ids: Vec<&String> = sessions.keys().collect();
        ids.sort();

        for (participant, session) in sessions.iter() {
            let others = ids
                .iter()
                .filter(|id| **id != participant)
                .map(|id| UserStatus {
                    id: id.to_string(),
                    firstname: String::new(),
                    lastname: String::new(),
                    status: PresenceStatus::Online,
                })
                .collect();

            let payload = match encode_envelope(&Envelope::Userlist(others)) {
                Ok(payload) => payload,
                Err(e) => {
                    tracing::error!("Failed to encode user list for '{}': {}", participant, e);
                    continue;
                }
            };

            if session.sender.send(payload).is_err() {
                tracing::warn!("Failed to send user list update to '{}'", participant);
            }
        }
    }
}
