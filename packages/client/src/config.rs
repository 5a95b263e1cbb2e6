//! Channel configuration.

use std::time::Duration;

use crate::{
    domain::{OverflowPolicy, ReconnectPolicy},
    error::ChannelError,
};

/// Default endpoint of the message server
pub const DEFAULT_ENDPOINT: &str = "ws://127.0.0.1:8080/ws";

/// Path of the socket endpoint on the API host
const SOCKET_PATH: &str = "/ws";

const DEFAULT_QUEUE_CAPACITY: usize = 256;
const DEFAULT_EVENT_CAPACITY: usize = 64;

/// Configuration of a [`crate::channel::RealtimeChannel`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelConfig {
    /// `ws://` or `wss://` URL of the message server
    pub endpoint: String,
    /// Maximum number of frames held while the connection is not open
    pub queue_capacity: usize,
    pub overflow: OverflowPolicy,
    pub reconnect: ReconnectPolicy,
    /// Upper bound on a single connection attempt; `None` waits indefinitely
    pub connect_timeout: Option<Duration>,
    /// Buffer size of the event broadcast; slow subscribers lag beyond it
    pub event_capacity: usize,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            overflow: OverflowPolicy::default(),
            reconnect: ReconnectPolicy::default(),
            connect_timeout: None,
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

impl ChannelConfig {
    /// Default configuration pointing at `endpoint`.
    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Self::default()
        }
    }

    /// Check the configuration before a channel is built from it.
    ///
    /// # Errors
    ///
    /// Returns `ChannelError::InvalidConfig` describing the first problem found.
    pub fn validate(&self) -> Result<(), ChannelError> {
        if !(self.endpoint.starts_with("ws://") || self.endpoint.starts_with("wss://")) {
            return Err(ChannelError::InvalidConfig(format!(
                "endpoint must use ws:// or wss://, got '{}'",
                self.endpoint
            )));
        }
        if self.queue_capacity == 0 {
            return Err(ChannelError::InvalidConfig(
                "queue capacity must be at least 1".to_string(),
            ));
        }
        if self.event_capacity == 0 {
            return Err(ChannelError::InvalidConfig(
                "event capacity must be at least 1".to_string(),
            ));
        }
        if self.connect_timeout == Some(Duration::ZERO) {
            return Err(ChannelError::InvalidConfig(
                "connect timeout must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Derive the socket endpoint from the HTTP API base URL.
///
/// The socket lives on the same host as the API, under `/ws`, with the scheme
/// swapped (`http` → `ws`, `https` → `wss`). Any path on the base URL is ignored.
///
/// # Errors
///
/// Returns `ChannelError::InvalidConfig` for other schemes or a missing host.
pub fn endpoint_from_api_base(api_base: &str) -> Result<String, ChannelError> {
    let (scheme, rest) = api_base.trim().split_once("://").ok_or_else(|| {
        ChannelError::InvalidConfig(format!("API base '{}' has no scheme", api_base))
    })?;

    let socket_scheme = match scheme.to_ascii_lowercase().as_str() {
        "http" => "ws",
        "https" => "wss",
        other => {
            return Err(ChannelError::InvalidConfig(format!(
                "unsupported API scheme '{}'",
                other
            )));
        }
    };

    let host = rest.split(['/', '?', '#']).next().unwrap_or_default();
    if host.is_empty() {
        return Err(ChannelError::InvalidConfig(format!(
            "API base '{}' has no host",
            api_base
        )));
    }

    Ok(format!("{}://{}{}", socket_scheme, host, SOCKET_PATH))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        // テスト項目: デフォルト設定は検証を通過する
        // given (前提条件):
        let config = ChannelConfig::default();

        // when (操作):
        let result = config.validate();

        // then (期待する結果):
        assert!(result.is_ok());
        assert_eq!(config.reconnect, ReconnectPolicy::Never);
        assert_eq!(config.overflow, OverflowPolicy::DropOldest);
    }

    #[test]
    fn test_validate_rejects_http_endpoint() {
        // テスト項目: ws/wss 以外のスキームは拒否される
        // given (前提条件):
        let config = ChannelConfig::with_endpoint("http://localhost:8080/ws");

        // when (操作):
        let result = config.validate();

        // then (期待する結果):
        assert!(matches!(result, Err(ChannelError::InvalidConfig(_))));
    }

    #[test]
    fn test_validate_rejects_zero_queue_capacity() {
        // テスト項目: キュー容量 0 は拒否される
        // given (前提条件):
        let config = ChannelConfig {
            queue_capacity: 0,
            ..ChannelConfig::default()
        };

        // when (操作):
        let result = config.validate();

        // then (期待する結果):
        assert!(matches!(result, Err(ChannelError::InvalidConfig(_))));
    }

    #[test]
    fn test_endpoint_from_http_base() {
        // テスト項目: http の API ベース URL から ws エンドポイントが導出される
        // given (前提条件):
        let base = "http://localhost:8080";

        // when (操作):
        let endpoint = endpoint_from_api_base(base).unwrap();

        // then (期待する結果):
        assert_eq!(endpoint, "ws://localhost:8080/ws");
    }

    #[test]
    fn test_endpoint_from_https_base_with_path() {
        // テスト項目: https のベース URL はパスを無視して wss に変換される
        // given (前提条件):
        let base = "https://api.example.com/v1/";

        // when (操作):
        let endpoint = endpoint_from_api_base(base).unwrap();

        // then (期待する結果):
        assert_eq!(endpoint, "wss://api.example.com/ws");
    }

    #[test]
    fn test_endpoint_from_unsupported_scheme() {
        // テスト項目: http/https 以外のスキームはエラーになる
        // given (前提条件):
        let base = "ftp://example.com";

        // when (操作):
        let result = endpoint_from_api_base(base);

        // then (期待する結果):
        assert!(matches!(result, Err(ChannelError::InvalidConfig(_))));
    }

    #[test]
    fn test_endpoint_from_base_without_host() {
        // テスト項目: ホストが無いベース URL はエラーになる
        // given (前提条件):
        let base = "http:///path";

        // when (操作):
        let result = endpoint_from_api_base(base);

        // then (期待する結果):
        assert!(matches!(result, Err(ChannelError::InvalidConfig(_))));
    }
}
