//! Reconnection policy.
//!
//! The default never retries: a closed connection stays closed until the
//! caller invokes `connect` again. `Fixed` retries a bounded number of times
//! at a constant interval.

use std::time::Duration;

/// Policy applied after a connection attempt fails or an open connection drops
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReconnectPolicy {
    #[default]
    Never,
    Fixed { max_attempts: u32, interval: Duration },
}

impl ReconnectPolicy {
    /// Delay before retry number `attempt` (1-indexed), or `None` to give up.
    pub fn next_delay(&self, attempt: u32) -> Option<Duration> {
        match *self {
            Self::Never => None,
            Self::Fixed {
                max_attempts,
                interval,
            } => should_attempt_reconnect(attempt, max_attempts).then_some(interval),
        }
    }
}

/// Check if the client should attempt to reconnect.
///
/// # Arguments
///
/// * `attempt` - The reconnection attempt about to be made (1-indexed)
/// * `max_attempts` - The maximum number of reconnection attempts allowed
///
/// # Returns
///
/// `true` if reconnection should be attempted, `false` otherwise
pub fn should_attempt_reconnect(attempt: u32, max_attempts: u32) -> bool {
    attempt >= 1 && attempt <= max_attempts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_never_policy_gives_up_immediately() {
        // テスト項目: Never ポリシーでは再接続しない
        // given (前提条件):
        let policy = ReconnectPolicy::Never;

        // when (操作):
        let delay = policy.next_delay(1);

        // then (期待する結果):
        assert_eq!(delay, None);
    }

    #[test]
    fn test_fixed_policy_within_limit() {
        // テスト項目: 再接続回数が上限以内の場合、固定間隔で再接続する
        // given (前提条件):
        let policy = ReconnectPolicy::Fixed {
            max_attempts: 5,
            interval: Duration::from_secs(5),
        };

        // when (操作):
        let first = policy.next_delay(1);
        let last = policy.next_delay(5);

        // then (期待する結果):
        assert_eq!(first, Some(Duration::from_secs(5)));
        assert_eq!(last, Some(Duration::from_secs(5)));
    }

    #[test]
    fn test_fixed_policy_beyond_limit() {
        // テスト項目: 再接続回数が上限を超えた場合、再接続しない
        // given (前提条件):
        let policy = ReconnectPolicy::Fixed {
            max_attempts: 5,
            interval: Duration::from_secs(5),
        };

        // when (操作):
        let delay = policy.next_delay(6);

        // then (期待する結果):
        assert_eq!(delay, None);
    }

    #[test]
    fn test_should_attempt_reconnect_zero_attempt() {
        // テスト項目: 0 回目という試行は存在しないため再接続すべきではないと判定される
        // given (前提条件):

        // when (操作):
        let result = should_attempt_reconnect(0, 5);

        // then (期待する結果):
        assert!(!result);
    }

    #[test]
    fn test_should_attempt_reconnect_with_zero_max() {
        // テスト項目: 上限が 0 の場合、再接続すべきではないと判定される
        // given (前提条件):

        // when (操作):
        let result = should_attempt_reconnect(1, 0);

        // then (期待する結果):
        assert!(!result);
    }
}
