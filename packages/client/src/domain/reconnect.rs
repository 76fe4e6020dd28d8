//! Reconnect decisions for the transport layer.

use std::time::Duration;

use crate::error::ClientError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    max_attempts: u32,
    interval: Duration,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self::new(5, Duration::from_secs(5))
    }
}

impl ReconnectPolicy {
    pub fn new(max_attempts: u32, interval: Duration) -> Self {
        Self {
            max_attempts,
            interval,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Check if the session should stop without retrying.
    ///
    /// # Returns
    ///
    /// `true` for a rejected credential or a request that can never be built
    pub fn should_exit_immediately(error: &ClientError) -> bool {
        matches!(
            error,
            ClientError::AuthRejected(_) | ClientError::InvalidRequest(_)
        )
    }

    /// Check if the client should attempt to reconnect.
    ///
    /// # Arguments
    ///
    /// * `error` - The client error that occurred
    /// * `current_attempt` - The current reconnection attempt count (0-indexed)
    pub fn should_attempt_reconnect(&self, error: &ClientError, current_attempt: u32) -> bool {
        if Self::should_exit_immediately(error) {
            return false;
        }

        current_attempt < self.max_attempts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> ReconnectPolicy {
        ReconnectPolicy::new(5, Duration::from_secs(5))
    }

    #[test]
    fn test_should_exit_immediately_with_auth_rejected() {
        // テスト項目: 認証拒否の場合、即座に終了すべきと判定される
        // given (前提条件):
        let error = ClientError::AuthRejected("credential has expired".to_string());

        // when (操作):
        let result = ReconnectPolicy::should_exit_immediately(&error);

        // then (期待する結果):
        assert!(result);
    }

    #[test]
    fn test_should_exit_immediately_with_connection_error() {
        // テスト項目: ConnectionError の場合、即座に終了すべきではないと判定される
        // given (前提条件):
        let error = ClientError::ConnectionError("network error".to_string());

        // when (操作):
        let result = ReconnectPolicy::should_exit_immediately(&error);

        // then (期待する結果):
        assert!(!result);
    }

    #[test]
    fn test_should_attempt_reconnect_with_auth_rejected() {
        // テスト項目: 認証拒否の場合、回数に関わらず再接続しない
        // given (前提条件):
        let error = ClientError::AuthRejected("invalid credential".to_string());

        // when (操作):
        let result = policy().should_attempt_reconnect(&error, 0);

        // then (期待する結果):
        assert!(!result);
    }

    #[test]
    fn test_should_attempt_reconnect_within_limit() {
        // テスト項目: 再接続回数が上限未満の場合、再接続すべきと判定される
        // given (前提条件):
        let error = ClientError::ConnectionLost("reset by peer".to_string());

        // when (操作) / then (期待する結果):
        assert!(policy().should_attempt_reconnect(&error, 0));
        assert!(policy().should_attempt_reconnect(&error, 4));
    }

    #[test]
    fn test_should_attempt_reconnect_at_limit() {
        // テスト項目: 再接続回数が上限に達した場合、再接続すべきではないと判定される
        // given (前提条件):
        let error = ClientError::ConnectionError("network error".to_string());

        // when (操作):
        let result = policy().should_attempt_reconnect(&error, 5);

        // then (期待する結果):
        assert!(!result);
    }

    #[test]
    fn test_zero_attempts_disables_reconnect() {
        // テスト項目: 上限 0 の場合は一度も再接続しない
        // given (前提条件):
        let policy = ReconnectPolicy::new(0, Duration::ZERO);
        let error = ClientError::ConnectionError("network error".to_string());

        // when (操作):
        let result = policy.should_attempt_reconnect(&error, 0);

        // then (期待する結果):
        assert!(!result);
    }
}
