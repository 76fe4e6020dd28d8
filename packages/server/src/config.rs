//! Validated server configuration.

use std::{fmt, time::Duration};

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("jwt secret must not be empty")]
    EmptySecret,
    #[error("heartbeat interval must be at least one second")]
    ZeroHeartbeat,
    #[error("idle timeout ({idle_timeout_secs}s) must exceed the heartbeat ({heartbeat_secs}s)")]
    IdleTimeoutTooShort {
        heartbeat_secs: u64,
        idle_timeout_secs: u64,
    },
}

#[derive(Clone)]
pub struct ServerConfig {
    host: String,
    port: u16,
    jwt_secret: String,
    heartbeat_interval: Duration,
    idle_timeout: Duration,
}

impl fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("jwt_secret", &"<redacted>")
            .field("heartbeat_interval", &self.heartbeat_interval)
            .field("idle_timeout", &self.idle_timeout)
            .finish()
    }
}

impl ServerConfig {
    pub fn new(
        host: impl Into<String>,
        port: u16,
        jwt_secret: impl Into<String>,
        heartbeat_secs: u64,
        idle_timeout_secs: u64,
    ) -> Result<Self, ConfigError> {
        let jwt_secret = jwt_secret.into();
        if jwt_secret.trim().is_empty() {
            return Err(ConfigError::EmptySecret);
        }
        if heartbeat_secs == 0 {
            return Err(ConfigError::ZeroHeartbeat);
        }
        if idle_timeout_secs <= heartbeat_secs {
            return Err(ConfigError::IdleTimeoutTooShort {
                heartbeat_secs,
                idle_timeout_secs,
            });
        }

        Ok(Self {
            host: host.into(),
            port,
            jwt_secret,
            heartbeat_interval: Duration::from_secs(heartbeat_secs),
            idle_timeout: Duration::from_secs(idle_timeout_secs),
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn jwt_secret(&self) -> &str {
        &self.jwt_secret
    }

    pub fn heartbeat_interval(&self) -> Duration {
        self.heartbeat_interval
    }

    pub fn idle_timeout(&self) -> Duration {
        self.idle_timeout
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_config() {
        // テスト項目: 妥当な値から設定を組み立てられる
        // given (前提条件) / when (操作):
        let config = ServerConfig::new("127.0.0.1", 8080, "secret", 25, 60).unwrap();

        // then (期待する結果):
        assert_eq!(config.bind_address(), "127.0.0.1:8080");
        assert_eq!(config.heartbeat_interval(), Duration::from_secs(25));
        assert_eq!(config.idle_timeout(), Duration::from_secs(60));
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        // テスト項目: 空のシークレット、0 秒のハートビート、短すぎるアイドルタイムアウトは拒否する
        // given (前提条件) / when (操作) / then (期待する結果):
        assert_eq!(
            ServerConfig::new("127.0.0.1", 8080, " ", 25, 60).unwrap_err(),
            ConfigError::EmptySecret
        );
        assert_eq!(
            ServerConfig::new("127.0.0.1", 8080, "secret", 0, 60).unwrap_err(),
            ConfigError::ZeroHeartbeat
        );
        assert_eq!(
            ServerConfig::new("127.0.0.1", 8080, "secret", 30, 30).unwrap_err(),
            ConfigError::IdleTimeoutTooShort {
                heartbeat_secs: 30,
                idle_timeout_secs: 30,
            }
        );
    }

    #[test]
    fn test_debug_output_hides_secret() {
        // テスト項目: Debug 出力にシークレットが含まれない
        // given (前提条件):
        let config = ServerConfig::new("127.0.0.1", 8080, "super-secret", 25, 60).unwrap();

        // when (操作):
        let output = format!("{config:?}");

        // then (期待する結果):
        assert!(!output.contains("super-secret"));
        assert!(output.contains("<redacted>"));
    }
}
