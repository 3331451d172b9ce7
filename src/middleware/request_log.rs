//! Request logging middleware
//!
//! Emits one "Started" record before the downstream call and one "Completed"
//! record after it, on the `router` channel. Whether the middleware exists
//! at all is decided once at startup: when router logging is disabled or the
//! sink would drop its records anyway, no logger is installed and the
//! dispatch path pays nothing.

use std::sync::Arc;
use std::time::Duration;

use hyper::{Method, StatusCode, Uri};

use crate::config::RouterLogConfig;
use crate::logger::{Level, Logger, NamedLogger};

/// Started/Completed logging at a configured level
pub struct RequestLogger {
    level: Level,
    log: NamedLogger,
}

impl RequestLogger {
    /// Startup-time install decision
    ///
    /// Returns `None` when disabled or when the sink threshold is above the
    /// configured record level, so the disabled case costs nothing per
    /// request.
    pub fn from_config(cfg: &RouterLogConfig, logger: &Arc<Logger>) -> Option<Self> {
        if !cfg.enabled || cfg.level == Level::None || !logger.would_log(cfg.level) {
            return None;
        }
        Some(Self {
            level: cfg.level,
            log: logger.named("router"),
        })
    }

    pub fn started(&self, method: &Method, uri: &Uri, remote_addr: &std::net::SocketAddr) {
        self.log
            .log(self.level, &format!("Started {method} {uri} for {remote_addr}"));
    }

    pub fn completed(&self, method: &Method, uri: &Uri, status: StatusCode, elapsed: Duration) {
        let reason = status.canonical_reason().unwrap_or("");
        self.log.log(
            self.level,
            &format!(
                "Completed {method} {uri} {} {reason} in {elapsed:?}",
                status.as_u16()
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn logger(threshold: Level) -> Arc<Logger> {
        Arc::new(Logger::stdio(threshold))
    }

    #[test]
    fn test_installed_when_enabled_and_loggable() {
        let cfg = RouterLogConfig {
            enabled: true,
            level: Level::Info,
        };
        assert!(RequestLogger::from_config(&cfg, &logger(Level::Info)).is_some());
    }

    #[test]
    fn test_not_installed_when_disabled() {
        let cfg = RouterLogConfig {
            enabled: false,
            level: Level::Info,
        };
        assert!(RequestLogger::from_config(&cfg, &logger(Level::Info)).is_none());
    }

    #[test]
    fn test_not_installed_below_sink_threshold() {
        let cfg = RouterLogConfig {
            enabled: true,
            level: Level::Info,
        };
        assert!(RequestLogger::from_config(&cfg, &logger(Level::Error)).is_none());
    }

    #[test]
    fn test_not_installed_at_level_none() {
        let cfg = RouterLogConfig {
            enabled: true,
            level: Level::None,
        };
        assert!(RequestLogger::from_config(&cfg, &logger(Level::Info)).is_none());
    }
}
