// Configuration module entry point
// Loads the pipeline configuration once at startup

mod types;

use std::net::SocketAddr;

// Re-export public types
pub use types::{
    AccessLogConfig, LogConfig, RobotsConfig, RouterConfig, RouterLogConfig, ServerConfig,
    StaticConfig, StorageConfig, StorageSection,
};

impl RouterConfig {
    /// Load configuration from specified file path (without extension)
    ///
    /// Missing file is fine; defaults plus `PORTICO_`-prefixed environment
    /// variables always apply.
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(config::Environment::with_prefix("PORTICO").separator("__"))
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("log.level", "info")?
            .set_default("router_log.enabled", true)?
            .set_default("router_log.level", "info")?
            .set_default("access_log.enabled", false)?
            .set_default("static_files.enabled", true)?
            .set_default("static_files.root", "public")?
            .set_default("robots_txt.enabled", false)?
            .set_default("robots_txt.dir", "custom")?
            .set_default("storage.avatars.serve_direct", false)?
            .set_default("storage.repo_avatars.serve_direct", false)?
            .build()?;

        settings.try_deserialize()
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logger::Level;

    #[test]
    fn test_defaults_without_file() {
        let cfg = RouterConfig::load_from("no-such-config-file").unwrap();
        assert_eq!(cfg.server.port, 3000);
        assert_eq!(cfg.log.level, Level::Info);
        assert!(cfg.router_log.enabled);
        assert!(!cfg.access_log.enabled);
        assert!(cfg.access_log.template.contains("$identity"));
        assert!(!cfg.storage.avatars.serve_direct);
        assert!(!cfg.storage.repo_avatars.serve_direct);
    }

    #[test]
    fn test_socket_addr() {
        let cfg = RouterConfig::load_from("no-such-config-file").unwrap();
        let addr = cfg.socket_addr().unwrap();
        assert_eq!(addr.port(), 3000);
    }
}
