// Configuration types module
// Defines all configuration-related data structures

use serde::Deserialize;

use crate::logger::Level;

/// Main configuration structure
///
/// Read once at startup; every field is immutable afterwards. Middlewares
/// receive the relevant sections by reference at construction time.
#[derive(Debug, Deserialize, Clone)]
pub struct RouterConfig {
    pub server: ServerConfig,
    pub log: LogConfig,
    pub router_log: RouterLogConfig,
    pub access_log: AccessLogConfig,
    pub static_files: StaticConfig,
    pub robots_txt: RobotsConfig,
    pub storage: StorageSection,
}

/// Listen address for the optional serving glue
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Logger sink configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LogConfig {
    /// Minimum level the sink will emit
    pub level: Level,
    /// Access log file path (optional, stdout if not set)
    #[serde(default)]
    pub access_log_file: Option<String>,
    /// Error log file path (optional, stderr if not set)
    #[serde(default)]
    pub error_log_file: Option<String>,
}

/// Per-request "Started/Completed" logging
#[derive(Debug, Deserialize, Clone)]
pub struct RouterLogConfig {
    pub enabled: bool,
    /// Level the Started/Completed records are emitted at. If the sink
    /// threshold is above this level, the middleware is not installed at all.
    pub level: Level,
}

/// Templated access-line logging
#[derive(Debug, Deserialize, Clone)]
pub struct AccessLogConfig {
    pub enabled: bool,
    /// Line pattern, `$variable` substitution style, or the literal `json`
    /// for a structured line.
    #[serde(default = "default_access_log_template")]
    pub template: String,
}

fn default_access_log_template() -> String {
    "$remote_addr - $identity [$time_local] \"$request\" $status".to_string()
}

/// Static asset interception
#[derive(Debug, Deserialize, Clone)]
pub struct StaticConfig {
    pub enabled: bool,
    /// Directory served at the URL root
    pub root: String,
}

/// robots.txt interception
#[derive(Debug, Deserialize, Clone)]
pub struct RobotsConfig {
    pub enabled: bool,
    /// Directory containing `robots.txt`
    pub dir: String,
}

/// Storage bindings shipped by default: user avatars and repository avatars
#[derive(Debug, Deserialize, Clone)]
pub struct StorageSection {
    pub avatars: StorageConfig,
    pub repo_avatars: StorageConfig,
}

/// One object-store binding's serving configuration
#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// When true the store signs time-limited URLs and the binding answers
    /// with a 301 redirect; when false bytes are proxied through this
    /// process.
    pub serve_direct: bool,
}
