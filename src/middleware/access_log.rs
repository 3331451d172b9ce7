//! Access log formatter middleware
//!
//! A second, independent logging layer driven by a user-supplied text
//! template. One line per completed request is rendered into a buffer and
//! emitted at INFO on the `access` channel. Rendering runs after downstream
//! completes so response-derived fields are populated; formatter problems
//! are reported at WARN and never affect the request.
//!
//! Supported variables, `$name` substitution style:
//! - `$remote_addr` - client address
//! - `$identity` - resolved identity, `-` when anonymous
//! - `$time_local` - request start in Common Log Format time
//! - `$time_iso8601` - request start as ISO 8601
//! - `$request` - full request line (`METHOD uri HTTP/version`)
//! - `$request_method`, `$request_uri`
//! - `$status` - final status code
//! - `$duration_ms` - wall-clock time spent, milliseconds (3 decimals)
//!
//! The pattern value `json` selects a structured line with the same fields.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Local};
use hyper::{Request, Response, StatusCode, Version};

use crate::config::AccessLogConfig;
use crate::http::Body;
use crate::logger::{Logger, NamedLogger};

/// Identity resolved by the surrounding process (session/auth layer) and
/// stored in request extensions before dispatch. Absent or empty means
/// anonymous.
#[derive(Debug, Clone)]
pub struct Identity(pub String);

/// One template variable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Var {
    RemoteAddr,
    Identity,
    TimeLocal,
    TimeIso8601,
    Request,
    RequestMethod,
    RequestUri,
    Status,
    DurationMs,
}

/// Longest names first so `$request_method` never parses as `$request`
const VARS: &[(&str, Var)] = &[
    ("request_method", Var::RequestMethod),
    ("time_iso8601", Var::TimeIso8601),
    ("request_uri", Var::RequestUri),
    ("remote_addr", Var::RemoteAddr),
    ("duration_ms", Var::DurationMs),
    ("time_local", Var::TimeLocal),
    ("identity", Var::Identity),
    ("request", Var::Request),
    ("status", Var::Status),
];

#[derive(Debug, Clone)]
enum Segment {
    Literal(String),
    Var(Var),
}

/// Pre-parsed access log template
enum Template {
    Pattern(Vec<Segment>),
    Json,
}

/// Immutable per-request view captured at entry, completed after downstream
/// returns
pub struct AccessSnapshot {
    remote_addr: String,
    identity: String,
    method: String,
    uri: String,
    version: Version,
    start: DateTime<Local>,
    status: StatusCode,
    elapsed: Duration,
}

impl AccessSnapshot {
    fn request_line(&self) -> String {
        format!("{} {} {:?}", self.method, self.uri, self.version)
    }
}

/// Renders and emits one access line per completed request
pub struct AccessLogger {
    template: Template,
    log: Arc<Logger>,
}

impl AccessLogger {
    /// Startup-time install decision; parse problems are reported once at
    /// WARN on `warnings` and the offending text is kept literally.
    pub fn from_config(
        cfg: &AccessLogConfig,
        logger: &Arc<Logger>,
        warnings: &NamedLogger,
    ) -> Option<Self> {
        if !cfg.enabled {
            return None;
        }
        let template = if cfg.template == "json" {
            Template::Json
        } else {
            Template::Pattern(parse_pattern(&cfg.template, warnings))
        };
        Some(Self {
            template,
            log: Arc::clone(logger),
        })
    }

    /// Capture the request-derived fields before downstream may consume the
    /// request
    pub fn snapshot(&self, req: &Request<Body>, remote_addr: std::net::SocketAddr) -> AccessSnapshot {
        let identity = req
            .extensions()
            .get::<Identity>()
            .map(|i| i.0.clone())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "-".to_string());
        AccessSnapshot {
            remote_addr: remote_addr.to_string(),
            identity,
            method: req.method().to_string(),
            uri: req.uri().to_string(),
            version: req.version(),
            start: Local::now(),
            status: StatusCode::OK,
            elapsed: Duration::ZERO,
        }
    }

    /// Fill in the response-derived fields and emit the line
    pub fn emit(&self, mut snap: AccessSnapshot, resp: &Response<Body>, elapsed: Duration) {
        snap.status = resp.status();
        snap.elapsed = elapsed;
        self.log.access_line(&self.render(&snap));
    }

    fn render(&self, snap: &AccessSnapshot) -> String {
        match &self.template {
            Template::Json => serde_json::json!({
                "remote_addr": snap.remote_addr,
                "identity": snap.identity,
                "time": snap.start.to_rfc3339(),
                "method": snap.method,
                "uri": snap.uri,
                "status": snap.status.as_u16(),
                "duration_ms": duration_ms(snap.elapsed),
            })
            .to_string(),
            Template::Pattern(segments) => {
                let mut line = String::new();
                for segment in segments {
                    match segment {
                        Segment::Literal(text) => line.push_str(text),
                        Segment::Var(var) => render_var(&mut line, *var, snap),
                    }
                }
                line
            }
        }
    }
}

fn render_var(line: &mut String, var: Var, snap: &AccessSnapshot) {
    match var {
        Var::RemoteAddr => line.push_str(&snap.remote_addr),
        Var::Identity => line.push_str(&snap.identity),
        Var::TimeLocal => line.push_str(&snap.start.format("%d/%b/%Y:%H:%M:%S %z").to_string()),
        Var::TimeIso8601 => line.push_str(&snap.start.to_rfc3339()),
        Var::Request => line.push_str(&snap.request_line()),
        Var::RequestMethod => line.push_str(&snap.method),
        Var::RequestUri => line.push_str(&snap.uri),
        Var::Status => line.push_str(&snap.status.as_u16().to_string()),
        Var::DurationMs => line.push_str(&format!("{:.3}", duration_ms(snap.elapsed))),
    }
}

#[allow(clippy::cast_precision_loss)]
fn duration_ms(elapsed: Duration) -> f64 {
    elapsed.as_micros() as f64 / 1_000.0
}

/// Parse a `$variable` pattern into segments
///
/// Unknown variables stay in the output verbatim; each one is reported once
/// at parse time so a typo in the template is visible without costing
/// anything per request.
fn parse_pattern(pattern: &str, warnings: &NamedLogger) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut rest = pattern;

    while let Some(dollar) = rest.find('$') {
        literal.push_str(&rest[..dollar]);
        rest = &rest[dollar + 1..];

        match VARS.iter().find(|(name, _)| rest.starts_with(name)) {
            Some((name, var)) => {
                if !literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut literal)));
                }
                segments.push(Segment::Var(*var));
                rest = &rest[name.len()..];
            }
            None => {
                let unknown: String = rest
                    .chars()
                    .take_while(|c| c.is_ascii_alphanumeric() || *c == '_')
                    .collect();
                warnings.warn(&format!(
                    "unknown access log template variable `${unknown}`, keeping it literally"
                ));
                literal.push('$');
            }
        }
    }
    literal.push_str(rest);
    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }
    segments
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{full, response};
    use crate::logger::Level;

    fn access_logger(template: &str) -> AccessLogger {
        let logger = Arc::new(Logger::stdio(Level::None));
        let cfg = AccessLogConfig {
            enabled: true,
            template: template.to_string(),
        };
        AccessLogger::from_config(&cfg, &logger, &logger.named("router")).unwrap()
    }

    fn sample_snapshot(logger: &AccessLogger, identity: Option<&str>) -> AccessSnapshot {
        let mut req = Request::builder()
            .method("GET")
            .uri("/avatars/a.png")
            .body(full("ignored"))
            .unwrap();
        if let Some(name) = identity {
            req.extensions_mut().insert(Identity(name.to_string()));
        }
        logger.snapshot(&req, "10.0.0.1:55001".parse().unwrap())
    }

    #[test]
    fn test_identity_defaults_to_dash() {
        let al = access_logger("$identity");
        let snap = sample_snapshot(&al, None);
        assert_eq!(snap.identity, "-");
    }

    #[test]
    fn test_identity_from_extensions() {
        let al = access_logger("$identity");
        let snap = sample_snapshot(&al, Some("alice"));
        assert_eq!(snap.identity, "alice");
    }

    #[test]
    fn test_empty_identity_is_anonymous() {
        let al = access_logger("$identity");
        let snap = sample_snapshot(&al, Some(""));
        assert_eq!(snap.identity, "-");
    }

    #[test]
    fn test_render_default_style_pattern() {
        let al = access_logger("$remote_addr - $identity \"$request\" $status");
        let mut snap = sample_snapshot(&al, Some("alice"));
        snap.status = StatusCode::NOT_FOUND;
        let line = al.render(&snap);
        assert_eq!(line, "10.0.0.1:55001 - alice \"GET /avatars/a.png HTTP/1.1\" 404");
    }

    #[test]
    fn test_request_method_not_eaten_by_request() {
        let al = access_logger("$request_method $request_uri");
        let snap = sample_snapshot(&al, None);
        assert_eq!(al.render(&snap), "GET /avatars/a.png");
    }

    #[test]
    fn test_unknown_variable_kept_literally() {
        let al = access_logger("$nope $status");
        let snap = sample_snapshot(&al, None);
        assert_eq!(al.render(&snap), "$nope 200");
    }

    #[test]
    fn test_json_template() {
        let al = access_logger("json");
        let snap = sample_snapshot(&al, Some("bob"));
        let value: serde_json::Value = serde_json::from_str(&al.render(&snap)).unwrap();
        assert_eq!(value["identity"], "bob");
        assert_eq!(value["method"], "GET");
        assert_eq!(value["status"], 200);
    }

    #[test]
    fn test_disabled_not_installed() {
        let logger = Arc::new(Logger::stdio(Level::Info));
        let cfg = AccessLogConfig {
            enabled: false,
            template: "$status".to_string(),
        };
        assert!(AccessLogger::from_config(&cfg, &logger, &logger.named("router")).is_none());
    }

    #[test]
    fn test_emit_appends_to_access_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("access.log");
        let cfg = crate::config::LogConfig {
            level: Level::Info,
            access_log_file: Some(path.to_str().unwrap().to_string()),
            error_log_file: None,
        };
        let logger = Arc::new(Logger::from_config(&cfg).unwrap());
        let al = AccessLogger::from_config(
            &AccessLogConfig {
                enabled: true,
                template: "$identity $status".to_string(),
            },
            &logger,
            &logger.named("router"),
        )
        .unwrap();

        let snap = {
            let req = Request::builder()
                .method("HEAD")
                .uri("/")
                .body(full(""))
                .unwrap();
            al.snapshot(&req, "127.0.0.1:9000".parse().unwrap())
        };
        al.emit(snap, &response::health_ok(), Duration::from_millis(1));

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "- 200\n");
    }
}
