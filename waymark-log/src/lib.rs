//! Waymark Logging
//!
//! Structured, environment-controlled logging for the Waymark crates.
//!
//! # Features
//!
//! - **Environment-controlled**: `WAYMARK_DEBUG=1` enables debug logging
//! - **Cheap when disabled**: macros check an atomic level before formatting
//! - **Structured records**: [`event!`] attaches key/value fields to a message
//! - **Multiple backends**: built-in stderr writer, optionally `tracing`
//!
//! # Usage
//!
//! ```rust
//! use waymark_log::{debug, event, info, Level};
//!
//! debug!("Building application model");
//! info!("Discovered {} controllers", 3);
//! debug!(target: "waymark::descriptors", "Built {} descriptors", 12);
//!
//! event!(Level::Debug, "waymark::model", "Controller discovered",
//!     "controller" => "Widgets",
//!     "actions" => 4,
//! );
//! ```
//!
//! # Environment Variables
//!
//! - `WAYMARK_DEBUG=1` - Enable debug logging
//! - `WAYMARK_LOG_LEVEL=trace|debug|info|warn|error|off` - Set log level
//! - `WAYMARK_LOG_FORMAT=pretty|compact|json` - Set output format
//! - `WAYMARK_LOG_TIMESTAMPS=1|0` - Include timestamps

use once_cell::sync::Lazy;
use std::env;
use std::io::Write;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

// ============================================================================
// Log Levels
// ============================================================================

/// Log level for Waymark logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum Level {
    /// Trace level (most verbose)
    Trace = 0,
    /// Debug level
    Debug = 1,
    /// Info level
    Info = 2,
    /// Warning level
    Warn = 3,
    /// Error level (least verbose)
    Error = 4,
    /// Off (no logging)
    Off = 5,
}

impl Level {
    /// Parse a level name, case-insensitively.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "trace" => Some(Level::Trace),
            "debug" => Some(Level::Debug),
            "info" => Some(Level::Info),
            "warn" | "warning" => Some(Level::Warn),
            "error" => Some(Level::Error),
            "off" | "none" => Some(Level::Off),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Trace => "TRACE",
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
            Level::Off => "OFF",
        }
    }

    fn from_u8(value: u8) -> Self {
        match value {
            0 => Level::Trace,
            1 => Level::Debug,
            2 => Level::Info,
            3 => Level::Warn,
            4 => Level::Error,
            _ => Level::Off,
        }
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Log Format
// ============================================================================

/// Output format for log records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Multi-column human readable output
    Pretty,
    /// Single-letter level, short timestamp
    Compact,
    /// One JSON object per line
    Json,
}

impl Format {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" => Some(Format::Pretty),
            "compact" => Some(Format::Compact),
            "json" => Some(Format::Json),
            _ => None,
        }
    }
}

// ============================================================================
// Global Configuration
// ============================================================================

static DEBUG_ENABLED: AtomicBool = AtomicBool::new(false);

static LOG_LEVEL: AtomicU8 = AtomicU8::new(Level::Info as u8);

static CONFIG: Lazy<LogConfig> = Lazy::new(LogConfig::from_env);

/// Logging configuration, read once from the environment.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Whether debug mode is enabled
    pub debug: bool,
    /// Minimum log level
    pub level: Level,
    /// Output format
    pub format: Format,
    /// Whether to include timestamps
    pub timestamps: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            debug: false,
            level: Level::Info,
            format: Format::Json,
            timestamps: true,
        }
    }
}

fn env_flag(name: &str) -> Option<bool> {
    env::var(name)
        .ok()
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
}

impl LogConfig {
    /// Build the configuration from `WAYMARK_*` environment variables and
    /// publish the level and debug flag to the global atomics.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let debug = env_flag("WAYMARK_DEBUG").unwrap_or(defaults.debug);

        let level = env::var("WAYMARK_LOG_LEVEL")
            .ok()
            .and_then(|s| Level::parse(&s))
            .unwrap_or(if debug { Level::Debug } else { defaults.level });

        let format = env::var("WAYMARK_LOG_FORMAT")
            .ok()
            .and_then(|s| Format::parse(&s))
            .unwrap_or(defaults.format);

        let timestamps = env_flag("WAYMARK_LOG_TIMESTAMPS").unwrap_or(defaults.timestamps);

        DEBUG_ENABLED.store(debug, Ordering::SeqCst);
        LOG_LEVEL.store(level as u8, Ordering::SeqCst);

        Self {
            debug,
            level,
            format,
            timestamps,
        }
    }
}

// ============================================================================
// Public API
// ============================================================================

/// Force initialization of the global configuration.
///
/// The first log macro does this implicitly.
pub fn init() {
    Lazy::force(&CONFIG);
}

#[inline]
pub fn is_debug_enabled() -> bool {
    DEBUG_ENABLED.load(Ordering::Relaxed)
}

#[inline]
pub fn is_level_enabled(level: Level) -> bool {
    Lazy::force(&CONFIG);
    level != Level::Off && level as u8 >= LOG_LEVEL.load(Ordering::Relaxed)
}

pub fn current_level() -> Level {
    Level::from_u8(LOG_LEVEL.load(Ordering::Relaxed))
}

/// Set log level at runtime.
pub fn set_level(level: Level) {
    Lazy::force(&CONFIG);
    LOG_LEVEL.store(level as u8, Ordering::SeqCst);
}

/// Enable or disable debug mode at runtime.
pub fn set_debug(enabled: bool) {
    Lazy::force(&CONFIG);
    DEBUG_ENABLED.store(enabled, Ordering::SeqCst);
    if enabled && current_level() > Level::Debug {
        set_level(Level::Debug);
    }
}

pub fn config() -> &'static LogConfig {
    &CONFIG
}

// ============================================================================
// Record Output
// ============================================================================

/// A single structured field attached to a record.
pub type Field<'a> = (&'a str, String);

/// Write a plain message.
#[doc(hidden)]
pub fn log(level: Level, target: &str, message: &str) {
    log_fields(level, target, message, &[]);
}

/// Write a message with structured fields.
#[doc(hidden)]
pub fn log_fields(level: Level, target: &str, message: &str, fields: &[Field<'_>]) {
    if !is_level_enabled(level) {
        return;
    }

    let config = config();
    match config.format {
        Format::Pretty => write_pretty(level, target, message, fields, config),
        Format::Compact => write_compact(level, target, message, fields, config),
        Format::Json => write_json(level, target, message, fields),
    }
}

fn write_pretty(level: Level, target: &str, message: &str, fields: &[Field<'_>], config: &LogConfig) {
    let mut stderr = std::io::stderr().lock();

    if config.timestamps {
        let now = chrono::Local::now();
        let _ = write!(stderr, "{} ", now.format("%Y-%m-%d %H:%M:%S%.3f"));
    }
    let _ = write!(stderr, "{:5} ", level.as_str());
    if !target.is_empty() {
        let _ = write!(stderr, "[{}] ", target);
    }
    let _ = write!(stderr, "{}", message);
    for (key, value) in fields {
        let _ = write!(stderr, " {}={}", key, value);
    }
    let _ = writeln!(stderr);
}

fn write_compact(level: Level, target: &str, message: &str, fields: &[Field<'_>], config: &LogConfig) {
    let mut stderr = std::io::stderr().lock();

    if config.timestamps {
        let _ = write!(stderr, "{} ", chrono::Local::now().format("%H:%M:%S"));
    }
    let _ = write!(stderr, "{} ", level.as_str().chars().next().unwrap_or('?'));
    if !target.is_empty() {
        let _ = write!(stderr, "{}: ", target);
    }
    let _ = write!(stderr, "{}", message);
    for (key, value) in fields {
        let _ = write!(stderr, " {}={}", key, value);
    }
    let _ = writeln!(stderr);
}

#[cfg(feature = "json")]
fn write_json(level: Level, target: &str, message: &str, fields: &[Field<'_>]) {
    eprintln!("{}", render_json(level, target, message, fields));
}

#[cfg(feature = "json")]
fn render_json(level: Level, target: &str, message: &str, fields: &[Field<'_>]) -> String {
    use serde::Serialize;
    use std::collections::BTreeMap;

    #[derive(Serialize)]
    struct Record<'a> {
        timestamp: String,
        level: &'a str,
        target: &'a str,
        message: &'a str,
        #[serde(skip_serializing_if = "BTreeMap::is_empty")]
        fields: BTreeMap<&'a str, &'a str>,
    }

    let record = Record {
        timestamp: chrono::Utc::now().to_rfc3339(),
        level: level.as_str(),
        target,
        message,
        fields: fields.iter().map(|(k, v)| (*k, v.as_str())).collect(),
    };

    serde_json::to_string(&record).unwrap_or_default()
}

#[cfg(not(feature = "json"))]
fn write_json(level: Level, target: &str, message: &str, fields: &[Field<'_>]) {
    let mut line = format!(
        r#"{{"timestamp":"{}","level":"{}","target":"{}","message":"{}""#,
        chrono::Utc::now().to_rfc3339(),
        level.as_str(),
        escape_json(target),
        escape_json(message)
    );
    if !fields.is_empty() {
        line.push_str(r#","fields":{"#);
        let rendered: Vec<String> = fields
            .iter()
            .map(|(k, v)| format!(r#""{}":"{}""#, escape_json(k), escape_json(v)))
            .collect();
        line.push_str(&rendered.join(","));
        line.push('}');
    }
    line.push('}');
    eprintln!("{}", line);
}

#[cfg(not(feature = "json"))]
fn escape_json(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out
}

// ============================================================================
// Macros
// ============================================================================

/// Log a trace message.
#[macro_export]
macro_rules! trace {
    (target: $target:expr, $($arg:tt)+) => {
        if $crate::is_level_enabled($crate::Level::Trace) {
            $crate::log($crate::Level::Trace, $target, &format!($($arg)+));
        }
    };
    ($($arg:tt)+) => {
        if $crate::is_level_enabled($crate::Level::Trace) {
            $crate::log($crate::Level::Trace, module_path!(), &format!($($arg)+));
        }
    };
}

/// Log a debug message.
///
/// Enabled by `WAYMARK_DEBUG=1` or `WAYMARK_LOG_LEVEL=debug`.
///
/// ```rust
/// use waymark_log::debug;
///
/// let controllers = 3;
/// debug!("Discovered {} controllers", controllers);
/// debug!(target: "waymark::model", "Applying conventions");
/// ```
#[macro_export]
macro_rules! debug {
    (target: $target:expr, $($arg:tt)+) => {
        if $crate::is_debug_enabled() || $crate::is_level_enabled($crate::Level::Debug) {
            $crate::log($crate::Level::Debug, $target, &format!($($arg)+));
        }
    };
    ($($arg:tt)+) => {
        if $crate::is_debug_enabled() || $crate::is_level_enabled($crate::Level::Debug) {
            $crate::log($crate::Level::Debug, module_path!(), &format!($($arg)+));
        }
    };
}

/// Log an info message.
#[macro_export]
macro_rules! info {
    (target: $target:expr, $($arg:tt)+) => {
        if $crate::is_level_enabled($crate::Level::Info) {
            $crate::log($crate::Level::Info, $target, &format!($($arg)+));
        }
    };
    ($($arg:tt)+) => {
        if $crate::is_level_enabled($crate::Level::Info) {
            $crate::log($crate::Level::Info, module_path!(), &format!($($arg)+));
        }
    };
}

/// Log a warning message.
#[macro_export]
macro_rules! warn {
    (target: $target:expr, $($arg:tt)+) => {
        if $crate::is_level_enabled($crate::Level::Warn) {
            $crate::log($crate::Level::Warn, $target, &format!($($arg)+));
        }
    };
    ($($arg:tt)+) => {
        if $crate::is_level_enabled($crate::Level::Warn) {
            $crate::log($crate::Level::Warn, module_path!(), &format!($($arg)+));
        }
    };
}

/// Log an error message.
#[macro_export]
macro_rules! error {
    (target: $target:expr, $($arg:tt)+) => {
        if $crate::is_level_enabled($crate::Level::Error) {
            $crate::log($crate::Level::Error, $target, &format!($($arg)+));
        }
    };
    ($($arg:tt)+) => {
        if $crate::is_level_enabled($crate::Level::Error) {
            $crate::log($crate::Level::Error, module_path!(), &format!($($arg)+));
        }
    };
}

/// Log a message with structured `key => value` fields.
///
/// Values only need to implement `Display`; they are rendered lazily,
/// after the level check.
#[macro_export]
macro_rules! event {
    ($level:expr, $target:expr, $message:expr $(, $key:literal => $value:expr)* $(,)?) => {
        if ($level == $crate::Level::Debug && $crate::is_debug_enabled())
            || $crate::is_level_enabled($level)
        {
            $crate::log_fields(
                $level,
                $target,
                &$message,
                &[$(($key, ($value).to_string())),*],
            );
        }
    };
}

// ============================================================================
// Tracing Integration
// ============================================================================

#[cfg(feature = "tracing")]
pub mod tracing_compat {
    //! Bridge to `tracing` honouring the `WAYMARK_*` configuration.

    use super::*;

    /// Create a tracing subscriber filtered at the configured level.
    pub fn subscriber() -> impl tracing::Subscriber {
        use tracing_subscriber::prelude::*;
        use tracing_subscriber::{EnvFilter, fmt};

        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(config().level.as_str().to_ascii_lowercase()));

        tracing_subscriber::registry().with(filter).with(fmt::layer())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_ordering() {
        assert!(Level::Trace < Level::Debug);
        assert!(Level::Info < Level::Warn);
        assert!(Level::Error < Level::Off);
    }

    #[test]
    fn test_level_parse() {
        assert_eq!(Level::parse("debug"), Some(Level::Debug));
        assert_eq!(Level::parse(" WARNING "), Some(Level::Warn));
        assert_eq!(Level::parse("none"), Some(Level::Off));
        assert_eq!(Level::parse("loud"), None);
    }

    #[test]
    fn test_format_parse() {
        assert_eq!(Format::parse("Pretty"), Some(Format::Pretty));
        assert_eq!(Format::parse("json"), Some(Format::Json));
        assert_eq!(Format::parse("xml"), None);
    }

    #[test]
    fn test_off_is_never_enabled() {
        assert!(!is_level_enabled(Level::Off));
    }

    #[test]
    fn test_set_level_roundtrip() {
        let original = current_level();

        set_level(Level::Error);
        assert_eq!(current_level(), Level::Error);
        assert!(!is_level_enabled(Level::Warn));

        set_level(original);
    }

    #[cfg(feature = "json")]
    #[test]
    fn test_render_json_includes_fields() {
        let line = render_json(
            Level::Debug,
            "waymark::test",
            "built",
            &[("count", "3".to_string())],
        );
        let value: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["level"], "DEBUG");
        assert_eq!(value["fields"]["count"], "3");
    }

    #[test]
    fn test_macros_compile() {
        trace!("trace message");
        debug!(target: "test", "debug {}", 1);
        info!("info message");
        warn!(target: "test", "warn message");
        error!("error message");
        event!(Level::Debug, "test", "structured", "key" => "value", "n" => 2);
    }
}
