//! Minimal kernel-style logging used across every layer of the stack.
//!
//! No external logging facade — each layer runs close enough to the
//! wire that pulling in something like `tracing` would mean threading a
//! subscriber through every worker and dispatcher thread for a handful
//! of `[LEVEL] module: message` lines. The threshold is read once from
//! `RPC_LOG_LEVEL` (falls back to `Info`) and cached; change it by
//! restarting the process.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum LogLevel {
    Off = 0,
    Error = 1,
    Warn = 2,
    Info = 3,
    Debug = 4,
    Trace = 5,
}

impl LogLevel {
    fn from_env_str(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "off" => Some(LogLevel::Off),
            "error" => Some(LogLevel::Error),
            "warn" => Some(LogLevel::Warn),
            "info" => Some(LogLevel::Info),
            "debug" => Some(LogLevel::Debug),
            "trace" => Some(LogLevel::Trace),
            _ => None,
        }
    }
}

static THRESHOLD: AtomicU8 = AtomicU8::new(LogLevel::Info as u8);
static INIT: OnceLock<()> = OnceLock::new();

fn ensure_init() {
    INIT.get_or_init(|| {
        if let Ok(val) = std::env::var("RPC_LOG_LEVEL") {
            if let Some(level) = LogLevel::from_env_str(&val) {
                THRESHOLD.store(level as u8, Ordering::Relaxed);
            }
        }
    });
}

pub fn threshold() -> LogLevel {
    ensure_init();
    match THRESHOLD.load(Ordering::Relaxed) {
        0 => LogLevel::Off,
        1 => LogLevel::Error,
        2 => LogLevel::Warn,
        3 => LogLevel::Info,
        4 => LogLevel::Debug,
        _ => LogLevel::Trace,
    }
}

/// Overrides the threshold programmatically (e.g. a CLI `--log-level`
/// flag), taking precedence over `RPC_LOG_LEVEL` from this point on.
/// Parses the same names `RPC_LOG_LEVEL` accepts; an unrecognized name
/// leaves the threshold unchanged.
pub fn set_threshold_from_str(s: &str) {
    ensure_init();
    if let Some(level) = LogLevel::from_env_str(s) {
        THRESHOLD.store(level as u8, Ordering::Relaxed);
    }
}

pub fn enabled(level: LogLevel) -> bool {
    level <= threshold()
}

#[doc(hidden)]
pub fn log_line(level: LogLevel, target: &str, args: std::fmt::Arguments<'_>) {
    if !enabled(level) {
        return;
    }
    let tag = match level {
        LogLevel::Off => return,
        LogLevel::Error => "ERROR",
        LogLevel::Warn => "WARN",
        LogLevel::Info => "INFO",
        LogLevel::Debug => "DEBUG",
        LogLevel::Trace => "TRACE",
    };
    eprintln!("[{tag}] {target}: {args}");
}

#[macro_export]
macro_rules! kerror {
    ($($arg:tt)*) => {
        $crate::log::log_line($crate::log::LogLevel::Error, module_path!(), format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! kwarn {
    ($($arg:tt)*) => {
        $crate::log::log_line($crate::log::LogLevel::Warn, module_path!(), format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! kinfo {
    ($($arg:tt)*) => {
        $crate::log::log_line($crate::log::LogLevel::Info, module_path!(), format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! kdebug {
    ($($arg:tt)*) => {
        $crate::log::log_line($crate::log::LogLevel::Debug, module_path!(), format_args!($($arg)*))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_threshold_allows_info_and_above() {
        assert!(enabled(LogLevel::Error));
        assert!(enabled(LogLevel::Warn));
        assert!(enabled(LogLevel::Info));
    }

    #[test]
    fn from_env_str_parses_known_levels() {
        assert_eq!(LogLevel::from_env_str("debug"), Some(LogLevel::Debug));
        assert_eq!(LogLevel::from_env_str("bogus"), None);
    }
}
