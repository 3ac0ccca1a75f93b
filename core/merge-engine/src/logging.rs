//! FILENAME: core/merge-engine/src/logging.rs
// PURPOSE: Unified log lines for the merge engine.

use std::io::Write;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use once_cell::sync::Lazy;

// ============================================================================
// UNIFIED LOGGING
// ============================================================================

/// Global sequence counter, shared by every log line of the process
static LOG_SEQ: AtomicU64 = AtomicU64::new(0);

/// Optional extra destination for log lines (a file, a test buffer, ...)
static LOG_SINK: Lazy<Mutex<Option<Box<dyn Write + Send>>>> = Lazy::new(|| Mutex::new(None));

/// Get next sequence number
pub fn next_seq() -> u64 {
    LOG_SEQ.fetch_add(1, Ordering::SeqCst) + 1
}

/// Install a sink that receives every log line. Returns the previous sink.
pub fn set_log_sink(sink: Box<dyn Write + Send>) -> Option<Box<dyn Write + Send>> {
    match LOG_SINK.lock() {
        Ok(mut guard) => guard.replace(sink),
        Err(_) => None,
    }
}

/// Remove the installed sink, if any.
pub fn clear_log_sink() -> Option<Box<dyn Write + Send>> {
    match LOG_SINK.lock() {
        Ok(mut guard) => guard.take(),
        Err(_) => None,
    }
}

/// Format a log line in unified format: `seq|level|category|message`
pub fn format_line(seq: u64, level: &str, category: &str, message: &str) -> String {
    format!("{}|{}|{}|{}", seq, level, category, message)
}

fn to_log_level(level: &str) -> log::Level {
    match level {
        "E" => log::Level::Error,
        "W" => log::Level::Warn,
        "I" => log::Level::Info,
        "T" => log::Level::Trace,
        _ => log::Level::Debug,
    }
}

/// True if a line at `level` would reach the sink or the `log` facade.
/// The macros check this before formatting their message.
pub fn is_enabled(level: &str) -> bool {
    let has_sink = LOG_SINK.lock().map(|g| g.is_some()).unwrap_or(false);
    has_sink || log::log_enabled!(target: "merge_engine", to_log_level(level))
}

/// Write a log line in unified format
pub fn write_log(level: &str, category: &str, message: &str) {
    if !is_enabled(level) {
        return;
    }
    let log_level = to_log_level(level);

    let line = format_line(next_seq(), level, category, message);

    if let Ok(mut guard) = LOG_SINK.lock() {
        if let Some(ref mut sink) = *guard {
            if writeln!(sink, "{}", line).is_ok() {
                let _ = sink.flush();
            }
        }
    }

    log::log!(target: "merge_engine", log_level, "{}", line);
}

/// Write an ENTER log line for function entry
pub fn write_log_enter(level: &str, category: &str, func_name: &str, params: &str) {
    let message = if params.is_empty() {
        format!("ENTER {}", func_name)
    } else {
        format!("ENTER {} {}", func_name, params)
    };
    write_log(level, category, &message);
}

/// Write an EXIT log line for function exit
pub fn write_log_exit(level: &str, category: &str, func_name: &str, result: &str) {
    let message = if result.is_empty() {
        format!("EXIT {}", func_name)
    } else {
        format!("EXIT {} {}", func_name, result)
    };
    write_log(level, category, &message);
}

// ============================================================================
// MACROS
// ============================================================================

#[macro_export]
macro_rules! log_debug {
    ($cat:expr, $($arg:tt)*) => {
        if $crate::logging::is_enabled("D") {
            $crate::logging::write_log("D", $cat, &format!($($arg)*))
        }
    };
}

#[macro_export]
macro_rules! log_info {
    ($cat:expr, $($arg:tt)*) => {
        if $crate::logging::is_enabled("I") {
            $crate::logging::write_log("I", $cat, &format!($($arg)*))
        }
    };
}

#[macro_export]
macro_rules! log_warn {
    ($cat:expr, $($arg:tt)*) => {
        if $crate::logging::is_enabled("W") {
            $crate::logging::write_log("W", $cat, &format!($($arg)*))
        }
    };
}

#[macro_export]
macro_rules! log_enter {
    ($cat:expr, $func:expr) => {
        if $crate::logging::is_enabled("D") {
            $crate::logging::write_log_enter("D", $cat, $func, "")
        }
    };
    ($cat:expr, $func:expr, $($arg:tt)*) => {
        if $crate::logging::is_enabled("D") {
            $crate::logging::write_log_enter("D", $cat, $func, &format!($($arg)*))
        }
    };
}

#[macro_export]
macro_rules! log_exit {
    ($cat:expr, $func:expr) => {
        if $crate::logging::is_enabled("D") {
            $crate::logging::write_log_exit("D", $cat, $func, "")
        }
    };
    ($cat:expr, $func:expr, $($arg:tt)*) => {
        if $crate::logging::is_enabled("D") {
            $crate::logging::write_log_exit("D", $cat, $func, &format!($($arg)*))
        }
    };
}

pub use log_debug;
pub use log_info;
pub use log_warn;
pub use log_enter;
pub use log_exit;
