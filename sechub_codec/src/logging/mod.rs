//! Logging for the codec layer
//!
//! Thin macro layer over the `log` facade. Messages carry an optional
//! [`Code`] and `"key" => value` context pairs rendered as `key=value`.
//! The binary decides where records go; the library never installs a logger.

pub mod codes;

pub use codes::{Code, ErrorMetadata, Severity};

#[doc(hidden)]
pub use log;

/// Render context pairs as `key=value` separated by spaces
pub fn format_context(context: &[(&str, String)]) -> String {
    context
        .iter()
        .map(|(key, value)| format!("{}={}", key, value))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Log an error with a code, accepts Display types for context values
#[macro_export]
macro_rules! codec_error {
    ($code:expr, $message:expr) => {
        $crate::logging::log::error!("[{}] {}", $code, $message)
    };

    ($code:expr, $message:expr, $($key:expr => $value:expr),+) => {
        {
            let context: Vec<(&str, String)> = vec![$(($key, format!("{}", $value))),+];
            $crate::logging::log::error!(
                "[{}] {} {}",
                $code,
                $message,
                $crate::logging::format_context(&context)
            )
        }
    };
}

/// Log a warning, optionally tagged with a code
#[macro_export]
macro_rules! codec_warn {
    (code = $code:expr, $message:expr, $($key:expr => $value:expr),+) => {
        {
            let context: Vec<(&str, String)> = vec![$(($key, format!("{}", $value))),+];
            $crate::logging::log::warn!(
                "[{}] {} {}",
                $code,
                $message,
                $crate::logging::format_context(&context)
            )
        }
    };

    ($message:expr) => {
        $crate::logging::log::warn!("{}", $message)
    };

    ($message:expr, $($key:expr => $value:expr),+) => {
        {
            let context: Vec<(&str, String)> = vec![$(($key, format!("{}", $value))),+];
            $crate::logging::log::warn!("{} {}", $message, $crate::logging::format_context(&context))
        }
    };
}

/// Log a debug message with context
#[macro_export]
macro_rules! codec_debug {
    ($message:expr) => {
        $crate::logging::log::debug!("{}", $message)
    };

    ($message:expr, $($key:expr => $value:expr),+) => {
        {
            let context: Vec<(&str, String)> = vec![$(($key, format!("{}", $value))),+];
            $crate::logging::log::debug!("{} {}", $message, $crate::logging::format_context(&context))
        }
    };
}
