//! Logging macros gated by a per-module switch.
//!
//! A module opts in by declaring `const ENABLE_LOGS: bool = true;` and importing the
//! macros from the crate root (`use crate::{log_info, log_warn};`). Setting the flag to
//! `false` silences that module without touching `RUST_LOG`.

#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::info!($($arg)*);
        }
    };
}

#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::warn!($($arg)*);
        }
    };
}

/// Same as [`log_warn!`] at error level.
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::error!($($arg)*);
        }
    };
}
