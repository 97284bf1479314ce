//! Conditional logging macros gated on a module-level `ENABLE_LOGS` flag.
//!
//! Chatty loop modules define the flag and pull the macros from the crate
//! root:
//! ```rust,ignore
//! const ENABLE_LOGS: bool = true;
//!
//! use crate::{log_error, log_info, log_warn};
//!
//! log_info!("logged only while ENABLE_LOGS is true");
//! ```

/// Conditional info logging; requires an `ENABLE_LOGS` const in the
/// calling module.
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::info!($($arg)*);
        }
    };
}

/// Conditional warn logging; requires an `ENABLE_LOGS` const in the
/// calling module.
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::warn!($($arg)*);
        }
    };
}

/// Conditional error logging; requires an `ENABLE_LOGS` const in the
/// calling module.
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::error!($($arg)*);
        }
    };
}
