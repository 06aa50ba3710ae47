//! Console logging.
//!
//! In the browser the macros print through zoon (`console.log` / `console.error`),
//! natively (unit tests) they go to stdout/stderr.

/// Whether `log_debug!` output is enabled.
pub const VERBOSE: bool = cfg!(feature = "verbose-logging");

#[doc(hidden)]
pub fn write_line(message: std::fmt::Arguments<'_>) {
    #[cfg(target_arch = "wasm32")]
    zoon::println!("{}", message);
    #[cfg(not(target_arch = "wasm32"))]
    std::println!("{}", message);
}

#[doc(hidden)]
pub fn write_error_line(message: std::fmt::Arguments<'_>) {
    #[cfg(target_arch = "wasm32")]
    zoon::eprintln!("{}", message);
    #[cfg(not(target_arch = "wasm32"))]
    std::eprintln!("{}", message);
}

#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        $crate::log::write_line(format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        $crate::log::write_error_line(format_args!($($arg)*))
    };
}

/// Per-event tracing, compiled in only with the `verbose-logging` feature.
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        if $crate::log::VERBOSE {
            $crate::log::write_line(format_args!($($arg)*))
        }
    };
}
