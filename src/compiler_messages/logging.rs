//! Feature-gated development logging, one macro per pipeline stage. Each
//! macro compiles to nothing unless its feature is enabled, so a release
//! build pays no cost for instrumentation left in call sites.

#[macro_export]
#[cfg(feature = "show_discovery")]
macro_rules! discovery_log {
    ($($arg:tt)*) => {
        saying::say!($($arg)*);
    };
}

#[macro_export]
#[cfg(not(feature = "show_discovery"))]
macro_rules! discovery_log {
    ($($arg:tt)*) => {};
}

#[macro_export]
#[cfg(feature = "show_bindings")]
macro_rules! bind_log {
    ($($arg:tt)*) => {
        saying::say!($($arg)*);
    };
}

#[macro_export]
#[cfg(not(feature = "show_bindings"))]
macro_rules! bind_log {
    ($($arg:tt)*) => {};
}

#[macro_export]
#[cfg(feature = "show_ir")]
macro_rules! ir_log {
    ($($arg:tt)*) => {
        saying::say!($($arg)*);
    };
}

#[macro_export]
#[cfg(not(feature = "show_ir"))]
macro_rules! ir_log {
    ($($arg:tt)*) => {};
}

#[macro_export]
#[cfg(feature = "show_passes")]
macro_rules! pass_log {
    ($($arg:tt)*) => {
        saying::say!($($arg)*);
    };
}

#[macro_export]
#[cfg(not(feature = "show_passes"))]
macro_rules! pass_log {
    ($($arg:tt)*) => {};
}

#[macro_export]
#[cfg(feature = "show_emit")]
macro_rules! emit_log {
    ($($arg:tt)*) => {
        saying::say!($($arg)*);
    };
}

#[macro_export]
#[cfg(not(feature = "show_emit"))]
macro_rules! emit_log {
    ($($arg:tt)*) => {};
}

#[macro_export]
#[cfg(feature = "detailed_timers")]
macro_rules! timer_log {
    ($time:expr, $msg:expr) => {
        saying::say!($msg, Green #$time.elapsed());
    };
}

#[macro_export]
#[cfg(not(feature = "detailed_timers"))]
macro_rules! timer_log {
    ($time:expr, $msg:expr) => {};
}
