//! ---
//! ml_section: "03-logging"
//! ml_subsection: "module"
//! ml_type: "source"
//! ml_scope: "code"
//! ml_description: "Structured logging adapters for access-control events."
//! ml_version: "v0.0.0-prealpha"
//! ml_owner: "tbd"
//! ---
#[doc(hidden)]
#[macro_export]
macro_rules! __ml_event {
    ($level:expr, $ctx:expr, $($arg:tt)+) => {{
        let ctx = &$ctx;
        tracing::event!(
            $level,
            user_id = ctx.user_id.unwrap_or(""),
            role = ctx.role.unwrap_or(""),
            route = ctx.route.unwrap_or(""),
            request_id = ctx.request_id.unwrap_or(""),
            message = %format_args!($($arg)+)
        );
    }};
}

/// Emit an informational log enriched with request context.
#[macro_export]
macro_rules! ml_info {
    (context = $ctx:expr, $($arg:tt)+) => {
        $crate::__ml_event!(tracing::Level::INFO, $ctx, $($arg)+)
    };
    ($($arg:tt)+) => {
        $crate::__ml_event!(tracing::Level::INFO, $crate::LogContext::default(), $($arg)+)
    };
}

/// Emit a debug log enriched with request context.
#[macro_export]
macro_rules! ml_debug {
    (context = $ctx:expr, $($arg:tt)+) => {
        $crate::__ml_event!(tracing::Level::DEBUG, $ctx, $($arg)+)
    };
    ($($arg:tt)+) => {
        $crate::__ml_event!(tracing::Level::DEBUG, $crate::LogContext::default(), $($arg)+)
    };
}

/// Emit a warning enriched with request context.
#[macro_export]
macro_rules! ml_warn {
    (context = $ctx:expr, $($arg:tt)+) => {
        $crate::__ml_event!(tracing::Level::WARN, $ctx, $($arg)+)
    };
    ($($arg:tt)+) => {
        $crate::__ml_event!(tracing::Level::WARN, $crate::LogContext::default(), $($arg)+)
    };
}

/// Emit an error log enriched with request context.
#[macro_export]
macro_rules! ml_error {
    (context = $ctx:expr, $($arg:tt)+) => {
        $crate::__ml_event!(tracing::Level::ERROR, $ctx, $($arg)+)
    };
    ($($arg:tt)+) => {
        $crate::__ml_event!(tracing::Level::ERROR, $crate::LogContext::default(), $($arg)+)
    };
}
