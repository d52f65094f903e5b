// Yes these look silly. `tracing` doesn't currently support dynamic levels
// https://github.com/tokio-rs/tracing/issues/372
#[doc(hidden)]
#[macro_export]
macro_rules! private_tracing_dynamic_event {
    (target: $target:expr, $level:expr, $($args:tt)*) => {{
        use ::tracing::Level;

        match $level {
            Level::ERROR => ::tracing::event!(target: $target, Level::ERROR, $($args)*),
            Level::WARN => ::tracing::event!(target: $target, Level::WARN, $($args)*),
            Level::INFO => ::tracing::event!(target: $target, Level::INFO, $($args)*),
            Level::DEBUG => ::tracing::event!(target: $target, Level::DEBUG, $($args)*),
            Level::TRACE => ::tracing::event!(target: $target, Level::TRACE, $($args)*),
        }
    }};
}

/// Emit an event at a level chosen at runtime from a [`log::LevelFilter`].
///
/// Nothing is emitted for `LevelFilter::Off`.
macro_rules! registry_event {
    (target: $target:expr, $filter:expr, $($args:tt)*) => {{
        if let Some(level) = $crate::logger::level_filter_to_trace_level($filter) {
            $crate::private_tracing_dynamic_event!(target: $target, level, $($args)*);
        }
    }};
}

pub(crate) fn level_filter_to_trace_level(filter: log::LevelFilter) -> Option<tracing::Level> {
    match filter {
        log::LevelFilter::Error => Some(tracing::Level::ERROR),
        log::LevelFilter::Warn => Some(tracing::Level::WARN),
        log::LevelFilter::Info => Some(tracing::Level::INFO),
        log::LevelFilter::Debug => Some(tracing::Level::DEBUG),
        log::LevelFilter::Trace => Some(tracing::Level::TRACE),
        log::LevelFilter::Off => None,
    }
}

#[cfg(test)]
mod tests {
    use super::level_filter_to_trace_level;

    #[test]
    fn off_disables_events() {
        assert_eq!(level_filter_to_trace_level(log::LevelFilter::Off), None);
        assert_eq!(
            level_filter_to_trace_level(log::LevelFilter::Warn),
            Some(tracing::Level::WARN)
        );
    }
}
