//! Options for configuring a [`PgTypeRegistry`](crate::PgTypeRegistry).

use log::LevelFilter;

/// Options and flags which can be used to configure a
/// [`PgTypeRegistry`](crate::PgTypeRegistry).
///
/// ```rust
/// use log::LevelFilter;
/// use pgtype_registry::{CodecTable, PgTypeRegistry, PgTypeRegistryOptions};
///
/// let options = PgTypeRegistryOptions::new()
///     .resolve_on_ingest(false)
///     .log_resolve_failures(LevelFilter::Error)
///     .log_missing_codecs(LevelFilter::Off);
///
/// let registry = PgTypeRegistry::with_options(CodecTable::new(), options);
/// ```
#[derive(Debug, Clone)]
pub struct PgTypeRegistryOptions {
    pub(crate) resolve_on_ingest: bool,
    pub(crate) log_settings: LogSettings,
}

#[derive(Debug, Clone)]
pub(crate) struct LogSettings {
    pub(crate) resolve_failures: LevelFilter,
    pub(crate) unknown_discriminators: LevelFilter,
    pub(crate) missing_codecs: LevelFilter,
}

impl Default for LogSettings {
    fn default() -> Self {
        LogSettings {
            resolve_failures: LevelFilter::Warn,
            unknown_discriminators: LevelFilter::Warn,
            missing_codecs: LevelFilter::Trace,
        }
    }
}

impl Default for PgTypeRegistryOptions {
    fn default() -> Self {
        Self {
            resolve_on_ingest: true,
            log_settings: LogSettings::default(),
        }
    }
}

impl PgTypeRegistryOptions {
    /// Creates the default set of options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether every known type is resolved right after catalog rows are ingested.
    ///
    /// When disabled, types are only resolved on their first
    /// [`lookup`](crate::PgTypeRegistry::lookup).
    ///
    /// The default behavior is to resolve eagerly.
    pub fn resolve_on_ingest(mut self, resolve: bool) -> Self {
        self.resolve_on_ingest = resolve;
        self
    }

    /// Sets the level at which failures to resolve a type are logged.
    ///
    /// Defaults to `Warn`.
    pub fn log_resolve_failures(mut self, level: LevelFilter) -> Self {
        self.log_settings.resolve_failures = level;
        self
    }

    /// Sets the level at which catalog rows with an unknown `typtype` are logged.
    ///
    /// Defaults to `Warn`.
    pub fn log_unknown_discriminators(mut self, level: LevelFilter) -> Self {
        self.log_settings.unknown_discriminators = level;
        self
    }

    /// Sets the level at which procedures without a matching codec are logged.
    ///
    /// Defaults to `Trace`: a missing codec only means a format is unsupported for a type.
    pub fn log_missing_codecs(mut self, level: LevelFilter) -> Self {
        self.log_settings.missing_codecs = level;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_overrides_defaults() {
        let options = PgTypeRegistryOptions::new();
        assert!(options.resolve_on_ingest);
        assert_eq!(options.log_settings.missing_codecs, LevelFilter::Trace);

        let options = options
            .resolve_on_ingest(false)
            .log_unknown_discriminators(LevelFilter::Off);
        assert!(!options.resolve_on_ingest);
        assert_eq!(options.log_settings.unknown_discriminators, LevelFilter::Off);
        assert_eq!(options.log_settings.resolve_failures, LevelFilter::Warn);
    }
}
