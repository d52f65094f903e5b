//! Types for working with errors produced by the type registry.

use std::error::Error as StdError;
use std::result::Result as StdResult;

use crate::ext::ustr::UStr;
use crate::oid::Oid;

/// A specialized `Result` type for the type registry.
pub type Result<T, E = Error> = StdResult<T, E>;

// Convenience type alias for usage within the registry and by codec implementors.
#[allow(missing_docs)]
pub type BoxDynError = Box<dyn StdError + 'static + Send + Sync>;

/// Represents all the ways resolving a type can fail.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// No `pg_type` row is known for the requested type.
    ///
    /// This usually means the catalog data is stale or was never ingested.
    #[error("no catalog row for type with oid {0}")]
    UnknownTypeId(Oid),

    /// The `typtype` of a catalog row is not one of the kinds understood by the registry.
    ///
    /// The type is left unresolved; ingesting a corrected row makes it resolvable again.
    #[error("unknown discriminator {typtype:?} (`typtype`) for type {name:?} with oid {oid}")]
    UnknownDiscriminator {
        /// The type with the unsupported row.
        oid: Oid,
        /// `typname` of the row.
        name: UStr,
        /// The unsupported `typtype`.
        typtype: char,
    },

    /// Populating a type from its catalog data failed, most commonly because one of the
    /// types it refers to could not be resolved.
    ///
    /// The type was rolled back and is absent from the registry.
    #[error("failed to populate type {name:?} with oid {oid}: {source}")]
    Population {
        /// The type that was rolled back.
        oid: Oid,
        /// `typname` of the type.
        name: UStr,

        /// What made population fail; often the failure of a dependency.
        #[source]
        source: Box<Error>,
    },

    /// Catalog data that is structurally invalid for the kind of type it describes.
    #[error("encountered invalid catalog data: {0}")]
    Catalog(String),

    /// One or more types failed to resolve after an ingestion batch.
    ///
    /// The rows of the batch were merged regardless; every other type was resolved.
    #[error("{} type(s) failed to resolve after ingesting catalog rows", failures.len())]
    Ingest {
        /// Each failed type with its error, in oid order.
        failures: Vec<(Oid, Error)>,
    },
}

impl Error {
    /// The oid of the type this error is about, if any.
    pub fn oid(&self) -> Option<Oid> {
        match self {
            Error::UnknownTypeId(oid)
            | Error::UnknownDiscriminator { oid, .. }
            | Error::Population { oid, .. } => Some(*oid),
            Error::Catalog(_) | Error::Ingest { .. } => None,
        }
    }

    /// Walks the chain of [`Error::Population`] failures down to the error that started it.
    pub fn root_cause(&self) -> &Error {
        let mut error = self;

        while let Error::Population { source, .. } = error {
            error = source;
        }

        error
    }
}

/// Format an error message as an [`Error::Catalog`].
///
/// ```rust
/// use pgtype_registry::{err_catalog, Error};
///
/// let error = err_catalog!("range {} has no subtype", 3904);
/// assert!(matches!(error, Error::Catalog(_)));
/// ```
#[macro_export]
macro_rules! err_catalog {
    ($expr:expr) => {
        $crate::error::Error::Catalog($expr.into())
    };

    ($fmt:expr, $($arg:tt)*) => {
        $crate::error::Error::Catalog(format!($fmt, $($arg)*))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_cause_unwraps_population_chain() {
        let error = Error::Population {
            oid: Oid(100),
            name: "outer".into(),
            source: Box::new(Error::Population {
                oid: Oid(101),
                name: "inner".into(),
                source: Box::new(Error::UnknownTypeId(Oid(999))),
            }),
        };

        assert_eq!(error.oid(), Some(Oid(100)));
        assert!(matches!(error.root_cause(), Error::UnknownTypeId(Oid(999))));
        assert_eq!(
            error.to_string(),
            "failed to populate type \"outer\" with oid 100: \
             failed to populate type \"inner\" with oid 101: \
             no catalog row for type with oid 999"
        );
    }

    #[test]
    fn catalog_macro_formats() {
        let error = err_catalog!("domain {} has no base type", Oid(7));
        assert_eq!(
            error.to_string(),
            "encountered invalid catalog data: domain 7 has no base type"
        );
    }
}
