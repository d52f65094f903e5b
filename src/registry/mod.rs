//! The type registry: a cache of resolved types built on demand from catalog rows.

use std::fmt::{self, Debug, Formatter};
use std::sync::Arc;

use crate::builtin::PgBootstrapType;
use crate::catalog::{CatalogBatch, CatalogRowStore, PgAttributeRow, PgProcRow, PgTypeRow};
use crate::codec::{CodecDirection, CodecLookup, PgCodec, PgCodecPair, PgValueFormat};
use crate::error::{Error, Result};
use crate::oid::Oid;
use crate::options::PgTypeRegistryOptions;
use crate::type_info::PgType;
use crate::{HashMap, HashSet};

mod live;
mod populate;
mod resolve;

pub use live::PgLiveType;

use resolve::Scratch;

/// Resolves Postgres types from the rows of the system catalog.
///
/// A registry is meant to be owned by a single connection. It starts out knowing only a
/// few primitive types (see [`PgBootstrapType`]); every other type is resolved from the
/// rows handed to [`ingest`](Self::ingest), recursively, the first time it is looked up
/// (or right away, see [`PgTypeRegistryOptions::resolve_on_ingest`]).
///
/// Resolved types are shared: looking up the same oid twice, or reaching a type through
/// the field of a composite or the element of an array, always yields the same
/// [`Arc<PgType>`].
pub struct PgTypeRegistry {
    options: PgTypeRegistryOptions,
    codecs: Arc<dyn CodecLookup>,
    catalog: CatalogRowStore,
    // fully populated types, bootstrap types included
    cache: HashMap<Oid, Arc<PgType>>,
    scratch: Scratch,
}

impl PgTypeRegistry {
    /// Create a registry resolving codecs with `codecs`, using the default options.
    pub fn new(codecs: impl CodecLookup) -> Self {
        Self::with_options(codecs, PgTypeRegistryOptions::default())
    }

    /// Create a registry resolving codecs with `codecs`.
    pub fn with_options(codecs: impl CodecLookup, options: PgTypeRegistryOptions) -> Self {
        Self::with_shared_codecs(Arc::new(codecs), options)
    }

    /// Create a registry with a codec lookup shared with other registries.
    pub fn with_shared_codecs(
        codecs: Arc<dyn CodecLookup>,
        options: PgTypeRegistryOptions,
    ) -> Self {
        let mut registry = Self {
            options,
            codecs,
            catalog: CatalogRowStore::new(),
            cache: HashMap::new(),
            scratch: Scratch::default(),
        };

        for bootstrap in PgBootstrapType::iter() {
            let [input, output, receive, send] = bootstrap.procs();

            let binary = PgCodecPair {
                decoder: registry.find_named_codec(
                    send,
                    CodecDirection::Decode,
                    PgValueFormat::Binary,
                ),
                encoder: registry.find_named_codec(
                    receive,
                    CodecDirection::Encode,
                    PgValueFormat::Binary,
                ),
            };

            let text = PgCodecPair {
                decoder: registry.find_named_codec(
                    output,
                    CodecDirection::Decode,
                    PgValueFormat::Text,
                ),
                encoder: registry.find_named_codec(
                    input,
                    CodecDirection::Encode,
                    PgValueFormat::Text,
                ),
            };

            registry
                .cache
                .insert(bootstrap.oid(), Arc::new(bootstrap.to_type(binary, text)));
        }

        tracing::debug!(
            target: "pgtype_registry::registry",
            types = registry.cache.len(),
            "bootstrapped type registry"
        );

        registry
    }

    /// Returns the type with the given oid, resolving it (and everything it depends on)
    /// if it is not cached yet.
    ///
    /// An oid of `0` is the catalog's "no type" marker and yields `Ok(None)`.
    ///
    /// # Errors
    /// * [`Error::UnknownTypeId`] if no catalog row exists for `oid`.
    /// * [`Error::UnknownDiscriminator`] if the row has an unsupported `typtype`.
    /// * [`Error::Population`] if the type or one of its dependencies failed to resolve.
    ///
    /// A failed type is left unresolved, and so is every type that was resolved alongside
    /// it and depends on it. Nothing else in the registry is affected.
    pub fn lookup(&mut self, oid: Oid) -> Result<Option<Arc<PgType>>> {
        if oid.is_none() {
            tracing::debug!(target: "pgtype_registry::registry", "lookup of type oid 0");
            return Ok(None);
        }

        if let Some(ty) = self.cache.get(&oid) {
            return Ok(Some(ty.clone()));
        }

        let resolved = self.visit(oid);
        debug_assert!(self.scratch.is_empty());
        self.scratch.clear();

        match resolved {
            Ok(ty) => Ok(Some(ty)),
            Err(error) => {
                if !matches!(error, Error::UnknownDiscriminator { .. }) {
                    registry_event!(
                        target: "pgtype_registry::registry",
                        self.options.log_settings.resolve_failures,
                        %oid,
                        %error,
                        "failed to resolve type"
                    );
                }

                Err(error)
            }
        }
    }

    /// Returns the type with the given oid if it is already resolved.
    ///
    /// Never triggers resolution.
    pub fn get(&self, oid: Oid) -> Option<PgLiveType<'_>> {
        self.cache.get(&oid).map(|ty| PgLiveType::new(self, ty))
    }

    /// Merge catalog rows into the registry.
    ///
    /// Cached types described by the new rows are evicted, along with every cached type
    /// that depends on them. Rows for bootstrap oids are stored, but bootstrap types are
    /// never replaced. Unless disabled with
    /// [`PgTypeRegistryOptions::resolve_on_ingest`], every known type is then resolved.
    ///
    /// # Errors
    /// [`Error::Ingest`] with every type that failed to resolve. The rows are merged
    /// regardless and every other type is resolved.
    pub fn ingest(
        &mut self,
        types: impl IntoIterator<Item = PgTypeRow>,
        attributes: impl IntoIterator<Item = PgAttributeRow>,
        procs: impl IntoIterator<Item = PgProcRow>,
    ) -> Result<()> {
        let procs = self.catalog.merge_procs(procs);
        let relations = self.catalog.merge_attributes(attributes);
        let types = self.catalog.merge_types(types);

        // bootstrap rows are kept in the store but never replace the bootstrap types
        for oid in types.iter().filter(|oid| PgBootstrapType::try_from_oid(**oid).is_some()) {
            tracing::debug!(
                target: "pgtype_registry::registry",
                %oid,
                "keeping bootstrap type over its catalog row"
            );
        }

        tracing::debug!(
            target: "pgtype_registry::registry",
            types = types.len(),
            relations = relations.len(),
            procs,
            "ingested catalog rows"
        );

        let mut stale: HashSet<Oid> = types.into_iter().collect();
        stale.extend(self.catalog.owners_of(&relations));
        self.evict(stale);

        if self.options.resolve_on_ingest {
            self.resolve_all()
        } else {
            Ok(())
        }
    }

    /// [`ingest`](Self::ingest) a whole [`CatalogBatch`].
    pub fn ingest_batch(&mut self, batch: CatalogBatch) -> Result<()> {
        let CatalogBatch {
            types,
            attributes,
            procs,
        } = batch;

        self.ingest(types, attributes, procs)
    }

    /// The binary codecs for values read with the `send` procedure `decode_proc` and written
    /// for the `receive` procedure `encode_proc`.
    ///
    /// Absent halves are `None`: either the procedure is unknown to the catalog or the codec
    /// lookup has nothing registered under its name.
    pub fn resolve_binary_codec(&self, decode_proc: Oid, encode_proc: Oid) -> PgCodecPair {
        PgCodecPair {
            decoder: self.find_codec(decode_proc, CodecDirection::Decode, PgValueFormat::Binary),
            encoder: self.find_codec(encode_proc, CodecDirection::Encode, PgValueFormat::Binary),
        }
    }

    /// The text codecs for values read with the `output` procedure `decode_proc` and written
    /// for the `input` procedure `encode_proc`.
    pub fn resolve_text_codec(&self, decode_proc: Oid, encode_proc: Oid) -> PgCodecPair {
        PgCodecPair {
            decoder: self.find_codec(decode_proc, CodecDirection::Decode, PgValueFormat::Text),
            encoder: self.find_codec(encode_proc, CodecDirection::Encode, PgValueFormat::Text),
        }
    }

    /// Number of resolved types, bootstrap types included.
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// Always `false`: bootstrap types are resolved at construction.
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// Returns `true` if the type with the given oid is resolved.
    pub fn contains(&self, oid: Oid) -> bool {
        self.cache.contains_key(&oid)
    }

    /// Forget every resolved type except the bootstrap types.
    ///
    /// Catalog rows are kept; types are resolved again on their next lookup.
    pub fn clear(&mut self) {
        self.cache
            .retain(|oid, _| PgBootstrapType::try_from_oid(*oid).is_some());
    }

    /// The catalog rows ingested so far.
    pub fn catalog(&self) -> &CatalogRowStore {
        &self.catalog
    }

    fn resolve_all(&mut self) -> Result<()> {
        let mut failures = Vec::new();

        for oid in self.catalog.type_oids() {
            if self.cache.contains_key(&oid) {
                continue;
            }

            if let Err(error) = self.lookup(oid) {
                failures.push((oid, error));
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(Error::Ingest { failures })
        }
    }

    /// Remove `oids` from the cache, then every cached type depending on a removed type
    /// until none is left.
    fn evict(&mut self, oids: HashSet<Oid>) {
        let mut stale: HashSet<Oid> = oids
            .into_iter()
            .filter(|oid| PgBootstrapType::try_from_oid(*oid).is_none())
            .filter(|oid| self.cache.remove(oid).is_some())
            .collect();

        let mut evicted = 0;

        while !stale.is_empty() {
            evicted += stale.len();

            let dependents: HashSet<Oid> = self
                .cache
                .values()
                .filter(|ty| ty.type_dependencies().any(|dep| stale.contains(dep)))
                .map(|ty| ty.oid())
                .collect();

            for oid in &dependents {
                self.cache.remove(oid);
            }

            stale = dependents;
        }

        if evicted > 0 {
            tracing::debug!(
                target: "pgtype_registry::registry",
                evicted,
                "evicted stale types"
            );
        }
    }

    fn find_codec(
        &self,
        proc_oid: Oid,
        direction: CodecDirection,
        format: PgValueFormat,
    ) -> Option<PgCodec> {
        if proc_oid.is_none() {
            return None;
        }

        let Some(name) = self.catalog.proc_name(proc_oid) else {
            registry_event!(
                target: "pgtype_registry::codec",
                self.options.log_settings.missing_codecs,
                procedure = %proc_oid,
                "procedure is not in the catalog"
            );

            return None;
        };

        self.find_named_codec(name, direction, format)
    }

    fn find_named_codec(
        &self,
        proc_name: &str,
        direction: CodecDirection,
        format: PgValueFormat,
    ) -> Option<PgCodec> {
        let codec = self.codecs.find(proc_name, direction, format);

        if codec.is_none() {
            registry_event!(
                target: "pgtype_registry::codec",
                self.options.log_settings.missing_codecs,
                procedure = proc_name,
                ?direction,
                ?format,
                "no codec for procedure"
            );
        }

        codec
    }
}

impl Debug for PgTypeRegistry {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("PgTypeRegistry")
            .field("options", &self.options)
            .field("catalog_types", &self.catalog.len())
            .field("resolved_types", &self.cache.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::CodecTable;
    use crate::type_info::PgTypeKind;

    fn row(oid: u32, name: &'static str, typtype: char) -> PgTypeRow {
        PgTypeRow {
            oid: Oid(oid),
            name: name.into(),
            typtype,
            ..PgTypeRow::default()
        }
    }

    #[test]
    fn zero_oid_is_not_a_type() {
        let mut registry = PgTypeRegistry::new(CodecTable::new());
        assert!(registry.lookup(Oid(0)).unwrap().is_none());
        assert!(matches!(
            registry.lookup(Oid(4242)),
            Err(Error::UnknownTypeId(Oid(4242)))
        ));
    }

    #[test]
    fn self_referencing_composite() {
        let mut registry = PgTypeRegistry::with_options(
            CodecTable::new(),
            PgTypeRegistryOptions::new().resolve_on_ingest(false),
        );

        registry
            .ingest(
                [
                    PgTypeRow {
                        relation: Oid(100),
                        array: Oid(101),
                        ..row(100, "node", 'c')
                    },
                    PgTypeRow {
                        element: Oid(100),
                        ..row(101, "_node", 'b')
                    },
                ],
                [
                    PgAttributeRow::new(Oid(100), "value", Oid(23), 1),
                    PgAttributeRow::new(Oid(100), "children", Oid(101), 2),
                ],
                [],
            )
            .unwrap();

        assert!(!registry.contains(Oid(100)));

        let node = registry.lookup(Oid(100)).unwrap().unwrap();
        let nodes = registry.lookup(Oid(101)).unwrap().unwrap();

        assert_eq!(nodes.kind(), &PgTypeKind::Array(Oid(100)));
        assert!(Arc::ptr_eq(
            registry.get(Oid(100)).unwrap().as_arc(),
            &node
        ));
        assert!(registry.scratch.is_empty());
    }

    #[test]
    fn bootstrap_rows_are_stored_but_not_resolved() {
        let mut registry = PgTypeRegistry::new(CodecTable::new());
        let before = registry.lookup(Oid(23)).unwrap().unwrap();

        registry
            .ingest([row(23, "not_int4", 'e')], [], [])
            .unwrap();

        let after = registry.lookup(Oid(23)).unwrap().unwrap();
        assert!(Arc::ptr_eq(&before, &after));
        assert_eq!(after.name(), "int4");

        let stored = registry.catalog().type_row(Oid(23)).map(|row| row.name.clone());
        assert_eq!(stored.as_deref(), Some("not_int4"));
    }

    #[test]
    fn clear_keeps_bootstrap_types() {
        let mut registry = PgTypeRegistry::new(CodecTable::new());
        registry.ingest([row(600, "point", 'b')], [], []).unwrap();
        assert_eq!(registry.len(), PgBootstrapType::iter().count() + 1);

        registry.clear();
        assert_eq!(registry.len(), PgBootstrapType::iter().count());
        assert!(!registry.contains(Oid(600)));

        assert!(registry.lookup(Oid(600)).unwrap().is_some());
    }
}
