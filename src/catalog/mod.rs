//! Local copy of the raw `pg_catalog` rows the registry resolves types from.

use std::sync::Arc;

use crate::oid::Oid;
use crate::{HashMap, HashSet, UStr};

mod rows;

pub use rows::{CatalogBatch, PgAttributeRow, PgProcRow, PgTypeRow};

/// Catalog rows ingested so far.
///
/// The store only grows: rows are merged into it, never deleted. A row for an oid that is
/// already known replaces the previous one. Attribute rows are grouped by their owning
/// relation and, within a relation, keyed by ordinal; their order of arrival is irrelevant.
#[derive(Debug, Clone, Default)]
pub struct CatalogRowStore {
    types: HashMap<Oid, Arc<PgTypeRow>>,
    // attrelid -> attnum -> row
    attributes: HashMap<Oid, HashMap<i16, PgAttributeRow>>,
    procs: HashMap<Oid, UStr>,
}

impl CatalogRowStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge type rows, returning the oids of the merged rows.
    pub(crate) fn merge_types(&mut self, rows: impl IntoIterator<Item = PgTypeRow>) -> Vec<Oid> {
        rows.into_iter()
            .map(|row| {
                let oid = row.oid;
                self.types.insert(oid, Arc::new(row));
                oid
            })
            .collect()
    }

    /// Merge attribute rows, returning the relations that received at least one row.
    ///
    /// Rows may reference relations no type row owns (yet, or ever).
    pub(crate) fn merge_attributes(
        &mut self,
        rows: impl IntoIterator<Item = PgAttributeRow>,
    ) -> HashSet<Oid> {
        let mut touched = HashSet::new();

        for row in rows {
            touched.insert(row.relation);
            self.attributes
                .entry(row.relation)
                .or_default()
                .insert(row.ordinal, row);
        }

        touched
    }

    /// Merge procedure rows.
    pub(crate) fn merge_procs(&mut self, rows: impl IntoIterator<Item = PgProcRow>) -> usize {
        let mut merged = 0;

        for row in rows {
            self.procs.insert(row.oid, row.name);
            merged += 1;
        }

        merged
    }

    /// The `pg_type` row for `oid`.
    pub fn type_row(&self, oid: Oid) -> Option<&Arc<PgTypeRow>> {
        self.types.get(&oid)
    }

    /// Every type oid with a row, in ascending order.
    pub fn type_oids(&self) -> Vec<Oid> {
        let mut oids: Vec<Oid> = self.types.keys().copied().collect();
        oids.sort_unstable();
        oids
    }

    /// The fields of the composite type owning `relation`, ordered by ordinal position.
    ///
    /// Dropped attributes and system columns are skipped.
    pub fn fields(&self, relation: Oid) -> Vec<&PgAttributeRow> {
        let mut fields: Vec<&PgAttributeRow> = self
            .attributes
            .get(&relation)
            .into_iter()
            .flat_map(|rows| rows.values())
            .filter(|row| row.is_field())
            .collect();

        fields.sort_unstable_by_key(|row| row.ordinal);
        fields
    }

    /// The name of the procedure `oid`.
    pub fn proc_name(&self, oid: Oid) -> Option<&UStr> {
        self.procs.get(&oid)
    }

    /// Type oids whose row owns one of `relations`.
    pub(crate) fn owners_of<'a>(
        &'a self,
        relations: &'a HashSet<Oid>,
    ) -> impl Iterator<Item = Oid> + 'a {
        self.types
            .values()
            .filter(move |row| !row.relation.is_none() && relations.contains(&row.relation))
            .map(|row| row.oid)
    }

    /// Number of type rows.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Returns `true` if no type row was ingested.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
