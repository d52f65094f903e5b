//! Recursive resolution with cycle breaking.
//!
//! A type is registered in the scratch area *before* it is populated, so a recursive
//! lookup that reaches it again (a composite containing an array of itself, two composites
//! referencing each other, ...) returns a marker instead of recursing forever.
//!
//! Every frame on the resolution stack tracks the lowest stack depth it reached through
//! such markers. A populated type that reached an ancestor still on the stack cannot be
//! published yet: it is deferred and committed together with that ancestor. A type that
//! reached nothing below its own depth is self-contained and committed immediately.

use std::sync::Arc;

use crate::catalog::PgTypeRow;
use crate::codec::PgCodecPair;
use crate::error::{Error, Result};
use crate::oid::Oid;
use crate::type_info::{PgType, TypType};
use crate::HashMap;

use super::PgTypeRegistry;

/// A type another type refers to while it is being populated.
#[derive(Debug, Clone)]
pub(super) enum Dependency {
    /// Fully populated, either visible or waiting on an ancestor.
    Ready(Arc<PgType>),
    /// Still on the resolution stack; only its catalog row is available.
    InProgress(Arc<PgTypeRow>),
}

impl Dependency {
    pub(super) fn delimiter(&self) -> char {
        match self {
            Dependency::Ready(ty) => ty.delimiter(),
            Dependency::InProgress(row) => row.delimiter,
        }
    }
}

/// How the catalog row of a type is turned into a [`PgType`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(super) enum Variant {
    Array,
    Other(TypType),
}

#[derive(Debug, Default)]
pub(super) struct Scratch {
    // oid -> (depth, row)
    in_progress: HashMap<Oid, (usize, Arc<PgTypeRow>)>,
    // lowest depth reached by each frame, indexed by depth
    low: Vec<usize>,
    // oid -> (type, lowest depth it reached)
    deferred: HashMap<Oid, (Arc<PgType>, usize)>,
}

impl Scratch {
    fn push(&mut self, row: Arc<PgTypeRow>) -> usize {
        let depth = self.low.len();
        self.low.push(depth);
        self.in_progress.insert(row.oid, (depth, row));
        depth
    }

    fn pop(&mut self, oid: Oid) -> usize {
        self.in_progress.remove(&oid);
        self.low.pop().unwrap_or_default()
    }

    fn lower(&mut self, depth: usize) {
        if let Some(low) = self.low.last_mut() {
            *low = (*low).min(depth);
        }
    }

    fn in_progress(&mut self, oid: Oid) -> Option<Arc<PgTypeRow>> {
        let (depth, row) = self.in_progress.get(&oid)?;
        let (depth, row) = (*depth, row.clone());
        self.lower(depth);
        Some(row)
    }

    fn deferred(&mut self, oid: Oid) -> Option<Arc<PgType>> {
        let (ty, low) = self.deferred.get(&oid)?;
        let (ty, low) = (ty.clone(), *low);
        self.lower(low);
        Some(ty)
    }

    /// Remove every deferred type that only waited on frames at `depth` or above.
    fn take_settled(&mut self, depth: usize) -> Vec<Arc<PgType>> {
        let settled: Vec<Oid> = self
            .deferred
            .iter()
            .filter(|(_, (_, low))| *low >= depth)
            .map(|(oid, _)| *oid)
            .collect();

        settled
            .into_iter()
            .filter_map(|oid| self.deferred.remove(&oid))
            .map(|(ty, _)| ty)
            .collect()
    }

    pub(super) fn is_empty(&self) -> bool {
        self.in_progress.is_empty() && self.low.is_empty() && self.deferred.is_empty()
    }

    pub(super) fn clear(&mut self) {
        self.in_progress.clear();
        self.low.clear();
        self.deferred.clear();
    }
}

impl PgTypeRegistry {
    /// Resolve a type that is referenced by the type currently being populated.
    pub(super) fn dependency(&mut self, oid: Oid) -> Result<Dependency> {
        if let Some(ty) = self.cache.get(&oid) {
            return Ok(Dependency::Ready(ty.clone()));
        }

        if let Some(row) = self.scratch.in_progress(oid) {
            return Ok(Dependency::InProgress(row));
        }

        if let Some(ty) = self.scratch.deferred(oid) {
            return Ok(Dependency::Ready(ty));
        }

        self.visit(oid).map(Dependency::Ready)
    }

    /// Populate a type that is neither cached nor on the resolution stack.
    pub(super) fn visit(&mut self, oid: Oid) -> Result<Arc<PgType>> {
        let row = self
            .catalog
            .type_row(oid)
            .cloned()
            .ok_or(Error::UnknownTypeId(oid))?;

        let variant = self.variant(&row)?;

        let depth = self.scratch.push(row.clone());
        let populated = self.populate(&row, variant);
        let low = self.scratch.pop(oid);

        let ty = match populated {
            Ok(ty) => Arc::new(ty),
            Err(error) => {
                // everything still deferred at this depth depends on the failed type
                let discarded = self.scratch.take_settled(depth);

                tracing::debug!(
                    target: "pgtype_registry::resolve",
                    %oid,
                    discarded = discarded.len(),
                    "rolled back type"
                );

                return Err(Error::Population {
                    oid,
                    name: row.name.clone(),
                    source: Box::new(error),
                });
            }
        };

        if low < depth {
            self.scratch.deferred.insert(oid, (ty.clone(), low));
            self.scratch.lower(low);
        } else {
            for settled in self.scratch.take_settled(depth) {
                self.cache.insert(settled.oid(), settled);
            }

            self.cache.insert(oid, ty.clone());
        }

        Ok(ty)
    }

    fn variant(&self, row: &PgTypeRow) -> Result<Variant> {
        if !row.element.is_none() {
            return Ok(Variant::Array);
        }

        match TypType::try_from(row.typtype) {
            Ok(typtype) => Ok(Variant::Other(typtype)),
            Err(()) => {
                registry_event!(
                    target: "pgtype_registry::resolve",
                    self.options.log_settings.unknown_discriminators,
                    oid = %row.oid,
                    name = %row.name,
                    typtype = %row.typtype,
                    "unknown type discriminator"
                );

                Err(Error::UnknownDiscriminator {
                    oid: row.oid,
                    name: row.name.clone(),
                    typtype: row.typtype,
                })
            }
        }
    }

    /// The codecs of a dependency, for types that inherit them.
    pub(super) fn dependency_codecs(&self, dependency: &Dependency) -> (PgCodecPair, PgCodecPair) {
        match dependency {
            Dependency::Ready(ty) => (ty.binary().clone(), ty.text().clone()),
            Dependency::InProgress(row) => self.row_codecs(row),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frames_track_lowest_depth() {
        let mut scratch = Scratch::default();

        let outer = scratch.push(Arc::new(PgTypeRow {
            oid: Oid(100),
            ..PgTypeRow::default()
        }));
        let inner = scratch.push(Arc::new(PgTypeRow {
            oid: Oid(101),
            ..PgTypeRow::default()
        }));
        assert_eq!((outer, inner), (0, 1));

        // the inner frame reaches back to the outer one
        assert_eq!(scratch.in_progress(Oid(100)).map(|row| row.oid), Some(Oid(100)));
        assert_eq!(scratch.pop(Oid(101)), 0);
        assert_eq!(scratch.pop(Oid(100)), 0);

        assert!(scratch.in_progress(Oid(100)).is_none());
        assert!(scratch.is_empty());
    }
}
