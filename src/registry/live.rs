use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use crate::ext::ustr::UStr;
use crate::oid::Oid;
use crate::type_info::{PgType, PgTypeKind};

use super::PgTypeRegistry;

/// A resolved type borrowed from a [`PgTypeRegistry`], able to reach the types it
/// depends on.
///
/// Every dependency of a resolved type is resolved as well, so navigating never fails.
#[derive(Clone, Copy)]
pub struct PgLiveType<'reg> {
    registry: &'reg PgTypeRegistry,
    ty: &'reg Arc<PgType>,
}

impl<'reg> PgLiveType<'reg> {
    pub(super) fn new(registry: &'reg PgTypeRegistry, ty: &'reg Arc<PgType>) -> Self {
        Self { registry, ty }
    }

    fn live(&self, oid: Oid) -> Option<PgLiveType<'reg>> {
        self.registry.get(oid)
    }

    /// The shared handle of this type, the same one [`PgTypeRegistry::lookup`] returns.
    pub fn as_arc(&self) -> &'reg Arc<PgType> {
        self.ty
    }

    /// The element type, if this is an array.
    pub fn element(&self) -> Option<PgLiveType<'reg>> {
        match self.ty.kind() {
            PgTypeKind::Array(element) => self.live(*element),
            _ => None,
        }
    }

    /// The fields of a composite type, in order. Empty for every other kind.
    pub fn fields(&self) -> impl Iterator<Item = (&'reg str, PgLiveType<'reg>)> + 'reg {
        let registry = self.registry;
        let ty: &'reg PgType = self.ty;

        let fields: &'reg [(UStr, Oid)] = match ty.kind() {
            PgTypeKind::Composite(fields) => &fields[..],
            _ => &[],
        };

        fields
            .iter()
            .filter_map(move |(name, oid)| Some((name.as_str(), registry.get(*oid)?)))
    }

    /// The underlying type, if this is a domain.
    pub fn base_type(&self) -> Option<PgLiveType<'reg>> {
        match self.ty.kind() {
            PgTypeKind::Domain(domain) => self.live(domain.base_type),
            _ => None,
        }
    }

    /// The subtype, if this is a range.
    pub fn subtype(&self) -> Option<PgLiveType<'reg>> {
        match self.ty.kind() {
            PgTypeKind::Range(subtype) => self.live(*subtype),
            _ => None,
        }
    }

    /// The types this type directly depends on.
    pub fn dependencies(&self) -> impl Iterator<Item = PgLiveType<'reg>> + 'reg {
        let registry = self.registry;
        let ty: &'reg PgType = self.ty;

        ty.type_dependencies().filter_map(move |oid| registry.get(*oid))
    }
}

impl Deref for PgLiveType<'_> {
    type Target = PgType;

    fn deref(&self) -> &PgType {
        self.ty
    }
}

impl fmt::Debug for PgLiveType<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PgLiveType {{registry, oid: {}, name: {:?}}}",
            self.ty.oid(),
            self.ty.name()
        )
    }
}
