//! Resolved Postgres type descriptors.

use std::iter::Once;
use std::sync::Arc;

use crate::codec::{PgCodecPair, PgValueFormat};
use crate::ext::ustr::UStr;
use crate::oid::Oid;

/// Describes the type of the `pg_type.typtype` column
///
/// See <https://www.postgresql.org/docs/current/catalog-pg-type.html>
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum TypType {
    #[allow(missing_docs)]
    Base,
    #[allow(missing_docs)]
    Composite,
    #[allow(missing_docs)]
    Domain,
    #[allow(missing_docs)]
    Enum,
    #[allow(missing_docs)]
    Pseudo,
    #[allow(missing_docs)]
    Range,
}

impl TryFrom<char> for TypType {
    type Error = ();

    fn try_from(t: char) -> Result<Self, Self::Error> {
        let t = match t {
            'b' => Self::Base,
            'c' => Self::Composite,
            'd' => Self::Domain,
            'e' => Self::Enum,
            'p' => Self::Pseudo,
            'r' => Self::Range,
            _ => return Err(()),
        };
        Ok(t)
    }
}

/// Describes the type of the `pg_type.typcategory` column
///
/// See <https://www.postgresql.org/docs/current/catalog-pg-type.html#CATALOG-TYPCATEGORY-TABLE>
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[allow(missing_docs)]
pub enum TypCategory {
    Array,
    Boolean,
    Composite,
    DateTime,
    Enum,
    Geometric,
    Network,
    Numeric,
    Pseudo,
    Range,
    String,
    Timespan,
    User,
    BitString,
    Unknown,
    Internal,
}

impl TryFrom<char> for TypCategory {
    type Error = ();

    fn try_from(c: char) -> Result<Self, Self::Error> {
        let c = match c {
            'A' => Self::Array,
            'B' => Self::Boolean,
            'C' => Self::Composite,
            'D' => Self::DateTime,
            'E' => Self::Enum,
            'G' => Self::Geometric,
            'I' => Self::Network,
            'N' => Self::Numeric,
            'P' => Self::Pseudo,
            'R' => Self::Range,
            'S' => Self::String,
            'T' => Self::Timespan,
            'U' => Self::User,
            'V' => Self::BitString,
            'X' => Self::Unknown,
            'Z' => Self::Internal,
            _ => return Err(()),
        };
        Ok(c)
    }
}

/// A fully resolved Postgres type.
///
/// Types refer to each other by oid; use [`PgTypeRegistry::get`](crate::PgTypeRegistry::get)
/// to navigate from a type to its dependencies. The registry guarantees that every
/// dependency of a type it hands out is resolved as well.
#[derive(Debug, Clone)]
pub struct PgType {
    pub(crate) oid: Oid,
    pub(crate) name: UStr,
    pub(crate) len: i16,
    pub(crate) category: TypCategory,
    pub(crate) delimiter: char,
    pub(crate) array_oid: Option<Oid>,
    pub(crate) binary: PgCodecPair,
    pub(crate) text: PgCodecPair,
    pub(crate) kind: PgTypeKind,
}

/// The shape of a Postgres type and its dependencies.
///
/// See:
/// - <https://www.postgresql.org/docs/current/catalog-pg-type.html>
/// - <https://www.postgresql.org/docs/current/catalog-pg-type.html#CATALOG-TYPCATEGORY-TABLE>
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PgTypeKind {
    /// `b` in `pg_type.typtype`: a primitive with no further structure.
    Base,
    /// `p` in `pg_type.typtype`: a marker with no concrete representation, e.g. `void`.
    Pseudo,
    /// `d` in `pg_type.typtype`.
    Domain(PgDomain),
    /// `c` in `pg_type.typtype`.
    ///
    /// With the field list, ordered by ordinal position.
    Composite(Arc<[(UStr, Oid)]>),
    /// Any type with a non-zero `pg_type.typelem`.
    ///
    /// With the element type.
    Array(Oid),
    /// `e` in `pg_type.typtype`.
    ///
    /// With the labels, in sort order.
    Enum(Arc<[UStr]>),
    /// `r` in `pg_type.typtype`.
    ///
    /// With the subtype.
    Range(Oid),
}

/// The underlying type and constraints of a domain.
///
/// Only the base type matters on the wire; the constraints are kept for introspection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PgDomain {
    /// `typbasetype`
    pub base_type: Oid,
    /// `typnotnull`
    pub not_null: bool,
    /// `typdefault`
    pub default: Option<UStr>,
}

impl PgTypeKind {
    /// The oids this kind directly depends on.
    ///
    /// The iterator is finite, but it may yield duplicates.
    pub fn type_dependencies(&self) -> PgTypeDeps<'_> {
        match self {
            Self::Base | Self::Pseudo | Self::Enum(_) => PgTypeDeps::Zero,
            Self::Domain(domain) => PgTypeDeps::One(std::iter::once(&domain.base_type)),
            Self::Array(element) => PgTypeDeps::One(std::iter::once(element)),
            Self::Range(subtype) => PgTypeDeps::One(std::iter::once(subtype)),
            Self::Composite(fields) => PgTypeDeps::Composite(fields.iter()),
        }
    }
}

/// Iterator over the direct type dependencies of a [`PgTypeKind`] (or [`PgType`]).
#[derive(Debug, Clone)]
pub enum PgTypeDeps<'a> {
    #[allow(missing_docs)]
    Zero,
    #[allow(missing_docs)]
    One(Once<&'a Oid>),
    #[allow(missing_docs)]
    Composite(std::slice::Iter<'a, (UStr, Oid)>),
}

impl<'a> Iterator for PgTypeDeps<'a> {
    type Item = &'a Oid;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Self::Zero => None,
            Self::One(inner) => inner.next(),
            Self::Composite(fields) => fields.next().map(|(_, ty)| ty),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self {
            Self::Zero => (0, Some(0)),
            Self::One(inner) => inner.size_hint(),
            Self::Composite(fields) => fields.size_hint(),
        }
    }
}

impl<'a> DoubleEndedIterator for PgTypeDeps<'a> {
    fn next_back(&mut self) -> Option<Self::Item> {
        match self {
            Self::Zero => None,
            Self::One(inner) => inner.next_back(),
            Self::Composite(fields) => fields.next_back().map(|(_, ty)| ty),
        }
    }
}

impl<'a> ExactSizeIterator for PgTypeDeps<'a> {}

impl PgType {
    /// Returns the unique identifier for this Postgres type.
    pub fn oid(&self) -> Oid {
        self.oid
    }

    /// Returns the name for this Postgres type.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// `typlen`: the fixed size in bytes, `-1` for varlena types, `-2` for C strings.
    pub fn len(&self) -> i16 {
        self.len
    }

    /// Returns `true` if values of this type do not have a fixed size.
    pub fn is_variable_length(&self) -> bool {
        self.len < 0
    }

    #[allow(missing_docs)]
    pub fn category(&self) -> TypCategory {
        self.category
    }

    /// The character separating elements of an array of this type in the text format.
    ///
    /// For an array type this is the delimiter of its element type.
    pub fn delimiter(&self) -> char {
        self.delimiter
    }

    /// The array type whose elements are of this type, if the catalog declares one.
    pub fn array_oid(&self) -> Option<Oid> {
        self.array_oid
    }

    #[allow(missing_docs)]
    pub fn kind(&self) -> &PgTypeKind {
        &self.kind
    }

    /// Codecs for the binary format. Either half may be absent.
    pub fn binary(&self) -> &PgCodecPair {
        &self.binary
    }

    /// Codecs for the text format. Either half may be absent.
    pub fn text(&self) -> &PgCodecPair {
        &self.text
    }

    /// Codecs for `format`.
    pub fn codecs(&self, format: PgValueFormat) -> &PgCodecPair {
        match format {
            PgValueFormat::Binary => &self.binary,
            PgValueFormat::Text => &self.text,
        }
    }

    /// The oids this type directly depends on.
    pub fn type_dependencies(&self) -> PgTypeDeps<'_> {
        self.kind.type_dependencies()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discriminators() {
        assert_eq!(TypType::try_from('c'), Ok(TypType::Composite));
        assert_eq!(TypType::try_from('m'), Err(()));
        assert_eq!(TypCategory::try_from('A'), Ok(TypCategory::Array));
        assert_eq!(TypCategory::try_from('?'), Err(()));
    }

    #[test]
    fn dependencies_of_each_kind() {
        let composite = PgTypeKind::Composite(Arc::from(vec![
            (UStr::from("value"), Oid(23)),
            (UStr::from("next"), Oid(100)),
        ]));
        assert_eq!(
            composite.type_dependencies().copied().collect::<Vec<_>>(),
            [Oid(23), Oid(100)]
        );
        assert_eq!(composite.type_dependencies().rev().next(), Some(&Oid(100)));

        let domain = PgTypeKind::Domain(PgDomain {
            base_type: Oid(23),
            not_null: true,
            default: None,
        });
        assert_eq!(domain.type_dependencies().len(), 1);

        assert_eq!(PgTypeKind::Array(Oid(23)).type_dependencies().next(), Some(&Oid(23)));
        assert_eq!(PgTypeKind::Enum(Arc::from(Vec::new())).type_dependencies().len(), 0);
        assert_eq!(PgTypeKind::Pseudo.type_dependencies().len(), 0);
    }
}
