use crate::ext::ustr::UStr;
use crate::oid::Oid;

/// A row of `pg_catalog.pg_type`, with the `pg_enum` labels and the `pg_range` subtype of
/// the type flattened onto it.
///
/// Every oid column uses `0` for "none".
///
/// See <https://www.postgresql.org/docs/current/catalog-pg-type.html>.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PgTypeRow {
    /// `oid`
    pub oid: Oid,
    /// `typname`
    pub name: UStr,
    /// `typlen`: the fixed size in bytes, `-1` for varlena types, `-2` for C strings.
    pub len: i16,
    /// `typtype`: `b`ase, `c`omposite, `d`omain, `e`num, `p`seudo or `r`ange.
    pub typtype: char,
    /// `typcategory`
    pub category: char,
    /// `typdelim`: separates elements of arrays of this type in the text format.
    pub delimiter: char,
    /// `typelem`: a non-zero element type makes this row an array.
    pub element: Oid,
    /// `typarray`: the array type whose elements are of this type.
    pub array: Oid,
    /// `typrelid`: the relation whose attributes are the fields of a composite type.
    pub relation: Oid,
    /// `typbasetype`: the type a domain is based on.
    pub base_type: Oid,
    /// `pg_range.rngsubtype`: the element type of a range.
    pub range_subtype: Oid,
    /// `typinput`: text to internal form; used to encode text values.
    pub input: Oid,
    /// `typoutput`: internal form to text; used to decode text values.
    pub output: Oid,
    /// `typreceive`: binary to internal form; used to encode binary values.
    pub receive: Oid,
    /// `typsend`: internal form to binary; used to decode binary values.
    pub send: Oid,
    /// `typnotnull`: a domain constraint.
    pub not_null: bool,
    /// `typdefault`: the default expression of a domain, as text.
    pub default: Option<String>,
    /// `pg_enum.enumlabel` values, ordered by `enumsortorder`.
    pub enum_labels: Vec<UStr>,
}

impl Default for PgTypeRow {
    fn default() -> Self {
        Self {
            oid: Oid::NONE,
            name: UStr::default(),
            len: -1,
            typtype: 'b',
            category: 'U',
            delimiter: ',',
            element: Oid::NONE,
            array: Oid::NONE,
            relation: Oid::NONE,
            base_type: Oid::NONE,
            range_subtype: Oid::NONE,
            input: Oid::NONE,
            output: Oid::NONE,
            receive: Oid::NONE,
            send: Oid::NONE,
            not_null: false,
            default: None,
            enum_labels: Vec::new(),
        }
    }
}

/// A row of `pg_catalog.pg_attribute`: one field of a composite type.
///
/// See <https://www.postgresql.org/docs/current/catalog-pg-attribute.html>.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PgAttributeRow {
    /// `attrelid`
    pub relation: Oid,
    /// `attname`
    pub name: UStr,
    /// `atttypid`
    pub type_oid: Oid,
    /// `attnum`: ordinal position, starting at 1. System columns have negative numbers.
    pub ordinal: i16,
    /// `attisdropped`
    pub dropped: bool,
}

impl PgAttributeRow {
    /// A live attribute of `relation`.
    pub fn new(relation: Oid, name: impl Into<UStr>, type_oid: Oid, ordinal: i16) -> Self {
        Self {
            relation,
            name: name.into(),
            type_oid,
            ordinal,
            dropped: false,
        }
    }

    /// Whether this attribute is a field of its composite type.
    pub(crate) fn is_field(&self) -> bool {
        self.ordinal > 0 && !self.dropped
    }
}

impl Default for PgAttributeRow {
    fn default() -> Self {
        Self::new(Oid::NONE, UStr::default(), Oid::NONE, 0)
    }
}

/// A row of `pg_catalog.pg_proc`. The name is all the registry needs.
///
/// See <https://www.postgresql.org/docs/current/catalog-pg-proc.html>.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PgProcRow {
    /// `oid`
    pub oid: Oid,
    /// `proname`
    pub name: UStr,
}

impl PgProcRow {
    #[allow(missing_docs)]
    pub fn new(oid: Oid, name: impl Into<UStr>) -> Self {
        Self {
            oid,
            name: name.into(),
        }
    }
}

/// One batch of catalog rows, as fetched after connecting or after a schema change.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CatalogBatch {
    #[allow(missing_docs)]
    pub types: Vec<PgTypeRow>,
    #[allow(missing_docs)]
    pub attributes: Vec<PgAttributeRow>,
    #[allow(missing_docs)]
    pub procs: Vec<PgProcRow>,
}
