use std::fmt;

/// The PostgreSQL [`OID`] type stores an object identifier,
/// used internally by PostgreSQL as primary keys for various system tables.
///
/// In the registry an oid identifies a row of `pg_type`, `pg_proc`, or (for composite
/// types) the `pg_class` relation owning a set of `pg_attribute` rows.
/// The value `0` is the "no object" sentinel.
///
/// [`OID`]: https://www.postgresql.org/docs/current/datatype-oid.html
#[derive(Debug, Copy, Clone, Hash, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Oid(
    /// The raw unsigned integer value sent over the wire
    pub u32,
);

impl Oid {
    /// The "no object" sentinel, e.g. `typelem` of a type that is not an array.
    pub const NONE: Oid = Oid(0);

    /// Wrap a `u32` as an OID.
    pub const fn from_u32(oid: u32) -> Self {
        Self(oid)
    }

    /// Get the corresponding `u32` from the OID.
    pub const fn to_u32(self) -> u32 {
        self.0
    }

    /// Returns `true` for the `0` sentinel.
    pub const fn is_none(self) -> bool {
        self.0 == 0
    }

    /// `None` for the `0` sentinel, `Some(self)` otherwise.
    pub const fn non_zero(self) -> Option<Oid> {
        if self.is_none() {
            None
        } else {
            Some(self)
        }
    }
}

impl fmt::Display for Oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.to_u32().fmt(f)
    }
}

impl From<u32> for Oid {
    fn from(oid: u32) -> Self {
        Self(oid)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Oid {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.0.serialize(serializer)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Oid {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        u32::deserialize(deserializer).map(Self)
    }
}
