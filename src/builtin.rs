use crate::codec::PgCodecPair;
use crate::ext::ustr::UStr;
use crate::oid::Oid;
use crate::type_info::{PgType, PgTypeKind, TypCategory};

/// The primitive types every registry knows before any catalog row is ingested.
///
/// They are enough to decode the rows of the catalog queries themselves. Bootstrap types
/// are permanent: a catalog row sharing one of their oids is ignored.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum PgBootstrapType {
    #[allow(missing_docs)]
    Bool,
    #[allow(missing_docs)]
    Bytea,
    /// The single-byte `"char"` type.
    Char,
    #[allow(missing_docs)]
    Name,
    #[allow(missing_docs)]
    Int8,
    #[allow(missing_docs)]
    Int2,
    #[allow(missing_docs)]
    Int4,
    #[allow(missing_docs)]
    Regproc,
    #[allow(missing_docs)]
    Text,
    #[allow(missing_docs)]
    Oid,
}

macro_rules! impl_bootstrap {
    ($(($ident:ident, $oid:literal, $name:literal, $len:literal, $category:ident, $array:literal, $procs:literal)),* $(,)?) => {
        impl PgBootstrapType {
            const ALL: &'static [PgBootstrapType] = &[$(Self::$ident),*];

            /// Returns the bootstrap type with the given oid, if any.
            pub const fn try_from_oid(oid: Oid) -> Option<Self> {
                match oid.to_u32() {
                    $($oid => Some(Self::$ident),)*
                    _ => None,
                }
            }

            #[allow(missing_docs)]
            pub const fn oid(self) -> Oid {
                match self {
                    $(Self::$ident => Oid($oid),)*
                }
            }

            #[allow(missing_docs)]
            pub const fn name(self) -> &'static str {
                match self {
                    $(Self::$ident => $name,)*
                }
            }

            const fn len(self) -> i16 {
                match self {
                    $(Self::$ident => $len,)*
                }
            }

            const fn category(self) -> TypCategory {
                match self {
                    $(Self::$ident => TypCategory::$category,)*
                }
            }

            /// The oid of the array type with this element type.
            pub const fn array_oid(self) -> Oid {
                match self {
                    $(Self::$ident => Oid($array),)*
                }
            }

            /// `typinput`, `typoutput`, `typreceive` and `typsend`, by name.
            pub(crate) const fn procs(self) -> [&'static str; 4] {
                match self {
                    $(Self::$ident => [
                        concat!($procs, "in"),
                        concat!($procs, "out"),
                        concat!($procs, "recv"),
                        concat!($procs, "send"),
                    ],)*
                }
            }
        }
    };
}

impl_bootstrap! {
    (Bool, 16, "bool", 1, Boolean, 1000, "bool"),
    (Bytea, 17, "bytea", -1, User, 1001, "bytea"),
    (Char, 18, "char", 1, String, 1002, "char"),
    (Name, 19, "name", 64, String, 1003, "name"),
    (Int8, 20, "int8", 8, Numeric, 1016, "int8"),
    (Int2, 21, "int2", 2, Numeric, 1005, "int2"),
    (Int4, 23, "int4", 4, Numeric, 1007, "int4"),
    (Regproc, 24, "regproc", 4, Numeric, 1008, "regproc"),
    (Text, 25, "text", -1, String, 1009, "text"),
    (Oid, 26, "oid", 4, Numeric, 1028, "oid"),
}

impl PgBootstrapType {
    /// Every bootstrap type, in oid order.
    pub fn iter() -> impl Iterator<Item = PgBootstrapType> {
        Self::ALL.iter().copied()
    }

    pub(crate) fn to_type(self, binary: PgCodecPair, text: PgCodecPair) -> PgType {
        PgType {
            oid: self.oid(),
            name: UStr::Static(self.name()),
            len: self.len(),
            category: self.category(),
            delimiter: ',',
            array_oid: Some(self.array_oid()),
            binary,
            text,
            kind: PgTypeKind::Base,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oids_round_trip() {
        assert_eq!(PgBootstrapType::iter().count(), 10);

        for ty in PgBootstrapType::iter() {
            assert_eq!(PgBootstrapType::try_from_oid(ty.oid()), Some(ty));
        }

        assert_eq!(PgBootstrapType::try_from_oid(Oid(22)), None);
        assert_eq!(PgBootstrapType::try_from_oid(Oid(1007)), None);
    }

    #[test]
    fn procs_follow_naming_convention() {
        assert_eq!(
            PgBootstrapType::Int4.procs(),
            ["int4in", "int4out", "int4recv", "int4send"]
        );
        assert_eq!(PgBootstrapType::Char.name(), "char");

        let text = PgBootstrapType::Text.to_type(PgCodecPair::none(), PgCodecPair::none());
        assert!(text.is_variable_length());
        assert_eq!(text.category(), TypCategory::String);
        assert_eq!(text.array_oid(), Some(Oid(1009)));
    }
}
