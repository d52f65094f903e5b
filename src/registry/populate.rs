use std::sync::Arc;

use crate::catalog::PgTypeRow;
use crate::codec::PgCodecPair;
use crate::error::Result;
use crate::ext::ustr::UStr;
use crate::oid::Oid;
use crate::type_info::{PgDomain, PgType, PgTypeKind, TypCategory, TypType};

use super::resolve::Variant;
use super::PgTypeRegistry;

impl PgTypeRegistry {
    pub(super) fn populate(&mut self, row: &PgTypeRow, variant: Variant) -> Result<PgType> {
        match variant {
            Variant::Array => self.populate_array(row),
            Variant::Other(TypType::Base) => {
                let (binary, text) = self.row_codecs(row);
                Ok(describe(row, PgTypeKind::Base, binary, text))
            }
            Variant::Other(TypType::Composite) => self.populate_composite(row),
            Variant::Other(TypType::Domain) => self.populate_domain(row),
            Variant::Other(TypType::Enum) => {
                let labels = Arc::from(row.enum_labels.clone());
                let (binary, text) = self.row_codecs(row);
                Ok(describe(row, PgTypeKind::Enum(labels), binary, text))
            }
            Variant::Other(TypType::Range) => self.populate_range(row),
            Variant::Other(TypType::Pseudo) => Ok(describe(
                row,
                PgTypeKind::Pseudo,
                PgCodecPair::none(),
                PgCodecPair::none(),
            )),
        }
    }

    fn populate_array(&mut self, row: &PgTypeRow) -> Result<PgType> {
        let element = self.dependency(row.element)?;
        let (binary, text) = self.row_codecs(row);

        let mut ty = describe(row, PgTypeKind::Array(row.element), binary, text);
        ty.delimiter = element.delimiter();

        Ok(ty)
    }

    fn populate_composite(&mut self, row: &PgTypeRow) -> Result<PgType> {
        let relation = row.relation.non_zero().ok_or_else(|| {
            err_catalog!(
                "composite type {:?} ({}) has no relation (`typrelid`)",
                row.name,
                row.oid
            )
        })?;

        let fields: Vec<(UStr, Oid)> = self
            .catalog
            .fields(relation)
            .into_iter()
            .map(|attribute| (attribute.name.clone(), attribute.type_oid))
            .collect();

        for (_, field_type) in &fields {
            self.dependency(*field_type)?;
        }

        let (binary, text) = self.row_codecs(row);

        Ok(describe(
            row,
            PgTypeKind::Composite(Arc::from(fields)),
            binary,
            text,
        ))
    }

    fn populate_domain(&mut self, row: &PgTypeRow) -> Result<PgType> {
        let base_type = row.base_type.non_zero().ok_or_else(|| {
            err_catalog!(
                "domain {:?} ({}) has no base type (`typbasetype`)",
                row.name,
                row.oid
            )
        })?;

        let base = self.dependency(base_type)?;
        let (base_binary, base_text) = self.dependency_codecs(&base);
        let (binary, text) = self.row_codecs(row);

        let domain = PgDomain {
            base_type,
            not_null: row.not_null,
            default: row.default.as_deref().map(UStr::new),
        };

        Ok(describe(
            row,
            PgTypeKind::Domain(domain),
            binary.or(&base_binary),
            text.or(&base_text),
        ))
    }

    fn populate_range(&mut self, row: &PgTypeRow) -> Result<PgType> {
        let subtype = row.range_subtype.non_zero().ok_or_else(|| {
            err_catalog!(
                "range type {:?} ({}) has no subtype (`rngsubtype`)",
                row.name,
                row.oid
            )
        })?;

        self.dependency(subtype)?;
        let (binary, text) = self.row_codecs(row);

        Ok(describe(row, PgTypeKind::Range(subtype), binary, text))
    }

    /// The binary and text codecs named by the procedures of `row`.
    pub(super) fn row_codecs(&self, row: &PgTypeRow) -> (PgCodecPair, PgCodecPair) {
        (
            self.resolve_binary_codec(row.send, row.receive),
            self.resolve_text_codec(row.output, row.input),
        )
    }
}

fn describe(row: &PgTypeRow, kind: PgTypeKind, binary: PgCodecPair, text: PgCodecPair) -> PgType {
    PgType {
        oid: row.oid,
        name: row.name.clone(),
        len: row.len,
        category: TypCategory::try_from(row.category).unwrap_or(TypCategory::Unknown),
        delimiter: row.delimiter,
        array_oid: row.array.non_zero(),
        binary,
        text,
        kind,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_category_is_tolerated() {
        let row = PgTypeRow {
            oid: Oid(5000),
            name: "odd".into(),
            category: '?',
            array: Oid(5001),
            ..PgTypeRow::default()
        };

        let ty = describe(&row, PgTypeKind::Base, PgCodecPair::none(), PgCodecPair::none());
        assert_eq!(ty.category(), TypCategory::Unknown);
        assert_eq!(ty.array_oid(), Some(Oid(5001)));
        assert_eq!(ty.delimiter(), ',');
    }
}
