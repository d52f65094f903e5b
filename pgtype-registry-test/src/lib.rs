use pgtype_registry::{
    CodecDirection, CodecTable, Oid, PgAttributeRow, PgCodec, PgProcRow, PgTypeRegistry,
    PgTypeRow, PgValueFormat,
};

pub fn setup_if_needed() {
    let _ = dotenvy::dotenv();
    let _ = env_logger::builder()
        .is_test(true)
        .filter_module("pgtype_registry", log::LevelFilter::Trace)
        .try_init();
}

/// The `pg_proc` rows every fixture type refers to, with their oids on a stock server.
pub const PROCS: &[(u32, &str)] = &[
    (42, "int4in"),
    (43, "int4out"),
    (2406, "int4recv"),
    (2407, "int4send"),
    (46, "textin"),
    (47, "textout"),
    (2414, "textrecv"),
    (2415, "textsend"),
    (214, "float8in"),
    (215, "float8out"),
    (2426, "float8recv"),
    (2427, "float8send"),
    (750, "array_in"),
    (751, "array_out"),
    (2400, "array_recv"),
    (2401, "array_send"),
    (2290, "record_in"),
    (2291, "record_out"),
    (2402, "record_recv"),
    (2403, "record_send"),
    (3504, "enum_in"),
    (3505, "enum_out"),
    (3532, "enum_recv"),
    (3533, "enum_send"),
    (3834, "range_in"),
    (3835, "range_out"),
    (3836, "range_recv"),
    (3837, "range_send"),
    (2597, "domain_in"),
    (2598, "domain_recv"),
    (2298, "void_in"),
    (2299, "void_out"),
    (3120, "void_recv"),
    (3121, "void_send"),
];

/// Procedure names of the bootstrap types; only their names matter.
const BOOTSTRAP_PROC_PREFIXES: &[&str] = &[
    "bool", "bytea", "char", "name", "int8", "int2", "int4", "regproc", "text", "oid",
];

/// A fixture codec: it only remembers which procedure it stands for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixtureCodec {
    pub proc_name: String,
    pub direction: CodecDirection,
    pub format: PgValueFormat,
}

/// The procedure name behind a codec registered by [`fixture_codecs`].
pub fn codec_name(codec: Option<&PgCodec>) -> Option<&str> {
    codec?
        .downcast_ref::<FixtureCodec>()
        .map(|codec| codec.proc_name.as_str())
}

/// A codec table with a [`FixtureCodec`] for every procedure in [`PROCS`] and every
/// bootstrap procedure, except the `void_*` procedures.
pub fn fixture_codecs() -> CodecTable {
    let mut table = CodecTable::new();

    let bootstrap = BOOTSTRAP_PROC_PREFIXES.iter().flat_map(|prefix| {
        ["in", "out", "recv", "send"].map(|suffix| format!("{prefix}{suffix}"))
    });

    let names = PROCS
        .iter()
        .map(|(_, name)| name.to_string())
        .chain(bootstrap)
        .filter(|name| !name.starts_with("void_"));

    for name in names {
        let (direction, format) = if name.ends_with("send") {
            (CodecDirection::Decode, PgValueFormat::Binary)
        } else if name.ends_with("recv") {
            (CodecDirection::Encode, PgValueFormat::Binary)
        } else if name.ends_with("out") {
            (CodecDirection::Decode, PgValueFormat::Text)
        } else {
            (CodecDirection::Encode, PgValueFormat::Text)
        };

        let codec = PgCodec::new(FixtureCodec {
            proc_name: name.clone(),
            direction,
            format,
        });

        table.insert(name, direction, format, codec);
    }

    table
}

/// A registry over [`fixture_codecs`] that already knows every procedure in [`PROCS`].
pub fn registry() -> PgTypeRegistry {
    setup_if_needed();

    let mut registry = PgTypeRegistry::new(fixture_codecs());
    registry
        .ingest([], [], proc_rows())
        .expect("procedures alone never fail to ingest");
    registry
}

pub fn proc_rows() -> Vec<PgProcRow> {
    PROCS
        .iter()
        .map(|(oid, name)| PgProcRow::new(Oid(*oid), *name))
        .collect()
}

fn proc_oid(name: &str) -> Oid {
    PROCS
        .iter()
        .find(|(_, proc_name)| *proc_name == name)
        .map(|(oid, _)| Oid(*oid))
        .unwrap_or_else(|| panic!("no fixture procedure named {name:?}"))
}

/// A type row whose four procedures are `{prefix}in`, `{prefix}out`, `{prefix}recv` and
/// `{prefix}send`, or `{prefix}_in`, ... when `prefix` ends with an underscore.
pub fn type_row(oid: u32, name: &str, typtype: char, prefix: &str) -> PgTypeRow {
    PgTypeRow {
        oid: Oid(oid),
        name: name.to_owned().into(),
        typtype,
        input: proc_oid(&format!("{prefix}in")),
        output: proc_oid(&format!("{prefix}out")),
        receive: proc_oid(&format!("{prefix}recv")),
        send: proc_oid(&format!("{prefix}send")),
        ..PgTypeRow::default()
    }
}

pub fn base(oid: u32, name: &str, prefix: &str) -> PgTypeRow {
    type_row(oid, name, 'b', prefix)
}

pub fn array(oid: u32, name: &str, element: u32) -> PgTypeRow {
    PgTypeRow {
        element: Oid(element),
        category: 'A',
        ..type_row(oid, name, 'b', "array_")
    }
}

pub fn composite(oid: u32, name: &str, relation: u32) -> PgTypeRow {
    PgTypeRow {
        relation: Oid(relation),
        category: 'C',
        ..type_row(oid, name, 'c', "record_")
    }
}

/// A domain over `base_type`, with its own input and receive procedures only.
pub fn domain(oid: u32, name: &str, base_type: u32) -> PgTypeRow {
    PgTypeRow {
        oid: Oid(oid),
        name: name.to_owned().into(),
        typtype: 'd',
        base_type: Oid(base_type),
        input: proc_oid("domain_in"),
        receive: proc_oid("domain_recv"),
        ..PgTypeRow::default()
    }
}

pub fn enumeration(oid: u32, name: &str, labels: &[&str]) -> PgTypeRow {
    PgTypeRow {
        category: 'E',
        enum_labels: labels.iter().map(|label| label.to_string().into()).collect(),
        ..type_row(oid, name, 'e', "enum_")
    }
}

pub fn range(oid: u32, name: &str, subtype: u32) -> PgTypeRow {
    PgTypeRow {
        range_subtype: Oid(subtype),
        category: 'R',
        ..type_row(oid, name, 'r', "range_")
    }
}

pub fn pseudo(oid: u32, name: &str) -> PgTypeRow {
    PgTypeRow {
        category: 'P',
        ..type_row(oid, name, 'p', "void_")
    }
}

pub fn attribute(relation: u32, ordinal: i16, name: &str, type_oid: u32) -> PgAttributeRow {
    PgAttributeRow::new(Oid(relation), name.to_owned(), Oid(type_oid), ordinal)
}
