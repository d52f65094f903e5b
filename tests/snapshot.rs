use pgtype_registry::{CatalogBatch, Oid, PgTypeKind, PgTypeRegistry};
use pgtype_registry_test::{fixture_codecs, setup_if_needed};

const SNAPSHOT: &str = r#"{
    "types": [
        { "oid": 16500, "name": "pair", "typtype": "c", "category": "C", "relation": 16501,
          "input": 2290, "output": 2291, "receive": 2402, "send": 2403 },
        { "oid": 16502, "name": "mood", "typtype": "e", "category": "E",
          "enum_labels": ["sad", "happy"] }
    ],
    "attributes": [
        { "relation": 16501, "name": "left", "type_oid": 23, "ordinal": 1 },
        { "relation": 16501, "name": "right", "type_oid": 25, "ordinal": 2 }
    ],
    "procs": [
        { "oid": 2290, "name": "record_in" },
        { "oid": 2291, "name": "record_out" },
        { "oid": 2402, "name": "record_recv" },
        { "oid": 2403, "name": "record_send" }
    ]
}"#;

#[test]
fn it_replays_a_catalog_snapshot() -> anyhow::Result<()> {
    setup_if_needed();

    let batch: CatalogBatch = serde_json::from_str(SNAPSHOT)?;
    assert_eq!(batch.types.len(), 2);
    assert_eq!(batch.types[0].len, -1);
    assert_eq!(batch.types[0].delimiter, ',');

    let mut registry = PgTypeRegistry::new(fixture_codecs());
    registry.ingest_batch(batch.clone())?;

    let pair = registry
        .get(Oid(16500))
        .ok_or_else(|| anyhow::anyhow!("pair resolved on ingest"))?;
    let fields: Vec<&str> = pair.fields().map(|(name, _)| name).collect();
    assert_eq!(fields, ["left", "right"]);
    assert!(pair.binary().decoder.is_some());

    let mood = registry
        .get(Oid(16502))
        .ok_or_else(|| anyhow::anyhow!("mood resolved on ingest"))?;
    assert!(matches!(mood.kind(), PgTypeKind::Enum(labels) if labels.len() == 2));
    assert!(mood.binary().is_empty());

    // serializing the batch again yields the same rows
    let json = serde_json::to_value(&batch)?;
    let replayed: CatalogBatch = serde_json::from_value(json)?;
    assert_eq!(replayed.attributes[1].name, "right");
    assert_eq!(replayed.procs[3].name, "record_send");

    Ok(())
}
