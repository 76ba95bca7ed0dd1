//! Display table JSON schema round-trips through the loader.

use data_runtime::display::{DisplayRecord, DisplayTable, DisplayVariant};

#[test]
fn schema_parses_and_resolves() {
    let json = r#"{
        "records": [
            {
                "id": 7,
                "model": "characters/human/male.cmdl",
                "variants": [
                    {"race": 1, "gender": 0, "variant": 2, "model": "characters/human/male_v2.cmdl"}
                ]
            },
            {"id": 8, "model": "characters/orc/female.cmdl"}
        ]
    }"#;
    let mut t: DisplayTable = serde_json::from_str(json).expect("parse");
    // from_records rebuilds the index that serde skips.
    t = DisplayTable::from_records(t.records);
    assert_eq!(t.resolve(7, 1, 0, 2), Some("characters/human/male_v2.cmdl"));
    assert_eq!(t.resolve(7, 1, 0, 3), Some("characters/human/male.cmdl"));
    assert_eq!(t.resolve(8, 0, 0, 0), Some("characters/orc/female.cmdl"));
    assert!(t.resolve(9, 0, 0, 0).is_none());
}

#[test]
fn variants_default_to_empty() {
    let rec: DisplayRecord =
        serde_json::from_str(r#"{"id": 1, "model": "a.cmdl"}"#).expect("parse");
    assert!(rec.variants.is_empty());
    let _ = DisplayVariant {
        race: 0,
        gender: 0,
        variant: 0,
        model: String::new(),
    };
}
