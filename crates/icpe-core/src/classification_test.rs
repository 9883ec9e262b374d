use super::*;

fn table() -> ClassificationTable {
    ClassificationTable::embedded().expect("embedded table must parse")
}

#[test]
fn embedded_table_is_not_empty() {
    let table = table();
    assert!(!table.is_empty());
    assert!(table.contains_code("2710"));
}

#[test]
fn classify_returns_stored_entry_for_known_sub_code() {
    assert_eq!(
        table().classify("2710", Some("1a")),
        Some(Classification::new(Category::WasteCenter, WasteType::Dangerous))
    );
}

#[test]
fn classify_returns_none_for_unknown_sub_code() {
    assert_eq!(table().classify("2716", Some("3")), None);
}

#[test]
fn classify_returns_none_when_sub_code_required_but_missing() {
    assert_eq!(table().classify("2716", None), None);
}

#[test]
fn classify_returns_none_for_unknown_code() {
    assert_eq!(table().classify("4560", None), None);
    assert_eq!(table().classify("4560", Some("1")), None);
}

#[test]
fn direct_entries_ignore_sub_code() {
    let expected = Some(Classification::new(
        Category::Collector,
        WasteType::NotDangerous,
    ));
    let table = table();
    assert_eq!(table.classify("2715", None), expected);
    assert_eq!(table.classify("2715", Some("1")), expected);
}

#[test]
fn classify_does_not_trim_sub_code() {
    assert_eq!(table().classify("2760", Some(" 3")), None);
}

#[test]
fn every_entry_classifies_to_itself() {
    let table = table();
    for entry in table.entries() {
        assert_eq!(
            table.classify(&entry.code, entry.sub_code.as_deref()),
            Some(entry.classification),
            "mismatch for {} / {:?}",
            entry.code,
            entry.sub_code
        );
    }
}

#[test]
fn classify_is_idempotent() {
    let table = table();
    let first = table.classify("2760", Some("3"));
    let second = table.classify("2760", Some("3"));
    assert_eq!(first, second);
    assert_eq!(
        first,
        Some(Classification::new(Category::WasteProcessor, WasteType::Inerte))
    );
}

#[test]
fn entries_are_ordered_by_code_then_sub_code() {
    let table = ClassificationTable::from_json_str(
        r#"{
            "2716": {
                "2": { "category": "COLLECTOR", "waste_type": "NOT_DANGEROUS" },
                "1": { "category": "COLLECTOR", "waste_type": "DANGEROUS" }
            },
            "2715": { "category": "COLLECTOR", "waste_type": "NOT_DANGEROUS" }
        }"#,
    )
    .unwrap();

    let keys: Vec<(String, Option<String>)> = table
        .entries()
        .map(|e| (e.code, e.sub_code))
        .collect();
    assert_eq!(
        keys,
        vec![
            ("2715".to_string(), None),
            ("2716".to_string(), Some("1".to_string())),
            ("2716".to_string(), Some("2".to_string())),
        ]
    );
}

#[test]
fn wasteprocessor_uses_unseparated_wire_name() {
    let json = serde_json::to_string(&Category::WasteProcessor).unwrap();
    assert_eq!(json, "\"WASTEPROCESSOR\"");
    assert_eq!(Category::WasteVehicles.as_str(), "WASTE_VEHICLES");
    assert_eq!(WasteType::NotDangerous.to_string(), "NOT_DANGEROUS");
}

#[test]
fn rejects_unknown_category() {
    let result = ClassificationTable::from_json_str(
        r#"{ "2715": { "category": "RECYCLER", "waste_type": "NOT_DANGEROUS" } }"#,
    );
    assert!(
        matches!(result, Err(ConfigError::ClassificationParse(_))),
        "expected ClassificationParse, got: {result:?}"
    );
}

#[test]
fn rejects_empty_sub_code_mapping() {
    let result = ClassificationTable::from_json_str(r#"{ "2716": {} }"#);
    assert!(
        matches!(result, Err(ConfigError::Validation(ref msg)) if msg.contains("2716")),
        "expected Validation, got: {result:?}"
    );
}

#[test]
fn rejects_empty_code() {
    let result = ClassificationTable::from_json_str(
        r#"{ "": { "category": "COLLECTOR", "waste_type": "INERTE" } }"#,
    );
    assert!(
        matches!(result, Err(ConfigError::Validation(_))),
        "expected Validation, got: {result:?}"
    );
}

#[test]
fn load_reports_missing_file() {
    let result = ClassificationTable::load(Path::new("/nonexistent/rubriques.json"));
    assert!(
        matches!(result, Err(ConfigError::ClassificationFileIo { ref path, .. }) if path.contains("nonexistent")),
        "expected ClassificationFileIo, got: {result:?}"
    );
}
