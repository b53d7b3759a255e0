use datamatch_core::config::{expand_path, resolve_with_base, EngineConfig};
use datamatch_core::types::{DatasetDocument, DatasetRecord, Domain, SearchFilters};
use std::path::{Path, PathBuf};

#[test]
fn config_defaults_are_runnable() {
    let cfg = EngineConfig::default();
    assert_eq!(cfg.embedding.dimension, 1024);
    assert_eq!(cfg.index.index_name, "intent_recognition");
    assert_eq!(cfg.matching.max_results, 5);
    assert!((cfg.matching.min_score - 0.3).abs() < f32::EPSILON);
    assert_eq!(cfg.matching.overfetch_factor, 3);
    assert_eq!(cfg.sync.keyword_limit, 20);
}

#[test]
fn expand_path_substitutes_env_placeholders() {
    std::env::set_var("DATAMATCH_CORE_TEST_ROOT", "/srv/data");
    assert_eq!(
        expand_path("${DATAMATCH_CORE_TEST_ROOT}/plots.csv"),
        PathBuf::from("/srv/data/plots.csv")
    );
    // Unknown variables leave the input untouched.
    assert_eq!(
        expand_path("$DATAMATCH_CORE_TEST_UNSET/plots.csv"),
        PathBuf::from("$DATAMATCH_CORE_TEST_UNSET/plots.csv")
    );
}

#[test]
fn resolve_with_base_joins_relative_paths_only() {
    let base = Path::new("/var/lib/datamatch");
    assert_eq!(
        resolve_with_base(base, "catalog.json"),
        PathBuf::from("/var/lib/datamatch/catalog.json")
    );
    assert_eq!(
        resolve_with_base(base, "/etc/datamatch/catalog.json"),
        PathBuf::from("/etc/datamatch/catalog.json")
    );
}

#[test]
fn domain_serializes_snake_case() {
    let json = serde_json::to_string(&Domain::Land).expect("serialize");
    assert_eq!(json, "\"land\"");
    let back: Domain = serde_json::from_str("\"environment\"").expect("deserialize");
    assert_eq!(back, Domain::Environment);
    assert_eq!(Domain::Land.label(), "土地");
}

#[test]
fn reduced_schema_document_deserializes_with_defaults() {
    // Documents written under the fallback schema only carry
    // id/name/description; everything else must default cleanly.
    let record: DatasetRecord = serde_json::from_str(
        r#"{"dataset_id": "7", "name": "耕地图斑", "description": "2023年耕地数据"}"#,
    )
    .expect("deserialize");
    assert_eq!(record.dataset_id, "7");
    assert_eq!(record.domain, Domain::Generic);
    assert!(record.keywords.is_empty());
    assert!(record.status.is_empty());
}

#[test]
fn document_flattens_record_fields() {
    let doc = DatasetDocument {
        record: DatasetRecord {
            dataset_id: "1".to_string(),
            name: "测试".to_string(),
            ..Default::default()
        },
        embedding: vec![0.0; 4],
    };
    let value = serde_json::to_value(&doc).expect("serialize");
    // Record fields sit at the top level next to the embedding.
    assert_eq!(value["dataset_id"], "1");
    assert_eq!(value["embedding"].as_array().map(|a| a.len()), Some(4));
}

#[test]
fn empty_filters_report_empty() {
    assert!(SearchFilters::default().is_empty());
    let filters = SearchFilters {
        domain: Some(Domain::Land),
        ..Default::default()
    };
    assert!(!filters.is_empty());
}
