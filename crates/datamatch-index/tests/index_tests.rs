use datamatch_core::config::IndexConfig;
use datamatch_core::traits::DatasetIndex;
use datamatch_core::types::{DatasetDocument, DatasetRecord, Domain, SearchFilters};
use datamatch_index::EsVectorIndex;
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_index(url: &str) -> EsVectorIndex {
    let cfg = IndexConfig {
        url: url.to_string(),
        index_name: "intent_recognition".to_string(),
        username: None,
        password: None,
        timeout_secs: 5,
    };
    EsVectorIndex::new(&cfg, 4).expect("build index client")
}

fn doc(id: &str) -> DatasetDocument {
    DatasetDocument {
        record: DatasetRecord {
            dataset_id: id.to_string(),
            name: "耕地图斑".to_string(),
            domain: Domain::Land,
            status: "active".to_string(),
            ..Default::default()
        },
        embedding: vec![0.5, 0.5, 0.5, 0.5],
    }
}

#[tokio::test]
async fn ensure_schema_creates_index_when_absent() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path("/intent_recognition"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/intent_recognition"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"acknowledged": true})))
        .expect(1)
        .mount(&server)
        .await;

    test_index(&server.uri()).ensure_schema().await;
}

#[tokio::test]
async fn ensure_schema_is_a_no_op_when_index_exists() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path("/intent_recognition"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/intent_recognition"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    test_index(&server.uri()).ensure_schema().await;
}

#[tokio::test]
async fn ensure_schema_falls_back_to_reduced_mapping() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path("/intent_recognition"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    // The full mapping carries index settings; reject it to force the
    // reduced-schema retry, which must then succeed.
    Mock::given(method("PUT"))
        .and(path("/intent_recognition"))
        .and(body_partial_json(json!({"settings": {"number_of_shards": 1}})))
        .respond_with(ResponseTemplate::new(400).set_body_string("mapping rejected"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/intent_recognition"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"acknowledged": true})))
        .expect(1)
        .mount(&server)
        .await;

    // Degrades without raising either way.
    test_index(&server.uri()).ensure_schema().await;
}

#[tokio::test]
async fn search_restores_similarity_scores() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/intent_recognition/_search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "hits": {"hits": [
                {"_score": 1.6, "_source": {"dataset_id": "1", "name": "耕地图斑",
                                             "domain": "land", "keywords": ["耕地"]}},
                {"_score": 1.1, "_source": {"dataset_id": "2", "name": "道路"}}
            ]}
        })))
        .mount(&server)
        .await;

    let hits = test_index(&server.uri())
        .search(&[0.1, 0.2, 0.3, 0.4], 10, 0.3, &SearchFilters::default())
        .await
        .expect("search");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].record.dataset_id, "1");
    assert!((hits[0].similarity_score - 0.6).abs() < 1e-6);
}

#[tokio::test]
async fn search_error_surfaces_as_index_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/intent_recognition/_search"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let result = test_index(&server.uri())
        .search(&[0.0; 4], 5, 0.0, &SearchFilters::default())
        .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn upsert_and_delete_report_booleans() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/intent_recognition/_doc/5"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"result": "created"})))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/intent_recognition/_doc/5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": "deleted"})))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/intent_recognition/_doc/404"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let index = test_index(&server.uri());
    assert!(index.upsert(&doc("5")).await);
    assert!(index.delete("5").await);
    // Absent id: false, never an error.
    assert!(!index.delete("404").await);
}

#[tokio::test]
async fn bulk_upsert_reports_partial_failures() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/_bulk"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "errors": true,
            "items": [
                {"index": {"_id": "1", "status": 201}},
                {"index": {"_id": "2", "status": 400,
                           "error": {"reason": "rejected"}}}
            ]
        })))
        .mount(&server)
        .await;

    let report = test_index(&server.uri())
        .bulk_upsert(&[doc("1"), doc("2")])
        .await;
    assert_eq!(report.success_count, 1);
    assert_eq!(report.errors.len(), 1);
    assert!(report.errors[0].contains("2"));
}

#[tokio::test]
async fn update_posts_partial_document() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/intent_recognition/_update/7"))
        .and(body_partial_json(json!({"doc": {"name": "更新后"}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": "updated"})))
        .expect(1)
        .mount(&server)
        .await;

    let fields = DatasetRecord {
        dataset_id: "7".to_string(),
        name: "更新后".to_string(),
        ..Default::default()
    };
    assert!(test_index(&server.uri()).update("7", &fields, None).await);
}

#[tokio::test]
async fn stats_reads_document_count() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/intent_recognition/_count"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"count": 42})))
        .mount(&server)
        .await;

    let stats = test_index(&server.uri()).stats().await.expect("stats");
    assert_eq!(stats.document_count, 42);
    assert_eq!(stats.index_name, "intent_recognition");
}
