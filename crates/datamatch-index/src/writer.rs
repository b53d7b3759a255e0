//! Write-path request bodies: single/bulk upsert and partial update.

use datamatch_core::types::{BulkReport, DatasetDocument, DatasetRecord};
use serde_json::{json, Value};

/// NDJSON body for a bulk index request. One action line plus one source
/// line per document; trailing newline required by the protocol.
pub fn bulk_body(index_name: &str, docs: &[DatasetDocument]) -> anyhow::Result<String> {
    let mut body = String::new();
    for doc in docs {
        let action = json!({"index": {"_index": index_name, "_id": doc.record.dataset_id}});
        body.push_str(&serde_json::to_string(&action)?);
        body.push('\n');
        body.push_str(&serde_json::to_string(doc)?);
        body.push('\n');
    }
    Ok(body)
}

/// Per-item tally of a bulk response. The backend writes the successful
/// subset even when some items fail; failures are reported, not raised.
pub fn parse_bulk_report(response: &Value) -> BulkReport {
    let mut report = BulkReport::default();
    let Some(items) = response["items"].as_array() else {
        return report;
    };
    for item in items {
        let index = &item["index"];
        if index["error"].is_null() {
            report.success_count += 1;
        } else {
            let id = index["_id"].as_str().unwrap_or("unknown");
            let reason = index["error"]["reason"]
                .as_str()
                .map(|r| r.to_string())
                .unwrap_or_else(|| index["error"].to_string());
            report.errors.push(format!("{}: {}", id, reason));
        }
    }
    report
}

/// Partial-document update body. Only the mutable fields are written; the
/// embedding is included only when a new vector is supplied.
pub fn update_body(fields: &DatasetRecord, embedding: Option<&[f32]>) -> Value {
    let mut doc = json!({
        "name": fields.name,
        "description": fields.description,
        "keywords": fields.keywords,
        "domain": fields.domain,
        "data_summary": fields.data_summary,
        "columns_info": fields.columns_info,
        "status": fields.status,
        "updated_at": fields.updated_at,
    });
    if let Some(embedding) = embedding {
        doc["embedding"] = json!(embedding);
    }
    json!({"doc": doc})
}
