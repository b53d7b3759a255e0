//! Similarity-search request body and hit parsing.
//!
//! Several vector index backends require non-negative relevance scores, so
//! the script scores documents as `cosineSimilarity + 1.0` (range [0, 2])
//! and parsing subtracts the 1.0 back off, restoring [-1, 1].

use datamatch_core::types::{DatasetRecord, ScoredDocument, SearchFilters};
use serde_json::{json, Value};
use tracing::warn;

pub fn search_body(query_vector: &[f32], size: usize, filters: &SearchFilters) -> Value {
    let inner = if filters.is_empty() {
        json!({"match_all": {}})
    } else {
        json!({"bool": {"filter": filter_clauses(filters)}})
    };
    json!({
        "size": size,
        "query": {
            "script_score": {
                "query": inner,
                "script": {
                    "source": "cosineSimilarity(params.query_vector, 'embedding') + 1.0",
                    "params": {"query_vector": query_vector}
                }
            }
        },
        // Keep response payloads small: the raw vector is never needed
        // by callers of search.
        "_source": {"excludes": ["embedding"]}
    })
}

fn filter_clauses(filters: &SearchFilters) -> Vec<Value> {
    let mut clauses = Vec::new();
    if let Some(status) = &filters.status {
        clauses.push(json!({"term": {"status": status}}));
    }
    if let Some(domain) = &filters.domain {
        clauses.push(json!({"term": {"domain": domain}}));
    }
    if let Some(tree_node_id) = &filters.tree_node_id {
        clauses.push(json!({"term": {"tree_node_id": tree_node_id}}));
    }
    clauses
}

/// Map a search response to scored documents, restoring the similarity
/// range and dropping hits below `min_score`. Unparsable hits are logged
/// and skipped rather than failing the whole response.
pub fn parse_hits(response: &Value, min_score: f32) -> Vec<ScoredDocument> {
    let Some(hits) = response["hits"]["hits"].as_array() else {
        return Vec::new();
    };

    let mut out = Vec::with_capacity(hits.len());
    for hit in hits {
        let Some(raw_score) = hit["_score"].as_f64() else {
            continue;
        };
        let similarity_score = raw_score as f32 - 1.0;
        if similarity_score < min_score {
            continue;
        }
        match serde_json::from_value::<DatasetRecord>(hit["_source"].clone()) {
            Ok(record) => out.push(ScoredDocument {
                record,
                similarity_score,
            }),
            Err(e) => warn!(error = %e, "skipping unparsable search hit"),
        }
    }
    out
}
