//! Human-readable match-reason strings.
//!
//! Reasons are explanatory only and computed independently of the boost
//! pipeline: a reason mentioning a keyword match does not imply the boost
//! applied, and vice versa.

use datamatch_core::types::{DatasetRecord, QueryIntent};

const FALLBACK_REASON: &str = "基于语义相似度匹配";

/// Compose the reason string for one candidate from the raw similarity
/// band plus whichever signals line up, joined in a fixed order.
pub fn match_reason(record: &DatasetRecord, intent: &QueryIntent, vector_score: f32) -> String {
    let mut reasons: Vec<String> = Vec::new();

    reasons.push(similarity_band(vector_score).to_string());

    if let Some(domain) = intent.domain {
        if domain == record.domain {
            reasons.push(format!("业务领域匹配({})", domain.label()));
        }
    }

    let overlapping: Vec<&str> = intent
        .keywords
        .iter()
        .filter(|k| record.keywords.contains(k))
        .map(|k| k.as_str())
        .take(3)
        .collect();
    if !overlapping.is_empty() {
        reasons.push(format!("关键词匹配({})", overlapping.join(", ")));
    }

    let in_name: Vec<&str> = intent
        .keywords
        .iter()
        .filter(|k| record.name.contains(k.as_str()))
        .map(|k| k.as_str())
        .take(2)
        .collect();
    if !in_name.is_empty() {
        reasons.push(format!("数据集名称包含关键词({})", in_name.join(", ")));
    }

    if reasons.is_empty() {
        FALLBACK_REASON.to_string()
    } else {
        reasons.join("; ")
    }
}

fn similarity_band(vector_score: f32) -> &'static str {
    if vector_score > 0.7 {
        "语义高度相关"
    } else if vector_score > 0.5 {
        "语义相关"
    } else {
        "语义部分相关"
    }
}
