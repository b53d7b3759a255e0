//! Deterministic boost/penalty re-scoring of raw similarity hits.
//!
//! Every rule is a pure function of (record, intent) contributing a signed
//! delta to a multiplicative boost that starts at 1.0. Rules run in a fixed
//! order because the combined time+location rule and the keyword-overlap
//! rule both read the match flags set by the earlier rules. The final boost
//! is capped at [`MAX_BOOST`] and the enhanced score is clamped to [0, 1].

use datamatch_core::types::{DatasetRecord, MatchResult, QueryIntent, ScoredDocument};
use std::cmp::Ordering;

pub const MAX_BOOST: f32 = 1.5;

/// Match flags shared between ordered rules. `None` means the intent did
/// not carry the signal at all, which is neither a match nor a mismatch.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoostSignals {
    pub domain_matched: bool,
    pub time_matched: Option<bool>,
    pub location_matched: Option<bool>,
}

type Rule = fn(&DatasetRecord, &QueryIntent, &mut BoostSignals) -> f32;

const RULES: &[Rule] = &[
    domain_rule,
    time_rule,
    location_rule,
    combined_rule,
    keyword_overlap_rule,
    name_rule,
    description_rule,
];

/// Run every rule against one candidate, returning the capped boost and
/// the signal flags that produced it.
pub fn compute_boost(record: &DatasetRecord, intent: &QueryIntent) -> (f32, BoostSignals) {
    let mut signals = BoostSignals::default();
    let mut boost = 1.0;
    for rule in RULES {
        boost += rule(record, intent, &mut signals);
    }
    (boost.min(MAX_BOOST), signals)
}

/// Calibrated final score: similarity is clamped to [0, 1] before the
/// boost applies, and the product is clamped back to [0, 1].
pub fn enhanced_score(similarity: f32, boost: f32) -> f32 {
    (similarity.clamp(0.0, 1.0) * boost).clamp(0.0, 1.0)
}

/// Re-score raw hits, rank descending by enhanced score (stable on ties)
/// and keep the top `max_results`.
pub fn score_and_rank(
    hits: &[ScoredDocument],
    intent: &QueryIntent,
    max_results: usize,
) -> Vec<MatchResult> {
    let mut results: Vec<MatchResult> = hits
        .iter()
        .map(|hit| {
            let (boost, _) = compute_boost(&hit.record, intent);
            MatchResult {
                dataset_id: hit.record.dataset_id.clone(),
                dataset_name: hit.record.name.clone(),
                description: hit.record.description.clone(),
                vector_score: hit.similarity_score,
                enhanced_score: enhanced_score(hit.similarity_score, boost),
                match_reason: crate::reason::match_reason(
                    &hit.record,
                    intent,
                    hit.similarity_score,
                ),
                domain: hit.record.domain,
                keywords: hit.record.keywords.clone(),
                tree_node_id: hit.record.tree_node_id.clone(),
            }
        })
        .collect();
    results.sort_by(|a, b| {
        b.enhanced_score
            .partial_cmp(&a.enhanced_score)
            .unwrap_or(Ordering::Equal)
    });
    results.truncate(max_results);
    results
}

fn domain_rule(record: &DatasetRecord, intent: &QueryIntent, signals: &mut BoostSignals) -> f32 {
    match intent.domain {
        Some(domain) if domain == record.domain => {
            signals.domain_matched = true;
            0.10
        }
        _ => 0.0,
    }
}

fn time_rule(record: &DatasetRecord, intent: &QueryIntent, signals: &mut BoostSignals) -> f32 {
    let Some(time) = &intent.time_range else {
        return 0.0;
    };
    let hit = record.keywords.iter().any(|k| k == time);
    signals.time_matched = Some(hit);
    if hit {
        0.10
    } else {
        -0.20
    }
}

fn location_rule(record: &DatasetRecord, intent: &QueryIntent, signals: &mut BoostSignals) -> f32 {
    let Some(location) = &intent.location else {
        return 0.0;
    };
    let hit = record.keywords.iter().any(|k| k == location);
    signals.location_matched = Some(hit);
    if hit {
        0.20
    } else {
        -0.30
    }
}

/// Agreement bonus/penalty once both period and place were asked for.
fn combined_rule(_record: &DatasetRecord, _intent: &QueryIntent, signals: &mut BoostSignals) -> f32 {
    match (signals.time_matched, signals.location_matched) {
        (Some(true), Some(true)) => 0.20,
        (Some(false), Some(false)) => -0.20,
        _ => 0.0,
    }
}

/// Topical keyword overlap. De-weighted when both time and location
/// mismatched, so topic overlap alone cannot rescue a wrong-period,
/// wrong-place candidate.
fn keyword_overlap_rule(
    record: &DatasetRecord,
    intent: &QueryIntent,
    signals: &mut BoostSignals,
) -> f32 {
    let both_mismatched = matches!(
        (signals.time_matched, signals.location_matched),
        (Some(false), Some(false))
    );
    let (per_match, cap) = if both_mismatched { (0.01, 0.05) } else { (0.03, 0.15) };
    let overlap = intent
        .keywords
        .iter()
        .filter(|k| intent.time_range.as_ref() != Some(k))
        .filter(|k| intent.location.as_ref() != Some(k))
        .filter(|k| record.keywords.contains(k))
        .count();
    (per_match * overlap as f32).min(cap)
}

fn name_rule(record: &DatasetRecord, intent: &QueryIntent, _signals: &mut BoostSignals) -> f32 {
    let name = record.name.to_lowercase();
    let hit = intent
        .keywords
        .iter()
        .any(|k| name.contains(&k.to_lowercase()));
    if hit {
        0.08
    } else {
        0.0
    }
}

fn description_rule(
    record: &DatasetRecord,
    intent: &QueryIntent,
    _signals: &mut BoostSignals,
) -> f32 {
    let description = record.description.to_lowercase();
    let hit = intent
        .keywords
        .iter()
        .any(|k| description.contains(&k.to_lowercase()));
    if hit {
        0.05
    } else {
        0.0
    }
}
