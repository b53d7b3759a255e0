//! Semantic dataset matching: question in, ranked dataset candidates out.
//!
//! `MatchingEngine` wires the intent extractor, the text encoder, the
//! vector index and the metadata store together. The query path is
//! fail-open end to end: encoder failures become zero vectors upstream,
//! index failures become an empty result list here, and a question that
//! matches nothing returns an empty list rather than an error.

#![deny(warnings)]
#![deny(dead_code)]
#![deny(unused_variables)]
#![deny(unused_imports)]

pub mod derive;
pub mod reason;
pub mod score;
mod sync;

use datamatch_core::config::EngineConfig;
use datamatch_core::traits::{DatasetIndex, MetadataStore, TextEncoder};
use datamatch_core::types::{MatchResult, SearchFilters};
use std::sync::Arc;
use tracing::{debug, warn};

pub struct MatchingEngine {
    config: EngineConfig,
    encoder: Arc<dyn TextEncoder>,
    index: Arc<dyn DatasetIndex>,
    store: Arc<dyn MetadataStore>,
}

impl MatchingEngine {
    pub fn new(
        config: EngineConfig,
        encoder: Arc<dyn TextEncoder>,
        index: Arc<dyn DatasetIndex>,
        store: Arc<dyn MetadataStore>,
    ) -> Self {
        Self {
            config,
            encoder,
            index,
            store,
        }
    }

    /// Match a free-text question against the indexed corpus.
    ///
    /// Extracts intent signals, embeds the question, over-fetches raw
    /// similarity candidates, re-scores them with the deterministic
    /// boost/penalty rules and returns the top `max_results` with
    /// enhanced score at or above `min_score`, best first.
    pub async fn recognize_intent(
        &self,
        question: &str,
        max_results: usize,
        min_score: f32,
    ) -> Vec<MatchResult> {
        let intent = datamatch_intent::extract(question);
        debug!(
            domain = ?intent.domain,
            location = ?intent.location,
            time_range = ?intent.time_range,
            keywords = intent.keywords.len(),
            "extracted query intent"
        );

        let query_vector = self.encoder.encode(question).await;
        let fetch_size = max_results.max(1) * self.config.matching.overfetch_factor.max(1);
        // The raw-similarity floor stays open here; the threshold applies
        // to the enhanced score after re-scoring.
        let hits = match self
            .index
            .search(&query_vector, fetch_size, 0.0, &SearchFilters::default())
            .await
        {
            Ok(hits) => hits,
            Err(e) => {
                warn!(error = %e, "similarity search failed; returning no matches");
                return Vec::new();
            }
        };
        debug!(candidates = hits.len(), "re-scoring similarity candidates");

        score::score_and_rank(&hits, &intent, max_results)
            .into_iter()
            .filter(|result| result.enhanced_score >= min_score)
            .collect()
    }
}
