//! Text-to-vector encoders.
//!
//! `RemoteEncoder` wraps an OpenAI-protocol `/embeddings` endpoint and is
//! deliberately fail-open: remote trouble is logged and folded into zero
//! vectors so the search path degrades instead of erroring. `HashEncoder`
//! is a deterministic offline stand-in for dev and tests, selected with
//! `APP_USE_FAKE_EMBEDDINGS=1`.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use datamatch_core::config::EmbeddingConfig;
use datamatch_core::traits::TextEncoder;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: Vec<&'a str>,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingItem>,
}

#[derive(Deserialize)]
struct EmbeddingItem {
    embedding: Vec<f32>,
}

/// Client for a remote OpenAI-protocol embedding endpoint.
pub struct RemoteEncoder {
    client: Client,
    embeddings_url: String,
    api_key: Option<String>,
    model: String,
    dim: usize,
    normalize: bool,
}

impl RemoteEncoder {
    pub fn new(cfg: &EmbeddingConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()?;
        let base = cfg.base_url.trim_end_matches('/');
        info!(model = %cfg.model, url = %base, "initialized remote embedding client");
        Ok(Self {
            client,
            embeddings_url: format!("{}/embeddings", base),
            api_key: cfg.api_key.clone(),
            model: cfg.model.clone(),
            dim: cfg.dimension,
            normalize: cfg.normalize,
        })
    }

    fn zero_vector(&self) -> Vec<f32> {
        vec![0.0; self.dim]
    }

    /// One request for one chunk of inputs. This is the only place a
    /// remote failure surfaces as an `Err`; the public trait surface
    /// folds it into zero vectors.
    async fn request_embeddings(&self, inputs: &[&str]) -> Result<Vec<Vec<f32>>> {
        let request = EmbeddingRequest {
            model: &self.model,
            input: inputs.to_vec(),
        };
        let mut builder = self.client.post(&self.embeddings_url).json(&request);
        if let Some(key) = self.api_key.as_deref() {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("embedding endpoint returned {}: {}", status, body));
        }

        let response: EmbeddingResponse = response.json().await?;
        if response.data.len() != inputs.len() {
            return Err(anyhow!(
                "expected {} embeddings, got {}",
                inputs.len(),
                response.data.len()
            ));
        }

        Ok(response
            .data
            .into_iter()
            .map(|item| {
                let mut v = item.embedding;
                if self.normalize {
                    l2_normalize(&mut v);
                }
                v
            })
            .collect())
    }

    /// Encode one chunk, degrading to zeros per input on failure.
    /// Whitespace-only inputs never reach the network.
    async fn encode_chunk(&self, chunk: &[String]) -> Vec<Vec<f32>> {
        let trimmed: Vec<(usize, &str)> = chunk
            .iter()
            .enumerate()
            .map(|(i, t)| (i, t.trim()))
            .filter(|(_, t)| !t.is_empty())
            .collect();

        let mut out = vec![self.zero_vector(); chunk.len()];
        if trimmed.is_empty() {
            return out;
        }

        let inputs: Vec<&str> = trimmed.iter().map(|(_, t)| *t).collect();
        match self.request_embeddings(&inputs).await {
            Ok(vectors) => {
                for ((pos, _), vector) in trimmed.into_iter().zip(vectors) {
                    out[pos] = vector;
                }
            }
            Err(e) => {
                warn!(count = chunk.len(), error = %e, "embedding request failed, degrading to zero vectors");
            }
        }
        out
    }
}

#[async_trait]
impl TextEncoder for RemoteEncoder {
    fn dim(&self) -> usize {
        self.dim
    }

    async fn encode(&self, text: &str) -> Vec<f32> {
        if text.trim().is_empty() {
            debug!("empty input, returning zero vector without remote call");
            return self.zero_vector();
        }
        let mut vectors = self.encode_chunk(&[text.to_string()]).await;
        vectors.remove(0)
    }

    async fn encode_batch(&self, texts: &[String], batch_size: usize) -> Vec<Vec<f32>> {
        let chunk_size = batch_size.max(1);
        let mut out = Vec::with_capacity(texts.len());
        // Chunks go out strictly sequentially; no parallel fan-out.
        for chunk in texts.chunks(chunk_size) {
            out.extend(self.encode_chunk(chunk).await);
        }
        out
    }
}

/// Deterministic offline encoder hashing tokens into a fixed-size vector.
/// No semantic understanding; suitable for tests and wiring checks only.
pub struct HashEncoder {
    dim: usize,
}

impl HashEncoder {
    pub fn new(dim: usize) -> Self {
        Self { dim }
    }

    fn encode_sync(&self, text: &str) -> Vec<f32> {
        use std::hash::{Hash, Hasher};
        use twox_hash::XxHash64;

        let mut v = vec![0f32; self.dim];
        if text.trim().is_empty() {
            return v;
        }
        for (i, token) in text.split_whitespace().enumerate() {
            let mut hasher = XxHash64::with_seed(0);
            token.hash(&mut hasher);
            let h = hasher.finish();
            let idx = (h as usize) % self.dim;
            let val = (((h >> 32) as u32) as f32) / (u32::MAX as f32);
            v[idx] += val + (i as f32 % 3.0) * 0.01;
        }
        l2_normalize(&mut v);
        v
    }
}

#[async_trait]
impl TextEncoder for HashEncoder {
    fn dim(&self) -> usize {
        self.dim
    }

    async fn encode(&self, text: &str) -> Vec<f32> {
        self.encode_sync(text)
    }

    async fn encode_batch(&self, texts: &[String], _batch_size: usize) -> Vec<Vec<f32>> {
        texts.iter().map(|t| self.encode_sync(t)).collect()
    }
}

/// Encoder selection: `APP_USE_FAKE_EMBEDDINGS=1` switches to the offline
/// hash encoder, otherwise the remote client is built from config.
pub fn default_encoder(cfg: &EmbeddingConfig) -> Result<Arc<dyn TextEncoder>> {
    let use_fake = std::env::var("APP_USE_FAKE_EMBEDDINGS")
        .ok()
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false);
    if use_fake {
        info!("using offline hash encoder");
        return Ok(Arc::new(HashEncoder::new(cfg.dimension)));
    }
    Ok(Arc::new(RemoteEncoder::new(cfg)?))
}

fn l2_normalize(v: &mut [f32]) {
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 1e-12 {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
}
