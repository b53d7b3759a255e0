//! Elasticsearch-protocol vector index client.
//!
//! Owns the document collection holding one embedded document per dataset:
//! schema bootstrap (with a reduced-schema fallback so a constrained
//! backend degrades instead of blocking startup), script-scored cosine
//! similarity search, and single/bulk/partial write operations.

pub mod schema;
pub mod search;
pub mod writer;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use datamatch_core::config::IndexConfig;
use datamatch_core::error::{Error, Result as CoreResult};
use datamatch_core::traits::DatasetIndex;
use datamatch_core::types::{
    BulkReport, DatasetDocument, DatasetRecord, IndexStats, ScoredDocument, SearchFilters,
};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, warn};

pub struct EsVectorIndex {
    client: Client,
    base_url: String,
    index_name: String,
    username: Option<String>,
    password: Option<String>,
    dim: usize,
}

impl EsVectorIndex {
    pub fn new(cfg: &IndexConfig, dim: usize) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()?;
        info!(url = %cfg.url, index = %cfg.index_name, "initialized vector index client");
        Ok(Self {
            client,
            base_url: cfg.url.trim_end_matches('/').to_string(),
            index_name: cfg.index_name.clone(),
            username: cfg.username.clone(),
            password: cfg.password.clone(),
            dim,
        })
    }

    pub fn index_name(&self) -> &str {
        &self.index_name
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let mut builder = self
            .client
            .request(method, format!("{}/{}", self.base_url, path));
        if let Some(username) = &self.username {
            builder = builder.basic_auth(username, self.password.as_deref());
        }
        builder
    }

    async fn index_exists(&self) -> Result<bool> {
        let response = self
            .request(Method::HEAD, &self.index_name)
            .send()
            .await?;
        match response.status() {
            StatusCode::OK => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            status => Err(anyhow!("index existence check returned {}", status)),
        }
    }

    async fn create_index(&self, mapping: Value) -> Result<()> {
        let response = self
            .request(Method::PUT, &self.index_name)
            .json(&mapping)
            .send()
            .await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("index creation returned {}: {}", status, body));
        }
        Ok(())
    }
}

#[async_trait]
impl DatasetIndex for EsVectorIndex {
    async fn ensure_schema(&self) {
        match self.index_exists().await {
            Ok(true) => {
                debug!(index = %self.index_name, "index already exists");
                return;
            }
            Ok(false) => {}
            Err(e) => {
                warn!(error = %e, "index existence check failed; vector search may be unavailable");
                return;
            }
        }

        info!(index = %self.index_name, "creating vector index");
        if let Err(e) = self.create_index(schema::full_mapping(self.dim)).await {
            warn!(error = %e, "full schema creation failed, trying reduced schema");
            if let Err(e) = self.create_index(schema::reduced_mapping(self.dim)).await {
                warn!(error = %e, "reduced schema creation failed; vector search may be unavailable");
            } else {
                info!(index = %self.index_name, "reduced schema created");
            }
        }
    }

    async fn search(
        &self,
        query_vector: &[f32],
        size: usize,
        min_score: f32,
        filters: &SearchFilters,
    ) -> CoreResult<Vec<ScoredDocument>> {
        let body = search::search_body(query_vector, size, filters);
        let response = self
            .request(Method::POST, &format!("{}/_search", self.index_name))
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Index(e.to_string()))?;
        if !response.status().is_success() {
            return Err(Error::Index(format!(
                "search returned {}",
                response.status()
            )));
        }
        let value: Value = response
            .json()
            .await
            .map_err(|e| Error::Index(e.to_string()))?;
        let hits = search::parse_hits(&value, min_score);
        debug!(count = hits.len(), "similarity search completed");
        Ok(hits)
    }

    async fn upsert(&self, doc: &DatasetDocument) -> bool {
        let path = format!("{}/_doc/{}", self.index_name, doc.record.dataset_id);
        match self.request(Method::PUT, &path).json(doc).send().await {
            Ok(response) if response.status().is_success() => {
                debug!(dataset_id = %doc.record.dataset_id, "document indexed");
                true
            }
            Ok(response) => {
                warn!(dataset_id = %doc.record.dataset_id, status = %response.status(), "document index failed");
                false
            }
            Err(e) => {
                warn!(dataset_id = %doc.record.dataset_id, error = %e, "document index failed");
                false
            }
        }
    }

    async fn bulk_upsert(&self, docs: &[DatasetDocument]) -> BulkReport {
        if docs.is_empty() {
            return BulkReport::default();
        }
        let body = match writer::bulk_body(&self.index_name, docs) {
            Ok(body) => body,
            Err(e) => {
                return BulkReport {
                    success_count: 0,
                    errors: vec![format!("bulk body serialization failed: {}", e)],
                }
            }
        };
        let result = self
            .request(Method::POST, "_bulk")
            .header("Content-Type", "application/x-ndjson")
            .body(body)
            .send()
            .await;
        match result {
            Ok(response) if response.status().is_success() => match response.json::<Value>().await
            {
                Ok(value) => {
                    let report = writer::parse_bulk_report(&value);
                    if !report.errors.is_empty() {
                        warn!(failed = report.errors.len(), "bulk index partially failed");
                    }
                    report
                }
                Err(e) => BulkReport {
                    success_count: 0,
                    errors: vec![format!("bulk response decode failed: {}", e)],
                },
            },
            Ok(response) => BulkReport {
                success_count: 0,
                errors: vec![format!("bulk request returned {}", response.status())],
            },
            Err(e) => BulkReport {
                success_count: 0,
                errors: vec![format!("bulk request failed: {}", e)],
            },
        }
    }

    async fn update(
        &self,
        dataset_id: &str,
        fields: &DatasetRecord,
        embedding: Option<&[f32]>,
    ) -> bool {
        let body = writer::update_body(fields, embedding);
        let path = format!("{}/_update/{}", self.index_name, dataset_id);
        match self.request(Method::POST, &path).json(&body).send().await {
            Ok(response) if response.status().is_success() => true,
            Ok(response) => {
                warn!(dataset_id, status = %response.status(), "document update failed");
                false
            }
            Err(e) => {
                warn!(dataset_id, error = %e, "document update failed");
                false
            }
        }
    }

    async fn delete(&self, dataset_id: &str) -> bool {
        let path = format!("{}/_doc/{}", self.index_name, dataset_id);
        match self.request(Method::DELETE, &path).send().await {
            Ok(response) if response.status().is_success() => {
                debug!(dataset_id, "document deleted");
                true
            }
            Ok(response) => {
                // Deleting an absent id is not an error to our callers.
                warn!(dataset_id, status = %response.status(), "document delete failed");
                false
            }
            Err(e) => {
                warn!(dataset_id, error = %e, "document delete failed");
                false
            }
        }
    }

    async fn stats(&self) -> CoreResult<IndexStats> {
        let response = self
            .request(Method::GET, &format!("{}/_count", self.index_name))
            .send()
            .await
            .map_err(|e| Error::Index(e.to_string()))?;
        if !response.status().is_success() {
            return Err(Error::Index(format!(
                "count returned {}",
                response.status()
            )));
        }
        let value: Value = response
            .json()
            .await
            .map_err(|e| Error::Index(e.to_string()))?;
        Ok(IndexStats {
            index_name: self.index_name.clone(),
            document_count: value["count"].as_u64().unwrap_or(0),
        })
    }
}
