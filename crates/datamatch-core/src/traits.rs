use crate::error::Result;
use crate::types::{
    BulkReport, ColumnMeta, DatasetDocument, DatasetMeta, DatasetRecord, IndexStats,
    ScoredDocument, SearchFilters,
};
use async_trait::async_trait;

/// Boundary to the relational store that owns dataset/column metadata.
/// Out of scope here; the engine only enumerates and reads.
pub trait MetadataStore: Send + Sync {
    fn list_all_datasets(&self) -> Result<Vec<DatasetMeta>>;
    fn get_dataset(&self, id: i64) -> Result<Option<DatasetMeta>>;
    fn list_columns(&self, dataset_id: i64) -> Result<Vec<ColumnMeta>>;
}

/// Text-to-vector encoder. The surface is infallible by contract: a
/// failed or empty encode yields a zero vector of dimension `dim()`,
/// which scores near zero against everything instead of erroring the
/// search path.
#[async_trait]
pub trait TextEncoder: Send + Sync {
    fn dim(&self) -> usize;
    async fn encode(&self, text: &str) -> Vec<f32>;
    async fn encode_batch(&self, texts: &[String], batch_size: usize) -> Vec<Vec<f32>>;
}

/// The external document index holding one embedded document per dataset.
#[async_trait]
pub trait DatasetIndex: Send + Sync {
    /// Idempotent schema bootstrap. Never raises: a constrained backend
    /// degrades to a reduced schema and the failure is logged.
    async fn ensure_schema(&self);

    /// Cosine-similarity search. `min_score` applies to the restored
    /// similarity in [-1, 1]; responses exclude the embedding field.
    async fn search(
        &self,
        query_vector: &[f32],
        size: usize,
        min_score: f32,
        filters: &SearchFilters,
    ) -> Result<Vec<ScoredDocument>>;

    /// Index/replace one document by dataset id.
    async fn upsert(&self, doc: &DatasetDocument) -> bool;

    /// Batched upsert; partial failures are reported per item.
    async fn bulk_upsert(&self, docs: &[DatasetDocument]) -> BulkReport;

    /// Partial-field update; the embedding is only overwritten when given.
    async fn update(
        &self,
        dataset_id: &str,
        fields: &DatasetRecord,
        embedding: Option<&[f32]>,
    ) -> bool;

    /// Remove one document. Absent ids yield `false`, not an error.
    async fn delete(&self, dataset_id: &str) -> bool;

    async fn stats(&self) -> Result<IndexStats>;
}
