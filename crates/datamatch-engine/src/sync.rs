//! Corpus synchronization: metadata store to vector index.
//!
//! A sync run tolerates per-dataset failures: every failure is tallied
//! and described in the report, and the run only errors when the target
//! set itself cannot be enumerated.

use crate::derive;
use crate::MatchingEngine;
use datamatch_core::error::{Error, Result};
use datamatch_core::types::{DatasetDocument, DatasetMeta, SyncReport};
use tracing::{info, warn};

impl MatchingEngine {
    /// Re-derive, re-embed and re-index the given datasets, or the whole
    /// corpus when `dataset_ids` is `None`.
    ///
    /// Documents are always re-derived and overwritten in place;
    /// `force_refresh` is accepted for callers that track staleness
    /// themselves and currently only affects logging.
    pub async fn sync_datasets_to_vector_store(
        &self,
        force_refresh: bool,
        dataset_ids: Option<&[i64]>,
    ) -> Result<SyncReport> {
        self.index.ensure_schema().await;
        info!(force_refresh, targeted = dataset_ids.is_some(), "corpus sync started");

        let mut report = SyncReport::default();
        match dataset_ids {
            None => {
                let datasets = self.store.list_all_datasets()?;
                report.total_count = datasets.len();
                for meta in datasets {
                    self.sync_one(&meta, &mut report).await;
                }
            }
            Some(ids) => {
                report.total_count = ids.len();
                for &id in ids {
                    match self.store.get_dataset(id) {
                        Ok(Some(meta)) => self.sync_one(&meta, &mut report).await,
                        Ok(None) => record_failure(
                            &mut report,
                            format!("数据集 {} 不存在", id),
                        ),
                        Err(e) => record_failure(
                            &mut report,
                            format!("数据集 {} 处理失败: {}", id, e),
                        ),
                    }
                }
            }
        }

        info!(
            total = report.total_count,
            success = report.success_count,
            failed = report.failed_count,
            "corpus sync finished"
        );
        Ok(report)
    }

    /// Re-index one dataset. `Ok(false)` means the dataset was found but
    /// could not be indexed; an unknown id is an error.
    pub async fn reindex_dataset(&self, id: i64) -> Result<bool> {
        let Some(meta) = self.store.get_dataset(id)? else {
            return Err(Error::NotFound(format!("dataset {}", id)));
        };
        match self.index_one(&meta).await {
            Ok(()) => Ok(true),
            Err(e) => {
                warn!(dataset_id = id, error = %e, "dataset reindex failed");
                Ok(false)
            }
        }
    }

    /// Drop one dataset's document from the index. Absent ids yield
    /// `false`, matching the index contract.
    pub async fn remove_dataset(&self, id: i64) -> bool {
        self.index.delete(&id.to_string()).await
    }

    async fn sync_one(&self, meta: &DatasetMeta, report: &mut SyncReport) {
        match self.index_one(meta).await {
            Ok(()) => report.success_count += 1,
            Err(e) => record_failure(report, format!("数据集 {} 处理失败: {}", meta.id, e)),
        }
    }

    async fn index_one(&self, meta: &DatasetMeta) -> anyhow::Result<()> {
        let columns = self.store.list_columns(meta.id)?;
        let record = derive::build_record(meta, &columns, &self.config.sync);
        let embedding = self
            .encoder
            .encode(&derive::compose_embedding_text(&record))
            .await;
        let document = DatasetDocument { record, embedding };
        if !self.index.upsert(&document).await {
            anyhow::bail!("索引失败");
        }
        Ok(())
    }
}

fn record_failure(report: &mut SyncReport, message: String) {
    warn!(error = %message, "dataset sync failed");
    report.failed_count += 1;
    report.errors.push(message);
}
