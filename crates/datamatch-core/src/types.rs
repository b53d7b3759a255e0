//! Domain types shared by the intent, embedding, index and engine crates.

use serde::{Deserialize, Serialize};

/// Coarse subject-matter category tagged onto datasets and extracted
/// from questions. Serialized snake_case on the wire; `label()` is the
/// Chinese display form used in match reasons.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    Land,
    Finance,
    Population,
    Economy,
    Environment,
    Transport,
    #[default]
    Generic,
}

impl Domain {
    pub fn label(&self) -> &'static str {
        match self {
            Domain::Land => "土地",
            Domain::Finance => "金融",
            Domain::Population => "人口",
            Domain::Economy => "经济",
            Domain::Environment => "环境",
            Domain::Transport => "交通",
            Domain::Generic => "通用",
        }
    }
}

/// How the caller wants the answer shaped, classified from canonical
/// phrase sets in the question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryType {
    Statistics,
    Comparison,
    Trend,
    Distribution,
    Ranking,
    Proportion,
}

impl QueryType {
    pub fn label(&self) -> &'static str {
        match self {
            QueryType::Statistics => "统计类",
            QueryType::Comparison => "比较类",
            QueryType::Trend => "趋势类",
            QueryType::Distribution => "分布类",
            QueryType::Ranking => "排名类",
            QueryType::Proportion => "占比类",
        }
    }
}

/// Structured signals extracted from a free-text question.
///
/// `keywords` is deduplicated preserving first-seen order; at most one
/// `domain`, `location` and `time_range` per intent (first/most-specific
/// match wins). `time_range` is normalized to the form "<year>年".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryIntent {
    pub keywords: Vec<String>,
    pub domain: Option<Domain>,
    pub location: Option<String>,
    pub time_range: Option<String>,
    pub query_type: Option<QueryType>,
    pub subject: Option<String>,
}

/// The searchable fields of one indexed dataset, i.e. everything in the
/// index document except the embedding. Search responses exclude the
/// embedding field, so hits deserialize straight into this struct.
/// Defaults cover documents written under the reduced schema.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatasetRecord {
    pub dataset_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub domain: Domain,
    #[serde(default)]
    pub data_summary: String,
    #[serde(default)]
    pub columns_info: String,
    #[serde(default)]
    pub tree_node_id: String,
    #[serde(default)]
    pub file_path: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// One full index document: record fields plus the embedding vector.
/// Invariant: `embedding.len()` equals the corpus-wide dimension D.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetDocument {
    #[serde(flatten)]
    pub record: DatasetRecord,
    pub embedding: Vec<f32>,
}

/// A raw similarity hit returned by the vector index.
/// `similarity_score` is restored cosine similarity in [-1, 1].
#[derive(Debug, Clone)]
pub struct ScoredDocument {
    pub record: DatasetRecord,
    pub similarity_score: f32,
}

/// Final ranked candidate returned to callers. `enhanced_score` is the
/// calibrated [0, 1] score; ordering is descending with stable ties.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchResult {
    pub dataset_id: String,
    pub dataset_name: String,
    pub description: String,
    pub vector_score: f32,
    pub enhanced_score: f32,
    pub match_reason: String,
    pub domain: Domain,
    pub keywords: Vec<String>,
    pub tree_node_id: String,
}

/// Tally returned by the corpus sync; partial failures land in `errors`
/// and never abort the run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncReport {
    pub total_count: usize,
    pub success_count: usize,
    pub failed_count: usize,
    pub errors: Vec<String>,
}

/// Dataset row as owned by the external metadata collaborator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatasetMeta {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tree_node_id: String,
    #[serde(default)]
    pub file_path: String,
    #[serde(default)]
    pub actual_data_path: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl DatasetMeta {
    /// Preferred on-disk location of the underlying data file.
    pub fn data_path(&self) -> &str {
        match self.actual_data_path.as_deref() {
            Some(p) if !p.is_empty() => p,
            _ => &self.file_path,
        }
    }
}

/// Column row as owned by the external metadata collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnMeta {
    pub name: String,
    #[serde(rename = "type")]
    pub col_type: String,
}

/// Optional equality filters narrowing a similarity search.
#[derive(Debug, Clone, Default)]
pub struct SearchFilters {
    pub status: Option<String>,
    pub domain: Option<Domain>,
    pub tree_node_id: Option<String>,
}

impl SearchFilters {
    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.domain.is_none() && self.tree_node_id.is_none()
    }
}

/// Per-item outcome of a bulk upsert; the successful subset is written
/// even when some items fail.
#[derive(Debug, Clone, Default)]
pub struct BulkReport {
    pub success_count: usize,
    pub errors: Vec<String>,
}

/// Lightweight index health snapshot for operators.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexStats {
    pub index_name: String,
    pub document_count: u64,
}
