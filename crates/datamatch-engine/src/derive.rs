//! Index-document derivation from raw dataset metadata.
//!
//! Builds the searchable record for one dataset: derived keywords, an
//! inferred domain, a field summary and the composed text handed to the
//! embedding encoder. Optionally samples the underlying csv file for
//! marker-column values when the sync is configured to scan data files.

use datamatch_core::config::{expand_path, SyncConfig};
use datamatch_core::types::{ColumnMeta, DatasetMeta, DatasetRecord, Domain};
use datamatch_intent::rules::{ideographic_runs, DOMAIN_RULES};
use std::collections::HashSet;
use tracing::{debug, warn};

/// Connectives and filler terms never worth indexing as keywords.
const DERIVE_STOPWORDS: &[&str] = &[
    "是", "的", "了", "在", "有", "和", "与", "及", "或", "但", "而", "数据", "信息", "记录",
];

/// Well-known categorical columns whose values make strong keywords:
/// land-class, unit and administrative-division names.
const MARKER_COLUMNS: &[&str] = &["DLMC", "ZLDWMC", "XZQMC", "QSDWMC"];

/// Build the full index record for one dataset.
pub fn build_record(meta: &DatasetMeta, columns: &[ColumnMeta], cfg: &SyncConfig) -> DatasetRecord {
    DatasetRecord {
        dataset_id: meta.id.to_string(),
        name: meta.name.clone(),
        description: meta.description.clone(),
        keywords: derive_keywords(meta, columns, cfg),
        domain: infer_domain(meta, columns),
        data_summary: build_summary(meta, columns),
        columns_info: columns_info(columns),
        tree_node_id: meta.tree_node_id.clone(),
        file_path: meta.file_path.clone(),
        status: meta.status.clone().unwrap_or_else(|| "active".to_string()),
        created_at: meta.created_at.clone(),
        updated_at: meta.updated_at.clone(),
    }
}

/// Keywords derived from the name, description and column names, with
/// optional marker-column values sampled from the data file. Capped at
/// `cfg.keyword_limit`, insertion order preserved.
pub fn derive_keywords(
    meta: &DatasetMeta,
    columns: &[ColumnMeta],
    cfg: &SyncConfig,
) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut keywords: Vec<String> = Vec::new();
    let mut push = |candidate: &str| {
        let candidate = candidate.trim();
        if candidate.chars().count() > 1
            && !DERIVE_STOPWORDS.contains(&candidate)
            && seen.insert(candidate.to_string())
        {
            keywords.push(candidate.to_string());
        }
    };

    for source in [meta.name.as_str(), meta.description.as_str()] {
        for run in ideographic_runs(source) {
            push(&run);
        }
    }
    for column in columns {
        for run in ideographic_runs(&column.name) {
            push(&run);
        }
    }

    if cfg.scan_data_files {
        for value in scan_marker_values(meta.data_path(), columns, cfg.scan_row_limit) {
            push(&value);
        }
    }

    keywords.truncate(cfg.keyword_limit);
    keywords
}

/// First domain whose keyword table hits the dataset's name, description
/// or column names (case-insensitive); generic otherwise.
pub fn infer_domain(meta: &DatasetMeta, columns: &[ColumnMeta]) -> Domain {
    let mut text = format!("{} {}", meta.name, meta.description);
    for column in columns {
        text.push(' ');
        text.push_str(&column.name);
    }
    let text = text.to_lowercase();

    for (domain, keywords) in DOMAIN_RULES {
        if keywords.iter().any(|kw| text.contains(&kw.to_lowercase())) {
            return *domain;
        }
    }
    Domain::Generic
}

/// One-line field summary, e.g.
/// "耕地图斑包含5个字段，包括3个文本字段, 2个数值字段".
pub fn build_summary(meta: &DatasetMeta, columns: &[ColumnMeta]) -> String {
    let name = if meta.name.is_empty() {
        "未命名数据集"
    } else {
        meta.name.as_str()
    };
    let mut summary = format!("{}包含{}个字段", name, columns.len());

    let mut counts: Vec<(&str, usize)> = Vec::new();
    for (col_type, label) in [
        ("string", "文本字段"),
        ("integer", "整数字段"),
        ("float", "数值字段"),
        ("datetime", "日期字段"),
    ] {
        let count = columns.iter().filter(|c| c.col_type == col_type).count();
        if count > 0 {
            counts.push((label, count));
        }
    }
    if !counts.is_empty() {
        let parts: Vec<String> = counts
            .iter()
            .map(|(label, count)| format!("{}个{}", count, label))
            .collect();
        summary.push_str("，包括");
        summary.push_str(&parts.join(", "));
    }
    summary
}

/// "name(type)" list for the columns_info field.
pub fn columns_info(columns: &[ColumnMeta]) -> String {
    let parts: Vec<String> = columns
        .iter()
        .map(|c| format!("{}({})", c.name, c.col_type))
        .collect();
    parts.join(", ")
}

/// Compose the text fed to the embedding encoder. Labeled sections joined
/// by single spaces; empty sections are skipped entirely.
pub fn compose_embedding_text(record: &DatasetRecord) -> String {
    let mut parts: Vec<String> = Vec::new();
    if !record.name.is_empty() {
        parts.push(format!("数据集名称：{}", record.name));
    }
    if !record.description.is_empty() {
        parts.push(format!("描述：{}", record.description));
    }
    if !record.keywords.is_empty() {
        parts.push(format!("关键词：{}", record.keywords.join(", ")));
    }
    parts.push(format!("业务领域：{}", record.domain.label()));
    if !record.data_summary.is_empty() {
        parts.push(format!("数据摘要：{}", record.data_summary));
    }
    if !record.columns_info.is_empty() {
        parts.push(format!("数据字段：{}", record.columns_info));
    }
    parts.join(" ")
}

/// Sample up to `row_limit` rows of the data file, collecting distinct
/// values of the marker columns present in the schema. The path may carry
/// `~` or env-var placeholders; unreadable files degrade to no extra
/// keywords.
fn scan_marker_values(path: &str, columns: &[ColumnMeta], row_limit: usize) -> Vec<String> {
    if path.is_empty() {
        return Vec::new();
    }
    let path = expand_path(path);
    if !path.exists() {
        return Vec::new();
    }
    let marker_names: Vec<&str> = columns
        .iter()
        .map(|c| c.name.as_str())
        .filter(|name| MARKER_COLUMNS.contains(&name.to_uppercase().as_str()))
        .collect();
    if marker_names.is_empty() {
        return Vec::new();
    }

    let mut reader = match csv::Reader::from_path(&path) {
        Ok(reader) => reader,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "data file scan skipped");
            return Vec::new();
        }
    };
    let marker_indexes: Vec<usize> = match reader.headers() {
        Ok(headers) => headers
            .iter()
            .enumerate()
            .filter(|(_, h)| marker_names.contains(h))
            .map(|(i, _)| i)
            .collect(),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "data file scan skipped");
            return Vec::new();
        }
    };
    if marker_indexes.is_empty() {
        return Vec::new();
    }

    let mut values: Vec<String> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    for record in reader.records().take(row_limit) {
        let Ok(record) = record else {
            continue;
        };
        for &index in &marker_indexes {
            if let Some(value) = record.get(index) {
                let value = value.trim();
                if !value.is_empty() && seen.insert(value.to_string()) {
                    values.push(value.to_string());
                }
            }
        }
    }
    debug!(path = %path.display(), count = values.len(), "sampled marker-column values");
    values
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn meta(name: &str, description: &str) -> DatasetMeta {
        DatasetMeta {
            id: 1,
            name: name.to_string(),
            description: description.to_string(),
            ..Default::default()
        }
    }

    fn column(name: &str, col_type: &str) -> ColumnMeta {
        ColumnMeta {
            name: name.to_string(),
            col_type: col_type.to_string(),
        }
    }

    #[test]
    fn keywords_come_from_name_description_and_columns() {
        let columns = vec![column("行政区名称", "string"), column("面积", "float")];
        let keywords = derive_keywords(
            &meta("耕地图斑", "全省耕地分布汇总表（数据）"),
            &columns,
            &SyncConfig::default(),
        );
        assert!(keywords.contains(&"耕地图斑".to_string()));
        assert!(keywords.contains(&"全省耕地分布汇总表".to_string()));
        assert!(keywords.contains(&"行政区名称".to_string()));
        assert!(keywords.contains(&"面积".to_string()));
        // Standalone stopword runs are dropped.
        assert!(!keywords.contains(&"数据".to_string()));
    }

    #[test]
    fn keyword_list_respects_the_limit() {
        let columns: Vec<ColumnMeta> = (0..30)
            .map(|i| column(&format!("字段名{}{}", "甲乙丙丁戊己庚辛壬癸".chars().nth(i % 10).unwrap(), i / 10), "string"))
            .collect();
        let cfg = SyncConfig {
            keyword_limit: 5,
            ..Default::default()
        };
        let keywords = derive_keywords(&meta("", ""), &columns, &cfg);
        assert_eq!(keywords.len(), 5);
    }

    #[test]
    fn domain_inference_is_first_match_and_case_insensitive() {
        assert_eq!(
            infer_domain(&meta("全市gdp核算", ""), &[]),
            Domain::Economy
        );
        assert_eq!(
            infer_domain(&meta("空白表", ""), &[column("DLTB编码", "string")]),
            Domain::Land
        );
        assert_eq!(infer_domain(&meta("杂项清单", ""), &[]), Domain::Generic);
    }

    #[test]
    fn summary_counts_typed_fields() {
        let columns = vec![
            column("名称", "string"),
            column("编码", "string"),
            column("面积", "float"),
        ];
        assert_eq!(
            build_summary(&meta("耕地图斑", ""), &columns),
            "耕地图斑包含3个字段，包括2个文本字段, 1个数值字段"
        );
        assert_eq!(build_summary(&meta("", ""), &[]), "未命名数据集包含0个字段");
    }

    #[test]
    fn embedding_text_skips_empty_sections() {
        let record = DatasetRecord {
            name: "耕地图斑".to_string(),
            keywords: vec!["耕地".to_string(), "面积".to_string()],
            domain: Domain::Land,
            ..Default::default()
        };
        assert_eq!(
            compose_embedding_text(&record),
            "数据集名称：耕地图斑 关键词：耕地, 面积 业务领域：土地"
        );
    }

    #[test]
    fn marker_columns_are_sampled_from_the_data_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("plots.csv");
        let mut file = std::fs::File::create(&path).expect("create csv");
        writeln!(file, "DLMC,面积").expect("write");
        writeln!(file, "水田,120.5").expect("write");
        writeln!(file, "旱地,80.0").expect("write");
        writeln!(file, "水田,44.2").expect("write");

        let meta = DatasetMeta {
            id: 7,
            name: "地类图斑".to_string(),
            actual_data_path: Some(path.to_string_lossy().to_string()),
            ..Default::default()
        };
        let columns = vec![column("DLMC", "string"), column("面积", "float")];
        let cfg = SyncConfig {
            scan_data_files: true,
            ..Default::default()
        };
        let keywords = derive_keywords(&meta, &columns, &cfg);
        assert!(keywords.contains(&"水田".to_string()));
        assert!(keywords.contains(&"旱地".to_string()));
        // Distinct values only.
        assert_eq!(keywords.iter().filter(|k| *k == "水田").count(), 1);
    }

    #[test]
    fn data_path_placeholders_expand_before_scanning() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("zones.csv");
        let mut file = std::fs::File::create(&path).expect("create csv");
        writeln!(file, "XZQMC").expect("write");
        writeln!(file, "玄武区").expect("write");
        std::env::set_var("DATAMATCH_DERIVE_TEST_DIR", dir.path());

        let meta = DatasetMeta {
            id: 9,
            name: "行政区划".to_string(),
            actual_data_path: Some("${DATAMATCH_DERIVE_TEST_DIR}/zones.csv".to_string()),
            ..Default::default()
        };
        let cfg = SyncConfig {
            scan_data_files: true,
            ..Default::default()
        };
        let keywords = derive_keywords(&meta, &[column("XZQMC", "string")], &cfg);
        assert!(keywords.contains(&"玄武区".to_string()));
    }

    #[test]
    fn missing_data_file_degrades_to_metadata_keywords() {
        let meta = DatasetMeta {
            id: 8,
            name: "地类图斑".to_string(),
            file_path: "/nonexistent/plots.csv".to_string(),
            ..Default::default()
        };
        let cfg = SyncConfig {
            scan_data_files: true,
            ..Default::default()
        };
        let keywords = derive_keywords(&meta, &[column("DLMC", "string")], &cfg);
        assert!(keywords.contains(&"地类图斑".to_string()));
    }
}
