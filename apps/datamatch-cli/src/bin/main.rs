use std::env;
use std::path::Path;
use std::sync::Arc;

use datamatch_core::config::{expand_path, resolve_with_base, EngineConfig};
use datamatch_core::error::Result as CoreResult;
use datamatch_core::traits::{DatasetIndex, MetadataStore, TextEncoder};
use datamatch_core::types::{ColumnMeta, DatasetMeta};
use datamatch_embed::default_encoder;
use datamatch_engine::MatchingEngine;
use datamatch_index::EsVectorIndex;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Deserialize;

/// File-backed dataset catalog standing in for the upstream metadata
/// database: a JSON file with datasets and their column schemas.
#[derive(Debug, Deserialize)]
struct Catalog {
    datasets: Vec<CatalogEntry>,
}

#[derive(Debug, Deserialize)]
struct CatalogEntry {
    #[serde(flatten)]
    meta: DatasetMeta,
    #[serde(default)]
    columns: Vec<ColumnMeta>,
}

struct JsonMetadataStore {
    entries: Vec<CatalogEntry>,
}

impl JsonMetadataStore {
    fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self { entries: Vec::new() });
        }
        let raw = std::fs::read_to_string(path)?;
        let catalog: Catalog = serde_json::from_str(&raw)?;
        // Data-file paths in the catalog are relative to the catalog
        // file itself unless absolute.
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        let mut entries = catalog.datasets;
        for entry in &mut entries {
            if !entry.meta.file_path.is_empty() {
                entry.meta.file_path = resolve_with_base(base, &entry.meta.file_path)
                    .to_string_lossy()
                    .into_owned();
            }
            if let Some(data_path) = entry.meta.actual_data_path.take() {
                if !data_path.is_empty() {
                    entry.meta.actual_data_path = Some(
                        resolve_with_base(base, &data_path)
                            .to_string_lossy()
                            .into_owned(),
                    );
                }
            }
        }
        Ok(Self { entries })
    }
}

impl MetadataStore for JsonMetadataStore {
    fn list_all_datasets(&self) -> CoreResult<Vec<DatasetMeta>> {
        Ok(self.entries.iter().map(|e| e.meta.clone()).collect())
    }

    fn get_dataset(&self, id: i64) -> CoreResult<Option<DatasetMeta>> {
        Ok(self
            .entries
            .iter()
            .find(|e| e.meta.id == id)
            .map(|e| e.meta.clone()))
    }

    fn list_columns(&self, dataset_id: i64) -> CoreResult<Vec<ColumnMeta>> {
        Ok(self
            .entries
            .iter()
            .find(|e| e.meta.id == dataset_id)
            .map(|e| e.columns.clone())
            .unwrap_or_default())
    }
}

fn usage(prog: &str) -> ! {
    eprintln!("Usage: {} <ask|sync|stats> [args...]", prog);
    eprintln!("  ask \"<question>\" [--max <n>] [--min-score <s>]");
    eprintln!("  sync [--catalog <file>] [--ids 1,2,3] [--force]");
    eprintln!("  stats");
    std::process::exit(1);
}

fn build_engine(
    config: &EngineConfig,
    catalog_path: &Path,
) -> anyhow::Result<(MatchingEngine, Arc<EsVectorIndex>)> {
    let encoder = default_encoder(&config.embedding)?;
    let index = Arc::new(EsVectorIndex::new(&config.index, encoder.dim())?);
    let store = Arc::new(JsonMetadataStore::load(catalog_path)?);
    let engine = MatchingEngine::new(config.clone(), encoder, index.clone(), store);
    Ok((engine, index))
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = EngineConfig::load().map_err(|e| {
        eprintln!("Error loading config: {}", e);
        e
    })?;

    let mut args: Vec<String> = env::args().collect();
    let prog = args.remove(0);
    if args.is_empty() {
        usage(&prog);
    }
    let cmd = args.remove(0);
    let runtime = tokio::runtime::Runtime::new()?;

    match cmd.as_str() {
        "ask" => {
            let mut question = None;
            let mut max_results = config.matching.max_results;
            let mut min_score = config.matching.min_score;
            let mut i = 0;
            while i < args.len() {
                match args[i].as_str() {
                    "--max" => {
                        max_results = parse_value(&args, &mut i, "--max");
                    }
                    "--min-score" => {
                        min_score = parse_value(&args, &mut i, "--min-score");
                    }
                    _ if !args[i].starts_with('-') => question = Some(args[i].clone()),
                    other => {
                        eprintln!("Unknown flag: {}", other);
                        usage(&prog);
                    }
                }
                i += 1;
            }
            let Some(question) = question else {
                usage(&prog);
            };

            let (engine, _) = build_engine(&config, &expand_path("catalog.json"))?;
            let results =
                runtime.block_on(engine.recognize_intent(&question, max_results, min_score));
            if results.is_empty() {
                println!("No datasets matched (min score {})", min_score);
                return Ok(());
            }
            for (rank, result) in results.iter().enumerate() {
                println!(
                    "{}. {} (score {:.3}, similarity {:.3})",
                    rank + 1,
                    result.dataset_name,
                    result.enhanced_score,
                    result.vector_score
                );
                println!("   领域: {}", result.domain.label());
                println!("   理由: {}", result.match_reason);
                if !result.description.is_empty() {
                    println!("   描述: {}", result.description);
                }
            }
        }
        "sync" => {
            let mut catalog = expand_path("catalog.json");
            let mut ids: Option<Vec<i64>> = None;
            let mut force = false;
            let mut i = 0;
            while i < args.len() {
                match args[i].as_str() {
                    "--catalog" => {
                        catalog = expand_path(parse_value::<String>(&args, &mut i, "--catalog"));
                    }
                    "--ids" => {
                        let raw: String = parse_value(&args, &mut i, "--ids");
                        let parsed: std::result::Result<Vec<i64>, _> =
                            raw.split(',').map(|s| s.trim().parse()).collect();
                        match parsed {
                            Ok(list) => ids = Some(list),
                            Err(_) => {
                                eprintln!("Error: --ids requires a comma-separated id list");
                                std::process::exit(1);
                            }
                        }
                    }
                    "--force" | "-f" => force = true,
                    other => {
                        eprintln!("Unknown flag: {}", other);
                        usage(&prog);
                    }
                }
                i += 1;
            }

            let (engine, _) = build_engine(&config, &catalog)?;
            let spinner = ProgressBar::new_spinner();
            spinner.set_style(ProgressStyle::with_template("{spinner} {msg}")?);
            spinner.set_message("Syncing datasets to the vector index...");
            spinner.enable_steady_tick(std::time::Duration::from_millis(100));
            let report =
                runtime.block_on(engine.sync_datasets_to_vector_store(force, ids.as_deref()))?;
            spinner.finish_and_clear();

            println!(
                "✅ Sync finished: {}/{} succeeded, {} failed",
                report.success_count, report.total_count, report.failed_count
            );
            for error in &report.errors {
                println!("   ⚠️  {}", error);
            }
        }
        "stats" => {
            let (_, index) = build_engine(&config, &expand_path("catalog.json"))?;
            let stats = runtime.block_on(index.stats())?;
            println!("Index: {}", stats.index_name);
            println!("📊 {} documents", stats.document_count);
        }
        _ => {
            eprintln!("Unknown command: {}", cmd);
            usage(&prog);
        }
    }
    Ok(())
}

fn parse_value<T: std::str::FromStr>(args: &[String], i: &mut usize, flag: &str) -> T {
    if *i + 1 < args.len() {
        if let Ok(value) = args[*i + 1].parse::<T>() {
            *i += 1;
            return value;
        }
    }
    eprintln!("Error: {} requires a value", flag);
    std::process::exit(1);
}
