//! Query command - search a corpus from the terminal

use std::{path::Path, sync::Arc};

use color_eyre::eyre::{Result, WrapErr};
use docsearch_client::{SearchResultArea, group_results};
use docsearch_core::Config;
use docsearch_index::{EncodedPages, QueryEngine, build_index};
use docsearch_worker::{CorpusSource, FileCorpusSource, corpus_source_for};

use super::load_config;

/// Run the query command.
pub async fn run(config_path: &Path, text: &str, corpus: Option<&Path>) -> Result<()> {
    let config = load_config(config_path)?;
    let engine = load_engine(&config, corpus).await?;

    let results = engine.results(text);
    let areas = group_results(&results.results, config.search.priority_limit);

    if areas.is_empty() {
        println!("  No results found for \"{text}\"");
        return Ok(());
    }

    println!();
    for area in &areas {
        print_area(area);
    }
    Ok(())
}

/// Fetch the corpus and build a query engine over it.
pub async fn load_engine(config: &Config, corpus: Option<&Path>) -> Result<QueryEngine> {
    let source: Arc<dyn CorpusSource> = match corpus {
        Some(path) => Arc::new(FileCorpusSource::new(path)),
        None => corpus_source_for(&config.search.data_url, Path::new(&config.server.root)),
    };

    tracing::info!(source = %source.describe(), "Loading search corpus");
    let json = source
        .fetch()
        .await
        .wrap_err_with(|| format!("Failed to fetch corpus from {}", source.describe()))?;
    let corpus = EncodedPages::from_json(&json).wrap_err("Failed to decode corpus")?;

    let built = build_index(&corpus, &config.search.boosts);
    Ok(QueryEngine::new(built))
}

fn print_area(area: &SearchResultArea<'_>) {
    let count = area.priority_pages.len() + area.pages.len();
    println!("  {} ({count})", area.name);
    println!("  ─────────────────────────────────");
    for page in &area.priority_pages {
        println!("  ★ {:<40} {}", page.title, page.path);
    }
    for page in &area.pages {
        let marker = if page.deprecated { "†" } else { " " };
        println!("  {marker} {:<40} {}", page.title, page.path);
    }
    println!();
}
