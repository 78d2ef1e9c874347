//! Encode command - compress page metadata into a search corpus

use std::{fs, path::Path};

use color_eyre::eyre::{Result, WrapErr};
use docsearch_index::{EncodedPages, PageInfo, SearchInfo};
use serde::Deserialize;

/// Accepted input shapes.
#[derive(Deserialize)]
#[serde(untagged)]
enum PageInput {
    List(Vec<PageInfo>),
    Map(SearchInfo),
}

/// Run the encode command.
pub fn run(input: &Path, output: &Path) -> Result<()> {
    tracing::info!(?input, ?output, "Encoding search corpus");

    let text = fs::read_to_string(input)
        .wrap_err_with(|| format!("Failed to read {}", input.display()))?;
    let corpus = encode_pages(&text)?;

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .wrap_err_with(|| format!("Failed to create {}", parent.display()))?;
    }
    fs::write(output, corpus.to_json()?)
        .wrap_err_with(|| format!("Failed to write {}", output.display()))?;

    let tokens = corpus.dictionary.split_whitespace().count();
    println!(
        "  ✓ Encoded {} pages ({tokens} dictionary tokens) into {}",
        corpus.pages.len(),
        output.display()
    );
    Ok(())
}

/// Encode page metadata given as a JSON list or a path-keyed JSON map.
pub fn encode_pages(json: &str) -> Result<EncodedPages> {
    let input: PageInput =
        serde_json::from_str(json).wrap_err("Input is neither a page list nor a page map")?;

    Ok(match input {
        PageInput::List(pages) => EncodedPages::encode(&pages),
        PageInput::Map(info) => EncodedPages::encode_info(&info),
    })
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_encode_page_list() {
        let corpus = encode_pages(
            r#"[
                {"path": "guide/a", "type": "content", "title": "A", "headings": "one two"},
                {"path": "guide/b", "type": "content", "title": "B", "headings": "two three"}
            ]"#,
        )
        .unwrap();

        assert_eq!(corpus.dictionary, "one two three");
        assert_eq!(corpus.pages[1].headings, Some(vec![1, 2]));
    }

    #[test]
    fn test_encode_page_map_in_path_order() {
        let corpus = encode_pages(
            r#"{
                "guide/z": {"path": "guide/z", "title": "Z"},
                "api/a": {"path": "api/a", "title": "A"}
            }"#,
        )
        .unwrap();

        let paths: Vec<_> = corpus.pages.iter().map(|p| p.path.as_str()).collect();
        assert_eq!(paths, vec!["api/a", "guide/z"]);
    }

    #[test]
    fn test_encode_rejects_other_shapes() {
        assert!(encode_pages("42").is_err());
    }

    #[test]
    fn test_run_writes_corpus() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("pages.json");
        let output = dir.path().join("generated/search-data.json");
        fs::write(&input, r#"[{"path": "start", "title": "Getting started"}]"#).unwrap();

        run(&input, &output).unwrap();

        let corpus = EncodedPages::from_json(&fs::read_to_string(output).unwrap()).unwrap();
        assert_eq!(corpus.pages[0].title, "Getting started");
    }
}
