//! One-shot classification of a CSV export

use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};

use sift_core::{read_export_preview, AIClient, ExportClassifier, ResponseCache};

/// Classify a CSV export file and print the decision
pub async fn cmd_classify(file: &Path, rows: usize, json: bool) -> Result<()> {
    let reader = File::open(file)
        .with_context(|| format!("Failed to open export file: {}", file.display()))?;
    let request = read_export_preview(reader, rows)
        .with_context(|| format!("Failed to read export preview: {}", file.display()))?;

    let cache = Arc::new(ResponseCache::new());
    let classifier = match AIClient::from_env() {
        Some(client) => ExportClassifier::with_ai(cache, client),
        None => ExportClassifier::new(cache),
    };

    let outcome = classifier
        .classify(&request)
        .await
        .context("Classification failed")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    let result = &outcome.result;
    println!("File: {}", file.display());
    println!("Source:      {}", result.source_system);
    println!("Ledger type: {}", result.ledger_type.as_str());
    println!("Confidence:  {:.2}", result.confidence);
    println!("Decided by:  {:?}", result.decided_by);

    if result.column_mapping.is_empty() {
        println!("Column mapping: (none - set OLLAMA_HOST to enable the fallback classifier)");
    } else {
        println!("Column mapping:");
        for (field, header) in &result.column_mapping {
            println!("  {:12} ← {}", field, header);
        }
    }

    Ok(())
}
