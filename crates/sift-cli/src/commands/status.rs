//! Status command: AI backend and cache strategy configuration

use anyhow::Result;

use sift_core::{AIClient, CompletionBackend, Strategy};

/// Show backend configuration, backend health, and the cache strategy table
pub async fn cmd_status() -> Result<()> {
    println!("🔍 Sift status\n");

    match AIClient::from_env() {
        Some(client) => {
            println!("AI backend:  {} (model: {})", client.host(), client.model());
            print!("Health:      ");
            if client.health_check().await {
                println!("✅ connected");
            } else {
                println!("❌ not responding");
                println!("\nTo set up Ollama:");
                println!("  1. Install Ollama: https://ollama.ai/download");
                println!("  2. Start the server: ollama serve");
                println!("  3. Pull a model: ollama pull llama3.2");
                println!("  4. export OLLAMA_HOST=http://localhost:11434");
            }
        }
        None => {
            println!("AI backend:  not configured");
            println!("             set OLLAMA_HOST to enable the fallback classifier");
        }
    }

    println!("\nCache strategies:");
    println!("  {:16} {:>10}  {}", "strategy", "ttl", "enabled");
    for strategy in Strategy::ALL {
        let config = strategy.config();
        let ttl = if config.ttl.is_zero() {
            "-".to_string()
        } else {
            format!("{}h", config.ttl.as_secs() / 3600)
        };
        println!(
            "  {:16} {:>10}  {}",
            strategy.name(),
            ttl,
            if config.enabled { "yes" } else { "no" }
        );
    }

    Ok(())
}
