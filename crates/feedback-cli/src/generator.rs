//! The feedback generation run: load, select pending rows, fan out
//! concurrency-limited chat requests, merge results back by row index, and
//! persist the table after every completion.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use futures::stream::{FuturesUnordered, StreamExt};
use tokio::sync::Semaphore;

use feedback_core::{Config, Dataset};
use feedback_llm::OllamaProvider;

use crate::prompt::build_prompt;

/// Written when a request exceeds its time budget.
pub const TIMEOUT_SENTINEL: &str = "timeout exceeded";
/// Written when a request fails for any other reason.
pub const FAILURE_SENTINEL: &str = "feedback unavailable";

pub async fn run(config: &Config) -> anyhow::Result<()> {
    let mut dataset = Dataset::load(&config.input_path).with_context(|| {
        format!("failed to load input table {}", config.input_path.display())
    })?;
    let seeded = dataset.seed_from_existing(&config.output_path).with_context(|| {
        format!(
            "failed to read existing output {}",
            config.output_path.display()
        )
    })?;
    if seeded > 0 {
        log::info!("Resuming: {seeded} rows already have feedback");
    }

    let provider = Arc::new(
        OllamaProvider::new()
            .with_base_url(config.base_url.clone())
            .with_model(config.model.clone()),
    );
    let semaphore = Arc::new(Semaphore::new(config.concurrency));
    let total = dataset.len();

    let mut pending = FuturesUnordered::new();
    for (index, record) in dataset.records().iter().enumerate() {
        if record.has_feedback() {
            log::info!("Skipping {}: feedback already present", record.name);
            continue;
        }

        log::info!("Processing student {}/{}: {}", index + 1, total, record.name);
        let prompt = build_prompt(record);
        let provider = Arc::clone(&provider);
        let semaphore = Arc::clone(&semaphore);
        let budget = config.request_timeout;

        // Row identity is captured at dispatch time; completion order never
        // decides which row a result lands in.
        pending.push(tokio::spawn(async move {
            (index, generate_feedback(&provider, &semaphore, &prompt, budget).await)
        }));
    }

    while let Some(joined) = pending.next().await {
        let (index, feedback) = joined.context("feedback task panicked")?;
        dataset.set_feedback(index, feedback);
        dataset.save(&config.output_path).with_context(|| {
            format!("failed to save {}", config.output_path.display())
        })?;
        log::info!("Saved progress for row {}/{}", index + 1, total);
    }

    // Final save so the output exists even when no row was pending.
    dataset.save(&config.output_path).with_context(|| {
        format!("failed to save {}", config.output_path.display())
    })?;
    Ok(())
}

/// Run one chat request under the concurrency limiter and time budget.
///
/// Never fails: timeouts and request errors degrade to their sentinel
/// strings so a single bad row cannot disturb its siblings.
async fn generate_feedback(
    provider: &OllamaProvider,
    semaphore: &Semaphore,
    prompt: &str,
    budget: Duration,
) -> String {
    // The semaphore is never closed, so acquisition only fails on shutdown.
    let _permit = match semaphore.acquire().await {
        Ok(permit) => permit,
        Err(_) => return FAILURE_SENTINEL.to_string(),
    };

    match tokio::time::timeout(budget, provider.chat(prompt)).await {
        Ok(Ok(reply)) => reply,
        Ok(Err(err)) => {
            log::error!("Request failed: {err}");
            FAILURE_SENTINEL.to_string()
        }
        Err(_) => {
            let preview: String = prompt.chars().take(50).collect();
            log::error!(
                "Request timed out after {}s: {preview}...",
                budget.as_secs()
            );
            TIMEOUT_SENTINEL.to_string()
        }
    }
}
