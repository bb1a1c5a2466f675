//! `generate` command handler.

use super::commands::{GenerateArgs, OutputFormat};
use postforge::{
    GenerationResult, JsonError, OpenRouterClient, PostforgeResult, build_pipeline, build_store,
    load_config,
};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// Caller key used for the rate limiter.
const CLI_CALLER: &str = "cli";

/// Generate one post and print it.
pub async fn handle_generate(args: GenerateArgs, config_path: Option<&Path>) -> PostforgeResult<()> {
    let mut config = load_config(config_path)?;
    // The process exits right after the request, so persist before returning.
    config.pipeline.persist_in_background = false;

    let driver = Arc::new(OpenRouterClient::from_config(&config.upstream)?);
    let store = build_store(&config.storage)?;
    let pipeline = build_pipeline(&config, driver, store, args.seed);

    info!(prompt = %args.prompt, "Generating post");
    let result = pipeline.handle(CLI_CALLER, args.to_inbound()).await?;
    if result.flags.needs_review {
        warn!(
            token_mentioned = result.flags.token_mentioned,
            includes_verifiable_detail = result.flags.includes_verifiable_detail,
            ta_violation = result.flags.ta_violation,
            "Post did not pass every check, review before publishing"
        );
    }

    print_result(&result, args.format)
}

fn print_result(result: &GenerationResult, format: OutputFormat) -> PostforgeResult<()> {
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(result)
                .map_err(|e| JsonError::new(e.to_string()))?;
            println!("{}", json);
        }
        OutputFormat::Human => {
            println!("{}", result.title);
            println!("{:-<48}", "");
            println!("{}", result.text);
            println!("{:-<48}", "");
            if !result.tags.is_empty() {
                println!("Tags:     {}", result.tags.join(", "));
            }
            if !result.tickers.is_empty() {
                println!("Tickers:  {}", result.tickers.join(", "));
            }
            if !result.mentions.is_empty() {
                println!("Mentions: {}", result.mentions.join(", "));
            }
            if let Some(detail) = &result.verifiable_detail {
                println!("Detail:   {}", detail);
            }
            println!(
                "Checks:   {}/3 passed, {} repair(s){}",
                result.flags.passed_checks(),
                result.flags.repair_attempts,
                if result.flags.needs_review { ", needs review" } else { "" }
            );
            println!(
                "Model:    {} ({} tokens)",
                result.model, result.usage.total_tokens
            );
        }
    }
    Ok(())
}
