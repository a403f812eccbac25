//! GitHub Action entry point
//!
//! Reads the action inputs, binds the triage operations to the issue or
//! pull request that triggered the workflow, and lets the model act on it.
//! Any fatal error is reported as an `::error::` annotation and fails the
//! step.

use std::process::ExitCode;
use std::sync::Arc;

use llm_triage_core::config::RunConfig;
use llm_triage_core::github::{
    build_registry, check_selection, IssueContext, LabelSource, RestClient, LABEL_ISSUE,
};
use llm_triage_core::logging::{ConsoleLogger, Logger};
use llm_triage_core::providers::create_provider;
use llm_triage_core::runner::{ConversationRunner, RunSetup, RunStatus};
use llm_triage_core::{log_info, log_warn, EnvInputSource, EnvSecretStore};

#[tokio::main]
async fn main() -> ExitCode {
    let console = ConsoleLogger::new();
    match run(&console).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            console.error(&message);
            ExitCode::FAILURE
        }
    }
}

async fn run(console: &ConsoleLogger) -> Result<(), String> {
    let logger: Arc<dyn Logger> = Arc::new(console.clone());

    let config = RunConfig::resolve(&EnvInputSource::new(), &EnvSecretStore::new())
        .map_err(|e| e.to_string())?;
    console.mask(&config.api_key);
    console.mask(&config.github_token);
    for warning in &config.warnings {
        logger.warn(warning);
    }

    check_selection(&config.enabled_operations).map_err(|e| e.to_string())?;

    let ctx = IssueContext::from_env().map_err(|e| e.to_string())?;
    log_info!(
        logger,
        "Triaging {} {}#{} with {} ({})",
        if ctx.is_pull_request() { "pull request" } else { "issue" },
        ctx.slug(),
        ctx.number,
        config.model,
        config.enabled_operations.join(", ")
    );

    let api = RestClient::new(
        ctx.clone(),
        &config.github_token,
        config.request_timeout,
        logger.clone(),
    )
    .map_err(|e| e.to_string())?;

    // The repository's labels are listed only when labelIssue is enabled.
    let labels = if config.enabled_operations.iter().any(|name| name == LABEL_ISSUE) {
        LabelSource::Repository
    } else {
        LabelSource::Fallback
    };
    let registry = build_registry(&ctx, Arc::new(api), logger.clone(), labels)
        .await
        .map_err(|e| e.to_string())?;

    let provider = create_provider("openai", config.request_timeout, logger.clone())
        .map_err(|e| e.to_string())?;
    let runner = ConversationRunner::new(
        Arc::from(provider),
        Arc::new(registry),
        RunSetup::from_config(&config),
        logger.clone(),
    )
    .map_err(|e| e.to_string())?;

    let outcome = runner.run().await.map_err(|e| e.to_string())?;
    log_info!(
        logger,
        "{} model call(s), {} operation(s) executed, {} failed",
        outcome.turns,
        outcome.executed,
        outcome.failed
    );

    match &outcome.status {
        RunStatus::Completed(text) => {
            console.group("Model response");
            println!("{}", text);
            console.end_group();
        }
        RunStatus::Halted(reason) => log_warn!(logger, "Run stopped early: {}", reason),
    }
    Ok(())
}
