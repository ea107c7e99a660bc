//! `fuzzloop probe` implementation.

use std::sync::Arc;

use anyhow::{bail, Context, Result};

use crate::cli::ProbeArgs;
use crate::domain::models::{Config, Endpoint, PayloadSchema, ProbeReport};
use crate::domain::ports::{NullHistorySink, StaticArtifact};
use crate::infrastructure::{JsonPolicyStore, TestRunner};
use crate::services::{MutationPolicy, RunCoordinator};

/// Run one adaptive probe against an endpoint.
pub async fn execute(args: ProbeArgs, config: Config, json: bool) -> Result<()> {
    let endpoint = Endpoint::new(&args.endpoint);
    let schema = parse_fields(&args.fields)?;

    let store = Arc::new(JsonPolicyStore::new(&config.storage.policy_path));
    let policy = Arc::new(
        MutationPolicy::load(store, config.learning.clone())
            .await
            .context("Failed to load policy table")?,
    );
    let runner = Arc::new(TestRunner::new(config.runner.clone(), &config.storage));
    let coordinator = RunCoordinator::new(
        policy,
        Arc::new(StaticArtifact::new(args.artifact)),
        runner,
        Arc::new(NullHistorySink),
    );

    let report = coordinator.probe(&endpoint, &schema).await;
    render(&report, json)?;
    Ok(())
}

/// Parse repeated `name:type` field arguments into an ordered schema.
fn parse_fields(fields: &[String]) -> Result<PayloadSchema> {
    let mut pairs = Vec::with_capacity(fields.len());
    for field in fields {
        match field.split_once(':') {
            Some((name, type_hint)) if !name.is_empty() => {
                pairs.push((name.to_string(), type_hint.to_string()));
            }
            _ => bail!("Invalid field spec '{field}': expected name:type"),
        }
    }
    Ok(PayloadSchema::from_pairs(pairs))
}

fn render(report: &ProbeReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    println!("Endpoint:  {}", report.endpoint);
    println!("Action:    {}", report.action);
    println!("Status:    {}", report.verdict.status);
    println!(
        "Summary:   {} passed, {} failed, {} errors",
        report.verdict.summary.passed, report.verdict.summary.failed, report.verdict.summary.error
    );
    println!("Reward:    {:.2}", report.reward);
    match report.q_value {
        Some(q) => println!("Q-value:   {q:.4}"),
        None => println!("Q-value:   (no policy update)"),
    }
    for failure in &report.verdict.failures {
        println!(
            "  FAILED {} ({}:{})",
            failure.test_name,
            failure.file.as_deref().unwrap_or("?"),
            failure.line.map_or_else(|| "?".to_string(), |l| l.to_string()),
        );
        if let Some(message) = &failure.message {
            println!("    {message}");
        }
    }
    Ok(())
}
