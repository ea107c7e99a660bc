//! `fuzzloop policy` implementation.

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::cli::PolicyCommands;
use crate::domain::models::{Config, Endpoint, MutationAction, PolicyTable};
use crate::infrastructure::JsonPolicyStore;
use crate::services::MutationPolicy;

/// Inspect or reset the learned policy table.
pub async fn execute(command: PolicyCommands, config: Config, json: bool) -> Result<()> {
    let store = Arc::new(JsonPolicyStore::new(&config.storage.policy_path));
    let policy = Arc::new(
        MutationPolicy::load(store, config.learning.clone())
            .await
            .context("Failed to load policy table")?,
    );

    match command {
        PolicyCommands::Show { endpoint } => {
            let table = policy.snapshot().await;
            let filter = endpoint.map(|e| Endpoint::new(&e));
            render(&table, filter.as_ref(), json)
        }
        PolicyCommands::Reset { endpoint } => {
            let filter = endpoint.map(|e| Endpoint::new(&e));
            policy.reset(filter.as_ref()).await?;
            if json {
                println!("{}", serde_json::json!({ "status": "reset" }));
            } else {
                match filter {
                    Some(endpoint) => println!("Reset policy for {endpoint}"),
                    None => println!("Reset entire policy table"),
                }
            }
            Ok(())
        }
    }
}

fn render(table: &PolicyTable, filter: Option<&Endpoint>, json: bool) -> Result<()> {
    if json {
        match filter {
            Some(endpoint) => {
                let values = table.values_for(endpoint);
                println!("{}", serde_json::to_string_pretty(&values)?);
            }
            None => println!("{}", serde_json::to_string_pretty(table)?),
        }
        return Ok(());
    }

    let mut printed = 0usize;
    for (path, values) in table.iter() {
        if let Some(endpoint) = filter {
            if path != endpoint.as_str() {
                continue;
            }
        }
        println!("{path}");
        for action in MutationAction::ALL {
            let value = values.get(&action).copied().unwrap_or(0.0);
            println!("  {:<16} {value:>10.4}", action.as_str());
        }
        printed += 1;
    }
    if printed == 0 {
        println!("(no learned endpoints)");
    }
    Ok(())
}
