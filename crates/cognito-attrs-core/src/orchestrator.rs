//! Top-level run over every configured mapping entry.

use futures_util::{StreamExt, TryStreamExt, stream};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::error::{PluginError, ProviderStage};
use crate::gateway::ProviderGateway;
use crate::log::LogSink;
use crate::mapping::{MappingEntry, load_mappings, params};
use crate::processor::{EntryOutcome, process_mapping};
use crate::stack::StackDescriptor;

fn default_max_concurrency() -> usize {
    4
}

/// How a run schedules its mapping entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunOptions {
    /// Process entries that target different user pools concurrently.
    #[serde(default)]
    pub parallel: bool,

    /// Upper bound on concurrently processed user pools when `parallel` is set.
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            parallel: false,
            max_concurrency: default_max_concurrency(),
        }
    }
}

impl RunOptions {
    #[must_use]
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}

/// Outcomes of a completed run, in configuration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub entries: Vec<EntryOutcome>,
}

impl RunSummary {
    /// Number of entries that issued at least one mutating call.
    pub fn changed_entries(&self) -> usize {
        self.entries.iter().filter(|e| e.changed()).count()
    }
}

/// Reconciles every mapping entry found in `raw`.
///
/// `raw` is the plugin's configuration block (one mapping object or a list).
/// The stack is described once and shared by all entries. The first error
/// ends the run; changes already applied by earlier entries stay in place.
/// Every failure is written to `log` before it is returned.
pub async fn run(
    gateway: &dyn ProviderGateway,
    raw: &Value,
    log: &dyn LogSink,
    options: RunOptions,
) -> Result<RunSummary, PluginError> {
    let entries = load_mappings(raw, log);
    run_entries(gateway, &entries, log, options).await
}

/// Same as [`run`] for entries that were already loaded.
pub async fn run_entries(
    gateway: &dyn ProviderGateway,
    entries: &[MappingEntry],
    log: &dyn LogSink,
    options: RunOptions,
) -> Result<RunSummary, PluginError> {
    if entries.is_empty() {
        log.log("Missing required fields.");
        return Err(PluginError::configuration("Missing required fields."));
    }

    log.log("Start");
    match execute(gateway, entries, log, options).await {
        Ok(summary) => {
            info!(
                entries = summary.entries.len(),
                changed = summary.changed_entries(),
                "Custom attribute run finished"
            );
            log.log("End");
            Ok(summary)
        }
        Err(e) => {
            log.log(&e.to_string());
            Err(e)
        }
    }
}

async fn execute(
    gateway: &dyn ProviderGateway,
    entries: &[MappingEntry],
    log: &dyn LogSink,
    options: RunOptions,
) -> Result<RunSummary, PluginError> {
    let stack = gateway
        .describe_stack()
        .await
        .map_err(|e| PluginError::provider(ProviderStage::DescribeStack, e))?
        .ok_or_else(|| PluginError::configuration("Could not find stack for this deployment."))?;

    // Resolve every output key before the first remote mutation.
    let pool_ids = entries
        .iter()
        .map(|entry| {
            if let Some(client_key) = entry.client_output_key.as_deref() {
                stack.resolve(params::CLIENT_OUTPUT_KEY, client_key)?;
            }
            stack.resolve(params::USER_POOL_OUTPUT_KEY, &entry.user_pool_output_key)
        })
        .collect::<Result<Vec<_>, _>>()?;

    let entries = if options.parallel && entries.len() > 1 {
        run_parallel(gateway, &stack, entries, &pool_ids, log, options.max_concurrency).await?
    } else {
        let mut outcomes = Vec::with_capacity(entries.len());
        for entry in entries {
            outcomes.push(process_mapping(gateway, &stack, entry, log).await?);
        }
        outcomes
    };

    Ok(RunSummary { entries })
}

/// Groups entries by user pool and processes the groups concurrently.
///
/// Entries of one pool stay sequential: concurrent attribute additions against
/// the same pool race on the provider side.
async fn run_parallel(
    gateway: &dyn ProviderGateway,
    stack: &StackDescriptor,
    entries: &[MappingEntry],
    pool_ids: &[String],
    log: &dyn LogSink,
    max_concurrency: usize,
) -> Result<Vec<EntryOutcome>, PluginError> {
    let groups = group_by_pool(pool_ids);
    debug!(groups = groups.len(), "Processing user pools concurrently");

    let results: Vec<Vec<(usize, EntryOutcome)>> = stream::iter(groups)
        .map(|indices| async move {
            let mut outcomes = Vec::with_capacity(indices.len());
            for index in indices {
                let outcome = process_mapping(gateway, stack, &entries[index], log).await?;
                outcomes.push((index, outcome));
            }
            Ok::<_, PluginError>(outcomes)
        })
        .buffer_unordered(max_concurrency.max(1))
        .try_collect()
        .await?;

    let mut outcomes: Vec<(usize, EntryOutcome)> = results.into_iter().flatten().collect();
    outcomes.sort_by_key(|(index, _)| *index);
    Ok(outcomes.into_iter().map(|(_, outcome)| outcome).collect())
}

/// Entry indices grouped by pool id, groups ordered by first appearance.
fn group_by_pool(pool_ids: &[String]) -> Vec<Vec<usize>> {
    let mut groups: Vec<(&str, Vec<usize>)> = Vec::new();
    for (index, pool_id) in pool_ids.iter().enumerate() {
        match groups.iter_mut().find(|(id, _)| *id == pool_id.as_str()) {
            Some((_, indices)) => indices.push(index),
            None => groups.push((pool_id.as_str(), vec![index])),
        }
    }
    groups.into_iter().map(|(_, indices)| indices).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_by_pool_keeps_first_appearance_order() {
        let ids: Vec<String> = ["a", "b", "a", "c", "b"].iter().map(|s| s.to_string()).collect();
        assert_eq!(group_by_pool(&ids), vec![vec![0, 2], vec![1, 4], vec![3]]);
    }

    #[test]
    fn test_run_options_defaults() {
        let options = RunOptions::default();
        assert!(!options.parallel);
        assert_eq!(options.max_concurrency, 4);

        let options: RunOptions = serde_json::from_str(r#"{ "parallel": true }"#).unwrap();
        assert!(options.parallel);
        assert_eq!(options.max_concurrency, 4);
    }
}
