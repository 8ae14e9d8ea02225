use std::future::Future;
use std::sync::Arc;

use backlinks_core::resolver::EntityRecord;
use backlinks_core::{
    BacklinksConfig, Reconciler, RetryPolicy, StaticClientProvider, StaticTargetStore, SyncEvent,
    SyncOutcome, SyncRequest, SyncTask,
};

use crate::cli::SyncArgs;
use crate::commands::url::resolve_base_url;
use crate::error::CliError;

pub async fn run_sync(args: SyncArgs, config: &BacklinksConfig) -> Result<(), CliError> {
    let request = sync_request(&args)?;
    let task = build_task(&request, &args, config)?;

    let policy = if args.no_retry {
        RetryPolicy {
            max_attempts: 1,
            ..task.retry_policy()
        }
    } else {
        task.retry_policy()
    };

    let outcome = run_with_retry(policy, || task.perform(&request)).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    for line in format_outcome_lines(outcome.as_ref()) {
        println!("{line}");
    }
    Ok(())
}

pub fn sync_request(args: &SyncArgs) -> Result<SyncRequest, CliError> {
    let event = SyncEvent {
        document_id: args.document.clone(),
        collection_id: args.collection.clone(),
        tenant_id: args.tenant.clone(),
        identifiers: args.issues.clone(),
    };
    Ok(SyncRequest::try_from(event)?)
}

fn build_task(
    request: &SyncRequest,
    args: &SyncArgs,
    config: &BacklinksConfig,
) -> Result<SyncTask, CliError> {
    let mut store = StaticTargetStore::new().with_target(
        &request.target,
        EntityRecord::new(args.title.clone(), args.path.clone()),
    );
    if let Some(base_url) = resolve_base_url(args.base_url.clone(), config) {
        store = store.with_base_url(request.tenant_id.clone(), base_url);
    }

    let mut clients = StaticClientProvider::new();
    match config.linear_client()? {
        Some(client) => {
            clients = clients.with_client(request.tenant_id.clone(), Arc::new(client));
        }
        None => tracing::warn!("LINEAR_ACCESS_TOKEN is not set; nothing will be synced"),
    }

    Ok(SyncTask::new(Arc::new(clients), Arc::new(store))
        .with_reconciler(Reconciler::new(config.reconcile_settings())))
}

/// Drive `attempt` under `policy`, sleeping between failed attempts.
pub async fn run_with_retry<T, F, Fut>(
    policy: RetryPolicy,
    mut attempt: F,
) -> backlinks_core::Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = backlinks_core::Result<T>>,
{
    let mut attempt_number = 1;
    loop {
        match attempt().await {
            Ok(value) => return Ok(value),
            Err(error) if policy.should_retry(attempt_number) => {
                let delay = policy.backoff_for(attempt_number);
                tracing::warn!(
                    attempt = attempt_number,
                    max_attempts = policy.max_attempts,
                    delay_secs = delay.as_secs(),
                    error = %error,
                    "Sync attempt failed; retrying"
                );
                tokio::time::sleep(delay).await;
                attempt_number += 1;
            }
            Err(error) => return Err(error),
        }
    }
}

pub fn format_outcome_lines(outcome: Option<&SyncOutcome>) -> Vec<String> {
    let Some(outcome) = outcome else {
        return vec![
            "Nothing synced: no integration, no base URL, or the target is unpublished."
                .to_string(),
        ];
    };
    if outcome.is_noop() {
        return vec!["Backlinks already up to date.".to_string()];
    }

    let mut lines = vec![format!(
        "Created: {}  Deleted: {}  Succeeded: {}  Failed: {}",
        outcome.created(), outcome.deleted(), outcome.succeeded(), outcome.failed()
    )];
    lines.extend(outcome.failures().iter().map(|failure| {
        format!(
            "  {} {}: {}",
            failure.kind, failure.identifier, failure.reason
        )
    }));
    lines
}
