use anyhow::Result;
use tracing::{info, warn};

use apicorpus_core::identity::resolve_identity;
use apicorpus_core::pipeline::{DocumentReport, FailureReport, RunOutcome, StageId};
use apicorpus_core::CorpusError;

use super::Context;
use crate::output;
use crate::pipeline::{Mode, Orchestrator, Source};

/// Re-run every stored document against its recorded origin.
pub async fn collect(ctx: &Context, mode: Mode) -> Result<RunOutcome> {
    let mut outcome = RunOutcome::new();
    let mut sources = Vec::new();

    for item in ctx.store.list_all() {
        let stored = match item {
            Ok(stored) => stored,
            Err(e) if e.is_fatal() => return Err(e.into()),
            Err(e) => {
                warn!(location = %e.location, error = %e.error, "stored document unreadable");
                let stage = match e.error {
                    CorpusError::Identity(_) => StageId::Identity,
                    _ => StageId::Fetch,
                };
                outcome.push(DocumentReport::Failed(FailureReport::new(e.location, "", stage, &e.error)));
                continue;
            }
        };
        let declared = resolve_identity(&stored.document)
            .map_err(|e| CorpusError::invariant(format!("{}: {e}", stored.location)))?;
        if declared != stored.path {
            return Err(CorpusError::invariant(format!(
                "{} declares identity {declared}",
                stored.location
            ))
            .into());
        }
        match stored.document.origin() {
            Some(o) => sources.push(Source::new(o.source_url, o.format)),
            None => outcome.push(DocumentReport::Failed(FailureReport::from_messages(
                stored.location,
                "",
                StageId::Fetch,
                vec!["no recorded origin".to_string()],
            ))),
        }
    }

    let pb = output::spinner();
    let total = sources.len();
    let mut orch = Orchestrator::new(&ctx.store, &ctx.plugins, ctx.strategy(), mode);
    for (i, source) in sources.iter().enumerate() {
        pb.set_message(format!("[{}/{total}] {}", i + 1, source.url));
        let attempt = orch.process_one(source).await?;
        outcome.push(attempt.report);
    }
    pb.finish_and_clear();

    info!(
        total = outcome.reports.len(),
        failed = outcome.failures().count(),
        "run finished"
    );
    Ok(outcome)
}

pub async fn run(ctx: &Context, mode: Mode) -> Result<u8> {
    let outcome = collect(ctx, mode).await?;
    output::print_outcome(&outcome)?;
    Ok(ctx.exit_code(&outcome))
}
