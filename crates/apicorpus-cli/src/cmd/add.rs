use anyhow::Result;
use tracing::info;

use apicorpus_core::pipeline::RunOutcome;

use super::Context;
use crate::io::edit::EditSession;
use crate::output;
use crate::pipeline::{Mode, Orchestrator, Source};

/// Process one new source. With an edit session, a failed attempt is
/// handed to the operator, the correction is recorded and the pipeline is
/// replayed once.
pub async fn collect(ctx: &Context, format: &str, url: &str, session: Option<&dyn EditSession>) -> Result<RunOutcome> {
    let source = Source::new(url, format);
    let mut orch = Orchestrator::new(&ctx.store, &ctx.plugins, ctx.strategy(), Mode::Persist);

    let mut attempt = orch.process_one(&source).await?;
    if let Some(session) = session {
        if attempt.report.is_failure() && orch.correct(&attempt, session)? {
            info!(url, "replaying with recorded correction");
            attempt = orch.process_one(&source).await?;
        }
    }

    let mut outcome = RunOutcome::new();
    outcome.push(attempt.report);
    Ok(outcome)
}

pub async fn run(ctx: &Context, format: &str, url: &str, session: Option<&dyn EditSession>) -> Result<u8> {
    let outcome = collect(ctx, format, url, session).await?;
    output::print_outcome(&outcome)?;
    Ok(ctx.exit_code(&outcome))
}
