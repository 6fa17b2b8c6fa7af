use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::Result;
use tracing::info;

use apicorpus_core::determinism::canonical_json::serialize_canonical;
use apicorpus_core::index::{build_version_index, IndexInput, TimestampSource, VersionIndex};
use apicorpus_store::FsTimestamps;

use super::Context;

pub fn collect(ctx: &Context, root_url: &str) -> Result<VersionIndex> {
    let timestamps = FsTimestamps::new(&ctx.store);
    let mut inputs = Vec::new();
    for item in ctx.store.list_all() {
        let stored = item?;
        inputs.push(IndexInput {
            timestamps: timestamps.timestamps(&stored.location)?,
            path: stored.path,
            location: stored.location,
            document: stored.document,
        });
    }
    Ok(build_version_index(inputs)?.with_root_url(root_url))
}

pub fn run(ctx: &Context, root_url: &str, out: Option<&Path>) -> Result<u8> {
    let index = collect(ctx, root_url)?;
    let bytes = serialize_canonical(&index)?;
    match out {
        Some(path) => {
            fs::write(path, &bytes)?;
            info!(path = %path.display(), apis = index.len(), "wrote version index");
        }
        None => std::io::stdout().write_all(&bytes)?,
    }
    Ok(0)
}
