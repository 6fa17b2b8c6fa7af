use anyhow::Result;
use serde::Serialize;
use tracing::warn;

use super::Context;
use crate::output;

#[derive(Debug, Serialize)]
pub struct UrlOut {
    pub location: String,
    pub url: String,
    pub format: String,
}

pub fn collect(ctx: &Context) -> Result<Vec<UrlOut>> {
    let mut out = Vec::new();
    for item in ctx.store.list_all() {
        let stored = match item {
            Ok(stored) => stored,
            Err(e) if e.is_fatal() => return Err(e.into()),
            Err(e) => {
                warn!(location = %e.location, error = %e.error, "skipping unreadable document");
                continue;
            }
        };
        match stored.document.origin() {
            Some(o) => out.push(UrlOut {
                location: stored.location,
                url: o.source_url,
                format: o.format,
            }),
            None => warn!(location = %stored.location, "no recorded origin"),
        }
    }
    Ok(out)
}

pub fn run(ctx: &Context) -> Result<u8> {
    let urls = collect(ctx)?;
    if output::is_json() {
        output::print(&urls)?;
    } else {
        for u in &urls {
            output::print_line(&u.url);
        }
    }
    Ok(0)
}
