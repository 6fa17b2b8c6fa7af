//! Source document resolution: remote URL, `file://` URL or local path.

use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use serde_json::Value;
use tracing::debug;
use url::Url;

pub async fn resolve_to_json(input: &str) -> Result<Value> {
    match Url::parse(input) {
        Ok(u) if matches!(u.scheme(), "http" | "https") => fetch_url_json(u).await,
        Ok(u) if u.scheme() == "file" => {
            let path = u
                .to_file_path()
                .map_err(|_| anyhow!("not a local file url: {input}"))?;
            read_json_file(path)
        }
        _ => read_json_file(input),
    }
}

pub fn read_json_file<P: AsRef<Path>>(path: P) -> Result<Value> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let v: Value = serde_json::from_str(&raw).map_err(|e| anyhow!("invalid json in {}: {e}", path.display()))?;
    Ok(v)
}

async fn fetch_url_json(url: Url) -> Result<Value> {
    debug!(%url, "fetching");
    let resp = reqwest::get(url.clone()).await?;
    let status = resp.status();
    if !status.is_success() {
        return Err(anyhow!("http error fetching {url}: {status}"));
    }
    let v = resp.json::<Value>().await?;
    Ok(v)
}
