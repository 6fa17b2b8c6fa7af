//! Config file loading.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

use apicorpus_core::config::{validate_config, CorpusConfig};

pub const CONFIG_FILE: &str = "apicorpus.json";

/// Load `explicit`, or `<store_root>/apicorpus.json` if it exists, or defaults.
pub fn load(store_root: &Path, explicit: Option<&Path>) -> Result<CorpusConfig> {
    let path: Option<PathBuf> = match explicit {
        Some(p) => Some(p.to_path_buf()),
        None => Some(store_root.join(CONFIG_FILE)).filter(|p| p.is_file()),
    };

    let cfg = match path {
        Some(p) => {
            let raw = fs::read_to_string(&p).with_context(|| format!("read config {}", p.display()))?;
            let cfg: CorpusConfig =
                serde_json::from_str(&raw).with_context(|| format!("parse config {}", p.display()))?;
            debug!(path = %p.display(), "loaded config");
            cfg
        }
        None => CorpusConfig::default(),
    };
    validate_config(&cfg)?;
    Ok(cfg)
}
