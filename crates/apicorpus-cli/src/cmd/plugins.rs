use anyhow::Result;
use serde::Serialize;

use super::Context;
use crate::output;

#[derive(Debug, Serialize)]
pub struct PluginInfo {
    pub id: String,
    pub name: String,
    pub version: String,
    pub formats: Vec<String>,
}

pub fn run(ctx: &Context) -> Result<u8> {
    let plugins: Vec<PluginInfo> = ctx
        .plugins
        .specs()
        .into_iter()
        .map(|s| PluginInfo {
            id: s.id.0.clone(),
            name: s.name.clone(),
            version: s.version.clone(),
            formats: s.formats.clone(),
        })
        .collect();

    if output::is_json() {
        output::print(&plugins)?;
    } else {
        for p in &plugins {
            let formats = if p.formats.is_empty() {
                "validator".to_string()
            } else {
                p.formats.join(", ")
            };
            output::print_line(&format!("{:<24} {:<8} {}", p.id, p.version, formats));
        }
    }
    Ok(0)
}
