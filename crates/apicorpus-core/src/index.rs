//! Corpus-wide version index.
//!
//! Groups persisted documents by API id (`provider` or `provider:service`)
//! and records, per version, where the document came from and when it was
//! added and last updated. Each API gets a derived `added` timestamp (the
//! earliest across versions) and a `preferred` version.
//!
//! Preferred-version rule: a single stored version is preferred by default;
//! with several versions exactly one must declare `info.x-preferred: true`.
//! Anything else aborts the index build with
//! [`CorpusError::PreferredVersionAmbiguity`].

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::document::CanonicalDocument;
use crate::errors::{CorpusError, CorpusResult};
use crate::identity::ApiPath;

/// When a stored document first appeared and when it last changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timestamps {
    pub added: OffsetDateTime,
    pub updated: OffsetDateTime,
}

/// Source of per-location timestamps (file metadata, VCS history, ...).
pub trait TimestampSource {
    fn timestamps(&self, location: &str) -> CorpusResult<Timestamps>;
}

/// One persisted document as seen by the index builder.
#[derive(Debug, Clone)]
pub struct IndexInput {
    pub path: ApiPath,
    pub location: String,
    pub document: CanonicalDocument,
    pub timestamps: Timestamps,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionEntry {
    pub added: String,
    pub updated: String,
    pub info: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub swagger_url: Option<String>,
    #[serde(skip)]
    pub location: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiEntry {
    pub added: String,
    pub preferred: String,
    pub versions: BTreeMap<String, VersionEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct VersionIndex {
    pub apis: BTreeMap<String, ApiEntry>,
}

impl VersionIndex {
    pub fn len(&self) -> usize {
        self.apis.len()
    }

    pub fn is_empty(&self) -> bool {
        self.apis.is_empty()
    }

    pub fn get(&self, api_id: &str) -> Option<&ApiEntry> {
        self.apis.get(api_id)
    }

    /// Fill every `swaggerUrl` with `root_url` + storage location.
    pub fn with_root_url(mut self, root_url: &str) -> Self {
        for api in self.apis.values_mut() {
            for v in api.versions.values_mut() {
                v.swagger_url = Some(format!("{root_url}{}", v.location));
            }
        }
        self
    }
}

struct Pending {
    added: OffsetDateTime,
    updated: OffsetDateTime,
    preferred: Option<bool>,
    entry: VersionEntry,
}

/// Build the version index from persisted documents.
pub fn build_version_index<I>(inputs: I) -> CorpusResult<VersionIndex>
where
    I: IntoIterator<Item = IndexInput>,
{
    let mut grouped: BTreeMap<String, BTreeMap<String, Pending>> = BTreeMap::new();

    for input in inputs {
        let api_id = input.path.api_id();
        let version = input.path.version.clone();
        let versions = grouped.entry(api_id.clone()).or_default();
        if versions.contains_key(&version) {
            return Err(CorpusError::identity(format!(
                "duplicate identity {api_id} {version} at {}",
                input.location
            )));
        }

        let entry = VersionEntry {
            added: format_ts(input.timestamps.added)?,
            updated: format_ts(input.timestamps.updated)?,
            info: input
                .document
                .info()
                .map(|i| Value::Object(i.clone()))
                .unwrap_or(Value::Null),
            source_url: input.document.origin().map(|o| o.source_url),
            swagger_url: None,
            location: input.location,
        };
        versions.insert(
            version,
            Pending {
                added: input.timestamps.added,
                updated: input.timestamps.updated,
                preferred: input.document.preferred(),
                entry,
            },
        );
    }

    let mut index = VersionIndex::default();
    for (api_id, versions) in grouped {
        let preferred = resolve_preferred(&api_id, &versions)?;
        let added = versions
            .values()
            .map(|p| p.added.min(p.updated))
            .min()
            .ok_or_else(|| CorpusError::invariant(format!("{api_id} has no versions")))?;

        index.apis.insert(
            api_id,
            ApiEntry {
                added: format_ts(added)?,
                preferred,
                versions: versions.into_iter().map(|(v, p)| (v, p.entry)).collect(),
            },
        );
    }
    Ok(index)
}

fn resolve_preferred(api_id: &str, versions: &BTreeMap<String, Pending>) -> CorpusResult<String> {
    if versions.len() == 1 {
        if let Some(v) = versions.keys().next() {
            return Ok(v.clone());
        }
    }

    let declared: Vec<&String> = versions
        .iter()
        .filter(|(_, p)| p.preferred == Some(true))
        .map(|(v, _)| v)
        .collect();

    match declared.as_slice() {
        [one] => Ok((*one).clone()),
        [] => Err(CorpusError::ambiguous_preferred(
            api_id,
            format!("none of {} versions is marked x-preferred", versions.len()),
        )),
        many => Err(CorpusError::ambiguous_preferred(
            api_id,
            format!(
                "versions {} are all marked x-preferred",
                many.iter().map(|v| v.as_str()).collect::<Vec<_>>().join(", ")
            ),
        )),
    }
}

fn format_ts(ts: OffsetDateTime) -> CorpusResult<String> {
    ts.format(&Rfc3339)
        .map_err(|e| CorpusError::serialization(format!("timestamp: {e}")))
}
