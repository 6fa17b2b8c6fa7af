//! Canonical identity of a document and the storage paths derived from it.
//!
//! An identity is the ordered sequence `[provider, service?, version]`. It is
//! both the storage location of the canonical document and the lookup key for
//! overlays: every prefix of the sequence is a level that may carry its own
//! merge patch.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::document::CanonicalDocument;
use crate::errors::{CorpusError, CorpusResult};

/// Separator used in storage locations.
pub const SEPARATOR: char = '/';

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ApiPath {
    pub provider: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
    pub version: String,
}

impl ApiPath {
    pub fn new(
        provider: impl Into<String>,
        service: Option<String>,
        version: impl Into<String>,
    ) -> CorpusResult<Self> {
        let path = Self {
            provider: provider.into(),
            service,
            version: version.into(),
        };
        check_segment("provider", &path.provider)?;
        if let Some(s) = &path.service {
            check_segment("service", s)?;
        }
        check_segment("version", &path.version)?;
        Ok(path)
    }

    /// Rebuild an identity from location segments (`[p, v]` or `[p, s, v]`).
    pub fn from_segments(segments: &[&str]) -> CorpusResult<Self> {
        match segments {
            [p, v] => Self::new(*p, None, *v),
            [p, s, v] => Self::new(*p, Some(s.to_string()), *v),
            _ => Err(CorpusError::identity(format!(
                "expected 2 or 3 path segments, got {}",
                segments.len()
            ))),
        }
    }

    /// API id used by the version index: `provider` or `provider:service`.
    pub fn api_id(&self) -> String {
        match &self.service {
            Some(s) => format!("{}:{}", self.provider, s),
            None => self.provider.clone(),
        }
    }

    pub fn segments(&self) -> Vec<&str> {
        let mut out = vec![self.provider.as_str()];
        if let Some(s) = &self.service {
            out.push(s.as_str());
        }
        out.push(self.version.as_str());
        out
    }

    /// Every prefix of the identity, shortest first.
    pub fn prefixes(&self) -> Vec<Vec<&str>> {
        let segs = self.segments();
        (1..=segs.len()).map(|n| segs[..n].to_vec()).collect()
    }

    /// Relative directory of the document: `provider[/service]/version`.
    pub fn dir(&self) -> String {
        join(&self.segments())
    }

    /// Relative location of `file_name` inside this identity's directory.
    pub fn to_location(&self, file_name: &str) -> String {
        path_to_location(&self.segments(), file_name)
    }
}

impl fmt::Display for ApiPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.dir())
    }
}

/// Derive the identity of a document from its declared metadata.
pub fn resolve_identity(doc: &CanonicalDocument) -> CorpusResult<ApiPath> {
    let provider = doc
        .provider()
        .ok_or_else(|| CorpusError::identity("info.x-providerName is missing"))?;
    let version = doc
        .version()
        .ok_or_else(|| CorpusError::identity("info.version is missing"))?;
    ApiPath::new(provider, doc.service().map(str::to_string), version)
}

/// Join path segments and append a file name.
pub fn path_to_location(segments: &[&str], file_name: &str) -> String {
    let mut s = join(segments);
    if !s.is_empty() {
        s.push(SEPARATOR);
    }
    s.push_str(file_name);
    s
}

fn join(segments: &[&str]) -> String {
    segments.join(&SEPARATOR.to_string())
}

fn check_segment(field: &str, value: &str) -> CorpusResult<()> {
    if value.trim().is_empty() {
        return Err(CorpusError::identity(format!("{field} must not be empty")));
    }
    if value.contains(SEPARATOR) || value.contains('\\') {
        return Err(CorpusError::identity(format!(
            "{field} must not contain a path separator: {value:?}"
        )));
    }
    if value == "." || value == ".." {
        return Err(CorpusError::identity(format!(
            "{field} must not be a relative path component: {value:?}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    fn doc(info: serde_json::Value) -> CanonicalDocument {
        CanonicalDocument::new(json!({ "info": info })).unwrap()
    }

    #[test]
    fn resolves_provider_version() {
        let p = resolve_identity(&doc(json!({"x-providerName": "acme", "version": "v1"}))).unwrap();
        assert_eq!(p.to_location("spec.json"), "acme/v1/spec.json");
        assert_eq!(p.api_id(), "acme");
    }

    #[test]
    fn resolves_with_service() {
        let p = resolve_identity(&doc(json!({
            "x-providerName": "googleapis.com",
            "x-serviceName": "drive",
            "version": "v3"
        })))
        .unwrap();
        assert_eq!(p.dir(), "googleapis.com/drive/v3");
        assert_eq!(p.api_id(), "googleapis.com:drive");
        assert_eq!(
            p.prefixes(),
            vec![
                vec!["googleapis.com"],
                vec!["googleapis.com", "drive"],
                vec!["googleapis.com", "drive", "v3"],
            ]
        );
    }

    #[test]
    fn missing_provider_is_identity_error() {
        let e = resolve_identity(&doc(json!({"version": "v1"}))).unwrap_err();
        assert_matches!(e, CorpusError::Identity(_));
    }

    #[test]
    fn separators_rejected() {
        let e = resolve_identity(&doc(json!({"x-providerName": "a/b", "version": "v1"}))).unwrap_err();
        assert_matches!(e, CorpusError::Identity(_));

        let e = resolve_identity(&doc(json!({
            "x-providerName": "a", "x-serviceName": "s/t", "version": "v1"
        })))
        .unwrap_err();
        assert_matches!(e, CorpusError::Identity(_));
    }

    #[test]
    fn from_segments_round_trips() {
        let p = ApiPath::from_segments(&["acme", "pay", "2.1"]).unwrap();
        assert_eq!(p.segments(), vec!["acme", "pay", "2.1"]);
        assert!(ApiPath::from_segments(&["acme"]).is_err());
    }
}
