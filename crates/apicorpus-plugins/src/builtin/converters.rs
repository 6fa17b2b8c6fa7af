//! Pass-through converters for documents that are already OpenAPI 3 or
//! Swagger 2 JSON.
//!
//! These do no format translation. They normalize the few things the
//! collection needs before identity resolution:
//! - top-level `provider` / `service` / `version` declarations move into
//!   `info` (`x-providerName`, `x-serviceName`, `version`)
//! - a missing provider is derived from `host` (Swagger) or the first
//!   server URL (OpenAPI)
//! - a missing `info.title` defaults to the provider name
//! - a missing format marker (`swagger` / `openapi`) is filled in

use anyhow::{anyhow, bail, Result};
use serde_json::{Map, Value};

use apicorpus_core::document::keys;

use crate::plugin::{Converted, ConversionInput, Converter};

const SWAGGER_MARKER: &str = "swagger";
const OPENAPI_MARKER: &str = "openapi";
const DEFAULT_SWAGGER: &str = "2.0";
const DEFAULT_OPENAPI: &str = "3.0.0";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Family {
    Swagger2,
    OpenApi3,
    /// Pick by marker; documents without one are treated as OpenAPI 3.
    Detect,
}

#[derive(Debug, Clone)]
pub struct PassThroughConverter {
    family: Family,
}

impl PassThroughConverter {
    pub fn new(family: Family) -> Self {
        Self { family }
    }
}

impl Converter for PassThroughConverter {
    fn name(&self) -> &str {
        match self.family {
            Family::Swagger2 => "swagger_2",
            Family::OpenApi3 => "openapi_3",
            Family::Detect => "json",
        }
    }

    fn version(&self) -> &str {
        super::VERSION
    }

    fn convert(&self, input: &ConversionInput<'_>) -> Result<Converted> {
        let Value::Object(src) = input.source else {
            bail!("{}: source document is not a JSON object", input.source_url);
        };
        let mut root = src.clone();

        let family = match self.family {
            Family::Detect if root.contains_key(SWAGGER_MARKER) => Family::Swagger2,
            Family::Detect => Family::OpenApi3,
            f => f,
        };
        let format_version = ensure_marker(&mut root, family)?;

        let declared_provider = take_string(&mut root, "provider");
        let declared_service = take_string(&mut root, "service");
        let declared_version = take_string(&mut root, keys::VERSION);

        let derived = match family {
            Family::Swagger2 => provider_from_host(&root),
            _ => provider_from_servers(&root),
        };

        let info = root
            .entry(keys::INFO)
            .or_insert_with(|| Value::Object(Map::new()))
            .as_object_mut()
            .ok_or_else(|| anyhow!("{}: info is not an object", input.source_url))?;

        if let Some(p) = declared_provider.or(derived) {
            info.entry(keys::PROVIDER).or_insert(Value::String(p));
        }
        if let Some(s) = declared_service {
            info.entry(keys::SERVICE).or_insert(Value::String(s));
        }
        if let Some(v) = declared_version {
            info.entry(keys::VERSION).or_insert(Value::String(v));
        }
        if !info.contains_key("title") {
            if let Some(p) = info.get(keys::PROVIDER).cloned() {
                info.insert("title".into(), p);
            }
        }

        Ok(Converted {
            document: Value::Object(root),
            format_version,
        })
    }
}

fn ensure_marker(root: &mut Map<String, Value>, family: Family) -> Result<String> {
    let (marker, other, default, prefix) = match family {
        Family::Swagger2 => (SWAGGER_MARKER, OPENAPI_MARKER, DEFAULT_SWAGGER, "2."),
        _ => (OPENAPI_MARKER, SWAGGER_MARKER, DEFAULT_OPENAPI, "3."),
    };
    if root.contains_key(other) {
        bail!("document declares {other:?}, expected {marker:?}");
    }
    match root.get(marker) {
        None => {
            root.insert(marker.into(), Value::String(default.into()));
            Ok(default.into())
        }
        Some(Value::String(v)) if v.starts_with(prefix) => Ok(v.clone()),
        Some(v) => bail!("unsupported {marker} version {v}"),
    }
}

fn take_string(root: &mut Map<String, Value>, key: &str) -> Option<String> {
    match root.get(key) {
        Some(Value::String(s)) if !s.is_empty() => {
            let s = s.clone();
            root.remove(key);
            Some(s)
        }
        _ => None,
    }
}

fn provider_from_host(root: &Map<String, Value>) -> Option<String> {
    root.get("host").and_then(Value::as_str).and_then(provider_from_hostname)
}

fn provider_from_servers(root: &Map<String, Value>) -> Option<String> {
    let first = root.get("servers")?.as_array()?.first()?;
    let raw = first.get("url")?.as_str()?;
    let parsed = url::Url::parse(raw).ok()?;
    parsed.host_str().and_then(provider_from_hostname)
}

/// `api.acme.com:8443` -> `acme.com`
fn provider_from_hostname(host: &str) -> Option<String> {
    let host = host.split(':').next()?.trim().to_ascii_lowercase();
    let host = host
        .strip_prefix("www.")
        .or_else(|| host.strip_prefix("api."))
        .unwrap_or(&host);
    if host.is_empty() || host.contains('/') {
        return None;
    }
    Some(host.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn convert(family: Family, source: Value) -> Result<Converted> {
        PassThroughConverter::new(family).convert(&ConversionInput {
            source: &source,
            source_url: "https://example.org/spec.json",
            format: "test",
        })
    }

    #[test]
    fn lifts_declared_identity() {
        let out = convert(
            Family::Swagger2,
            json!({"provider": "acme", "version": "v1", "host": "api.acme.com"}),
        )
        .unwrap();
        assert_eq!(out.format_version, "2.0");
        assert_eq!(
            out.document,
            json!({
                "swagger": "2.0",
                "host": "api.acme.com",
                "info": {"title": "acme", "version": "v1", "x-providerName": "acme"}
            })
        );
    }

    #[test]
    fn derives_provider_from_host_and_servers() {
        let sw = convert(Family::Swagger2, json!({"swagger": "2.0", "host": "api.petstore.io:443", "info": {"title": "P", "version": "1"}})).unwrap();
        assert_eq!(sw.document["info"]["x-providerName"], "petstore.io");

        let oa = convert(
            Family::OpenApi3,
            json!({"openapi": "3.0.3", "servers": [{"url": "https://www.example.com/v1"}], "info": {"title": "E", "version": "1"}}),
        )
        .unwrap();
        assert_eq!(oa.format_version, "3.0.3");
        assert_eq!(oa.document["info"]["x-providerName"], "example.com");
    }

    #[test]
    fn existing_info_is_not_overwritten() {
        let out = convert(
            Family::OpenApi3,
            json!({"provider": "other", "info": {"title": "T", "version": "2", "x-providerName": "acme"}}),
        )
        .unwrap();
        assert_eq!(out.document["info"]["x-providerName"], "acme");
        assert_eq!(out.document["info"]["title"], "T");
    }

    #[test]
    fn detect_picks_family_by_marker() {
        let sw = convert(Family::Detect, json!({"swagger": "2.0"})).unwrap();
        assert_eq!(sw.format_version, "2.0");
        let oa = convert(Family::Detect, json!({})).unwrap();
        assert_eq!(oa.document["openapi"], "3.0.0");
    }

    #[test]
    fn rejects_wrong_family_and_non_objects() {
        assert!(convert(Family::Swagger2, json!({"openapi": "3.1.0"})).is_err());
        assert!(convert(Family::OpenApi3, json!({"openapi": "2.0"})).is_err());
        assert!(convert(Family::OpenApi3, json!([1])).is_err());
        assert!(convert(Family::OpenApi3, json!({"info": "nope"})).is_err());
    }

    #[test]
    fn hostname_rules() {
        assert_eq!(provider_from_hostname("API.Acme.com").as_deref(), Some("acme.com"));
        assert_eq!(provider_from_hostname("acme.com:80").as_deref(), Some("acme.com"));
        assert_eq!(provider_from_hostname(""), None);
    }
}
