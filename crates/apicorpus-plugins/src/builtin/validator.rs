//! Structural checks every persisted document must pass.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::plugin::{ValidationReport, Validator};

const METHODS: &[&str] = &["get", "put", "post", "delete", "options", "head", "patch", "trace"];

#[derive(Debug, Clone, Copy, Default)]
pub struct StructuralValidator;

impl Validator for StructuralValidator {
    fn validate(&self, document: &Value) -> ValidationReport {
        let mut report = ValidationReport::default();
        check_info(document, &mut report);
        check_paths(document, &mut report);
        report
    }
}

fn check_info(document: &Value, report: &mut ValidationReport) {
    let Some(info) = document.get("info").and_then(Value::as_object) else {
        report.error("info is missing or not an object");
        return;
    };
    for field in ["title", "version"] {
        match info.get(field).and_then(Value::as_str) {
            Some(s) if !s.trim().is_empty() => {}
            _ => report.error(format!("info.{field} is missing")),
        }
    }
    if info.get("description").and_then(Value::as_str).map_or(true, str::is_empty) {
        report.warn("info.description is missing");
    }
}

fn check_paths(document: &Value, report: &mut ValidationReport) {
    let paths = match document.get("paths") {
        None => {
            report.warn("document declares no paths");
            return;
        }
        Some(Value::Object(p)) => p,
        Some(_) => {
            report.error("paths is not an object");
            return;
        }
    };

    // operationId -> "METHOD /path" of its first use
    let mut seen: BTreeMap<&str, String> = BTreeMap::new();
    for (path, item) in paths {
        let Some(item) = item.as_object() else {
            report.error(format!("path item {path} is not an object"));
            continue;
        };
        for method in METHODS {
            let Some(op) = item.get(*method) else { continue };
            let here = format!("{} {path}", method.to_ascii_uppercase());
            match op.get("operationId").and_then(Value::as_str) {
                Some(id) if !id.is_empty() => {
                    if let Some(first) = seen.get(id) {
                        report.error(format!("duplicate operationId {id:?} at {here} (first used at {first})"));
                    } else {
                        seen.insert(id, here);
                    }
                }
                _ => report.warn(format!("{here} has no operationId")),
            }
        }
    }
}
