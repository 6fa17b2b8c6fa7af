//! Exit status policy.

mod common;

use std::fs;

use common::{apicorpus_bin, fixture, run};

#[test]
fn failed_document_sets_exit_status() {
    let Some(bin) = apicorpus_bin() else {
        eprintln!("skip: apicorpus binary not found");
        return;
    };
    let store = tempfile::tempdir().unwrap();
    let source = fixture("acme_v2_duplicate_ops.json");
    let source = source.to_str().unwrap();

    let out = run(&bin, store.path(), &["add", "swagger_2", source]);
    assert_eq!(out.status.code(), Some(255));
    assert!(String::from_utf8_lossy(&out.stdout).contains("==== FAILED [validate]"));
    assert!(!store.path().join("acme/v2/spec.json").exists());

    let out = run(&bin, store.path(), &["--force-success", "add", "swagger_2", source]);
    assert_eq!(out.status.code(), Some(0));

    fs::write(store.path().join("apicorpus.json"), r#"{"exit": {"failure_code": 3}}"#).unwrap();
    let out = run(&bin, store.path(), &["add", "swagger_2", source]);
    assert_eq!(out.status.code(), Some(3));
}
