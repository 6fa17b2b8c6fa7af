//! add -> urls -> update -> api against a throwaway collection.

mod common;

use std::fs;

use common::{apicorpus_bin, fixture, run, stdout};

#[test]
fn add_then_index() {
    let Some(bin) = apicorpus_bin() else {
        eprintln!("skip: apicorpus binary not found (set APICORPUS_BIN or build apicorpus-cli)");
        return;
    };
    let store = tempfile::tempdir().unwrap();
    let source = fixture("acme_v1.json");
    let source = source.to_str().unwrap();

    let out = run(&bin, store.path(), &["add", "swagger_2", source]);
    assert!(out.status.success(), "add failed: {}", stdout(&out));
    assert!(store.path().join("acme/v1/spec.json").is_file());

    let out = run(&bin, store.path(), &["urls"]);
    assert_eq!(stdout(&out).trim(), source);

    let out = run(&bin, store.path(), &["api", "https://api.example.org/v2/specs/"]);
    assert!(out.status.success());
    let index: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(index["acme"]["preferred"], "v1");
    assert_eq!(
        index["acme"]["versions"]["v1"]["swaggerUrl"],
        "https://api.example.org/v2/specs/acme/v1/spec.json"
    );
}

#[test]
fn update_is_byte_stable() {
    let Some(bin) = apicorpus_bin() else {
        eprintln!("skip: apicorpus binary not found");
        return;
    };
    let store = tempfile::tempdir().unwrap();
    let source = fixture("acme_v1.json");
    run(&bin, store.path(), &["add", "swagger_2", source.to_str().unwrap()]);

    let spec = store.path().join("acme/v1/spec.json");
    let first = fs::read(&spec).unwrap();
    let out = run(&bin, store.path(), &["update"]);
    assert!(out.status.success());
    assert_eq!(fs::read(&spec).unwrap(), first);

    let out = run(&bin, store.path(), &["--json", "validate"]);
    assert!(out.status.success());
    let summary: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(summary["anyFailed"], false);
    assert_eq!(summary["reports"][0]["status"], "checked");
}
