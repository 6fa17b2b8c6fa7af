//! A manual correction recorded through `add --fixup` is replayed by `update`.

mod common;

#[cfg(unix)]
#[test]
fn correction_survives_update() {
    use std::fs;
    use std::os::unix::fs::PermissionsExt;

    use common::{apicorpus_bin, fixture, run, run_with_env};

    let Some(bin) = apicorpus_bin() else {
        eprintln!("skip: apicorpus binary not found");
        return;
    };
    let store = tempfile::tempdir().unwrap();
    let scratch = tempfile::tempdir().unwrap();
    let source = fixture("acme_v2_duplicate_ops.json");
    let source = source.to_str().unwrap();

    // Rename every occurrence of the duplicated operationId after the first.
    let editor = scratch.path().join("fix.sh");
    fs::write(
        &editor,
        "#!/bin/sh\nsed -i.bak '0,/\"listWidgets\"/! s/\"listWidgets\"/\"listGadgets\"/' \"$1\"\n",
    )
    .unwrap();
    fs::set_permissions(&editor, fs::Permissions::from_mode(0o755)).unwrap();

    let out = run_with_env(
        &bin,
        store.path(),
        &["add", "--fixup", "swagger_2", source],
        &[("VISUAL", editor.to_str().unwrap())],
    );
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stdout));
    assert!(store.path().join("acme/v2/fixup.json").is_file());

    fs::remove_file(store.path().join("acme/v2/spec.json")).unwrap();
    let out = run(&bin, store.path(), &["add", "swagger_2", source]);
    assert!(out.status.success());
    let spec: serde_json::Value =
        serde_json::from_slice(&fs::read(store.path().join("acme/v2/spec.json")).unwrap()).unwrap();
    let mut ops = vec![
        spec["paths"]["/widgets"]["get"]["operationId"].as_str().unwrap(),
        spec["paths"]["/gadgets"]["get"]["operationId"].as_str().unwrap(),
    ];
    ops.sort_unstable();
    assert_eq!(ops, ["listGadgets", "listWidgets"]);
}
