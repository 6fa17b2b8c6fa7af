//! Shared helpers for the black-box tests.
//!
//! The binary path can be overridden via APICORPUS_BIN. When the binary is
//! not found the tests are skipped.

#![allow(dead_code)]

use std::env;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

pub fn repo_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .to_path_buf()
}

pub fn fixture(name: &str) -> PathBuf {
    repo_root().join("tests").join("fixtures").join(name)
}

pub fn apicorpus_bin() -> Option<PathBuf> {
    if let Ok(p) = env::var("APICORPUS_BIN") {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return Some(pb);
        }
    }
    let p = repo_root()
        .join("target")
        .join("debug")
        .join(if cfg!(windows) { "apicorpus.exe" } else { "apicorpus" });
    if p.exists() {
        Some(p)
    } else {
        None
    }
}

pub fn run(bin: &Path, store: &Path, args: &[&str]) -> Output {
    run_with_env(bin, store, args, &[])
}

pub fn run_with_env(bin: &Path, store: &Path, args: &[&str], envs: &[(&str, &str)]) -> Output {
    Command::new(bin)
        .arg("--store-root")
        .arg(store)
        .args(args)
        .envs(envs.iter().copied())
        .env("APICORPUS_LOG", "warn")
        .output()
        .expect("failed to spawn apicorpus")
}

pub fn stdout(out: &Output) -> String {
    String::from_utf8_lossy(&out.stdout).into_owned()
}
