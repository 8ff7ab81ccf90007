use assert_cmd::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::{TempDir, tempdir};

fn fixture() -> (TempDir, PathBuf) {
    let tmp = tempdir().unwrap();

    let vault = tmp.path().join("vault");
    fs::create_dir_all(&vault).unwrap();
    fs::write(vault.join("a.md"), "---\nuid: abc\n---\n# Alpha\n").unwrap();

    let xdg = tmp.path().join("xdg");
    let cfg_dir = xdg.join("mduri");
    fs::create_dir_all(&cfg_dir).unwrap();
    let toml = format!(
        "version = 1\ndefault_vault = \"main\"\n\n[vaults.main]\nroot = \"{}\"\n",
        vault.display(),
    );
    fs::write(cfg_dir.join("config.toml"), toml).unwrap();

    (tmp, xdg)
}

fn mdu(xdg: &Path) -> std::process::Command {
    let mut cmd = std::process::Command::new(assert_cmd::cargo::cargo_bin!("mdu"));
    cmd.env("XDG_CONFIG_HOME", xdg);
    cmd.env("NO_COLOR", "1");
    cmd
}

#[test]
fn routes_lists_the_registry() {
    let (_tmp, xdg) = fixture();

    let mut cmd = mdu(&xdg);
    cmd.arg("routes");
    cmd.assert()
        .success()
        .stdout(predicates::str::contains("note/get"))
        .stdout(predicates::str::contains("daily-note/append"))
        .stdout(predicates::str::contains("omnisearch/all-notes"));
}

#[test]
fn doctor_reports_the_resolved_config() {
    let (_tmp, xdg) = fixture();

    let mut cmd = mdu(&xdg);
    cmd.arg("doctor");
    cmd.assert()
        .success()
        .stdout(predicates::str::contains("OK   mdu doctor"))
        .stdout(predicates::str::contains("vault main:"));
}

#[test]
fn doctor_fails_without_a_config() {
    let tmp = tempdir().unwrap();
    let xdg = tmp.path().join("empty-xdg");
    fs::create_dir_all(&xdg).unwrap();

    let mut cmd = mdu(&xdg);
    cmd.arg("doctor");
    cmd.assert().failure().stdout(predicates::str::contains("FAIL mdu doctor"));
}

#[test]
fn reindex_counts_indexed_notes() {
    let (_tmp, xdg) = fixture();

    let mut cmd = mdu(&xdg);
    cmd.arg("reindex");
    cmd.assert()
        .success()
        .stdout(predicates::str::contains("OK   reindex main"))
        .stdout(predicates::str::contains("indexed: 1"));
}
