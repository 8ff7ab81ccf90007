use assert_cmd::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::{TempDir, tempdir};

struct Fixture {
    _tmp: TempDir,
    vault: PathBuf,
    xdg: PathBuf,
}

fn fixture() -> Fixture {
    let tmp = tempdir().unwrap();

    let vault = tmp.path().join("vault");
    fs::create_dir_all(&vault).unwrap();

    let xdg = tmp.path().join("xdg");
    let cfg_dir = xdg.join("mduri");
    fs::create_dir_all(&cfg_dir).unwrap();

    let toml = format!(
        r#"
version = 1
default_vault = "main"

[vaults.main]
root = "{vault}"

[vaults.main.periodic.daily]
folder = "daily"
format = "%Y-%m-%d"
"#,
        vault = vault.display(),
    );
    fs::write(cfg_dir.join("config.toml"), toml).unwrap();

    Fixture { _tmp: tmp, vault, xdg }
}

fn mdu(xdg: &Path) -> std::process::Command {
    let mut cmd = std::process::Command::new(assert_cmd::cargo::cargo_bin!("mdu"));
    cmd.env("XDG_CONFIG_HOME", xdg);
    cmd.env("NO_COLOR", "1");
    cmd.env_remove("EDITOR");
    cmd
}

#[test]
fn create_writes_the_note_and_prints_the_success_callback() {
    let fx = fixture();

    let mut cmd = mdu(&fx.xdg);
    cmd.args([
        "call",
        "mduri://note/create?action=t&vault=main&file=inbox/todo&content=hello\
         &silent=true&x-success=https://cb.example/ok",
    ]);
    cmd.assert()
        .success()
        .stdout(predicates::str::contains("result-filepath=inbox%2Ftodo.md"))
        .stdout(predicates::str::contains("OK   note/create"));

    let written = fs::read_to_string(fx.vault.join("inbox/todo.md")).unwrap();
    assert_eq!(written, "hello");
}

#[test]
fn get_missing_note_reports_a_404_error_callback() {
    let fx = fixture();

    let mut cmd = mdu(&fx.xdg);
    cmd.args([
        "call",
        "mduri://note/get?action=t&vault=main&file=missing\
         &x-success=https://cb.example/ok&x-error=https://cb.example/err",
    ]);
    cmd.assert()
        .failure()
        .stdout(predicates::str::contains("error-code=404"))
        .stdout(predicates::str::contains("FAIL note/get"));
}

#[test]
fn unknown_vault_is_rejected_before_dispatch() {
    let fx = fixture();

    let mut cmd = mdu(&fx.xdg);
    cmd.args([
        "call",
        "mduri://note/get?action=t&vault=nope&file=x\
         &x-success=https://cb.example/ok&x-error=https://cb.example/err",
    ]);
    cmd.assert()
        .failure()
        .stdout(predicates::str::contains("error-code=404"))
        .stderr(predicates::str::contains("vault not found: nope"));
}

#[test]
fn vault_rejection_uses_the_fire_transport_selection() {
    let fx = fixture();

    // --fire without security.allow_http falls back to printing, and that
    // fallback must apply to pre-dispatch rejections too.
    let mut cmd = mdu(&fx.xdg);
    cmd.args([
        "call",
        "--fire",
        "mduri://note/get?action=t&vault=nope&file=x\
         &x-success=https://cb.example/ok&x-error=https://cb.example/err",
    ]);
    cmd.assert()
        .failure()
        .stdout(predicates::str::contains("callback: https://cb.example/err?error-code=404"))
        .stderr(predicates::str::contains(
            "security.allow_http is off; printing callbacks instead",
        ));
}

#[test]
fn missing_vault_parameter_falls_back_to_the_default_vault() {
    let fx = fixture();

    let mut cmd = mdu(&fx.xdg);
    cmd.args([
        "call",
        "mduri://note/create?action=t&file=fallback&content=hi&silent=true",
    ]);
    cmd.assert().success();
    assert!(fx.vault.join("fallback.md").exists());
}

#[test]
fn validation_failure_shows_a_branded_notice() {
    let fx = fixture();

    // note/append requires `content`
    let mut cmd = mdu(&fx.xdg);
    cmd.args([
        "call",
        "mduri://note/append?action=t&vault=main&file=x&x-error=https://cb.example/err",
    ]);
    cmd.assert()
        .failure()
        .stdout(predicates::str::contains("error-code=400"))
        .stderr(predicates::str::contains("[mduri]"));
}

#[test]
fn namespace_root_greets_over_a_notice() {
    let fx = fixture();

    let mut cmd = mdu(&fx.xdg);
    cmd.args(["call", "mduri://note?action=t&vault=main"]);
    cmd.assert()
        .success()
        .stderr(predicates::str::contains("Hello, the mduri host is listening."));
}

#[test]
fn daily_create_lands_in_the_configured_folder() {
    let fx = fixture();

    let mut cmd = mdu(&fx.xdg);
    cmd.args([
        "call",
        "mduri://daily-note/create?action=t&vault=main&content=log\
         &silent=true&x-success=https://cb.example/ok",
    ]);
    cmd.assert()
        .success()
        .stdout(predicates::str::contains("result-filepath=daily%2F"));

    let entries: Vec<_> = fs::read_dir(fx.vault.join("daily")).unwrap().collect();
    assert_eq!(entries.len(), 1);
}

#[test]
fn disabled_periodic_kind_is_a_412() {
    let fx = fixture();

    let mut cmd = mdu(&fx.xdg);
    cmd.args([
        "call",
        "mduri://weekly-note/get-current?action=t&vault=main\
         &x-success=https://cb.example/ok&x-error=https://cb.example/err",
    ]);
    cmd.assert().failure().stdout(predicates::str::contains("error-code=412"));
}
