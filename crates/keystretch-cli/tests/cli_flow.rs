use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use keystretch_core::{Argon2Work, CancellableWork, KdfCost, KdfParameters};
use tempfile::TempDir;

const SALT_HEX: &str = "00112233445566778899aabbccddeeff";

fn bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_keystretch"))
}

/// A command isolated from the user's config.
fn keystretch(config_home: &Path) -> Command {
    let mut cmd = Command::new(bin());
    cmd.env("XDG_CONFIG_HOME", config_home)
        .env_remove("KEYSTRETCH_CONFIG")
        .env_remove("RUST_LOG");
    cmd
}

fn run_with_stdin(mut cmd: Command, stdin: &str) -> Output {
    let mut child = cmd
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn keystretch");
    // The process may exit before reading stdin (e.g. on invalid flags).
    let _ = child
        .stdin
        .take()
        .expect("stdin")
        .write_all(stdin.as_bytes());
    child.wait_with_output().expect("wait for keystretch")
}

fn cheap_derive(config_home: &Path) -> Command {
    let mut cmd = keystretch(config_home);
    cmd.args([
        "derive",
        "--passphrase-stdin",
        "--salt-hex",
        SALT_HEX,
        "--memory-kib",
        "64",
        "--iterations",
        "1",
        "--rounds",
        "3",
        "--json",
    ]);
    cmd
}

fn json_stdout(output: &Output) -> serde_json::Value {
    assert!(
        output.status.success(),
        "keystretch failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("stdout is JSON")
}

fn expected_key(passphrase: &str, cost: KdfCost) -> Vec<u8> {
    let salt = hex::decode(SALT_HEX).expect("salt hex");
    let params = KdfParameters::new(passphrase, &salt, cost).expect("params");
    Argon2Work
        .generate(&params)
        .expect("direct derivation")
        .key()
        .to_vec()
}

fn cheap_cost() -> KdfCost {
    KdfCost {
        memory_kib: 64,
        iterations: 1,
        lanes: 1,
        rounds: 3,
    }
}

#[test]
fn test_derive_json_matches_library() {
    let home = TempDir::new().expect("temp dir");
    let output = run_with_stdin(cheap_derive(home.path()), "correct horse battery\n");
    let value = json_stdout(&output);

    assert_eq!(value["salt"], SALT_HEX);
    assert_eq!(value["cost"]["rounds"], 3);
    assert_eq!(value["cost"]["memory_kib"], 64);
    assert!(value["derived_at"].is_string());

    let key = STANDARD
        .decode(value["key"].as_str().expect("key string"))
        .expect("key base64");
    assert_eq!(key, expected_key("correct horse battery", cheap_cost()));
}

#[test]
fn test_derive_is_deterministic() {
    let home = TempDir::new().expect("temp dir");
    let first = json_stdout(&run_with_stdin(cheap_derive(home.path()), "passphrase-one\n"));
    let second = json_stdout(&run_with_stdin(cheap_derive(home.path()), "passphrase-one\n"));
    let other = json_stdout(&run_with_stdin(cheap_derive(home.path()), "passphrase-two\n"));

    assert_eq!(first["key"], second["key"]);
    assert_eq!(first["fingerprint"], second["fingerprint"]);
    assert_ne!(first["key"], other["key"]);
}

#[test]
fn test_restart_yields_same_key() {
    let home = TempDir::new().expect("temp dir");
    let cost = KdfCost {
        memory_kib: 1024,
        iterations: 1,
        lanes: 1,
        rounds: 20,
    };
    let mut cmd = keystretch(home.path());
    cmd.args([
        "-vv",
        "derive",
        "--passphrase-stdin",
        "--salt-hex",
        SALT_HEX,
        "--memory-kib",
        "1024",
        "--iterations",
        "1",
        "--rounds",
        "20",
        "--restart-after-ms",
        "0",
        "--json",
    ]);
    let output = run_with_stdin(cmd, "correct horse battery\n");
    let value = json_stdout(&output);

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("restarting derivation"),
        "no restart logged: {}",
        stderr
    );
    let key = STANDARD
        .decode(value["key"].as_str().expect("key string"))
        .expect("key base64");
    assert_eq!(key, expected_key("correct horse battery", cost));
}

#[test]
fn test_quiet_prints_only_key() {
    let home = TempDir::new().expect("temp dir");
    let mut cmd = keystretch(home.path());
    cmd.args([
        "--quiet",
        "derive",
        "--passphrase-stdin",
        "--salt-hex",
        SALT_HEX,
        "--memory-kib",
        "64",
        "--iterations",
        "1",
        "--rounds",
        "3",
    ]);
    let output = run_with_stdin(cmd, "correct horse battery\n");
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).expect("utf8");
    let key = STANDARD.decode(stdout.trim()).expect("key base64");
    assert_eq!(key, expected_key("correct horse battery", cheap_cost()));
}

#[test]
fn test_empty_passphrase_is_invalid_input() {
    let home = TempDir::new().expect("temp dir");
    let output = run_with_stdin(cheap_derive(home.path()), "\n");
    assert_eq!(output.status.code(), Some(4));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Passphrase cannot be empty"));
}

#[test]
fn test_missing_passphrase_without_tty() {
    let home = TempDir::new().expect("temp dir");
    let mut cmd = keystretch(home.path());
    cmd.args(["derive", "--salt-hex", SALT_HEX]);
    let output = run_with_stdin(cmd, "");
    assert_eq!(output.status.code(), Some(4));
    assert!(String::from_utf8_lossy(&output.stderr).contains("--passphrase-stdin"));
}

#[test]
fn test_bad_salt_is_invalid_input() {
    let home = TempDir::new().expect("temp dir");

    let mut not_hex = keystretch(home.path());
    not_hex.args(["derive", "--passphrase-stdin", "--salt-hex", "zz"]);
    let output = run_with_stdin(not_hex, "correct horse battery\n");
    assert_eq!(output.status.code(), Some(4));

    let mut too_short = keystretch(home.path());
    too_short.args(["derive", "--passphrase-stdin", "--salt-hex", "0011"]);
    let output = run_with_stdin(too_short, "correct horse battery\n");
    assert_eq!(output.status.code(), Some(4));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Salt must be at least 16 bytes"));
}

#[test]
fn test_invalid_cost_is_invalid_input() {
    let home = TempDir::new().expect("temp dir");
    let mut cmd = keystretch(home.path());
    cmd.args(["derive", "--passphrase-stdin", "--rounds", "0"]);
    let output = run_with_stdin(cmd, "correct horse battery\n");
    assert_eq!(output.status.code(), Some(4));
}

#[test]
fn test_timeout_terminates_running_job() {
    let home = TempDir::new().expect("temp dir");
    let mut cmd = keystretch(home.path());
    cmd.args([
        "derive",
        "--passphrase-stdin",
        "--salt-hex",
        SALT_HEX,
        "--memory-kib",
        "32768",
        "--iterations",
        "3",
        "--rounds",
        "200",
        "--timeout-secs",
        "0",
    ]);
    let output = run_with_stdin(cmd, "correct horse battery\n");
    assert_eq!(output.status.code(), Some(7));
    assert!(String::from_utf8_lossy(&output.stderr).contains("terminated"));
    assert!(output.stdout.is_empty());
}

#[test]
fn test_config_init_show_and_use() {
    let home = TempDir::new().expect("temp dir");

    let mut init = keystretch(home.path());
    init.args(["config", "init"]);
    let output = init.output().expect("run config init");
    assert!(output.status.success());
    let config_path = home.path().join("keystretch").join("config.toml");
    assert!(config_path.exists());

    let mut again = keystretch(home.path());
    again.args(["config", "init"]);
    let output = again.output().expect("run config init again");
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("--force"));

    std::fs::write(
        &config_path,
        "[kdf]\nmemory_kib = 128\niterations = 1\nlanes = 1\nrounds = 2\n\n[ui]\npoll_interval_ms = 5\n",
    )
    .expect("write config");

    let mut show = keystretch(home.path());
    show.args(["config", "show"]);
    let output = show.output().expect("run config show");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("memory_kib = 128"));
    assert!(stdout.contains("poll_interval_ms = 5"));

    let mut derive = keystretch(home.path());
    derive.args(["derive", "--passphrase-stdin", "--salt-hex", SALT_HEX, "--json"]);
    let value = json_stdout(&run_with_stdin(derive, "correct horse battery\n"));
    assert_eq!(value["cost"]["memory_kib"], 128);
    assert_eq!(value["cost"]["rounds"], 2);

    let mut force = keystretch(home.path());
    force.args(["config", "init", "--force"]);
    assert!(force.output().expect("run config init --force").status.success());
    let contents = std::fs::read_to_string(&config_path).expect("read config");
    assert!(contents.contains("memory_kib = 65536"));
}

#[test]
fn test_config_flag_overrides_location() {
    let home = TempDir::new().expect("temp dir");
    let custom = home.path().join("custom.toml");

    let mut init = keystretch(home.path());
    init.args(["--config", custom.to_str().expect("utf8 path"), "config", "init"]);
    assert!(init.output().expect("run config init").status.success());
    assert!(custom.exists());
    assert!(!home.path().join("keystretch").join("config.toml").exists());
}

#[test]
fn test_completions_generate() {
    let home = TempDir::new().expect("temp dir");
    let mut cmd = keystretch(home.path());
    cmd.args(["completions", "bash"]);
    let output = cmd.output().expect("run completions");
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("keystretch"));
}
