//! Integration tests for the nrfdfu CLI
//!
//! Each test drives the built binary end to end and checks output and exit
//! codes.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

type TestResult = Result<(), Box<dyn std::error::Error>>;

/// Test helper to create an nrfdfu command
fn nrfdfu() -> Result<Command, Box<dyn std::error::Error>> {
    Ok(Command::cargo_bin("nrfdfu")?)
}

/// Test helper to write a raw firmware image
fn write_image(dir: &TempDir, name: &str, len: usize) -> Result<PathBuf, std::io::Error> {
    let path = dir.path().join(name);
    let data: Vec<u8> = (0..len).map(|i| (i % 251) as u8).collect();
    fs::write(&path, data)?;
    Ok(path)
}

/// Test helper to generate a fresh signing key
fn generate_key(dir: &TempDir) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let path = dir.path().join("private.pem");
    nrfdfu()?
        .args(["keys", "generate"])
        .arg(&path)
        .assert()
        .success();
    Ok(path)
}

fn as_str(path: &Path) -> &str {
    path.to_str().unwrap_or_default()
}

#[test]
fn test_cli_help() -> TestResult {
    nrfdfu()?
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("nRF5 DFU tool"));
    Ok(())
}

#[test]
fn test_cli_version() -> TestResult {
    nrfdfu()?
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("nrfdfu version"));
    Ok(())
}

#[test]
fn test_completion_generation() -> TestResult {
    nrfdfu()?
        .args(["completion", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("_nrfdfu"));
    Ok(())
}

// Key Tests

#[test]
fn test_keys_generate_writes_pem() -> TestResult {
    let dir = TempDir::new()?;
    let key = generate_key(&dir)?;
    let pem = fs::read_to_string(key)?;
    assert!(pem.contains("PRIVATE KEY"));
    Ok(())
}

#[test]
fn test_keys_generate_overwrite_with_yes() -> TestResult {
    let dir = TempDir::new()?;
    let key = generate_key(&dir)?;
    let before = fs::read_to_string(&key)?;
    nrfdfu()?
        .args(["keys", "generate", "--yes"])
        .arg(&key)
        .assert()
        .success();
    assert_ne!(fs::read_to_string(&key)?, before);
    Ok(())
}

#[test]
fn test_keys_display_public_hex() -> TestResult {
    let dir = TempDir::new()?;
    let key = generate_key(&dir)?;
    let output = nrfdfu()?
        .args(["keys", "display", as_str(&key), "--key", "pk", "--format", "hex"])
        .output()?;
    assert!(output.status.success());
    let text = String::from_utf8(output.stdout)?;
    let line = text.trim();
    assert_eq!(line.len(), 128);
    assert!(line.chars().all(|c| c.is_ascii_hexdigit()));
    Ok(())
}

#[test]
fn test_keys_display_code_to_file() -> TestResult {
    let dir = TempDir::new()?;
    let key = generate_key(&dir)?;
    let out = dir.path().join("dfu_public_key.c");
    nrfdfu()?
        .args(["keys", "display", as_str(&key), "--key", "pk", "--format", "code"])
        .args(["--out-file", as_str(&out)])
        .assert()
        .success();
    let code = fs::read_to_string(out)?;
    assert!(code.contains("pk[64]"));
    Ok(())
}

#[test]
fn test_keys_display_private_as_code_is_usage_error() -> TestResult {
    let dir = TempDir::new()?;
    let key = generate_key(&dir)?;
    nrfdfu()?
        .args(["keys", "display", as_str(&key), "--key", "sk", "--format", "code"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("private key as code"));
    Ok(())
}

#[test]
fn test_keys_display_missing_file() -> TestResult {
    let dir = TempDir::new()?;
    nrfdfu()?
        .args(["keys", "display"])
        .arg(dir.path().join("absent.pem"))
        .args(["--key", "pk", "--format", "pem"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("File not found"));
    Ok(())
}

// Settings Tests

#[test]
fn test_settings_generate_and_display() -> TestResult {
    let dir = TempDir::new()?;
    let app = write_image(&dir, "app.bin", 1024)?;
    let hex = dir.path().join("settings.hex");

    nrfdfu()?
        .args(["settings", "generate", as_str(&hex)])
        .args(["--family", "NRF52", "--application", as_str(&app)])
        .args(["--application-version", "3", "--bootloader-version", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Bootloader DFU Settings:"));

    nrfdfu()?
        .args(["settings", "display", as_str(&hex)])
        .assert()
        .success()
        .stdout(predicate::str::contains("0x0007F000"))
        .stdout(predicate::str::contains("0x0007E000"))
        .stdout(predicate::str::contains("0x00000400 (1024)"));
    Ok(())
}

#[test]
fn test_settings_custom_address_notices_and_family() -> TestResult {
    let dir = TempDir::new()?;
    let hex = dir.path().join("settings.hex");

    nrfdfu()?
        .args(["settings", "generate", as_str(&hex)])
        .args(["--family", "NRF52", "--bootloader-version", "1"])
        .args(["--start-address", "0x6F000"])
        .assert()
        .success()
        .stderr(predicate::str::contains("nRF5 SDK 15.1"))
        .stderr(predicate::str::contains("default offset"))
        .stderr(predicate::str::contains("0x0006E000"))
        .stdout(predicate::str::is_match(r"Family:\s+NRF52\n")?)
        .stdout(predicate::str::contains("unknown").not());
    Ok(())
}

#[test]
fn test_settings_no_backup_is_quiet() -> TestResult {
    let dir = TempDir::new()?;
    nrfdfu()?
        .args(["settings", "generate"])
        .arg(dir.path().join("settings.hex"))
        .args(["--family", "NRF52", "--bootloader-version", "1", "--no-backup"])
        .assert()
        .success()
        .stderr(predicate::str::contains("15.1").not());
    Ok(())
}

#[test]
fn test_settings_conflicting_backup() -> TestResult {
    let dir = TempDir::new()?;
    nrfdfu()?
        .args(["settings", "generate"])
        .arg(dir.path().join("settings.hex"))
        .args(["--family", "NRF52", "--bootloader-version", "1"])
        .args(["--no-backup", "--backup-address", "0x7D000"])
        .assert()
        .code(2);
    assert!(!dir.path().join("settings.hex").exists());
    Ok(())
}

#[test]
fn test_settings_ecdsa_needs_key() -> TestResult {
    let dir = TempDir::new()?;
    let app = write_image(&dir, "app.bin", 64)?;
    nrfdfu()?
        .args(["settings", "generate"])
        .arg(dir.path().join("settings.hex"))
        .args(["--family", "NRF52840", "--application", as_str(&app)])
        .args(["--application-version", "1", "--bootloader-version", "1"])
        .args(["--app-boot-validation", "VALIDATE_ECDSA_P256_SHA256"])
        .assert()
        .code(2);
    Ok(())
}

// Package Tests

#[test]
fn test_pkg_generate_signed_and_display() -> TestResult {
    let dir = TempDir::new()?;
    let key = generate_key(&dir)?;
    let app = write_image(&dir, "blinky.bin", 2048)?;
    let zip = dir.path().join("blinky.zip");

    nrfdfu()?
        .args(["pkg", "generate", as_str(&zip)])
        .args(["--application", as_str(&app), "--application-version", "1"])
        .args(["--hw-version", "52", "--sd-req", "0x0100"])
        .args(["--key-file", as_str(&key)])
        .assert()
        .success()
        .stdout(predicate::str::contains("Zip created"));

    nrfdfu()?
        .args(["pkg", "display", as_str(&zip)])
        .assert()
        .success()
        .stdout(predicate::str::contains("Image count: 1"))
        .stdout(predicate::str::contains("blinky.bin"))
        .stdout(predicate::str::contains("ECDSA_P256_SHA256"));
    Ok(())
}

#[test]
fn test_pkg_generate_unsigned_warns() -> TestResult {
    let dir = TempDir::new()?;
    let app = write_image(&dir, "app.bin", 256)?;
    nrfdfu()?
        .args(["pkg", "generate"])
        .arg(dir.path().join("app.zip"))
        .args(["--application", as_str(&app), "--application-version", "1"])
        .args(["--hw-version", "52", "--sd-req", "0x0100"])
        .assert()
        .success()
        .stderr(predicate::str::contains("UNSIGNED"));
    Ok(())
}

#[test]
fn test_pkg_repeated_sd_req() -> TestResult {
    let dir = TempDir::new()?;
    let app = write_image(&dir, "app.bin", 256)?;
    nrfdfu()?
        .args(["pkg", "generate"])
        .arg(dir.path().join("app.zip"))
        .args(["--application", as_str(&app), "--application-version", "1"])
        .args(["--hw-version", "52", "--sd-req", "0x91", "--sd-req", "0x95"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("comma-separated"));
    Ok(())
}

#[test]
fn test_pkg_bootloader_with_application_rejected() -> TestResult {
    let dir = TempDir::new()?;
    let app = write_image(&dir, "app.bin", 256)?;
    let bl = write_image(&dir, "bl.bin", 256)?;
    nrfdfu()?
        .args(["pkg", "generate"])
        .arg(dir.path().join("both.zip"))
        .args(["--application", as_str(&app), "--application-version", "1"])
        .args(["--bootloader", as_str(&bl), "--bootloader-version", "1"])
        .args(["--hw-version", "52", "--sd-req", "0x0100"])
        .assert()
        .code(4);
    assert!(!dir.path().join("both.zip").exists());
    Ok(())
}

#[test]
fn test_pkg_missing_image_is_usage_error() -> TestResult {
    let dir = TempDir::new()?;
    nrfdfu()?
        .args(["pkg", "generate"])
        .arg(dir.path().join("app.zip"))
        .arg("--application")
        .arg(dir.path().join("missing.hex"))
        .args(["--application-version", "1", "--hw-version", "52", "--sd-req", "0x0100"])
        .assert()
        .code(2);
    Ok(())
}

#[test]
fn test_pkg_debug_mode_without_versions() -> TestResult {
    let dir = TempDir::new()?;
    let app = write_image(&dir, "app.bin", 128)?;
    let zip = dir.path().join("debug.zip");
    nrfdfu()?
        .args(["pkg", "generate", as_str(&zip), "--debug-mode"])
        .args(["--application", as_str(&app)])
        .assert()
        .success()
        .stderr(predicate::str::contains("DEBUG MODE"));

    nrfdfu()?
        .args(["pkg", "display", as_str(&zip)])
        .assert()
        .success()
        .stdout(predicate::str::contains("is_debug: true"));
    Ok(())
}

#[test]
fn test_pkg_display_rejects_non_zip() -> TestResult {
    let dir = TempDir::new()?;
    let junk = write_image(&dir, "junk.zip", 32)?;
    nrfdfu()?
        .args(["pkg", "display", as_str(&junk)])
        .assert()
        .failure();
    Ok(())
}
