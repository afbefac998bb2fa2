//! CLI integration tests
//!
//! These tests drive the built `rimpatch` binary against files in a
//! temporary directory.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

const DEFS: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<Defs>
    <ThingDef><defName>Wall</defName></ThingDef>
    <ThingDef><defName>Door</defName></ThingDef>
</Defs>"#;

fn write(root: &Path, relative: &str, contents: &str) -> PathBuf {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, contents).unwrap();
    path
}

fn rimpatch(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_rimpatch"))
        .current_dir(dir)
        .env("RUST_LOG", "off")
        .args(args)
        .output()
        .expect("Failed to execute CLI")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

#[test]
fn test_cli_patch_prints_patched_document() {
    // GIVEN a definition file and an Add operation
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "defs.xml", DEFS);
    write(
        tmp.path(),
        "patch.xml",
        r#"<Patch>
            <Operation Class="PatchOperationAdd">
                <xpath>/Defs/ThingDef[defName="Wall"]</xpath>
                <value><label>stone wall</label></value>
            </Operation>
        </Patch>"#,
    );

    // WHEN running `rimpatch patch`
    let output = rimpatch(tmp.path(), &["patch", "--defs", "defs.xml", "--patch", "patch.xml"]);

    // THEN the patched document is written to stdout with a declaration
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let out = stdout(&output);
    assert!(out.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\"?>"));
    assert!(out.contains(
        "<ThingDef><defName>Wall</defName><label>stone wall</label></ThingDef>"
    ));
    assert!(stderr(&output).contains("\"success\":true"));
    assert!(stderr(&output).contains("digest: "));
}

#[test]
fn test_cli_patch_writes_output_file() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "defs.xml", DEFS);
    write(
        tmp.path(),
        "patch.xml",
        r#"<Patch>
            <Operation Class="PatchOperationRemove">
                <xpath>/Defs/ThingDef[defName="Door"]</xpath>
            </Operation>
        </Patch>"#,
    );

    let output = rimpatch(
        tmp.path(),
        &["patch", "--defs", "defs.xml", "--patch", "patch.xml", "--output", "out.xml"],
    );

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).is_empty());
    let written = fs::read_to_string(tmp.path().join("out.xml")).unwrap();
    assert!(written.contains("Wall"));
    assert!(!written.contains("Door"));
}

#[test]
fn test_cli_patch_uses_active_names_for_find_mod() {
    // GIVEN a FindMod operation gated on a unit named "Walls"
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "defs.xml", DEFS);
    write(
        tmp.path(),
        "patch.xml",
        r#"<Patch>
            <Operation Class="PatchOperationFindMod">
                <mods><li>Walls</li></mods>
                <match Class="PatchOperationAttributeSet">
                    <xpath>/Defs/ThingDef[defName="Wall"]</xpath>
                    <attribute>Abstract</attribute>
                    <value>True</value>
                </match>
            </Operation>
        </Patch>"#,
    );
    let args = ["patch", "--defs", "defs.xml", "--patch", "patch.xml"];

    // WHEN the unit is not named THEN nothing changes
    let without = rimpatch(tmp.path(), &args);
    assert!(without.status.success());
    assert!(!stdout(&without).contains("Abstract"));

    // WHEN the unit is named THEN the match branch runs
    let mut named = args.to_vec();
    named.extend(["--name", "Walls"]);
    let with = rimpatch(tmp.path(), &named);
    assert!(with.status.success(), "stderr: {}", stderr(&with));
    assert!(stdout(&with).contains("<ThingDef Abstract=\"True\"><defName>Wall</defName>"));
}

#[test]
fn test_cli_patch_unknown_operation_policy() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "defs.xml", DEFS);
    write(
        tmp.path(),
        "patch.xml",
        r#"<Patch>
            <Operation Class="SomeMod.PatchOperationCustom"><xpath>/Defs</xpath></Operation>
            <Operation Class="PatchOperationRemove"><xpath>/Defs/ThingDef[defName="Door"]</xpath></Operation>
        </Patch>"#,
    );
    let args = ["patch", "--defs", "defs.xml", "--patch", "patch.xml"];

    // Default: the whole file is rejected
    let failed = rimpatch(tmp.path(), &args);
    assert!(!failed.status.success());
    assert!(stderr(&failed).contains("Error:"));
    assert!(stdout(&failed).is_empty());

    // --skip-unknown: the known operation still applies
    let mut skipping = args.to_vec();
    skipping.push("--skip-unknown");
    let skipped = rimpatch(tmp.path(), &skipping);
    assert!(skipped.status.success(), "stderr: {}", stderr(&skipped));
    assert!(!stdout(&skipped).contains("Door"));
}

#[test]
fn test_cli_patch_missing_file_fails() {
    let tmp = TempDir::new().unwrap();
    let output = rimpatch(tmp.path(), &["patch", "--defs", "nope.xml", "--patch", "nope.xml"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("Error:"));
}

#[test]
fn test_cli_assemble_with_report() {
    // GIVEN a manifest over two unit directories
    let tmp = TempDir::new().unwrap();
    write(
        tmp.path(),
        "Core/About/About.xml",
        "<ModMetaData><packageId>Ludeon.RimWorld</packageId><name>Core</name></ModMetaData>",
    );
    write(tmp.path(), "Core/Defs/things.xml", DEFS);
    write(
        tmp.path(),
        "Doors/About/About.xml",
        "<ModMetaData><packageId>someone.doors</packageId><name>Doors</name></ModMetaData>",
    );
    write(
        tmp.path(),
        "Doors/Patches/doors.xml",
        r#"<Patch>
            <Operation Class="PatchOperationAdd">
                <xpath>/Defs/ThingDef[defName="Door"]</xpath>
                <value><label>door</label></value>
            </Operation>
        </Patch>"#,
    );
    write(tmp.path(), "run.toml", "version = \"1.5\"\nunits = [\"Core\", \"Doors\"]\n");

    // WHEN assembling with --report and --output
    let output = rimpatch(
        tmp.path(),
        &["assemble", "--manifest", "run.toml", "--report", "--output", "world.xml", "--pretty"],
    );

    // THEN the report is JSON on stdout and the document is on disk
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let report: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(report["version"], "1.5");
    assert_eq!(report["units"][0]["id"], "Ludeon.RimWorld");
    assert_eq!(report["units"][1]["patch_files"][0]["operations"][0]["success"], true);
    let world = fs::read_to_string(tmp.path().join("world.xml")).unwrap();
    assert!(world.contains("<label>door</label>"));
}

#[test]
fn test_cli_assemble_prints_document_by_default() {
    let tmp = TempDir::new().unwrap();
    write(
        tmp.path(),
        "Core/About/About.xml",
        "<ModMetaData><packageId>Ludeon.RimWorld</packageId></ModMetaData>",
    );
    write(tmp.path(), "Core/Defs/things.xml", DEFS);
    write(tmp.path(), "run.toml", "version = \"1.5\"\nunits = [\"Core\"]\n");

    let output = rimpatch(tmp.path(), &["assemble", "--manifest", "run.toml"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("<defName>Door</defName>"));
}

#[test]
fn test_cli_assemble_invalid_manifest_fails() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "run.toml", "units = []\n");

    let output = rimpatch(tmp.path(), &["assemble", "--manifest", "run.toml"]);

    assert!(!output.status.success());
    assert!(stderr(&output).contains("Error:"));
}

#[test]
fn test_cli_version_nearest() {
    let tmp = TempDir::new().unwrap();

    let exact = rimpatch(tmp.path(), &["version", "nearest", "1.5", "1.4", "1.5", "1.6"]);
    assert!(exact.status.success());
    assert_eq!(stdout(&exact).trim(), "1.5");

    let below = rimpatch(tmp.path(), &["version", "nearest", "1.5.4104", "1.3", "1.4", "1.6"]);
    assert_eq!(stdout(&below).trim(), "1.4");

    let none = rimpatch(tmp.path(), &["version", "nearest", "1.0", "1.4"]);
    assert!(!none.status.success());
    assert!(stderr(&none).contains("no candidate"));
}

#[test]
fn test_cli_version_parse() {
    let tmp = TempDir::new().unwrap();

    let output = rimpatch(tmp.path(), &["version", "parse", "v1.5.4104 rev435"]);
    assert!(output.status.success());
    let out = stdout(&output);
    assert!(out.contains("numbers: 1 5 4104"));
    assert!(out.contains("tags: rev435"));

    let bad = rimpatch(tmp.path(), &["version", "parse", "latest"]);
    assert!(!bad.status.success());
}
