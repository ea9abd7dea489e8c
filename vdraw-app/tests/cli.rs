use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use vdraw_io::{JsonSceneFacade, SceneLoader};

fn vdraw() -> Command {
    let mut cmd = Command::cargo_bin("vdraw").expect("binary is built");
    cmd.env_remove("VDRAW_CONFIG");
    cmd
}

#[test]
fn demo_run_prints_scene_summary() {
    let dir = tempfile::tempdir().unwrap();
    vdraw()
        .current_dir(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("已构建内置演示场景"))
        .stdout(predicate::str::contains("图形（共 4 个）"))
        .stdout(predicate::str::contains("Layer 2 *"))
        .stdout(predicate::str::contains("Circle"));
}

#[test]
fn export_writes_a_loadable_scene() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("scene.json");
    vdraw()
        .current_dir(dir.path())
        .arg("--export")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("已导出到"));

    let report = JsonSceneFacade::new().load(&out).expect("exported file loads");
    assert_eq!(report.shapes.len(), 4);
    assert!(report.skipped.is_empty());
}

#[test]
fn import_reports_loaded_and_skipped_records() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("input.json");
    fs::write(
        &input,
        r#"[
            {"kind": "Circle", "name": "Dot", "centerX": 10, "centerY": 10, "radius": 4, "layerName": "Ink"},
            {"kind": "Line", "pointsX": "broken"},
            {"kind": "Line", "pointsX": [0, 10], "pointsY": [0, 10]}
        ]"#,
    )
    .unwrap();

    vdraw()
        .current_dir(dir.path())
        .arg("--import")
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("导入 2 个图形"))
        .stdout(predicate::str::contains("跳过记录 #1"))
        .stdout(predicate::str::contains("Ink"));
}

#[test]
fn missing_import_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    vdraw()
        .current_dir(dir.path())
        .arg("--import")
        .arg(dir.path().join("absent.json"))
        .assert()
        .failure();
}

#[test]
fn unreadable_config_falls_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    vdraw()
        .current_dir(dir.path())
        .arg("--config")
        .arg(dir.path().join("missing.toml"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Layer 1"))
        .stderr(predicate::str::contains("加载配置失败，使用内建默认值"))
        .stderr(predicate::str::contains("missing.toml"));
}

#[test]
fn malformed_discovered_config_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let config_dir = dir.path().join("config");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(config_dir.join("default.toml"), "[history]\nmax_depth = \"lots\"\n").unwrap();

    vdraw()
        .current_dir(dir.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("加载配置失败"));
}
