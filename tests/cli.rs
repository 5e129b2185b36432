use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

const TWO_DAY: &str = "Day 1\nBench Press - 3 sets x 8-10 reps - Rest 90 seconds\nDay 2\nSquat - 4 sets x 5 reps - Rest 120 seconds";

fn wki_binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("wki");
    path
}

fn setup_test_env() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    let config_dir = root.join("config");
    fs::create_dir_all(&config_dir).unwrap();

    let programs = root.join("programs");
    fs::create_dir_all(&programs).unwrap();
    fs::write(programs.join("two_day.txt"), TWO_DAY).unwrap();
    fs::write(
        programs.join("notes.txt"),
        "Felt good today. Squats and bench press went well, deadlifts next time.",
    )
    .unwrap();
    fs::write(programs.join("scan0001.pdf"), b"").unwrap();
    fs::write(programs.join("ignored.csv"), "Squat,5,5").unwrap();

    let config_content = format!(
        r#"[db]
path = "{}/data/wki.sqlite"

[pipeline]
default_rest_seconds = 90

[import]
include_globs = ["**/*.txt", "**/*.pdf"]
max_concurrency = 2
"#,
        root.display()
    );

    let config_path = config_dir.join("wki.toml");
    fs::write(&config_path, config_content).unwrap();

    (tmp, config_path)
}

fn run_wki(config_path: &Path, args: &[&str]) -> (String, String, bool) {
    let binary = wki_binary();
    let output = Command::new(&binary)
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("Failed to run wki binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

fn programs_dir(config_path: &Path) -> String {
    config_path
        .parent()
        .and_then(Path::parent)
        .unwrap()
        .join("programs")
        .display()
        .to_string()
}

#[test]
fn test_init_creates_database() {
    let (tmp, config_path) = setup_test_env();

    let (stdout, stderr, success) = run_wki(&config_path, &["init"]);
    assert!(success, "init failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("initialized"));
    assert!(tmp.path().join("data/wki.sqlite").exists());
}

#[test]
fn test_init_idempotent() {
    let (_tmp, config_path) = setup_test_env();

    let (_, _, success1) = run_wki(&config_path, &["init"]);
    assert!(success1, "First init failed");

    let (_, _, success2) = run_wki(&config_path, &["init"]);
    assert!(success2, "Second init failed (not idempotent)");
}

#[test]
fn test_parse_prints_result_json() {
    let (_tmp, config_path) = setup_test_env();
    let file = format!("{}/two_day.txt", programs_dir(&config_path));

    let (stdout, stderr, success) = run_wki(&config_path, &["parse", &file]);
    assert!(success, "parse failed: {}", stderr);
    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(json["method"], "pattern");
    assert_eq!(json["extractedDays"], 2);
    assert!(json.get("debug").is_none());

    let (stdout, _, success) = run_wki(&config_path, &["parse", &file, "--debug"]);
    assert!(success);
    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(json["debug"]["textSource"], "raw_bytes");
    assert!(json["debug"]["rawText"].as_str().unwrap().contains("Bench Press"));
}

#[test]
fn test_parse_without_config_file() {
    let (tmp, _config_path) = setup_test_env();
    let missing = tmp.path().join("config/absent.toml");
    let file = tmp.path().join("programs/scan0001.pdf");

    let (stdout, stderr, success) = run_wki(&missing, &["parse", file.to_str().unwrap()]);
    assert!(success, "parse should run with defaults: {}", stderr);
    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(json["method"], "manual");
    assert_eq!(json["confidence"], 0.0);
}

#[test]
fn test_parse_missing_file_fails() {
    let (_tmp, config_path) = setup_test_env();
    let (_, stderr, success) = run_wki(&config_path, &["parse", "/nonexistent/plan.pdf"]);
    assert!(!success);
    assert!(stderr.contains("Failed to read"), "got: {}", stderr);
}

#[test]
fn test_import_list_and_get() {
    let (_tmp, config_path) = setup_test_env();
    let programs = programs_dir(&config_path);

    run_wki(&config_path, &["init"]);
    let (stdout, stderr, success) =
        run_wki(&config_path, &["import", &programs, "--progress", "none"]);
    assert!(success, "import failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("files: 3"));
    assert!(stdout.contains("stored: 3"));
    assert!(stdout.contains("pattern: 1"));
    assert!(stdout.contains("fallback: 1"));
    assert!(stdout.contains("manual: 1"));
    assert!(stdout.contains("ok"));

    let (list_out, _, success) = run_wki(&config_path, &["list"]);
    assert!(success);
    let line = list_out
        .lines()
        .find(|l| l.contains("(two_day.txt)"))
        .expect("two_day.txt listed");
    assert!(line.contains("2d/2e"));
    let id = line.split_whitespace().next().unwrap().to_string();

    let (stdout, _, success) = run_wki(&config_path, &["get", &id]);
    assert!(success, "get should succeed");
    assert!(stdout.contains(&id));
    assert!(stdout.contains("--- Day 2 ---"));
    assert!(stdout.contains("Squat  4 x 5  rest 120s"));

    let (stdout, _, success) = run_wki(&config_path, &["get", &id, "--json"]);
    assert!(success);
    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(json["template"]["sourceName"], "two_day.txt");
}

#[test]
fn test_import_skips_already_imported_content() {
    let (_tmp, config_path) = setup_test_env();
    let programs = programs_dir(&config_path);

    run_wki(&config_path, &["init"]);
    run_wki(&config_path, &["import", &programs, "--progress", "none"]);

    let (stdout, _, success) = run_wki(&config_path, &["import", &programs, "--progress", "none"]);
    assert!(success);
    assert!(stdout.contains("stored: 0"));
    assert!(stdout.contains("already imported: 3"));

    let (stdout, _, success) = run_wki(
        &config_path,
        &["import", &programs, "--full", "--progress", "none"],
    );
    assert!(success);
    assert!(stdout.contains("stored: 3"));
}

#[test]
fn test_import_dry_run_stores_nothing() {
    let (_tmp, config_path) = setup_test_env();
    let programs = programs_dir(&config_path);

    run_wki(&config_path, &["init"]);
    let (stdout, _, success) = run_wki(
        &config_path,
        &["import", &programs, "--dry-run", "--progress", "none"],
    );
    assert!(success);
    assert!(stdout.contains("(dry-run)"));
    assert!(stdout.contains("processed: 3"));
    assert!(stdout.contains("stored: 0"));

    let (list_out, _, _) = run_wki(&config_path, &["list"]);
    assert!(list_out.contains("No templates stored."));
}

#[test]
fn test_import_json_progress() {
    let (_tmp, config_path) = setup_test_env();
    let programs = programs_dir(&config_path);

    run_wki(&config_path, &["init"]);
    let (_, stderr, success) = run_wki(&config_path, &["import", &programs, "--progress", "json"]);
    assert!(success);
    let events: Vec<serde_json::Value> = stderr
        .lines()
        .filter_map(|l| serde_json::from_str(l).ok())
        .collect();
    assert!(events.iter().any(|e| e["phase"] == "discovering"));
    assert_eq!(
        events.iter().filter(|e| e["phase"] == "processing").count(),
        3
    );
}

#[test]
fn test_unknown_progress_mode() {
    let (_tmp, config_path) = setup_test_env();
    let programs = programs_dir(&config_path);

    let (_, stderr, success) = run_wki(&config_path, &["import", &programs, "--progress", "loud"]);
    assert!(!success);
    assert!(stderr.contains("Unknown progress mode"));
}

#[test]
fn test_get_missing_template() {
    let (_tmp, config_path) = setup_test_env();

    run_wki(&config_path, &["init"]);
    let (_, stderr, success) = run_wki(&config_path, &["get", "nonexistent-id"]);
    assert!(!success, "get with missing ID should fail");
    assert!(
        stderr.contains("not found"),
        "Should report not found, got: {}",
        stderr
    );
}
