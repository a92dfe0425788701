//! Integration tests for the prodtrack CLI.

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

struct Env {
    dir: TempDir,
}

impl Env {
    fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    fn data_file(&self) -> PathBuf {
        self.dir.path().join("tasks.csv")
    }

    fn config_file(&self) -> PathBuf {
        self.dir.path().join("config.toml")
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("prodtrack").unwrap();
        cmd.env_remove("PRODTRACK_CONFIG")
            .env_remove("PRODTRACK_DATA_FILE")
            .env_remove("RUST_LOG")
            .args([
                "--data-file",
                self.data_file().to_str().unwrap(),
                "--config",
                self.config_file().to_str().unwrap(),
                "--no-color",
            ]);
        cmd
    }

    fn write(&self, name: &str, content: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    fn import(&self, path: &Path) {
        self.cmd()
            .args(["import", path.to_str().unwrap()])
            .assert()
            .success();
    }
}

const HISTORY: &str = "\
date,task,start_time,time_taken,category,priority,completed,tags,notes
2025-03-03,Write API docs,09:00,60,Coding,High,False,\"docs,api\",endpoint reference
2025-03-03,Review pull requests,11:00,45,Coding,Medium,True,review,team code review
2025-03-04,Write API tests,09:00,90,Coding,High,False,\"tests,api\",integration tests for endpoints
2025-03-04,Plan sprint,14:00,30,Project,Low,False,planning,sprint backlog
2025-03-05,Write API client,10:00,120,Development,High,False,api,client library for endpoints
2025-03-05,Read paper,15:00,50,Academics,Medium,False,reading,distributed systems paper
2025-03-06,Fix login bug,09:30,40,Coding,High,False,bug,session token expiry
2025-03-06,Lunch walk,12:00,30,Break,Low,False,,outside
";

// ===== Logging tasks =====

#[test]
fn add_then_list() {
    let env = Env::new();

    env.cmd()
        .args([
            "add",
            "Write Report",
            "--date",
            "2025-03-10",
            "--start",
            "09:00",
            "--minutes",
            "45",
            "--category",
            "Coding",
            "--tag",
            "work,writing",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Logged task #1: write report"))
        .stdout(predicate::str::contains("09:00-09:45"));

    env.cmd()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("write report"))
        .stdout(predicate::str::contains("Coding"));

    let saved = std::fs::read_to_string(env.data_file()).unwrap();
    assert!(saved.starts_with("date,task,start_time,end_time,time_taken,category"));
    assert!(saved.contains("\"work,writing\""));
}

#[test]
fn overlapping_task_is_rejected() {
    let env = Env::new();
    let add = |start: &str, minutes: &str| {
        let mut cmd = env.cmd();
        cmd.args([
            "add", "standup", "--date", "2025-03-10", "--start", start, "--minutes", minutes,
        ]);
        cmd
    };

    add("09:00", "60").assert().success();

    add("09:30", "30")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("overlaps"))
        .stderr(predicate::str::contains("standup 09:00-10:00"));

    // Starting exactly when the previous task ends is fine.
    add("10:00", "15")
        .assert()
        .success()
        .stdout(predicate::str::contains("Logged task #2"));
}

#[test]
fn invalid_levels_are_rejected() {
    let env = Env::new();
    env.cmd()
        .args([
            "add", "x", "--start", "09:00", "--minutes", "10", "--difficulty", "9",
        ])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("difficulty"));
}

#[test]
fn overflowing_duration_is_rejected() {
    let env = Env::new();
    env.cmd()
        .args(["add", "forever", "--start", "09:00", "--minutes", "1e13"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("too large"));
}

#[test]
fn damaged_rows_do_not_hide_the_rest() {
    let env = Env::new();
    let mut bytes = b"date,task,start_time,time_taken,notes\n2025-03-10,read paper,09:00,30,ok\n2025-03-10,forever,10:00,1e13,\n2025-03-10,write notes,11:00,20,".to_vec();
    bytes.extend_from_slice(&[0xFF, 0xFE]);
    bytes.push(b'\n');
    std::fs::write(env.data_file(), bytes).unwrap();

    env.cmd()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("read paper"))
        .stdout(predicate::str::contains("write notes"))
        .stdout(predicate::str::contains("forever").not());
}

#[test]
fn done_is_idempotent() {
    let env = Env::new();
    env.cmd()
        .args(["add", "task a", "--start", "08:00", "--minutes", "20"])
        .assert()
        .success();

    for _ in 0..2 {
        env.cmd()
            .args(["done", "1"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Completed task #1: task a"));
    }

    env.cmd()
        .args(["list", "--status", "completed"])
        .assert()
        .success()
        .stdout(predicate::str::contains("task a"));
    env.cmd()
        .args(["list", "--status", "pending"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No tasks found"));
}

#[test]
fn delete_with_force() {
    let env = Env::new();
    env.cmd()
        .args(["add", "temp", "--start", "08:00", "--minutes", "20"])
        .assert()
        .success();

    env.cmd()
        .args(["delete", "1", "--force"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted task #1: temp"));

    env.cmd()
        .args(["delete", "1", "--force"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Task #1 does not exist"));
}

// ===== Import / export =====

#[test]
fn import_merges_and_dedupes() {
    let env = Env::new();
    let path = env.write("history.csv", HISTORY);

    env.cmd()
        .args(["import", path.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported 8 tasks."));

    env.cmd()
        .args(["import", path.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("No new tasks to import."));

    env.cmd()
        .arg("export")
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "date,task,start_time,end_time,time_taken,category,priority,mood,energy_level,focus_level,intent,difficulty,tags,notes,task_type,completed",
        ))
        .stdout(predicate::str::contains(
            "2025-03-03,write api docs,2025-03-03 09:00:00,2025-03-03 10:00:00,60,Coding,High",
        ))
        .stdout(predicate::str::contains("imported,False"));
}

#[test]
fn import_missing_file() {
    let env = Env::new();
    env.cmd()
        .args(["import", "/nonexistent/history.csv"])
        .assert()
        .failure()
        .code(1);
}

#[test]
fn export_to_file_round_trips() {
    let env = Env::new();
    env.import(&env.write("history.csv", HISTORY));

    let out = env.dir.path().join("out.csv");
    env.cmd()
        .args(["export", "--output", out.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported 8 tasks"));

    let exported = std::fs::read_to_string(&out).unwrap();
    let stored = std::fs::read_to_string(env.data_file()).unwrap();
    assert_eq!(exported, stored);
}

// ===== Reports =====

#[test]
fn stats_json() {
    let env = Env::new();
    env.import(&env.write("history.csv", HISTORY));

    let output = env.cmd().args(["--json", "stats"]).output().unwrap();
    assert!(output.status.success());
    let v: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!((v["productivity"]["completion_rate"].as_f64().unwrap() - 12.5).abs() < 1e-9);
    assert_eq!(v["category_count"], 5);
}

#[test]
fn insights_need_more_data() {
    let env = Env::new();
    env.import(&env.write("history.csv", HISTORY));

    env.cmd()
        .arg("insights")
        .assert()
        .success()
        .stdout(predicate::str::contains("Need more data"));
}

#[test]
fn recommend_similar_tasks() {
    let env = Env::new();
    env.import(&env.write("history.csv", HISTORY));

    let output = env
        .cmd()
        .args(["--json", "recommend", "1", "--top", "3"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let v: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let items = v.as_array().unwrap();
    assert!(!items.is_empty() && items.len() <= 3);
    assert!(items.iter().all(|i| i["id"] != 1));
    let similarity = items[0]["similarity"].as_f64().unwrap();
    assert!((0.0..=1.0).contains(&similarity));
}

#[test]
fn recommend_top_is_bounded() {
    let env = Env::new();
    env.cmd()
        .args(["recommend", "1", "--top", "12"])
        .assert()
        .failure()
        .code(2);
}

#[test]
fn predict_without_history_uses_defaults() {
    let env = Env::new();
    env.cmd()
        .args(["predict", "--difficulty", "4"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Completion probability: 50.0%"))
        .stdout(predicate::str::contains("30 min"))
        .stdout(predicate::str::contains("Not enough data"));
}

// ===== Forecasts =====

#[test]
fn forecast_metric_json_has_horizon_points() {
    let env = Env::new();
    env.import(&env.write("history.csv", HISTORY));

    let output = env
        .cmd()
        .args([
            "--json", "forecast", "--metric", "score", "--horizon", "5", "--seed", "1",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());
    let v: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let points = v["points"].as_array().unwrap();
    assert_eq!(points.len(), 5);
    assert_eq!(points[0]["date"], "2025-03-07");
    for p in points {
        let value = p["value"].as_f64().unwrap();
        assert!((0.0..=100.0).contains(&value));
        assert!(p["lower"].as_f64().unwrap() <= value);
    }
}

#[test]
fn seeded_forecast_is_reproducible() {
    let env = Env::new();
    env.import(&env.write("history.csv", HISTORY));

    let run = || {
        env.cmd()
            .args(["--json", "forecast", "--seed", "42"])
            .output()
            .unwrap()
            .stdout
    };
    let first: serde_json::Value = serde_json::from_slice(&run()).unwrap();
    let second: serde_json::Value = serde_json::from_slice(&run()).unwrap();
    assert_eq!(first["forecasts"], second["forecasts"]);
    assert_eq!(first["summary"]["horizon"], 7);
    assert!(!first["summary"]["insights"].as_array().unwrap().is_empty());
}

#[test]
fn forecast_without_history() {
    let env = Env::new();
    env.cmd()
        .args(["forecast", "--metric", "score"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Not enough task history"));
}

#[test]
fn forecast_horizon_is_bounded() {
    let env = Env::new();
    env.cmd()
        .args(["forecast", "--horizon", "2"])
        .assert()
        .failure()
        .code(2);
}

#[test]
fn forecast_unknown_metric() {
    let env = Env::new();
    env.cmd()
        .args(["forecast", "--metric", "mood"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Invalid metric"));
}

// ===== Config =====

#[test]
fn init_writes_config_once() {
    let env = Env::new();

    env.cmd()
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created configuration file"));
    let content = std::fs::read_to_string(env.config_file()).unwrap();
    assert!(content.contains("[forecast]"));

    env.cmd()
        .arg("init")
        .assert()
        .failure()
        .code(4)
        .stderr(predicate::str::contains("--force"));

    env.cmd().args(["init", "--force"]).assert().success();
}

#[test]
fn bad_config_weights() {
    let env = Env::new();
    env.write(
        "config.toml",
        "[scoring.weights]\ntime = 0.8\ncompletion = 0.8\n",
    );
    env.cmd().arg("stats").assert().failure().code(4);
}

#[test]
fn bad_config_alpha() {
    let env = Env::new();
    env.write("config.toml", "[forecast]\ntask_alpha = -0.2\n");
    env.cmd()
        .arg("forecast")
        .assert()
        .failure()
        .code(4)
        .stderr(predicate::str::contains("task_alpha"));
}

#[test]
fn data_file_from_env() {
    let env = Env::new();
    let file = env.dir.path().join("from-env.csv");
    let mut cmd = Command::cargo_bin("prodtrack").unwrap();
    cmd.env("PRODTRACK_DATA_FILE", &file)
        .env("PRODTRACK_CONFIG", env.config_file())
        .args(["--no-color", "add", "env task", "--start", "07:00", "--minutes", "15"])
        .assert()
        .success();
    assert!(file.exists());
}
