use std::fs;
use std::process::{Command, Output};

fn run_cli(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_microgrid-sim"))
        .args(args)
        .env("RUST_LOG", "warn")
        .output()
        .expect("microgrid-sim process should run")
}

fn stdout_of(output: &Output) -> String {
    String::from_utf8(output.stdout.clone()).expect("stdout should be valid UTF-8")
}

fn parse_metric(stdout: &str, label: &str, unit: &str) -> f64 {
    let line = stdout
        .lines()
        .find(|line| line.trim_start().starts_with(label))
        .unwrap_or_else(|| panic!("missing summary line `{label}` in output: {stdout}"));

    let raw = line
        .split_once(':')
        .map(|(_, right)| right.trim())
        .unwrap_or_else(|| panic!("invalid summary format for line `{line}`"));

    let numeric = raw.strip_suffix(unit).unwrap_or(raw).trim();
    numeric
        .parse::<f64>()
        .unwrap_or_else(|_| panic!("failed parsing `{numeric}` from summary line `{line}`"))
}

#[test]
fn scenario_files_run_via_cli() {
    for path in [
        "scenarios/baseline.toml",
        "scenarios/winter_outages.toml",
        "scenarios/export_capped.toml",
        "scenarios/bounded_import.toml",
    ] {
        let output = run_cli(&["--scenario", path, "--days", "3"]);
        assert!(
            output.status.success(),
            "scenario run failed for {path}: stderr={}",
            String::from_utf8_lossy(&output.stderr)
        );
        let stdout = stdout_of(&output);
        assert!(stdout.contains("--- Run Summary ---"), "{path}");
        assert!(stdout.contains("SIMULATION_START"), "{path}");
        assert!(stdout.contains("SIMULATION_END"), "{path}");
        assert_eq!(parse_metric(&stdout, "Steps:", ""), 144.0, "{path}");
    }
}

#[test]
fn presets_produce_distinct_dynamics() {
    let baseline = stdout_of(&run_cli(&["--preset", "baseline", "--days", "14", "--seed", "7"]));
    let winter = stdout_of(&run_cli(&["--preset", "winter_outages", "--days", "14", "--seed", "7"]));
    let capped = stdout_of(&run_cli(&["--preset", "export_capped", "--days", "14", "--seed", "7"]));

    let baseline_gen = parse_metric(&baseline, "Solar generation:", "kWh");
    let winter_gen = parse_metric(&winter, "Solar generation:", "kWh");
    assert!(
        (baseline_gen - winter_gen).abs() > 1e-6,
        "expected baseline and winter generation to differ: baseline={baseline_gen:.3}, winter={winter_gen:.3}"
    );

    // two 7-day months with a 10 kWh allowance each
    let capped_export = parse_metric(&capped, "Grid export:", "kWh");
    assert!(capped_export <= 20.0 + 0.01, "export over quota: {capped_export:.3}");
}

#[test]
fn compare_prints_one_line_per_strategy() {
    let output = run_cli(&["--compare", "--days", "2"]);
    assert!(output.status.success());
    let stdout = stdout_of(&output);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 3, "unexpected output: {stdout}");
    for (line, name) in lines.iter().zip(["load_priority", "charge_priority", "produce_priority"]) {
        assert!(line.starts_with(name), "{line}");
        assert!(line.contains("steps=96"), "{line}");
    }
}

#[test]
fn unknown_strategy_exits_with_error() {
    let output = run_cli(&["--strategy", "greedy", "--days", "1"]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("simulation.strategy"), "{stderr}");
    assert!(stderr.contains("produce_priority"), "{stderr}");
    assert!(output.stdout.is_empty());
}

#[test]
fn season_flag_overrides_scenario_season() {
    let output = run_cli(&["--preset", "baseline", "--days", "2", "--season", "Winter"]);
    assert!(output.status.success());
    let stdout = stdout_of(&output);
    let daily: Vec<&str> = stdout.lines().filter(|l| l.contains("DAILY_UPDATE")).collect();
    assert_eq!(daily.len(), 2);
    assert!(daily.iter().all(|l| l.contains("(winter)")), "{stdout}");

    let output = run_cli(&["--season", "monsoon"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("unknown season"));
}

#[test]
fn unknown_preset_and_flag_exit_with_error() {
    let output = run_cli(&["--preset", "nope"]);
    assert_eq!(output.status.code(), Some(1));
    let output = run_cli(&["--bogus"]);
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn out_dir_receives_result_files() {
    let dir = std::env::temp_dir().join(format!("microgrid-sim-cli-{}", std::process::id()));
    let dir_arg = dir.to_string_lossy().to_string();
    let output = run_cli(&["--days", "1", "--seed", "3", "--out-dir", &dir_arg]);
    assert!(
        output.status.success(),
        "stderr={}",
        String::from_utf8_lossy(&output.stderr)
    );

    let timesteps = fs::read_to_string(dir.join("timesteps.csv")).expect("timesteps.csv");
    assert_eq!(timesteps.lines().count(), 49);
    assert!(timesteps.starts_with("time_min,hour,solar_kw,load_kw,"));

    let events = fs::read_to_string(dir.join("events.csv")).expect("events.csv");
    assert!(events.starts_with("time_min,hour,event_type,description"));

    let summary = fs::read_to_string(dir.join("summary.json")).expect("summary.json");
    let value: serde_json::Value = serde_json::from_str(&summary).expect("valid json");
    assert_eq!(value["steps"], 48);

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn print_steps_lists_every_record() {
    let output = run_cli(&["--days", "1", "--print-steps"]);
    assert!(output.status.success());
    let stdout = stdout_of(&output);
    let steps = stdout.lines().filter(|l| l.starts_with("t=")).count();
    assert_eq!(steps, 48);
}
