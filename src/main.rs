//! Microgrid simulator entry point: CLI wiring and config-driven runs.

use std::path::Path;
use std::process;

use microgrid_sim::config::ScenarioConfig;
use microgrid_sim::devices::Season;
use microgrid_sim::io::export::export_run;
use microgrid_sim::runner::{compare_strategies, run_scenario};
use microgrid_sim::sim::dispatch::DispatchStrategy;
use microgrid_sim::telemetry::init_tracing;

/// Parsed CLI arguments.
struct CliArgs {
    scenario_path: Option<String>,
    preset: Option<String>,
    seed_override: Option<u64>,
    strategy_override: Option<String>,
    days_override: Option<u64>,
    season_override: Option<Season>,
    out_dir: Option<String>,
    compare: bool,
    print_steps: bool,
}

fn print_help() {
    eprintln!("microgrid-sim: stochastic solar + battery microgrid simulator");
    eprintln!();
    eprintln!("Usage: microgrid-sim [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --scenario <path>        Load scenario from TOML config file");
    eprintln!(
        "  --preset <name>          Use a built-in preset ({})",
        ScenarioConfig::PRESETS.join(", ")
    );
    eprintln!("  --seed <u64>             Override random seed");
    eprintln!(
        "  --strategy <name>        Override dispatch strategy ({})",
        DispatchStrategy::valid_names()
    );
    eprintln!("  --days <n>               Override simulated days");
    eprintln!("  --season <name>          Override weather season (spring, summer, fall, winter)");
    eprintln!("  --out-dir <dir>          Write timesteps.csv, events.csv, summary.json");
    eprintln!("  --compare                Run every strategy on the same seed");
    eprintln!("  --print-steps            Print every timestep record");
    eprintln!("  --help                   Show this help message");
    eprintln!();
    eprintln!("If no --scenario or --preset is given, the baseline preset is used.");
    eprintln!("Log verbosity follows RUST_LOG (default: info).");
}

/// Returns the value following flag `args[*i]`, exiting if it is missing.
fn flag_value(args: &[String], i: &mut usize, what: &str) -> String {
    let flag = &args[*i];
    *i += 1;
    match args.get(*i) {
        Some(v) => v.clone(),
        None => {
            eprintln!("error: {flag} requires {what}");
            process::exit(1);
        }
    }
}

fn parse_number(flag: &str, value: &str) -> u64 {
    if let Ok(n) = value.parse::<u64>() {
        n
    } else {
        eprintln!("error: {flag} value \"{value}\" is not a valid u64");
        process::exit(1);
    }
}

fn parse_args() -> CliArgs {
    let args: Vec<String> = std::env::args().collect();
    let mut cli = CliArgs {
        scenario_path: None,
        preset: None,
        seed_override: None,
        strategy_override: None,
        days_override: None,
        season_override: None,
        out_dir: None,
        compare: false,
        print_steps: false,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_help();
                process::exit(0);
            }
            "--scenario" => cli.scenario_path = Some(flag_value(&args, &mut i, "a path argument")),
            "--preset" => cli.preset = Some(flag_value(&args, &mut i, "a name argument")),
            "--seed" => {
                let v = flag_value(&args, &mut i, "a u64 argument");
                cli.seed_override = Some(parse_number("--seed", &v));
            }
            "--strategy" => {
                cli.strategy_override = Some(flag_value(&args, &mut i, "a strategy name"));
            }
            "--days" => {
                let v = flag_value(&args, &mut i, "a day count");
                cli.days_override = Some(parse_number("--days", &v));
            }
            "--season" => {
                let v = flag_value(&args, &mut i, "a season name");
                match v.parse::<Season>() {
                    Ok(season) => cli.season_override = Some(season),
                    Err(e) => {
                        eprintln!("error: {e}");
                        process::exit(1);
                    }
                }
            }
            "--out-dir" => cli.out_dir = Some(flag_value(&args, &mut i, "a directory argument")),
            "--compare" => cli.compare = true,
            "--print-steps" => cli.print_steps = true,
            other => {
                eprintln!("error: unknown argument \"{other}\"");
                print_help();
                process::exit(1);
            }
        }
        i += 1;
    }

    cli
}

fn main() {
    init_tracing();
    let cli = parse_args();

    // Load config: --scenario takes priority, then --preset, then baseline default
    let loaded = if let Some(ref path) = cli.scenario_path {
        ScenarioConfig::from_toml_file(Path::new(path))
    } else if let Some(ref name) = cli.preset {
        ScenarioConfig::from_preset(name)
    } else {
        Ok(ScenarioConfig::baseline())
    };
    let mut scenario = match loaded {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    };

    // Apply overrides
    if let Some(seed) = cli.seed_override {
        scenario.simulation.seed = seed;
    }
    if let Some(strategy) = cli.strategy_override {
        scenario.simulation.strategy = strategy;
    }
    if let Some(days) = cli.days_override {
        scenario.simulation.days = days;
    }
    if let Some(season) = cli.season_override {
        scenario.simulation.season = season;
    }

    // Validate
    let errors = scenario.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("error: {e}");
        }
        process::exit(1);
    }

    if cli.compare {
        match compare_strategies(&scenario) {
            Ok(rows) => {
                for (strategy, summary) in rows {
                    println!("{:<17} {}", strategy.as_str(), summary.headline());
                }
            }
            Err(e) => {
                eprintln!("error: {e}");
                process::exit(1);
            }
        }
        return;
    }

    let output = match run_scenario(&scenario) {
        Ok(output) => output,
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    };

    // Print per-step results, the event log, and the summary
    if cli.print_steps {
        for r in &output.timesteps {
            println!("{r}");
        }
    }
    for event in &output.events {
        println!("{event}");
    }
    println!("\n{}", output.summary);

    if let Some(ref dir) = cli.out_dir {
        if let Err(e) = export_run(Path::new(dir), &output) {
            eprintln!("error: failed to write results: {e}");
            process::exit(1);
        }
        eprintln!("Results written to {dir}");
    }
}
