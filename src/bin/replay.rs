// Standalone replay tool for re-deciding turns from a state dump
//
// Usage:
//   cargo run --bin replay -- <dump_file> [options]
//
// Options:
//   --all                  Replay all rounds
//   --turns <r1,r2>        Replay specific rounds (comma-separated)
//   --verbose              Show detailed output for each round
//   --config <path>        Path to Speed.toml (default: Speed.toml)
//   --budget-ms <ms>       Rollout time per round (default from config)

use std::env;
use std::process;
use std::time::Duration;

use speed_montecarlo::config::Config;
use speed_montecarlo::replay::ReplayEngine;

enum Mode {
    All,
    Rounds(Vec<u32>),
}

fn print_usage() {
    eprintln!("spe_ed Replay Tool");
    eprintln!();
    eprintln!("USAGE:");
    eprintln!("  replay <dump_file> [OPTIONS]");
    eprintln!();
    eprintln!("OPTIONS:");
    eprintln!("  --all                   Replay all rounds in the dump");
    eprintln!("  --turns <R1,R2,...>     Replay specific rounds (comma-separated)");
    eprintln!("  --verbose               Show detailed output for each round");
    eprintln!("  --config <path>         Path to Speed.toml (default: Speed.toml)");
    eprintln!("  --budget-ms <ms>        Rollout time per round");
    eprintln!("  --help                  Show this help message");
    eprintln!();
    eprintln!("EXAMPLES:");
    eprintln!("  replay game.jsonl --all");
    eprintln!("  replay game.jsonl --turns 5,10,15 --verbose");
}

fn parse_rounds(s: &str) -> Result<Vec<u32>, String> {
    s.split(',')
        .map(|t| {
            t.trim()
                .parse::<u32>()
                .map_err(|e| format!("Invalid round number '{}': {}", t, e))
        })
        .collect()
}

/// Value following the option at `i`, or exit with an error
fn option_value(args: &[String], i: usize) -> String {
    match args.get(i + 1) {
        Some(v) => v.clone(),
        None => {
            eprintln!("Error: {} requires an argument", args[i]);
            process::exit(1);
        }
    }
}

fn main() {
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 || args.contains(&"--help".to_string()) {
        print_usage();
        process::exit(if args.contains(&"--help".to_string()) { 0 } else { 1 });
    }

    let dump_file = &args[1];
    let mut config_path = "Speed.toml".to_string();
    let mut verbose = false;
    let mut budget_ms: Option<u64> = None;
    let mut mode = None;

    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "--all" => {
                mode = Some(Mode::All);
            }
            "--turns" => {
                let value = option_value(&args, i);
                match parse_rounds(&value) {
                    Ok(rounds) => mode = Some(Mode::Rounds(rounds)),
                    Err(e) => {
                        eprintln!("Error parsing rounds: {}", e);
                        process::exit(1);
                    }
                }
                i += 1;
            }
            "--config" => {
                config_path = option_value(&args, i);
                i += 1;
            }
            "--budget-ms" => {
                let value = option_value(&args, i);
                match value.parse::<u64>() {
                    Ok(ms) => budget_ms = Some(ms),
                    Err(e) => {
                        eprintln!("Error: invalid --budget-ms '{}': {}", value, e);
                        process::exit(1);
                    }
                }
                i += 1;
            }
            "--verbose" => {
                verbose = true;
            }
            _ => {
                eprintln!("Error: Unknown option '{}'", args[i]);
                print_usage();
                process::exit(1);
            }
        }
        i += 1;
    }

    let Some(mode) = mode else {
        eprintln!("Error: Must specify --all or --turns");
        print_usage();
        process::exit(1);
    };

    let config = Config::from_file(&config_path).unwrap_or_else(|e| {
        eprintln!("Warning: Could not load config from '{}': {}", config_path, e);
        eprintln!("Using default configuration");
        Config::default_hardcoded()
    });
    let budget = Duration::from_millis(budget_ms.unwrap_or(config.timing.replay_budget_ms));

    println!("Loaded configuration from: {}", config_path);
    println!("Replay dump file: {}", dump_file);
    println!("Budget per round: {}ms", budget.as_millis());
    println!();

    let engine = ReplayEngine::new(config, budget, verbose);

    let entries = match engine.load_dump_file(dump_file) {
        Ok(entries) => entries,
        Err(e) => {
            eprintln!("Error loading dump file: {}", e);
            process::exit(1);
        }
    };

    if entries.is_empty() {
        eprintln!("Error: Dump file is empty");
        process::exit(1);
    }

    let results = match mode {
        Mode::All => {
            println!("Replaying all {} rounds...\n", entries.len());
            engine.replay_all(&entries)
        }
        Mode::Rounds(rounds) => {
            println!("Replaying {} specific round(s)...\n", rounds.len());
            match engine.replay_rounds(&entries, &rounds) {
                Ok(results) => results,
                Err(e) => {
                    eprintln!("Error during replay: {}", e);
                    process::exit(1);
                }
            }
        }
    };

    let stats = engine.generate_stats(&results);
    engine.print_report(&results, &stats);
}
