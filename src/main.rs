use clap::Parser;
use log::{error, info};
use std::env;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::{Duration, Instant};

use speed_montecarlo::bot::Bot;
use speed_montecarlo::config::{parse_duration, Config};
use speed_montecarlo::error::EngineError;
use speed_montecarlo::profiler;
use speed_montecarlo::render::result_line;
use speed_montecarlo::session::{GameOutcome, Session, WebSocketTransport};
use speed_montecarlo::sink::{DashboardSink, DumpSink, LogSink, PrintWinSink, SinkSet, TeeSink};

const DEFAULT_API: &str = "wss://msoll.de/spe_ed";

/// Monte-Carlo player for spe_ed
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Game server websocket endpoint (overridden by $URL)
    #[arg(long, default_value = DEFAULT_API)]
    api: String,

    /// API key (overridden by $KEY)
    #[arg(long, default_value = "")]
    key: String,

    /// Only print the final result
    #[arg(long, action = clap::ArgAction::SetTrue)]
    quiet: bool,

    /// Upper bound on the time spent per turn, e.g. 750ms or 1.5s; 0 disables
    #[arg(long, default_value = "")]
    max: String,

    /// Write a runtime profile to this file when the game ends
    #[arg(long)]
    profile: Option<PathBuf>,

    /// Also write the game log to this file
    #[arg(long)]
    print: Option<PathBuf>,

    /// Show the full-screen dashboard instead of log output
    #[arg(long, action = clap::ArgAction::SetTrue, conflicts_with = "quiet")]
    ui: bool,

    /// Record every decided turn to this file for the replay tool
    #[arg(long)]
    dump: Option<PathBuf>,

    /// Append the game result to this file
    #[arg(long)]
    printwin: Option<PathBuf>,

    /// Engine settings (default: Speed.toml if present)
    #[arg(long)]
    config: Option<PathBuf>,
}

/// `None` when the limit is disabled
fn max_duration(text: &str, config: &Config) -> Result<Option<Duration>, EngineError> {
    if text.trim().is_empty() {
        return Ok(None);
    }
    let max = parse_duration(text).map_err(EngineError::Config)?;
    if max.is_zero() {
        return Ok(None);
    }
    let floor = config.timing.min_max_duration();
    if max < floor {
        return Err(EngineError::Config(format!(
            "--max {:?} is below the minimum of {:?}",
            max, floor
        )));
    }
    Ok(Some(max))
}

fn load_config(path: Option<&Path>) -> Result<Config, EngineError> {
    match path {
        Some(path) => Config::from_file(path).map_err(EngineError::Config),
        None if Path::new("Speed.toml").exists() => Ok(Config::load_or_default()),
        None => Ok(Config::default_hardcoded()),
    }
}

fn build_sinks(args: &Args) -> SinkSet {
    let mut sinks = SinkSet::new();
    // clap rejects --ui together with --quiet
    if args.ui {
        sinks.push(Box::new(DashboardSink::new()));
    } else if !args.quiet {
        sinks.push(Box::new(LogSink::new(std::io::stderr().is_terminal())));
    }
    if let Some(path) = &args.print {
        sinks.push(Box::new(TeeSink::new(path)));
    }
    if let Some(path) = &args.dump {
        sinks.push(Box::new(DumpSink::new(path)));
    }
    if let Some(path) = &args.printwin {
        sinks.push(Box::new(PrintWinSink::new(path)));
    }
    sinks
}

async fn run(args: Args) -> Result<GameOutcome, EngineError> {
    let config = load_config(args.config.as_deref())?;
    let max = max_duration(&args.max, &config)?;
    if let Some(max) = max {
        info!("Limiting each turn to {:?}", max);
    }

    if args.profile.is_some() {
        profiler::enable();
    }
    let started = Instant::now();

    let sinks = build_sinks(&args);
    let transport = WebSocketTransport::connect(&args.api, &args.key).await?;
    let bot = Bot::new(config, max);
    let outcome = Session::new(transport, bot, sinks).play().await;

    if let Some(path) = &args.profile {
        profiler::write_report(path, started.elapsed().as_millis() as u64)?;
        info!("Profile written to {}", path.display());
    }

    outcome
}

#[tokio::main]
async fn main() -> ExitCode {
    let mut args = Args::parse();

    // 'info' unless quiet, but an explicit RUST_LOG always wins
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", if args.quiet { "warn" } else { "info" });
    }
    env_logger::init();

    if let Ok(url) = env::var("URL") {
        info!("Using API endpoint from $URL");
        args.api = url;
    }
    if let Ok(key) = env::var("KEY") {
        info!("Using API key from $KEY");
        args.key = key;
    }

    let quiet = args.quiet;
    match run(args).await {
        Ok(outcome) => {
            if quiet {
                println!("{}", result_line(outcome.won, outcome.last_alive, outcome.rounds));
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
