use chrono::TimeDelta;
use std::env;
use std::error::Error;
use std::process;
use tracing_subscriber::EnvFilter;

use card_velocity::run;

const DEFAULT_WINDOW_SECS: i64 = 3600;

fn main() {
    init_logging();
    if let Err(err) = run_app() {
        eprintln!("Error: {}", err);
        process::exit(1);
    }
}

/// Logs go to stderr so stdout stays a clean CSV stream.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run_app() -> Result<(), Box<dyn Error>> {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 || args.len() > 3 {
        return Err("Usage: cargo run -- payments.csv [window-seconds]".into());
    }
    let window_secs = match args.get(2) {
        Some(raw) => raw
            .parse::<i64>()
            .map_err(|e| format!("invalid window '{}': {}", raw, e))?,
        None => DEFAULT_WINDOW_SECS,
    };
    let window = TimeDelta::try_seconds(window_secs)
        .ok_or_else(|| format!("window of {} seconds is out of range", window_secs))?;

    run(&args[1], window, std::io::stdout())
}
