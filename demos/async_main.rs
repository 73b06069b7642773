use chrono::TimeDelta;
use std::env;
use std::error::Error;
use std::process;

use card_velocity::run_async;

#[tokio::main]
async fn main() {
    if let Err(err) = run_app().await {
        eprintln!("Error: {}", err);
        process::exit(1);
    }
}

async fn run_app() -> Result<(), Box<dyn Error + Send + Sync>> {
    let args: Vec<String> = env::args().collect();
    if args.len() != 3 {
        return Err("Usage: cargo run --example async_main -- payments.csv window-seconds".into());
    }
    let window_secs: i64 = args[2].parse()?;
    let window = TimeDelta::try_seconds(window_secs).ok_or("window out of range")?;

    run_async(args[1].clone(), window, std::io::stdout()).await
}
