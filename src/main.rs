use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use forklift_runtime::config::RuntimeConfig;

#[derive(Parser)]
#[command(about = "Forklift rover control runtime")]
struct Cli {
    /// Path to a JSON config file; missing fields use built-in defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log outputs instead of driving the board
    #[arg(long)]
    no_hardware: bool,

    /// Serial port for the drive board
    #[arg(long)]
    serial: Option<String>,
}

#[tokio::main]
async fn main() {
    // Setup logging (set RUST_LOG=info or debug)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse().unwrap()))
        .init(); // installs the subscriber globally

    let cli = Cli::parse();

    let mut config = match cli.config {
        Some(path) => match RuntimeConfig::load(&path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Config error: {}", e);
                std::process::exit(1);
            }
        },
        None => RuntimeConfig::default(),
    };
    if cli.no_hardware {
        config.hardware = false;
    }
    if let Some(serial) = cli.serial {
        config.serial_port = serial;
    }

    if let Err(e) = forklift_runtime::runtime::run(config).await {
        eprintln!("Runtime error: {}", e);
        std::process::exit(1);
    }
}
