// One-shot command sender, handy for checking connectivity to the rover
//
// Usage: cargo run --example send_cmd -- vel 8.0
//        cargo run --example send_cmd -- fork 150 --host 192.168.0.134
//
// Doubles as a wire-format reference: one command is exactly 8 bytes,
// an IEEE-754 f64 in little-endian order, no framing.
use clap::{Parser, ValueEnum};
use std::io::Write;
use std::net::TcpStream;

use forklift_runtime::config::{FORK_PORT, THETA_PORT, VEL_PORT};

#[derive(Clone, Copy, ValueEnum)]
enum Channel {
    /// Linear velocity
    Vel,
    /// Angular velocity
    Theta,
    /// Fork target angle
    Fork,
}

impl Channel {
    fn port(self) -> u16 {
        match self {
            Channel::Vel => VEL_PORT,
            Channel::Theta => THETA_PORT,
            Channel::Fork => FORK_PORT,
        }
    }
}

#[derive(Parser)]
#[command(about = "Send one command to the forklift rover")]
struct Cli {
    /// Which channel to command
    #[arg(value_enum)]
    channel: Channel,

    /// Command value
    value: f64,

    /// Rover address
    #[arg(long, default_value = "192.168.0.134")]
    host: String,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let port = cli.channel.port();
    println!("Connecting to {}:{}...", cli.host, port);
    let mut stream = TcpStream::connect((cli.host.as_str(), port))?;

    stream.write_all(&cli.value.to_le_bytes())?;
    println!("Sent {}", cli.value);

    Ok(())
}
