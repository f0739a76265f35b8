// Keyboard teleop: W/S drive, A/D turn, U/J fork, R/F speed, Q quit
//
// Streams commands to the rover's three TCP ports at 50 Hz. Velocities
// auto-zero after a short input silence so releasing a key stops the rover
// well before its own watchdog would.
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode},
};
use std::io::Write;
use std::net::TcpStream;
use std::time::{Duration, Instant};
use tracing::info;

use forklift_runtime::config::{FORK_MAX, FORK_MIN, FORK_PORT, THETA_PORT, VEL_PORT};

const SPEEDS: [f64; 3] = [2.0, 5.0, 8.0];
const THETA_SPEEDS: [f64; 3] = [1.0, 2.0, 3.0];
const INPUT_TIMEOUT_MS: u64 = 100; // Reset velocities after this much time with no input

#[derive(Parser)]
#[command(about = "Keyboard teleop for the forklift rover")]
struct Cli {
    /// Rover address
    #[arg(long, default_value = "192.168.0.134")]
    host: String,
}

struct CommandLink {
    vel: TcpStream,
    theta: TcpStream,
    fork: TcpStream,
}

impl CommandLink {
    fn connect(host: &str) -> std::io::Result<Self> {
        Ok(Self {
            vel: TcpStream::connect((host, VEL_PORT))?,
            theta: TcpStream::connect((host, THETA_PORT))?,
            fork: TcpStream::connect((host, FORK_PORT))?,
        })
    }
}

/// One command on the wire: 8 bytes, little-endian f64
fn send_value(stream: &mut TcpStream, value: f64) -> std::io::Result<()> {
    stream.write_all(&value.to_le_bytes())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let cli = Cli::parse();
    info!("Connecting to rover at {}...", cli.host);
    let mut link = CommandLink::connect(&cli.host)?;

    info!("Controls: W/S=drive, A/D=turn, U/J=fork, R/F=speed, Q=quit");
    info!("Speed: LOW");

    enable_raw_mode()?;
    let result = run_teleop(&mut link);
    disable_raw_mode()?;

    result
}

fn run_teleop(link: &mut CommandLink) -> Result<(), Box<dyn std::error::Error>> {
    let mut speed_idx: usize = 0;

    // Persistent velocity state
    let mut vel = 0.0;
    let mut theta = 0.0;
    let mut last_movement_input = Instant::now();

    loop {
        // Poll for key with 20ms timeout (50Hz effective rate)
        if event::poll(Duration::from_millis(20))? {
            if let Event::Key(KeyEvent { code, kind, .. }) = event::read()? {
                let pressed = kind == KeyEventKind::Press || kind == KeyEventKind::Repeat;

                match code {
                    // Drive - update velocity and refresh timestamp
                    KeyCode::Char('w') if pressed => {
                        vel = SPEEDS[speed_idx];
                        last_movement_input = Instant::now();
                    }
                    KeyCode::Char('s') if pressed => {
                        vel = -SPEEDS[speed_idx];
                        last_movement_input = Instant::now();
                    }

                    // Turn
                    KeyCode::Char('a') if pressed => {
                        theta = THETA_SPEEDS[speed_idx];
                        last_movement_input = Instant::now();
                    }
                    KeyCode::Char('d') if pressed => {
                        theta = -THETA_SPEEDS[speed_idx];
                        last_movement_input = Instant::now();
                    }

                    // Fork presets; sent once, the rover holds the target itself
                    KeyCode::Char('u') if pressed => {
                        info!("Fork up");
                        send_value(&mut link.fork, FORK_MAX as f64)?;
                    }
                    KeyCode::Char('j') if pressed => {
                        info!("Fork down");
                        send_value(&mut link.fork, FORK_MIN as f64)?;
                    }

                    // Speed control
                    KeyCode::Char('r') if pressed => {
                        speed_idx = (speed_idx + 1).min(2);
                        print_speed(speed_idx);
                    }
                    KeyCode::Char('f') if pressed => {
                        speed_idx = speed_idx.saturating_sub(1);
                        print_speed(speed_idx);
                    }

                    // Quit
                    KeyCode::Char('q') | KeyCode::Esc if pressed => break,

                    _ => {}
                }
            }
        }

        // Reset velocities if no movement input for INPUT_TIMEOUT_MS
        if last_movement_input.elapsed() > Duration::from_millis(INPUT_TIMEOUT_MS) {
            vel = 0.0;
            theta = 0.0;
        }

        // Always stream velocities at ~50Hz
        send_value(&mut link.vel, vel)?;
        send_value(&mut link.theta, theta)?;
    }

    // Leave the rover stopped
    send_value(&mut link.vel, 0.0)?;
    send_value(&mut link.theta, 0.0)?;

    Ok(())
}

fn print_speed(idx: usize) {
    let label = ["LOW", "MED", "HIGH"][idx];
    info!("Speed: {}", label);
}
