// Ports, timeouts, fork travel limits, drive board configuration
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

// Control loop frequency. The 20 ms tick is also the fork step cadence.
pub const LOOP_HZ: u64 = 50;

// Velocity commands older than this are treated as lost and zeroed
pub const CMD_TIMEOUT: Duration = Duration::from_millis(500);

// Command ports, fixed by the host-side controller
pub const VEL_PORT: u16 = 25000; // linear velocity
pub const FORK_PORT: u16 = 25001; // fork target angle
pub const THETA_PORT: u16 = 25002; // angular velocity

// Fork servo travel limits, degrees
pub const FORK_MIN: i32 = 128;
pub const FORK_MAX: i32 = 180;

// Serial port for the drive board
pub const SERIAL_PORT: &str = "/dev/ttyUSB0";

/// Runtime configuration, loadable from a JSON file. Missing fields fall
/// back to the built-in defaults above.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub listen_addr: String,
    pub vel_port: u16,
    pub fork_port: u16,
    pub theta_port: u16,
    pub serial_port: String,
    /// Drive the real board; when false, outputs are only logged.
    pub hardware: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0".to_string(),
            vel_port: VEL_PORT,
            fork_port: FORK_PORT,
            theta_port: THETA_PORT,
            serial_port: SERIAL_PORT.to_string(),
            hardware: true,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),
}

impl RuntimeConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_fills_defaults() {
        let config: RuntimeConfig =
            serde_json::from_str(r#"{"vel_port": 4000, "hardware": false}"#).unwrap();
        assert_eq!(config.vel_port, 4000);
        assert!(!config.hardware);
        assert_eq!(config.fork_port, FORK_PORT);
        assert_eq!(config.theta_port, THETA_PORT);
        assert_eq!(config.listen_addr, "0.0.0.0");
    }

    #[test]
    fn empty_config_is_default() {
        let config: RuntimeConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.vel_port, VEL_PORT);
        assert!(config.hardware);
    }
}
