// Serial protocol for the rover's drive board
//
// The board is write-only: it applies whatever it last heard and sends
// nothing back. Frame format:
//   [0xAA, 0x55, Channel, Length, Payload..., Checksum]
// Payloads are little-endian; the checksum is the inverted byte sum of
// everything after the header.

use serialport::{self, SerialPort};
use std::io::Write;
use std::time::Duration;
use tracing::debug;

/// Default serial configuration for the drive board
pub const DEFAULT_BAUDRATE: u32 = 115_200;
pub const DEFAULT_TIMEOUT_MS: u64 = 100;

/// Frame header bytes
const HEADER: [u8; 2] = [0xAA, 0x55];

/// Output channels on the board
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Channel {
    WheelLeft = 0x01,
    WheelRight = 0x02,
    Fork = 0x03,
}

/// Error types for drive board communication
#[derive(Debug, thiserror::Error)]
pub enum BoardError {
    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, BoardError>;

/// Drive board bus - handles serial framing and writes
pub struct DriveBus {
    port: Box<dyn SerialPort>,
}

impl DriveBus {
    /// Open a new connection to the drive board
    pub fn open(port_name: &str) -> Result<Self> {
        Self::open_with_baudrate(port_name, DEFAULT_BAUDRATE)
    }

    /// Open with custom baudrate
    pub fn open_with_baudrate(port_name: &str, baudrate: u32) -> Result<Self> {
        let port = serialport::new(port_name, baudrate)
            .timeout(Duration::from_millis(DEFAULT_TIMEOUT_MS))
            .open()?;

        Ok(Self { port })
    }

    /// Calculate checksum over a frame body (everything after the header)
    fn checksum(data: &[u8]) -> u8 {
        let sum: u16 = data.iter().map(|&b| b as u16).sum();
        (!sum & 0xFF) as u8
    }

    /// Build a frame with header and checksum
    fn build_frame(channel: Channel, payload: &[u8]) -> Vec<u8> {
        let mut frame = Vec::with_capacity(5 + payload.len());

        frame.extend_from_slice(&HEADER);
        frame.push(channel as u8);
        frame.push(payload.len() as u8);
        frame.extend_from_slice(payload);

        // Checksum over channel, length, payload
        let body = &frame[2..];
        frame.push(Self::checksum(body));

        frame
    }

    fn send_frame(&mut self, frame: &[u8]) -> Result<()> {
        self.port.write_all(frame)?;
        self.port.flush()?;
        Ok(())
    }

    /// Write a signed 16-bit value (wheel duty) to a channel
    pub fn write_i16(&mut self, channel: Channel, value: i16) -> Result<()> {
        let frame = Self::build_frame(channel, &value.to_le_bytes());
        debug!("Write i16 to {:?}: {}", channel, value);
        self.send_frame(&frame)
    }

    /// Write a single byte (fork angle) to a channel
    pub fn write_u8(&mut self, channel: Channel, value: u8) -> Result<()> {
        let frame = Self::build_frame(channel, &[value]);
        debug!("Write u8 to {:?}: {}", channel, value);
        self.send_frame(&frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checksum() {
        // Channel=1, Length=2, Payload=20, 0
        let body = [1u8, 2, 20, 0];
        let checksum = DriveBus::checksum(&body);
        // ~(1+2+20+0) = ~23 = 232
        assert_eq!(checksum, 232);
    }

    #[test]
    fn test_checksum_wraps_at_a_byte() {
        let body = [0xFFu8, 0xFF, 0xFF];
        // sum = 765 = 0x2FD, ~0xFD & 0xFF = 0x02
        assert_eq!(DriveBus::checksum(&body), 0x02);
    }

    #[test]
    fn test_build_wheel_frame() {
        let frame = DriveBus::build_frame(Channel::WheelLeft, &20i16.to_le_bytes());
        // Header (2) + Channel (1) + Length (1) + Payload (2) + Checksum (1) = 7 bytes
        assert_eq!(frame.len(), 7);
        assert_eq!(frame[0], 0xAA);
        assert_eq!(frame[1], 0x55);
        assert_eq!(frame[2], 0x01); // left wheel channel
        assert_eq!(frame[3], 2); // payload length
        assert_eq!(frame[4], 20); // duty, little-endian
        assert_eq!(frame[5], 0);
        assert_eq!(frame[6], DriveBus::checksum(&frame[2..6]));
    }

    #[test]
    fn test_build_fork_frame() {
        let frame = DriveBus::build_frame(Channel::Fork, &[150]);
        assert_eq!(frame.len(), 6);
        assert_eq!(frame[2], 0x03);
        assert_eq!(frame[3], 1);
        assert_eq!(frame[4], 150);
        assert_eq!(frame[5], DriveBus::checksum(&frame[2..5]));
    }

    #[test]
    fn test_negative_duty_is_little_endian() {
        let frame = DriveBus::build_frame(Channel::WheelRight, &(-1i16).to_le_bytes());
        assert_eq!(frame[4], 0xFF);
        assert_eq!(frame[5], 0xFF);
    }
}
