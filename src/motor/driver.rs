// High-level drive output for the rover
//
// Adapts kinematic wheel commands and fork positions to the drive board,
// including the per-motor sign conventions the board expects.

use tracing::{debug, info, warn};

use super::board::{BoardError, Channel, DriveBus};
use crate::config::{FORK_MAX, FORK_MIN};

/// The hardware seam the control loop drives.
///
/// `set_fork_angle` clamps internally to the fork travel range; callers of
/// `set_wheel_duty` use forward-positive duty for both wheels and leave any
/// per-motor sign convention to the implementation.
pub trait DriveOutput {
    fn set_wheel_duty(&mut self, left: i32, right: i32) -> Result<(), BoardError>;
    fn set_fork_angle(&mut self, angle: f32) -> Result<(), BoardError>;
}

/// Real drive output over the serial board
pub struct BoardDrive {
    bus: DriveBus,
}

impl BoardDrive {
    pub fn new(port: &str) -> Result<Self, BoardError> {
        info!("Opening drive board on {}", port);
        let bus = DriveBus::open(port)?;
        Ok(Self { bus })
    }
}

impl DriveOutput for BoardDrive {
    fn set_wheel_duty(&mut self, left: i32, right: i32) -> Result<(), BoardError> {
        debug!("Setting wheel duty: left={}, right={}", left, right);
        self.bus.write_i16(Channel::WheelLeft, left as i16)?;
        // The right motor is mounted mirrored, so its duty is inverted here
        // and nowhere else - the kinematics stay sign-symmetric.
        self.bus.write_i16(Channel::WheelRight, (-right) as i16)
    }

    fn set_fork_angle(&mut self, angle: f32) -> Result<(), BoardError> {
        let clamped = angle.clamp(FORK_MIN as f32, FORK_MAX as f32);
        debug!("Setting fork angle: {}", clamped);
        self.bus.write_u8(Channel::Fork, clamped.round() as u8)
    }
}

impl Drop for BoardDrive {
    fn drop(&mut self) {
        // Try to stop the wheels when the driver goes away (safety measure)
        if let Err(e) = self.set_wheel_duty(0, 0) {
            warn!("Failed to stop wheels on drop: {}", e);
        }
    }
}

/// No-hardware drive output: logs what would be sent.
/// Selected with `hardware = false` for bench runs without the board.
pub struct SimDrive;

impl DriveOutput for SimDrive {
    fn set_wheel_duty(&mut self, left: i32, right: i32) -> Result<(), BoardError> {
        debug!("[sim] wheel duty: left={}, right={}", left, right);
        Ok(())
    }

    fn set_fork_angle(&mut self, angle: f32) -> Result<(), BoardError> {
        debug!("[sim] fork angle: {}", angle);
        Ok(())
    }
}
