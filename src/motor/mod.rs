// Motor control module for the rover base and fork
//
// Provides:
// - Differential-drive kinematics (body velocity -> wheel duty)
// - Serial framing for the write-only drive board
// - The drive output seam the control loop talks to

pub mod board;
mod driver;
pub mod kinematics;

pub use board::{BoardError, DriveBus};
pub use driver::{BoardDrive, DriveOutput, SimDrive};
pub use kinematics::{unicycle_to_wheels, wheels_to_duty, WheelDuty, WheelSpeeds};
