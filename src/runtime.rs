// 50 Hz control loop
//
// Each iteration polls the three command ports, runs the velocity watchdog,
// maps gated velocities to wheel duty, and advances the fork ramp one step.
// The fork used to block the loop for the whole move; stepping it once per
// iteration keeps the wheels responsive while preserving the 20 ms cadence.

use std::time::{Duration, Instant};
use tokio::time::interval;
use tracing::info;

use crate::channel::CommandChannel;
use crate::config::{CMD_TIMEOUT, FORK_MIN, LOOP_HZ, RuntimeConfig};
use crate::fork::ForkActuator;
use crate::motor::{
    unicycle_to_wheels, wheels_to_duty, BoardDrive, BoardError, DriveOutput, SimDrive,
};
use crate::net::CommandPorts;

/// Control state: the per-channel command records and the fork ramp.
/// All of it is owned here and mutated only by `tick`.
pub struct Runtime {
    vel: CommandChannel,
    theta: CommandChannel,
    fork: ForkActuator,
}

impl Runtime {
    pub fn new() -> Self {
        Self {
            vel: CommandChannel::new("vel"),
            theta: CommandChannel::new("theta"),
            fork: ForkActuator::new(FORK_MIN), // parked low until commanded
        }
    }

    /// One loop iteration.
    ///
    /// Wheel duty is dispatched every iteration (the watchdog zeroes it when
    /// the channels go silent); the fork position is dispatched only when the
    /// ramp actually moved. A hardware write failure propagates out and ends
    /// the process - there is no degraded mode.
    pub fn tick(
        &mut self,
        ports: &mut CommandPorts,
        drive: &mut dyn DriveOutput,
        now: Instant,
    ) -> Result<(), BoardError> {
        // 1. Poll for complete commands, one per channel per iteration
        if let Some(value) = ports.vel.poll() {
            self.vel.record(value, now);
        }
        if let Some(value) = ports.theta.poll() {
            self.theta.record(value, now);
        }
        if let Some(value) = ports.fork.poll() {
            self.fork.retarget(value);
        }

        // 2. Watchdog-gated velocities -> wheel duty
        let speeds = unicycle_to_wheels(self.vel.effective(now), self.theta.effective(now));
        let duty = wheels_to_duty(speeds);
        drive.set_wheel_duty(duty.left, duty.right)?;

        // 3. Advance the fork ramp one degree
        if let Some(position) = self.fork.step() {
            drive.set_fork_angle(position as f32)?;
        }

        Ok(())
    }

    pub fn fork(&self) -> &ForkActuator {
        &self.fork
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}

pub async fn run(config: RuntimeConfig) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    info!("Binding command ports...");
    let mut ports = CommandPorts::bind(&config)?;

    let mut drive: Box<dyn DriveOutput> = if config.hardware {
        Box::new(BoardDrive::new(&config.serial_port)?)
    } else {
        info!("Hardware disabled, outputs will only be logged");
        Box::new(SimDrive)
    };

    let mut runtime = Runtime::new();
    let mut tick = interval(Duration::from_millis(1000 / LOOP_HZ));

    info!(
        "Runtime started: {}Hz loop, {}ms watchdog timeout",
        LOOP_HZ,
        CMD_TIMEOUT.as_millis()
    );

    loop {
        tick.tick().await;
        runtime.tick(&mut ports, drive.as_mut(), Instant::now())?;
    }
}
