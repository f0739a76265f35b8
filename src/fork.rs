// Fork actuator smoother
//
// The fork servo must not slam between positions, so motion toward a new
// target is rate-limited: one degree per control-loop iteration. At 50 Hz
// that is one step every 20 ms. Unlike the velocity channels the fork has
// no watchdog - the last commanded target is held indefinitely.

use tracing::{debug, info};

use crate::config::{FORK_MAX, FORK_MIN};

/// Two-state ramp over integer servo positions: Idle while
/// `current == target`, Moving otherwise, advancing one degree per step.
pub struct ForkActuator {
    current: i32,
    target: i32,
}

impl ForkActuator {
    /// Starts parked at the given position (clamped into the travel range),
    /// with the target equal to it, so no motion until the first command.
    pub fn new(initial: i32) -> Self {
        let current = initial.clamp(FORK_MIN, FORK_MAX);
        Self {
            current,
            target: current,
        }
    }

    /// Adopt a new target from the wire.
    ///
    /// Commands are rounded to the servo's one-degree resolution and clamped
    /// into `[FORK_MIN, FORK_MAX]` before adoption, which is what guarantees
    /// the one-degree ramp converges exactly.
    pub fn retarget(&mut self, raw: f64) {
        let target = (raw.round() as i32).clamp(FORK_MIN, FORK_MAX);
        if target != self.target {
            info!("fork target {} -> {}", self.target, target);
        }
        self.target = target;
    }

    /// Advance one step toward the target.
    ///
    /// Returns the new position to dispatch, or `None` when already there.
    /// Reaching the target returns the ramp to Idle; a target equal to the
    /// current position therefore produces no steps at all.
    pub fn step(&mut self) -> Option<i32> {
        if self.current == self.target {
            return None;
        }
        self.current += if self.target > self.current { 1 } else { -1 };
        debug!("fork at {} (target {})", self.current, self.target);
        Some(self.current)
    }

    pub fn is_moving(&self) -> bool {
        self.current != self.target
    }

    pub fn position(&self) -> i32 {
        self.current
    }

    pub fn target(&self) -> i32 {
        self.target
    }
}
