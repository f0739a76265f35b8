// Per-channel command state and the liveness watchdog
// Note: the watchdog is a safety mechanism - if the host crashes and stops
// sending velocity commands, the rover coasts forever unless something zeroes them.

use std::time::Instant;
use tracing::warn;

use crate::config::CMD_TIMEOUT;

/// Decode one wire command: 8 bytes, IEEE-754 binary64, little-endian.
/// The host packs values with `struct.pack("<d", value)`.
pub fn decode_command(bytes: [u8; 8]) -> f64 {
    f64::from_le_bytes(bytes)
}

/// Latest command value and receipt time for one TCP channel.
///
/// Owned by the runtime and updated from its own port only, so there is
/// no shared state between channels.
pub struct CommandChannel {
    name: &'static str,
    latest: f64,
    received_at: Instant,
    stale: bool, // latch so the stale transition is logged once, not at 50 Hz
}

impl CommandChannel {
    /// Starts stale-at-zero: `received_at` is the construction time, so a
    /// channel that never hears from the host reads 0.0 forever.
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            latest: 0.0,
            received_at: Instant::now(),
            stale: true,
        }
    }

    /// Record a freshly decoded command.
    pub fn record(&mut self, value: f64, now: Instant) {
        self.latest = value;
        self.received_at = now;
        self.stale = false;
    }

    /// The liveness gate: the stored value while fresh, 0.0 once stale.
    ///
    /// Level-triggered - evaluated every loop iteration, so a silent channel
    /// keeps yielding 0.0 until a new command arrives. A command aged exactly
    /// `CMD_TIMEOUT` is still live (strict `>` comparison).
    pub fn effective(&mut self, now: Instant) -> f64 {
        let age = now.saturating_duration_since(self.received_at);
        if age > CMD_TIMEOUT {
            if !self.stale {
                warn!("{} command stale ({:?} old), zeroing", self.name, age);
                self.stale = true;
            }
            0.0
        } else {
            self.latest
        }
    }

    pub fn latest(&self) -> f64 {
        self.latest
    }
}
