// Differential-drive kinematics for the rover base
// Converts body-frame velocities (linear, angular) to per-wheel commands.

/// Drive geometry, inches
pub const WHEEL_RADIUS: f64 = 4.5;
pub const TRACK_WIDTH: f64 = 8.5; // wheel separation

/// Fixed gain from wheel speed to duty-cycle command
pub const DUTY_GAIN: f64 = 10.0;

/// Duty-cycle command limit (safety clamp)
pub const MAX_DUTY: i32 = 100;

/// Wheel angular speeds produced by the kinematic model
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WheelSpeeds {
    pub left: f64,
    pub right: f64,
}

/// Integer duty-cycle commands for the two drive motors.
///
/// Both wheels use the same forward-positive sign convention here; the
/// right motor's mirrored mounting is compensated at the driver boundary,
/// not in the kinematics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WheelDuty {
    pub left: i32,
    pub right: i32,
}

impl WheelDuty {
    pub fn zero() -> Self {
        Self::default()
    }
}

/// Convert body-frame velocities to wheel angular speeds.
///
/// Standard unicycle-to-differential-drive model:
/// `wheel = (v -/+ omega * track/2) / radius`. Pure and stateless.
pub fn unicycle_to_wheels(linear: f64, angular: f64) -> WheelSpeeds {
    let half_track = TRACK_WIDTH / 2.0;
    WheelSpeeds {
        left: (linear - angular * half_track) / WHEEL_RADIUS,
        right: (linear + angular * half_track) / WHEEL_RADIUS,
    }
}

/// Scale wheel speeds by the duty gain and round to integer commands,
/// clamped to the duty limit.
pub fn wheels_to_duty(speeds: WheelSpeeds) -> WheelDuty {
    let duty = |speed: f64| ((speed * DUTY_GAIN).round() as i32).clamp(-MAX_DUTY, MAX_DUTY);
    WheelDuty {
        left: duty(speeds.left),
        right: duty(speeds.right),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {}, got {}",
            expected,
            actual
        );
    }

    #[test]
    fn zero_velocity_is_zero_wheels() {
        let wheels = unicycle_to_wheels(0.0, 0.0);
        assert_eq!(wheels, WheelSpeeds::default());
        assert_eq!(wheels_to_duty(wheels), WheelDuty::zero());
    }

    #[test]
    fn pure_linear_drives_both_wheels_equally() {
        // (2/9) * 9 = 2 per wheel
        let wheels = unicycle_to_wheels(9.0, 0.0);
        assert_close(wheels.left, 2.0);
        assert_close(wheels.right, 2.0);
    }

    #[test]
    fn pure_rotation_drives_wheels_opposite() {
        // (17/18) * (18/17) = 1, signs opposed
        let wheels = unicycle_to_wheels(0.0, 18.0 / 17.0);
        assert_close(wheels.left, -1.0);
        assert_close(wheels.right, 1.0);
    }

    #[test]
    fn model_coefficients_match_geometry() {
        // The geometry reduces to left = (2/9)v - (17/18)w, right = (2/9)v + (17/18)w
        let wheels = unicycle_to_wheels(1.0, 1.0);
        assert_close(wheels.left, 2.0 / 9.0 - 17.0 / 18.0);
        assert_close(wheels.right, 2.0 / 9.0 + 17.0 / 18.0);
    }

    #[test]
    fn duty_gain_scales_by_ten() {
        let duty = wheels_to_duty(unicycle_to_wheels(9.0, 0.0));
        assert_eq!(duty, WheelDuty { left: 20, right: 20 });
    }

    #[test]
    fn duty_rounds_to_nearest() {
        let duty = wheels_to_duty(WheelSpeeds {
            left: 0.14,
            right: -0.16,
        });
        assert_eq!(duty, WheelDuty { left: 1, right: -2 });
    }

    #[test]
    fn duty_clamps_to_limit() {
        let duty = wheels_to_duty(unicycle_to_wheels(1000.0, 0.0));
        assert_eq!(duty, WheelDuty { left: MAX_DUTY, right: MAX_DUTY });
        let duty = wheels_to_duty(unicycle_to_wheels(-1000.0, 0.0));
        assert_eq!(duty, WheelDuty { left: -MAX_DUTY, right: -MAX_DUTY });
    }
}
