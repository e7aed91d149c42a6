use std::time::Duration;

/// Fixed simulation step in seconds.
///
/// Every relocation cycle spans exactly two of these: one to apply, one to settle.
pub const FIXED_STEP_SECONDS: f32 = 0.02;

/// [`FIXED_STEP_SECONDS`] as a `Duration`, for drivers that schedule with wall-clock types.
pub const FIXED_STEP: Duration = Duration::from_millis(20);

/// Radius (meters) of the disk new targets are sampled from.
pub const TARGET_RADIUS: f32 = 5.0;

/// Radius (meters) of the ball collider used for the relocated body.
pub const BODY_RADIUS: f32 = 0.25;

/// Upper bound on the residual left by an interpolated kinematic move (meters).
///
/// Interpolated moves are expected to land within this distance of the target.
/// Anything larger means something other than rounding pulled the body away.
pub const INTERPOLATION_RESIDUAL_EPS: f32 = 1.0e-5;

/// Fractional digits used when a relocation error is logged.
pub const REPORT_PRECISION: usize = 9;

/// Gravity used by the interactive scene (meters per second squared, +Y is up).
pub const SCENE_GRAVITY_Y: f32 = -9.81;
