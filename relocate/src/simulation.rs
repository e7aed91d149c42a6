//! The physics simulation the relocation core drives.
//!
//! The core never integrates anything itself. It reads and writes body state through
//! [`Simulation`] and relies on the implementor to advance time in fixed steps.

use nalgebra as na;

use crate::constraints::Constraints;

/// 2D vector in meters (positions) or meters per second (velocities).
pub type Vec2 = na::Vector2<f32>;

/// Per-body operations of a fixed-step 2D rigid-body simulation.
///
/// `Body` is a non-owning handle; the simulation owns the body itself.
pub trait Simulation {
    /// Handle to a body. It must refer to a live body; implementations may panic on a stale
    /// or foreign handle.
    type Body: Copy + std::fmt::Debug;

    fn position(&self, body: Self::Body) -> Vec2;
    /// Direct position write. Takes effect immediately, without sweeping the path.
    fn set_position(&mut self, body: Self::Body, position: Vec2);

    fn velocity(&self, body: Self::Body) -> Vec2;
    fn set_velocity(&mut self, body: Self::Body, velocity: Vec2);

    fn is_kinematic(&self, body: Self::Body) -> bool;
    fn set_kinematic(&mut self, body: Self::Body, kinematic: bool);

    fn is_collision_enabled(&self, body: Self::Body) -> bool;
    fn set_collision_enabled(&mut self, body: Self::Body, enabled: bool);

    fn constraints(&self, body: Self::Body) -> Constraints;
    fn set_constraints(&mut self, body: Self::Body, constraints: Constraints);

    /// Request a move to `target` that the simulation interpolates over the next step.
    ///
    /// Unlike [`Simulation::set_position`], the body travels the path during integration.
    fn move_toward(&mut self, body: Self::Body, target: Vec2);

    /// Duration of one fixed step in seconds. Constant for the lifetime of a run.
    fn fixed_step_duration(&self) -> f32;

    /// Advance the simulation by one fixed step.
    fn step(&mut self);
}

/// Restorable state of a body: the fields strategies are allowed to alter temporarily.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BodyFlags {
    pub kinematic: bool,
    pub collision_enabled: bool,
    pub constraints: Constraints,
}

impl BodyFlags {
    pub fn capture<S: Simulation>(sim: &S, body: S::Body) -> Self {
        Self {
            kinematic: sim.is_kinematic(body),
            collision_enabled: sim.is_collision_enabled(body),
            constraints: sim.constraints(body),
        }
    }
}
