//! The six relocation strategies.
//!
//! Each strategy splits a relocation into two disjoint halves. `apply` runs at the start of
//! a fixed step and mutates the body toward the target; `settle` runs one full step later,
//! once the simulation has integrated the mutation, and undoes whatever `apply` changed
//! temporarily. Whatever must be restored travels from `apply` to `settle` in a [`Scratch`]
//! value, so strategies themselves hold no state.
//!
//! | Strategy                | Moves the body by            | Temporarily changes        |
//! |-------------------------|------------------------------|----------------------------|
//! | `Velocity`              | velocity for one step        | collision detection        |
//! | `Position`              | direct position write        | nothing                    |
//! | `DynamicMovePosition`   | interpolated move            | nothing                    |
//! | `KinematicMovePosition` | interpolated move            | collision detection, body type |
//! | `KinematicPosition`     | direct position write        | body type                  |
//! | `Freeze`                | direct position write        | constraint mask            |

use std::fmt;

use crate::{
    constraints::Constraints,
    simulation::{Simulation, Vec2},
};

/// Body state saved by `apply` and handed back to `settle` one step later.
///
/// `None` means the strategy did not touch that field.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Scratch {
    pub kinematic: Option<bool>,
    pub collision_enabled: Option<bool>,
    pub constraints: Option<Constraints>,
}

impl Scratch {
    /// Put every saved field back on the body.
    fn restore<S: Simulation>(self, sim: &mut S, body: S::Body) {
        if let Some(constraints) = self.constraints {
            sim.set_constraints(body, constraints);
        }
        if let Some(kinematic) = self.kinematic {
            sim.set_kinematic(body, kinematic);
        }
        if let Some(enabled) = self.collision_enabled {
            sim.set_collision_enabled(body, enabled);
        }
    }
}

/// A policy for moving a body onto a target within one fixed step.
pub trait RelocationStrategy<S: Simulation>: Send + Sync {
    fn kind(&self) -> StrategyKind;

    /// Mutate `body` toward `target`. Returns the state `settle` must restore.
    fn apply(&self, sim: &mut S, body: S::Body, target: Vec2) -> Scratch;

    /// Restore `scratch` and leave the body at rest.
    fn settle(&self, sim: &mut S, body: S::Body, scratch: Scratch);
}

/// Configuration value selecting one of the six strategies.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum StrategyKind {
    Velocity,
    Position,
    DynamicMovePosition,
    KinematicMovePosition,
    KinematicPosition,
    #[default]
    Freeze,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 6] = [
        StrategyKind::Velocity,
        StrategyKind::Position,
        StrategyKind::DynamicMovePosition,
        StrategyKind::KinematicMovePosition,
        StrategyKind::KinematicPosition,
        StrategyKind::Freeze,
    ];

    pub fn name(self) -> &'static str {
        match self {
            StrategyKind::Velocity => "velocity",
            StrategyKind::Position => "position",
            StrategyKind::DynamicMovePosition => "dynamic-move-position",
            StrategyKind::KinematicMovePosition => "kinematic-move-position",
            StrategyKind::KinematicPosition => "kinematic-position",
            StrategyKind::Freeze => "freeze",
        }
    }

    /// The next strategy in [`StrategyKind::ALL`], wrapping around.
    pub fn next(self) -> StrategyKind {
        let idx = Self::ALL.iter().position(|k| *k == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    pub fn build<S: Simulation>(self) -> Box<dyn RelocationStrategy<S>> {
        match self {
            StrategyKind::Velocity => Box::new(Velocity),
            StrategyKind::Position => Box::new(Position),
            StrategyKind::DynamicMovePosition => Box::new(DynamicMovePosition),
            StrategyKind::KinematicMovePosition => Box::new(KinematicMovePosition),
            StrategyKind::KinematicPosition => Box::new(KinematicPosition),
            StrategyKind::Freeze => Box::new(Freeze),
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Launch the body with exactly the velocity that covers the gap in one step.
///
/// Collision detection is off while the body travels, so nothing on the path stops it.
/// Drag, external forces and attached bodies still act on it during the step.
#[derive(Clone, Copy, Debug, Default)]
pub struct Velocity;

impl<S: Simulation> RelocationStrategy<S> for Velocity {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Velocity
    }

    fn apply(&self, sim: &mut S, body: S::Body, target: Vec2) -> Scratch {
        let scratch = Scratch {
            collision_enabled: Some(sim.is_collision_enabled(body)),
            ..Scratch::default()
        };
        sim.set_collision_enabled(body, false);
        let dt = sim.fixed_step_duration();
        let velocity = (target - sim.position(body)) / dt;
        sim.set_velocity(body, velocity);
        scratch
    }

    fn settle(&self, sim: &mut S, body: S::Body, scratch: Scratch) {
        sim.set_velocity(body, Vec2::zeros());
        scratch.restore(sim, body);
    }
}

/// Write the target position directly.
#[derive(Clone, Copy, Debug, Default)]
pub struct Position;

impl<S: Simulation> RelocationStrategy<S> for Position {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Position
    }

    fn apply(&self, sim: &mut S, body: S::Body, target: Vec2) -> Scratch {
        sim.set_velocity(body, Vec2::zeros());
        sim.set_position(body, target);
        Scratch::default()
    }

    fn settle(&self, sim: &mut S, body: S::Body, _scratch: Scratch) {
        sim.set_velocity(body, Vec2::zeros());
    }
}

/// Ask the simulation to move the still-dynamic body along the path.
///
/// Anything on the path can collide with it.
#[derive(Clone, Copy, Debug, Default)]
pub struct DynamicMovePosition;

impl<S: Simulation> RelocationStrategy<S> for DynamicMovePosition {
    fn kind(&self) -> StrategyKind {
        StrategyKind::DynamicMovePosition
    }

    fn apply(&self, sim: &mut S, body: S::Body, target: Vec2) -> Scratch {
        sim.set_velocity(body, Vec2::zeros());
        sim.move_toward(body, target);
        Scratch::default()
    }

    fn settle(&self, sim: &mut S, body: S::Body, _scratch: Scratch) {
        sim.set_velocity(body, Vec2::zeros());
    }
}

/// Turn the body kinematic with collisions off, then request an interpolated move.
///
/// Interpolation leaves a small floating-point residual.
#[derive(Clone, Copy, Debug, Default)]
pub struct KinematicMovePosition;

impl<S: Simulation> RelocationStrategy<S> for KinematicMovePosition {
    fn kind(&self) -> StrategyKind {
        StrategyKind::KinematicMovePosition
    }

    fn apply(&self, sim: &mut S, body: S::Body, target: Vec2) -> Scratch {
        let scratch = Scratch {
            kinematic: Some(sim.is_kinematic(body)),
            collision_enabled: Some(sim.is_collision_enabled(body)),
            ..Scratch::default()
        };
        sim.set_velocity(body, Vec2::zeros());
        sim.set_collision_enabled(body, false);
        sim.set_kinematic(body, true);
        sim.move_toward(body, target);
        scratch
    }

    fn settle(&self, sim: &mut S, body: S::Body, scratch: Scratch) {
        scratch.restore(sim, body);
        // Kinematic integration leaves the velocity it inferred from the move.
        sim.set_velocity(body, Vec2::zeros());
    }
}

/// Turn the body kinematic and write the target position directly.
#[derive(Clone, Copy, Debug, Default)]
pub struct KinematicPosition;

impl<S: Simulation> RelocationStrategy<S> for KinematicPosition {
    fn kind(&self) -> StrategyKind {
        StrategyKind::KinematicPosition
    }

    fn apply(&self, sim: &mut S, body: S::Body, target: Vec2) -> Scratch {
        let scratch = Scratch {
            kinematic: Some(sim.is_kinematic(body)),
            ..Scratch::default()
        };
        sim.set_velocity(body, Vec2::zeros());
        sim.set_kinematic(body, true);
        sim.set_position(body, target);
        scratch
    }

    fn settle(&self, sim: &mut S, body: S::Body, scratch: Scratch) {
        scratch.restore(sim, body);
        sim.set_velocity(body, Vec2::zeros());
    }
}

/// Freeze every axis for one step and write the target position directly.
///
/// Costs a single mask write each way and keeps forces from attached bodies out.
#[derive(Clone, Copy, Debug, Default)]
pub struct Freeze;

impl<S: Simulation> RelocationStrategy<S> for Freeze {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Freeze
    }

    fn apply(&self, sim: &mut S, body: S::Body, target: Vec2) -> Scratch {
        let scratch = Scratch {
            constraints: Some(sim.constraints(body)),
            ..Scratch::default()
        };
        sim.set_constraints(body, Constraints::FREEZE_ALL);
        sim.set_position(body, target);
        scratch
    }

    fn settle(&self, sim: &mut S, body: S::Body, scratch: Scratch) {
        scratch.restore(sim, body);
        sim.set_velocity(body, Vec2::zeros());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        constraints::LockedAxis,
        simulation::{
            BodyFlags,
            fake::{Call, FakeBody, FakeSimulation},
        },
    };

    const DT: f32 = 0.02;

    fn cycle(kind: StrategyKind, sim: &mut FakeSimulation, target: Vec2) {
        let strategy = kind.build::<FakeSimulation>();
        let scratch = strategy.apply(sim, FakeBody, target);
        sim.step();
        strategy.settle(sim, FakeBody, scratch);
    }

    #[test]
    fn every_strategy_restores_flags_and_stops_the_body() {
        let custom = Constraints::NONE.with(LockedAxis::Rotation);
        for kind in StrategyKind::ALL {
            let mut sim = FakeSimulation::new(Vec2::new(1.0, -2.0), DT);
            sim.constraints = custom;
            sim.velocity = Vec2::new(0.5, 0.5);
            let before = BodyFlags::capture(&sim, FakeBody);

            cycle(kind, &mut sim, Vec2::new(3.0, 4.0));

            assert_eq!(BodyFlags::capture(&sim, FakeBody), before, "{kind}");
            assert_eq!(sim.velocity, Vec2::zeros(), "{kind}");
        }
    }

    #[test]
    fn restores_pre_apply_values_rather_than_defaults() {
        // A body that starts kinematic with collisions off must end up the same way.
        for kind in StrategyKind::ALL {
            let mut sim = FakeSimulation::new(Vec2::zeros(), DT);
            sim.kinematic = true;
            sim.collision_enabled = false;

            cycle(kind, &mut sim, Vec2::new(1.0, 1.0));

            assert!(sim.kinematic, "{kind}");
            assert!(!sim.collision_enabled, "{kind}");
        }
    }

    #[test]
    fn velocity_covers_the_gap_in_one_step_with_collisions_off() {
        let mut sim = FakeSimulation::new(Vec2::zeros(), DT);
        let target = Vec2::new(3.0, 4.0);
        let scratch = Velocity.apply(&mut sim, FakeBody, target);

        assert!(!sim.collision_enabled);
        assert_eq!(sim.velocity, target / DT);
        assert_eq!(scratch.collision_enabled, Some(true));

        sim.step();
        assert!((sim.position - target).norm() < 1.0e-5);
    }

    #[test]
    fn freeze_saves_mask_and_writes_position() {
        let mut sim = FakeSimulation::new(Vec2::zeros(), DT);
        let target = Vec2::new(3.0, 4.0);
        let scratch = Freeze.apply(&mut sim, FakeBody, target);

        assert_eq!(scratch.constraints, Some(Constraints::NONE));
        assert_eq!(sim.constraints, Constraints::FREEZE_ALL);
        assert_eq!(sim.position, target);
        assert_eq!(sim.count(|c| matches!(c, Call::MoveToward(_))), 0);
    }

    #[test]
    fn move_strategies_request_interpolated_moves_and_write_nothing() {
        for kind in [
            StrategyKind::DynamicMovePosition,
            StrategyKind::KinematicMovePosition,
        ] {
            let mut sim = FakeSimulation::new(Vec2::zeros(), DT);
            let target = Vec2::new(-2.0, 0.5);
            cycle(kind, &mut sim, target);

            assert_eq!(sim.count(|c| matches!(c, Call::SetPosition(_))), 0, "{kind}");
            assert_eq!(sim.count(|c| *c == Call::MoveToward(target)), 1, "{kind}");
            assert_eq!(sim.position, target, "{kind}");
        }
    }

    #[test]
    fn kinematic_move_disables_collisions_during_the_step() {
        let mut sim = FakeSimulation::new(Vec2::zeros(), DT);
        let scratch = KinematicMovePosition.apply(&mut sim, FakeBody, Vec2::new(1.0, 0.0));

        assert!(sim.kinematic);
        assert!(!sim.collision_enabled);
        assert_eq!(scratch.kinematic, Some(false));
        assert_eq!(scratch.collision_enabled, Some(true));
    }

    #[test]
    fn position_and_freeze_touch_no_flags() {
        let mut sim = FakeSimulation::new(Vec2::zeros(), DT);
        cycle(StrategyKind::Position, &mut sim, Vec2::new(1.0, 2.0));
        assert_eq!(sim.count(|c| matches!(c, Call::SetKinematic(_))), 0);
        assert_eq!(sim.count(|c| matches!(c, Call::SetCollision(_))), 0);

        let mut sim = FakeSimulation::new(Vec2::zeros(), DT);
        cycle(StrategyKind::Freeze, &mut sim, Vec2::new(1.0, 2.0));
        assert_eq!(sim.count(|c| matches!(c, Call::SetKinematic(_))), 0);
        assert_eq!(sim.count(|c| matches!(c, Call::SetCollision(_))), 0);
        assert_eq!(sim.count(|c| matches!(c, Call::SetConstraints(_))), 2);
    }

    #[test]
    fn kinds_cycle_through_all_six_and_build_matching_strategies() {
        let mut kind = StrategyKind::Velocity;
        for expected in StrategyKind::ALL {
            assert_eq!(kind, expected);
            assert_eq!(kind.build::<FakeSimulation>().kind(), kind);
            kind = kind.next();
        }
        assert_eq!(kind, StrategyKind::Velocity);
        assert_eq!(StrategyKind::default(), StrategyKind::Freeze);
    }
}
