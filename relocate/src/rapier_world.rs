//! rapier2d-backed [`Simulation`].
//!
//! This module owns a complete Rapier world (dynamics, collision detection and CCD) and
//! exposes the per-body operations the relocation strategies need.
//!
//! Mapping onto Rapier
//! - Kinematic flag: `KinematicPositionBased` when set, `Dynamic` when cleared.
//! - Collision flag: enables/disables every collider attached to the body together with
//!   the body's CCD, so a disabled body is neither touched nor swept.
//! - Constraint mask: Rapier `LockedAxes`. Locking an axis also drops any velocity along it.
//! - `move_toward`: a kinematic body gets its next kinematic translation; a dynamic body
//!   gets the velocity that covers the gap in one step, with collisions and CCD still live,
//!   so anything on the path can stop it.

// Re-export Rapier so the client can build scenes without depending on `rapier2d` directly.
pub use rapier2d;

use std::sync::{Mutex, PoisonError};

use rapier2d::prelude::*;

use crate::{
    constraints::{Constraints, LockedAxis},
    error::{ConfigResult, validate_step},
    simulation::{Simulation, Vec2},
};

/// World-wide parameters fixed for the lifetime of a [`RapierSimulation`].
#[derive(Clone, Copy, Debug)]
pub struct WorldSettings {
    /// Gravity in meters per second squared.
    pub gravity: Vec2,
    /// Fixed step duration in seconds. Must be positive.
    pub dt: f32,
}

impl WorldSettings {
    /// No gravity, so nothing but the strategy under test moves a body.
    pub fn weightless(dt: f32) -> Self {
        Self {
            gravity: Vec2::zeros(),
            dt,
        }
    }
}

/// Supported collider shapes. Units are meters.
#[derive(Clone, Copy, Debug)]
pub enum ColliderShapeDef {
    Ball { radius: f32 },
    /// Axis-aligned box in the body's local frame.
    Cuboid { half_extents: Vec2 },
    /// Y-aligned capsule; `half_height` is half the length of the straight section.
    CapsuleY { radius: f32, half_height: f32 },
}

impl ColliderShapeDef {
    fn builder(&self) -> ColliderBuilder {
        match *self {
            ColliderShapeDef::Ball { radius } => ColliderBuilder::ball(radius),
            ColliderShapeDef::Cuboid { half_extents } => {
                ColliderBuilder::cuboid(half_extents.x, half_extents.y)
            }
            ColliderShapeDef::CapsuleY {
                radius,
                half_height,
            } => ColliderBuilder::capsule_y(half_height, radius),
        }
    }
}

/// A dynamic body to relocate.
#[derive(Clone, Copy, Debug)]
pub struct BodyDef {
    pub translation: Vec2,
    pub shape: ColliderShapeDef,
    pub constraints: Constraints,
    pub linear_damping: f32,
}

impl BodyDef {
    pub fn ball(translation: Vec2, radius: f32) -> Self {
        Self {
            translation,
            shape: ColliderShapeDef::Ball { radius },
            constraints: Constraints::NONE,
            linear_damping: 0.0,
        }
    }
}

/// A fixed obstacle.
#[derive(Clone, Copy, Debug)]
pub struct ObstacleDef {
    pub translation: Vec2,
    /// Rotation in radians.
    pub rotation: f32,
    pub shape: ColliderShapeDef,
}

/// Collects collision start events while the pipeline steps.
#[derive(Default)]
struct StartedCollisions(Mutex<Vec<CollisionEvent>>);

impl StartedCollisions {
    fn take(&self) -> Vec<CollisionEvent> {
        std::mem::take(&mut *self.0.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl EventHandler for StartedCollisions {
    fn handle_collision_event(
        &self,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        event: CollisionEvent,
        _contact_pair: Option<&ContactPair>,
    ) {
        if event.started() {
            self.0.lock().unwrap_or_else(PoisonError::into_inner).push(event);
        }
    }

    fn handle_contact_force_event(
        &self,
        _dt: Real,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        _contact_pair: &ContactPair,
        _total_force_magnitude: Real,
    ) {
    }
}

pub struct RapierSimulation {
    gravity: Vector<Real>,
    params: IntegrationParameters,
    pipeline: PhysicsPipeline,
    islands: IslandManager,
    broad_phase: BroadPhaseBvh,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
    events: StartedCollisions,
    /// Collision start events observed since the last drain.
    started: Vec<CollisionEvent>,
}

impl RapierSimulation {
    pub fn new(settings: WorldSettings) -> ConfigResult<Self> {
        let dt = validate_step(settings.dt)?;

        Ok(Self {
            gravity: settings.gravity,
            params: IntegrationParameters {
                dt,
                ..IntegrationParameters::default()
            },
            pipeline: PhysicsPipeline::new(),
            islands: IslandManager::new(),
            broad_phase: BroadPhaseBvh::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            events: StartedCollisions::default(),
            started: Vec::new(),
        })
    }

    /// Insert a dynamic body with CCD and collision events enabled.
    pub fn add_body(&mut self, def: BodyDef) -> RigidBodyHandle {
        let rb = RigidBodyBuilder::dynamic()
            .translation(def.translation)
            .linear_damping(def.linear_damping)
            .ccd_enabled(true)
            .build();
        let handle = self.bodies.insert(rb);

        let collider = def
            .shape
            .builder()
            .active_events(ActiveEvents::COLLISION_EVENTS)
            .build();
        self.colliders
            .insert_with_parent(collider, handle, &mut self.bodies);

        self.set_constraints(handle, def.constraints);
        handle
    }

    /// Insert a fixed obstacle and return its collider.
    pub fn add_obstacle(&mut self, def: ObstacleDef) -> ColliderHandle {
        let rb = RigidBodyBuilder::fixed()
            .translation(def.translation)
            .rotation(def.rotation)
            .build();
        let handle = self.bodies.insert(rb);

        let collider = def.shape.builder().build();
        self.colliders
            .insert_with_parent(collider, handle, &mut self.bodies)
    }

    /// Collision start events since the last call, oldest first.
    pub fn drain_collisions(&mut self) -> Vec<CollisionEvent> {
        std::mem::take(&mut self.started)
    }

    /// Number of collision start events since the last drain that involve `body`.
    pub fn collisions_involving(&self, body: RigidBodyHandle) -> usize {
        let Some(rb) = self.bodies.get(body) else {
            return 0;
        };
        let own = rb.colliders();
        self.started
            .iter()
            .filter(|ev| own.contains(&ev.collider1()) || own.contains(&ev.collider2()))
            .count()
    }

    fn collect_events(&mut self) {
        let started = self.events.take();
        self.started.extend(started);
    }
}

impl Simulation for RapierSimulation {
    type Body = RigidBodyHandle;

    fn position(&self, body: RigidBodyHandle) -> Vec2 {
        *self.bodies[body].translation()
    }

    fn set_position(&mut self, body: RigidBodyHandle, position: Vec2) {
        self.bodies[body].set_translation(position, true);
    }

    fn velocity(&self, body: RigidBodyHandle) -> Vec2 {
        *self.bodies[body].linvel()
    }

    fn set_velocity(&mut self, body: RigidBodyHandle, velocity: Vec2) {
        self.bodies[body].set_linvel(velocity, true);
    }

    fn is_kinematic(&self, body: RigidBodyHandle) -> bool {
        self.bodies[body].is_kinematic()
    }

    fn set_kinematic(&mut self, body: RigidBodyHandle, kinematic: bool) {
        let body_type = if kinematic {
            RigidBodyType::KinematicPositionBased
        } else {
            RigidBodyType::Dynamic
        };
        self.bodies[body].set_body_type(body_type, true);
    }

    fn is_collision_enabled(&self, body: RigidBodyHandle) -> bool {
        let rb = &self.bodies[body];
        rb.is_ccd_enabled()
            && rb
                .colliders()
                .iter()
                .all(|h| self.colliders.get(*h).is_some_and(|c| c.is_enabled()))
    }

    fn set_collision_enabled(&mut self, body: RigidBodyHandle, enabled: bool) {
        // CCD sweeps disabled colliders too, so it has to follow the flag.
        let rb = &mut self.bodies[body];
        rb.enable_ccd(enabled);
        for h in rb.colliders() {
            if let Some(collider) = self.colliders.get_mut(*h) {
                collider.set_enabled(enabled);
            }
        }
    }

    fn constraints(&self, body: RigidBodyHandle) -> Constraints {
        from_locked_axes(self.bodies[body].locked_axes())
    }

    fn set_constraints(&mut self, body: RigidBodyHandle, constraints: Constraints) {
        let rb = &mut self.bodies[body];
        rb.set_locked_axes(to_locked_axes(constraints), true);

        // A frozen axis keeps no residual motion from before the lock.
        let mut linvel = *rb.linvel();
        if constraints.locks(LockedAxis::TranslationX) {
            linvel.x = 0.0;
        }
        if constraints.locks(LockedAxis::TranslationY) {
            linvel.y = 0.0;
        }
        rb.set_linvel(linvel, true);
        if constraints.locks(LockedAxis::Rotation) {
            rb.set_angvel(0.0, true);
        }
    }

    fn move_toward(&mut self, body: RigidBodyHandle, target: Vec2) {
        let dt = self.params.dt;
        let rb = &mut self.bodies[body];
        if rb.is_kinematic() {
            rb.set_next_kinematic_translation(target);
        } else {
            let velocity = (target - *rb.translation()) / dt;
            rb.set_linvel(velocity, true);
        }
    }

    fn fixed_step_duration(&self) -> f32 {
        self.params.dt
    }

    fn step(&mut self) {
        self.pipeline.step(
            &self.gravity,
            &self.params,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            &(),
            &self.events,
        );
        self.collect_events();
    }
}

fn to_locked_axes(constraints: Constraints) -> LockedAxes {
    let mut axes = LockedAxes::empty();
    if constraints.locks(LockedAxis::TranslationX) {
        axes |= LockedAxes::TRANSLATION_LOCKED_X;
    }
    if constraints.locks(LockedAxis::TranslationY) {
        axes |= LockedAxes::TRANSLATION_LOCKED_Y;
    }
    if constraints.locks(LockedAxis::Rotation) {
        axes |= LockedAxes::ROTATION_LOCKED;
    }
    axes
}

fn from_locked_axes(axes: LockedAxes) -> Constraints {
    let mut constraints = Constraints::NONE;
    if axes.contains(LockedAxes::TRANSLATION_LOCKED_X) {
        constraints = constraints.with(LockedAxis::TranslationX);
    }
    if axes.contains(LockedAxes::TRANSLATION_LOCKED_Y) {
        constraints = constraints.with(LockedAxis::TranslationY);
    }
    if axes.intersects(LockedAxes::ROTATION_LOCKED) {
        constraints = constraints.with(LockedAxis::Rotation);
    }
    constraints
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        constants::{BODY_RADIUS, FIXED_STEP_SECONDS, INTERPOLATION_RESIDUAL_EPS},
        error::ConfigError,
        report::Accuracy,
        sequencer::{RelocationReport, SequencerConfig, TickSequencer},
        simulation::BodyFlags,
        strategy::StrategyKind,
    };

    fn world(gravity: Vec2) -> (RapierSimulation, RigidBodyHandle) {
        let mut sim = RapierSimulation::new(WorldSettings {
            gravity,
            dt: FIXED_STEP_SECONDS,
        })
        .unwrap();
        let body = sim.add_body(BodyDef::ball(Vec2::zeros(), BODY_RADIUS));
        (sim, body)
    }

    fn relocate(
        sim: &mut RapierSimulation,
        body: RigidBodyHandle,
        kind: StrategyKind,
        target: Vec2,
    ) -> RelocationReport {
        let mut seq = TickSequencer::<RapierSimulation>::new(SequencerConfig::new(body, kind));
        seq.arm(sim, target).unwrap();
        assert!(seq.tick(sim).is_none());
        // Settle without integrating, so callers see the state the cycle left behind.
        seq.on_simulation_step(sim).expect("cycle should settle on the second step")
    }

    #[test]
    fn rejects_non_positive_step() {
        let err = RapierSimulation::new(WorldSettings::weightless(0.0)).err();
        assert_eq!(err, Some(ConfigError::NonPositiveStep(0.0)));
    }

    #[test]
    fn body_flags_round_trip() {
        let (mut sim, body) = world(Vec2::zeros());
        assert!(!sim.is_kinematic(body));
        assert!(sim.is_collision_enabled(body));
        assert_eq!(sim.constraints(body), Constraints::NONE);

        sim.set_kinematic(body, true);
        sim.set_collision_enabled(body, false);
        sim.set_constraints(body, Constraints::FREEZE_ALL);
        assert!(sim.is_kinematic(body));
        assert!(!sim.is_collision_enabled(body));
        assert_eq!(sim.constraints(body), Constraints::FREEZE_ALL);

        let rotation_only = Constraints::NONE.with(LockedAxis::Rotation);
        sim.set_constraints(body, rotation_only);
        assert_eq!(sim.constraints(body), rotation_only);
    }

    #[test]
    fn collision_flag_switches_ccd_with_the_colliders() {
        let (mut sim, body) = world(Vec2::zeros());
        assert!(sim.bodies[body].is_ccd_enabled());

        sim.set_collision_enabled(body, false);
        assert!(!sim.bodies[body].is_ccd_enabled());
        let collider = sim.bodies[body].colliders()[0];
        assert!(!sim.colliders[collider].is_enabled());

        sim.set_collision_enabled(body, true);
        assert!(sim.bodies[body].is_ccd_enabled());
        assert!(sim.colliders[collider].is_enabled());
        assert!(sim.is_collision_enabled(body));
    }

    #[test]
    #[should_panic]
    fn stale_handles_are_rejected() {
        let (sim, _) = world(Vec2::zeros());
        sim.position(RigidBodyHandle::invalid());
    }

    #[test]
    fn started_collisions_are_collected_and_drained() {
        let (mut sim, body) = world(Vec2::zeros());
        sim.add_obstacle(ObstacleDef {
            translation: Vec2::new(0.4, 0.0),
            rotation: 0.0,
            shape: ColliderShapeDef::Ball { radius: 0.25 },
        });

        sim.step();
        assert_eq!(sim.collisions_involving(body), 1);
        assert_eq!(sim.drain_collisions().len(), 1);
        assert_eq!(sim.collisions_involving(body), 0);
    }

    #[test]
    fn direct_write_strategies_land_exactly() {
        for kind in [
            StrategyKind::Position,
            StrategyKind::KinematicPosition,
            StrategyKind::Freeze,
        ] {
            let (mut sim, body) = world(Vec2::zeros());
            let target = Vec2::new(3.0, 4.0);
            let result = relocate(&mut sim, body, kind, target);

            assert_eq!(result.error.distance, 0.0, "{kind}");
            assert_eq!(result.error.accuracy, Accuracy::Exact, "{kind}");
            assert_eq!(sim.position(body), target, "{kind}");
        }
    }

    #[test]
    fn freeze_is_exact_even_under_gravity() {
        let (mut sim, body) = world(Vec2::new(0.0, -9.81));
        let mask = Constraints::NONE.with(LockedAxis::Rotation);
        sim.set_constraints(body, mask);

        let result = relocate(&mut sim, body, StrategyKind::Freeze, Vec2::new(3.0, 4.0));

        assert_eq!(result.error.distance, 0.0);
        assert!(result.error.to_string().ends_with("distance 0.000000000"));
        assert_eq!(sim.constraints(body), mask);
        assert_eq!(sim.velocity(body), Vec2::zeros());
    }

    #[test]
    fn kinematic_move_leaves_at_most_a_tiny_residual() {
        let (mut sim, body) = world(Vec2::zeros());
        let result = relocate(
            &mut sim,
            body,
            StrategyKind::KinematicMovePosition,
            Vec2::new(3.0, 4.0),
        );

        assert!(result.error.distance < INTERPOLATION_RESIDUAL_EPS);
        assert!(!sim.is_kinematic(body));
        assert!(sim.is_collision_enabled(body));
        assert_eq!(sim.velocity(body), Vec2::zeros());
    }

    #[test]
    fn velocity_driven_strategies_arrive_without_interference() {
        for kind in [StrategyKind::Velocity, StrategyKind::DynamicMovePosition] {
            let (mut sim, body) = world(Vec2::zeros());
            let result = relocate(&mut sim, body, kind, Vec2::new(3.0, 4.0));
            assert!(result.error.distance < 1.0e-4, "{kind}: {}", result.error);
        }
    }

    #[test]
    fn every_strategy_restores_body_state() {
        for kind in StrategyKind::ALL {
            let (mut sim, body) = world(Vec2::zeros());
            sim.set_constraints(body, Constraints::NONE.with(LockedAxis::Rotation));
            let before = BodyFlags::capture(&sim, body);

            relocate(&mut sim, body, kind, Vec2::new(-2.0, 1.5));

            assert_eq!(BodyFlags::capture(&sim, body), before, "{kind}");
            assert_eq!(sim.velocity(body), Vec2::zeros(), "{kind}");
        }
    }
}
