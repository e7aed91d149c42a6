//! Side-by-side strategy trials.
//!
//! A trial builds a fresh Rapier world from a [`TrialScene`], runs one full relocation cycle
//! with a single strategy, then advances one more step so contacts created by the final
//! position get a chance to register. Every strategy sees an identical world.

use std::fmt;

use crate::{
    constants::{BODY_RADIUS, FIXED_STEP_SECONDS},
    error::ConfigResult,
    rapier_world::{BodyDef, ObstacleDef, RapierSimulation, WorldSettings},
    sequencer::{RelocationReport, SequencerConfig, TickSequencer},
    simulation::{BodyFlags, Simulation, Vec2},
    strategy::StrategyKind,
};

#[derive(Clone, Debug)]
pub struct TrialScene {
    pub start: Vec2,
    pub target: Vec2,
    pub settings: WorldSettings,
    pub body_radius: f32,
    pub obstacles: Vec<ObstacleDef>,
}

impl TrialScene {
    /// Empty weightless world at the default fixed step.
    pub fn open(start: Vec2, target: Vec2) -> Self {
        Self {
            start,
            target,
            settings: WorldSettings::weightless(FIXED_STEP_SECONDS),
            body_radius: BODY_RADIUS,
            obstacles: Vec::new(),
        }
    }

    pub fn with_obstacle(mut self, obstacle: ObstacleDef) -> Self {
        self.obstacles.push(obstacle);
        self
    }

    pub fn with_settings(mut self, settings: WorldSettings) -> Self {
        self.settings = settings;
        self
    }
}

#[derive(Clone, Copy, Debug)]
pub struct TrialOutcome {
    pub report: RelocationReport,
    /// Collision start events involving the relocated body, over the whole trial.
    pub collisions: usize,
    pub before: BodyFlags,
    pub after: BodyFlags,
    pub final_velocity: Vec2,
}

impl TrialOutcome {
    pub fn strategy(&self) -> StrategyKind {
        self.report.strategy
    }

    /// Flags match their pre-apply values and the body was left at rest.
    pub fn restored(&self) -> bool {
        self.before == self.after && self.final_velocity == Vec2::zeros()
    }
}

impl fmt::Display for TrialOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<24} {:<11} distance {:.9}  collisions {}  apply {:?}  settle {:?}",
            self.report.strategy.name(),
            self.report.error.accuracy.to_string(),
            self.report.error.distance,
            self.collisions,
            self.report.apply_time,
            self.report.settle_time,
        )
    }
}

pub fn run_trial(kind: StrategyKind, scene: &TrialScene) -> ConfigResult<TrialOutcome> {
    let mut sim = RapierSimulation::new(scene.settings)?;
    for obstacle in &scene.obstacles {
        sim.add_obstacle(*obstacle);
    }
    let body = sim.add_body(BodyDef::ball(scene.start, scene.body_radius));
    let before = BodyFlags::capture(&sim, body);

    let mut sequencer = TickSequencer::<RapierSimulation>::new(SequencerConfig::new(body, kind));
    sequencer.arm(&sim, scene.target)?;
    // Settling ends the cycle before the step integrates, so the snapshot below is the
    // state the strategy left behind.
    let report = loop {
        match sequencer.on_simulation_step(&mut sim) {
            Some(report) => break report,
            None => sim.step(),
        }
    };
    let final_velocity = sim.velocity(body);
    let after = BodyFlags::capture(&sim, body);

    // Contacts at the settled position only show up once the narrow phase runs again.
    sim.step();

    Ok(TrialOutcome {
        report,
        collisions: sim.collisions_involving(body),
        before,
        after,
        final_velocity,
    })
}

/// Run every strategy against `scene`, in [`StrategyKind::ALL`] order.
pub fn compare_all(scene: &TrialScene) -> ConfigResult<Vec<TrialOutcome>> {
    let outcomes = StrategyKind::ALL
        .iter()
        .map(|kind| run_trial(*kind, scene))
        .collect::<ConfigResult<Vec<_>>>()?;

    for outcome in &outcomes {
        log::info!(target: "relocate::trial", "{outcome}");
    }
    Ok(outcomes)
}
