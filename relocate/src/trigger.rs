//! Random retargeting.
//!
//! On each external event a new target is drawn uniformly from a disk around a fixed
//! origin and handed to the sequencer.

use std::f32::consts::TAU;

use rand::{Rng, SeedableRng, rngs::SmallRng};

use crate::{
    constants::TARGET_RADIUS,
    error::ConfigResult,
    sequencer::TickSequencer,
    simulation::{Simulation, Vec2},
};

pub struct TargetTrigger {
    origin: Vec2,
    radius: f32,
    rng: SmallRng,
}

impl TargetTrigger {
    pub fn new(origin: Vec2, radius: f32) -> Self {
        Self {
            origin,
            radius,
            rng: SmallRng::from_entropy(),
        }
    }

    /// Deterministic trigger for reproducible runs.
    pub fn seeded(origin: Vec2, radius: f32, seed: u64) -> Self {
        Self {
            origin,
            radius,
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Uniform sample inside the disk. The square root keeps the density even across radii.
    pub fn sample(&mut self) -> Vec2 {
        let r = self.radius * self.rng.gen_range(0.0f32..=1.0).sqrt();
        let theta = self.rng.gen_range(0.0..TAU);
        self.origin + Vec2::new(r * theta.cos(), r * theta.sin())
    }

    /// Draw a new target and arm `sequencer` with it.
    pub fn fire<S: Simulation>(
        &mut self,
        sequencer: &mut TickSequencer<S>,
        sim: &S,
    ) -> ConfigResult<Vec2> {
        let target = self.sample();
        sequencer.arm(sim, target)?;
        Ok(target)
    }
}

impl Default for TargetTrigger {
    fn default() -> Self {
        Self::new(Vec2::zeros(), TARGET_RADIUS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::ConfigError,
        sequencer::{Phase, SequencerConfig},
        simulation::fake::{FakeBody, FakeSimulation},
        strategy::StrategyKind,
    };

    #[test]
    fn samples_stay_inside_the_disk() {
        let origin = Vec2::new(10.0, -3.0);
        let mut trigger = TargetTrigger::seeded(origin, 2.5, 7);
        for _ in 0..1000 {
            let p = trigger.sample();
            assert!((p - origin).norm() <= 2.5 + 1.0e-5);
        }
    }

    #[test]
    fn same_seed_same_targets() {
        let mut a = TargetTrigger::seeded(Vec2::zeros(), 5.0, 42);
        let mut b = TargetTrigger::seeded(Vec2::zeros(), 5.0, 42);
        for _ in 0..10 {
            assert_eq!(a.sample(), b.sample());
        }
    }

    #[test]
    fn fire_arms_the_sequencer() {
        let sim = FakeSimulation::new(Vec2::zeros(), 0.02);
        let config = SequencerConfig::new(FakeBody, StrategyKind::Freeze);
        let mut seq = TickSequencer::<FakeSimulation>::new(config);
        let mut trigger = TargetTrigger::seeded(Vec2::zeros(), 5.0, 1);

        let target = trigger.fire(&mut seq, &sim).unwrap();
        assert_eq!(*seq.phase(), Phase::Armed { target });
    }

    #[test]
    fn fire_surfaces_configuration_errors() {
        let sim = FakeSimulation::new(Vec2::zeros(), 0.02);
        let mut seq = TickSequencer::<FakeSimulation>::new(SequencerConfig::default());
        let mut trigger = TargetTrigger::seeded(Vec2::zeros(), 5.0, 1);

        assert_eq!(trigger.fire(&mut seq, &sim), Err(ConfigError::MissingBody));
    }
}
