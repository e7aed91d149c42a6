//! Two-phase arm/settle protocol.
//!
//! A relocation cycle spans two fixed steps:
//!
//! ```text
//!   arm(target)          step N                      step N+1
//!  Idle ──────▶ Armed ──────────▶ Settling ───────────────────▶ Idle
//!                      apply()              settle(): report + restore
//! ```
//!
//! [`TickSequencer::on_simulation_step`] must be called once per fixed step, before the
//! simulation integrates that step. A position write only shows up in contact state one
//! full step later, so the error is never measured in the same step as the mutation.

use std::time::{Duration, Instant};

use crate::{
    error::{ConfigError, ConfigResult, validate_step},
    report::{ErrorReport, report},
    simulation::{Simulation, Vec2},
    strategy::{RelocationStrategy, Scratch, StrategyKind},
};

/// Where the current cycle is.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Phase {
    #[default]
    Idle,
    /// Waiting for the next step to apply the strategy.
    Armed { target: Vec2 },
    /// Applied; waiting one step to measure and restore.
    Settling {
        target: Vec2,
        scratch: Scratch,
        apply_time: Duration,
    },
}

/// Static configuration of a [`TickSequencer`].
#[derive(Clone, Copy, Debug)]
pub struct SequencerConfig<B> {
    pub body: Option<B>,
    pub strategy: Option<StrategyKind>,
}

impl<B> Default for SequencerConfig<B> {
    fn default() -> Self {
        Self {
            body: None,
            strategy: None,
        }
    }
}

impl<B> SequencerConfig<B> {
    pub fn new(body: B, strategy: StrategyKind) -> Self {
        Self {
            body: Some(body),
            strategy: Some(strategy),
        }
    }
}

/// Outcome of one completed arm/settle cycle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RelocationReport {
    /// Sequence number of the cycle, starting at 1.
    pub cycle: u64,
    pub strategy: StrategyKind,
    pub error: ErrorReport,
    /// Wall-clock time spent inside `apply`.
    pub apply_time: Duration,
    /// Wall-clock time spent measuring and inside `settle`.
    pub settle_time: Duration,
}

/// Drives one body through relocation cycles, one fixed step at a time.
pub struct TickSequencer<S: Simulation> {
    body: Option<S::Body>,
    selected: Option<StrategyKind>,
    /// The strategy that applied the in-flight cycle, or the last one used.
    active: Option<Box<dyn RelocationStrategy<S>>>,
    phase: Phase,
    /// Target armed while a cycle was settling. Latest wins.
    queued: Option<Vec2>,
    cycles: u64,
}

impl<S: Simulation> TickSequencer<S> {
    pub fn new(config: SequencerConfig<S::Body>) -> Self {
        Self {
            body: config.body,
            selected: config.strategy,
            active: None,
            phase: Phase::Idle,
            queued: None,
            cycles: 0,
        }
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.phase, Phase::Idle) && self.queued.is_none()
    }

    pub fn queued(&self) -> Option<Vec2> {
        self.queued
    }

    pub fn body(&self) -> Option<S::Body> {
        self.body
    }

    pub fn selected(&self) -> Option<StrategyKind> {
        self.selected
    }

    /// Choose the strategy for the next cycle.
    ///
    /// A cycle that is already settling finishes with the strategy that applied it.
    pub fn select(&mut self, kind: StrategyKind) {
        self.selected = Some(kind);
    }

    /// Request relocation of the body to `target`.
    ///
    /// - Idle: the cycle starts on the next step.
    /// - Armed: the pending target is replaced; `apply` still runs only once.
    /// - Settling: the target is queued and armed as soon as the current cycle settles.
    pub fn arm(&mut self, sim: &S, target: Vec2) -> ConfigResult<()> {
        if self.body.is_none() {
            return Err(ConfigError::MissingBody);
        }
        if self.selected.is_none() {
            return Err(ConfigError::UnsetStrategy);
        }
        validate_step(sim.fixed_step_duration())?;

        match self.phase {
            Phase::Idle => {
                log::debug!("armed relocation to ({}, {})", target.x, target.y);
                self.phase = Phase::Armed { target };
            }
            Phase::Armed { .. } => {
                log::debug!("re-armed pending relocation to ({}, {})", target.x, target.y);
                self.phase = Phase::Armed { target };
            }
            Phase::Settling { .. } => {
                log::warn!(
                    "relocation to ({}, {}) queued until the current cycle settles",
                    target.x,
                    target.y
                );
                self.queued = Some(target);
            }
        }
        Ok(())
    }

    /// Advance the protocol by one fixed step. Returns a report when a cycle completes.
    pub fn on_simulation_step(&mut self, sim: &mut S) -> Option<RelocationReport> {
        let Some(body) = self.body else {
            return None;
        };

        // Early returns leave the phase untouched, so nothing armed is ever dropped.
        match self.phase {
            Phase::Idle => None,
            Phase::Armed { target } => {
                let strategy = self.strategy_for_cycle()?;
                let started = Instant::now();
                let scratch = strategy.apply(sim, body, target);
                let apply_time = started.elapsed();

                self.phase = Phase::Settling {
                    target,
                    scratch,
                    apply_time,
                };
                None
            }
            Phase::Settling {
                target,
                scratch,
                apply_time,
            } => {
                let strategy = self.active.as_deref()?;
                let started = Instant::now();
                let error = report(sim.position(body), target);
                strategy.settle(sim, body, scratch);
                let settle_time = started.elapsed();

                self.cycles += 1;
                let result = RelocationReport {
                    cycle: self.cycles,
                    strategy: strategy.kind(),
                    error,
                    apply_time,
                    settle_time,
                };
                log::debug!(
                    "cycle {} ({}) settled: apply {:?}, settle {:?}",
                    result.cycle,
                    result.strategy,
                    apply_time,
                    settle_time
                );

                self.phase = match self.queued.take() {
                    Some(next) => Phase::Armed { target: next },
                    None => Phase::Idle,
                };
                Some(result)
            }
        }
    }

    /// Run [`TickSequencer::on_simulation_step`] and then advance the simulation.
    pub fn tick(&mut self, sim: &mut S) -> Option<RelocationReport> {
        let result = self.on_simulation_step(sim);
        sim.step();
        result
    }

    /// The strategy to apply this cycle, rebuilt if the selection changed since the last one.
    fn strategy_for_cycle(&mut self) -> Option<&dyn RelocationStrategy<S>> {
        let kind = self.selected?;
        if self.active.as_ref().map(|s| s.kind()) != Some(kind) {
            self.active = Some(kind.build());
        }
        self.active.as_deref()
    }
}
