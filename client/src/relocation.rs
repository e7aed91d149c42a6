//! Glue between input, the tick sequencer and the physics world.

use bevy::prelude::*;
use leafwing_input_manager::prelude::ActionState;
use relocate::{
    RapierSimulation, RelocationReport, SequencerConfig, Simulation, StrategyKind, TargetTrigger,
    TickSequencer, TrialScene, compare_all,
};

use crate::{
    input::InputAction,
    physics::{Mover, Physics, Scene},
};

/// Strategy active at startup.
pub const DEFAULT_STRATEGY: StrategyKind = StrategyKind::Freeze;

#[derive(Resource)]
pub struct Sequencer(pub TickSequencer<RapierSimulation>);

#[derive(Resource)]
pub struct Trigger(pub TargetTrigger);

#[derive(Resource, Debug, Default)]
pub struct LastTarget(pub Option<relocate::Vec2>);

#[derive(Resource, Debug, Default)]
pub struct LastReport(pub Option<RelocationReport>);

pub(super) fn plugin(app: &mut App) {
    // A missing mover surfaces as a configuration error the first time a target is armed.
    let body = app.world().get_resource::<Mover>().map(|m| m.0);
    let sequencer = TickSequencer::new(SequencerConfig {
        body,
        strategy: Some(DEFAULT_STRATEGY),
    });

    app.insert_resource(Sequencer(sequencer));
    app.insert_resource(Trigger(TargetTrigger::default()));
    app.init_resource::<LastTarget>();
    app.init_resource::<LastReport>();

    app.add_systems(Update, (retarget, next_strategy, compare));
    app.add_systems(FixedUpdate, (relocation_step, log_collisions).chain());
}

fn retarget(
    actions: Res<ActionState<InputAction>>,
    mut sequencer: ResMut<Sequencer>,
    mut trigger: ResMut<Trigger>,
    mut last_target: ResMut<LastTarget>,
    physics: Res<Physics>,
) {
    if !actions.just_pressed(&InputAction::Retarget) {
        return;
    }
    match trigger.0.fire(&mut sequencer.0, &physics.0) {
        Ok(target) => {
            info!("New target ({:.3}, {:.3})", target.x, target.y);
            last_target.0 = Some(target);
        }
        Err(err) => error!("Cannot relocate: {err}"),
    }
}

fn next_strategy(actions: Res<ActionState<InputAction>>, mut sequencer: ResMut<Sequencer>) {
    if !actions.just_pressed(&InputAction::NextStrategy) {
        return;
    }
    let next = sequencer.0.selected().unwrap_or_default().next();
    sequencer.0.select(next);
    info!("Strategy: {next}");
}

fn compare(
    actions: Res<ActionState<InputAction>>,
    mut trigger: ResMut<Trigger>,
    last_target: Res<LastTarget>,
    physics: Res<Physics>,
    mover: Option<Res<Mover>>,
    scene: Res<Scene>,
) {
    if !actions.just_pressed(&InputAction::Compare) {
        return;
    }
    let Some(mover) = mover else {
        warn!("No body to compare strategies with");
        return;
    };

    let start = physics.0.position(mover.0);
    let target = last_target.0.unwrap_or_else(|| trigger.0.sample());
    let trial = TrialScene {
        obstacles: scene.obstacles.clone(),
        ..TrialScene::open(start, target).with_settings(scene.settings)
    };

    match compare_all(&trial) {
        Ok(outcomes) => {
            let unrestored = outcomes.iter().filter(|o| !o.restored()).count();
            if unrestored > 0 {
                warn!("{unrestored} strategies left the body altered");
            }
        }
        Err(err) => error!("Comparison failed: {err}"),
    }
}

fn relocation_step(
    mut sequencer: ResMut<Sequencer>,
    mut physics: ResMut<Physics>,
    mut last_report: ResMut<LastReport>,
) {
    if let Some(report) = sequencer.0.tick(&mut physics.0) {
        info!(
            "Cycle {} [{}] {} (apply {:?}, settle {:?})",
            report.cycle,
            report.strategy,
            report.error.accuracy,
            report.apply_time,
            report.settle_time
        );
        last_report.0 = Some(report);
    }
}

fn log_collisions(mut physics: ResMut<Physics>) {
    let started = physics.0.drain_collisions();
    if !started.is_empty() {
        debug!("{} collision(s) started this step", started.len());
    }
}
