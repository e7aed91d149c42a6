//! Debug drawing of the scene with gizmos.

use bevy::prelude::*;
use relocate::{ColliderShapeDef, Phase, Simulation};

use crate::{
    physics::{Mover, Physics, Scene},
    relocation::{LastTarget, Sequencer},
};

/// Screen pixels per simulation meter.
const PIXELS_PER_METER: f32 = 48.0;

const OBSTACLE_COLOR: Color = Color::srgb(0.45, 0.5, 0.55);
const TARGET_COLOR: Color = Color::srgb(0.95, 0.75, 0.2);
const IDLE_COLOR: Color = Color::srgb(0.3, 0.8, 0.4);
const BUSY_COLOR: Color = Color::srgb(0.9, 0.3, 0.3);

pub(super) fn plugin(app: &mut App) {
    app.add_systems(Update, (draw_obstacles, draw_mover));
}

fn to_screen(p: relocate::Vec2) -> Vec2 {
    Vec2::new(p.x, p.y) * PIXELS_PER_METER
}

fn draw_obstacles(mut gizmos: Gizmos, scene: Res<Scene>) {
    for obstacle in &scene.obstacles {
        let iso = Isometry2d::new(
            to_screen(obstacle.translation),
            Rot2::radians(obstacle.rotation),
        );
        match obstacle.shape {
            ColliderShapeDef::Ball { radius } => {
                gizmos.circle_2d(iso, radius * PIXELS_PER_METER, OBSTACLE_COLOR);
            }
            ColliderShapeDef::Cuboid { half_extents } => {
                gizmos.rect_2d(iso, to_screen(half_extents) * 2.0, OBSTACLE_COLOR);
            }
            ColliderShapeDef::CapsuleY {
                radius,
                half_height,
            } => {
                let capsule = Capsule2d::new(
                    radius * PIXELS_PER_METER,
                    half_height * 2.0 * PIXELS_PER_METER,
                );
                gizmos.primitive_2d(&capsule, iso, OBSTACLE_COLOR);
            }
        }
    }
}

fn draw_mover(
    mut gizmos: Gizmos,
    physics: Res<Physics>,
    mover: Option<Res<Mover>>,
    sequencer: Res<Sequencer>,
    last_target: Res<LastTarget>,
) {
    let Some(mover) = mover else {
        return;
    };

    let color = match sequencer.0.phase() {
        Phase::Idle => IDLE_COLOR,
        Phase::Armed { .. } | Phase::Settling { .. } => BUSY_COLOR,
    };
    let position = to_screen(physics.0.position(mover.0));
    gizmos.circle_2d(
        Isometry2d::from_translation(position),
        relocate::BODY_RADIUS * PIXELS_PER_METER,
        color,
    );

    if let Some(target) = last_target.0 {
        gizmos.cross_2d(
            Isometry2d::from_translation(to_screen(target)),
            relocate::BODY_RADIUS * PIXELS_PER_METER,
            TARGET_COLOR,
        );
    }
}
