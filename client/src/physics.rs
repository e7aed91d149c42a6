//! The Rapier world the relocation sequencer drives.
//!
//! The world is built once when the plugin is added. It is not stepped on its own: the
//! relocation plugin advances it from `FixedUpdate`, right after the sequencer has had its
//! turn, so every fixed step runs exactly one protocol phase followed by one physics step.

use bevy::prelude::*;
use relocate::{
    BODY_RADIUS, BodyDef, ColliderShapeDef, FIXED_STEP_SECONDS, ObstacleDef, RapierSimulation,
    SCENE_GRAVITY_Y, WorldSettings, rapier_world::rapier2d::prelude::RigidBodyHandle,
};

#[derive(Resource)]
pub struct Physics(pub RapierSimulation);

/// The body being relocated.
#[derive(Resource, Clone, Copy, Debug)]
pub struct Mover(pub RigidBodyHandle);

/// Static scene description, kept so trials can rebuild the same world.
#[derive(Resource, Clone, Debug)]
pub struct Scene {
    pub settings: WorldSettings,
    pub obstacles: Vec<ObstacleDef>,
}

pub(super) fn plugin(app: &mut App) {
    let scene = Scene {
        settings: WorldSettings {
            gravity: relocate::Vec2::new(0.0, SCENE_GRAVITY_Y),
            dt: FIXED_STEP_SECONDS,
        },
        obstacles: scene_obstacles(),
    };

    let mut sim = match RapierSimulation::new(scene.settings) {
        Ok(sim) => sim,
        Err(err) => panic!("invalid physics settings: {err}"),
    };
    for obstacle in &scene.obstacles {
        sim.add_obstacle(*obstacle);
    }
    let mover = sim.add_body(BodyDef::ball(relocate::Vec2::zeros(), BODY_RADIUS));
    info!("Physics world ready with {} obstacles", scene.obstacles.len());

    app.insert_resource(Physics(sim));
    app.insert_resource(Mover(mover));
    app.insert_resource(scene);
}

fn scene_obstacles() -> Vec<ObstacleDef> {
    vec![
        // Floor.
        ObstacleDef {
            translation: relocate::Vec2::new(0.0, -6.0),
            rotation: 0.0,
            shape: ColliderShapeDef::Cuboid {
                half_extents: relocate::Vec2::new(8.0, 0.25),
            },
        },
        ObstacleDef {
            translation: relocate::Vec2::new(1.5, 1.0),
            rotation: 0.0,
            shape: ColliderShapeDef::Ball { radius: 0.6 },
        },
        ObstacleDef {
            translation: relocate::Vec2::new(-2.0, 2.0),
            rotation: 0.4,
            shape: ColliderShapeDef::Cuboid {
                half_extents: relocate::Vec2::new(1.0, 0.2),
            },
        },
        ObstacleDef {
            translation: relocate::Vec2::new(-1.0, -3.0),
            rotation: 0.0,
            shape: ColliderShapeDef::CapsuleY {
                radius: 0.3,
                half_height: 0.8,
            },
        },
    ]
}
