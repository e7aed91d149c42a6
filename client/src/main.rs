// Support configuring Bevy lints within code.
#![cfg_attr(bevy_lint, feature(register_tool), register_tool(bevy))]
// Disable console on Windows for non-dev builds.
#![cfg_attr(not(feature = "dev"), windows_subsystem = "windows")]

#[cfg(feature = "dev_native")]
mod debug_tools;

mod camera;
mod input;
mod physics;
mod relocation;
mod view;

use bevy::prelude::*;
use relocate::FIXED_STEP;

fn main() -> AppExit {
    App::new().add_plugins(AppPlugin).run()
}

pub struct AppPlugin;
impl Plugin for AppPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Window {
                title: "Relocation strategies".to_string(),
                fit_canvas_to_parent: true,
                ..default()
            }
            .into(),
            ..default()
        }));

        // One relocation phase per fixed step; keep the physics step and the schedule in sync.
        app.insert_resource(Time::<Fixed>::from_duration(FIXED_STEP));

        app.add_plugins((
            physics::plugin,
            relocation::plugin,
            input::plugin,
            camera::plugin,
            view::plugin,
        ));

        #[cfg(feature = "dev_native")]
        app.add_plugins(debug_tools::plugin);
    }
}
