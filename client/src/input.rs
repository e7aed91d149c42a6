use bevy::prelude::*;
use leafwing_input_manager::prelude::*;

#[derive(Reflect, Actionlike, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InputAction {
    /// Sample a new target and arm the sequencer.
    Retarget,
    /// Switch to the next relocation strategy.
    NextStrategy,
    /// Run every strategy against the current scene and log the comparison.
    Compare,
}

pub(super) fn plugin(app: &mut App) {
    app.add_plugins(InputManagerPlugin::<InputAction>::default());

    app.register_type::<InputAction>();

    let mut input_map = InputMap::<InputAction>::default();
    input_map.insert(InputAction::Retarget, KeyCode::Space);
    input_map.insert(InputAction::NextStrategy, KeyCode::Tab);
    input_map.insert(InputAction::Compare, KeyCode::KeyC);
    app.insert_resource(input_map);
    app.insert_resource(ActionState::<InputAction>::default());
}
