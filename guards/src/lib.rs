mod systems;

pub use systems::{CaughtRecovery, ResetGuard};

use {
    bevy::prelude::*,
    guard_components::GuardComponentsPlugin,
    navigation::steer_agents,
    session_resources::simulating,
    system_schedule::GameSchedule,
    systems::*,
};

pub struct GuardsPlugin;

impl Plugin for GuardsPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(GuardComponentsPlugin)
            .add_systems(
                Update,
                (recover_from_catch, patrol_guards, detect_player)
                    .chain()
                    .after(steer_agents)
                    .in_set(GameSchedule::PerformAction)
                    .run_if(simulating),
            )
            .add_observer(initialize_guard)
            .add_observer(on_guard_contact)
            .add_observer(on_reset_guard)
            .add_observer(on_game_reset);
    }
}
