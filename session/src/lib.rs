mod systems;

pub use systems::publish;

use {
    bevy::prelude::*,
    session_resources::{GameSession, SessionResourcesPlugin},
    states::GameState,
    system_schedule::GameSchedule,
    systems::*,
};

/// Routes session requests into [`GameSession`] and broadcasts what changed.
pub struct SessionPlugin;

impl Plugin for SessionPlugin {
    fn build(&self, app: &mut App) {
        if !app.is_plugin_added::<SessionResourcesPlugin>() {
            app.add_plugins(SessionResourcesPlugin);
        }

        app.init_state::<GameState>()
            .add_systems(
                Update,
                (
                    advance_clock.in_set(GameSchedule::FrameStart),
                    (mirror_game_state, apply_time_scale)
                        .in_set(GameSchedule::FrameEnd)
                        .run_if(resource_changed::<GameSession>),
                ),
            )
            // Lifecycle requests
            .add_observer(on_start_new_game)
            .add_observer(on_load_complete)
            .add_observer(on_pause_game)
            .add_observer(on_resume_game)
            .add_observer(on_toggle_pause)
            .add_observer(on_return_to_main_menu)
            .add_observer(on_restart_game)
            .add_observer(on_quit_game)
            .add_observer(on_begin_cutscene)
            .add_observer(on_end_cutscene)
            // Progression requests
            .add_observer(on_collect_puzzle)
            .add_observer(on_start_sequence_puzzle)
            .add_observer(on_input_sequence_token)
            .add_observer(on_player_detected)
            .add_observer(on_boss_defeated);
    }
}
