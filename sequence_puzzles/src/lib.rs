mod systems;
#[cfg(test)]
mod tests;

use {
    bevy::prelude::*,
    puzzle_components::PuzzleComponentsPlugin,
    session_resources::simulating,
    system_schedule::GameSchedule,
    systems::*,
};

/// Rune and torch puzzles: activators feed tokens to the session, chests
/// react to the verdict.
pub struct SequencePuzzlesPlugin;

impl Plugin for SequencePuzzlesPlugin {
    fn build(&self, app: &mut App) {
        if !app.is_plugin_added::<PuzzleComponentsPlugin>() {
            app.add_plugins(PuzzleComponentsPlugin);
        }

        app.add_systems(
            Update,
            (flash_after_failure, finish_error_flash, open_chests)
                .in_set(GameSchedule::PerformAction)
                .run_if(simulating),
        )
        .add_observer(on_activator_interact)
        .add_observer(on_chest_interact)
        .add_observer(on_sequence_solved)
        .add_observer(on_sequence_failed)
        .add_observer(on_sequence_abandoned);
    }
}
