use {
    audio::GameAudioPlugin,
    bevy::prelude::*,
    boss::BossPlugin,
    collision::CollisionPlugin,
    guards::GuardsPlugin,
    hud::HudPlugin,
    loading::LoadingPlugin,
    navigation::NavigationPlugin,
    puzzles::PuzzlesPlugin,
    save_load::SaveLoadPlugin,
    sequence_puzzles::SequencePuzzlesPlugin,
    session::SessionPlugin,
    session_events::{SessionEventsPlugin, StartNewGame},
    shared_components::SharedComponentsPlugin,
    system_schedule::SystemSchedulePlugin,
};

/// Everything the game needs on top of Bevy's own plugins. Headless: no
/// rendering, menus or input.
pub struct CorePlugin;

impl Plugin for CorePlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins((
            SystemSchedulePlugin,
            SessionEventsPlugin,
            SharedComponentsPlugin,
            SessionPlugin,
        ))
        .add_plugins((
            NavigationPlugin,
            CollisionPlugin,
            GuardsPlugin,
            BossPlugin,
            PuzzlesPlugin,
            SequencePuzzlesPlugin,
        ))
        .add_plugins((GameAudioPlugin, SaveLoadPlugin, LoadingPlugin, HudPlugin));
    }
}

/// Starts a run right away. Stands in for the main menu's start button.
pub fn start_run_on_startup(mut commands: Commands) {
    info!("Starting a new run");
    commands.trigger(StartNewGame);
}
