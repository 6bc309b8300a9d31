use {
    bevy::{log::LogPlugin, prelude::*},
    dungeon_core::{CorePlugin, start_run_on_startup},
    session_resources::SessionConfig,
};

const SESSION_CONFIG_PATH: &str = "assets/session.ron";

fn main() {
    let (config, config_error) = match SessionConfig::load(SESSION_CONFIG_PATH) {
        Ok(config) => (config, None),
        Err(e) => (SessionConfig::default(), Some(e.to_string())),
    };

    App::new()
        .add_plugins(
            DefaultPlugins.set(LogPlugin {
                filter: "error,session=debug,\
                    session_resources=debug,\
                    loading=trace,\
                    guards=debug,\
                    boss=debug,\
                    sequence_puzzles=debug,\
                    puzzles=debug,\
                    save_load=trace"
                    .into(),
                level: bevy::log::Level::TRACE,
                ..Default::default()
            }),
        )
        .insert_resource(config)
        .add_plugins(CorePlugin)
        .add_systems(Startup, (setup_camera, start_run_on_startup))
        .add_systems(Startup, move || {
            if let Some(error) = &config_error {
                warn!(path = SESSION_CONFIG_PATH, %error, "Using default session settings");
            }
        })
        .run();
}

fn setup_camera(mut commands: Commands) {
    commands.spawn(Camera2d);
}
