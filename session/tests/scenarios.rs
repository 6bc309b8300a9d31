//! Whole-run scenarios driven purely through request events.

use {
    bevy::{prelude::*, state::app::StatesPlugin, time::TimeUpdateStrategy},
    session::SessionPlugin,
    session_events::*,
    session_resources::{GameSession, SessionConfig},
    states::GameState,
    std::time::Duration,
    system_schedule::SystemSchedulePlugin,
};

const FRAME: Duration = Duration::from_millis(100);

#[derive(Resource, Default)]
struct Recorder {
    completions: u32,
    victories: Vec<f32>,
    game_overs: Vec<GameOverReason>,
}

fn app(config: SessionConfig) -> App {
    let mut app = App::new();
    app.add_plugins((MinimalPlugins, StatesPlugin, SystemSchedulePlugin))
        .insert_resource(TimeUpdateStrategy::ManualDuration(FRAME))
        .insert_resource(config)
        .add_plugins(SessionPlugin)
        .init_resource::<Recorder>()
        .add_observer(|_trigger: On<CollectionComplete>, mut rec: ResMut<Recorder>| {
            rec.completions += 1;
        })
        .add_observer(|trigger: On<VictoryAchieved>, mut rec: ResMut<Recorder>| {
            rec.victories.push(trigger.event().elapsed);
        })
        .add_observer(|trigger: On<GameOver>, mut rec: ResMut<Recorder>| {
            rec.game_overs.push(trigger.event().reason);
        });
    app.update();
    app
}

fn start(app: &mut App) {
    app.world_mut().trigger(StartNewGame);
    app.update();
    assert_eq!(state(app), GameState::Loading);
    app.world_mut().trigger(LoadComplete);
    app.update();
    assert_eq!(state(app), GameState::Playing);
}

fn state(app: &App) -> GameState {
    app.world().resource::<GameSession>().state()
}

fn elapsed(app: &App) -> f32 {
    app.world().resource::<GameSession>().elapsed_time()
}

fn collect(app: &mut App, ids: impl IntoIterator<Item = u32>) {
    for id in ids {
        app.world_mut().trigger(CollectPuzzle { id });
    }
    app.update();
}

fn defeat_boss(app: &mut App) {
    let boss = app.world_mut().spawn_empty().id();
    app.world_mut().trigger(BossDefeated { boss });
    app.update();
}

#[test]
fn nine_pieces_then_boss_wins_with_single_celebration() {
    let mut app = app(SessionConfig::default());
    start(&mut app);

    collect(&mut app, 1..=8);
    assert_eq!(app.world().resource::<Recorder>().completions, 0);

    collect(&mut app, [9]);
    assert_eq!(state(&app), GameState::Playing);
    assert_eq!(app.world().resource::<Recorder>().completions, 1);

    // duplicates after completion do not celebrate again
    collect(&mut app, [9, 3]);
    assert_eq!(app.world().resource::<Recorder>().completions, 1);

    defeat_boss(&mut app);
    assert_eq!(state(&app), GameState::Victory);
    assert_eq!(app.world().resource::<Recorder>().victories.len(), 1);
}

#[test]
fn boss_first_then_pieces_wins_on_last_piece() {
    let mut app = app(SessionConfig::default());
    start(&mut app);

    defeat_boss(&mut app);
    assert_eq!(state(&app), GameState::Playing);

    collect(&mut app, 1..=8);
    assert_eq!(state(&app), GameState::Playing);
    collect(&mut app, [9]);
    assert_eq!(state(&app), GameState::Victory);
    assert_eq!(app.world().resource::<Recorder>().completions, 0);
}

#[test]
fn out_of_range_pieces_never_count() {
    let mut app = app(SessionConfig::default());
    start(&mut app);
    collect(&mut app, [0, 10, 42]);
    let session = app.world().resource::<GameSession>();
    assert_eq!(session.collected_count(), 0);
    assert_eq!(session.state(), GameState::Playing);
}

#[test]
fn losing_every_life_ends_the_run() {
    let mut app = app(SessionConfig::default());
    start(&mut app);
    let guard = app.world_mut().spawn_empty().id();

    for _ in 0..2 {
        app.world_mut().trigger(PlayerDetected {
            source: DetectionSource::Guard(guard),
        });
        app.update();
        assert_eq!(state(&app), GameState::Playing);
    }
    app.world_mut().trigger(PlayerDetected {
        source: DetectionSource::Guard(guard),
    });
    app.update();

    assert_eq!(state(&app), GameState::GameOver);
    assert_eq!(
        app.world().resource::<Recorder>().game_overs,
        vec![GameOverReason::TooManyDetections]
    );
}

#[test]
fn pause_freezes_the_clock() {
    let mut app = app(SessionConfig::default());
    start(&mut app);
    for _ in 0..5 {
        app.update();
    }
    let before_pause = elapsed(&app);
    assert!(before_pause > 0.0);

    app.world_mut().trigger(PauseGame);
    for _ in 0..10 {
        app.update();
    }
    assert_eq!(elapsed(&app), before_pause);

    app.world_mut().trigger(ResumeGame);
    // the frame that handles the resume request still runs on frozen time
    app.update();
    app.update();
    let resumed = elapsed(&app);
    for _ in 0..4 {
        app.update();
    }
    let expected = resumed + 4.0 * FRAME.as_secs_f32();
    assert!((elapsed(&app) - expected).abs() < 1e-4);
}

#[test]
fn running_out_of_time_is_game_over() {
    let mut app = app(SessionConfig {
        max_game_time: 1.0,
        ..default()
    });
    start(&mut app);
    for _ in 0..15 {
        app.update();
    }
    assert_eq!(state(&app), GameState::GameOver);
    assert_eq!(elapsed(&app), 1.0);
    assert_eq!(
        app.world().resource::<Recorder>().game_overs,
        vec![GameOverReason::TimeUp]
    );
}

#[test]
fn restart_after_victory_starts_clean_run() {
    let mut app = app(SessionConfig {
        total_puzzles: 1,
        ..default()
    });
    start(&mut app);
    defeat_boss(&mut app);
    collect(&mut app, [1]);
    assert_eq!(state(&app), GameState::Victory);

    app.world_mut().trigger(RestartGame);
    app.update();
    let session = app.world().resource::<GameSession>();
    assert_eq!(session.state(), GameState::Playing);
    assert_eq!(session.collected_count(), 0);
    assert!(!session.is_boss_defeated());

    app.world_mut().trigger(ReturnToMainMenu);
    app.update();
    assert_eq!(state(&app), GameState::MainMenu);
}
