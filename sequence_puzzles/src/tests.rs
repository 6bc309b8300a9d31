use {
    crate::SequencePuzzlesPlugin,
    bevy::{prelude::*, state::app::StatesPlugin, time::TimeUpdateStrategy},
    puzzle_components::{Activator, ActivatorLook, ChestLid, PuzzleItem, SequenceKind, SequencePuzzle},
    session::SessionPlugin,
    session_events::{Interact, LoadComplete, PauseGame, ShowInteractionPrompt, StartNewGame},
    session_resources::GameSession,
    shared_components::Interactable,
    states::GameState,
    std::time::Duration,
    system_schedule::SystemSchedulePlugin,
};

#[derive(Resource, Default)]
struct Prompts(Vec<String>);

struct Fixture {
    chest: Entity,
    activators: Vec<Entity>,
}

fn app() -> App {
    let mut app = App::new();
    app.add_plugins((MinimalPlugins, StatesPlugin, SystemSchedulePlugin))
        .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_millis(100)))
        .add_plugins((SessionPlugin, SequencePuzzlesPlugin))
        .init_resource::<Prompts>()
        .add_observer(|trigger: On<ShowInteractionPrompt>, mut prompts: ResMut<Prompts>| {
            prompts.0.push(trigger.event().text.clone());
        });
    app.update();
    app.world_mut().trigger(StartNewGame);
    app.world_mut().trigger(LoadComplete);
    app.update();
    app
}

fn spawn_rune_chest(app: &mut App) -> Fixture {
    let expected: Vec<String> = ["1", "2", "3"].iter().map(|t| t.to_string()).collect();
    let chest = app
        .world_mut()
        .spawn((
            SequencePuzzle::new(SequenceKind::Rune, expected, Some(7)),
            ChestLid::default(),
            Transform::from_xyz(4.0, 0.0, 4.0),
        ))
        .id();
    let activators = ["3", "1", "2"]
        .iter()
        .map(|token| {
            app.world_mut()
                .spawn((
                    Activator::new(chest, *token),
                    Interactable::new(SequenceKind::Rune.activator_prompt(token)),
                ))
                .id()
        })
        .collect();
    Fixture { chest, activators }
}

fn activate(app: &mut App, target: Entity) {
    app.world_mut().trigger(Interact { target });
    app.update();
}

fn state(app: &App) -> GameState {
    app.world().resource::<GameSession>().state()
}

fn look(app: &App, activator: Entity) -> ActivatorLook {
    app.world().get::<Activator>(activator).unwrap().look
}

fn interactable(app: &App, activator: Entity) -> bool {
    app.world()
        .get::<Interactable>(activator)
        .unwrap()
        .can_interact
}

#[test]
fn test_correct_order_opens_chest_and_spawns_reward() {
    let mut app = app();
    let Fixture { chest, activators } = spawn_rune_chest(&mut app);
    let [three, one, two] = activators[..] else {
        unreachable!()
    };

    activate(&mut app, one);
    assert_eq!(state(&app), GameState::PuzzleSolving);
    assert_eq!(look(&app, one), ActivatorLook::Lit);
    assert!(!interactable(&app, one));

    activate(&mut app, two);
    activate(&mut app, three);
    assert_eq!(state(&app), GameState::Playing);
    assert!(app.world().get::<SequencePuzzle>(chest).unwrap().solved);

    for _ in 0..7 {
        app.update();
    }
    assert_eq!(app.world().get::<ChestLid>(chest).unwrap().angle, -110.0);

    let mut items = app.world_mut().query::<(&PuzzleItem, &Transform)>();
    let (item, transform) = items.single(app.world()).unwrap();
    assert_eq!(item.id, 7);
    assert_eq!(transform.translation, Vec3::new(4.0, 1.5, 4.0));

    // solved runes stay lit
    assert!(
        activators
            .iter()
            .all(|activator| look(&app, *activator) == ActivatorLook::Lit)
    );
}

#[test]
fn test_wrong_order_flashes_and_resets_every_activator() {
    let mut app = app();
    let Fixture { activators, .. } = spawn_rune_chest(&mut app);
    let [three, one, _two] = activators[..] else {
        unreachable!()
    };

    activate(&mut app, one);
    activate(&mut app, three);
    assert_eq!(state(&app), GameState::Playing);
    assert!(activators.iter().all(|a| !interactable(&app, *a)));

    // 0.2 s failure delay
    for _ in 0..3 {
        app.update();
    }
    assert!(
        activators
            .iter()
            .all(|a| look(&app, *a) == ActivatorLook::Error)
    );

    // 0.5 s error flash
    for _ in 0..6 {
        app.update();
    }
    for activator in &activators {
        assert_eq!(look(&app, *activator), ActivatorLook::Idle);
        assert!(interactable(&app, *activator));
    }
    assert_eq!(
        app.world().get::<Interactable>(three).unwrap().prompt,
        "Activate Rune [3]"
    );
}

#[test]
fn test_pause_abandons_attempt_and_resets_activators() {
    let mut app = app();
    let Fixture { activators, .. } = spawn_rune_chest(&mut app);
    let one = activators[1];

    activate(&mut app, one);
    app.world_mut().trigger(PauseGame);
    app.update();

    assert_eq!(state(&app), GameState::Paused);
    assert_eq!(look(&app, one), ActivatorLook::Idle);
    assert!(interactable(&app, one));
}

#[test]
fn test_activators_ignored_while_paused() {
    let mut app = app();
    let Fixture { activators, .. } = spawn_rune_chest(&mut app);
    app.world_mut().trigger(PauseGame);
    app.update();

    activate(&mut app, activators[0]);
    assert_eq!(look(&app, activators[0]), ActivatorLook::Idle);
    assert_eq!(state(&app), GameState::Paused);
}

#[test]
fn test_chest_prompt_reflects_status() {
    let mut app = app();
    let Fixture { chest, activators } = spawn_rune_chest(&mut app);

    activate(&mut app, chest);
    for activator in [activators[1], activators[2], activators[0]] {
        activate(&mut app, activator);
    }
    activate(&mut app, chest);

    let prompts = &app.world().resource::<Prompts>().0;
    assert_eq!(
        prompts,
        &vec![
            "Sealed by magic... activate the runes in the right order".to_string(),
            "The chest is already open".to_string(),
        ]
    );
}

#[test]
fn test_activator_of_empty_puzzle_stays_interactable() {
    let mut app = app();
    let chest = app
        .world_mut()
        .spawn(SequencePuzzle::new(SequenceKind::Torch, Vec::new(), None))
        .id();
    let torch = app
        .world_mut()
        .spawn((
            Activator::new(chest, "A"),
            Interactable::new(SequenceKind::Torch.activator_prompt("A")),
        ))
        .id();

    activate(&mut app, torch);
    activate(&mut app, torch);

    assert_eq!(state(&app), GameState::Playing);
    assert_eq!(look(&app, torch), ActivatorLook::Idle);
    assert!(interactable(&app, torch));
}
