//! Level lifecycle: every run starts from a freshly spawned copy of the
//! level file, and every reset despawns it.

use {
    bevy::{asset::LoadState, prelude::*},
    boss_components::{Boss, BossCore},
    collision::{Collider, CollisionLayers},
    guard_components::GuardPost,
    level_assets::{LevelAssetsPlugin, LevelDefinition},
    puzzle_components::{Activator, ChestLid, PuzzleZone, SequencePuzzle, puzzle_item},
    session_events::{GameReset, GameStarted, LoadComplete, ReturnToMainMenu},
    session_resources::GameSession,
    shared_components::{Interactable, LevelEntity, Player},
    states::GameState,
    system_schedule::GameSchedule,
};

pub const PLAYER_RADIUS: f32 = 0.4;
pub const GUARD_RADIUS: f32 = 0.4;
const PICKUP_RADIUS: f32 = 0.3;
const CHEST_HALF_EXTENTS: Vec3 = Vec3::new(0.6, 0.4, 0.4);

pub struct LoadingPlugin;

impl Plugin for LoadingPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(LevelAssetsPlugin)
            .init_resource::<LevelSource>()
            .init_resource::<LevelStatus>()
            .add_systems(Startup, request_level)
            .add_systems(
                Update,
                spawn_when_ready
                    .in_set(GameSchedule::FrameStart)
                    .run_if(resource_equals(LevelStatus::AwaitingAsset)),
            )
            .add_observer(on_game_reset)
            .add_observer(on_game_started);
    }
}

/// Asset path of the level, relative to the asset folder.
#[derive(Resource, Debug, Clone)]
pub struct LevelSource(pub String);

impl Default for LevelSource {
    fn default() -> Self {
        Self("levels/dungeon.level.ron".to_string())
    }
}

#[derive(Resource, Debug)]
pub struct LevelHandle(pub Handle<LevelDefinition>);

#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LevelStatus {
    /// No level in the world.
    #[default]
    Idle,
    /// A run started; spawn as soon as the asset is available.
    AwaitingAsset,
    Spawned,
}

fn request_level(
    handle: Option<Res<LevelHandle>>,
    source: Res<LevelSource>,
    asset_server: Res<AssetServer>,
    mut commands: Commands,
) {
    if handle.is_some() {
        return;
    }
    info!(path = %source.0, "started loading level");
    commands.insert_resource(LevelHandle(asset_server.load(source.0.clone())));
}

pub fn on_game_reset(
    _trigger: On<GameReset>,
    level: Query<Entity, With<LevelEntity>>,
    mut status: ResMut<LevelStatus>,
    mut commands: Commands,
) {
    let mut despawned = 0;
    for entity in level.iter() {
        commands.entity(entity).despawn();
        despawned += 1;
    }
    debug!(despawned, "Level cleared");
    *status = LevelStatus::Idle;
}

pub fn on_game_started(_trigger: On<GameStarted>, mut status: ResMut<LevelStatus>) {
    *status = LevelStatus::AwaitingAsset;
}

fn spawn_when_ready(
    handle: Option<Res<LevelHandle>>,
    levels: Res<Assets<LevelDefinition>>,
    asset_server: Res<AssetServer>,
    session: Res<GameSession>,
    mut status: ResMut<LevelStatus>,
    mut commands: Commands,
) {
    let Some(handle) = handle else {
        return;
    };
    let Some(level) = levels.get(&handle.0) else {
        if let Some(LoadState::Failed(error)) = asset_server.get_load_state(handle.0.id()) {
            error!(%error, "Level failed to load, returning to the main menu");
            *status = LevelStatus::Idle;
            commands.trigger(ReturnToMainMenu);
        }
        return;
    };

    if let Err(error) = level.validate(session.total_puzzles()) {
        warn!(%error, "Level does not match the session settings");
    }
    spawn_level(&mut commands, level);
    *status = LevelStatus::Spawned;

    // A restart goes straight to Playing and never waits on us.
    if session.state() == GameState::Loading {
        commands.trigger(LoadComplete);
    }
}

fn at(position: [f32; 3]) -> Transform {
    Transform::from_translation(Vec3::from_array(position))
}

/// Spawns every entity of `level`. Everything spawned carries [`LevelEntity`].
pub fn spawn_level(commands: &mut Commands, level: &LevelDefinition) {
    commands.spawn((
        Player,
        at(level.player_spawn),
        Collider::sphere(PLAYER_RADIUS, CollisionLayers::PLAYER),
    ));

    for wall in &level.walls {
        commands.spawn((
            LevelEntity,
            at(wall.center),
            Collider::cuboid(Vec3::from_array(wall.half_extents), CollisionLayers::WALL),
        ));
    }

    for guard in &level.guards {
        commands.spawn((
            GuardPost {
                waypoints: guard.waypoints.iter().copied().map(Vec3::from_array).collect(),
                settings: guard.settings,
            },
            at(guard.position),
            Collider::sphere(GUARD_RADIUS, CollisionLayers::GUARD),
        ));
    }

    for item in &level.puzzle_items {
        commands.spawn((
            puzzle_item(item.id, Vec3::from_array(item.position)),
            Collider::sphere(PICKUP_RADIUS, CollisionLayers::INTERACTABLE),
        ));
    }

    for spec in &level.sequence_puzzles {
        let puzzle = SequencePuzzle::new(spec.kind, spec.expected.clone(), spec.reward);
        let prompt = puzzle.status_prompt();
        let chest = commands
            .spawn((
                puzzle,
                ChestLid::default(),
                Interactable::new(prompt),
                at(spec.position),
                Collider::cuboid(CHEST_HALF_EXTENTS, CollisionLayers::INTERACTABLE),
            ))
            .id();
        for activator in &spec.activators {
            commands.spawn((
                Activator::new(chest, activator.token.clone()),
                Interactable::new(spec.kind.activator_prompt(&activator.token)),
                at(activator.position),
                Collider::sphere(PICKUP_RADIUS, CollisionLayers::INTERACTABLE),
            ));
        }
    }

    for zone in &level.zones {
        commands.spawn(PuzzleZone {
            name: zone.name.clone(),
            puzzle_ids: zone.puzzle_ids.clone(),
            required: zone.required(),
            complete: false,
        });
    }

    if let Some(spec) = &level.boss {
        let position = Vec3::from_array(spec.position);
        let facing = Vec3::from_array(spec.facing);
        let mut transform = Transform::from_translation(position);
        if facing.distance_squared(position) > f32::EPSILON {
            transform.look_at(facing, Vec3::Y);
        }
        let offset = Vec3::from_array(spec.core_offset);
        let boss = commands
            .spawn((Boss::new(spec.settings, position), transform))
            .id();
        commands.spawn((
            BossCore { boss, offset },
            Transform::from_translation(position + offset),
            Collider::sphere(spec.core_radius, CollisionLayers::BOSS),
        ));
    }

    info!(
        guards = level.guards.len(),
        pieces = level.puzzle_items.len(),
        sequence_puzzles = level.sequence_puzzles.len(),
        boss = level.boss.is_some(),
        "Level spawned"
    );
}
