use {
    bevy::prelude::*,
    boss_components::{Boss, BossComponentsPlugin, BossCore, BossPhase, HitOutcome},
    collision::{Collider, CollisionLayers, raycast_first_hit},
    session_events::{
        BossDefeated, DetectionSource, PlayerDetected, PlayerLaserFired, PlaySound, SoundCue,
    },
    session_resources::{GameSession, simulating},
    shared_components::Player,
    system_schedule::GameSchedule,
};

/// Reach of the player's laser.
pub const PLAYER_LASER_RANGE: f32 = 100.0;

const BOSS_LASER_BLOCKERS: CollisionLayers = CollisionLayers::WALL.union(CollisionLayers::PLAYER);
const PLAYER_LASER_BLOCKERS: CollisionLayers = CollisionLayers::WALL.union(CollisionLayers::BOSS);

pub struct BossPlugin;

impl Plugin for BossPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(BossComponentsPlugin)
            .add_systems(
                Update,
                (
                    (run_boss_cycle, follow_boss)
                        .chain()
                        .in_set(GameSchedule::PerformAction),
                    boss_laser_damage.in_set(GameSchedule::Effect),
                )
                    .run_if(simulating),
            )
            .add_observer(on_player_laser);
    }
}

pub fn run_boss_cycle(
    time: Res<Time>,
    mut bosses: Query<(Entity, &mut Boss, &mut Transform)>,
    mut commands: Commands,
) {
    let delta = time.delta_secs();
    for (entity, mut boss, mut transform) in bosses.iter_mut() {
        for phase in boss.tick(delta) {
            debug!(boss = ?entity, ?phase, "Boss phase");
            let cue = match phase {
                BossPhase::Charging => SoundCue::BossCharge,
                BossPhase::Firing => SoundCue::BossLaser,
                BossPhase::Cooldown | BossPhase::Defeated => continue,
            };
            commands.trigger(PlaySound { cue });
        }

        if boss.is_moving() {
            let hover = boss.hover_position();
            transform.translation.x = hover.x;
            transform.translation.z = hover.z;
        }
    }
}

pub fn follow_boss(
    bosses: Query<&Transform, (With<Boss>, Without<BossCore>)>,
    mut cores: Query<(&BossCore, &mut Transform), Without<Boss>>,
) {
    for (core, mut transform) in cores.iter_mut() {
        if let Ok(boss_transform) = bosses.get(core.boss) {
            transform.translation = boss_transform.translation + core.offset;
        }
    }
}

/// The beam runs along the boss's forward axis and stops at the first wall.
pub fn boss_laser_damage(
    mut bosses: Query<(Entity, &Transform, &mut Boss)>,
    players: Query<(), With<Player>>,
    colliders: Query<(Entity, &Transform, &Collider)>,
    mut commands: Commands,
) {
    for (entity, transform, mut boss) in bosses.iter_mut() {
        let length = boss.laser_length();
        if length <= 0.0 {
            continue;
        }
        let hit = raycast_first_hit(
            transform.translation,
            transform.forward(),
            length,
            BOSS_LASER_BLOCKERS,
            colliders.iter(),
        );
        let Some(hit) = hit.filter(|hit| players.contains(hit.entity)) else {
            continue;
        };
        if boss.try_damage_player() {
            info!(boss = ?entity, "Boss laser hit the player");
            commands.trigger(PlayerDetected {
                source: DetectionSource::BossLaser(entity),
            });
        }
    }
}

pub fn on_player_laser(
    trigger: On<PlayerLaserFired>,
    cores: Query<&BossCore>,
    mut bosses: Query<&mut Boss>,
    colliders: Query<(Entity, &Transform, &Collider)>,
    session: Res<GameSession>,
    mut commands: Commands,
) {
    if !session.state().is_simulating() {
        return;
    }
    let shot = trigger.event();
    let Some(hit) = raycast_first_hit(
        shot.origin,
        shot.direction,
        PLAYER_LASER_RANGE,
        PLAYER_LASER_BLOCKERS,
        colliders.iter(),
    ) else {
        return;
    };
    let Ok(core) = cores.get(hit.entity) else {
        return;
    };
    let Ok(mut boss) = bosses.get_mut(core.boss) else {
        warn!(core = ?hit.entity, "Boss core points at a missing boss");
        return;
    };

    match boss.take_hit() {
        HitOutcome::Deflected => debug!(boss = ?core.boss, "Shield deflected the laser"),
        HitOutcome::Damaged { remaining } => {
            info!(boss = ?core.boss, remaining, "Boss damaged");
            commands.trigger(PlaySound {
                cue: SoundCue::BossHit,
            });
        }
        HitOutcome::Defeated => {
            commands.trigger(PlaySound {
                cue: SoundCue::BossDefeated,
            });
            commands.trigger(BossDefeated { boss: core.boss });
        }
        HitOutcome::Ignored => {}
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        boss_components::BossSettings,
        bevy::time::TimeUpdateStrategy,
        collision::CollisionPlugin,
        session_resources::SessionConfig,
        std::time::Duration,
        system_schedule::SystemSchedulePlugin,
    };

    #[derive(Resource, Default)]
    struct Spy {
        detections: usize,
        defeated: Vec<Entity>,
    }

    fn app() -> App {
        let mut session = GameSession::new(&SessionConfig::default());
        session.start_new_game().unwrap();
        session.finish_loading().unwrap();

        let mut app = App::new();
        app.add_plugins((MinimalPlugins, SystemSchedulePlugin, CollisionPlugin, BossPlugin))
            .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_millis(500)))
            .insert_resource(session)
            .init_resource::<Spy>()
            .add_observer(|_trigger: On<PlayerDetected>, mut spy: ResMut<Spy>| {
                spy.detections += 1;
            })
            .add_observer(|trigger: On<BossDefeated>, mut spy: ResMut<Spy>| {
                spy.defeated.push(trigger.event().boss);
            });
        app.update();
        app
    }

    /// Boss at the origin facing -Z, core just in front of it.
    fn spawn_boss(app: &mut App, settings: BossSettings) -> (Entity, Entity) {
        let boss = app
            .world_mut()
            .spawn((
                Boss::new(settings, Vec3::ZERO),
                Transform::default(),
                Collider::sphere(1.0, CollisionLayers::BOSS),
            ))
            .id();
        let core = app
            .world_mut()
            .spawn((
                BossCore {
                    boss,
                    offset: Vec3::new(0.0, 0.0, 1.5),
                },
                Transform::from_xyz(0.0, 0.0, 1.5),
                Collider::sphere(0.4, CollisionLayers::BOSS),
            ))
            .id();
        (boss, core)
    }

    fn still() -> BossSettings {
        BossSettings {
            enable_movement: false,
            ..default()
        }
    }

    fn shoot_core(app: &mut App) {
        app.world_mut().trigger(PlayerLaserFired {
            origin: Vec3::new(0.0, 0.0, 10.0),
            direction: Dir3::NEG_Z,
        });
        app.update();
    }

    fn advance(app: &mut App, seconds: f32) {
        for _ in 0..(seconds / 0.5).round() as usize {
            app.update();
        }
    }

    #[test]
    fn test_shield_deflects_outside_firing() {
        let mut app = app();
        let (boss, _) = spawn_boss(&mut app, still());
        shoot_core(&mut app);
        assert_eq!(app.world().get::<Boss>(boss).unwrap().health(), 3);
    }

    #[test]
    fn test_three_hits_while_firing_defeat_boss() {
        let mut app = app();
        let (boss, _) = spawn_boss(&mut app, still());
        advance(&mut app, 5.5);
        assert_eq!(app.world().get::<Boss>(boss).unwrap().phase(), BossPhase::Firing);

        for _ in 0..3 {
            shoot_core(&mut app);
        }
        assert!(app.world().get::<Boss>(boss).unwrap().is_defeated());
        assert_eq!(app.world().resource::<Spy>().defeated, vec![boss]);
    }

    #[test]
    fn test_boss_laser_hits_player_once_per_interval() {
        let mut app = app();
        spawn_boss(&mut app, still());
        app.world_mut().spawn((
            Player,
            Transform::from_xyz(0.0, 0.0, -5.0),
            Collider::sphere(0.5, CollisionLayers::PLAYER),
        ));

        advance(&mut app, 5.5);
        // hits at 0.5 s and 1.5 s into firing; the 1.0 s frame is inside the interval
        advance(&mut app, 1.5);
        assert_eq!(app.world().resource::<Spy>().detections, 2);
    }

    #[test]
    fn test_wall_shields_player_from_boss_laser() {
        let mut app = app();
        spawn_boss(&mut app, still());
        app.world_mut().spawn((
            Player,
            Transform::from_xyz(0.0, 0.0, -5.0),
            Collider::sphere(0.5, CollisionLayers::PLAYER),
        ));
        app.world_mut().spawn((
            Transform::from_xyz(0.0, 0.0, -3.0),
            Collider::cuboid(Vec3::new(2.0, 2.0, 0.1), CollisionLayers::WALL),
        ));

        advance(&mut app, 8.0);
        assert_eq!(app.world().resource::<Spy>().detections, 0);
    }

    #[test]
    fn test_core_follows_hovering_boss() {
        let mut app = app();
        let (boss, core) = spawn_boss(&mut app, BossSettings::default());
        advance(&mut app, 1.0);

        let boss_z = app.world().get::<Transform>(boss).unwrap().translation.z;
        let core_z = app.world().get::<Transform>(core).unwrap().translation.z;
        assert!(boss_z.abs() > 0.0);
        assert!((core_z - boss_z - 1.5).abs() < 1e-5);
    }
}
