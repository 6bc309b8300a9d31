use {
    bevy::prelude::*,
    collision::{Collider, CollisionLayers, ContactSensor, ContactStarted, raycast_first_hit},
    guard_components::{AgentStatus, Guard, GuardBehavior, GuardOrder, GuardPost},
    navigation::NavAgent,
    session_events::{DetectionSource, GameReset, PlayerDetected, PlaySound, SoundCue},
    session_resources::SessionConfig,
    shared_components::{Deactivated, Player, PlayerControl},
};

/// Layers that block a guard's sight. Anything else is see-through.
const SIGHT_BLOCKERS: CollisionLayers = CollisionLayers::WALL.union(CollisionLayers::PLAYER);

/// Puts a guard back on its route from waypoint 0.
#[derive(Event, Debug, Clone, Copy)]
pub struct ResetGuard {
    pub guard: Entity,
}

/// Running after a non-fatal catch; caught guards are released when it ends.
#[derive(Resource, Debug)]
pub struct CaughtRecovery(pub Timer);

fn apply_order(agent: &mut NavAgent, order: GuardOrder) {
    match order {
        GuardOrder::MoveTo(target) => agent.request_move_to(target),
        GuardOrder::Halt => agent.halt(),
    }
}

fn agent_status(agent: &NavAgent) -> AgentStatus {
    AgentStatus {
        path_pending: agent.path_pending(),
        remaining_distance: agent.remaining_distance(),
        speed: agent.velocity().length(),
    }
}

/// Validates the authored post. A broken post deactivates the guard instead
/// of failing the level.
pub fn initialize_guard(trigger: On<Add, GuardPost>, posts: Query<&GuardPost>, mut commands: Commands) {
    let entity = trigger.entity;
    let Ok(post) = posts.get(entity) else {
        return;
    };

    match Guard::from_post(post) {
        Ok(guard) => {
            let settings = *guard.settings();
            let mut agent = NavAgent::new(settings.move_speed, settings.stopping_distance);
            apply_order(&mut agent, guard.start());
            debug!(?entity, waypoints = guard.route().len(), "Guard initialized");
            commands.entity(entity).insert((
                guard,
                agent,
                ContactSensor::new(settings.contact_radius, CollisionLayers::PLAYER),
            ));
        }
        Err(error) => {
            error!(?entity, %error, "Guard misconfigured, deactivating");
            commands.entity(entity).insert(Deactivated);
        }
    }
}

pub fn patrol_guards(
    time: Res<Time>,
    mut guards: Query<(Entity, &mut Guard, &mut NavAgent), Without<Deactivated>>,
) {
    let delta = time.delta_secs();
    for (entity, mut guard, mut agent) in guards.iter_mut() {
        let before = guard.behavior();
        let order = guard.tick_patrol(delta, agent_status(&agent));

        if before != GuardBehavior::Waiting && guard.behavior() == GuardBehavior::Waiting {
            debug!(?entity, waypoint = guard.waypoint_index(), "Guard waiting");
        }
        if let Some(order) = order {
            apply_order(&mut agent, order);
        }
    }
}

fn has_line_of_sight<'a>(
    eye: Vec3,
    player: Entity,
    player_position: Vec3,
    colliders: impl IntoIterator<Item = (Entity, &'a Transform, &'a Collider)>,
) -> bool {
    let offset = player_position - eye;
    let Ok(direction) = Dir3::new(offset) else {
        return true;
    };
    raycast_first_hit(eye, direction, offset.length(), SIGHT_BLOCKERS, colliders)
        .is_some_and(|hit| hit.entity == player)
}

/// Range check, then one sight ray from the guard's eye.
pub fn detect_player(
    mut guards: Query<(Entity, &Transform, &mut Guard, &mut NavAgent), Without<Deactivated>>,
    players: Query<(Entity, &Transform), With<Player>>,
    colliders: Query<(Entity, &Transform, &Collider)>,
) {
    let Ok((player, player_transform)) = players.single() else {
        return;
    };
    let target = player_transform.translation;

    for (entity, transform, mut guard, mut agent) in guards.iter_mut() {
        if guard.behavior() == GuardBehavior::Caught {
            continue;
        }
        if !guard.in_detection_range(transform.translation, target) {
            continue;
        }
        let eye = transform.translation + Vec3::Y * guard.settings().eye_height;
        if !has_line_of_sight(eye, player, target, colliders.iter()) {
            continue;
        }

        let before = guard.behavior();
        if let Some(order) = guard.observe_player(target) {
            apply_order(&mut agent, order);
            if before != GuardBehavior::Chasing {
                info!(guard = ?entity, "Guard spotted the player");
            }
        }
    }
}

/// Touching a guard is a catch, whatever the guard was doing.
pub fn on_guard_contact(
    trigger: On<ContactStarted>,
    mut guards: Query<(&mut Guard, &mut NavAgent), Without<Deactivated>>,
    mut players: Query<&mut PlayerControl, With<Player>>,
    config: Res<SessionConfig>,
    mut commands: Commands,
) {
    let contact = trigger.event();
    let Ok((mut guard, mut agent)) = guards.get_mut(contact.sensor) else {
        return;
    };
    let Ok(mut control) = players.get_mut(contact.other) else {
        return;
    };
    let Some(order) = guard.catch() else {
        return;
    };

    apply_order(&mut agent, order);
    control.enabled = false;
    info!(guard = ?contact.sensor, "Guard caught the player");

    commands.insert_resource(CaughtRecovery(Timer::from_seconds(
        config.caught_recovery_secs,
        TimerMode::Once,
    )));
    commands.trigger(PlaySound {
        cue: SoundCue::Caught,
    });
    commands.trigger(PlayerDetected {
        source: DetectionSource::Guard(contact.sensor),
    });
}

/// Overlaps stay on the sensor: a player still touching the guard is not
/// caught again until they leave and come back.
fn reset_guard(guard: &mut Guard, agent: &mut NavAgent) {
    apply_order(agent, guard.reset());
}

/// Releases every caught guard and hands control back to the player.
pub fn recover_from_catch(
    time: Res<Time>,
    recovery: Option<ResMut<CaughtRecovery>>,
    mut guards: Query<(&mut Guard, &mut NavAgent)>,
    mut players: Query<&mut PlayerControl, With<Player>>,
    mut commands: Commands,
) {
    let Some(mut recovery) = recovery else {
        return;
    };
    if !recovery.0.tick(time.delta()).is_finished() {
        return;
    }

    for (mut guard, mut agent) in guards.iter_mut() {
        if guard.behavior() == GuardBehavior::Caught {
            reset_guard(&mut guard, &mut agent);
        }
    }
    for mut control in players.iter_mut() {
        control.enabled = true;
    }
    commands.remove_resource::<CaughtRecovery>();
    debug!("Recovered from catch");
}

pub fn on_reset_guard(
    trigger: On<ResetGuard>,
    mut guards: Query<(&mut Guard, &mut NavAgent)>,
) {
    let entity = trigger.event().guard;
    match guards.get_mut(entity) {
        Ok((mut guard, mut agent)) => reset_guard(&mut guard, &mut agent),
        Err(_) => warn!(?entity, "Reset requested for unknown guard"),
    }
}

pub fn on_game_reset(_trigger: On<GameReset>, mut commands: Commands) {
    commands.remove_resource::<CaughtRecovery>();
}
