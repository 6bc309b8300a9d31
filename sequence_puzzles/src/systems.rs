use {
    bevy::prelude::*,
    puzzle_components::{
        Activator, ActivatorLook, ChestLid, ChestOpening, ErrorFlash, PendingReset,
        REWARD_SPAWN_HEIGHT, SequenceKind, SequencePuzzle, puzzle_item,
    },
    session_events::{
        InputSequenceToken, Interact, PlaySound, SequencePuzzleAbandoned, SequencePuzzleFailed,
        SequencePuzzleSolved, ShowInteractionPrompt, SoundCue, StartSequencePuzzle,
    },
    session_resources::GameSession,
    shared_components::Interactable,
    states::GameState,
};

fn reset_activator(activator: &mut Activator, interactable: &mut Interactable, kind: SequenceKind) {
    activator.look = ActivatorLook::Idle;
    interactable.can_interact = true;
    interactable.prompt = kind.activator_prompt(&activator.token);
}

/// Lights an activator and submits its token. The first activator touched
/// while playing also opens the attempt.
pub fn on_activator_interact(
    trigger: On<Interact>,
    mut activators: Query<(&mut Activator, &mut Interactable)>,
    puzzles: Query<&SequencePuzzle>,
    session: Res<GameSession>,
    mut commands: Commands,
) {
    let target = trigger.event().target;
    let Ok((mut activator, mut interactable)) = activators.get_mut(target) else {
        return;
    };
    if !interactable.can_interact {
        return;
    }
    let Ok(puzzle) = puzzles.get(activator.puzzle) else {
        error!(activator = ?target, puzzle = ?activator.puzzle, "Activator is not linked to a puzzle");
        return;
    };
    if puzzle.solved {
        return;
    }
    if puzzle.expected.is_empty() {
        warn!(activator = ?target, puzzle = ?activator.puzzle, "Puzzle has no expected order, activator left idle");
        return;
    }

    match session.state() {
        GameState::Playing => {
            commands.trigger(StartSequencePuzzle {
                puzzle: activator.puzzle,
                expected: puzzle.expected.clone(),
            });
        }
        GameState::PuzzleSolving if session.active_sequence_puzzle() == Some(activator.puzzle) => {}
        state => {
            debug!(activator = ?target, ?state, "Activator ignored");
            return;
        }
    }

    activator.look = ActivatorLook::Lit;
    interactable.can_interact = false;
    interactable.prompt.clear();
    commands.trigger(PlaySound {
        cue: SoundCue::ActivatorLit,
    });
    commands.trigger(InputSequenceToken {
        token: activator.token.clone(),
    });
}

pub fn on_chest_interact(
    trigger: On<Interact>,
    puzzles: Query<&SequencePuzzle>,
    mut commands: Commands,
) {
    if let Ok(puzzle) = puzzles.get(trigger.event().target) {
        commands.trigger(ShowInteractionPrompt {
            text: puzzle.status_prompt().to_string(),
        });
    }
}

pub fn on_sequence_solved(
    trigger: On<SequencePuzzleSolved>,
    mut puzzles: Query<(&mut SequencePuzzle, Option<&mut Interactable>)>,
    mut commands: Commands,
) {
    let entity = trigger.event().puzzle;
    let Ok((mut puzzle, interactable)) = puzzles.get_mut(entity) else {
        warn!(puzzle = ?entity, "Solved puzzle no longer exists");
        return;
    };

    puzzle.solved = true;
    if let Some(mut interactable) = interactable {
        interactable.prompt = puzzle.status_prompt().to_string();
    }
    commands.entity(entity).insert(ChestOpening::default());
    commands.trigger(PlaySound {
        cue: SoundCue::ChestOpen,
    });
}

/// Locks every activator of the failed puzzle until the error flash is over.
pub fn on_sequence_failed(
    trigger: On<SequencePuzzleFailed>,
    mut activators: Query<(&Activator, &mut Interactable)>,
    mut commands: Commands,
) {
    let entity = trigger.event().puzzle;
    for (_, mut interactable) in activators
        .iter_mut()
        .filter(|(activator, _)| activator.puzzle == entity)
    {
        interactable.can_interact = false;
    }
    commands.entity(entity).insert(PendingReset::default());
}

pub fn on_sequence_abandoned(
    trigger: On<SequencePuzzleAbandoned>,
    puzzles: Query<&SequencePuzzle>,
    mut activators: Query<(Entity, &mut Activator, &mut Interactable)>,
    mut commands: Commands,
) {
    let entity = trigger.event().puzzle;
    let kind = puzzles.get(entity).map(|p| p.kind).unwrap_or_default();

    commands.entity(entity).remove::<PendingReset>();
    for (activator_entity, mut activator, mut interactable) in activators.iter_mut() {
        if activator.puzzle == entity {
            reset_activator(&mut activator, &mut interactable, kind);
            commands.entity(activator_entity).remove::<ErrorFlash>();
        }
    }
}

pub fn flash_after_failure(
    time: Res<Time>,
    mut pending: Query<(Entity, &mut PendingReset)>,
    mut activators: Query<(Entity, &mut Activator)>,
    mut commands: Commands,
) {
    for (puzzle, mut reset) in pending.iter_mut() {
        if !reset.0.tick(time.delta()).is_finished() {
            continue;
        }
        commands.entity(puzzle).remove::<PendingReset>();
        for (entity, mut activator) in activators.iter_mut() {
            if activator.puzzle == puzzle {
                activator.look = ActivatorLook::Error;
                commands.entity(entity).insert(ErrorFlash::default());
            }
        }
    }
}

pub fn finish_error_flash(
    time: Res<Time>,
    mut flashing: Query<(Entity, &mut ErrorFlash, &mut Activator, &mut Interactable)>,
    puzzles: Query<&SequencePuzzle>,
    mut commands: Commands,
) {
    for (entity, mut flash, mut activator, mut interactable) in flashing.iter_mut() {
        if !flash.0.tick(time.delta()).is_finished() {
            continue;
        }
        let kind = puzzles
            .get(activator.puzzle)
            .map(|p| p.kind)
            .unwrap_or_default();
        reset_activator(&mut activator, &mut interactable, kind);
        commands.entity(entity).remove::<ErrorFlash>();
    }
}

/// Swings the lid open, then drops the reward above the chest.
pub fn open_chests(
    time: Res<Time>,
    mut chests: Query<(
        Entity,
        &mut ChestOpening,
        &SequencePuzzle,
        &Transform,
        Option<&mut ChestLid>,
    )>,
    mut commands: Commands,
) {
    for (entity, mut opening, puzzle, transform, lid) in chests.iter_mut() {
        opening.0.tick(time.delta());
        if let Some(mut lid) = lid {
            lid.angle = lid.open_angle * opening.0.fraction();
        }
        if !opening.0.is_finished() {
            continue;
        }

        commands.entity(entity).remove::<ChestOpening>();
        if let Some(id) = puzzle.reward {
            let position = transform.translation + Vec3::Y * REWARD_SPAWN_HEIGHT;
            info!(chest = ?entity, puzzle_id = id, "Chest opened, reward spawned");
            commands.spawn(puzzle_item(id, position));
        }
    }
}
