//! Puzzle piece pickup, interaction prompts and puzzle zones.

use {
    bevy::prelude::*,
    puzzle_components::{PuzzleComponentsPlugin, PuzzleItem, PuzzleZone},
    session_events::{
        CollectPuzzle, FocusChanged, HideInteractionPrompt, Interact, PlaySound, PuzzleCollected,
        ShowInteractionPrompt, SoundCue, ZoneCompleted,
    },
    session_resources::GameSession,
    shared_components::Interactable,
    states::GameState,
};

pub struct PuzzlesPlugin;

impl Plugin for PuzzlesPlugin {
    fn build(&self, app: &mut App) {
        if !app.is_plugin_added::<PuzzleComponentsPlugin>() {
            app.add_plugins(PuzzleComponentsPlugin);
        }

        app.add_observer(on_focus_changed)
            .add_observer(on_pickup)
            .add_observer(check_zones);
    }
}

pub fn on_focus_changed(
    trigger: On<FocusChanged>,
    interactables: Query<&Interactable>,
    mut commands: Commands,
) {
    let prompt = trigger
        .event()
        .target
        .and_then(|target| interactables.get(target).ok())
        .and_then(Interactable::visible_prompt);

    match prompt {
        Some(text) => commands.trigger(ShowInteractionPrompt {
            text: text.to_string(),
        }),
        None => commands.trigger(HideInteractionPrompt),
    }
}

/// Picking a piece up hands its id to the session and removes it from the
/// world. Nothing happens outside `Playing`.
pub fn on_pickup(
    trigger: On<Interact>,
    items: Query<(&PuzzleItem, Option<&Interactable>)>,
    session: Res<GameSession>,
    mut commands: Commands,
) {
    let target = trigger.event().target;
    let Ok((item, interactable)) = items.get(target) else {
        return;
    };
    if interactable.is_some_and(|i| !i.can_interact) {
        return;
    }
    if session.state() != GameState::Playing {
        debug!(puzzle_id = item.id, state = ?session.state(), "Pickup ignored");
        return;
    }

    commands.trigger(CollectPuzzle { id: item.id });
    commands.trigger(HideInteractionPrompt);
    commands.entity(target).despawn();
}

/// Completes zones once enough of their pieces are held.
pub fn check_zones(
    _trigger: On<PuzzleCollected>,
    mut zones: Query<(Entity, &mut PuzzleZone)>,
    session: Res<GameSession>,
    mut commands: Commands,
) {
    for (entity, mut zone) in zones.iter_mut() {
        if zone.complete || zone.collected(|id| session.is_puzzle_collected(id)) < zone.required {
            continue;
        }
        zone.complete = true;
        info!(zone = %zone.name, "Puzzle zone complete");
        commands.trigger(ZoneCompleted {
            zone: entity,
            name: zone.name.clone(),
        });
        commands.trigger(PlaySound {
            cue: SoundCue::ZoneComplete,
        });
    }
}

/// Collected over required for the zone called `name`.
pub fn zone_progress<'a>(
    zones: impl IntoIterator<Item = &'a PuzzleZone>,
    session: &GameSession,
    name: &str,
) -> Option<f32> {
    zones
        .into_iter()
        .find(|zone| zone.name == name)
        .map(|zone| zone.progress(|id| session.is_puzzle_collected(id)))
}
