mod matcher;

pub use matcher::{SequenceMatcher, SequenceProgress};

use {
    bevy::prelude::*,
    serde::{Deserialize, Serialize},
    shared_components::{Interactable, LevelEntity},
};

pub struct PuzzleComponentsPlugin;

impl Plugin for PuzzleComponentsPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<PuzzleItem>()
            .register_type::<SequenceKind>()
            .register_type::<ActivatorLook>()
            .register_type::<ChestLid>()
            .register_type::<PuzzleZone>();
    }
}

/// Seconds between a wrong token and the error flash on every activator.
pub const FAILURE_RESET_DELAY: f32 = 0.2;
/// Seconds an activator shows the error look before returning to idle.
pub const ERROR_FLASH_DURATION: f32 = 0.5;
/// Seconds the chest lid takes to swing open.
pub const CHEST_OPEN_DURATION: f32 = 0.5;
/// Height above the chest at which the reward appears.
pub const REWARD_SPAWN_HEIGHT: f32 = 1.5;

pub const PUZZLE_ITEM_PROMPT: &str = "Pick up puzzle piece";

/// One of the scattered pieces counted by the session ledger.
#[derive(Component, Reflect, Debug, Clone, Copy, PartialEq, Eq)]
#[reflect(Component)]
#[require(LevelEntity)]
pub struct PuzzleItem {
    pub id: u32,
}

/// A pickable piece standing at `position`.
pub fn puzzle_item(id: u32, position: Vec3) -> impl Bundle {
    (
        PuzzleItem { id },
        Interactable::new(PUZZLE_ITEM_PROMPT),
        Transform::from_translation(position),
    )
}

#[derive(Reflect, Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum SequenceKind {
    #[default]
    Rune,
    Torch,
}

impl SequenceKind {
    /// Interaction prompt for an idle activator carrying `token`.
    pub fn activator_prompt(&self, token: &str) -> String {
        match self {
            SequenceKind::Rune => format!("Activate Rune [{token}]"),
            SequenceKind::Torch => format!("Light Torch [{token}]"),
        }
    }
}

/// Controller of an ordered-input puzzle, usually a sealed chest.
#[derive(Component, Debug, Clone)]
#[require(LevelEntity)]
pub struct SequencePuzzle {
    pub kind: SequenceKind,
    pub expected: Vec<String>,
    /// Puzzle piece spawned above the chest once solved.
    pub reward: Option<u32>,
    pub solved: bool,
}

impl SequencePuzzle {
    pub fn new(kind: SequenceKind, expected: Vec<String>, reward: Option<u32>) -> Self {
        Self {
            kind,
            expected,
            reward,
            solved: false,
        }
    }

    pub fn status_prompt(&self) -> &'static str {
        if self.solved {
            "The chest is already open"
        } else {
            match self.kind {
                SequenceKind::Rune => "Sealed by magic... activate the runes in the right order",
                SequenceKind::Torch => "Sealed by magic... light the torches in the right order",
            }
        }
    }
}

#[derive(Reflect, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ActivatorLook {
    #[default]
    Idle,
    Lit,
    Error,
}

/// A rune stone or torch contributing one token to `puzzle`.
#[derive(Component, Debug, Clone)]
#[require(LevelEntity)]
pub struct Activator {
    pub puzzle: Entity,
    pub token: String,
    pub look: ActivatorLook,
}

impl Activator {
    pub fn new(puzzle: Entity, token: impl Into<String>) -> Self {
        Self {
            puzzle,
            token: token.into(),
            look: ActivatorLook::Idle,
        }
    }
}

/// Failure delay on a puzzle controller before its activators flash.
#[derive(Component, Debug)]
pub struct PendingReset(pub Timer);

impl Default for PendingReset {
    fn default() -> Self {
        Self(Timer::from_seconds(FAILURE_RESET_DELAY, TimerMode::Once))
    }
}

/// Error look countdown on an activator.
#[derive(Component, Debug)]
pub struct ErrorFlash(pub Timer);

impl Default for ErrorFlash {
    fn default() -> Self {
        Self(Timer::from_seconds(ERROR_FLASH_DURATION, TimerMode::Once))
    }
}

/// Lid pose of a chest, in degrees around its hinge.
#[derive(Component, Reflect, Debug, Clone, Copy, PartialEq)]
#[reflect(Component)]
pub struct ChestLid {
    pub angle: f32,
    pub open_angle: f32,
}

impl Default for ChestLid {
    fn default() -> Self {
        Self {
            angle: 0.0,
            open_angle: -110.0,
        }
    }
}

/// Chest opening in progress; the reward spawns when the timer ends.
#[derive(Component, Debug)]
pub struct ChestOpening(pub Timer);

impl Default for ChestOpening {
    fn default() -> Self {
        Self(Timer::from_seconds(CHEST_OPEN_DURATION, TimerMode::Once))
    }
}

/// A named group of pieces that completes once `required` of them are held.
#[derive(Component, Reflect, Debug, Clone, PartialEq)]
#[reflect(Component)]
#[require(LevelEntity)]
pub struct PuzzleZone {
    pub name: String,
    pub puzzle_ids: Vec<u32>,
    pub required: usize,
    pub complete: bool,
}

impl PuzzleZone {
    pub fn collected(&self, is_collected: impl Fn(u32) -> bool) -> usize {
        self.puzzle_ids.iter().filter(|id| is_collected(**id)).count()
    }

    /// Collected over required, in `[0, 1]`.
    pub fn progress(&self, is_collected: impl Fn(u32) -> bool) -> f32 {
        if self.required == 0 {
            return 0.0;
        }
        (self.collected(is_collected) as f32 / self.required as f32).min(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_activator_prompt_by_kind() {
        assert_eq!(SequenceKind::Rune.activator_prompt("2"), "Activate Rune [2]");
        assert_eq!(SequenceKind::Torch.activator_prompt("B"), "Light Torch [B]");
    }

    #[test]
    fn test_zone_progress() {
        let zone = PuzzleZone {
            name: "Crypt".into(),
            puzzle_ids: vec![1, 2, 3],
            required: 3,
            complete: false,
        };
        let held = [2u32, 3];
        assert_eq!(zone.collected(|id| held.contains(&id)), 2);
        assert!((zone.progress(|id| held.contains(&id)) - 2.0 / 3.0).abs() < f32::EPSILON);

        let empty = PuzzleZone {
            required: 0,
            ..zone
        };
        assert_eq!(empty.progress(|_| true), 0.0);
    }
}
