use bevy::prelude::*;

pub struct SharedComponentsPlugin;

impl Plugin for SharedComponentsPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<Player>();
        app.register_type::<PlayerControl>();
        app.register_type::<Interactable>();
        app.register_type::<Deactivated>();
    }
}

/// Marker for everything spawned from the level file.
/// Despawned wholesale when a run is reset.
#[derive(Component, Default)]
pub struct LevelEntity;

#[derive(Component, Reflect, Default, Debug)]
#[reflect(Component, Default)]
#[require(LevelEntity, PlayerControl)]
pub struct Player;

/// Gate for the player-control collaborator. Guards switch it off on a catch.
#[derive(Component, Reflect, Debug, Clone, Copy, PartialEq, Eq)]
#[reflect(Component)]
pub struct PlayerControl {
    pub enabled: bool,
}

impl Default for PlayerControl {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Something the player can point at and press the interact key on.
#[derive(Component, Reflect, Debug, Clone, PartialEq)]
#[reflect(Component)]
pub struct Interactable {
    /// Text shown while focused. Empty means no prompt.
    pub prompt: String,
    pub can_interact: bool,
}

impl Interactable {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            can_interact: true,
        }
    }

    /// Prompt to show, if any.
    pub fn visible_prompt(&self) -> Option<&str> {
        (self.can_interact && !self.prompt.is_empty()).then_some(self.prompt.as_str())
    }
}

/// A component that failed configuration checks and is skipped by its systems.
#[derive(Component, Reflect, Default, Debug)]
#[reflect(Component, Default)]
pub struct Deactivated;
