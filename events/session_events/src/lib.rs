use {bevy::prelude::*, states::GameState, std::fmt};

pub struct SessionEventsPlugin;

impl Plugin for SessionEventsPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<GameOverReason>()
            .register_type::<SoundCue>()
            .register_type::<DetectionSource>();
    }
}

// ============================================================================
// Shared vocabulary
// ============================================================================

#[derive(Reflect, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameOverReason {
    TooManyDetections,
    TimeUp,
}

impl fmt::Display for GameOverReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameOverReason::TooManyDetections => f.write_str("too many detections"),
            GameOverReason::TimeUp => f.write_str("time is up"),
        }
    }
}

/// Sound effects the core asks the audio layer to play.
#[derive(Reflect, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundCue {
    Collect,
    Victory,
    GameOver,
    Caught,
    ActivatorLit,
    SequenceError,
    ChestOpen,
    ZoneComplete,
    BossCharge,
    BossLaser,
    BossHit,
    BossDefeated,
}

/// What noticed the player.
#[derive(Reflect, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectionSource {
    Guard(Entity),
    BossLaser(Entity),
}

// ============================================================================
// Requests (UI, input and world -> session)
// ============================================================================

/// MainMenu -> Loading, resets all progression.
#[derive(Event, Debug, Clone, Copy, Default)]
pub struct StartNewGame;

/// Loading -> Playing. Raised by the level loader once the world is spawned.
#[derive(Event, Debug, Clone, Copy, Default)]
pub struct LoadComplete;

#[derive(Event, Debug, Clone, Copy, Default)]
pub struct PauseGame;

#[derive(Event, Debug, Clone, Copy, Default)]
pub struct ResumeGame;

/// Pauses when playing, resumes when paused.
#[derive(Event, Debug, Clone, Copy, Default)]
pub struct TogglePause;

#[derive(Event, Debug, Clone, Copy, Default)]
pub struct ReturnToMainMenu;

/// Full reset straight into Playing.
#[derive(Event, Debug, Clone, Copy, Default)]
pub struct RestartGame;

#[derive(Event, Debug, Clone, Copy, Default)]
pub struct QuitGame;

#[derive(Event, Debug, Clone, Copy, Default)]
pub struct BeginCutscene;

#[derive(Event, Debug, Clone, Copy, Default)]
pub struct EndCutscene;

/// Marks puzzle piece `id` as collected. Duplicates and ids outside
/// `1..=total` are ignored.
#[derive(Event, Debug, Clone, Copy)]
pub struct CollectPuzzle {
    pub id: u32,
}

/// Playing -> PuzzleSolving with a fresh input buffer for `puzzle`.
#[derive(Event, Debug, Clone)]
pub struct StartSequencePuzzle {
    pub puzzle: Entity,
    pub expected: Vec<String>,
}

/// Feeds one token to the active sequence puzzle.
#[derive(Event, Debug, Clone)]
pub struct InputSequenceToken {
    pub token: String,
}

/// Costs the player one life.
#[derive(Event, Debug, Clone, Copy)]
pub struct PlayerDetected {
    pub source: DetectionSource,
}

#[derive(Event, Debug, Clone, Copy)]
pub struct BossDefeated {
    pub boss: Entity,
}

// ============================================================================
// Player intents (input layer -> world)
// ============================================================================

/// The player pressed the interact key while looking at `target`.
#[derive(Event, Debug, Clone, Copy)]
pub struct Interact {
    pub target: Entity,
}

/// The interactable under the player's crosshair changed.
#[derive(Event, Debug, Clone, Copy)]
pub struct FocusChanged {
    pub target: Option<Entity>,
}

/// The player fired the laser.
#[derive(Event, Debug, Clone, Copy)]
pub struct PlayerLaserFired {
    pub origin: Vec3,
    pub direction: Dir3,
}

// ============================================================================
// Notifications (session -> observers)
// ============================================================================

#[derive(Event, Debug, Clone, Copy)]
pub struct StateChanged {
    pub from: GameState,
    pub to: GameState,
}

/// All progression data was cleared.
#[derive(Event, Debug, Clone, Copy, Default)]
pub struct GameReset;

/// A new run began (StartNewGame or RestartGame).
#[derive(Event, Debug, Clone, Copy, Default)]
pub struct GameStarted;

#[derive(Event, Debug, Clone, Copy)]
pub struct PuzzleCollected {
    pub id: u32,
}

#[derive(Event, Debug, Clone, Copy)]
pub struct ProgressChanged {
    pub collected: u32,
    pub total: u32,
}

/// Every piece is collected but the boss still stands. Fires once per run.
#[derive(Event, Debug, Clone, Copy)]
pub struct CollectionComplete {
    pub total: u32,
}

#[derive(Event, Debug, Clone, Copy)]
pub struct LivesChanged {
    pub lives: u32,
}

#[derive(Event, Debug, Clone, Copy)]
pub struct TimeUpdated {
    pub elapsed: f32,
}

#[derive(Event, Debug, Clone, Copy)]
pub struct VictoryAchieved {
    pub elapsed: f32,
}

#[derive(Event, Debug, Clone, Copy)]
pub struct GameOver {
    pub reason: GameOverReason,
}

#[derive(Event, Debug, Clone, Copy)]
pub struct SequenceInputAccepted {
    pub puzzle: Entity,
    pub entered: usize,
    pub expected: usize,
}

#[derive(Event, Debug, Clone, Copy)]
pub struct SequencePuzzleSolved {
    pub puzzle: Entity,
}

/// Wrong token; the attempt is void and activators must be reset.
#[derive(Event, Debug, Clone, Copy)]
pub struct SequencePuzzleFailed {
    pub puzzle: Entity,
}

/// The attempt was dropped without a verdict (pause, reset, game over).
#[derive(Event, Debug, Clone, Copy)]
pub struct SequencePuzzleAbandoned {
    pub puzzle: Entity,
}

/// Fire-and-forget sound request.
#[derive(Event, Debug, Clone, Copy)]
pub struct PlaySound {
    pub cue: SoundCue,
}

#[derive(Event, Debug, Clone)]
pub struct ShowInteractionPrompt {
    pub text: String,
}

#[derive(Event, Debug, Clone, Copy, Default)]
pub struct HideInteractionPrompt;

/// Enough pieces of a zone are held. Fires once per zone per run.
#[derive(Event, Debug, Clone)]
pub struct ZoneCompleted {
    pub zone: Entity,
    pub name: String,
}
