use {
    bevy::{platform::collections::HashSet, prelude::*},
    bevy_common_assets::ron::RonAssetPlugin,
    boss_components::BossSettings,
    guard_components::GuardSettings,
    puzzle_components::SequenceKind,
    serde::{Deserialize, Serialize},
    thiserror::Error,
};

pub struct LevelAssetsPlugin;

impl Plugin for LevelAssetsPlugin {
    fn build(&self, app: &mut App) {
        // Register the asset loader for .level.ron files
        app.add_plugins(RonAssetPlugin::<LevelDefinition>::new(&["level.ron"]));
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum LevelError {
    #[error("puzzle id {id} is outside 1..={total}")]
    PuzzleOutOfRange { id: u32, total: u32 },
    #[error("puzzle id {0} is placed more than once")]
    DuplicatePuzzle(u32),
    #[error("sequence puzzle #{index} has an empty expected order")]
    EmptySequence { index: usize },
    #[error("sequence puzzle #{index} expects token `{token}` but has no activator for it")]
    MissingActivator { index: usize, token: String },
    #[error("zone `{zone}` requires {required} pieces but lists {listed}")]
    UnreachableZone {
        zone: String,
        required: usize,
        listed: usize,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct WallSpec {
    pub center: [f32; 3],
    pub half_extents: [f32; 3],
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct GuardSpec {
    pub position: [f32; 3],
    pub waypoints: Vec<[f32; 3]>,
    #[serde(default)]
    pub settings: GuardSettings,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct PuzzleItemSpec {
    pub id: u32,
    pub position: [f32; 3],
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ActivatorSpec {
    pub token: String,
    pub position: [f32; 3],
}

/// A chest sealed by an ordered set of runes or torches.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct SequencePuzzleSpec {
    #[serde(default)]
    pub kind: SequenceKind,
    pub position: [f32; 3],
    pub expected: Vec<String>,
    pub activators: Vec<ActivatorSpec>,
    /// Puzzle piece dropped when the chest opens.
    #[serde(default)]
    pub reward: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ZoneSpec {
    pub name: String,
    pub puzzle_ids: Vec<u32>,
    /// Defaults to every listed piece.
    #[serde(default)]
    pub required: Option<usize>,
}

impl ZoneSpec {
    pub fn required(&self) -> usize {
        self.required.unwrap_or(self.puzzle_ids.len())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct BossSpec {
    pub position: [f32; 3],
    /// Point the boss faces; its beam runs along that direction.
    pub facing: [f32; 3],
    #[serde(default = "default_core_offset")]
    pub core_offset: [f32; 3],
    #[serde(default = "default_core_radius")]
    pub core_radius: f32,
    #[serde(default)]
    pub settings: BossSettings,
}

fn default_core_offset() -> [f32; 3] {
    [0.0, 2.0, 0.0]
}

fn default_core_radius() -> f32 {
    0.5
}

/// Everything placed in a dungeon level.
#[derive(Asset, TypePath, Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LevelDefinition {
    pub player_spawn: [f32; 3],
    pub walls: Vec<WallSpec>,
    pub guards: Vec<GuardSpec>,
    pub puzzle_items: Vec<PuzzleItemSpec>,
    pub sequence_puzzles: Vec<SequencePuzzleSpec>,
    pub zones: Vec<ZoneSpec>,
    pub boss: Option<BossSpec>,
}

impl LevelDefinition {
    /// Ids of every piece the level can hand out, loose or as a chest reward.
    pub fn placed_puzzle_ids(&self) -> impl Iterator<Item = u32> + '_ {
        self.puzzle_items
            .iter()
            .map(|item| item.id)
            .chain(self.sequence_puzzles.iter().filter_map(|p| p.reward))
    }

    /// Checks the level against a session expecting `total_puzzles` pieces.
    ///
    /// Guard routes are not checked here; a bad route only deactivates that
    /// guard when it spawns.
    pub fn validate(&self, total_puzzles: u32) -> Result<(), LevelError> {
        let mut seen = HashSet::new();
        for id in self.placed_puzzle_ids() {
            if id == 0 || id > total_puzzles {
                return Err(LevelError::PuzzleOutOfRange {
                    id,
                    total: total_puzzles,
                });
            }
            if !seen.insert(id) {
                return Err(LevelError::DuplicatePuzzle(id));
            }
        }

        for (index, puzzle) in self.sequence_puzzles.iter().enumerate() {
            if puzzle.expected.is_empty() {
                return Err(LevelError::EmptySequence { index });
            }
            let missing = puzzle
                .expected
                .iter()
                .find(|token| !puzzle.activators.iter().any(|a| &a.token == *token));
            if let Some(token) = missing {
                return Err(LevelError::MissingActivator {
                    index,
                    token: token.clone(),
                });
            }
        }

        for zone in &self.zones {
            if zone.required() > zone.puzzle_ids.len() {
                return Err(LevelError::UnreachableZone {
                    zone: zone.name.clone(),
                    required: zone.required(),
                    listed: zone.puzzle_ids.len(),
                });
            }
        }

        Ok(())
    }
}
