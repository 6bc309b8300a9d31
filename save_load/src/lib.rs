//! Player profile persistence.
//!
//! This crate provides:
//! - Loading the profile at startup, falling back to defaults when the file
//!   is missing or unreadable
//! - Counting started runs and keeping the best completion time
//! - Persisting volume and mute settings
//! - RON serialization with a local timestamp of the last run

use {
    audio::{AudioSettings, AudioSettingsChanged},
    bevy::prelude::*,
    chrono::Local,
    serde::{Deserialize, Serialize},
    session_events::{GameStarted, VictoryAchieved},
    std::{
        fs,
        io::{self, Write},
        path::{Path, PathBuf},
    },
    thiserror::Error,
};

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("profile i/o failed: {0}")]
    Io(#[from] io::Error),
    #[error("profile is not valid RON: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("profile could not be serialized: {0}")]
    Serialize(#[from] ron::Error),
}

/// Where the profile lives on disk.
#[derive(Resource, Debug, Clone, PartialEq, Eq)]
pub struct ProfilePath(pub PathBuf);

impl Default for ProfilePath {
    fn default() -> Self {
        Self(PathBuf::from("saves/profile.ron"))
    }
}

/// Cross-run player data.
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerProfile {
    /// Fastest victory in seconds, if any.
    pub best_time: Option<f32>,
    pub games_played: u32,
    pub bgm_volume: f32,
    pub sfx_volume: f32,
    pub is_muted: bool,
    /// RFC 3339 local time of the last started run.
    pub last_played: Option<String>,
}

impl Default for PlayerProfile {
    fn default() -> Self {
        let audio = AudioSettings::default();
        Self {
            best_time: None,
            games_played: 0,
            bgm_volume: audio.bgm_volume(),
            sfx_volume: audio.sfx_volume(),
            is_muted: audio.is_muted(),
            last_played: None,
        }
    }
}

impl PlayerProfile {
    pub fn record_game_started(&mut self, started_at: String) {
        self.games_played += 1;
        self.last_played = Some(started_at);
    }

    /// Returns true when `elapsed` beats the stored best time.
    pub fn record_victory(&mut self, elapsed: f32) -> bool {
        if !elapsed.is_finite() || elapsed < 0.0 {
            return false;
        }
        match self.best_time {
            Some(best) if best <= elapsed => false,
            _ => {
                self.best_time = Some(elapsed);
                true
            }
        }
    }

    pub fn audio_settings(&self) -> AudioSettings {
        AudioSettings::new(self.bgm_volume, self.sfx_volume, self.is_muted)
    }

    pub fn apply_audio(&mut self, settings: &AudioSettings) {
        self.bgm_volume = settings.bgm_volume();
        self.sfx_volume = settings.sfx_volume();
        self.is_muted = settings.is_muted();
    }
}

pub fn load_profile(path: &Path) -> Result<PlayerProfile, ProfileError> {
    let source = fs::read_to_string(path)?;
    Ok(ron::from_str(&source)?)
}

pub fn save_profile(path: &Path, profile: &PlayerProfile) -> Result<(), ProfileError> {
    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    let serialized = ron::ser::to_string_pretty(profile, ron::ser::PrettyConfig::default())?;
    let mut file = fs::File::options()
        .write(true)
        .truncate(true)
        .create(true)
        .open(path)?;
    file.write_all(serialized.as_bytes())?;
    Ok(())
}

pub struct SaveLoadPlugin;

impl Plugin for SaveLoadPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ProfilePath>()
            .init_resource::<PlayerProfile>()
            .add_systems(Startup, load_profile_on_startup)
            .add_observer(on_game_started)
            .add_observer(on_victory)
            .add_observer(on_audio_settings_changed);
    }
}

fn persist(path: &ProfilePath, profile: &PlayerProfile) {
    match save_profile(&path.0, profile) {
        Ok(()) => debug!(path = %path.0.display(), "Profile saved"),
        Err(e) => error!(path = %path.0.display(), "Failed to save profile: {}", e),
    }
}

fn load_profile_on_startup(path: Res<ProfilePath>, mut commands: Commands) {
    let profile = match load_profile(&path.0) {
        Ok(profile) => {
            info!(
                games_played = profile.games_played,
                best_time = ?profile.best_time,
                "Profile loaded"
            );
            profile
        }
        Err(ProfileError::Io(e)) if e.kind() == io::ErrorKind::NotFound => {
            info!(path = %path.0.display(), "No profile yet, starting fresh");
            PlayerProfile::default()
        }
        Err(e) => {
            warn!(path = %path.0.display(), "Ignoring unreadable profile: {}", e);
            PlayerProfile::default()
        }
    };

    commands.insert_resource(profile.audio_settings());
    commands.insert_resource(profile);
}

fn on_game_started(
    _trigger: On<GameStarted>,
    path: Res<ProfilePath>,
    mut profile: ResMut<PlayerProfile>,
) {
    profile.record_game_started(Local::now().to_rfc3339());
    persist(&path, &profile);
}

fn on_victory(
    trigger: On<VictoryAchieved>,
    path: Res<ProfilePath>,
    mut profile: ResMut<PlayerProfile>,
) {
    let elapsed = trigger.event().elapsed;
    if profile.record_victory(elapsed) {
        info!(elapsed, "New best time");
        persist(&path, &profile);
    }
}

fn on_audio_settings_changed(
    trigger: On<AudioSettingsChanged>,
    path: Res<ProfilePath>,
    mut profile: ResMut<PlayerProfile>,
) {
    profile.apply_audio(&trigger.event().settings);
    persist(&path, &profile);
}

#[cfg(test)]
mod tests {
    use {super::*, audio::GameAudioPlugin, audio::SetSfxVolume};

    fn temp_profile(name: &str) -> PathBuf {
        let path = std::env::temp_dir()
            .join(format!("rune_dungeon_{}", std::process::id()))
            .join(format!("{name}.ron"));
        let _ = fs::remove_file(&path);
        path
    }

    #[test]
    fn test_best_time_only_improves() {
        let mut profile = PlayerProfile::default();
        assert!(profile.record_victory(120.0));
        assert!(!profile.record_victory(150.0));
        assert!(!profile.record_victory(120.0));
        assert!(profile.record_victory(90.5));
        assert_eq!(profile.best_time, Some(90.5));
        assert!(!profile.record_victory(f32::NAN));
    }

    #[test]
    fn test_saved_profile_loads_back() {
        let path = temp_profile("saved_profile_loads_back");
        let mut profile = PlayerProfile::default();
        profile.record_game_started("2026-10-19T12:00:00+00:00".to_string());
        profile.record_victory(301.25);

        save_profile(&path, &profile).unwrap();
        assert_eq!(load_profile(&path).unwrap(), profile);
    }

    #[test]
    fn test_missing_and_corrupt_profiles() {
        let path = temp_profile("missing_profile");
        assert!(matches!(load_profile(&path), Err(ProfileError::Io(_))));

        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "(games_played: \"many\")").unwrap();
        assert!(matches!(load_profile(&path), Err(ProfileError::Parse(_))));
    }

    #[test]
    fn test_profile_tracks_runs_and_audio() {
        let path = temp_profile("profile_tracks_runs_and_audio");
        let mut app = App::new();
        app.add_plugins((MinimalPlugins, GameAudioPlugin))
            .insert_resource(ProfilePath(path.clone()))
            .add_plugins(SaveLoadPlugin);
        app.update();

        app.world_mut().trigger(GameStarted);
        app.world_mut().trigger(VictoryAchieved { elapsed: 42.0 });
        app.world_mut().trigger(SetSfxVolume { volume: 0.2 });
        app.update();

        let profile = app.world().resource::<PlayerProfile>().clone();
        assert_eq!(profile.games_played, 1);
        assert_eq!(profile.best_time, Some(42.0));
        assert_eq!(profile.sfx_volume, 0.2);
        assert!(profile.last_played.is_some());
        assert_eq!(load_profile(&path).unwrap(), profile);
    }
}
