//! Volume settings and the queue of sound cues waiting for the playback
//! backend.

use {
    bevy::prelude::*,
    session_events::{PlaySound, SoundCue},
    std::collections::VecDeque,
};

/// Cues older than this many are dropped if nobody drains the queue.
pub const MAX_QUEUED_SOUNDS: usize = 32;

pub struct GameAudioPlugin;

impl Plugin for GameAudioPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<AudioSettings>()
            .init_resource::<SoundQueue>()
            .register_type::<AudioSettings>()
            .add_observer(on_play_sound)
            .add_observer(on_set_bgm_volume)
            .add_observer(on_set_sfx_volume)
            .add_observer(on_toggle_mute);
    }
}

#[derive(Resource, Reflect, Debug, Clone, Copy, PartialEq)]
#[reflect(Resource)]
pub struct AudioSettings {
    bgm_volume: f32,
    sfx_volume: f32,
    muted: bool,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            bgm_volume: 0.5,
            sfx_volume: 0.7,
            muted: false,
        }
    }
}

impl AudioSettings {
    pub fn new(bgm_volume: f32, sfx_volume: f32, muted: bool) -> Self {
        let mut settings = Self {
            muted,
            ..default()
        };
        settings.set_bgm_volume(bgm_volume);
        settings.set_sfx_volume(sfx_volume);
        settings
    }

    pub fn bgm_volume(&self) -> f32 {
        self.bgm_volume
    }

    pub fn sfx_volume(&self) -> f32 {
        self.sfx_volume
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn set_bgm_volume(&mut self, volume: f32) {
        self.bgm_volume = clamp_volume(volume);
    }

    pub fn set_sfx_volume(&mut self, volume: f32) {
        self.sfx_volume = clamp_volume(volume);
    }

    pub fn toggle_mute(&mut self) {
        self.muted = !self.muted;
    }

    /// Volume the music should play at right now.
    pub fn effective_bgm_volume(&self) -> f32 {
        if self.muted { 0.0 } else { self.bgm_volume }
    }

    pub fn effective_sfx_volume(&self) -> f32 {
        if self.muted { 0.0 } else { self.sfx_volume }
    }
}

fn clamp_volume(volume: f32) -> f32 {
    if volume.is_nan() {
        0.0
    } else {
        volume.clamp(0.0, 1.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QueuedSound {
    pub cue: SoundCue,
    pub volume: f32,
}

#[derive(Resource, Debug, Default)]
pub struct SoundQueue(VecDeque<QueuedSound>);

impl SoundQueue {
    pub fn push(&mut self, sound: QueuedSound) {
        if self.0.len() == MAX_QUEUED_SOUNDS {
            self.0.pop_front();
        }
        self.0.push_back(sound);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Hands every waiting cue to the playback backend.
    pub fn drain(&mut self) -> impl Iterator<Item = QueuedSound> + '_ {
        self.0.drain(..)
    }
}

#[derive(Event, Debug, Clone, Copy)]
pub struct SetBgmVolume {
    pub volume: f32,
}

#[derive(Event, Debug, Clone, Copy)]
pub struct SetSfxVolume {
    pub volume: f32,
}

#[derive(Event, Debug, Clone, Copy, Default)]
pub struct ToggleMute;

/// Settings after a change, for persistence.
#[derive(Event, Debug, Clone, Copy)]
pub struct AudioSettingsChanged {
    pub settings: AudioSettings,
}

pub fn on_play_sound(
    trigger: On<PlaySound>,
    settings: Res<AudioSettings>,
    mut queue: ResMut<SoundQueue>,
) {
    let cue = trigger.event().cue;
    if settings.is_muted() {
        return;
    }
    debug!(?cue, "Queueing sound");
    queue.push(QueuedSound {
        cue,
        volume: settings.effective_sfx_volume(),
    });
}

pub fn on_set_bgm_volume(
    trigger: On<SetBgmVolume>,
    mut settings: ResMut<AudioSettings>,
    mut commands: Commands,
) {
    settings.set_bgm_volume(trigger.event().volume);
    commands.trigger(AudioSettingsChanged {
        settings: *settings,
    });
}

pub fn on_set_sfx_volume(
    trigger: On<SetSfxVolume>,
    mut settings: ResMut<AudioSettings>,
    mut commands: Commands,
) {
    settings.set_sfx_volume(trigger.event().volume);
    commands.trigger(AudioSettingsChanged {
        settings: *settings,
    });
}

pub fn on_toggle_mute(
    _trigger: On<ToggleMute>,
    mut settings: ResMut<AudioSettings>,
    mut commands: Commands,
) {
    settings.toggle_mute();
    info!(muted = settings.is_muted(), "Audio mute toggled");
    commands.trigger(AudioSettingsChanged {
        settings: *settings,
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_volumes_are_clamped() {
        let mut settings = AudioSettings::default();
        settings.set_bgm_volume(1.7);
        settings.set_sfx_volume(-0.2);
        assert_eq!(settings.bgm_volume(), 1.0);
        assert_eq!(settings.sfx_volume(), 0.0);
        assert_eq!(AudioSettings::new(f32::NAN, 0.3, false).bgm_volume(), 0.0);
    }

    #[test]
    fn test_mute_zeroes_effective_volume_only() {
        let mut settings = AudioSettings::default();
        settings.toggle_mute();
        assert_eq!(settings.effective_bgm_volume(), 0.0);
        assert_eq!(settings.effective_sfx_volume(), 0.0);
        assert_eq!(settings.bgm_volume(), 0.5);

        settings.toggle_mute();
        assert_eq!(settings.effective_sfx_volume(), 0.7);
    }

    #[test]
    fn test_queue_drops_oldest_when_full() {
        let mut queue = SoundQueue::default();
        queue.push(QueuedSound {
            cue: SoundCue::Victory,
            volume: 1.0,
        });
        for _ in 0..MAX_QUEUED_SOUNDS {
            queue.push(QueuedSound {
                cue: SoundCue::Collect,
                volume: 1.0,
            });
        }
        assert_eq!(queue.len(), MAX_QUEUED_SOUNDS);
        assert!(queue.drain().all(|sound| sound.cue == SoundCue::Collect));
        assert!(queue.is_empty());
    }

    #[test]
    fn test_sounds_queue_at_sfx_volume_unless_muted() {
        #[derive(Resource, Default)]
        struct Changes(Vec<AudioSettings>);

        let mut app = App::new();
        app.add_plugins((MinimalPlugins, GameAudioPlugin))
            .init_resource::<Changes>()
            .add_observer(|trigger: On<AudioSettingsChanged>, mut changes: ResMut<Changes>| {
                changes.0.push(trigger.event().settings);
            });

        app.world_mut().trigger(SetSfxVolume { volume: 0.25 });
        app.world_mut().trigger(PlaySound {
            cue: SoundCue::Collect,
        });
        app.world_mut().trigger(ToggleMute);
        app.world_mut().trigger(PlaySound {
            cue: SoundCue::Caught,
        });
        app.update();

        let queued: Vec<_> = app.world_mut().resource_mut::<SoundQueue>().drain().collect();
        assert_eq!(
            queued,
            vec![QueuedSound {
                cue: SoundCue::Collect,
                volume: 0.25
            }]
        );
        assert_eq!(app.world().resource::<Changes>().0.len(), 2);
    }
}
