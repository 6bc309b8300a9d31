//! Headless HUD model.
//! Mirrors session notifications into [`HudState`] so a view layer only has
//! to read one resource: progress, lives, the run clock, the current
//! interaction prompt and the banner on top of the screen.

use {
    bevy::prelude::*,
    session_events::{
        CollectionComplete, GameOver, GameOverReason, GameReset, HideInteractionPrompt,
        LivesChanged, ProgressChanged, SequencePuzzleFailed, ShowInteractionPrompt, StateChanged,
        TimeUpdated, VictoryAchieved, ZoneCompleted,
    },
    states::GameState,
    system_schedule::GameSchedule,
};

/// How long transient banners stay up, in real seconds.
const BANNER_DURATION: f32 = 3.0;
const CELEBRATION_DURATION: f32 = 3.0;

pub struct HudPlugin;

impl Plugin for HudPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<HudState>()
            .add_systems(Update, expire_banners.in_set(GameSchedule::FrameEnd))
            .add_observer(on_progress_changed)
            .add_observer(on_lives_changed)
            .add_observer(on_time_updated)
            .add_observer(on_state_changed)
            .add_observer(on_show_prompt)
            .add_observer(on_hide_prompt)
            .add_observer(on_collection_complete)
            .add_observer(on_zone_completed)
            .add_observer(on_sequence_failed)
            .add_observer(on_victory)
            .add_observer(on_game_over)
            .add_observer(on_game_reset);
    }
}

/// `MM:SS`, seconds floored. Negative and NaN read as zero.
pub fn format_clock(seconds: f32) -> String {
    let total = if seconds.is_nan() || seconds < 0.0 {
        0
    } else {
        seconds.floor() as u64
    };
    format!("{:02}:{:02}", total / 60, total % 60)
}

pub fn game_over_text(reason: GameOverReason) -> &'static str {
    match reason {
        GameOverReason::TooManyDetections => "You were caught too many times",
        GameOverReason::TimeUp => "Time's up",
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BannerKind {
    Victory { elapsed: f32 },
    GameOver(GameOverReason),
    ZoneComplete(String),
    WrongOrder,
}

#[derive(Debug, Clone)]
pub struct Banner {
    pub kind: BannerKind,
    /// `None` keeps the banner up until the next reset.
    timer: Option<Timer>,
}

impl Banner {
    fn sticky(kind: BannerKind) -> Self {
        Self { kind, timer: None }
    }

    fn timed(kind: BannerKind) -> Self {
        Self {
            kind,
            timer: Some(Timer::from_seconds(BANNER_DURATION, TimerMode::Once)),
        }
    }

    pub fn is_sticky(&self) -> bool {
        self.timer.is_none()
    }

    pub fn text(&self) -> String {
        match &self.kind {
            BannerKind::Victory { elapsed } => format!("Victory! {}", format_clock(*elapsed)),
            BannerKind::GameOver(reason) => format!("Game Over: {}", game_over_text(*reason)),
            BannerKind::ZoneComplete(name) => format!("{name} complete"),
            BannerKind::WrongOrder => "Wrong order".to_string(),
        }
    }
}

#[derive(Resource, Debug, Default)]
pub struct HudState {
    pub collected: u32,
    pub total: u32,
    pub lives: u32,
    pub elapsed: f32,
    pub state: GameState,
    pub prompt: Option<String>,
    pub banner: Option<Banner>,
    celebration: Option<Timer>,
}

impl HudState {
    pub fn progress_text(&self) -> String {
        format!("Puzzles: {}/{}", self.collected, self.total)
    }

    pub fn lives_text(&self) -> String {
        format!("Lives: {}", self.lives)
    }

    pub fn clock_text(&self) -> String {
        format_clock(self.elapsed)
    }

    pub fn is_celebrating(&self) -> bool {
        self.celebration.is_some()
    }

    pub fn is_paused(&self) -> bool {
        self.state == GameState::Paused
    }

    /// Sticky banners win over transient ones.
    fn show(&mut self, banner: Banner) {
        if self.banner.as_ref().is_some_and(Banner::is_sticky) && !banner.is_sticky() {
            return;
        }
        self.banner = Some(banner);
    }
}

fn expire_banners(time: Res<Time<Real>>, mut hud: ResMut<HudState>) {
    let delta = time.delta();

    let banner_done = hud
        .banner
        .as_mut()
        .and_then(|banner| banner.timer.as_mut())
        .is_some_and(|timer| timer.tick(delta).is_finished());
    if banner_done {
        hud.banner = None;
    }

    let celebration_done = hud
        .celebration
        .as_mut()
        .is_some_and(|timer| timer.tick(delta).is_finished());
    if celebration_done {
        hud.celebration = None;
    }
}

fn on_progress_changed(trigger: On<ProgressChanged>, mut hud: ResMut<HudState>) {
    let event = trigger.event();
    hud.collected = event.collected;
    hud.total = event.total;
}

fn on_lives_changed(trigger: On<LivesChanged>, mut hud: ResMut<HudState>) {
    hud.lives = trigger.event().lives;
}

fn on_time_updated(trigger: On<TimeUpdated>, mut hud: ResMut<HudState>) {
    hud.elapsed = trigger.event().elapsed;
}

fn on_state_changed(trigger: On<StateChanged>, mut hud: ResMut<HudState>) {
    hud.state = trigger.event().to;
}

fn on_show_prompt(trigger: On<ShowInteractionPrompt>, mut hud: ResMut<HudState>) {
    hud.prompt = Some(trigger.event().text.clone());
}

fn on_hide_prompt(_trigger: On<HideInteractionPrompt>, mut hud: ResMut<HudState>) {
    hud.prompt = None;
}

fn on_collection_complete(_trigger: On<CollectionComplete>, mut hud: ResMut<HudState>) {
    hud.celebration = Some(Timer::from_seconds(CELEBRATION_DURATION, TimerMode::Once));
}

fn on_zone_completed(trigger: On<ZoneCompleted>, mut hud: ResMut<HudState>) {
    hud.show(Banner::timed(BannerKind::ZoneComplete(
        trigger.event().name.clone(),
    )));
}

fn on_sequence_failed(_trigger: On<SequencePuzzleFailed>, mut hud: ResMut<HudState>) {
    hud.show(Banner::timed(BannerKind::WrongOrder));
}

fn on_victory(trigger: On<VictoryAchieved>, mut hud: ResMut<HudState>) {
    let elapsed = trigger.event().elapsed;
    hud.elapsed = elapsed;
    hud.prompt = None;
    hud.show(Banner::sticky(BannerKind::Victory { elapsed }));
}

fn on_game_over(trigger: On<GameOver>, mut hud: ResMut<HudState>) {
    hud.prompt = None;
    hud.show(Banner::sticky(BannerKind::GameOver(trigger.event().reason)));
}

fn on_game_reset(_trigger: On<GameReset>, mut hud: ResMut<HudState>) {
    let state = hud.state;
    *hud = HudState {
        state,
        ..default()
    };
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        bevy::time::TimeUpdateStrategy,
        std::time::Duration,
    };

    fn app() -> App {
        let mut app = App::new();
        app.add_plugins((MinimalPlugins, system_schedule::SystemSchedulePlugin, HudPlugin))
            .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_millis(500)));
        app.update();
        app
    }

    fn hud(app: &App) -> &HudState {
        app.world().resource::<HudState>()
    }

    #[test]
    fn test_format_clock_floors() {
        assert_eq!(format_clock(0.0), "00:00");
        assert_eq!(format_clock(59.99), "00:59");
        assert_eq!(format_clock(61.5), "01:01");
        assert_eq!(format_clock(600.0), "10:00");
        assert_eq!(format_clock(-3.0), "00:00");
        assert_eq!(format_clock(f32::NAN), "00:00");
    }

    #[test]
    fn test_notifications_fill_the_model() {
        let mut app = app();
        let world = app.world_mut();
        world.trigger(ProgressChanged {
            collected: 4,
            total: 9,
        });
        world.trigger(LivesChanged { lives: 2 });
        world.trigger(TimeUpdated { elapsed: 125.4 });
        world.trigger(ShowInteractionPrompt {
            text: "Pick up puzzle piece".into(),
        });

        let state = hud(&app);
        assert_eq!(state.progress_text(), "Puzzles: 4/9");
        assert_eq!(state.lives_text(), "Lives: 2");
        assert_eq!(state.clock_text(), "02:05");
        assert_eq!(state.prompt.as_deref(), Some("Pick up puzzle piece"));

        app.world_mut().trigger(HideInteractionPrompt);
        assert_eq!(hud(&app).prompt, None);
    }

    #[test]
    fn test_transient_banner_expires_and_never_hides_game_over() {
        let mut app = app();
        app.world_mut().trigger(ZoneCompleted {
            zone: Entity::PLACEHOLDER,
            name: "Crypt".into(),
        });
        assert_eq!(
            hud(&app).banner.as_ref().map(Banner::text).as_deref(),
            Some("Crypt complete")
        );

        for _ in 0..7 {
            app.update();
        }
        assert!(hud(&app).banner.is_none());

        app.world_mut().trigger(GameOver {
            reason: GameOverReason::TimeUp,
        });
        app.world_mut().trigger(SequencePuzzleFailed {
            puzzle: Entity::PLACEHOLDER,
        });
        for _ in 0..10 {
            app.update();
        }
        assert_eq!(
            hud(&app).banner.as_ref().map(Banner::text).as_deref(),
            Some("Game Over: Time's up")
        );
    }

    #[test]
    fn test_celebration_and_reset() {
        let mut app = app();
        app.world_mut().trigger(CollectionComplete { total: 9 });
        assert!(hud(&app).is_celebrating());

        app.world_mut().trigger(VictoryAchieved { elapsed: 90.0 });
        assert_eq!(
            hud(&app).banner.as_ref().map(Banner::text).as_deref(),
            Some("Victory! 01:30")
        );

        app.world_mut().trigger(GameReset);
        let hud = hud(&app);
        assert!(hud.banner.is_none());
        assert!(!hud.is_celebrating());
        assert_eq!(hud.collected, 0);
    }
}
