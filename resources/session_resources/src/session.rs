use {
    crate::{PuzzleLedger, SessionConfig},
    bevy::prelude::*,
    puzzle_components::{SequenceMatcher, SequenceProgress},
    session_events::{GameOverReason, SoundCue},
    states::GameState,
    thiserror::Error,
};

/// Why an operation left the session untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("{operation} is not allowed in {state:?}")]
    InvalidState {
        operation: &'static str,
        state: GameState,
    },
    #[error("puzzle {id} is outside 1..={total}")]
    OutOfRange { id: u32, total: u32 },
    #[error("puzzle {0} was already collected")]
    AlreadyCollected(u32),
    #[error("sequence puzzle has no tokens")]
    EmptySequence,
}

/// Observable outcome of a session operation, in the order it happened.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SessionNotice {
    StateChanged { from: GameState, to: GameState },
    GameReset,
    GameStarted,
    PuzzleCollected { id: u32 },
    ProgressChanged { collected: u32, total: u32 },
    CollectionComplete { total: u32 },
    LivesChanged { lives: u32 },
    TimeUpdated { elapsed: f32 },
    VictoryAchieved { elapsed: f32 },
    GameOver { reason: GameOverReason },
    SequenceInputAccepted {
        puzzle: Entity,
        entered: usize,
        expected: usize,
    },
    SequencePuzzleSolved { puzzle: Entity },
    SequencePuzzleFailed { puzzle: Entity },
    SequencePuzzleAbandoned { puzzle: Entity },
    Sound(SoundCue),
}

pub type Notices = Vec<SessionNotice>;

#[derive(Debug, Clone)]
struct ActiveSequence {
    puzzle: Entity,
    matcher: SequenceMatcher,
}

/// The single progression record of a run.
///
/// Every mutation goes through a method. Methods that change something
/// return the [`SessionNotice`]s describing the change; methods whose
/// preconditions fail return a [`Rejection`] and leave the session as it was.
#[derive(Resource, Debug, Clone)]
pub struct GameSession {
    state: GameState,
    ledger: PuzzleLedger,
    elapsed: f32,
    max_game_time: f32,
    lives: u32,
    starting_lives: u32,
    boss_defeated: bool,
    completion_announced: bool,
    active_sequence: Option<ActiveSequence>,
}

impl FromWorld for GameSession {
    fn from_world(world: &mut World) -> Self {
        let config = world
            .get_resource::<SessionConfig>()
            .cloned()
            .unwrap_or_default();
        Self::new(&config)
    }
}

impl GameSession {
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            state: GameState::MainMenu,
            ledger: PuzzleLedger::new(config.total_puzzles),
            elapsed: 0.0,
            max_game_time: config.max_game_time,
            lives: config.starting_lives,
            starting_lives: config.starting_lives,
            boss_defeated: false,
            completion_announced: false,
            active_sequence: None,
        }
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn total_puzzles(&self) -> u32 {
        self.ledger.total()
    }

    pub fn collected_count(&self) -> u32 {
        self.ledger.collected_count()
    }

    pub fn is_puzzle_collected(&self, id: u32) -> bool {
        self.ledger.is_collected(id)
    }

    pub fn collected_ids(&self) -> impl Iterator<Item = u32> + '_ {
        self.ledger.ids()
    }

    pub fn elapsed_time(&self) -> f32 {
        self.elapsed
    }

    pub fn max_game_time(&self) -> f32 {
        self.max_game_time
    }

    pub fn remaining_time(&self) -> f32 {
        (self.max_game_time - self.elapsed).max(0.0)
    }

    pub fn lives(&self) -> u32 {
        self.lives
    }

    pub fn is_boss_defeated(&self) -> bool {
        self.boss_defeated
    }

    pub fn progress_fraction(&self) -> f32 {
        self.ledger.progress_fraction()
    }

    /// Puzzle entity whose sequence is being entered, if any.
    pub fn active_sequence_puzzle(&self) -> Option<Entity> {
        self.active_sequence.as_ref().map(|active| active.puzzle)
    }

    /// Tokens accepted so far in the running attempt.
    pub fn sequence_input(&self) -> &[String] {
        self.active_sequence
            .as_ref()
            .map_or(&[][..], |active| active.matcher.input())
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    pub fn start_new_game(&mut self) -> Result<Notices, Rejection> {
        self.require("start new game", |s| s == GameState::MainMenu)?;
        let mut notices = self.reset();
        notices.push(SessionNotice::GameStarted);
        self.enter(GameState::Loading, &mut notices);
        Ok(notices)
    }

    pub fn finish_loading(&mut self) -> Result<Notices, Rejection> {
        self.require("finish loading", |s| s == GameState::Loading)?;
        let mut notices = Notices::new();
        self.enter(GameState::Playing, &mut notices);
        Ok(notices)
    }

    /// Freezes the run. An attempt in progress is abandoned.
    pub fn pause(&mut self) -> Result<Notices, Rejection> {
        self.require("pause", |s| {
            matches!(s, GameState::Playing | GameState::PuzzleSolving)
        })?;
        let mut notices = Notices::new();
        self.abandon_sequence(&mut notices);
        self.enter(GameState::Paused, &mut notices);
        Ok(notices)
    }

    pub fn resume(&mut self) -> Result<Notices, Rejection> {
        self.require("resume", |s| s == GameState::Paused)?;
        let mut notices = Notices::new();
        self.enter(GameState::Playing, &mut notices);
        Ok(notices)
    }

    pub fn toggle_pause(&mut self) -> Result<Notices, Rejection> {
        match self.state {
            GameState::Paused => self.resume(),
            _ => self.pause(),
        }
    }

    pub fn begin_cutscene(&mut self) -> Result<Notices, Rejection> {
        self.require("begin cutscene", |s| s == GameState::Playing)?;
        let mut notices = Notices::new();
        self.enter(GameState::Cutscene, &mut notices);
        Ok(notices)
    }

    pub fn end_cutscene(&mut self) -> Result<Notices, Rejection> {
        self.require("end cutscene", |s| s == GameState::Cutscene)?;
        let mut notices = Notices::new();
        self.enter(GameState::Playing, &mut notices);
        Ok(notices)
    }

    pub fn return_to_main_menu(&mut self) -> Notices {
        if self.state == GameState::MainMenu {
            return Notices::new();
        }
        let mut notices = self.reset();
        self.enter(GameState::MainMenu, &mut notices);
        notices
    }

    /// Full reset straight into `Playing`.
    pub fn restart_game(&mut self) -> Notices {
        let mut notices = self.reset();
        notices.push(SessionNotice::GameStarted);
        self.enter(GameState::Playing, &mut notices);
        notices
    }

    // ------------------------------------------------------------------
    // Progression
    // ------------------------------------------------------------------

    /// Advances the run clock. Only `Playing` accumulates time.
    pub fn tick(&mut self, delta: f32) -> Notices {
        let mut notices = Notices::new();
        if self.state != GameState::Playing || delta.is_nan() || delta <= 0.0 {
            return notices;
        }

        self.elapsed = (self.elapsed + delta).min(self.max_game_time);
        notices.push(SessionNotice::TimeUpdated {
            elapsed: self.elapsed,
        });
        if self.elapsed >= self.max_game_time {
            self.game_over(GameOverReason::TimeUp, &mut notices);
        }
        notices
    }

    pub fn collect_puzzle(&mut self, id: u32) -> Result<Notices, Rejection> {
        self.require("collect puzzle", |s| s == GameState::Playing)?;
        let collected = self.ledger.collect(id)?;

        let mut notices = vec![
            SessionNotice::PuzzleCollected { id },
            SessionNotice::ProgressChanged {
                collected,
                total: self.ledger.total(),
            },
            SessionNotice::Sound(SoundCue::Collect),
        ];
        self.evaluate_victory(&mut notices);
        Ok(notices)
    }

    /// Costs one life; the last one ends the run.
    pub fn notify_player_detected(&mut self) -> Result<Notices, Rejection> {
        self.require("player detected", |s| s.is_active())?;
        self.lives = self.lives.saturating_sub(1);

        let mut notices = vec![SessionNotice::LivesChanged { lives: self.lives }];
        if self.lives == 0 {
            self.game_over(GameOverReason::TooManyDetections, &mut notices);
        }
        Ok(notices)
    }

    /// Records the boss kill. Repeats are no-ops. Outside the active states
    /// the flag is kept but victory is not evaluated.
    pub fn notify_boss_defeated(&mut self) -> Notices {
        let mut notices = Notices::new();
        if self.boss_defeated {
            return notices;
        }
        self.boss_defeated = true;
        if self.state.is_active() {
            self.evaluate_victory(&mut notices);
        }
        notices
    }

    // ------------------------------------------------------------------
    // Sequence puzzles
    // ------------------------------------------------------------------

    pub fn start_sequence_puzzle(
        &mut self,
        puzzle: Entity,
        expected: Vec<String>,
    ) -> Result<Notices, Rejection> {
        self.require("start sequence puzzle", |s| s == GameState::Playing)?;
        if expected.is_empty() {
            return Err(Rejection::EmptySequence);
        }

        self.active_sequence = Some(ActiveSequence {
            puzzle,
            matcher: SequenceMatcher::new(expected),
        });
        let mut notices = Notices::new();
        self.enter(GameState::PuzzleSolving, &mut notices);
        Ok(notices)
    }

    pub fn input_sequence_token(&mut self, token: impl Into<String>) -> Result<Notices, Rejection> {
        self.require("input sequence token", |s| s == GameState::PuzzleSolving)?;
        let Some(active) = self.active_sequence.as_mut() else {
            return Err(Rejection::InvalidState {
                operation: "input sequence token",
                state: self.state,
            });
        };

        let puzzle = active.puzzle;
        let expected = active.matcher.expected().len();
        let mut notices = Notices::new();
        match active.matcher.submit(token) {
            SequenceProgress::Pending { entered } => {
                notices.push(SessionNotice::SequenceInputAccepted {
                    puzzle,
                    entered,
                    expected,
                });
            }
            SequenceProgress::Solved => {
                self.active_sequence = None;
                self.enter(GameState::Playing, &mut notices);
                notices.push(SessionNotice::SequencePuzzleSolved { puzzle });
            }
            SequenceProgress::Failed { .. } => {
                self.active_sequence = None;
                self.enter(GameState::Playing, &mut notices);
                notices.push(SessionNotice::SequencePuzzleFailed { puzzle });
                notices.push(SessionNotice::Sound(SoundCue::SequenceError));
            }
        }
        Ok(notices)
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn require(
        &self,
        operation: &'static str,
        allowed: impl Fn(GameState) -> bool,
    ) -> Result<(), Rejection> {
        if allowed(self.state) {
            Ok(())
        } else {
            Err(Rejection::InvalidState {
                operation,
                state: self.state,
            })
        }
    }

    /// Switches state. Re-entering the current state does nothing.
    fn enter(&mut self, to: GameState, notices: &mut Notices) {
        if self.state == to {
            return;
        }
        let from = self.state;
        self.state = to;
        notices.push(SessionNotice::StateChanged { from, to });
    }

    fn reset(&mut self) -> Notices {
        let mut notices = Notices::new();
        self.abandon_sequence(&mut notices);
        self.ledger.clear();
        self.elapsed = 0.0;
        self.lives = self.starting_lives;
        self.boss_defeated = false;
        self.completion_announced = false;

        notices.push(SessionNotice::GameReset);
        notices.push(SessionNotice::ProgressChanged {
            collected: 0,
            total: self.ledger.total(),
        });
        notices.push(SessionNotice::LivesChanged { lives: self.lives });
        notices.push(SessionNotice::TimeUpdated { elapsed: 0.0 });
        notices
    }

    fn abandon_sequence(&mut self, notices: &mut Notices) {
        if let Some(active) = self.active_sequence.take() {
            notices.push(SessionNotice::SequencePuzzleAbandoned {
                puzzle: active.puzzle,
            });
        }
    }

    fn game_over(&mut self, reason: GameOverReason, notices: &mut Notices) {
        self.abandon_sequence(notices);
        self.enter(GameState::GameOver, notices);
        notices.push(SessionNotice::GameOver { reason });
        notices.push(SessionNotice::Sound(SoundCue::GameOver));
    }

    fn evaluate_victory(&mut self, notices: &mut Notices) {
        if !self.ledger.is_complete() {
            return;
        }
        if self.boss_defeated {
            self.abandon_sequence(notices);
            self.enter(GameState::Victory, notices);
            notices.push(SessionNotice::VictoryAchieved {
                elapsed: self.elapsed,
            });
            notices.push(SessionNotice::Sound(SoundCue::Victory));
        } else if !self.completion_announced {
            self.completion_announced = true;
            notices.push(SessionNotice::CollectionComplete {
                total: self.ledger.total(),
            });
        }
    }
}
