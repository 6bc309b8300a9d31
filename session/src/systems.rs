use {
    bevy::prelude::*,
    session_events::*,
    session_resources::{GameSession, Notices, Rejection, SessionNotice},
    states::GameState,
};

/// Turns session notices into observer events, preserving their order.
///
/// Events are queued on `commands`, so observers only ever see a session
/// whose transition has fully completed.
pub fn publish(commands: &mut Commands, notices: Notices) {
    for notice in notices {
        match notice {
            SessionNotice::StateChanged { from, to } => {
                info!(?from, ?to, "Game state changed");
                commands.trigger(StateChanged { from, to });
            }
            SessionNotice::GameReset => commands.trigger(GameReset),
            SessionNotice::GameStarted => {
                info!("New run started");
                commands.trigger(GameStarted);
            }
            SessionNotice::PuzzleCollected { id } => {
                info!(puzzle_id = id, "Puzzle piece collected");
                commands.trigger(PuzzleCollected { id });
            }
            SessionNotice::ProgressChanged { collected, total } => {
                commands.trigger(ProgressChanged { collected, total });
            }
            SessionNotice::CollectionComplete { total } => {
                info!(total, "All puzzle pieces collected, boss still standing");
                commands.trigger(CollectionComplete { total });
            }
            SessionNotice::LivesChanged { lives } => {
                commands.trigger(LivesChanged { lives });
            }
            SessionNotice::TimeUpdated { elapsed } => {
                commands.trigger(TimeUpdated { elapsed });
            }
            SessionNotice::VictoryAchieved { elapsed } => {
                info!(elapsed, "Victory");
                commands.trigger(VictoryAchieved { elapsed });
            }
            SessionNotice::GameOver { reason } => {
                info!(%reason, "Game over");
                commands.trigger(GameOver { reason });
            }
            SessionNotice::SequenceInputAccepted {
                puzzle,
                entered,
                expected,
            } => {
                debug!(?puzzle, entered, expected, "Sequence token accepted");
                commands.trigger(SequenceInputAccepted {
                    puzzle,
                    entered,
                    expected,
                });
            }
            SessionNotice::SequencePuzzleSolved { puzzle } => {
                info!(?puzzle, "Sequence puzzle solved");
                commands.trigger(SequencePuzzleSolved { puzzle });
            }
            SessionNotice::SequencePuzzleFailed { puzzle } => {
                debug!(?puzzle, "Sequence puzzle failed");
                commands.trigger(SequencePuzzleFailed { puzzle });
            }
            SessionNotice::SequencePuzzleAbandoned { puzzle } => {
                debug!(?puzzle, "Sequence puzzle abandoned");
                commands.trigger(SequencePuzzleAbandoned { puzzle });
            }
            SessionNotice::Sound(cue) => commands.trigger(PlaySound { cue }),
        }
    }
}

fn settle(commands: &mut Commands, outcome: Result<Notices, Rejection>) {
    match outcome {
        Ok(notices) => publish(commands, notices),
        Err(rejection) => warn!(%rejection, "Session request ignored"),
    }
}

// ============================================================================
// Lifecycle
// ============================================================================

pub fn on_start_new_game(
    _trigger: On<StartNewGame>,
    mut session: ResMut<GameSession>,
    mut commands: Commands,
) {
    settle(&mut commands, session.start_new_game());
}

pub fn on_load_complete(
    _trigger: On<LoadComplete>,
    mut session: ResMut<GameSession>,
    mut commands: Commands,
) {
    settle(&mut commands, session.finish_loading());
}

pub fn on_pause_game(
    _trigger: On<PauseGame>,
    mut session: ResMut<GameSession>,
    mut commands: Commands,
) {
    settle(&mut commands, session.pause());
}

pub fn on_resume_game(
    _trigger: On<ResumeGame>,
    mut session: ResMut<GameSession>,
    mut commands: Commands,
) {
    settle(&mut commands, session.resume());
}

pub fn on_toggle_pause(
    _trigger: On<TogglePause>,
    mut session: ResMut<GameSession>,
    mut commands: Commands,
) {
    settle(&mut commands, session.toggle_pause());
}

pub fn on_return_to_main_menu(
    _trigger: On<ReturnToMainMenu>,
    mut session: ResMut<GameSession>,
    mut commands: Commands,
) {
    let notices = session.return_to_main_menu();
    publish(&mut commands, notices);
}

pub fn on_restart_game(
    _trigger: On<RestartGame>,
    mut session: ResMut<GameSession>,
    mut commands: Commands,
) {
    let notices = session.restart_game();
    publish(&mut commands, notices);
}

pub fn on_quit_game(_trigger: On<QuitGame>, mut exit: MessageWriter<AppExit>) {
    info!("Quit requested");
    exit.write(AppExit::Success);
}

pub fn on_begin_cutscene(
    _trigger: On<BeginCutscene>,
    mut session: ResMut<GameSession>,
    mut commands: Commands,
) {
    settle(&mut commands, session.begin_cutscene());
}

pub fn on_end_cutscene(
    _trigger: On<EndCutscene>,
    mut session: ResMut<GameSession>,
    mut commands: Commands,
) {
    settle(&mut commands, session.end_cutscene());
}

// ============================================================================
// Progression
// ============================================================================

pub fn on_collect_puzzle(
    trigger: On<CollectPuzzle>,
    mut session: ResMut<GameSession>,
    mut commands: Commands,
) {
    settle(&mut commands, session.collect_puzzle(trigger.event().id));
}

pub fn on_start_sequence_puzzle(
    trigger: On<StartSequencePuzzle>,
    mut session: ResMut<GameSession>,
    mut commands: Commands,
) {
    let event = trigger.event();
    settle(
        &mut commands,
        session.start_sequence_puzzle(event.puzzle, event.expected.clone()),
    );
}

pub fn on_input_sequence_token(
    trigger: On<InputSequenceToken>,
    mut session: ResMut<GameSession>,
    mut commands: Commands,
) {
    settle(
        &mut commands,
        session.input_sequence_token(trigger.event().token.as_str()),
    );
}

pub fn on_player_detected(
    trigger: On<PlayerDetected>,
    mut session: ResMut<GameSession>,
    mut commands: Commands,
) {
    let source = trigger.event().source;
    let outcome = session.notify_player_detected();
    if outcome.is_ok() {
        info!(?source, lives = session.lives(), "Player detected");
    }
    settle(&mut commands, outcome);
}

pub fn on_boss_defeated(
    trigger: On<BossDefeated>,
    mut session: ResMut<GameSession>,
    mut commands: Commands,
) {
    info!(boss = ?trigger.event().boss, "Boss defeated");
    let notices = session.notify_boss_defeated();
    publish(&mut commands, notices);
}

// ============================================================================
// Systems
// ============================================================================

pub fn advance_clock(time: Res<Time>, mut session: ResMut<GameSession>, mut commands: Commands) {
    if session.state() != GameState::Playing {
        return;
    }
    let notices = session.tick(time.delta_secs());
    publish(&mut commands, notices);
}

/// Keeps the Bevy state in step with the session so `OnEnter`/`in_state`
/// users see every transition.
pub fn mirror_game_state(
    session: Res<GameSession>,
    state: Res<State<GameState>>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    if *state.get() != session.state() {
        next_state.set(session.state());
    }
}

pub fn apply_time_scale(session: Res<GameSession>, mut time: ResMut<Time<Virtual>>) {
    let freeze = session.state().freezes_time();
    if freeze && !time.is_paused() {
        debug!(state = ?session.state(), "Freezing virtual time");
        time.pause();
    } else if !freeze && time.is_paused() {
        debug!(state = ?session.state(), "Resuming virtual time");
        time.unpause();
    }
}
