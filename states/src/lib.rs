use bevy::prelude::*;

/// Top level progression state of a play session.
///
/// The authoritative value lives in `session_resources::GameSession`; this Bevy
/// state mirrors it one frame later so plugins can gate systems with
/// `in_state` and `OnEnter`/`OnExit`.
#[derive(States, Reflect, Default, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameState {
    #[default]
    MainMenu,
    Loading,
    Playing,
    Paused,
    PuzzleSolving,
    Victory,
    GameOver,
    Cutscene,
}

impl GameState {
    /// States in which the session reacts to detections and boss defeat.
    pub fn is_active(self) -> bool {
        matches!(
            self,
            GameState::Playing | GameState::PuzzleSolving | GameState::Cutscene
        )
    }

    /// States in which guards, the boss and puzzle timers are simulated.
    pub fn is_simulating(self) -> bool {
        matches!(self, GameState::Playing | GameState::PuzzleSolving)
    }

    /// Victory and GameOver can only be left by an explicit reset.
    pub fn is_terminal(self) -> bool {
        matches!(self, GameState::Victory | GameState::GameOver)
    }

    /// States in which virtual time is paused.
    pub fn freezes_time(self) -> bool {
        matches!(
            self,
            GameState::Paused | GameState::Victory | GameState::GameOver
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simulating_states() {
        assert!(GameState::Playing.is_simulating());
        assert!(GameState::PuzzleSolving.is_simulating());
        assert!(!GameState::Paused.is_simulating());
        assert!(!GameState::Cutscene.is_simulating());
    }

    #[test]
    fn test_terminal_states_freeze_time() {
        for state in [GameState::Victory, GameState::GameOver] {
            assert!(state.is_terminal());
            assert!(state.freezes_time());
            assert!(!state.is_active());
        }
        assert!(GameState::Paused.freezes_time());
        assert!(!GameState::Playing.freezes_time());
    }
}
