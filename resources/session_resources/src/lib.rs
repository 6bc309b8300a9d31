//! Headless progression core: configuration, the puzzle ledger and the
//! [`GameSession`] state machine.

mod config;
mod ledger;
mod session;

pub use {
    config::{ConfigError, SessionConfig},
    ledger::PuzzleLedger,
    session::{GameSession, Notices, Rejection, SessionNotice},
};

use {bevy::prelude::*, states::GameState};

pub struct SessionResourcesPlugin;

impl Plugin for SessionResourcesPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SessionConfig>()
            .register_type::<SessionConfig>()
            .init_resource::<GameSession>();
    }
}

/// Run condition: guards, the boss and puzzle timers advance.
pub fn simulating(session: Option<Res<GameSession>>) -> bool {
    session.is_some_and(|session| session.state().is_simulating())
}

/// Run condition: the player can pick things up and use activators.
pub fn playing(session: Option<Res<GameSession>>) -> bool {
    session.is_some_and(|session| session.state() == GameState::Playing)
}
