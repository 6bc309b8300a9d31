use bevy::prelude::*;

/// Fixed order of work inside one `Update` pass.
///
/// Player intents (pickups, activations, shots) resolve before AI acts, so a
/// puzzle collected in the same frame as a guard contact is counted first.
#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
pub enum GameSchedule {
    FrameStart,
    ResolveIntent,
    PerformAction,
    Effect,
    FrameEnd,
}

pub struct SystemSchedulePlugin;

impl Plugin for SystemSchedulePlugin {
    fn build(&self, app: &mut App) {
        app.configure_sets(
            Update,
            (
                GameSchedule::FrameStart,
                GameSchedule::ResolveIntent,
                GameSchedule::PerformAction,
                GameSchedule::Effect,
                GameSchedule::FrameEnd,
            )
                .chain(),
        );
    }
}
