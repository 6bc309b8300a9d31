//! Straight-line stand-in for a navmesh agent. Requests are resolved on the
//! next steering pass, so an agent reports `path_pending` for one frame.

use {
    bevy::prelude::*,
    session_resources::simulating,
    system_schedule::GameSchedule,
};

pub struct NavigationPlugin;

impl Plugin for NavigationPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            steer_agents
                .in_set(GameSchedule::PerformAction)
                .run_if(simulating),
        );
    }
}

#[derive(Component, Debug, Clone, Default, PartialEq)]
#[require(Transform)]
pub struct NavAgent {
    pub speed: f32,
    pub stopping_distance: f32,
    destination: Option<Vec3>,
    velocity: Vec3,
    remaining_distance: f32,
    path_pending: bool,
}

impl NavAgent {
    pub fn new(speed: f32, stopping_distance: f32) -> Self {
        Self {
            speed,
            stopping_distance,
            ..default()
        }
    }

    pub fn request_move_to(&mut self, destination: Vec3) {
        self.destination = Some(destination);
        self.path_pending = true;
    }

    /// Drops the destination and stands still.
    pub fn halt(&mut self) {
        self.destination = None;
        self.velocity = Vec3::ZERO;
        self.remaining_distance = 0.0;
        self.path_pending = false;
    }

    pub fn destination(&self) -> Option<Vec3> {
        self.destination
    }

    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    pub fn remaining_distance(&self) -> f32 {
        self.remaining_distance
    }

    pub fn path_pending(&self) -> bool {
        self.path_pending
    }

    /// Moves `position` towards the destination by at most `speed * delta`.
    pub fn steer(&mut self, position: &mut Vec3, delta: f32) {
        self.path_pending = false;
        let Some(destination) = self.destination else {
            self.velocity = Vec3::ZERO;
            return;
        };

        let offset = destination - *position;
        let distance = offset.length();
        if distance <= self.stopping_distance {
            self.velocity = Vec3::ZERO;
            self.remaining_distance = distance;
            return;
        }

        let direction = offset / distance;
        let step = (self.speed * delta).min(distance);
        *position += direction * step;
        self.remaining_distance = distance - step;
        self.velocity = if self.remaining_distance <= self.stopping_distance {
            Vec3::ZERO
        } else {
            direction * self.speed
        };
    }
}

pub fn steer_agents(time: Res<Time>, mut agents: Query<(&mut NavAgent, &mut Transform)>) {
    let delta = time.delta_secs();
    for (mut agent, mut transform) in agents.iter_mut() {
        agent.steer(&mut transform.translation, delta);

        let heading = agent.velocity().with_y(0.0);
        if heading.length_squared() > f32::EPSILON {
            let target = transform.translation + heading;
            transform.look_at(target, Vec3::Y);
        }
    }
}
