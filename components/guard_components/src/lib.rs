//! Patrol guard state machine.
//!
//! The [`Guard`] component is pure state: systems feed it the navigation
//! agent's status, elapsed time and sightings, and apply the [`GuardOrder`]s
//! it hands back to the pathfinding collaborator.

use {
    bevy::prelude::*,
    serde::{Deserialize, Serialize},
    shared_components::LevelEntity,
    thiserror::Error,
};

/// Below this speed an agent inside its stopping distance counts as arrived.
pub const ARRIVAL_SPEED_EPSILON: f32 = 1e-3;
/// Waypoints closer than this are the same point.
const WAYPOINT_EPSILON: f32 = 1e-3;

pub struct GuardComponentsPlugin;

impl Plugin for GuardComponentsPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<GuardBehavior>()
            .register_type::<GuardSettings>();
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GuardConfigError {
    #[error("patrol route needs at least 2 waypoints, got {0}")]
    TooFewWaypoints(usize),
    #[error("patrol route waypoints all coincide")]
    DegenerateRoute,
    #[error("{field} must be finite and non-negative, got {value}")]
    InvalidSetting { field: &'static str, value: f32 },
}

#[derive(Reflect, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardSettings {
    pub move_speed: f32,
    pub wait_time_at_point: f32,
    pub detection_range: f32,
    /// Height of the sight ray origin above the guard's position.
    pub eye_height: f32,
    pub stopping_distance: f32,
    /// Reach of the guard's body for contact catches.
    pub contact_radius: f32,
}

impl Default for GuardSettings {
    fn default() -> Self {
        Self {
            move_speed: 2.0,
            wait_time_at_point: 2.0,
            detection_range: 3.0,
            eye_height: 1.0,
            stopping_distance: 0.1,
            contact_radius: 0.5,
        }
    }
}

impl GuardSettings {
    pub fn validate(&self) -> Result<(), GuardConfigError> {
        let fields = [
            ("move_speed", self.move_speed),
            ("wait_time_at_point", self.wait_time_at_point),
            ("detection_range", self.detection_range),
            ("eye_height", self.eye_height),
            ("stopping_distance", self.stopping_distance),
            ("contact_radius", self.contact_radius),
        ];
        for (field, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(GuardConfigError::InvalidSetting { field, value });
            }
        }
        Ok(())
    }
}

/// Cyclic list of waypoints with at least two distinct points.
#[derive(Debug, Clone, PartialEq)]
pub struct PatrolRoute(Vec<Vec3>);

impl PatrolRoute {
    pub fn new(points: Vec<Vec3>) -> Result<Self, GuardConfigError> {
        if points.len() < 2 {
            return Err(GuardConfigError::TooFewWaypoints(points.len()));
        }
        let first = points[0];
        if points.iter().all(|p| p.distance(first) <= WAYPOINT_EPSILON) {
            return Err(GuardConfigError::DegenerateRoute);
        }
        Ok(Self(points))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn point(&self, index: usize) -> Vec3 {
        self.0[index % self.0.len()]
    }

    pub fn next_index(&self, index: usize) -> usize {
        (index + 1) % self.0.len()
    }

    pub fn points(&self) -> &[Vec3] {
        &self.0
    }
}

/// Raw guard configuration as authored in the level. Validated into a
/// [`Guard`] when it is added to an entity.
#[derive(Component, Debug, Clone)]
#[require(LevelEntity)]
pub struct GuardPost {
    pub waypoints: Vec<Vec3>,
    pub settings: GuardSettings,
}

#[derive(Reflect, Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum GuardBehavior {
    #[default]
    Patrolling,
    Waiting,
    Chasing,
    /// Terminal until the guard is reset.
    Caught,
}

/// What the guard wants its navigation agent to do.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GuardOrder {
    MoveTo(Vec3),
    Halt,
}

/// Navigation agent readings the state machine needs.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AgentStatus {
    pub path_pending: bool,
    pub remaining_distance: f32,
    pub speed: f32,
}

#[derive(Component, Debug, Clone)]
pub struct Guard {
    route: PatrolRoute,
    settings: GuardSettings,
    waypoint: usize,
    behavior: GuardBehavior,
    wait_elapsed: f32,
}

impl Guard {
    pub fn new(route: PatrolRoute, settings: GuardSettings) -> Self {
        Self {
            route,
            settings,
            waypoint: 0,
            behavior: GuardBehavior::Patrolling,
            wait_elapsed: 0.0,
        }
    }

    pub fn from_post(post: &GuardPost) -> Result<Self, GuardConfigError> {
        post.settings.validate()?;
        let route = PatrolRoute::new(post.waypoints.clone())?;
        Ok(Self::new(route, post.settings))
    }

    pub fn behavior(&self) -> GuardBehavior {
        self.behavior
    }

    pub fn settings(&self) -> &GuardSettings {
        &self.settings
    }

    pub fn route(&self) -> &PatrolRoute {
        &self.route
    }

    pub fn waypoint_index(&self) -> usize {
        self.waypoint
    }

    pub fn current_waypoint(&self) -> Vec3 {
        self.route.point(self.waypoint)
    }

    pub fn wait_elapsed(&self) -> f32 {
        self.wait_elapsed
    }

    /// First order after initialization: head for waypoint 0.
    pub fn start(&self) -> GuardOrder {
        GuardOrder::MoveTo(self.route.point(0))
    }

    pub fn has_arrived(&self, agent: AgentStatus) -> bool {
        !agent.path_pending
            && agent.remaining_distance <= self.settings.stopping_distance
            && agent.speed <= ARRIVAL_SPEED_EPSILON
    }

    pub fn in_detection_range(&self, guard_position: Vec3, player_position: Vec3) -> bool {
        guard_position.distance(player_position) <= self.settings.detection_range
    }

    /// Advances arrival and waiting. Reaching the destination of a chase
    /// without a fresh sighting also ends in `Waiting`.
    pub fn tick_patrol(&mut self, delta: f32, agent: AgentStatus) -> Option<GuardOrder> {
        match self.behavior {
            GuardBehavior::Patrolling | GuardBehavior::Chasing => {
                if self.has_arrived(agent) {
                    self.behavior = GuardBehavior::Waiting;
                    self.wait_elapsed = 0.0;
                }
                None
            }
            GuardBehavior::Waiting => {
                self.wait_elapsed += delta;
                if self.wait_elapsed < self.settings.wait_time_at_point {
                    return None;
                }
                self.wait_elapsed = 0.0;
                self.waypoint = self.route.next_index(self.waypoint);
                self.behavior = GuardBehavior::Patrolling;
                Some(GuardOrder::MoveTo(self.current_waypoint()))
            }
            GuardBehavior::Caught => None,
        }
    }

    /// Range and line of sight confirmed for `player_position` this tick.
    pub fn observe_player(&mut self, player_position: Vec3) -> Option<GuardOrder> {
        if self.behavior == GuardBehavior::Caught {
            return None;
        }
        self.behavior = GuardBehavior::Chasing;
        self.wait_elapsed = 0.0;
        Some(GuardOrder::MoveTo(player_position))
    }

    /// Body contact with the player. `None` when already caught.
    pub fn catch(&mut self) -> Option<GuardOrder> {
        if self.behavior == GuardBehavior::Caught {
            return None;
        }
        self.behavior = GuardBehavior::Caught;
        self.wait_elapsed = 0.0;
        Some(GuardOrder::Halt)
    }

    pub fn reset(&mut self) -> GuardOrder {
        self.behavior = GuardBehavior::Patrolling;
        self.waypoint = 0;
        self.wait_elapsed = 0.0;
        self.start()
    }
}
