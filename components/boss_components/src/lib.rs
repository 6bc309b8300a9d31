use {
    bevy::prelude::*,
    serde::{Deserialize, Serialize},
    shared_components::LevelEntity,
};

pub struct BossComponentsPlugin;

impl Plugin for BossComponentsPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<BossPhase>()
            .register_type::<BossSettings>();
    }
}

#[derive(Reflect, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BossSettings {
    pub max_health: u32,
    pub attack_interval: f32,
    pub charge_time: f32,
    pub laser_duration: f32,
    /// Minimum seconds between two laser hits on the player.
    pub damage_interval: f32,
    pub laser_range: f32,
    /// How fast the beam grows after firing starts.
    pub laser_speed: f32,
    pub enable_movement: bool,
    pub move_speed: f32,
    /// Amplitude of the hover along Z.
    pub move_distance: f32,
    pub stop_while_attacking: bool,
}

impl Default for BossSettings {
    fn default() -> Self {
        Self {
            max_health: 3,
            attack_interval: 4.0,
            charge_time: 1.5,
            laser_duration: 3.0,
            damage_interval: 1.0,
            laser_range: 50.0,
            laser_speed: 30.0,
            enable_movement: true,
            move_speed: 3.0,
            move_distance: 5.0,
            stop_while_attacking: true,
        }
    }
}

#[derive(Reflect, Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum BossPhase {
    #[default]
    Cooldown,
    Charging,
    Firing,
    Defeated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitOutcome {
    /// The core was shielded.
    Deflected,
    Damaged { remaining: u32 },
    Defeated,
    /// The boss was already dead; nothing happened.
    Ignored,
}

/// Attack-cycle state of the boss: Cooldown -> Charging -> Firing -> Cooldown
/// until its health runs out.
#[derive(Component, Debug, Clone)]
#[require(LevelEntity, Transform)]
pub struct Boss {
    settings: BossSettings,
    anchor: Vec3,
    phase: BossPhase,
    phase_elapsed: f32,
    health: u32,
    hover_clock: f32,
    laser_length: f32,
    damage_cooldown: f32,
}

impl Boss {
    pub fn new(settings: BossSettings, anchor: Vec3) -> Self {
        Self {
            settings,
            anchor,
            phase: BossPhase::Cooldown,
            phase_elapsed: 0.0,
            health: settings.max_health,
            hover_clock: 0.0,
            laser_length: 0.0,
            damage_cooldown: 0.0,
        }
    }

    pub fn settings(&self) -> &BossSettings {
        &self.settings
    }

    pub fn phase(&self) -> BossPhase {
        self.phase
    }

    pub fn health(&self) -> u32 {
        self.health
    }

    pub fn is_defeated(&self) -> bool {
        self.phase == BossPhase::Defeated
    }

    /// The core only takes damage while the laser is out.
    pub fn is_vulnerable(&self) -> bool {
        self.phase == BossPhase::Firing
    }

    pub fn is_attacking(&self) -> bool {
        matches!(self.phase, BossPhase::Charging | BossPhase::Firing)
    }

    pub fn laser_length(&self) -> f32 {
        if self.phase == BossPhase::Firing {
            self.laser_length
        } else {
            0.0
        }
    }

    pub fn is_moving(&self) -> bool {
        self.settings.enable_movement
            && !self.is_defeated()
            && !(self.settings.stop_while_attacking && self.is_attacking())
    }

    /// Where the hover puts the boss right now.
    pub fn hover_position(&self) -> Vec3 {
        let offset = (self.hover_clock * self.settings.move_speed).sin() * self.settings.move_distance;
        self.anchor + Vec3::Z * offset
    }

    fn phase_length(&self) -> f32 {
        match self.phase {
            BossPhase::Cooldown => self.settings.attack_interval,
            BossPhase::Charging => self.settings.charge_time,
            BossPhase::Firing => self.settings.laser_duration,
            BossPhase::Defeated => f32::INFINITY,
        }
    }

    fn next_phase(&self) -> BossPhase {
        match self.phase {
            BossPhase::Cooldown => BossPhase::Charging,
            BossPhase::Charging => BossPhase::Firing,
            BossPhase::Firing => BossPhase::Cooldown,
            BossPhase::Defeated => BossPhase::Defeated,
        }
    }

    /// Advances the cycle and returns the phases entered, oldest first.
    pub fn tick(&mut self, delta: f32) -> Vec<BossPhase> {
        let mut entered = Vec::new();
        if self.is_defeated() || delta <= 0.0 {
            return entered;
        }

        if self.is_moving() {
            self.hover_clock += delta;
        }
        self.damage_cooldown = (self.damage_cooldown - delta).max(0.0);

        let mut remaining = delta;
        while self.phase_elapsed + remaining >= self.phase_length() {
            remaining -= self.phase_length() - self.phase_elapsed;
            self.phase = self.next_phase();
            self.phase_elapsed = 0.0;
            if self.phase == BossPhase::Firing {
                self.laser_length = 0.0;
            }
            entered.push(self.phase);
        }
        self.phase_elapsed += remaining;

        if self.phase == BossPhase::Firing {
            self.laser_length =
                (self.laser_length + self.settings.laser_speed * remaining).min(self.settings.laser_range);
        }
        entered
    }

    pub fn take_hit(&mut self) -> HitOutcome {
        if self.is_defeated() {
            return HitOutcome::Ignored;
        }
        if !self.is_vulnerable() {
            return HitOutcome::Deflected;
        }

        self.health = self.health.saturating_sub(1);
        if self.health > 0 {
            return HitOutcome::Damaged {
                remaining: self.health,
            };
        }
        self.phase = BossPhase::Defeated;
        self.phase_elapsed = 0.0;
        self.laser_length = 0.0;
        HitOutcome::Defeated
    }

    /// True when the laser may hurt the player now; starts the damage interval.
    pub fn try_damage_player(&mut self) -> bool {
        if self.phase != BossPhase::Firing || self.damage_cooldown > 0.0 {
            return false;
        }
        self.damage_cooldown = self.settings.damage_interval;
        true
    }
}

/// Weak spot of a boss. Follows the boss at `offset`.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
#[require(LevelEntity, Transform)]
pub struct BossCore {
    pub boss: Entity,
    pub offset: Vec3,
}
