//! Per-connection session state (the blackboard)

use super::physics::LanderSpec;

/// Game phase of a session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Phase {
    /// Waiting for the client to load fuel and dry mass
    #[default]
    Menu,
    /// Attempt in progress, physics runs every tick
    Playing,
    /// Attempt frozen by the client
    Paused,
    /// Contact happened this tick, returns to menu on the next one
    Ended,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Menu => "menu",
            Phase::Playing => "playing",
            Phase::Paused => "paused",
            Phase::Ended => "end",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "menu" => Some(Phase::Menu),
            "playing" => Some(Phase::Playing),
            "paused" => Some(Phase::Paused),
            "end" => Some(Phase::Ended),
            _ => None,
        }
    }
}

/// Authoritative state of one session, owned by its tick loop
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    // Vehicle
    /// Meters above the surface
    pub altitude: f64,
    /// Meters per second, negative while descending
    pub vertical_velocity: f64,
    pub fuel_mass: f64,
    /// Fuel loaded at launch, upper bound for `fuel_mass`
    pub initial_fuel_mass: f64,
    pub dry_mass: f64,
    pub is_burning: bool,
    /// 0 (destroyed) to 100
    pub health: f64,

    // Meta game
    pub phase: Phase,
    pub ended_this_tick: bool,
    pub attempts: u32,
    pub landings: u32,
    pub crashes: u32,
    pub highest_altitude: f64,
}

impl SessionState {
    /// Fresh session sitting in the menu
    pub fn new(spec: &LanderSpec) -> Self {
        Self {
            altitude: spec.launch_altitude,
            vertical_velocity: 0.0,
            fuel_mass: spec.fuel_mass,
            initial_fuel_mass: spec.fuel_mass,
            dry_mass: spec.dry_mass,
            is_burning: false,
            health: 100.0,
            phase: Phase::Menu,
            ended_this_tick: false,
            attempts: 0,
            landings: 0,
            crashes: 0,
            highest_altitude: spec.launch_altitude,
        }
    }

    /// Put the vehicle back on the launch point for a new attempt
    pub fn launch(&mut self, spec: &LanderSpec, fuel_mass: f64, dry_mass: f64) {
        self.altitude = spec.launch_altitude;
        self.vertical_velocity = 0.0;
        self.fuel_mass = fuel_mass;
        self.initial_fuel_mass = fuel_mass;
        self.dry_mass = dry_mass;
        self.is_burning = false;
        self.health = 100.0;
        self.phase = Phase::Playing;
        self.ended_this_tick = false;
        self.highest_altitude = spec.launch_altitude;
        self.attempts += 1;
    }

    /// Set the engine state from the client's request, gated by what the vehicle allows
    pub fn apply_burn_request(&mut self, requested: bool) {
        self.is_burning =
            requested && self.phase == Phase::Playing && self.health > 0.0 && self.fuel_mass > 0.0;
    }

    /// Force the engine off whenever burning is not allowed
    pub fn enforce(&mut self) {
        if self.phase != Phase::Playing || self.health <= 0.0 || self.fuel_mass <= 0.0 {
            self.is_burning = false;
        }
    }
}
