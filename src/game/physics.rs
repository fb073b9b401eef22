//! Lander physics: 1-D vertical motion over the lunar surface
//!
//! Notes on the Apollo Lunar Module, which the default lander is modeled on:
//! fuel mass 8 200 kg, dry mass 8 200 kg (ascent stage included), thrust 45 040 N,
//! specific impulse 311 s in vacuum. The mass flow follows from
//! `F = g0 * Isp * mdot`, so `mdot = F / g0 / Isp`.

use super::session::{Phase, SessionState};

/// Gravitational constant (m^3 kg^-1 s^-2)
pub const G: f64 = 6.6743e-11;
/// Standard gravity, used for the specific impulse relation (m/s^2)
pub const G_0: f64 = 9.80665;
pub const LUNAR_MASS: f64 = 7.346e22;
pub const LUNAR_RADIUS: f64 = 1_737_400.0;

/// Lander and landing constants
#[derive(Debug, Clone, Copy)]
pub struct LanderSpec {
    /// Default fuel load (kg)
    pub fuel_mass: f64,
    /// Default dry mass (kg)
    pub dry_mass: f64,
    /// Engine thrust (N)
    pub thrust: f64,
    /// Specific impulse (s)
    pub specific_impulse: f64,
    /// Touchdown velocity below which the lander takes damage (m/s, negative)
    pub warn_velocity: f64,
    /// Touchdown velocity below which the lander is destroyed (m/s, negative)
    pub kill_velocity: f64,
    /// Altitude every attempt starts from (m)
    pub launch_altitude: f64,
    /// Largest fuel or dry mass a client may request (kg)
    pub max_load: f64,
}

impl Default for LanderSpec {
    fn default() -> Self {
        Self {
            fuel_mass: 8_200.0,
            dry_mass: 8_200.0,
            thrust: 45_040.0,
            specific_impulse: 311.0,
            warn_velocity: -3.0,
            kill_velocity: -5.0,
            launch_altitude: 150.0,
            max_load: 100_000.0,
        }
    }
}

impl LanderSpec {
    /// Propellant consumed per second of burn (kg/s)
    pub fn mass_flow(&self) -> f64 {
        self.thrust / G_0 / self.specific_impulse
    }
}

/// How an attempt ended at contact
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Outcome {
    /// Slower than the warn threshold, no damage
    Landed,
    /// Between the thresholds, health reduced but above zero
    Damaged { health: f64 },
    /// Lander destroyed
    Crashed,
}

impl Outcome {
    pub fn is_crash(&self) -> bool {
        matches!(self, Outcome::Crashed)
    }
}

/// Surface contact detected during a step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// Vertical velocity at the moment of contact, before clamping
    pub impact_velocity: f64,
    pub outcome: Outcome,
}

/// Result of advancing one timestep
#[derive(Debug, Clone)]
pub struct Step {
    pub state: SessionState,
    pub contact: Option<Contact>,
}

/// Lunar gravitational acceleration magnitude at `altitude` meters above the surface
pub fn lunar_gravity(altitude: f64) -> f64 {
    let r = altitude + LUNAR_RADIUS;
    G * LUNAR_MASS / (r * r)
}

/// Classify a touchdown at `velocity` for a lander currently at `health`.
/// Returns the outcome and the health after impact.
pub fn classify_contact(velocity: f64, health: f64, spec: &LanderSpec) -> (Outcome, f64) {
    if velocity < spec.kill_velocity {
        return (Outcome::Crashed, 0.0);
    }

    if velocity < spec.warn_velocity {
        let excess = (spec.warn_velocity - velocity) / (spec.warn_velocity - spec.kill_velocity);
        let remaining = (health - 100.0 * excess).clamp(0.0, 100.0);
        if remaining <= 0.0 {
            return (Outcome::Crashed, 0.0);
        }
        return (Outcome::Damaged { health: remaining }, remaining);
    }

    (Outcome::Landed, health)
}

/// Physics system for the lander
pub struct PhysicsSystem;

impl PhysicsSystem {
    /// Advance the lander by `dt` seconds.
    ///
    /// Only a `Playing` state moves; anything else comes back unchanged, so a second
    /// contact cannot be recorded before the state machine leaves `Ended`.
    pub fn advance(state: &SessionState, spec: &LanderSpec, dt: f64) -> Step {
        let mut next = state.clone();
        if state.phase != Phase::Playing {
            return Step {
                state: next,
                contact: None,
            };
        }

        let mut position = state.altitude + LUNAR_RADIUS;
        let mut velocity = state.vertical_velocity;
        let mut fuel = state.fuel_mass;
        let mut is_burning = state.is_burning;

        let mut acceleration = -lunar_gravity(state.altitude);

        if is_burning {
            fuel -= spec.mass_flow() * dt;

            // An empty tank gives no thrust, including a step that burns it to exactly zero
            if fuel <= 0.0 {
                fuel = 0.0;
                is_burning = false;
            } else {
                acceleration += spec.thrust / (fuel + state.dry_mass);
            }
        }

        // Position from the pre-step velocity, then velocity
        position += velocity * dt;
        velocity += acceleration * dt;

        let altitude = position - LUNAR_RADIUS;

        next.fuel_mass = fuel;
        next.is_burning = is_burning;

        if altitude <= 0.0 {
            let (outcome, health) = classify_contact(velocity, state.health, spec);

            next.altitude = 0.0;
            next.vertical_velocity = 0.0;
            next.is_burning = false;
            next.health = health;
            if outcome.is_crash() {
                next.crashes += 1;
            } else {
                next.landings += 1;
            }
            next.phase = Phase::Ended;
            next.ended_this_tick = true;

            return Step {
                state: next,
                contact: Some(Contact {
                    impact_velocity: velocity,
                    outcome,
                }),
            };
        }

        next.altitude = altitude;
        next.vertical_velocity = velocity;
        if altitude > next.highest_altitude {
            next.highest_altitude = altitude;
        }

        Step {
            state: next,
            contact: None,
        }
    }
}
