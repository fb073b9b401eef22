//! Persisted row layout for a session

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::game::session::{Phase, SessionState};

use super::StoreError;

/// One stored session: every state field, the phase as a string tag and
/// booleans as 0/1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub session_id: Uuid,
    pub altitude: f64,
    pub velocity: f64,
    pub fuel_mass: f64,
    pub initial_fuel_mass: f64,
    pub dry_mass: f64,
    pub is_burning: u8,
    pub health: f64,
    pub state: String,
    pub ended_last_tick: u8,
    pub attempts: u32,
    pub landings: u32,
    pub crashes: u32,
    pub highest_altitude: f64,
    pub updated_at: DateTime<Utc>,
}

impl SessionRecord {
    pub fn from_state(session_id: Uuid, state: &SessionState) -> Self {
        Self {
            session_id,
            altitude: state.altitude,
            velocity: state.vertical_velocity,
            fuel_mass: state.fuel_mass,
            initial_fuel_mass: state.initial_fuel_mass,
            dry_mass: state.dry_mass,
            is_burning: u8::from(state.is_burning),
            health: state.health,
            state: state.phase.as_str().to_string(),
            ended_last_tick: u8::from(state.ended_this_tick),
            attempts: state.attempts,
            landings: state.landings,
            crashes: state.crashes,
            highest_altitude: state.highest_altitude,
            updated_at: Utc::now(),
        }
    }

    pub fn into_state(self) -> Result<SessionState, StoreError> {
        let corrupt = |reason: String| StoreError::Corrupt {
            session_id: self.session_id,
            reason,
        };

        let phase = Phase::from_tag(&self.state)
            .ok_or_else(|| corrupt(format!("unknown phase {:?}", self.state)))?;
        let is_burning = flag(self.is_burning).ok_or_else(|| corrupt("is_burning".into()))?;
        let ended_this_tick =
            flag(self.ended_last_tick).ok_or_else(|| corrupt("ended_last_tick".into()))?;

        if !(0.0..=100.0).contains(&self.health) {
            return Err(corrupt(format!("health {} out of range", self.health)));
        }
        if self.fuel_mass < 0.0 || self.altitude < 0.0 {
            return Err(corrupt("negative fuel or altitude".into()));
        }

        Ok(SessionState {
            altitude: self.altitude,
            vertical_velocity: self.velocity,
            fuel_mass: self.fuel_mass,
            initial_fuel_mass: self.initial_fuel_mass,
            dry_mass: self.dry_mass,
            is_burning,
            health: self.health,
            phase,
            ended_this_tick,
            attempts: self.attempts,
            landings: self.landings,
            crashes: self.crashes,
            highest_altitude: self.highest_altitude,
        })
    }
}

fn flag(value: u8) -> Option<bool> {
    match value {
        0 => Some(false),
        1 => Some(true),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::physics::LanderSpec;

    fn sample_state() -> SessionState {
        let spec = LanderSpec::default();
        let mut state = SessionState::new(&spec);
        state.launch(&spec, 4_000.0, 8_200.0);
        state.altitude = 87.25;
        state.vertical_velocity = -2.125;
        state.fuel_mass = 3_912.5;
        state.is_burning = true;
        state.crashes = 2;
        state.landings = 5;
        state
    }

    #[test]
    fn record_encodes_booleans_and_phase() {
        let record = SessionRecord::from_state(Uuid::new_v4(), &sample_state());
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["is_burning"], 1);
        assert_eq!(json["ended_last_tick"], 0);
        assert_eq!(json["state"], "playing");
    }

    #[test]
    fn record_restores_every_field() {
        let state = sample_state();
        let record = SessionRecord::from_state(Uuid::new_v4(), &state);

        assert_eq!(record.into_state().unwrap(), state);
    }

    #[test]
    fn unknown_phase_is_corrupt() {
        let mut record = SessionRecord::from_state(Uuid::new_v4(), &sample_state());
        record.state = "lobby".into();

        assert!(matches!(record.into_state(), Err(StoreError::Corrupt { .. })));
    }

    #[test]
    fn non_binary_flag_is_corrupt() {
        let mut record = SessionRecord::from_state(Uuid::new_v4(), &sample_state());
        record.is_burning = 2;

        assert!(matches!(record.into_state(), Err(StoreError::Corrupt { .. })));
    }
}
