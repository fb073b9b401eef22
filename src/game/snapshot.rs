//! Outbound frame building

use uuid::Uuid;

use crate::ws::protocol::ServerFrame;

use super::session::SessionState;
use super::stats::AttemptStats;

/// Per-tick state frame
pub fn state_frame(session_id: Uuid, state: &SessionState, ended_last_tick: bool) -> ServerFrame {
    ServerFrame {
        session_id: Some(session_id),
        altitude: Some(state.altitude),
        velocity: Some(state.vertical_velocity),
        mass: Some(state.fuel_mass),
        is_burning: Some(state.is_burning),
        health: Some(state.health),
        ended_last_tick: ended_last_tick.then_some(true),
        ..Default::default()
    }
}

/// Tells the client which identifier to keep for a later resume
pub fn announcement(session_id: Uuid) -> ServerFrame {
    ServerFrame {
        session_id: Some(session_id),
        ..Default::default()
    }
}

/// Sent once when an attempt is closed
pub fn attempt_summary(stats: AttemptStats, message: String) -> ServerFrame {
    ServerFrame {
        stats: Some(stats),
        message: Some(message),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::physics::LanderSpec;

    #[test]
    fn pulse_only_when_set() {
        let state = SessionState::new(&LanderSpec::default());
        let id = Uuid::new_v4();

        assert_eq!(state_frame(id, &state, false).ended_last_tick, None);
        assert_eq!(state_frame(id, &state, true).ended_last_tick, Some(true));
    }

    #[test]
    fn state_frame_reports_fuel_as_mass() {
        let mut state = SessionState::new(&LanderSpec::default());
        state.fuel_mass = 12.5;

        let frame = state_frame(Uuid::new_v4(), &state, false);

        assert_eq!(frame.mass, Some(12.5));
        assert!(frame.stats.is_none());
    }
}
