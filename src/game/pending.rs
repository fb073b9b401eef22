//! Holding buffer between the inbound handler and the tick boundary
//!
//! Inbound frames may arrive any number of times between two ticks. Each one
//! overwrites its own slot; the tick loop reads the buffer once per tick.

use uuid::Uuid;

use crate::ws::protocol::ClientCommand;

/// Latest value per command key since the last reset
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PendingCommands {
    pub is_burning: bool,
    pub is_paused: bool,
    /// `None` until the client sends a fuel load
    pub fuel_mass: Option<f64>,
    /// `None` until the client sends a dry mass
    pub dry_mass: Option<f64>,
    /// Session the client asked to resume
    pub session_id: Option<Uuid>,
}

impl PendingCommands {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a command, last write wins
    pub fn apply(&mut self, command: ClientCommand) {
        match command {
            ClientCommand::IsBurning(on) => self.is_burning = on,
            ClientCommand::IsPaused(paused) => self.is_paused = paused,
            ClientCommand::FuelMass(mass) => self.fuel_mass = Some(mass),
            ClientCommand::DryMass(mass) => self.dry_mass = Some(mass),
            ClientCommand::SessionId(id) => self.session_id = Some(id),
        }
    }

    /// Both masses present and positive
    pub fn launch_masses(&self) -> Option<(f64, f64)> {
        match (self.fuel_mass, self.dry_mass) {
            (Some(fuel), Some(dry)) if fuel > 0.0 && dry > 0.0 => Some((fuel, dry)),
            _ => None,
        }
    }

    /// Back to the invalid sentinels used between attempts
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_write_wins_per_key() {
        let mut pending = PendingCommands::new();

        pending.apply(ClientCommand::IsPaused(true));
        pending.apply(ClientCommand::FuelMass(100.0));
        pending.apply(ClientCommand::IsPaused(false));
        pending.apply(ClientCommand::FuelMass(200.0));

        assert!(!pending.is_paused);
        assert_eq!(pending.fuel_mass, Some(200.0));
    }

    #[test]
    fn launch_needs_both_positive_masses() {
        let mut pending = PendingCommands::new();
        assert_eq!(pending.launch_masses(), None);

        pending.apply(ClientCommand::FuelMass(8200.0));
        assert_eq!(pending.launch_masses(), None);

        pending.apply(ClientCommand::DryMass(0.0));
        assert_eq!(pending.launch_masses(), None);

        pending.apply(ClientCommand::DryMass(-3.0));
        assert_eq!(pending.launch_masses(), None);

        pending.apply(ClientCommand::DryMass(8200.0));
        assert_eq!(pending.launch_masses(), Some((8200.0, 8200.0)));
    }

    #[test]
    fn reset_restores_sentinels() {
        let mut pending = PendingCommands::new();
        pending.apply(ClientCommand::IsBurning(true));
        pending.apply(ClientCommand::FuelMass(1.0));
        pending.apply(ClientCommand::SessionId(Uuid::new_v4()));

        pending.reset();

        assert_eq!(pending, PendingCommands::default());
    }
}
