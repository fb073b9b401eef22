//! Session phase transitions, evaluated once per tick before physics

use rand::Rng;
use tracing::{debug, info};
use uuid::Uuid;

use super::pending::PendingCommands;
use super::physics::LanderSpec;
use super::session::{Phase, SessionState};
use super::stats::{AttemptStats, Ending};

/// What the tick loop has to act on after evaluation
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    /// Nothing changed phase
    Stay,
    /// Client asked to take over a stored session; the rest of the tick is skipped
    Resume(Uuid),
    /// Menu to Playing with fresh masses
    Launched,
    Paused,
    Unpaused,
    /// Ended to Menu; stats and message go out, the pulse is set on the snapshot
    AttemptFinished {
        stats: AttemptStats,
        message: String,
    },
}

/// Interprets pending commands against the current phase
#[derive(Debug, Clone, Copy)]
pub struct StateMachine {
    spec: LanderSpec,
}

impl StateMachine {
    pub fn new(spec: LanderSpec) -> Self {
        Self { spec }
    }

    pub fn spec(&self) -> &LanderSpec {
        &self.spec
    }

    /// Apply pending commands to `state` for this tick.
    ///
    /// `session_id` is the identifier the loop currently persists under; presenting it
    /// again is not a resume.
    pub fn evaluate<R: Rng + ?Sized>(
        &self,
        session_id: Uuid,
        state: &mut SessionState,
        pending: &mut PendingCommands,
        rng: &mut R,
    ) -> Transition {
        let requested_resume = pending.session_id.take();
        let phase = state.phase;

        let transition = match phase {
            Phase::Menu => {
                if let Some(previous) = requested_resume.filter(|id| *id != session_id) {
                    return Transition::Resume(previous);
                }

                match pending.launch_masses() {
                    Some((fuel, dry)) => {
                        let fuel = fuel.min(self.spec.max_load);
                        let dry = dry.min(self.spec.max_load);
                        state.launch(&self.spec, fuel, dry);
                        pending.is_paused = false;
                        info!(
                            session_id = %session_id,
                            attempt = state.attempts,
                            fuel_mass = fuel,
                            dry_mass = dry,
                            "Attempt started"
                        );
                        Transition::Launched
                    }
                    None => Transition::Stay,
                }
            }
            Phase::Playing => {
                if pending.is_paused {
                    state.phase = Phase::Paused;
                    Transition::Paused
                } else {
                    Transition::Stay
                }
            }
            Phase::Paused => {
                if !pending.is_paused {
                    state.phase = Phase::Playing;
                    Transition::Unpaused
                } else {
                    Transition::Stay
                }
            }
            Phase::Ended => {
                let stats = AttemptStats::from_state(state);
                let message = Ending::for_state(state).message(rng);

                state.phase = Phase::Menu;
                state.ended_this_tick = false;
                pending.reset();

                info!(
                    session_id = %session_id,
                    attempts = stats.attempts,
                    landings = stats.landings,
                    crashes = stats.crashes,
                    "Attempt finished"
                );
                Transition::AttemptFinished { stats, message }
            }
        };

        if let Some(id) = requested_resume.filter(|_| phase != Phase::Menu) {
            debug!(session_id = %session_id, requested = %id, "Resume ignored outside the menu");
        }

        if state.phase == Phase::Playing {
            state.apply_burn_request(pending.is_burning);
        } else {
            state.enforce();
        }

        transition
    }
}
