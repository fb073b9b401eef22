//! Per-session fixed-rate tick loop

use std::sync::Arc;
use std::time::Duration;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tokio::sync::mpsc::{self, error::TryRecvError, error::TrySendError};
use tokio::time::{sleep_until, Instant};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::store::SessionStore;
use crate::util::time::{tick_budget, unix_millis, Timer, TIME_STEP};
use crate::ws::protocol::{ClientCommand, OutboundFrame};

use super::machine::{StateMachine, Transition};
use super::pending::PendingCommands;
use super::physics::{LanderSpec, PhysicsSystem};
use super::registry::SessionRegistry;
use super::session::{Phase, SessionState};
use super::snapshot;

/// Channels connecting a session loop to its transport
pub struct SessionChannels {
    /// Raw inbound text frames; closing the sender signals disconnect
    pub inbound: mpsc::Receiver<String>,
    /// Frames for the socket writer
    pub outbound: mpsc::Sender<OutboundFrame>,
}

/// What is left of a session once its loop exits
#[derive(Debug, Clone)]
pub struct SessionExit {
    pub session_id: Uuid,
    pub state: SessionState,
    pub ticks: u64,
}

/// Drives one session at a fixed cadence.
///
/// The loop owns the session state and the pending-command buffer; inbound frames
/// are folded into the buffer between ticks on the same task.
pub struct TickScheduler {
    session_id: Uuid,
    state: SessionState,
    pending: PendingCommands,
    machine: StateMachine,
    store: SessionStore,
    registry: Arc<SessionRegistry>,
    inbound: mpsc::Receiver<String>,
    outbound: mpsc::Sender<OutboundFrame>,
    budget: Duration,
    time_acceleration: u32,
    rng: ChaCha8Rng,
    tick: u64,
    disconnected: bool,
}

impl TickScheduler {
    /// Create a loop for a brand-new session in the menu
    pub fn new(
        store: SessionStore,
        registry: Arc<SessionRegistry>,
        spec: LanderSpec,
        time_acceleration: u32,
        channels: SessionChannels,
    ) -> Self {
        let mut session_id = Uuid::new_v4();
        while !registry.claim(session_id) {
            session_id = Uuid::new_v4();
        }

        Self {
            session_id,
            state: SessionState::new(&spec),
            pending: PendingCommands::new(),
            machine: StateMachine::new(spec),
            store,
            registry,
            inbound: channels.inbound,
            outbound: channels.outbound,
            budget: tick_budget(time_acceleration),
            time_acceleration: time_acceleration.max(1),
            rng: ChaCha8Rng::from_entropy(),
            tick: 0,
            disconnected: false,
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// Run until the transport goes away
    pub async fn run(mut self) -> SessionExit {
        info!(session_id = %self.session_id, "Session started");
        self.emit(OutboundFrame::State(snapshot::announcement(self.session_id)));

        loop {
            let timer = Timer::new();

            self.run_tick().await;

            let elapsed = timer.elapsed();
            if elapsed > self.budget {
                warn!(
                    session_id = %self.session_id,
                    elapsed_ms = elapsed.as_millis() as u64,
                    budget_ms = self.budget.as_millis() as u64,
                    "Behind {} ms, skipping {} ticks",
                    elapsed.as_millis(),
                    elapsed.as_millis() / self.budget.as_millis().max(1)
                );
                // No suspension this tick, so pick up a hangup here
                self.drain_inbound();
            } else {
                self.wait_until(timer.started_at() + self.budget).await;
            }

            if self.disconnected {
                break;
            }
        }

        if let Some(live) = self.registry.release(self.session_id) {
            info!(
                session_id = %self.session_id,
                ticks = self.tick,
                connected_ms = unix_millis().saturating_sub(live.connected_at),
                "Session loop stopped, state kept for resume"
            );
        }

        SessionExit {
            session_id: self.session_id,
            state: self.state,
            ticks: self.tick,
        }
    }

    /// One tick: input, transitions, physics, persistence, output
    async fn run_tick(&mut self) {
        self.drain_inbound();

        let transition = self.machine.evaluate(
            self.session_id,
            &mut self.state,
            &mut self.pending,
            &mut self.rng,
        );

        let mut ended_last_tick = false;
        match transition {
            Transition::Resume(previous) => {
                if self.resume(previous).await {
                    self.tick += 1;
                    return;
                }
            }
            Transition::AttemptFinished { stats, message } => {
                self.emit(OutboundFrame::State(snapshot::attempt_summary(stats, message)));
                ended_last_tick = true;
            }
            other @ (Transition::Launched | Transition::Paused | Transition::Unpaused) => {
                debug!(
                    session_id = %self.session_id,
                    transition = ?other,
                    phase = self.state.phase.as_str(),
                    "Phase changed"
                );
            }
            Transition::Stay => {}
        }

        if self.state.phase == Phase::Playing {
            let step = PhysicsSystem::advance(&self.state, self.machine.spec(), TIME_STEP);
            if let Some(contact) = step.contact {
                info!(
                    session_id = %self.session_id,
                    impact_velocity = contact.impact_velocity,
                    outcome = ?contact.outcome,
                    "Surface contact"
                );
            }
            self.state = step.state;
        }

        self.persist().await;

        self.emit(OutboundFrame::State(snapshot::state_frame(
            self.session_id,
            &self.state,
            ended_last_tick,
        )));

        self.tick += 1;
        if self.tick % u64::from(self.time_acceleration) == 0 {
            debug!(session_id = %self.session_id, tick = self.tick, state = ?self.state, "Tick");
        }
    }

    /// Swap in a stored session. The current record is dropped and the loop carries on
    /// under the resumed identifier. Returns false when the request was refused and the
    /// current session is kept.
    async fn resume(&mut self, previous: Uuid) -> bool {
        if !self.registry.claim(previous) {
            warn!(session_id = %self.session_id, requested = %previous, "Resume refused, session is live");
            self.emit(OutboundFrame::Error(format!(
                "Session already connected: {}",
                previous
            )));
            return false;
        }

        let restored = match self.store.get(previous).await {
            Ok(Some(state)) => state,
            Ok(None) => {
                self.registry.release(previous);
                warn!(session_id = %self.session_id, requested = %previous, "Resume of unknown session");
                self.emit(OutboundFrame::Error(format!("Unknown session: {}", previous)));
                return false;
            }
            Err(e) => {
                self.registry.release(previous);
                error!(session_id = %self.session_id, requested = %previous, error = %e, "Failed to load session");
                self.emit(OutboundFrame::Error(format!(
                    "Unable to restore session: {}",
                    previous
                )));
                return false;
            }
        };

        if let Err(e) = self.store.delete(self.session_id).await {
            error!(session_id = %self.session_id, error = %e, "Failed to remove superseded session");
        }
        self.registry.release(self.session_id);

        info!(from = %self.session_id, to = %previous, phase = restored.phase.as_str(), "Session resumed");

        self.session_id = previous;
        self.state = restored;
        self.emit(OutboundFrame::State(snapshot::state_frame(
            self.session_id,
            &self.state,
            false,
        )));
        true
    }

    async fn persist(&mut self) {
        if let Err(e) = self.store.put(self.session_id, &self.state).await {
            error!(session_id = %self.session_id, error = %e, "Failed to persist session");
        }
    }

    /// Suspend until `deadline`, folding inbound frames into the buffer meanwhile
    async fn wait_until(&mut self, deadline: Instant) {
        let sleep = sleep_until(deadline);
        tokio::pin!(sleep);

        loop {
            tokio::select! {
                _ = &mut sleep => break,
                frame = self.inbound.recv(), if !self.disconnected => match frame {
                    Some(text) => self.receive(&text),
                    None => self.mark_disconnected(),
                },
            }
        }
    }

    /// Fold everything already queued without waiting
    fn drain_inbound(&mut self) {
        while !self.disconnected {
            match self.inbound.try_recv() {
                Ok(text) => self.receive(&text),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => self.mark_disconnected(),
            }
        }
    }

    fn receive(&mut self, text: &str) {
        match ClientCommand::parse(text) {
            Ok(command) => self.pending.apply(command),
            Err(e) => {
                warn!(session_id = %self.session_id, error = %e, "Rejected client message");
                self.emit(OutboundFrame::Error(e.to_string()));
            }
        }
    }

    fn mark_disconnected(&mut self) {
        if !self.disconnected {
            info!(session_id = %self.session_id, "Client disconnected");
        }
        self.disconnected = true;
    }

    fn emit(&mut self, frame: OutboundFrame) {
        match self.outbound.try_send(frame) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                warn!(session_id = %self.session_id, "Client lagged, dropping frame");
            }
            Err(TrySendError::Closed(_)) => self.mark_disconnected(),
        }
    }
}
