// Copyright (c) 2026 rezky_nightky

use std::time::Duration;

use tracing::info;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Phase {
    Intro,
    Damping,
    Frozen,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PhaseEvent {
    DampingStarted,
    Frozen,
}

/// Elapsed-time offsets at which each phase begins.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PhaseSchedule {
    pub damp_at: Duration,
    pub freeze_at: Duration,
}

impl PhaseSchedule {
    /// Damping starts `damping_lead` before the freeze (or at once if the
    /// intro is shorter than the lead).
    pub fn from_intro(intro: Duration, damping_lead: Duration) -> Self {
        Self {
            damp_at: intro.saturating_sub(damping_lead),
            freeze_at: intro,
        }
    }

    fn start_of(&self, phase: Phase) -> Duration {
        match phase {
            Phase::Intro => Duration::ZERO,
            Phase::Damping => self.damp_at,
            Phase::Frozen => self.freeze_at,
        }
    }
}

impl Default for PhaseSchedule {
    fn default() -> Self {
        Self::from_intro(Duration::from_millis(3000), Duration::from_millis(1000))
    }
}

#[derive(Clone, Debug)]
pub struct PhaseController {
    schedule: PhaseSchedule,
    phase: Phase,
}

impl PhaseController {
    pub fn new(schedule: PhaseSchedule) -> Self {
        Self {
            schedule,
            phase: Phase::Intro,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn runs_diffusion(&self) -> bool {
        self.phase != Phase::Frozen
    }

    pub fn runs_damping(&self) -> bool {
        self.phase == Phase::Damping
    }

    /// Moves forward through every phase whose start time has passed.
    ///
    /// Each event fires once, in order, even when `elapsed` jumps past
    /// several offsets at once. Never moves backwards.
    pub fn advance(&mut self, elapsed: Duration) -> Vec<PhaseEvent> {
        let mut events = Vec::new();
        loop {
            let (next, event) = match self.phase {
                Phase::Intro => (Phase::Damping, PhaseEvent::DampingStarted),
                Phase::Damping => (Phase::Frozen, PhaseEvent::Frozen),
                Phase::Frozen => break,
            };
            if elapsed < self.schedule.start_of(next) {
                break;
            }
            info!(?next, elapsed_ms = elapsed.as_millis() as u64, "phase change");
            self.phase = next;
            events.push(event);
        }
        events
    }
}
