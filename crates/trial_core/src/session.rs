//! Orchestrator-facing session.
//!
//! Owns the planner and a seeded RNG, keeps the in-flight trial and its
//! termination monitor, and hands out the command lists in the order the
//! backend needs them:
//!
//! 1. [`TrialSession::scene_initialization_commands`] once,
//! 2. per trial: [`TrialSession::plan_trial`], then every frame
//!    [`TrialSession::per_frame_commands`] + [`TrialSession::is_done`],
//! 3. [`TrialSession::trial_teardown_commands`] before the next trial.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::command::Command;
use crate::config::TrialConfig;
use crate::error::Result;
use crate::geometry::Vec3;
use crate::planner::{TrialPlan, TrialPlanner};
use crate::termination::{TerminationMonitor, TerminationState};

#[derive(Debug, Clone)]
struct ActiveTrial {
    plan: TrialPlan,
    monitor: TerminationMonitor,
}

#[derive(Debug, Clone)]
pub struct TrialSession {
    planner: TrialPlanner,
    rng: ChaCha8Rng,
    seed: u64,
    trials_planned: u64,
    active: Option<ActiveTrial>,
}

impl TrialSession {
    /// Session over the built-in catalogs.
    pub fn new(config: TrialConfig, seed: u64) -> Result<Self> {
        Ok(Self::with_planner(TrialPlanner::new(config)?, seed))
    }

    pub fn with_planner(planner: TrialPlanner, seed: u64) -> Self {
        Self {
            planner,
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
            trials_planned: 0,
            active: None,
        }
    }

    pub fn planner(&self) -> &TrialPlanner {
        &self.planner
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn field_of_view(&self) -> f32 {
        self.planner.config().camera.field_of_view
    }

    pub fn scene_initialization_commands(&self) -> Vec<Command> {
        self.planner.scene_initialization_commands()
    }

    /// Plan the next trial. Replaces any trial still in flight.
    pub fn plan_trial(&mut self) -> Vec<Command> {
        let trial = self.planner.plan(&mut self.rng);
        let monitor = trial.monitor(self.planner.config());
        self.trials_planned += 1;
        self.active = Some(ActiveTrial { plan: trial.plan, monitor });
        trial.commands
    }

    pub fn per_frame_commands(&self) -> Vec<Command> {
        self.planner.per_frame_commands()
    }

    /// Per-frame stopping decision. Always false when no trial is planned.
    pub fn is_done(&mut self, position: Option<Vec3>) -> bool {
        match self.active.as_mut() {
            Some(active) => active.monitor.is_done(position),
            None => false,
        }
    }

    /// Same as [`Self::is_done`], for a frame carrying several readings.
    pub fn is_done_batch(&mut self, readings: &[Vec3]) -> bool {
        self.is_done(readings.last().copied())
    }

    /// Teardown for the current trial; clears it from the session.
    pub fn trial_teardown_commands(&mut self) -> Vec<Command> {
        self.active = None;
        self.planner.trial_teardown_commands()
    }

    pub fn current_plan(&self) -> Option<&TrialPlan> {
        self.active.as_ref().map(|a| &a.plan)
    }

    pub fn termination_state(&self) -> Option<TerminationState> {
        self.active.as_ref().map(|a| a.monitor.state())
    }

    pub fn trials_planned(&self) -> u64 {
        self.trials_planned
    }
}
