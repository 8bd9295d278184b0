//! # Trial termination
//!
//! A trial ends on the first frame where the ball either
//! - **arrives**: it is within the arrival tolerance of the target, or
//! - **overshoots**: it is at least as far from the start as the target is.
//!
//! The overshoot test compares distances only, so sideways drift past the
//! target's distance envelope also ends the trial.
//!
//! Once done, a monitor stays done for the rest of the trial.

use serde::{Deserialize, Serialize};

use crate::geometry::{distance, Vec3};

/// Start and target of one trial, handed from planning to termination.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrialEndpoints {
    pub start: Vec3,
    pub target: Vec3,
}

impl TrialEndpoints {
    pub fn new(start: Vec3, target: Vec3) -> Self {
        Self { start, target }
    }

    pub fn total_distance(&self) -> f32 {
        distance(&self.start, &self.target)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TerminationReason {
    Arrived,
    Overshot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TerminationState {
    Running,
    Done { reason: TerminationReason, frame: u64 },
}

/// Stopping predicate for a single position reading.
///
/// Arrival is reported when both conditions hold.
pub fn evaluate(
    endpoints: &TrialEndpoints,
    position: &Vec3,
    arrival_tolerance: f32,
) -> Option<TerminationReason> {
    let traveled = distance(position, &endpoints.start);
    let remaining = distance(position, &endpoints.target);
    if remaining <= arrival_tolerance {
        Some(TerminationReason::Arrived)
    } else if traveled >= endpoints.total_distance() {
        Some(TerminationReason::Overshot)
    } else {
        None
    }
}

/// Per-frame stopping decision for one trial.
#[derive(Debug, Clone)]
pub struct TerminationMonitor {
    endpoints: TrialEndpoints,
    arrival_tolerance: f32,
    state: TerminationState,
    frames: u64,
}

impl TerminationMonitor {
    pub fn new(endpoints: TrialEndpoints, arrival_tolerance: f32) -> Self {
        Self { endpoints, arrival_tolerance, state: TerminationState::Running, frames: 0 }
    }

    /// Feed one frame. `None` means the backend sent no position this
    /// frame; the monitor keeps running.
    pub fn is_done(&mut self, position: Option<Vec3>) -> bool {
        if let TerminationState::Done { .. } = self.state {
            return true;
        }
        let frame = self.frames;
        self.frames += 1;

        let Some(position) = position else {
            return false;
        };
        match evaluate(&self.endpoints, &position, self.arrival_tolerance) {
            Some(reason) => {
                log::debug!(
                    "trial done at frame {}: {:?} (ball at {:.3}, {:.3}, {:.3})",
                    frame,
                    reason,
                    position.x,
                    position.y,
                    position.z
                );
                self.state = TerminationState::Done { reason, frame };
                true
            }
            None => false,
        }
    }

    /// Feed one frame that may carry several readings; only the last counts.
    pub fn is_done_batch(&mut self, readings: &[Vec3]) -> bool {
        self.is_done(readings.last().copied())
    }

    pub fn state(&self) -> TerminationState {
        self.state
    }

    pub fn reason(&self) -> Option<TerminationReason> {
        match self.state {
            TerminationState::Done { reason, .. } => Some(reason),
            TerminationState::Running => None,
        }
    }

    pub fn endpoints(&self) -> &TrialEndpoints {
        &self.endpoints
    }

    /// Frames fed up to and including the terminating one; frames fed
    /// after termination are not counted.
    pub fn frames_observed(&self) -> u64 {
        self.frames
    }
}
