//! # Manoeuvre Runner
//!
//! Drives a `Mnvr` through its lifecycle one cycle at a time, in the way a command scheduler
//! would. The runner does no timing itself, the caller steps it once per cycle.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::{info, warn};
use serde::Serialize;

use util::module::Mnvr;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Runs a manoeuvre.
pub struct MnvrRunner<M> {
    mnvr: M,

    state: RunnerState,

    /// Number of `execute` calls made
    num_cycles: u64,

    /// Number of cycles after which the manoeuvre is cancelled
    timeout_cycles: Option<u64>
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// States of the runner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RunnerState {
    NotStarted,
    Running,

    /// The manoeuvre reported it had finished
    Finished,

    /// The manoeuvre was cancelled by the caller
    Cancelled,

    /// The manoeuvre didn't finish within the timeout
    TimedOut
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl RunnerState {
    /// True if the manoeuvre is over, for whatever reason.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, RunnerState::NotStarted | RunnerState::Running)
    }
}

impl<M: Mnvr> MnvrRunner<M> {
    /// Create a runner for the manoeuvre, which is not initialised until the first step.
    pub fn new(mnvr: M) -> Self {
        Self {
            mnvr,
            state: RunnerState::NotStarted,
            num_cycles: 0,
            timeout_cycles: None
        }
    }

    /// Cancel the manoeuvre if it hasn't finished after the given number of cycles.
    pub fn with_timeout(mut self, timeout_cycles: u64) -> Self {
        self.timeout_cycles = Some(timeout_cycles);
        self
    }

    /// Run one cycle of the manoeuvre, returning the runner state after the cycle.
    pub fn step(&mut self) -> RunnerState {
        match self.state {
            RunnerState::NotStarted => {
                self.mnvr.initialize();
                self.state = RunnerState::Running;
            },
            RunnerState::Running => (),
            _ => return self.state
        }

        self.mnvr.execute();
        self.num_cycles += 1;

        if self.mnvr.is_finished() {
            self.mnvr.end(false);
            self.state = RunnerState::Finished;
            info!("Manoeuvre finished after {} cycles", self.num_cycles);
        }
        else if let Some(t) = self.timeout_cycles {
            if self.num_cycles >= t {
                self.mnvr.end(true);
                self.state = RunnerState::TimedOut;
                warn!("Manoeuvre timed out after {} cycles", self.num_cycles);
            }
        }

        self.state
    }

    /// Cancel the manoeuvre.
    ///
    /// Only a running manoeuvre is ended, one which never started is simply never run.
    pub fn cancel(&mut self) {
        match self.state {
            RunnerState::Running => {
                self.mnvr.end(true);
                self.state = RunnerState::Cancelled;
                info!("Manoeuvre cancelled after {} cycles", self.num_cycles);
            },
            RunnerState::NotStarted => self.state = RunnerState::Cancelled,
            _ => ()
        }
    }

    pub fn state(&self) -> RunnerState {
        self.state
    }

    pub fn num_cycles(&self) -> u64 {
        self.num_cycles
    }

    pub fn mnvr(&self) -> &M {
        &self.mnvr
    }

    pub fn into_mnvr(self) -> M {
        self.mnvr
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
