//! # Target selection
//!
//! The vision pipeline reports the angles of its "best" target each frame, which with several
//! objects in view can jump between them from frame to frame. The selector locks onto a single
//! target by only ever accepting a pitch that the comparator prefers over the currently locked
//! one. With the default `nearest_first` comparator this means the chassis will not be drawn
//! away by a farther target once it has started approaching a nearer one.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::debug;

// Internal
use comms_if::eqpt::vision::Observation;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Function deciding if a candidate pitch should replace the locked pitch.
///
/// Called as `cmp(candidate, locked)`.
pub type LockComparator = fn(f64, f64) -> bool;

/// The pitch currently locked onto, or `None` if no target has been seen since the last reset.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct LockedTarget(Option<f64>);

/// Output of the selector for a cycle in which a target was visible.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetSel {
    /// The locked pitch, which drives the lateral controller.
    ///
    /// Units: degrees
    pub tracked_pitch_deg: f64,

    /// The yaw reported by this cycle's observation.
    ///
    /// Units: degrees
    pub yaw_deg: f64
}

/// Locks onto a single target from a stream of observations.
#[derive(Debug, Clone)]
pub struct TargetSelector {
    lock: LockedTarget,
    cmp: LockComparator
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Prefers lower pitches, which with a downward facing camera are nearer targets.
///
/// Equal pitches are accepted.
pub fn nearest_first(candidate: f64, locked: f64) -> bool {
    candidate <= locked
}

/// Fold a sequence of pitches into a lock, starting from an uninitialised lock.
pub fn lock_over<I>(pitches: I, cmp: LockComparator) -> LockedTarget
where
    I: IntoIterator<Item = f64>
{
    pitches
        .into_iter()
        .fold(LockedTarget::default(), |lock, p| lock.locked_with(p, cmp))
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl LockedTarget {

    /// The locked pitch, if any.
    pub fn pitch_deg(&self) -> Option<f64> {
        self.0
    }

    pub fn is_initialised(&self) -> bool {
        self.0.is_some()
    }

    /// Return the lock after observing a target at `pitch_deg`.
    ///
    /// An uninitialised lock adopts any finite pitch. Non-finite pitches never change the lock.
    pub fn locked_with(self, pitch_deg: f64, cmp: LockComparator) -> Self {
        if !pitch_deg.is_finite() {
            return self
        }

        match self.0 {
            Some(locked) if !cmp(pitch_deg, locked) => self,
            _ => Self(Some(pitch_deg))
        }
    }
}

impl Default for TargetSelector {
    fn default() -> Self {
        Self::new()
    }
}

impl TargetSelector {

    /// Create a selector which locks onto the nearest target.
    pub fn new() -> Self {
        Self::with_comparator(nearest_first)
    }

    /// Create a selector using a custom lock comparator.
    pub fn with_comparator(cmp: LockComparator) -> Self {
        Self {
            lock: LockedTarget::default(),
            cmp
        }
    }

    /// Update the lock with an observation.
    ///
    /// Returns `None` if there is nothing to act on this cycle, either because no target was
    /// visible or because the reported pitch was not finite. The lock is left untouched in
    /// that case.
    pub fn select(&mut self, obs: &Observation) -> Option<TargetSel> {
        if !obs.has_target || !obs.pitch_deg.is_finite() {
            return None
        }

        let prev = self.lock;
        self.lock = self.lock.locked_with(obs.pitch_deg, self.cmp);

        if self.lock != prev {
            debug!(
                "Target lock updated: {:?} -> {:.3} deg",
                prev.pitch_deg(), obs.pitch_deg
            );
        }

        self.lock.pitch_deg().map(|tracked_pitch_deg| TargetSel {
            tracked_pitch_deg,
            yaw_deg: obs.yaw_deg
        })
    }

    /// Get the current lock.
    pub fn locked_target(&self) -> LockedTarget {
        self.lock
    }

    /// Forget the locked target.
    pub fn reset(&mut self) {
        self.lock = LockedTarget::default();
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
