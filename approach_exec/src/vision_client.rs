//! # Vision Client
//!
//! The vision client provides ApproachCtrl with target observations. ApproachCtrl doesn't care
//! where the observations come from, only that it can get the latest one each cycle without
//! blocking, so the source is the `ObservationSource` trait. This module provides sources that
//! replay fixed sequences or observation scripts. The simulated camera is in `sim_client`.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::collections::VecDeque;
use std::path::Path;
use log::trace;

use comms_if::eqpt::vision::Observation;
use util::script_interpreter::{ObsScript, ScriptError};

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// A source of vision observations.
pub trait ObservationSource {
    /// Get the latest observation.
    ///
    /// Must not block. If the source has nothing to report, or fails internally, it shall return
    /// an observation with no target.
    fn latest(&mut self) -> Observation;
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Returns a fixed sequence of observations, one per poll, followed by no target forever.
#[derive(Debug, Default, Clone)]
pub struct SequenceSource {
    queue: VecDeque<Observation>,
    num_polls: usize
}

/// Replays an observation script, advancing one cycle per poll.
#[derive(Debug, Clone)]
pub struct ScriptSource {
    script: ObsScript,
    cycle: u64
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl<T: ObservationSource + ?Sized> ObservationSource for Box<T> {
    fn latest(&mut self) -> Observation {
        (**self).latest()
    }
}

impl SequenceSource {
    pub fn new<I: IntoIterator<Item = Observation>>(obs: I) -> Self {
        Self {
            queue: obs.into_iter().collect(),
            num_polls: 0
        }
    }

    /// Append more observations to the end of the sequence.
    pub fn extend<I: IntoIterator<Item = Observation>>(&mut self, obs: I) {
        self.queue.extend(obs);
    }

    /// Number of observations not yet returned
    pub fn remaining(&self) -> usize {
        self.queue.len()
    }

    /// Number of times `latest` has been called
    pub fn num_polls(&self) -> usize {
        self.num_polls
    }
}

impl ObservationSource for SequenceSource {
    fn latest(&mut self) -> Observation {
        self.num_polls += 1;
        self.queue.pop_front().unwrap_or_else(Observation::none)
    }
}

impl ScriptSource {
    pub fn new(script: ObsScript) -> Self {
        Self { script, cycle: 0 }
    }

    /// Load the script at the given path.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ScriptError> {
        Ok(Self::new(ObsScript::new(path)?))
    }

    /// The cycle that will be returned by the next poll.
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    /// True once every entry in the script has been returned at least once.
    pub fn is_complete(&self) -> bool {
        self.cycle > self.script.get_last_cycle()
    }
}

impl ObservationSource for ScriptSource {
    fn latest(&mut self) -> Observation {
        let obs = match self.script.obs_at(self.cycle) {
            Some(o) => o,
            None => {
                trace!("Script has no observation for cycle {}", self.cycle);
                Observation::none()
            }
        };

        self.cycle += 1;

        obs
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_sequence_source() {
        let mut src = SequenceSource::new(vec![
            Observation::target(1.0, 2.0),
            Observation::none()
        ]);

        assert_eq!(src.remaining(), 2);
        assert_eq!(src.latest(), Observation::target(1.0, 2.0));
        assert_eq!(src.latest(), Observation::none());

        // Exhausted
        assert_eq!(src.latest(), Observation::none());
        assert_eq!(src.num_polls(), 3);

        src.extend(vec![Observation::target(0.0, 0.0)]);
        assert_eq!(src.latest(), Observation::target(0.0, 0.0));
    }

    #[test]
    fn test_script_source() {
        let script = ObsScript::parse(
            "1: {\"has_target\": true, \"pitch_deg\": 4.0};\n\
             3: {\"has_target\": false};"
        ).unwrap();
        let mut src: Box<dyn ObservationSource> = Box::new(ScriptSource::new(script.clone()));

        assert_eq!(src.latest(), Observation::none());
        assert_eq!(src.latest(), Observation::target(0.0, 4.0));
        assert_eq!(src.latest(), Observation::target(0.0, 4.0));
        assert_eq!(src.latest(), Observation::none());

        let mut src = ScriptSource::new(script);
        for _ in 0..3 {
            src.latest();
            assert!(!src.is_complete());
        }
        src.latest();
        assert!(src.is_complete());
        assert_eq!(src.cycle(), 4);
    }
}
