//! # Vision Equipment Observations

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A single detection result from the object vision pipeline.
///
/// One observation is produced for every sensor frame. When `has_target` is false the angles carry
/// no meaning and shall be ignored.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// True if the pipeline found at least one target in the frame
    #[serde(default)]
    pub has_target: bool,

    /// Horizontal angle of the best target from the camera boresight.
    ///
    /// Units: degrees, positive to the right.
    #[serde(default)]
    pub yaw_deg: f64,

    /// Vertical angle of the best target from the camera boresight.
    ///
    /// Units: degrees, positive upwards. With the camera tilted at the floor, nearer objects
    /// project to smaller (more negative) pitches.
    #[serde(default)]
    pub pitch_deg: f64,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Errors which can occur when parsing an observation.
#[derive(Debug, Error)]
pub enum ObsParseError {
    #[error("Observation contains invalid JSON: {0}")]
    InvalidJson(serde_json::Error),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Observation {
    /// An observation in which nothing was detected.
    pub fn none() -> Self {
        Self::default()
    }

    /// An observation of a target at the given angles.
    pub fn target(yaw_deg: f64, pitch_deg: f64) -> Self {
        Self {
            has_target: true,
            yaw_deg,
            pitch_deg,
        }
    }

    /// Parse an observation from a JSON object, for example
    /// `{"has_target": true, "yaw_deg": 2.0, "pitch_deg": 5.0}`.
    ///
    /// Missing fields take their default value, so `{}` is an observation with no target.
    pub fn from_json(json_str: &str) -> Result<Self, ObsParseError> {
        serde_json::from_str(json_str).map_err(ObsParseError::InvalidJson)
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_from_json() {
        let obs = Observation::from_json(
            r#"{"has_target": true, "yaw_deg": 2.0, "pitch_deg": -9.5}"#
        ).unwrap();
        assert_eq!(obs, Observation::target(2.0, -9.5));

        // Missing fields default to no target
        let obs = Observation::from_json(r#"{"has_target": false}"#).unwrap();
        assert_eq!(obs, Observation::none());

        assert!(Observation::from_json("{\"has_target\": 3").is_err());
    }
}
