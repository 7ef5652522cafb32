//! Approach control parameters

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};

// Internal
use super::ApproachCtrlError;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for approach control
///
/// The `Default` implementation gives the shipped tuning.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq)]
pub struct Params {

    // ---- LATERAL (APPROACH AXIS) CONTROLLER ----

    /// Lateral controller proportional gain
    pub lat_k_p: f64,

    /// Lateral controller integral gain
    pub lat_k_i: f64,

    /// Lateral controller derivative gain
    pub lat_k_d: f64,

    /// Pitch of the tracked target at which the approach is complete.
    ///
    /// This is offset below zero, to the pitch at which the object is only
    /// just detected, so that the chassis stops short of the object.
    ///
    /// Units: degrees
    pub lat_setpoint_deg: f64,

    /// Pitch error under which the lateral controller is at its setpoint.
    ///
    /// Units: degrees
    pub lat_tolerance_deg: f64,

    /// Magnitude limit of the lateral (forward/backward) demand.
    pub max_lat_dem: f64,

    // ---- HEADING CONTROLLER ----

    /// Heading controller proportional gain
    pub head_k_p: f64,

    /// Heading controller integral gain
    pub head_k_i: f64,

    /// Heading controller derivative gain
    pub head_k_d: f64,

    /// Yaw error under which the heading controller is at its setpoint.
    ///
    /// Units: degrees
    pub head_tolerance_deg: f64,

    /// Magnitude limit of the rotation rate demand.
    pub max_head_dem: f64,

    // ---- COMMON ----

    /// Controller update period, used for the integral and derivative terms.
    ///
    /// Units: seconds
    pub period_s: f64,

    /// Magnitude limit of each controller's integral accumulator.
    ///
    /// Units: degree seconds
    pub integral_limit: f64
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Params {
    fn default() -> Self {
        Self {
            lat_k_p: 0.125,
            lat_k_i: 0.0,
            lat_k_d: 0.0,
            lat_setpoint_deg: -9.0,
            lat_tolerance_deg: 1.0,
            max_lat_dem: 4.0,
            head_k_p: 0.09,
            head_k_i: 0.0,
            head_k_d: 0.0,
            head_tolerance_deg: 1.0,
            max_head_dem: 6.0,
            period_s: 0.02,
            integral_limit: 1.0
        }
    }
}

impl Params {
    /// Check the parameters are usable.
    ///
    /// All configuration mistakes are caught here so that cyclic processing
    /// never has to fail.
    pub fn validate(&self) -> Result<(), ApproachCtrlError> {
        let gains = [
            ("lat_k_p", self.lat_k_p),
            ("lat_k_i", self.lat_k_i),
            ("lat_k_d", self.lat_k_d),
            ("head_k_p", self.head_k_p),
            ("head_k_i", self.head_k_i),
            ("head_k_d", self.head_k_d),
        ];
        for (name, gain) in gains.iter() {
            if !gain.is_finite() || *gain < 0.0 {
                return Err(ApproachCtrlError::InvalidGain(*name, *gain))
            }
        }

        let positives = [
            ("lat_tolerance_deg", self.lat_tolerance_deg),
            ("head_tolerance_deg", self.head_tolerance_deg),
            ("max_lat_dem", self.max_lat_dem),
            ("max_head_dem", self.max_head_dem),
            ("period_s", self.period_s),
            ("integral_limit", self.integral_limit),
        ];
        for (name, value) in positives.iter() {
            // Written so that NaN is rejected too
            if !(*value > 0.0) || value.is_infinite() {
                return Err(ApproachCtrlError::NonPositiveParam(*name, *value))
            }
        }

        if !self.lat_setpoint_deg.is_finite() {
            return Err(ApproachCtrlError::InvalidSetpoint(self.lat_setpoint_deg))
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(Params::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_config() {
        let p = Params { lat_tolerance_deg: 0.0, ..Params::default() };
        match p.validate() {
            Err(ApproachCtrlError::NonPositiveParam("lat_tolerance_deg", _)) => (),
            r => panic!("Expected NonPositiveParam, got {:?}", r)
        }

        let p = Params { head_tolerance_deg: -1.0, ..Params::default() };
        assert!(p.validate().is_err());

        let p = Params { period_s: f64::NAN, ..Params::default() };
        assert!(p.validate().is_err());

        let p = Params { head_k_p: -0.09, ..Params::default() };
        match p.validate() {
            Err(ApproachCtrlError::InvalidGain("head_k_p", _)) => (),
            r => panic!("Expected InvalidGain, got {:?}", r)
        }

        let p = Params { lat_k_i: f64::INFINITY, ..Params::default() };
        assert!(p.validate().is_err());

        let p = Params { lat_setpoint_deg: f64::NAN, ..Params::default() };
        assert!(p.validate().is_err());
    }

    #[test]
    fn test_params_file_matches_default() {
        let file = include_str!("../../../params/approach_ctrl.toml");
        let p: Params = toml::from_str(file).unwrap();
        assert_eq!(p, Params::default());
    }
}
