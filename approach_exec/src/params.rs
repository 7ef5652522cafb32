//! # Approach Executable Parameters
//!
//! This module provide parameters for the approach executable.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::collections::BTreeMap;
use serde::{Serialize, Deserialize};
use thiserror::Error;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Relative difference allowed between the controller and cycle periods
const PERIOD_TOLERANCE: f64 = 1e-9;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApproachExecParams {

    /// Target period of one cycle.
    ///
    /// Units: seconds
    pub cycle_period_s: f64,

    /// Time after which an approach that hasn't arrived is cancelled. If not set the approach
    /// runs until it arrives.
    ///
    /// Units: seconds
    #[serde(default)]
    pub timeout_s: Option<f64>,

    /// If true the status report of every cycle is archived
    #[serde(default)]
    pub archive_enabled: bool,

    /// Minimum log level, one of `info`, `debug` or `trace`
    pub log_level: String,

    /// Log levels of individual targets, overriding `log_level`
    #[serde(default)]
    pub log_target_levels: BTreeMap<String, String>
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Error, PartialEq)]
pub enum ExecParamsError {
    #[error("The cycle period must be greater than zero, found {0} s")]
    NonPositiveCyclePeriod(f64),

    #[error(
        "The controller period ({ctrl_period_s} s) does not match the cycle period \
        ({cycle_period_s} s)"
    )]
    PeriodMismatch {
        ctrl_period_s: f64,
        cycle_period_s: f64
    }
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl ApproachExecParams {
    /// Check the cycle period is usable and agrees with the controller's period.
    pub fn validate(&self, ctrl_period_s: f64) -> Result<(), ExecParamsError> {
        if !(self.cycle_period_s > 0.0) {
            return Err(ExecParamsError::NonPositiveCyclePeriod(self.cycle_period_s))
        }

        let diff = (ctrl_period_s - self.cycle_period_s).abs();
        if !(diff <= PERIOD_TOLERANCE * self.cycle_period_s) {
            return Err(ExecParamsError::PeriodMismatch {
                ctrl_period_s,
                cycle_period_s: self.cycle_period_s
            })
        }

        Ok(())
    }

    /// Number of cycles in the timeout, if one is set.
    pub fn timeout_cycles(&self) -> Option<u64> {
        self.timeout_s
            .map(|t| (t / self.cycle_period_s).ceil().max(1.0) as u64)
    }

    /// The target log levels as a list
    pub fn target_levels(&self) -> Vec<(String, String)> {
        self.log_target_levels
            .iter()
            .map(|(t, l)| (t.clone(), l.clone()))
            .collect()
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::approach_ctrl::Params;

    #[test]
    fn test_params_file() {
        let p: ApproachExecParams = toml::from_str(
            include_str!("../../params/approach_exec.toml")
        ).unwrap();

        assert!(p.cycle_period_s > 0.0);
        assert!(p.timeout_cycles().unwrap() > 0);

        for (_, level) in p.target_levels() {
            assert!(level.parse::<log::LevelFilter>().is_ok());
        }
    }

    #[test]
    fn test_timeout_cycles() {
        let mut p: ApproachExecParams = toml::from_str(
            "cycle_period_s = 0.02\nlog_level = \"info\""
        ).unwrap();
        assert_eq!(p.timeout_cycles(), None);
        assert!(!p.archive_enabled);

        p.timeout_s = Some(1.0);
        assert_eq!(p.timeout_cycles(), Some(50));

        p.timeout_s = Some(0.001);
        assert_eq!(p.timeout_cycles(), Some(1));
    }

    #[test]
    fn test_shipped_periods_agree() {
        let exec: ApproachExecParams = toml::from_str(
            include_str!("../../params/approach_exec.toml")
        ).unwrap();
        let ctrl: Params = toml::from_str(
            include_str!("../../params/approach_ctrl.toml")
        ).unwrap();

        assert_eq!(exec.validate(ctrl.period_s), Ok(()));
    }

    #[test]
    fn test_validate() {
        let mut p: ApproachExecParams = toml::from_str(
            "cycle_period_s = 0.02\nlog_level = \"info\""
        ).unwrap();

        assert_eq!(p.validate(0.02), Ok(()));
        assert_eq!(
            p.validate(0.05),
            Err(ExecParamsError::PeriodMismatch { ctrl_period_s: 0.05, cycle_period_s: 0.02 })
        );
        assert!(p.validate(f64::NAN).is_err());

        p.cycle_period_s = 0.0;
        assert_eq!(p.validate(0.0), Err(ExecParamsError::NonPositiveCyclePeriod(0.0)));

        p.cycle_period_s = f64::NAN;
        assert!(matches!(
            p.validate(0.02),
            Err(ExecParamsError::NonPositiveCyclePeriod(_))
        ));
    }
}
