//! # Approach controllers module
//!
//! This module provides the PID controllers used for ApproachCtrl, including their error
//! calculations. The lateral controller drives the tracked target's pitch to the approach
//! setpoint, the heading controller drives the target's yaw to zero.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Serialize;
use util::maths::within;

// Internal
use super::{Params, StatusReport, TargetSel};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A PID controller
///
/// The controller is stepped at a fixed period, so it takes the error only and integrates and
/// differentiates over `period_s`.
#[derive(Debug, Serialize, Clone)]
pub struct PidController {
    /// Proportional gain
    k_p: f64,

    /// Integral gain
    k_i: f64,

    /// Dervative gain
    k_d: f64,

    /// Fixed update period in seconds
    period_s: f64,

    /// Error magnitude under which the controller is at its setpoint
    tolerance: f64,

    /// Symmetric output limit
    output_limit: f64,

    /// Symmetric limit on the integral accumulation
    integral_limit: f64,

    /// Previous error
    prev_error: Option<f64>,

    /// The integral accumulation
    integral: f64
}

/// The approach controllers
#[derive(Debug, Serialize, Clone)]
pub struct ApproachControllers {
    /// Lateral (approach axis) error controller
    lat_ctrl: PidController,

    /// Heading error controller
    head_ctrl: PidController,

    /// Pitch setpoint of the lateral controller
    lat_setpoint_deg: f64
}

/// Demands computed by the controllers for one cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisDems {
    /// Lateral (forward/backward) demand
    pub lat_dem: f64,

    /// Heading (rotation rate) demand
    pub head_dem: f64,

    /// True if the lateral controller is within tolerance of its setpoint
    pub lat_at_setpoint: bool,

    /// True if the heading controller is within tolerance of its setpoint
    pub head_at_setpoint: bool
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl PidController {

    /// Create a new controller with the given gains.
    ///
    /// The output and integral are unlimited and the tolerance is zero, so that the controller
    /// is never at its setpoint, until set with the `with_` functions.
    pub fn new(k_p: f64, k_i: f64, k_d: f64, period_s: f64) -> Self {
        Self {
            k_p, k_i, k_d, period_s,
            tolerance: 0.0,
            output_limit: f64::INFINITY,
            integral_limit: f64::INFINITY,
            prev_error: None,
            integral: 0f64
        }
    }

    /// Set the at-setpoint tolerance.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Limit the output to `[-limit, limit]`.
    pub fn with_output_limit(mut self, limit: f64) -> Self {
        self.output_limit = limit;
        self
    }

    /// Limit the integral accumulation to `[-limit, limit]`.
    pub fn with_integral_limit(mut self, limit: f64) -> Self {
        self.integral_limit = limit;
        self
    }

    /// Get the value of the controller for the given error.
    ///
    /// The output is always within the output limit. A NaN error produces a zero output and clears
    /// the previous error, leaving the integral untouched.
    pub fn get(&mut self, error: f64) -> f64 {
        if error.is_nan() {
            self.prev_error = None;
            return 0f64
        }

        // Infinite errors are saturated so the accumulators stay finite
        let error = error.clamp(-f64::MAX, f64::MAX);

        // Proportional term
        let p = self.k_p * error;

        // Accumulate and limit the integral, only while the term is enabled
        let i = if self.k_i != 0.0 {
            self.integral = (self.integral + error * self.period_s)
                .clamp(-self.integral_limit, self.integral_limit);
            self.k_i * self.integral
        }
        else {
            0f64
        };

        // Calculate the derivative. No derivative on the first cycle as there's no previous error.
        let d = match (self.prev_error, self.k_d != 0.0) {
            (Some(e), true) => self.k_d * (error - e) / self.period_s,
            _ => 0f64
        };

        // Remember the previous error
        self.prev_error = Some(error);

        // Terms can be of opposite infinite sign
        let out = p + i + d;
        if out.is_nan() {
            return 0f64
        }

        out.clamp(-self.output_limit, self.output_limit)
    }

    /// True if the last error passed to `get` was within tolerance.
    ///
    /// Before the first call to `get`, or after a NaN error, this is false.
    pub fn at_setpoint(&self) -> bool {
        match self.prev_error {
            Some(e) => within(e, 0.0, self.tolerance),
            None => false
        }
    }

    /// Clear the integral and derivative memory.
    pub fn reset(&mut self) {
        self.prev_error = None;
        self.integral = 0f64;
    }
}

impl ApproachControllers {

    /// Create a new instance of the controllers from the parameters
    pub fn new(params: &Params) -> Self {
        Self {
            lat_ctrl: PidController::new(
                params.lat_k_p, params.lat_k_i, params.lat_k_d, params.period_s
            )
            .with_tolerance(params.lat_tolerance_deg)
            .with_output_limit(params.max_lat_dem)
            .with_integral_limit(params.integral_limit),
            head_ctrl: PidController::new(
                params.head_k_p, params.head_k_i, params.head_k_d, params.period_s
            )
            .with_tolerance(params.head_tolerance_deg)
            .with_output_limit(params.max_head_dem)
            .with_integral_limit(params.integral_limit),
            lat_setpoint_deg: params.lat_setpoint_deg
        }
    }

    /// Get the axis demands for the current target selection.
    ///
    /// Errors are `measurement - setpoint`, so that a positive lateral demand closes the range to
    /// the target (whose pitch falls as it gets nearer) and a positive heading demand turns
    /// towards a target with positive yaw.
    pub fn get_dems(
        &mut self,
        sel: &TargetSel,
        report: &mut StatusReport,
        params: &Params
    ) -> AxisDems {

        // Calculate the errors
        let lat_err_deg = sel.tracked_pitch_deg - self.lat_setpoint_deg;
        let head_err_deg = sel.yaw_deg;
        report.lat_error_deg = Some(lat_err_deg);
        report.head_error_deg = Some(head_err_deg);

        // Pass the errors through the controllers, which apply the demand limits
        let lat_dem = self.lat_ctrl.get(lat_err_deg);
        let head_dem = self.head_ctrl.get(head_err_deg);

        report.lat_dem = Some(lat_dem);
        report.head_dem = Some(head_dem);
        report.lat_dem_limited = lat_dem.abs() >= params.max_lat_dem;
        report.head_dem_limited = head_dem.abs() >= params.max_head_dem;

        let dems = AxisDems {
            lat_dem,
            head_dem,
            lat_at_setpoint: self.lat_ctrl.at_setpoint(),
            head_at_setpoint: self.head_ctrl.at_setpoint()
        };

        report.lat_at_setpoint = dems.lat_at_setpoint;
        report.head_at_setpoint = dems.head_at_setpoint;

        dems
    }

    /// Reset both controllers.
    pub fn reset(&mut self) {
        self.lat_ctrl.reset();
        self.head_ctrl.reset();
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
