//! # Approach Control
//!
//! Approach control (ApproachCtrl) drives the chassis towards an object detected by the vision
//! pipeline, stopping short of it. It is a manoeuvre (`util::module::Mnvr`), driven once per cycle
//! by a scheduler such as `MnvrRunner`.
//!
//! Each cycle ApproachCtrl:
//!
//! 1. Polls the latest observation from its `ObservationSource`.
//! 2. Passes it through the `TargetSelector`, which locks onto the nearest target seen so far and
//!    won't be drawn away to farther or newer targets.
//! 3. Calculates lateral and heading demands with the `ApproachControllers`.
//! 4. Either declares the approach complete (lateral controller at its setpoint) or sends the
//!    demands to its `DriveActuator`.
//!
//! A cycle with no target visible commands nothing.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod controllers;
mod params;
mod state;
mod target_sel;

// ---------------------------------------------------------------------------
// EXPORTS
// ---------------------------------------------------------------------------

pub use controllers::*;
pub use params::*;
pub use state::*;
pub use target_sel::*;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors that can occur while setting up ApproachCtrl.
#[derive(Debug, thiserror::Error)]
pub enum ApproachCtrlError {
    #[error("Gain {0} must be finite and non-negative, got {1}")]
    InvalidGain(&'static str, f64),

    #[error("Parameter {0} must be finite and greater than zero, got {1}")]
    NonPositiveParam(&'static str, f64),

    #[error("The lateral setpoint must be finite, got {0}")]
    InvalidSetpoint(f64),

    #[error("Could not load the parameters: {0}")]
    ParamLoadError(util::params::LoadError)
}
