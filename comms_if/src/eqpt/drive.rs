//! # Drivetrain Equipment Demands

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Velocity demands sent to the chassis drivetrain.
///
/// The drivetrain performs its own inverse kinematics, these demands are robot-relative.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DriveDems {
    /// Planar translation demand in the chassis frame, X forwards and Y to the left.
    ///
    /// Positive X moves the chassis towards the tracked target.
    pub translation: Vector2<f64>,

    /// Rotation rate demand.
    ///
    /// Positive rates turn the chassis towards targets with a positive (rightward) yaw.
    pub rot_rate: f64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl DriveDems {
    /// Build demands for a purely forward translation combined with a rotation.
    pub fn new(forward: f64, rot_rate: f64) -> Self {
        Self {
            translation: Vector2::new(forward, 0.0),
            rot_rate,
        }
    }

    /// Demands which bring the chassis to rest.
    pub fn stop() -> Self {
        Self::new(0.0, 0.0)
    }

    /// The forward component of the translation demand.
    pub fn forward(&self) -> f64 {
        self.translation.x
    }
}
