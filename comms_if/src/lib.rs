//! # Communications interface crate.
//!
//! Provides the interface structures exchanged between the approach controller and the equipment
//! it talks to: the vision pipeline on the input side, the drivetrain on the output side.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Observation and demand definitions for equipment (camera, drivetrain)
pub mod eqpt;
