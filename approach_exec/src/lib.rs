//! # Approach library.
//!
//! This library allows other crates in the workspace, and the benches, to access items defined
//! inside the approach crate.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Approach control module - drives the chassis towards a target seen by the vision pipeline
pub mod approach_ctrl;

/// Drive client - sends demands to the chassis drivetrain
pub mod drive_client;

/// Manoeuvre runner - steps a manoeuvre through its lifecycle
pub mod mnvr_runner;

/// Executable parameters
pub mod params;

/// Simulation client - a simulated camera and chassis for closed loop testing
pub mod sim_client;

/// Vision client - provides observations of targets
pub mod vision_client;
