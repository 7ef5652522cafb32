//! Utility library for the approach controller software
//!
//! Provides the ambient services shared by executables: sessions, logging,
//! parameter loading, CSV archiving, observation scripts, and the manoeuvre
//! lifecycle interface.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod archive;
pub mod host;
pub mod logger;
pub mod maths;
pub mod module;
pub mod params;
pub mod session;
pub mod script_interpreter;
pub mod time;

// ---------------------------------------------------------------------------
// REEXPORTS
// ---------------------------------------------------------------------------

pub use comms_if;
