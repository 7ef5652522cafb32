//! # Equipment Interface
//!
//! This module defines the interface structures passed to and from equipment adapters.

// -----------------------------------------------------------------------------------------------
// MODULES
// -----------------------------------------------------------------------------------------------

pub mod drive;
pub mod vision;
