//! # Drive Client
//!
//! Demands from ApproachCtrl are realised by a `DriveActuator`, which is responsible for the
//! inverse kinematics of the chassis. The simulated chassis is in `sim_client`.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::trace;

use comms_if::eqpt::drive::DriveDems;

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// Something which can drive the chassis.
pub trait DriveActuator {
    /// Command the chassis with the given demands.
    ///
    /// Demands persist until the next call.
    fn drive(&mut self, dems: DriveDems);
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A drive which doesn't move anything, but records every demand it receives.
#[derive(Debug, Default, Clone)]
pub struct RecordingDrive {
    pub dems: Vec<DriveDems>
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl<T: DriveActuator + ?Sized> DriveActuator for Box<T> {
    fn drive(&mut self, dems: DriveDems) {
        (**self).drive(dems)
    }
}

impl RecordingDrive {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn num_dems(&self) -> usize {
        self.dems.len()
    }

    /// The most recent demand, which is the one the chassis would currently be executing.
    pub fn last(&self) -> Option<&DriveDems> {
        self.dems.last()
    }
}

impl DriveActuator for RecordingDrive {
    fn drive(&mut self, dems: DriveDems) {
        trace!("Recorded drive demand: {:?}", dems);
        self.dems.push(dems);
    }
}
