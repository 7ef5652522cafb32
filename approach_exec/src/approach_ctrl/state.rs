//! Approach control module state

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{info, trace};
use serde::Serialize;

// Internal
use super::*;
use crate::drive_client::DriveActuator;
use crate::vision_client::ObservationSource;
use comms_if::eqpt::drive::DriveDems;
use util::{module::Mnvr, params};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The approach manoeuvre.
///
/// Owns its observation source and drive, which are given at construction.
pub struct ApproachCtrl<S, D> {
    params: Params,

    /// Executing mode
    mode: ApproachMode,

    report: StatusReport,

    /// Number of cycles executed in this manoeuvre
    cycle: u64,

    selector: TargetSelector,

    /// Controller objects used to calculate the drive demands
    controllers: ApproachControllers,

    source: S,
    drive: D
}

/// The status report of a single cycle, containing the monitoring quantities and flags.
///
/// Quantities that were not calculated in the cycle are `None`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize)]
pub struct StatusReport {
    /// Cycle number within the manoeuvre
    pub cycle: u64,

    /// Mode at the end of the cycle
    pub mode: ApproachMode,

    /// True if the observation this cycle contained a target
    pub has_target: bool,

    /// The locked target pitch
    pub tracked_pitch_deg: Option<f64>,

    /// The target yaw reported this cycle
    pub yaw_deg: Option<f64>,

    /// Error of the tracked pitch from the lateral setpoint
    pub lat_error_deg: Option<f64>,

    /// Error of the yaw from straight ahead
    pub head_error_deg: Option<f64>,

    /// Lateral (forward) demand
    pub lat_dem: Option<f64>,

    /// Heading (rotation rate) demand
    pub head_dem: Option<f64>,

    /// If true the lateral demand is at its limit
    pub lat_dem_limited: bool,

    /// If true the heading demand is at its limit
    pub head_dem_limited: bool,

    /// If true the lateral controller is within tolerance of the setpoint
    pub lat_at_setpoint: bool,

    /// If true the heading controller is within tolerance of the setpoint
    pub head_at_setpoint: bool,

    /// True if demands were sent to the drive this cycle
    pub drive_issued: bool
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// The possible modes of ApproachCtrl.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ApproachMode {
    /// Initialised but not yet executed
    Idle,

    /// Looking for or driving towards a target
    Tracking,

    /// The lateral controller reached its setpoint, the approach is complete
    Arrived
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for ApproachMode {
    fn default() -> Self {
        ApproachMode::Idle
    }
}

impl<S, D> ApproachCtrl<S, D>
where
    S: ObservationSource,
    D: DriveActuator
{
    /// Create a new instance of ApproachCtrl.
    ///
    /// The parameters are validated here, so that cyclic processing cannot fail.
    pub fn new(params: Params, source: S, drive: D) -> Result<Self, ApproachCtrlError> {
        params.validate()?;

        Ok(Self {
            params,
            mode: ApproachMode::Idle,
            report: StatusReport::default(),
            cycle: 0,
            selector: TargetSelector::new(),
            controllers: ApproachControllers::new(&params),
            source,
            drive
        })
    }

    /// Create a new instance loading the parameters from the given file in the params directory.
    pub fn from_params_file(
        param_file_path: &str,
        source: S,
        drive: D
    ) -> Result<Self, ApproachCtrlError> {
        let params = params::load(param_file_path)
            .map_err(ApproachCtrlError::ParamLoadError)?;

        Self::new(params, source, drive)
    }

    pub fn mode(&self) -> ApproachMode {
        self.mode
    }

    /// The report of the most recently executed cycle.
    pub fn report(&self) -> &StatusReport {
        &self.report
    }

    pub fn locked_target(&self) -> LockedTarget {
        self.selector.locked_target()
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    pub fn drive(&self) -> &D {
        &self.drive
    }

    /// Take back the source and drive.
    pub fn into_parts(self) -> (S, D) {
        (self.source, self.drive)
    }

    /// Put all manoeuvre state back to its idle values.
    fn reset(&mut self) {
        self.mode = ApproachMode::Idle;
        self.cycle = 0;
        self.selector.reset();
        self.controllers.reset();
    }
}

impl<S, D> Mnvr for ApproachCtrl<S, D>
where
    S: ObservationSource,
    D: DriveActuator
{
    fn initialize(&mut self) {
        self.reset();
        self.report = StatusReport::default();
        info!("ApproachCtrl initialised");
    }

    fn execute(&mut self) {

        // Once arrived nothing more is done, the source isn't even polled
        match self.mode {
            ApproachMode::Arrived => return,
            ApproachMode::Idle => {
                info!("ApproachCtrl tracking");
                self.mode = ApproachMode::Tracking;
            },
            ApproachMode::Tracking => ()
        }

        self.report = StatusReport {
            cycle: self.cycle,
            mode: self.mode,
            tracked_pitch_deg: self.selector.locked_target().pitch_deg(),
            ..StatusReport::default()
        };
        self.cycle += 1;

        let obs = self.source.latest();
        self.report.has_target = obs.has_target;

        // With no target nothing is commanded, the drive keeps whatever it last had
        let sel = match self.selector.select(&obs) {
            Some(s) => s,
            None => {
                trace!("No target in cycle {}", self.report.cycle);
                return
            }
        };

        self.report.tracked_pitch_deg = Some(sel.tracked_pitch_deg);
        self.report.yaw_deg = Some(sel.yaw_deg);

        let dems = self.controllers.get_dems(&sel, &mut self.report, &self.params);

        if dems.lat_at_setpoint {
            self.mode = ApproachMode::Arrived;
            self.report.mode = self.mode;
            info!(
                "ApproachCtrl arrived after {} cycles, tracked pitch {:.3} deg",
                self.cycle, sel.tracked_pitch_deg
            );
            return
        }

        let drive_dems = DriveDems::new(dems.lat_dem, dems.head_dem);
        trace!(
            "Cycle {}: lat_err = {:?}, head_err = {:?}, dems = {:?}",
            self.report.cycle, self.report.lat_error_deg, self.report.head_error_deg, drive_dems
        );

        self.drive.drive(drive_dems);
        self.report.drive_issued = true;
    }

    fn is_finished(&self) -> bool {
        self.mode == ApproachMode::Arrived
    }

    fn end(&mut self, interrupted: bool) {
        if interrupted {
            info!("ApproachCtrl interrupted in {:?} mode", self.mode);
        }
        else {
            info!("ApproachCtrl ended");
        }

        // The report of the last cycle is left for monitoring until the next initialise
        self.reset();
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use comms_if::eqpt::vision::Observation;
    use crate::drive_client::RecordingDrive;
    use crate::vision_client::SequenceSource;

    type Ctrl = ApproachCtrl<SequenceSource, RecordingDrive>;

    fn approach_obs() -> Vec<Observation> {
        vec![
            Observation::target(2.0, 5.0),
            Observation::target(1.0, 3.0),
            Observation::target(0.0, -9.0),
        ]
    }

    fn ctrl(obs: Vec<Observation>) -> Ctrl {
        ApproachCtrl::new(
            Params::default(),
            SequenceSource::new(obs),
            RecordingDrive::new()
        ).unwrap()
    }

    #[test]
    fn test_approach_scenario() {
        let mut c = ctrl(approach_obs());
        c.initialize();
        assert_eq!(c.mode(), ApproachMode::Idle);
        assert!(!c.locked_target().is_initialised());

        c.execute();
        assert_eq!(c.mode(), ApproachMode::Tracking);
        assert_eq!(c.locked_target().pitch_deg(), Some(5.0));
        assert!(!c.is_finished());
        assert!(c.report().drive_issued);

        c.execute();
        assert_eq!(c.locked_target().pitch_deg(), Some(3.0));
        assert!(!c.is_finished());

        c.execute();
        assert_eq!(c.locked_target().pitch_deg(), Some(-9.0));
        assert!(c.is_finished());
        assert_eq!(c.report().mode, ApproachMode::Arrived);
        assert!(!c.report().drive_issued);

        // Exactly two drives, forward and turning towards positive yaw
        let dems = &c.drive().dems;
        assert_eq!(dems.len(), 2);
        assert!((dems[0].forward() - 1.75).abs() < 1e-12);
        assert!((dems[0].rot_rate - 0.18).abs() < 1e-12);
        assert!((dems[1].forward() - 1.5).abs() < 1e-12);
        assert!((dems[1].rot_rate - 0.09).abs() < 1e-12);
        assert!(dems.iter().all(|d| d.translation.y == 0.0));

        c.end(false);
        assert_eq!(c.mode(), ApproachMode::Idle);
        assert!(!c.locked_target().is_initialised());
    }

    #[test]
    fn test_no_target_never_finishes() {
        let mut c = ctrl(vec![Observation::none(); 100]);
        c.initialize();

        for _ in 0..100 {
            c.execute();
            assert!(!c.is_finished());
            assert_eq!(c.mode(), ApproachMode::Tracking);
            assert!(!c.report().has_target);
        }

        assert_eq!(c.drive().num_dems(), 0);
        assert!(!c.locked_target().is_initialised());
        assert_eq!(c.source().num_polls(), 100);
    }

    #[test]
    fn test_no_drive_after_arrival() {
        let mut obs = approach_obs();
        obs.extend(vec![Observation::target(5.0, 10.0); 10]);

        let mut c = ctrl(obs);
        c.initialize();
        for _ in 0..3 {
            c.execute();
        }
        assert!(c.is_finished());
        let polls = c.source().num_polls();

        for _ in 0..10 {
            c.execute();
            assert!(c.is_finished());
        }

        assert_eq!(c.drive().num_dems(), 2);
        assert_eq!(c.source().num_polls(), polls);
    }

    #[test]
    fn test_no_target_cycle_keeps_lock() {
        let mut c = ctrl(vec![
            Observation::target(0.0, 2.0),
            Observation::none(),
            Observation::target(0.0, 6.0),
        ]);
        c.initialize();

        c.execute();
        c.execute();
        assert_eq!(c.locked_target().pitch_deg(), Some(2.0));
        assert!(!c.report().drive_issued);
        assert_eq!(c.report().tracked_pitch_deg, Some(2.0));
        assert_eq!(c.report().lat_dem, None);

        // Farther target, lateral demand is still from the lock: (2 + 9) * 0.125
        c.execute();
        assert_eq!(c.drive().num_dems(), 2);
        let last = c.drive().last().unwrap();
        assert!((last.forward() - 1.375).abs() < 1e-12);
    }

    #[test]
    fn test_infinite_pitch_frame_ignored() {
        let mut obs = vec![Observation::target(0.0, f64::NEG_INFINITY)];
        obs.extend(vec![Observation::target(0.0, -9.0); 5]);
        let mut c = ctrl(obs);
        c.initialize();

        c.execute();
        assert!(c.report().has_target);
        assert!(!c.report().drive_issued);
        assert!(!c.locked_target().is_initialised());

        c.execute();
        assert!(c.is_finished());
        assert_eq!(c.locked_target().pitch_deg(), Some(-9.0));
        assert!(c.drive().last().is_none());
    }

    #[test]
    fn test_restart_is_fresh() {
        let mut c = ctrl(approach_obs()[..2].to_vec());
        c.initialize();
        c.execute();
        c.execute();

        // Interrupt mid approach, no extra demands are sent
        c.end(true);
        assert_eq!(c.drive().num_dems(), 2);
        assert_eq!(c.mode(), ApproachMode::Idle);

        // Idempotent
        c.end(true);
        assert_eq!(c.mode(), ApproachMode::Idle);
        assert_eq!(c.drive().num_dems(), 2);

        // Rerun the whole approach, with a fresh controller alongside for comparison
        c.source_mut().extend(approach_obs());
        let mut fresh = ctrl(approach_obs());

        c.initialize();
        fresh.initialize();
        for _ in 0..3 {
            c.execute();
            fresh.execute();
            assert_eq!(c.report(), fresh.report());
            assert_eq!(c.is_finished(), fresh.is_finished());
        }

        assert!(c.is_finished());
        let (_, drive) = c.into_parts();
        assert_eq!(&drive.dems[2..], &fresh.drive().dems[..]);
    }

    #[test]
    fn test_invalid_params_rejected() {
        let params = Params { max_lat_dem: 0.0, ..Params::default() };
        let r = ApproachCtrl::new(params, SequenceSource::default(), RecordingDrive::new());
        assert!(matches!(r, Err(ApproachCtrlError::NonPositiveParam("max_lat_dem", _))));
    }
}
