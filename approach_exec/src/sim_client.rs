//! # Simulation Client
//!
//! The SimClient provides a simple simulated world in which ApproachCtrl can be run closed loop,
//! without a real camera or chassis. The world contains:
//!
//! - A chassis with a planar pose, driven by the `SimChassis` drive. The chassis keeps executing
//!   the last demand it was given until a new one arrives, as a real drivetrain would.
//! - A camera fixed to the chassis, the `SimCam` observation source, which looks down towards the
//!   floor and reports the angles of the best target in view.
//! - A number of targets on the floor, each of which appears at a set time.
//!
//! The camera's "best" target is the visible target which appeared most recently, modelling a
//! detector which is drawn to newcomers in the scene. Smooth Perlin noise is added to the reported
//! angles and frames can be periodically dropped.
//!
//! The world is only advanced by calling `SimClient::step`, so it is fully deterministic.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::{cell::RefCell, rc::Rc};
use log::warn;
use nalgebra::{Rotation2, Vector2};
use noise::{NoiseFn, Perlin, Seedable};
use serde::{Deserialize, Serialize};

use crate::{drive_client::DriveActuator, vision_client::ObservationSource};
use comms_if::eqpt::{drive::DriveDems, vision::Observation};
use util::{maths::wrap_pi, params};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Rate at which the angle noise varies.
///
/// Units: Perlin cycles per second
const NOISE_FREQ_HZ: f64 = 0.5;

/// Offset in the noise field between the pitch and yaw noise, so the two are uncorrelated.
const NOISE_YAW_OFFSET: f64 = 100.0;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Parameters of the simulated world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimParams {

    // ---- CAMERA ----

    /// Height of the camera above the floor.
    ///
    /// Units: meters
    pub cam_height_m: f64,

    /// Pitch reported for an infinitely far target, i.e. the angle of the horizon in the image.
    ///
    /// Units: degrees
    pub cam_pitch_offset_deg: f64,

    /// Half the horizontal field of view. Targets with a greater yaw are not visible.
    ///
    /// Units: degrees
    pub cam_half_hfov_deg: f64,

    /// Lowest visible pitch. Targets closer than this are under the camera and not visible.
    ///
    /// Units: degrees
    pub cam_min_pitch_deg: f64,

    /// Amplitude of the noise added to the reported angles.
    ///
    /// Units: degrees
    #[serde(default)]
    pub noise_amplitude_deg: f64,

    /// Seed for the noise field
    #[serde(default)]
    pub noise_seed: u32,

    /// If non-zero, every nth frame from the camera reports no target.
    #[serde(default)]
    pub dropout_period_cycles: u64,

    // ---- CHASSIS ----

    /// Chassis speed for a unit forward demand.
    ///
    /// Units: meters/second
    pub speed_per_unit_ms: f64,

    /// Chassis turn rate for a unit rotation rate demand, positive clockwise.
    ///
    /// Units: degrees/second
    pub rate_per_unit_degs: f64,

    /// Initial chassis position in the world.
    ///
    /// Units: meters
    #[serde(default)]
    pub start_position_m: [f64; 2],

    /// Initial chassis heading, anticlockwise from the world X axis.
    ///
    /// Units: degrees
    #[serde(default)]
    pub start_heading_deg: f64,

    // ---- WORLD ----

    /// Targets in the world
    #[serde(default)]
    pub targets: Vec<SimTarget>
}

/// A target in the simulated world.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimTarget {
    /// Position of the target on the floor.
    ///
    /// Units: meters
    pub position_m: [f64; 2],

    /// Simulation time at which the target appears.
    ///
    /// Units: seconds
    #[serde(default)]
    pub appear_s: f64
}

/// The state of the simulated world.
pub struct SimWorld {
    params: SimParams,

    /// Chassis position in the world
    position_m: Vector2<f64>,

    /// Chassis heading, anticlockwise from the world X axis
    heading_rad: f64,

    /// The demands the chassis is currently executing
    dems: DriveDems,

    /// Simulation time
    time_s: f64,

    /// Number of camera frames taken
    num_frames: u64,

    perlin: Perlin
}

/// Owner of the simulated world.
pub struct SimClient {
    world: Rc<RefCell<SimWorld>>
}

/// The simulated camera.
pub struct SimCam {
    world: Rc<RefCell<SimWorld>>
}

/// The simulated chassis.
pub struct SimChassis {
    world: Rc<RefCell<SimWorld>>
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum SimClientError {
    #[error("Simulation parameter {0} is invalid: {1}")]
    InvalidParam(&'static str, f64),

    #[error("Could not load the simulation parameters: {0}")]
    ParamLoadError(params::LoadError)
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for SimParams {
    fn default() -> Self {
        Self {
            cam_height_m: 0.4,
            cam_pitch_offset_deg: 12.6,
            cam_half_hfov_deg: 30.0,
            cam_min_pitch_deg: -20.0,
            noise_amplitude_deg: 0.0,
            noise_seed: 0,
            dropout_period_cycles: 0,
            speed_per_unit_ms: 0.1,
            rate_per_unit_degs: 10.0,
            start_position_m: [0.0, 0.0],
            start_heading_deg: 0.0,
            targets: vec![]
        }
    }
}

impl SimParams {
    fn validate(&self) -> Result<(), SimClientError> {
        let positives = [
            ("cam_height_m", self.cam_height_m),
            ("cam_half_hfov_deg", self.cam_half_hfov_deg),
            ("speed_per_unit_ms", self.speed_per_unit_ms),
            ("rate_per_unit_degs", self.rate_per_unit_degs),
        ];
        for (name, value) in positives.iter() {
            if !(*value > 0.0) || value.is_infinite() {
                return Err(SimClientError::InvalidParam(*name, *value))
            }
        }

        if !(self.noise_amplitude_deg >= 0.0) {
            return Err(SimClientError::InvalidParam(
                "noise_amplitude_deg", self.noise_amplitude_deg
            ))
        }

        Ok(())
    }
}

impl SimWorld {
    fn new(params: SimParams) -> Self {
        let perlin = Perlin::new().set_seed(params.noise_seed);

        Self {
            position_m: Vector2::new(params.start_position_m[0], params.start_position_m[1]),
            heading_rad: wrap_pi(params.start_heading_deg.to_radians()),
            dems: DriveDems::stop(),
            time_s: 0.0,
            num_frames: 0,
            perlin,
            params
        }
    }

    /// Advance the chassis by `dt_s` under the current demands.
    fn step(&mut self, dt_s: f64) {
        // Positive rotation demands are clockwise, the heading is anticlockwise
        let rate_rads = self.dems.rot_rate * self.params.rate_per_unit_degs.to_radians();
        self.heading_rad = wrap_pi(self.heading_rad - rate_rads * dt_s);

        let vel_ms = Rotation2::new(self.heading_rad)
            * self.dems.translation
            * self.params.speed_per_unit_ms;
        self.position_m += vel_ms * dt_s;

        self.time_s += dt_s;
    }

    /// Project a target into the camera, returning its (yaw, pitch) in degrees if visible.
    fn project(&self, target: &SimTarget) -> Option<(f64, f64)> {
        let rel_m = Vector2::new(target.position_m[0], target.position_m[1]) - self.position_m;
        let local_m = Rotation2::new(-self.heading_rad) * rel_m;

        let range_m = local_m.norm();
        let yaw_deg = -local_m.y.atan2(local_m.x).to_degrees();
        let pitch_deg = self.params.cam_pitch_offset_deg
            - self.params.cam_height_m.atan2(range_m).to_degrees();

        if yaw_deg.abs() <= self.params.cam_half_hfov_deg
            && pitch_deg >= self.params.cam_min_pitch_deg
        {
            Some((yaw_deg, pitch_deg))
        }
        else {
            None
        }
    }

    /// Take a camera frame.
    fn observe(&mut self) -> Observation {
        self.num_frames += 1;

        let period = self.params.dropout_period_cycles;
        if period > 0 && self.num_frames % period == 0 {
            return Observation::none()
        }

        let time_s = self.time_s;
        let best = self.params.targets
            .iter()
            .filter(|t| t.appear_s <= time_s)
            .filter_map(|t| self.project(t).map(|angles| (t.appear_s, angles)))
            .fold(None, |best: Option<(f64, (f64, f64))>, cand| match best {
                Some(b) if b.0 > cand.0 => Some(b),
                _ => Some(cand)
            });

        match best {
            Some((_, (yaw_deg, pitch_deg))) => {
                let t = time_s * NOISE_FREQ_HZ;
                let amp = self.params.noise_amplitude_deg;
                Observation::target(
                    yaw_deg + amp * self.perlin.get([t, NOISE_YAW_OFFSET]),
                    pitch_deg + amp * self.perlin.get([t, 0.0])
                )
            },
            None => Observation::none()
        }
    }

    /// Range from the chassis to the nearest target which has appeared.
    fn range_to_nearest_m(&self) -> Option<f64> {
        self.params.targets
            .iter()
            .filter(|t| t.appear_s <= self.time_s)
            .map(|t| (Vector2::new(t.position_m[0], t.position_m[1]) - self.position_m).norm())
            .fold(None, |min: Option<f64>, r| match min {
                Some(m) if m <= r => Some(m),
                _ => Some(r)
            })
    }
}

impl SimClient {
    /// Create a new simulated world.
    pub fn new(params: SimParams) -> Result<Self, SimClientError> {
        params.validate()?;

        Ok(Self {
            world: Rc::new(RefCell::new(SimWorld::new(params)))
        })
    }

    /// Create a new simulated world from the given file in the params directory.
    pub fn from_params_file(param_file_path: &str) -> Result<Self, SimClientError> {
        let params: SimParams = params::load(param_file_path)
            .map_err(SimClientError::ParamLoadError)?;

        Self::new(params)
    }

    /// Get a camera viewing this world.
    pub fn cam(&self) -> SimCam {
        SimCam { world: self.world.clone() }
    }

    /// Get a drive for the chassis in this world.
    pub fn chassis(&self) -> SimChassis {
        SimChassis { world: self.world.clone() }
    }

    /// Advance the world by the given time.
    pub fn step(&self, dt_s: f64) {
        self.world.borrow_mut().step(dt_s)
    }

    pub fn time_s(&self) -> f64 {
        self.world.borrow().time_s
    }

    /// The chassis position and heading (in degrees anticlockwise from the world X axis).
    pub fn pose(&self) -> (Vector2<f64>, f64) {
        let world = self.world.borrow();
        (world.position_m, world.heading_rad.to_degrees())
    }

    /// The demands the chassis is currently executing.
    pub fn current_dems(&self) -> DriveDems {
        self.world.borrow().dems
    }

    /// Range to the nearest target that has appeared, or `None` if no targets have appeared.
    pub fn range_to_nearest_m(&self) -> Option<f64> {
        self.world.borrow().range_to_nearest_m()
    }
}

impl ObservationSource for SimCam {
    fn latest(&mut self) -> Observation {
        match self.world.try_borrow_mut() {
            Ok(mut world) => world.observe(),
            Err(e) => {
                warn!("Simulated camera could not access the world: {}", e);
                Observation::none()
            }
        }
    }
}

impl DriveActuator for SimChassis {
    fn drive(&mut self, dems: DriveDems) {
        match self.world.try_borrow_mut() {
            Ok(mut world) => world.dems = dems,
            Err(e) => warn!("Simulated chassis could not access the world: {}", e)
        }
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::approach_ctrl::{ApproachCtrl, Params};
    use util::module::Mnvr;

    fn sim(targets: Vec<SimTarget>) -> SimClient {
        SimClient::new(SimParams { targets, ..SimParams::default() }).unwrap()
    }

    fn target(x: f64, y: f64) -> SimTarget {
        SimTarget { position_m: [x, y], appear_s: 0.0 }
    }

    #[test]
    fn test_camera_geometry() {
        let s = sim(vec![target(3.0, 0.0)]);
        let obs = s.cam().latest();
        assert!(obs.has_target);
        assert!(obs.yaw_deg.abs() < 1e-9);
        assert!((obs.pitch_deg - 5.0).abs() < 0.01, "{}", obs.pitch_deg);

        // Nearer targets have lower pitches
        let s = sim(vec![target(1.0, 0.0)]);
        let obs = s.cam().latest();
        assert!(obs.pitch_deg < -8.0 && obs.pitch_deg > -10.0, "{}", obs.pitch_deg);

        // Targets to the right have positive yaw
        let s = sim(vec![target(3.0, -0.5)]);
        assert!(s.cam().latest().yaw_deg > 9.0);
        let s = sim(vec![target(3.0, 0.5)]);
        assert!(s.cam().latest().yaw_deg < -9.0);
    }

    #[test]
    fn test_visibility() {
        // Behind, outside the field of view, under the camera
        for t in [target(-3.0, 0.0), target(1.0, 2.0), target(0.3, 0.0)].iter() {
            assert!(!sim(vec![*t]).cam().latest().has_target, "{:?}", t);
        }

        // Nothing in the world
        assert_eq!(sim(vec![]).cam().latest(), Observation::none());
        assert_eq!(sim(vec![]).range_to_nearest_m(), None);
    }

    #[test]
    fn test_targets_appear() {
        let s = sim(vec![
            target(3.0, 0.0),
            SimTarget { position_m: [5.0, -1.0], appear_s: 1.0 }
        ]);
        let mut cam = s.cam();

        assert!(cam.latest().yaw_deg.abs() < 1e-9);
        assert!((s.range_to_nearest_m().unwrap() - 3.0).abs() < 1e-9);

        // The newcomer becomes the best target even though it is farther away
        s.step(1.0);
        let obs = cam.latest();
        assert!(obs.yaw_deg > 10.0);
        assert!(obs.pitch_deg > 5.0);
        assert!((s.range_to_nearest_m().unwrap() - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_chassis_holds_demand() {
        let s = sim(vec![]);
        let mut chassis = s.chassis();

        chassis.drive(DriveDems::new(2.0, 0.0));
        s.step(1.0);
        s.step(1.0);
        let (pos, heading) = s.pose();
        assert!((pos.x - 0.4).abs() < 1e-9);
        assert!(pos.y.abs() < 1e-9);
        assert!(heading.abs() < 1e-9);
        assert_eq!(s.current_dems(), DriveDems::new(2.0, 0.0));

        // Positive rotation is clockwise
        chassis.drive(DriveDems::new(0.0, 1.0));
        s.step(1.0);
        let (_, heading) = s.pose();
        assert!((heading + 10.0).abs() < 1e-9);
        assert!((s.time_s() - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_dropout_and_noise() {
        let s = SimClient::new(SimParams {
            targets: vec![target(3.0, 0.0)],
            dropout_period_cycles: 3,
            noise_amplitude_deg: 0.5,
            ..SimParams::default()
        }).unwrap();
        let mut cam = s.cam();

        for i in 1..=9 {
            let obs = cam.latest();
            assert_eq!(obs.has_target, i % 3 != 0);
            if obs.has_target {
                assert!((obs.pitch_deg - 5.0).abs() < 0.75);
                assert!(obs.yaw_deg.abs() < 0.75);
            }
            s.step(0.13);
        }
    }

    #[test]
    fn test_invalid_params() {
        let r = SimClient::new(SimParams { cam_height_m: 0.0, ..SimParams::default() });
        assert!(matches!(r, Err(SimClientError::InvalidParam("cam_height_m", _))));

        let r = SimClient::new(SimParams { noise_amplitude_deg: f64::NAN, ..SimParams::default() });
        assert!(r.is_err());
    }

    #[test]
    fn test_closed_loop_approach() {
        let s = sim(vec![target(3.0, 0.5)]);
        let mut ctrl = ApproachCtrl::new(Params::default(), s.cam(), s.chassis()).unwrap();

        ctrl.initialize();
        for _ in 0..5000 {
            ctrl.execute();
            if ctrl.is_finished() {
                break
            }
            s.step(0.02);
        }

        assert!(ctrl.is_finished());

        // Stopped short of the target, facing it
        let range = s.range_to_nearest_m().unwrap();
        assert!(range > 0.9 && range < 1.2, "{}", range);
        let (pos, heading) = s.pose();
        let bearing = (0.5 - pos.y).atan2(3.0 - pos.x).to_degrees();
        assert!((bearing - heading).abs() < 1.0);

        ctrl.end(false);
    }
}
