//! Main approach executable entry point.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Initialise the session, logging and parameters
//!     - Build the observation source and drive, either:
//!         - replaying an observation script into a recording drive, or
//!         - a simulated camera and chassis
//!     - Main loop:
//!         - Step the approach manoeuvre
//!         - Archive the status report
//!         - Advance the simulation
//!         - Sleep for the remainder of the cycle
//!
//! The loop ends when the manoeuvre arrives, times out, or the script runs out.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{info, warn};
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};
use color_eyre::{Report, eyre::{WrapErr, eyre}};
use structopt::StructOpt;

// Internal
use approach_lib::{
    approach_ctrl::{self, ApproachCtrl},
    drive_client::{DriveActuator, RecordingDrive},
    mnvr_runner::{MnvrRunner, RunnerState},
    params::ApproachExecParams,
    sim_client::SimClient,
    vision_client::{ObservationSource, ScriptSource}
};
use util::{
    archive::Archiver,
    logger::{logger_init, LevelFilter},
    session::Session
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Command line options
#[derive(Debug, StructOpt)]
#[structopt(
    name = "approach_exec",
    about = "Drives the chassis towards a target seen by the vision pipeline"
)]
struct Opts {
    /// Observation script to replay. If not given the simulated world is used.
    #[structopt(short, long, parse(from_os_str))]
    script: Option<PathBuf>,

    /// Run cycles back to back rather than in real time
    #[structopt(long)]
    fast: bool
}

/// Everything the main loop needs other than the manoeuvre itself.
struct LoopCtx<'a> {
    exec_params: &'a ApproachExecParams,
    fast: bool,
    archiver: Option<Archiver>,
    sim: Option<&'a SimClient>
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {

    color_eyre::install()?;

    let opts = Opts::from_args();

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new(
        "approach_exec",
        "sessions"
    ).wrap_err("Failed to create the session")?;

    // The exec params are needed before the logger to get the levels
    let exec_params: ApproachExecParams = util::params::load("approach_exec.toml")
        .wrap_err("Could not load exec params")?;

    let min_level: LevelFilter = exec_params.log_level
        .parse()
        .map_err(|_| eyre!("Invalid log level \"{}\"", exec_params.log_level))?;

    // Initialise logger
    logger_init(min_level, &exec_params.target_levels(), &session)
        .wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Vision-Guided Approach Executable\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    let ctrl_params: approach_ctrl::Params = util::params::load("approach_ctrl.toml")
        .wrap_err("Could not load ApproachCtrl params")?;

    exec_params.validate(ctrl_params.period_s)
        .wrap_err("Exec and ApproachCtrl params are inconsistent")?;

    info!("Parameters loaded");

    // ---- INITIALISE ARCHIVE ----

    let archiver = match exec_params.archive_enabled {
        true => Some(
            Archiver::from_path(&session, "approach_ctrl/status_report.csv")
                .wrap_err("Failed to initialise the StatusReport archive")?
        ),
        false => None
    };

    // ---- RUN ----

    match opts.script {
        Some(ref path) => {
            info!("Loading script from {:?}", path);

            let source = ScriptSource::from_path(path)
                .wrap_err("Failed to load script")?;

            let ctrl = ApproachCtrl::new(ctrl_params, source, RecordingDrive::new())
                .wrap_err("Failed to initialise ApproachCtrl")?;

            let ctx = LoopCtx { exec_params: &exec_params, fast: opts.fast, archiver, sim: None };
            let runner = run(ctrl, ctx, |c| c.source().is_complete());

            let drive = runner.mnvr().drive();
            info!(
                "{} drive demands issued over {} cycles",
                drive.num_dems(),
                runner.num_cycles()
            );
            if let Some(dems) = drive.last() {
                info!("Last drive demand: {:?}", dems);
            }
        },
        None => {
            info!("No script provided, using the simulated world");

            let sim = SimClient::from_params_file("sim.toml")
                .wrap_err("Failed to initialise the SimClient")?;

            let ctrl = ApproachCtrl::new(ctrl_params, sim.cam(), sim.chassis())
                .wrap_err("Failed to initialise ApproachCtrl")?;

            let ctx = LoopCtx { exec_params: &exec_params, fast: opts.fast, archiver, sim: Some(&sim) };
            run(ctrl, ctx, |_| false);

            let (pos, heading_deg) = sim.pose();
            info!(
                "Chassis at ({:.3}, {:.3}) m heading {:.2} deg after {:.2} s",
                pos.x, pos.y, heading_deg, sim.time_s()
            );
            match sim.range_to_nearest_m() {
                Some(r) => info!("Range to nearest target: {:.3} m", r),
                None => info!("No targets in the world")
            }
        }
    }

    // ---- SHUTDOWN ----

    info!("End of execution");

    Ok(())
}

/// Run the approach to completion.
///
/// `input_ended` is checked after every cycle, if it returns true the approach is cancelled.
fn run<S, D, F>(
    ctrl: ApproachCtrl<S, D>,
    mut ctx: LoopCtx,
    input_ended: F
) -> MnvrRunner<ApproachCtrl<S, D>>
where
    S: ObservationSource,
    D: DriveActuator,
    F: Fn(&ApproachCtrl<S, D>) -> bool
{
    let mut runner = MnvrRunner::new(ctrl);
    if let Some(t) = ctx.exec_params.timeout_cycles() {
        info!("Approach will time out after {} cycles", t);
        runner = runner.with_timeout(t);
    }

    let period = Duration::from_secs_f64(ctx.exec_params.cycle_period_s);

    info!("Begining main loop\n");

    loop {

        // Get cycle start time
        let cycle_start_instant = Instant::now();

        // ---- CONTROL ALGORITHM PROCESSING ----

        let state = runner.step();

        // ---- WRITE ARCHIVES ----

        if let Some(ref mut archiver) = ctx.archiver {
            if let Err(e) = archiver.serialise(runner.mnvr().report()) {
                warn!("Could not archive the StatusReport: {}", e);
            }
        }

        // ---- SIMULATION ----

        if let Some(sim) = ctx.sim {
            sim.step(ctx.exec_params.cycle_period_s);
        }

        if state.is_terminal() {
            break
        }

        if input_ended(runner.mnvr()) {
            info!("End of observation script reached, stopping");
            runner.cancel();
            break
        }

        // ---- CYCLE MANAGEMENT ----

        if ctx.fast {
            continue
        }

        let cycle_dur = Instant::now() - cycle_start_instant;

        // Get sleep duration
        match period.checked_sub(cycle_dur) {
            Some(d) => thread::sleep(d),
            None => warn!(
                "Cycle overran by {:.06} s",
                cycle_dur.as_secs_f64() - period.as_secs_f64()
            )
        }
    }

    match runner.state() {
        RunnerState::Finished => info!("Approach complete"),
        s => warn!("Approach did not complete: {:?}", s)
    }

    runner
}
