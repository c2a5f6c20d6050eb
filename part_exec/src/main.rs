//! Trajectory partition replay executable.
//!
//! # Usage
//!
//! ```text
//! part_exec <replay_file.json> [--verbose]
//! ```
//!
//! The executable:
//!
//!     - Creates a new session and initialises logging
//!     - Loads `traj_part.toml` and `vehicle.toml` from the parameters directory
//!     - Runs every cycle of the replay file through TrajPart
//!     - Saves the output of each cycle to `outputs.json` in the session directory
//!
//! The software root environment variable must be set, see `util::host`.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{
    eyre::{eyre, WrapErr},
    Result,
};
use log::{debug, info, warn};
use std::env;

// Internal
use part_lib::{replay::Replay, traj_part::TrajPart};
use util::{
    logger::{logger_init, LevelFilter},
    module::State,
    session::Session,
};

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<()> {
    color_eyre::install()?;

    // ---- EARLY INITIALISATION ----

    // Collect all arguments
    let args: Vec<String> = env::args().collect();

    let replay_path = match args.get(1) {
        Some(p) => p.clone(),
        None => return Err(eyre!("Expected path to a replay file as the first argument")),
    };
    let verbose = args.iter().skip(2).any(|a| a == "--verbose");

    // Initialise session
    let session = Session::new("part_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger. Per-point rejections from the local search are left
    // out even when verbose
    let quiet_modules = [("part_lib::traj_part::locate", LevelFilter::Debug)];
    let (level, module_levels) = if verbose {
        (LevelFilter::Trace, &quiet_modules[..])
    } else {
        (LevelFilter::Info, &quiet_modules[..0])
    };
    logger_init(level, Some(&session), module_levels)
        .wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Trajectory Partition Replay\n");
    info!("Session directory: {:?}\n", session.session_root);
    debug!("CLI arguments: {:?}", args);

    // ---- INITIALISE MODULES ----

    let mut traj_part = TrajPart::default();
    traj_part
        .init(("traj_part.toml", "vehicle.toml"), &session)
        .wrap_err("Failed to initialise TrajPart")?;

    info!("TrajPart initialised");

    // ---- LOAD REPLAY ----

    info!("Loading replay from \"{}\"", replay_path);

    let replay = Replay::load(&replay_path).wrap_err("Failed to load the replay file")?;

    info!(
        "Replay loaded: {} trajectory points, {} cycles",
        replay.trajectory.get_num_points(),
        replay.cycles.len()
    );

    // ---- MAIN LOOP ----

    let records = replay.run(&mut traj_part);

    let num_failed = records.iter().filter(|r| r.error.is_some()).count();
    if num_failed > 0 {
        warn!("{} of {} cycles failed", num_failed, records.len());
    }
    else {
        info!("All {} cycles succeeded", records.len());
    }

    match records.last() {
        Some(r) if r.report.destination_reached => info!("Destination reached"),
        _ => info!("Destination not reached by the end of the replay"),
    }

    // ---- SHUTDOWN ----

    session.save("outputs.json", records);

    info!("End of replay");

    session.exit();

    Ok(())
}
