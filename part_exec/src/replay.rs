//! # Replay
//!
//! A replay file holds a planned trajectory and a sequence of recorded cycles, each giving the
//! cycle time and the vehicle state. A cycle may also carry a new trajectory, which replaces the
//! planned one from that cycle onwards.
//!
//! Replay files are JSON, for example `demos/v_shape_reversal.json`.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::{fs::read_to_string, path::Path};

use crate::{
    traj::{Gear, Trajectory},
    traj_part::{InputData, StatusReport, TrajPart},
    vehicle::VehicleState,
};

// ------------------------------------------------------------------------------------------------
// DATA STRUCTURES
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Replay {
    /// The trajectory used from the first cycle
    pub trajectory: Trajectory,

    pub cycles: Vec<ReplayCycle>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplayCycle {
    pub time_s: f64,

    pub vehicle_state: VehicleState,

    /// A replacement trajectory, used from this cycle on
    #[serde(default)]
    pub trajectory: Option<Trajectory>,
}

/// The result of one replayed cycle.
#[derive(Debug, Clone, Serialize)]
pub struct CycleRecord {
    pub time_s: f64,

    /// Gear of the output trajectory, if the cycle succeeded
    pub gear: Option<Gear>,

    /// The output trajectory, if the cycle succeeded
    pub output: Option<Trajectory>,

    pub report: StatusReport,

    /// The error message, if the cycle failed
    pub error: Option<String>,
}

// ------------------------------------------------------------------------------------------------
// ENUMERATIONS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    #[error("Cannot read the replay file: {0}")]
    FileLoadError(std::io::Error),

    #[error("Cannot parse the replay file: {0}")]
    DeserialiseError(serde_json::Error),

    #[error("The replay contains no cycles")]
    NoCycles,
}

// ------------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// ------------------------------------------------------------------------------------------------

impl Replay {
    /// Load a replay file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ReplayError> {
        let replay_str = match read_to_string(path) {
            Ok(s) => s,
            Err(e) => return Err(ReplayError::FileLoadError(e)),
        };

        Self::from_str(&replay_str)
    }

    /// Parse a replay from a JSON string.
    pub fn from_str(replay_str: &str) -> Result<Self, ReplayError> {
        let replay: Self = match serde_json::from_str(replay_str) {
            Ok(r) => r,
            Err(e) => return Err(ReplayError::DeserialiseError(e)),
        };

        if replay.cycles.is_empty() {
            return Err(ReplayError::NoCycles);
        }

        Ok(replay)
    }

    /// The module input for every cycle, in order.
    pub fn inputs(&self) -> Vec<InputData> {
        let mut traj = &self.trajectory;

        self.cycles
            .iter()
            .map(|c| {
                if let Some(ref t) = c.trajectory {
                    traj = t;
                }

                InputData {
                    trajectory: traj.clone(),
                    vehicle_state: c.vehicle_state,
                    time_s: c.time_s,
                }
            })
            .collect()
    }

    /// Run every cycle through the given module.
    ///
    /// Failed cycles are logged and recorded, and the replay carries on with the next cycle.
    pub fn run(&self, traj_part: &mut TrajPart) -> Vec<CycleRecord> {
        let mut records = Vec::with_capacity(self.cycles.len());

        for input in self.inputs() {
            let record = match traj_part.process(
                &input.trajectory,
                &input.vehicle_state,
                input.time_s,
            ) {
                Ok(seg) => CycleRecord {
                    time_s: input.time_s,
                    gear: Some(seg.gear),
                    output: Some(seg.traj),
                    report: traj_part.report().clone(),
                    error: None,
                },
                Err(e) => {
                    warn!("Cycle at {:.3} s failed: {}", input.time_s, e);
                    CycleRecord {
                        time_s: input.time_s,
                        gear: None,
                        output: None,
                        report: traj_part.report().clone(),
                        error: Some(format!("{}", e)),
                    }
                }
            };

            debug!("Cycle at {:.3} s: {:?}", input.time_s, record.report);

            if record.report.destination_reached {
                info!("Destination reached at {:.3} s", input.time_s);
            }

            records.push(record);
        }

        records
    }
}
