//! Trajectory partition module state

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};

// Internal
use super::{
    gear_shift::{self, GearShift},
    interp,
    locate::{self, EndReached, LocateMethod, TrackingState},
    partition::{self, PartitionList},
    rebase, ConfigError, InputError, LocError, Params, TrajPartError,
};
use crate::{
    traj::{Segment, Trajectory},
    vehicle::{EgoFrame, VehicleParams, VehicleState},
};
use util::{module::State, params, session::Session};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct TrajPart {
    params: Params,

    vehicle: VehicleParams,

    /// State carried from one cycle to the next
    persisted: PersistedState,

    report: StatusReport,
}

/// Everything TrajPart remembers between cycles.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PersistedState {
    /// The current plan, if a trajectory has been received
    pub plan: Option<Plan>,

    pub tracking: TrackingState,

    /// The gear shift in progress, if any
    pub gear_shift: Option<GearShift>,
}

/// A partitioned trajectory.
#[derive(Debug, Clone, PartialEq)]
pub struct Plan {
    /// The interpolated trajectory the partitions were built from. A new plan
    /// is detected by comparing against this.
    pub interpolated: Trajectory,

    pub partitions: PartitionList,
}

/// Input data to the module
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputData {
    /// The raw trajectory from the planner
    pub trajectory: Trajectory,

    pub vehicle_state: VehicleState,

    /// Time of this cycle
    pub time_s: f64,
}

/// The status report containing monitoring quantities for the cycle.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct StatusReport {
    /// How the vehicle was located this cycle
    pub located_by: Option<LocateMethod>,

    /// Number of segments in the current plan
    pub num_segments: usize,

    /// Index of the segment being output
    pub segment_index: usize,

    /// Index of the tracked point within the segment
    pub point_index: usize,

    /// Distance from the vehicle to the matched point
    pub distance_err_m: f64,

    /// Difference between the direction of travel of the vehicle and the
    /// matched point
    pub heading_err_rad: f64,

    /// If true the trajectory was partitioned this cycle
    pub new_plan: bool,

    /// If true the end of a segment was reached this cycle
    pub end_reached: bool,

    /// If true the end of the final segment has been reached
    pub destination_reached: bool,

    /// If true the output begins with a gear shift segment
    pub gear_shift_active: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl State for TrajPart {
    /// Paths to the module and vehicle parameter files
    type InitData = (&'static str, &'static str);
    type InitError = TrajPartError;

    type InputData = InputData;
    type OutputData = Segment;
    type StatusReport = StatusReport;
    type ProcError = TrajPartError;

    /// Initialise the TrajPart module.
    ///
    /// Expected init data is the paths to the module and vehicle parameter
    /// files. The loaded parameters are saved into the session.
    fn init(
        &mut self,
        init_data: Self::InitData,
        session: &Session
    ) -> Result<(), Self::InitError> {
        // Load the parameters
        let params: Params = match params::load(init_data.0) {
            Ok(p) => p,
            Err(e) => return Err(TrajPartError::ParamLoadError(e))
        };
        let vehicle: VehicleParams = match params::load(init_data.1) {
            Ok(p) => p,
            Err(e) => return Err(TrajPartError::ParamLoadError(e))
        };

        *self = Self::new(params, vehicle)?;

        session.save("traj_part/params.json", self.params.clone());
        session.save("traj_part/vehicle.json", self.vehicle);

        Ok(())
    }

    /// Process trajectory partition, see [`TrajPart::process`].
    fn proc(
        &mut self,
        input_data: &Self::InputData
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError> {
        let output = self.process(
            &input_data.trajectory,
            &input_data.vehicle_state,
            input_data.time_s
        )?;

        Ok((output, self.report.clone()))
    }
}

impl TrajPart {
    /// Create a new instance from already loaded parameters.
    ///
    /// Both sets of parameters are validated.
    pub fn new(params: Params, vehicle: VehicleParams) -> Result<Self, TrajPartError> {
        if let Err(e) = params.validate() {
            return Err(TrajPartError::ConfigurationError(ConfigError::Params(e)));
        }
        if let Err(e) = vehicle.validate() {
            return Err(TrajPartError::ConfigurationError(ConfigError::Vehicle(e)));
        }

        Ok(Self {
            params,
            vehicle,
            persisted: PersistedState::default(),
            report: StatusReport::default(),
        })
    }

    /// Process one cycle.
    ///
    /// Returns the trajectory the vehicle should follow from now on and the
    /// gear to follow it in. The first point of the returned trajectory
    /// always has zero time and distance.
    ///
    /// On error no state from this cycle is kept, except that a new
    /// trajectory which was partitioned successfully replaces the old plan.
    pub fn process(
        &mut self,
        trajectory: &Trajectory,
        vehicle_state: &VehicleState,
        time_s: f64,
    ) -> Result<Segment, TrajPartError> {
        // Setup cycle data
        self.report = StatusReport::default();

        if !vehicle_state.is_finite() {
            warn!("Vehicle state rejected: {:?}", vehicle_state);
            return Err(TrajPartError::InvalidInput(InputError::NonFiniteVehicleState));
        }
        if !time_s.is_finite() {
            warn!("Cycle time rejected: {}", time_s);
            return Err(TrajPartError::InvalidInput(InputError::NonFiniteTime));
        }

        // ---- INTERPOLATION ----

        let interpolated = match interp::interpolate(trajectory, self.params.interpolated_pieces_num) {
            Ok(t) => t,
            Err(e) => {
                warn!("Input trajectory rejected: {}", e);
                return Err(TrajPartError::InvalidInput(e));
            }
        };

        let ego = EgoFrame::new(vehicle_state, &self.vehicle);

        // ---- PARTITIONING ----

        let is_new_plan = match self.persisted.plan {
            Some(ref p) => p.interpolated != interpolated,
            None => true,
        };

        if is_new_plan {
            if self.persisted.plan.is_some() {
                info!("New trajectory received, restarting tracking");
            }

            let partitions = match partition::partition(&interpolated, self.params.stationary_step_m) {
                Ok(p) => p,
                Err(e) => return Err(TrajPartError::InvalidInput(e)),
            };

            self.persisted = PersistedState {
                plan: Some(Plan {
                    interpolated,
                    partitions,
                }),
                ..Default::default()
            };
            self.report.new_plan = true;
        }

        let parts = match self.persisted.plan {
            Some(ref p) => &p.partitions,
            None => return Err(TrajPartError::LocalisationFailure(LocError::NoPartitions)),
        };
        let tracking = &mut self.persisted.tracking;
        let shift_state = &mut self.persisted.gear_shift;

        self.report.num_segments = parts.len();

        // ---- GEAR SHIFT PERIOD ----

        if let Some(shift) = *shift_state {
            if shift.is_finished(time_s, self.params.gear_shift_period_duration_s) {
                info!("Gear shift to {:?} complete", shift.target_gear);
                *shift_state = None;
            }
        }

        // ---- LOCATION ----

        let mut flag_change_to_next = false;

        if shift_state.is_some() {
            // Held at the boundary, so the location is already known
            self.report.located_by = Some(LocateMethod::HeldForGearShift);
        }
        else {
            // Work on a copy so a failed cycle leaves tracking untouched
            let mut next_tracking = *tracking;

            let outcome = match locate::locate(
                parts,
                &mut next_tracking,
                &ego,
                &self.vehicle,
                &self.params,
            ) {
                Ok(o) => o,
                Err(e) => {
                    error!("Could not locate the vehicle: {}", e);
                    return Err(TrajPartError::LocalisationFailure(e));
                }
            };

            *tracking = next_tracking;

            self.report.located_by = Some(outcome.method);
            self.report.distance_err_m = outcome.matched.distance_m;
            self.report.heading_err_rad = outcome.matched.heading_err_rad;
            self.report.end_reached = outcome.end_reached.is_some();

            match outcome.end_reached {
                Some(EndReached::NextSegment) => {
                    flag_change_to_next = true;
                    *shift_state = GearShift::start(parts, outcome.matched.segment_index, time_s);
                }
                Some(EndReached::Destination) => {
                    self.report.destination_reached = true;
                }
                None => (),
            }
        }

        self.report.segment_index = tracking.segment_index;
        self.report.point_index = tracking.point_index;

        // ---- OUTPUT ----

        let seg = match parts.get(tracking.segment_index) {
            Some(s) => s,
            None => return Err(TrajPartError::LocalisationFailure(LocError::NoPartitions)),
        };

        let rest = rebase::rebase(&seg.traj, tracking.point_index);

        let output = match *shift_state {
            Some(shift) => {
                let anchor = match shift.anchor(parts, flag_change_to_next) {
                    Some(a) => a,
                    None => return Err(TrajPartError::LocalisationFailure(LocError::NoPartitions)),
                };
                let idle = gear_shift::generate_idle_segment(&anchor, shift.target_gear, &self.params);

                self.report.gear_shift_active = true;

                Segment::new(
                    rebase::splice_after_idle(idle.traj, rest, self.params.gear_shift_max_t_s),
                    shift.target_gear,
                )
            }
            None => Segment::new(rest, seg.gear),
        };

        debug!(
            "Output {} points in {:?}",
            output.traj.get_num_points(),
            output.gear
        );

        Ok(output)
    }

    /// Clear all state held between cycles.
    ///
    /// The next cycle behaves exactly as the first cycle of a new instance
    /// with the same parameters.
    pub fn restart(&mut self) {
        info!("TrajPart restarted");
        self.persisted = PersistedState::default();
        self.report = StatusReport::default();
    }

    /// The report from the last cycle.
    pub fn report(&self) -> &StatusReport {
        &self.report
    }

    pub fn persisted(&self) -> &PersistedState {
        &self.persisted
    }

    pub fn tracking(&self) -> &TrackingState {
        &self.persisted.tracking
    }

    /// The partitions of the current plan, if there is one.
    pub fn partitions(&self) -> Option<&PartitionList> {
        self.persisted.plan.as_ref().map(|p| &p.partitions)
    }
}
