//! Cyclic module interface
//!
//! A module is set up once from its parameter files, then run once per
//! control cycle. `TrajPart` in `part_exec` is the implementor.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal imports
use crate::session::Session;

// ---------------------------------------------------------------------------
// MODULE STATE
// ---------------------------------------------------------------------------

pub trait State {
    /// Usually the parameter file paths
    type InitData;
    type InitError;

    /// Everything one cycle reads
    type InputData;
    /// Everything one cycle produces
    type OutputData;
    /// Monitoring quantities for one cycle
    type StatusReport;
    type ProcError;

    /// Load and validate the module's configuration.
    ///
    /// The session is passed so the module can save what it was configured
    /// with alongside the run's other outputs.
    fn init(&mut self, init_data: Self::InitData, session: &Session)
        -> Result<(), Self::InitError>;

    /// Run one cycle.
    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>;
}
