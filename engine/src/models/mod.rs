//! Domain models for the envelope plan

pub mod descriptor;
pub mod envelope;
pub mod growth;
pub mod results;

// Re-exports
pub use descriptor::{
    Descriptor, DescriptorError, DescriptorKind, Direction, Provenance, INFLOW_PARAM,
    OUTFLOW_PARAM,
};
pub use envelope::{Envelope, EnvelopeSet, PlanError};
pub use growth::{GrowthKind, GrowthModel};
pub use results::{ResultSeries, ResultSet};
