//! Staged peek engine
//!
//! - **queue**: stage-tagged deferred operations
//! - **run**: run-scoped owner of the queue plus the stage resolver
//! - **context**: read-only view passed to operations
//! - **operation**: the strategy enum
//! - **diagnostics**: per-run warning channel

pub mod context;
pub mod diagnostics;
pub mod operation;
pub mod queue;
pub mod run;

pub use context::StageContext;
pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};
pub use operation::{PeekOperation, Synthesized};
pub use queue::{OperationId, PeekQueue, StagedOperation};
pub use run::{PeekError, PeekRun, RunToken, StageOutcome};
