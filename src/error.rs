use thiserror::Error;

/// Crate-wide result type alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the simulation core.
///
/// Every fallible operation in the crate returns this enum rather than panicking.
/// Each variant carries enough context to be actionable.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid user or API parameter.
    #[error("invalid parameter: {0}")]
    InvalidParam(String),

    /// Numerical or geometric issue (e.g., coincident centres at contact).
    #[error("numerical error: {0}")]
    MathError(String),

    /// A collision description was requested for participants that are neither
    /// ball/ball nor ball/wall.
    #[error("unsupported collision shape: {0}")]
    UnsupportedCollisionShape(String),

    /// `advance` was called after the halt condition ended the run.
    #[error("simulation already halted; advance cannot be resumed")]
    ResumeAfterHalt,

    /// A step found no finite collision candidate, so no next event exists.
    #[error("no collision candidate at step {step} (t = {time}); arena must bound every ball")]
    DegenerateStep { step: u64, time: f64 },
}
