//! Core simulation types for event-driven hard-disc dynamics.
//!
//! Bodies move in straight lines between collisions, so each step jumps directly to the
//! next collision instead of integrating over fixed time increments.

pub mod ball;
pub mod boundary;
pub mod contact;
pub mod engine;
pub mod event;
pub mod halt;
pub mod scene;
pub mod snapshot;

pub use ball::Ball;
pub use boundary::{Boundary, CyclicBoundary, SlipperyBoundary};
pub use contact::{CollisionOracle, ElasticContact};
pub use engine::{Batch, Budget, Engine, SimClock};
pub use event::{CollisionEvent, Participant, WallId};
pub use halt::{HaltAfterSteps, HaltAtTime, HaltCondition, NeverHalt};
pub use scene::SceneConfig;
pub use snapshot::{describe_collision, BallState, StateSnapshot};

/// Small numeric tolerance for time and geometric checks.
pub(crate) const EPS_TIME: f64 = 1e-12;
