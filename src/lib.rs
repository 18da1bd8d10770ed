//! Exact event-driven simulation of rigid discs in a bounded 2D arena.
//!
//! ```no_run
//! use ballsim::core::{Budget, Engine, SceneConfig, SlipperyBoundary};
//!
//! # fn main() -> ballsim::error::Result<()> {
//! let scene = SceneConfig { num_balls: 32, seed: Some(7), ..SceneConfig::default() };
//! let mut engine = Engine::new(SlipperyBoundary::new(scene.arena_size)?, scene.build()?)?;
//! let batch = engine.advance(Budget::unbounded().until_time(10.0))?;
//! for snap in &batch.snapshots {
//!     println!("{}", snap.description()?);
//! }
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod error;

pub use crate::core::{Batch, Budget, Engine, StateSnapshot};
pub use crate::error::{Error, Result};
