//! The cut subsystem: executor variants, the registry with its
//! mutual-exclusion rules, and the reduction engine.
//!
//! - `axes`: axis identifiers for cut requests (`AxisRef`, `LineId`)
//! - `executor`: ordinary reduction policies (Default, All, Point, Region)
//! - `free_line`: the interpolation cut across two axes
//! - `registry`: ordered executor collection with enable/disable state
//! - `engine`: `make_wave`, the cut computation itself

pub mod axes;
pub mod executor;
pub mod free_line;
pub mod registry;

mod engine;
mod plan;

pub use axes::{AxisRef, LineId, LINE_ID_BASE};
pub use executor::{AllExecutor, DefaultExecutor, Executor, PointExecutor, RegionExecutor};
pub use free_line::FreeLineExecutor;
pub use registry::ExecutorRegistry;
