//! wavecut crate root: re-exports and module wiring.
//!
//! This crate implements the cut/reduction engine of an interactive
//! scientific-data analysis application: a registry of per-axis reduction
//! policies ("executors") is resolved into a deterministic slice/sum plan
//! over an N-dimensional [`Wave`], with arbitrary-angle "free line" cuts
//! handled by bilinear interpolation along the line path. The display
//! layer consumes the reduced waves and subscribes to registry change
//! notifications; none of it lives here.
//!
//! Module map:
//! - `wave`: the annotated N-D array type and position↔index mapping
//! - `cut`: executors, registry, and the `make_wave` engine
//! - `events`: change notifications for display-layer observers
//! - `params`: executor parameter persistence (JSON/YAML)
//! - `error`: error types

pub mod cut;
pub mod error;
pub mod events;
pub mod params;
pub mod wave;

// Public re-exports for a compact external API
pub use cut::{
    AllExecutor, AxisRef, DefaultExecutor, Executor, ExecutorRegistry, FreeLineExecutor,
    LineId, PointExecutor, RegionExecutor, LINE_ID_BASE,
};
pub use error::{CutError, ParamsError, WaveError};
pub use events::{ChangeKind, UpdateController, UpdateEvent, UpdateFilter};
pub use params::{load_params, save_params, ExecutorParams, RegistryParams};
pub use wave::Wave;
