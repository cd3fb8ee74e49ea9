//! cvdsim core: color-vision deficiency simulation.
//!
//! This crate holds the transform registry, the pixel transform engine,
//! image I/O, previews, the batch composite figure, and the interactive
//! session model. No GUI or windowing dependencies.

pub mod config;
pub mod engine;
pub mod error;
pub mod figure;
pub mod font;
pub mod image;
pub mod io;
pub mod preview;
pub mod registry;
pub mod session;
pub mod transform;

// Re-exports for convenience.
pub use config::SimulatorConfig;
pub use engine::{apply_transform, simulate, transform_buffer};
pub use error::{Result, SimError};
pub use figure::{Figure, FigureLayout, Panel, render_figure, write_figure};
pub use crate::image::{ChannelOrder, Sample, SampleFormat, SimImage};
pub use io::{load_image, save_image};
pub use preview::Size;
pub use registry::{Category, Condition, TransformRegistry};
pub use session::{SimulationResult, SimulationSession};
pub use transform::{ColorMatrix, ColorTransform};
