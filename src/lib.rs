//! Cross-section hydraulics, Manning rating curves and single-reach storage
//! routing.

pub mod config;
pub mod fallback;
pub mod geometry;
pub mod io;
pub mod profile;
pub mod rating;
pub mod solver;
pub mod state;
pub mod storage;

pub use config::{RatingOptions, SchemeKind, SimulationConfig};
pub use geometry::{ChannelGeometry, compute_geometry};
pub use io::results::{ResultSource, SimulationResult, SimulationResultPoint};
pub use profile::{CrossSectionPoint, CrossSectionProfile};
pub use rating::{RatingPoint, generate_rating};
pub use storage::run_storage_model;
