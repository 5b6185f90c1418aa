pub mod config;
pub mod constants;
pub mod error;
pub mod types;

pub use config::{DiskConfig, PlacementStrategy};
pub use constants::*;
pub use error::{DiskError, Result};
pub use types::*;
