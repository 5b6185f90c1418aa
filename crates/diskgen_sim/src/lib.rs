pub mod pipeline;

pub use pipeline::{generate, header_attributes, particle_group, run, write_snapshot};
