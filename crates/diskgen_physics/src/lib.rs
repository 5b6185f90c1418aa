pub mod kinematics;
pub mod normalize;
pub mod placement;
pub mod profile;
pub mod thermodynamics;

pub use kinematics::KinematicsSolver;
pub use normalize::{disk_mass, integrate, total_mass};
pub use placement::{pdf_envelope, placement_for, GridSampler, ParticlePlacement, RejectionSampler};
pub use profile::DensityProfile;
pub use thermodynamics::ThermodynamicsSolver;
