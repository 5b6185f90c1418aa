use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{DiskError, Result};

/// How particles are placed in the disk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlacementStrategy {
    /// Rejection-sampled radii, equal particle masses, exactly N particles
    #[default]
    Random,
    /// Regular 3D lattice with per-cell masses; particle count is emergent
    Grid,
}

/// Disk initial-condition configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiskConfig {
    /// Target number of particles
    pub particle_count: usize,
    /// Inner radius (middle of the smoothed inner edge)
    pub r_in: f64,
    /// Outer radius (middle of the smoothed outer edge)
    pub r_out: f64,
    /// Surface density power-law index
    pub alpha: f64,
    /// Surface density at r = 1
    pub sigma0: f64,
    /// Gas temperature at r = 1 (K)
    pub t0: f64,
    /// Aspect ratio H/r
    pub h: f64,
    /// Adiabatic index
    pub gamma: f64,
    /// Gravitational constant (code units)
    pub g: f64,
    /// Mass of the central star (code units)
    pub m_star: f64,
    /// Random seed for deterministic sampling
    pub seed: u64,
    /// Particle placement strategy
    pub placement: PlacementStrategy,
    /// Output file name; the snapshot suffix is enforced by the writer
    pub output: String,
}

impl Default for DiskConfig {
    fn default() -> Self {
        Self {
            particle_count: 1000,
            r_in: 1.0,
            r_out: 10.0,
            alpha: -1.0,
            sigma0: 1e-3,
            t0: 300.0,
            h: 0.05,
            gamma: 1.4,
            g: 1.0,
            m_star: 1.0,
            seed: 42,
            placement: PlacementStrategy::Random,
            output: "ic_disk".to_string(),
        }
    }
}

impl DiskConfig {
    /// Strict JSON load; missing fields take their defaults
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        serde_json::from_str(&contents).map_err(|e| {
            DiskError::Config(format!("failed to parse {:?}: {e}", path.as_ref()))
        })
    }

    /// Configuration for a run: the JSON file when one is given, defaults
    /// otherwise. An unreadable or malformed file is an error.
    pub fn load<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        match path {
            Some(path) => {
                let config = Self::from_json_file(path.as_ref())?;
                log::info!("Loaded disk configuration from {:?}", path.as_ref());
                Ok(config)
            }
            None => {
                log::info!("No disk configuration given, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Reject configurations that cannot describe a disk. Called before any
    /// integration or sampling.
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("r_in", self.r_in),
            ("r_out", self.r_out),
            ("alpha", self.alpha),
            ("sigma0", self.sigma0),
            ("t0", self.t0),
            ("h", self.h),
            ("gamma", self.gamma),
            ("g", self.g),
            ("m_star", self.m_star),
        ];
        if let Some((name, value)) = fields.iter().find(|(_, v)| !v.is_finite()) {
            return Err(DiskError::Config(format!("{name} must be finite, got {value}")));
        }

        if self.particle_count == 0 {
            return Err(DiskError::Config("particle count must be positive".into()));
        }
        if self.r_in <= 0.0 {
            return Err(DiskError::Config(format!(
                "inner radius must be positive, got {}",
                self.r_in
            )));
        }
        if self.r_in >= self.r_out {
            return Err(DiskError::Config(format!(
                "inner radius {} must be below outer radius {}",
                self.r_in, self.r_out
            )));
        }
        if self.h <= 0.0 {
            return Err(DiskError::Config(format!(
                "aspect ratio must be positive, got {}",
                self.h
            )));
        }
        if self.gamma <= 1.0 {
            return Err(DiskError::Config(format!(
                "adiabatic index must exceed 1, got {}",
                self.gamma
            )));
        }
        if self.sigma0 < 0.0 || self.t0 < 0.0 {
            return Err(DiskError::Config(
                "surface density and temperature must be non-negative".into(),
            ));
        }
        if self.g * self.m_star <= 0.0 {
            return Err(DiskError::Config(
                "G * M_star must be positive for a bound disk".into(),
            ));
        }
        Ok(())
    }

    /// Lower bound of the mass integral, below the smoothed inner edge
    pub fn integration_min(&self) -> f64 {
        self.r_in * crate::INNER_BOUND_FACTOR
    }

    /// Upper bound of the mass integral and of rejection candidates
    pub fn integration_max(&self) -> f64 {
        self.r_out * crate::OUTER_BOUND_FACTOR
    }
}
