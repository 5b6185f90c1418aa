use diskgen_core::{DiskConfig, DiskError, Result, TEMPERATURE_EXPONENT};

/// Rotation curve of the gas disk: Keplerian rotation corrected for radial
/// pressure support and for the weaker gravity felt above the midplane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KinematicsSolver {
    pub alpha: f64,
    pub h: f64,
    /// G * M_star
    pub gm: f64,
}

impl KinematicsSolver {
    pub fn from_config(config: &DiskConfig) -> Self {
        Self {
            alpha: config.alpha,
            h: config.h,
            gm: config.g * config.m_star,
        }
    }

    pub fn keplerian_omega(&self, r: f64) -> f64 {
        (self.gm / (r * r)).sqrt()
    }

    /// `omega / omega_K = sqrt((q + alpha) h^2 + (1 + q) - q r / sqrt(r^2 + z^2))`
    pub fn correction_factor(&self, r: f64, z: f64) -> f64 {
        let q = TEMPERATURE_EXPONENT;
        ((q + self.alpha) * self.h * self.h + (1.0 + q) - q * r / r.hypot(z)).sqrt()
    }

    /// Angular velocity at planar radius `r` and height `z`
    pub fn angular_velocity(&self, r: f64, z: f64) -> Result<f64> {
        if !(r > 0.0) {
            return Err(DiskError::Domain(format!("angular velocity evaluated at r = {r}")));
        }
        let omega = self.keplerian_omega(r) * self.correction_factor(r, z);
        if !omega.is_finite() {
            return Err(DiskError::Domain(format!(
                "no rotational equilibrium at r = {r}, z = {z} (alpha = {}, h = {})",
                self.alpha, self.h
            )));
        }
        Ok(omega)
    }

    /// Purely azimuthal velocity `(-omega y, omega x, 0)`
    pub fn velocity(&self, position: [f64; 3]) -> Result<[f64; 3]> {
        let [x, y, z] = position;
        let omega = self.angular_velocity(x.hypot(y), z)?;
        Ok([-omega * y, omega * x, 0.0])
    }
}
