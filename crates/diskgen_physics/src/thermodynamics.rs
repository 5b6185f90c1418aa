use diskgen_core::{DiskConfig, DiskError, Result, TEMPERATURE_EXPONENT, T_FAC};

/// Power-law temperature profile and the matching internal energy
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThermodynamicsSolver {
    /// Temperature at r = 1 (K)
    pub t0: f64,
    pub gamma: f64,
}

impl ThermodynamicsSolver {
    pub fn from_config(config: &DiskConfig) -> Self {
        Self {
            t0: config.t0,
            gamma: config.gamma,
        }
    }

    /// `T = T0 r^q`
    pub fn temperature(&self, r: f64) -> Result<f64> {
        if !(r > 0.0) {
            return Err(DiskError::Domain(format!("temperature evaluated at r = {r}")));
        }
        Ok(self.t0 * r.powf(TEMPERATURE_EXPONENT))
    }

    /// `e = T T_FAC / (gamma - 1)`
    pub fn internal_energy(&self, r: f64) -> Result<f64> {
        let e = self.temperature(r)? * T_FAC / (self.gamma - 1.0);
        if !e.is_finite() {
            return Err(DiskError::Domain(format!("internal energy is non-finite at r = {r}")));
        }
        Ok(e)
    }
}
