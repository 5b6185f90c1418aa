use diskgen_core::{DiskConfig, DiskError, Result};

/// Smoothing window built from two logistic edges:
/// `1/(1+exp((r_in-r)/w)) + 1/(1+exp((r-r_out)/w)) - 1`.
///
/// Evaluated in the equivalent product form
/// `(1 - exp((r_in-r_out)/w)) / ((1+exp((r_in-r)/w)) (1+exp((r-r_out)/w)))`
/// which cannot cancel below zero when r_in < r_out.
pub fn window(r: f64, r_in: f64, r_out: f64, width: f64) -> f64 {
    let inner = ((r_in - r) / width).exp();
    let outer = ((r - r_out) / width).exp();
    let numerator = -((r_in - r_out) / width).exp_m1();
    numerator / ((1.0 + inner) * (1.0 + outer))
}

/// `sigma0 * r^(alpha+1) * window(r)`. This is the radial mass density per
/// unit radius divided by 2π, so the disk mass is `2π ∫ sigma dr`.
///
/// Fails at r <= 0, where a negative alpha diverges.
pub fn sigma(r: f64, r_in: f64, r_out: f64, h: f64, alpha: f64, sigma0: f64) -> Result<f64> {
    if !(r > 0.0) || !r.is_finite() {
        return Err(DiskError::Domain(format!(
            "surface density evaluated at r = {r}"
        )));
    }
    let value = sigma0 * r.powf(alpha + 1.0) * window(r, r_in, r_out, h);
    if !value.is_finite() {
        return Err(DiskError::Domain(format!(
            "surface density is non-finite at r = {r}"
        )));
    }
    Ok(value)
}

/// Disk surface density: a power law in radius times a smoothing window that
/// switches on across r_in and off across r_out over a width of order h.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DensityProfile {
    pub r_in: f64,
    pub r_out: f64,
    pub h: f64,
    pub alpha: f64,
    pub sigma0: f64,
}

impl DensityProfile {
    pub fn from_config(config: &DiskConfig) -> Self {
        Self {
            r_in: config.r_in,
            r_out: config.r_out,
            h: config.h,
            alpha: config.alpha,
            sigma0: config.sigma0,
        }
    }

    pub fn sigma(&self, r: f64) -> Result<f64> {
        sigma(r, self.r_in, self.r_out, self.h, self.alpha, self.sigma0)
    }

    /// Mass per unit area, `sigma(r) / r`
    pub fn surface_density(&self, r: f64) -> Result<f64> {
        Ok(self.sigma(r)? / r)
    }

    /// Probability density of particle radii for a disk of the given mass
    pub fn radial_pdf(&self, r: f64, disk_mass: f64) -> Result<f64> {
        Ok(2.0 * std::f64::consts::PI * self.sigma(r)? / disk_mass)
    }
}

/// Complementary error function, fractional error below 1.2e-7 everywhere
/// (Chebyshev fit from Numerical Recipes, `erfcc`).
pub fn erfc(x: f64) -> f64 {
    let z = x.abs();
    let t = 1.0 / (1.0 + 0.5 * z);
    let poly = -1.26551223
        + t * (1.00002368
            + t * (0.37409196
                + t * (0.09678418
                    + t * (-0.18628806
                        + t * (0.27886807
                            + t * (-1.13520398
                                + t * (1.48851587 + t * (-0.82215223 + t * 0.17087277))))))));
    let ans = t * (-z * z + poly).exp();
    if x >= 0.0 { ans } else { 2.0 - ans }
}

/// Fraction of a zero-mean Gaussian with standard deviation `sd` lying in [lo, hi]
pub fn gaussian_fraction(lo: f64, hi: f64, sd: f64) -> f64 {
    let s = sd * std::f64::consts::SQRT_2;
    let fraction = if lo >= 0.0 {
        0.5 * (erfc(lo / s) - erfc(hi / s))
    } else if hi <= 0.0 {
        0.5 * (erfc(-hi / s) - erfc(-lo / s))
    } else {
        1.0 - 0.5 * erfc(-lo / s) - 0.5 * erfc(hi / s)
    };
    fraction.max(0.0)
}
