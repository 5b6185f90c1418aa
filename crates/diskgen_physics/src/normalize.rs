use diskgen_core::{
    DiskConfig, DiskError, Result, INTEGRATION_ABS_TOL, INTEGRATION_MAX_DEPTH,
    INTEGRATION_REL_TOL,
};

use super::profile::DensityProfile;

/// Panels per breakpoint segment before adaptive refinement
const INITIAL_PANELS: usize = 32;

/// Definite integral of `f` over [a, b] by adaptive Simpson quadrature.
///
/// The interval is cut at each `breakpoint` inside (a, b) and into
/// `INITIAL_PANELS` pieces so narrow features are not stepped over.
pub fn integrate<F>(f: F, a: f64, b: f64, breakpoints: &[f64], rel_tol: f64) -> Result<f64>
where
    F: Fn(f64) -> Result<f64>,
{
    if !(a.is_finite() && b.is_finite()) || a > b {
        return Err(DiskError::Integration(format!(
            "invalid integration bounds [{a}, {b}]"
        )));
    }
    if a == b {
        return Ok(0.0);
    }

    let eval = |x: f64| -> Result<f64> {
        let v = f(x)?;
        if v.is_finite() {
            Ok(v)
        } else {
            Err(DiskError::Integration(format!("integrand is non-finite at {x}")))
        }
    };

    let mut cuts: Vec<f64> = breakpoints
        .iter()
        .copied()
        .filter(|&x| x > a && x < b)
        .collect();
    cuts.push(a);
    cuts.push(b);
    cuts.sort_by(|x, y| x.total_cmp(y));
    cuts.dedup();

    // Coarse pass over every panel sets the absolute tolerance
    let mut panels = Vec::new();
    for window in cuts.windows(2) {
        let step = (window[1] - window[0]) / INITIAL_PANELS as f64;
        for i in 0..INITIAL_PANELS {
            let lo = window[0] + step * i as f64;
            let hi = if i + 1 == INITIAL_PANELS { window[1] } else { lo + step };
            let mid = 0.5 * (lo + hi);
            let (flo, fmid, fhi) = (eval(lo)?, eval(mid)?, eval(hi)?);
            panels.push(Panel {
                lo,
                hi,
                flo,
                fmid,
                fhi,
                whole: simpson(lo, hi, flo, fmid, fhi),
            });
        }
    }
    let coarse: f64 = panels.iter().map(|p| p.whole.abs()).sum();
    let tolerance = (rel_tol * coarse).max(INTEGRATION_ABS_TOL);

    let mut total = 0.0;
    for panel in &panels {
        let share = tolerance * (panel.hi - panel.lo) / (b - a);
        total += refine(&eval, panel, share, INTEGRATION_MAX_DEPTH)?;
    }
    Ok(total)
}

struct Panel {
    lo: f64,
    hi: f64,
    flo: f64,
    fmid: f64,
    fhi: f64,
    whole: f64,
}

fn simpson(lo: f64, hi: f64, flo: f64, fmid: f64, fhi: f64) -> f64 {
    (hi - lo) / 6.0 * (flo + 4.0 * fmid + fhi)
}

fn refine<F>(f: &F, panel: &Panel, tol: f64, depth: u32) -> Result<f64>
where
    F: Fn(f64) -> Result<f64>,
{
    let mid = 0.5 * (panel.lo + panel.hi);
    let left_mid = 0.5 * (panel.lo + mid);
    let right_mid = 0.5 * (mid + panel.hi);
    let (fl, fr) = (f(left_mid)?, f(right_mid)?);

    let left = Panel {
        lo: panel.lo,
        hi: mid,
        flo: panel.flo,
        fmid: fl,
        fhi: panel.fmid,
        whole: simpson(panel.lo, mid, panel.flo, fl, panel.fmid),
    };
    let right = Panel {
        lo: mid,
        hi: panel.hi,
        flo: panel.fmid,
        fmid: fr,
        fhi: panel.fhi,
        whole: simpson(mid, panel.hi, panel.fmid, fr, panel.fhi),
    };

    let delta = left.whole + right.whole - panel.whole;
    if delta.abs() <= 15.0 * tol {
        // Richardson extrapolation
        return Ok(left.whole + right.whole + delta / 15.0);
    }
    if depth == 0 {
        return Err(DiskError::Integration(format!(
            "no convergence on [{}, {}] (error estimate {:.3e}, tolerance {:.3e})",
            panel.lo,
            panel.hi,
            delta.abs() / 15.0,
            tol
        )));
    }
    Ok(refine(f, &left, tol / 2.0, depth - 1)? + refine(f, &right, tol / 2.0, depth - 1)?)
}

/// `2π ∫ sigma(r) dr` over [r_min, r_max]
pub fn total_mass<F>(sigma: F, r_min: f64, r_max: f64, breakpoints: &[f64]) -> Result<f64>
where
    F: Fn(f64) -> Result<f64>,
{
    Ok(2.0 * std::f64::consts::PI * integrate(sigma, r_min, r_max, breakpoints, INTEGRATION_REL_TOL)?)
}

/// Mass of the configured disk, integrated past both smoothed edges
pub fn disk_mass(config: &DiskConfig) -> Result<f64> {
    let profile = DensityProfile::from_config(config);
    let mass = total_mass(
        |r| profile.sigma(r),
        config.integration_min(),
        config.integration_max(),
        &[config.r_in, config.r_out],
    )?;
    if !(mass > 0.0) {
        return Err(DiskError::Integration(format!(
            "disk mass must be positive, got {mass:e}"
        )));
    }
    log::debug!(
        "Disk mass {:.6e} over [{}, {}]",
        mass,
        config.integration_min(),
        config.integration_max()
    );
    Ok(mass)
}
