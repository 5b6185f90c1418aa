use diskgen_core::*;
use rand::{Rng, RngCore};
use rand_distr::StandardNormal;

use super::normalize::disk_mass;
use super::profile::{gaussian_fraction, DensityProfile};

/// A way of turning a disk configuration into particle positions and masses.
/// Velocities and internal energies are filled in downstream.
pub trait ParticlePlacement {
    fn place(&self, config: &DiskConfig, rng: &mut dyn RngCore) -> Result<Vec<PlacedParticle>>;
}

/// Strategy selected by the configuration
pub fn placement_for(strategy: PlacementStrategy) -> Box<dyn ParticlePlacement> {
    match strategy {
        PlacementStrategy::Random => Box::new(RejectionSampler::default()),
        PlacementStrategy::Grid => Box::new(GridSampler),
    }
}

/// Equal-mass particles with rejection-sampled radii, uniform azimuth and
/// Gaussian heights of standard deviation h r.
#[derive(Debug, Clone, Copy)]
pub struct RejectionSampler {
    /// Candidate draws allowed per particle
    pub max_attempts: u64,
}

impl Default for RejectionSampler {
    fn default() -> Self {
        Self {
            max_attempts: MAX_REJECTION_ATTEMPTS,
        }
    }
}

/// Grid points per window width h in the envelope scan
const ENVELOPE_SAMPLES_PER_WIDTH: f64 = 8.0;

/// Headroom over the scanned maximum
const ENVELOPE_HEADROOM: f64 = 1.01;

/// Upper bound of `pdf` over (0, r_max], scanned on a grid fine enough to
/// resolve features of width `width`.
pub fn pdf_envelope<F>(pdf: F, r_max: f64, width: f64) -> Result<f64>
where
    F: Fn(f64) -> Result<f64>,
{
    let steps = ((ENVELOPE_SAMPLES_PER_WIDTH * r_max / width).ceil() as usize).max(1024);
    let dr = r_max / steps as f64;
    let mut peak = 0.0f64;
    for i in 1..=steps {
        peak = peak.max(pdf(dr * i as f64)?);
    }
    if !(peak > 0.0) || !peak.is_finite() {
        return Err(DiskError::Domain(format!(
            "radial pdf has no positive finite maximum on (0, {r_max}]"
        )));
    }
    Ok(ENVELOPE_HEADROOM * peak)
}

impl RejectionSampler {
    /// Draw one radius in (0, r_max) with probability proportional to `pdf`.
    ///
    /// A candidate is accepted when `pdf(r)` reaches a uniform threshold in
    /// [0, envelope), so `envelope` must bound `pdf` on the whole interval.
    pub fn sample_radius<F>(
        &self,
        pdf: F,
        envelope: f64,
        r_max: f64,
        particle: usize,
        rng: &mut dyn RngCore,
    ) -> Result<(f64, u64)>
    where
        F: Fn(f64) -> Result<f64>,
    {
        for attempt in 1..=self.max_attempts {
            let candidate = r_max * rng.gen_range(0.0f64..1.0);
            let threshold = envelope * rng.gen_range(0.0f64..1.0);
            if candidate <= 0.0 {
                continue;
            }
            if pdf(candidate)? >= threshold {
                return Ok((candidate, attempt));
            }
        }
        Err(DiskError::SamplingExhausted {
            particle,
            attempts: self.max_attempts,
            r_max,
        })
    }

    /// Radii for `n` particles drawn from the normalized profile
    pub fn sample_radii(
        &self,
        profile: &DensityProfile,
        mass: f64,
        r_max: f64,
        n: usize,
        rng: &mut dyn RngCore,
    ) -> Result<Vec<f64>> {
        let pdf = |r| profile.radial_pdf(r, mass);
        let envelope = pdf_envelope(pdf, r_max, profile.h)?;
        log::debug!("Radial pdf envelope {:.6e} on (0, {}]", envelope, r_max);

        let mut radii = Vec::with_capacity(n);
        let mut draws = 0u64;
        for i in 0..n {
            let (r, attempts) = self.sample_radius(pdf, envelope, r_max, i, rng)?;
            draws += attempts;
            radii.push(r);
        }
        if n > 0 {
            log::debug!(
                "Rejection sampling accepted {} radii from {} candidates ({:.2}%)",
                n,
                draws,
                100.0 * n as f64 / draws as f64
            );
        }
        Ok(radii)
    }
}

impl ParticlePlacement for RejectionSampler {
    fn place(&self, config: &DiskConfig, rng: &mut dyn RngCore) -> Result<Vec<PlacedParticle>> {
        let profile = DensityProfile::from_config(config);
        let mass = disk_mass(config)?;
        let particle_mass = mass / config.particle_count as f64;

        let radii = self.sample_radii(
            &profile,
            mass,
            config.integration_max(),
            config.particle_count,
            rng,
        )?;

        let placed = radii
            .into_iter()
            .map(|r| {
                let theta = rng.gen_range(0.0..std::f64::consts::TAU);
                let height: f64 = rng.sample(StandardNormal);
                let z = height * config.h * r;
                PlacedParticle {
                    position: [r * theta.cos(), r * theta.sin(), z],
                    mass: particle_mass,
                }
            })
            .collect();
        Ok(placed)
    }
}

/// Particles on a regular 3D lattice with individually weighted masses
#[derive(Debug, Clone, Copy, Default)]
pub struct GridSampler;

/// Resolution and extent of the grid lattice
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lattice {
    /// Cells along x and along y
    pub nxy: usize,
    /// Cells along z
    pub nz: usize,
    /// Half-width in x and y
    pub half_width: f64,
    /// Half-height in z
    pub z_max: f64,
}

impl Lattice {
    /// Lattice with roughly `n` cells whose spacing is similar in all directions
    pub fn for_config(config: &DiskConfig) -> Self {
        let n = config.particle_count as f64;
        let z_max = GRID_HEIGHT_SCALE_HEIGHTS * config.h * config.r_out;
        let nxy = ((n * 2.0 * config.r_out / z_max).cbrt().round() as usize).max(1);
        let nz = ((n / (nxy * nxy) as f64).round() as usize).max(1);
        Self {
            nxy,
            nz,
            half_width: config.r_out,
            z_max,
        }
    }

    pub fn len(&self) -> usize {
        self.nxy * self.nxy * self.nz
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn dx(&self) -> f64 {
        2.0 * self.half_width / self.nxy as f64
    }

    pub fn dz(&self) -> f64 {
        2.0 * self.z_max / self.nz as f64
    }

    /// Cell centers along x (and y)
    pub fn planar_centers(&self) -> impl Iterator<Item = f64> + '_ {
        let dx = self.dx();
        (0..self.nxy).map(move |i| -self.half_width + (i as f64 + 0.5) * dx)
    }

    /// Cell centers along z
    pub fn vertical_centers(&self) -> impl Iterator<Item = f64> + '_ {
        let dz = self.dz();
        (0..self.nz).map(move |k| -self.z_max + (k as f64 + 0.5) * dz)
    }
}

impl GridSampler {
    /// Mass assigned to the lattice cell centered at planar radius `r`, height `z`.
    ///
    /// This is the surface density at the cell center times the planar cell
    /// area, times the fraction of a Gaussian column of scale height h r lying
    /// within the cell's vertical extent. The profile is evaluated pointwise
    /// rather than integrated over the cell.
    pub fn cell_mass(
        profile: &DensityProfile,
        lattice: &Lattice,
        r: f64,
        z: f64,
    ) -> Result<f64> {
        let dx = lattice.dx();
        let half_dz = 0.5 * lattice.dz();
        let column = profile.surface_density(r)? * dx * dx;
        Ok(column * gaussian_fraction(z - half_dz, z + half_dz, profile.h * r))
    }
}

impl ParticlePlacement for GridSampler {
    fn place(&self, config: &DiskConfig, _rng: &mut dyn RngCore) -> Result<Vec<PlacedParticle>> {
        let profile = DensityProfile::from_config(config);
        let lattice = Lattice::for_config(config);
        log::debug!(
            "Grid lattice {}x{}x{} ({} points), z_max = {}",
            lattice.nxy,
            lattice.nxy,
            lattice.nz,
            lattice.len(),
            lattice.z_max
        );

        let zs: Vec<f64> = lattice.vertical_centers().collect();
        let mut placed = Vec::new();
        for x in lattice.planar_centers() {
            for y in lattice.planar_centers() {
                let r = x.hypot(y);
                if !(r > config.r_in && r < config.r_out) {
                    continue;
                }
                for &z in &zs {
                    let mass = Self::cell_mass(&profile, &lattice, r, z)?;
                    if mass > GRID_MASS_FLOOR {
                        placed.push(PlacedParticle {
                            position: [x, y, z],
                            mass,
                        });
                    }
                }
            }
        }

        if placed.is_empty() {
            log::warn!(
                "Grid lattice of {} points left no cells inside ({}, {})",
                lattice.len(),
                config.r_in,
                config.r_out
            );
        }
        Ok(placed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use crate::normalize::total_mass;

    #[test]
    fn test_random_placement_count_and_mass() {
        let config = DiskConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let placed = RejectionSampler::default().place(&config, &mut rng).unwrap();
        let mass = disk_mass(&config).unwrap();

        assert_eq!(placed.len(), 1000);
        for p in &placed {
            assert_eq!(p.mass, mass / 1000.0);
            let r = p.position[0].hypot(p.position[1]);
            assert!(r > 0.0 && r < config.integration_max());
        }
    }

    #[test]
    fn test_heights_scale_with_radius() {
        let config = DiskConfig { particle_count: 4000, ..Default::default() };
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let placed = RejectionSampler::default().place(&config, &mut rng).unwrap();

        // z / (h r) is standard normal
        let n = placed.len() as f64;
        let scaled: Vec<f64> = placed
            .iter()
            .map(|p| p.position[2] / (config.h * p.position[0].hypot(p.position[1])))
            .collect();
        let mean = scaled.iter().sum::<f64>() / n;
        let var = scaled.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / n;
        assert!(mean.abs() < 0.1, "mean {mean}");
        assert!((var - 1.0).abs() < 0.1, "variance {var}");
    }

    #[test]
    fn test_radii_follow_profile() {
        // Chi-squared goodness of fit of the radial histogram
        let config = DiskConfig { alpha: -1.5, ..Default::default() };
        let profile = DensityProfile::from_config(&config);
        let mass = disk_mass(&config).unwrap();
        let r_max = config.integration_max();
        let n = 20_000;

        let mut rng = ChaCha8Rng::seed_from_u64(2024);
        let radii = RejectionSampler::default()
            .sample_radii(&profile, mass, r_max, n, &mut rng)
            .unwrap();

        let edges: Vec<f64> = (0..=10).map(|i| 1.0 + 0.9 * i as f64).collect();
        let mut chi2 = 0.0;
        for w in edges.windows(2) {
            let observed = radii.iter().filter(|&&r| r >= w[0] && r < w[1]).count() as f64;
            let expected =
                n as f64 * total_mass(|r| profile.sigma(r), w[0], w[1], &[]).unwrap() / mass;
            chi2 += (observed - expected).powi(2) / expected;
        }
        // 10 bins; the 99.9% quantile of chi-squared with 10 dof is 29.6
        assert!(chi2 < 29.6, "chi2 = {chi2}");
    }

    #[test]
    fn test_narrow_annulus_keeps_profile_shape() {
        // Peak pdf is about 2.4 here, well above a unit acceptance threshold
        let config = DiskConfig {
            r_in: 1.0,
            r_out: 1.5,
            alpha: 0.0,
            ..Default::default()
        };
        let profile = DensityProfile::from_config(&config);
        let mass = disk_mass(&config).unwrap();
        let r_max = config.integration_max();
        let n = 20_000;

        let envelope = pdf_envelope(|r| profile.radial_pdf(r, mass), r_max, config.h).unwrap();
        assert!(envelope > 2.0, "envelope {envelope}");

        let mut rng = ChaCha8Rng::seed_from_u64(99);
        let radii = RejectionSampler::default()
            .sample_radii(&profile, mass, r_max, n, &mut rng)
            .unwrap();

        let lo = config.integration_min();
        let width = (r_max - lo) / 10.0;
        let edges: Vec<f64> = (0..=10).map(|i| lo + width * i as f64).collect();
        let mut chi2 = 0.0;
        for w in edges.windows(2) {
            let observed = radii.iter().filter(|&&r| r >= w[0] && r < w[1]).count() as f64;
            let expected = n as f64
                * total_mass(|r| profile.sigma(r), w[0], w[1], &[config.r_in, config.r_out])
                    .unwrap()
                / mass;
            chi2 += (observed - expected).powi(2) / expected;
        }
        assert!(chi2 < 29.6, "chi2 = {chi2}");
    }

    #[test]
    fn test_envelope_bounds_pdf() {
        let config = DiskConfig { alpha: -1.5, ..Default::default() };
        let profile = DensityProfile::from_config(&config);
        let mass = disk_mass(&config).unwrap();
        let r_max = config.integration_max();
        let envelope = pdf_envelope(|r| profile.radial_pdf(r, mass), r_max, config.h).unwrap();

        let mut r = 1e-3;
        while r < r_max {
            assert!(profile.radial_pdf(r, mass).unwrap() <= envelope, "r={r}");
            r += 1e-3;
        }
    }

    #[test]
    fn test_envelope_of_vanishing_pdf_is_an_error() {
        let result = pdf_envelope(|_| Ok(0.0), 5.0, 0.05);
        assert!(matches!(result, Err(DiskError::Domain(_))));
    }

    #[test]
    fn test_exhausted_budget_is_an_error() {
        let sampler = RejectionSampler { max_attempts: 100 };
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let result = sampler.sample_radius(|_| Ok(-1.0), 1.0, 5.0, 3, &mut rng);
        match result {
            Err(DiskError::SamplingExhausted { particle, attempts, r_max }) => {
                assert_eq!(particle, 3);
                assert_eq!(attempts, 100);
                assert_eq!(r_max, 5.0);
            }
            other => panic!("expected SamplingExhausted, got {other:?}"),
        }
    }

    #[test]
    fn test_lattice_dimensions() {
        let lattice = Lattice::for_config(&DiskConfig::default());
        // (1000 * 20 / 2)^(1/3) = 21.5 -> 22, 1000 / 484 = 2.07 -> 2
        assert_eq!(lattice.nxy, 22);
        assert_eq!(lattice.nz, 2);
        assert_relative_eq!(lattice.z_max, 2.0);

        let single = Lattice::for_config(&DiskConfig { particle_count: 1, ..Default::default() });
        assert!(single.nxy >= 1 && single.nz >= 1);
    }

    #[test]
    fn test_grid_cells_inside_annulus() {
        let config = DiskConfig { placement: PlacementStrategy::Grid, ..Default::default() };
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let placed = GridSampler.place(&config, &mut rng).unwrap();
        let lattice = Lattice::for_config(&config);

        assert!(!placed.is_empty());
        assert!(placed.len() <= lattice.len());
        for p in &placed {
            let r = p.position[0].hypot(p.position[1]);
            assert!(r > config.r_in && r < config.r_out);
            assert!(p.mass > GRID_MASS_FLOOR);
            assert!(p.position[2].abs() < lattice.z_max);
        }
    }

    #[test]
    fn test_grid_mass_approximates_annulus_mass() {
        let config = DiskConfig {
            particle_count: 200_000,
            alpha: -1.5,
            ..Default::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let placed = GridSampler.place(&config, &mut rng).unwrap();
        let grid_mass: f64 = placed.iter().map(|p| p.mass).sum();

        let profile = DensityProfile::from_config(&config);
        let annulus = total_mass(|r| profile.sigma(r), config.r_in, config.r_out, &[]).unwrap();
        // Planar discretization error of the pointwise cell masses
        assert_relative_eq!(grid_mass, annulus, max_relative = 0.05);
    }

    #[test]
    fn test_grid_is_deterministic() {
        let config = DiskConfig { placement: PlacementStrategy::Grid, ..Default::default() };
        let a = GridSampler.place(&config, &mut ChaCha8Rng::seed_from_u64(1)).unwrap();
        let b = GridSampler.place(&config, &mut ChaCha8Rng::seed_from_u64(2)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_thin_annulus_grid_terminates() {
        let config = DiskConfig {
            r_in: 10.0 - 1e-9,
            r_out: 10.0,
            ..Default::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let placed = GridSampler.place(&config, &mut rng).unwrap();
        assert!(placed.iter().all(|p| p.mass.is_finite()));
    }
}
