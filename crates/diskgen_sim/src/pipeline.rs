use diskgen_core::*;
use diskgen_physics::{placement_for, KinematicsSolver, ThermodynamicsSolver};
use diskgen_storage::{AttributeValue, Attributes, Dataset, ParticleGroup};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Build the gas particle set described by `config`
pub fn generate(config: &DiskConfig) -> Result<ParticleSet> {
    config.validate()?;

    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    let placed = placement_for(config.placement).place(config, &mut rng)?;
    log::info!(
        "Placed {} particles ({:?} placement, target {})",
        placed.len(),
        config.placement,
        config.particle_count
    );

    let kinematics = KinematicsSolver::from_config(config);
    let thermo = ThermodynamicsSolver::from_config(config);

    let mut particles = ParticleSet::with_capacity(placed.len());
    for p in placed {
        let r = p.position[0].hypot(p.position[1]);
        let velocity = kinematics.velocity(p.position)?;
        let energy = thermo.internal_energy(r)?;
        particles.push(p.position, velocity, p.mass, energy);
    }
    Ok(particles)
}

/// Particle counts and mass table for a snapshot holding only gas.
///
/// The per-file count is a signed 32-bit value and the total an unsigned
/// one, with a zero high word.
pub fn header_attributes(particles: &ParticleSet) -> Result<Attributes> {
    let count = particles.len();
    let this_file = i32::try_from(count).map_err(|_| {
        DiskError::Codec(format!("{count} particles do not fit in a single snapshot file"))
    })?;

    let mut npart = vec![0i32; NUM_SPECIES];
    npart[GAS_SPECIES] = this_file;
    let total: Vec<u32> = npart.iter().map(|&n| n.unsigned_abs()).collect();

    let mut attrs = Attributes::new();
    attrs.insert("NumPart_ThisFile".into(), AttributeValue::IntArray(npart));
    attrs.insert("NumPart_Total".into(), AttributeValue::UIntArray(total));
    attrs.insert(
        "NumPart_Total_HighWord".into(),
        AttributeValue::UIntArray(vec![0; NUM_SPECIES]),
    );
    // Masses are stored per particle
    attrs.insert(
        "MassTable".into(),
        AttributeValue::FloatArray(vec![0.0; NUM_SPECIES]),
    );
    Ok(attrs)
}

/// Gas species datasets
pub fn particle_group(particles: &ParticleSet) -> ParticleGroup {
    ParticleGroup::new()
        .with("Coordinates", Dataset::Vec3(particles.coordinates()))
        .with("Velocities", Dataset::Vec3(particles.velocities()))
        .with("ParticleIDs", Dataset::Int(particles.ids()))
        .with("Masses", Dataset::Float(particles.masses()))
        .with("InternalEnergy", Dataset::Float(particles.internal_energies()))
}

pub fn write_snapshot<P: AsRef<Path>>(particles: &ParticleSet, fname: P) -> Result<PathBuf> {
    let groups = BTreeMap::from([(GAS_SPECIES, particle_group(particles))]);
    diskgen_storage::write_file(fname, &header_attributes(particles)?, &groups)
}

/// Generate the disk and write it to `config.output`
pub fn run(config: &DiskConfig) -> Result<PathBuf> {
    let particles = generate(config)?;
    log::info!(
        "Disk of {} particles, total mass {:.6e}",
        particles.len(),
        particles.total_mass()
    );
    write_snapshot(&particles, &config.output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_invalid_config_fails_before_sampling() {
        let config = DiskConfig { r_in: 10.0, r_out: 1.0, ..Default::default() };
        assert!(matches!(generate(&config), Err(DiskError::Config(_))));
    }

    #[test]
    fn test_same_seed_same_disk() {
        let config = DiskConfig { particle_count: 200, ..Default::default() };
        assert_eq!(generate(&config).unwrap(), generate(&config).unwrap());

        let other = DiskConfig { seed: 43, ..config.clone() };
        assert_ne!(generate(&config).unwrap(), generate(&other).unwrap());
    }

    #[test]
    fn test_single_particle() {
        let config = DiskConfig { particle_count: 1, ..Default::default() };
        let set = generate(&config).unwrap();
        assert_eq!(set.len(), 1);
        let p = set.particles()[0];
        assert_eq!(p.id, 1);
        assert!(p.position.iter().chain(p.velocity.iter()).all(|v| v.is_finite()));
        assert!(p.mass > 0.0 && p.internal_energy > 0.0);
    }

    #[test]
    fn test_header_counts() {
        let config = DiskConfig { particle_count: 10, ..Default::default() };
        let attrs = header_attributes(&generate(&config).unwrap()).unwrap();
        assert_eq!(
            attrs["NumPart_ThisFile"],
            AttributeValue::IntArray(vec![10, 0, 0, 0, 0, 0])
        );
        assert_eq!(
            attrs["NumPart_Total"],
            AttributeValue::UIntArray(vec![10, 0, 0, 0, 0, 0])
        );
        assert_eq!(attrs["NumPart_Total_HighWord"], AttributeValue::UIntArray(vec![0; 6]));
        assert_eq!(attrs["MassTable"], AttributeValue::FloatArray(vec![0.0; 6]));
    }

    #[test]
    fn test_energy_follows_planar_radius() {
        let config = DiskConfig { particle_count: 50, ..Default::default() };
        let thermo = ThermodynamicsSolver::from_config(&config);
        for p in generate(&config).unwrap().iter() {
            assert_relative_eq!(
                p.internal_energy,
                thermo.internal_energy(p.radius()).unwrap(),
                max_relative = 1e-14
            );
        }
    }
}
