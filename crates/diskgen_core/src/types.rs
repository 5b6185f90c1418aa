use serde::{Deserialize, Serialize};

/// A single gas particle of the initial conditions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    /// 1-based identifier, contiguous within a ParticleSet
    pub id: u64,
    pub position: [f64; 3],
    pub velocity: [f64; 3],
    pub mass: f64,
    /// Specific internal energy (code units)
    pub internal_energy: f64,
}

impl Particle {
    /// Planar (cylindrical) radius
    pub fn radius(&self) -> f64 {
        self.position[0].hypot(self.position[1])
    }
}

/// Particle kinematic state before identifiers are assigned
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacedParticle {
    pub position: [f64; 3],
    pub mass: f64,
}

/// The generated gas disk, held fully in memory until written
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParticleSet {
    particles: Vec<Particle>,
}

impl ParticleSet {
    pub fn with_capacity(n: usize) -> Self {
        Self {
            particles: Vec::with_capacity(n),
        }
    }

    /// Append a particle, assigning the next identifier
    pub fn push(
        &mut self,
        position: [f64; 3],
        velocity: [f64; 3],
        mass: f64,
        internal_energy: f64,
    ) -> u64 {
        let id = self.particles.len() as u64 + 1;
        self.particles.push(Particle {
            id,
            position,
            velocity,
            mass,
            internal_energy,
        });
        id
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn iter(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter()
    }

    pub fn total_mass(&self) -> f64 {
        self.particles.iter().map(|p| p.mass).sum()
    }

    pub fn coordinates(&self) -> Vec<[f64; 3]> {
        self.particles.iter().map(|p| p.position).collect()
    }

    pub fn velocities(&self) -> Vec<[f64; 3]> {
        self.particles.iter().map(|p| p.velocity).collect()
    }

    pub fn ids(&self) -> Vec<u64> {
        self.particles.iter().map(|p| p.id).collect()
    }

    pub fn masses(&self) -> Vec<f64> {
        self.particles.iter().map(|p| p.mass).collect()
    }

    pub fn internal_energies(&self) -> Vec<f64> {
        self.particles.iter().map(|p| p.internal_energy).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_contiguous_from_one() {
        let mut set = ParticleSet::with_capacity(3);
        for i in 0..3 {
            let id = set.push([i as f64, 0.0, 0.0], [0.0; 3], 1.0, 0.5);
            assert_eq!(id, i + 1);
        }
        assert_eq!(set.ids(), vec![1, 2, 3]);
        assert_eq!(set.total_mass(), 3.0);
    }

    #[test]
    fn test_planar_radius_ignores_height() {
        let p = Particle {
            id: 1,
            position: [3.0, 4.0, 100.0],
            velocity: [0.0; 3],
            mass: 1.0,
            internal_energy: 0.0,
        };
        assert_eq!(p.radius(), 5.0);
    }
}
