//! The particle field: reseeding, per-tick stepping and pair traversal

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::particle::{Particle, spawn_particle};
use crate::consts::*;
use crate::{SurfaceSize, wrap_axis};

/// Numeric parameters of the field
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldConfig {
    pub max_particles: usize,
    pub area_per_particle: f32,
    pub attraction_radius: f32,
    pub attraction_strength: f32,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            max_particles: MAX_PARTICLES,
            area_per_particle: AREA_PER_PARTICLE,
            attraction_radius: ATTRACTION_RADIUS,
            attraction_strength: ATTRACTION_STRENGTH,
        }
    }
}

/// Number of particles for a surface: `min(max, floor(area / area_per_particle))`.
///
/// Never more than `PARTICLE_CEILING`, whatever the config says.
pub fn particle_count(config: &FieldConfig, size: SurfaceSize) -> usize {
    if config.area_per_particle <= 0.0 {
        return 0;
    }
    let by_area = (size.area() / config.area_per_particle as f64).floor();
    (by_area as usize)
        .min(config.max_particles)
        .min(PARTICLE_CEILING)
}

/// Positional nudge toward `pointer` for a particle at `pos`.
///
/// Linear falloff from `strength` at distance 0 to nothing at `radius`.
/// Coincident points get no nudge.
pub fn attraction(pos: Vec2, pointer: Vec2, radius: f32, strength: f32) -> Vec2 {
    let to_pointer = pointer - pos;
    let d = to_pointer.length();
    if d <= 0.0 || d >= radius {
        return Vec2::ZERO;
    }
    let force = (radius - d) / radius;
    to_pointer / d * force * strength
}

/// Ordered particle collection sized to its surface
#[derive(Debug, Clone)]
pub struct ParticleField {
    config: FieldConfig,
    bounds: SurfaceSize,
    particles: Vec<Particle>,
    rng: Pcg32,
}

impl ParticleField {
    /// Empty field; call `reseed` once the surface size is known
    pub fn new(seed: u64, config: FieldConfig) -> Self {
        Self {
            config,
            bounds: SurfaceSize::ZERO,
            particles: Vec::new(),
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    /// Field holding exactly `particles`, e.g. a captured frame
    pub fn from_particles(config: FieldConfig, bounds: SurfaceSize, particles: Vec<Particle>) -> Self {
        Self {
            config,
            bounds,
            particles,
            rng: Pcg32::seed_from_u64(0),
        }
    }

    pub fn config(&self) -> &FieldConfig {
        &self.config
    }

    pub fn bounds(&self) -> SurfaceSize {
        self.bounds
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Replace every particle with a fresh set sized to `width` × `height`
    pub fn reseed(&mut self, width: u32, height: u32) {
        let bounds = SurfaceSize::new(width, height);
        let count = particle_count(&self.config, bounds);

        self.bounds = bounds;
        self.particles.clear();
        self.particles.reserve(count);
        for _ in 0..count {
            match spawn_particle(&mut self.rng, bounds) {
                Some(p) => self.particles.push(p),
                None => break,
            }
        }

        log::debug!("Reseeded {} particles for {}x{}", self.particles.len(), width, height);
    }

    /// Advance every particle one tick: pointer pull, drift, wraparound
    pub fn step(&mut self, pointer: Option<Vec2>) {
        let extent = self.bounds.extent();
        let FieldConfig {
            attraction_radius,
            attraction_strength,
            ..
        } = self.config;

        for particle in self.particles.iter_mut() {
            if let Some(pointer) = pointer {
                particle.pos += attraction(particle.pos, pointer, attraction_radius, attraction_strength);
            }
            particle.pos += particle.vel;
            particle.pos.x = wrap_axis(particle.pos.x, extent.x);
            particle.pos.y = wrap_axis(particle.pos.y, extent.y);
        }
    }

    /// Every unordered pair of distinct particles, once each
    pub fn pairs(&self) -> Pairs<'_> {
        Pairs::new(&self.particles)
    }

    pub fn for_each_pair<F>(&self, mut callback: F)
    where
        F: FnMut(&Particle, &Particle),
    {
        for (a, b) in self.pairs() {
            callback(a, b);
        }
    }
}

/// Lazy traversal of `(i, j)` with `i < j`
#[derive(Debug, Clone)]
pub struct Pairs<'a> {
    particles: &'a [Particle],
    i: usize,
    j: usize,
}

impl<'a> Pairs<'a> {
    fn new(particles: &'a [Particle]) -> Self {
        Self { particles, i: 0, j: 1 }
    }
}

impl<'a> Iterator for Pairs<'a> {
    type Item = (&'a Particle, &'a Particle);

    fn next(&mut self) -> Option<Self::Item> {
        let n = self.particles.len();
        if self.j >= n {
            self.i += 1;
            self.j = self.i + 1;
            if self.j >= n {
                return None;
            }
        }
        let pair = (&self.particles[self.i], &self.particles[self.j]);
        self.j += 1;
        Some(pair)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.particles.len();
        if self.i + 1 >= n {
            return (0, Some(0));
        }
        // Rest of row i, then all full rows after it
        let row = n.saturating_sub(self.j);
        let after = n - self.i - 1;
        let rest = after * (after.saturating_sub(1)) / 2;
        let remaining = row + rest;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Pairs<'_> {}
