//! Particle simulation module
//!
//! Pure and reproducible:
//! - Seeded RNG only
//! - Stable iteration order (collection order)
//! - No rendering or platform dependencies

pub mod field;
pub mod particle;

pub use field::{FieldConfig, Pairs, ParticleField, attraction, particle_count};
pub use particle::{PALETTE, Particle, spawn_particle};
