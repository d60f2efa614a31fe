//! Particle record and its randomized factory

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::{Rgba, SurfaceSize};

/// Slate greys, sky blues and one yellow accent
pub const PALETTE: [Rgba; 5] = [
    Rgba::hex(0x64748b),
    Rgba::hex(0x94a3b8),
    Rgba::hex(0x38bdf8),
    Rgba::hex(0x0ea5e9),
    Rgba::hex(0xfacc15),
];

/// A drifting point. Only `pos` changes after creation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    /// Constant drift per tick
    pub vel: Vec2,
    pub radius: f32,
    /// Opaque palette color
    pub color: Rgba,
    /// Fill alpha in (0, 1]
    pub opacity: f32,
}

impl Particle {
    /// Color with the particle's own opacity applied
    #[inline]
    pub fn fill(&self) -> Rgba {
        self.color.with_alpha(self.opacity)
    }
}

/// Create a particle at a random spot on the surface.
///
/// Returns `None` for a surface with no area, where no position is valid.
pub fn spawn_particle<R: Rng>(rng: &mut R, bounds: SurfaceSize) -> Option<Particle> {
    if bounds.width == 0 || bounds.height == 0 {
        return None;
    }
    let extent = bounds.extent();

    Some(Particle {
        pos: Vec2::new(rng.random_range(0.0..extent.x), rng.random_range(0.0..extent.y)),
        vel: Vec2::new(
            rng.random_range(-MAX_DRIFT..MAX_DRIFT),
            rng.random_range(-MAX_DRIFT..MAX_DRIFT),
        ),
        radius: RADIUS_MIN + rng.random::<f32>() * RADIUS_SPAN,
        color: PALETTE[rng.random_range(0..PALETTE.len())],
        opacity: OPACITY_MIN + rng.random::<f32>() * OPACITY_SPAN,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_spawned_attributes_in_range() {
        let mut rng = Pcg32::seed_from_u64(7);
        let bounds = SurfaceSize::new(640, 480);

        for _ in 0..500 {
            let p = spawn_particle(&mut rng, bounds).unwrap();
            assert!((0.0..640.0).contains(&p.pos.x));
            assert!((0.0..480.0).contains(&p.pos.y));
            assert!(p.vel.x.abs() <= MAX_DRIFT && p.vel.y.abs() <= MAX_DRIFT);
            assert!(p.radius >= RADIUS_MIN && p.radius < RADIUS_MIN + RADIUS_SPAN);
            assert!(p.opacity > 0.0 && p.opacity <= 1.0);
            assert!(PALETTE.contains(&p.color));
        }
    }

    #[test]
    fn test_no_particle_on_empty_surface() {
        let mut rng = Pcg32::seed_from_u64(7);
        assert!(spawn_particle(&mut rng, SurfaceSize::new(0, 480)).is_none());
        assert!(spawn_particle(&mut rng, SurfaceSize::ZERO).is_none());
    }

    #[test]
    fn test_fill_applies_opacity() {
        let mut rng = Pcg32::seed_from_u64(3);
        let p = spawn_particle(&mut rng, SurfaceSize::new(10, 10)).unwrap();
        assert_eq!(p.fill().a, p.opacity);
        assert_eq!(p.color.a, 1.0);
    }
}
