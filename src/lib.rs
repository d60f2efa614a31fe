//! Particle Field - an interactive drifting particle background
//!
//! Core modules:
//! - `sim`: Seeded particle simulation (reseed, step, pair traversal)
//! - `renderer`: 2D drawing capability and per-frame drawing routines
//! - `background`: Mount/tick/unmount lifecycle driving the field
//! - `platform`: Host capabilities (browser canvas, headless recorder)
//! - `settings`: Tunable parameters loaded from JSON

pub mod background;
pub mod error;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use background::{LoopPhase, ParticleBackground};
pub use error::{MountError, SettingsError};
pub use settings::Settings;

use serde::{Deserialize, Serialize};

/// Field configuration constants
pub mod consts {
    /// Hard cap on particle count (bounds the O(n²) link pass)
    pub const MAX_PARTICLES: usize = 150;
    /// Highest particle count any configuration may ask for
    pub const PARTICLE_CEILING: usize = 1000;
    /// Surface area (px²) per particle
    pub const AREA_PER_PARTICLE: f32 = 6000.0;

    /// Particle radius range [min, min + span)
    pub const RADIUS_MIN: f32 = 0.5;
    pub const RADIUS_SPAN: f32 = 2.0;
    /// Velocity components are drawn from [-MAX_DRIFT, MAX_DRIFT)
    pub const MAX_DRIFT: f32 = 0.25;
    /// Opacity range [min, min + span)
    pub const OPACITY_MIN: f32 = 0.1;
    pub const OPACITY_SPAN: f32 = 0.5;

    /// Pointer pull reaches this far (px)
    pub const ATTRACTION_RADIUS: f32 = 100.0;
    /// Displacement per tick at zero distance
    pub const ATTRACTION_STRENGTH: f32 = 0.5;

    /// Links never span further than this (px)
    pub const LINK_DISTANCE_CAP: f32 = 200.0;
    /// Links span at most this fraction of surface width
    pub const LINK_DISTANCE_FRACTION: f32 = 0.15;
    /// Alpha of a zero-length link
    pub const LINK_MAX_ALPHA: f32 = 0.4;
    pub const LINK_WIDTH: f32 = 1.0;

    /// Pointer ripple rings
    pub const RIPPLE_OUTER_RADIUS: f32 = 50.0;
    pub const RIPPLE_INNER_RADIUS: f32 = 30.0;
}

/// Pixel dimensions of a drawing surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SurfaceSize {
    pub width: u32,
    pub height: u32,
}

impl SurfaceSize {
    pub const ZERO: Self = Self::new(0, 0);

    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Area in px², computed without overflow
    #[inline]
    pub fn area(&self) -> f64 {
        self.width as f64 * self.height as f64
    }

    /// Extent as a float vector (x = width, y = height)
    #[inline]
    pub fn extent(&self) -> glam::Vec2 {
        glam::Vec2::new(self.width as f32, self.height as f32)
    }
}

/// An sRGB color with straight alpha
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    /// 0.0 (transparent) - 1.0 (opaque)
    pub a: f32,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque color from a 0xRRGGBB literal
    pub const fn hex(rgb: u32) -> Self {
        Self::new((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8, 1.0)
    }

    pub const fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    /// CSS `rgba()` form for canvas styles
    pub fn to_css(&self) -> String {
        format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
    }
}

/// Wrap a coordinate onto [0, extent) so it re-enters from the opposite edge.
///
/// The overshoot is carried across the edge (`rem_euclid`) rather than
/// snapping to 0 or to `extent`; snapping to `extent` would land outside
/// the half-open range.
#[inline]
pub fn wrap_axis(value: f32, extent: f32) -> f32 {
    if extent <= 0.0 || !value.is_finite() {
        return 0.0;
    }
    let wrapped = value.rem_euclid(extent);
    // rem_euclid can round up to `extent` for tiny negative inputs
    if wrapped >= extent { 0.0 } else { wrapped }
}
