//! Canvas 2D rendering module
//!
//! The component draws through `Canvas2d`, implemented by the browser's
//! `CanvasRenderingContext2d` and by the headless recorder.

pub mod scene;

pub use scene::{FrameStats, LINK_COLOR, draw_frame, draw_links, draw_particles, draw_ripple, link_alpha};

use glam::Vec2;

use crate::Rgba;

/// Outline style for lines and rings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub color: Rgba,
    pub width: f32,
}

impl Stroke {
    pub const fn new(color: Rgba, width: f32) -> Self {
        Self { color, width }
    }
}

/// Minimal immediate-mode 2D drawing context
pub trait Canvas2d {
    /// Clear the rectangle from the origin to (width, height)
    fn clear(&mut self, width: f32, height: f32);
    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Rgba);
    fn stroke_circle(&mut self, center: Vec2, radius: f32, stroke: Stroke);
    fn stroke_line(&mut self, from: Vec2, to: Vec2, stroke: Stroke);
}
