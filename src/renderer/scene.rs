//! Per-frame drawing: particles, proximity links and the pointer ripple

use glam::Vec2;

use super::{Canvas2d, Stroke};
use crate::consts::{RIPPLE_INNER_RADIUS, RIPPLE_OUTER_RADIUS};
use crate::sim::ParticleField;
use crate::{Rgba, Settings};

/// Slate link color; alpha comes from `link_alpha`
pub const LINK_COLOR: Rgba = Rgba::new(100, 116, 139, 1.0);

const RIPPLE_OUTER: Stroke = Stroke::new(Rgba::new(250, 204, 21, 0.1), 2.0);
const RIPPLE_INNER: Stroke = Stroke::new(Rgba::new(56, 189, 248, 0.15), 1.0);

/// What a frame put on screen
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub particles: usize,
    pub links: usize,
    pub ripple: bool,
}

/// Alpha of a link of length `distance`, or `None` when it is too long to draw
#[inline]
pub fn link_alpha(distance: f32, max_distance: f32, max_alpha: f32) -> Option<f32> {
    if distance < max_distance {
        Some((1.0 - distance / max_distance) * max_alpha)
    } else {
        None
    }
}

pub fn draw_particles<C: Canvas2d + ?Sized>(canvas: &mut C, field: &ParticleField) -> usize {
    for p in field.particles() {
        canvas.fill_circle(p.pos, p.radius, p.fill());
    }
    field.len()
}

/// Join every pair closer than the surface's link distance. O(n²).
pub fn draw_links<C: Canvas2d + ?Sized>(
    canvas: &mut C,
    field: &ParticleField,
    settings: &Settings,
) -> usize {
    let max_distance = settings.max_link_distance(field.bounds().width);
    let mut links = 0;

    field.for_each_pair(|a, b| {
        let distance = a.pos.distance(b.pos);
        if let Some(alpha) = link_alpha(distance, max_distance, settings.link_max_alpha) {
            let stroke = Stroke::new(LINK_COLOR.with_alpha(alpha), settings.link_width);
            canvas.stroke_line(a.pos, b.pos, stroke);
            links += 1;
        }
    });

    links
}

/// Two faint rings around the pointer. Decorative only.
pub fn draw_ripple<C: Canvas2d + ?Sized>(canvas: &mut C, pointer: Vec2) {
    canvas.stroke_circle(pointer, RIPPLE_OUTER_RADIUS, RIPPLE_OUTER);
    canvas.stroke_circle(pointer, RIPPLE_INNER_RADIUS, RIPPLE_INNER);
}

/// Clear and redraw the whole surface from the field's current state
pub fn draw_frame<C: Canvas2d + ?Sized>(
    canvas: &mut C,
    field: &ParticleField,
    pointer: Option<Vec2>,
    settings: &Settings,
) -> FrameStats {
    let extent = field.bounds().extent();
    canvas.clear(extent.x, extent.y);

    let particles = draw_particles(canvas, field);
    let links = draw_links(canvas, field, settings);

    let ripple = match pointer {
        Some(pointer) if settings.ripple => {
            draw_ripple(canvas, pointer);
            true
        }
        _ => false,
    };

    FrameStats {
        particles,
        links,
        ripple,
    }
}
