//! The particle background component
//!
//! Owns the field, the pointer state and the handles it got from the host.
//! The host calls `tick` when a requested frame fires and forwards resize
//! and pointer-move events; everything runs on one thread, one tick at a time.

use std::cell::RefCell;

use glam::Vec2;

use crate::error::MountError;
use crate::platform::{EventSource, FrameHandle, Scheduler, Subscription, Surface};
use crate::renderer::{FrameStats, draw_frame};
use crate::settings::Settings;
use crate::sim::ParticleField;
use crate::SurfaceSize;

/// Lifecycle of the component
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopPhase {
    /// Created, not mounted yet
    Idle,
    /// Animating: a frame is requested and events are subscribed
    Running,
    /// Mounted without a usable 2D context; does nothing
    Inert,
    /// Torn down for good
    Unmounted,
}

/// Drifting particle field bound to a host surface
pub struct ParticleBackground<S, H>
where
    S: Surface,
    H: Scheduler + EventSource,
{
    surface: S,
    host: H,
    settings: Settings,
    field: ParticleField,
    /// `None` until the first pointer move; never cleared
    pointer: Option<Vec2>,
    size: SurfaceSize,
    phase: LoopPhase,
    pending_frame: Option<FrameHandle>,
    subscription: Option<Subscription>,
    frames: u64,
    last_stats: FrameStats,
}

impl<S, H> ParticleBackground<S, H>
where
    S: Surface,
    H: Scheduler + EventSource,
{
    pub fn new(surface: S, host: H, settings: Settings, seed: u64) -> Self {
        let field = ParticleField::new(seed, settings.field_config());
        Self {
            surface,
            host,
            settings,
            field,
            pointer: None,
            size: SurfaceSize::ZERO,
            phase: LoopPhase::Idle,
            pending_frame: None,
            subscription: None,
            frames: 0,
            last_stats: FrameStats::default(),
        }
    }

    /// Size the field to the surface, subscribe to events and request the
    /// first frame.
    ///
    /// Without a 2D context the component goes `Inert` and reports
    /// `MountError::NoContext`; it is still safe to tick and unmount.
    pub fn mount(&mut self) -> Result<(), MountError> {
        match self.phase {
            LoopPhase::Idle => {}
            LoopPhase::Running | LoopPhase::Inert => return Err(MountError::AlreadyMounted),
            LoopPhase::Unmounted => return Err(MountError::Unmounted),
        }

        if self.surface.context().is_none() {
            log::warn!("No 2D context, particle background stays inert");
            self.phase = LoopPhase::Inert;
            return Err(MountError::NoContext);
        }

        self.size = self.surface.measure();
        self.field.reseed(self.size.width, self.size.height);

        self.subscription = self.host.subscribe();
        if self.subscription.is_none() {
            log::warn!("Resize/pointer events unavailable, animating without them");
        }

        self.phase = LoopPhase::Running;
        self.schedule();

        log::info!(
            "Particle background mounted: {}x{}, {} particles",
            self.size.width,
            self.size.height,
            self.field.len()
        );
        Ok(())
    }

    /// Re-read the surface size and reseed if it changed
    pub fn on_resize(&mut self) {
        if self.phase != LoopPhase::Running {
            return;
        }
        let size = self.surface.measure();
        if size == self.size {
            return;
        }
        self.size = size;
        self.field.reseed(size.width, size.height);
        log::debug!("Resized to {}x{}, {} particles", size.width, size.height, self.field.len());
    }

    /// Record the pointer; the next tick picks it up
    pub fn on_pointer_move(&mut self, x: f32, y: f32) {
        if self.phase == LoopPhase::Running {
            self.pointer = Some(Vec2::new(x, y));
        }
    }

    /// One frame: step the field, redraw everything, request the next frame.
    ///
    /// Returns `None` when nothing was drawn.
    pub fn tick(&mut self) -> Option<FrameStats> {
        if self.phase != LoopPhase::Running {
            return None;
        }
        // The frame we were waiting on has fired
        self.pending_frame = None;

        if self.surface.context().is_none() {
            log::warn!("2D context lost, stopping particle background");
            self.release();
            self.phase = LoopPhase::Inert;
            return None;
        }

        self.field.step(self.pointer);

        let canvas = self.surface.context()?;
        let stats = draw_frame(canvas, &self.field, self.pointer, &self.settings);

        self.frames += 1;
        self.last_stats = stats;
        log::trace!(
            "Frame {}: {} particles, {} links",
            self.frames,
            stats.particles,
            stats.links
        );

        self.schedule();
        Some(stats)
    }

    /// Cancel the pending frame and drop subscriptions. Idempotent, terminal.
    pub fn unmount(&mut self) {
        if self.phase == LoopPhase::Unmounted {
            return;
        }
        self.release();
        self.phase = LoopPhase::Unmounted;
        log::info!("Particle background unmounted after {} frames", self.frames);
    }

    fn schedule(&mut self) {
        self.pending_frame = self.host.request_frame();
        if self.pending_frame.is_none() {
            log::warn!("Host refused to schedule a frame, animation stalled");
        }
    }

    fn release(&mut self) {
        if let Some(handle) = self.pending_frame.take() {
            self.host.cancel_frame(handle);
        }
        if let Some(subscription) = self.subscription.take() {
            self.host.unsubscribe(subscription);
        }
    }

    pub fn phase(&self) -> LoopPhase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.phase == LoopPhase::Running
    }

    pub fn field(&self) -> &ParticleField {
        &self.field
    }

    pub fn pointer(&self) -> Option<Vec2> {
        self.pointer
    }

    /// Surface size the field was last seeded for
    pub fn size(&self) -> SurfaceSize {
        self.size
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn pending_frame(&self) -> Option<FrameHandle> {
        self.pending_frame
    }

    /// Frames drawn since mount
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn last_stats(&self) -> FrameStats {
        self.last_stats
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }
}

impl<S, H> Drop for ParticleBackground<S, H>
where
    S: Surface,
    H: Scheduler + EventSource,
{
    fn drop(&mut self) {
        self.unmount();
    }
}

/// Unmount a component shared with host callbacks.
///
/// Returns `false` and leaves it running if a callback is holding it.
pub fn unmount_shared<S, H>(cell: &RefCell<ParticleBackground<S, H>>) -> bool
where
    S: Surface,
    H: Scheduler + EventSource,
{
    match cell.try_borrow_mut() {
        Ok(mut bg) => {
            bg.unmount();
            true
        }
        Err(_) => {
            log::warn!("Particle background is busy, unmount skipped");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::headless::{DrawCommand, HeadlessSurface, ManualHost};

    type TestBackground = ParticleBackground<HeadlessSurface, ManualHost>;

    fn background(width: u32, height: u32) -> TestBackground {
        ParticleBackground::new(
            HeadlessSurface::new(width, height),
            ManualHost::new(),
            Settings::default(),
            12345,
        )
    }

    /// Fire the pending frame like a repaint would
    fn repaint(bg: &mut TestBackground) -> Option<FrameStats> {
        bg.host_mut().fire()?;
        bg.tick()
    }

    fn recorded(bg: &TestBackground) -> usize {
        bg.surface().canvas().map_or(0, |c| c.commands().len())
    }

    #[test]
    fn test_mount_seeds_subscribes_and_schedules() {
        let mut bg = background(1200, 800);
        assert_eq!(bg.phase(), LoopPhase::Idle);

        bg.mount().unwrap();

        assert!(bg.is_running());
        assert_eq!(bg.field().len(), 150);
        assert_eq!(bg.size(), SurfaceSize::new(1200, 800));
        assert!(bg.host().is_subscribed());
        assert_eq!(bg.host().pending().len(), 1);
        assert_eq!(bg.pending_frame(), bg.host().pending().first().copied());
        // Nothing is drawn until the first frame fires
        assert_eq!(recorded(&bg), 0);
    }

    #[test]
    fn test_tick_draws_and_requests_next_frame() {
        let mut bg = background(1200, 800);
        bg.mount().unwrap();

        let stats = repaint(&mut bg).unwrap();

        assert_eq!(stats.particles, 150);
        assert!(!stats.ripple);
        let canvas = bg.surface().canvas().unwrap();
        assert_eq!(canvas.commands()[0], DrawCommand::Clear { width: 1200.0, height: 800.0 });
        assert_eq!(canvas.fill_count(), 150);
        assert_eq!(canvas.line_count(), stats.links);
        assert_eq!(bg.host().pending().len(), 1);
        assert_eq!(bg.host().requests(), 2);
        assert_eq!(bg.frames(), 1);
        assert_eq!(bg.last_stats(), stats);
    }

    #[test]
    fn test_pointer_move_waits_for_next_tick() {
        let mut bg = background(600, 400);
        bg.mount().unwrap();
        assert_eq!(bg.pointer(), None);

        bg.on_pointer_move(120.0, 80.0);
        assert_eq!(bg.pointer(), Some(Vec2::new(120.0, 80.0)));
        assert_eq!(recorded(&bg), 0);

        let stats = repaint(&mut bg).unwrap();
        assert!(stats.ripple);
        assert_eq!(bg.surface().canvas().unwrap().ring_count(), 2);
    }

    #[test]
    fn test_resize_reseeds_once_per_change() {
        let mut bg = background(1200, 800);
        bg.mount().unwrap();
        repaint(&mut bg);

        bg.surface_mut().set_size(600, 400);
        bg.on_resize();
        assert_eq!(bg.field().len(), 40);
        assert_eq!(bg.field().bounds(), SurfaceSize::new(600, 400));
        // The running loop is not interrupted
        assert_eq!(bg.host().pending().len(), 1);

        let before = bg.field().particles().to_vec();
        bg.on_resize();
        assert_eq!(bg.field().particles(), before.as_slice());
    }

    #[test]
    fn test_unmount_cancels_and_is_idempotent() {
        let mut bg = background(1200, 800);
        bg.mount().unwrap();
        repaint(&mut bg);
        let pending = bg.pending_frame().unwrap();

        bg.unmount();
        bg.unmount();

        assert_eq!(bg.phase(), LoopPhase::Unmounted);
        assert!(bg.host().pending().is_empty());
        assert_eq!(bg.host().cancelled(), &[pending]);
        assert!(!bg.host().is_subscribed());
        assert_eq!(bg.host().unsubscribes(), 1);
        assert_eq!(bg.pending_frame(), None);
    }

    #[test]
    fn test_nothing_happens_after_unmount() {
        let mut bg = background(1200, 800);
        bg.mount().unwrap();
        repaint(&mut bg);
        bg.unmount();

        let commands = recorded(&bg);
        let requests = bg.host().requests();
        let measurements = bg.surface().measurements();
        let particles = bg.field().particles().to_vec();

        assert_eq!(bg.tick(), None);
        bg.surface_mut().set_size(300, 200);
        bg.on_resize();
        bg.on_pointer_move(5.0, 5.0);

        assert_eq!(recorded(&bg), commands);
        assert_eq!(bg.host().requests(), requests);
        assert_eq!(bg.surface().measurements(), measurements);
        assert_eq!(bg.field().particles(), particles.as_slice());
        assert_eq!(bg.pointer(), None);
        assert_eq!(bg.mount(), Err(MountError::Unmounted));
    }

    #[test]
    fn test_double_mount_rejected() {
        let mut bg = background(300, 200);
        bg.mount().unwrap();
        assert_eq!(bg.mount(), Err(MountError::AlreadyMounted));
        assert_eq!(bg.host().subscribes(), 1);
        assert_eq!(bg.host().pending().len(), 1);
    }

    #[test]
    fn test_missing_context_mounts_inert() {
        let mut bg = ParticleBackground::new(
            HeadlessSurface::without_context(800, 600),
            ManualHost::new(),
            Settings::default(),
            1,
        );

        assert_eq!(bg.mount(), Err(MountError::NoContext));
        assert_eq!(bg.phase(), LoopPhase::Inert);
        assert_eq!(bg.host().requests(), 0);
        assert!(!bg.host().is_subscribed());
        assert_eq!(bg.tick(), None);

        bg.unmount();
        assert_eq!(bg.phase(), LoopPhase::Unmounted);
    }

    #[test]
    fn test_unmount_before_mount() {
        let mut bg = background(300, 200);
        bg.unmount();
        assert_eq!(bg.phase(), LoopPhase::Unmounted);
        assert_eq!(bg.host().requests(), 0);
    }

    #[test]
    fn test_zero_size_surface_is_valid() {
        let mut bg = background(0, 0);
        bg.mount().unwrap();
        assert!(bg.field().is_empty());

        let stats = repaint(&mut bg).unwrap();
        assert_eq!(stats, FrameStats::default());
        assert_eq!(
            bg.surface().canvas().unwrap().commands(),
            &[DrawCommand::Clear { width: 0.0, height: 0.0 }]
        );
    }

    #[test]
    fn test_refused_frame_stalls_without_error() {
        let mut host = ManualHost::new();
        host.refuse_frames();
        let mut bg = ParticleBackground::new(HeadlessSurface::new(300, 200), host, Settings::default(), 9);

        bg.mount().unwrap();
        assert_eq!(bg.pending_frame(), None);
        bg.unmount();
        assert!(bg.host().cancelled().is_empty());
    }

    #[test]
    fn test_positions_stay_in_bounds_across_frames() {
        let mut bg = background(640, 480);
        bg.mount().unwrap();
        bg.on_pointer_move(5.0, 470.0);

        for _ in 0..300 {
            repaint(&mut bg).unwrap();
            if let Some(canvas) = bg.surface_mut().canvas_mut() {
                canvas.take();
            }
            for p in bg.field().particles() {
                assert!(p.pos.x >= 0.0 && p.pos.x < 640.0);
                assert!(p.pos.y >= 0.0 && p.pos.y < 480.0);
            }
        }
        assert_eq!(bg.frames(), 300);
    }

    #[test]
    fn test_unmount_shared_skips_busy_component() {
        let mut bg = background(400, 300);
        bg.mount().unwrap();
        let cell = RefCell::new(bg);

        {
            let _held = cell.borrow();
            assert!(!unmount_shared(&cell));
        }
        assert!(cell.borrow().is_running());
        assert_eq!(cell.borrow().host().pending().len(), 1);

        assert!(unmount_shared(&cell));
        assert_eq!(cell.borrow().phase(), LoopPhase::Unmounted);
        assert!(cell.borrow().host().pending().is_empty());
        assert!(unmount_shared(&cell));
    }
}
