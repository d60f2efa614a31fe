//! Headless platform: records draw calls and hands frames out on demand
//!
//! Drives the component without a browser, for the native binary and tests.

use glam::Vec2;

use super::{EventSource, FrameHandle, Scheduler, Subscription, Surface};
use crate::renderer::{Canvas2d, Stroke};
use crate::{Rgba, SurfaceSize};

/// A recorded draw call
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DrawCommand {
    Clear { width: f32, height: f32 },
    Fill { center: Vec2, radius: f32, color: Rgba },
    Ring { center: Vec2, radius: f32, stroke: Stroke },
    Line { from: Vec2, to: Vec2, stroke: Stroke },
}

/// Canvas that keeps every call made on it
#[derive(Debug, Clone, Default)]
pub struct RecordingCanvas {
    commands: Vec<DrawCommand>,
}

impl RecordingCanvas {
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Forget recorded calls, e.g. between frames
    pub fn take(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }

    pub fn fill_count(&self) -> usize {
        self.count(|c| matches!(c, DrawCommand::Fill { .. }))
    }

    pub fn line_count(&self) -> usize {
        self.count(|c| matches!(c, DrawCommand::Line { .. }))
    }

    pub fn ring_count(&self) -> usize {
        self.count(|c| matches!(c, DrawCommand::Ring { .. }))
    }

    fn count(&self, pred: impl Fn(&DrawCommand) -> bool) -> usize {
        self.commands.iter().filter(|c| pred(*c)).count()
    }
}

impl Canvas2d for RecordingCanvas {
    fn clear(&mut self, width: f32, height: f32) {
        self.commands.push(DrawCommand::Clear { width, height });
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Rgba) {
        self.commands.push(DrawCommand::Fill { center, radius, color });
    }

    fn stroke_circle(&mut self, center: Vec2, radius: f32, stroke: Stroke) {
        self.commands.push(DrawCommand::Ring { center, radius, stroke });
    }

    fn stroke_line(&mut self, from: Vec2, to: Vec2, stroke: Stroke) {
        self.commands.push(DrawCommand::Line { from, to, stroke });
    }
}

/// In-memory surface with a settable size
#[derive(Debug, Clone)]
pub struct HeadlessSurface {
    size: SurfaceSize,
    canvas: Option<RecordingCanvas>,
    measurements: u32,
}

impl HeadlessSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            size: SurfaceSize::new(width, height),
            canvas: Some(RecordingCanvas::default()),
            measurements: 0,
        }
    }

    /// A surface whose 2D context is unavailable
    pub fn without_context(width: u32, height: u32) -> Self {
        Self {
            canvas: None,
            ..Self::new(width, height)
        }
    }

    /// Change the size reported by the next `measure`
    pub fn set_size(&mut self, width: u32, height: u32) {
        self.size = SurfaceSize::new(width, height);
    }

    pub fn canvas(&self) -> Option<&RecordingCanvas> {
        self.canvas.as_ref()
    }

    pub fn canvas_mut(&mut self) -> Option<&mut RecordingCanvas> {
        self.canvas.as_mut()
    }

    /// How many times the size was read
    pub fn measurements(&self) -> u32 {
        self.measurements
    }
}

impl Surface for HeadlessSurface {
    type Context = RecordingCanvas;

    fn measure(&mut self) -> SurfaceSize {
        self.measurements += 1;
        self.size
    }

    fn context(&mut self) -> Option<&mut RecordingCanvas> {
        self.canvas.as_mut()
    }
}

/// Scheduler and event source that only act when told to
#[derive(Debug, Clone, Default)]
pub struct ManualHost {
    next_id: i64,
    pending: Vec<FrameHandle>,
    cancelled: Vec<FrameHandle>,
    requests: u32,
    subscription: Option<Subscription>,
    subscribes: u32,
    unsubscribes: u32,
    refuse_frames: bool,
}

impl ManualHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following `request_frame` fail
    pub fn refuse_frames(&mut self) {
        self.refuse_frames = true;
    }

    /// Pop the oldest pending frame, as a repaint would
    pub fn fire(&mut self) -> Option<FrameHandle> {
        if self.pending.is_empty() {
            None
        } else {
            Some(self.pending.remove(0))
        }
    }

    pub fn pending(&self) -> &[FrameHandle] {
        &self.pending
    }

    pub fn cancelled(&self) -> &[FrameHandle] {
        &self.cancelled
    }

    /// Total frames ever requested
    pub fn requests(&self) -> u32 {
        self.requests
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscription.is_some()
    }

    pub fn subscribes(&self) -> u32 {
        self.subscribes
    }

    pub fn unsubscribes(&self) -> u32 {
        self.unsubscribes
    }
}

impl Scheduler for ManualHost {
    fn request_frame(&mut self) -> Option<FrameHandle> {
        if self.refuse_frames {
            return None;
        }
        self.next_id += 1;
        self.requests += 1;
        let handle = FrameHandle(self.next_id);
        self.pending.push(handle);
        Some(handle)
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        self.pending.retain(|h| *h != handle);
        self.cancelled.push(handle);
    }
}

impl EventSource for ManualHost {
    fn subscribe(&mut self) -> Option<Subscription> {
        self.subscribes += 1;
        let subscription = Subscription(self.subscribes);
        self.subscription = Some(subscription);
        Some(subscription)
    }

    fn unsubscribe(&mut self, subscription: Subscription) {
        if self.subscription == Some(subscription) {
            self.subscription = None;
        }
        self.unsubscribes += 1;
    }
}
