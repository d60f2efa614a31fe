//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Drawing surface and its 2D context
//! - Repaint scheduling (`requestAnimationFrame` on web)
//! - Resize and pointer-move subscriptions

pub mod headless;
#[cfg(target_arch = "wasm32")]
pub mod web;

use crate::SurfaceSize;
use crate::renderer::Canvas2d;

/// Token for a requested frame, used to cancel it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(pub i64);

/// Token for an active resize/pointer subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription(pub u32);

/// The rectangle the component draws into
pub trait Surface {
    type Context: Canvas2d;

    /// Current pixel dimensions. The surface may resize its backing store
    /// to match before returning.
    fn measure(&mut self) -> SurfaceSize;

    /// The 2D context, or `None` when the surface cannot provide one
    fn context(&mut self) -> Option<&mut Self::Context>;
}

/// "Call me back before the next repaint"
pub trait Scheduler {
    /// Returns `None` if the host refused the request
    fn request_frame(&mut self) -> Option<FrameHandle>;
    fn cancel_frame(&mut self, handle: FrameHandle);
}

/// Delivery of resize and pointer-move notifications to the component
pub trait EventSource {
    fn subscribe(&mut self) -> Option<Subscription>;
    fn unsubscribe(&mut self, subscription: Subscription);
}
