//! Browser platform: canvas 2D context, `requestAnimationFrame`, window events
//!
//! The component lives in `Rc<RefCell<_>>`. Browser callbacks hold a `Weak`
//! and skip the call if the component is gone or already borrowed.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use glam::Vec2;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, Window};

use super::{EventSource, FrameHandle, Scheduler, Subscription, Surface};
use crate::background::{ParticleBackground, unmount_shared};
use crate::renderer::{Canvas2d, Stroke};
use crate::settings::Settings;
use crate::{Rgba, SurfaceSize};

type WebBackground = ParticleBackground<CanvasSurface, WebHost>;

impl Canvas2d for CanvasRenderingContext2d {
    fn clear(&mut self, width: f32, height: f32) {
        self.clear_rect(0.0, 0.0, width as f64, height as f64);
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Rgba) {
        self.begin_path();
        trace_circle(self, center, radius);
        self.set_fill_style_str(&color.to_css());
        self.fill();
    }

    fn stroke_circle(&mut self, center: Vec2, radius: f32, stroke: Stroke) {
        self.begin_path();
        trace_circle(self, center, radius);
        apply_stroke(self, stroke);
        self.stroke();
    }

    fn stroke_line(&mut self, from: Vec2, to: Vec2, stroke: Stroke) {
        self.begin_path();
        self.move_to(from.x as f64, from.y as f64);
        self.line_to(to.x as f64, to.y as f64);
        apply_stroke(self, stroke);
        self.stroke();
    }
}

fn trace_circle(ctx: &CanvasRenderingContext2d, center: Vec2, radius: f32) {
    if let Err(e) = ctx.arc(center.x as f64, center.y as f64, radius as f64, 0.0, std::f64::consts::TAU) {
        log::warn!("Canvas arc failed: {:?}", e);
    }
}

fn apply_stroke(ctx: &CanvasRenderingContext2d, stroke: Stroke) {
    ctx.set_stroke_style_str(&stroke.color.to_css());
    ctx.set_line_width(stroke.width as f64);
}

/// A canvas sized to the browser window
pub struct CanvasSurface {
    window: Window,
    canvas: HtmlCanvasElement,
    context: Option<CanvasRenderingContext2d>,
}

impl CanvasSurface {
    pub fn new(window: Window, canvas: HtmlCanvasElement) -> Self {
        let context = canvas
            .get_context("2d")
            .ok()
            .flatten()
            .and_then(|ctx| ctx.dyn_into::<CanvasRenderingContext2d>().ok());
        Self {
            window,
            canvas,
            context,
        }
    }

    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }
}

impl Surface for CanvasSurface {
    type Context = CanvasRenderingContext2d;

    fn measure(&mut self) -> SurfaceSize {
        let dimension = |value: Result<JsValue, JsValue>| {
            value.ok().and_then(|v| v.as_f64()).unwrap_or(0.0).max(0.0) as u32
        };
        let width = dimension(self.window.inner_width());
        let height = dimension(self.window.inner_height());

        // Match the backing store to the window so drawing is 1:1
        if self.canvas.width() != width {
            self.canvas.set_width(width);
        }
        if self.canvas.height() != height {
            self.canvas.set_height(height);
        }
        SurfaceSize::new(width, height)
    }

    fn context(&mut self) -> Option<&mut CanvasRenderingContext2d> {
        self.context.as_mut()
    }
}

/// `requestAnimationFrame` scheduling and window listeners
pub struct WebHost {
    window: Window,
    on_frame: Option<Closure<dyn FnMut(f64)>>,
    on_resize: Option<Closure<dyn FnMut(web_sys::Event)>>,
    on_pointer: Option<Closure<dyn FnMut(MouseEvent)>>,
    subscriptions: u32,
}

impl WebHost {
    pub fn new(window: Window) -> Self {
        Self {
            window,
            on_frame: None,
            on_resize: None,
            on_pointer: None,
            subscriptions: 0,
        }
    }

    /// Hand over the callbacks that route browser events to the component
    pub fn install(
        &mut self,
        on_frame: Closure<dyn FnMut(f64)>,
        on_resize: Closure<dyn FnMut(web_sys::Event)>,
        on_pointer: Closure<dyn FnMut(MouseEvent)>,
    ) {
        self.on_frame = Some(on_frame);
        self.on_resize = Some(on_resize);
        self.on_pointer = Some(on_pointer);
    }
}

impl Scheduler for WebHost {
    fn request_frame(&mut self) -> Option<FrameHandle> {
        let callback = self.on_frame.as_ref()?;
        self.window
            .request_animation_frame(callback.as_ref().unchecked_ref())
            .ok()
            .map(|id| FrameHandle(id as i64))
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        let _ = self.window.cancel_animation_frame(handle.0 as i32);
    }
}

impl EventSource for WebHost {
    fn subscribe(&mut self) -> Option<Subscription> {
        let on_resize = self.on_resize.as_ref()?;
        let on_pointer = self.on_pointer.as_ref()?;

        let resize = self
            .window
            .add_event_listener_with_callback("resize", on_resize.as_ref().unchecked_ref());
        let pointer = self
            .window
            .add_event_listener_with_callback("mousemove", on_pointer.as_ref().unchecked_ref());

        if resize.is_err() || pointer.is_err() {
            log::warn!("Failed to add window listeners");
            let _ = self
                .window
                .remove_event_listener_with_callback("resize", on_resize.as_ref().unchecked_ref());
            let _ = self
                .window
                .remove_event_listener_with_callback("mousemove", on_pointer.as_ref().unchecked_ref());
            return None;
        }

        self.subscriptions += 1;
        Some(Subscription(self.subscriptions))
    }

    fn unsubscribe(&mut self, _subscription: Subscription) {
        if let Some(on_resize) = self.on_resize.as_ref() {
            let _ = self
                .window
                .remove_event_listener_with_callback("resize", on_resize.as_ref().unchecked_ref());
        }
        if let Some(on_pointer) = self.on_pointer.as_ref() {
            let _ = self
                .window
                .remove_event_listener_with_callback("mousemove", on_pointer.as_ref().unchecked_ref());
        }
    }
}

/// Run `f` on the component unless it is gone or mid-tick
fn with_background(weak: &Weak<RefCell<WebBackground>>, f: impl FnOnce(&mut WebBackground)) {
    if let Some(bg) = weak.upgrade() {
        if let Ok(mut bg) = bg.try_borrow_mut() {
            f(&mut bg);
        }
    }
}

/// A particle background mounted on a page canvas
#[wasm_bindgen]
pub struct ParticleBackgroundHandle {
    inner: Rc<RefCell<WebBackground>>,
}

#[wasm_bindgen]
impl ParticleBackgroundHandle {
    /// Mount on `canvas` with settings from LocalStorage (or defaults)
    pub fn mount(canvas: HtmlCanvasElement) -> Result<ParticleBackgroundHandle, JsValue> {
        Self::mount_with(canvas, Settings::load())
    }

    /// Mount on `canvas` with settings given as JSON
    #[wasm_bindgen(js_name = mountWithSettings)]
    pub fn mount_with_settings(
        canvas: HtmlCanvasElement,
        json: &str,
    ) -> Result<ParticleBackgroundHandle, JsValue> {
        let settings = Settings::from_json(json).map_err(|e| JsValue::from_str(&e.to_string()))?;
        Self::mount_with(canvas, settings)
    }

    /// Stop animating and detach from the page. Safe to call repeatedly.
    pub fn unmount(&self) {
        unmount_shared(&self.inner);
    }

    #[wasm_bindgen(js_name = particleCount)]
    pub fn particle_count(&self) -> usize {
        self.inner.try_borrow().map(|bg| bg.field().len()).unwrap_or(0)
    }
}

impl ParticleBackgroundHandle {
    fn mount_with(canvas: HtmlCanvasElement, settings: Settings) -> Result<Self, JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let seed = js_sys::Date::now() as u64;

        let surface = CanvasSurface::new(window.clone(), canvas.clone());
        let host = WebHost::new(window);
        let inner = Rc::new(RefCell::new(ParticleBackground::new(surface, host, settings, seed)));
        let weak = Rc::downgrade(&inner);

        let on_frame = Closure::<dyn FnMut(f64)>::new({
            let weak = weak.clone();
            move |_time: f64| {
                with_background(&weak, |bg| {
                    bg.tick();
                });
            }
        });

        let on_resize = Closure::<dyn FnMut(web_sys::Event)>::new({
            let weak = weak.clone();
            move |_event: web_sys::Event| with_background(&weak, |bg| bg.on_resize())
        });

        // Window-level so the canvas can keep `pointer-events: none`
        let on_pointer = Closure::<dyn FnMut(MouseEvent)>::new(move |event: MouseEvent| {
            let rect = canvas.get_bounding_client_rect();
            let x = event.client_x() as f64 - rect.left();
            let y = event.client_y() as f64 - rect.top();
            with_background(&weak, |bg| bg.on_pointer_move(x as f32, y as f32));
        });

        {
            let mut bg = inner.borrow_mut();
            bg.host_mut().install(on_frame, on_resize, on_pointer);
            if let Err(e) = bg.mount() {
                log::warn!("{}", e);
            }
        }

        Ok(Self { inner })
    }
}
