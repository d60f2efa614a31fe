//! Particle Field entry point
//!
//! On the web, mounts the background on `#particle-background`. Natively,
//! runs the field headless and logs what each frame would draw.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_app {
    use wasm_bindgen::JsCast;
    use web_sys::HtmlCanvasElement;

    use particle_field::platform::web::ParticleBackgroundHandle;

    const CANVAS_ID: &str = "particle-background";

    pub fn run() {
        console_error_panic_hook::set_once();
        let _ = console_log::init_with_level(log::Level::Info);

        let canvas = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id(CANVAS_ID))
            .and_then(|el| el.dyn_into::<HtmlCanvasElement>().ok());

        let Some(canvas) = canvas else {
            log::warn!("No <canvas id=\"{}\"> on the page, nothing to mount", CANVAS_ID);
            return;
        };

        match ParticleBackgroundHandle::mount(canvas) {
            // Lives for the rest of the page
            Ok(handle) => std::mem::forget(handle),
            Err(e) => log::error!("Particle background failed to mount: {:?}", e),
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_app::run();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Particle Field (native) starting...");

    let settings = match std::env::args().nth(1) {
        Some(path) => match load_settings(&path) {
            Ok(settings) => settings,
            Err(e) => {
                log::error!("{}: {}", path, e);
                std::process::exit(1);
            }
        },
        None => particle_field::Settings::default(),
    };

    headless_demo(settings);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
fn load_settings(path: &str) -> Result<particle_field::Settings, Box<dyn std::error::Error>> {
    let json = std::fs::read_to_string(path)?;
    Ok(particle_field::Settings::from_json(&json)?)
}

/// Run the field for ten seconds of frames with a circling pointer
#[cfg(not(target_arch = "wasm32"))]
fn headless_demo(settings: particle_field::Settings) {
    use particle_field::ParticleBackground;
    use particle_field::platform::headless::{HeadlessSurface, ManualHost};

    const FRAMES: u32 = 600;
    const RESIZE_AT: u32 = 300;

    let seed: u64 = rand::random();
    let mut bg = ParticleBackground::new(HeadlessSurface::new(1200, 800), ManualHost::new(), settings, seed);
    if let Err(e) = bg.mount() {
        log::error!("Mount failed: {}", e);
        return;
    }
    log::info!("Seed {}, {} particles", seed, bg.field().len());

    for frame in 0..FRAMES {
        let t = frame as f32 / 60.0;
        let size = bg.size().extent();
        let pointer = size / 2.0 + glam::Vec2::new(t.cos(), t.sin()) * size.y / 3.0;
        bg.on_pointer_move(pointer.x, pointer.y);

        if frame == RESIZE_AT {
            bg.surface_mut().set_size(800, 600);
            bg.on_resize();
            log::info!("Resized to 800x600, {} particles", bg.field().len());
        }

        if bg.host_mut().fire().is_none() {
            log::warn!("No frame pending at {}, stopping", frame);
            break;
        }
        let Some(stats) = bg.tick() else { break };
        if let Some(canvas) = bg.surface_mut().canvas_mut() {
            canvas.take();
        }

        if frame % 120 == 0 {
            log::info!(
                "Frame {:>3}: {} particles, {} links, ripple {}",
                frame,
                stats.particles,
                stats.links,
                stats.ripple
            );
        }
    }

    bg.unmount();
    println!("Drew {} frames", bg.frames());
}
