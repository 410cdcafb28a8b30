/*!
Interactive window showing the emulated display.

- One frame is rendered per redraw; the window requests a redraw whenever the
  event loop goes idle.
- Cursor motion is mapped to framebuffer pixels and pushed into the host's
  input slot as pointer motion. Closing the window pushes a quit request, so
  the effect shuts down through its normal `render` path.
*/

use std::sync::Arc;

use pixels::{Pixels, SurfaceTexture};
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::window::{Window, WindowId};

use crate::config::EffectConfig;
use crate::effect::{self, Effect, Flow};
use crate::host::{EmulatedDisplay, Event};
use crate::rng::XorShift;
use crate::screen::{WIDTH, WINDOW_HEIGHT};
use crate::sync::TrackSet;

const SCALE: f64 = 2.0;

struct App {
    effect: Option<Effect<XorShift>>,
    host: EmulatedDisplay,
    window: Option<Arc<Window>>,
    pixels: Option<Pixels<'static>>,
    error: Option<String>,
}

impl App {
    fn fail(&mut self, event_loop: &ActiveEventLoop, message: String) {
        log::error!("[Window] {}", message);
        self.error = Some(message);
        event_loop.exit();
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let Some(effect) = self.effect.as_mut() else { return };
        match effect.render(&mut self.host) {
            Ok(Flow::Continue) => {}
            Ok(Flow::Quit) => {
                if let Some(effect) = self.effect.take() {
                    effect.kill();
                }
                event_loop.exit();
                return;
            }
            Err(e) => return self.fail(event_loop, e.to_string()),
        }
        let Some(pixels) = self.pixels.as_mut() else { return };
        pixels.frame_mut().copy_from_slice(self.host.emulator().framebuffer());
        if let Err(e) = pixels.render() {
            self.fail(event_loop, format!("render failed: {e}"));
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        let attributes = Window::default_attributes()
            .with_title("copperballs")
            .with_inner_size(LogicalSize::new(WIDTH as f64 * SCALE, WINDOW_HEIGHT as f64 * SCALE));
        let window = match event_loop.create_window(attributes) {
            Ok(w) => Arc::new(w),
            Err(e) => return self.fail(event_loop, format!("cannot create window: {e}")),
        };
        let size = window.inner_size();
        let surface = SurfaceTexture::new(size.width, size.height, Arc::clone(&window));
        match Pixels::new(WIDTH as u32, WINDOW_HEIGHT as u32, surface) {
            Ok(p) => self.pixels = Some(p),
            Err(e) => return self.fail(event_loop, format!("cannot create pixel surface: {e}")),
        }
        log::info!("[Window] Opened {}x{}", size.width, size.height);
        self.window = Some(window);
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => self.host.events_mut().push(Event::Quit),
            WindowEvent::CursorMoved { position, .. } => {
                let Some(pixels) = self.pixels.as_ref() else { return };
                let (x, y) = pixels
                    .window_pos_to_pixel((position.x as f32, position.y as f32))
                    .unwrap_or_else(|pos| pixels.clamp_pixel_pos(pos));
                self.host.events_mut().push(Event::PointerMotion {
                    x: x as i32,
                    y: y as i32,
                });
            }
            WindowEvent::Resized(size) => {
                if let Some(pixels) = self.pixels.as_mut() {
                    if let Err(e) = pixels.resize_surface(size.width, size.height) {
                        self.fail(event_loop, format!("resize failed: {e}"));
                    }
                }
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = self.window.as_ref() {
            window.request_redraw();
        }
    }
}

/// Run the effect in a window until it is closed.
pub fn run(config: EffectConfig, tracks: TrackSet) -> Result<(), String> {
    let (effect, host) = effect::setup(config, tracks).map_err(|e| e.to_string())?;
    let event_loop = EventLoop::new().map_err(|e| format!("cannot start event loop: {e}"))?;
    let mut app = App {
        effect: Some(effect),
        host,
        window: None,
        pixels: None,
        error: None,
    };
    event_loop
        .run_app(&mut app)
        .map_err(|e| format!("event loop failed: {e}"))?;
    match app.error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
