// Window module - Shows a screen in a desktop window
//
// This module provides window creation, scaling, and frame rendering
// using the winit and pixels crates. The window listens for screen changes
// and re-exports only the damaged area on every frame.

use super::color::rgb_to_rgba;
use crate::config::ViewerConfig;
use crate::screen::{Area, ListenerError, Rotation, Screen};
use crate::screenshot::save_screenshot;
use log::{error, info, warn};
use pixels::{Pixels, SurfaceTexture};
use std::cell::Cell;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Instant;
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

/// Window that displays a `Screen`
pub struct ScreenWindow {
    window: Option<Arc<Window>>,
    pixels: Option<Pixels<'static>>,
    config: ViewerConfig,
    scale: usize,
    rotation: Rotation,
    screen: Screen,
    /// Exported pixels, persistent between frames
    staging: Vec<u32>,
    /// Damage delivered to our listener and not yet drawn
    pending: Rc<Cell<Area>>,
    name: String,
    last_frame_time: Instant,
}

impl ScreenWindow {
    /// Create a new screen window (window will be created when event loop starts)
    ///
    /// Registers a change listener on `screen`. The first frame draws the
    /// whole screen.
    ///
    /// # Arguments
    /// * `config` - Viewer configuration
    /// * `screen` - The screen to show
    /// * `name` - Title and screenshot name
    pub fn new(
        config: ViewerConfig,
        mut screen: Screen,
        name: &str,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let scale = config.video.scale();
        let rotation = config.video.rotation()?;

        let pending = Rc::new(Cell::new(Area::full(screen.width(), screen.height())));
        let sink = Rc::clone(&pending);
        screen.add_change_listener(move |_: &Screen, area: Area| -> Result<(), ListenerError> {
            sink.set(sink.get().union(&area));
            Ok(())
        });

        Ok(Self {
            window: None,
            pixels: None,
            staging: vec![0; screen.export_len(scale)],
            config,
            scale,
            rotation,
            screen,
            pending,
            name: name.to_string(),
            last_frame_time: Instant::now(),
        })
    }

    /// Get a reference to the screen
    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    /// Get a mutable reference to the screen
    pub fn screen_mut(&mut self) -> &mut Screen {
        &mut self.screen
    }

    /// Window size in pixels: the exported image size
    fn window_size(&self) -> (u32, u32) {
        let (width, height) = self.screen.export_dimensions(self.scale, self.rotation);
        (width as u32, height as u32)
    }

    /// Flush screen damage and draw whatever changed
    fn render(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        self.screen.notify_listeners()?;

        let area = self
            .pending
            .take()
            .clip(self.screen.width(), self.screen.height());
        if area.is_empty() {
            return Ok(());
        }

        let Some(pixels) = &mut self.pixels else {
            // Keep the damage until there is a surface to draw on
            self.pending.set(area);
            return Ok(());
        };

        self.screen
            .export_pixels(&mut self.staging, area, self.scale, self.rotation)?;

        // Copy just the rotated, scaled rectangle that was re-exported
        let (columns, _) = self.screen.export_dimensions(self.scale, self.rotation);
        let target = self
            .rotation
            .map_area(area, self.screen.width(), self.screen.height());
        let frame = pixels.frame_mut();
        for row in target.y * self.scale..target.bottom() * self.scale {
            for col in target.x * self.scale..target.right() * self.scale {
                let index = row * columns + col;
                frame[index * 4..index * 4 + 4].copy_from_slice(&rgb_to_rgba(self.staging[index]));
            }
        }

        pixels.render()?;
        Ok(())
    }

    /// Check if enough time has passed for the next frame
    fn should_render_frame(&mut self) -> bool {
        let elapsed = self.last_frame_time.elapsed();
        let frame_duration = self.config.video.frame_duration();

        if elapsed >= frame_duration {
            self.last_frame_time = Instant::now();
            true
        } else {
            false
        }
    }

    fn take_screenshot(&self) {
        if let Err(e) = save_screenshot(&self.screen, &self.config, &self.name) {
            warn!("Screenshot failed: {}", e);
        }
    }
}

impl ApplicationHandler for ScreenWindow {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let (width, height) = self.window_size();
        let window_attributes = Window::default_attributes()
            .with_title(format!("gvm-rs - {}", self.name))
            .with_inner_size(LogicalSize::new(width, height))
            .with_resizable(false);

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                error!("Failed to create window: {}", e);
                event_loop.exit();
                return;
            }
        };
        let window_size = window.inner_size();

        // Surface texture holds an Arc<Window> for a 'static lifetime
        let surface_texture =
            SurfaceTexture::new(window_size.width, window_size.height, window.clone());

        let pixels = match Pixels::new(width, height, surface_texture) {
            Ok(pixels) => pixels,
            Err(e) => {
                error!("Failed to create pixel buffer: {}", e);
                event_loop.exit();
                return;
            }
        };

        self.window = Some(window);
        self.pixels = Some(pixels);
        // A fresh surface has none of our pixels yet
        self.pending
            .set(Area::full(self.screen.width(), self.screen.height()));
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                info!("Close requested, exiting...");
                event_loop.exit();
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } => match code {
                KeyCode::Escape => event_loop.exit(),
                KeyCode::F9 => self.take_screenshot(),
                _ => {}
            },
            WindowEvent::RedrawRequested => {
                // Render frame if enough time has passed
                if self.should_render_frame() {
                    if let Err(err) = self.render() {
                        error!("Render error: {}", err);
                        event_loop.exit();
                    }
                }

                // Request next frame
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

/// Create and run the viewer window
///
/// # Arguments
/// * `config` - Viewer configuration
/// * `screen` - Screen to display
/// * `name` - Title and screenshot name
///
/// # Returns
/// Result indicating success or error
pub fn run_viewer(
    config: ViewerConfig,
    screen: Screen,
    name: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let event_loop = EventLoop::new()?;

    // Set control flow based on VSync setting
    if config.video.vsync {
        event_loop.set_control_flow(ControlFlow::Wait);
    } else {
        event_loop.set_control_flow(ControlFlow::Poll);
    }

    let mut viewer = ScreenWindow::new(config, screen, name)?;
    let (width, height) = viewer.window_size();

    info!("Starting viewer window...");
    info!(
        "  Screen: {}x{}, window: {}x{}, scale {}x, rotation {}",
        viewer.screen.width(),
        viewer.screen.height(),
        width,
        height,
        viewer.scale,
        viewer.rotation.steps()
    );
    info!("  Press F9 for a screenshot, Escape to quit");

    event_loop.run_app(&mut viewer)?;

    Ok(())
}
