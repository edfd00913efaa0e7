// Window module - winit window and pixels surface
//
// This module provides the host side of the display: a `DisplaySurface`
// backed by a pixels texture, and the winit application that drives the
// terminal and the emulated machine from the event loop.

use super::framebuffer::{SCREEN_HEIGHT, SCREEN_WIDTH};
use super::surface::DisplaySurface;
use super::vram::{VideoCache, VideoMemory};
use crate::config::{TerminalConfig, VideoConfig};
use crate::error::{Result, TerminalError};
use crate::input::{SharedKeyQueue, WinitInput};
use crate::menu::MenuHost;
use crate::terminal::{ServiceStatus, Terminal};
use pixels::{Pixels, PixelsBuilder, SurfaceTexture};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Fullscreen, Window, WindowId};

/// Smallest window the terminal opens
pub const MIN_WINDOW_WIDTH: u32 = 640;
pub const MIN_WINDOW_HEIGHT: u32 = 480;

/// Default window title
pub const WINDOW_TITLE: &str = "Pro 350";

/// Window size for a vertical scale factor
///
/// Only the height is scaled; the 1024-pixel width already matches the
/// aspect of the emulated monitor.
pub fn window_size(scale: u32) -> PhysicalSize<u32> {
    PhysicalSize::new(
        (SCREEN_WIDTH as u32).max(MIN_WINDOW_WIDTH),
        (SCREEN_HEIGHT as u32 * scale).max(MIN_WINDOW_HEIGHT),
    )
}

/// Lookup table applying display gamma to one color channel
pub fn gamma_table(gamma: f32) -> [u8; 256] {
    let mut table = [0u8; 256];
    let exponent = 1.0 / gamma;
    for (i, entry) in table.iter_mut().enumerate() {
        let level = (i as f32 / 255.0).powf(exponent);
        *entry = (level * 255.0).round().clamp(0.0, 255.0) as u8;
    }
    table
}

/// Surface drawing into a winit window through pixels
///
/// Each emulated scan line is repeated `row_scale` times, so the texture
/// already has the window's aspect.
pub struct PixelsSurface {
    window: Arc<Window>,
    pixels: Pixels<'static>,
    gamma: [u8; 256],
    row_scale: usize,
    width: usize,
    height: usize,
}

impl PixelsSurface {
    /// Create the surface for `window`
    ///
    /// # Errors
    /// Returns `TerminalError::Surface` if no adapter or device is available
    pub fn new(window: Arc<Window>, video: &VideoConfig) -> Result<Self> {
        let inner = window.inner_size();
        let texture = SurfaceTexture::new(inner.width, inner.height, window.clone());
        let row_scale = video.scale().max(1) as usize;
        let pixels = PixelsBuilder::new(
            SCREEN_WIDTH as u32,
            (SCREEN_HEIGHT * row_scale) as u32,
            texture,
        )
        .wgpu_backend(video.renderer.backends())
        .enable_vsync(video.vsync)
        .build()?;

        info!(
            "surface created: {}x{} texture, renderer {}",
            SCREEN_WIDTH,
            SCREEN_HEIGHT * row_scale,
            video.renderer
        );

        Ok(Self {
            window,
            pixels,
            gamma: gamma_table(video.gamma),
            row_scale,
            width: SCREEN_WIDTH,
            height: SCREEN_HEIGHT,
        })
    }

    /// Follow a change of the window size
    pub fn resize_surface(&mut self, size: PhysicalSize<u32>) -> Result<()> {
        if size.width == 0 || size.height == 0 {
            return Ok(());
        }
        self.pixels.resize_surface(size.width, size.height)?;
        Ok(())
    }

    pub fn window(&self) -> &Window {
        &self.window
    }
}

impl DisplaySurface for PixelsSurface {
    fn upload(&mut self, rgb: &[u8], width: usize, height: usize) -> Result<()> {
        if (width, height) != (self.width, self.height) {
            self.pixels
                .resize_buffer(width as u32, (height * self.row_scale) as u32)?;
            self.width = width;
            self.height = height;
        }

        let gamma = &self.gamma;
        let row_bytes = width * 4;
        let frame = self.pixels.frame_mut();
        for (src_row, dst_rows) in rgb
            .chunks_exact(width * 3)
            .zip(frame.chunks_exact_mut(row_bytes * self.row_scale))
        {
            let (first, copies) = dst_rows.split_at_mut(row_bytes);
            for (dst, src) in first.chunks_exact_mut(4).zip(src_row.chunks_exact(3)) {
                dst[0] = gamma[src[0] as usize];
                dst[1] = gamma[src[1] as usize];
                dst[2] = gamma[src[2] as usize];
                dst[3] = 0xFF;
            }
            for copy in copies.chunks_exact_mut(row_bytes) {
                copy.copy_from_slice(first);
            }
        }
        Ok(())
    }

    fn present(&mut self) -> Result<()> {
        self.pixels.render()?;
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        for pixel in self.pixels.frame_mut().chunks_exact_mut(4) {
            pixel.copy_from_slice(&[0, 0, 0, 0xFF]);
        }
        self.present()
    }

    fn set_title(&mut self, title: &str) {
        self.window.set_title(title);
    }
}

/// The emulated machine, as driven from the event loop
pub trait Machine: VideoMemory + VideoCache {
    /// Run one slice of emulation, consuming keys from `keys`
    fn run_slice(&mut self, keys: &SharedKeyQueue);

    /// New displayed row count after a video mode switch
    fn take_mode_change(&mut self) -> Option<usize> {
        None
    }

    /// New window title requested by the machine
    fn take_title(&mut self) -> Option<String> {
        None
    }
}

/// winit application hosting one terminal
pub struct TerminalApp<C: Machine, M: MenuHost> {
    config: TerminalConfig,
    core: C,
    menu: Option<M>,
    input: WinitInput,
    terminal: Option<Terminal<PixelsSurface, M>>,
    error: Option<TerminalError>,
}

impl<C: Machine, M: MenuHost> TerminalApp<C, M> {
    pub fn new(config: TerminalConfig, core: C, menu: M) -> Self {
        Self {
            config,
            core,
            menu: Some(menu),
            input: WinitInput::new(),
            terminal: None,
            error: None,
        }
    }

    fn create_terminal(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let video = &self.config.video;
        let size = window_size(video.scale());
        let mut attributes = Window::default_attributes()
            .with_title(WINDOW_TITLE)
            .with_inner_size(size)
            .with_min_inner_size(size)
            .with_resizable(false);
        if video.fullscreen {
            attributes = attributes.with_fullscreen(Some(Fullscreen::Borderless(None)));
        }

        let window = Arc::new(event_loop.create_window(attributes)?);
        info!("window created: {}x{}", size.width, size.height);
        let surface = PixelsSurface::new(window.clone(), video)?;

        let Some(menu) = self.menu.take() else {
            return Err(TerminalError::Surface("terminal already created".to_string()));
        };
        self.terminal = Some(Terminal::with_config(surface, menu, &self.config));
        window.focus_window();
        Ok(())
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, e: TerminalError) {
        error!("{}", e);
        self.error = Some(e);
        event_loop.exit();
    }

    /// Release the terminal's resources and end the process
    fn quit(&mut self) -> ! {
        if let Some(terminal) = self.terminal.as_mut() {
            terminal.close();
        }
        info!("exiting");
        std::process::exit(0);
    }
}

impl<C: Machine, M: MenuHost> ApplicationHandler for TerminalApp<C, M> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.terminal.is_some() {
            return;
        }
        if let Err(e) = self.create_terminal(event_loop) {
            self.fail(event_loop, e);
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        self.input.record(&event);

        if let WindowEvent::Resized(size) = event {
            if let Some(terminal) = self.terminal.as_mut() {
                if let Err(e) = terminal.surface_mut().resize_surface(size) {
                    self.fail(event_loop, e);
                }
            }
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let Some(terminal) = self.terminal.as_mut() else {
            return;
        };

        self.core.run_slice(&terminal.key_queue());
        if let Some(height) = self.core.take_mode_change() {
            terminal.video_mode_changed(height);
        }
        if let Some(title) = self.core.take_title() {
            terminal.set_title(&title);
        }

        let now = Instant::now();
        match terminal.tick(&mut self.input, &mut self.core, now) {
            Ok(ServiceStatus::Running) => {
                let deadline = terminal.next_deadline(Instant::now());
                event_loop.set_control_flow(ControlFlow::WaitUntil(deadline));
            }
            Ok(ServiceStatus::Quit) => self.quit(),
            Err(e) => self.fail(event_loop, e),
        }
    }
}

/// Open a window and run `core` in it until the user quits
///
/// # Errors
/// Returns an error if the event loop, the window or the surface cannot be
/// created
pub fn run<C, M>(config: TerminalConfig, core: C, menu: M) -> Result<()>
where
    C: Machine,
    M: MenuHost,
{
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = TerminalApp::new(config, core, menu);
    event_loop.run_app(&mut app)?;

    match app.error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
