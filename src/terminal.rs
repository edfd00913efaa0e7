// Terminal - The display and keyboard context
//
// Owns the pipeline, the overlay and the keyboard state, and is driven by
// the host event loop through `tick`. The emulation core is passed in on
// every call; it provides video memory and receives cache invalidations.

use crate::config::TerminalConfig;
use crate::display::framebuffer::SCREEN_HEIGHT;
use crate::display::screen::{RenderOutcome, Screen};
use crate::display::surface::DisplaySurface;
use crate::display::vram::{VideoCache, VideoMemory};
use crate::error::Result;
use crate::input::{HostEvent, InputSource, KeyboardTranslator, SharedKeyQueue, VirtualKey};
use crate::menu::{MenuHost, MenuInterceptor, MenuState, WAKE_SEQUENCE};
use crate::overlay::Overlay;
use crate::pacer::FramePacer;
use std::time::Instant;
use tracing::{debug, info};

/// Whether the host asked to quit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceStatus {
    Running,
    Quit,
}

/// Display and keyboard backend for one emulated terminal
pub struct Terminal<S: DisplaySurface, M: MenuHost> {
    surface: S,
    menu: M,
    screen: Screen,
    overlay: Overlay,
    translator: KeyboardTranslator,
    interceptor: MenuInterceptor,
    queue: SharedKeyQueue,
    pacer: FramePacer,
    events: Vec<HostEvent>,
    codes: Vec<VirtualKey>,
}

impl<S: DisplaySurface, M: MenuHost> Terminal<S, M> {
    /// Create an open terminal with default settings
    pub fn new(surface: S, menu: M) -> Self {
        Self::with_config(surface, menu, &TerminalConfig::default())
    }

    /// Create an open terminal drawing to `surface`
    pub fn with_config(surface: S, menu: M, config: &TerminalConfig) -> Self {
        let mut terminal = Self {
            surface,
            menu,
            screen: Screen::new(),
            overlay: Overlay::new(config.overlay.style()),
            translator: KeyboardTranslator::new(),
            interceptor: config.input.interceptor(),
            queue: SharedKeyQueue::new(config.input.key_queue_capacity),
            pacer: config.pacing.pacer(),
            events: Vec::new(),
            codes: Vec::new(),
        };
        terminal.open(SCREEN_HEIGHT);
        terminal
    }

    /// Allocate the pipeline and overlay
    pub fn open(&mut self, height: usize) {
        self.screen.open(height);
        self.overlay.open();
        info!("terminal opened");
    }

    /// Release the overlay, then the pipeline; a no-op if already closed
    pub fn close(&mut self) {
        if !self.screen.is_open() && !self.overlay.is_open() {
            return;
        }
        self.overlay.close();
        self.screen.close();
        info!("terminal closed");
    }

    pub fn is_open(&self) -> bool {
        self.screen.is_open()
    }

    /// Run whatever is due at `now`: event polling first, then a frame
    pub fn tick<I, C>(&mut self, source: &mut I, core: &mut C, now: Instant) -> Result<ServiceStatus>
    where
        I: InputSource + ?Sized,
        C: VideoMemory + VideoCache + ?Sized,
    {
        if self.pacer.poll_due(now) {
            self.pacer.mark_polled(now);
            if self.service_events(source, now) == ServiceStatus::Quit {
                return Ok(ServiceStatus::Quit);
            }
        }

        self.overlay.take_invalidations(core);

        if self.pacer.frame_due(now) {
            self.pacer.mark_rendered(now);
            self.render(core)?;
        }
        Ok(ServiceStatus::Running)
    }

    /// Drain host events, translate them and enqueue the resulting codes
    pub fn service_events<I>(&mut self, source: &mut I, now: Instant) -> ServiceStatus
    where
        I: InputSource + ?Sized,
    {
        source.drain_events(&mut self.events);
        let mut status = ServiceStatus::Running;

        let mut events = std::mem::take(&mut self.events);
        for event in events.drain(..) {
            match event {
                HostEvent::Key {
                    key,
                    pressed: true,
                    modifiers,
                } => {
                    if MenuInterceptor::is_chord(key, modifiers) {
                        // F1 never reaches the machine as part of the chord
                        self.translator.track(key, true);
                        if self.interceptor.chord_pressed(self.menu.is_active(), now) {
                            self.wake_menu();
                        }
                        continue;
                    }
                    self.translator.key_down(key, &mut self.codes);
                }
                HostEvent::Key {
                    key,
                    pressed: false,
                    ..
                } => self.translator.key_up(key, &mut self.codes),
                HostEvent::FocusLost => {
                    debug!("focus lost");
                    self.translator.focus_lost(&mut self.codes);
                    self.interceptor.release_chord();
                    self.pacer.set_focus(false);
                }
                HostEvent::FocusGained => {
                    debug!("focus gained");
                    self.pacer.set_focus(true);
                }
                HostEvent::Hidden => self.pacer.set_background(true),
                HostEvent::Shown => self.pacer.set_background(false),
                HostEvent::Quit => {
                    info!("quit requested");
                    status = ServiceStatus::Quit;
                    break;
                }
            }
        }
        events.clear();
        self.events = events;

        if status == ServiceStatus::Running && self.pacer.is_focused() {
            self.translator.scan(source.key_state(), &mut self.codes);
            let chord = self.interceptor.scan_chord(
                source.key_state(),
                source.modifiers(),
                self.menu.is_active(),
                now,
            );
            if chord {
                self.wake_menu();
            }
        }

        self.flush_codes();
        status
    }

    fn wake_menu(&mut self) {
        debug!("waking menu");
        self.menu.reset();
        self.codes.extend_from_slice(&WAKE_SEQUENCE);
    }

    /// Pass pending codes through the menu filter into the queue
    fn flush_codes(&mut self) {
        let filter = self.screen.is_open();
        let mut codes = std::mem::take(&mut self.codes);
        for code in codes.drain(..) {
            let code = if filter {
                self.menu.filter(code, &mut self.overlay)
            } else {
                Some(code)
            };
            if filter && self.menu.take_keyboard_reset() {
                self.reset_keyboard();
            }
            if let Some(code) = code {
                self.queue.put(code);
            }
        }
        self.codes = codes;
    }

    /// Forget held keys and drop codes the machine has not read yet
    ///
    /// Keys still held on the host are picked up again by the next scan.
    pub fn reset_keyboard(&mut self) {
        info!("resetting keyboard state, {} codes discarded", self.queue.len());
        self.translator.reset();
        self.queue.clear();
    }

    /// Draw one frame from the core's video memory
    pub fn render<V: VideoMemory + ?Sized>(&mut self, vram: &V) -> Result<RenderOutcome> {
        self.screen.render(vram, &mut self.overlay, &mut self.surface)
    }

    /// Blank the screen
    pub fn clear(&mut self) -> Result<()> {
        self.screen.clear(&mut self.surface)
    }

    pub fn set_title(&mut self, title: &str) {
        self.surface.set_title(title);
    }

    /// The core switched video modes; redraw `height` rows from scratch
    pub fn video_mode_changed(&mut self, height: usize) {
        info!("video mode changed, {} rows", height);
        self.screen.resize(height);
    }

    /// Queue handle for the emulation core
    pub fn key_queue(&self) -> SharedKeyQueue {
        self.queue.clone()
    }

    /// When the event loop should wake up next
    pub fn next_deadline(&self, now: Instant) -> Instant {
        self.pacer.next_deadline(now)
    }

    pub fn menu_state(&self) -> MenuState {
        MenuState::of(&self.menu)
    }

    pub fn menu(&self) -> &M {
        &self.menu
    }

    pub fn interceptor(&self) -> &MenuInterceptor {
        &self.interceptor
    }

    pub fn translator(&self) -> &KeyboardTranslator {
        &self.translator
    }

    pub fn overlay(&self) -> &Overlay {
        &self.overlay
    }

    pub fn overlay_mut(&mut self) -> &mut Overlay {
        &mut self.overlay
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn pacer(&self) -> &FramePacer {
        &self.pacer
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }
}

impl<S: DisplaySurface, M: MenuHost> Drop for Terminal<S, M> {
    fn drop(&mut self) {
        self.close();
    }
}
