// Pro 350 terminal - Main Entry Point
//
// Runs the display and keyboard backend against a small stand-in machine:
// it shows a color test pattern and echoes typed keys into video memory.
// Ctrl+F1 opens the overlay menu.

use clap::Parser;
use pro_term::config::{RendererBackend, CONFIG_FILE};
use pro_term::display::vram::{VideoCache, VideoMemory};
use pro_term::display::{self, BitPlanes, Machine, SCREEN_HEIGHT, SCREEN_WIDTH};
use pro_term::input::{SharedKeyQueue, VirtualKey};
use pro_term::overlay::font::{glyph, glyph_bit, Font, GLYPH_HEIGHT, GLYPH_WIDTH};
use pro_term::{logging, BasicMenu, TerminalConfig};
use std::path::PathBuf;
use tracing::{debug, info, warn};

#[derive(Parser)]
#[command(name = "pro-term")]
#[command(about = "Display and keyboard backend for a Pro 350 emulator", version)]
struct Cli {
    /// Configuration file (created with defaults if missing)
    #[arg(short, long, default_value = CONFIG_FILE)]
    config: PathBuf,

    /// Vertical scale for the current window mode (1-8)
    #[arg(long)]
    scale: Option<u32>,

    /// Start in fullscreen
    #[arg(long)]
    fullscreen: bool,

    /// Renderer: auto, software, opengl, vulkan, metal, dx12
    #[arg(long)]
    renderer: Option<RendererBackend>,

    /// Display gamma (0.1-5.0)
    #[arg(long)]
    gamma: Option<f32>,

    /// Log at debug level
    #[arg(long)]
    debug: bool,
}

impl Cli {
    fn apply(&self, config: &mut TerminalConfig) {
        if self.fullscreen {
            config.video.fullscreen = true;
        }
        if let Some(scale) = self.scale {
            if config.video.fullscreen {
                config.video.full_scale = scale;
            } else {
                config.video.window_scale = scale;
            }
        }
        if let Some(renderer) = self.renderer {
            config.video.renderer = renderer;
        }
        if let Some(gamma) = self.gamma {
            config.video.gamma = gamma;
        }
        if self.debug {
            config.logging.debug = true;
        }
    }
}

/// Stand-in machine: a test pattern with a line of echoed text
struct DemoMachine {
    planes: BitPlanes,
    column: usize,
    row: usize,
}

impl DemoMachine {
    const TEXT_TOP: usize = 120;

    fn new() -> Self {
        let mut planes = BitPlanes::new();
        // Eight vertical color bars across the top half
        let bar = SCREEN_WIDTH / 8;
        for y in 0..Self::TEXT_TOP - GLYPH_HEIGHT {
            for x in 0..SCREEN_WIDTH {
                planes.set_pixel(x, y, (x / bar) as u8);
            }
        }
        Self {
            planes,
            column: 0,
            row: 0,
        }
    }

    fn columns() -> usize {
        SCREEN_WIDTH / GLYPH_WIDTH
    }

    fn rows() -> usize {
        (SCREEN_HEIGHT - Self::TEXT_TOP) / GLYPH_HEIGHT
    }

    fn draw_char(&mut self, ch: char) {
        let cell = glyph(Font::Normal, ch);
        let left = self.column * GLYPH_WIDTH;
        let top = Self::TEXT_TOP + self.row * GLYPH_HEIGHT;
        for y in 0..GLYPH_HEIGHT {
            for x in 0..GLYPH_WIDTH {
                let index = if glyph_bit(&cell, x, y) { 7 } else { 0 };
                self.planes.set_pixel(left + x, top + y, index);
            }
        }
    }

    fn new_line(&mut self) {
        self.column = 0;
        self.row = (self.row + 1) % Self::rows();
        for c in 0..Self::columns() {
            self.column = c;
            self.draw_char(' ');
        }
        self.column = 0;
    }

    fn key(&mut self, key: VirtualKey) {
        if key == VirtualKey::RETURN {
            self.new_line();
            return;
        }
        if key == VirtualKey::DEL {
            if self.column > 0 {
                self.column -= 1;
                self.draw_char(' ');
            }
            return;
        }
        if let Some(ch) = key.printable() {
            self.draw_char(ch);
            self.column += 1;
            if self.column == Self::columns() {
                self.new_line();
            }
        } else {
            debug!("machine received {}", key);
        }
    }
}

impl VideoMemory for DemoMachine {
    fn plane_word(&self, plane: usize, address: usize) -> u16 {
        self.planes.plane_word(plane, address)
    }
}

// The demo decodes straight from its planes, so it keeps no pixel cache
impl VideoCache for DemoMachine {
    fn invalidate(&mut self, _address: usize) {}

    fn invalidate_all(&mut self) {}
}

impl Machine for DemoMachine {
    fn run_slice(&mut self, keys: &SharedKeyQueue) {
        while let Some(key) = keys.get_key() {
            self.key(key);
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // A broken file falls back to defaults, reported once logging is up
    let (mut config, load_error) = match TerminalConfig::load_or_create(&cli.config) {
        Ok(config) => (config, None),
        Err(e) => (TerminalConfig::default(), Some(e)),
    };
    cli.apply(&mut config);
    config.validate()?;
    logging::init(&config.logging)?;
    if let Some(e) = load_error {
        warn!("ignoring config file {}: {}", cli.config.display(), e);
    }

    info!("Pro 350 terminal v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "video: scale {}x, fullscreen {}, renderer {}, gamma {}",
        config.video.scale(),
        config.video.fullscreen,
        config.video.renderer,
        config.video.gamma
    );

    let menu = BasicMenu::new(config.video.fullscreen);
    let machine = DemoMachine::new();
    display::run(config, machine, menu)?;

    Ok(())
}
