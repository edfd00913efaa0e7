// Configuration management
//
// Terminal settings persisted as TOML. Every field has a default, so a
// partial file only overrides what it names.

use crate::error::ConfigError;
use crate::input::queue::DEFAULT_CAPACITY;
use crate::menu::{MenuInterceptor, DEFAULT_COOLDOWN};
use crate::overlay::OverlayStyle;
use crate::pacer::{FramePacer, PacingIntervals};
use pixels::wgpu::Backends;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// Default configuration file path
pub const CONFIG_FILE: &str = "pro_term.toml";

/// Terminal configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerminalConfig {
    pub video: VideoConfig,
    pub overlay: OverlayConfig,
    pub input: InputConfig,
    pub pacing: PacingConfig,
    pub logging: LoggingConfig,
}

/// Video configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoConfig {
    /// Vertical scale in a window (1-8)
    pub window_scale: u32,

    /// Vertical scale in fullscreen (1-8)
    pub full_scale: u32,

    pub fullscreen: bool,

    pub renderer: RendererBackend,

    /// Display gamma, 1.0 leaves colors unchanged
    pub gamma: f32,

    pub vsync: bool,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            window_scale: 2,
            full_scale: 3,
            fullscreen: false,
            renderer: RendererBackend::Auto,
            gamma: 1.0,
            vsync: true,
        }
    }
}

impl VideoConfig {
    /// Scale for the current window mode
    pub fn scale(&self) -> u32 {
        if self.fullscreen {
            self.full_scale
        } else {
            self.window_scale
        }
    }
}

/// Graphics API used by the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RendererBackend {
    #[default]
    Auto,
    /// OpenGL, which includes software rasterizers such as llvmpipe
    Software,
    OpenGl,
    Vulkan,
    Metal,
    Dx12,
}

impl RendererBackend {
    pub const ALL: [RendererBackend; 6] = [
        RendererBackend::Auto,
        RendererBackend::Software,
        RendererBackend::OpenGl,
        RendererBackend::Vulkan,
        RendererBackend::Metal,
        RendererBackend::Dx12,
    ];

    pub fn name(self) -> &'static str {
        match self {
            RendererBackend::Auto => "auto",
            RendererBackend::Software => "software",
            RendererBackend::OpenGl => "opengl",
            RendererBackend::Vulkan => "vulkan",
            RendererBackend::Metal => "metal",
            RendererBackend::Dx12 => "dx12",
        }
    }

    /// wgpu backends to try
    pub fn backends(self) -> Backends {
        match self {
            RendererBackend::Auto => Backends::all(),
            RendererBackend::Software | RendererBackend::OpenGl => Backends::GL,
            RendererBackend::Vulkan => Backends::VULKAN,
            RendererBackend::Metal => Backends::METAL,
            RendererBackend::Dx12 => Backends::DX12,
        }
    }
}

impl fmt::Display for RendererBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RendererBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        RendererBackend::ALL
            .into_iter()
            .find(|r| r.name() == lower)
            .or(match lower.as_str() {
                "gl" | "opengles" => Some(RendererBackend::OpenGl),
                "d3d12" | "direct3d" => Some(RendererBackend::Dx12),
                _ => None,
            })
            .ok_or_else(|| {
                format!(
                    "unknown renderer '{}', expected one of: {}",
                    s,
                    RendererBackend::ALL.map(|r| r.name()).join(", ")
                )
            })
    }
}

/// Overlay colors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    /// Alpha of background cells (0 transparent, 255 opaque)
    pub background_alpha: u8,

    /// Text color as 0xRRGGBB
    pub foreground: u32,

    /// Cell background color as 0xRRGGBB
    pub background: u32,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        let style = OverlayStyle::default();
        Self {
            background_alpha: style.background_alpha,
            foreground: style.foreground,
            background: style.background,
        }
    }
}

impl OverlayConfig {
    pub fn style(&self) -> OverlayStyle {
        OverlayStyle {
            foreground: self.foreground & 0xFF_FFFF,
            background: self.background & 0xFF_FFFF,
            background_alpha: self.background_alpha,
        }
    }
}

/// Keyboard configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    pub key_queue_capacity: usize,

    /// Minimum time between two Ctrl+F1 menu activations
    pub menu_cooldown_ms: u64,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            key_queue_capacity: DEFAULT_CAPACITY,
            menu_cooldown_ms: DEFAULT_COOLDOWN.as_millis() as u64,
        }
    }
}

impl InputConfig {
    pub fn interceptor(&self) -> MenuInterceptor {
        MenuInterceptor::new(Duration::from_millis(self.menu_cooldown_ms))
    }
}

/// Poll and frame cadence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PacingConfig {
    pub poll_interval_ms: u64,
    pub frame_interval_ms: u64,
    pub background_interval_ms: u64,
}

impl Default for PacingConfig {
    fn default() -> Self {
        let intervals = PacingIntervals::default();
        Self {
            poll_interval_ms: intervals.poll.as_millis() as u64,
            frame_interval_ms: intervals.frame.as_millis() as u64,
            background_interval_ms: intervals.background.as_millis() as u64,
        }
    }
}

impl PacingConfig {
    pub fn intervals(&self) -> PacingIntervals {
        PacingIntervals {
            poll: Duration::from_millis(self.poll_interval_ms),
            frame: Duration::from_millis(self.frame_interval_ms),
            background: Duration::from_millis(self.background_interval_ms),
        }
    }

    pub fn pacer(&self) -> FramePacer {
        FramePacer::new(self.intervals())
    }
}

/// Logging configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log at debug level unless RUST_LOG says otherwise
    pub debug: bool,

    /// Append log output to this file instead of stderr
    pub log_file: Option<PathBuf>,
}

impl TerminalConfig {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    /// Returns `ConfigError` if the file cannot be read, parsed or validated
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse and validate configuration from a TOML string
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Load configuration from `path`, creating it if missing
    ///
    /// A missing file is replaced by the defaults, which are written back so
    /// the user has a file to edit.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if an existing file cannot be read, parsed or
    /// validated
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        match Self::load_from_file(path) {
            Err(ConfigError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                let config = Self::default();
                if let Err(e) = config.save_to_file(path) {
                    tracing::debug!("could not write default config to {}: {}", path.display(), e);
                }
                Ok(config)
            }
            result => result,
        }
    }

    /// Load configuration from `path`, falling back to defaults
    ///
    /// Like `load_or_create`, but a malformed file is logged and ignored.
    /// Install the subscriber first or the warning is lost.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        Self::load_or_create(path).unwrap_or_else(|e| {
            tracing::warn!("ignoring config file {}: {}", path.display(), e);
            Self::default()
        })
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, scale) in [
            ("video.window_scale", self.video.window_scale),
            ("video.full_scale", self.video.full_scale),
        ] {
            if !(1..=8).contains(&scale) {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!("{} is outside 1-8", scale),
                });
            }
        }
        if !(0.1..=5.0).contains(&self.video.gamma) {
            return Err(ConfigError::Invalid {
                field: "video.gamma",
                reason: format!("{} is outside 0.1-5.0", self.video.gamma),
            });
        }
        if self.input.key_queue_capacity == 0 {
            return Err(ConfigError::Invalid {
                field: "input.key_queue_capacity",
                reason: "must be at least 1".to_string(),
            });
        }
        for (field, ms) in [
            ("pacing.poll_interval_ms", self.pacing.poll_interval_ms),
            ("pacing.frame_interval_ms", self.pacing.frame_interval_ms),
            ("pacing.background_interval_ms", self.pacing.background_interval_ms),
        ] {
            if ms == 0 {
                return Err(ConfigError::Invalid {
                    field,
                    reason: "must be at least 1 ms".to_string(),
                });
            }
        }
        // Input must never be polled less often than frames are drawn
        if self.pacing.poll_interval_ms > self.pacing.frame_interval_ms {
            return Err(ConfigError::Invalid {
                field: "pacing.poll_interval_ms",
                reason: format!(
                    "{} ms is slower than the frame interval ({} ms)",
                    self.pacing.poll_interval_ms, self.pacing.frame_interval_ms
                ),
            });
        }
        Ok(())
    }
}
