//! Coordinator options.
//!
//! Options are fixed at construction. They can be built in code or loaded from
//! a TOML file; every key is optional and unknown keys are rejected.
//!
//! ```toml
//! keyboard_offset = 40.0
//! top_offset = 64.0
//! use_animated_container = true
//!
//! [multiline_measure_style]
//! font_size = 16.0
//! line_height = 20.0
//!
//! [timing]
//! content_size_debounce_ticks = 2
//! focus_fallback_ms = 250
//! ```

use crate::platform::Platform;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::{path::Path, time::Duration};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Options {
    /// Gap kept between the caret line and the keyboard's top edge.
    pub keyboard_offset: f32,

    /// Window y of the container's top edge. Measured at mount when unset.
    pub top_offset: Option<f32>,

    /// Style applied to the hidden measuring field so it wraps like the real one.
    pub multiline_measure_style: Option<MeasureStyle>,

    /// Animate bottom inset changes instead of jumping.
    pub use_animated_container: bool,

    /// Only consulted by front ends that pick the platform from configuration.
    pub platform: Option<Platform>,

    pub timing: Timing,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            keyboard_offset: 40.0,
            top_offset: None,
            multiline_measure_style: None,
            use_animated_container: false,
            platform: None,
            timing: Timing::default(),
        }
    }
}

/// Text style for the hidden measuring field. Unset fields inherit the host's
/// defaults.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MeasureStyle {
    pub font_family: Option<String>,
    pub font_size: Option<f32>,
    pub line_height: Option<f32>,
    pub padding_horizontal: Option<f32>,
    pub padding_vertical: Option<f32>,
}

/// Deferral windows, in host ticks unless noted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Timing {
    /// How long a selection report waits before it is applied.
    pub selection_defer_ticks: u32,

    /// Quiet period before a content size burst is acted on. Must exceed
    /// `selection_defer_ticks` so the caret is current when scrolling.
    pub content_size_debounce_ticks: u32,

    /// Quiet period before the hidden probe's height is trusted.
    pub probe_settle_ticks: u32,

    /// Fallback for a focus scroll waiting on a selection report that never
    /// comes.
    pub focus_fallback_ms: u64,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            selection_defer_ticks: 1,
            content_size_debounce_ticks: 2,
            probe_settle_ticks: 3,
            focus_fallback_ms: 250,
        }
    }
}

impl Timing {
    pub fn focus_fallback(&self) -> Duration {
        Duration::from_millis(self.focus_fallback_ms)
    }
}

impl Options {
    /// Read and deserialize a TOML options file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read options file: {}", path.display()))?;
        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse options file: {}", path.display()))
    }

    pub fn from_toml(source: &str) -> Result<Self> {
        let options: Options = toml::from_str(source)?;
        Ok(options)
    }

    /// Options file if given, defaults otherwise.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}
