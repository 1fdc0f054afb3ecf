//! Recorded host sessions.
//!
//! A session is a TOML file of `[[step]]` tables. Each step is either a raw
//! host event, tagged by `event` exactly as [`RawEvent`] deserializes, or a
//! clock step:
//!
//! ```toml
//! [[step]]
//! event = "keyboard"
//! name = "keyboardWillShow"
//! top_edge = 500.0
//!
//! [[step]]
//! event = "tick"
//! frames = 3
//! ```

use anyhow::{Context, Result};
use inscroll::RawEvent;
use serde::Deserialize;
use std::{path::Path, time::Duration};

#[derive(Debug, Deserialize)]
pub struct Session {
    #[serde(rename = "step", default)]
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Step {
    Clock(Clock),
    Raw(RawEvent),
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Clock {
    /// Advances `frames` host ticks, `ms` apart. Without `ms` the ticks
    /// follow the platform's tick source.
    Tick {
        #[serde(default = "one")]
        frames: u32,
        ms: Option<u64>,
    },
}

fn one() -> u32 {
    1
}

impl Clock {
    pub fn frames(&self) -> u32 {
        match self {
            Clock::Tick { frames, .. } => *frames,
        }
    }

    /// Host time between ticks, `default` unless the step sets `ms`.
    pub fn step(&self, default: Duration) -> Duration {
        match self {
            Clock::Tick { ms, .. } => ms.map_or(default, Duration::from_millis),
        }
    }
}

impl Session {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read session file: {}", path.display()))?;
        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse session file: {}", path.display()))
    }

    pub fn from_toml(source: &str) -> Result<Self> {
        let session: Session = toml::from_str(source)?;
        Ok(session)
    }
}
