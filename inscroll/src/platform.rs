//! Platform profiles and the event normalizer.
//!
//! Everything that differs between the two supported OS families lives here:
//! which keyboard notification phase is listened to, what clock drives
//! deferrals, whether focusing a field scrolls immediately, and whether touch
//! interception is needed at all. The rest of the crate only sees [`Event`].

use crate::event::{Event, KeyboardNotification, RawEvent, TargetKind};
use serde::Deserialize;
use std::{fmt, str::FromStr, time::Duration};
use thiserror::Error;

/// Errors raised while interpreting host-supplied names.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NormalizeError {
    /// A keyboard notification name neither profile knows.
    #[error("Unknown keyboard notification: {0}")]
    UnknownNotification(String),

    /// A platform name other than `ios` or `android`.
    #[error("Unknown platform: {0}")]
    UnknownPlatform(String),
}

/// Which host loop the coordinator's `tick` is expected to ride on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickSource {
    /// Once per rendered animation frame.
    AnimationFrame,
    /// Once per zero-delay timer turn.
    Timer,
}

impl TickSource {
    /// Nominal host time between two ticks.
    pub fn interval(self) -> Duration {
        match self {
            TickSource::AnimationFrame => Duration::from_millis(16),
            // Zero-delay timers are clamped by the host.
            TickSource::Timer => Duration::from_millis(4),
        }
    }
}

/// What focusing a text entry does before the keyboard settles.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FocusScroll {
    /// Request a scroll right away.
    Immediate,
    /// Wait for the first selection report, with a fallback timer.
    AwaitSelection,
    /// Do nothing; the keyboard notification arrives after focus.
    Deferred,
}

/// Strategy object describing one OS family.
pub trait PlatformProfile: fmt::Debug {
    fn name(&self) -> &'static str;

    /// Keyboard notification pair this platform listens to.
    fn keyboard_show(&self) -> KeyboardNotification;
    fn keyboard_hide(&self) -> KeyboardNotification;

    fn tick_source(&self) -> TickSource;

    fn focus_scroll(&self, multiline: bool) -> FocusScroll;

    /// Whether the container must claim touches to keep the focused field.
    fn intercepts_touches(&self) -> bool;

    /// Whether a native view class name is a text entry.
    fn is_text_entry_class(&self, class: &str) -> bool;
}

/// Frame-clocked family that announces the keyboard before layout settles.
#[derive(Clone, Copy, Debug, Default)]
pub struct Ios;

/// Timer-clocked family that only announces the keyboard after layout.
#[derive(Clone, Copy, Debug, Default)]
pub struct Android;

const IOS_TEXT_ENTRY_CLASSES: &[&str] = &[
    "RCTTextField",
    "RCTTextView",
    "RCTSinglelineTextInputView",
    "RCTMultilineTextInputView",
];

impl PlatformProfile for Ios {
    fn name(&self) -> &'static str {
        "ios"
    }

    fn keyboard_show(&self) -> KeyboardNotification {
        KeyboardNotification::WillShow
    }

    fn keyboard_hide(&self) -> KeyboardNotification {
        KeyboardNotification::WillHide
    }

    fn tick_source(&self) -> TickSource {
        TickSource::AnimationFrame
    }

    fn focus_scroll(&self, multiline: bool) -> FocusScroll {
        // Single-line fields focus before the keyboard notification; multiline
        // ones report their caret first, so the scroll waits for it.
        if multiline {
            FocusScroll::AwaitSelection
        } else {
            FocusScroll::Immediate
        }
    }

    fn intercepts_touches(&self) -> bool {
        true
    }

    fn is_text_entry_class(&self, class: &str) -> bool {
        IOS_TEXT_ENTRY_CLASSES.contains(&class)
    }
}

impl PlatformProfile for Android {
    fn name(&self) -> &'static str {
        "android"
    }

    fn keyboard_show(&self) -> KeyboardNotification {
        KeyboardNotification::DidShow
    }

    fn keyboard_hide(&self) -> KeyboardNotification {
        KeyboardNotification::DidHide
    }

    fn tick_source(&self) -> TickSource {
        TickSource::Timer
    }

    fn focus_scroll(&self, _multiline: bool) -> FocusScroll {
        FocusScroll::Deferred
    }

    fn intercepts_touches(&self) -> bool {
        false
    }

    fn is_text_entry_class(&self, class: &str) -> bool {
        class == "AndroidTextInput" || class == "ReactEditText"
    }
}

/// Platform selector used by configuration and the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    #[default]
    Ios,
    Android,
}

impl Platform {
    pub fn profile(self) -> Box<dyn PlatformProfile> {
        match self {
            Platform::Ios => Box::new(Ios),
            Platform::Android => Box::new(Android),
        }
    }
}

impl FromStr for Platform {
    type Err = NormalizeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ios" => Ok(Platform::Ios),
            "android" => Ok(Platform::Android),
            _ => Err(NormalizeError::UnknownPlatform(s.to_string())),
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::Ios => f.write_str("ios"),
            Platform::Android => f.write_str("android"),
        }
    }
}

/// Translates [`RawEvent`]s into canonical [`Event`]s for one platform.
#[derive(Debug)]
pub struct EventNormalizer {
    profile: Box<dyn PlatformProfile>,
}

impl EventNormalizer {
    pub fn new(profile: Box<dyn PlatformProfile>) -> Self {
        Self { profile }
    }

    pub fn profile(&self) -> &dyn PlatformProfile {
        self.profile.as_ref()
    }

    /// Returns `None` for notifications this platform ignores.
    pub fn normalize(&self, raw: RawEvent) -> Option<Event> {
        let event = match raw {
            RawEvent::Focus {
                widget,
                multiline,
                value,
                default_value,
                in_container,
            } => Event::FocusGained {
                widget,
                multiline,
                text: value.or(default_value),
                in_container,
            },
            RawEvent::Blur { widget } => Event::FocusLost { widget },
            RawEvent::Change { widget, text } => Event::TextChanged { widget, text },
            RawEvent::SelectionChange { widget, end, value } => Event::SelectionChanged {
                widget,
                caret_index: end,
                snapshot_text: value,
            },
            RawEvent::ContentSizeChange {
                widget,
                width,
                height,
                value,
            } => Event::ContentSizeChanged {
                widget,
                width,
                height,
                snapshot_text: value,
            },
            RawEvent::Keyboard { name, top_edge } => {
                if name == self.profile.keyboard_show() {
                    Event::KeyboardShown { top_edge }
                } else if name == self.profile.keyboard_hide() {
                    Event::KeyboardHidden
                } else {
                    tracing::trace!(
                        platform = self.profile.name(),
                        notification = %name,
                        "Ignoring keyboard notification of the other phase"
                    );
                    return None;
                }
            },
            RawEvent::MomentumScrollEnd {
                layout_height,
                offset_y,
                content_height,
            } => Event::ScrollSettled {
                visible_height: layout_height,
                offset_y,
                content_height,
            },
            RawEvent::TouchStart { target, view_class } => {
                let kind = match view_class.as_deref() {
                    Some(class) if self.profile.is_text_entry_class(class) => {
                        TargetKind::TextEntry
                    },
                    _ => TargetKind::Other,
                };
                Event::TouchDown { target, kind }
            },
            RawEvent::TouchMove => Event::TouchMove,
            RawEvent::TouchEnd => Event::TouchUp,
            RawEvent::ProbeContentSize { height } => Event::ProbeMeasured { height },
            RawEvent::ContainerMounted { window_top } => Event::ContainerMounted { window_top },
            RawEvent::ContainerUnmounted => Event::ContainerUnmounted,
            RawEvent::WidgetUnmounted { widget } => Event::WidgetUnmounted { widget },
        };
        Some(event)
    }
}
