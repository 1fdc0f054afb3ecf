//! Event vocabularies.
//!
//! [`RawEvent`] mirrors what the host's widget, keyboard and container callbacks
//! deliver, platform quirks included. [`Event`] is the canonical vocabulary the
//! coordinator reacts to; [`crate::platform::EventNormalizer`] turns one into the
//! other.

use crate::{platform::NormalizeError, widget::WidgetHandle};
use serde::Deserialize;
use std::{fmt, str::FromStr};

/// Keyboard visibility notification as named by the host OS.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
pub enum KeyboardNotification {
    #[serde(rename = "keyboardWillShow")]
    WillShow,
    #[serde(rename = "keyboardDidShow")]
    DidShow,
    #[serde(rename = "keyboardWillHide")]
    WillHide,
    #[serde(rename = "keyboardDidHide")]
    DidHide,
}

impl KeyboardNotification {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::WillShow => "keyboardWillShow",
            Self::DidShow => "keyboardDidShow",
            Self::WillHide => "keyboardWillHide",
            Self::DidHide => "keyboardDidHide",
        }
    }
}

impl fmt::Display for KeyboardNotification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KeyboardNotification {
    type Err = NormalizeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "keyboardWillShow" => Ok(Self::WillShow),
            "keyboardDidShow" => Ok(Self::DidShow),
            "keyboardWillHide" => Ok(Self::WillHide),
            "keyboardDidHide" => Ok(Self::DidHide),
            other => Err(NormalizeError::UnknownNotification(other.to_string())),
        }
    }
}

/// What a touch landed on, as far as focus arbitration cares.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TargetKind {
    TextEntry,
    Other,
}

fn default_true() -> bool {
    true
}

/// Notifications exactly as the host platform delivers them.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RawEvent {
    /// Focus captured by a text entry inside the container.
    Focus {
        widget: WidgetHandle,
        #[serde(default)]
        multiline: bool,
        /// Controlled value prop, if any.
        value: Option<String>,
        default_value: Option<String>,
        /// Whether the widget sits inside the managed scroll container.
        #[serde(default = "default_true")]
        in_container: bool,
    },
    Blur {
        widget: WidgetHandle,
    },
    Change {
        widget: WidgetHandle,
        text: String,
    },
    #[serde(rename = "selection")]
    SelectionChange {
        widget: WidgetHandle,
        /// End of the native selection, in characters.
        end: usize,
        value: Option<String>,
    },
    #[serde(rename = "content_size")]
    ContentSizeChange {
        widget: WidgetHandle,
        width: f32,
        height: f32,
        /// Controlled value prop, if any.
        value: Option<String>,
    },
    Keyboard {
        name: KeyboardNotification,
        /// Screen y of the keyboard's top edge once it settles.
        top_edge: Option<f32>,
    },
    #[serde(rename = "momentum_end")]
    MomentumScrollEnd {
        layout_height: f32,
        offset_y: f32,
        content_height: f32,
    },
    TouchStart {
        target: Option<WidgetHandle>,
        /// Native view class of the touched view.
        view_class: Option<String>,
    },
    TouchMove,
    TouchEnd,
    /// Layout report from the hidden measuring field.
    #[serde(rename = "probe_size")]
    ProbeContentSize {
        height: f32,
    },
    #[serde(rename = "mount")]
    ContainerMounted {
        window_top: Option<f32>,
    },
    #[serde(rename = "unmount")]
    ContainerUnmounted,
    #[serde(rename = "widget_unmount")]
    WidgetUnmounted {
        widget: WidgetHandle,
    },
}

/// Canonical, platform-independent events.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    FocusGained {
        widget: WidgetHandle,
        multiline: bool,
        /// Initial text known from the widget's props.
        text: Option<String>,
        in_container: bool,
    },
    FocusLost {
        widget: WidgetHandle,
    },
    TextChanged {
        widget: WidgetHandle,
        text: String,
    },
    SelectionChanged {
        widget: WidgetHandle,
        caret_index: usize,
        snapshot_text: Option<String>,
    },
    ContentSizeChanged {
        widget: WidgetHandle,
        width: f32,
        height: f32,
        snapshot_text: Option<String>,
    },
    KeyboardShown {
        top_edge: Option<f32>,
    },
    KeyboardHidden,
    ScrollSettled {
        visible_height: f32,
        offset_y: f32,
        content_height: f32,
    },
    TouchDown {
        target: Option<WidgetHandle>,
        kind: TargetKind,
    },
    TouchMove,
    TouchUp,
    ProbeMeasured {
        height: f32,
    },
    ContainerMounted {
        window_top: Option<f32>,
    },
    ContainerUnmounted,
    WidgetUnmounted {
        widget: WidgetHandle,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notification_names_parse() {
        assert_eq!(
            "keyboardWillShow".parse::<KeyboardNotification>().unwrap(),
            KeyboardNotification::WillShow
        );
        assert_eq!(
            "keyboardDidHide".parse::<KeyboardNotification>().unwrap(),
            KeyboardNotification::DidHide
        );
    }

    #[test]
    fn unknown_notification_is_an_error() {
        let err = "keyboardWillChangeFrame"
            .parse::<KeyboardNotification>()
            .unwrap_err();
        assert!(err.to_string().contains("keyboardWillChangeFrame"));
    }

    #[test]
    fn raw_focus_deserializes_with_defaults() {
        let event: RawEvent = toml::from_str("event = \"focus\"\nwidget = 3\n").unwrap();
        assert_eq!(
            event,
            RawEvent::Focus {
                widget: WidgetHandle::from_raw(3),
                multiline: false,
                value: None,
                default_value: None,
                in_container: true,
            }
        );
    }

    #[test]
    fn raw_content_size_carries_optional_value() {
        let event: RawEvent = toml::from_str(
            "event = \"content_size\"\nwidget = 2\nwidth = 200.0\nheight = 40.0\nvalue = \"hi\"\n",
        )
        .unwrap();
        assert_eq!(
            event,
            RawEvent::ContentSizeChange {
                widget: WidgetHandle::from_raw(2),
                width: 200.0,
                height: 40.0,
                value: Some("hi".into()),
            }
        );
    }

    #[test]
    fn raw_keyboard_deserializes_native_name() {
        let event: RawEvent =
            toml::from_str("event = \"keyboard\"\nname = \"keyboardDidShow\"\ntop_edge = 480.0\n")
                .unwrap();
        assert_eq!(
            event,
            RawEvent::Keyboard {
                name: KeyboardNotification::DidShow,
                top_edge: Some(480.0),
            }
        );
    }
}
