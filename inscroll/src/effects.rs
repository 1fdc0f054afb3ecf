//! Effects the host executes on behalf of the coordinator.
//!
//! The coordinator never touches the view tree. Every call into the scroll
//! container, the hidden measuring field or a text entry is described here as
//! data and returned from [`crate::Coordinator::handle`] and friends, in the
//! order it should run.

use crate::{config::MeasureStyle, widget::WidgetHandle};

/// Where the focused widget should be scrolled relative to the keyboard.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScrollTarget {
    pub widget: WidgetHandle,
    /// Distance kept between the widget's bottom edge and the keyboard.
    pub vertical_offset: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    /// Scroll the container to an absolute y offset.
    ScrollTo { y: f32, animated: bool },

    /// Scroll the container to the end of its content.
    ScrollToEnd { animated: bool },

    /// Scroll so the target widget sits `vertical_offset` above the keyboard.
    ScrollToKeyboard {
        target: ScrollTarget,
        keyboard_top: Option<f32>,
        animated: bool,
    },

    /// Extra space below the content so its tail stays reachable.
    SetBottomInset { inset: f32, animated: bool },

    /// Render `text` in the hidden measuring field at `width` and report its
    /// content height back as a probe layout event.
    ShowProbe {
        text: String,
        width: f32,
        style: Option<MeasureStyle>,
    },

    /// Unmount the hidden measuring field.
    HideProbe,

    /// Grant native focus to a text entry.
    FocusWidget(WidgetHandle),

    /// Answer "yes" to the container's touch responder capture query.
    ClaimTouch,
}
