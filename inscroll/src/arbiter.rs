//! Touch-vs-focus arbitration.
//!
//! When a drag ends over a text entry, the container's responder system would
//! hand that entry focus. Claiming the touch prevents this, but the claim also
//! swallows the native focus grant for a plain tap, so an unmoved claimed tap
//! re-asserts focus on release.

use crate::{event::TargetKind, widget::WidgetHandle};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Gesture {
    target: WidgetHandle,
    moved: bool,
}

#[derive(Debug, Default)]
pub struct TouchArbiter {
    enabled: bool,
    gesture: Option<Gesture>,
}

impl TouchArbiter {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            gesture: None,
        }
    }

    /// Decides whether the container claims a touch starting on `target`.
    ///
    /// Only a text entry other than the focused one is claimed; touching the
    /// focused entry must keep working natively (caret placement, selection).
    pub fn touch_down(
        &mut self,
        target: Option<WidgetHandle>,
        kind: TargetKind,
        focused: Option<WidgetHandle>,
    ) -> bool {
        self.gesture = None;
        if !self.enabled || kind != TargetKind::TextEntry {
            return false;
        }
        let Some(target) = target else {
            return false;
        };
        if focused == Some(target) {
            return false;
        }
        self.gesture = Some(Gesture {
            target,
            moved: false,
        });
        true
    }

    pub fn touch_move(&mut self) {
        if let Some(gesture) = self.gesture.as_mut() {
            gesture.moved = true;
        }
    }

    /// Ends the gesture, returning the widget to focus if it was a tap.
    pub fn touch_up(&mut self) -> Option<WidgetHandle> {
        self.gesture
            .take()
            .filter(|gesture| !gesture.moved)
            .map(|gesture| gesture.target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn w(raw: u64) -> WidgetHandle {
        WidgetHandle::from_raw(raw)
    }

    #[test]
    fn claims_other_text_entries() {
        let mut arbiter = TouchArbiter::new(true);
        assert!(arbiter.touch_down(Some(w(2)), TargetKind::TextEntry, Some(w(1))));
        assert!(arbiter.touch_down(Some(w(2)), TargetKind::TextEntry, None));
    }

    #[test]
    fn leaves_focused_entry_and_other_views_alone() {
        let mut arbiter = TouchArbiter::new(true);
        assert!(!arbiter.touch_down(Some(w(1)), TargetKind::TextEntry, Some(w(1))));
        assert!(!arbiter.touch_down(Some(w(2)), TargetKind::Other, Some(w(1))));
        assert!(!arbiter.touch_down(None, TargetKind::TextEntry, Some(w(1))));
        assert_eq!(arbiter.touch_up(), None);
    }

    #[test]
    fn disabled_arbiter_never_claims() {
        let mut arbiter = TouchArbiter::new(false);
        assert!(!arbiter.touch_down(Some(w(2)), TargetKind::TextEntry, Some(w(1))));
        assert_eq!(arbiter.touch_up(), None);
    }

    #[test]
    fn tap_refocuses_target() {
        let mut arbiter = TouchArbiter::new(true);
        arbiter.touch_down(Some(w(2)), TargetKind::TextEntry, Some(w(1)));
        assert_eq!(arbiter.touch_up(), Some(w(2)));
        assert_eq!(arbiter.touch_up(), None);
    }

    #[test]
    fn drag_does_not_refocus() {
        let mut arbiter = TouchArbiter::new(true);
        arbiter.touch_down(Some(w(2)), TargetKind::TextEntry, Some(w(1)));
        arbiter.touch_move();
        assert_eq!(arbiter.touch_up(), None);
    }
}
