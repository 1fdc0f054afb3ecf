//! Scroll planning.
//!
//! The focused widget is scrolled so that the line holding the caret ends up
//! `keyboard_offset` above the keyboard. The container's native "scroll to
//! keyboard" only knows about the widget's bottom edge, so for a caret above
//! the last line the offset is reduced by the distance from the caret line to
//! the widget's bottom:
//!
//! ```text
//! caret_bottom = max(0, content_height - caret_top)
//! offset       = top_offset + keyboard_offset - caret_bottom
//! ```
//!
//! `caret_top` comes from rendering the text before the caret in the hidden
//! probe (see [`crate::probe`]). When the caret is on the last line, or nothing
//! is known about it, `caret_bottom` is zero and no probe is needed.

use crate::{
    config::Options,
    coordinator::Coordinator,
    effects::{Effect, ScrollTarget},
    probe::{Measurement, ProbeError},
    widget::WidgetHandle,
};
use tracing::debug;

/// A scroll waiting on a caret measurement.
#[derive(Debug)]
pub(crate) struct PendingScroll {
    pub(crate) widget: WidgetHandle,
    pub(crate) content_height: f32,
    pub(crate) force: bool,
    pub(crate) measurement: Measurement,
}

/// Geometry and bookkeeping for keyboard scrolls and the bottom inset.
#[derive(Debug, Clone, PartialEq)]
pub struct ScrollPlanner {
    keyboard_offset: f32,
    configured_top: Option<f32>,
    measured_top: Option<f32>,
    animate_inset: bool,
    bottom_inset: f32,
    /// Last target issued since the keyboard appeared.
    last_issued: Option<ScrollTarget>,
}

impl ScrollPlanner {
    pub fn new(options: &Options) -> Self {
        Self {
            keyboard_offset: options.keyboard_offset,
            configured_top: options.top_offset,
            measured_top: None,
            animate_inset: options.use_animated_container,
            bottom_inset: 0.0,
            last_issued: None,
        }
    }

    /// Configured top offset, else the container's measured window top.
    pub fn top_offset(&self) -> f32 {
        self.configured_top.or(self.measured_top).unwrap_or(0.0)
    }

    pub fn set_measured_top(&mut self, top: Option<f32>) {
        self.measured_top = top;
    }

    pub fn bottom_inset(&self) -> f32 {
        self.bottom_inset
    }

    pub fn last_issued(&self) -> Option<ScrollTarget> {
        self.last_issued
    }

    pub fn caret_bottom_offset(content_height: f32, caret_top: f32) -> f32 {
        (content_height - caret_top).max(0.0)
    }

    pub fn target(&self, widget: WidgetHandle, caret_bottom: f32) -> ScrollTarget {
        ScrollTarget {
            widget,
            vertical_offset: self.top_offset() + self.keyboard_offset - caret_bottom,
        }
    }

    /// Forgets the last target; a newly shown keyboard always gets a scroll.
    pub fn keyboard_appeared(&mut self) {
        self.last_issued = None;
    }

    /// Turns a target into a scroll effect, unless an identical target was
    /// already issued and `force` is not set.
    pub fn issue(
        &mut self,
        target: ScrollTarget,
        keyboard_top: Option<f32>,
        force: bool,
    ) -> Option<Effect> {
        if !force && self.last_issued == Some(target) {
            return None;
        }
        self.last_issued = Some(target);
        Some(Effect::ScrollToKeyboard {
            target,
            keyboard_top,
            animated: true,
        })
    }

    /// Grows the bottom inset after momentum settles with content pinned
    /// above the keyboard, so the blank space below stays reachable.
    pub fn settle_momentum(
        &mut self,
        visible_height: f32,
        offset_y: f32,
        content_height: f32,
    ) -> Option<Effect> {
        let inset = (self.bottom_inset + visible_height + offset_y - content_height).max(0.0);
        if inset == self.bottom_inset {
            return None;
        }
        self.bottom_inset = inset;
        Some(Effect::SetBottomInset {
            inset,
            animated: self.animate_inset,
        })
    }

    /// Drops the bottom inset. Returns the reset effect only if there was an
    /// inset to drop.
    pub fn reset_inset(&mut self) -> Option<Effect> {
        if self.bottom_inset == 0.0 {
            return None;
        }
        self.bottom_inset = 0.0;
        Some(Effect::SetBottomInset {
            inset: 0.0,
            animated: self.animate_inset,
        })
    }
}

impl Coordinator {
    /// Scrolls the focused widget's caret line above the keyboard.
    ///
    /// A no-op while the keyboard is hidden, nothing is focused, the container
    /// is not mounted, or the focused widget lives outside the container. For
    /// a caret above the last line of a multiline field the scroll waits for a
    /// probe measurement; the returned effects then include
    /// [`Effect::ShowProbe`] and the scroll itself comes out of a later
    /// [`Coordinator::tick`].
    pub fn request_scroll(&mut self, force: bool) -> Vec<Effect> {
        self.plan_scroll(force);
        std::mem::take(&mut self.effects)
    }

    pub fn last_scroll_target(&self) -> Option<ScrollTarget> {
        self.planner.last_issued()
    }

    fn scroll_subject(&self) -> Option<WidgetHandle> {
        let focus = self.registry.focus_state();
        if !focus.keyboard_visible {
            tracing::trace!("Keyboard hidden, not scrolling");
            return None;
        }
        let widget = focus.current_focus?;
        if !self.container_mounted {
            tracing::trace!("Container not mounted, not scrolling");
            return None;
        }
        if !self.registry.get(widget)?.in_container {
            debug!(%widget, "Focused widget is outside the container");
            return None;
        }
        Some(widget)
    }

    pub(crate) fn plan_scroll(&mut self, force: bool) {
        let Some(widget) = self.scroll_subject() else {
            return;
        };
        self.flush_selection(widget);

        let Some(info) = self.registry.get(widget) else {
            return;
        };
        let prefix = info
            .caret_prefix()
            .filter(|_| info.multiline && info.content_width > 0.0);

        match prefix {
            None => {
                self.drop_pending_scroll();
                self.issue_scroll(widget, 0.0, force);
            },
            Some(prefix) => {
                let content_height = info.content_height;
                let measurement = self.probe.measure(
                    prefix,
                    info.content_width,
                    &mut self.scheduler,
                    &mut self.effects,
                );
                debug!(%widget, chars = prefix.chars().count(), "Measuring caret line");
                self.pending_scroll = Some(PendingScroll {
                    widget,
                    content_height,
                    force,
                    measurement,
                });
            },
        }
    }

    /// Forgets a scroll still waiting on its measurement. The probe is only
    /// cancelled while it is still measuring for that scroll.
    fn drop_pending_scroll(&mut self) {
        let Some(pending) = self.pending_scroll.take() else {
            return;
        };
        tracing::trace!(widget = %pending.widget, "Dropping outdated caret measurement");
        if self.probe.in_flight() == Some(pending.measurement.id()) {
            self.probe.cancel(&mut self.scheduler, &mut self.effects);
        }
    }

    /// Continues a scroll whose caret measurement may have resolved.
    pub(crate) fn resume_scroll(&mut self) {
        let Some(mut pending) = self.pending_scroll.take() else {
            return;
        };
        match pending.measurement.try_take() {
            Ok(Some(caret_top)) => {
                if self.scroll_subject() != Some(pending.widget) {
                    debug!(widget = %pending.widget, "Focus moved while measuring, dropping scroll");
                    return;
                }
                let caret_bottom =
                    ScrollPlanner::caret_bottom_offset(pending.content_height, caret_top);
                self.issue_scroll(pending.widget, caret_bottom, pending.force);
            },
            Ok(None) => self.pending_scroll = Some(pending),
            Err(ProbeError::Superseded) => {
                tracing::trace!(widget = %pending.widget, "Scroll measurement superseded");
            },
        }
    }

    fn issue_scroll(&mut self, widget: WidgetHandle, caret_bottom: f32, force: bool) {
        let target = self.planner.target(widget, caret_bottom);
        let keyboard_top = self.registry.focus_state().keyboard_top_edge;
        match self.planner.issue(target, keyboard_top, force) {
            Some(effect) => {
                debug!(
                    %widget,
                    offset = target.vertical_offset,
                    caret_bottom,
                    force,
                    "Scrolling to keyboard"
                );
                self.effects.push(effect);
            },
            None => tracing::trace!(%widget, "Scroll target already satisfied"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn planner(keyboard_offset: f32, top_offset: Option<f32>) -> ScrollPlanner {
        ScrollPlanner::new(&Options {
            keyboard_offset,
            top_offset,
            ..Options::default()
        })
    }

    #[test]
    fn caret_bottom_offset_never_negative() {
        assert_eq!(ScrollPlanner::caret_bottom_offset(40.0, 20.0), 20.0);
        assert_eq!(ScrollPlanner::caret_bottom_offset(40.0, 60.0), 0.0);
    }

    #[test]
    fn target_subtracts_caret_bottom() {
        let planner = planner(40.0, Some(100.0));
        let target = planner.target(WidgetHandle::from_raw(1), 20.0);
        assert_eq!(target.vertical_offset, 120.0);
    }

    #[test]
    fn configured_top_wins_over_measured() {
        let mut configured = planner(40.0, Some(100.0));
        configured.set_measured_top(Some(64.0));
        assert_eq!(configured.top_offset(), 100.0);

        let mut measured = planner(40.0, None);
        assert_eq!(measured.top_offset(), 0.0);
        measured.set_measured_top(Some(64.0));
        assert_eq!(measured.top_offset(), 64.0);
    }

    #[test]
    fn identical_target_is_skipped_unless_forced() {
        let mut planner = planner(40.0, None);
        let target = planner.target(WidgetHandle::from_raw(1), 0.0);

        assert!(planner.issue(target, None, false).is_some());
        assert!(planner.issue(target, None, false).is_none());
        assert!(planner.issue(target, None, true).is_some());

        planner.keyboard_appeared();
        assert!(planner.issue(target, None, false).is_some());
    }

    #[test]
    fn momentum_grows_inset_and_reset_clears_it() {
        let mut planner = planner(40.0, None);

        // Visible window overshoots the content by 30.
        assert_eq!(
            planner.settle_momentum(500.0, 330.0, 800.0),
            Some(Effect::SetBottomInset {
                inset: 30.0,
                animated: false,
            })
        );
        assert_eq!(planner.settle_momentum(500.0, 300.0, 800.0), None);
        assert_eq!(planner.bottom_inset(), 30.0);

        assert_eq!(
            planner.reset_inset(),
            Some(Effect::SetBottomInset {
                inset: 0.0,
                animated: false,
            })
        );
        assert_eq!(planner.reset_inset(), None);
    }

    #[test]
    fn inset_never_goes_negative() {
        let mut planner = planner(40.0, None);
        assert_eq!(planner.settle_momentum(500.0, 0.0, 800.0), None);
        assert_eq!(planner.bottom_inset(), 0.0);
    }
}
