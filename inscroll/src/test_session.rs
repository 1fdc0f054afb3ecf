//! Fluent test harness for the coordinator.
//!
//! A [`TestSession`] plays the host: it sends raw events, advances the clock one
//! tick at a time and keeps every effect the coordinator returned. It starts
//! on iOS with the container already mounted.
//!
//! ```rust,ignore
//! Coordinator::test()
//!     .keyboard_shown(500.0)
//!     .focus(1)
//!     .assert_last_target(1, 40.0);
//! ```

use crate::{
    config::Options,
    coordinator::Coordinator,
    effects::{Effect, ScrollTarget},
    event::RawEvent,
    platform::Platform,
    widget::WidgetHandle,
};
use std::time::Duration;

type ProbeAnswer = Box<dyn FnMut(&str, f32) -> f32>;

impl Coordinator {
    pub fn test() -> TestSession {
        TestSession::new()
    }
}

pub struct TestSession {
    coordinator: Coordinator,
    now: Duration,
    last_effects: Vec<Effect>,
    history: Vec<Effect>,
    probe_answer: Option<ProbeAnswer>,
}

impl TestSession {
    pub fn new() -> Self {
        Self::build(Options::default(), Platform::Ios)
    }

    fn build(options: Options, platform: Platform) -> Self {
        let mut session = Self {
            coordinator: Coordinator::for_platform(options, platform),
            now: Duration::ZERO,
            last_effects: Vec::new(),
            history: Vec::new(),
            probe_answer: None,
        };
        session.send(RawEvent::ContainerMounted { window_top: None });
        session
    }

    /// Rebuilds the session with `options`. Call before sending events.
    pub fn with_options(self, options: Options) -> Self {
        let platform = self.platform();
        Self::build(options, platform)
    }

    /// Rebuilds the session on Android. Call before sending events.
    pub fn android(self) -> Self {
        let options = self.coordinator.options().clone();
        Self::build(options, Platform::Android)
    }

    /// Answers every probe request with `answer(text, width)`, as a host
    /// laying out the hidden field would.
    pub fn answer_probes(mut self, answer: impl FnMut(&str, f32) -> f32 + 'static) -> Self {
        self.probe_answer = Some(Box::new(answer));
        self
    }

    fn platform(&self) -> Platform {
        match self.coordinator.profile().name() {
            "android" => Platform::Android,
            _ => Platform::Ios,
        }
    }

    fn record(&mut self, effects: Vec<Effect>) {
        self.history.extend(effects.iter().cloned());
        self.last_effects.extend(effects);
    }

    fn answer_pending_probes(&mut self) {
        let Some(answer) = self.probe_answer.as_mut() else {
            return;
        };
        let heights: Vec<f32> = self
            .last_effects
            .iter()
            .filter_map(|effect| match effect {
                Effect::ShowProbe { text, width, .. } => Some(answer(text, *width)),
                _ => None,
            })
            .collect();
        for height in heights {
            let effects = self
                .coordinator
                .handle(RawEvent::ProbeContentSize { height });
            self.record(effects);
        }
    }

    fn send(&mut self, raw: RawEvent) {
        self.last_effects.clear();
        let effects = self.coordinator.handle(raw);
        self.record(effects);
        self.answer_pending_probes();
    }

    /// Sends a raw host event.
    pub fn raw(mut self, raw: RawEvent) -> Self {
        self.send(raw);
        self
    }

    pub fn focus(self, widget: u64) -> Self {
        self.raw(RawEvent::Focus {
            widget: widget.into(),
            multiline: false,
            value: None,
            default_value: None,
            in_container: true,
        })
    }

    pub fn focus_multiline(self, widget: u64, text: &str) -> Self {
        self.raw(RawEvent::Focus {
            widget: widget.into(),
            multiline: true,
            value: Some(text.to_string()),
            default_value: None,
            in_container: true,
        })
    }

    pub fn blur(self, widget: u64) -> Self {
        self.raw(RawEvent::Blur {
            widget: widget.into(),
        })
    }

    pub fn change(self, widget: u64, text: &str) -> Self {
        self.raw(RawEvent::Change {
            widget: widget.into(),
            text: text.to_string(),
        })
    }

    pub fn selection(self, widget: u64, end: usize) -> Self {
        self.raw(RawEvent::SelectionChange {
            widget: widget.into(),
            end,
            value: None,
        })
    }

    pub fn content_size(self, widget: u64, width: f32, height: f32) -> Self {
        self.raw(RawEvent::ContentSizeChange {
            widget: widget.into(),
            width,
            height,
            value: None,
        })
    }

    /// Sends the platform's keyboard show notification.
    pub fn keyboard_shown(self, top_edge: f32) -> Self {
        let name = self.coordinator.profile().keyboard_show();
        self.raw(RawEvent::Keyboard {
            name,
            top_edge: Some(top_edge),
        })
    }

    /// Sends the platform's keyboard hide notification.
    pub fn keyboard_hidden(self) -> Self {
        let name = self.coordinator.profile().keyboard_hide();
        self.raw(RawEvent::Keyboard {
            name,
            top_edge: None,
        })
    }

    pub fn momentum(self, layout_height: f32, offset_y: f32, content_height: f32) -> Self {
        self.raw(RawEvent::MomentumScrollEnd {
            layout_height,
            offset_y,
            content_height,
        })
    }

    pub fn probe_size(self, height: f32) -> Self {
        self.raw(RawEvent::ProbeContentSize { height })
    }

    pub fn touch_start(self, widget: u64, view_class: &str) -> Self {
        self.raw(RawEvent::TouchStart {
            target: Some(widget.into()),
            view_class: Some(view_class.to_string()),
        })
    }

    pub fn touch_move(self) -> Self {
        self.raw(RawEvent::TouchMove)
    }

    pub fn touch_end(self) -> Self {
        self.raw(RawEvent::TouchEnd)
    }

    pub fn unmount_widget(self, widget: u64) -> Self {
        self.raw(RawEvent::WidgetUnmounted {
            widget: widget.into(),
        })
    }

    pub fn unmount_container(self) -> Self {
        self.raw(RawEvent::ContainerUnmounted)
    }

    /// Asks for a scroll directly, outside of any event.
    pub fn request_scroll(mut self, force: bool) -> Self {
        self.last_effects.clear();
        let effects = self.coordinator.request_scroll(force);
        self.record(effects);
        self.answer_pending_probes();
        self
    }

    /// Advances one tick of the platform's tick source.
    pub fn tick(self) -> Self {
        let interval = self.coordinator.profile().tick_source().interval();
        self.advance(interval)
    }

    /// Advances `frames` ticks. `last_effects` covers all of them.
    pub fn ticks(mut self, frames: u32) -> Self {
        let mut collected = Vec::new();
        for _ in 0..frames {
            self = self.tick();
            collected.append(&mut self.last_effects);
        }
        self.last_effects = collected;
        self
    }

    /// Advances the clock by `ms` in a single tick.
    pub fn advance_ms(self, ms: u64) -> Self {
        self.advance(Duration::from_millis(ms))
    }

    fn advance(mut self, by: Duration) -> Self {
        self.now += by;
        self.last_effects.clear();
        let effects = self.coordinator.tick(self.now);
        self.record(effects);
        self.answer_pending_probes();
        self
    }

    /// Effects produced by the last step.
    pub fn last_effects(&self) -> &[Effect] {
        &self.last_effects
    }

    /// Every effect produced since the session started.
    pub fn effects(&self) -> &[Effect] {
        &self.history
    }

    pub fn scroll_targets(&self) -> Vec<ScrollTarget> {
        self.history
            .iter()
            .filter_map(|effect| match effect {
                Effect::ScrollToKeyboard { target, .. } => Some(*target),
                _ => None,
            })
            .collect()
    }

    /// Texts the hidden probe was asked to render, in order.
    pub fn probes(&self) -> Vec<String> {
        self.history
            .iter()
            .filter_map(|effect| match effect {
                Effect::ShowProbe { text, .. } => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn coordinator(&self) -> &Coordinator {
        &self.coordinator
    }

    pub fn coordinator_mut(&mut self) -> &mut Coordinator {
        &mut self.coordinator
    }

    #[track_caller]
    pub fn assert_focus(self, widget: Option<u64>) -> Self {
        assert_eq!(
            self.coordinator.focus_state().current_focus,
            widget.map(WidgetHandle::from_raw),
            "Focus mismatch"
        );
        self
    }

    #[track_caller]
    pub fn assert_last_target(self, widget: u64, vertical_offset: f32) -> Self {
        let expected = ScrollTarget {
            widget: widget.into(),
            vertical_offset,
        };
        assert_eq!(
            self.scroll_targets().last(),
            Some(&expected),
            "Last scroll target mismatch, all effects: {:?}",
            self.history
        );
        self
    }

    #[track_caller]
    pub fn assert_scroll_count(self, expected: usize) -> Self {
        assert_eq!(
            self.scroll_targets().len(),
            expected,
            "Scroll count mismatch, all effects: {:?}",
            self.history
        );
        self
    }

    #[track_caller]
    pub fn assert_no_effects(self) -> Self {
        assert!(
            self.last_effects.is_empty(),
            "Expected no effects but got: {:?}",
            self.last_effects
        );
        self
    }

    #[track_caller]
    pub fn assert_has_effect(self, expected: Effect) -> Self {
        assert!(
            self.last_effects.contains(&expected),
            "Expected effect {:?} not found in {:?}",
            expected,
            self.last_effects
        );
        self
    }
}

impl Default for TestSession {
    fn default() -> Self {
        Self::new()
    }
}
