//! The keyboard-aware autoscroll coordinator.
//!
//! [`Coordinator`] owns every piece of state the subsystem needs and reacts to
//! three kinds of input from the host:
//!
//! - [`Coordinator::handle`] for raw widget, keyboard and container callbacks,
//! - [`Coordinator::tick`] once per frame or timer turn, which runs deferred
//!   work,
//! - direct calls such as [`Coordinator::request_scroll`] or
//!   [`Coordinator::scroll_to`].
//!
//! Each returns the [`Effect`]s the host must execute, in order.
//!
//! # Ordering
//!
//! The host does not order selection and content-size reports consistently.
//! Selections are held for `selection_defer_ticks`, content sizes are debounced
//! for longer, and any selection still pending is applied before scroll
//! planning reads the caret. A focus scroll owed to a multiline field runs at
//! most once, from whichever of the first selection or the fallback timer gets
//! there first.

use crate::{
    arbiter::TouchArbiter,
    config::Options,
    effects::Effect,
    event::{Event, RawEvent},
    planner::{PendingScroll, ScrollPlanner},
    platform::{EventNormalizer, FocusScroll, Platform, PlatformProfile},
    probe::{CaretProbe, Measurement, ProbeId},
    registry::{FocusState, InputRegistry},
    scheduler::{Debouncer, Delay, Scheduler, TaskId},
    widget::WidgetHandle,
};
use rustc_hash::FxHashMap;
use std::time::Duration;
use tracing::debug;

/// Deferred work, interpreted by [`Coordinator::tick`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Task {
    ApplySelection(WidgetHandle),
    FlushContentSize(WidgetHandle),
    FocusFallback(WidgetHandle),
    ProbeSettled(ProbeId),
    ScrollToEnd,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct PendingSelection {
    caret_index: usize,
    snapshot_text: Option<String>,
}

pub struct Coordinator {
    pub(crate) options: Options,
    pub(crate) normalizer: EventNormalizer,
    pub(crate) registry: InputRegistry,
    pub(crate) scheduler: Scheduler<Task>,
    pub(crate) selections: Debouncer<WidgetHandle, PendingSelection>,
    pub(crate) content_sizes: Debouncer<WidgetHandle, (f32, f32)>,
    pub(crate) focus_fallbacks: FxHashMap<WidgetHandle, TaskId>,
    pub(crate) probe: CaretProbe,
    pub(crate) planner: ScrollPlanner,
    pub(crate) pending_scroll: Option<PendingScroll>,
    pub(crate) arbiter: TouchArbiter,
    pub(crate) container_mounted: bool,
    pub(crate) effects: Vec<Effect>,
}

impl std::fmt::Debug for Coordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Coordinator")
            .field("platform", &self.normalizer.profile().name())
            .field("focus", self.registry.focus_state())
            .field("container_mounted", &self.container_mounted)
            .field("bottom_inset", &self.planner.bottom_inset())
            .field("measuring", &self.probe.is_busy())
            .finish_non_exhaustive()
    }
}

impl Coordinator {
    /// Creates a coordinator for one platform profile.
    ///
    /// The container starts unmounted; scrolling is a no-op until the host
    /// reports [`RawEvent::ContainerMounted`].
    pub fn new(options: Options, profile: Box<dyn PlatformProfile>) -> Self {
        let timing = options.timing;
        let arbiter = TouchArbiter::new(profile.intercepts_touches());
        Self {
            normalizer: EventNormalizer::new(profile),
            registry: InputRegistry::new(),
            scheduler: Scheduler::new(),
            selections: Debouncer::new(timing.selection_defer_ticks),
            content_sizes: Debouncer::new(timing.content_size_debounce_ticks),
            focus_fallbacks: FxHashMap::default(),
            probe: CaretProbe::new(
                timing.probe_settle_ticks,
                options.multiline_measure_style.clone(),
            ),
            planner: ScrollPlanner::new(&options),
            pending_scroll: None,
            arbiter,
            container_mounted: false,
            effects: Vec::new(),
            options,
        }
    }

    pub fn for_platform(options: Options, platform: Platform) -> Self {
        Self::new(options, platform.profile())
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn profile(&self) -> &dyn PlatformProfile {
        self.normalizer.profile()
    }

    pub fn registry(&self) -> &InputRegistry {
        &self.registry
    }

    pub fn focus_state(&self) -> &FocusState {
        self.registry.focus_state()
    }

    pub fn bottom_inset(&self) -> f32 {
        self.planner.bottom_inset()
    }

    pub fn is_measuring(&self) -> bool {
        self.probe.is_busy()
    }

    pub fn is_container_mounted(&self) -> bool {
        self.container_mounted
    }

    /// Normalizes and processes one raw host notification.
    pub fn handle(&mut self, raw: RawEvent) -> Vec<Effect> {
        if let Some(event) = self.normalizer.normalize(raw) {
            self.process(event);
        }
        self.take_effects()
    }

    /// Processes one canonical event.
    pub fn dispatch(&mut self, event: Event) -> Vec<Effect> {
        self.process(event);
        self.take_effects()
    }

    /// Starts a new host tick at time `now` and runs everything now due.
    pub fn tick(&mut self, now: Duration) -> Vec<Effect> {
        self.scheduler.advance(now);
        while let Some((id, task)) = self.scheduler.pop_due() {
            self.run_task(id, task);
        }
        self.take_effects()
    }

    /// Forwarded to the scroll container.
    pub fn scroll_to(&mut self, y: f32, animated: bool) -> Vec<Effect> {
        if self.container_mounted {
            self.effects.push(Effect::ScrollTo { y, animated });
        }
        self.take_effects()
    }

    /// Forwarded to the scroll container.
    pub fn scroll_to_end(&mut self, animated: bool) -> Vec<Effect> {
        if self.container_mounted {
            self.effects.push(Effect::ScrollToEnd { animated });
        }
        self.take_effects()
    }

    /// Measures the rendered height of `prefix` at `width` with the hidden
    /// probe. Supersedes any measurement in flight, including one a scroll
    /// request is waiting on.
    pub fn measure_caret_height(&mut self, prefix: &str, width: f32) -> (Measurement, Vec<Effect>) {
        let measurement =
            self.probe
                .measure(prefix, width, &mut self.scheduler, &mut self.effects);
        (measurement, self.take_effects())
    }

    fn take_effects(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.effects)
    }

    fn process(&mut self, event: Event) {
        tracing::trace!(?event, "Processing event");
        match event {
            Event::FocusGained {
                widget,
                multiline,
                text,
                in_container,
            } => self.on_focus(widget, multiline, text, in_container),

            Event::FocusLost { widget } => {
                if self.registry.clear_focus(widget) {
                    self.cancel_focus_fallback(widget);
                } else {
                    debug!(%widget, "Ignoring stale blur");
                }
            },

            Event::TextChanged { widget, text } => {
                if self.accepts(widget) {
                    self.registry.record_text(widget, text);
                }
            },

            Event::SelectionChanged {
                widget,
                caret_index,
                snapshot_text,
            } => {
                if !self.accepts(widget) {
                    return;
                }
                let selection = PendingSelection {
                    caret_index,
                    snapshot_text,
                };
                self.selections.trigger(
                    widget,
                    selection,
                    &mut self.scheduler,
                    Task::ApplySelection(widget),
                );
            },

            Event::ContentSizeChanged {
                widget,
                width,
                height,
                snapshot_text,
            } => {
                if !self.accepts(widget) {
                    return;
                }
                self.registry.seed_text(widget, snapshot_text);
                self.content_sizes.trigger(
                    widget,
                    (width, height),
                    &mut self.scheduler,
                    Task::FlushContentSize(widget),
                );
            },

            Event::KeyboardShown { top_edge } => {
                self.registry.keyboard_shown(top_edge);
                self.planner.keyboard_appeared();
                self.plan_scroll(false);
            },

            Event::KeyboardHidden => {
                self.registry.keyboard_hidden();
                self.abandon_pending_scroll();
                if let Some(effect) = self.planner.reset_inset() {
                    self.effects.push(effect);
                    self.scheduler.schedule(Delay::Ticks(1), Task::ScrollToEnd);
                }
            },

            Event::ScrollSettled {
                visible_height,
                offset_y,
                content_height,
            } => {
                if self.registry.focus_state().keyboard_visible {
                    let effect =
                        self.planner
                            .settle_momentum(visible_height, offset_y, content_height);
                    self.effects.extend(effect);
                }
            },

            Event::TouchDown { target, kind } => {
                let focused = self.registry.focused();
                if self.arbiter.touch_down(target, kind, focused) {
                    self.effects.push(Effect::ClaimTouch);
                }
            },

            Event::TouchMove => self.arbiter.touch_move(),

            Event::TouchUp => {
                if let Some(widget) = self.arbiter.touch_up() {
                    self.effects.push(Effect::FocusWidget(widget));
                }
            },

            Event::ProbeMeasured { height } => {
                self.probe
                    .report(height, &mut self.scheduler, Task::ProbeSettled);
            },

            Event::ContainerMounted { window_top } => {
                self.container_mounted = true;
                self.planner.set_measured_top(window_top);
            },

            Event::ContainerUnmounted => {
                self.container_mounted = false;
                self.abandon_pending_scroll();
            },

            Event::WidgetUnmounted { widget } => self.on_widget_unmounted(widget),
        }
    }

    fn on_focus(
        &mut self,
        widget: WidgetHandle,
        multiline: bool,
        text: Option<String>,
        in_container: bool,
    ) {
        if let Some(previous) = self.registry.set_focus(widget) {
            if previous != widget {
                self.cancel_focus_fallback(previous);
            }
        }
        let info = self.registry.get_or_create(widget);
        info.multiline = multiline;
        info.in_container = in_container;
        self.registry.seed_text(widget, text);

        match self.normalizer.profile().focus_scroll(multiline) {
            FocusScroll::Immediate => self.plan_scroll(false),
            FocusScroll::AwaitSelection => {
                self.registry.set_pending_focus_scroll(widget, true);
                self.cancel_focus_fallback(widget);
                let fallback = self.scheduler.schedule(
                    Delay::Timeout(self.options.timing.focus_fallback()),
                    Task::FocusFallback(widget),
                );
                self.focus_fallbacks.insert(widget, fallback);
            },
            FocusScroll::Deferred => {},
        }
    }

    fn on_widget_unmounted(&mut self, widget: WidgetHandle) {
        self.registry.evict(widget);
        self.selections.cancel(widget, &mut self.scheduler);
        self.content_sizes.cancel(widget, &mut self.scheduler);
        self.cancel_focus_fallback(widget);
        if self
            .pending_scroll
            .as_ref()
            .is_some_and(|pending| pending.widget == widget)
        {
            self.abandon_pending_scroll();
        }
    }

    /// Late reports for an unmounted widget are dropped until it is focused
    /// again.
    fn accepts(&self, widget: WidgetHandle) -> bool {
        if self.registry.is_unmounted(widget) {
            debug!(%widget, "Ignoring report for unmounted widget");
            return false;
        }
        true
    }

    fn cancel_focus_fallback(&mut self, widget: WidgetHandle) {
        if let Some(id) = self.focus_fallbacks.remove(&widget) {
            self.scheduler.cancel(id);
        }
    }

    fn abandon_pending_scroll(&mut self) {
        self.pending_scroll = None;
        self.probe.cancel(&mut self.scheduler, &mut self.effects);
    }

    /// Applies a pending selection for `widget` ahead of its scheduled tick.
    ///
    /// An owed focus scroll is consumed without running, since the caller is
    /// about to scroll anyway.
    pub(crate) fn flush_selection(&mut self, widget: WidgetHandle) {
        if let Some(selection) = self.selections.flush(widget, &mut self.scheduler) {
            self.apply_selection(widget, selection);
            self.registry.take_pending_focus_scroll(widget);
        }
    }

    fn apply_selection(&mut self, widget: WidgetHandle, selection: PendingSelection) {
        self.registry
            .record_selection(widget, selection.caret_index);
        self.registry.seed_text(widget, selection.snapshot_text);
    }

    fn run_task(&mut self, id: TaskId, task: Task) {
        match task {
            Task::ApplySelection(widget) => {
                let Some(selection) = self.selections.take(widget, id) else {
                    return;
                };
                self.apply_selection(widget, selection);
                if self.registry.take_pending_focus_scroll(widget) {
                    self.cancel_focus_fallback(widget);
                    debug!(%widget, "Selection arrived, running owed focus scroll");
                    self.plan_scroll(false);
                }
            },

            Task::FlushContentSize(widget) => {
                let Some((width, height)) = self.content_sizes.take(widget, id) else {
                    return;
                };
                self.flush_selection(widget);
                self.registry.record_content_size(widget, width, height);
                if self
                    .registry
                    .get(widget)
                    .is_some_and(|info| info.multiline)
                {
                    self.plan_scroll(true);
                }
            },

            Task::FocusFallback(widget) => {
                if self.focus_fallbacks.get(&widget) != Some(&id) {
                    return;
                }
                self.focus_fallbacks.remove(&widget);
                if self.registry.focus_state().keyboard_visible
                    && self.registry.take_pending_focus_scroll(widget)
                {
                    debug!(%widget, "No selection before fallback, running owed focus scroll");
                    self.plan_scroll(false);
                }
            },

            Task::ProbeSettled(probe) => {
                if self.probe.settle(probe, id, &mut self.effects).is_some() {
                    self.resume_scroll();
                }
            },

            Task::ScrollToEnd => {
                if self.container_mounted {
                    self.effects.push(Effect::ScrollToEnd { animated: true });
                }
            },
        }
    }
}
