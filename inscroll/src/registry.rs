//! Focus and per-widget input state.
//!
//! [`InputRegistry`] is the single source of truth for which widget is focused,
//! whether the keyboard is up, and what is known about each text entry's text,
//! caret and laid-out size. Entries are created on the first event that
//! mentions a widget and evicted only when the widget unmounts; blur keeps them
//! so caret metadata is still there on refocus.

use crate::widget::WidgetHandle;
use rustc_hash::{FxHashMap, FxHashSet};

/// What the coordinator knows about one text entry.
#[derive(Clone, Debug, PartialEq)]
pub struct InputInfo {
    /// Last known text, from props, change events or selection snapshots.
    pub text: Option<String>,

    /// Caret position as a character offset into `text`.
    pub caret_index: Option<usize>,

    /// Laid-out content size reported by the widget.
    pub content_width: f32,
    pub content_height: f32,

    /// A focus scroll is owed and has not run yet.
    pub pending_focus_scroll: bool,

    /// Derived: the caret is on the last line (or nothing is known about it).
    pub caret_at_last_line: bool,

    pub multiline: bool,

    /// Whether the widget lives inside the managed scroll container.
    pub in_container: bool,
}

impl Default for InputInfo {
    fn default() -> Self {
        Self {
            text: None,
            caret_index: None,
            content_width: 0.0,
            content_height: 0.0,
            pending_focus_scroll: false,
            caret_at_last_line: true,
            multiline: false,
            in_container: true,
        }
    }
}

impl InputInfo {
    /// Text before the caret, or `None` when the caret is on the last line.
    ///
    /// A caret past the end of a stale `text` counts as the last line.
    pub fn caret_prefix(&self) -> Option<&str> {
        if self.caret_at_last_line {
            return None;
        }
        let text = self.text.as_deref()?;
        let caret = self.caret_index?;
        text.char_indices()
            .nth(caret)
            .map(|(byte_index, _)| &text[..byte_index])
    }

    fn refresh_caret_line(&mut self) {
        self.caret_at_last_line = match (self.text.as_deref(), self.caret_index) {
            (Some(text), Some(caret)) if !text.is_empty() => caret >= text.chars().count(),
            _ => true,
        };
    }
}

/// Coordinator-global focus and keyboard state.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FocusState {
    pub current_focus: Option<WidgetHandle>,
    pub keyboard_visible: bool,
    pub keyboard_top_edge: Option<f32>,
}

#[derive(Clone, Debug, Default)]
pub struct InputRegistry {
    inputs: FxHashMap<WidgetHandle, InputInfo>,
    /// Evicted widgets; cleared again when one of them regains focus.
    unmounted: FxHashSet<WidgetHandle>,
    focus: FocusState,
}

impl InputRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the entry for `widget`, creating an empty one if needed.
    pub fn get_or_create(&mut self, widget: WidgetHandle) -> &mut InputInfo {
        self.inputs.entry(widget).or_default()
    }

    pub fn get(&self, widget: WidgetHandle) -> Option<&InputInfo> {
        self.inputs.get(&widget)
    }

    pub fn contains(&self, widget: WidgetHandle) -> bool {
        self.inputs.contains_key(&widget)
    }

    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }

    pub fn focus_state(&self) -> &FocusState {
        &self.focus
    }

    pub fn focused(&self) -> Option<WidgetHandle> {
        self.focus.current_focus
    }

    pub fn is_focused(&self, widget: WidgetHandle) -> bool {
        self.focus.current_focus == Some(widget)
    }

    /// Moves focus to `widget` and returns the previously focused widget.
    pub fn set_focus(&mut self, widget: WidgetHandle) -> Option<WidgetHandle> {
        self.unmounted.remove(&widget);
        self.get_or_create(widget);
        self.focus.current_focus.replace(widget)
    }

    /// Clears focus if `widget` still holds it.
    ///
    /// A blur that arrives after another widget already gained focus is stale
    /// and leaves the newer focus alone. Returns whether focus was cleared.
    pub fn clear_focus(&mut self, widget: WidgetHandle) -> bool {
        if self.focus.current_focus != Some(widget) {
            return false;
        }
        self.focus.current_focus = None;
        if let Some(info) = self.inputs.get_mut(&widget) {
            info.pending_focus_scroll = false;
        }
        true
    }

    pub fn record_text(&mut self, widget: WidgetHandle, text: String) {
        let info = self.get_or_create(widget);
        info.text = Some(text);
        info.refresh_caret_line();
    }

    /// Fills in text only when nothing is known yet.
    pub fn seed_text(&mut self, widget: WidgetHandle, text: Option<String>) {
        let info = self.get_or_create(widget);
        if info.text.is_none() && text.is_some() {
            info.text = text;
            info.refresh_caret_line();
        }
    }

    pub fn record_selection(&mut self, widget: WidgetHandle, caret_index: usize) {
        let info = self.get_or_create(widget);
        info.caret_index = Some(caret_index);
        info.refresh_caret_line();
    }

    pub fn record_content_size(&mut self, widget: WidgetHandle, width: f32, height: f32) {
        let info = self.get_or_create(widget);
        info.content_width = width;
        info.content_height = height;
    }

    pub fn set_pending_focus_scroll(&mut self, widget: WidgetHandle, pending: bool) {
        self.get_or_create(widget).pending_focus_scroll = pending;
    }

    /// Clears the owed focus scroll, returning whether it was still owed.
    pub fn take_pending_focus_scroll(&mut self, widget: WidgetHandle) -> bool {
        match self.inputs.get_mut(&widget) {
            Some(info) => std::mem::take(&mut info.pending_focus_scroll),
            None => false,
        }
    }

    /// Drops everything known about an unmounted widget.
    pub fn evict(&mut self, widget: WidgetHandle) -> Option<InputInfo> {
        if self.focus.current_focus == Some(widget) {
            self.focus.current_focus = None;
        }
        self.unmounted.insert(widget);
        self.inputs.remove(&widget)
    }

    /// Whether `widget` was evicted and has not been focused since.
    pub fn is_unmounted(&self, widget: WidgetHandle) -> bool {
        self.unmounted.contains(&widget)
    }

    pub fn keyboard_shown(&mut self, top_edge: Option<f32>) {
        self.focus.keyboard_visible = true;
        self.focus.keyboard_top_edge = top_edge;
    }

    pub fn keyboard_hidden(&mut self) {
        self.focus.keyboard_visible = false;
        self.focus.keyboard_top_edge = None;
    }
}
