//! Opaque identity for focusable text-entry widgets.
//!
//! The host decides what the raw value means (a native view tag, a node id);
//! within this crate it is only ever used as a key.

use serde::Deserialize;
use std::fmt;

/// Stable identity of a text-entry widget for its whole mounted lifetime.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(transparent)]
pub struct WidgetHandle(u64);

impl WidgetHandle {
    #[inline]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn as_raw(self) -> u64 {
        self.0
    }
}

impl From<u64> for WidgetHandle {
    #[inline]
    fn from(raw: u64) -> Self {
        Self::from_raw(raw)
    }
}

impl From<u32> for WidgetHandle {
    #[inline]
    fn from(raw: u32) -> Self {
        Self::from_raw(u64::from(raw))
    }
}

impl fmt::Display for WidgetHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handles_compare_by_raw_value() {
        assert_eq!(WidgetHandle::from_raw(7), WidgetHandle::from(7u32));
        assert_ne!(WidgetHandle::from_raw(7), WidgetHandle::from_raw(8));
    }

    #[test]
    fn display_uses_tag_notation() {
        assert_eq!(WidgetHandle::from_raw(12).to_string(), "#12");
    }
}
