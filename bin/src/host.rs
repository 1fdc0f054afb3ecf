//! A stand-in for the view tree.
//!
//! Executes effects by describing them, and answers the hidden probe with a
//! fixed-metrics text layout so measurements can complete without a renderer.

use inscroll::{Effect, MeasureStyle, RawEvent};

const CHAR_WIDTH_RATIO: f32 = 0.5;
const DEFAULT_FONT_SIZE: f32 = 16.0;
const DEFAULT_LINE_HEIGHT: f32 = 20.0;

#[derive(Debug, Clone, PartialEq)]
pub struct SimulatedHost {
    char_width: f32,
    line_height: f32,
    padding_horizontal: f32,
    padding_vertical: f32,
}

impl Default for SimulatedHost {
    fn default() -> Self {
        Self::new(None)
    }
}

impl SimulatedHost {
    pub fn new(style: Option<&MeasureStyle>) -> Self {
        let style = style.cloned().unwrap_or_default();
        Self {
            char_width: style.font_size.unwrap_or(DEFAULT_FONT_SIZE) * CHAR_WIDTH_RATIO,
            line_height: style.line_height.unwrap_or(DEFAULT_LINE_HEIGHT),
            padding_horizontal: style.padding_horizontal.unwrap_or(0.0),
            padding_vertical: style.padding_vertical.unwrap_or(0.0),
        }
    }

    /// Height `text` takes when wrapped at `width`.
    pub fn measure(&self, text: &str, width: f32) -> f32 {
        let available = (width - 2.0 * self.padding_horizontal).max(self.char_width);
        let per_line = (available / self.char_width).floor().max(1.0) as usize;
        let lines: usize = text
            .split('\n')
            .map(|line| line.chars().count().div_ceil(per_line).max(1))
            .sum();
        lines as f32 * self.line_height + 2.0 * self.padding_vertical
    }

    /// Reacts to one effect, returning the events the real host would send
    /// back.
    pub fn execute(&self, effect: &Effect) -> Option<RawEvent> {
        match effect {
            Effect::ShowProbe { text, width, .. } => Some(RawEvent::ProbeContentSize {
                height: self.measure(text, *width),
            }),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_short_line_is_one_line_high() {
        let host = SimulatedHost::default();
        assert_eq!(host.measure("hello", 200.0), 20.0);
        assert_eq!(host.measure("", 200.0), 20.0);
    }

    #[test]
    fn newlines_and_wrapping_add_lines() {
        let host = SimulatedHost::default();
        assert_eq!(host.measure("hello\nworld", 200.0), 40.0);
        // 25 chars fit per line at 200 wide.
        assert_eq!(host.measure(&"x".repeat(30), 200.0), 40.0);
    }

    #[test]
    fn style_changes_metrics() {
        let host = SimulatedHost::new(Some(&MeasureStyle {
            font_size: Some(20.0),
            line_height: Some(24.0),
            padding_vertical: Some(4.0),
            ..MeasureStyle::default()
        }));
        assert_eq!(host.measure("hello", 200.0), 32.0);
    }

    #[test]
    fn probe_requests_get_answered() {
        let host = SimulatedHost::default();
        let reply = host.execute(&Effect::ShowProbe {
            text: "hello".to_string(),
            width: 200.0,
            style: None,
        });
        assert_eq!(reply, Some(RawEvent::ProbeContentSize { height: 20.0 }));
        assert_eq!(host.execute(&Effect::HideProbe), None);
    }
}
