//! Keyboard-aware autoscroll for text entry inside scroll containers.
//!
//! `inscroll` keeps the focused text field visible above an on-screen keyboard,
//! down to the caret line of multiline fields. It is a headless controller: the
//! host feeds it raw platform callbacks and frame ticks, and executes the
//! [`Effect`]s it returns against the real scroll container and widgets.
//!
//! ```rust,ignore
//! let mut coordinator = Coordinator::for_platform(Options::default(), Platform::Ios);
//! run(coordinator.handle(RawEvent::ContainerMounted { window_top: Some(64.0) }));
//!
//! // from the host's callbacks
//! run(coordinator.handle(raw_event));
//!
//! // once per animation frame
//! run(coordinator.tick(frame_time));
//! ```

mod arbiter;
pub mod config;
mod coordinator;
pub mod effects;
pub mod event;
mod planner;
pub mod platform;
pub mod probe;
pub mod registry;
pub mod scheduler;
mod widget;

#[cfg(any(test, feature = "test-support"))]
pub mod test_session;

pub use arbiter::TouchArbiter;
pub use config::{MeasureStyle, Options, Timing};
pub use coordinator::Coordinator;
pub use effects::{Effect, ScrollTarget};
pub use event::{Event, KeyboardNotification, RawEvent, TargetKind};
pub use planner::ScrollPlanner;
pub use platform::{Android, EventNormalizer, Ios, Platform, PlatformProfile};
pub use probe::{Measurement, ProbeError};
pub use registry::{FocusState, InputInfo, InputRegistry};
pub use widget::WidgetHandle;
