//! Focus transitions, the owed focus scroll and platform differences.

use inscroll::{Coordinator, KeyboardNotification, Options, RawEvent, WidgetHandle};

fn w(raw: u64) -> WidgetHandle {
    WidgetHandle::from_raw(raw)
}

#[test]
fn stale_blur_keeps_newer_focus() {
    Coordinator::test()
        .focus(1)
        .focus(2)
        .blur(1)
        .assert_focus(Some(2))
        .blur(2)
        .assert_focus(None);
}

#[test]
fn selection_runs_owed_focus_scroll_once() {
    Coordinator::test()
        .keyboard_shown(500.0)
        .focus_multiline(1, "hi")
        .assert_scroll_count(0)
        .selection(1, 2)
        .tick()
        .assert_last_target(1, 40.0)
        .assert_scroll_count(1)
        // The fallback was cancelled by the selection.
        .advance_ms(300)
        .assert_scroll_count(1)
        .selection(1, 1)
        .tick()
        .assert_scroll_count(1);
}

#[test]
fn fallback_runs_focus_scroll_without_selection() {
    Coordinator::test()
        .keyboard_shown(500.0)
        .focus_multiline(1, "hi")
        .ticks(2)
        .assert_scroll_count(0)
        .advance_ms(250)
        .assert_scroll_count(1)
        .selection(1, 2)
        .tick()
        .assert_scroll_count(1);
}

#[test]
fn fallback_before_keyboard_leaves_scroll_to_keyboard_show() {
    Coordinator::test()
        .focus_multiline(1, "hi")
        .advance_ms(300)
        .assert_scroll_count(0)
        .keyboard_shown(500.0)
        .assert_scroll_count(1)
        // Same target as the keyboard scroll.
        .selection(1, 2)
        .tick()
        .assert_scroll_count(1);
}

#[test]
fn blur_cancels_owed_focus_scroll() {
    Coordinator::test()
        .keyboard_shown(500.0)
        .focus_multiline(1, "hi")
        .blur(1)
        .advance_ms(300)
        .selection(1, 2)
        .tick()
        .assert_scroll_count(0);
}

#[test]
fn refocus_keeps_known_state() {
    let session = Coordinator::test()
        .focus_multiline(1, "hello\nworld")
        .selection(1, 5)
        .content_size(1, 200.0, 40.0)
        .ticks(2)
        .blur(1)
        .focus_multiline(1, "stale default")
        .assert_focus(Some(1));

    let info = session.coordinator().registry().get(w(1)).cloned().unwrap();
    assert_eq!(info.text.as_deref(), Some("hello\nworld"));
    assert_eq!(info.caret_index, Some(5));
    assert_eq!(info.content_height, 40.0);
    assert_eq!(info.caret_prefix(), Some("hello"));
}

#[test]
fn android_waits_for_did_show() {
    let session = Coordinator::test()
        .with_options(Options {
            top_offset: Some(100.0),
            ..Options::default()
        })
        .android()
        .answer_probes(|_, _| 20.0)
        .focus_multiline(1, "hello\nworld")
        .selection(1, 5)
        .content_size(1, 200.0, 40.0)
        .ticks(2)
        .assert_scroll_count(0)
        // Android never acts on the early notification.
        .raw(RawEvent::Keyboard {
            name: KeyboardNotification::WillShow,
            top_edge: Some(500.0),
        })
        .assert_no_effects()
        .keyboard_shown(500.0)
        .ticks(3)
        .assert_last_target(1, 120.0)
        .assert_scroll_count(1);

    assert!(session.coordinator().focus_state().keyboard_visible);
}

#[test]
fn android_focus_does_not_scroll() {
    Coordinator::test()
        .android()
        .keyboard_shown(500.0)
        .focus(1)
        .assert_scroll_count(0)
        .request_scroll(false)
        .assert_scroll_count(1);
}

#[test]
fn widget_outside_container_never_scrolls() {
    Coordinator::test()
        .keyboard_shown(500.0)
        .raw(RawEvent::Focus {
            widget: w(1),
            multiline: false,
            value: None,
            default_value: None,
            in_container: false,
        })
        .request_scroll(true)
        .assert_scroll_count(0)
        .assert_focus(Some(1));
}

#[test]
fn unmounted_container_never_scrolls() {
    Coordinator::test()
        .unmount_container()
        .keyboard_shown(500.0)
        .focus(1)
        .request_scroll(true)
        .assert_scroll_count(0)
        .raw(RawEvent::ContainerMounted {
            window_top: Some(64.0),
        })
        .request_scroll(false)
        .assert_last_target(1, 104.0);
}

#[test]
fn unmounted_widget_is_forgotten() {
    let session = Coordinator::test()
        .focus_multiline(1, "hello")
        .selection(1, 2)
        .unmount_widget(1)
        .tick()
        .assert_focus(None);

    assert!(!session.coordinator().registry().contains(w(1)));
}

#[test]
fn late_reports_do_not_revive_unmounted_widget() {
    let session = Coordinator::test()
        .focus_multiline(1, "hello")
        .unmount_widget(1)
        .change(1, "hello!")
        .selection(1, 6)
        .content_size(1, 200.0, 40.0)
        .ticks(3)
        .assert_scroll_count(0);
    assert!(!session.coordinator().registry().contains(w(1)));

    let session = session.focus(1);
    assert!(session.coordinator().registry().contains(w(1)));
}

#[test]
fn content_size_value_seeds_unknown_text() {
    let session = Coordinator::test()
        .raw(RawEvent::ContentSizeChange {
            widget: w(3),
            width: 200.0,
            height: 40.0,
            value: Some("draft".into()),
        })
        .raw(RawEvent::ContentSizeChange {
            widget: w(3),
            width: 200.0,
            height: 60.0,
            value: Some("ignored".into()),
        });
    let info = session.coordinator().registry().get(w(3)).unwrap();
    assert_eq!(info.text.as_deref(), Some("draft"));
}
