use inscroll::{Coordinator, Effect, Options};

#[test]
fn momentum_past_content_grows_inset() {
    let session = Coordinator::test()
        .keyboard_shown(500.0)
        .focus(1)
        .momentum(500.0, 330.0, 800.0)
        .assert_has_effect(Effect::SetBottomInset {
            inset: 30.0,
            animated: false,
        });

    assert_eq!(session.coordinator().bottom_inset(), 30.0);
}

#[test]
fn hide_resets_inset_then_scrolls_to_end() {
    let session = Coordinator::test()
        .keyboard_shown(500.0)
        .focus(1)
        .momentum(500.0, 330.0, 800.0)
        .keyboard_hidden();
    assert_eq!(
        session.last_effects(),
        &[Effect::SetBottomInset {
            inset: 0.0,
            animated: false,
        }]
    );

    let session = session.tick();
    assert_eq!(
        session.last_effects(),
        &[Effect::ScrollToEnd { animated: true }]
    );
    assert_eq!(session.coordinator().bottom_inset(), 0.0);
}

#[test]
fn hide_without_inset_is_quiet() {
    Coordinator::test()
        .keyboard_shown(500.0)
        .focus(1)
        .keyboard_hidden()
        .assert_no_effects()
        .ticks(3)
        .assert_no_effects();
}

#[test]
fn momentum_is_ignored_while_keyboard_hidden() {
    let session = Coordinator::test()
        .focus(1)
        .momentum(500.0, 330.0, 800.0)
        .assert_no_effects();

    assert_eq!(session.coordinator().bottom_inset(), 0.0);
}

#[test]
fn momentum_within_content_keeps_inset() {
    Coordinator::test()
        .keyboard_shown(500.0)
        .momentum(500.0, 100.0, 800.0)
        .assert_no_effects();
}

#[test]
fn animated_container_animates_inset() {
    Coordinator::test()
        .with_options(Options {
            use_animated_container: true,
            ..Options::default()
        })
        .keyboard_shown(500.0)
        .momentum(500.0, 330.0, 800.0)
        .assert_has_effect(Effect::SetBottomInset {
            inset: 30.0,
            animated: true,
        })
        .keyboard_hidden()
        .assert_has_effect(Effect::SetBottomInset {
            inset: 0.0,
            animated: true,
        });
}

#[test]
fn scroll_to_end_skipped_after_unmount() {
    Coordinator::test()
        .keyboard_shown(500.0)
        .momentum(500.0, 330.0, 800.0)
        .keyboard_hidden()
        .unmount_container()
        .tick()
        .assert_no_effects();
}

#[test]
fn passthrough_scrolls_need_a_mounted_container() {
    let mut session = Coordinator::test();
    let coordinator = session.coordinator_mut();
    assert_eq!(
        coordinator.scroll_to(120.0, true),
        vec![Effect::ScrollTo {
            y: 120.0,
            animated: true,
        }]
    );
    assert_eq!(
        coordinator.scroll_to_end(false),
        vec![Effect::ScrollToEnd { animated: false }]
    );

    let mut session = session.unmount_container();
    assert!(session.coordinator_mut().scroll_to(120.0, true).is_empty());
}
