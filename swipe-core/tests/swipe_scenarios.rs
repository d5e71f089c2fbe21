//! Swipe-to-dismiss Integration Tests
//!
//! Drives item controllers and lists through full touch sequences:
//! - Dead-zone taps and scrolls
//! - Snap open / snap closed / auto-delete releases
//! - Rubber-band damping from the open position
//! - Card taps while open and closed
//! - Touch cancel on horizontal, vertical and dead-zone sequences
//! - One-open-item coordination across a list

use std::cell::Cell;
use std::rc::Rc;

use proptest::prelude::*;
use swipe_core::{
    GestureState, ItemId, ItemKind, ItemSignal, PendingDeletion, SwipeConfig, SwipeController,
    SwipeList, SwipeSignal, TapTarget, TouchEvent,
};

const START_X: f32 = 300.0;
const START_Y: f32 = 100.0;

fn controller() -> SwipeController {
    SwipeController::new(ItemId::new(), &SwipeConfig::default())
}

/// Run a touch sequence of horizontal displacements and return all signals
/// emitted before release.
fn drag(controller: &mut SwipeController, dxs: &[f32]) -> Vec<SwipeSignal> {
    let mut signals = controller.handle_touch(&TouchEvent::start(START_X, START_Y, 0));
    for (i, dx) in dxs.iter().enumerate() {
        let t = 16 * (i as u64 + 1);
        signals.extend(controller.handle_touch(&TouchEvent::moved(START_X + dx, START_Y, t)));
    }
    signals
}

fn release(controller: &mut SwipeController, now_ms: u64) -> Vec<SwipeSignal> {
    controller.handle_touch(&TouchEvent::end(now_ms))
}

fn assert_close(actual: f32, expected: f32) {
    assert!(
        (actual - expected).abs() < 1e-3,
        "expected {expected}, got {actual}"
    );
}

// ============================================================================
// Release and tap
// ============================================================================

#[test]
fn release_past_snap_opens() {
    let mut c = controller();
    drag(&mut c, &[0.0, -5.0, -50.0, -90.0]);
    // -90 is past the snap position, so the live offset is damped
    assert_close(c.offset(), -83.0);

    let signals = release(&mut c, 100);
    assert!(signals.contains(&SwipeSignal::RevealOpened));
    assert_close(c.offset(), -80.0);
    assert!(c.is_open());
}

#[test]
fn drag_from_open_is_rubber_banded() {
    let mut c = controller();
    drag(&mut c, &[-60.0]);
    release(&mut c, 50);
    assert!(c.is_open());

    drag(&mut c, &[0.0, -10.0, -70.0]);
    // raw -150 → -80 + (-150 + 80) * 0.3
    assert_close(c.offset(), -101.0);
    release(&mut c, 200);
    assert!(c.is_open());
    assert!(!c.is_dismissing());
}

#[test]
fn far_release_deletes_once_after_exit() {
    let calls = Rc::new(Cell::new(0));
    let counter = Rc::clone(&calls);
    let mut c = controller().with_on_delete(move || counter.set(counter.get() + 1));

    // raw -314 damps to about -150
    drag(&mut c, &[-20.0, -314.0]);
    assert!(c.offset() <= -150.0);
    let signals = release(&mut c, 1_000);
    assert!(signals.contains(&SwipeSignal::DismissStarted));

    assert!(c.tick(1_299).is_empty());
    assert_eq!(calls.get(), 0);
    assert_eq!(c.tick(1_300), vec![SwipeSignal::Deleted]);
    assert!(c.tick(2_000).is_empty());
    assert_eq!(calls.get(), 1);
}

#[test]
fn tap_on_open_card_closes_without_edit() {
    let mut c = controller();
    drag(&mut c, &[-60.0]);
    release(&mut c, 50);
    assert!(c.is_open());

    // Tap: touch start/end inside the dead-zone, then the click
    c.handle_touch(&TouchEvent::start(START_X, START_Y, 100));
    assert!(release(&mut c, 120).is_empty());
    let signals = c.tap(TapTarget::Card, 120);
    assert!(signals.contains(&SwipeSignal::Closed));
    assert!(!signals.contains(&SwipeSignal::PrimaryAction));
    assert_close(c.offset(), 0.0);
    assert!(!c.is_open());
}

#[test]
fn tap_on_closed_card_edits() {
    let mut c = controller();
    c.handle_touch(&TouchEvent::start(START_X, START_Y, 0));
    release(&mut c, 20);
    let signals = c.tap(TapTarget::Card, 20);
    assert_eq!(signals, vec![SwipeSignal::PrimaryAction]);
    assert_close(c.offset(), 0.0);
}

// ============================================================================
// Touch cancel
// ============================================================================

#[test]
fn cancel_after_horizontal_drag_resolves_like_release() {
    let mut c = controller();
    drag(&mut c, &[-20.0, -60.0]);
    let signals = c.handle_touch(&TouchEvent::cancel(80));
    assert!(signals.contains(&SwipeSignal::RevealOpened));
    assert!(c.is_open());
    assert_close(c.offset(), -80.0);
    assert!(!c.is_dragging());
}

#[test]
fn cancel_past_delete_threshold_dismisses() {
    let mut c = controller();
    drag(&mut c, &[-20.0, -300.0]);
    let signals = c.handle_touch(&TouchEvent::cancel(80));
    assert!(signals.contains(&SwipeSignal::DismissStarted));
    assert_eq!(c.tick(380), vec![SwipeSignal::Deleted]);
}

#[test]
fn cancel_inside_dead_zone_changes_nothing() {
    let mut c = controller();
    drag(&mut c, &[-3.0, -6.0]);
    assert!(c.handle_touch(&TouchEvent::cancel(40)).is_empty());
    assert_eq!(c.gesture_state(), GestureState::Undecided);
    assert_close(c.offset(), 0.0);
    assert!(!c.is_open());
}

#[test]
fn cancel_of_vertical_scroll_leaves_open_item_open() {
    let mut c = controller();
    drag(&mut c, &[-60.0]);
    release(&mut c, 50);

    c.handle_touch(&TouchEvent::start(START_X, START_Y, 100));
    c.handle_touch(&TouchEvent::moved(START_X - 2.0, START_Y + 30.0, 116));
    assert!(c.handle_touch(&TouchEvent::cancel(130)).is_empty());
    assert!(c.is_open());
    assert_close(c.offset(), -80.0);
}

#[test]
fn cancel_in_list_broadcasts_like_release() {
    let mut list = SwipeList::new(SwipeConfig::default()).expect("list");
    let first = ItemId::new();
    let second = ItemId::new();
    list.mount(first, ItemKind::Task).expect("mount");
    list.mount(second, ItemKind::Wish).expect("mount");

    list.handle_touch(first, &TouchEvent::start(START_X, START_Y, 0));
    list.handle_touch(first, &TouchEvent::moved(START_X - 70.0, START_Y, 16));
    list.handle_touch(first, &TouchEvent::end(32));
    assert_eq!(list.open_item(), Some(first));

    list.handle_touch(second, &TouchEvent::start(START_X, START_Y, 100));
    list.handle_touch(second, &TouchEvent::moved(START_X - 70.0, START_Y, 116));
    let signals = list.handle_touch(second, &TouchEvent::cancel(132));
    assert!(signals.contains(&ItemSignal {
        item: second,
        signal: SwipeSignal::RevealOpened,
    }));
    assert_eq!(list.open_item(), Some(second));
}

// ============================================================================
// Boundary tests
// ============================================================================

#[test]
fn release_at_open_boundary_snaps_open() {
    let mut c = controller();
    drag(&mut c, &[-20.0, -40.0]);
    release(&mut c, 50);
    assert!(c.is_open());
}

#[test]
fn release_one_pixel_short_snaps_closed() {
    let mut c = controller();
    drag(&mut c, &[-20.0, -39.0]);
    release(&mut c, 50);
    assert!(!c.is_open());
    assert_close(c.offset(), 0.0);
}

#[test]
fn release_at_delete_boundary_deletes() {
    let mut c = controller();
    // -80 + (raw + 80) * 0.3 = -105 → raw = -163.33…
    drag(&mut c, &[-20.0, -163.4]);
    assert!(c.offset() <= -105.0);
    release(&mut c, 50);
    assert!(c.is_dismissing());
}

#[test]
fn dead_zone_sequence_changes_nothing() {
    let mut c = controller();
    let signals = drag(&mut c, &[3.0, -7.9, 7.0]);
    assert!(signals.is_empty());
    assert_eq!(c.gesture_state(), GestureState::Undecided);
    assert!(release(&mut c, 60).is_empty());
    assert_close(c.offset(), 0.0);
    assert!(!c.is_open());
}

#[test]
fn dead_zone_sequence_leaves_open_item_open() {
    let mut c = controller();
    drag(&mut c, &[-60.0]);
    release(&mut c, 50);
    drag(&mut c, &[-4.0]);
    release(&mut c, 80);
    assert!(c.is_open());
    assert_close(c.offset(), -80.0);
}

// ============================================================================
// List coordination
// ============================================================================

#[test]
fn list_keeps_one_item_open_and_collects_deletions() {
    let mut list = SwipeList::new(SwipeConfig::default()).expect("list");
    let first = ItemId::new();
    let second = ItemId::new();
    list.mount(first, ItemKind::Task).expect("mount");
    list.mount(second, ItemKind::Task).expect("mount");

    for (id, t) in [(first, 0_u64), (second, 100)] {
        list.handle_touch(id, &TouchEvent::start(START_X, START_Y, t));
        list.handle_touch(id, &TouchEvent::moved(START_X - 70.0, START_Y, t + 16));
        list.handle_touch(id, &TouchEvent::end(t + 32));
    }
    assert_eq!(list.open_item(), Some(second));

    let signals = list.tap(second, TapTarget::DeleteButton, 500);
    assert!(signals.contains(&ItemSignal {
        item: second,
        signal: SwipeSignal::DismissStarted,
    }));
    // A second trigger while exiting is ignored
    assert!(list.tap(second, TapTarget::DeleteButton, 510).is_empty());

    list.tick(800);
    assert_eq!(
        list.take_deletions(),
        vec![PendingDeletion {
            item: second,
            kind: ItemKind::Task,
        }]
    );
    assert_eq!(list.ids().collect::<Vec<_>>(), vec![first]);
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn prop_horizontal_offset_never_positive(
        start_open in any::<bool>(),
        dxs in prop::collection::vec(-600.0f32..600.0f32, 1..20)
    ) {
        let mut c = controller();
        if start_open {
            drag(&mut c, &[-60.0]);
            release(&mut c, 10);
        }
        c.handle_touch(&TouchEvent::start(START_X, START_Y, 20));
        for dx in dxs {
            c.handle_touch(&TouchEvent::moved(START_X + dx, START_Y, 30));
            prop_assert!(c.offset() <= 0.0, "offset {} is positive", c.offset());
            c.flush_frame();
            prop_assert!(c.rendered_offset() <= 0.0);
        }
    }

    #[test]
    fn prop_rubber_band_damps_excess(raw in -2000.0f32..-80.0f32) {
        let damped = swipe_core::rubber_band(raw, -80.0, 0.3);
        let expected = -80.0 + (raw + 80.0) * 0.3;
        prop_assert!((damped - expected).abs() < 1e-2);
        prop_assert!(damped >= raw);
    }

    #[test]
    fn prop_dead_zone_never_classifies(
        samples in prop::collection::vec((-7.99f32..7.99f32, -7.99f32..7.99f32), 0..30)
    ) {
        let mut c = controller();
        c.handle_touch(&TouchEvent::start(START_X, START_Y, 0));
        for (dx, dy) in samples {
            let signals = c.handle_touch(&TouchEvent::moved(START_X + dx, START_Y + dy, 1));
            prop_assert!(signals.is_empty());
        }
        prop_assert_eq!(c.gesture_state(), GestureState::Undecided);
        prop_assert!(release(&mut c, 2).is_empty());
        prop_assert!(c.offset().abs() < f32::EPSILON);
    }

    #[test]
    fn prop_repeated_dismiss_deletes_once(triggers in 1usize..10) {
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let mut c = controller().with_on_delete(move || counter.set(counter.get() + 1));
        for i in 0..triggers {
            c.dismiss(i as u64);
        }
        for t in (0..2_000).step_by(100) {
            c.tick(t);
        }
        prop_assert_eq!(calls.get(), 1);
    }
}
