//! End-to-end scenarios against the `QueueEngine` facade.

use std::time::Duration;

use modq_core::{Config, Item, ItemId, Status, Variant};
use modq_engine::{Dispatch, FocusContext, KeyCode, KeyEvent, QueueEngine, UNDO_MESSAGE};

const BATCH: Duration = Duration::from_millis(500);

fn pending(n: u64) -> Vec<Item> {
    (1..=n).map(|i| Item::new(i, format!("report {i}"))).collect()
}

fn status(engine: &QueueEngine, id: u64) -> Status {
    engine.item(ItemId(id)).map(|item| item.status).unwrap()
}

#[test]
fn test_batch_approve_then_undo() {
    let mut engine = QueueEngine::new(pending(3), Config::default()).unwrap();
    engine.select(ItemId(1)).unwrap();
    engine.select(ItemId(2)).unwrap();
    engine
        .apply_batch([ItemId(1), ItemId(2)], Status::Approved)
        .unwrap();

    // Nothing changes before the round trip resolves.
    assert_eq!(status(&engine, 1), Status::Pending);
    assert_eq!(status(&engine, 2), Status::Pending);

    engine.advance(BATCH);
    assert_eq!(status(&engine, 1), Status::Approved);
    assert_eq!(status(&engine, 2), Status::Approved);
    assert_eq!(status(&engine, 3), Status::Pending);
    let note = engine.notification();
    assert!(note.open);
    assert_eq!(note.variant, Variant::Success);
    let snapshot = engine.live_undo().unwrap();
    assert_eq!(
        snapshot.entries,
        vec![(ItemId(1), Status::Pending), (ItemId(2), Status::Pending)]
    );

    assert!(engine.undo());
    assert_eq!(status(&engine, 1), Status::Pending);
    assert_eq!(status(&engine, 2), Status::Pending);
    assert!(engine.live_undo().is_none());
    assert_eq!(engine.notification().message, UNDO_MESSAGE);

    assert!(!engine.undo(), "second undo is a no-op");
}

#[test]
fn test_second_batch_supersedes_first_undo() {
    let mut engine = QueueEngine::new(pending(4), Config::default()).unwrap();
    engine
        .apply_batch([ItemId(1), ItemId(2)], Status::Approved)
        .unwrap();
    engine.advance(BATCH);
    engine
        .apply_batch([ItemId(3), ItemId(4)], Status::Rejected)
        .unwrap();
    engine.advance(BATCH);

    assert!(engine.undo());
    assert_eq!(status(&engine, 1), Status::Approved);
    assert_eq!(status(&engine, 2), Status::Approved);
    assert_eq!(status(&engine, 3), Status::Pending);
    assert_eq!(status(&engine, 4), Status::Pending);
}

#[test]
fn test_batch_undo_restores_status_from_before_the_batch() {
    let mut engine = QueueEngine::new(pending(3), Config::default()).unwrap();
    engine
        .apply_batch([ItemId(1), ItemId(2)], Status::Approved)
        .unwrap();
    // A single-item write lands while the batch is still in flight.
    engine.transition_one(ItemId(1), Status::Approved).unwrap();
    engine.advance(BATCH);

    assert_eq!(
        engine.live_undo().unwrap().entries,
        vec![(ItemId(1), Status::Pending), (ItemId(2), Status::Pending)]
    );
    assert!(engine.undo());
    assert_eq!(status(&engine, 1), Status::Pending);
    assert_eq!(status(&engine, 2), Status::Pending);
}

#[test]
fn test_batch_on_unknown_ids_discards_previous_undo() {
    let mut engine = QueueEngine::new(pending(2), Config::default()).unwrap();
    engine.transition_one(ItemId(1), Status::Approved).unwrap();
    assert!(engine.live_undo().is_some());

    engine.apply_batch([ItemId(99)], Status::Rejected).unwrap();
    engine.advance(BATCH);
    assert!(!engine.is_busy());
    assert!(engine.live_undo().is_none());
    assert!(!engine.undo());
    assert_eq!(status(&engine, 1), Status::Approved);
}

#[test]
fn test_undo_window_expires() {
    let mut engine = QueueEngine::new(pending(2), Config::default()).unwrap();
    engine.apply_batch([ItemId(1)], Status::Rejected).unwrap();
    engine.advance(BATCH);
    engine.advance(Duration::from_millis(3499));
    assert!(engine.live_undo().is_some());
    engine.advance(Duration::from_millis(1));
    assert!(engine.live_undo().is_none());
    assert!(!engine.undo());
    assert_eq!(status(&engine, 1), Status::Rejected);
}

#[test]
fn test_approve_shortcut_on_approved_item_is_silent() {
    let items = vec![
        Item::new(1, "a").with_status(Status::Approved),
        Item::new(2, "b").with_status(Status::Approved),
        Item::new(3, "c").with_status(Status::Approved),
    ];
    let mut engine = QueueEngine::new(items, Config::default()).unwrap();
    engine.set_filter(Status::Approved);
    assert_eq!(engine.focus_index(), Some(0));

    engine.on_key(KeyEvent::char('a'));
    assert_eq!(status(&engine, 1), Status::Approved);
    assert!(!engine.notification().open);
    assert!(engine.live_undo().is_none());
}

#[test]
fn test_shortcuts_approve_and_reject_focused_pending_item() {
    let mut engine = QueueEngine::new(pending(3), Config::default()).unwrap();
    engine.on_key(KeyCode::Down.into());
    assert_eq!(engine.on_key(KeyEvent::char('r')), Dispatch::Handled);
    assert_eq!(status(&engine, 2), Status::Rejected);
    assert!(engine.pending_confirmation().is_none(), "r is unconfirmed");
    assert_eq!(engine.notification().message, "Item rejected");

    // Focus stays at index 1, which now shows item 3.
    assert_eq!(engine.focused_item().map(|i| i.id), Some(ItemId(3)));
    engine.on_key(KeyEvent::char('A'));
    assert_eq!(status(&engine, 3), Status::Approved);
    assert_eq!(engine.focus_index(), Some(0));
}

#[test]
fn test_focus_clamps_at_both_ends() {
    let mut engine = QueueEngine::new(pending(3), Config::default()).unwrap();
    engine.on_key(KeyCode::Up.into());
    assert_eq!(engine.focus_index(), Some(0));
    for _ in 0..5 {
        engine.on_key(KeyCode::Down.into());
    }
    assert_eq!(engine.focus_index(), Some(2));
}

#[test]
fn test_escape_clears_selection_and_refocuses_first_row() {
    let mut engine = QueueEngine::new(pending(3), Config::default()).unwrap();
    engine.select(ItemId(2)).unwrap();
    engine.set_focus(2);
    engine.on_key(KeyCode::Escape.into());
    assert!(engine.selection().is_empty());
    assert_eq!(engine.focus_index(), Some(0));
}

#[test]
fn test_overlapping_grow_collapses() {
    let mut engine = QueueEngine::new(pending(45), Config::default()).unwrap();
    assert!(engine.grow_by(10));
    assert!(!engine.grow_by(10));
    engine.run_until_idle();
    assert_eq!(engine.loaded_count(), 20);
    assert_eq!(engine.visible_items().len(), 20);
}

#[test]
fn test_grow_never_exceeds_filtered_length() {
    let mut engine = QueueEngine::new(pending(13), Config::default()).unwrap();
    engine.grow_by(50);
    engine.run_until_idle();
    assert_eq!(engine.loaded_count(), 13);
    assert!(!engine.can_load_more());
}

#[test]
fn test_filter_switch_during_grow_drops_the_growth() {
    let mut engine = QueueEngine::new(pending(30), Config::default()).unwrap();
    engine.grow_by(10);
    engine.set_filter(Status::Rejected);
    engine.set_filter(Status::Pending);
    engine.run_until_idle();
    assert_eq!(engine.loaded_count(), 10);
    assert!(!engine.is_growing());
}

#[test]
fn test_detail_view_walks_and_acts() {
    let mut engine = QueueEngine::new(pending(3), Config::default()).unwrap();
    engine.on_key(KeyEvent::char(' '));
    assert_eq!(engine.detail_index(), Some(0));
    assert_eq!(engine.focus_context(), FocusContext::Detail);

    engine.on_key(KeyCode::Left.into());
    assert_eq!(engine.detail_index(), Some(0), "clamped at the first item");
    engine.on_key(KeyCode::Right.into());
    engine.on_key(KeyCode::Right.into());
    engine.on_key(KeyCode::Right.into());
    assert_eq!(engine.detail_index(), Some(2));
    assert_eq!(engine.detail_item().map(|i| i.id), Some(ItemId(3)));

    engine.on_key(KeyEvent::char('a'));
    assert_eq!(status(&engine, 3), Status::Approved);
    assert!(engine.detail_index().is_none());
    assert_eq!(engine.focus_context(), FocusContext::Screen);
}

#[test]
fn test_detail_closes_when_slice_empties() {
    let mut engine = QueueEngine::new(pending(1), Config::default()).unwrap();
    engine.open_detail(0).unwrap();
    engine.apply_batch([ItemId(1)], Status::Approved).unwrap();
    engine.advance(BATCH);
    assert!(engine.detail_index().is_none());
    assert_eq!(engine.focus_index(), None);
    assert_eq!(engine.focus_context(), FocusContext::Screen);
}

#[test]
fn test_detail_pointer_clamps_after_batch() {
    let mut engine = QueueEngine::new(pending(3), Config::default()).unwrap();
    engine.open_detail(2).unwrap();
    engine
        .apply_batch([ItemId(2), ItemId(3)], Status::Rejected)
        .unwrap();
    engine.advance(BATCH);
    assert_eq!(engine.detail_index(), Some(0));
    assert_eq!(engine.detail_item().map(|i| i.id), Some(ItemId(1)));
}

#[test]
fn test_open_detail_out_of_range_is_refused() {
    let mut engine = QueueEngine::new(pending(2), Config::default()).unwrap();
    let err = engine.open_detail(5).unwrap_err();
    assert_eq!(err.error_type(), "INVALID_ARGUMENT");
    assert!(engine.detail_index().is_none());
}

#[test]
fn test_confirmed_reject_round_trip() {
    let mut engine = QueueEngine::new(pending(2), Config::default()).unwrap();
    assert!(engine.request_reject(ItemId(1)).unwrap());
    assert_eq!(engine.on_key(KeyEvent::char('a')), Dispatch::Ignored);
    assert_eq!(engine.on_key(KeyEvent::char('y')), Dispatch::Handled);
    assert_eq!(status(&engine, 1), Status::Rejected);
    assert!(engine.invoke_notification_undo());
    assert_eq!(status(&engine, 1), Status::Pending);
}

#[test]
fn test_cancelled_confirmation_changes_nothing() {
    let mut engine = QueueEngine::new(pending(2), Config::default()).unwrap();
    engine.request_reject(ItemId(2)).unwrap();
    assert!(engine.cancel_confirm());
    assert!(!engine.confirm().unwrap());
    assert_eq!(status(&engine, 2), Status::Pending);
    assert!(!engine.notification().open);
}

#[test]
fn test_batch_selection_stays_editable_while_busy() {
    let mut engine = QueueEngine::new(pending(3), Config::default()).unwrap();
    engine.select(ItemId(1)).unwrap();
    engine.apply_batch_to_selection(Status::Approved).unwrap();
    engine.select(ItemId(3)).unwrap();
    assert!(engine.apply_batch_to_selection(Status::Rejected).is_err());
    engine.advance(BATCH);
    // Resolution clears the whole selection, including late additions.
    assert!(engine.selection().is_empty());
    assert_eq!(status(&engine, 3), Status::Pending);
}

#[test]
fn test_zero_latency_config_resolves_on_zero_advance() {
    let mut engine = QueueEngine::new(pending(2), Config::immediate()).unwrap();
    engine.apply_batch([ItemId(2)], Status::Approved).unwrap();
    assert!(engine.is_busy());
    engine.advance(Duration::ZERO);
    assert!(!engine.is_busy());
    assert_eq!(status(&engine, 2), Status::Approved);
}

#[test]
fn test_set_pending_batch_from_rejected_tab() {
    let items = (1..=3)
        .map(|i| Item::new(i, "spam").with_status(Status::Rejected))
        .collect();
    let mut engine = QueueEngine::new(items, Config::default()).unwrap();
    assert_eq!(engine.select_all(Status::Rejected), 3);
    assert_eq!(engine.batch_actions(), &[Status::Pending]);
    engine.apply_batch_to_selection(Status::Pending).unwrap();
    let elapsed = engine.run_until_idle();
    assert!(elapsed >= BATCH);
    assert_eq!(engine.status_counts().pending, 3);
    assert_eq!(engine.notification().variant, Variant::Info);
    assert!(!engine.notification().open, "idle run lets it auto-close");
}
