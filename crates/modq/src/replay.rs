//! Drive a `QueueEngine` through a parsed script.

use modq_core::{Config, Item, Result};
use modq_engine::{EngineSnapshot, QueueEngine};

use crate::script::{ScriptLine, Step};

/// Replay `script` against a fresh engine seeded with `items`.
///
/// Refused operations (busy, empty selection, unknown ids, illegal moves)
/// are logged and the replay carries on, the way an operator's click on a
/// disabled control would simply do nothing.
pub fn replay(items: Vec<Item>, config: Config, script: &[ScriptLine]) -> Result<EngineSnapshot> {
    let mut engine = QueueEngine::new(items, config)?;
    for ScriptLine { line, step } in script {
        if let Err(err) = run_step(&mut engine, step) {
            tracing::warn!(line, error = %err, "step refused");
        }
    }
    Ok(engine.snapshot())
}

fn run_step(engine: &mut QueueEngine, step: &Step) -> Result<()> {
    match *step {
        Step::Key(event) => {
            engine.on_key(event);
        }
        Step::Advance(by) => engine.advance(by),
        Step::Idle => {
            engine.run_until_idle();
        }
        Step::Select(id) => {
            engine.select(id)?;
        }
        Step::Deselect(id) => {
            engine.deselect(id);
        }
        Step::Toggle(id) => {
            engine.toggle_select(id)?;
        }
        Step::SelectAll => {
            engine.select_all(engine.filter());
        }
        Step::Clear => {
            engine.clear_selection();
        }
        Step::Batch(target) => {
            engine.apply_batch_to_selection(target)?;
        }
        Step::One(id, target) => engine.transition_one(id, target)?,
        Step::RequestReject(id) => {
            engine.request_reject(id)?;
        }
        Step::Confirm => {
            engine.confirm()?;
        }
        Step::Cancel => {
            engine.cancel_confirm();
        }
        Step::Undo => {
            engine.undo();
        }
        Step::NotificationUndo => {
            engine.invoke_notification_undo();
        }
        Step::Dismiss => {
            engine.close_notification();
        }
        Step::Filter(status) => {
            engine.set_filter(status);
        }
        Step::LoadMore => {
            engine.load_more();
        }
        Step::Sentinel => {
            engine.on_sentinel_visible();
        }
        Step::Open(index) => engine.open_detail(index)?,
        Step::Close => {
            engine.close_detail();
        }
        Step::Editing(on) => engine.set_editing(on),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::parse_script;
    use modq_core::{ItemId, Status, Variant};

    fn items() -> Vec<Item> {
        (1..=3).map(|i| Item::new(i, format!("post {i}"))).collect()
    }

    #[test]
    fn replays_batch_and_undo() {
        let script = parse_script("select 1\nselect 2\nbatch approve\nadvance 500\n").unwrap();
        let snap = replay(items(), Config::default(), &script).unwrap();
        assert_eq!(snap.counts.approved, 2);
        assert_eq!(snap.visible, vec![ItemId(3)]);
        assert_eq!(snap.notification.variant, Variant::Success);
        assert_eq!(snap.undo.map(|u| u.len()), Some(2));

        let script = parse_script("select 1\nbatch reject\nadvance 500\nundo\n").unwrap();
        let snap = replay(items(), Config::default(), &script).unwrap();
        assert_eq!(snap.counts.pending, 3);
        assert!(snap.undo.is_none());
    }

    #[test]
    fn refused_steps_do_not_abort() {
        let script = parse_script("batch approve\nselect 42\none 1 approve\n").unwrap();
        let snap = replay(items(), Config::default(), &script).unwrap();
        assert_eq!(snap.items[0].status, Status::Approved);
        assert!(snap.selection.is_empty());
    }

    #[test]
    fn keys_drive_the_detail_view() {
        let script = parse_script("key down\nkey space\nkey tab\nkey tab\nkey enter\n").unwrap();
        let snap = replay(items(), Config::default(), &script).unwrap();
        // Ring at index 1 of 3: prev, next, close icon, approve, reject, close.
        // Two tabs from the close icon land on reject.
        assert_eq!(snap.items[1].status, Status::Rejected);
        assert!(snap.detail_index.is_none());
    }

    #[test]
    fn duplicate_seed_ids_fail() {
        let dupes = vec![Item::new(1, "a"), Item::new(1, "b")];
        let err = replay(dupes, Config::default(), &[]).unwrap_err();
        assert_eq!(err.error_type(), "INVALID_ARGUMENT");
    }
}
