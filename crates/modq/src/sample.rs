//! Deterministic sample queues for demos and replay fixtures.

use chrono::{DateTime, Duration, Utc};
use modq_core::{Item, Status};

const REASONS: [&str; 5] = [
    "Spam",
    "Harassment",
    "Misinformation",
    "Off-topic",
    "Inappropriate content",
];

const AUTHORS: [&str; 6] = ["ana", "bo", "chidi", "dara", "emeka", "fen"];

const TITLES: [&str; 6] = [
    "Limited offer, click now",
    "You people are the worst",
    "Miracle cure found",
    "Unrelated cat pictures",
    "Borderline meme",
    "Heated reply in thread",
];

/// SplitMix64 step.
const fn next(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

fn pick<T: Copy>(state: &mut u64, from: &[T]) -> T {
    let len = u64::try_from(from.len()).unwrap_or(u64::MAX);
    let idx = usize::try_from(next(state) % len).unwrap_or_default();
    from[idx]
}

/// `count` items reported one minute apart ending at `end`, mostly pending.
///
/// The same `seed` always yields the same queue.
#[must_use]
pub fn sample_items(count: usize, seed: u64, end: DateTime<Utc>) -> Vec<Item> {
    let mut state = seed;
    (1..=count)
        .map(|n| {
            let id = u64::try_from(n).unwrap_or(u64::MAX);
            let status = match next(&mut state) % 10 {
                0 => Status::Approved,
                1 => Status::Rejected,
                _ => Status::Pending,
            };
            let minutes_ago = i64::try_from(count - n).unwrap_or(i64::MAX);
            let mut item = Item::new(id, pick(&mut state, &TITLES))
                .with_author(pick(&mut state, &AUTHORS))
                .with_report(
                    pick(&mut state, &REASONS),
                    end - Duration::minutes(minutes_ago),
                )
                .with_status(status);
            item.report_count = u32::try_from(next(&mut state) % 5 + 1).unwrap_or(1);
            item.content = format!("Reported post #{id}");
            item
        })
        .collect()
}
