//! Arrival-time computation: route filtering, the shared snapshot, and the
//! minutes-due countdown shown on the board.

use chrono::{DateTime, Local, Utc};

use crate::providers::tfl::Arrival;

/// The board always shows exactly this many countdown slots.
pub const SLOTS: usize = 3;
/// Token shown for a slot with no matching arrival.
pub const PLACEHOLDER: &str = "--";

/// The most recent successfully fetched, route-filtered working set.
///
/// Replaced wholesale on every fetch attempt; a failed fetch leaves `None`
/// in the shared cell instead. There is no staleness expiry: a stale
/// snapshot is shown until the next fetch settles it one way or the other.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub records: Vec<Arrival>,
    pub fetched_at: DateTime<Local>,
}

impl Snapshot {
    /// Last-fetch time the way the board prints it.
    pub fn fetched_at_label(&self) -> String {
        self.fetched_at.format("%H:%M:%S %d/%m/%Y").to_string()
    }
}

/// Rendering-ready countdown.
///
/// `NoData` is deliberately distinct from three placeholders: the two drive
/// different render paths (full placeholder redraw vs a normal board frame).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Countdown {
    NoData,
    Due([String; SLOTS]),
}

/// Keep only the arrivals for the wanted route, compared case-insensitively,
/// preserving source order.
pub fn filter_route(raw: Vec<Arrival>, route: &str) -> Vec<Arrival> {
    raw.into_iter()
        .filter(|arrival| arrival.line_name.eq_ignore_ascii_case(route))
        .collect()
}

/// Compute whole-minute countdowns relative to `now`, soonest first, padded
/// with placeholders to exactly [`SLOTS`] entries.
///
/// An arrival already due (or overdue) shows as `"00"`, never negative. An
/// absent snapshot, or one with no matching arrivals, is `NoData`.
///
/// `now` is captured once by the caller and threaded in, so repeated calls
/// against the same snapshot are deterministic.
pub fn due_times(snapshot: Option<&Snapshot>, now: DateTime<Utc>) -> Countdown {
    let Some(snapshot) = snapshot else {
        return Countdown::NoData;
    };
    if snapshot.records.is_empty() {
        return Countdown::NoData;
    }

    let mut minutes: Vec<i64> = snapshot
        .records
        .iter()
        .map(|record| {
            let seconds = record
                .expected_arrival
                .signed_duration_since(now)
                .num_seconds();
            seconds.max(0) / 60
        })
        .collect();
    minutes.sort_unstable();
    minutes.truncate(SLOTS);

    let mut values: [String; SLOTS] = std::array::from_fn(|_| PLACEHOLDER.to_string());
    for (slot, due) in values.iter_mut().zip(minutes) {
        *slot = format!("{due:02}");
    }

    Countdown::Due(values)
}
