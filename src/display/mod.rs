//! The output boundary: what a frame looks like, which refresh mode the
//! panel should use, and the per-tick render policy.

pub mod console;
#[cfg(feature = "epd")]
pub mod epd;

use crate::board::{Countdown, SLOTS};

/// Forced full refresh after this many consecutive partial refreshes, to
/// clear accumulated ghosting.
const FULL_REFRESH_EVERY: u32 = 10;

/// Everything a presenter needs to place one board frame.
#[derive(Debug, Clone)]
pub struct BoardView {
    pub times: [String; SLOTS],
    pub route: String,
    pub fetched_at: String,
}

/// Which hardware refresh mode to use for a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshKind {
    /// Complete panel redraw. Slower, resets ghosting artifacts.
    Full,
    /// Fast low-flicker update that does not fully redraw the panel.
    Partial,
}

#[derive(Debug, thiserror::Error)]
pub enum DisplayError {
    #[error("no panel detected: {0}")]
    NoPanel(String),
    #[error("panel refused frame: {0}")]
    Draw(String),
}

/// Output surface boundary. The render task decides *what* to draw and with
/// which refresh mode; implementations only place it.
pub trait Presenter: Send {
    /// Draw a board frame with three countdown slots.
    fn show_board(&mut self, view: &BoardView, refresh: RefreshKind) -> Result<(), DisplayError>;

    /// Draw the full-surface "no data" placeholder. Always a full refresh:
    /// switching layouts on e-ink without one leaves ghosting.
    fn show_no_data(&mut self, wall_clock: &str) -> Result<(), DisplayError>;
}

/// What the render task should do this tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderAction {
    Board([String; SLOTS], RefreshKind),
    Placeholder,
    Skip,
}

/// Per-tick render policy.
///
/// While data is present, frames alternate on the partial-refresh budget:
/// every [`FULL_REFRESH_EVERY`] partial refreshes the next frame is forced
/// full and the counter resets. When data disappears, the placeholder is
/// drawn exactly once and rendering is then suspended until data returns,
/// rather than redrawing an identical placeholder on every tick.
#[derive(Debug, Default)]
pub struct RenderCycle {
    partial_count: u32,
    suspended: bool,
}

impl RenderCycle {
    pub fn plan(&mut self, countdown: Countdown) -> RenderAction {
        match countdown {
            Countdown::NoData if self.suspended => RenderAction::Skip,
            Countdown::NoData => {
                self.suspended = true;
                RenderAction::Placeholder
            }
            Countdown::Due(times) => {
                self.suspended = false;
                if self.partial_count >= FULL_REFRESH_EVERY {
                    self.partial_count = 0;
                    RenderAction::Board(times, RefreshKind::Full)
                } else {
                    self.partial_count += 1;
                    RenderAction::Board(times, RefreshKind::Partial)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn due() -> Countdown {
        Countdown::Due(["01", "04", "--"].map(String::from))
    }

    #[test]
    fn placeholder_drawn_once_then_suspended() {
        let mut cycle = RenderCycle::default();
        assert_eq!(cycle.plan(Countdown::NoData), RenderAction::Placeholder);
        assert_eq!(cycle.plan(Countdown::NoData), RenderAction::Skip);
        assert_eq!(cycle.plan(Countdown::NoData), RenderAction::Skip);
    }

    #[test]
    fn data_returning_resumes_normal_cadence() {
        let mut cycle = RenderCycle::default();
        assert_eq!(cycle.plan(Countdown::NoData), RenderAction::Placeholder);
        assert_eq!(cycle.plan(Countdown::NoData), RenderAction::Skip);
        assert!(matches!(cycle.plan(due()), RenderAction::Board(_, _)));
        // A later outage suspends again after one placeholder.
        assert_eq!(cycle.plan(Countdown::NoData), RenderAction::Placeholder);
        assert_eq!(cycle.plan(Countdown::NoData), RenderAction::Skip);
    }

    #[test]
    fn eleventh_consecutive_frame_forces_full_refresh() {
        let mut cycle = RenderCycle::default();
        for tick in 1..=10 {
            match cycle.plan(due()) {
                RenderAction::Board(_, RefreshKind::Partial) => {}
                other => panic!("tick {tick}: expected partial refresh, got {other:?}"),
            }
        }
        assert!(matches!(
            cycle.plan(due()),
            RenderAction::Board(_, RefreshKind::Full)
        ));
        // Counter reset: the cycle starts over with partial refreshes.
        assert!(matches!(
            cycle.plan(due()),
            RenderAction::Board(_, RefreshKind::Partial)
        ));
    }

    #[test]
    fn board_action_carries_the_countdown_values() {
        let mut cycle = RenderCycle::default();
        match cycle.plan(due()) {
            RenderAction::Board(times, _) => {
                assert_eq!(times, ["01", "04", "--"].map(String::from));
            }
            other => panic!("expected board frame, got {other:?}"),
        }
    }
}
