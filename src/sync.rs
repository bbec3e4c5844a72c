//! The two-cadence refresh scheduler.
//!
//! A 30 second fetch task keeps the shared snapshot current; a 10 second
//! render task turns whatever snapshot currently exists into a frame. The
//! cadences are decoupled so rendering never waits on network I/O. Each task
//! is guarded against overlapping itself: a tick that fires while the
//! previous execution is still running is dropped, never queued.

use std::sync::Arc;

use chrono::{Local, Utc};
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::board::{self, Snapshot};
use crate::display::{BoardView, Presenter, RenderAction, RenderCycle};
use crate::providers::tfl::TflClient;

const FETCH_INTERVAL: Duration = Duration::from_secs(30);
const RENDER_INTERVAL: Duration = Duration::from_secs(10);

/// The single shared mutable cell: written only by the fetch task, read only
/// by the render task. `None` means the last fetch failed or none has
/// succeeded yet.
pub type SnapshotCell = Arc<RwLock<Option<Snapshot>>>;

/// Try to enter a task execution. `None` means the previous execution of the
/// same task is still in flight and this tick must be skipped.
fn try_begin<T>(gate: &Arc<Mutex<T>>) -> Option<OwnedMutexGuard<T>> {
    gate.clone().try_lock_owned().ok()
}

struct RenderState {
    presenter: Box<dyn Presenter>,
    cycle: RenderCycle,
}

/// Owns the HTTP client, the target stop/route, and the snapshot cell, and
/// drives both periodic tasks until the process is interrupted.
pub struct RefreshManager {
    client: TflClient,
    stop_id: String,
    route: String,
    snapshot: SnapshotCell,
}

impl RefreshManager {
    pub fn new(client: TflClient, stop_id: String, route: String) -> Self {
        Self {
            client,
            stop_id,
            route,
            snapshot: Arc::new(RwLock::new(None)),
        }
    }

    /// Spawn the fetch and render loops and park on both. The first tick of
    /// each interval fires immediately, so both tasks run once at startup.
    pub async fn start(self: Arc<Self>, presenter: Box<dyn Presenter>) {
        info!(stop = %self.stop_id, route = %self.route, "Starting refresh manager");

        let fetch_self = self.clone();
        let fetch_loop = tokio::spawn(async move {
            let gate = Arc::new(Mutex::new(()));
            let mut ticks = interval(FETCH_INTERVAL);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                ticks.tick().await;
                let Some(permit) = try_begin(&gate) else {
                    warn!("Previous fetch still in flight, skipping this tick");
                    continue;
                };
                let this = fetch_self.clone();
                tokio::spawn(async move {
                    this.refresh_arrivals().await;
                    drop(permit);
                });
            }
        });

        let render_self = self.clone();
        let render_loop = tokio::spawn(async move {
            let gate = Arc::new(Mutex::new(RenderState {
                presenter,
                cycle: RenderCycle::default(),
            }));
            let mut ticks = interval(RENDER_INTERVAL);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                ticks.tick().await;
                let Some(mut state) = try_begin(&gate) else {
                    warn!("Previous render still in flight, skipping this tick");
                    continue;
                };
                let this = render_self.clone();
                tokio::spawn(async move {
                    this.render_board(&mut state).await;
                    drop(state);
                });
            }
        });

        // The loops run forever; park here so the caller can select against
        // a shutdown signal.
        let _ = tokio::join!(fetch_loop, render_loop);
    }

    /// Fetch, filter, and install a fresh snapshot. A failed fetch installs
    /// `None` wholesale; there is never a partial merge with old data.
    async fn refresh_arrivals(&self) {
        let next = match self.client.fetch_arrivals(&self.stop_id).await {
            Ok(raw) => {
                let total = raw.len();
                let records = board::filter_route(raw, &self.route);
                if records.is_empty() {
                    // Soft case: the fetch worked, the route just has
                    // nothing due. Renders the same as no data.
                    debug!(total, route = %self.route, "Fetch succeeded but no arrivals match");
                } else {
                    info!(matched = records.len(), total, "Updated arrivals");
                }
                Some(Snapshot {
                    records,
                    fetched_at: Local::now(),
                })
            }
            Err(e) => {
                error!(stop = %self.stop_id, error = %e, "Failed to fetch arrivals");
                None
            }
        };

        *self.snapshot.write().await = next;
    }

    /// One render pass: read whatever snapshot currently exists, compute the
    /// countdown against a once-captured now, and let the render cycle decide
    /// what (if anything) to draw.
    async fn render_board(&self, state: &mut RenderState) {
        let now = Utc::now();
        let (countdown, fetched_at) = {
            let snapshot = self.snapshot.read().await;
            (
                board::due_times(snapshot.as_ref(), now),
                snapshot
                    .as_ref()
                    .map(Snapshot::fetched_at_label)
                    .unwrap_or_default(),
            )
        };

        let result = match state.cycle.plan(countdown) {
            RenderAction::Skip => {
                debug!("Skipping render, placeholder already on the panel");
                return;
            }
            RenderAction::Placeholder => {
                let wall_clock = Local::now().format("%H:%M:%S %d/%m/%Y").to_string();
                state.presenter.show_no_data(&wall_clock)
            }
            RenderAction::Board(times, refresh) => {
                debug!(?refresh, ?times, "Rendering board");
                let view = BoardView {
                    times,
                    route: self.route.clone(),
                    fetched_at,
                };
                state.presenter.show_board(&view, refresh)
            }
        };

        // Presenter failures never unschedule the render task.
        if let Err(e) = result {
            error!(error = %e, "Failed to render frame");
        }
    }
}
