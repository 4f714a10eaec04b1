// ── Live views and the refresh scheduler ──
//
// A `View` is one open dashboard screen: a fleet overview or a unit
// detail page. It owns its store and runs a background loop that fires
// a refresh cycle immediately, then once per interval, and again
// whenever the range or unit changes. Starting a cycle cancels the one
// still in flight. Closing the view cancels everything and waits.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use moorfleet_api::FleetClient;
use tokio::sync::{Notify, broadcast, watch};
use tokio::task::JoinHandle;
use tokio::time::{Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::alarm_gate::AlarmGate;
use crate::backend::FleetBackend;
use crate::config::FleetConfig;
use crate::error::CoreError;
use crate::fetch;
use crate::model::{Alarm, AlarmId, TimeRange, UnitId};
use crate::notify::{Notification, Notifier};
use crate::store::ViewStore;

const MIN_REFRESH_PERIOD: Duration = Duration::from_secs(1);

/// What a view is looking at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewKind {
    Fleet,
    Unit(UnitId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewTarget {
    pub kind: ViewKind,
    pub range: TimeRange,
}

impl ViewTarget {
    fn period(&self, config: &FleetConfig) -> Duration {
        let period = match self.kind {
            ViewKind::Fleet => config.fleet_refresh_interval,
            ViewKind::Unit(_) => config.unit_refresh_interval,
        };
        period.max(MIN_REFRESH_PERIOD)
    }
}

/// Shared by the loop and every cycle it spawns.
struct CycleContext<B: FleetBackend> {
    backend: Arc<B>,
    config: Arc<FleetConfig>,
    store: Arc<ViewStore>,
    notifier: Notifier,
}

/// Handle to an open view. Dropping it stops the refresh loop; prefer
/// [`close`](Self::close) to also wait for in-flight fetches to wind down.
pub struct View<B: FleetBackend = FleetClient> {
    target: watch::Sender<ViewTarget>,
    refresh: Arc<Notify>,
    store: Arc<ViewStore>,
    notifier: Notifier,
    gate: AlarmGate<B>,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl<B: FleetBackend> View<B> {
    /// Spawn the refresh loop. Must be called inside a tokio runtime.
    pub(crate) fn open(backend: Arc<B>, config: Arc<FleetConfig>, target: ViewTarget) -> Self {
        let store = Arc::new(ViewStore::new());
        let notifier = Notifier::new();
        let cancel = CancellationToken::new();
        let refresh = Arc::new(Notify::new());
        let (target_tx, target_rx) = watch::channel(target.clone());

        let ctx = Arc::new(CycleContext {
            backend: Arc::clone(&backend),
            config,
            store: Arc::clone(&store),
            notifier: notifier.clone(),
        });

        info!(kind = ?target.kind, range = %target.range, "view opened");
        let task = tokio::spawn(refresh_loop(
            ctx,
            target_rx,
            Arc::clone(&refresh),
            cancel.clone(),
        ));

        Self {
            target: target_tx,
            refresh,
            store,
            gate: AlarmGate::new(backend, notifier.clone()),
            notifier,
            cancel,
            task: Some(task),
        }
    }

    pub fn target(&self) -> ViewTarget {
        self.target.borrow().clone()
    }

    /// Switch range. A real change triggers a cycle and restarts the
    /// interval; setting the current range does nothing.
    pub fn set_range(&self, range: TimeRange) {
        self.target.send_if_modified(|t| {
            let changed = t.range != range;
            t.range = range;
            changed
        });
    }

    /// Point the view at another unit (turning a fleet view into a unit
    /// view if needed). Same trigger rules as [`set_range`](Self::set_range).
    pub fn set_unit(&self, unit: UnitId) {
        self.target.send_if_modified(|t| {
            let kind = ViewKind::Unit(unit);
            let changed = t.kind != kind;
            t.kind = kind;
            changed
        });
    }

    /// Run a cycle now without changing parameters.
    pub fn refresh_now(&self) {
        self.refresh.notify_one();
    }

    pub fn store(&self) -> &Arc<ViewStore> {
        &self.store
    }

    pub fn notifications(&self) -> broadcast::Receiver<Arc<Notification>> {
        self.notifier.subscribe()
    }

    pub async fn acknowledge_alarm(&self, id: &AlarmId) -> Result<Arc<Alarm>, CoreError> {
        self.gate.acknowledge(self.store.alarms(), id).await
    }

    pub async fn clear_alarm(&self, id: &AlarmId) -> Result<Arc<Alarm>, CoreError> {
        self.gate.clear(self.store.alarms(), id).await
    }

    /// Stop the loop, cancel the in-flight cycle and wait for both.
    pub async fn close(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!(error = %e, "refresh loop ended abnormally");
            }
        }
        info!("view closed");
    }
}

impl<B: FleetBackend> Drop for View<B> {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

// ── Background loop ──────────────────────────────────────────────────

fn ticker(period: Duration) -> Interval {
    // The first tick completes immediately, which is the on-open cycle.
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval
}

async fn refresh_loop<B: FleetBackend>(
    ctx: Arc<CycleContext<B>>,
    mut target_rx: watch::Receiver<ViewTarget>,
    refresh: Arc<Notify>,
    cancel: CancellationToken,
) {
    let mut target = target_rx.borrow_and_update().clone();
    let mut interval = ticker(target.period(&ctx.config));
    let mut running: Option<(CancellationToken, JoinHandle<()>)> = None;

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            changed = target_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                target = target_rx.borrow_and_update().clone();
                debug!(kind = ?target.kind, range = %target.range, "view target changed");
                interval = ticker(target.period(&ctx.config));
                continue;
            }
            () = refresh.notified() => interval.reset(),
            _ = interval.tick() => {}
        }

        if let Some((token, handle)) = running.take() {
            stop_cycle(token, handle).await;
        }
        if cancel.is_cancelled() {
            break;
        }

        let generation = ctx.store.begin_cycle();
        let token = cancel.child_token();
        debug!(generation, range = %target.range, "starting refresh cycle");
        let handle = tokio::spawn(run_cycle(
            Arc::clone(&ctx),
            target.clone(),
            generation,
            token.clone(),
        ));
        running = Some((token, handle));
    }

    if let Some((token, handle)) = running.take() {
        stop_cycle(token, handle).await;
    }
    debug!("refresh loop stopped");
}

async fn stop_cycle(token: CancellationToken, handle: JoinHandle<()>) {
    token.cancel();
    if let Err(e) = handle.await {
        warn!(error = %e, "refresh cycle ended abnormally");
    }
}

// ── Refresh cycle ────────────────────────────────────────────────────

type Failure = (&'static str, CoreError);

/// Drive one sub-fetch unless the cycle is cancelled first.
async fn part<F>(token: &CancellationToken, name: &'static str, fetch: F) -> Option<Failure>
where
    F: Future<Output = Result<(), CoreError>>,
{
    tokio::select! {
        biased;
        () = token.cancelled() => None,
        result = fetch => result.err().map(|e| (name, e)),
    }
}

async fn run_cycle<B: FleetBackend>(
    ctx: Arc<CycleContext<B>>,
    target: ViewTarget,
    generation: u64,
    token: CancellationToken,
) {
    let failures = match &target.kind {
        ViewKind::Fleet => fleet_cycle(&ctx, target.range, generation, &token).await,
        ViewKind::Unit(id) => unit_cycle(&ctx, id, target.range, generation, &token).await,
    };

    // Parts that finished and failed are reported even when a newer cycle
    // cut the rest short.
    report_failures(&ctx.notifier, generation, &failures);

    if token.is_cancelled() {
        debug!(generation, failed = failures.len(), "refresh cycle superseded");
        return;
    }

    ctx.store.finish_cycle(generation, Utc::now());
    debug!(generation, failed = failures.len(), "refresh cycle finished");
}

/// One error notification naming every failed part.
fn report_failures(notifier: &Notifier, generation: u64, failures: &[Failure]) {
    let Some((_, first)) = failures.first() else {
        return;
    };
    for (name, err) in failures {
        warn!(generation, part = name, error = %err, "refresh sub-fetch failed");
    }
    let names: Vec<&str> = failures.iter().map(|(name, _)| *name).collect();
    notifier.error(
        "Refresh failed",
        format!("Could not load {}: {first}", names.join(", ")),
    );
}

async fn fleet_cycle<B: FleetBackend>(
    ctx: &CycleContext<B>,
    range: TimeRange,
    generation: u64,
    token: &CancellationToken,
) -> Vec<Failure> {
    let (backend, config, store) = (&*ctx.backend, &*ctx.config, &*ctx.store);

    let units = async {
        store.apply_units(generation, fetch::units(backend).await?);
        Ok::<(), CoreError>(())
    };
    let kpis = async {
        store.apply_kpis(generation, fetch::fleet_kpis(backend, config, range).await?);
        Ok::<(), CoreError>(())
    };
    let alarms = async {
        let mut alarms = fetch::recent_alarms(backend, config, None).await?;
        alarms.truncate(config.fleet_alarm_limit);
        store.apply_alarms(generation, alarms);
        Ok::<(), CoreError>(())
    };

    let (units, kpis, alarms) = tokio::join!(
        part(token, "units", units),
        part(token, "KPIs", kpis),
        part(token, "alarms", alarms),
    );
    [units, kpis, alarms].into_iter().flatten().collect()
}

async fn unit_cycle<B: FleetBackend>(
    ctx: &CycleContext<B>,
    id: &UnitId,
    range: TimeRange,
    generation: u64,
    token: &CancellationToken,
) -> Vec<Failure> {
    let (backend, config, store) = (&*ctx.backend, &*ctx.config, &*ctx.store);

    let unit = async {
        store.apply_units(generation, vec![fetch::unit(backend, config, id).await?]);
        Ok::<(), CoreError>(())
    };
    let kpi = async {
        let kpi = fetch::unit_kpi(backend, config, id, range).await?;
        store.apply_kpis(generation, vec![kpi]);
        Ok::<(), CoreError>(())
    };
    let kpi_history = async {
        let points = fetch::kpi_history(backend, config, id, range).await?;
        store.apply_kpi_history(generation, points);
        Ok::<(), CoreError>(())
    };
    let state_history = async {
        let points = fetch::state_history(backend, config, id, range).await?;
        store.apply_state_history(generation, points);
        Ok::<(), CoreError>(())
    };
    let alarms = async {
        let alarms = fetch::recent_alarms(backend, config, Some(id)).await?;
        store.apply_alarms(generation, alarms);
        Ok::<(), CoreError>(())
    };

    let (unit, kpi, kpi_history, state_history, alarms) = tokio::join!(
        part(token, "unit", unit),
        part(token, "KPIs", kpi),
        part(token, "KPI history", kpi_history),
        part(token, "state history", state_history),
        part(token, "alarms", alarms),
    );
    [unit, kpi, kpi_history, state_history, alarms]
        .into_iter()
        .flatten()
        .collect()
}
