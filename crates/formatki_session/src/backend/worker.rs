//! Background worker thread for remote catalog access.

use crate::backend::{CoreCmd, CoreErrorSource, CoreEvent};
use crossbeam_channel::{unbounded, Receiver, Sender};
use formatki_core::{config::env_flag_enabled, CatalogError, RemoteCatalog};
use std::thread;
use std::time::Instant;
use tracing::{error, info, warn};

/// Handle for sending commands to, and receiving events from, the backend worker.
pub struct BackendHandle {
    pub cmd_tx: Sender<CoreCmd>,
    pub evt_rx: Receiver<CoreEvent>,
}

impl BackendHandle {
    /// Build a handle with no worker behind it.
    ///
    /// The caller receives the command receiver and event sender and plays the
    /// worker's role itself, e.g. to deliver responses out of order.
    pub fn detached() -> (Self, Receiver<CoreCmd>, Sender<CoreEvent>) {
        let (cmd_tx, cmd_rx) = unbounded();
        let (evt_tx, evt_rx) = unbounded();
        (Self { cmd_tx, evt_rx }, cmd_rx, evt_tx)
    }
}

fn send_error(evt_tx: &Sender<CoreEvent>, source: CoreErrorSource, error: CatalogError) {
    let _ = evt_tx.send(CoreEvent::Error { source, error });
}

/// Guarantees exactly one completion event per generation request.
///
/// If the catalog panics mid-request the guard still reports a failure while
/// unwinding, so the session never stays busy. This needs `panic = "unwind"`
/// (dev and test profiles); the release profile aborts the whole process on
/// panic, so no session outlives the failed request.
struct GenerateCompletion<'a> {
    evt_tx: &'a Sender<CoreEvent>,
    done: bool,
}

impl GenerateCompletion<'_> {
    fn finish(mut self, event: CoreEvent) {
        self.done = true;
        let _ = self.evt_tx.send(event);
    }
}

impl Drop for GenerateCompletion<'_> {
    fn drop(&mut self) {
        if !self.done {
            send_error(
                self.evt_tx,
                CoreErrorSource::Generate,
                CatalogError::Transport("generation aborted".to_string()),
            );
        }
    }
}

fn log_request_perf(enabled: bool, op: &str, started: Instant, items: usize, ok: bool) {
    if !enabled {
        return;
    }
    info!(
        target: "formatki_session::backend_perf",
        op = op,
        ok = ok,
        elapsed_ms = started.elapsed().as_secs_f64() * 1000.0,
        items = items,
        "backend request perf"
    );
}

fn run_command<C: RemoteCatalog>(
    catalog: &mut C,
    cmd: CoreCmd,
    evt_tx: &Sender<CoreEvent>,
    perf_log_enabled: bool,
) {
    let started = Instant::now();
    match cmd {
        CoreCmd::LoadCategories => match catalog.categories() {
            Ok(items) => {
                log_request_perf(perf_log_enabled, "categories", started, items.len(), true);
                let _ = evt_tx.send(CoreEvent::CategoriesLoaded { items });
            }
            Err(err) => {
                log_request_perf(perf_log_enabled, "categories", started, 0, false);
                error!("backend categories failed: {}", err);
                send_error(evt_tx, CoreErrorSource::Categories, err);
            }
        },
        CoreCmd::FetchGtList { epoch, category } => match catalog.gt_list(&category) {
            Ok(items) => {
                log_request_perf(perf_log_enabled, "gt_list", started, items.len(), true);
                let _ = evt_tx.send(CoreEvent::GtListLoaded {
                    epoch,
                    category,
                    items,
                });
            }
            Err(err) => {
                log_request_perf(perf_log_enabled, "gt_list", started, 0, false);
                error!(category = %category, "backend GT list failed: {}", err);
                send_error(evt_tx, CoreErrorSource::GtList { epoch }, err);
            }
        },
        CoreCmd::FetchKwList { epoch, gt_list } => match catalog.kw_list(&gt_list) {
            Ok(items) => {
                log_request_perf(perf_log_enabled, "kw_list", started, items.len(), true);
                let _ = evt_tx.send(CoreEvent::KwListLoaded { epoch, items });
            }
            Err(err) => {
                log_request_perf(perf_log_enabled, "kw_list", started, 0, false);
                error!(gt_count = gt_list.len(), "backend KW list failed: {}", err);
                send_error(evt_tx, CoreErrorSource::KwList { epoch }, err);
            }
        },
        CoreCmd::ResolveGt {
            epoch,
            category,
            raw,
        } => match catalog.resolve_gt(&category, &raw) {
            Ok(items) => {
                log_request_perf(perf_log_enabled, "resolve_gt", started, items.len(), true);
                let _ = evt_tx.send(CoreEvent::GtResolved { epoch, items });
            }
            Err(err) => {
                log_request_perf(perf_log_enabled, "resolve_gt", started, 0, false);
                error!(category = %category, "backend GT resolve failed: {}", err);
                send_error(evt_tx, CoreErrorSource::ResolveGt { epoch }, err);
            }
        },
        CoreCmd::Generate { request } => {
            let completion = GenerateCompletion {
                evt_tx,
                done: false,
            };
            let result = catalog.generate(&request);
            log_request_perf(perf_log_enabled, "generate", started, 1, result.is_ok());
            match result {
                Ok(outcome) => completion.finish(CoreEvent::Generated { outcome }),
                Err(err) => {
                    warn!(category = %request.category, "backend generate failed: {}", err);
                    completion.finish(CoreEvent::Error {
                        source: CoreErrorSource::Generate,
                        error: err,
                    });
                }
            }
        }
    }
}

/// Spawn the backend worker thread that performs blocking remote calls.
///
/// Commands run one at a time in the order sent; each produces exactly one
/// [`CoreEvent`]. The thread exits once every command sender is dropped.
///
/// # Returns
/// A [`BackendHandle`] containing the command sender and event receiver.
///
/// # Panics
/// Panics if the worker thread cannot be spawned.
pub fn spawn_backend<C>(mut catalog: C) -> BackendHandle
where
    C: RemoteCatalog + 'static,
{
    let (cmd_tx, cmd_rx) = unbounded();
    let (evt_tx, evt_rx) = unbounded();

    thread::Builder::new()
        .name("formatki-backend".to_string())
        .spawn(move || {
            let perf_log_enabled = env_flag_enabled("FORMATKI_BACKEND_PERF_LOG");
            for cmd in cmd_rx.iter() {
                run_command(&mut catalog, cmd, &evt_tx, perf_log_enabled);
            }
        })
        .expect("spawn backend thread");

    BackendHandle { cmd_tx, evt_rx }
}
