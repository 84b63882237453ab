//! Driver module
//!
//! Reactive loop that keeps the result store in step with the pagination
//! model.
//!
//! # Overview
//!
//! The driver re-evaluates the fetch guard whenever the model changes or the
//! store publishes a new snapshot, and dispatches whatever the guard admits.
//! A finished fetch that reports more pages is itself a store change, so the
//! current page keeps being re-fetched while the node has more data. Repeats
//! of the same request are spaced by `refresh_interval`; a new request is
//! dispatched immediately.

use crate::error::Result;
use crate::pagination::{
    decide, FetchController, FetchDecision, PageRequest, PageSizeOptions, PaginationModel,
    SkipReason,
};
use crate::store::{ResultStore, StoreSnapshot};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info};

/// Driver settings
#[derive(Debug, Clone)]
pub struct DriverConfig {
    /// Minimum spacing between two dispatches of the same request
    pub refresh_interval: Duration,
    /// Allowed page sizes
    pub page_size_options: PageSizeOptions,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            refresh_interval: Duration::from_secs(1),
            page_size_options: PageSizeOptions::default(),
        }
    }
}

/// Handle to a running driver loop
///
/// Dropping the handle stops the loop; a fetch already in flight still
/// completes into the store.
pub struct PageDriver {
    model: watch::Sender<PaginationModel>,
    store: Arc<ResultStore>,
    options: PageSizeOptions,
    task: JoinHandle<()>,
}

impl PageDriver {
    /// Start the loop; the first guard evaluation happens immediately
    pub fn spawn(
        store: Arc<ResultStore>,
        initial: PaginationModel,
        config: DriverConfig,
    ) -> Result<Self> {
        config.page_size_options.validate(initial.page_size)?;

        let (model, model_rx) = watch::channel(initial);
        let task = tokio::spawn(run(Arc::clone(&store), model_rx, config.refresh_interval));

        Ok(Self {
            model,
            store,
            options: config.page_size_options,
            task,
        })
    }

    /// Current pagination model
    pub fn model(&self) -> PaginationModel {
        *self.model.borrow()
    }

    /// The store this driver feeds
    pub fn store(&self) -> &Arc<ResultStore> {
        &self.store
    }

    /// Replace the model; unchanged models do not wake the loop
    pub fn set_model(&self, model: PaginationModel) -> Result<()> {
        self.options.validate(model.page_size)?;
        self.update(|_| model);
        Ok(())
    }

    /// Go to a page, keeping the page size
    pub fn set_page(&self, page: u32) {
        self.update(|current| current.with_page(page));
    }

    /// Change the page size, keeping the page index
    pub fn set_page_size(&self, page_size: u32) -> Result<()> {
        let model = self.model().with_page_size(page_size)?;
        self.set_model(model)
    }

    /// Go to the following page
    pub fn next_page(&self) {
        self.update(PaginationModel::next);
    }

    /// Go to the preceding page
    pub fn prev_page(&self) {
        self.update(PaginationModel::prev);
    }

    fn update(&self, f: impl FnOnce(PaginationModel) -> PaginationModel) {
        self.model.send_if_modified(|current| {
            let next = f(*current);
            let changed = next != *current;
            *current = next;
            changed
        });
    }

    /// Wait until the store reflects `model`, or the timeout passes
    ///
    /// Returns the latest snapshot either way. Callers pass the model they
    /// set, since another caller may have moved the driver since.
    pub async fn wait_settled(&self, model: PaginationModel, timeout: Duration) -> StoreSnapshot {
        let mut rx = self.store.subscribe();
        let settled = tokio::time::timeout(timeout, rx.wait_for(|s| is_settled(&model, s)))
            .await
            .is_ok();
        if !settled {
            debug!(?model, "Store did not settle before timeout");
        }
        self.store.snapshot()
    }

    /// Stop the loop and wait for it to exit
    pub async fn shutdown(self) {
        let Self { model, task, .. } = self;
        drop(model);
        let _ = task.await;
    }
}

impl std::fmt::Debug for PageDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageDriver")
            .field("model", &self.model())
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

/// Whether a snapshot answers the given model
///
/// True when nothing is in flight and either the latest dispatch was for this
/// model's request, or the guard refuses to fetch at all.
pub fn is_settled(model: &PaginationModel, snapshot: &StoreSnapshot) -> bool {
    if snapshot.is_loading() {
        return false;
    }
    let exhausted = decide(model, snapshot.result.has_next_page, snapshot.status)
        == FetchDecision::Skip(SkipReason::Exhausted);
    exhausted || snapshot.pending_request == Some(model.request())
}

async fn run(
    store: Arc<ResultStore>,
    mut model_rx: watch::Receiver<PaginationModel>,
    refresh_interval: Duration,
) {
    let controller = FetchController::new();
    let mut store_rx = store.subscribe();
    let mut last_dispatch: Option<(PageRequest, Instant)> = None;

    info!("Page driver started");
    loop {
        let model = *model_rx.borrow_and_update();
        // The snapshot borrow must end before dispatching, which writes to it.
        let decision = {
            let snapshot = store_rx.borrow_and_update();
            controller.evaluate(&model, &snapshot.result, snapshot.status)
        };

        if let FetchDecision::Fetch(request) = decision {
            let wait = match last_dispatch {
                Some((last, at)) if last == request => {
                    (at + refresh_interval).saturating_duration_since(Instant::now())
                }
                _ => Duration::ZERO,
            };

            if wait.is_zero() {
                last_dispatch = Some((request, Instant::now()));
                drop(store.dispatch(request));
            } else {
                debug!(%request, ?wait, "Delaying repeat fetch");
                tokio::select! {
                    () = tokio::time::sleep(wait) => {}
                    changed = model_rx.changed() => {
                        if changed.is_err() {
                            break;
                        }
                    }
                }
                continue;
            }
        }

        tokio::select! {
            changed = model_rx.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            changed = store_rx.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }
    }
    info!("Page driver stopped");
}

#[cfg(test)]
mod tests;
