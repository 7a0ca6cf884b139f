//! The Filter State Engine.
//!
//! One tokio task owns the search text, category filters, threshold toggles,
//! the current record snapshot and the per-category option cache. Handles
//! ([`FilterEngine`]) send intents over an unbounded channel; the task
//! serializes them together with record feed updates and the search
//! debounce timer, and publishes results on `watch` channels.
//!
//! Intents queued back to back are applied as one batch and produce a single
//! recomputation, so callers never observe intermediate states.

mod actor;
mod command;

use std::str::FromStr;
use std::sync::Arc;

use kuralist_core::{
    Category, FilterCriteria, FilterSheet, School, SchoolSnapshot, ThresholdFilter,
};
use parking_lot::Mutex;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info_span, warn, Instrument};
use uuid::Uuid;

use self::actor::{EngineActor, Outputs};
use self::command::Command;
use crate::config::EngineConfig;

// ---------------------------------------------------------------------------
// FilteredView
// ---------------------------------------------------------------------------

/// One emission of the filtered result feed.
#[derive(Debug, Clone)]
pub struct FilteredView {
    /// Increments on every recomputation.
    pub revision: u64,
    /// Version of the record snapshot the view was computed from.
    pub snapshot_version: u64,
    /// Criteria that produced this view (search text post-debounce).
    pub criteria: FilterCriteria,
    /// Matching records sorted by name.
    pub schools: Arc<[School]>,
    /// Size of the unfiltered record set.
    pub total: usize,
}

impl Default for FilteredView {
    fn default() -> Self {
        Self {
            revision: 0,
            snapshot_version: 0,
            criteria: FilterCriteria::default(),
            schools: Arc::from(Vec::new()),
            total: 0,
        }
    }
}

impl FilteredView {
    #[must_use]
    pub fn len(&self) -> usize {
        self.schools.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.schools.is_empty()
    }

    /// Display names in result order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.schools.iter().map(|s| s.school_name.as_str()).collect()
    }
}

// ---------------------------------------------------------------------------
// FilterEngine
// ---------------------------------------------------------------------------

/// Cloneable handle to a running engine task.
///
/// Every clone talks to the same engine, so one instance can be shared by
/// several screens to keep their selections consistent. Mutators never fail:
/// intents sent after shutdown are dropped.
#[derive(Clone)]
pub struct FilterEngine {
    commands: mpsc::UnboundedSender<Command>,
    view: watch::Receiver<FilteredView>,
    criteria: watch::Receiver<FilterCriteria>,
    sheet: watch::Receiver<Option<FilterSheet>>,
    task: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl FilterEngine {
    /// Binds a new engine to `feed` and starts its task.
    ///
    /// The initial view is computed before this returns, so
    /// [`current`](Self::current) already reflects the feed's snapshot.
    /// Must be called within a tokio runtime.
    #[must_use]
    pub fn spawn(config: EngineConfig, feed: watch::Receiver<SchoolSnapshot>) -> Self {
        let (commands, rx) = mpsc::unbounded_channel();
        let (view_tx, view) = watch::channel(FilteredView::default());
        let (criteria_tx, criteria) = watch::channel(FilterCriteria::default());
        let (sheet_tx, sheet) = watch::channel(None);

        let actor = EngineActor::new(
            config,
            rx,
            feed,
            Outputs {
                view: view_tx,
                criteria: criteria_tx,
                sheet: sheet_tx,
            },
        );
        let span = info_span!("filter_engine", engine_id = %Uuid::new_v4());
        let handle = tokio::spawn(actor.run().instrument(span));

        Self {
            commands,
            view,
            criteria,
            sheet,
            task: Arc::new(Mutex::new(Some(handle))),
        }
    }

    fn send(&self, command: Command) {
        if self.commands.send(command).is_err() {
            debug!("filter engine stopped, intent dropped");
        }
    }

    // -- Mutators ------------------------------------------------------------

    /// Replaces the raw search text. Filtering picks it up after the
    /// debounce window elapses without further edits.
    pub fn set_search_text(&self, text: impl Into<String>) {
        self.send(Command::SetSearchText(text.into()));
    }

    /// Sets or replaces the selected value for `category` and closes any
    /// open option sheet.
    pub fn set_category_filter(&self, category: Category, value: impl Into<String>) {
        self.send(Command::SetCategory {
            category,
            value: value.into(),
        });
    }

    /// Removes the filter for `category`; no-op when none is set.
    pub fn clear_category_filter(&self, category: Category) {
        self.send(Command::ClearCategory(category));
    }

    /// Clears `category` when it has a value, otherwise opens its option sheet.
    pub fn toggle_category_filter(&self, category: Category) {
        self.send(Command::ToggleCategory(category));
    }

    /// Flips a threshold filter.
    pub fn toggle_filter(&self, filter: ThresholdFilter) {
        self.send(Command::ToggleThreshold(filter));
    }

    /// [`set_category_filter`](Self::set_category_filter) by category name.
    /// Unknown names are logged and ignored.
    pub fn set_category_filter_named(&self, category: &str, value: impl Into<String>) {
        match Category::from_str(category) {
            Ok(category) => self.set_category_filter(category, value),
            Err(err) => warn!(%err, "ignoring category filter"),
        }
    }

    /// [`toggle_category_filter`](Self::toggle_category_filter) by category
    /// name. Unknown names are logged and ignored.
    pub fn toggle_category_filter_named(&self, category: &str) {
        match Category::from_str(category) {
            Ok(category) => self.toggle_category_filter(category),
            Err(err) => warn!(%err, "ignoring category toggle"),
        }
    }

    /// [`toggle_filter`](Self::toggle_filter) by filter name. Unknown names
    /// are logged and ignored.
    pub fn toggle_filter_named(&self, name: &str) {
        match ThresholdFilter::from_str(name) {
            Ok(filter) => self.toggle_filter(filter),
            Err(err) => warn!(%err, "ignoring threshold toggle"),
        }
    }

    /// Resets search text, category filters and toggles in one step.
    /// Cancels a pending search debounce.
    pub fn clear_all_filters(&self) {
        self.send(Command::ClearAll);
    }

    /// Opens the option sheet for `category` without waiting for the options.
    pub fn open_options_sheet(&self, category: Category) {
        self.send(Command::RequestOptions {
            category,
            reply: None,
        });
    }

    /// Closes the option sheet without touching any filter.
    pub fn dismiss_options_sheet(&self) {
        self.send(Command::DismissSheet);
    }

    // -- Queries -------------------------------------------------------------

    /// Opens the option sheet for `category` and returns its distinct values.
    ///
    /// Returns an empty list if the engine has stopped.
    pub async fn request_options(&self, category: Category) -> Arc<[String]> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::RequestOptions {
            category,
            reply: Some(reply),
        });
        rx.await.unwrap_or_else(|_| Arc::from(Vec::new()))
    }

    /// Applies any pending search text immediately and returns the
    /// resulting view. Falls back to the last published view if the engine
    /// has stopped.
    pub async fn flush(&self) -> FilteredView {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Flush(reply));
        match rx.await {
            Ok(view) => view,
            Err(_) => self.current(),
        }
    }

    /// Filtered result feed.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<FilteredView> {
        self.view.clone()
    }

    /// Latest filtered view.
    #[must_use]
    pub fn current(&self) -> FilteredView {
        self.view.borrow().clone()
    }

    /// Raw criteria feed; search text here is not debounced.
    #[must_use]
    pub fn criteria(&self) -> watch::Receiver<FilterCriteria> {
        self.criteria.clone()
    }

    /// Option sheet feed; `None` while closed.
    #[must_use]
    pub fn sheet(&self) -> watch::Receiver<Option<FilterSheet>> {
        self.sheet.clone()
    }

    // -- Lifecycle -----------------------------------------------------------

    /// Stops the engine task and waits for it to exit. Idempotent.
    pub async fn shutdown(&self) {
        self.send(Command::Shutdown);
        let handle = self.task.lock().take();
        if let Some(handle) = handle {
            if let Err(err) = handle.await {
                warn!(%err, "filter engine task ended abnormally");
            }
        }
    }

    /// Whether the engine task is still running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        !self.commands.is_closed()
    }
}

impl std::fmt::Debug for FilterEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterEngine")
            .field("revision", &self.view.borrow().revision)
            .field("running", &self.is_running())
            .finish_non_exhaustive()
    }
}
