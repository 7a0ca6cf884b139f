//! The engine task: owns all filter state and recomputes the view.

use std::sync::Arc;

use kuralist_core::{
    filter_schools, Category, FilterCriteria, FilterSheet, OptionResolver, School, SchoolSnapshot,
};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::Instant;
use tracing::{debug, info};

use super::command::Command;
use super::FilteredView;
use crate::config::EngineConfig;

/// What woke the loop.
enum Event {
    Command(Option<Command>),
    RecordsChanged,
    FeedClosed,
    DebounceElapsed,
}

/// Output channels the actor publishes on.
pub(crate) struct Outputs {
    pub view: watch::Sender<FilteredView>,
    pub criteria: watch::Sender<FilterCriteria>,
    pub sheet: watch::Sender<Option<FilterSheet>>,
}

pub(crate) struct EngineActor {
    config: EngineConfig,
    commands: mpsc::UnboundedReceiver<Command>,
    feed: watch::Receiver<SchoolSnapshot>,
    feed_open: bool,
    snapshot: SchoolSnapshot,
    /// Criteria as last set by intents; search text is pre-debounce.
    raw: FilterCriteria,
    /// Search text currently participating in filtering.
    applied_search: String,
    search_deadline: Option<Instant>,
    resolver: OptionResolver,
    revision: u64,
    outputs: Outputs,
}

impl EngineActor {
    /// Builds the actor and computes the initial view from the feed's
    /// current snapshot, so subscribers never observe an unfiltered gap.
    pub(crate) fn new(
        config: EngineConfig,
        commands: mpsc::UnboundedReceiver<Command>,
        mut feed: watch::Receiver<SchoolSnapshot>,
        outputs: Outputs,
    ) -> Self {
        let snapshot = feed.borrow_and_update().clone();
        let mut actor = Self {
            config,
            commands,
            feed,
            feed_open: true,
            snapshot,
            raw: FilterCriteria::default(),
            applied_search: String::new(),
            search_deadline: None,
            resolver: OptionResolver::new(),
            revision: 0,
            outputs,
        };
        if actor.config.warm_option_cache {
            actor.resolver.warm(&actor.snapshot);
        }
        actor.recompute();
        actor
    }

    /// Runs until shutdown or until every handle is dropped.
    pub(crate) async fn run(mut self) {
        loop {
            let deadline = self.search_deadline.unwrap_or_else(Instant::now);
            let event = tokio::select! {
                command = self.commands.recv() => Event::Command(command),
                changed = self.feed.changed(), if self.feed_open => match changed {
                    Ok(()) => Event::RecordsChanged,
                    Err(_) => Event::FeedClosed,
                },
                () = tokio::time::sleep_until(deadline), if self.search_deadline.is_some() => {
                    Event::DebounceElapsed
                }
            };

            match event {
                Event::Command(None) => break,
                Event::Command(Some(command)) => {
                    if !self.handle_batch(command) {
                        break;
                    }
                }
                Event::RecordsChanged => {
                    self.load_snapshot();
                    self.recompute();
                }
                Event::FeedClosed => {
                    info!("record feed closed, keeping last snapshot");
                    self.feed_open = false;
                }
                Event::DebounceElapsed => {
                    self.search_deadline = None;
                    if self.apply_pending_search() {
                        self.recompute();
                    }
                }
            }
        }
        debug!(revision = self.revision, "filter engine stopped");
    }

    /// Applies `first` plus every command already queued behind it, then
    /// recomputes at most once. Returns `false` on shutdown.
    fn handle_batch(&mut self, first: Command) -> bool {
        // A record update racing the batch is applied first so replies
        // reflect the latest snapshot.
        let mut dirty = matches!(self.feed.has_changed(), Ok(true));
        if dirty {
            self.load_snapshot();
        }
        let mut flushes: Vec<oneshot::Sender<FilteredView>> = Vec::new();
        let mut next = Some(first);

        while let Some(command) = next {
            match command {
                Command::Shutdown => return false,
                Command::Flush(reply) => {
                    self.search_deadline = None;
                    dirty |= self.apply_pending_search();
                    flushes.push(reply);
                }
                other => dirty |= self.apply(other),
            }
            next = self.commands.try_recv().ok();
        }

        if dirty {
            self.recompute();
        }
        for reply in flushes {
            let _ = reply.send(self.outputs.view.borrow().clone());
        }
        true
    }

    /// Applies one intent. Returns whether the filtered view is now stale.
    fn apply(&mut self, command: Command) -> bool {
        match command {
            Command::SetSearchText(text) => self.set_search_text(text),
            Command::SetCategory { category, value } => {
                let previous = self.raw.set_category(category, value.clone());
                self.close_sheet();
                self.publish_criteria();
                previous.as_deref() != Some(value.as_str())
            }
            Command::ClearCategory(category) => {
                let removed = self.raw.clear_category(category).is_some();
                if removed {
                    self.publish_criteria();
                }
                removed
            }
            Command::ToggleCategory(category) => {
                if self.raw.clear_category(category).is_some() {
                    self.publish_criteria();
                    true
                } else {
                    self.open_sheet(category);
                    false
                }
            }
            Command::ToggleThreshold(filter) => {
                self.raw.toggle(filter);
                self.publish_criteria();
                true
            }
            Command::ClearAll => {
                let stale = self.raw != FilterCriteria::default() || !self.applied_search.is_empty();
                self.raw.clear();
                self.applied_search.clear();
                self.search_deadline = None;
                self.close_sheet();
                self.publish_criteria();
                stale
            }
            Command::RequestOptions { category, reply } => {
                let options = self.open_sheet(category);
                if let Some(reply) = reply {
                    let _ = reply.send(options);
                }
                false
            }
            Command::DismissSheet => {
                self.close_sheet();
                false
            }
            Command::Flush(_) | Command::Shutdown => false,
        }
    }

    fn set_search_text(&mut self, text: String) -> bool {
        if text == self.raw.search_text {
            return false;
        }
        self.raw.search_text = text;
        self.publish_criteria();

        if self.config.search_debounce.is_zero() {
            return self.apply_pending_search();
        }
        self.search_deadline = Some(Instant::now() + self.config.search_debounce);
        false
    }

    /// Promotes the raw search text to the applied one. Returns whether it changed.
    fn apply_pending_search(&mut self) -> bool {
        if self.applied_search == self.raw.search_text {
            return false;
        }
        self.applied_search.clone_from(&self.raw.search_text);
        true
    }

    /// Takes the feed's current snapshot and refreshes derived option lists.
    fn load_snapshot(&mut self) {
        self.snapshot = self.feed.borrow_and_update().clone();
        self.resolver.invalidate();
        if self.config.warm_option_cache {
            self.resolver.warm(&self.snapshot);
        }
        let open = self.outputs.sheet.borrow().as_ref().map(|sheet| sheet.category);
        if let Some(category) = open {
            self.open_sheet(category);
        }
        debug!(
            version = self.snapshot.version(),
            count = self.snapshot.len(),
            "record set replaced"
        );
    }

    fn open_sheet(&mut self, category: Category) -> Arc<[String]> {
        let options = self.resolver.resolve(category, &self.snapshot);
        self.outputs.sheet.send_replace(Some(FilterSheet {
            category,
            options: Arc::clone(&options),
            selected: self.raw.selected(category).map(str::to_string),
        }));
        options
    }

    fn close_sheet(&mut self) {
        self.outputs.sheet.send_if_modified(|sheet| sheet.take().is_some());
    }

    fn publish_criteria(&self) {
        self.outputs.criteria.send_replace(self.raw.clone());
    }

    fn applied_criteria(&self) -> FilterCriteria {
        FilterCriteria {
            search_text: self.applied_search.clone(),
            category_filters: self.raw.category_filters.clone(),
            threshold_filters: self.raw.threshold_filters.clone(),
        }
    }

    fn recompute(&mut self) {
        let criteria = self.applied_criteria();
        let schools: Arc<[School]> = filter_schools(self.snapshot.schools(), &criteria)
            .into_iter()
            .cloned()
            .collect();
        self.revision += 1;

        debug!(
            revision = self.revision,
            matched = schools.len(),
            total = self.snapshot.len(),
            "recomputed filtered view"
        );

        self.outputs.view.send_replace(FilteredView {
            revision: self.revision,
            snapshot_version: self.snapshot.version(),
            total: self.snapshot.len(),
            criteria,
            schools,
        });
    }
}
