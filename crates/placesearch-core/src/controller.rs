// crates/placesearch-core/src/controller.rs

//! # Search Controller
//!
//! A single tokio task owns all view state and processes one ordered event
//! queue: user commands from [`SearchHandle`] and internal completions
//! (debounce timer fired, fetch finished). Every dispatched request carries
//! the generation that was live when it left; a completion whose generation
//! is behind is dropped, so a slow early reply can never overwrite a newer
//! page.
//!
//! ```no_run
//! use placesearch_core::{
//!     ClientConfig, ControllerConfig, CountryTable, GeoDbClient, Phase, SearchController,
//! };
//!
//! # async fn demo() -> placesearch_core::Result<()> {
//! let client = GeoDbClient::new(ClientConfig::new(
//!     "https://wft-geo-db.p.rapidapi.com/v1/geo/cities",
//!     "my-key",
//! )?)?;
//! let table = CountryTable::embedded()?.clone();
//! let mut handle = SearchController::spawn(ControllerConfig::default(), client, table);
//!
//! handle.on_text_change("France")?;
//! let snap = handle.wait_until(|s| s.phase != Phase::Pending && s.phase != Phase::Idle).await?;
//! println!("{} of {} pages", snap.current_page, snap.total_pages);
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use crate::config::ControllerConfig;
use crate::debounce::DebounceGate;
use crate::error::{Result, SearchError};
use crate::executor::QueryExecutor;
use crate::model::{PlaceRecord, ResultPage, SearchQuery};
use crate::pagination::{PageSize, Pagination};
use crate::resolver::Resolver;

pub const STATUS_SEARCHING: &str = "Start Searching...";
pub const STATUS_NO_RESULT: &str = "No result found";
pub const STATUS_FETCH_ERROR: &str = "Error fetching data";

/// Where the controller is in its search cycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Nothing typed yet.
    #[default]
    Idle,
    /// Debounce timer armed or a fetch in flight.
    Pending,
    /// Non-empty rows are displayed.
    Results,
    /// Resolver miss or a zero-result fetch.
    Empty,
    /// The last fetch failed. Stays until the next user action.
    Error,
}

impl Phase {
    pub fn status_message(self) -> &'static str {
        match self {
            Phase::Idle | Phase::Results => "",
            Phase::Pending => STATUS_SEARCHING,
            Phase::Empty => STATUS_NO_RESULT,
            Phase::Error => STATUS_FETCH_ERROR,
        }
    }
}

/// Read-only view of the controller, published on every state change.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Snapshot {
    pub search_text: String,
    pub resolved_code: Option<String>,
    pub rows: Vec<PlaceRecord>,
    pub current_page: u32,
    pub total_pages: u32,
    pub page_size: u32,
    pub phase: Phase,
    pub is_first_page: bool,
    pub is_last_page: bool,
    pub generation: u64,
}

impl Snapshot {
    pub fn status_message(&self) -> &'static str {
        self.phase.status_message()
    }

    /// 1-based position of `index` across all pages.
    pub fn row_number(&self, index: usize) -> u64 {
        u64::from(self.current_page.saturating_sub(1)) * u64::from(self.page_size)
            + index as u64
            + 1
    }

    /// Pagination buttons are only worth showing with more than one page.
    pub fn shows_pagination(&self) -> bool {
        self.total_pages > 1
    }

    pub fn shows_page_size_input(&self) -> bool {
        !self.rows.is_empty()
    }

    /// Target of the "Previous" button; `None` when it is disabled.
    pub fn previous_page(&self) -> Option<u32> {
        (!self.is_first_page).then(|| self.current_page - 1)
    }

    /// Target of the "Next" button; `None` when it is disabled.
    pub fn next_page(&self) -> Option<u32> {
        (!self.is_last_page).then(|| self.current_page + 1)
    }
}

#[derive(Debug)]
enum Command {
    TextChanged(String),
    PageClicked(u32),
    PageSizeChanged(String),
    Shutdown,
}

#[derive(Debug)]
enum Completion {
    DebounceElapsed {
        generation: u64,
    },
    Fetched {
        generation: u64,
        query: SearchQuery,
        outcome: Result<ResultPage>,
    },
}

#[derive(Debug, Default)]
struct ControllerState {
    search_text: String,
    resolved_code: Option<String>,
    pagination: Pagination,
    rows: Vec<PlaceRecord>,
    phase: Phase,
    generation: u64,
}

/// The orchestrator. Construct it with [`SearchController::spawn`] and talk to
/// it through the returned [`SearchHandle`].
pub struct SearchController {
    config: ControllerConfig,
    executor: Arc<dyn QueryExecutor>,
    resolver: Arc<dyn Resolver>,
    state: ControllerState,
    gate: DebounceGate,
    completions_tx: mpsc::UnboundedSender<Completion>,
    completions_rx: mpsc::UnboundedReceiver<Completion>,
    snapshot_tx: watch::Sender<Snapshot>,
}

impl SearchController {
    /// Starts a controller task on the current tokio runtime.
    ///
    /// The task stops on [`SearchHandle::shutdown`] or once every handle is
    /// dropped; either way the pending debounce timer is cancelled.
    pub fn spawn<E, R>(config: ControllerConfig, executor: E, resolver: R) -> SearchHandle
    where
        E: QueryExecutor,
        R: Resolver,
    {
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();

        let state = ControllerState {
            pagination: Pagination::new(config.default_page_size),
            ..ControllerState::default()
        };
        let (snapshot_tx, snapshot_rx) = watch::channel(snapshot_of(&state));

        let controller = SearchController {
            config,
            executor: Arc::new(executor),
            resolver: Arc::new(resolver),
            state,
            gate: DebounceGate::new(),
            completions_tx,
            completions_rx,
            snapshot_tx,
        };
        tokio::spawn(controller.run(commands_rx));

        SearchHandle {
            commands: commands_tx,
            snapshots: snapshot_rx,
        }
    }

    async fn run(mut self, mut commands: mpsc::UnboundedReceiver<Command>) {
        debug!(debounce_ms = self.config.debounce.as_millis() as u64, "search controller started");
        loop {
            tokio::select! {
                biased;
                cmd = commands.recv() => match cmd {
                    Some(Command::Shutdown) | None => break,
                    Some(cmd) => self.handle_command(cmd),
                },
                Some(done) = self.completions_rx.recv() => self.handle_completion(done),
            }
        }
        self.gate.cancel_all();
        debug!(generation = self.state.generation, "search controller stopped");
    }

    fn handle_command(&mut self, cmd: Command) {
        match cmd {
            Command::TextChanged(text) => self.on_text_change(text),
            Command::PageClicked(page) => self.on_page_click(page),
            Command::PageSizeChanged(raw) => self.on_page_size_change(&raw),
            Command::Shutdown => {}
        }
    }

    fn on_text_change(&mut self, text: String) {
        let generation = self.bump_generation();
        self.state.search_text = text;
        // The old search's totals no longer bound page clicks.
        self.state.pagination.clear();
        self.state.rows.clear();
        self.state.phase = Phase::Pending;

        let tx = self.completions_tx.clone();
        self.gate.schedule(self.config.debounce, async move {
            // The controller may already be gone; nothing to do then.
            let _ = tx.send(Completion::DebounceElapsed { generation });
        });
        debug!(generation, text = %self.state.search_text, "text changed, debounce armed");
        self.publish();
    }

    fn on_page_click(&mut self, page: u32) {
        if !self.state.pagination.set_page(page) {
            debug!(
                page,
                current = self.state.pagination.current_page(),
                last = self.state.pagination.last_page(),
                "ignoring page click"
            );
            return;
        }
        let generation = self.bump_generation();
        self.gate.cancel_all();
        self.dispatch(generation);
    }

    fn on_page_size_change(&mut self, raw: &str) {
        let size: PageSize = match raw.parse() {
            Ok(size) => size,
            Err(e) => {
                warn!(error = %e, "rejected page size edit");
                return;
            }
        };
        self.state.pagination.set_page_size(size);
        let generation = self.bump_generation();
        self.gate.cancel_all();
        self.dispatch(generation);
    }

    fn handle_completion(&mut self, done: Completion) {
        match done {
            Completion::DebounceElapsed { generation } => {
                if generation != self.state.generation {
                    debug!(generation, live = self.state.generation, "stale debounce tick");
                    return;
                }
                self.dispatch(generation);
            }
            Completion::Fetched {
                generation,
                query,
                outcome,
            } => {
                if generation != self.state.generation {
                    debug!(
                        generation,
                        live = self.state.generation,
                        page = query.page,
                        "dropping stale reply"
                    );
                    return;
                }
                self.apply(query, outcome);
            }
        }
    }

    /// Resolves the current text and either finishes immediately (miss) or
    /// sends the fetch, stamped with `generation`.
    fn dispatch(&mut self, generation: u64) {
        let query = SearchQuery {
            raw_text: self.state.search_text.clone(),
            resolved_code: self.resolver.resolve(&self.state.search_text),
            page: self.state.pagination.current_page(),
            page_size: self.state.pagination.page_size(),
        };
        self.state.resolved_code = query.resolved_code.clone();

        let Some(request) = query.page_request() else {
            debug!(generation, text = %query.raw_text, "no region code for input");
            self.show_empty();
            self.publish();
            return;
        };

        self.state.phase = Phase::Pending;
        self.publish();

        let executor = Arc::clone(&self.executor);
        let tx = self.completions_tx.clone();
        tokio::spawn(async move {
            // A panicking executor still has to produce a completion.
            let fetch = tokio::spawn(async move { executor.fetch(request).await });
            let outcome = match fetch.await {
                Ok(outcome) => outcome,
                Err(e) => Err(SearchError::Executor(e.to_string())),
            };
            let _ = tx.send(Completion::Fetched {
                generation,
                query,
                outcome,
            });
        });
    }

    fn apply(&mut self, query: SearchQuery, outcome: Result<ResultPage>) {
        match outcome {
            Ok(page) if page.is_empty() => {
                debug!(code = ?query.resolved_code, page = query.page, "empty result page");
                self.show_empty();
            }
            Ok(page) => {
                self.state.pagination.apply_total(page.total_count);
                let last = self.state.pagination.current_page();
                if page.rows.is_empty() && last != query.page {
                    // The result set shrank under the requested page.
                    debug!(requested = query.page, last, "page past the end, fetching last page");
                    let generation = self.bump_generation();
                    self.dispatch(generation);
                    return;
                }
                info!(
                    code = ?query.resolved_code,
                    page = query.page,
                    rows = page.rows.len(),
                    total_count = page.total_count,
                    total_pages = self.state.pagination.total_pages(),
                    "applied result page"
                );
                self.state.rows = page.rows;
                self.state.phase = Phase::Results;
            }
            Err(e) => {
                warn!(error = %e, transport = e.is_transport(), page = query.page, "fetch failed");
                // Totals and page stay so the user can navigate away and retry.
                self.state.rows.clear();
                self.state.phase = Phase::Error;
            }
        }
        self.publish();
    }

    fn show_empty(&mut self) {
        self.state.rows.clear();
        self.state.pagination.clear();
        self.state.phase = Phase::Empty;
    }

    fn bump_generation(&mut self) -> u64 {
        self.state.generation += 1;
        self.state.generation
    }

    fn publish(&self) {
        self.snapshot_tx.send_replace(snapshot_of(&self.state));
    }
}

fn snapshot_of(state: &ControllerState) -> Snapshot {
    let p = &state.pagination;
    Snapshot {
        search_text: state.search_text.clone(),
        resolved_code: state.resolved_code.clone(),
        rows: state.rows.clone(),
        current_page: p.current_page(),
        total_pages: p.total_pages(),
        page_size: p.page_size().get(),
        phase: state.phase,
        is_first_page: p.is_first_page(),
        is_last_page: p.is_last_page(),
        generation: state.generation,
    }
}

/// Cloneable front door to a running [`SearchController`].
///
/// The `on_*` methods never block; they enqueue the gesture and return.
#[derive(Clone, Debug)]
pub struct SearchHandle {
    commands: mpsc::UnboundedSender<Command>,
    snapshots: watch::Receiver<Snapshot>,
}

impl SearchHandle {
    pub fn on_text_change(&self, text: impl Into<String>) -> Result<()> {
        self.send(Command::TextChanged(text.into()))
    }

    pub fn on_page_click(&self, page: u32) -> Result<()> {
        self.send(Command::PageClicked(page))
    }

    /// Takes the raw input; invalid values are ignored by the controller.
    pub fn on_page_size_change(&self, value: impl Into<String>) -> Result<()> {
        self.send(Command::PageSizeChanged(value.into()))
    }

    /// Stops the controller and cancels its pending debounce timer.
    pub fn shutdown(&self) -> Result<()> {
        self.send(Command::Shutdown)
    }

    /// The latest published state.
    pub fn snapshot(&self) -> Snapshot {
        self.snapshots.borrow().clone()
    }

    /// A fresh receiver for presentation layers that want every change.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.snapshots.clone()
    }

    /// Waits for the next published change.
    pub async fn changed(&mut self) -> Result<Snapshot> {
        self.snapshots
            .changed()
            .await
            .map_err(|_| SearchError::ControllerClosed)?;
        Ok(self.snapshots.borrow_and_update().clone())
    }

    /// Waits until a published snapshot satisfies `pred` (checked against the
    /// current one first).
    pub async fn wait_until<F>(&mut self, mut pred: F) -> Result<Snapshot>
    where
        F: FnMut(&Snapshot) -> bool,
    {
        let snap = self
            .snapshots
            .wait_for(|s| pred(s))
            .await
            .map_err(|_| SearchError::ControllerClosed)?;
        Ok(snap.clone())
    }

    fn send(&self, cmd: Command) -> Result<()> {
        self.commands
            .send(cmd)
            .map_err(|_| SearchError::ControllerClosed)
    }
}
