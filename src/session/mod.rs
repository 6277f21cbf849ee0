// src/session/mod.rs

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc, PoisonError, RwLock,
};
use tracing::{debug, info};

use crate::process::ResolvedTable;

pub mod query;

pub use query::{query, Point, Scalar, Series, TimeRange};

/// The currently selected file, resolved. The table and its time axis travel together.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub source: String,
    pub table: ResolvedTable,
}

impl Dataset {
    pub fn new(source: impl Into<String>, table: ResolvedTable) -> Self {
        Self {
            source: source.into(),
            table,
        }
    }

    pub fn timestamp_column(&self) -> &str {
        self.table.timestamp_column()
    }
}

/// Sequence number taken when a selection starts resolving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

#[derive(Debug, Default)]
struct Published {
    ticket: u64,
    dataset: Option<Arc<Dataset>>,
}

/// Holds the Session Dataset. Readers get a consistent `Arc` snapshot; the
/// only writer path is `publish`, which swaps the whole dataset under the lock.
#[derive(Debug, Default)]
pub struct Session {
    issued: AtomicU64,
    state: RwLock<Published>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a selection. Any ticket issued earlier becomes stale.
    pub fn begin(&self) -> Ticket {
        Ticket(self.issued.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Replace the dataset if `ticket` is still the latest selection.
    /// Returns `false` when the result is stale and was discarded.
    pub fn publish(&self, ticket: Ticket, dataset: Dataset) -> bool {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        let latest = self.issued.load(Ordering::SeqCst);
        if ticket.0 != latest || ticket.0 <= state.ticket {
            debug!(ticket = ticket.0, latest, "discarding stale dataset");
            return false;
        }
        info!(
            source = %dataset.source,
            rows = dataset.table.num_rows(),
            "published dataset"
        );
        state.ticket = ticket.0;
        state.dataset = Some(Arc::new(dataset));
        true
    }

    pub fn current(&self) -> Option<Arc<Dataset>> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .dataset
            .clone()
    }
}
