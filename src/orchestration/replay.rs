//! Replays a recorded event log into the entity store.
//!
//! The log is JSON lines, one [`IndexedEvent`] per line. Events are applied in
//! canonical chain order regardless of their order in the file.

use super::bootstrap::{PoolCreated, PoolRegistrar, Registration};
use crate::domain::{sort_events_canonical, EventContext, PoolEvent, PoolEventKind};
use crate::engine::PoolEventReducer;
use crate::error::IndexerError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

const PROGRESS_INTERVAL: usize = 10_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexedEvent {
    PoolCreated(PoolCreated),
    Pool(PoolEvent),
}

impl IndexedEvent {
    pub fn context(&self) -> &EventContext {
        match self {
            IndexedEvent::PoolCreated(created) => &created.context,
            IndexedEvent::Pool(event) => &event.context,
        }
    }
}

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("Failed to read event log: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid event on line {line}: {source}")]
    Parse {
        line: usize,
        source: serde_json::Error,
    },
    #[error("Failed to apply {event}: {source}")]
    Apply {
        event: String,
        source: IndexerError,
    },
}

/// Number of events applied, per kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    pub pools_created: usize,
    pub pools_skipped: usize,
    pub initialize: usize,
    pub mint: usize,
    pub burn: usize,
    pub swap: usize,
    pub flash: usize,
}

impl ReplaySummary {
    pub fn total(&self) -> usize {
        self.pools_created
            + self.pools_skipped
            + self.initialize
            + self.mint
            + self.burn
            + self.swap
            + self.flash
    }

    fn record(&mut self, kind: &PoolEventKind) {
        match kind {
            PoolEventKind::Initialize(_) => self.initialize += 1,
            PoolEventKind::Mint(_) => self.mint += 1,
            PoolEventKind::Burn(_) => self.burn += 1,
            PoolEventKind::Swap(_) => self.swap += 1,
            PoolEventKind::Flash(_) => self.flash += 1,
        }
    }
}

/// Parse a JSON-lines event log. Blank lines are ignored.
pub fn parse_events(content: &str) -> Result<Vec<IndexedEvent>, ReplayError> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| {
            serde_json::from_str(line).map_err(|source| ReplayError::Parse {
                line: idx + 1,
                source,
            })
        })
        .collect()
}

pub async fn load_events(path: impl AsRef<Path>) -> Result<Vec<IndexedEvent>, ReplayError> {
    let content = tokio::fs::read_to_string(path).await?;
    parse_events(&content)
}

/// Applies events one at a time; the first failure stops the replay.
#[derive(Debug, Clone)]
pub struct Replayer {
    registrar: PoolRegistrar,
    reducer: PoolEventReducer,
}

impl Replayer {
    pub fn new(registrar: PoolRegistrar, reducer: PoolEventReducer) -> Self {
        Self { registrar, reducer }
    }

    pub async fn replay(&self, mut events: Vec<IndexedEvent>) -> Result<ReplaySummary, ReplayError> {
        sort_events_canonical(&mut events, IndexedEvent::context);
        info!(events = events.len(), "Replaying events");

        let mut summary = ReplaySummary::default();
        for (idx, event) in events.iter().enumerate() {
            self.apply(event, &mut summary).await?;

            let processed = idx + 1;
            if processed % PROGRESS_INTERVAL == 0 {
                info!(processed, block = event.context().block_number, "Replay progress");
            }
        }

        info!(
            pools_created = summary.pools_created,
            pools_skipped = summary.pools_skipped,
            initialize = summary.initialize,
            mint = summary.mint,
            burn = summary.burn,
            swap = summary.swap,
            flash = summary.flash,
            "Replay complete"
        );
        Ok(summary)
    }

    async fn apply(
        &self,
        event: &IndexedEvent,
        summary: &mut ReplaySummary,
    ) -> Result<(), ReplayError> {
        match event {
            IndexedEvent::PoolCreated(created) => {
                let registration =
                    self.registrar
                        .register(created)
                        .await
                        .map_err(|source| ReplayError::Apply {
                            event: format!("pool_created({})", created.pool),
                            source,
                        })?;
                match registration {
                    Registration::Created => summary.pools_created += 1,
                    Registration::Skipped => summary.pools_skipped += 1,
                    Registration::AlreadyRegistered => {
                        debug!(pool = %created.pool, "Pool already registered");
                    }
                }
            }
            IndexedEvent::Pool(pool_event) => {
                self.reducer
                    .handle(pool_event)
                    .await
                    .map_err(|source| ReplayError::Apply {
                        event: pool_event.to_string(),
                        source,
                    })?;
                summary.record(&pool_event.kind);
            }
        }
        Ok(())
    }
}
