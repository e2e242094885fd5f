//! Persistence hand-off - queued, non-blocking, idempotent
//!
//! Belief formation never waits for external storage. Snapshots go onto an
//! unbounded channel; a drain task delivers them to the configured
//! `BeliefSink`. Delivery is deduplicated by (belief id, version, event), so
//! a duplicate enqueue or a collaborator-side retry can never re-trigger
//! belief formation or double-deliver a snapshot.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::mpsc;
use uuid::Uuid;

use doxa_core::{BeliefEvent, BeliefSink, BeliefSnapshot};

/// Sink that only logs. Useful as a default while wiring a deployment.
#[derive(Debug, Default)]
pub struct NullSink;

#[async_trait]
impl BeliefSink for NullSink {
    async fn persist(&self, snapshot: BeliefSnapshot) -> anyhow::Result<()> {
        tracing::debug!(
            belief = %snapshot.belief.id,
            version = snapshot.belief.version,
            event = ?snapshot.event,
            "NullSink dropping snapshot"
        );
        Ok(())
    }
}

/// In-memory sink for tests and inspection.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<BeliefSnapshot>>,
}

impl MemorySink {
    pub fn records(&self) -> Vec<BeliefSnapshot> {
        self.records.lock().expect("sink mutex poisoned").clone()
    }
}

#[async_trait]
impl BeliefSink for MemorySink {
    async fn persist(&self, snapshot: BeliefSnapshot) -> anyhow::Result<()> {
        self.records
            .lock()
            .expect("sink mutex poisoned")
            .push(snapshot);
        Ok(())
    }
}

/// Sender half of the persistence queue, handed to the pipeline.
#[derive(Debug, Clone)]
pub struct PersistenceQueue {
    tx: mpsc::UnboundedSender<BeliefSnapshot>,
}

impl PersistenceQueue {
    /// Spawn the drain task against a sink and return the queue. Must be
    /// called from within a tokio runtime.
    pub fn spawn(sink: Arc<dyn BeliefSink>) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<BeliefSnapshot>();
        tokio::spawn(async move {
            let mut seen: HashSet<(Uuid, u32, BeliefEvent)> = HashSet::new();
            while let Some(snapshot) = rx.recv().await {
                if !seen.insert(snapshot.key()) {
                    tracing::debug!(
                        belief = %snapshot.belief.id,
                        version = snapshot.belief.version,
                        "Duplicate snapshot dropped at drain"
                    );
                    continue;
                }
                if let Err(e) = sink.persist(snapshot).await {
                    // The collaborator's retries are its own concern; the
                    // core only guarantees idempotent re-delivery is safe.
                    tracing::warn!("Persistence sink failed: {e:#}");
                }
            }
        });
        Self { tx }
    }

    /// Enqueue without blocking. A closed queue is logged, not fatal;
    /// belief formation does not depend on persistence being alive.
    pub fn enqueue(&self, snapshot: BeliefSnapshot) {
        if self.tx.send(snapshot).is_err() {
            tracing::warn!("Persistence queue closed, dropping snapshot");
        }
    }
}
