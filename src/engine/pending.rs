// src/engine/pending.rs

use std::collections::HashMap;

use tracing::debug;

use crate::assets::AssetKind;

/// Reruns queued while a class task is already executing.
///
/// Events for one class are serialized: each trigger that arrives mid-run
/// queues exactly one rerun. Nothing is dropped and nothing is coalesced, so
/// rapid successive edits cause redundant rebuilds rather than missed ones —
/// last write wins.
#[derive(Debug, Default)]
pub struct PendingReruns {
    counts: HashMap<AssetKind, usize>,
}

impl PendingReruns {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a trigger that arrived while the class task was running.
    pub fn record(&mut self, kind: AssetKind) {
        let count = self.counts.entry(kind).or_insert(0);
        *count += 1;
        debug!(task = %kind, queued = *count, "trigger queued behind running task");
    }

    /// Consume one queued rerun for the class, if any.
    pub fn take(&mut self, kind: AssetKind) -> bool {
        match self.counts.get_mut(&kind) {
            Some(count) if *count > 0 => {
                *count -= 1;
                if *count == 0 {
                    self.counts.remove(&kind);
                }
                true
            }
            _ => false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}
