//! Streaming-loader budgets.

use anyhow::Result;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct StreamingBudget {
    /// Capacity of the bounded load-request queue.
    pub request_queue_cap: usize,
    /// Maximum requests drained per tick.
    pub batch_size: usize,
    /// Worker threads for the fork-join decode phase.
    pub workers: usize,
}

impl Default for StreamingBudget {
    fn default() -> Self {
        Self {
            request_queue_cap: 1024,
            batch_size: 64,
            workers: 4,
        }
    }
}

impl StreamingBudget {
    pub fn load_default() -> Result<Self> {
        crate::loader::load_json_or_default("config/streaming.json")
    }
}
