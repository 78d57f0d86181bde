use serde::Serialize;
use tracing::info;

use crate::common::Cell;

#[derive(Debug, Clone, Default, Serialize)]
pub struct Stats {
    pub searches: usize,
    pub reached: usize,
    pub fallbacks: usize,
    pub unreachable: usize,
    pub expanded_nodes: usize,
    pub pushed_nodes: usize,
    pub rescored_nodes: usize,
    pub dirty_reset_nodes: usize,
    pub time_us: u128,
    /// Every expanded node with its `f` score, only recorded when enabled.
    #[serde(skip)]
    pub expansion_trace: Option<Vec<(Cell, f64)>>,
}

impl Stats {
    pub fn with_trace() -> Self {
        Stats {
            expansion_trace: Some(Vec::new()),
            ..Default::default()
        }
    }

    pub(crate) fn record_expansion(&mut self, cell: Cell, f: f64) {
        self.expanded_nodes += 1;
        if let Some(trace) = self.expansion_trace.as_mut() {
            trace.push((cell, f));
        }
    }

    pub fn print(&self) {
        info!(
            "Searches {:?} (reached {:?}, closest {:?}, unreachable {:?}) Time(microseconds) {:?} Expanded nodes: {:?} Pushed nodes: {:?} Rescored nodes: {:?} Reset dirty nodes: {:?}",
            self.searches,
            self.reached,
            self.fallbacks,
            self.unreachable,
            self.time_us,
            self.expanded_nodes,
            self.pushed_nodes,
            self.rescored_nodes,
            self.dirty_reset_nodes
        );
    }
}
