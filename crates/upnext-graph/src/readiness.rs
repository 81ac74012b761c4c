//! Combines the dependency closure, live task status and time windows into
//! the set of currently recommended tasks.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use tracing::instrument;

use crate::graph::Graph;
use crate::timewindow::Timeslot;
use crate::ONEOFF_START_ID;

/// Evaluates readiness against a snapshot of live task state.
#[derive(Debug, Default)]
pub struct ReadinessEvaluator;

impl ReadinessEvaluator {
    /// Creates an evaluator. Stateless — all inputs are passed per call.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Returns the stably-ordered list of task ids that are ready to work on.
    ///
    /// `blocking` is the set of task ids not yet complete/skipped.
    /// `oneoff_block` is whether any one-off todo is still incomplete.
    /// `timeslots` gives the already-resolved window for any task that
    /// declared one; a task with no entry is treated as unbounded.
    #[instrument(skip_all)]
    pub fn recommended(
        &self,
        graph: &Graph,
        blocking: &HashSet<i64>,
        oneoff_block: bool,
        timeslots: &HashMap<i64, Timeslot>,
        now: DateTime<Utc>,
    ) -> Vec<i64> {
        let mut candidates: Vec<i64> = blocking.iter().copied().collect();
        candidates.sort_unstable();

        candidates
            .into_iter()
            .filter(|&tid| {
                if let Some(slot) = timeslots.get(&tid) {
                    if !slot.contains(now) {
                        return false;
                    }
                }

                let deps = graph.ddm().get(tid);
                if !deps.is_disjoint(blocking) {
                    return false;
                }

                if deps.contains(&ONEOFF_START_ID) && oneoff_block {
                    return false;
                }

                true
            })
            .collect()
    }
}
