//! Dependency graph, readiness evaluation and time-window resolution for
//! a recurring-task engine.
//!
//! The [`Graph`] maintains a bipartite web of [`graph::TaskNode`]s and
//! [`graph::CategoryNode`]s with a pre-computed [`DeepDependencyMap`] for
//! O(1) transitive-dependency lookups. [`TimeWindowResolver`] folds absolute
//! and event-relative windows into a single current [`Timeslot`];
//! [`ReadinessEvaluator`] combines both with live task status to produce the
//! recommended set. [`GraphProjectionView`] renders a graph (or a
//! [`Graph::filter_out`] projection of one) as nodes and edges for display.

mod ddm;
mod error;
mod graph;
mod projection;
mod readiness;
mod timewindow;

pub use ddm::DeepDependencyMap;
pub use error::{Error, Result};
pub use graph::{CategoryNode, Graph, TaskNode};
pub use projection::{EdgeKind, GraphProjectionView, NodeKind, ProjectedEdge, ProjectedGraph, ProjectedNode};
pub use readiness::ReadinessEvaluator;
pub use timewindow::{TimeDependency, Timeslot, TimeWindowResolver};

/// Reserved task id marking the start of the one-off dependency chain.
///
/// Anything a one-off todo depends on is wired as a dependency of this task.
pub const ONEOFF_START_ID: i64 = -1000;

/// Reserved category id marking completion of every one-off todo.
///
/// Anything that should wait for all one-offs to be done cat-depends on
/// this id.
pub const ONEOFF_END_ID: i64 = -1999;
