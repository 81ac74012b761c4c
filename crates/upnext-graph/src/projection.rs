//! Renders a [`Graph`] as a node/edge list suitable for display, with
//! synthetic control nodes marking the start and end of the day's work.

use crate::graph::Graph;
use crate::{ONEOFF_END_ID, ONEOFF_START_ID};

/// What kind of thing a [`ProjectedNode`] represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// A real task.
    Task,
    /// A real category.
    Category,
    /// A synthetic control node ("Wake up", "Go to sleep", the one-off bridge).
    Control,
}

/// What kind of relationship a [`ProjectedEdge`] represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeKind {
    /// Task directly depends on task.
    Dependency,
    /// Task depends on an entire category.
    CategoryDependency,
    /// Category owns a floor member.
    Membership,
    /// Edge to/from a synthetic control node.
    Control,
}

/// A node in the rendered graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectedNode {
    /// Stable string id, unique within a [`ProjectedGraph`].
    pub id: String,
    /// What the node represents.
    pub kind: NodeKind,
    /// Display label.
    pub label: String,
    /// Status-derived border color (e.g. `"green"` for complete), if any.
    pub border_color: Option<&'static str>,
}

/// An edge in the rendered graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectedEdge {
    /// Source node id.
    pub from: String,
    /// Destination node id.
    pub to: String,
    /// What the edge represents.
    pub kind: EdgeKind,
}

/// A rendered graph: nodes plus edges, ready for a display layer to lay out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectedGraph {
    /// All nodes, real and synthetic.
    pub nodes: Vec<ProjectedNode>,
    /// All edges, real and synthetic.
    pub edges: Vec<ProjectedEdge>,
}

fn task_node_id(tid: i64) -> String {
    format!("task:{tid}")
}

fn category_node_id(cid: i64) -> String {
    format!("category:{cid}")
}

const WAKE_UP_ID: &str = "control:wake_up";
const GO_TO_SLEEP_ID: &str = "control:go_to_sleep";
const ONEOFF_BRIDGE_ID: &str = "control:all_oneoffs";

/// Renders a [`Graph`] into a [`ProjectedGraph`].
#[derive(Debug, Default)]
pub struct GraphProjectionView;

impl GraphProjectionView {
    /// Creates a view. Stateless — all inputs are passed to [`Self::render`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Renders `graph`. `border_color` is consulted per task id to derive a
    /// status-based border color (green/blue/orange); it is a callback
    /// rather than a concrete status type so this crate stays free of
    /// persistence-layer status enums.
    pub fn render(&self, graph: &Graph, border_color: impl Fn(i64) -> Option<&'static str>) -> ProjectedGraph {
        let mut out = ProjectedGraph::default();

        for tid in graph.task_ids() {
            let label = if tid == ONEOFF_START_ID {
                "One-Off Todos Start".to_string()
            } else {
                format!("Todo {tid}")
            };
            out.nodes.push(ProjectedNode {
                id: task_node_id(tid),
                kind: NodeKind::Task,
                label,
                border_color: border_color(tid),
            });
        }

        for cid in graph.category_ids() {
            let label = if cid == ONEOFF_END_ID {
                "All One-Off Todos".to_string()
            } else {
                format!("Category {cid}")
            };
            out.nodes.push(ProjectedNode {
                id: category_node_id(cid),
                kind: NodeKind::Category,
                label,
                border_color: None,
            });
        }

        for tid in graph.task_ids() {
            let Some(node) = graph.task(tid) else { continue };
            for &dep in &node.deps {
                out.edges.push(ProjectedEdge {
                    from: task_node_id(tid),
                    to: task_node_id(dep),
                    kind: EdgeKind::Dependency,
                });
            }
            for &cat in &node.cat_deps {
                out.edges.push(ProjectedEdge {
                    from: task_node_id(tid),
                    to: category_node_id(cat),
                    kind: EdgeKind::CategoryDependency,
                });
            }
        }

        for cid in graph.category_ids() {
            let Some(cat) = graph.category(cid) else { continue };
            for &member in &cat.dependencies {
                out.edges.push(ProjectedEdge {
                    from: category_node_id(cid),
                    to: task_node_id(member),
                    kind: EdgeKind::Membership,
                });
            }
        }

        out.nodes.push(ProjectedNode {
            id: WAKE_UP_ID.to_string(),
            kind: NodeKind::Control,
            label: "Wake up".to_string(),
            border_color: None,
        });
        out.nodes.push(ProjectedNode {
            id: GO_TO_SLEEP_ID.to_string(),
            kind: NodeKind::Control,
            label: "Go to sleep".to_string(),
            border_color: None,
        });

        for root in graph.roots() {
            out.edges.push(ProjectedEdge {
                from: WAKE_UP_ID.to_string(),
                to: task_node_id(root),
                kind: EdgeKind::Control,
            });
        }
        for floor in graph.floors() {
            out.edges.push(ProjectedEdge {
                from: category_node_id(floor),
                to: GO_TO_SLEEP_ID.to_string(),
                kind: EdgeKind::Control,
            });
        }

        if graph.task(ONEOFF_START_ID).is_some() {
            out.nodes.push(ProjectedNode {
                id: ONEOFF_BRIDGE_ID.to_string(),
                kind: NodeKind::Control,
                label: "All One-Off Todos".to_string(),
                border_color: None,
            });
            out.edges.push(ProjectedEdge {
                from: ONEOFF_BRIDGE_ID.to_string(),
                to: task_node_id(ONEOFF_START_ID),
                kind: EdgeKind::Control,
            });
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Graph;

    #[test]
    fn renders_roots_and_floors_with_control_nodes() {
        let mut g = Graph::new();
        g.add_todo(0, 100);
        g.add_todo(1, 100);
        g.add_dep(0, 1).unwrap();
        g.build_ddm();

        let projected = GraphProjectionView::new().render(&g, |_| None);

        assert!(projected.nodes.iter().any(|n| n.id == WAKE_UP_ID));
        assert!(projected.nodes.iter().any(|n| n.id == GO_TO_SLEEP_ID));
        assert!(projected
            .edges
            .iter()
            .any(|e| e.from == WAKE_UP_ID && e.to == task_node_id(1)));
        assert!(projected
            .edges
            .iter()
            .any(|e| e.from == category_node_id(100) && e.to == GO_TO_SLEEP_ID));
    }

    #[test]
    fn border_color_callback_is_applied() {
        let mut g = Graph::new();
        g.add_todo(0, 100);
        g.build_ddm();

        let projected = GraphProjectionView::new().render(&g, |tid| if tid == 0 { Some("green") } else { None });
        let node = projected.nodes.iter().find(|n| n.id == task_node_id(0)).unwrap();
        assert_eq!(node.border_color, Some("green"));
    }

    #[test]
    fn oneoff_bridge_only_present_when_sentinels_exist() {
        let mut g = Graph::new();
        g.add_todo(0, 100);
        g.build_ddm();
        let projected = GraphProjectionView::new().render(&g, |_| None);
        assert!(!projected.nodes.iter().any(|n| n.id == ONEOFF_BRIDGE_ID));

        g.add_todo(ONEOFF_START_ID, ONEOFF_END_ID);
        g.build_ddm();
        let projected = GraphProjectionView::new().render(&g, |_| None);
        assert!(projected.nodes.iter().any(|n| n.id == ONEOFF_BRIDGE_ID));
    }
}
