//! Owns the canonical dependency graph: builds it from configuration and a
//! [`Store`], and answers readiness/projection/timeslot queries against it.

use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use chrono::Utc;
use tracing::{instrument, warn};
use upnext_graph::{
    Graph, GraphProjectionView, ProjectedGraph, ReadinessEvaluator, TimeDependency, Timeslot,
    TimeWindowResolver, ONEOFF_END_ID, ONEOFF_START_ID,
};

use crate::config::AppConfig;
use crate::domain::TaskStatus;
use crate::error::DmError;
use crate::store::Store;

/// Which graph a [`DependencyManager::dependency_graph`] call renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphScope {
    /// The full canonical graph.
    Full,
    /// The graph with complete/skipped tasks projected out via `filter_out`.
    Scoped,
}

#[derive(Debug, Default, Clone)]
struct ManagerState {
    graph: Graph,
    time_dep_map: HashMap<i64, TimeDependency>,
    event_dep_map: HashMap<i64, HashMap<String, TimeDependency>>,
}

/// Owns the canonical dependency graph and derives queries against it.
///
/// Follows a single-writer/many-reader discipline: [`Self::load`] builds a
/// new [`ManagerState`] off to the side and only takes the write lock to
/// publish it, so readers never observe a half-built graph (`SPEC_FULL.md`
/// §5).
#[derive(Debug, Default)]
pub struct DependencyManager {
    state: RwLock<ManagerState>,
}

impl DependencyManager {
    /// Creates a manager with an empty graph. Call [`Self::load`] before
    /// querying it.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the canonical graph from `store` and `config`, and publishes
    /// it atomically. Safe to call repeatedly (this is also what `reload`
    /// does).
    #[instrument(skip_all)]
    pub fn load(&self, store: &dyn Store, config: &AppConfig) -> Result<(), DmError> {
        let mut graph = Graph::new();
        let mut title_to_tid: HashMap<String, i64> = HashMap::new();
        let mut name_to_cid: HashMap<String, i64> = HashMap::new();

        for category in store.categories() {
            graph.add_category(category.id);
            name_to_cid.insert(category.name, category.id);
        }
        for todo in store.todos() {
            graph.add_todo(todo.id, todo.category_id);
            title_to_tid.insert(todo.title, todo.id);
        }

        graph.add_todo(ONEOFF_START_ID, ONEOFF_END_ID);

        let mut time_dep_map = HashMap::new();
        let mut event_dep_map = HashMap::new();

        for category_cfg in &config.categories {
            for todo_cfg in &category_cfg.todos {
                let Some(&tid) = title_to_tid.get(&todo_cfg.title) else {
                    warn!(title = %todo_cfg.title, "configured todo not found in store, skipping");
                    continue;
                };

                for dep_title in &todo_cfg.depends_on_todos {
                    match title_to_tid.get(dep_title) {
                        Some(&dep_tid) => {
                            if let Err(e) = graph.add_dep(tid, dep_tid) {
                                warn!(%e, "skipping unresolvable todo dependency");
                            }
                        }
                        None => warn!(todo = %todo_cfg.title, dep = %dep_title, "unknown todo dependency, skipping"),
                    }
                }

                for dep_cat in &todo_cfg.depends_on_categories {
                    match name_to_cid.get(dep_cat) {
                        Some(&cid) => {
                            if let Err(e) = graph.add_cat_dep(tid, cid) {
                                warn!(%e, "skipping unresolvable category dependency");
                            }
                        }
                        None => warn!(todo = %todo_cfg.title, category = %dep_cat, "unknown category dependency, skipping"),
                    }
                }

                if todo_cfg.depends_on_all_oneoffs {
                    if let Err(e) = graph.add_cat_dep(tid, ONEOFF_END_ID) {
                        warn!(%e, "failed to wire one-off dependency");
                    }
                }

                if let Some(window) = todo_cfg.depends_on_time {
                    time_dep_map.insert(tid, window.into());
                }
                if !todo_cfg.depends_on_events.is_empty() {
                    let windows = todo_cfg
                        .depends_on_events
                        .iter()
                        .map(|(name, w)| (name.clone(), (*w).into()))
                        .collect();
                    event_dep_map.insert(tid, windows);
                }
            }
        }

        for dep_title in &config.oneoff_deps.depends_on_todos {
            match title_to_tid.get(dep_title) {
                Some(&dep_tid) => {
                    if let Err(e) = graph.add_dep(ONEOFF_START_ID, dep_tid) {
                        warn!(%e, "skipping unresolvable one-off todo dependency");
                    }
                }
                None => warn!(dep = %dep_title, "unknown one-off todo dependency, skipping"),
            }
        }
        for dep_cat in &config.oneoff_deps.depends_on_categories {
            match name_to_cid.get(dep_cat) {
                Some(&cid) => {
                    if let Err(e) = graph.add_cat_dep(ONEOFF_START_ID, cid) {
                        warn!(%e, "skipping unresolvable one-off category dependency");
                    }
                }
                None => warn!(category = %dep_cat, "unknown one-off category dependency, skipping"),
            }
        }

        if let Some(cycle) = detect_cycle(&graph) {
            return Err(DmError::CycleInConfig { message: cycle });
        }

        graph.build_ddm();
        graph.dedupe();

        let new_state = ManagerState {
            graph,
            time_dep_map,
            event_dep_map,
        };

        let mut state = self.state.write().expect("manager state lock poisoned");
        *state = new_state;
        Ok(())
    }

    /// Alias for [`Self::load`] — re-runs the build from scratch and
    /// publishes it atomically.
    pub fn reload(&self, store: &dyn Store, config: &AppConfig) -> Result<(), DmError> {
        self.load(store, config)
    }

    /// Returns a copy of the current canonical graph.
    #[must_use]
    pub fn full_graph(&self) -> Graph {
        self.state.read().expect("manager state lock poisoned").graph.clone()
    }

    /// Projects out `excluded` task ids from the canonical graph, asserting
    /// the result matches `self.full_graph().ddm().filter(excluded)`.
    pub fn scope_subgraph(&self, excluded: &HashSet<i64>) -> Result<Graph, DmError> {
        let state = self.state.read().expect("manager state lock poisoned");
        let sub = state.graph.filter_out(excluded)?;
        debug_assert_eq!(sub.ddm(), &state.graph.ddm().filter(excluded));
        Ok(sub)
    }

    /// Resolves the current timeslot for every task that declared a time
    /// constraint.
    #[must_use]
    pub fn timeslots(&self, store: &dyn Store) -> HashMap<i64, Timeslot> {
        let state = self.state.read().expect("manager state lock poisoned");
        let event_timestamps: HashMap<String, chrono::DateTime<Utc>> = store
            .events()
            .into_iter()
            .filter_map(|e| e.timestamp.map(|ts| (e.name, ts)))
            .collect();

        let resolver = TimeWindowResolver::new();
        let now = Utc::now();
        let mut out = HashMap::new();

        let tids: HashSet<i64> = state
            .time_dep_map
            .keys()
            .chain(state.event_dep_map.keys())
            .copied()
            .collect();

        for tid in tids {
            let absolute = state.time_dep_map.get(&tid).copied();
            let empty = HashMap::new();
            let events = state.event_dep_map.get(&tid).unwrap_or(&empty);
            out.insert(tid, resolver.resolve(now, absolute, events, &event_timestamps));
        }
        out
    }

    /// Returns the stably-ordered list of currently recommended task ids.
    #[must_use]
    pub fn recommended_todos(&self, store: &dyn Store) -> Vec<i64> {
        let state = self.state.read().expect("manager state lock poisoned");
        let todos = store.todos();
        let blocking: HashSet<i64> = todos.iter().filter(|t| t.status.is_blocking()).map(|t| t.id).collect();
        let oneoff_block = store.one_off_todos().iter().any(|o| !matches!(o.status, TaskStatus::Complete));
        let timeslots = self.timeslots(store);

        ReadinessEvaluator::new().recommended(&state.graph, &blocking, oneoff_block, &timeslots, Utc::now())
    }

    /// Renders the graph for display.
    pub fn dependency_graph(&self, scope: GraphScope, store: &dyn Store) -> Result<ProjectedGraph, DmError> {
        let state = self.state.read().expect("manager state lock poisoned");
        let statuses: HashMap<i64, TaskStatus> = store.todos().into_iter().map(|t| (t.id, t.status)).collect();
        let oneoff_statuses: HashMap<i64, TaskStatus> =
            store.one_off_todos().into_iter().map(|o| (o.id, o.status)).collect();

        let border_color = |tid: i64| -> Option<&'static str> {
            statuses
                .get(&tid)
                .or_else(|| oneoff_statuses.get(&tid))
                .and_then(|status| match status {
                    TaskStatus::Complete => Some("green"),
                    TaskStatus::InProgress => Some("blue"),
                    TaskStatus::Skipped => Some("orange"),
                    TaskStatus::Incomplete => None,
                })
        };

        let view = GraphProjectionView::new();
        match scope {
            GraphScope::Full => Ok(view.render(&state.graph, border_color)),
            GraphScope::Scoped => {
                let done: HashSet<i64> = statuses
                    .iter()
                    .filter(|(_, s)| matches!(s, TaskStatus::Complete | TaskStatus::Skipped))
                    .map(|(tid, _)| *tid)
                    .collect();
                let sub = state.graph.filter_out(&done)?;
                Ok(view.render(&sub, border_color))
            }
        }
    }
}

/// Depth-first cycle detection over the dependency edges (task deps and
/// category deps expanded to members). Returns a description of the first
/// cycle found, if any.
fn detect_cycle(graph: &Graph) -> Option<String> {
    #[derive(Clone, Copy, PartialEq, Eq)]
    enum Color {
        White,
        Gray,
        Black,
    }

    let mut colors: HashMap<i64, Color> = graph.task_ids().map(|tid| (tid, Color::White)).collect();

    fn visit(tid: i64, graph: &Graph, colors: &mut HashMap<i64, Color>, path: &mut Vec<i64>) -> Option<String> {
        match colors.get(&tid) {
            Some(Color::Black) => return None,
            Some(Color::Gray) => {
                let start = path.iter().position(|&t| t == tid).unwrap_or(0);
                let cycle: Vec<String> = path[start..].iter().map(i64::to_string).collect();
                return Some(format!("{} -> {tid}", cycle.join(" -> ")));
            }
            _ => {}
        }
        colors.insert(tid, Color::Gray);
        path.push(tid);

        if let Some(node) = graph.task(tid) {
            for &dep in &node.deps {
                if let Some(found) = visit(dep, graph, colors, path) {
                    return Some(found);
                }
            }
            for &cat in &node.cat_deps {
                let members = graph.category(cat).map(|c| c.dependencies.clone()).unwrap_or_default();
                for member in members {
                    if let Some(found) = visit(member, graph, colors, path) {
                        return Some(found);
                    }
                }
            }
        }

        path.pop();
        colors.insert(tid, Color::Black);
        None
    }

    let tids: Vec<i64> = graph.task_ids().collect();
    for tid in tids {
        if colors.get(&tid) == Some(&Color::White) {
            let mut path = Vec::new();
            if let Some(found) = visit(tid, graph, &mut colors, &mut path) {
                return Some(found);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_config;
    use crate::store::InMemoryStore;

    fn build(doc: &str) -> (DependencyManager, InMemoryStore) {
        let cfg = parse_config(doc).unwrap();
        let store = InMemoryStore::seed_from_config(&cfg);
        let manager = DependencyManager::new();
        manager.load(&store, &cfg).unwrap();
        (manager, store)
    }

    #[test]
    fn recommends_only_leaf_task() {
        let doc = r#"
            [[categories]]
            name = "morning"
            [[categories.todos]]
            title = "wake up"
            [[categories.todos]]
            title = "make bed"
            depends_on_todos = ["wake up"]
        "#;
        let (manager, store) = build(doc);
        let todos = store.todos();
        let wake_up = todos.iter().find(|t| t.title == "wake up").unwrap().id;

        let recommended = manager.recommended_todos(&store);
        assert_eq!(recommended, vec![wake_up]);
    }

    #[test]
    fn completing_dependency_unblocks_dependant() {
        let doc = r#"
            [[categories]]
            name = "morning"
            [[categories.todos]]
            title = "wake up"
            [[categories.todos]]
            title = "make bed"
            depends_on_todos = ["wake up"]
        "#;
        let (manager, store) = build(doc);
        let wake_up = store.todos().into_iter().find(|t| t.title == "wake up").unwrap().id;
        store.set_todo_status(wake_up, TaskStatus::Complete);

        let recommended = manager.recommended_todos(&store);
        let make_bed = store.todos().into_iter().find(|t| t.title == "make bed").unwrap().id;
        assert_eq!(recommended, vec![make_bed]);
    }

    #[test]
    fn oneoff_dependency_withholds_until_oneoffs_complete() {
        let doc = r#"
            [[categories]]
            name = "evening"
            [[categories.todos]]
            title = "brush teeth"
            depends_on_all_oneoffs = true

            [[oneoff_todos]]
            title = "pay rent"
        "#;
        let (manager, store) = build(doc);
        assert!(manager.recommended_todos(&store).is_empty());

        let rent = store.one_off_todos().into_iter().find(|o| o.title == "pay rent").unwrap().id;
        store.set_one_off_status(rent, TaskStatus::Complete);
        assert_eq!(manager.recommended_todos(&store).len(), 1);
    }

    #[test]
    fn unknown_dependency_is_skipped_not_fatal() {
        let doc = r#"
            [[categories]]
            name = "morning"
            [[categories.todos]]
            title = "make bed"
            depends_on_todos = ["does not exist"]
        "#;
        let (manager, store) = build(doc);
        let recommended = manager.recommended_todos(&store);
        assert_eq!(recommended.len(), 1);
    }

    #[test]
    fn cycle_in_config_is_rejected() {
        let doc = r#"
            [[categories]]
            name = "loop"
            [[categories.todos]]
            title = "a"
            depends_on_todos = ["b"]
            [[categories.todos]]
            title = "b"
            depends_on_todos = ["a"]
        "#;
        let cfg = parse_config(doc).unwrap();
        let store = InMemoryStore::seed_from_config(&cfg);
        let manager = DependencyManager::new();
        let result = manager.load(&store, &cfg);
        assert!(matches!(result, Err(DmError::CycleInConfig { .. })));
    }

    #[test]
    fn scope_subgraph_matches_ddm_filter() {
        let doc = r#"
            [[categories]]
            name = "morning"
            [[categories.todos]]
            title = "wake up"
            [[categories.todos]]
            title = "make bed"
            depends_on_todos = ["wake up"]
        "#;
        let (manager, store) = build(doc);
        let wake_up = store.todos().into_iter().find(|t| t.title == "wake up").unwrap().id;
        let excluded = HashSet::from([wake_up]);

        let sub = manager.scope_subgraph(&excluded).unwrap();
        let full = manager.full_graph();
        assert_eq!(sub.ddm(), &full.ddm().filter(&excluded));
    }
}
