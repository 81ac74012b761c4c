//! The dependency graph: tasks and categories with bidirectional invariants.

use std::collections::{HashMap, HashSet};

use tracing::{debug, instrument};

use crate::ddm::DeepDependencyMap;
use crate::error::{Error, Result};

/// A single task node.
///
/// `cat_dependant` is `Some(cid)` exactly when this task is a *member* of
/// category `cid`: no sibling task in the same category depends on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskNode {
    /// Stable task id.
    pub tid: i64,
    /// The category this task was created under.
    pub cid: i64,
    /// Task ids this task directly depends on.
    pub deps: HashSet<i64>,
    /// Category ids this task directly depends on.
    pub cat_deps: HashSet<i64>,
    /// Task ids that directly depend on this task.
    pub rdeps: HashSet<i64>,
    /// Category this task is currently a floor member of, if any.
    pub cat_dependant: Option<i64>,
}

impl TaskNode {
    fn new(tid: i64, cid: i64) -> Self {
        Self {
            tid,
            cid,
            deps: HashSet::new(),
            cat_deps: HashSet::new(),
            rdeps: HashSet::new(),
            cat_dependant: Some(cid),
        }
    }
}

/// A category node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryNode {
    /// Stable category id.
    pub cid: i64,
    /// Task ids that are floor members of this category.
    pub dependencies: HashSet<i64>,
    /// Task ids outside the category that depend on the category as a whole.
    pub dependants: HashSet<i64>,
}

impl CategoryNode {
    fn new(cid: i64) -> Self {
        Self {
            cid,
            dependencies: HashSet::new(),
            dependants: HashSet::new(),
        }
    }
}

/// The dependency graph over tasks and categories.
///
/// Mutators maintain the bidirectional invariants described in
/// `SPEC_FULL.md` §3; [`Graph::validate`] re-checks them from scratch.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    tasks: HashMap<i64, TaskNode>,
    categories: HashMap<i64, CategoryNode>,
    ddm: DeepDependencyMap,
}

impl Graph {
    /// Creates an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the task with id `tid`, if present.
    #[must_use]
    pub fn task(&self, tid: i64) -> Option<&TaskNode> {
        self.tasks.get(&tid)
    }

    /// Returns the category with id `cid`, if present.
    #[must_use]
    pub fn category(&self, cid: i64) -> Option<&CategoryNode> {
        self.categories.get(&cid)
    }

    /// Iterates over all task ids in the graph.
    pub fn task_ids(&self) -> impl Iterator<Item = i64> + '_ {
        self.tasks.keys().copied()
    }

    /// Iterates over all category ids in the graph.
    pub fn category_ids(&self) -> impl Iterator<Item = i64> + '_ {
        self.categories.keys().copied()
    }

    /// Returns the current transitive-closure map.
    #[must_use]
    pub fn ddm(&self) -> &DeepDependencyMap {
        &self.ddm
    }

    /// Adds a category if it does not already exist.
    pub fn add_category(&mut self, cid: i64) {
        self.categories.entry(cid).or_insert_with(|| CategoryNode::new(cid));
    }

    /// Adds a task under `cid`, creating the category if needed. Idempotent.
    pub fn add_todo(&mut self, tid: i64, cid: i64) {
        self.add_category(cid);
        if self.tasks.contains_key(&tid) {
            return;
        }
        self.tasks.insert(tid, TaskNode::new(tid, cid));
        self.categories.get_mut(&cid).expect("just inserted").dependencies.insert(tid);
    }

    /// Adds a direct dependency `from -> to`. Demotes `to` out of its
    /// category's floor set if `from` and `to` share a category.
    pub fn add_dep(&mut self, from: i64, to: i64) -> Result<()> {
        if !self.tasks.contains_key(&from) || !self.tasks.contains_key(&to) {
            return Err(Error::UnknownTaskDependency { from, to });
        }

        let same_category = self.tasks[&from].cid == self.tasks[&to].cid;
        if same_category {
            let cid = self.tasks[&to].cid;
            if let Some(to_node) = self.tasks.get_mut(&to) {
                to_node.cat_dependant = None;
            }
            if let Some(cat) = self.categories.get_mut(&cid) {
                cat.dependencies.remove(&to);
            }
        }

        self.tasks.get_mut(&from).expect("checked above").deps.insert(to);
        self.tasks.get_mut(&to).expect("checked above").rdeps.insert(from);
        Ok(())
    }

    /// Adds a category dependency `task -> category`.
    pub fn add_cat_dep(&mut self, tid: i64, cid: i64) -> Result<()> {
        if !self.tasks.contains_key(&tid) || !self.categories.contains_key(&cid) {
            return Err(Error::UnknownCategoryDependency { from: tid, to: cid });
        }
        self.tasks.get_mut(&tid).expect("checked above").cat_deps.insert(cid);
        self.categories.get_mut(&cid).expect("checked above").dependants.insert(tid);
        Ok(())
    }

    /// Removes `tid` from the graph, rewiring dependants so transitive
    /// reachability among surviving nodes is preserved. No-op if `tid` is
    /// absent.
    #[instrument(skip(self))]
    pub fn remove_node(&mut self, tid: i64) {
        let Some(node) = self.tasks.get(&tid).cloned() else {
            return;
        };

        // 1. Every task that directly depended on `tid` inherits its deps/cat_deps.
        for &p in &node.rdeps {
            for &d in &node.deps {
                if d == tid {
                    continue;
                }
                if let Some(p_node) = self.tasks.get_mut(&p) {
                    p_node.deps.insert(d);
                }
                if let Some(d_node) = self.tasks.get_mut(&d) {
                    d_node.rdeps.insert(p);
                }
            }
            for &c in &node.cat_deps {
                if let Some(p_node) = self.tasks.get_mut(&p) {
                    p_node.cat_deps.insert(c);
                }
                if let Some(cat) = self.categories.get_mut(&c) {
                    cat.dependants.insert(p);
                }
            }
        }

        // 2. If `tid` was a floor member of its category, promote same-category
        //    deps and propagate cross-category deps/cat_deps to everyone that
        //    depended on the category.
        if let Some(owning_cid) = node.cat_dependant {
            let cat_dependants = self
                .categories
                .get(&owning_cid)
                .map(|c| c.dependants.clone())
                .unwrap_or_default();

            for &d in &node.deps {
                let same_category = self.tasks.get(&d).map(|n| n.cid) == Some(owning_cid);
                if same_category {
                    if let Some(d_node) = self.tasks.get_mut(&d) {
                        d_node.cat_dependant = Some(owning_cid);
                    }
                    if let Some(cat) = self.categories.get_mut(&owning_cid) {
                        cat.dependencies.insert(d);
                    }
                } else {
                    for &p in &cat_dependants {
                        if p == tid {
                            continue;
                        }
                        if let Some(p_node) = self.tasks.get_mut(&p) {
                            p_node.deps.insert(d);
                        }
                        if let Some(d_node) = self.tasks.get_mut(&d) {
                            d_node.rdeps.insert(p);
                        }
                    }
                }
            }
            for &c in &node.cat_deps {
                for &p in &cat_dependants {
                    if p == tid {
                        continue;
                    }
                    if let Some(p_node) = self.tasks.get_mut(&p) {
                        p_node.cat_deps.insert(c);
                    }
                    if let Some(cat) = self.categories.get_mut(&c) {
                        cat.dependants.insert(p);
                    }
                }
            }
        }

        // 3. Strip every remaining back-pointer to `tid`.
        for &d in &node.deps {
            if let Some(d_node) = self.tasks.get_mut(&d) {
                d_node.rdeps.remove(&tid);
            }
        }
        for &c in &node.cat_deps {
            if let Some(cat) = self.categories.get_mut(&c) {
                cat.dependants.remove(&tid);
            }
        }
        for &p in &node.rdeps {
            if let Some(p_node) = self.tasks.get_mut(&p) {
                p_node.deps.remove(&tid);
            }
        }
        for cat in self.categories.values_mut() {
            cat.dependants.remove(&tid);
        }

        // 4. Remove `tid` from its owning category and garbage-collect the
        //    category if it becomes empty.
        if let Some(cat) = self.categories.get_mut(&node.cid) {
            cat.dependencies.remove(&tid);
            if cat.dependencies.is_empty() {
                self.categories.remove(&node.cid);
                for n in self.tasks.values_mut() {
                    n.cat_deps.remove(&node.cid);
                }
            }
        }

        self.tasks.remove(&tid);
        debug!(tid, "removed node");
    }

    /// Tasks with no direct or category dependencies.
    #[must_use]
    pub fn roots(&self) -> Vec<i64> {
        self.tasks
            .values()
            .filter(|n| n.deps.is_empty() && n.cat_deps.is_empty())
            .map(|n| n.tid)
            .collect()
    }

    /// Categories that nothing depends on.
    #[must_use]
    pub fn floors(&self) -> Vec<i64> {
        self.categories
            .values()
            .filter(|c| c.dependants.is_empty())
            .map(|c| c.cid)
            .collect()
    }

    /// Recomputes the [`DeepDependencyMap`] from scratch by walking every
    /// floor category's members.
    #[instrument(skip(self))]
    pub fn build_ddm(&mut self) {
        self.ddm.clear();
        let floors = self.floors();
        let mut memo: HashMap<i64, HashSet<i64>> = HashMap::new();
        for cid in floors {
            let members = self
                .categories
                .get(&cid)
                .map(|c| c.dependencies.clone())
                .unwrap_or_default();
            for tid in members {
                let closure = self.recursive_dep_solver(tid, &mut memo);
                self.ddm.add(tid, closure);
            }
        }
    }

    fn recursive_dep_solver(&self, tid: i64, memo: &mut HashMap<i64, HashSet<i64>>) -> HashSet<i64> {
        if let Some(cached) = memo.get(&tid) {
            return cached.clone();
        }
        // Guard against re-entrant cycles on malformed input; a configured
        // cycle should already have been rejected by the loader.
        memo.insert(tid, HashSet::new());

        let Some(node) = self.tasks.get(&tid) else {
            return HashSet::new();
        };
        let mut closure = HashSet::new();
        for &d in &node.deps {
            closure.insert(d);
            closure.extend(self.recursive_dep_solver(d, memo));
        }
        for &c in &node.cat_deps {
            let members = self
                .categories
                .get(&c)
                .map(|cat| cat.dependencies.clone())
                .unwrap_or_default();
            for m in members {
                closure.insert(m);
                closure.extend(self.recursive_dep_solver(m, memo));
            }
        }
        memo.insert(tid, closure.clone());
        closure
    }

    /// Computes the transitive closure for `tid` skipping the first-hop
    /// edge named by `filter`/`filter_cat`, but otherwise following the
    /// real graph. Used by [`Graph::dedupe`] to test whether a direct edge
    /// is redundant.
    fn filtered_closure(&self, tid: i64, filter: Option<i64>, filter_cat: Option<i64>) -> HashSet<i64> {
        let Some(node) = self.tasks.get(&tid) else {
            return HashSet::new();
        };
        let mut closure = HashSet::new();
        for &d in &node.deps {
            if Some(d) == filter {
                continue;
            }
            closure.insert(d);
            closure.extend(self.filtered_closure(d, None, None));
        }
        for &c in &node.cat_deps {
            if Some(c) == filter_cat {
                continue;
            }
            let members = self
                .categories
                .get(&c)
                .map(|cat| cat.dependencies.clone())
                .unwrap_or_default();
            for m in members {
                closure.insert(m);
                closure.extend(self.filtered_closure(m, None, None));
            }
        }
        closure
    }

    /// Removes direct dependency edges whose absence would not shrink the
    /// task's transitive closure, then rebuilds the DDM.
    #[instrument(skip(self))]
    pub fn dedupe(&mut self) {
        let tids: Vec<i64> = self.tasks.keys().copied().collect();
        for tid in tids {
            let deps: Vec<i64> = self.tasks[&tid].deps.iter().copied().collect();
            for dep in deps {
                let full = self.ddm.get(tid);
                let masked = self.filtered_closure(tid, Some(dep), None);
                if masked == full {
                    self.remove_dep_edge(tid, dep);
                }
            }
            let cat_deps: Vec<i64> = self.tasks[&tid].cat_deps.iter().copied().collect();
            for cdep in cat_deps {
                let full = self.ddm.get(tid);
                let masked = self.filtered_closure(tid, None, Some(cdep));
                if masked == full {
                    self.remove_cat_dep_edge(tid, cdep);
                }
            }
        }
        self.build_ddm();
    }

    fn remove_dep_edge(&mut self, from: i64, to: i64) {
        if let Some(n) = self.tasks.get_mut(&from) {
            n.deps.remove(&to);
        }
        if let Some(n) = self.tasks.get_mut(&to) {
            n.rdeps.remove(&from);
        }
    }

    fn remove_cat_dep_edge(&mut self, tid: i64, cid: i64) {
        if let Some(n) = self.tasks.get_mut(&tid) {
            n.cat_deps.remove(&cid);
        }
        if let Some(c) = self.categories.get_mut(&cid) {
            c.dependants.remove(&tid);
        }
    }

    /// Deep-copies the graph and rebuilds its DDM.
    #[must_use]
    pub fn copy(&self) -> Self {
        let mut g = Self {
            tasks: self.tasks.clone(),
            categories: self.categories.clone(),
            ddm: DeepDependencyMap::new(),
        };
        g.build_ddm();
        g
    }

    /// Returns a copy of the graph with every id in `excluded` removed,
    /// rebuilt and deduplicated. The result's DDM equals
    /// `self.ddm().filter(excluded)` for well-formed inputs.
    #[instrument(skip(self))]
    pub fn filter_out(&self, excluded: &HashSet<i64>) -> Result<Self> {
        let mut g = self.copy();
        for &tid in excluded {
            g.remove_node(tid);
        }
        g.build_ddm();
        if let Err(message) = g.validate() {
            return Err(Error::InvariantViolation { message });
        }
        g.dedupe();
        Ok(g)
    }

    /// Checks the bidirectional invariants described in `SPEC_FULL.md` §3.
    /// Returns `Err` with a human-readable description of the first
    /// violation found.
    pub fn validate(&self) -> std::result::Result<(), String> {
        for node in self.tasks.values() {
            for &d in &node.deps {
                let Some(dep) = self.tasks.get(&d) else {
                    return Err(format!("task {} depends on missing task {d}", node.tid));
                };
                if !dep.rdeps.contains(&node.tid) {
                    return Err(format!(
                        "task {} depends on {d} but {d}.rdeps is missing {}",
                        node.tid, node.tid
                    ));
                }
            }
            for &c in &node.cat_deps {
                let Some(cat) = self.categories.get(&c) else {
                    return Err(format!("task {} depends on missing category {c}", node.tid));
                };
                if !cat.dependants.contains(&node.tid) {
                    return Err(format!(
                        "task {} cat-depends on {c} but {c}.dependants is missing it",
                        node.tid
                    ));
                }
            }
            if let Some(c) = node.cat_dependant {
                if c != node.cid {
                    return Err(format!("task {} cat_dependant {c} differs from cid {}", node.tid, node.cid));
                }
                let Some(cat) = self.categories.get(&c) else {
                    return Err(format!("task {} cat_dependant references missing category {c}", node.tid));
                };
                if !cat.dependencies.contains(&node.tid) {
                    return Err(format!(
                        "task {} has cat_dependant {c} but is not in {c}.dependencies",
                        node.tid
                    ));
                }
            }
        }
        for cat in self.categories.values() {
            if cat.dependencies.is_empty() {
                return Err(format!("category {} has no members and should have been deleted", cat.cid));
            }
            for &t in &cat.dependencies {
                let Some(task) = self.tasks.get(&t) else {
                    return Err(format!("category {} lists missing member {t}", cat.cid));
                };
                if task.cat_dependant != Some(cat.cid) {
                    return Err(format!(
                        "category {} lists member {t} whose cat_dependant is {:?}",
                        cat.cid, task.cat_dependant
                    ));
                }
            }
            for &t in &cat.dependants {
                let Some(task) = self.tasks.get(&t) else {
                    return Err(format!("category {} lists missing dependant {t}", cat.cid));
                };
                if !task.cat_deps.contains(&cat.cid) {
                    return Err(format!(
                        "category {} lists dependant {t} that doesn't cat-depend on it",
                        cat.cid
                    ));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain_graph() -> Graph {
        // 0 -> 1 -> 2, all under category 100.
        let mut g = Graph::new();
        g.add_todo(0, 100);
        g.add_todo(1, 100);
        g.add_todo(2, 100);
        g.add_dep(0, 1).unwrap();
        g.add_dep(1, 2).unwrap();
        g.build_ddm();
        g
    }

    #[test]
    fn scenario_1_linear_chain() {
        let g = chain_graph();
        assert_eq!(g.ddm().get(0), HashSet::from([1, 2]));
        assert_eq!(g.ddm().get(1), HashSet::from([2]));
        assert!(g.ddm().get(2).is_empty());
        assert_eq!(g.roots(), vec![2]);
        assert!(g.validate().is_ok());
    }

    #[test]
    fn scenario_2_remove_middle() {
        let mut g = chain_graph();
        g.remove_node(1);
        g.build_ddm();

        assert!(g.task(1).is_none());
        assert_eq!(g.task(0).unwrap().deps, HashSet::from([2]));
        assert_eq!(g.task(2).unwrap().rdeps, HashSet::from([0]));
        assert_eq!(g.ddm().get(0), HashSet::from([2]));
        assert!(g.validate().is_ok());
    }

    #[test]
    fn scenario_3_category_dependency() {
        let mut g = Graph::new();
        g.add_todo(0, 10);
        g.add_todo(1, 10);
        g.add_todo(2, 20);
        g.add_todo(3, 20);
        g.add_dep(0, 1).unwrap();
        g.add_dep(3, 2).unwrap();
        g.add_cat_dep(2, 10).unwrap();
        g.build_ddm();

        let deps_of_2 = g.ddm().get(2);
        assert!(deps_of_2.contains(&0));
        assert!(deps_of_2.contains(&1));
        assert!(g.validate().is_ok());
    }

    #[test]
    fn scenario_4_dedupe_removes_redundant_edge() {
        let mut g = chain_graph();
        g.add_dep(0, 2).unwrap(); // redundant: already reachable via 0->1->2
        g.build_ddm();
        let before = g.ddm().clone();

        g.dedupe();

        assert_eq!(g.task(0).unwrap().deps, HashSet::from([1]));
        assert_eq!(g.ddm().get(0), before.get(0));
    }

    #[test]
    fn scenario_5_filter_out_matches_ddm_filter() {
        let mut g = Graph::new();
        g.add_todo(0, 10);
        g.add_todo(1, 10);
        g.add_todo(2, 20);
        g.add_todo(3, 20);
        g.add_dep(0, 1).unwrap();
        g.add_dep(3, 2).unwrap();
        g.add_cat_dep(2, 10).unwrap();
        g.add_dep(2, 1).unwrap();
        g.build_ddm();

        let excluded = HashSet::from([1]);
        let sub = g.filter_out(&excluded).unwrap();
        let expected = g.ddm().filter(&excluded);
        assert_eq!(sub.ddm(), &expected);
        assert!(sub.validate().is_ok());
    }

    #[test]
    fn remove_node_absent_is_noop() {
        let mut g = chain_graph();
        let before_ids: HashSet<_> = g.task_ids().collect();
        g.remove_node(999);
        assert_eq!(g.task_ids().collect::<HashSet<_>>(), before_ids);
    }

    #[test]
    fn filter_out_all_yields_empty_graph() {
        let g = chain_graph();
        let all: HashSet<i64> = g.task_ids().collect();
        let sub = g.filter_out(&all).unwrap();
        assert_eq!(sub.task_ids().count(), 0);
        assert_eq!(sub.category_ids().count(), 0);
    }

    #[test]
    fn removing_only_member_deletes_empty_category() {
        let mut g = Graph::new();
        g.add_todo(0, 10);
        g.build_ddm();
        g.remove_node(0);
        assert!(g.category(10).is_none());
    }

    #[test]
    fn build_ddm_is_idempotent() {
        let mut g = chain_graph();
        let first = g.ddm().clone();
        g.build_ddm();
        assert_eq!(g.ddm(), &first);
    }

    #[test]
    fn dedupe_is_idempotent() {
        let mut g = chain_graph();
        g.add_dep(0, 2).unwrap();
        g.build_ddm();
        g.dedupe();
        let first = g.clone();
        g.dedupe();
        assert_eq!(g.ddm(), first.ddm());
    }

    #[test]
    fn add_dep_demotes_same_category_target() {
        let mut g = Graph::new();
        g.add_todo(0, 10);
        g.add_todo(1, 10);
        assert!(g.task(1).unwrap().cat_dependant.is_some());
        g.add_dep(0, 1).unwrap();
        assert_eq!(g.task(1).unwrap().cat_dependant, None);
        assert!(!g.category(10).unwrap().dependencies.contains(&1));
    }

    #[test]
    fn add_dep_unknown_task_errors() {
        let mut g = Graph::new();
        g.add_todo(0, 10);
        assert!(g.add_dep(0, 999).is_err());
    }
}
