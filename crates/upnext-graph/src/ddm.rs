//! The Deep Dependency Map: a pre-computed transitive closure over task ids.

use std::collections::{HashMap, HashSet};

/// Maps a task id to the full set of task ids it transitively depends on.
///
/// Missing keys are treated as having an empty dependency set; callers never
/// need to special-case a task that happens to have no dependencies.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeepDependencyMap {
    map: HashMap<i64, HashSet<i64>>,
}

impl DeepDependencyMap {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the transitive dependency set for `tid`, or an empty set if
    /// `tid` has no recorded entry.
    #[must_use]
    pub fn get(&self, tid: i64) -> HashSet<i64> {
        self.map.get(&tid).cloned().unwrap_or_default()
    }

    /// Unions `deps` into the set recorded for `tid`.
    pub fn add(&mut self, tid: i64, deps: impl IntoIterator<Item = i64>) {
        self.map.entry(tid).or_default().extend(deps);
    }

    /// Removes every entry and rebuilds from scratch via the caller-supplied closure.
    pub fn clear(&mut self) {
        self.map.clear();
    }

    /// Returns whether the map has any entries at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Returns a new map omitting every key in `excluded`, and with `excluded`
    /// subtracted from every remaining value set.
    ///
    /// This is the non-destructive projection used to cross-check
    /// [`crate::Graph::filter_out`]: `graph.filter_out(s).ddm()` must equal
    /// `graph.ddm().filter(s)`.
    #[must_use]
    pub fn filter(&self, excluded: &HashSet<i64>) -> Self {
        let map = self
            .map
            .iter()
            .filter(|(tid, _)| !excluded.contains(tid))
            .map(|(tid, deps)| (*tid, deps.difference(excluded).copied().collect()))
            .collect();
        Self { map }
    }

    /// Iterates over all (task, transitive deps) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (i64, &HashSet<i64>)> {
        self.map.iter().map(|(tid, deps)| (*tid, deps))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_is_empty() {
        let ddm = DeepDependencyMap::new();
        assert!(ddm.get(1).is_empty());
    }

    #[test]
    fn add_unions() {
        let mut ddm = DeepDependencyMap::new();
        ddm.add(1, [2, 3]);
        ddm.add(1, [3, 4]);
        assert_eq!(ddm.get(1), HashSet::from([2, 3, 4]));
    }

    #[test]
    fn filter_drops_keys_and_subtracts() {
        let mut ddm = DeepDependencyMap::new();
        ddm.add(1, [2, 3]);
        ddm.add(2, [3]);
        ddm.add(3, []);

        let filtered = ddm.filter(&HashSet::from([3]));
        assert_eq!(filtered.get(1), HashSet::from([2]));
        assert_eq!(filtered.get(2), HashSet::from([]));
        assert!(filtered.get(3).is_empty());
        assert_eq!(filtered.map.len(), 2);
    }

    #[test]
    fn filter_is_non_mutating() {
        let mut ddm = DeepDependencyMap::new();
        ddm.add(1, [2]);
        let before = ddm.clone();
        let _ = ddm.filter(&HashSet::from([2]));
        assert_eq!(ddm, before);
    }
}
