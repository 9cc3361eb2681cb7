use std::collections::{BTreeSet, HashMap};
use tracing::debug;

use crate::models::WordEntity;

/// Arena of word entities addressed by creation index.
#[derive(Debug, Clone, Default)]
pub struct ClusterStore {
    entities: Vec<WordEntity>,
}

impl ClusterStore {
    /// One singleton cluster per word, seeded with its canonical form.
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let entities = words
            .into_iter()
            .enumerate()
            .map(|(i, w)| WordEntity::new(i, w.into()))
            .collect();
        Self { entities }
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn entity(&self, index: usize) -> &WordEntity {
        &self.entities[index]
    }

    /// Representative of the cluster `index` belongs to.
    pub fn cluster_of(&self, index: usize) -> usize {
        self.entities[index].cluster_id
    }

    /// Current representatives in creation order.
    pub fn representatives(&self) -> Vec<usize> {
        self.entities
            .iter()
            .filter(|e| e.is_representative())
            .map(|e| e.index)
            .collect()
    }

    pub fn cluster_count(&self) -> usize {
        self.entities.iter().filter(|e| e.is_representative()).count()
    }

    /// Aliases of the cluster `index` belongs to.
    pub fn aliases(&self, index: usize) -> &BTreeSet<String> {
        &self.entities[self.cluster_of(index)].aliases
    }

    /// Adds aliases to the cluster of `index`; returns how many were new.
    pub fn extend_aliases<I>(&mut self, index: usize, aliases: I) -> usize
    where
        I: IntoIterator<Item = String>,
    {
        let rep = self.cluster_of(index);
        let set = &mut self.entities[rep].aliases;
        let before = set.len();
        set.extend(aliases);
        set.len() - before
    }

    /// Unions every pair of clusters whose alias sets intersect; returns the number of unions.
    ///
    /// Representatives are visited in creation order against a reverse index from alias to
    /// the entity that first registered it. Owners are resolved through `cluster_id`, so a
    /// cluster enlarged earlier in the sweep is matched with its full alias set by every later
    /// representative. The lower index survives each union, and the sweep ends at the fixed
    /// point: calling `merge` again performs no unions.
    pub fn merge(&mut self) -> usize {
        let start = std::time::Instant::now();
        let mut owner: HashMap<String, usize> = HashMap::new();
        let mut unions = 0usize;

        for i in 0..self.entities.len() {
            if !self.entities[i].is_representative() {
                continue;
            }
            let aliases: Vec<String> = self.entities[i].aliases.iter().cloned().collect();
            let mut current = i;
            for alias in aliases {
                match owner.get(&alias) {
                    Some(&seen) => {
                        let other = self.entities[seen].cluster_id;
                        if other != current {
                            let (keep, gone) = if other < current {
                                (other, current)
                            } else {
                                (current, other)
                            };
                            self.absorb(keep, gone);
                            current = keep;
                            unions += 1;
                        }
                    }
                    None => {
                        owner.insert(alias, current);
                    }
                }
            }
        }

        debug!(
            "Merge sweep completed - unions={}, clusters={}, duration={:.3}s",
            unions,
            self.cluster_count(),
            start.elapsed().as_secs_f32()
        );
        unions
    }

    /// Moves the aliases and members of `gone` into `keep` and repoints every member.
    fn absorb(&mut self, keep: usize, gone: usize) {
        let aliases = std::mem::take(&mut self.entities[gone].aliases);
        let members = std::mem::take(&mut self.entities[gone].members);
        for &k in &members {
            self.entities[k].cluster_id = keep;
        }
        let rep = &mut self.entities[keep];
        rep.aliases.extend(aliases);
        rep.members.extend(members);
    }

    /// Dense cluster ids `0..k` in first-appearance order, paired with each surface in input
    /// order. Consumes the store, so ids can only be assigned once.
    pub fn finalize(self) -> Vec<(String, usize)> {
        let mut dense: HashMap<usize, usize> = HashMap::new();
        self.entities
            .into_iter()
            .map(|e| {
                let next = dense.len();
                let id = *dense.entry(e.cluster_id).or_insert(next);
                (e.surface, id)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Entities `w0, w1, ...` carrying the given extra aliases.
    fn store_with(alias_sets: &[&[&str]]) -> ClusterStore {
        let mut store = ClusterStore::from_words((0..alias_sets.len()).map(|i| format!("w{}", i)));
        for (i, set) in alias_sets.iter().enumerate() {
            store.extend_aliases(i, set.iter().map(|s| s.to_string()));
        }
        store
    }

    fn assignment(store: &ClusterStore) -> Vec<usize> {
        (0..store.len()).map(|i| store.cluster_of(i)).collect()
    }

    fn ids(out: &[(String, usize)]) -> Vec<usize> {
        out.iter().map(|(_, id)| *id).collect()
    }

    #[test]
    fn test_new_store_is_singletons() {
        let store = ClusterStore::from_words(["猫", "犬"]);
        assert_eq!(store.representatives(), vec![0, 1]);
        assert!(store.aliases(0).contains("猫"));
        assert_eq!(store.entity(1).members, vec![1]);
    }

    #[test]
    fn test_merge_on_canonical_form() {
        let mut store = ClusterStore::from_words(["ＡＢＣ", "猫", "ABC!"]);
        assert_eq!(store.merge(), 1);
        assert_eq!(assignment(&store), vec![0, 1, 0]);
        assert_eq!(store.entity(0).members, vec![0, 2]);
        assert!(store.entity(2).aliases.is_empty());
    }

    #[test]
    fn test_merge_no_overlap_is_noop() {
        let mut store = store_with(&[&["a"], &["b"], &["c"]]);
        assert_eq!(store.merge(), 0);
        assert_eq!(store.cluster_count(), 3);
    }

    #[test]
    fn test_merge_transitive_within_sweep() {
        // A-B share a, B-C share b, C-D share c
        let mut store = store_with(&[&["a"], &["a", "b"], &["b", "c"], &["c"]]);
        assert_eq!(store.merge(), 3);
        assert_eq!(assignment(&store), vec![0, 0, 0, 0]);
        assert_eq!(store.aliases(3).len(), 4 + 3);
    }

    #[test]
    fn test_merge_uses_enlarged_set_for_earlier_representative() {
        // w1 only overlaps w0 through w2's aliases
        let mut store = store_with(&[&["a"], &["c"], &["a", "c"]]);
        store.merge();
        assert_eq!(assignment(&store), vec![0, 0, 0]);
    }

    #[test]
    fn test_merge_lower_index_survives() {
        let mut store = store_with(&[&["x"], &["y"], &["z"], &["y", "z"]]);
        store.merge();
        assert_eq!(assignment(&store), vec![0, 1, 1, 1]);
        let mut members = store.entity(1).members.clone();
        members.sort_unstable();
        assert_eq!(members, vec![1, 2, 3]);
    }

    #[test]
    fn test_merge_is_idempotent() {
        let mut store = store_with(&[&["a"], &["b"], &["a", "b"], &["d"], &["d"]]);
        assert!(store.merge() > 0);
        let first = assignment(&store);
        assert_eq!(store.merge(), 0);
        assert_eq!(assignment(&store), first);
    }

    #[test]
    fn test_extend_aliases_routes_to_representative() {
        let mut store = store_with(&[&["a"], &["a"]]);
        store.merge();
        assert_eq!(store.extend_aliases(1, ["b".to_string(), "a".to_string()]), 1);
        assert!(store.entity(0).aliases.contains("b"));
        assert!(store.entity(1).aliases.is_empty());
    }

    #[test]
    fn test_finalize_dense_first_seen() {
        let mut store = ClusterStore::from_words(["x", "y", "x", "z", "y"]);
        store.merge();
        let out = store.finalize();
        assert_eq!(ids(&out), vec![0, 1, 0, 2, 1]);
        assert_eq!(out[3].0, "z");
    }

    #[test]
    fn test_finalize_empty() {
        assert!(ClusterStore::from_words(Vec::<String>::new()).finalize().is_empty());
    }

    /// Pairwise merge repeated until nothing changes.
    fn closure_reference(sets: &[BTreeSet<String>]) -> Vec<usize> {
        let n = sets.len();
        let mut rep: Vec<usize> = (0..n).collect();
        let mut aliases = sets.to_vec();
        loop {
            let mut changed = false;
            for i in 0..n {
                if rep[i] != i {
                    continue;
                }
                for j in (i + 1)..n {
                    if rep[j] != j || aliases[i].is_disjoint(&aliases[j]) {
                        continue;
                    }
                    let moved = std::mem::take(&mut aliases[j]);
                    aliases[i].extend(moved);
                    for r in rep.iter_mut().filter(|r| **r == j) {
                        *r = i;
                    }
                    changed = true;
                }
            }
            if !changed {
                return rep;
            }
        }
    }

    fn alias_sets() -> impl Strategy<Value = Vec<BTreeSet<String>>> {
        proptest::collection::vec(proptest::collection::btree_set("[a-h]", 0..3), 0..16)
    }

    fn store_from_sets(sets: &[BTreeSet<String>]) -> ClusterStore {
        let mut store = ClusterStore::from_words((0..sets.len()).map(|i| format!("w{}", i)));
        for (i, set) in sets.iter().enumerate() {
            store.extend_aliases(i, set.iter().cloned());
        }
        store
    }

    proptest! {
        #[test]
        fn prop_merge_matches_closure(sets in alias_sets()) {
            let mut store = store_from_sets(&sets);
            store.merge();
            let with_own: Vec<BTreeSet<String>> = (0..sets.len())
                .map(|i| {
                    let mut s = sets[i].clone();
                    s.insert(format!("w{}", i));
                    s
                })
                .collect();
            prop_assert_eq!(assignment(&store), closure_reference(&with_own));
        }

        #[test]
        fn prop_merge_idempotent(sets in alias_sets()) {
            let mut store = store_from_sets(&sets);
            store.merge();
            let once = assignment(&store);
            prop_assert_eq!(store.merge(), 0);
            prop_assert_eq!(assignment(&store), once);
        }

        #[test]
        fn prop_members_match_cluster_ids(sets in alias_sets()) {
            let mut store = store_from_sets(&sets);
            store.merge();
            for rep in store.representatives() {
                let mut members = store.entity(rep).members.clone();
                members.sort_unstable();
                let expected: Vec<usize> =
                    (0..store.len()).filter(|&k| store.cluster_of(k) == rep).collect();
                prop_assert_eq!(members, expected);
            }
        }

        #[test]
        fn prop_finalize_is_dense(sets in alias_sets()) {
            let mut store = store_from_sets(&sets);
            store.merge();
            let clusters = store.cluster_count();
            let out = ids(&store.finalize());
            let mut next = 0usize;
            for id in out {
                prop_assert!(id <= next);
                if id == next {
                    next += 1;
                }
            }
            prop_assert_eq!(next, clusters);
        }
    }
}
