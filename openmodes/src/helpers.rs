//! Identity and grouping utilities

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use uuid::Uuid;

/// Unique identity of a mesh or part
///
/// Meshes are immutable once built, so their id can key caches of results
/// that only depend on the geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(Uuid);

impl ObjectId {
    /// A fresh random id
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// The underlying uuid
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Group items into equivalence classes
///
/// Each relation states that two items are equivalent. Union-find with a
/// final path-compression sweep (Numerical Recipes §8.6). Classes are
/// returned ordered by their smallest member.
pub fn equivalence<T>(relations: &[(T, T)]) -> Vec<BTreeSet<T>>
where
    T: Ord + Clone,
{
    let mut parent: BTreeMap<T, T> = BTreeMap::new();
    for (j, k) in relations {
        parent.insert(j.clone(), j.clone());
        parent.insert(k.clone(), k.clone());
    }

    let root = |parent: &BTreeMap<T, T>, mut item: T| -> T {
        while let Some(next) = parent.get(&item).filter(|&p| *p != item) {
            item = next.clone();
        }
        item
    };

    for (j, k) in relations {
        let j_root = root(&parent, j.clone());
        let k_root = root(&parent, k.clone());
        if j_root != k_root {
            parent.insert(j_root, k_root);
        }
    }

    let items: Vec<T> = parent.keys().cloned().collect();
    let mut classes: BTreeMap<T, BTreeSet<T>> = BTreeMap::new();
    for item in items {
        let class = root(&parent, item.clone());
        parent.insert(item.clone(), class.clone());
        classes.entry(class).or_default().insert(item);
    }

    let mut out: Vec<BTreeSet<T>> = classes.into_values().collect();
    out.sort_by(|a, b| a.iter().next().cmp(&b.iter().next()));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equivalence_classes() {
        let relations = [(1, 5), (2, 3), (5, 7), (3, 9), (11, 11)];
        let classes = equivalence(&relations);
        assert_eq!(classes.len(), 3);
        assert_eq!(classes[0], BTreeSet::from([1, 5, 7]));
        assert_eq!(classes[1], BTreeSet::from([2, 3, 9]));
        assert_eq!(classes[2], BTreeSet::from([11]));
    }

    #[test]
    fn test_equivalence_chain_merges() {
        let relations = [("a", "b"), ("c", "d"), ("b", "c")];
        let classes = equivalence(&relations);
        assert_eq!(classes.len(), 1);
        assert_eq!(classes[0].len(), 4);
    }

    #[test]
    fn test_object_ids_unique() {
        let a = ObjectId::new();
        let b = ObjectId::new();
        assert_ne!(a, b);
        assert_eq!(a.to_string(), a.as_uuid().to_string());
    }
}
