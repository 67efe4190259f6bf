use std::hash::Hash;

use crate::HashMap;

/// Union-find over the integers `0..n` with path compression and
/// union by size.
#[derive(Clone, Debug)]
pub struct DisjointSet {
    parents: Vec<usize>,
    sizes: Vec<usize>,
    count: usize,
}

impl DisjointSet {
    pub fn new(n: usize) -> Self {
        DisjointSet {
            parents: (0..n).collect(),
            sizes: vec![1; n],
            count: n,
        }
    }

    pub fn len(&self) -> usize {
        self.parents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }

    /// Number of distinct sets.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Representative element of `i`'s set, compressing the walked
    /// path.
    pub fn find(&mut self, i: usize) -> usize {
        let mut root = i;
        while self.parents[root] != root {
            root = self.parents[root];
        }
        let mut i = i;
        while self.parents[i] != root {
            i = std::mem::replace(&mut self.parents[i], root);
        }
        root
    }

    pub fn in_same_set(&mut self, a: usize, b: usize) -> bool {
        self.find(a) == self.find(b)
    }

    /// Number of elements in `i`'s set.
    pub fn size_of(&mut self, i: usize) -> usize {
        let root = self.find(i);
        self.sizes[root]
    }

    /// Merge the sets of `a` and `b`.
    pub fn union(&mut self, a: usize, b: usize) {
        self.union_with(a, b, |_, _| {});
    }

    /// Merge the sets of `a` and `b`; when the sets were distinct,
    /// `on_join(larger_root, smaller_root)` is called exactly once
    /// after the merge. On a size tie the first argument's root wins
    /// and the second's becomes the child.
    pub fn union_with(
        &mut self,
        a: usize,
        b: usize,
        mut on_join: impl FnMut(usize, usize),
    ) {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra == rb {
            return;
        }

        let (larger, smaller) = if self.sizes[ra] >= self.sizes[rb] {
            (ra, rb)
        } else {
            (rb, ra)
        };
        self.parents[smaller] = larger;
        self.sizes[larger] += self.sizes[smaller];
        self.count -= 1;
        on_join(larger, smaller);
    }
}

/// Union-find over arbitrary hashable items.
#[derive(Clone, Debug)]
pub struct DisjointSetMapped<T> {
    items: Vec<T>,
    indices: HashMap<T, usize>,
    inner: DisjointSet,
}

impl<T: Clone + Eq + Hash> DisjointSetMapped<T> {
    pub fn new(items: impl IntoIterator<Item = T>) -> Self {
        let items: Vec<T> = items.into_iter().collect();
        let indices = items
            .iter()
            .enumerate()
            .map(|(i, item)| (item.clone(), i))
            .collect();
        let inner = DisjointSet::new(items.len());
        DisjointSetMapped {
            items,
            indices,
            inner,
        }
    }

    pub fn count(&self) -> usize {
        self.inner.count()
    }

    /// Representative item of `item`'s set. Panics when the item was
    /// not part of the initial set.
    pub fn find(&mut self, item: &T) -> &T {
        let i = self.index_of(item);
        let root = self.inner.find(i);
        &self.items[root]
    }

    pub fn in_same_set(&mut self, a: &T, b: &T) -> bool {
        let (a, b) = (self.index_of(a), self.index_of(b));
        self.inner.in_same_set(a, b)
    }

    pub fn union(&mut self, a: &T, b: &T) {
        self.union_with(a, b, |_, _| {});
    }

    /// Like `DisjointSet::union_with`, with the join reported as item
    /// references.
    pub fn union_with(
        &mut self,
        a: &T,
        b: &T,
        mut on_join: impl FnMut(&T, &T),
    ) {
        let (a, b) = (self.index_of(a), self.index_of(b));
        let items = &self.items;
        self.inner.union_with(a, b, |larger, smaller| {
            on_join(&items[larger], &items[smaller])
        });
    }

    fn index_of(&self, item: &T) -> usize {
        *self
            .indices
            .get(item)
            .expect("DisjointSetMapped: unknown item")
    }
}

#[cfg(test)]
mod tests {
    use quickcheck_macros::quickcheck;

    use super::*;

    #[test]
    fn union_sequence() {
        let mut ds = DisjointSet::new(5);
        let mut joins = Vec::new();

        let mut record =
            |joins: &mut Vec<(usize, usize)>, ds: &mut DisjointSet, a, b| {
                let mut joined = None;
                ds.union_with(a, b, |l, s| joined = Some((l, s)));
                if let Some(j) = joined {
                    joins.push(j);
                }
            };

        record(&mut joins, &mut ds, 0, 1);
        record(&mut joins, &mut ds, 2, 3);
        record(&mut joins, &mut ds, 1, 3);
        // Repeat union is a no-op and fires nothing.
        record(&mut joins, &mut ds, 0, 2);

        assert_eq!(ds.count(), 2);
        let root = ds.find(0);
        for i in 1..4 {
            assert_eq!(ds.find(i), root);
        }
        assert_eq!(ds.find(4), 4);
        assert_eq!(ds.size_of(0), 4);
        assert_eq!(ds.size_of(4), 1);

        assert_eq!(joins.len(), 3);
        // Tie between the size-2 sets: the first argument's root wins.
        assert_eq!(joins[2], (ds.find(0), joins[1].0));
    }

    #[test]
    fn mapped_variant() {
        let mut ds = DisjointSetMapped::new(["a", "b", "c"]);
        ds.union(&"a", &"b");
        assert!(ds.in_same_set(&"a", &"b"));
        assert!(!ds.in_same_set(&"a", &"c"));
        assert_eq!(ds.count(), 2);
        assert_eq!(ds.find(&"b"), ds.find(&"a"));
    }

    #[quickcheck]
    fn set_accounting(pairs: Vec<(usize, usize)>) -> bool {
        const N: usize = 24;
        let mut ds = DisjointSet::new(N);
        for (a, b) in pairs {
            ds.union(a % N, b % N);
        }

        // Count matches the number of distinct roots and the root
        // sizes cover every element.
        let roots: std::collections::HashSet<usize> =
            (0..N).map(|i| ds.find(i)).collect();
        let size_sum: usize =
            roots.iter().map(|&r| ds.sizes[r]).sum();
        roots.len() == ds.count() && size_sum == N
    }
}
