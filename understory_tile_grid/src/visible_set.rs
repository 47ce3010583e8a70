// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracked set of realized indices and set-difference reconciliation.

use alloc::vec::Vec;

use hashbrown::HashSet;

/// Indices to create and destroy after a reconciliation.
///
/// Both lists are sorted ascending and disjoint.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Reconciliation {
    /// Indices that entered the visible set.
    pub to_add: Vec<usize>,
    /// Indices that left the visible set.
    pub to_remove: Vec<usize>,
}

impl Reconciliation {
    /// Returns `true` if nothing needs to change.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty()
    }
}

/// The set of cell indices currently realized by a host.
///
/// After every [`VisibleSet::reconcile`] the tracked set is exactly the set
/// passed in, so it never drifts from the most recent visible range no matter
/// how rarely reconciliation runs.
///
/// ```
/// use hashbrown::HashSet;
/// use understory_tile_grid::VisibleSet;
///
/// let mut visible = VisibleSet::new();
/// let diff = visible.reconcile(HashSet::from_iter([1, 2, 3]));
/// assert_eq!(diff.to_add, vec![1, 2, 3]);
///
/// let diff = visible.reconcile(HashSet::from_iter([2, 3, 4]));
/// assert_eq!(diff.to_add, vec![4]);
/// assert_eq!(diff.to_remove, vec![1]);
/// ```
#[derive(Clone, Debug, Default)]
pub struct VisibleSet {
    indices: HashSet<usize>,
    revision: u64,
}

impl VisibleSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tracked indices.
    #[must_use]
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// Returns `true` if no index is tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Returns `true` if `index` is tracked.
    #[must_use]
    pub fn contains(&self, index: usize) -> bool {
        self.indices.contains(&index)
    }

    /// Iterates the tracked indices in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.indices.iter().copied()
    }

    /// Borrows the tracked indices.
    #[must_use]
    pub fn as_set(&self) -> &HashSet<usize> {
        &self.indices
    }

    /// Number of reconciliations that changed the set.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Replaces the tracked set with `next` and returns the difference.
    pub fn reconcile(&mut self, next: HashSet<usize>) -> Reconciliation {
        let mut to_add: Vec<usize> = next.difference(&self.indices).copied().collect();
        let mut to_remove: Vec<usize> = self.indices.difference(&next).copied().collect();
        to_add.sort_unstable();
        to_remove.sort_unstable();

        let diff = Reconciliation { to_add, to_remove };
        if !diff.is_empty() {
            self.revision += 1;
        }
        self.indices = next;
        diff
    }

    /// Empties the set, returning the removed indices in ascending order.
    pub fn clear(&mut self) -> Vec<usize> {
        self.reconcile(HashSet::new()).to_remove
    }
}
