use smallvec::SmallVec;

use crate::term::TermId;
use crate::DEFAULT_NUM_CHILDREN;

/// A set of [`TermId`]s, e.g. the children of a term
///
/// Each term can occur only once in the group. The IDs are kept
/// sorted, so iteration order is deterministic.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TermGroup {
    ids: SmallVec<[TermId; DEFAULT_NUM_CHILDREN]>,
}

impl TermGroup {
    /// Constructs a new, empty [`TermGroup`]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the group contains no [`TermId`]s
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Returns the number of [`TermId`]s in the group
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Adds a new [`TermId`] to the group
    ///
    /// Returns whether the `TermId` was newly inserted. That is:
    ///
    /// - If the group did not previously contain this `TermId`, true is returned.
    /// - If the group already contained this `TermId`, false is returned.
    pub fn insert<I: Into<TermId>>(&mut self, id: I) -> bool {
        let id = id.into();
        match self.ids.binary_search(&id) {
            Ok(_) => false,
            Err(idx) => {
                self.ids.insert(idx, id);
                true
            }
        }
    }

    /// Returns `true` if the group contains the [`TermId`]
    pub fn contains(&self, id: &TermId) -> bool {
        self.ids.binary_search(id).is_ok()
    }

    /// Returns an Iterator of the [`TermId`]s inside the group
    pub fn iter(&self) -> TermIds<'_> {
        TermIds::new(self.ids.iter())
    }
}

impl FromIterator<TermId> for TermGroup {
    fn from_iter<T: IntoIterator<Item = TermId>>(iter: T) -> Self {
        let mut group = TermGroup::new();
        for id in iter {
            group.insert(id);
        }
        group
    }
}

impl<'a> IntoIterator for &'a TermGroup {
    type Item = TermId;
    type IntoIter = TermIds<'a>;

    fn into_iter(self) -> TermIds<'a> {
        TermIds::new(self.ids.iter())
    }
}

/// An iterator over [`TermId`]s
pub struct TermIds<'a> {
    inner: std::slice::Iter<'a, TermId>,
}

impl<'a> TermIds<'a> {
    fn new(inner: std::slice::Iter<'a, TermId>) -> Self {
        Self { inner }
    }
}

impl<'a> Iterator for TermIds<'a> {
    type Item = TermId;
    fn next(&mut self) -> Option<TermId> {
        self.inner.next().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_is_idempotent() {
        let mut group = TermGroup::new();
        assert!(group.insert(3u32));
        assert!(group.insert(1u32));
        assert!(!group.insert(3u32));
        assert_eq!(group.len(), 2);
    }

    #[test]
    fn iteration_is_sorted() {
        let group: TermGroup = [5u32, 2, 9, 2].into_iter().map(TermId::from).collect();
        let ids: Vec<u32> = group.iter().map(|id| id.as_u32()).collect();
        assert_eq!(ids, vec![2, 5, 9]);
    }

    #[test]
    fn contains() {
        let mut group = TermGroup::new();
        group.insert(7u32);
        assert!(group.contains(&7u32.into()));
        assert!(!group.contains(&8u32.into()));
    }

    #[test]
    fn iterate_twice() {
        let mut group = TermGroup::new();
        group.insert(1u32);
        group.insert(2u32);
        group.insert(3u32);

        let mut ids = Vec::new();
        for id in &group {
            ids.push(id)
        }
        assert_eq!(ids.len(), 3);

        for id in &group {
            ids.push(id)
        }
        assert_eq!(ids.len(), 6);
    }
}
