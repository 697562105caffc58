//! SoftDevice requirement and identifier lists.

use core::fmt;

use dfu_errors::ParseError;

use crate::numeric::parse_int;

/// Ordered list of SoftDevice firmware IDs without duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequirementSet {
    ids: Vec<u32>,
}

impl RequirementSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a comma-separated list such as `0x91,0x95`.
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        text.split(',')
            .map(|item| parse_int(item.trim()))
            .collect::<Result<Vec<_>, _>>()
            .map(Self::from_iter)
    }

    /// Append `id` unless already present. Returns whether it was added.
    pub fn insert(&mut self, id: u32) -> bool {
        if self.ids.contains(&id) {
            return false;
        }
        self.ids.push(id);
        true
    }

    /// Whether `id` is in the set.
    pub fn contains(&self, id: u32) -> bool {
        self.ids.contains(&id)
    }

    /// IDs of `self` not in `other`, in order.
    pub fn difference(&self, other: &RequirementSet) -> RequirementSet {
        self.iter().filter(|id| !other.contains(*id)).collect()
    }

    /// `self` followed by the IDs of `other` not already present.
    pub fn union(&self, other: &RequirementSet) -> RequirementSet {
        let mut out = self.clone();
        out.extend(other.iter());
        out
    }

    /// IDs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.ids.iter().copied()
    }

    /// IDs as a slice.
    pub fn as_slice(&self) -> &[u32] {
        &self.ids
    }

    /// Number of IDs.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl Extend<u32> for RequirementSet {
    fn extend<I: IntoIterator<Item = u32>>(&mut self, iter: I) {
        for id in iter {
            self.insert(id);
        }
    }
}

impl FromIterator<u32> for RequirementSet {
    fn from_iter<I: IntoIterator<Item = u32>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl fmt::Display for RequirementSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let items: Vec<String> = self.iter().map(|id| format!("{id:#06x}")).collect();
        f.write_str(&items.join(", "))
    }
}

/// Merges the stack requirement list with the IDs of the stack being installed.
pub struct RequirementSetReconciler;

impl RequirementSetReconciler {
    /// `required` followed by the `new_ids` it lacks.
    ///
    /// Including the new IDs lets an interrupted SoftDevice + application
    /// update be retried once the new SoftDevice is already in place.
    pub fn reconcile(required: &RequirementSet, new_ids: &RequirementSet) -> RequirementSet {
        required.union(&new_ids.difference(required))
    }
}
