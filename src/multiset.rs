use std::hash::Hash;

use serde::{Deserialize, Serialize};

/// Insertion-ordered multiset stored as `(element, amount)` pairs.
///
/// Equations hold at most a few hundred monomials, and narration and branch
/// selection depend on first-occurrence order, so a vector with linear
/// lookups is used instead of a hash map.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct Multiset<T> {
    elements: Vec<(T, u32)>,
}

impl<T> FromIterator<(T, u32)> for Multiset<T>
where
    T: Eq,
{
    fn from_iter<U: IntoIterator<Item = (T, u32)>>(iter: U) -> Self {
        let iter = iter.into_iter();
        let (lower_bound, upper_bound) = iter.size_hint();
        let mut multiset = Self {
            elements: Vec::with_capacity(upper_bound.unwrap_or(lower_bound)),
        };
        multiset.extend(iter);
        multiset
    }
}

impl<T> PartialEq for Multiset<T>
where
    T: Eq,
{
    fn eq(&self, other: &Self) -> bool {
        self.is_multisubset_of(other) && other.is_multisubset_of(self)
    }
}

impl<T> Eq for Multiset<T> where T: Eq {}

impl<T> Hash for Multiset<T>
where
    T: Eq + Hash + Ord,
{
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        let mut support: Vec<(&T, &u32)> = self.amount_iter().collect();
        support.sort();
        support.hash(state)
    }
}

impl<T> Multiset<T>
where
    T: Eq,
{
    pub(crate) fn new() -> Self {
        Self {
            elements: Vec::new(),
        }
    }

    pub(crate) fn support(&self) -> impl Iterator<Item = &T> {
        self.amount_iter().map(|(element, _)| element)
    }

    pub(crate) fn amount(&self, element: &T) -> u32 {
        self.elements
            .iter()
            .find_map(|(x, amount)| if x == element { Some(*amount) } else { None })
            .unwrap_or(0)
    }

    pub(crate) fn amount_mut(&mut self, element: T) -> &mut u32 {
        let index = self.elements.iter().position(|(x, _)| x == &element);

        match index {
            Some(index) => &mut self.elements[index].1,
            None => {
                let length = self.elements.len();
                self.elements.push((element, 0));
                &mut self.elements[length].1
            }
        }
    }

    pub(crate) fn amount_iter(&self) -> impl Iterator<Item = (&T, &u32)> {
        self.elements
            .iter()
            .filter_map(|(k, v)| if *v > 0 { Some((k, v)) } else { None })
    }

    /// Total number of elements, counted with multiplicity.
    pub(crate) fn len(&self) -> usize {
        self.amount_iter()
            .map(|(_, amount)| usize::try_from(*amount).unwrap_or(usize::MAX))
            .sum()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.amount_iter().next().is_none()
    }

    /// Every element, repeated according to its amount, in insertion order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = &T> {
        self.amount_iter().flat_map(|(element, amount)| {
            std::iter::repeat(element).take(usize::try_from(*amount).unwrap_or(usize::MAX))
        })
    }

    pub(crate) fn is_multisubset_of(&self, other: &Multiset<T>) -> bool {
        self.amount_iter()
            .all(|(element, amount)| *amount <= other.amount(element))
    }

    pub(crate) fn contains(&self, element: &T) -> bool {
        self.amount(element) > 0
    }

    /// Drops every copy of each element rejected by `keep`.
    pub(crate) fn retain(&mut self, mut keep: impl FnMut(&T) -> bool) {
        self.elements
            .retain(|(element, amount)| *amount > 0 && keep(element))
    }
}

impl<T> Default for Multiset<T>
where
    T: Eq,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Extend<(T, u32)> for Multiset<T>
where
    T: Eq,
{
    fn extend<U: IntoIterator<Item = (T, u32)>>(&mut self, iter: U) {
        for (k, v) in iter {
            *self.amount_mut(k) += v;
        }
    }
}
