//! Tags
//!
//! Free-form product labels ("Best Seller", "Chocolate", ...) kept sorted and de-duplicated so
//! lookups can binary search.

use std::{cmp::Ordering, string::ToString};

use smallvec::SmallVec;

/// A sorted, de-duplicated set of string tags backed by `SmallVec<[String; 4]>`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tags {
    tags: SmallVec<[String; 4]>,
}

impl Tags {
    /// Create a tag set, sorting and removing duplicates.
    #[must_use]
    pub fn new(tags: SmallVec<[String; 4]>) -> Self {
        let mut collection = Self { tags };

        collection.tags.sort();
        collection.tags.dedup();

        collection
    }

    /// Create a tag set from string slices.
    pub fn from_strs(tags: &[&str]) -> Self {
        Self::new(
            tags.iter()
                .map(ToString::to_string)
                .collect::<SmallVec<[String; 4]>>(),
        )
    }

    /// Whether the set contains `tag` (exact match).
    pub fn contains(&self, tag: &str) -> bool {
        self.tags
            .binary_search_by(|probe| probe.as_str().cmp(tag))
            .is_ok()
    }

    /// Whether the two sets share at least one tag.
    pub fn intersects(&self, other: &Self) -> bool {
        let mut left = self.tags.iter();
        let mut right = other.tags.iter();
        let mut left_tag = left.next();
        let mut right_tag = right.next();

        while let (Some(left_ref), Some(right_ref)) = (left_tag, right_tag) {
            match left_ref.cmp(right_ref) {
                Ordering::Equal => return true,
                Ordering::Less => left_tag = left.next(),
                Ordering::Greater => right_tag = right.next(),
            }
        }

        false
    }

    /// Iterate the tags in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(String::as_str)
    }
}

impl From<Vec<String>> for Tags {
    fn from(tags: Vec<String>) -> Self {
        Self::new(SmallVec::from_vec(tags))
    }
}
