//! Map Merging
//!
//! Combines two collections sublist by sublist into a brand-new collection.
//! Both inputs must declare the same sublists in the same order. Entries are
//! deep-copied, so the result never aliases either input, and a rejected
//! merge leaves both inputs exactly as they were.

use std::collections::BTreeSet;
use tracing::{debug, warn};

use crate::collection::{EntryCollection, EntryList};
use crate::entries::MsbEntry;

/// Predicate deciding which entries take part in a merge
pub type EntryFilter<'a> = &'a dyn Fn(&MsbEntry) -> bool;

/// Error type for merge operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MergeError {
    #[error("Cannot merge layouts with different sublists: {left:?} vs {right:?}")]
    SchemaMismatch {
        left: Vec<String>,
        right: Vec<String>,
    },
    #[error("Repeated names in merged sublist {list}: {names:?}")]
    NameCollision { list: String, names: Vec<String> },
}

/// Receives advisory notices produced while merging.
pub trait MergeReporter {
    fn repeated_names(&self, list: &str, names: &[String]);
}

/// Reports through `tracing` warnings
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl MergeReporter for TracingReporter {
    fn repeated_names(&self, list: &str, names: &[String]) {
        warn!(list, ?names, "Allowing repeated names in merged layouts");
    }
}

impl EntryCollection {
    /// Merge `other` into a new collection, this collection's entries first.
    ///
    /// `filter` is applied to both sides independently. Names present on both
    /// filtered sides of a sublist abort the merge unless
    /// `allow_repeated_names` is set, in which case `reporter` is told.
    pub fn merge(
        &self,
        other: &EntryCollection,
        filter: Option<EntryFilter<'_>>,
        allow_repeated_names: bool,
        reporter: &dyn MergeReporter,
    ) -> Result<EntryCollection, MergeError> {
        let left_schema = self.schema();
        let right_schema = other.schema();
        if left_schema != right_schema {
            return Err(MergeError::SchemaMismatch {
                left: self.list_names().iter().map(|n| n.to_string()).collect(),
                right: other.list_names().iter().map(|n| n.to_string()).collect(),
            });
        }

        let mut merged = EntryCollection::new();
        for (name, left_list) in self.lists() {
            let right_list = other
                .list(name)
                .map_err(|_| MergeError::SchemaMismatch {
                    left: self.list_names().iter().map(|n| n.to_string()).collect(),
                    right: other.list_names().iter().map(|n| n.to_string()).collect(),
                })?;
            let left = left_list.get_filtered_list(filter);
            let right = right_list.get_filtered_list(filter);

            let left_names: BTreeSet<&str> = left.get_entry_names().into_iter().collect();
            let repeated: Vec<String> = right
                .get_entry_names()
                .into_iter()
                .filter(|n| left_names.contains(n))
                .collect::<BTreeSet<&str>>()
                .into_iter()
                .map(str::to_string)
                .collect();
            if !repeated.is_empty() {
                if !allow_repeated_names {
                    return Err(MergeError::NameCollision {
                        list: name.to_string(),
                        names: repeated,
                    });
                }
                reporter.repeated_names(name, &repeated);
            }

            let mut list = EntryList::new(left_list.supertype());
            for entry in left.iter().chain(right.iter()) {
                list.push_unchecked(entry.deep_copy());
            }
            merged.insert_list(name.to_string(), list);
        }

        debug!(
            left = self.entry_count(),
            right = other.entry_count(),
            merged = merged.entry_count(),
            "Merged layouts"
        );
        Ok(merged)
    }
}

/// Boundary entry point for merging two layouts.
///
/// ```
/// use msb_core::collection::EntryCollection;
/// use msb_core::merge::MapMerger;
///
/// let a = EntryCollection::with_default_schema();
/// let b = EntryCollection::with_default_schema();
/// let merged = MapMerger::new().allow_repeated_names(true).merge(&a, &b).unwrap();
/// assert!(merged.is_empty());
/// ```
pub struct MapMerger<'a> {
    filter: Option<EntryFilter<'a>>,
    allow_repeated_names: bool,
    reporter: &'a dyn MergeReporter,
}

impl Default for MapMerger<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> MapMerger<'a> {
    pub fn new() -> Self {
        Self {
            filter: None,
            allow_repeated_names: false,
            reporter: &TracingReporter,
        }
    }

    pub fn filter(mut self, filter: EntryFilter<'a>) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn allow_repeated_names(mut self, allow: bool) -> Self {
        self.allow_repeated_names = allow;
        self
    }

    pub fn reporter(mut self, reporter: &'a dyn MergeReporter) -> Self {
        self.reporter = reporter;
        self
    }

    pub fn merge(
        &self,
        first: &EntryCollection,
        second: &EntryCollection,
    ) -> Result<EntryCollection, MergeError> {
        first.merge(second, self.filter, self.allow_repeated_names, self.reporter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entries::{EntrySupertype, PartKind, Placement, RegionShape};
    use bevy::math::Vec3;
    use std::cell::RefCell;

    #[derive(Default)]
    struct RecordingReporter {
        seen: RefCell<Vec<(String, Vec<String>)>>,
    }

    impl MergeReporter for RecordingReporter {
        fn repeated_names(&self, list: &str, names: &[String]) {
            self.seen.borrow_mut().push((list.to_string(), names.to_vec()));
        }
    }

    fn layout(prefix: &str, parts: usize) -> EntryCollection {
        let mut msb = EntryCollection::with_default_schema();
        for i in 0..parts {
            msb.add_entry(
                "map_pieces",
                MsbEntry::part(
                    format!("{prefix}_{i:04}"),
                    PartKind::MapPiece,
                    Placement::default(),
                ),
            )
            .unwrap();
        }
        msb.add_entry(
            "points",
            MsbEntry::region(format!("{prefix}_point"), RegionShape::Point, Placement::default()),
        )
        .unwrap();
        msb
    }

    #[test]
    fn test_disjoint_merge_counts() {
        let a = layout("a", 3);
        let b = layout("b", 2);
        let merged = MapMerger::new().merge(&a, &b).unwrap();
        assert_eq!(merged.list("map_pieces").unwrap().len(), 5);
        assert_eq!(merged.list("points").unwrap().len(), 2);
        assert_eq!(merged.list_names(), a.list_names());
        assert_eq!(
            merged.list("map_pieces").unwrap().get_entry_names(),
            vec!["a_0000", "a_0001", "a_0002", "b_0000", "b_0001"]
        );
    }

    #[test]
    fn test_merge_rejects_collision() {
        let a = layout("a", 2);
        let b = layout("a", 1);
        let err = a.merge(&b, None, false, &TracingReporter).unwrap_err();
        assert_eq!(
            err,
            MergeError::NameCollision {
                list: "map_pieces".into(),
                names: vec!["a_0000".into()]
            }
        );
    }

    #[test]
    fn test_merge_allows_collision_and_reports() {
        let a = layout("a", 2);
        let b = layout("a", 1);
        let reporter = RecordingReporter::default();
        let merged = MapMerger::new()
            .allow_repeated_names(true)
            .reporter(&reporter)
            .merge(&a, &b)
            .unwrap();
        assert_eq!(merged.list("map_pieces").unwrap().len(), 3);
        let seen = reporter.seen.borrow();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0], ("map_pieces".to_string(), vec!["a_0000".to_string()]));
        assert_eq!(seen[1], ("points".to_string(), vec!["a_point".to_string()]));
    }

    #[test]
    fn test_filter_applies_to_both_sides() {
        let a = layout("a", 2);
        let b = layout("a", 2);
        let only_points =
            |e: &MsbEntry| e.supertype() == EntrySupertype::Regions && e.name.is_empty();
        // filter removes everything, so no collision is possible
        let merged = MapMerger::new().filter(&only_points).merge(&a, &b).unwrap();
        assert!(merged.is_empty());

        let skip_first = |e: &MsbEntry| e.name != "a_0000" && e.name != "a_point";
        let err = MapMerger::new().filter(&skip_first).merge(&a, &b).unwrap_err();
        assert_eq!(
            err,
            MergeError::NameCollision {
                list: "map_pieces".into(),
                names: vec!["a_0001".into()]
            }
        );
    }

    #[test]
    fn test_schema_mismatch() {
        let a = layout("a", 1);
        let mut b = EntryCollection::new();
        b.add_list("map_pieces", EntrySupertype::Parts).unwrap();
        assert!(matches!(
            a.merge(&b, None, true, &TracingReporter),
            Err(MergeError::SchemaMismatch { .. })
        ));
    }

    #[test]
    fn test_merge_deep_copies() {
        let a = layout("a", 1);
        let b = layout("b", 1);
        let mut merged = MapMerger::new().merge(&a, &b).unwrap();
        let original_key = a.find_by_name("a_0000")[0].key();
        let merged_entry = merged.find_by_name("a_0000")[0];
        assert_ne!(merged_entry.key(), original_key);

        let merged_key = merged_entry.key();
        merged
            .get_entry_mut(merged_key)
            .unwrap()
            .placement_mut()
            .unwrap()
            .translate = Vec3::splat(9.0);
        assert_eq!(a.find_by_name("a_0000")[0].placement().unwrap().translate, Vec3::ZERO);
    }
}
