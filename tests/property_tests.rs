//! Property-based tests using proptest
//!
//! Invariants that must hold for all inputs:
//! - Group bitsets: word and text forms round-trip, union is commutative
//! - Merging: disjoint layouts merge to the sum of their sublists
//! - Transforms: translate then inverse translate is identity

use bevy::math::Vec3;
use proptest::collection::{btree_set, vec};
use proptest::prelude::*;

use msb_core::collection::EntryCollection;
use msb_core::entries::{MsbEntry, PartKind, Placement, RegionShape};
use msb_core::groups::{GroupBitSet128, GroupBitSet256};
use msb_core::merge::MapMerger;
use msb_core::transform::{rotate_all_in_world, translate_all, Rotation};

fn layout(prefix: &str, parts: usize, points: usize) -> EntryCollection {
    let mut msb = EntryCollection::with_default_schema();
    for i in 0..parts {
        msb.add_entry(
            "map_pieces",
            MsbEntry::part(format!("{prefix}_m{i}"), PartKind::MapPiece, Placement::default()),
        )
        .unwrap();
    }
    for i in 0..points {
        msb.add_entry(
            "points",
            MsbEntry::region(format!("{prefix}_p{i}"), RegionShape::Point, Placement::default()),
        )
        .unwrap();
    }
    msb
}

// ============================================================
// Group Bitset Properties
// ============================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_words_roundtrip_128(words in vec(any::<u32>(), 4)) {
        let set = GroupBitSet128::from_words(&words).unwrap();
        prop_assert_eq!(set.to_words().to_vec(), words);
    }

    #[test]
    fn prop_words_roundtrip_256(words in vec(any::<u32>(), 8)) {
        let set = GroupBitSet256::from_words(&words).unwrap();
        prop_assert_eq!(set.to_words().to_vec(), words.clone());
        let popcount: u32 = words.iter().map(|w| w.count_ones()).sum();
        prop_assert_eq!(set.len(), popcount as usize);
    }

    #[test]
    fn prop_text_roundtrip(bits in btree_set(0u32..128, 0..40)) {
        let set = GroupBitSet128::from_bit_indices(bits.iter().copied()).unwrap();
        let text = set.to_string();
        let parsed: GroupBitSet128 = text.parse().unwrap();
        prop_assert_eq!(parsed.to_sorted_indices(), bits.into_iter().collect::<Vec<_>>());
    }

    #[test]
    fn prop_text_roundtrip_256(bits in btree_set(0u32..256, 0..60)) {
        let set = GroupBitSet256::from_bit_indices(bits.iter().copied()).unwrap();
        let text = set.to_string();
        prop_assert!(text.starts_with("GroupBitSet256("));
        let parsed: GroupBitSet256 = text.parse().unwrap();
        prop_assert_eq!(&parsed, &set);
        prop_assert_eq!(parsed.to_sorted_indices(), bits.into_iter().collect::<Vec<_>>());
    }

    #[test]
    fn prop_union_commutative(
        a in btree_set(0u32..256, 0..30),
        b in btree_set(0u32..256, 0..30),
    ) {
        let a = GroupBitSet256::from_bit_indices(a).unwrap();
        let b = GroupBitSet256::from_bit_indices(b).unwrap();
        prop_assert_eq!(a.union(&b), b.union(&a));
        prop_assert_eq!(&a | &b, a.union(&b));
    }

    #[test]
    fn prop_out_of_range_always_rejected(bit in 128u32..=u32::MAX) {
        let mut set = GroupBitSet128::new();
        prop_assert!(set.add(bit).is_err());
        prop_assert!(set.is_empty());
    }
}

// ============================================================
// Merge Properties
// ============================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    #[test]
    fn prop_disjoint_merge_sums_lists(
        a_parts in 0usize..8, a_points in 0usize..8,
        b_parts in 0usize..8, b_points in 0usize..8,
    ) {
        let a = layout("a", a_parts, a_points);
        let b = layout("b", b_parts, b_points);
        let merged = MapMerger::new().merge(&a, &b).unwrap();
        prop_assert_eq!(merged.list("map_pieces").unwrap().len(), a_parts + b_parts);
        prop_assert_eq!(merged.list("points").unwrap().len(), a_points + b_points);
        prop_assert_eq!(merged.list_names(), a.list_names());
        // inputs are untouched
        prop_assert_eq!(a.entry_count(), a_parts + a_points);
        prop_assert_eq!(b.entry_count(), b_parts + b_points);
    }
}

// ============================================================
// Transform Properties
// ============================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_translate_inverse_is_identity(
        x in -1000.0f32..1000.0, y in -1000.0f32..1000.0, z in -1000.0f32..1000.0,
    ) {
        let mut msb = layout("t", 3, 2);
        let delta = Vec3::new(x, y, z);
        translate_all(&mut msb, delta, &[]).unwrap();
        translate_all(&mut msb, -delta, &[]).unwrap();
        for entry in msb.entries() {
            let translate = entry.placement().unwrap().translate;
            prop_assert!(translate.abs_diff_eq(Vec3::ZERO, 1e-2), "{translate:?}");
        }
    }

    #[test]
    fn prop_yaw_preserves_pivot_distance(
        yaw in -360.0f32..360.0,
        x in -100.0f32..100.0, z in -100.0f32..100.0,
    ) {
        let mut msb = EntryCollection::with_default_schema();
        msb.add_entry(
            "map_pieces",
            MsbEntry::part("p", PartKind::MapPiece, Placement::at(Vec3::new(x, 0.0, z))),
        )
        .unwrap();
        let pivot = Vec3::new(5.0, 0.0, -5.0);
        let before = Vec3::new(x, 0.0, z).distance(pivot);
        rotate_all_in_world(&mut msb, Rotation::Yaw(yaw), Some(pivot), false, &[]).unwrap();
        let after = msb.find_by_name("p")[0].placement().unwrap().translate;
        prop_assert!((after.distance(pivot) - before).abs() < 1e-2);
        prop_assert!(after.y.abs() < 1e-3);
    }
}
