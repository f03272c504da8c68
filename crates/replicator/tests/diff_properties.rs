use std::collections::BTreeSet;

use proptest::prelude::*;

use ecs_replicator::{TypeId, diff};

fn type_id_set() -> impl Strategy<Value = Vec<TypeId>> {
    prop::collection::btree_set(0u8..0xFF, 0..48)
        .prop_map(|set| set.into_iter().map(TypeId).collect())
}

fn merged(a: &[TypeId], b: &[TypeId]) -> Vec<TypeId> {
    let mut all: Vec<TypeId> = a.iter().chain(b).copied().collect();
    all.sort_unstable();
    all
}

proptest! {
    #[test]
    fn partitions_rebuild_both_sides(from in type_id_set(), to in type_id_set()) {
        let result = diff(&from, &to);
        prop_assert_eq!(merged(&result.removed, &result.same), from);
        prop_assert_eq!(merged(&result.added, &result.same), to);
    }

    #[test]
    fn partitions_are_disjoint_and_ascending(from in type_id_set(), to in type_id_set()) {
        let result = diff(&from, &to);
        for part in [&result.removed, &result.added, &result.same] {
            prop_assert!(part.windows(2).all(|w| w[0] < w[1]));
        }

        let removed: BTreeSet<_> = result.removed.iter().collect();
        let added: BTreeSet<_> = result.added.iter().collect();
        let same: BTreeSet<_> = result.same.iter().collect();
        prop_assert!(removed.is_disjoint(&added));
        prop_assert!(removed.is_disjoint(&same));
        prop_assert!(added.is_disjoint(&same));
    }

    #[test]
    fn swapping_sides_swaps_added_and_removed(from in type_id_set(), to in type_id_set()) {
        let forward = diff(&from, &to);
        let backward = diff(&to, &from);
        prop_assert_eq!(&forward.added, &backward.removed);
        prop_assert_eq!(&forward.removed, &backward.added);
        prop_assert_eq!(&forward.same, &backward.same);
    }

    #[test]
    fn matches_set_operations(from in type_id_set(), to in type_id_set()) {
        let from_set: BTreeSet<TypeId> = from.iter().copied().collect();
        let to_set: BTreeSet<TypeId> = to.iter().copied().collect();
        let result = diff(&from, &to);

        let removed: Vec<TypeId> = from_set.difference(&to_set).copied().collect();
        let added: Vec<TypeId> = to_set.difference(&from_set).copied().collect();
        let same: Vec<TypeId> = from_set.intersection(&to_set).copied().collect();
        prop_assert_eq!(result.removed, removed);
        prop_assert_eq!(result.added, added);
        prop_assert_eq!(result.same, same);
    }
}
