use std::collections::BTreeSet;

use chart_join::core::Key;
use chart_join::join::reconcile;
use proptest::prelude::*;

fn key_set() -> impl Strategy<Value = BTreeSet<u8>> {
    proptest::collection::btree_set(0u8..40, 0..30)
}

proptest! {
    #[test]
    fn partition_is_exhaustive_and_disjoint(previous in key_set(), next in key_set()) {
        let previous_keys: Vec<Key> = previous.iter().map(|k| Key::new(format!("k{k}"))).collect();
        let data: Vec<u8> = next.iter().copied().collect();

        let partition = reconcile(&previous_keys, &data, |k| Key::new(format!("k{k}")))
            .expect("unique keys");

        prop_assert_eq!(partition.enter.len() + partition.update.len(), data.len());

        let entered: BTreeSet<u8> = partition.enter.iter().map(|k| **k).collect();
        let updated: BTreeSet<u8> = partition.update.iter().map(|(_, k)| **k).collect();
        prop_assert!(entered.is_disjoint(&updated));
        prop_assert_eq!(&entered, &next.difference(&previous).copied().collect::<BTreeSet<_>>());
        prop_assert_eq!(&updated, &next.intersection(&previous).copied().collect::<BTreeSet<_>>());

        let exited: BTreeSet<String> = partition.exit.iter().map(|k| k.to_string()).collect();
        let expected_exit: BTreeSet<String> = previous
            .difference(&next)
            .map(|k| format!("k{k}"))
            .collect();
        prop_assert_eq!(exited, expected_exit);
    }

    #[test]
    fn reconciling_against_own_keys_is_unchanged(next in key_set()) {
        let data: Vec<u8> = next.iter().copied().collect();
        let own: Vec<Key> = data.iter().map(|k| Key::new(format!("k{k}"))).collect();

        let partition = reconcile(&own, &data, |k| Key::new(format!("k{k}"))).expect("unique keys");

        prop_assert!(partition.is_unchanged());
        prop_assert_eq!(partition.update.len(), data.len());
    }

    #[test]
    fn reconciling_the_same_inputs_twice_gives_the_same_partition(
        previous in key_set(),
        next in key_set()
    ) {
        let previous_keys: Vec<Key> = previous.iter().map(|k| Key::new(format!("k{k}"))).collect();
        let data: Vec<u8> = next.iter().rev().copied().collect();
        let key_of = |k: &u8| Key::new(format!("k{k}"));

        let first = reconcile(&previous_keys, &data, key_of).expect("unique keys");
        let second = reconcile(&previous_keys, &data, key_of).expect("unique keys");

        prop_assert_eq!(first, second);
    }
}
