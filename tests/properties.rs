use std::collections::BTreeSet;
use std::ops::Bound;

use avlset::AvlSet;
use proptest::collection::vec;
use proptest::prelude::*;

fn height_bound(len: usize) -> f64 {
    1.4405 * ((len + 2) as f64).log2() - 0.328
}

/// Walks every element through a cursor and checks its balance factor.
fn assert_balanced<T>(set: &AvlSet<T>) {
    let mut cursor = set.cursor_first();
    let mut visited = 0;
    while !cursor.is_end() {
        let balance = cursor.balance().unwrap();
        assert!((-1..=1).contains(&balance), "balance factor {balance}");
        visited += 1;
        cursor.move_next();
    }
    assert_eq!(visited, set.len());
}

proptest! {
    #[test]
    fn iteration_matches_sorted_dedup(keys in vec(any::<u64>(), 0..512)) {
        let set: AvlSet<u64> = keys.iter().copied().collect();

        let mut reference = keys.clone();
        reference.sort_unstable();
        reference.dedup();

        prop_assert_eq!(set.len(), reference.len());
        prop_assert!(set.iter().eq(reference.iter()));
        prop_assert!(set.iter().rev().eq(reference.iter().rev()));
        prop_assert_eq!(set.first(), reference.first());
        prop_assert_eq!(set.last(), reference.last());
    }

    #[test]
    fn insertion_order_is_irrelevant(mut keys in vec(any::<i32>(), 0..256)) {
        let forward: AvlSet<i32> = keys.iter().copied().collect();
        keys.reverse();
        let backward: AvlSet<i32> = keys.iter().copied().collect();
        prop_assert_eq!(forward, backward);
    }

    #[test]
    fn duplicates_are_rejected(keys in vec(0u16..64, 0..256)) {
        let mut set = AvlSet::new();
        let mut distinct = BTreeSet::new();
        for key in &keys {
            let (position, inserted) = set.insert(*key);
            prop_assert_eq!(position.get(), Some(key));
            prop_assert_eq!(inserted, distinct.insert(*key));
        }
        prop_assert_eq!(set.len(), distinct.len());

        for key in &keys {
            prop_assert!(!set.insert(*key).1);
        }
        prop_assert_eq!(set.len(), distinct.len());
    }

    #[test]
    fn balance_and_height_hold_after_every_insert(keys in vec(any::<i32>(), 1..200)) {
        let mut set = AvlSet::new();
        for key in keys {
            set.insert(key);
            assert_balanced(&set);
            prop_assert!(set.height() as f64 <= height_bound(set.len()));
        }
    }

    #[test]
    fn sequential_keys_stay_balanced(len in 0usize..2048) {
        let set: AvlSet<usize> = (0..len).collect();
        assert_balanced(&set);
        prop_assert!(set.height() as f64 <= height_bound(set.len()));
    }

    #[test]
    fn bounds_agree_with_btree(keys in vec(0u32..1000, 0..200), probe in 0u32..1000) {
        let set: AvlSet<u32> = keys.iter().copied().collect();
        let reference: BTreeSet<u32> = keys.iter().copied().collect();

        let expected_lower = reference.range(probe..).next();
        let expected_upper = reference
            .range((Bound::Excluded(probe), Bound::Unbounded))
            .next();

        prop_assert_eq!(set.lower_bound(&probe).get(), expected_lower);
        prop_assert_eq!(set.upper_bound(&probe).get(), expected_upper);
        prop_assert_eq!(set.count(&probe), usize::from(reference.contains(&probe)));

        let (lower, upper) = set.equal_range(&probe);
        prop_assert_eq!(lower == upper, !reference.contains(&probe));
    }

    #[test]
    fn cursor_walks_both_ways(keys in vec(any::<i16>(), 0..128)) {
        let set: AvlSet<i16> = keys.iter().copied().collect();

        let mut forward = Vec::new();
        let mut cursor = set.cursor_first();
        while let Some(key) = cursor.get() {
            forward.push(*key);
            cursor.move_next();
        }
        prop_assert!(cursor == set.cursor_end());

        let mut backward = Vec::new();
        cursor.move_prev();
        while let Some(key) = cursor.get() {
            backward.push(*key);
            cursor.move_prev();
        }
        backward.reverse();

        prop_assert_eq!(&forward, &backward);
        prop_assert!(set.iter().copied().eq(forward));
    }
}

#[test]
fn clear_then_reuse() {
    let mut set: AvlSet<u64> = (0..10_000).collect();
    assert_eq!(set.len(), 10_000);
    set.clear();
    assert!(set.is_empty());
    assert_eq!(set.height(), 0);
    assert!(set.cursor_first().is_end());

    set.extend([3, 1, 2]);
    assert_eq!(set.iter().copied().collect::<Vec<_>>(), [1, 2, 3]);
}

#[test]
fn drops_every_key_once() {
    use std::rc::Rc;

    let token = Rc::new(());
    {
        let mut set = AvlSet::with_comparator(|a: &(u32, Rc<()>), b: &(u32, Rc<()>)| a.0.cmp(&b.0));
        for key in 0..500 {
            set.insert((key, Rc::clone(&token)));
        }
        // Rejected duplicates are dropped right away
        set.insert((7, Rc::clone(&token)));
        assert_eq!(Rc::strong_count(&token), 501);
    }
    assert_eq!(Rc::strong_count(&token), 1);
}
