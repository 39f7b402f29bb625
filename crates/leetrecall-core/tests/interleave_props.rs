//! Property tests for the queue interleaver.

use proptest::prelude::*;

use leetrecall_core::interleave::interleave;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Primary(usize),
    Secondary(usize),
}

fn tagged(plen: usize, slen: usize) -> (Vec<Side>, Vec<Side>) {
    (
        (0..plen).map(Side::Primary).collect(),
        (0..slen).map(Side::Secondary).collect(),
    )
}

proptest! {
    #[test]
    fn output_is_a_permutation_preserving_both_orders(plen in 0usize..64, slen in 0usize..64) {
        let (primary, secondary) = tagged(plen, slen);
        let merged = interleave(primary, secondary);

        prop_assert_eq!(merged.len(), plen + slen);

        let primary_back: Vec<usize> = merged
            .iter()
            .filter_map(|side| match side {
                Side::Primary(i) => Some(*i),
                Side::Secondary(_) => None,
            })
            .collect();
        let secondary_back: Vec<usize> = merged
            .iter()
            .filter_map(|side| match side {
                Side::Secondary(i) => Some(*i),
                Side::Primary(_) => None,
            })
            .collect();
        prop_assert_eq!(primary_back, (0..plen).collect::<Vec<_>>());
        prop_assert_eq!(secondary_back, (0..slen).collect::<Vec<_>>());
    }

    #[test]
    fn merging_is_deterministic(plen in 0usize..64, slen in 0usize..64) {
        let (primary, secondary) = tagged(plen, slen);
        let first = interleave(primary.clone(), secondary.clone());
        let second = interleave(primary, secondary);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn a_minority_secondary_never_clusters(plen in 1usize..64, slen in 1usize..64) {
        prop_assume!(slen <= plen);
        let (primary, secondary) = tagged(plen, slen);
        let merged = interleave(primary, secondary);

        // With no more secondary than primary items, two secondary items are
        // never adjacent.
        for pair in merged.windows(2) {
            let both_secondary = matches!(
                (pair[0], pair[1]),
                (Side::Secondary(_), Side::Secondary(_))
            );
            prop_assert!(!both_secondary);
        }
    }

    #[test]
    fn first_slot_goes_to_the_strict_majority(plen in 1usize..64, slen in 1usize..64) {
        let (primary, secondary) = tagged(plen, slen);
        let merged = interleave(primary, secondary);
        match merged[0] {
            Side::Primary(_) => prop_assert!(plen > slen),
            Side::Secondary(_) => prop_assert!(slen >= plen),
        }
    }
}
