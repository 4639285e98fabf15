use chart_tiles::core::{TimeRange, build_bucket_levels, snap_range};
use proptest::prelude::*;

proptest! {
    #[test]
    fn snapped_range_is_aligned_and_never_shrinks(
        from_ms in -1_000_000_000i64..1_000_000_000,
        len_ms in 0i64..10_000_000,
        bucket_ms in 1i64..100_000
    ) {
        let range = TimeRange::new(from_ms, from_ms + len_ms);
        let snapped = snap_range(range, bucket_ms);

        prop_assert_eq!(snapped.from_ms.rem_euclid(bucket_ms), 0);
        prop_assert_eq!(snapped.to_ms.rem_euclid(bucket_ms), 0);
        prop_assert!(snapped.from_ms <= range.from_ms);
        prop_assert!(snapped.to_ms >= range.to_ms);
        // Snapping widens by less than one bucket on each side.
        prop_assert!(range.from_ms - snapped.from_ms < bucket_ms);
        prop_assert!(snapped.to_ms - range.to_ms < bucket_ms);
    }

    #[test]
    fn snapping_is_idempotent(
        from_ms in -1_000_000_000i64..1_000_000_000,
        len_ms in 0i64..10_000_000,
        bucket_ms in 1i64..100_000
    ) {
        let snapped = snap_range(TimeRange::new(from_ms, from_ms + len_ms), bucket_ms);
        prop_assert_eq!(snap_range(snapped, bucket_ms), snapped);
    }

    #[test]
    fn ladder_is_strictly_descending_and_topped(
        top_bucket_ms in 1i64..10_000_000,
        widths in prop::collection::vec(1i64..10_000_000, 0..20)
    ) {
        let levels = build_bucket_levels(top_bucket_ms, &widths);

        prop_assert_eq!(levels.first().copied(), Some(top_bucket_ms));
        for pair in levels.windows(2) {
            prop_assert!(pair[0] > pair[1]);
        }
        prop_assert!(levels.iter().all(|&width| width > 0 && width <= top_bucket_ms));
    }
}
