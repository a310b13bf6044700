use proptest::prelude::*;
use chrono::{Duration, TimeZone, Utc};
use common::PriceObservation;
use engine::HistoryBuffer;

fn observation(i: usize, price: f64) -> PriceObservation {
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    PriceObservation::new(start + Duration::seconds(i as i64), price, "TEST")
}

proptest! {
    /// The buffer holds the newest `min(n, capacity)` observations in arrival order.
    #[test]
    fn history_keeps_newest_in_order(
        capacity in 1usize..64,
        prices in prop::collection::vec(0.01f64..100_000.0f64, 0..200),
    ) {
        let mut history = HistoryBuffer::new(capacity).unwrap();
        for (i, price) in prices.iter().enumerate() {
            history.append(observation(i, *price));
            prop_assert!(history.size() <= capacity);
        }

        let kept = prices.len().min(capacity);
        prop_assert_eq!(history.size(), kept);

        let snapshot = history.snapshot();
        let expected: Vec<f64> = prices[prices.len() - kept..].to_vec();
        let actual: Vec<f64> = snapshot.iter().map(|o| o.price).collect();
        prop_assert_eq!(actual, expected);
        prop_assert!(snapshot.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
    }

    /// Snapshots are unaffected by later appends.
    #[test]
    fn snapshot_is_isolated_from_appends(
        capacity in 1usize..16,
        before in 1usize..32,
        after in 1usize..32,
    ) {
        let mut history = HistoryBuffer::new(capacity).unwrap();
        for i in 0..before {
            history.append(observation(i, 1.0 + i as f64));
        }
        let snapshot = history.snapshot();
        let frozen: Vec<PriceObservation> = snapshot.to_vec();

        for i in before..before + after {
            history.append(observation(i, 1.0 + i as f64));
        }
        prop_assert_eq!(snapshot.to_vec(), frozen);
    }
}
