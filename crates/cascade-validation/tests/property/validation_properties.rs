//! Property tests: metric ranges and calibration bookkeeping.

use proptest::prelude::*;

use cascade_validation::{
    calculate_accuracy, calculate_calibration, match_records, ActualRecord, PredictionRecord,
};

fn records() -> impl Strategy<Value = (Vec<PredictionRecord>, Vec<ActualRecord>)> {
    let pred = (0u8..12, -0.2f64..0.2, 0.0f64..=1.0, proptest::option::of(0.0f64..14.0))
        .prop_map(|(e, m, c, d)| {
            let mut p = PredictionRecord::new(format!("E{e}"), m).with_confidence(c);
            p.day = d;
            p
        });
    let actual = (0u8..12, -0.2f64..0.2, proptest::option::of(0.0f64..14.0)).prop_map(
        |(e, m, d)| ActualRecord {
            entity: format!("E{e}"),
            magnitude: m,
            day: d,
        },
    );
    (
        proptest::collection::vec(pred, 0..30),
        proptest::collection::vec(actual, 0..30),
    )
}

proptest! {
    #[test]
    fn metrics_stay_in_range((preds, actuals) in records()) {
        let m = calculate_accuracy(&preds, &actuals);
        prop_assert!((0.0..=1.0).contains(&m.direction_accuracy));
        prop_assert!(m.magnitude_mae >= 0.0);
        prop_assert!(m.magnitude_mape >= 0.0);
        prop_assert!(m.timing_mae >= 0.0);
        prop_assert!((0.0..=1.0).contains(&m.calibration_error));
        prop_assert_eq!(m.n_predictions, match_records(&preds, &actuals).len());
    }

    #[test]
    fn calibration_bins_account_for_every_match(
        (preds, actuals) in records(),
        num_bins in 1usize..20,
    ) {
        let report = calculate_calibration(&preds, &actuals, num_bins);
        let binned: usize = report.bins.iter().map(|b| b.count).sum();
        prop_assert_eq!(binned, match_records(&preds, &actuals).len());
        prop_assert!(report.bins.len() <= num_bins);
        for bin in &report.bins {
            prop_assert!(bin.count > 0);
            prop_assert!(bin.low < bin.high);
            prop_assert!((bin.error - (bin.expected - bin.actual).abs()).abs() < 1e-12);
        }
    }
}
