//! # cascade-validation
//!
//! Judges predictions against what actually happened: direction, magnitude
//! and timing accuracy, confidence calibration, per-order breakdowns, and
//! batch backtests over historical events.

pub mod backtest;
pub mod calibration;
pub mod metrics;
pub mod records;
pub mod report;

pub use backtest::{
    backtest_cascade, compare_to_baseline, run_backtest_suite, BacktestResult, BacktestSuite,
    BaselineComparison, HistoricalDataset, HistoricalEvent, InMemoryOutcomeSource,
    OutcomeSource, RecordedEvent,
};
pub use calibration::{
    calculate_calibration, calibration_from_pairs, CalibrationBin, CalibrationReport,
};
pub use metrics::{
    accuracy_from_pairs, calculate_accuracy, calculate_accuracy_with_config,
    calculate_metrics_by_order, direction_accuracy, magnitude_mae, magnitude_mape,
    metrics_by_order_from_pairs, timing_mae, AccuracyMetrics,
};
pub use records::{match_records, ActualRecord, MatchedPair, PredictionRecord};
pub use report::format_metrics_report;
