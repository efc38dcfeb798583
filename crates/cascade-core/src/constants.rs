/// Cascade engine version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Decimal places used when rounding magnitudes for the propagation visit key.
/// Two paths reaching the same entity with magnitudes equal at this precision
/// are treated as the same visit.
pub const DEDUP_MAGNITUDE_DECIMALS: i32 = 3;

/// Learned link strength bounds.
pub const MIN_LEARNED_STRENGTH: f64 = 0.01;
pub const MAX_LEARNED_STRENGTH: f64 = 0.99;

/// Learned link confidence bounds.
pub const MIN_LEARNED_CONFIDENCE: f64 = 0.1;
pub const MAX_LEARNED_CONFIDENCE: f64 = 0.99;

/// Floor for learned delay mean and delay std (days).
pub const MIN_LEARNED_DELAY: f64 = 0.1;

/// Maximum relative strength change per observation.
pub const MAX_STRENGTH_ADJUSTMENT: f64 = 0.1;

/// Confidence reward for a correct direction, scaled by the learning rate.
pub const CONFIDENCE_REWARD: f64 = 0.02;

/// Confidence penalty for a wrong direction, scaled by the learning rate.
pub const CONFIDENCE_PENALTY: f64 = 0.05;

/// Initial historical accuracy of a link with no observations.
pub const INITIAL_HISTORICAL_ACCURACY: f64 = 0.5;

/// Timing (days after the trigger) assumed for backtest actuals with no day.
pub const DEFAULT_OUTCOME_TIMING_DAYS: f64 = 5.0;

/// Confidence below which explanations carry a low-confidence caveat.
pub const LOW_CONFIDENCE_CAVEAT: f64 = 0.5;
