// Single source of truth for all default values.

// --- Propagation ---
pub const DEFAULT_HORIZON_DAYS: u32 = 14;
pub const DEFAULT_MIN_CONFIDENCE: f64 = 0.1;
pub const DEFAULT_MIN_MAGNITUDE: f64 = 0.005; // 0.5%
pub const DEFAULT_MAX_ORDER: u32 = 5;

// --- Simulation ---
pub const DEFAULT_NUM_SIMULATIONS: usize = 100;
pub const DEFAULT_SIMULATION_PARALLEL: bool = true;

// --- Learning ---
pub const DEFAULT_LEARNING_RATE: f64 = 0.1;
pub const DEFAULT_BACKTEST_LEARNING_RATE: f64 = 0.05;

// --- Validation ---
pub const DEFAULT_CALIBRATION_BINS: usize = 10;
pub const DEFAULT_EXPLAIN_TOP_N: usize = 10;

// --- Observability ---
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_JSON_LOGS: bool = false;
