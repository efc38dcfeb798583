//! # cascade-learning
//!
//! Compares predicted effects with observed outcomes and nudges the strength,
//! delay, and confidence of every link along each matched effect's chain.
//! Updates happen in place through `&mut CausalGraph`.

pub mod backtest;
pub mod engine;
pub mod feedback;
pub mod history;

pub use backtest::{update_graph_from_backtest, BacktestLearningStats, HistoricalObservation};
pub use engine::LearningEngine;
pub use feedback::{
    compare_prediction_to_outcome, learn_from_outcomes, same_direction, update_link,
    LearningStats, PredictionOutcome,
};
pub use history::{link_history, reset_link_learning, LinkHistory};
