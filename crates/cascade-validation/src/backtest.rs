//! Backtesting cascades against historical outcomes.
//!
//! Actual moves come from an [`OutcomeSource`]; the network-backed
//! implementations live outside this crate. A source failure for one event
//! leaves that event without actuals and never aborts a suite.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use cascade_causal::graph::CausalGraph;
use cascade_causal::propagation::{propagate_with_rng, Cascade};
use cascade_core::config::{CascadeConfig, PropagationConfig, ValidationConfig};
use cascade_core::constants::DEFAULT_OUTCOME_TIMING_DAYS;
use cascade_core::errors::OutcomeError;
use cascade_core::models::{Event, Outcome};
use cascade_learning::HistoricalObservation;
use cascade_observability::events;

use crate::calibration::{calibration_from_pairs, CalibrationReport};
use crate::metrics::{
    accuracy_from_pairs, calculate_accuracy_with_config, metrics_by_order_from_pairs,
    AccuracyMetrics,
};
use crate::records::{match_records, ActualRecord, MatchedPair, PredictionRecord};
use crate::report::format_metrics_report;

/// Supplies the moves actually observed after a historical event.
pub trait OutcomeSource {
    /// Actual moves for `entities` following `event` on `event_date`.
    /// Entities with no data are simply absent from the result.
    fn actuals(
        &self,
        event: &Event,
        event_date: NaiveDate,
        entities: &[String],
    ) -> Result<Vec<ActualRecord>, OutcomeError>;
}

/// Outcomes recorded ahead of time, keyed by trigger entity and date.
#[derive(Debug, Clone, Default)]
pub struct InMemoryOutcomeSource {
    recorded: HashMap<(String, NaiveDate), Vec<ActualRecord>>,
}

impl InMemoryOutcomeSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the actuals observed after `trigger_entity`'s event on `date`.
    /// Replaces anything recorded for the same key.
    pub fn insert(
        &mut self,
        trigger_entity: impl Into<String>,
        date: NaiveDate,
        actuals: Vec<ActualRecord>,
    ) {
        self.recorded.insert((trigger_entity.into(), date), actuals);
    }

    pub fn from_recorded(events: &[RecordedEvent]) -> Self {
        let mut source = Self::new();
        for recorded in events {
            source.insert(
                recorded.historical.event.entity.clone(),
                recorded.historical.event_date,
                recorded.actuals.clone(),
            );
        }
        source
    }
}

impl OutcomeSource for InMemoryOutcomeSource {
    fn actuals(
        &self,
        event: &Event,
        event_date: NaiveDate,
        entities: &[String],
    ) -> Result<Vec<ActualRecord>, OutcomeError> {
        let recorded = self
            .recorded
            .get(&(event.entity.clone(), event_date))
            .ok_or_else(|| OutcomeError::NotRecorded {
                entity: event.entity.clone(),
                date: event_date.to_string(),
            })?;
        Ok(recorded
            .iter()
            .filter(|a| entities.contains(&a.entity))
            .cloned()
            .collect())
    }
}

/// A past trigger event and the date it happened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalEvent {
    pub event: Event,
    pub event_date: NaiveDate,
}

impl HistoricalEvent {
    pub fn new(event: Event, event_date: NaiveDate) -> Self {
        Self { event, event_date }
    }
}

/// A historical event stored together with its observed actuals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordedEvent {
    #[serde(flatten)]
    pub historical: HistoricalEvent,
    #[serde(default)]
    pub actuals: Vec<ActualRecord>,
}

/// A replayable set of recorded events.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoricalDataset {
    pub events: Vec<RecordedEvent>,
}

impl HistoricalDataset {
    pub fn historical_events(&self) -> Vec<HistoricalEvent> {
        self.events.iter().map(|r| r.historical.clone()).collect()
    }

    pub fn outcome_source(&self) -> InMemoryOutcomeSource {
        InMemoryOutcomeSource::from_recorded(&self.events)
    }
}

/// Predictions and actuals for one backtested event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestResult {
    pub event: Event,
    pub event_date: NaiveDate,
    pub cascade: Cascade,
    pub predictions: Vec<PredictionRecord>,
    pub actuals: Vec<ActualRecord>,
    pub metrics: AccuracyMetrics,
}

impl BacktestResult {
    /// Actuals as learning outcomes. Actuals without a day are assumed to
    /// have materialized `DEFAULT_OUTCOME_TIMING_DAYS` after the event.
    pub fn outcomes(&self) -> Vec<Outcome> {
        let observed_at = self.event_date.and_time(NaiveTime::MIN).and_utc();
        self.actuals
            .iter()
            .map(|a| {
                Outcome::new(
                    a.entity.clone(),
                    a.magnitude,
                    a.day.unwrap_or(DEFAULT_OUTCOME_TIMING_DAYS),
                )
                .with_observed_at(observed_at)
            })
            .collect()
    }

    pub fn observation(&self) -> HistoricalObservation {
        HistoricalObservation::new(self.cascade.clone(), self.outcomes())
    }
}

/// Results of backtesting a batch of historical events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestSuite {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub results: Vec<BacktestResult>,
    pub aggregate_metrics: AccuracyMetrics,
    pub metrics_by_order: BTreeMap<u32, AccuracyMetrics>,
    pub calibration: CalibrationReport,
}

impl BacktestSuite {
    pub fn num_events(&self) -> usize {
        self.results.len()
    }

    pub fn num_predictions(&self) -> usize {
        self.results.iter().map(|r| r.predictions.len()).sum()
    }

    /// One learning observation per backtested event, ready for
    /// `update_graph_from_backtest`.
    pub fn observations(&self) -> Vec<HistoricalObservation> {
        self.results.iter().map(BacktestResult::observation).collect()
    }

    pub fn summary(&self) -> String {
        format_metrics_report(
            &self.aggregate_metrics,
            Some(&self.metrics_by_order),
            Some(&self.calibration),
        )
    }
}

/// Backtest one event with a fresh thread-local RNG for delay sampling.
pub fn backtest_cascade(
    event: &Event,
    event_date: NaiveDate,
    graph: &CausalGraph,
    config: &CascadeConfig,
    source: &dyn OutcomeSource,
) -> BacktestResult {
    backtest_with_rng(
        event,
        event_date,
        graph,
        &config.propagation,
        &config.validation,
        source,
        &mut rand::thread_rng(),
    )
}

fn backtest_with_rng<R: Rng + ?Sized>(
    event: &Event,
    event_date: NaiveDate,
    graph: &CausalGraph,
    propagation: &PropagationConfig,
    validation: &ValidationConfig,
    source: &dyn OutcomeSource,
    rng: &mut R,
) -> BacktestResult {
    let cascade = propagate_with_rng(event, graph, propagation, rng);
    let predictions: Vec<PredictionRecord> =
        cascade.effects.iter().map(PredictionRecord::from).collect();

    let entities: Vec<String> = predictions
        .iter()
        .map(|p| p.entity.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let actuals = if entities.is_empty() {
        Vec::new()
    } else {
        source
            .actuals(event, event_date, &entities)
            .unwrap_or_else(|err| {
                events::actuals_unavailable(&event.entity, &err.to_string());
                Vec::new()
            })
    };

    let metrics = calculate_accuracy_with_config(&predictions, &actuals, validation);
    BacktestResult {
        event: event.clone(),
        event_date,
        cascade,
        predictions,
        actuals,
        metrics,
    }
}

/// Backtest every event and aggregate over the pairs matched within each
/// event. A prediction is only ever scored against its own event's actuals.
///
/// With `config.simulation.seed` set, delay sampling is reproducible across
/// runs of the same suite.
pub fn run_backtest_suite(
    graph: &CausalGraph,
    historical: &[HistoricalEvent],
    config: &CascadeConfig,
    source: &dyn OutcomeSource,
) -> BacktestSuite {
    let mut rng = match config.simulation.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let mut results = Vec::with_capacity(historical.len());
    for h in historical {
        tracing::debug!(
            event = %h.event,
            date = %h.event_date,
            "backtesting historical event"
        );
        results.push(backtest_with_rng(
            &h.event,
            h.event_date,
            graph,
            &config.propagation,
            &config.validation,
            source,
            &mut rng,
        ));
    }

    let num_bins = config.validation.calibration_bins;
    let pairs: Vec<MatchedPair<'_>> = results
        .iter()
        .flat_map(|r| match_records(&r.predictions, &r.actuals))
        .collect();
    let aggregate_metrics = accuracy_from_pairs(&pairs, num_bins);
    let mut metrics_by_order = metrics_by_order_from_pairs(&pairs, num_bins);
    let calibration = calibration_from_pairs(&pairs, num_bins);

    for pred in results.iter().flat_map(|r| &r.predictions) {
        metrics_by_order.entry(pred.order).or_default();
    }

    let num_predictions = results.iter().map(|r| r.predictions.len()).sum();
    events::backtest_completed(
        results.len(),
        num_predictions,
        aggregate_metrics.direction_accuracy,
    );

    BacktestSuite {
        id: Uuid::new_v4(),
        created_at: Utc::now(),
        results,
        aggregate_metrics,
        metrics_by_order,
        calibration,
    }
}

/// Relative improvement of cascade predictions over a baseline, in percent.
/// Positive is better for every field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BaselineComparison {
    pub direction_accuracy_improvement: f64,
    pub magnitude_mae_improvement: f64,
    pub calibration_improvement: f64,
}

fn improvement(cascade: f64, baseline: f64, higher_is_better: bool) -> f64 {
    if baseline == 0.0 {
        return 0.0;
    }
    let diff = if higher_is_better {
        cascade - baseline
    } else {
        baseline - cascade
    };
    diff / baseline.abs() * 100.0
}

pub fn compare_to_baseline(
    cascade: &AccuracyMetrics,
    baseline: &AccuracyMetrics,
) -> BaselineComparison {
    BaselineComparison {
        direction_accuracy_improvement: improvement(
            cascade.direction_accuracy,
            baseline.direction_accuracy,
            true,
        ),
        magnitude_mae_improvement: improvement(cascade.magnitude_mae, baseline.magnitude_mae, false),
        calibration_improvement: improvement(
            cascade.calibration_error,
            baseline.calibration_error,
            false,
        ),
    }
}
