//! Errors raised by outcome sources during backtests.

#[derive(Debug, thiserror::Error)]
pub enum OutcomeError {
    #[error("no recorded outcomes for {entity} on {date}")]
    NotRecorded { entity: String, date: String },

    #[error("outcome source failed for {entity}: {message}")]
    Source { entity: String, message: String },
}
