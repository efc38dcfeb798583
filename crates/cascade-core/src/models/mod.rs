//! Boundary models exchanged with callers: the triggering event and the
//! observed outcomes supplied by outcome fetchers.

mod event;
mod outcome;

pub use event::Event;
pub use outcome::Outcome;
