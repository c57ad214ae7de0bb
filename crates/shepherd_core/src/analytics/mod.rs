//! Pure attendance analytics: calendar, aggregation, categorization and
//! follow-up eligibility.
//!
//! # Responsibility
//! - Turn snapshots (schedule, records, settings) into derived values.
//! - Stay free of I/O, clocks and hidden state.
//!
//! # Invariants
//! - Same inputs always produce the same outputs.
//! - Follow-up eligibility is recomputed from statistics on every call and
//!   never persisted.

pub mod calendar;
pub mod category;
pub mod follow_up;
pub mod standing;
pub mod stats;
