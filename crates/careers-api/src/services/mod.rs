//! Business logic services.

pub mod aggregation;

pub use aggregation::{Aggregated, AggregationError, ApplicationAggregator, DanglingPolicy};
