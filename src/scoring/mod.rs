//! Normalization and aggregation engine.
//!
//! Raw provider readings are rescaled onto 0–100 by [`normalize`], combined
//! per category by [`aggregate_esg`], and turned into a fee by
//! [`calculate_esg_fee`]. Everything here is pure: no I/O, no shared state.

pub mod aggregate;
pub mod normalize;
pub mod types;
pub mod utility;

pub use aggregate::{
    aggregate_esg, average_score, calculate_esg_fee, category_composite, validate_weights,
    weighted_average,
};
pub use normalize::normalize;
pub use types::{
    ByCategory, Category, CategoryComposite, CategoryMetrics, CategoryWeights, EsgComposites,
    EsgMetrics, EsgScores, MetricRange, NormalizedScore, RangeTable, WeightTable,
};
