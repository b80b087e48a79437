//! Data types shared by the normalizer and the aggregator.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// One of the three top-level ESG dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Environmental,
    Social,
    Governance,
}

impl Category {
    pub const ALL: [Category; 3] = [
        Category::Environmental,
        Category::Social,
        Category::Governance,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Environmental => "environmental",
            Category::Social => "social",
            Category::Governance => "governance",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One value per category.
///
/// A category missing from serialized input deserializes to `T::default()`,
/// so an absent `"social"` key in a weights file is an empty mapping.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ByCategory<T> {
    pub environmental: T,
    pub social: T,
    pub governance: T,
}

impl<T> ByCategory<T> {
    pub fn get(&self, category: Category) -> &T {
        match category {
            Category::Environmental => &self.environmental,
            Category::Social => &self.social,
            Category::Governance => &self.governance,
        }
    }

    pub fn get_mut(&mut self, category: Category) -> &mut T {
        match category {
            Category::Environmental => &mut self.environmental,
            Category::Social => &mut self.social,
            Category::Governance => &mut self.governance,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Category, &T)> {
        Category::ALL.into_iter().map(move |c| (c, self.get(c)))
    }

    pub fn map<U>(&self, mut f: impl FnMut(Category, &T) -> U) -> ByCategory<U> {
        ByCategory {
            environmental: f(Category::Environmental, &self.environmental),
            social: f(Category::Social, &self.social),
            governance: f(Category::Governance, &self.governance),
        }
    }

    /// Like [`ByCategory::map`], stopping at the first error.
    pub fn try_map<U, E>(
        &self,
        mut f: impl FnMut(Category, &T) -> Result<U, E>,
    ) -> Result<ByCategory<U>, E> {
        Ok(ByCategory {
            environmental: f(Category::Environmental, &self.environmental)?,
            social: f(Category::Social, &self.social)?,
            governance: f(Category::Governance, &self.governance)?,
        })
    }
}

/// Expected domain of a raw metric and whether larger raw values are worse.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricRange {
    pub min: f64,
    pub max: f64,
    #[serde(default)]
    pub invert: bool,
}

impl MetricRange {
    pub const fn new(min: f64, max: f64, invert: bool) -> Self {
        Self { min, max, invert }
    }
}

/// A 0–100 score for one metric.
///
/// `degraded` marks scores computed from a provider fallback value rather
/// than a live reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedScore {
    pub score: u8,
    #[serde(default)]
    pub degraded: bool,
}

impl NormalizedScore {
    pub fn live(score: u8) -> Self {
        Self {
            score,
            degraded: false,
        }
    }

    pub fn fallback(score: u8) -> Self {
        Self {
            score,
            degraded: true,
        }
    }
}

/// Metric name to normalized score, for one category.
pub type CategoryMetrics = BTreeMap<String, NormalizedScore>;

/// Metric name to non-negative weight, for one category.
pub type CategoryWeights = BTreeMap<String, f64>;

/// Normalized metrics for all three categories.
pub type EsgMetrics = ByCategory<CategoryMetrics>;

/// Static weight configuration, same shape as [`EsgMetrics`].
pub type WeightTable = ByCategory<CategoryWeights>;

/// Metric ranges, same shape as [`EsgMetrics`].
pub type RangeTable = ByCategory<BTreeMap<String, MetricRange>>;

/// Weighted composite for one category.
///
/// `contributed` is false when no metric carried positive weight, which is
/// the only way a composite of 0 can mean "no data" rather than "scored 0".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CategoryComposite {
    pub score: u8,
    pub contributed: bool,
    pub degraded: bool,
}

/// The three category composite scores.
pub type EsgScores = ByCategory<u8>;

/// The three category composites with their data-quality flags.
pub type EsgComposites = ByCategory<CategoryComposite>;

impl EsgComposites {
    pub fn scores(&self) -> EsgScores {
        self.map(|_, c| c.score)
    }

    /// Returns `true` if any category was computed from fallback data.
    pub fn any_degraded(&self) -> bool {
        self.iter().any(|(_, c)| c.degraded)
    }
}
