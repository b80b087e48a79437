use crate::error::ScoreError;
use crate::scoring::types::{
    CategoryComposite, CategoryMetrics, CategoryWeights, EsgComposites, EsgMetrics, EsgScores,
    WeightTable,
};
use crate::scoring::utility::{mean, round_half_up, round_to};
use std::collections::BTreeMap;

/// Scores and weights collected for one weighted average.
#[derive(Default)]
struct Accumulator {
    entries: Vec<(u8, f64)>,
    degraded: bool,
}

impl Accumulator {
    fn add(&mut self, score: u8, weight: f64, degraded: bool) {
        self.entries.push((score, weight));
        if degraded && weight > 0.0 {
            self.degraded = true;
        }
    }

    fn finish(self) -> CategoryComposite {
        let largest = self.entries.iter().map(|&(_, w)| w).fold(0.0, f64::max);
        if largest <= 0.0 {
            return CategoryComposite::default();
        }

        // Weights are scaled by the largest so the sums stay finite.
        let (mut weighted_total, mut weight_sum) = (0.0, 0.0);
        for (score, weight) in self.entries {
            let weight = weight / largest;
            weighted_total += f64::from(score) * weight;
            weight_sum += weight;
        }

        CategoryComposite {
            score: round_half_up(weighted_total / weight_sum).clamp(0.0, 100.0) as u8,
            contributed: true,
            degraded: self.degraded,
        }
    }
}

/// Rejects negative or non-finite weights.
pub fn validate_weights(weights: &CategoryWeights) -> Result<(), ScoreError> {
    for (metric, &weight) in weights {
        if !weight.is_finite() {
            return Err(ScoreError::NonFiniteWeight {
                metric: metric.clone(),
            });
        }
        if weight < 0.0 {
            return Err(ScoreError::NegativeWeight {
                metric: metric.clone(),
                weight,
            });
        }
    }
    Ok(())
}

/// Weighted average of the scores whose name appears in both maps.
///
/// Keys present in only one map are ignored. Returns 0 when nothing carries
/// weight.
pub fn weighted_average(
    values: &BTreeMap<String, u8>,
    weights: &CategoryWeights,
) -> Result<u8, ScoreError> {
    validate_weights(weights)?;

    let mut acc = Accumulator::default();
    for (name, &score) in values {
        if let Some(&weight) = weights.get(name) {
            acc.add(score, weight, false);
        }
    }
    Ok(acc.finish().score)
}

/// Same arithmetic as [`weighted_average`], keeping the data-quality flags.
pub fn category_composite(
    metrics: &CategoryMetrics,
    weights: &CategoryWeights,
) -> Result<CategoryComposite, ScoreError> {
    validate_weights(weights)?;

    let mut acc = Accumulator::default();
    for (name, normalized) in metrics {
        if let Some(&weight) = weights.get(name) {
            acc.add(normalized.score, weight, normalized.degraded);
        }
    }
    Ok(acc.finish())
}

/// Computes each category's composite independently.
pub fn aggregate_esg(
    normalized: &EsgMetrics,
    weights: &WeightTable,
) -> Result<EsgComposites, ScoreError> {
    normalized.try_map(|category, metrics| category_composite(metrics, weights.get(category)))
}

/// Fee between 0 (perfect average of 100) and 1 (average of 0), to 4 decimals.
pub fn calculate_esg_fee(scores: &EsgScores) -> f64 {
    let avg = unrounded_average(scores);
    round_to((100.0 - avg) / 100.0, 4)
}

/// Average of the three composites, rounded to an integer.
pub fn average_score(scores: &EsgScores) -> u8 {
    round_half_up(unrounded_average(scores)) as u8
}

fn unrounded_average(scores: &EsgScores) -> f64 {
    let values: Vec<f64> = scores.iter().map(|(_, s)| f64::from(*s)).collect();
    mean(&values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::types::{ByCategory, NormalizedScore};

    fn values(pairs: &[(&str, u8)]) -> BTreeMap<String, u8> {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    fn weights(pairs: &[(&str, f64)]) -> CategoryWeights {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    fn metrics(pairs: &[(&str, NormalizedScore)]) -> CategoryMetrics {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_weighted_average_equal_weights() {
        let result = weighted_average(
            &values(&[("co2", 40), ("ch4", 30)]),
            &weights(&[("co2", 1.0), ("ch4", 1.0)]),
        );
        assert_eq!(result, Ok(35));
    }

    #[test]
    fn test_weighted_average_uneven_weights() {
        let result = weighted_average(
            &values(&[("cpi", 67), ("gdp", 11), ("assets", 2)]),
            &weights(&[("cpi", 2.0), ("gdp", 1.0), ("assets", 1.0)]),
        );
        // (134 + 11 + 2) / 4 = 36.75
        assert_eq!(result, Ok(37));
    }

    #[test]
    fn test_weighted_average_ignores_unmatched_keys() {
        let only_a = weighted_average(&values(&[("a", 80)]), &weights(&[("a", 1.0)]));
        let with_extra = weighted_average(
            &values(&[("a", 80), ("b", 3)]),
            &weights(&[("a", 1.0), ("c", 5.0)]),
        );
        assert_eq!(only_a, Ok(80));
        assert_eq!(with_extra, Ok(80));
    }

    #[test]
    fn test_weighted_average_without_weights_is_zero() {
        assert_eq!(
            weighted_average(&values(&[("a", 80)]), &CategoryWeights::new()),
            Ok(0)
        );
        assert_eq!(
            weighted_average(&values(&[("a", 80)]), &weights(&[("a", 0.0)])),
            Ok(0)
        );
        assert_eq!(
            weighted_average(&BTreeMap::new(), &weights(&[("a", 1.0)])),
            Ok(0)
        );
    }

    #[test]
    fn test_negative_weight_is_rejected() {
        let result = weighted_average(&values(&[("a", 80)]), &weights(&[("a", -1.0)]));
        assert_eq!(
            result,
            Err(ScoreError::NegativeWeight {
                metric: "a".into(),
                weight: -1.0
            })
        );
    }

    #[test]
    fn test_nan_weight_is_rejected() {
        let result = weighted_average(&values(&[("a", 80)]), &weights(&[("a", f64::NAN)]));
        assert!(matches!(result, Err(ScoreError::NonFiniteWeight { .. })));
    }

    #[test]
    fn test_huge_weights_stay_in_range() {
        let single = weighted_average(&values(&[("a", 100)]), &weights(&[("a", 1.7e308)]));
        assert_eq!(single, Ok(100));

        let pair = weighted_average(
            &values(&[("a", 50), ("b", 50)]),
            &weights(&[("a", 1e308), ("b", 1e308)]),
        );
        assert_eq!(pair, Ok(50));

        let mixed = weighted_average(
            &values(&[("a", 100), ("b", 0), ("c", 40)]),
            &weights(&[("a", f64::MAX), ("b", f64::MAX), ("c", 1.0)]),
        );
        assert_eq!(mixed, Ok(50));

        let scores = ByCategory {
            environmental: single.unwrap(),
            social: 100,
            governance: 100,
        };
        assert_eq!(calculate_esg_fee(&scores), 0.0);
    }

    #[test]
    fn test_composite_distinguishes_zero_score_from_no_data() {
        let scored_zero = category_composite(
            &metrics(&[("co2", NormalizedScore::live(0))]),
            &weights(&[("co2", 1.0)]),
        )
        .unwrap();
        let no_data = category_composite(&CategoryMetrics::new(), &weights(&[("co2", 1.0)])).unwrap();

        assert_eq!(scored_zero.score, 0);
        assert!(scored_zero.contributed);
        assert_eq!(no_data.score, 0);
        assert!(!no_data.contributed);
    }

    #[test]
    fn test_composite_flags_degraded_inputs() {
        let composite = category_composite(
            &metrics(&[
                ("education", NormalizedScore::live(70)),
                ("health", NormalizedScore::fallback(75)),
            ]),
            &weights(&[("education", 1.0), ("health", 1.0)]),
        )
        .unwrap();
        assert_eq!(composite.score, 73);
        assert!(composite.degraded);

        // A zero-weighted fallback does not taint the composite.
        let composite = category_composite(
            &metrics(&[
                ("education", NormalizedScore::live(70)),
                ("health", NormalizedScore::fallback(75)),
            ]),
            &weights(&[("education", 1.0), ("health", 0.0)]),
        )
        .unwrap();
        assert_eq!(composite.score, 70);
        assert!(!composite.degraded);
    }

    #[test]
    fn test_aggregate_esg_with_empty_categories() {
        let normalized = EsgMetrics {
            environmental: metrics(&[("co2", NormalizedScore::live(40))]),
            ..Default::default()
        };
        let table = WeightTable {
            environmental: weights(&[("co2", 1.0)]),
            ..Default::default()
        };

        let composites = aggregate_esg(&normalized, &table).unwrap();
        assert_eq!(
            composites.scores(),
            ByCategory {
                environmental: 40,
                social: 0,
                governance: 0
            }
        );
        assert!(composites.environmental.contributed);
        assert!(!composites.social.contributed);
    }

    #[test]
    fn test_aggregate_esg_propagates_bad_weight() {
        let normalized = EsgMetrics {
            governance: metrics(&[("gdp", NormalizedScore::live(11))]),
            ..Default::default()
        };
        let table = WeightTable {
            governance: weights(&[("gdp", -2.0)]),
            ..Default::default()
        };
        assert!(aggregate_esg(&normalized, &table).is_err());
    }

    #[test]
    fn test_fee_for_single_category() {
        let scores = EsgScores {
            environmental: 40,
            social: 0,
            governance: 0,
        };
        assert_eq!(calculate_esg_fee(&scores), 0.8667);
        assert_eq!(average_score(&scores), 13);
    }

    #[test]
    fn test_fee_extremes() {
        let perfect = EsgScores {
            environmental: 100,
            social: 100,
            governance: 100,
        };
        assert_eq!(calculate_esg_fee(&perfect), 0.0);
        assert_eq!(calculate_esg_fee(&EsgScores::default()), 1.0);
    }

    #[test]
    fn test_fee_bounds() {
        for e in (0..=100).step_by(7) {
            for s in (0..=100).step_by(11) {
                for g in (0..=100).step_by(13) {
                    let fee = calculate_esg_fee(&EsgScores {
                        environmental: e,
                        social: s,
                        governance: g,
                    });
                    assert!((0.0..=1.0).contains(&fee), "{e} {s} {g} -> {fee}");
                }
            }
        }
    }

    #[test]
    fn test_aggregation_is_idempotent() {
        let normalized = EsgMetrics {
            environmental: metrics(&[
                ("co2", NormalizedScore::live(40)),
                ("ch4", NormalizedScore::fallback(20)),
            ]),
            social: metrics(&[("education", NormalizedScore::live(70))]),
            governance: metrics(&[("cpi", NormalizedScore::live(67))]),
        };
        let table = WeightTable {
            environmental: weights(&[("co2", 1.0), ("ch4", 0.5)]),
            social: weights(&[("education", 1.0)]),
            governance: weights(&[("cpi", 1.0)]),
        };

        let first = aggregate_esg(&normalized, &table).unwrap();
        let second = aggregate_esg(&normalized, &table).unwrap();
        assert_eq!(first, second);
        assert_eq!(
            calculate_esg_fee(&first.scores()).to_bits(),
            calculate_esg_fee(&second.scores()).to_bits()
        );
    }
}
