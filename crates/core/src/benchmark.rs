//! Value-added benchmarking against the team mean and maximum.

use serde::Serialize;

use crate::threshold_validation::ratio_or_zero;
use crate::types::EntityId;

// ---------------------------------------------------------------------------
// Tier thresholds
// ---------------------------------------------------------------------------

/// Ratio to the team maximum at or above which a collaborator is a top performer.
pub const TOP_PERFORMER_RATIO_TO_MAX: f64 = 0.9;

/// Ratio to the team mean at or above which a collaborator is above average.
pub const ABOVE_AVERAGE_RATIO_TO_MEAN: f64 = 1.2;

/// Ratio to the team mean at or above which a collaborator is in the average.
pub const IN_AVERAGE_RATIO_TO_MEAN: f64 = 0.8;

// ---------------------------------------------------------------------------
// Tier
// ---------------------------------------------------------------------------

/// Benchmark bucket, evaluated top-down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BenchmarkTier {
    TopPerformer,
    AboveAverage,
    InAverage,
    BelowAverage,
    NotEvaluated,
}

impl BenchmarkTier {
    pub fn label(self) -> &'static str {
        match self {
            Self::TopPerformer => "Top Performer",
            Self::AboveAverage => "Above average",
            Self::InAverage => "In average",
            Self::BelowAverage => "Below average",
            Self::NotEvaluated => "Not evaluated",
        }
    }

    /// Display color as `#RRGGBB`.
    pub fn color(self) -> &'static str {
        match self {
            Self::TopPerformer => "#7C3AED",
            Self::AboveAverage => "#16A34A",
            Self::InAverage => "#2563EB",
            Self::BelowAverage => "#EA580C",
            Self::NotEvaluated => "#9CA3AF",
        }
    }

    /// Classify a positive value against the team mean and max.
    fn classify(value: f64, stats: &TeamStats) -> Self {
        if value <= 0.0 || stats.mean <= 0.0 {
            return Self::NotEvaluated;
        }
        if ratio_or_zero(value, stats.max) >= TOP_PERFORMER_RATIO_TO_MAX {
            Self::TopPerformer
        } else {
            let to_mean = value / stats.mean;
            if to_mean >= ABOVE_AVERAGE_RATIO_TO_MEAN {
                Self::AboveAverage
            } else if to_mean >= IN_AVERAGE_RATIO_TO_MEAN {
                Self::InAverage
            } else {
                Self::BelowAverage
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// Mean and max over strictly positive value-added figures.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TeamStats {
    pub mean: f64,
    pub max: f64,
    pub evaluated_count: usize,
}

/// Benchmark result for one collaborator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BenchmarkScore {
    pub collaborator_id: EntityId,
    pub value_added: f64,
    pub tier: BenchmarkTier,
    pub label: &'static str,
    pub color: &'static str,
    /// `round(value / mean * 100)`, 0 when not evaluated.
    pub points: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BenchmarkReport {
    pub stats: TeamStats,
    pub scores: Vec<BenchmarkScore>,
}

// ---------------------------------------------------------------------------
// Scoring
// ---------------------------------------------------------------------------

/// Compute team statistics. Non-positive values are excluded.
pub fn team_stats(values: &[(EntityId, f64)]) -> TeamStats {
    let positive: Vec<f64> = values
        .iter()
        .map(|(_, v)| *v)
        .filter(|v| *v > 0.0)
        .collect();

    if positive.is_empty() {
        return TeamStats {
            mean: 0.0,
            max: 0.0,
            evaluated_count: 0,
        };
    }

    let sum: f64 = positive.iter().sum();
    TeamStats {
        mean: sum / positive.len() as f64,
        max: positive.iter().copied().fold(f64::MIN, f64::max),
        evaluated_count: positive.len(),
    }
}

/// Score one value against precomputed team statistics.
pub fn score(collaborator_id: EntityId, value_added: f64, stats: &TeamStats) -> BenchmarkScore {
    let tier = BenchmarkTier::classify(value_added, stats);
    let points = match tier {
        BenchmarkTier::NotEvaluated => 0,
        _ => (value_added / stats.mean * 100.0).round() as i64,
    };
    BenchmarkScore {
        collaborator_id,
        value_added,
        tier,
        label: tier.label(),
        color: tier.color(),
        points,
    }
}

/// Benchmark every collaborator, preserving input order.
pub fn benchmark_team(values: &[(EntityId, f64)]) -> BenchmarkReport {
    let stats = team_stats(values);
    let scores = values
        .iter()
        .map(|(id, value)| score(*id, *value, &stats))
        .collect();
    BenchmarkReport { stats, scores }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_exclude_non_positive_values() {
        let stats = team_stats(&[(1, 100.0), (2, 0.0), (3, 300.0), (4, -5.0)]);
        assert_eq!(stats.mean, 200.0);
        assert_eq!(stats.max, 300.0);
        assert_eq!(stats.evaluated_count, 2);
    }

    #[test]
    fn all_zero_team_is_not_evaluated() {
        let report = benchmark_team(&[(1, 0.0), (2, 0.0)]);
        assert_eq!(report.stats.mean, 0.0);
        for s in &report.scores {
            assert_eq!(s.tier, BenchmarkTier::NotEvaluated);
            assert_eq!(s.points, 0);
            assert_eq!(s.label, "Not evaluated");
        }
    }

    #[test]
    fn empty_team_produces_empty_report() {
        let report = benchmark_team(&[]);
        assert!(report.scores.is_empty());
        assert_eq!(report.stats.evaluated_count, 0);
    }

    #[test]
    fn zero_value_member_not_evaluated_among_positive_peers() {
        let report = benchmark_team(&[(1, 100.0), (2, 0.0)]);
        assert_eq!(report.scores[1].tier, BenchmarkTier::NotEvaluated);
        assert_eq!(report.scores[1].points, 0);
    }

    #[test]
    fn value_at_mean_scores_100_points() {
        // mean = 100, max = 150
        let report = benchmark_team(&[(1, 50.0), (2, 100.0), (3, 150.0)]);
        let at_mean = &report.scores[1];
        assert_eq!(at_mean.points, 100);
        assert_eq!(at_mean.tier, BenchmarkTier::InAverage);
    }

    #[test]
    fn tiers_evaluated_top_down() {
        // mean = 100, max = 200
        let stats = TeamStats {
            mean: 100.0,
            max: 200.0,
            evaluated_count: 4,
        };
        assert_eq!(score(1, 180.0, &stats).tier, BenchmarkTier::TopPerformer);
        assert_eq!(score(1, 179.0, &stats).tier, BenchmarkTier::AboveAverage);
        assert_eq!(score(1, 120.0, &stats).tier, BenchmarkTier::AboveAverage);
        assert_eq!(score(1, 119.0, &stats).tier, BenchmarkTier::InAverage);
        assert_eq!(score(1, 80.0, &stats).tier, BenchmarkTier::InAverage);
        assert_eq!(score(1, 79.0, &stats).tier, BenchmarkTier::BelowAverage);
    }

    #[test]
    fn top_performer_wins_even_below_mean_ratio() {
        // Single evaluated member is both mean and max.
        let report = benchmark_team(&[(1, 42.0)]);
        assert_eq!(report.scores[0].tier, BenchmarkTier::TopPerformer);
        assert_eq!(report.scores[0].points, 100);
    }

    #[test]
    fn points_are_rounded_relative_to_mean() {
        let stats = TeamStats {
            mean: 300.0,
            max: 1000.0,
            evaluated_count: 3,
        };
        assert_eq!(score(1, 100.0, &stats).points, 33);
        assert_eq!(score(1, 200.0, &stats).points, 67);
    }

    #[test]
    fn colors_are_distinct_hex() {
        let tiers = [
            BenchmarkTier::TopPerformer,
            BenchmarkTier::AboveAverage,
            BenchmarkTier::InAverage,
            BenchmarkTier::BelowAverage,
            BenchmarkTier::NotEvaluated,
        ];
        for (i, a) in tiers.iter().enumerate() {
            assert_eq!(a.color().len(), 7);
            assert!(a.color().starts_with('#'));
            for b in &tiers[i + 1..] {
                assert_ne!(a.color(), b.color());
            }
        }
    }
}
