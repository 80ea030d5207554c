use super::Attempt;

/// Aggregate statistics derived from an ordered list of [`Attempts`](Attempt)
///
/// Values are computed from scratch on every call; there is no incremental
/// variant. Stored records across service versions must agree numerically,
/// so the rounding behaviour (half-up to two decimals) is part of the
/// contract of this type.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressMetrics {
    /// Number of attempts
    pub total_attempts: i64,

    /// Score of the most recent attempt
    pub last_score: Option<i64>,

    /// Highest score across all attempts
    pub best_score: Option<i64>,

    /// Mean score, rounded to two decimals
    pub average_score: Option<f64>,

    /// Relative score change from the first to the most recent attempt in percent
    ///
    /// `None` when there are no attempts or the first attempt scored zero,
    /// since no meaningful ratio exists in either case. A computed change of
    /// zero is reported as `0`, not as `None`; "no improvement" and "no
    /// data" are different answers.
    pub improvement_percentage: Option<f64>,
}

impl ProgressMetrics {
    /// Computes the statistics for the given attempt history
    pub fn compute(attempts: &[Attempt]) -> Self {
        let (first, last) = match (attempts.first(), attempts.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Self::empty(),
        };

        let total_attempts = attempts.len() as i64;
        let best_score = attempts.iter().map(|attempt| attempt.score).max();
        let score_sum: i64 = attempts.iter().map(|attempt| attempt.score).sum();
        let average_score = round_to_two(score_sum as f64 / total_attempts as f64);

        let improvement_percentage = if first.score == 0 {
            None
        } else {
            let change = (last.score - first.score) as f64 / first.score as f64 * 100.0;
            Some(round_to_two(change))
        };

        Self {
            total_attempts,
            last_score: Some(last.score),
            best_score,
            average_score: Some(average_score),
            improvement_percentage,
        }
    }

    fn empty() -> Self {
        Self {
            total_attempts: 0,
            last_score: None,
            best_score: None,
            average_score: None,
            improvement_percentage: None,
        }
    }
}

/// Rounds half-up (away from zero) to two decimal places
fn round_to_two(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod does {
    use super::*;

    fn attempts(scores: &[i64]) -> Vec<Attempt> {
        scores
            .iter()
            .enumerate()
            .map(|(index, &score)| Attempt {
                quiz_id: 7,
                score,
                timestamp: format!("t{}", index),
            })
            .collect()
    }

    #[test]
    fn report_no_data_for_an_empty_history() {
        let metrics = ProgressMetrics::compute(&[]);

        assert_eq!(metrics.total_attempts, 0);
        assert_eq!(metrics.last_score, None);
        assert_eq!(metrics.best_score, None);
        assert_eq!(metrics.average_score, None);
        assert_eq!(metrics.improvement_percentage, None);
    }

    #[test]
    fn count_every_attempt() {
        for length in 1..=8 {
            let history = attempts(&vec![2; length]);
            assert_eq!(ProgressMetrics::compute(&history).total_attempts, length as i64);
        }
    }

    #[test]
    fn track_best_and_last_scores() {
        let metrics = ProgressMetrics::compute(&attempts(&[4, 9, 2]));

        assert_eq!(metrics.best_score, Some(9));
        assert_eq!(metrics.last_score, Some(2));
    }

    #[test]
    fn round_the_average_half_up() {
        // 9/8 = 1.125, which banker's rounding would flatten to 1.12
        let metrics = ProgressMetrics::compute(&attempts(&[1, 1, 1, 1, 1, 1, 1, 2]));
        assert_eq!(metrics.average_score, Some(1.13));
    }

    #[test]
    fn compute_the_average_of_a_single_attempt() {
        let metrics = ProgressMetrics::compute(&attempts(&[3]));
        assert_eq!(metrics.average_score, Some(3.0));
    }

    #[test]
    fn use_the_null_sentinel_when_the_first_score_is_zero() {
        let metrics = ProgressMetrics::compute(&attempts(&[0, 5, 9]));
        assert_eq!(metrics.improvement_percentage, None);
    }

    #[test]
    fn keep_zero_improvement_as_a_number() {
        let metrics = ProgressMetrics::compute(&attempts(&[3, 5, 3]));
        assert_eq!(metrics.improvement_percentage, Some(0.0));
    }

    #[test]
    fn compute_improvement_relative_to_the_first_attempt() {
        let metrics = ProgressMetrics::compute(&attempts(&[3, 4, 9]));
        assert_eq!(metrics.improvement_percentage, Some(200.0));
    }

    #[test]
    fn round_a_negative_improvement_away_from_zero() {
        // (3 - 9) / 9 * 100 = -66.666...
        let metrics = ProgressMetrics::compute(&attempts(&[9, 3]));
        assert_eq!(metrics.improvement_percentage, Some(-66.67));
    }
}
