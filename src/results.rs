//! Structured scoring results and batch-level statistics.

use serde::{Deserialize, Serialize};

/// How a scored transcript was classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// No turn marker or no closed `<answer>` tag was found.
    NoAnswer,
    /// The equation's numbers are not exactly the allowed multiset.
    InvalidNumbers,
    /// The equation failed the character gate or did not evaluate.
    EvaluationFailed,
    /// The equation evaluated but missed the target.
    WrongResult,
    /// The equation evaluated to the target.
    Correct,
}

/// Structured result of scoring one transcript.
///
/// `total` is what the harness feeds back as the reward; the remaining
/// fields exist for diagnostics and batch statistics.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    /// The reward: `base + langdiv`.
    pub total: f64,
    /// Format/correctness component.
    pub base: f64,
    /// Language-diversity bonus. Zero when no answer was found, even if a
    /// thought was present.
    pub langdiv: f64,
    /// Classification of this sample.
    pub outcome: Outcome,
}

/// Aggregate statistics over a batch of scored samples.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewardStats {
    /// Number of samples in the batch.
    pub samples: usize,
    /// Mean reward across the batch.
    pub mean_score: f64,
    /// Fraction of samples whose equation hit the target.
    pub solve_rate: f64,
    /// Fraction of samples that produced a closed answer tag at all.
    pub well_formed_rate: f64,
    /// Mean language-diversity bonus.
    pub mean_langdiv: f64,
}

impl RewardStats {
    /// Aggregate a batch of breakdowns. An empty batch yields all zeros.
    pub fn from_breakdowns(breakdowns: &[ScoreBreakdown]) -> Self {
        if breakdowns.is_empty() {
            return Self {
                samples: 0,
                mean_score: 0.0,
                solve_rate: 0.0,
                well_formed_rate: 0.0,
                mean_langdiv: 0.0,
            };
        }

        let n = breakdowns.len() as f64;
        let solved = breakdowns
            .iter()
            .filter(|b| b.outcome == Outcome::Correct)
            .count();
        let well_formed = breakdowns
            .iter()
            .filter(|b| b.outcome != Outcome::NoAnswer)
            .count();

        Self {
            samples: breakdowns.len(),
            mean_score: breakdowns.iter().map(|b| b.total).sum::<f64>() / n,
            solve_rate: solved as f64 / n,
            well_formed_rate: well_formed as f64 / n,
            mean_langdiv: breakdowns.iter().map(|b| b.langdiv).sum::<f64>() / n,
        }
    }
}
