//! The scoring policy: composition of extraction, validation, evaluation,
//! and the language-diversity bonus.
//!
//! Every path through [`Scorer::score`] terminates in a number. The caller
//! is a tight training loop that cannot tolerate a panic or an error
//! interrupting batch scoring, so all faults are folded into the score.

use rand::Rng;

use crate::equation::{evaluate, validate_numbers};
use crate::extract::{extract_answer, extract_thought};
use crate::langdiv::{diversity_bonus, LanguageDetector, WhatlangDetector};
use crate::model::{GroundTruth, ScoreConfig};
use crate::results::{Outcome, ScoreBreakdown};

/// Absolute tolerance when comparing the evaluated result to the target.
pub const TARGET_TOLERANCE: f64 = 1e-5;

// ---------------------------------------------------------------------------
// Diagnostic sampling
// ---------------------------------------------------------------------------

/// Decides whether a given scoring call logs its intermediate state.
///
/// A pure side channel: the decision never affects the returned score.
pub trait DiagnosticSampler: Send + Sync {
    fn should_log(&self) -> bool;
}

/// Logs roughly one call in `period`.
#[derive(Debug, Clone, Copy)]
pub struct RandomSampler {
    period: u32,
}

impl RandomSampler {
    pub fn new(period: u32) -> Self {
        Self {
            period: period.max(1),
        }
    }
}

impl Default for RandomSampler {
    fn default() -> Self {
        Self::new(64)
    }
}

impl DiagnosticSampler for RandomSampler {
    fn should_log(&self) -> bool {
        rand::thread_rng().gen_ratio(1, self.period)
    }
}

/// Never logs.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSampler;

impl DiagnosticSampler for NoopSampler {
    fn should_log(&self) -> bool {
        false
    }
}

// ---------------------------------------------------------------------------
// Scorer
// ---------------------------------------------------------------------------

/// The reward scorer.
///
/// Stateless per call and `Sync`, so one instance can score an unbounded
/// number of samples in parallel.
pub struct Scorer {
    config: ScoreConfig,
    detector: Box<dyn LanguageDetector>,
    sampler: Box<dyn DiagnosticSampler>,
}

impl Default for Scorer {
    fn default() -> Self {
        Self::new(ScoreConfig::default())
    }
}

impl Scorer {
    pub fn new(config: ScoreConfig) -> Self {
        Self {
            config,
            detector: Box::new(WhatlangDetector),
            sampler: Box::new(RandomSampler::default()),
        }
    }

    /// Swap in a different language classifier.
    pub fn with_detector(mut self, detector: impl LanguageDetector + 'static) -> Self {
        self.detector = Box::new(detector);
        self
    }

    /// Swap in a different diagnostic sampler.
    pub fn with_sampler(mut self, sampler: impl DiagnosticSampler + 'static) -> Self {
        self.sampler = Box::new(sampler);
        self
    }

    pub fn config(&self) -> &ScoreConfig {
        &self.config
    }

    /// Score one transcript. See [`Scorer::score_detailed`] for the policy.
    pub fn score(&self, solution_text: &str, ground_truth: &GroundTruth) -> f64 {
        self.score_detailed(solution_text, ground_truth).total
    }

    /// Score one transcript and report how it was classified.
    ///
    /// Policy, in order:
    /// 1. no closed answer tag → 0, the diversity bonus is intentionally
    ///    dropped (reward effort only when a well-formed attempt exists);
    /// 2. wrong numbers → `format_score + langdiv`;
    /// 3. evaluation fault → `format_score + langdiv`;
    /// 4. result within [`TARGET_TOLERANCE`] of the target →
    ///    `full_score + langdiv`, otherwise `format_score + langdiv`.
    pub fn score_detailed(&self, solution_text: &str, ground_truth: &GroundTruth) -> ScoreBreakdown {
        let do_log = self.sampler.should_log();

        let thought = extract_thought(solution_text);
        let answer = extract_answer(solution_text);

        if do_log {
            tracing::debug!(
                "scoring sample: target={} numbers={:?} equation={:?}",
                ground_truth.target,
                ground_truth.numbers,
                answer
            );
        }

        let Some(equation) = answer else {
            if do_log {
                tracing::debug!("no answer tag found");
            }
            return self.breakdown(Outcome::NoAnswer, 0.0);
        };

        let langdiv = diversity_bonus(thought.as_deref(), self.detector.as_ref());

        if !validate_numbers(&equation, &ground_truth.numbers) {
            if do_log {
                tracing::debug!("equation {equation:?} does not use exactly the allowed numbers");
            }
            return self.breakdown(Outcome::InvalidNumbers, langdiv);
        }

        match evaluate(&equation) {
            Ok(result) if (result - ground_truth.target).abs() < TARGET_TOLERANCE => {
                if do_log {
                    tracing::debug!("correct: {equation} = {result}");
                }
                self.breakdown(Outcome::Correct, langdiv)
            }
            Ok(result) => {
                if do_log {
                    tracing::debug!(
                        "wrong result: {equation} = {result}, target {}",
                        ground_truth.target
                    );
                }
                self.breakdown(Outcome::WrongResult, langdiv)
            }
            Err(err) if err.is_gate_rejection() => {
                if do_log {
                    tracing::debug!("equation rejected by character gate: {err}");
                }
                self.breakdown(Outcome::EvaluationFailed, langdiv)
            }
            Err(err) => {
                if do_log {
                    tracing::debug!("equation failed to evaluate: {err}");
                }
                self.breakdown(Outcome::EvaluationFailed, langdiv)
            }
        }
    }

    /// Score a batch of `(transcript, ground_truth)` samples in order.
    pub fn score_batch<'a>(
        &self,
        samples: impl IntoIterator<Item = (&'a str, &'a GroundTruth)>,
    ) -> Vec<f64> {
        samples
            .into_iter()
            .map(|(text, gt)| self.score(text, gt))
            .collect()
    }

    fn breakdown(&self, outcome: Outcome, langdiv: f64) -> ScoreBreakdown {
        let base = match outcome {
            Outcome::NoAnswer => 0.0,
            Outcome::Correct => self.config.full_score,
            Outcome::InvalidNumbers | Outcome::EvaluationFailed | Outcome::WrongResult => {
                self.config.format_score
            }
        };
        ScoreBreakdown {
            total: base + langdiv,
            base,
            langdiv,
            outcome,
        }
    }
}

/// Score a single transcript with the default policy.
///
/// Convenience entry point for harnesses that do not configure the scorer:
/// `format_score` 0.1, `full_score` 1.0, `whatlang` detection, and 1-in-64
/// diagnostic sampling.
pub fn compute_score(solution_text: &str, ground_truth: &GroundTruth) -> f64 {
    Scorer::default().score(solution_text, ground_truth)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Labels lines by `xxx:` prefix; anything else is a detection fault.
    struct PrefixDetector;

    impl LanguageDetector for PrefixDetector {
        fn detect_line(&self, line: &str) -> Option<String> {
            let (code, _) = line.split_once(':')?;
            (code.len() == 3).then(|| code.to_string())
        }
    }

    fn scorer() -> Scorer {
        Scorer::default()
            .with_detector(PrefixDetector)
            .with_sampler(NoopSampler)
    }

    fn gt() -> GroundTruth {
        GroundTruth::new(8.0, vec![3, 5])
    }

    #[test]
    fn missing_answer_scores_zero_and_drops_langdiv() {
        // A multilingual thought earns nothing without a closed answer tag.
        let text = "Assistant:\neng: thinking <answer>3+5";
        let b = scorer().score_detailed(text, &gt());
        assert_eq!(b.outcome, Outcome::NoAnswer);
        assert_eq!(b.total, 0.0);
        assert_eq!(b.langdiv, 0.0);
    }

    #[test]
    fn correct_answer_scores_full() {
        let b = scorer().score_detailed("Assistant: <answer>3+5</answer>", &gt());
        assert_eq!(b.outcome, Outcome::Correct);
        assert!((b.total - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn wrong_numbers_score_format() {
        let b = scorer().score_detailed("Assistant: <answer>3*5</answer>", &GroundTruth::new(15.0, vec![3, 5, 2]));
        assert_eq!(b.outcome, Outcome::InvalidNumbers);
        assert!((b.total - 0.1).abs() < f64::EPSILON);
    }

    #[test]
    fn wrong_result_scores_format() {
        let b = scorer().score_detailed("Assistant: <answer>3*5</answer>", &GroundTruth::new(8.0, vec![3, 5]));
        assert_eq!(b.outcome, Outcome::WrongResult);
        assert!((b.total - 0.1).abs() < f64::EPSILON);
    }

    #[test]
    fn evaluation_fault_scores_format() {
        let b = scorer().score_detailed("Assistant: <answer>3+5/0</answer>", &GroundTruth::new(8.0, vec![3, 5, 0]));
        assert_eq!(b.outcome, Outcome::EvaluationFailed);
        assert!((b.total - 0.1).abs() < f64::EPSILON);
    }

    #[test]
    fn thought_is_confined_to_the_final_line() {
        // Reasoning on earlier lines is discarded by extraction, so a
        // multi-line multilingual trace earns no bonus through the policy.
        let text = "Assistant:\neng: add them\nfra: cela fait huit\neng: done <answer>3+5</answer>";
        let b = scorer().score_detailed(text, &gt());
        assert_eq!(b.outcome, Outcome::Correct);
        assert_eq!(b.langdiv, 0.0);
        assert!((b.total - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn single_line_thought_is_at_most_one_language() {
        let text = "Assistant: eng: three plus five is eight <answer>3+3</answer>";
        let b = scorer().score_detailed(text, &gt());
        assert_eq!(b.outcome, Outcome::InvalidNumbers);
        assert_eq!(b.langdiv, 0.0);
        assert!((b.total - 0.1).abs() < f64::EPSILON);
    }

    #[test]
    fn tolerance_boundaries() {
        let s = scorer();
        // 1e-6 off the target counts as correct, 1e-4 does not.
        let near = s.score_detailed("Assistant: <answer>3+5</answer>", &GroundTruth::new(8.000001, vec![3, 5]));
        assert_eq!(near.outcome, Outcome::Correct);

        let far = s.score_detailed("Assistant: <answer>3+5</answer>", &GroundTruth::new(8.0001, vec![3, 5]));
        assert_eq!(far.outcome, Outcome::WrongResult);
    }

    #[test]
    fn custom_policy_parameters() {
        let config = ScoreConfig {
            format_score: 0.25,
            full_score: 2.0,
            ..Default::default()
        };
        let s = Scorer::new(config)
            .with_detector(PrefixDetector)
            .with_sampler(NoopSampler);

        let correct = s.score("Assistant: <answer>3+5</answer>", &gt());
        assert!((correct - 2.0).abs() < f64::EPSILON);

        let wrong = s.score("Assistant: <answer>3-5</answer>", &gt());
        assert!((wrong - 0.25).abs() < f64::EPSILON);
    }

    #[test]
    fn idempotent_for_identical_inputs() {
        let s = scorer();
        let text = "Assistant:\neng: sum <answer>3+5</answer>";
        assert_eq!(s.score(text, &gt()), s.score(text, &gt()));
    }

    #[test]
    fn batch_scoring_preserves_order() {
        let s = scorer();
        let truths = [gt(), GroundTruth::new(15.0, vec![3, 5])];
        let samples = [
            ("no marker at all", &truths[0]),
            ("Assistant: <answer>3*5</answer>", &truths[1]),
        ];
        let scores = s.score_batch(samples);
        assert_eq!(scores.len(), 2);
        assert_eq!(scores[0], 0.0);
        assert!((scores[1] - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn sampler_never_affects_the_score() {
        struct AlwaysSampler;
        impl DiagnosticSampler for AlwaysSampler {
            fn should_log(&self) -> bool {
                true
            }
        }

        let quiet = scorer();
        let noisy = Scorer::default()
            .with_detector(PrefixDetector)
            .with_sampler(AlwaysSampler);
        let text = "Assistant: <answer>3+5</answer>";
        assert_eq!(quiet.score(text, &gt()), noisy.score(text, &gt()));
    }

    #[test]
    fn random_sampler_period_is_clamped() {
        // A zero period must not panic the ratio draw.
        let sampler = RandomSampler::new(0);
        let _ = sampler.should_log();
    }
}
