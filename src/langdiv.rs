//! Per-line natural-language detection and the diversity bonus.
//!
//! Reasoning traces that switch languages between lines earn an additive
//! bonus, saturating at seven distinct languages. Detection is best-effort:
//! a line the classifier cannot confidently label is skipped, never a fault
//! for the overall call.

use std::collections::HashSet;

/// Pluggable per-line natural-language classifier.
///
/// `None` means "no confident detection" and the line is silently skipped.
/// Implementations may be probabilistic on short or ambiguous lines, so
/// callers must not depend on exact labels — only on distinct counts.
pub trait LanguageDetector: Send + Sync {
    /// Detect the language of a single line, as an ISO 639-3 code.
    fn detect_line(&self, line: &str) -> Option<String>;
}

/// Default detector backed by `whatlang`.
///
/// Unreliable detections count as faults, mirroring classifiers that refuse
/// to guess on short or ambiguous input.
#[derive(Debug, Clone, Copy, Default)]
pub struct WhatlangDetector;

impl LanguageDetector for WhatlangDetector {
    fn detect_line(&self, line: &str) -> Option<String> {
        let info = whatlang::detect(line)?;
        if !info.is_reliable() {
            return None;
        }
        Some(info.lang().code().to_string())
    }
}

/// Map a distinct-language count to its bonus.
pub fn bonus_for_language_count(count: usize) -> f64 {
    match count {
        0 | 1 => 0.0,
        2 => 1.0,
        3 => 1.1,
        4 => 1.2,
        5 => 1.3,
        6 => 1.4,
        _ => 1.5,
    }
}

/// Diversity bonus for a reasoning trace.
///
/// Splits the thought into lines, detects each line's language, collapses
/// duplicates, and maps the distinct count through the bonus table. An
/// absent thought earns nothing.
pub fn diversity_bonus(thought: Option<&str>, detector: &dyn LanguageDetector) -> f64 {
    let Some(thought) = thought else {
        return 0.0;
    };

    let mut languages = HashSet::new();
    for line in thought.split('\n') {
        if let Some(code) = detector.detect_line(line) {
            languages.insert(code);
        }
    }

    bonus_for_language_count(languages.len())
}
