//! Core data model types for countdown-reward.
//!
//! These are the types the training harness hands across the boundary:
//! the puzzle instance being graded and the scoring policy parameters.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// A single countdown puzzle instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroundTruth {
    /// The value the equation must reach.
    pub target: f64,
    /// The numbers that must each be used exactly once.
    pub numbers: Vec<i64>,
}

impl GroundTruth {
    pub fn new(target: f64, numbers: Vec<i64>) -> Self {
        Self { target, numbers }
    }

    /// Parse a puzzle instance from JSON (the format the harness ships).
    pub fn from_json_str(content: &str) -> Result<Self> {
        serde_json::from_str(content).context("failed to parse ground truth JSON")
    }
}

/// Extraction method requested by the harness.
///
/// Only `strict` exists today. The parameter is kept so the call surface
/// stays compatible with harnesses that pass it explicitly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    #[default]
    Strict,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Strict => write!(f, "strict"),
        }
    }
}

impl FromStr for Method {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "strict" => Ok(Method::Strict),
            other => Err(format!("unknown method: {other}")),
        }
    }
}

/// Scoring policy parameters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ScoreConfig {
    /// Extraction method (accepted for interface compatibility).
    #[serde(default)]
    pub method: Method,
    /// Partial credit for a well-formed but invalid or wrong answer.
    #[serde(default = "default_format_score")]
    pub format_score: f64,
    /// Credit for an answer that evaluates to the target.
    #[serde(default = "default_full_score")]
    pub full_score: f64,
}

fn default_format_score() -> f64 {
    0.1
}

fn default_full_score() -> f64 {
    1.0
}

impl Default for ScoreConfig {
    fn default() -> Self {
        Self {
            method: Method::Strict,
            format_score: default_format_score(),
            full_score: default_full_score(),
        }
    }
}

impl ScoreConfig {
    /// Parse a config from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("failed to parse score config TOML")
    }

    /// Load a config from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read score config: {}", path.display()))?;
        Self::from_toml_str(&content)
    }

    /// Check the config for values that would distort the reward signal.
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.format_score >= self.full_score {
            warnings.push(format!(
                "format_score ({}) >= full_score ({}): wrong answers earn as much as correct ones",
                self.format_score, self.full_score
            ));
        }
        if self.format_score < 0.0 || self.full_score < 0.0 {
            warnings.push("negative score parameters invert the reward signal".into());
        }

        warnings
    }
}
