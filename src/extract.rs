//! Transcript extraction: turn-marker stripping and thought/answer isolation.
//!
//! A transcript contains a full conversation; the model's turn begins at a
//! turn marker and its final line is expected to carry the `<answer>` tag.
//! Both extractors return `None` on malformed input, never an error.

use std::sync::LazyLock;

use regex::Regex;

/// Turn-start markers, checked in order: the plain chat format first, then
/// the chat-template token.
const TURN_MARKERS: [&str; 2] = ["Assistant:", "<|im_start|>assistant"];

const ANSWER_OPEN: &str = "<answer>";

static ANSWER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<answer>(.*?)</answer>").unwrap());

/// Everything after the first recognized turn marker, or `None` if no
/// marker is present.
fn model_turn(transcript: &str) -> Option<&str> {
    TURN_MARKERS.iter().find_map(|marker| {
        transcript
            .find(marker)
            .map(|at| &transcript[at + marker.len()..])
    })
}

/// The final line of the model's turn, where the answer tag must live.
fn final_line(turn: &str) -> &str {
    match turn.rfind('\n') {
        Some(at) => &turn[at + 1..],
        None => turn,
    }
}

/// Extract the reasoning text preceding the answer tag.
///
/// Returns the text before the first `<answer>` on the final line of the
/// model's turn, or `None` if there is no marker or no opening tag.
pub fn extract_thought(transcript: &str) -> Option<String> {
    let line = final_line(model_turn(transcript)?);
    let at = line.find(ANSWER_OPEN)?;
    Some(line[..at].to_string())
}

/// Extract the equation from the last `<answer>...</answer>` pair.
///
/// Models sometimes self-correct and re-emit the tag; the last occurrence
/// on the final line is authoritative. The payload is trimmed.
pub fn extract_answer(transcript: &str) -> Option<String> {
    let line = final_line(model_turn(transcript)?);
    ANSWER_RE
        .captures_iter(line)
        .last()
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
}
