//! Voice transcript phrase detection.
//!
//! Speech-to-text output is noisy: the recogniser inserts commas, full stops
//! and line breaks between words. A command is the word `light` followed by
//! `on` or `off`, with any mix of whitespace and `.,;!?` between them, and
//! the command word must be followed by whitespace (possibly after more
//! punctuation) so that a half-written word is never acted upon.

use crate::intent::Intent;

const PUNCTUATION: &[char] = &['.', ',', ';', '!', '?'];

/// Find the first voice command in `text`. `light on` wins over `light off`
/// when both appear.
#[must_use]
pub fn detect_intent(text: &str) -> Option<Intent> {
    let lowered: Vec<char> = text.to_lowercase().chars().collect();
    if contains_command(&lowered, "on") {
        Some(Intent::On)
    } else if contains_command(&lowered, "off") {
        Some(Intent::Off)
    } else {
        None
    }
}

fn contains_command(text: &[char], word: &str) -> bool {
    let light: Vec<char> = "light".chars().collect();
    let word: Vec<char> = word.chars().collect();

    (0..text.len())
        .filter(|&start| text[start..].starts_with(&light))
        .any(|start| {
            let mut pos = start + light.len();
            pos = skip(text, pos, |c| c.is_whitespace());
            pos = skip(text, pos, |c| PUNCTUATION.contains(&c));
            pos = skip(text, pos, |c| c.is_whitespace());
            if !text[pos..].starts_with(&word) {
                return false;
            }
            is_terminated(text, pos + word.len())
        })
}

fn skip(text: &[char], mut pos: usize, pred: impl Fn(char) -> bool) -> usize {
    while pos < text.len() && pred(text[pos]) {
        pos += 1;
    }
    pos
}

/// Whitespace, or punctuation followed by whitespace, must come after the word.
fn is_terminated(text: &[char], pos: usize) -> bool {
    let after_space = skip(text, pos, |c| c.is_whitespace());
    if after_space > pos {
        return true;
    }
    let after_punct = skip(text, pos, |c| PUNCTUATION.contains(&c));
    after_punct > pos && text.get(after_punct).is_some_and(|c| c.is_whitespace())
}
