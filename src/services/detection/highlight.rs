// Sentence Highlighting
// Wraps high-probability sentences of the original text in `***` markers

use regex::Regex;
use tracing::warn;

use crate::models::SentenceScore;

use super::heuristic::HIGHLIGHT_THRESHOLD;

pub const HIGHLIGHT_MARKER: &str = "***";

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

// Anchor word-character ends so a flagged fragment never splits a longer word.
fn word_bounded(sentence: &str) -> String {
    let mut pattern = String::new();
    if sentence.chars().next().map_or(false, is_word_char) {
        pattern.push_str(r"\b");
    }
    pattern.push_str(&regex::escape(sentence));
    if sentence.chars().last().map_or(false, is_word_char) {
        pattern.push_str(r"\b");
    }
    pattern
}

/// Mark every occurrence of each flagged sentence in `original`.
///
/// Longer sentences claim their ranges first; an occurrence that overlaps an
/// already claimed range is skipped, so a short sentence never splits the
/// markers of a longer one. Sentences at or below the threshold never alter
/// the text.
pub fn highlight_matches(original: &str, sentences: &[SentenceScore]) -> String {
    let mut flagged: Vec<&str> = sentences
        .iter()
        .filter(|s| s.highlighted && s.ai_probability > HIGHLIGHT_THRESHOLD)
        .map(|s| s.text.trim())
        .filter(|t| !t.is_empty())
        .collect();

    if flagged.is_empty() {
        return original.to_string();
    }

    flagged.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()));
    flagged.dedup();

    let mut ranges: Vec<(usize, usize)> = Vec::new();
    for sentence in flagged {
        let re = match Regex::new(&word_bounded(sentence)) {
            Ok(re) => re,
            Err(e) => {
                warn!("[HIGHLIGHT] skipping sentence, pattern rejected: {}", e);
                continue;
            }
        };
        for m in re.find_iter(original) {
            let overlaps = ranges
                .iter()
                .any(|&(start, end)| m.start() < end && start < m.end());
            if !overlaps {
                ranges.push((m.start(), m.end()));
            }
        }
    }

    ranges.sort_unstable();

    let mut out = String::with_capacity(original.len() + ranges.len() * HIGHLIGHT_MARKER.len() * 2);
    let mut cursor = 0usize;
    for (start, end) in ranges {
        out.push_str(&original[cursor..start]);
        out.push_str(HIGHLIGHT_MARKER);
        out.push_str(&original[start..end]);
        out.push_str(HIGHLIGHT_MARKER);
        cursor = end;
    }
    out.push_str(&original[cursor..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scored(text: &str, prob: u32) -> SentenceScore {
        SentenceScore {
            text: text.to_string(),
            ai_probability: prob,
            patterns: vec![],
            highlighted: prob > HIGHLIGHT_THRESHOLD,
        }
    }

    #[test]
    fn test_no_flagged_sentences_is_identity() {
        let text = "One. Two. Three.";
        let sentences = vec![scored("One.", 80), scored("Two.", 10)];
        assert_eq!(highlight_matches(text, &sentences), text);
    }

    #[test]
    fn test_wraps_flagged_sentence() {
        let text = "Plain start. Thus it is so. Plain end.";
        let out = highlight_matches(text, &[scored("Thus it is so.", 90)]);
        assert_eq!(out, "Plain start. ***Thus it is so.*** Plain end.");
    }

    #[test]
    fn test_metacharacters_are_literal() {
        let text = "Is (a+b)*c = d? Yes.";
        let out = highlight_matches(text, &[scored("Is (a+b)*c = d?", 95)]);
        assert_eq!(out, "***Is (a+b)*c = d?*** Yes.");
    }

    #[test]
    fn test_longer_sentence_wins_over_substring() {
        let text = "it holds. Therefore it holds. End.";
        let sentences = vec![scored("it holds.", 90), scored("Therefore it holds.", 90)];
        let out = highlight_matches(text, &sentences);
        assert_eq!(out, "***it holds.*** ***Therefore it holds.*** End.");
    }

    #[test]
    fn test_fragment_does_not_split_words() {
        let out = highlight_matches("This is it.", &[scored("is", 95)]);
        assert_eq!(out, "This ***is*** it.");

        let out = highlight_matches("Therein lies it. Therein.", &[scored("Therein", 95)]);
        assert_eq!(out, "***Therein*** lies it. ***Therein***.");

        let out = highlight_matches("Bypass all of it.", &[scored("pass", 95)]);
        assert_eq!(out, "Bypass all of it.");
    }

    #[test]
    fn test_highlighted_flag_required() {
        let mut s = scored("Two.", 95);
        s.highlighted = false;
        assert_eq!(highlight_matches("One. Two.", &[s]), "One. Two.");
    }

    #[test]
    fn test_markers_removed_restore_original() {
        let text = "Alpha beta. Gamma delta. Alpha beta.";
        let out = highlight_matches(text, &[scored("Alpha beta.", 99)]);
        assert_eq!(out.matches(HIGHLIGHT_MARKER).count(), 4);
        assert_eq!(out.replace(HIGHLIGHT_MARKER, ""), text);
    }
}
