//! # Sentence Tokenizer Seam
//!
//! Boundary reconstruction consumes any tokenizer that segments raw text
//! into sentences of [`Token`]s with spacing metadata. [`RuleTokenizer`] is
//! the shipped implementation, tuned for German CMC-style text (e-mails,
//! signature blocks, abbreviated dates); hosts with a heavier tokenizer can
//! plug it in behind the same trait.

use std::collections::HashSet;

use crate::types::Token;

/// Segments raw text into sentences of tokens with spacing metadata.
pub trait SentenceTokenizer: Send + Sync {
    /// Tokenizes `text` into an ordered list of sentences.
    fn tokenize(&self, text: &str) -> Vec<Vec<Token>>;
}

/// German abbreviations whose trailing period is part of the token and must
/// not end a sentence.
const ABBREVIATIONS: &[&str] = &[
    "Abs.", "Art.", "Dipl.", "Dr.", "Fa.", "Fr.", "Hr.", "Ing.", "Mio.",
    "Mrd.", "Nr.", "Prof.", "St.", "Str.", "Tel.", "bzgl.", "bzw.", "ca.",
    "d.h.", "evtl.", "geb.", "ggf.", "inkl.", "u.a.", "usw.", "z.B.", "z.T.",
];

/// Punctuation that clings to word edges and is split off as its own token.
fn is_clinging(c: char) -> bool {
    matches!(
        c,
        '.' | ','
            | ';'
            | ':'
            | '!'
            | '?'
            | '…'
            | '('
            | ')'
            | '['
            | ']'
            | '{'
            | '}'
            | '"'
            | '\''
            | '„'
            | '“'
            | '”'
            | '‚'
            | '‘'
            | '’'
            | '«'
            | '»'
    )
}

/// Rule-based sentence tokenizer.
///
/// Whitespace-delimited chunks are split into word and punctuation tokens;
/// e-mail addresses and URLs stay whole, dotted abbreviations keep their
/// period, and dotted dates keep a trailing sentence period attached (the
/// downstream DATE repair exists precisely because of this). Runs of `!` or
/// `?` separate even inside a chunk, which is what makes the tab placeholder
/// trick of boundary reconstruction work.
#[derive(Debug, Clone)]
pub struct RuleTokenizer {
    abbreviations: HashSet<&'static str>,
}

impl Default for RuleTokenizer {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleTokenizer {
    /// Creates a new tokenizer with the default abbreviation set.
    pub fn new() -> Self {
        Self {
            abbreviations: ABBREVIATIONS.iter().copied().collect(),
        }
    }

    /// Splits one whitespace-delimited chunk into tokens.
    fn split_chunk(&self, chunk: &str) -> Vec<String> {
        if is_protected(chunk) {
            return vec![chunk.to_string()];
        }

        let mut parts = Vec::new();
        for segment in split_bang_runs(chunk) {
            if segment.chars().all(|c| matches!(c, '!' | '?')) {
                parts.push(segment.to_string());
                continue;
            }
            self.split_segment(segment, &mut parts);
        }
        parts
    }

    /// Splits a segment free of `!`/`?` runs: leading punctuation, core,
    /// trailing punctuation.
    fn split_segment(&self, segment: &str, parts: &mut Vec<String>) {
        let mut rest = segment;

        // Leading clinging punctuation, runs of '.' grouped (ellipses).
        while let Some(c) = rest.chars().next() {
            if !is_clinging(c) {
                break;
            }
            let run = if c == '.' {
                rest.len() - rest.trim_start_matches('.').len()
            } else {
                c.len_utf8()
            };
            parts.push(rest[..run].to_string());
            rest = &rest[run..];
        }

        if rest.is_empty() {
            return;
        }
        if self.abbreviations.contains(rest) || is_dotted_number(rest) {
            parts.push(rest.to_string());
            return;
        }

        // Trailing clinging punctuation, collected back to front.
        let mut trailing: Vec<String> = Vec::new();
        loop {
            let Some(c) = rest.chars().next_back() else {
                break;
            };
            if !is_clinging(c) {
                break;
            }
            let run = if c == '.' {
                rest.len() - rest.trim_end_matches('.').len()
            } else {
                c.len_utf8()
            };
            trailing.push(rest[rest.len() - run..].to_string());
            rest = &rest[..rest.len() - run];
            if self.abbreviations.contains(rest) || is_dotted_number(rest) {
                break;
            }
        }

        if !rest.is_empty() {
            parts.push(rest.to_string());
        }
        parts.extend(trailing.into_iter().rev());
    }
}

impl SentenceTokenizer for RuleTokenizer {
    fn tokenize(&self, text: &str) -> Vec<Vec<Token>> {
        let ends_with_ws = text.chars().next_back().is_some_and(char::is_whitespace);
        let chunks: Vec<&str> = text.split_whitespace().collect();

        // Flat token stream with spacing metadata.
        let mut flat: Vec<(String, bool)> = Vec::new();
        for (ci, chunk) in chunks.iter().enumerate() {
            let parts = self.split_chunk(chunk);
            let n = parts.len();
            let chunk_spaced = ci + 1 < chunks.len() || ends_with_ws;
            for (pi, part) in parts.into_iter().enumerate() {
                flat.push((part, pi + 1 == n && chunk_spaced));
            }
        }

        // Sentence segmentation on terminal punctuation tokens.
        let mut sentences: Vec<Vec<Token>> = Vec::new();
        let mut current: Vec<Token> = Vec::new();
        for (text, space_after) in flat {
            let terminal = is_terminal(&text);
            current.push(Token::new(text, space_after, false));
            if terminal {
                if let Some(last) = current.last_mut() {
                    last.last_in_sentence = true;
                }
                sentences.push(std::mem::take(&mut current));
            }
        }
        if !current.is_empty() {
            if let Some(last) = current.last_mut() {
                last.last_in_sentence = true;
            }
            sentences.push(current);
        }
        sentences
    }
}

/// Chunks that must never be split: e-mail addresses and URLs.
fn is_protected(chunk: &str) -> bool {
    chunk.contains('@')
        || chunk.starts_with("http://")
        || chunk.starts_with("https://")
        || chunk.starts_with("www.")
}

/// A dotted number such as `12.05.2024` or `12.05.2024.` — kept as one
/// token, trailing sentence period included.
fn is_dotted_number(s: &str) -> bool {
    !s.is_empty()
        && s.chars().all(|c| c.is_ascii_digit() || c == '.')
        && s.chars().any(|c| c.is_ascii_digit())
        && s.matches('.').count() >= 2
}

/// Splits a chunk at maximal runs of `!`/`?`, keeping the runs as segments.
fn split_bang_runs(chunk: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut start = 0;
    let mut run_start: Option<usize> = None;
    for (idx, c) in chunk.char_indices() {
        if matches!(c, '!' | '?') {
            if run_start.is_none() {
                if idx > start {
                    segments.push(&chunk[start..idx]);
                }
                run_start = Some(idx);
            }
        } else if let Some(rs) = run_start.take() {
            segments.push(&chunk[rs..idx]);
            start = idx;
        }
    }
    if let Some(rs) = run_start {
        segments.push(&chunk[rs..]);
    } else if start < chunk.len() {
        segments.push(&chunk[start..]);
    }
    segments
}

/// Sentence-terminal punctuation tokens.
fn is_terminal(token: &str) -> bool {
    !token.is_empty() && token.chars().all(|c| matches!(c, '.' | '!' | '?' | '…'))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(sentence: &[Token]) -> Vec<&str> {
        sentence.iter().map(|t| t.text.as_str()).collect()
    }

    #[test]
    fn splits_sentences_on_terminal_punctuation() {
        let tok = RuleTokenizer::new();
        let sentences = tok.tokenize("Das ist gut. Morgen kommt mehr.");
        assert_eq!(sentences.len(), 2);
        assert_eq!(texts(&sentences[0]), vec!["Das", "ist", "gut", "."]);
        assert_eq!(texts(&sentences[1]), vec!["Morgen", "kommt", "mehr", "."]);
    }

    #[test]
    fn spacing_metadata_reflects_input() {
        let tok = RuleTokenizer::new();
        let sentences = tok.tokenize("Hallo, Hans.");
        let s = &sentences[0];
        assert_eq!(texts(s), vec!["Hallo", ",", "Hans", "."]);
        // "Hallo" clings to the comma, the comma is followed by a space.
        assert!(!s[0].space_after);
        assert!(s[1].space_after);
        assert!(!s[2].space_after);
        assert!(s[3].last_in_sentence);
    }

    #[test]
    fn abbreviations_keep_their_period() {
        let tok = RuleTokenizer::new();
        let sentences = tok.tokenize("Dr. Hans Müller kommt z.B. morgen.");
        assert_eq!(sentences.len(), 1);
        let t = texts(&sentences[0]);
        assert!(t.contains(&"Dr."));
        assert!(t.contains(&"z.B."));
    }

    #[test]
    fn email_addresses_stay_whole() {
        let tok = RuleTokenizer::new();
        let sentences = tok.tokenize("Schreib an hans.mueller@example.org bitte.");
        let t = texts(&sentences[0]);
        assert!(t.contains(&"hans.mueller@example.org"));
    }

    #[test]
    fn dotted_date_swallows_sentence_period() {
        let tok = RuleTokenizer::new();
        let sentences = tok.tokenize("Geboren am 12.05.2024. Danach nichts.");
        // The date keeps the terminal period attached, so the first sentence
        // only ends at the second period.
        let t = texts(&sentences[0]);
        assert!(t.contains(&"12.05.2024."));
    }

    #[test]
    fn bang_runs_separate_inside_chunks() {
        let tok = RuleTokenizer::new();
        let sentences = tok.tokenize("Name:!!!Hans");
        let flat: Vec<String> = sentences
            .iter()
            .flat_map(|s| s.iter().map(|t| t.text.clone()))
            .collect();
        assert_eq!(flat, vec!["Name", ":", "!!!", "Hans"]);
        // The run ends its sentence, so the column after it starts fresh.
        assert_eq!(sentences.len(), 2);
    }

    #[test]
    fn empty_input_yields_no_sentences() {
        let tok = RuleTokenizer::new();
        assert!(tok.tokenize("").is_empty());
        assert!(tok.tokenize("   \n ").is_empty());
    }
}
