//! # Lexicon Tagger
//!
//! A gazetteer-plus-regex sequence labeler. Terms are exact surface forms
//! (multi-word entries allowed), patterns are regexes for open classes like
//! e-mail addresses and dates. Matching is longest-first and
//! non-overlapping; predictions come out in document order, which is the
//! contract span recovery depends on.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use regex::Regex;
use serde::Deserialize;
use spurlos_core::{PredictedLabel, SequenceModel};
use tracing::debug;

use crate::error::Result;

/// On-disk shape of a lexicon file.
#[derive(Debug, Default, Deserialize)]
struct LexiconFile {
    /// Surface form → label.
    #[serde(default)]
    terms: BTreeMap<String, String>,
    /// Regex patterns for open-class labels.
    #[serde(default)]
    patterns: Vec<LexiconPattern>,
}

#[derive(Debug, Deserialize)]
struct LexiconPattern {
    label: String,
    pattern: String,
}

/// A [`SequenceModel`] backed by a term lexicon and regex patterns.
pub struct LexiconTagger {
    /// Terms sorted longest-first so longer surface forms win overlaps.
    terms: Vec<(String, String)>,
    patterns: Vec<(String, Regex)>,
}

impl std::fmt::Debug for LexiconTagger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LexiconTagger")
            .field("terms", &self.terms.len())
            .field("patterns", &self.patterns.len())
            .finish()
    }
}

impl LexiconTagger {
    /// Builds a tagger from term/label pairs and `(label, pattern)` regexes.
    pub fn new<T, P>(terms: T, patterns: P) -> Result<Self>
    where
        T: IntoIterator<Item = (String, String)>,
        P: IntoIterator<Item = (String, String)>,
    {
        let mut terms: Vec<(String, String)> = terms.into_iter().collect();
        terms.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then_with(|| a.0.cmp(&b.0)));

        let patterns = patterns
            .into_iter()
            .map(|(label, pattern)| Ok((label, Regex::new(&pattern)?)))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { terms, patterns })
    }

    /// Loads a tagger from a JSON lexicon file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let file: LexiconFile = serde_json::from_str(&fs::read_to_string(&path)?)?;
        debug!(
            path = %path.as_ref().display(),
            terms = file.terms.len(),
            patterns = file.patterns.len(),
            "loaded lexicon"
        );
        Self::new(
            file.terms,
            file.patterns.into_iter().map(|p| (p.label, p.pattern)),
        )
    }

    /// Matches one sentence, non-overlapping, document order.
    fn matches(&self, sentence: &str) -> Vec<PredictedLabel> {
        let mut taken: Vec<(usize, usize)> = Vec::new();
        let mut hits: Vec<(usize, PredictedLabel)> = Vec::new();

        for (term, label) in &self.terms {
            let mut from = 0;
            while let Some(pos) = sentence[from..].find(term.as_str()) {
                let start = from + pos;
                let end = start + term.len();
                from = end;
                if !word_bounded(sentence, start, end) || overlaps(&taken, start, end) {
                    continue;
                }
                taken.push((start, end));
                hits.push((start, PredictedLabel::new(label, term)));
            }
        }

        for (label, re) in &self.patterns {
            for m in re.find_iter(sentence) {
                if overlaps(&taken, m.start(), m.end()) {
                    continue;
                }
                taken.push((m.start(), m.end()));
                hits.push((m.start(), PredictedLabel::new(label, m.as_str())));
            }
        }

        hits.sort_by_key(|(pos, _)| *pos);
        hits.into_iter().map(|(_, l)| l).collect()
    }
}

impl SequenceModel for LexiconTagger {
    fn label(&self, sentences: &[String]) -> spurlos_core::Result<Vec<Vec<PredictedLabel>>> {
        Ok(sentences.iter().map(|s| self.matches(s)).collect())
    }
}

/// Neither end of the span sits inside a word.
fn word_bounded(text: &str, start: usize, end: usize) -> bool {
    let before = text[..start].chars().next_back();
    let after = text[end..].chars().next();
    !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
}

fn overlaps(taken: &[(usize, usize)], start: usize, end: usize) -> bool {
    taken.iter().any(|&(s, e)| start < e && s < end)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tagger() -> LexiconTagger {
        LexiconTagger::new(
            [
                ("Hans".to_string(), "MALE".to_string()),
                ("Hans Müller".to_string(), "MALE".to_string()),
                ("Berlin".to_string(), "CITY".to_string()),
            ],
            [(
                "EMAIL".to_string(),
                r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}".to_string(),
            )],
        )
        .unwrap()
    }

    fn label_one(t: &LexiconTagger, s: &str) -> Vec<PredictedLabel> {
        t.label(&[s.to_string()]).unwrap().remove(0)
    }

    #[test]
    fn longest_term_wins_overlap() {
        let hits = label_one(&tagger(), "Hans Müller wohnt in Berlin.");
        assert_eq!(hits.len(), 2);
        // "Hans Müller" shadows the shorter "Hans".
        assert_eq!(hits[0].text, "Hans Müller");
        assert_eq!(hits[1].text, "Berlin");
    }

    #[test]
    fn predictions_come_in_document_order() {
        let hits = label_one(&tagger(), "Berlin kennt Hans nicht.");
        let texts: Vec<&str> = hits.iter().map(|h| h.text.as_str()).collect();
        assert_eq!(texts, vec!["Berlin", "Hans"]);
    }

    #[test]
    fn terms_respect_word_boundaries() {
        let hits = label_one(&tagger(), "Berlinale statt Berlin ?");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].text, "Berlin");
    }

    #[test]
    fn patterns_match_open_classes() {
        let hits = label_one(&tagger(), "Schreib an hans@example.org bitte.");
        assert!(hits.iter().any(|h| h.value == "EMAIL" && h.text == "hans@example.org"));
    }

    #[test]
    fn invalid_pattern_is_a_load_error() {
        let result = LexiconTagger::new(
            std::iter::empty(),
            [("X".to_string(), "([unclosed".to_string())],
        );
        assert!(result.is_err());
    }

    #[test]
    fn loads_from_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lexicon.json");
        std::fs::write(
            &path,
            r#"{ "terms": { "Potsdam": "CITY" }, "patterns": [] }"#,
        )
        .unwrap();
        let tagger = LexiconTagger::from_file(&path).unwrap();
        let hits = label_one(&tagger, "Potsdam liegt nahe.");
        assert_eq!(hits[0].value, "CITY");
    }
}
