//! # Coarse Consolidation
//!
//! Remaps fine-grained entity labels to coarse categories and merges
//! adjacent same-label entities into single spans, keeping full provenance
//! of every constituent. A DATE-specific post-pass strips sentence periods
//! that the tokenizer swallowed into abbreviated dates.

use std::collections::{BTreeMap, HashMap, HashSet};

use regex::Regex;
use serde::Serialize;
use tracing::debug;

use crate::error::Result;
use crate::types::EntityItem;

/// Default maximum number of separator characters allowed between two
/// entities that still count as adjacent.
pub const DEFAULT_MAX_GAP: usize = 4;

/// Fine→coarse label mapping for one entity set.
///
/// Unknown fine labels map to themselves; labels in `skip_labels` are
/// dropped before consolidation. An empty mapping therefore means "no
/// remapping, no skips", which is the safe behavior for unknown entity
/// sets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoarseMapping {
    /// Fine label → coarse label.
    pub fine_to_coarse: HashMap<String, String>,
    /// Fine labels excluded from consolidation output entirely.
    pub skip_labels: HashSet<String>,
}

impl CoarseMapping {
    /// The empty mapping: identity relabeling, nothing skipped.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds a mapping from owned pairs and skip labels.
    pub fn new<M, S>(fine_to_coarse: M, skip_labels: S) -> Self
    where
        M: IntoIterator<Item = (String, String)>,
        S: IntoIterator<Item = String>,
    {
        Self {
            fine_to_coarse: fine_to_coarse.into_iter().collect(),
            skip_labels: skip_labels.into_iter().collect(),
        }
    }

    /// Built-in mapping for the given entity set id; empty for unknown ids.
    pub fn for_entity_set(entity_set_id: &str) -> Self {
        match entity_set_id {
            "codealltag" => Self::codealltag(),
            "grascco" => Self::grascco(),
            _ => Self::empty(),
        }
    }

    /// Mapping for the CodE Alltag e-mail corpus entity set.
    pub fn codealltag() -> Self {
        let pairs = [
            ("FAMILY", "NAME"),
            ("FEMALE", "NAME"),
            ("MALE", "NAME"),
            ("CITY", "LOCATION"),
            ("STREET", "LOCATION"),
            ("STREETNO", "LOCATION"),
            ("ZIP", "LOCATION"),
            ("EMAIL", "CONTACT"),
            ("PHONE", "CONTACT"),
            ("URL", "CONTACT"),
            ("UFID", "ID"),
            ("USER", "ID"),
            ("ORG", "ORGANIZATION"),
        ];
        Self::new(
            pairs.map(|(f, c)| (f.to_string(), c.to_string())),
            std::iter::empty(),
        )
    }

    /// Mapping for the GraSCCo clinical-notes corpus entity set.
    pub fn grascco() -> Self {
        let pairs = [
            ("NAME_DOCTOR", "NAME"),
            ("NAME_EXT", "NAME"),
            ("NAME_OTHER", "NAME"),
            ("NAME_PATIENT", "NAME"),
            ("NAME_RELATIVE", "NAME"),
            ("LOCATION_CITY", "LOCATION"),
            ("LOCATION_COUNTRY", "LOCATION"),
            ("LOCATION_OTHER", "LOCATION"),
            ("LOCATION_STATE", "LOCATION"),
            ("LOCATION_STREET", "LOCATION"),
            ("LOCATION_ZIP", "LOCATION"),
            ("CONTACT_EMAIL", "CONTACT"),
            ("CONTACT_FAX", "CONTACT"),
            ("CONTACT_PHONE", "CONTACT"),
            ("CONTACT_URL", "CONTACT"),
            ("NAME_USERNAME", "ID"),
            ("LOCATION_HOSPITAL", "ORGANIZATION"),
            ("LOCATION_ORGANIZATION", "ORGANIZATION"),
        ];
        Self::new(
            pairs.map(|(f, c)| (f.to_string(), c.to_string())),
            ["NAME_TITLE".to_string()],
        )
    }

    /// Coarse label for a fine label, identity when unmapped.
    pub fn coarse_label<'a>(&'a self, fine: &'a str) -> &'a str {
        self.fine_to_coarse.get(fine).map_or(fine, String::as_str)
    }

    /// Whether the fine label is excluded from output.
    pub fn skips(&self, fine: &str) -> bool {
        self.skip_labels.contains(fine)
    }
}

/// Origin of one consolidated entity: its fine-grained constituent(s).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Constituent {
    /// The fine-grained label before remapping.
    pub original_label: String,
    /// The surface form before merging.
    pub original_token: String,
    /// Original start offset.
    pub start: i64,
    /// Original end offset.
    pub end: i64,
}

/// Provenance record for one output entity, keyed by its token id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Provenance {
    /// A passthrough entity that was only relabeled.
    Single {
        coarse_label: String,
        original_label: String,
        original_token: String,
        start: i64,
        end: i64,
    },
    /// A merged run of adjacent same-label entities.
    Merged {
        coarse_label: String,
        merged_token: String,
        start: i64,
        end: i64,
        constituents: Vec<Constituent>,
    },
}

/// Provenance for every output entity, keyed by (possibly concatenated)
/// token id. Ordered for deterministic serialization.
pub type ProvenanceMap = BTreeMap<String, Provenance>;

/// Separator characters allowed between adjacent entities.
fn is_separator(c: char) -> bool {
    c.is_whitespace()
        || matches!(
            c,
            ',' | '.'
                | '-'
                | ':'
                | ';'
                | '('
                | ')'
                | '['
                | ']'
                | '{'
                | '}'
                | '"'
                | '\''
                | '/'
                | '\\'
        )
}

/// Consolidates fine-grained entities into coarse categories.
#[derive(Debug)]
pub struct CoarseMapper {
    max_gap: usize,
    re_date: Regex,
}

impl CoarseMapper {
    /// Creates a consolidator with the default adjacency gap.
    ///
    /// # Errors
    ///
    /// Returns [`crate::SpurlosError::RegexError`] if the date pattern fails
    /// to compile (should never happen with the static pattern here).
    pub fn new() -> Result<Self> {
        Self::with_max_gap(DEFAULT_MAX_GAP)
    }

    /// Creates a consolidator with an explicit adjacency gap.
    pub fn with_max_gap(max_gap: usize) -> Result<Self> {
        Ok(Self {
            max_gap,
            re_date: Regex::new(r"^\d{1,2}\.\d{1,2}\.\d{2,4}\.$")?,
        })
    }

    /// Maps fine entities to coarse labels and, when `merge` is set, merges
    /// maximal runs of adjacent same-label entities.
    ///
    /// Sentinel entities and skip-labeled entities never reach the output.
    /// Every output entity has a provenance record; merged entities carry
    /// the full constituent list.
    pub fn consolidate(
        &self,
        text: &str,
        entities: &[EntityItem],
        mapping: &CoarseMapping,
        merge: bool,
    ) -> (Vec<EntityItem>, ProvenanceMap) {
        let mut mapped: Vec<(EntityItem, Constituent)> = entities
            .iter()
            .filter(|e| e.is_resolved() && !mapping.skips(&e.label))
            .map(|e| {
                let origin = Constituent {
                    original_label: e.label.clone(),
                    original_token: e.token.clone(),
                    start: e.start,
                    end: e.end,
                };
                let mut relabeled = e.clone();
                relabeled.label = mapping.coarse_label(&e.label).to_string();
                (relabeled, origin)
            })
            .collect();
        mapped.sort_by_key(|(e, _)| e.start);

        if mapped.is_empty() {
            return (Vec::new(), ProvenanceMap::new());
        }

        let mut output: Vec<EntityItem> = Vec::new();
        let mut provenance = ProvenanceMap::new();

        if !merge {
            for (entity, origin) in mapped {
                provenance.insert(entity.token_id.clone(), single(&entity, origin));
                output.push(entity);
            }
            return (self.repair_dates(output), provenance);
        }

        let mut i = 0;
        while i < mapped.len() {
            let coarse_label = mapped[i].0.label.clone();
            let mut j = i + 1;
            while j < mapped.len()
                && mapped[j].0.label == coarse_label
                && self.consecutive(text, &mapped[j - 1].0, &mapped[j].0)
            {
                j += 1;
            }

            if j - i > 1 {
                let run = &mapped[i..j];
                let start = run[0].0.start;
                let end = run[run.len() - 1].0.end;
                let token = text[start as usize..end as usize].to_string();
                let token_id: String = run.iter().map(|(e, _)| e.token_id.as_str()).collect();
                debug!(%token_id, %coarse_label, start, end, "merged adjacent entities");

                provenance.insert(
                    token_id.clone(),
                    Provenance::Merged {
                        coarse_label: coarse_label.clone(),
                        merged_token: token.clone(),
                        start,
                        end,
                        constituents: run.iter().map(|(_, o)| o.clone()).collect(),
                    },
                );
                output.push(EntityItem {
                    token_id,
                    label: coarse_label,
                    start,
                    end,
                    token,
                });
            } else {
                let (entity, origin) = mapped[i].clone();
                provenance.insert(entity.token_id.clone(), single(&entity, origin));
                output.push(entity);
            }
            i = j;
        }

        (self.repair_dates(output), provenance)
    }

    /// Adjacency check: `b` directly follows `a`, or the between-text is a
    /// short run of separator characters.
    fn consecutive(&self, text: &str, a: &EntityItem, b: &EntityItem) -> bool {
        if b.start < a.end {
            return false;
        }
        if b.start == a.end {
            return true;
        }
        let between = &text[a.end as usize..b.start as usize];
        between.chars().count() <= self.max_gap && between.chars().all(is_separator)
    }

    /// Strips the trailing period that tokenization swallows into
    /// abbreviated dates at sentence end.
    fn repair_dates(&self, entities: Vec<EntityItem>) -> Vec<EntityItem> {
        entities
            .into_iter()
            .map(|mut e| {
                if e.label == "DATE" && self.re_date.is_match(&e.token) {
                    e.token.pop();
                    e.end -= 1;
                }
                e
            })
            .collect()
    }
}

fn single(entity: &EntityItem, origin: Constituent) -> Provenance {
    Provenance::Single {
        coarse_label: entity.label.clone(),
        original_label: origin.original_label,
        original_token: origin.original_token,
        start: origin.start,
        end: origin.end,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity(id: &str, label: &str, start: usize, end: usize, token: &str) -> EntityItem {
        EntityItem::resolved(id, label, start, end, token)
    }

    #[test]
    fn codealltag_maps_city_to_location() {
        let mapping = CoarseMapping::for_entity_set("codealltag");
        assert_eq!(mapping.coarse_label("CITY"), "LOCATION");
        assert_eq!(mapping.coarse_label("MALE"), "NAME");
        // Unknown fine labels pass through unchanged.
        assert_eq!(mapping.coarse_label("UNKNOWN_X"), "UNKNOWN_X");
    }

    #[test]
    fn unknown_entity_set_gets_empty_mapping() {
        let mapping = CoarseMapping::for_entity_set("does-not-exist");
        assert!(mapping.fine_to_coarse.is_empty());
        assert!(mapping.skip_labels.is_empty());
    }

    #[test]
    fn grascco_skips_name_title() {
        let mapping = CoarseMapping::for_entity_set("grascco");
        assert!(mapping.skips("NAME_TITLE"));
        assert_eq!(mapping.coarse_label("LOCATION_HOSPITAL"), "ORGANIZATION");
    }

    #[test]
    fn adjacent_names_merge_into_one_entity() {
        let text = "Hans Müller ist hier";
        let mapper = CoarseMapper::new().unwrap();
        let mapping = CoarseMapping::codealltag();
        let entities = vec![
            entity("T1", "MALE", 0, 4, "Hans"),
            entity("T2", "FAMILY", 5, 12, "Müller"),
        ];
        let (out, prov) = mapper.consolidate(text, &entities, &mapping, true);

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].label, "NAME");
        assert_eq!(out[0].token_id, "T1T2");
        assert_eq!(out[0].span(), Some((0, 12)));
        assert_eq!(out[0].token, "Hans Müller");

        match &prov["T1T2"] {
            Provenance::Merged { constituents, .. } => {
                assert_eq!(constituents.len(), 2);
                assert_eq!(constituents[0].original_label, "MALE");
                assert_eq!(constituents[1].original_token, "Müller");
            }
            other => panic!("expected merged provenance, got {other:?}"),
        }
    }

    #[test]
    fn merged_token_preserves_interstitial_separators() {
        let text = "Musterstr. 12, 10115 Berlin";
        let mapper = CoarseMapper::new().unwrap();
        let mapping = CoarseMapping::codealltag();
        let entities = vec![
            entity("T1", "STREET", 0, 10, "Musterstr."),
            entity("T2", "STREETNO", 11, 13, "12"),
            entity("T3", "ZIP", 15, 20, "10115"),
            entity("T4", "CITY", 21, 27, "Berlin"),
        ];
        let (out, _) = mapper.consolidate(text, &entities, &mapping, true);
        assert_eq!(out.len(), 1);
        // Re-sliced from the original, separators and all — not a concat.
        assert_eq!(out[0].token, "Musterstr. 12, 10115 Berlin");
        assert_eq!(out[0].token_id, "T1T2T3T4");
    }

    #[test]
    fn wide_gap_blocks_merging() {
        // 6 plain characters between the entities, max_gap is 4.
        let text = "Hans abcdef Peter";
        let mapper = CoarseMapper::new().unwrap();
        let mapping = CoarseMapping::codealltag();
        let entities = vec![
            entity("T1", "MALE", 0, 4, "Hans"),
            entity("T2", "MALE", 12, 17, "Peter"),
        ];
        let (out, _) = mapper.consolidate(text, &entities, &mapping, true);
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn non_separator_gap_blocks_merging() {
        let text = "Hans und Peter";
        let mapper = CoarseMapper::new().unwrap();
        let mapping = CoarseMapping::codealltag();
        let entities = vec![
            entity("T1", "MALE", 0, 4, "Hans"),
            entity("T2", "MALE", 9, 14, "Peter"),
        ];
        // Gap "` und `" is short enough but contains letters.
        let (out, _) = mapper.consolidate(text, &entities, &mapping, true);
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn different_coarse_labels_never_merge() {
        let text = "Berlin Hans";
        let mapper = CoarseMapper::new().unwrap();
        let mapping = CoarseMapping::codealltag();
        let entities = vec![
            entity("T1", "CITY", 0, 6, "Berlin"),
            entity("T2", "MALE", 7, 11, "Hans"),
        ];
        let (out, _) = mapper.consolidate(text, &entities, &mapping, true);
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn sentinels_are_dropped() {
        let text = "Hans ist hier";
        let mapper = CoarseMapper::new().unwrap();
        let mapping = CoarseMapping::codealltag();
        let entities = vec![
            EntityItem::unresolved("T1", "MALE", "Niemand"),
            entity("T2", "MALE", 0, 4, "Hans"),
        ];
        let (out, prov) = mapper.consolidate(text, &entities, &mapping, true);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].token_id, "T2");
        assert!(!prov.contains_key("T1"));
    }

    #[test]
    fn merge_disabled_still_maps_and_sorts() {
        let text = "Hans Müller";
        let mapper = CoarseMapper::new().unwrap();
        let mapping = CoarseMapping::codealltag();
        let entities = vec![
            entity("T2", "FAMILY", 5, 11, "Müller"),
            entity("T1", "MALE", 0, 4, "Hans"),
        ];
        let (out, prov) = mapper.consolidate(text, &entities, &mapping, false);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].token_id, "T1");
        assert_eq!(out[0].label, "NAME");
        assert_eq!(out[1].token_id, "T2");
        assert!(matches!(prov["T1"], Provenance::Single { .. }));
    }

    #[test]
    fn date_repair_strips_swallowed_period() {
        let text = "Termin am 12.05.2024. Danach frei.";
        let mapper = CoarseMapper::new().unwrap();
        let entities = vec![entity("T1", "DATE", 10, 21, "12.05.2024.")];
        let (out, _) = mapper.consolidate(text, &entities, &CoarseMapping::empty(), true);
        assert_eq!(out[0].token, "12.05.2024");
        assert_eq!(out[0].end, 20);
    }

    #[test]
    fn date_repair_leaves_plain_dates_alone() {
        let text = "Termin am 12.05.2024 und mehr";
        let mapper = CoarseMapper::new().unwrap();
        let entities = vec![entity("T1", "DATE", 10, 20, "12.05.2024")];
        let (out, _) = mapper.consolidate(text, &entities, &CoarseMapping::empty(), true);
        assert_eq!(out[0].token, "12.05.2024");
        assert_eq!(out[0].end, 20);
    }

    #[test]
    fn consolidation_is_idempotent_on_merged_output() {
        let text = "Hans Müller wohnt in Berlin, 10115";
        let mapper = CoarseMapper::new().unwrap();
        let mapping = CoarseMapping::codealltag();
        let entities = vec![
            entity("T1", "MALE", 0, 4, "Hans"),
            entity("T2", "FAMILY", 5, 12, "Müller"),
            entity("T3", "CITY", 22, 28, "Berlin"),
            entity("T4", "ZIP", 30, 35, "10115"),
        ];
        let (first, _) = mapper.consolidate(text, &entities, &mapping, true);
        let (second, _) = mapper.consolidate(text, &first, &mapping, true);
        assert_eq!(first, second);
    }
}
