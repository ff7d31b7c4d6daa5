use std::sync::Arc;

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use spurlos_core::{
    BoundaryReconstructor, CoarseMapping, EntityDetector, PredictedLabel, Result, RuleTokenizer,
    SequenceModel,
};

/// Labels a fixed term list; inference cost stays negligible so the numbers
/// reflect alignment, not the model.
struct TermModel;

impl SequenceModel for TermModel {
    fn label(&self, sentences: &[String]) -> Result<Vec<Vec<PredictedLabel>>> {
        let terms = [
            ("Hans", "MALE"),
            ("Müller", "FAMILY"),
            ("Berlin", "CITY"),
            ("10115", "ZIP"),
            ("hans.mueller@example.org", "EMAIL"),
        ];
        Ok(sentences
            .iter()
            .map(|s| {
                let mut hits: Vec<(usize, PredictedLabel)> = Vec::new();
                for (term, label) in terms {
                    if let Some(pos) = s.find(term) {
                        hits.push((pos, PredictedLabel::new(label, term)));
                    }
                }
                hits.sort_by_key(|(pos, _)| *pos);
                hits.into_iter().map(|(_, l)| l).collect()
            })
            .collect())
    }
}

const LETTER: &str = "Sehr geehrter Herr Dr. Hans Müller,\n\n\
    vielen Dank für Ihre Nachricht vom 12.05.2024. Wir haben Ihre Adresse\n\
    Musterstr. 12, 10115 Berlin notiert. Bei Rückfragen erreichen Sie uns\n\
    unter hans.mueller@example.org oder telefonisch.\n\n\
    Name:\tHans Müller\nOrt:\tBerlin\n\n\
    Mit freundlichen Grüßen";

fn bench_boundary_reconstruction(c: &mut Criterion) {
    let reconstructor = BoundaryReconstructor::new();
    let tokenizer = RuleTokenizer::new();

    c.bench_function("boundary_reconstruct_letter", |b| {
        b.iter(|| reconstructor.reconstruct(&tokenizer, black_box(LETTER)));
    });
}

fn bench_detection(c: &mut Criterion) {
    let detector =
        EntityDetector::new(Arc::new(RuleTokenizer::new()), Arc::new(TermModel)).unwrap();
    let mapping = CoarseMapping::codealltag();

    c.bench_function("detect_fine_letter", |b| {
        b.iter(|| detector.detect_fine(black_box(LETTER)).unwrap());
    });

    c.bench_function("detect_coarse_letter", |b| {
        b.iter(|| detector.detect_coarse(black_box(LETTER), &mapping).unwrap());
    });
}

criterion_group!(benches, bench_boundary_reconstruction, bench_detection);
criterion_main!(benches);
