use criterion::{black_box, criterion_group, criterion_main, Criterion};

use std::collections::BTreeMap;

use triscale_core::calculator::{CalculatorConfig, ScoreCalculator};
use triscale_core::coherence::analyze;
use triscale_core::difficulty::classify_questions;
use triscale_core::model::{AnswerKey, AreaCode, Student};
use triscale_core::table::ReferenceTable;

fn make_table() -> ReferenceTable {
    let mut csv = String::from("area,acertos,tri_min,tri_med,tri_max\n");
    for (area, base) in [("LC", 299.6), ("CH", 329.8), ("CN", 339.9), ("MT", 342.8)] {
        for correct in 0..=45u32 {
            let med = base + f64::from(correct) * 12.0;
            csv.push_str(&format!(
                "{area},{correct},{:.1},{med:.1},{:.1}\n",
                med - 40.0,
                med + 40.0
            ));
        }
    }
    ReferenceTable::from_csv_str(&csv).unwrap()
}

fn make_cohort(size: usize) -> (Vec<Student>, AnswerKey) {
    let key: AnswerKey = (1..=90).map(|q| (q, 'A')).collect();
    let students = (0..size)
        .map(|i| {
            let answers: BTreeMap<u32, String> = (1..=90)
                .map(|q| {
                    // Deterministic mixed pattern: correctness varies by
                    // student and question.
                    let mark = if (q as usize + i) % 3 == 0 { "A" } else { "B" };
                    (q, mark.to_string())
                })
                .collect();
            Student {
                id: format!("s{i}"),
                name: format!("Student {i}"),
                answers,
            }
        })
        .collect();
    (students, key)
}

fn bench_classify_questions(c: &mut Criterion) {
    let mut group = c.benchmark_group("classify_questions");

    for size in [50usize, 500] {
        let (students, key) = make_cohort(size);
        group.bench_function(format!("cohort={size}"), |b| {
            b.iter(|| classify_questions(black_box(&students), black_box(&key)))
        });
    }

    group.finish();
}

fn bench_score_compute(c: &mut Criterion) {
    let mut group = c.benchmark_group("score_compute");
    let table = make_table();
    let config = CalculatorConfig::default();
    let calc = ScoreCalculator::new(&table, &config);

    group.bench_function("zero_correct", |b| {
        b.iter(|| calc.compute(black_box(AreaCode::Lc), black_box(0), None, &[]))
    });

    let coherent = analyze(&[5, 3, 2, 0, 0], 10, 0.6);
    group.bench_function("with_coherence", |b| {
        b.iter(|| {
            calc.compute(
                black_box(AreaCode::Mt),
                black_box(10),
                Some(black_box(&coherent)),
                black_box(&[420.0, 450.0, 460.0]),
            )
        })
    });

    group.finish();
}

criterion_group!(benches, bench_classify_questions, bench_score_compute);
criterion_main!(benches);
