//! Benchmarks for transcript extraction performance.
//!
//! Run with: cargo bench
//!
//! These benchmarks run the pipeline over synthetic transcript pages.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use saenggibu::{MemorySource, PageClassifier, Pipeline, RawPage, RawTable, ScoreParser};

const SUBJECTS: &[&str] = &[
    "문학", "독서", "수학Ⅰ", "수학Ⅱ", "영어Ⅰ", "물리학Ⅰ", "화학Ⅰ", "한국사",
];

/// Creates a grade-level academic table with one row per subject.
fn create_academic_table() -> RawTable {
    let mut rows = vec![vec![
        "학기".to_string(),
        "교과".to_string(),
        "과목".to_string(),
        "단위수".to_string(),
        "원점수/과목평균(표준편차)".to_string(),
        "성취도(수강자수)".to_string(),
    ]];
    for (index, subject) in SUBJECTS.iter().enumerate() {
        rows.push(vec![
            if index == 0 { "1" } else { "" }.to_string(),
            "국어".to_string(),
            (*subject).to_string(),
            "4".to_string(),
            format!("{}/70.1(12.5)", 60 + index),
            format!("B({})", 180 + index),
        ]);
    }
    RawTable::from_rows(rows)
}

/// Creates a synthetic transcript with an academic, an attendance and a
/// detail page per grade, plus an identity cover and a sections page.
fn create_transcript_pages(grades: u32) -> Vec<RawPage> {
    let mut pages = vec![RawPage::new(
        1,
        "인적사항\n성명: 김하늘  성별: 남\n주민등록번호: 070312-3123456\n학교명: 미리내고등학교",
    )];

    let mut number = 2;
    for grade in 1..=grades {
        pages.push(
            RawPage::new(number, format!("[{grade}학년] 교과학습발달상황"))
                .with_table(create_academic_table()),
        );
        pages.push(RawPage::new(
            number + 1,
            format!("출결상황\n{grade}학년 수업일수 190 출석일수 188 지각 1 조퇴 0 결석 1"),
        ));
        pages.push(RawPage::new(
            number + 2,
            format!(
                "[{grade}학년] 세부능력 및 특기사항\n문학: 시적 화자의 정서 변화를 중심으로 작품을 감상하고 비평문을 작성하여 학급 문집 제작에 주도적으로 참여함"
            ),
        ));
        number += 3;
    }

    pages.push(RawPage::new(
        number,
        "2021년 3월 2일 미리내고등학교 제1학년 입학\n창의적체험활동상황\n1학년 1학기 자율활동 34시간\n행동특성 및 종합의견\n학급 활동에 주도적으로 참여하고 급우들을 잘 도움",
    ));
    pages
}

/// Benchmark page domain classification.
fn bench_page_classification(c: &mut Criterion) {
    let classifier = PageClassifier::new();
    let academic = "[1학년] 교과학습발달상황\n과목 원점수 성취도";
    let unknown = "이 문서는 일반 안내문으로 특별한 항목이 없음";

    c.bench_function("classify_academic_page", |b| {
        b.iter(|| classifier.classify(black_box(academic)));
    });

    c.bench_function("classify_unknown_page", |b| {
        b.iter(|| classifier.classify(black_box(unknown)));
    });
}

/// Benchmark score cell parsing.
fn bench_score_parsing(c: &mut Criterion) {
    let parser = ScoreParser::new();

    c.bench_function("parse_complex_score", |b| {
        b.iter(|| parser.parse_complex_score(black_box("82/71.5(14.1)")));
    });

    c.bench_function("parse_achievement", |b| {
        b.iter(|| parser.parse_achievement(black_box("A(186)")));
    });
}

/// Benchmark full pipeline runs at various document sizes.
fn bench_full_extraction(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_extraction");
    let pipeline = Pipeline::new();

    for grades in [1, 2, 3].iter() {
        let source = MemorySource::from_pages(create_transcript_pages(*grades));

        group.bench_function(format!("{}_grades", grades), |b| {
            b.iter(|| pipeline.extract(black_box(&source)));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_page_classification,
    bench_score_parsing,
    bench_full_extraction,
);
criterion_main!(benches);
