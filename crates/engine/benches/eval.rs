use criterion::{Criterion, black_box, criterion_group, criterion_main};

use wegweiser_core::{MatchType, Rule, Settings};
use wegweiser_engine::{Snapshot, evaluate};

fn rule_set(count: usize) -> Vec<Rule> {
    let mut rules: Vec<Rule> = (0..count)
        .map(|i| {
            Rule::new(
                format!("/legacy/page-{i}"),
                MatchType::Exact,
                format!("https://new.example/pages/{i}"),
            )
            .with_priority(10)
        })
        .collect();
    // A wildcard and a catch-all at the tail, as real rule sets tend to have.
    rules.push(
        Rule::new("/blog/*", MatchType::Wildcard, "https://new.example/posts/%1")
            .with_priority(50),
    );
    rules.push(Rule::new("/", MatchType::Prefix, "https://new.example").with_priority(100));
    rules
}

fn bench_exact_hit(c: &mut Criterion) {
    let snapshot = Snapshot::build(rule_set(100), Settings::new()).snapshot;

    c.bench_function("evaluate_exact_hit_100_rules", |b| {
        b.iter(|| black_box(evaluate(black_box("/legacy/page-42"), &snapshot)));
    });
}

fn bench_wildcard_hit(c: &mut Criterion) {
    let snapshot = Snapshot::build(rule_set(100), Settings::new()).snapshot;

    c.bench_function("evaluate_wildcard_hit_100_rules", |b| {
        b.iter(|| black_box(evaluate(black_box("/blog/some-article-slug"), &snapshot)));
    });
}

fn bench_fallback_miss(c: &mut Criterion) {
    // No catch-all: every evaluation walks the whole rule set and falls back.
    let rules: Vec<Rule> = (0..100)
        .map(|i| Rule::new(format!("/legacy/page-{i}"), MatchType::Exact, "/x"))
        .collect();
    let settings = Settings::new();
    let snapshot = Snapshot::build(rules, settings).snapshot;

    c.bench_function("evaluate_fallback_100_rules", |b| {
        b.iter(|| black_box(evaluate(black_box("/no/such/path"), &snapshot)));
    });
}

fn bench_query_policy(c: &mut Criterion) {
    let rule = Rule::new("/old", MatchType::Exact, "https://new.example")
        .with_discard_query_params(true)
        .with_keep_query_params(["^page$", "^lang$"]);
    let snapshot = Snapshot::build(vec![rule], Settings::new()).snapshot;

    c.bench_function("evaluate_query_policy", |b| {
        b.iter(|| {
            black_box(evaluate(
                black_box("/old?utm_source=mail&utm_medium=email&page=2&lang=de&ref=abc"),
                &snapshot,
            ))
        });
    });
}

criterion_group!(
    benches,
    bench_exact_hit,
    bench_wildcard_hit,
    bench_fallback_miss,
    bench_query_policy,
);
criterion_main!(benches);
