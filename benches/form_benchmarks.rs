use criterion::{Criterion, criterion_group, criterion_main};
use formwise::prelude::*;
use formwise::{RuleEngine, RuleSet, Selector};
use std::hint::black_box;

fn bench_rule_engine(c: &mut Criterion) {
    let mut group = c.benchmark_group("rule_engine");

    let engine = RuleEngine::new(
        RuleSet::new()
            .add(is_required("#email", None))
            .add(is_email("#email", None))
            .add(min_length("#email", 6, None)),
    );

    group.bench_function("valid_email", |b| {
        b.iter(|| engine.evaluate(black_box("#email"), black_box(Some("ada@example.com"))))
    });

    group.bench_function("empty_short_circuits", |b| {
        b.iter(|| engine.evaluate(black_box("#email"), black_box(Some(""))))
    });

    group.finish();
}

fn bench_selectors(c: &mut Criterion) {
    let mut group = c.benchmark_group("selectors");

    group.bench_function("parse", |b| {
        b.iter(|| Selector::parse(black_box(".sign-up-htm > .group input[name=gender]:checked")))
    });

    let doc = FormDocument::new();
    let form = doc
        .append(doc.root(), Element::new("form").class("sign-up-htm"))
        .unwrap();
    for i in 0..50 {
        let row = doc.append(form, Element::new("div").class("group")).unwrap();
        doc.append(row, Element::input("text").name(format!("field-{i}")))
            .unwrap();
        doc.append(row, Element::new("span").class("message")).unwrap();
    }
    let selector = Selector::parse(".group [name]:not([disabled])").unwrap();

    group.bench_function("select_all_50_groups", |b| {
        b.iter(|| doc.select_all(black_box(form), &selector))
    });

    group.finish();
}

fn bench_submit(c: &mut Criterion) {
    let doc = FormDocument::new();
    let form = doc.append(doc.root(), Element::new("form").id("wide")).unwrap();
    let mut setup = FormSetup::new(
        FormOptions::new("#wide")
            .group_selector(".group")
            .error_message_selector(".message"),
    );
    for i in 0..20 {
        let row = doc.append(form, Element::new("div").class("group")).unwrap();
        doc.append(
            row,
            Element::input("text")
                .id(format!("f{i}"))
                .name(format!("f{i}"))
                .value("filled in"),
        )
        .unwrap();
        doc.append(row, Element::new("span").class("message")).unwrap();
        setup = setup.rule(is_required(format!("#f{i}"), None));
    }
    let mut controller = FormController::mount(&doc, setup.on_submit(|_| {})).unwrap();

    c.bench_function("submit_20_fields", |b| b.iter(|| controller.submit().unwrap()));
}

criterion_group!(benches, bench_rule_engine, bench_selectors, bench_submit);
criterion_main!(benches);
