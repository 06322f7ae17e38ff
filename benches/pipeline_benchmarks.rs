//! Descriptor Pipeline Benchmarks
//!
//! Cost of building the application model and descriptors at startup, and
//! of conventional action selection per request.
//!
//! Run with: cargo bench --bench pipeline_benchmarks

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use std::sync::Arc;
use waymark::prelude::*;
use waymark::attribute_route::combine_templates;
use waymark_testing::{ControllerTypeBuilder, MethodBuilder, ParameterBuilder};

fn parts(controllers: usize) -> Arc<ApplicationPartManager> {
    let mut part = ApplicationPart::new("Bench");
    for i in 0..controllers {
        let ty = ControllerTypeBuilder::new(format!("Resource{i}"))
            .route("api/[controller]")
            .action(MethodBuilder::new("List").get(""))
            .action(MethodBuilder::new("Get").get("{id}").param(ParameterBuilder::int("id")))
            .action(MethodBuilder::new("Delete").delete("{id}").param(ParameterBuilder::int("id")))
            .build();
        part = part.with_type(ty);

        let page = ControllerTypeBuilder::new(format!("Page{i}"))
            .action(MethodBuilder::new("Index").accepts(HttpMethod::Get))
            .action(MethodBuilder::new("Save").accepts(HttpMethod::Post))
            .build();
        part = part.with_type(page);
    }
    Arc::new(ApplicationPartManager::with_parts([part]))
}

// ============================================================================
// Startup Benchmarks
// ============================================================================

fn bench_descriptor_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("descriptor_build");

    for controllers in [10, 100] {
        let manager = parts(controllers);
        group.bench_with_input(BenchmarkId::from_parameter(controllers), &manager, |b, manager| {
            b.iter(|| {
                // A fresh provider so every iteration rebuilds.
                let pipeline = waymark::descriptor_pipeline(
                    Arc::clone(manager),
                    &MvcOptions::new(),
                    &ApiBehaviorOptions::default(),
                );
                black_box(pipeline.action_descriptors().map(|d| d.len()))
            })
        });
    }

    group.finish();
}

fn bench_template_combine(c: &mut Criterion) {
    let mut group = c.benchmark_group("template_combine");

    group.bench_function("relative", |b| {
        b.iter(|| black_box(combine_templates(Some("api/[controller]"), Some("{id}"))))
    });

    group.bench_function("override", |b| {
        b.iter(|| black_box(combine_templates(Some("api/[controller]"), Some("~/health"))))
    });

    group.finish();
}

// ============================================================================
// Request Benchmarks
// ============================================================================

fn bench_selection(c: &mut Criterion) {
    let mut group = c.benchmark_group("selection");

    let pipeline = waymark::descriptor_pipeline(parts(100), &MvcOptions::new(), &ApiBehaviorOptions::default());
    let Ok(descriptors) = pipeline.action_descriptors() else {
        return;
    };
    let selector = ActionSelector::new(descriptors);

    let mut route = RouteValueList::default();
    route.set("controller", "Page42");
    route.set("action", "Save");

    group.bench_function("exact_case", |b| {
        b.iter(|| {
            let candidates = selector.select_candidates(black_box(&route));
            black_box(selector.select_best_candidate(&RequestContext::new("POST"), &candidates).is_ok())
        })
    });

    let mut lower = RouteValueList::default();
    lower.set("controller", "page42");
    lower.set("action", "save");

    group.bench_function("ignore_case", |b| {
        b.iter(|| black_box(selector.select_candidates(black_box(&lower)).len()))
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_descriptor_build,
    bench_template_combine,
    bench_selection
);
criterion_main!(benches);
