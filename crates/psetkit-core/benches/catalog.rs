use std::path::Path;

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use psetkit_core::catalog::{parse_catalog_str, render_markdown, validate_catalog};
use psetkit_core::model::Variant;

fn catalog_toml(entries: usize) -> String {
    let mut toml = String::from(
        "[catalog]\ntitle = \"Honors Analysis\"\ndescription = \"Weekly sets.\"\nhtml_base_url = \"https://example.edu/a\"\npdf_base_url = \"https://example.edu/a\"\n",
    );
    for i in 1..=entries {
        toml.push_str(&format!(
            "\n[[entries]]\nordinal = {i}\ntitle = \"Problem Set {i}\"\nsummary = [\"Topic A\", \"Topic B\"]\nsource = \"set{i:02}.tex\"\n"
        ));
    }
    toml
}

fn bench_catalog(c: &mut Criterion) {
    let mut group = c.benchmark_group("catalog");

    let text = catalog_toml(14);
    let catalog = parse_catalog_str(&text, Path::new("catalog.toml")).unwrap();

    group.bench_function("parse", |b| {
        b.iter(|| parse_catalog_str(black_box(&text), Path::new("catalog.toml")))
    });
    group.bench_function("validate", |b| {
        b.iter(|| validate_catalog(black_box(&catalog), None))
    });
    group.bench_function("render_rendered", |b| {
        b.iter(|| render_markdown(black_box(&catalog), Variant::Rendered))
    });

    group.finish();
}

criterion_group!(benches, bench_catalog);
criterion_main!(benches);
