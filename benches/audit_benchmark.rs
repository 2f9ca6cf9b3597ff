use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use i18n_audit::check::{key_differences, validate_placeholders};
use i18n_audit::config::descriptor_by_id;
use i18n_audit::parse::{flatten, flatten_expanded, TranslationTree};
use i18n_audit::{run_check, AuditConfig, CheckQuery, Scanner};
use serde_json::{json, Map, Value};
use std::fs;
use tempfile::TempDir;

/// A tree of `sections` objects with 20 leaves each, some carrying placeholders
fn sample_tree(sections: usize, skip_every: usize) -> TranslationTree {
    let mut root = Map::new();
    for s in 0..sections {
        let mut section = Map::new();
        for k in 0..20 {
            if skip_every > 0 && (s * 20 + k) % skip_every == 0 {
                continue;
            }
            let value = if k % 4 == 0 {
                json!(format!("Item {} of {{{{total}}}} for {{{{user}}}}", k))
            } else {
                json!(format!("Label {} in section {}", k, s))
            };
            section.insert(format!("key{}", k), value);
        }
        root.insert(format!("section{}", s), Value::Object(section));
    }
    TranslationTree::new(root)
}

fn bench_flatten(c: &mut Criterion) {
    let mut group = c.benchmark_group("flatten");
    for sections in [10, 100, 1000] {
        let tree = sample_tree(sections, 0);
        group.bench_with_input(BenchmarkId::from_parameter(sections * 20), &tree, |b, tree| {
            b.iter(|| flatten(black_box(tree)))
        });
    }
    group.finish();
}

fn bench_diff(c: &mut Criterion) {
    let reference = sample_tree(500, 0);
    let target = sample_tree(500, 7);
    let (ref_flat, target_flat) = (flatten(&reference), flatten(&target));
    let (ref_expanded, target_expanded) = (flatten_expanded(&reference), flatten_expanded(&target));

    c.bench_function("diff_10k_keys", |b| {
        b.iter(|| key_differences(black_box(&ref_flat), black_box(&target_flat)))
    });
    c.bench_function("placeholders_10k_keys", |b| {
        b.iter(|| {
            validate_placeholders(
                "es",
                "common.json",
                black_box(&ref_expanded),
                black_box(&target_expanded),
            )
        })
    });
}

fn bench_check_project(c: &mut Criterion) {
    let dir = TempDir::new().unwrap();
    for (language, skip) in [("en", 0), ("de", 11), ("es", 13), ("fr", 17)] {
        let lang_dir = dir.path().join("locales").join(language);
        fs::create_dir_all(&lang_dir).unwrap();
        for file in ["common", "errors", "dashboard"] {
            let tree = sample_tree(50, skip);
            fs::write(
                lang_dir.join(format!("{}.json", file)),
                serde_json::to_string_pretty(&Value::Object(tree.into_root())).unwrap(),
            )
            .unwrap();
        }
    }

    c.bench_function("check_4_languages", |b| {
        b.iter(|| run_check(CheckQuery::new(dir.path())).unwrap())
    });
}

fn bench_scan(c: &mut Criterion) {
    let dir = TempDir::new().unwrap();
    let src = dir.path().join("src");
    fs::create_dir_all(&src).unwrap();
    for i in 0..200 {
        fs::write(
            src.join(format!("Page{}.jsx", i)),
            format!(
                "export function Page{i}() {{\n  const title = t('pages.page{i}.title');\n  return (\n    <section>\n      <h2>Welcome to page {i}</h2>\n      <input placeholder=\"Search the catalogue\" />\n      <p>{{title}}</p>\n    </section>\n  );\n}}\n"
            ),
        )
        .unwrap();
    }

    let descriptor = descriptor_by_id("react").unwrap();
    let config = AuditConfig::default();
    let scanner = Scanner::new(dir.path(), descriptor, &config).unwrap();

    let mut group = c.benchmark_group("scan_200_files");
    group.bench_function("sequential", |b| b.iter(|| scanner.scan()));
    group.bench_function("parallel", |b| b.iter(|| scanner.scan_parallel().unwrap()));
    group.finish();
}

criterion_group!(benches, bench_flatten, bench_diff, bench_check_project, bench_scan);
criterion_main!(benches);
