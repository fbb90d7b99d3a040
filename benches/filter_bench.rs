use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use funed::models::Curso;
use funed::resource::{Filter, ResourceStore};

const TYPES: [&str; 5] = ["Técnico", "Corto", "Curso corto", "Diplomado", "Seminario"];

fn cursos(count: usize) -> Vec<Curso> {
    (0..count)
        .map(|i| Curso {
            id: i as i64 + 1,
            nombre_curso: format!("Curso {} de maquillaje", i),
            duracion: 20 + (i % 100) as i64,
            temario: format!("Módulo {}; Colorimetría; Práctica", i % 7),
            tipo_curso: TYPES[i % TYPES.len()].to_string(),
        })
        .collect()
}

fn bench_filter_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("filter_search");

    for size in [100, 1000, 10000].iter() {
        let items = cursos(*size);
        let filter = Filter::new("colorimetría", "todos");

        group.bench_with_input(BenchmarkId::from_parameter(size), &items, |b, items| {
            b.iter(|| filter.apply(black_box(items)).len());
        });
    }
    group.finish();
}

fn bench_filter_search_and_category(c: &mut Criterion) {
    let mut group = c.benchmark_group("filter_search_and_category");

    for size in [100, 1000, 10000].iter() {
        let items = cursos(*size);
        let filter = Filter::new("maquillaje", "Diplomado");

        group.bench_with_input(BenchmarkId::from_parameter(size), &items, |b, items| {
            b.iter(|| filter.apply(black_box(items)).len());
        });
    }
    group.finish();
}

fn bench_categories(c: &mut Criterion) {
    let store = ResourceStore::with_items(cursos(10000));

    c.bench_function("store_categories_10000", |b| {
        b.iter(|| black_box(&store).categories())
    });
}

criterion_group!(
    benches,
    bench_filter_search,
    bench_filter_search_and_category,
    bench_categories
);
criterion_main!(benches);
