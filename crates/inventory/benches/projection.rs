use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use consign_core::ItemId;
use consign_inventory::{
    project, InventoryItem, ItemStatus, NewItem, SearchDirective, SortDirection, SortDirective,
    SortField,
};

fn catalogue(size: usize) -> Vec<InventoryItem> {
    let consignors = ["Alice", "Bob", "Carol", "Dmitri", "Eve"];
    (0..size)
        .map(|i| {
            InventoryItem::restore(
                ItemId::new(),
                NewItem {
                    sku: format!("SKU-{:05}", (i * 7919) % size.max(1)),
                    name: format!("Item {i}"),
                    price: ((i * 37) % 500) as f64 + 0.99,
                    quantity: (i % 4) as i64,
                    consignor_name: consignors[i % consignors.len()].to_string(),
                },
                ItemStatus::ALL[i % 3],
                format!("2024-01-{:02}T10:00:00.000Z", (i % 28) + 1),
                None,
            )
        })
        .collect()
}

fn bench_project_sorted(c: &mut Criterion) {
    let mut group = c.benchmark_group("project_sorted");

    for size in [100usize, 1_000, 10_000] {
        let items = catalogue(size);
        group.throughput(Throughput::Elements(size as u64));

        for field in [SortField::Sku, SortField::Price, SortField::DateAdded] {
            group.bench_with_input(
                BenchmarkId::new(field.as_str(), size),
                &items,
                |b, items| {
                    let sort = SortDirective::by(field, SortDirection::Asc);
                    let search = SearchDirective::default();
                    b.iter(|| black_box(project(black_box(items), &search, sort)));
                },
            );
        }
    }

    group.finish();
}

fn bench_project_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("project_search");
    let items = catalogue(10_000);

    for needle in ["ali", "sku-0", "zzz"] {
        group.bench_with_input(BenchmarkId::from_parameter(needle), &items, |b, items| {
            let search = SearchDirective::new(needle);
            b.iter(|| black_box(project(black_box(items), &search, SortDirective::none())));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_project_sorted, bench_project_search);
criterion_main!(benches);
