//! Query and cursor performance benchmarks

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rationdb_core::{Document, QueryParser, SortOrder, Store};
use serde_json::json;
use std::sync::Arc;

const DISTRICTS: [&str; 4] = ["Pune", "Nashik", "Nagpur", "Thane"];

fn seeded_store(size: usize) -> Arc<Store> {
    let store = Arc::new(Store::new());
    let beneficiaries = store.collection("beneficiaries");
    for i in 0..size {
        let doc = Document::try_from(json!({
            "aadhaar_id": format!("A{}", i),
            "name": format!("Beneficiary {}", i),
            "risk_score": (i * 37 % 100) as i64,
            "card_type": if i % 3 == 0 { "BPL" } else { "APL" },
            "location": {"district": DISTRICTS[i % DISTRICTS.len()]}
        }));
        if let Ok(doc) = doc {
            beneficiaries.insert(doc);
        }
    }
    store
}

fn query(value: serde_json::Value) -> Document {
    Document::try_from(value).unwrap()
}

fn bench_query_operations(c: &mut Criterion) {
    let mut group = c.benchmark_group("query_operations");

    group.bench_function("parse_filter", |b| {
        let filter_doc = query(json!({
            "card_type": {"$in": ["BPL", "AAY"]},
            "risk_score": {"$gte": 70},
            "$or": [{"name": {"$regex": "kumar"}}, {"location.district": "Pune"}]
        }));
        b.iter(|| QueryParser::parse_filter(black_box(&filter_doc)).unwrap());
    });

    for size in [100usize, 1_000, 10_000] {
        let store = seeded_store(size);
        let beneficiaries = store.collection("beneficiaries");

        let by_id = query(json!({"aadhaar_id": format!("A{}", size / 2)}));
        group.bench_with_input(BenchmarkId::new("find_one", size), &by_id, |b, q| {
            b.iter(|| beneficiaries.find_one(black_box(q), None).unwrap());
        });

        let risky = query(json!({"risk_score": {"$gte": 70}, "card_type": "BPL"}));
        group.bench_with_input(BenchmarkId::new("count_documents", size), &risky, |b, q| {
            b.iter(|| beneficiaries.count_documents(black_box(q)).unwrap());
        });

        let search = query(json!({"name": {"$regex": "9"}}));
        group.bench_with_input(BenchmarkId::new("find_sorted", size), &search, |b, q| {
            b.iter(|| {
                beneficiaries
                    .find(black_box(q), None)
                    .unwrap()
                    .sort("risk_score", SortOrder::Descending)
                    .materialize(Some(20))
            });
        });
    }

    group.finish();
}

fn bench_write_operations(c: &mut Criterion) {
    let mut group = c.benchmark_group("write_operations");

    group.bench_function("insert", |b| {
        let store = Store::new();
        let transactions = store.collection("transactions");
        let doc = query(json!({"shop_id": "S1", "commodity": "rice", "quantity_kg": 5}));
        b.iter(|| transactions.insert(black_box(doc.clone())));
    });

    group.bench_function("update_one", |b| {
        let store = seeded_store(1_000);
        let beneficiaries = store.collection("beneficiaries");
        let filter = query(json!({"aadhaar_id": "A500"}));
        let update = query(json!({"$set": {"status": "flagged"}}));
        b.iter(|| beneficiaries.update_one(black_box(&filter), black_box(&update)).unwrap());
    });

    group.finish();
}

criterion_group!(benches, bench_query_operations, bench_write_operations);
criterion_main!(benches);
