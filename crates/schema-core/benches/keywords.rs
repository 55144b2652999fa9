use criterion::{black_box, criterion_group, criterion_main, Criterion};
use schema_core::Validator;
use serde_json::json;

fn flat_object_schema() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "name": {"type": "string", "minLength": 1, "maxLength": 64},
            "age": {"type": "integer", "minimum": 0, "maximum": 150},
            "email": {"type": "string", "format": "email"},
            "tags": {"type": "array", "items": {"type": "string"}, "uniqueItems": true}
        },
        "required": ["name", "age"]
    })
}

fn recursive_schema() -> serde_json::Value {
    json!({
        "$id": "https://example.com/category",
        "type": "object",
        "properties": {
            "name": {"type": "string"},
            "children": {"type": "array", "items": {"$ref": "#"}}
        },
        "required": ["name"]
    })
}

fn bench_flat_object(c: &mut Criterion) {
    let validator = Validator::for_schema(&flat_object_schema()).unwrap();
    let instance = json!({
        "name": "Ada Lovelace",
        "age": 36,
        "email": "ada@example.com",
        "tags": ["mathematician", "writer"]
    });
    c.bench_function("flat_object/valid", |b| {
        b.iter(|| black_box(validator.is_valid(black_box(&instance))));
    });
}

fn bench_recursive(c: &mut Criterion) {
    let validator = Validator::for_schema(&recursive_schema()).unwrap();
    let instance = json!({
        "name": "root",
        "children": [
            {"name": "a", "children": []},
            {"name": "b", "children": [{"name": "c", "children": []}]}
        ]
    });
    c.bench_function("recursive_ref/valid", |b| {
        b.iter(|| black_box(validator.is_valid(black_box(&instance))));
    });
}

fn bench_compile(c: &mut Criterion) {
    let schema = flat_object_schema();
    c.bench_function("compile/flat_object", |b| {
        b.iter(|| black_box(Validator::for_schema(black_box(&schema)).unwrap()));
    });
}

criterion_group!(benches, bench_flat_object, bench_recursive, bench_compile);
criterion_main!(benches);
