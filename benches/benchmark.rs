use criterion::{black_box, criterion_group, criterion_main, Criterion};
use serde_json::{json, Value};

use pokedex::normalize::normalize;
use pokedex::payload::RawDamageRelations;
use pokedex::relations::merge_relations;

fn entity(id: u64) -> Value {
    json!({
        "id": id,
        "name": format!("mon-{id}"),
        "types": [{"slot": 1, "type": {"name": "fire"}}, {"slot": 2, "type": {"name": "flying"}}],
        "sprites": {"front_default": null, "other": {"official-artwork": {"front_default": "art.png"}}},
        "stats": [
            {"base_stat": 78, "stat": {"name": "hp"}},
            {"base_stat": 84, "stat": {"name": "attack"}},
            {"base_stat": 78, "stat": {"name": "defense"}},
            {"base_stat": 109, "stat": {"name": "special-attack"}},
            {"base_stat": 85, "stat": {"name": "special-defense"}},
            {"base_stat": 100, "stat": {"name": "speed"}}
        ],
        "species": {"url": format!("https://pokeapi.co/api/v2/pokemon-species/{id}/")}
    })
}

fn relations(strong: &[&str], weak: &[&str]) -> RawDamageRelations {
    let named = |names: &[&str]| json!(names.iter().map(|n| json!({"name": n})).collect::<Vec<_>>());
    serde_json::from_value(json!({
        "double_damage_to": named(strong),
        "double_damage_from": named(weak)
    }))
    .unwrap()
}

fn bench_normalize(c: &mut Criterion) {
    let page: Vec<Value> = (1..=30).map(entity).collect();
    c.bench_function("normalize page of 30", |b| {
        b.iter(|| {
            for raw in &page {
                black_box(normalize(black_box(raw)).unwrap());
            }
        })
    });
}

fn bench_merge(c: &mut Criterion) {
    let fire = relations(&["grass", "ice", "bug", "steel"], &["water", "ground", "rock"]);
    let flying = relations(&["grass", "fighting", "bug"], &["electric", "ice", "rock"]);
    c.bench_function("merge two categories", |b| {
        b.iter(|| black_box(merge_relations([&fire, &flying])))
    });
}

criterion_group!(benches, bench_normalize, bench_merge);
criterion_main!(benches);
