mod common;

use std::sync::Arc;

use common::*;
use pokedex::error::PokedexError;
use pokedex::normalize::normalize;
use pokedex::persist::SqliteCache;
use pokedex::relations::RelationAggregator;

fn seed_fire_and_flying(remote: &StubRemote) {
    seed_category(remote, "fire", &[], &["grass", "ice", "bug", "steel"], &["water", "ground", "rock"]);
    seed_category(remote, "flying", &[], &["grass", "fighting", "bug"], &["electric", "ice", "rock"]);
}

#[tokio::test]
async fn union_is_deduplicated() {
    let remote = StubRemote::new();
    seed_category(&remote, "fire", &[], &["grass"], &[]);
    seed_category(&remote, "flying", &[], &["grass", "bug"], &[]);
    let aggregator = RelationAggregator::new(remote.clone(), Arc::new(SqliteCache::in_memory().unwrap()));

    let charizard = normalize(&entity_payload(6, &["fire", "flying"])).unwrap();
    let relations = aggregator.aggregate(&charizard).await.unwrap();
    let strong: Vec<&str> = relations.strong.iter().map(String::as_str).collect();
    assert_eq!(strong, ["grass", "bug"]);
    assert!(relations.weak.is_empty());
}

#[tokio::test]
async fn second_aggregation_is_a_cache_hit_with_the_same_result() {
    let remote = StubRemote::new();
    seed_fire_and_flying(&remote);
    let cache = Arc::new(SqliteCache::in_memory().unwrap());
    let charizard = normalize(&entity_payload(6, &["fire", "flying"])).unwrap();

    let first = RelationAggregator::new(remote.clone(), cache.clone())
        .aggregate(&charizard)
        .await
        .unwrap();
    assert_eq!(remote.calls(), 2);
    let second = RelationAggregator::new(remote.clone(), cache)
        .aggregate(&charizard)
        .await
        .unwrap();
    assert_eq!(remote.calls(), 2);
    assert_eq!(first, second);
    // rendering order survives the cache round trip
    assert!(first.strong.iter().eq(second.strong.iter()));
    assert_eq!(first.weak.len(), 5);
}

#[tokio::test]
async fn category_order_does_not_change_membership() {
    let remote = StubRemote::new();
    seed_fire_and_flying(&remote);
    let aggregator = RelationAggregator::new(remote.clone(), Arc::new(SqliteCache::in_memory().unwrap()));

    let forward = aggregator
        .aggregate_categories(&["fire".into(), "flying".into()])
        .await
        .unwrap();
    let backward = aggregator
        .aggregate_categories(&["flying".into(), "fire".into()])
        .await
        .unwrap();
    assert_eq!(forward, backward);
    // only the first-seen order differs
    assert_eq!(forward.strong.first().map(String::as_str), Some("grass"));
    assert_eq!(backward.weak.first().map(String::as_str), Some("electric"));
}

#[tokio::test]
async fn one_failed_category_fails_the_aggregation() {
    let remote = StubRemote::new();
    seed_category(&remote, "fire", &[], &["grass"], &[]);
    remote.fail(category_url("flying"));
    let cache = Arc::new(SqliteCache::in_memory().unwrap());
    let aggregator = RelationAggregator::new(remote.clone(), cache.clone());

    let charizard = normalize(&entity_payload(6, &["fire", "flying"])).unwrap();
    let err = aggregator.aggregate(&charizard).await.unwrap_err();
    assert!(matches!(err, PokedexError::Network(_)));
    assert!(cache.is_empty().unwrap());
}

#[tokio::test]
async fn categories_are_fetched_concurrently() {
    let remote = StubRemote::new();
    seed_fire_and_flying(&remote);
    let aggregator = RelationAggregator::new(remote.clone(), Arc::new(SqliteCache::in_memory().unwrap()));

    let charizard = normalize(&entity_payload(6, &["fire", "flying"])).unwrap();
    aggregator.aggregate(&charizard).await.unwrap();
    assert_eq!(remote.peak_in_flight(), 2);
}
