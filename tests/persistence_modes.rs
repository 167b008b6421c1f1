use pokedex::model::{CacheKey, LineageNode};
use pokedex::persist::{KeyValueCache, PersistenceMode, SqliteCache, recall, remember};

#[test]
fn in_memory_mode_allows_basic_operations() {
    let cache = SqliteCache::new(PersistenceMode::InMemory, None).expect("cache");
    assert_eq!(cache.get("detail:1"), None);
    cache.set("detail:1", "{}").unwrap();
    assert_eq!(cache.get("detail:1").as_deref(), Some("{}"));
    assert_eq!(cache.len().unwrap(), 1);
}

#[test]
fn file_mode_survives_reopening() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("pokedex_cache.db").to_string_lossy().into_owned();
    let chain = vec![
        LineageNode { identity: "1".into(), name: "bulbasaur".into(), image_url: "1.png".into() },
        LineageNode { identity: "2".into(), name: "ivysaur".into(), image_url: "2.png".into() },
    ];
    {
        let cache = SqliteCache::new(PersistenceMode::File(path.clone()), None).expect("cache");
        assert!(remember(&cache, &CacheKey::Lineage("1"), &chain));
    }
    let cache = SqliteCache::new(PersistenceMode::File(path), None).expect("reopened cache");
    let restored: Vec<LineageNode> = recall(&cache, &CacheKey::Lineage("1")).expect("entry persisted");
    assert_eq!(restored, chain);
}

#[test]
fn keys_are_namespaced() {
    assert_eq!(CacheKey::Detail("25").to_string(), "detail:25");
    assert_eq!(CacheKey::Lineage("25").to_string(), "lineage:25");
    assert_eq!(CacheKey::Relations("25").to_string(), "relations:25");
}
