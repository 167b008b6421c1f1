#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::{Value, json};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use pokedex::browser::Browser;
use pokedex::error::{PokedexError, Result};
use pokedex::persist::SqliteCache;
use pokedex::remote::Remote;
use pokedex::settings::Settings;
use pokedex::view::ViewRecorder;

pub const BASE: &str = "https://stub.test/api/v2";

/// In-memory stand-in for the remote catalog that counts every request.
/// Each request yields once before answering, so concurrent callers interleave,
/// and the highest number of requests pending at once is recorded.
#[derive(Default)]
pub struct StubRemote {
    responses: Mutex<HashMap<String, Value>>,
    failing: Mutex<HashSet<String>>,
    calls: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}
impl StubRemote {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }
    pub fn insert(&self, url: impl Into<String>, value: Value) {
        self.responses.lock().unwrap().insert(url.into(), value);
    }
    pub fn fail(&self, url: impl Into<String>) {
        self.failing.lock().unwrap().insert(url.into());
    }
    pub fn heal(&self, url: &str) {
        self.failing.lock().unwrap().remove(url);
    }
    pub fn calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
    pub fn calls_to(&self, url: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|called| called.as_str() == url).count()
    }
    /// Most requests that were pending at the same time since the last reset.
    pub fn peak_in_flight(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
    pub fn reset_peak(&self) {
        self.peak.store(0, Ordering::SeqCst);
    }
}

#[async_trait]
impl Remote for StubRemote {
    async fn get_json(&self, url: &str) -> Result<Value> {
        let pending = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(pending, Ordering::SeqCst);
        tokio::task::yield_now().await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.calls.lock().unwrap().push(url.to_owned());
        if self.failing.lock().unwrap().contains(url) {
            return Err(PokedexError::Network(format!("{url}: connection reset")));
        }
        self.responses
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .ok_or_else(|| PokedexError::Network(format!("{url}: HTTP 404 Not Found")))
    }
    fn base_url(&self) -> &str {
        BASE
    }
}

// ------------- Urls -------------
pub fn entity_url(id: u64) -> String {
    format!("{BASE}/pokemon/{id}/")
}
pub fn species_url(id: u64) -> String {
    format!("{BASE}/pokemon-species/{id}/")
}
pub fn chain_url(id: u64) -> String {
    format!("{BASE}/evolution-chain/{id}/")
}
pub fn collection_url(limit: usize, offset: usize) -> String {
    format!("{BASE}/pokemon?limit={limit}&offset={offset}")
}
pub fn category_url(name: &str) -> String {
    format!("{BASE}/type/{name}")
}

// ------------- Payloads -------------
pub fn name_of(id: u64) -> String {
    format!("mon-{id}")
}

pub fn entity_payload(id: u64, types: &[&str]) -> Value {
    let types: Vec<Value> = types
        .iter()
        .enumerate()
        .map(|(slot, name)| json!({"slot": slot + 1, "type": {"name": name, "url": category_url(name)}}))
        .collect();
    json!({
        "id": id,
        "name": name_of(id),
        "types": types,
        "sprites": {
            "front_default": format!("https://img.test/sprite/{id}.png"),
            "other": {"official-artwork": {"front_default": format!("https://img.test/art/{id}.png")}}
        },
        "stats": [
            {"base_stat": 45, "effort": 0, "stat": {"name": "hp", "url": ""}},
            {"base_stat": 49, "effort": 0, "stat": {"name": "attack", "url": ""}},
            {"base_stat": 65, "effort": 1, "stat": {"name": "special-attack", "url": ""}}
        ],
        "species": {"name": name_of(id), "url": species_url(id)}
    })
}

pub fn listing(ids: &[u64]) -> Value {
    let results: Vec<Value> = ids
        .iter()
        .map(|id| json!({"name": name_of(*id), "url": entity_url(*id)}))
        .collect();
    json!({"count": 1000, "next": null, "previous": null, "results": results})
}

/// Registers entities `ids` with the given types.
pub fn seed_entities(remote: &StubRemote, ids: impl IntoIterator<Item = u64>, types: &[&str]) {
    for id in ids {
        remote.insert(entity_url(id), entity_payload(id, types));
    }
}

/// Registers catalog pages of `page_size` covering entities `1..=total`,
/// all typed `normal`.
pub fn seed_catalog(remote: &StubRemote, total: u64, page_size: usize) {
    seed_entities(remote, 1..=total, &["normal"]);
    let ids: Vec<u64> = (1..=total).collect();
    let mut offset = 0;
    while offset <= ids.len() {
        let end = (offset + page_size).min(ids.len());
        remote.insert(collection_url(page_size, offset), listing(&ids[offset..end]));
        offset += page_size;
    }
}

pub fn category_payload(members: &[u64], strong: &[&str], weak: &[&str]) -> Value {
    let pokemon: Vec<Value> = members
        .iter()
        .map(|id| json!({"slot": 1, "pokemon": {"name": name_of(*id), "url": entity_url(*id)}}))
        .collect();
    let named = |names: &[&str]| -> Vec<Value> {
        names.iter().map(|name| json!({"name": name, "url": category_url(name)})).collect()
    };
    json!({
        "pokemon": pokemon,
        "damage_relations": {
            "double_damage_to": named(strong),
            "double_damage_from": named(weak),
            "half_damage_to": [],
            "half_damage_from": [],
            "no_damage_to": [],
            "no_damage_from": []
        }
    })
}

pub fn seed_category(remote: &StubRemote, name: &str, members: &[u64], strong: &[&str], weak: &[&str]) {
    remote.insert(category_url(name), category_payload(members, strong, weak));
}

pub fn species_payload(chain: u64, english: Option<&str>) -> Value {
    let mut entries = vec![json!({"flavor_text": "Un texte.", "language": {"name": "fr"}})];
    if let Some(text) = english {
        entries.push(json!({"flavor_text": text, "language": {"name": "en"}}));
    }
    json!({
        "flavor_text_entries": entries,
        "evolution_chain": {"url": chain_url(chain)}
    })
}

/// A chain link; `children` become `evolves_to` in order.
pub fn link(id: u64, children: Vec<Value>) -> Value {
    json!({
        "is_baby": false,
        "species": {"name": name_of(id), "url": species_url(id)},
        "evolves_to": children
    })
}

pub fn seed_lineage(remote: &StubRemote, entity: u64, chain: u64, root: Value) {
    remote.insert(species_url(entity), species_payload(chain, Some("A strange seed was\nplanted on its\u{c}back at birth.")));
    remote.insert(chain_url(chain), json!({"id": chain, "chain": root}));
}

// ------------- Browser -------------
pub struct Harness {
    pub remote: Arc<StubRemote>,
    pub cache: Arc<SqliteCache>,
    pub view: Arc<ViewRecorder>,
    pub browser: Browser,
}

pub fn settings(page_size: usize) -> Settings {
    let mut settings = Settings::defaults().unwrap();
    settings.page_size = page_size;
    settings
}

pub fn harness(remote: Arc<StubRemote>, page_size: usize) -> Harness {
    let cache = Arc::new(SqliteCache::in_memory().unwrap());
    let view = Arc::new(ViewRecorder::new());
    let browser = Browser::new(remote.clone(), cache.clone(), view.clone(), &settings(page_size)).unwrap();
    Harness { remote, cache, view, browser }
}
