// used to (de)serialize constructs into cache entries
use serde::{Deserialize, Serialize};
// relation names keep their first-seen order but compare as sets
use indexmap::IndexSet;

use std::fmt;

// ------------- Identity -------------
pub type Identity = String;

/// Derives the identity from a locator, which is its final non-empty path segment.
/// `https://pokeapi.co/api/v2/pokemon/25/` yields `25`.
pub fn identity_from_locator(locator: &str) -> Option<Identity> {
    locator
        .split('/')
        .filter(|segment| !segment.is_empty())
        .next_back()
        .map(str::to_owned)
}

// ------------- EntityRef -------------
/// A lightweight reference as handed out by catalog and membership listings.
/// References are never cached themselves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityRef {
    identity: Identity,
    locator: String,
}
impl EntityRef {
    pub fn new(identity: Identity, locator: String) -> Self {
        Self { identity, locator }
    }
    /// Builds a reference whose identity is taken from the locator itself.
    pub fn from_locator(locator: &str) -> Option<Self> {
        identity_from_locator(locator).map(|identity| Self::new(identity, locator.to_owned()))
    }
    pub fn identity(&self) -> &str {
        &self.identity
    }
    pub fn locator(&self) -> &str {
        &self.locator
    }
}

// ------------- Stat -------------
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stat {
    stat_name: String,
    value: i64,
}
impl Stat {
    pub fn new(stat_name: String, value: i64) -> Self {
        Self { stat_name, value }
    }
    pub fn stat_name(&self) -> &str {
        &self.stat_name
    }
    pub fn value(&self) -> i64 {
        self.value
    }
    /// Short display label, e.g. `special-attack` becomes `Sp. Atk`.
    pub fn label(&self) -> String {
        stat_label(&self.stat_name)
    }
}

pub fn stat_label(name: &str) -> String {
    name.replacen("special-", "Sp. ", 1)
        .replacen("attack", "Atk", 1)
        .replacen("defense", "Def", 1)
        .replacen("hp", "Hp", 1)
        .replacen("speed", "Speed", 1)
}

// ------------- EntityDetail -------------
/// The compact display model of one creature.
///
/// The session list and the cache entry each own their own copy; both are
/// structurally equal but never shared. Fields are only exposed through
/// getters, which keeps a detail immutable once normalized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityDetail {
    identity: Identity,
    name: String,
    categories: Vec<String>,
    image_url: String,
    stat_block: Vec<Stat>,
    species_locator: String,
}
impl EntityDetail {
    pub fn new(
        identity: Identity,
        name: String,
        categories: Vec<String>,
        image_url: String,
        stat_block: Vec<Stat>,
        species_locator: String,
    ) -> Self {
        Self {
            identity,
            name,
            categories,
            image_url,
            stat_block,
            species_locator,
        }
    }
    pub fn identity(&self) -> &str {
        &self.identity
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn categories(&self) -> &[String] {
        &self.categories
    }
    /// The first category, which drives the card color.
    pub fn primary_category(&self) -> Option<&str> {
        self.categories.first().map(String::as_str)
    }
    pub fn image_url(&self) -> &str {
        &self.image_url
    }
    pub fn stat_block(&self) -> &[Stat] {
        &self.stat_block
    }
    pub fn species_locator(&self) -> &str {
        &self.species_locator
    }
}
impl fmt::Display for EntityDetail {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "#{} {} [{}]", self.identity, self.name, self.categories.join(", "))
    }
}

// ------------- Lineage -------------
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineageNode {
    pub identity: Identity,
    pub name: String,
    pub image_url: String,
}

/// One linear path through an evolution graph, root first.
pub type LineageChain = Vec<LineageNode>;

// ------------- Relations -------------
/// Deduplicated category names an entity is strong or weak against.
///
/// Equality ignores order, iteration yields names in the order they were first seen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationSet {
    pub strong: IndexSet<String>,
    pub weak: IndexSet<String>,
}
impl RelationSet {
    pub fn new() -> Self {
        Self::default()
    }
}

// ------------- CacheKey -------------
/// Namespaced key of a cache entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey<'a> {
    Detail(&'a str),
    Lineage(&'a str),
    Relations(&'a str),
}
impl fmt::Display for CacheKey<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CacheKey::Detail(id) => write!(f, "detail:{id}"),
            CacheKey::Lineage(id) => write!(f, "lineage:{id}"),
            CacheKey::Relations(id) => write!(f, "relations:{id}"),
        }
    }
}
