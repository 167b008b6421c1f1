//! Wire shapes of the remote catalog.
//!
//! Only the fields the core reads are declared; everything else in a response
//! is ignored. A missing required field surfaces as a deserialization error,
//! which the callers map to [`crate::error::PokedexError::MalformedPayload`].

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Named {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Locator {
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NamedLocator {
    #[serde(default)]
    pub name: Option<String>,
    pub url: String,
}

// ------------- Listings -------------
#[derive(Debug, Deserialize)]
pub struct CollectionPage {
    pub results: Vec<NamedLocator>,
}

#[derive(Debug, Deserialize)]
pub struct TypeMembers {
    pub pokemon: Vec<TypeMember>,
}

#[derive(Debug, Deserialize)]
pub struct TypeMember {
    pub pokemon: NamedLocator,
}

// ------------- Entity -------------
#[derive(Debug, Deserialize)]
pub struct RawEntity {
    pub id: u64,
    pub name: String,
    pub types: Vec<RawTypeSlot>,
    pub sprites: RawSprites,
    pub stats: Vec<RawStat>,
    pub species: Locator,
}

#[derive(Debug, Deserialize)]
pub struct RawTypeSlot {
    #[serde(rename = "type")]
    pub category: Named,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawSprites {
    #[serde(default)]
    pub front_default: Option<String>,
    #[serde(default)]
    pub other: Option<RawOtherSprites>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawOtherSprites {
    #[serde(rename = "official-artwork", default)]
    pub official_artwork: Option<RawArtwork>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawArtwork {
    #[serde(default)]
    pub front_default: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RawStat {
    pub base_stat: i64,
    pub stat: Named,
}

// ------------- Species -------------
#[derive(Debug, Deserialize)]
pub struct RawSpecies {
    #[serde(default)]
    pub flavor_text_entries: Vec<RawFlavorText>,
    pub evolution_chain: Option<Locator>,
}

#[derive(Debug, Deserialize)]
pub struct RawFlavorText {
    pub flavor_text: String,
    pub language: Named,
}

// ------------- Evolution -------------
#[derive(Debug, Deserialize)]
pub struct RawEvolutionChain {
    pub chain: RawChainLink,
}

#[derive(Debug, Deserialize)]
pub struct RawChainLink {
    pub species: NamedLocator,
    #[serde(default)]
    pub evolves_to: Vec<RawChainLink>,
}

// ------------- Damage relations -------------
#[derive(Debug, Deserialize)]
pub struct RawCategory {
    pub damage_relations: RawDamageRelations,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawDamageRelations {
    #[serde(default)]
    pub double_damage_to: Vec<Named>,
    #[serde(default)]
    pub double_damage_from: Vec<Named>,
}
