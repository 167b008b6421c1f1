use std::collections::HashSet;
use std::sync::Arc;
use seahash::SeaHasher;
use core::hash::BuildHasherDefault;
use tracing::{debug, warn};

use crate::error::{PokedexError, Result};
use crate::model::{CacheKey, EntityDetail, Identity, LineageChain, LineageNode, identity_from_locator};
use crate::payload::{RawChainLink, RawEvolutionChain, RawSpecies};
use crate::persist::{KeyValueCache, recall, remember};
use crate::remote::{Remote, fetch};

pub type IdentityHasher = BuildHasherDefault<SeaHasher>;

pub const DEFAULT_ARTWORK_URL: &str =
    "https://raw.githubusercontent.com/PokeAPI/sprites/master/sprites/pokemon/other/official-artwork/{id}.png";
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// Image url of an identity, following the hosted artwork naming convention.
pub fn artwork_url(template: &str, identity: &str) -> String {
    template.replace("{id}", identity)
}

/// Linearizes an evolution graph into the chain shown for an entity.
pub struct LineageFlattener {
    remote: Arc<dyn Remote>,
    cache: Arc<dyn KeyValueCache>,
    artwork_template: String,
    max_depth: usize,
}
impl LineageFlattener {
    pub fn new(remote: Arc<dyn Remote>, cache: Arc<dyn KeyValueCache>) -> Self {
        Self {
            remote,
            cache,
            artwork_template: DEFAULT_ARTWORK_URL.to_owned(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
    pub fn with_artwork_template(mut self, template: impl Into<String>) -> Self {
        self.artwork_template = template.into();
        self
    }
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth.max(1);
        self
    }
    /// Species, then evolution chain, then the walk. Cached per requested
    /// entity under `lineage:<identity>`; a hit makes no requests.
    pub async fn flatten(&self, detail: &EntityDetail) -> Result<LineageChain> {
        let key = CacheKey::Lineage(detail.identity());
        if let Some(chain) = recall::<LineageChain>(self.cache.as_ref(), &key) {
            return Ok(chain);
        }
        let species: RawSpecies = fetch(self.remote.as_ref(), detail.species_locator()).await?;
        let evolution = species.evolution_chain.ok_or_else(|| {
            PokedexError::malformed(format!("species of '{}' has no evolution chain", detail.name()))
        })?;
        let graph: RawEvolutionChain = fetch(self.remote.as_ref(), &evolution.url).await?;
        let chain = self.walk(&graph.chain)?;
        debug!(identity = detail.identity(), stages = chain.len(), "lineage flattened");
        remember(self.cache.as_ref(), &key, &chain);
        Ok(chain)
    }
    /// Follows only the first child of every node, so sibling branches are
    /// dropped. Stops at a leaf, at an identity seen before, or at the depth cap.
    pub fn walk(&self, root: &RawChainLink) -> Result<LineageChain> {
        let mut chain = LineageChain::new();
        let mut visited: HashSet<Identity, IdentityHasher> = HashSet::default();
        let mut current = Some(root);
        while let Some(link) = current {
            let identity = identity_from_locator(&link.species.url).ok_or_else(|| {
                PokedexError::malformed(format!("species locator '{}' has no identity", link.species.url))
            })?;
            if !visited.insert(identity.clone()) {
                warn!(%identity, "evolution graph revisits a species, walk stopped");
                break;
            }
            if chain.len() == self.max_depth {
                warn!(max_depth = self.max_depth, "evolution graph deeper than allowed, walk stopped");
                break;
            }
            chain.push(LineageNode {
                image_url: artwork_url(&self.artwork_template, &identity),
                name: link.species.name.clone().unwrap_or_default(),
                identity,
            });
            current = link.evolves_to.first();
        }
        Ok(chain)
    }
}
