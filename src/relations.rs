use futures_util::future::try_join_all;
use std::sync::Arc;
use tracing::debug;

use crate::error::Result;
use crate::model::{CacheKey, EntityDetail, RelationSet};
use crate::payload::{RawCategory, RawDamageRelations};
use crate::persist::{KeyValueCache, recall, remember};
use crate::remote::{Remote, fetch};

/// Unions the double damage edges of several categories.
///
/// `double_damage_to` names go into `strong`, `double_damage_from` names into
/// `weak`. Half, zero and stacked multipliers are deliberately not modelled.
pub fn merge_relations<'a>(relations: impl IntoIterator<Item = &'a RawDamageRelations>) -> RelationSet {
    let mut merged = RelationSet::new();
    for relation in relations {
        merged
            .strong
            .extend(relation.double_damage_to.iter().map(|named| named.name.clone()));
        merged
            .weak
            .extend(relation.double_damage_from.iter().map(|named| named.name.clone()));
    }
    merged
}

pub struct RelationAggregator {
    remote: Arc<dyn Remote>,
    cache: Arc<dyn KeyValueCache>,
}
impl RelationAggregator {
    pub fn new(remote: Arc<dyn Remote>, cache: Arc<dyn KeyValueCache>) -> Self {
        Self { remote, cache }
    }
    /// Aggregates the relations of every category of `detail`, fetched
    /// concurrently and cached under `relations:<identity>`.
    pub async fn aggregate(&self, detail: &EntityDetail) -> Result<RelationSet> {
        let key = CacheKey::Relations(detail.identity());
        if let Some(relations) = recall::<RelationSet>(self.cache.as_ref(), &key) {
            return Ok(relations);
        }
        let relations = self.aggregate_categories(detail.categories()).await?;
        remember(self.cache.as_ref(), &key, &relations);
        Ok(relations)
    }
    /// Uncached aggregation over an arbitrary list of categories.
    pub async fn aggregate_categories(&self, categories: &[String]) -> Result<RelationSet> {
        let fetched: Vec<RawCategory> = try_join_all(categories.iter().map(|category| {
            let url = self.remote.category_url(category);
            async move { fetch::<RawCategory>(self.remote.as_ref(), &url).await }
        }))
        .await?;
        let merged = merge_relations(fetched.iter().map(|category| &category.damage_relations));
        debug!(?categories, strong = merged.strong.len(), weak = merged.weak.len(), "relations merged");
        Ok(merged)
    }
}
