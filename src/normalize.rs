use serde::Deserialize;
use serde_json::Value;

use crate::error::{PokedexError, Result};
use crate::model::{EntityDetail, Stat};
use crate::payload::RawEntity;

/// Maps a raw entity payload onto the compact display model. Performs no I/O.
///
/// The official artwork is preferred and the default sprite is the fallback.
/// When neither exists the image url is left empty rather than failing the
/// entity (and with it the whole page).
pub fn normalize(raw: &Value) -> Result<EntityDetail> {
    let entity = RawEntity::deserialize(raw)
        .map_err(|e| PokedexError::malformed(format!("entity payload: {e}")))?;
    if entity.types.is_empty() {
        return Err(PokedexError::malformed(format!(
            "entity '{}' has no categories",
            entity.name
        )));
    }
    let artwork = entity
        .sprites
        .other
        .and_then(|other| other.official_artwork)
        .and_then(|artwork| artwork.front_default);
    let image_url = artwork
        .or(entity.sprites.front_default)
        .unwrap_or_default();
    Ok(EntityDetail::new(
        entity.id.to_string(),
        entity.name,
        entity.types.into_iter().map(|slot| slot.category.name).collect(),
        image_url,
        entity
            .stats
            .into_iter()
            .map(|s| Stat::new(s.stat.name, s.base_stat))
            .collect(),
        entity.species.url,
    ))
}
