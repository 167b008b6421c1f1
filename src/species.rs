use lazy_static::lazy_static;
use regex::Regex;
use tracing::warn;

use crate::payload::RawSpecies;
use crate::remote::{Remote, fetch};

pub const DESCRIPTION_PENDING: &str = "Loading description...";
pub const NO_DESCRIPTION: &str = "No description available.";
pub const DESCRIPTION_FAILED: &str = "Could not load description.";

lazy_static! {
    // flavor texts carry form feeds and hard line breaks from the game cartridges
    static ref LAYOUT_WHITESPACE: Regex = Regex::new(r"[\f\s]+").unwrap();
}

/// Picks the first English flavor text of a species.
pub fn english_flavor_text(species: &RawSpecies) -> Option<String> {
    species
        .flavor_text_entries
        .iter()
        .find(|entry| entry.language.name == "en")
        .map(|entry| LAYOUT_WHITESPACE.replace_all(entry.flavor_text.trim(), " ").into_owned())
}

/// The description shown next to a detail. Never fails: a missing English
/// entry and a failed fetch each have their own placeholder text.
pub async fn describe(remote: &dyn Remote, species_locator: &str) -> String {
    match fetch::<RawSpecies>(remote, species_locator).await {
        Ok(species) => english_flavor_text(&species).unwrap_or_else(|| NO_DESCRIPTION.to_owned()),
        Err(e) => {
            warn!(%species_locator, error = %e, "description unavailable");
            DESCRIPTION_FAILED.to_owned()
        }
    }
}
