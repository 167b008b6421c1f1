//! Pokedex – an incremental, cache-backed browser for a remote creature catalog.
//!
//! The catalog is far too large to load at once, and every creature hangs off
//! several sub-resources (species description, evolution chain, type damage
//! relations). This crate is the acquisition pipeline behind a browsing UI:
//! * [`paginate`] – offset pages over the whole catalog or over one category,
//!   with at most one page in flight per stream.
//! * [`fetch`] – cache-or-network resolution of a single creature.
//! * [`normalize`] – raw payload → compact [`model::EntityDetail`].
//! * [`lineage`] – an evolution graph flattened to the path of first children.
//! * [`relations`] – the strong/weak category names of a creature, deduplicated.
//! * [`persist`] – the SQLite backed key/value cache all of the above share.
//!
//! ## Cache
//! Entries are keyed `detail:<id>`, `lineage:<id>` and `relations:<id>` and
//! hold JSON text. They are written once and never expire. Writes are best
//! effort: a full cache slows things down but never fails an operation.
//!
//! ## Rendering
//! Nothing here draws. The [`browser::Browser`] hands batches, details,
//! lineages and relation sets to a [`view::Renderer`]; the bundled
//! [`view::ViewRecorder`] keeps them as a snapshot that [`server`] serves as JSON.
//!
//! ## Quick Start
//! ```no_run
//! use std::sync::Arc;
//! use pokedex::{browser::Browser, persist::SqliteCache, remote::HttpRemote, settings::Settings, view::ViewRecorder};
//! # async fn run() -> pokedex::error::Result<()> {
//! let settings = Settings::defaults()?;
//! let cache = Arc::new(SqliteCache::in_memory()?);
//! let remote = Arc::new(HttpRemote::new(settings.base_url.clone()));
//! let view = Arc::new(ViewRecorder::new());
//! let browser = Browser::new(remote, cache, view.clone(), &settings)?;
//! browser.load_more().await?;
//! assert_eq!(view.snapshot().cards.len(), settings.page_size);
//! # Ok(())
//! # }
//! ```

pub mod browser;
pub mod error;
pub mod fetch;
pub mod lineage;
pub mod model;
pub mod normalize;
pub mod paginate;
pub mod payload;
pub mod persist;
pub mod relations;
pub mod remote;
pub mod server;
pub mod settings;
pub mod species;
pub mod view;
