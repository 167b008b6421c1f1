//! The browsing session: the list of entities discovered so far, the active
//! filter and the detail view, wired to a [`Renderer`].
//!
//! Filter changes cannot cancel a page that is already loading. Instead every
//! reset bumps a generation counter; a load captures the generation when it
//! starts and its results are dropped if the generation moved on meanwhile.
//! Whatever the stale load already wrote to the cache stays there, since
//! cache entries do not depend on the filter.

use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::fetch::DetailFetcher;
use crate::lineage::LineageFlattener;
use crate::model::EntityDetail;
use crate::paginate::{CatalogPaginator, LoadState, PageOutcome, TypeScopedPaginator};
use crate::persist::KeyValueCache;
use crate::relations::RelationAggregator;
use crate::remote::Remote;
use crate::settings::Settings;
use crate::species::{DESCRIPTION_PENDING, describe};
use crate::view::{DetailView, Renderer, Section};

/// Search queries shorter than this are not run.
pub const MIN_SEARCH_LEN: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Filter {
    All,
    Category(String),
}
impl Filter {
    /// `None` and `"all"` select the whole catalog.
    pub fn parse(category: Option<&str>) -> Self {
        match category.map(str::trim) {
            None | Some("") => Filter::All,
            Some(name) if name.eq_ignore_ascii_case("all") => Filter::All,
            Some(name) => Filter::Category(name.to_lowercase()),
        }
    }
}

/// What a load request amounted to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum LoadReport {
    Loaded { loaded: usize, total: usize, exhausted: bool },
    /// A page of the same stream was already loading.
    Busy,
    /// Nothing left to page through.
    Exhausted,
    /// The filter changed while loading; the page was dropped.
    Stale,
    /// The requested filter is already active.
    Unchanged,
}

/// Filter, generation and entries change together under one lock, so a
/// load can never commit into a session whose filter moved on.
#[derive(Debug)]
struct SessionState {
    entries: Vec<EntityDetail>,
    // None forces the next filter request to reload, see `reset`
    filter: Option<Filter>,
    generation: u64,
}

pub struct Browser {
    remote: Arc<dyn Remote>,
    catalog: CatalogPaginator,
    typed: TypeScopedPaginator,
    lineage: LineageFlattener,
    relations: RelationAggregator,
    renderer: Arc<dyn Renderer>,
    state: Mutex<SessionState>,
}

impl Browser {
    pub fn new(
        remote: Arc<dyn Remote>,
        cache: Arc<dyn KeyValueCache>,
        renderer: Arc<dyn Renderer>,
        settings: &Settings,
    ) -> Result<Self> {
        let fetcher = DetailFetcher::new(Arc::clone(&remote), Arc::clone(&cache));
        Ok(Self {
            catalog: CatalogPaginator::new(fetcher.clone(), settings.page_size)?,
            typed: TypeScopedPaginator::new(fetcher, settings.page_size)?,
            lineage: LineageFlattener::new(Arc::clone(&remote), Arc::clone(&cache))
                .with_artwork_template(settings.artwork_url.clone())
                .with_max_depth(settings.max_lineage_depth),
            relations: RelationAggregator::new(Arc::clone(&remote), cache),
            remote,
            renderer,
            state: Mutex::new(SessionState {
                entries: Vec::new(),
                filter: Some(Filter::All),
                generation: 0,
            }),
        })
    }

    pub fn session(&self) -> Result<Vec<EntityDetail>> {
        Ok(self.state.lock()?.entries.clone())
    }
    pub fn session_len(&self) -> Result<usize> {
        Ok(self.state.lock()?.entries.len())
    }
    pub fn filter(&self) -> Result<Filter> {
        Ok(self.state.lock()?.filter.clone().unwrap_or(Filter::All))
    }
    pub fn generation(&self) -> Result<u64> {
        Ok(self.state.lock()?.generation)
    }
    pub fn catalog(&self) -> &CatalogPaginator {
        &self.catalog
    }
    pub fn typed(&self) -> &TypeScopedPaginator {
        &self.typed
    }

    /// Loads the next page of whatever the active filter selects.
    ///
    /// A failed page leaves the session list and the cursor as they were and
    /// clears the loading indicator, so the same request can simply be repeated.
    /// A load that finishes after the filter changed reports `Stale`, whether
    /// it succeeded or not.
    pub async fn load_more(&self) -> Result<LoadReport> {
        let (filter, generation) = {
            let state = self.state.lock()?;
            (state.filter.clone().unwrap_or(Filter::All), state.generation)
        };
        let load_state = match filter {
            Filter::All => self.catalog.load_state()?,
            Filter::Category(_) => self.typed.load_state()?,
        };
        if let LoadState::Loading(cursor) = load_state {
            debug!(offset = cursor.offset(), "load requested while loading, dropped");
            return Ok(LoadReport::Busy);
        }
        self.renderer.set_loading(true);
        let outcome = match &filter {
            Filter::All => self.catalog.next_page().await,
            Filter::Category(_) => self.typed.next_page().await,
        };
        // the load in flight owns the indicator
        if let Ok(PageOutcome::Busy) = outcome {
            return Ok(LoadReport::Busy);
        }

        let report = {
            let mut state = self.state.lock()?;
            if state.generation != generation {
                debug!(?filter, generation, "stale load discarded");
                return Ok(LoadReport::Stale);
            }
            match outcome {
                Ok(PageOutcome::Loaded(page)) => {
                    state.entries.extend(page.entities.iter().cloned());
                    let total = state.entries.len();
                    self.renderer.render_batch(&page.entities);
                    self.renderer.set_paging_available(!page.exhausted);
                    info!(?filter, loaded = page.entities.len(), total, "session extended");
                    Ok(LoadReport::Loaded {
                        loaded: page.entities.len(),
                        total,
                        exhausted: page.exhausted,
                    })
                }
                Ok(PageOutcome::Exhausted) => {
                    self.renderer.set_paging_available(false);
                    Ok(LoadReport::Exhausted)
                }
                Ok(PageOutcome::Busy | PageOutcome::Superseded) => Ok(LoadReport::Stale),
                Err(e) => {
                    warn!(?filter, error = %e, "page load failed");
                    Err(e)
                }
            }
        };
        self.renderer.set_loading(false);
        report
    }

    /// Switches the filter, rebuilding the session list from its first page.
    /// Requesting the active filter again does nothing.
    pub async fn filter_by_type(&self, filter: Filter) -> Result<LoadReport> {
        {
            let mut state = self.state.lock()?;
            if state.filter.as_ref() == Some(&filter) {
                return Ok(LoadReport::Unchanged);
            }
            state.filter = Some(filter.clone());
            state.generation += 1;
            state.entries.clear();
            self.renderer.clear();
            self.renderer.set_paging_available(true);
            self.catalog.reset()?;
            match &filter {
                Filter::All => self.typed.reset(None)?,
                Filter::Category(category) => self.typed.reset(Some(category.clone()))?,
            }
            debug!(?filter, generation = state.generation, "filter changed");
        }
        self.load_more().await
    }

    /// Reloads the unfiltered catalog from the start, even if it is already active.
    pub async fn reset(&self) -> Result<LoadReport> {
        self.state.lock()?.filter = None;
        self.filter_by_type(Filter::All).await
    }

    /// Matches names of the entities loaded so far. Entities of the active
    /// filter that were not paged in yet are not searched.
    /// Returns `None` when the query is too short to run.
    pub fn search(&self, query: &str) -> Result<Option<Vec<EntityDetail>>> {
        if query.chars().count() < MIN_SEARCH_LEN {
            return Ok(None);
        }
        let query = query.to_lowercase();
        let matches: Vec<EntityDetail> = self
            .state
            .lock()?
            .entries
            .iter()
            .filter(|entity| entity.name().to_lowercase().contains(&query))
            .cloned()
            .collect();
        self.renderer.clear();
        if matches.is_empty() {
            self.renderer.render_no_results();
        } else {
            self.renderer.render_batch(&matches);
        }
        Ok(Some(matches))
    }

    fn find(&self, identity: &str) -> Result<Option<EntityDetail>> {
        Ok(self
            .state
            .lock()?
            .entries
            .iter()
            .find(|entity| entity.identity() == identity)
            .cloned())
    }

    /// Opens the detail of a loaded entity: description first, then lineage
    /// and relations side by side. Either section failing only marks that
    /// section as failed. Unknown identities are ignored.
    pub async fn open_detail(&self, identity: &str) -> Result<Option<DetailView>> {
        let Some(entity) = self.find(identity)? else {
            debug!(%identity, "detail requested for an entity outside the session");
            return Ok(None);
        };
        self.renderer.render_detail(&entity, DESCRIPTION_PENDING);
        let description = describe(self.remote.as_ref(), entity.species_locator()).await;
        self.renderer.render_detail(&entity, &description);

        let (lineage, relations) = tokio::join!(
            self.lineage.flatten(&entity),
            self.relations.aggregate(&entity)
        );
        let lineage = lineage.map(Section::Ready).unwrap_or_else(|e| {
            warn!(%identity, error = %e, "lineage failed to load");
            Section::Failed
        });
        self.renderer.render_lineage(lineage.as_ref());
        let relations = relations.map(Section::Ready).unwrap_or_else(|e| {
            warn!(%identity, error = %e, "relations failed to load");
            Section::Failed
        });
        self.renderer.render_relations(relations.as_ref());

        Ok(Some(DetailView {
            entity,
            description,
            lineage,
            relations,
        }))
    }

    fn neighbour(&self, identity: &str, forward: bool) -> Result<Option<String>> {
        let state = self.state.lock()?;
        let session = &state.entries;
        let Some(index) = session.iter().position(|entity| entity.identity() == identity) else {
            return Ok(None);
        };
        let target = if forward { index.checked_add(1) } else { index.checked_sub(1) };
        Ok(target
            .and_then(|i| session.get(i))
            .map(|entity| entity.identity().to_owned()))
    }

    /// Opens the entity after `identity` in session order, if any.
    pub async fn next_entity(&self, identity: &str) -> Result<Option<DetailView>> {
        match self.neighbour(identity, true)? {
            Some(next) => self.open_detail(&next).await,
            None => Ok(None),
        }
    }

    /// Opens the entity before `identity` in session order, if any.
    pub async fn previous_entity(&self, identity: &str) -> Result<Option<DetailView>> {
        match self.neighbour(identity, false)? {
            Some(previous) => self.open_detail(&previous).await,
            None => Ok(None),
        }
    }
}
