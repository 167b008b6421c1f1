//! Offset based paging over the full catalog and over a single category.
//!
//! Both paginators own a [`Pager`], which keeps the cursor together with an
//! explicit [`LoadState`]. Only one page per paginator can be in flight: a
//! request arriving while another is loading is dropped with
//! [`PageOutcome::Busy`], never queued. The cursor advances by the page size
//! only when every entity of the page resolved.

use futures_util::future::try_join_all;
use serde::Serialize;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

use crate::error::{PokedexError, Result};
use crate::fetch::DetailFetcher;
use crate::model::{EntityDetail, EntityRef};
use crate::payload::{CollectionPage, NamedLocator, TypeMembers};
use crate::remote::fetch;

// ------------- Cursor -------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PaginationCursor {
    offset: usize,
    page_size: usize,
}
impl PaginationCursor {
    pub fn new(page_size: usize) -> Result<Self> {
        if page_size == 0 {
            return Err(PokedexError::Config("page size must be positive".into()));
        }
        Ok(Self { offset: 0, page_size })
    }
    pub fn offset(&self) -> usize {
        self.offset
    }
    pub fn page_size(&self) -> usize {
        self.page_size
    }
    pub fn advanced(&self) -> Self {
        Self {
            offset: self.offset + self.page_size,
            page_size: self.page_size,
        }
    }
    pub fn rewound(&self) -> Self {
        Self {
            offset: 0,
            page_size: self.page_size,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Idle,
    /// A page is loading, starting at the captured cursor.
    Loading(PaginationCursor),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub entities: Vec<EntityDetail>,
    /// The cursor after this page.
    pub cursor: PaginationCursor,
    /// No further pages can be loaded. Only the category paginator knows this.
    pub exhausted: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PageOutcome {
    Loaded(Page),
    /// Another page of the same stream was already loading; the request was dropped.
    Busy,
    /// The membership list has been paged through completely.
    Exhausted,
    /// The stream was reset while the page was loading; its results are stale.
    Superseded,
}

// ------------- Pager -------------
#[derive(Debug)]
struct PagerState {
    cursor: PaginationCursor,
    load: LoadState,
    epoch: u64,
}

/// Cursor plus load guard shared by both paginators.
#[derive(Debug)]
pub struct Pager {
    state: Mutex<PagerState>,
}
impl Pager {
    pub fn new(page_size: usize) -> Result<Self> {
        Ok(Self {
            state: Mutex::new(PagerState {
                cursor: PaginationCursor::new(page_size)?,
                load: LoadState::Idle,
                epoch: 0,
            }),
        })
    }
    pub fn cursor(&self) -> Result<PaginationCursor> {
        Ok(self.state.lock()?.cursor)
    }
    pub fn load_state(&self) -> Result<LoadState> {
        Ok(self.state.lock()?.load)
    }
    /// Rewinds the cursor and releases the guard. A load still in flight
    /// belongs to the previous epoch and can no longer move the cursor.
    pub fn reset(&self) -> Result<()> {
        let mut state = self.state.lock()?;
        state.cursor = state.cursor.rewound();
        state.load = LoadState::Idle;
        state.epoch += 1;
        Ok(())
    }
    /// Takes the load guard, or `None` when a page is already loading.
    fn begin(&self) -> Result<Option<LoadGuard<'_>>> {
        let mut state = self.state.lock()?;
        if let LoadState::Loading(cursor) = state.load {
            debug!(offset = cursor.offset(), "page already loading, request dropped");
            return Ok(None);
        }
        let cursor = state.cursor;
        state.load = LoadState::Loading(cursor);
        Ok(Some(LoadGuard {
            pager: self,
            cursor,
            epoch: state.epoch,
        }))
    }
}

struct LoadGuard<'a> {
    pager: &'a Pager,
    cursor: PaginationCursor,
    epoch: u64,
}
impl LoadGuard<'_> {
    /// Advances the cursor past the loaded page. `None` when the pager was
    /// reset in the meantime.
    fn commit(self) -> Result<Option<PaginationCursor>> {
        let mut state = self.pager.state.lock()?;
        if state.epoch != self.epoch {
            return Ok(None);
        }
        state.cursor = self.cursor.advanced();
        Ok(Some(state.cursor))
    }
}
impl Drop for LoadGuard<'_> {
    fn drop(&mut self) {
        if let Ok(mut state) = self.pager.state.lock() {
            if state.epoch == self.epoch {
                state.load = LoadState::Idle;
            }
        }
    }
}

fn references(listing: Vec<NamedLocator>) -> Result<Vec<EntityRef>> {
    listing
        .into_iter()
        .map(|entry| {
            EntityRef::from_locator(&entry.url).ok_or_else(|| {
                PokedexError::malformed(format!("listing locator '{}' has no identity", entry.url))
            })
        })
        .collect()
}

/// Resolves every reference concurrently; the first failure fails them all.
async fn resolve_all(fetcher: &DetailFetcher, refs: &[EntityRef]) -> Result<Vec<EntityDetail>> {
    try_join_all(refs.iter().map(|entity| fetcher.resolve(entity))).await
}

// ------------- Catalog -------------
/// Walks the unfiltered catalog. The total size is never checked, so the end
/// of the catalog only shows as short or empty pages.
pub struct CatalogPaginator {
    fetcher: DetailFetcher,
    pager: Pager,
}
impl CatalogPaginator {
    pub fn new(fetcher: DetailFetcher, page_size: usize) -> Result<Self> {
        Ok(Self {
            fetcher,
            pager: Pager::new(page_size)?,
        })
    }
    pub fn cursor(&self) -> Result<PaginationCursor> {
        self.pager.cursor()
    }
    pub fn load_state(&self) -> Result<LoadState> {
        self.pager.load_state()
    }
    pub fn reset(&self) -> Result<()> {
        self.pager.reset()
    }
    pub async fn next_page(&self) -> Result<PageOutcome> {
        let Some(guard) = self.pager.begin()? else {
            return Ok(PageOutcome::Busy);
        };
        let cursor = guard.cursor;
        let remote = self.fetcher.remote();
        let url = remote.collection_url(cursor.page_size(), cursor.offset());
        let listing: CollectionPage = fetch(remote.as_ref(), &url).await?;
        let refs = references(listing.results)?;
        let entities = resolve_all(&self.fetcher, &refs).await?;
        let Some(cursor) = guard.commit()? else {
            return Ok(PageOutcome::Superseded);
        };
        info!(offset = cursor.offset(), loaded = entities.len(), "catalog page loaded");
        Ok(PageOutcome::Loaded(Page {
            entities,
            cursor,
            exhausted: false,
        }))
    }
}

// ------------- Category -------------
#[derive(Debug, Default)]
struct Scope {
    category: Option<String>,
    /// Membership together with the pager epoch it was fetched in.
    membership: Option<(u64, Arc<Vec<EntityRef>>)>,
}

/// Walks the members of one category. The membership list is fetched once
/// when paging starts from offset zero and sliced locally afterwards, so the
/// end of the list is known and reported.
pub struct TypeScopedPaginator {
    fetcher: DetailFetcher,
    pager: Pager,
    scope: Mutex<Scope>,
}
impl TypeScopedPaginator {
    pub fn new(fetcher: DetailFetcher, page_size: usize) -> Result<Self> {
        Ok(Self {
            fetcher,
            pager: Pager::new(page_size)?,
            scope: Mutex::new(Scope::default()),
        })
    }
    pub fn cursor(&self) -> Result<PaginationCursor> {
        self.pager.cursor()
    }
    pub fn load_state(&self) -> Result<LoadState> {
        self.pager.load_state()
    }
    pub fn category(&self) -> Result<Option<String>> {
        Ok(self.scope.lock()?.category.clone())
    }
    /// Members known for the active category, if they were fetched yet.
    pub fn membership_len(&self) -> Result<Option<usize>> {
        Ok(self.scope.lock()?.membership.as_ref().map(|(_, members)| members.len()))
    }
    /// Whether further pages can be requested.
    pub fn has_more(&self) -> Result<bool> {
        let offset = self.pager.cursor()?.offset();
        let scope = self.scope.lock()?;
        Ok(match (&scope.category, &scope.membership) {
            (None, _) => false,
            (Some(_), Some((_, members))) => offset < members.len(),
            (Some(_), None) => true,
        })
    }
    /// Forgets the previous category and cursor without loading anything.
    pub fn reset(&self, category: Option<String>) -> Result<()> {
        self.pager.reset()?;
        let mut scope = self.scope.lock()?;
        scope.category = category;
        scope.membership = None;
        Ok(())
    }
    /// Switches to `category` and loads its first page.
    pub async fn activate(&self, category: &str) -> Result<PageOutcome> {
        self.reset(Some(category.to_owned()))?;
        self.next_page().await
    }
    pub async fn next_page(&self) -> Result<PageOutcome> {
        let Some(guard) = self.pager.begin()? else {
            return Ok(PageOutcome::Busy);
        };
        let cursor = guard.cursor;
        let (category, known) = {
            let scope = self.scope.lock()?;
            let known = scope
                .membership
                .as_ref()
                .filter(|(epoch, _)| *epoch == guard.epoch)
                .map(|(_, members)| Arc::clone(members));
            (scope.category.clone(), known)
        };
        let Some(category) = category else {
            return Ok(PageOutcome::Exhausted);
        };
        let members = match known {
            Some(members) if cursor.offset() > 0 => members,
            _ => self.fetch_membership(&category, guard.epoch).await?,
        };
        if cursor.offset() >= members.len() && cursor.offset() > 0 {
            debug!(%category, offset = cursor.offset(), "category exhausted");
            return Ok(PageOutcome::Exhausted);
        }
        let end = (cursor.offset() + cursor.page_size()).min(members.len());
        let entities = resolve_all(&self.fetcher, &members[cursor.offset()..end]).await?;
        let Some(cursor) = guard.commit()? else {
            return Ok(PageOutcome::Superseded);
        };
        let exhausted = cursor.offset() >= members.len();
        info!(%category, offset = cursor.offset(), loaded = entities.len(), exhausted, "category page loaded");
        Ok(PageOutcome::Loaded(Page {
            entities,
            cursor,
            exhausted,
        }))
    }
    async fn fetch_membership(&self, category: &str, epoch: u64) -> Result<Arc<Vec<EntityRef>>> {
        let remote = self.fetcher.remote();
        let url = remote.category_url(category);
        let listing: TypeMembers = fetch(remote.as_ref(), &url).await?;
        let members = Arc::new(references(
            listing.pokemon.into_iter().map(|member| member.pokemon).collect(),
        )?);
        debug!(%category, members = members.len(), "category membership fetched");
        let mut scope = self.scope.lock()?;
        if scope.category.as_deref() == Some(category) {
            scope.membership = Some((epoch, Arc::clone(&members)));
        }
        Ok(members)
    }
}
