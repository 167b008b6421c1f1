//! The contract between the browsing core and whatever draws it.
//!
//! The core never renders. It hands typed values to a [`Renderer`], which
//! may be a terminal, a web page or, as with [`ViewRecorder`], simply a
//! snapshot that can be served as JSON.

use serde::Serialize;
use std::sync::Mutex;

use crate::model::{EntityDetail, LineageChain, RelationSet};

/// State of a detail section that loads on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "value", rename_all = "lowercase")]
pub enum Section<T> {
    Loading,
    Ready(T),
    /// Terminal: the section is not retried.
    Failed,
}
impl<T> Section<T> {
    pub fn as_ref(&self) -> Section<&T> {
        match self {
            Section::Loading => Section::Loading,
            Section::Ready(value) => Section::Ready(value),
            Section::Failed => Section::Failed,
        }
    }
    pub fn is_failed(&self) -> bool {
        matches!(self, Section::Failed)
    }
}

pub trait Renderer: Send + Sync {
    /// Drops every rendered card, e.g. after a filter change or for search results.
    fn clear(&self);
    /// Appends a batch of cards.
    fn render_batch(&self, batch: &[EntityDetail]);
    fn render_detail(&self, detail: &EntityDetail, description: &str);
    fn render_lineage(&self, lineage: Section<&LineageChain>);
    fn render_relations(&self, relations: Section<&RelationSet>);
    fn set_loading(&self, _loading: bool) {}
    fn set_paging_available(&self, _available: bool) {}
    fn render_no_results(&self) {}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetailView {
    pub entity: EntityDetail,
    pub description: String,
    pub lineage: Section<LineageChain>,
    pub relations: Section<RelationSet>,
}

/// Everything currently rendered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewSnapshot {
    pub cards: Vec<EntityDetail>,
    pub detail: Option<DetailView>,
    pub loading: bool,
    pub paging_available: bool,
    pub no_results: bool,
}
impl Default for ViewSnapshot {
    fn default() -> Self {
        Self {
            cards: Vec::new(),
            detail: None,
            loading: false,
            paging_available: true,
            no_results: false,
        }
    }
}

/// A renderer that records the latest state instead of drawing it.
#[derive(Debug, Default)]
pub struct ViewRecorder {
    view: Mutex<ViewSnapshot>,
}
impl ViewRecorder {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn snapshot(&self) -> ViewSnapshot {
        match self.view.lock() {
            Ok(view) => view.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
    fn update(&self, change: impl FnOnce(&mut ViewSnapshot)) {
        let mut view = match self.view.lock() {
            Ok(view) => view,
            Err(poisoned) => poisoned.into_inner(),
        };
        change(&mut view);
    }
}
impl Renderer for ViewRecorder {
    fn clear(&self) {
        self.update(|view| {
            view.cards.clear();
            view.no_results = false;
        });
    }
    fn render_batch(&self, batch: &[EntityDetail]) {
        self.update(|view| view.cards.extend_from_slice(batch));
    }
    fn render_detail(&self, detail: &EntityDetail, description: &str) {
        self.update(|view| {
            // a re-render of the same entity keeps the sections already loaded
            if let Some(current) = view
                .detail
                .as_mut()
                .filter(|current| current.entity.identity() == detail.identity())
            {
                current.description = description.to_owned();
                return;
            }
            view.detail = Some(DetailView {
                entity: detail.clone(),
                description: description.to_owned(),
                lineage: Section::Loading,
                relations: Section::Loading,
            });
        });
    }
    fn render_lineage(&self, lineage: Section<&LineageChain>) {
        self.update(|view| {
            if let Some(detail) = view.detail.as_mut() {
                detail.lineage = match lineage {
                    Section::Loading => Section::Loading,
                    Section::Ready(chain) => Section::Ready(chain.clone()),
                    Section::Failed => Section::Failed,
                };
            }
        });
    }
    fn render_relations(&self, relations: Section<&RelationSet>) {
        self.update(|view| {
            if let Some(detail) = view.detail.as_mut() {
                detail.relations = match relations {
                    Section::Loading => Section::Loading,
                    Section::Ready(set) => Section::Ready(set.clone()),
                    Section::Failed => Section::Failed,
                };
            }
        });
    }
    fn set_loading(&self, loading: bool) {
        self.update(|view| view.loading = loading);
    }
    fn set_paging_available(&self, available: bool) {
        self.update(|view| view.paging_available = available);
    }
    fn render_no_results(&self) {
        self.update(|view| view.no_results = true);
    }
}
