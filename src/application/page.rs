//! Page assembly.
//!
//! Fetches one document, resolves the dispatch context it needs, and runs
//! the block dispatcher. Chrome lookups degrade to defaults instead of
//! failing the request; document lookups surface errors so the HTTP layer
//! can render the fallback page state.

use std::sync::Arc;

use tracing::warn;

use crate::application::dispatch::{DispatchContext, RenderedNode, dispatch, wants_team_fallback};
use crate::content::{ContentError, ContentStore};
use crate::domain::blocks::Block;
use crate::domain::documents::{DocumentKind, Seo};
use crate::presentation::views::LayoutChrome;

pub struct PageService {
    store: Arc<dyn ContentStore>,
}

/// A page document after dispatch: its meta inputs plus rendered sections.
pub struct AssembledPage {
    pub title: Option<String>,
    pub seo: Option<Seo>,
    pub nodes: Vec<RenderedNode>,
}

/// A detail document after dispatch.
pub struct AssembledDetail {
    pub title: String,
    pub kicker: String,
    pub excerpt: String,
    pub cover_url: String,
    pub cover_alt: String,
    pub seo: Option<Seo>,
    pub nodes: Vec<RenderedNode>,
}

impl PageService {
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self { store }
    }

    /// Site chrome for the current request. A failed settings fetch degrades
    /// to the built-in defaults so the page still renders.
    pub async fn chrome(&self) -> LayoutChrome {
        match self.store.site_settings().await {
            Ok(settings) => LayoutChrome::from_settings(&settings),
            Err(error) => {
                warn!(
                    target = "vetrina::page",
                    error = %error,
                    "site settings fetch failed; rendering with default chrome"
                );
                LayoutChrome::degraded()
            }
        }
    }

    pub async fn page(&self, slug: &str) -> Result<Option<AssembledPage>, ContentError> {
        let Some(document) = self.store.page_by_slug(slug).await? else {
            return Ok(None);
        };

        let ctx = self.dispatch_context(&document.blocks).await;
        Ok(Some(AssembledPage {
            nodes: dispatch(&document.blocks, &ctx),
            title: document.title,
            seo: document.seo,
        }))
    }

    pub async fn detail(
        &self,
        kind: DocumentKind,
        slug: &str,
    ) -> Result<Option<AssembledDetail>, ContentError> {
        let Some(document) = self.store.detail_by_slug(kind, slug).await? else {
            return Ok(None);
        };

        let kicker = match kind {
            DocumentKind::Post => document.published_label().unwrap_or_default(),
            DocumentKind::Project => document.category.clone().unwrap_or_default(),
            DocumentKind::Service => String::new(),
        };

        let ctx = self.dispatch_context(&document.blocks).await;
        Ok(Some(AssembledDetail {
            nodes: dispatch(&document.blocks, &ctx),
            title: document.title.unwrap_or_default(),
            kicker,
            excerpt: document.excerpt.unwrap_or_default(),
            cover_url: document
                .cover
                .as_ref()
                .and_then(|cover| cover.url.clone())
                .unwrap_or_default(),
            cover_alt: document
                .cover
                .as_ref()
                .and_then(|cover| cover.alt.clone())
                .unwrap_or_default(),
            seo: document.seo,
        }))
    }

    /// The team roster is fetched only when a block on the page needs it; a
    /// failed fetch degrades to an empty roster.
    async fn dispatch_context(&self, blocks: &[Block]) -> DispatchContext {
        if !wants_team_fallback(blocks) {
            return DispatchContext::default();
        }

        match self.store.team_members().await {
            Ok(team_fallback) => DispatchContext { team_fallback },
            Err(error) => {
                warn!(
                    target = "vetrina::page",
                    error = %error,
                    "team roster fetch failed; team section renders without members"
                );
                DispatchContext::default()
            }
        }
    }
}
