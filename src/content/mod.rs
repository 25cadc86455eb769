//! Content-store boundary.
//!
//! The rendering pipeline never talks HTTP directly; it goes through the
//! [`ContentStore`] trait so tests and tooling can substitute fakes. The one
//! production implementation is [`client::ContentClient`].

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::documents::{
    DetailDocument, DocumentKind, PageDocument, SiteSettings, TeamMember,
};

pub mod client;
pub mod decode;
pub mod query;

pub use client::ContentClient;

/// Read-only access to the remote content store.
///
/// Reference fields are expanded by the fetch queries, so documents returned
/// here are self-contained; callers never dereference anything.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Site-wide settings (branding, navigation, SEO defaults).
    async fn site_settings(&self) -> Result<SiteSettings, ContentError>;

    /// The page document routed at the given slug, if any.
    async fn page_by_slug(&self, slug: &str) -> Result<Option<PageDocument>, ContentError>;

    /// One detail document (service, project, or post) by slug.
    async fn detail_by_slug(
        &self,
        kind: DocumentKind,
        slug: &str,
    ) -> Result<Option<DetailDocument>, ContentError>;

    /// Every slug of the given kind. Used by site-wide revalidation fan-out.
    async fn slugs(&self, kind: DocumentKind) -> Result<Vec<String>, ContentError>;

    /// All team members, used as the fallback for team sections without
    /// inline members.
    async fn team_members(&self) -> Result<Vec<TeamMember>, ContentError>;
}

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("content request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("content store answered with status {status}")]
    Status { status: u16 },
    #[error("failed to decode content document: {0}")]
    Decode(String),
    #[error("content store is misconfigured: {0}")]
    Configuration(String),
}

impl ContentError {
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode(message.into())
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }
}
