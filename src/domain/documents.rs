//! Documents fetched from the content store.
//!
//! Everything here is read-only and request-scoped: a document is decoded
//! from one fetch, rendered, and dropped. Reference fields arrive already
//! expanded by the fetch query, so nothing in this module loads anything.

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use tracing::debug;

use crate::domain::blocks::{Block, ImageRef, Slug};

/// The enumerable detail-document kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    Project,
    Service,
    Post,
}

impl DocumentKind {
    pub const ALL: [DocumentKind; 3] =
        [DocumentKind::Project, DocumentKind::Service, DocumentKind::Post];

    /// The store-side `_type` value.
    pub fn as_str(self) -> &'static str {
        match self {
            DocumentKind::Project => "project",
            DocumentKind::Service => "service",
            DocumentKind::Post => "post",
        }
    }

    /// The site path of the listing page for this kind.
    pub fn listing_path(self) -> &'static str {
        match self {
            DocumentKind::Project => "/work",
            DocumentKind::Service => "/services",
            DocumentKind::Post => "/blog",
        }
    }

    /// The site path of one detail page of this kind.
    pub fn detail_path(self, slug: &str) -> String {
        format!("{}/{slug}", self.listing_path())
    }
}

/// SEO metadata attached to a document. All fields optional; absent values
/// fall back to site-wide defaults at render time.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Seo {
    pub title: Option<String>,
    pub description: Option<String>,
}

/// The root content entity for a routed page.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PageDocument {
    pub title: Option<String>,
    pub slug: Option<Slug>,
    pub seo: Option<Seo>,
    #[serde(deserialize_with = "lenient_blocks")]
    pub blocks: Vec<Block>,
}

/// A service, project, or post detail document. Detail documents carry their
/// own block list and run through the same dispatcher as page documents.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DetailDocument {
    pub title: Option<String>,
    pub slug: Option<Slug>,
    pub excerpt: Option<String>,
    pub category: Option<String>,
    pub seo: Option<Seo>,
    pub cover: Option<ImageRef>,
    #[serde(deserialize_with = "lenient_datetime")]
    pub published_at: Option<OffsetDateTime>,
    #[serde(deserialize_with = "lenient_blocks")]
    pub blocks: Vec<Block>,
}

impl DetailDocument {
    pub fn published_label(&self) -> Option<String> {
        self.published_at.and_then(format_publish_date)
    }
}

// ============================================================================
// Expanded references
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ServiceSummary {
    pub title: Option<String>,
    pub slug: Option<Slug>,
    pub excerpt: Option<String>,
    pub icon: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProjectSummary {
    pub title: Option<String>,
    pub slug: Option<Slug>,
    pub excerpt: Option<String>,
    pub category: Option<String>,
    pub cover: Option<ImageRef>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PostSummary {
    pub title: Option<String>,
    pub slug: Option<Slug>,
    pub excerpt: Option<String>,
    pub cover: Option<ImageRef>,
    #[serde(deserialize_with = "lenient_datetime")]
    pub published_at: Option<OffsetDateTime>,
}

impl PostSummary {
    pub fn published_label(&self) -> Option<String> {
        self.published_at.and_then(format_publish_date)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Testimonial {
    pub quote: Option<String>,
    pub author: Option<String>,
    pub role: Option<String>,
    pub company: Option<String>,
    pub avatar: Option<ImageRef>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TeamMember {
    pub name: Option<String>,
    pub role: Option<String>,
    pub bio: Option<String>,
    pub photo: Option<ImageRef>,
}

// ============================================================================
// Site settings
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NavLink {
    pub label: Option<String>,
    pub href: Option<String>,
}

/// Site-wide settings: branding, navigation, footer, SEO defaults. A fetch
/// failure degrades to built-in defaults rather than failing the request.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SiteSettings {
    pub title: Option<String>,
    pub tagline: Option<String>,
    pub canonical_base: Option<String>,
    pub nav: Option<Vec<NavLink>>,
    pub footer_text: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub seo: Option<Seo>,
}

// ============================================================================
// Lenient field decoding
// ============================================================================

/// Decode a block array one element at a time, dropping elements that do not
/// decode instead of failing the document. Unknown `_type` tags still decode
/// (into `BlockBody::Unknown`); only structurally broken payloads land here.
fn lenient_blocks<'de, D>(deserializer: D) -> Result<Vec<Block>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(decode_blocks(value))
}

/// See [`lenient_blocks`]. Exposed for the content decoder.
pub fn decode_blocks(value: Value) -> Vec<Block> {
    let Value::Array(items) = value else {
        return Vec::new();
    };

    items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match serde_json::from_value::<Block>(item) {
            Ok(block) => Some(block),
            Err(error) => {
                debug!(
                    target = "vetrina::domain::blocks",
                    index,
                    error = %error,
                    "dropping block that failed to decode"
                );
                None
            }
        })
        .collect()
}

/// Decode an RFC 3339 timestamp, treating anything unparseable as absent.
fn lenient_datetime<'de, D>(deserializer: D) -> Result<Option<OffsetDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value
        .as_str()
        .and_then(|raw| OffsetDateTime::parse(raw, &Rfc3339).ok()))
}

fn format_publish_date(when: OffsetDateTime) -> Option<String> {
    let format = format_description!("[day padding:none] [month repr:short] [year]");
    when.format(&format).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn page_document_drops_undecodable_blocks() {
        let page: PageDocument = serde_json::from_value(json!({
            "title": "Home",
            "blocks": [
                {"_type": "hero", "headline": "Hi"},
                {"_type": "statsSection", "stats": "not-an-array"},
                {"_type": "someFutureBlock"},
            ],
        }))
        .unwrap();

        // The malformed stats block is dropped; the future block decodes to
        // Unknown and survives until dispatch drops it.
        assert_eq!(page.blocks.len(), 2);
    }

    #[test]
    fn page_document_tolerates_missing_blocks_field() {
        let page: PageDocument = serde_json::from_value(json!({"title": "Contact"})).unwrap();
        assert!(page.blocks.is_empty());
    }

    #[test]
    fn detail_document_parses_publish_date() {
        let doc: DetailDocument = serde_json::from_value(json!({
            "title": "Rebrand for Aurora",
            "publishedAt": "2026-03-12T09:30:00Z",
        }))
        .unwrap();
        assert_eq!(doc.published_label().as_deref(), Some("12 Mar 2026"));
    }

    #[test]
    fn garbage_publish_date_reads_as_absent() {
        let doc: DetailDocument = serde_json::from_value(json!({
            "publishedAt": "next tuesday",
        }))
        .unwrap();
        assert!(doc.published_at.is_none());
    }

    #[test]
    fn document_kind_paths() {
        assert_eq!(DocumentKind::Project.detail_path("aurora"), "/work/aurora");
        assert_eq!(DocumentKind::Service.listing_path(), "/services");
        assert_eq!(DocumentKind::Post.as_str(), "post");
    }
}
