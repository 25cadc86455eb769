//! Invalidation path mapping.
//!
//! A pure rule table from a changed document's type (and optional slug) to
//! the set of site paths whose cached responses are stale. Callers layer the
//! defensive root-path inclusion and the site-wide slug fan-out on top; this
//! module stays side-effect free.

use std::collections::BTreeSet;

use crate::domain::documents::DocumentKind;

/// Paths touched by documents that shape every page (home page content,
/// site-wide settings).
pub const SITE_WIDE_PATHS: [&str; 6] = ["/", "/about", "/contact", "/services", "/work", "/blog"];

/// Compute the set of site paths invalidated by a change to a document of
/// the given type. Unknown types map to the empty set; the caller decides
/// whether the root path is still worth refreshing.
pub fn paths_for(document_type: &str, slug: Option<&str>) -> BTreeSet<String> {
    let mut paths = BTreeSet::new();

    match document_type {
        "project" | "work" | "projectType" => {
            collect_kind(&mut paths, DocumentKind::Project, slug);
        }
        "service" => {
            collect_kind(&mut paths, DocumentKind::Service, slug);
        }
        "post" | "article" | "blogPost" => {
            collect_kind(&mut paths, DocumentKind::Post, slug);
        }
        "homePage" | "siteSettings" => {
            paths.extend(SITE_WIDE_PATHS.iter().map(|path| path.to_string()));
        }
        _ => {}
    }

    paths
}

/// A detail-page change always invalidates the listing page next to it.
fn collect_kind(paths: &mut BTreeSet<String>, kind: DocumentKind, slug: Option<&str>) {
    paths.insert(kind.listing_path().to_string());
    if let Some(slug) = slug.filter(|slug| !slug.is_empty()) {
        paths.insert(kind.detail_path(slug));
    }
}

/// Whether a path matches one of the route patterns this site serves.
pub fn is_known_route(path: &str) -> bool {
    if SITE_WIDE_PATHS.contains(&path) {
        return true;
    }

    DocumentKind::ALL.iter().any(|kind| {
        path.strip_prefix(kind.listing_path())
            .and_then(|rest| rest.strip_prefix('/'))
            .is_some_and(|slug| !slug.is_empty() && !slug.contains('/'))
    })
}
